use std::collections::HashMap;
use std::sync::Arc;

use particle_id::ParticleID;

use crate::four_vector::FourVector;
use crate::particle::{Particle, Vertex};

/// Builder for [Event]s
#[derive(PartialEq, Debug, Clone, Default)]
pub struct EventBuilder {
    id: Option<i64>,
    particles: Vec<Particle>,
    vertices: Vec<Vertex>,
    weights: Vec<f64>,
    weight_names: Arc<Vec<String>>,
}

impl EventBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(cap: usize) -> Self {
        Self {
            particles: Vec::with_capacity(cap),
            ..Default::default()
        }
    }

    pub fn id(&mut self, id: i64) -> &mut Self {
        self.id = Some(id);
        self
    }

    /// Add a particle without production vertex, returning its index
    pub fn add_particle(
        &mut self,
        pid: ParticleID,
        status: i32,
        p: FourVector,
    ) -> usize {
        let id = self.particles.len();
        self.particles.push(Particle {
            id,
            pid,
            status,
            p,
            tag: 0,
            production_vertex: None,
        });
        id
    }

    /// Add a vertex with the given incoming particles, returning its index
    pub fn add_vertex(&mut self, incoming: Vec<usize>) -> usize {
        self.vertices.push(Vertex { incoming });
        self.vertices.len() - 1
    }

    /// Mutable access to an already added particle
    pub fn particle_mut(&mut self, idx: usize) -> Option<&mut Particle> {
        self.particles.get_mut(idx)
    }

    pub fn set_production_vertex(
        &mut self,
        particle: usize,
        vertex: usize,
    ) -> &mut Self {
        if let Some(p) = self.particles.get_mut(particle) {
            p.production_vertex = Some(vertex);
        }
        self
    }

    /// Mutable access to an already added vertex
    pub fn vertex_mut(&mut self, idx: usize) -> Option<&mut Vertex> {
        self.vertices.get_mut(idx)
    }

    pub fn nparticles(&self) -> usize {
        self.particles.len()
    }

    pub fn add_weight(&mut self, weight: f64) -> &mut Self {
        self.weights.push(weight);
        self
    }

    pub fn weight_names(&mut self, names: Arc<Vec<String>>) -> &mut Self {
        self.weight_names = names;
        self
    }

    /// Multiply all momentum components by `factor`
    pub fn rescale_energies(&mut self, factor: f64) -> &mut Self {
        for particle in &mut self.particles {
            let p = particle.p;
            particle.p = [
                factor * p[0],
                factor * p[1],
                factor * p[2],
                factor * p[3],
            ]
            .into();
        }
        self
    }

    pub fn build(self) -> Event {
        Event {
            id: self.id,
            particles: self.particles,
            vertices: self.vertices,
            weights: self.weights,
            weight_names: self.weight_names,
        }
    }
}

impl From<EventBuilder> for Event {
    fn from(b: EventBuilder) -> Self {
        b.build()
    }
}

/// Scattering event
///
/// The event owns all particles and vertices. Ancestry is expressed
/// through indices: each particle refers to its production vertex, and
/// each vertex lists its incoming particles.
#[derive(PartialEq, Debug, Clone, Default)]
pub struct Event {
    id: Option<i64>,
    particles: Vec<Particle>,
    vertices: Vec<Vertex>,
    weights: Vec<f64>,
    weight_names: Arc<Vec<String>>,
}

impl Event {
    pub fn new() -> Self {
        Self::default()
    }

    /// Event number as given in the input
    pub fn id(&self) -> Option<i64> {
        self.id
    }

    pub fn set_id(&mut self, id: i64) {
        self.id = Some(id);
    }

    pub fn particles(&self) -> &[Particle] {
        self.particles.as_slice()
    }

    pub fn particle(&self, idx: usize) -> Option<&Particle> {
        self.particles.get(idx)
    }

    pub fn vertices(&self) -> &[Vertex] {
        self.vertices.as_slice()
    }

    pub fn vertex(&self, idx: usize) -> Option<&Vertex> {
        self.vertices.get(idx)
    }

    /// Iterator over all stable final-state particles
    pub fn final_state(&self) -> impl Iterator<Item = &Particle> {
        self.particles.iter().filter(|p| p.is_final())
    }

    /// All event weights in input order
    pub fn weights(&self) -> &[f64] {
        self.weights.as_slice()
    }

    /// The central event weight
    ///
    /// This is the first weight, or 1 if the event has no weights.
    pub fn weight(&self) -> f64 {
        self.weights.first().copied().unwrap_or(1.)
    }

    pub fn weight_names(&self) -> &[String] {
        &self.weight_names
    }

    /// Shared handle to the weight names
    pub fn weight_names_shared(&self) -> Arc<Vec<String>> {
        self.weight_names.clone()
    }

    /// Map from weight names to weights
    ///
    /// Weights without a name are omitted.
    pub fn named_weights(&self) -> HashMap<String, f64> {
        self.weight_names
            .iter()
            .zip(self.weights.iter())
            .map(|(name, w)| (name.clone(), *w))
            .collect()
    }

    /// Replace all weights
    pub fn set_weights(&mut self, weights: Vec<f64>, names: Arc<Vec<String>>) {
        self.weights = weights;
        self.weight_names = names;
    }
}
