use std::collections::HashMap;

use thiserror::Error;

use crate::event::Event;
use crate::particle::{is_hadron, Lineage, STATUS_BEAM};

/// Absolute PIDs of particles that are considered in the default
/// prompt-particle selection
pub const PROMPT_CANDIDATE_PIDS: [i32; 5] = [11, 12, 13, 14, 22];

/// Maximum number of generations followed in an ancestry walk
pub const MAX_ANCESTRY_DEPTH: usize = 1024;

/// Error in the production vertex graph of an event
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AncestryError {
    /// A particle is its own ancestor
    #[error("Malformed event graph: particle {0} is its own ancestor")]
    Cycle(usize),
    /// The ancestry chain is too long
    #[error("Malformed event graph: ancestry of particle {0} exceeds {MAX_ANCESTRY_DEPTH} generations")]
    TooDeep(usize),
    /// Reference to a particle that is not in the event
    #[error("Malformed event graph: no particle with index {0}")]
    MissingParticle(usize),
    /// Reference to a vertex that is not in the event
    #[error("Malformed event graph: no vertex with index {0}")]
    MissingVertex(usize),
}

/// Finds prompt particles not coming from hadron decays
///
/// A particle is prompt if none of its ancestors is a hadron that is
/// not a beam particle. Particles without production vertex are
/// prompt.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PromptFinder {
    candidates: Option<Vec<i32>>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Visit {
    InProgress,
    Done(bool),
}

impl PromptFinder {
    /// A prompt finder accepting all particle types
    pub fn new() -> Self {
        Self::default()
    }

    /// Only particles with the given absolute PIDs can be prompt
    pub fn with_candidates(candidates: &[i32]) -> Self {
        Self {
            candidates: Some(candidates.to_vec()),
        }
    }

    fn is_candidate<T: Lineage>(&self, particle: &T) -> bool {
        match &self.candidates {
            Some(pids) => pids.contains(&particle.pid().id().abs()),
            None => true,
        }
    }

    /// Split `particles` into prompt and non-prompt particles
    ///
    /// Both returned lists preserve the input order. Decisions are
    /// cached for the duration of a single call.
    pub fn classify<T: Lineage>(
        &self,
        event: &Event,
        particles: Vec<T>,
    ) -> Result<(Vec<T>, Vec<T>), AncestryError> {
        let mut memo = HashMap::new();
        let mut prompt = Vec::new();
        let mut non_prompt = Vec::new();
        for particle in particles {
            let accept = self.is_candidate(&particle)
                && match particle.origin() {
                    Some(idx) => is_prompt(event, idx, &mut memo, 0)?,
                    None => true,
                };
            if accept {
                prompt.push(particle)
            } else {
                non_prompt.push(particle)
            }
        }
        Ok((prompt, non_prompt))
    }

    /// Whether the particle with index `idx` in `event` is prompt
    ///
    /// This ignores the particle type of the particle itself.
    pub fn is_prompt(
        &self,
        event: &Event,
        idx: usize,
    ) -> Result<bool, AncestryError> {
        is_prompt(event, idx, &mut HashMap::new(), 0)
    }
}

fn is_prompt(
    event: &Event,
    idx: usize,
    memo: &mut HashMap<usize, Visit>,
    depth: usize,
) -> Result<bool, AncestryError> {
    match memo.get(&idx) {
        Some(Visit::Done(prompt)) => return Ok(*prompt),
        Some(Visit::InProgress) => return Err(AncestryError::Cycle(idx)),
        None => {}
    }
    if depth > MAX_ANCESTRY_DEPTH {
        return Err(AncestryError::TooDeep(idx));
    }
    let particle = event
        .particle(idx)
        .ok_or(AncestryError::MissingParticle(idx))?;
    let Some(vx) = particle.production_vertex else {
        memo.insert(idx, Visit::Done(true));
        return Ok(true);
    };
    let vertex = event.vertex(vx).ok_or(AncestryError::MissingVertex(vx))?;

    memo.insert(idx, Visit::InProgress);
    let mut prompt = true;
    for &parent_idx in &vertex.incoming {
        let parent = event
            .particle(parent_idx)
            .ok_or(AncestryError::MissingParticle(parent_idx))?;
        if (is_hadron(parent.pid) && parent.status != STATUS_BEAM)
            || !is_prompt(event, parent_idx, memo, depth + 1)?
        {
            prompt = false;
            break;
        }
    }
    memo.insert(idx, Visit::Done(prompt));
    Ok(prompt)
}

#[cfg(test)]
mod tests {
    use particle_id::ParticleID;

    use super::*;
    use crate::event::EventBuilder;
    use crate::four_vector::FourVector;
    use crate::object::PhysicsObject;

    fn p() -> FourVector {
        FourVector::from_components(10., 1., 2., 3.)
    }

    #[test]
    fn no_production_vertex() {
        let mut ev = EventBuilder::new();
        let e = ev.add_particle(ParticleID::new(11), 1, p());
        let ev = ev.build();
        let (prompt, non_prompt) = PromptFinder::new()
            .classify(&ev, vec![ev.particle(e).unwrap()])
            .unwrap();
        assert_eq!(prompt.len(), 1);
        assert!(non_prompt.is_empty());
    }

    #[test]
    fn hadron_parent() {
        let mut ev = EventBuilder::new();
        let b = ev.add_particle(ParticleID::new(511), 2, p());
        let e = ev.add_particle(ParticleID::new(11), 1, p());
        let vx = ev.add_vertex(vec![b]);
        ev.set_production_vertex(e, vx);
        let ev = ev.build();
        assert!(!PromptFinder::new().is_prompt(&ev, e).unwrap());
    }

    #[test]
    fn beam_hadron_parent() {
        let mut ev = EventBuilder::new();
        let proton = ev.add_particle(ParticleID::new(2212), STATUS_BEAM, p());
        let w = ev.add_particle(ParticleID::new(24), 22, p());
        let e = ev.add_particle(ParticleID::new(-11), 1, p());
        let vx = ev.add_vertex(vec![proton]);
        ev.set_production_vertex(w, vx);
        let vx = ev.add_vertex(vec![w]);
        ev.set_production_vertex(e, vx);
        let ev = ev.build();
        assert!(PromptFinder::new().is_prompt(&ev, e).unwrap());
    }

    #[test]
    fn hadron_grandparent() {
        let mut ev = EventBuilder::new();
        let pion = ev.add_particle(ParticleID::new(111), 2, p());
        let gamma = ev.add_particle(ParticleID::new(22), 2, p());
        let e = ev.add_particle(ParticleID::new(11), 1, p());
        let positron = ev.add_particle(ParticleID::new(-11), 1, p());
        let vx = ev.add_vertex(vec![pion]);
        ev.set_production_vertex(gamma, vx);
        let vx = ev.add_vertex(vec![gamma]);
        ev.set_production_vertex(e, vx);
        ev.set_production_vertex(positron, vx);
        let ev = ev.build();
        let objs: Vec<PhysicsObject> =
            [e, positron].iter().map(|&i| ev.particle(i).unwrap().into()).collect();
        let (prompt, non_prompt) =
            PromptFinder::new().classify(&ev, objs).unwrap();
        assert!(prompt.is_empty());
        assert_eq!(non_prompt.len(), 2);
    }

    #[test]
    fn candidate_pids() {
        let mut ev = EventBuilder::new();
        let tau = ev.add_particle(ParticleID::new(15), 1, p());
        let mu = ev.add_particle(ParticleID::new(13), 1, p());
        let ev = ev.build();
        let finder = PromptFinder::with_candidates(&PROMPT_CANDIDATE_PIDS);
        let particles = vec![ev.particle(tau).unwrap(), ev.particle(mu).unwrap()];
        let (prompt, non_prompt) = finder.classify(&ev, particles).unwrap();
        assert_eq!(prompt[0].id, mu);
        assert_eq!(non_prompt[0].id, tau);
    }

    #[test]
    fn cycle() {
        let mut ev = EventBuilder::new();
        let a = ev.add_particle(ParticleID::new(22), 2, p());
        let b = ev.add_particle(ParticleID::new(22), 2, p());
        let va = ev.add_vertex(vec![b]);
        let vb = ev.add_vertex(vec![a]);
        ev.set_production_vertex(a, va);
        ev.set_production_vertex(b, vb);
        let ev = ev.build();
        assert!(matches!(
            PromptFinder::new().is_prompt(&ev, a),
            Err(AncestryError::Cycle(_))
        ));
    }

    #[test]
    fn dangling_vertex() {
        let mut ev = EventBuilder::new();
        let a = ev.add_particle(ParticleID::new(22), 1, p());
        ev.set_production_vertex(a, 3);
        let ev = ev.build();
        assert_eq!(
            PromptFinder::new().is_prompt(&ev, a),
            Err(AncestryError::MissingVertex(3))
        );
    }

    // photons each produced by the previous one, returns the last
    fn photon_chain(len: usize) -> (Event, usize) {
        let mut ev = EventBuilder::with_capacity(len);
        let mut last = ev.add_particle(ParticleID::new(22), 2, p());
        for _ in 1..len {
            let vx = ev.add_vertex(vec![last]);
            last = ev.add_particle(ParticleID::new(22), 1, p());
            ev.set_production_vertex(last, vx);
        }
        (ev.build(), last)
    }

    #[test]
    fn long_ancestry() {
        let (ev, last) = photon_chain(MAX_ANCESTRY_DEPTH);
        assert_eq!(PromptFinder::new().is_prompt(&ev, last), Ok(true));
    }

    #[test]
    fn too_deep() {
        let (ev, last) = photon_chain(MAX_ANCESTRY_DEPTH + 10);
        assert_eq!(
            PromptFinder::new().is_prompt(&ev, last),
            Err(AncestryError::TooDeep(last - MAX_ANCESTRY_DEPTH - 1))
        );
    }
}
