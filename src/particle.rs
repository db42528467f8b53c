use particle_id::ParticleID;
use serde::{Deserialize, Serialize};

use crate::four_vector::FourVector;

/// Status code of stable final-state particles
pub const STATUS_FINAL: i32 = 1;
/// Status code of beam particles
pub const STATUS_BEAM: i32 = 4;
/// Status code of outgoing hard-process particles in Pythia
pub const STATUS_HARD_OUTGOING: i32 = 23;

/// A particle in an event record
///
/// Particles are owned by their [Event](crate::event::Event). The
/// production vertex is referred to by its index in the event.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct Particle {
    /// Position of the particle in the event record
    pub id: usize,
    /// Particle type
    pub pid: ParticleID,
    /// Status code
    pub status: i32,
    /// Four-momentum
    pub p: FourVector,
    /// Additional integer tag, e.g. a b-tag for pre-reconstructed jets
    pub tag: i32,
    /// Index of the production vertex, if any
    pub production_vertex: Option<usize>,
}

impl Particle {
    pub fn abs_pid(&self) -> i32 {
        self.pid.id().abs()
    }

    pub fn is_final(&self) -> bool {
        self.status == STATUS_FINAL
    }
}

/// An interaction vertex
#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct Vertex {
    /// Indices of the incoming particles
    pub incoming: Vec<usize>,
}

/// Objects that can be traced back to a particle in the event record
pub trait Lineage {
    /// Particle type
    fn pid(&self) -> ParticleID;

    /// Index of the underlying particle in the event record
    fn origin(&self) -> Option<usize>;
}

impl Lineage for Particle {
    fn pid(&self) -> ParticleID {
        self.pid
    }

    fn origin(&self) -> Option<usize> {
        Some(self.id)
    }
}

impl<T: Lineage> Lineage for &T {
    fn pid(&self) -> ParticleID {
        (*self).pid()
    }

    fn origin(&self) -> Option<usize> {
        (*self).origin()
    }
}

/// Whether the particle type counts as a hadron for prompt-particle
/// identification
pub fn is_hadron(id: ParticleID) -> bool {
    id.id().abs() > 100
}

/// Electrons and muons
pub fn is_light_lepton(id: ParticleID) -> bool {
    matches!(id.id().abs(), 11 | 13)
}

/// Electron and muon neutrinos
pub fn is_light_neutrino(id: ParticleID) -> bool {
    matches!(id.id().abs(), 12 | 14)
}

pub fn is_photon(id: ParticleID) -> bool {
    id.id() == 22
}
