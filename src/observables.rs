use serde::{Deserialize, Serialize};

use crate::event::Event;
use crate::four_vector::FourVector;
use crate::object::{Category, SelectedObjects};
use crate::particle::Particle;
use crate::traits::Observable;

fn final_state_with<'a>(
    event: &'a Event,
    pids: &'a [i32],
) -> impl Iterator<Item = &'a Particle> + 'a {
    event
        .final_state()
        .filter(move |p| pids.contains(&p.abs_pid()))
}

/// Invariant mass of all final-state particles with the given absolute PIDs
#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct InvariantMass {
    pub pids: Vec<i32>,
}

impl InvariantMass {
    pub fn new(pids: impl Into<Vec<i32>>) -> Self {
        Self { pids: pids.into() }
    }
}

impl Observable<Event> for InvariantMass {
    fn value(&self, event: &Event) -> f64 {
        final_state_with(event, &self.pids)
            .map(|p| p.p)
            .sum::<FourVector>()
            .m()
    }
}

/// Transverse momentum of the sum of all final-state particles with the
/// given absolute PIDs
#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct TransverseMomentum {
    pub pids: Vec<i32>,
}

impl TransverseMomentum {
    pub fn new(pids: impl Into<Vec<i32>>) -> Self {
        Self { pids: pids.into() }
    }
}

impl Observable<Event> for TransverseMomentum {
    fn value(&self, event: &Event) -> f64 {
        final_state_with(event, &self.pids)
            .map(|p| p.p)
            .sum::<FourVector>()
            .pt()
    }
}

/// Transverse mass of all final-state particles with the given absolute
/// PIDs
///
/// mT² = (Σ pT)² - |Σ p⃗T|²
#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct TransverseMass {
    pub pids: Vec<i32>,
}

impl TransverseMass {
    pub fn new(pids: impl Into<Vec<i32>>) -> Self {
        Self { pids: pids.into() }
    }
}

impl Observable<Event> for TransverseMass {
    fn value(&self, event: &Event) -> f64 {
        system_transverse_mass(final_state_with(event, &self.pids).map(|p| &p.p))
    }
}

fn system_transverse_mass<'a>(momenta: impl Iterator<Item = &'a FourVector>) -> f64 {
    let (mut sum_pt, mut px, mut py) = (0., 0., 0.);
    for p in momenta {
        sum_pt += p.pt();
        px += p.px();
        py += p.py();
    }
    (sum_pt * sum_pt - px * px - py * py).sqrt()
}

/// Transverse mass of a charged lepton and a neutrino
///
/// Returns `None` if either has vanishing transverse momentum.
pub fn transverse_mass(lepton: &FourVector, neutrino: &FourVector) -> Option<f64> {
    let norm = lepton.pt() * neutrino.pt();
    if norm == 0. {
        return None;
    }
    let cos_dphi = (lepton.px() * neutrino.px() + lepton.py() * neutrino.py()) / norm;
    Some((2. * norm * (1. - cos_dphi)).sqrt())
}

/// Transverse mass of the system of all leptons and neutrinos
pub fn wz_transverse_mass(objects: &SelectedObjects) -> f64 {
    let leptons = objects.get(Category::Lepton);
    let neutrinos = objects.get(Category::Neutrino);
    system_transverse_mass(leptons.iter().chain(neutrinos).map(|o| &o.p))
}

#[cfg(test)]
mod tests {
    use particle_id::ParticleID;

    use super::*;
    use crate::event::EventBuilder;
    use crate::object::PhysicsObject;
    use crate::particle::STATUS_FINAL;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9 * (1. + a.abs().max(b.abs()))
    }

    fn event() -> Event {
        let mut ev = EventBuilder::new();
        ev.add_particle(
            ParticleID::new(11),
            STATUS_FINAL,
            FourVector::from_components(50., 30., 40., 0.),
        );
        ev.add_particle(
            ParticleID::new(-12),
            STATUS_FINAL,
            FourVector::from_components(50., -30., -40., 0.),
        );
        ev.add_particle(
            ParticleID::new(22),
            STATUS_FINAL,
            FourVector::from_components(10., 0., 0., 10.),
        );
        ev.add_particle(
            ParticleID::new(11),
            2,
            FourVector::from_components(1000., 0., 0., 1000.),
        );
        ev.build()
    }

    #[test]
    fn invariant_mass() {
        let ev = event();
        assert!(approx_eq(InvariantMass::new([11, 12]).value(&ev), 100.));
        assert!(approx_eq(InvariantMass::new([11]).value(&ev), 0.));
    }

    #[test]
    fn transverse_momentum() {
        let ev = event();
        assert!(approx_eq(TransverseMomentum::new([11]).value(&ev), 50.));
        assert!(approx_eq(TransverseMomentum::new([11, 12]).value(&ev), 0.));
    }

    #[test]
    fn event_transverse_mass() {
        let ev = event();
        assert!(approx_eq(TransverseMass::new([11, 12]).value(&ev), 100.));
    }

    #[test]
    fn lepton_neutrino_transverse_mass() {
        let l = FourVector::from_pt_eta_phi_m(40., 0.3, 0., 0.);
        let nu = FourVector::from_pt_eta_phi_m(40., -1.2, std::f64::consts::PI, 0.);
        assert!(approx_eq(transverse_mass(&l, &nu).unwrap(), 80.));
        assert!(approx_eq(transverse_mass(&l, &l).unwrap(), 0.));
        assert_eq!(transverse_mass(&l, &FourVector::new()), None);
    }

    #[test]
    fn wz_system() {
        let mut objects = SelectedObjects::new();
        let l = |pid, pt, phi| {
            PhysicsObject::new(
                ParticleID::new(pid),
                FourVector::from_pt_eta_phi_m(pt, 0., phi, 0.),
            )
        };
        objects.push(Category::Lepton, l(11, 30., 0.));
        objects.push(Category::Lepton, l(-11, 30., std::f64::consts::PI));
        objects.push(Category::Neutrino, l(14, 20., 1.));
        objects.push(Category::Neutrino, l(-12, 20., 1. + std::f64::consts::PI));
        // all transverse momenta cancel
        assert!(approx_eq(wz_transverse_mass(&objects), 100.));
    }
}
