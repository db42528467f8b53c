use log::trace;
use serde::{Deserialize, Serialize};

use crate::object::PhysicsObject;

/// Default cone radius for lepton dressing
pub const DEFAULT_DRESSING_RADIUS: f64 = 0.1;

/// Adds the momenta of nearby photons to leptons
///
/// Leptons are processed in the order in which they are passed. Each
/// lepton absorbs all photons that are still unclaimed and closer than
/// the dressing radius in ΔR. A photon is absorbed by at most one
/// lepton.
#[derive(Deserialize, Serialize, Copy, Clone, Debug, PartialEq)]
pub struct LeptonDresser {
    radius: f64,
}

impl Default for LeptonDresser {
    fn default() -> Self {
        Self::new(DEFAULT_DRESSING_RADIUS)
    }
}

impl LeptonDresser {
    pub fn new(radius: f64) -> Self {
        Self { radius }
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Dress all `leptons`
    ///
    /// Returns the dressed leptons in input order and the photons
    /// that were not absorbed by any lepton.
    pub fn dress(
        &self,
        leptons: Vec<PhysicsObject>,
        mut photons: Vec<PhysicsObject>,
    ) -> (Vec<PhysicsObject>, Vec<PhysicsObject>) {
        let mut dressed = Vec::with_capacity(leptons.len());
        for lepton in leptons {
            let (dressed_lepton, remaining) = self.dress_lepton(lepton, photons);
            dressed.push(dressed_lepton);
            photons = remaining;
        }
        (dressed, photons)
    }

    /// Dress a single lepton
    ///
    /// Returns the dressed lepton and the remaining photons.
    pub fn dress_lepton(
        &self,
        mut lepton: PhysicsObject,
        photons: Vec<PhysicsObject>,
    ) -> (PhysicsObject, Vec<PhysicsObject>) {
        let bare = lepton.p;
        let (absorbed, remaining): (Vec<_>, Vec<_>) = photons
            .into_iter()
            .partition(|photon| bare.delta_r(&photon.p) < self.radius);
        trace!("Dressing lepton with {} photons", absorbed.len());
        for photon in absorbed {
            lepton.p += photon.p;
        }
        (lepton, remaining)
    }
}

#[cfg(test)]
mod tests {
    use particle_id::ParticleID;

    use super::*;
    use crate::four_vector::FourVector;

    fn lepton(pt: f64, eta: f64, phi: f64) -> PhysicsObject {
        let mut l = PhysicsObject::new(
            ParticleID::new(11),
            FourVector::from_pt_eta_phi_m(pt, eta, phi, 0.),
        );
        l.origin = Some(0);
        l
    }

    fn photon(pt: f64, eta: f64, phi: f64) -> PhysicsObject {
        PhysicsObject::new(
            ParticleID::new(22),
            FourVector::from_pt_eta_phi_m(pt, eta, phi, 0.),
        )
    }

    #[test]
    fn no_photons() {
        let leptons = vec![lepton(40., 0.1, 0.2), lepton(20., -1., 2.)];
        let (dressed, remaining) =
            LeptonDresser::default().dress(leptons.clone(), vec![]);
        assert_eq!(dressed, leptons);
        assert!(remaining.is_empty());
    }

    #[test]
    fn remaining_photons_unchanged() {
        let leptons = vec![lepton(40., 0.1, 0.2)];
        let photons = vec![photon(5., 2., -2.), photon(3., -2., 1.)];
        let (dressed, remaining) =
            LeptonDresser::default().dress(leptons.clone(), photons.clone());
        assert_eq!(dressed, leptons);
        assert_eq!(remaining, photons);
    }

    #[test]
    fn photon_exclusivity() {
        let first = lepton(40., 0., 0.);
        let second = lepton(30., 0., 0.06);
        let gamma = photon(5., 0., 0.03);
        let (dressed, remaining) = LeptonDresser::new(0.1)
            .dress(vec![first, second], vec![gamma]);
        assert!(remaining.is_empty());
        assert_eq!(dressed[0].p, first.p + gamma.p);
        assert_eq!(dressed[1], second);
        assert_eq!(dressed[0].origin, first.origin);
    }

    #[test]
    fn each_lepton_dressed() {
        let leptons = vec![lepton(40., 0., 0.), lepton(30., 1., 2.)];
        let photons = vec![
            photon(4., 1.02, 2.),
            photon(5., 0., 0.05),
            photon(6., -2., -2.),
        ];
        let (dressed, remaining) =
            LeptonDresser::default().dress(leptons.clone(), photons.clone());
        assert_eq!(dressed.len(), 2);
        assert_eq!(dressed[0].p, leptons[0].p + photons[1].p);
        assert_eq!(dressed[1].p, leptons[1].p + photons[0].p);
        assert_eq!(remaining, [photons[2]]);
    }

    #[test]
    fn non_positive_radius() {
        let leptons = vec![lepton(40., 0., 0.)];
        let photons = vec![photon(5., 0., 0.)];
        let (dressed, remaining) =
            LeptonDresser::new(0.).dress(leptons.clone(), photons.clone());
        assert_eq!(dressed, leptons);
        assert_eq!(remaining, photons);
    }
}
