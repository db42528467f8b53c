use std::f64::consts::PI;

use jetty::PseudoJet;
use noisy_float::prelude::*;
use serde::{Deserialize, Serialize};

/// A basic four-vector
///
/// The zero component is the energy/time component. The remainder are
/// the spatial components
#[derive(Deserialize, Serialize, PartialEq, Debug, Clone, Copy, Default)]
pub struct FourVector {
    p: [f64; 4],
}

impl FourVector {
    /// Construct a new four-vector
    pub fn new() -> Self {
        Self::default()
    }

    /// Construct a four-vector from energy and momentum components
    pub fn from_components(e: f64, px: f64, py: f64, pz: f64) -> Self {
        Self { p: [e, px, py, pz] }
    }

    /// Construct a four-vector from transverse momentum, pseudorapidity,
    /// azimuthal angle, and mass
    pub fn from_pt_eta_phi_m(pt: f64, eta: f64, phi: f64, m: f64) -> Self {
        let px = pt * phi.cos();
        let py = pt * phi.sin();
        let pz = pt * eta.sinh();
        let e = (px * px + py * py + pz * pz + m * m).sqrt();
        Self::from_components(e, px, py, pz)
    }

    pub fn e(&self) -> f64 {
        self.p[0]
    }

    pub fn px(&self) -> f64 {
        self.p[1]
    }

    pub fn py(&self) -> f64 {
        self.p[2]
    }

    pub fn pz(&self) -> f64 {
        self.p[3]
    }

    /// The spatial norm \sqrt{\sum v_i^2} with i = 1,2,3
    pub fn spatial_norm(&self) -> f64 {
        self.spatial_norm_sq().sqrt()
    }

    /// The square \sum v_i^2 with i = 1,2,3 of the spatial norm
    pub fn spatial_norm_sq(&self) -> f64 {
        self.p.iter().skip(1).map(|e| *e * *e).sum()
    }

    /// The square of the scalar transverse momentum
    pub fn pt2(&self) -> f64 {
        self.p[1] * self.p[1] + self.p[2] * self.p[2]
    }

    /// The scalar transverse momentum
    pub fn pt(&self) -> f64 {
        self.pt2().sqrt()
    }

    /// The invariant mass square v_0^2 - \sum v_i^2 with i = 1,2,3
    pub fn m_sq(&self) -> f64 {
        self.p[0] * self.p[0] - self.spatial_norm_sq()
    }

    /// The invariant mass \sqrt{v_0^2 - \sum v_i^2} with i = 1,2,3
    ///
    /// Spacelike vectors give NaN.
    pub fn m(&self) -> f64 {
        self.m_sq().sqrt()
    }

    /// The pseudorapidity asinh(p_z / p_T)
    pub fn eta(&self) -> f64 {
        (self.pz() / self.pt()).asinh()
    }

    pub fn abs_eta(&self) -> f64 {
        self.eta().abs()
    }

    /// The rapidity 1/2 ln((E + p_z) / (E - p_z))
    pub fn rap(&self) -> f64 {
        0.5 * ((self.e() + self.pz()) / (self.e() - self.pz())).ln()
    }

    /// The azimuthal angle in (-π, π]
    pub fn phi(&self) -> f64 {
        self.py().atan2(self.px())
    }

    /// Azimuthal angle difference, mapped into [-π, π]
    pub fn delta_phi(&self, other: &FourVector) -> f64 {
        let dphi = self.phi() - other.phi();
        if dphi > PI {
            dphi - 2. * PI
        } else if dphi < -PI {
            dphi + 2. * PI
        } else {
            dphi
        }
    }

    /// Angular distance \sqrt{Δη^2 + Δφ^2} based on the pseudorapidity
    pub fn delta_r(&self, other: &FourVector) -> f64 {
        let deta = self.eta() - other.eta();
        let dphi = self.delta_phi(other);
        (deta * deta + dphi * dphi).sqrt()
    }

    /// Transverse projection
    ///
    /// Drops the longitudinal momentum and sets the energy to the
    /// transverse momentum.
    pub fn transverse(&self) -> FourVector {
        Self::from_components(self.pt(), self.px(), self.py(), 0.)
    }

    const fn len() -> usize {
        4
    }
}

impl std::convert::From<[f64; 4]> for FourVector {
    fn from(p: [f64; 4]) -> FourVector {
        FourVector { p }
    }
}

impl std::ops::Index<usize> for FourVector {
    type Output = f64;

    fn index(&self, i: usize) -> &Self::Output {
        &self.p[i]
    }
}

impl std::ops::AddAssign for FourVector {
    fn add_assign(&mut self, rhs: FourVector) {
        for i in 0..Self::len() {
            self.p[i] += rhs[i]
        }
    }
}

impl std::ops::SubAssign for FourVector {
    fn sub_assign(&mut self, rhs: FourVector) {
        for i in 0..Self::len() {
            self.p[i] -= rhs[i]
        }
    }
}

impl std::ops::Add for FourVector {
    type Output = Self;

    fn add(mut self, rhs: FourVector) -> Self::Output {
        self += rhs;
        self
    }
}

impl std::ops::Sub for FourVector {
    type Output = Self;

    fn sub(mut self, rhs: FourVector) -> Self::Output {
        self -= rhs;
        self
    }
}

impl std::ops::Neg for FourVector {
    type Output = Self;

    fn neg(self) -> Self::Output {
        FourVector::default() - self
    }
}

impl std::iter::Sum for FourVector {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(FourVector::default(), std::ops::Add::add)
    }
}

impl<'a> std::iter::Sum<&'a FourVector> for FourVector {
    fn sum<I: Iterator<Item = &'a FourVector>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

impl From<PseudoJet> for FourVector {
    fn from(p: PseudoJet) -> Self {
        [p.e().raw(), p.px().raw(), p.py().raw(), p.pz().raw()].into()
    }
}

impl From<FourVector> for PseudoJet {
    fn from(p: FourVector) -> Self {
        (&p).into()
    }
}

impl From<&FourVector> for PseudoJet {
    fn from(p: &FourVector) -> Self {
        [n64(p[0]), n64(p[1]), n64(p[2]), n64(p[3])].into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-10;

    #[test]
    fn kinematics() {
        let p = FourVector::from_components(5., 3., 0., 4.);
        assert!((p.pt() - 3.).abs() < EPS);
        assert!(p.m().abs() < EPS);
        assert!((p.eta() - (4f64 / 3.).asinh()).abs() < EPS);
        assert!(p.phi().abs() < EPS);
    }

    #[test]
    fn spacelike_mass_is_nan() {
        let p = FourVector::from_components(1., 3., 0., 4.);
        assert!(p.m_sq() < 0.);
        assert!(p.m().is_nan());
    }

    #[test]
    fn delta_phi_wraps() {
        let a = FourVector::from_pt_eta_phi_m(1., 0., 3., 0.);
        let b = FourVector::from_pt_eta_phi_m(1., 0., -3., 0.);
        let dphi = a.delta_phi(&b);
        assert!((dphi - (6. - 2. * PI)).abs() < EPS);
        assert!((a.delta_r(&b) - dphi.abs()).abs() < EPS);
    }

    #[test]
    fn from_pt_eta_phi_m() {
        let p = FourVector::from_pt_eta_phi_m(40., 1.2, -0.7, 5.);
        assert!((p.pt() - 40.).abs() < EPS);
        assert!((p.eta() - 1.2).abs() < EPS);
        assert!((p.phi() + 0.7).abs() < EPS);
        assert!((p.m() - 5.).abs() < 1e-8);
    }

    #[test]
    fn sum() {
        let p = [
            FourVector::from_components(2., 1., 0., 0.),
            FourVector::from_components(2., -1., 0., 0.),
        ];
        let total: FourVector = p.iter().sum();
        assert_eq!(total, FourVector::from_components(4., 0., 0., 0.));
        assert_eq!(-total, FourVector::from_components(-4., 0., 0., 0.));
    }
}
