use itertools::Itertools;
use log::trace;

use crate::object::PhysicsObject;

/// Z boson pole mass in GeV
pub const MZ: f64 = 91.1876;
/// Z boson width in GeV
pub const GAMMA_Z: f64 = 2.4952;
/// W boson pole mass in GeV
pub const MW: f64 = 80.385;
/// W boson width in GeV
pub const GAMMA_W: f64 = 2.085;

/// Squared relativistic Breit-Wigner propagator
///
/// 1 / ((m^2 - M^2)^2 + (M Γ)^2)
pub fn breit_wigner(m: f64, mass: f64, width: f64) -> f64 {
    let off_shell = m * m - mass * mass;
    let mw = mass * width;
    1. / (off_shell * off_shell + mw * mw)
}

/// Assignment of leptons to a Z and a W boson
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct WZAssignment {
    /// The opposite-sign same-flavour pair from the Z decay
    pub z_leptons: [PhysicsObject; 2],
    /// The charged lepton and the neutrino from the W decay
    pub w_leptons: [PhysicsObject; 2],
    /// Product of the Z and W propagators
    pub score: f64,
}

/// Whether two leptons form an opposite-sign same-flavour pair
pub fn is_ossf(l1: &PhysicsObject, l2: &PhysicsObject) -> bool {
    l1.pid.id() == -l2.pid.id()
}

/// Whether a charged lepton and a neutrino can come from the same W decay
fn is_w_pair(lepton: &PhysicsObject, neutrino: &PhysicsObject) -> bool {
    lepton.abs_pid() + 1 == neutrino.abs_pid()
        && lepton.pid.id() * neutrino.pid.id() < 0
}

/// Find the most resonant assignment of leptons to a Z and a W boson
///
/// Each opposite-sign same-flavour lepton pair is a Z candidate. The
/// first remaining lepton together with the first neutrino is the
/// corresponding W candidate. Among all valid candidates, the one with
/// the largest product of Breit-Wigner propagators is chosen. For equal
/// products the candidate found first wins.
///
/// Returns `None` if there is no valid assignment.
pub fn assign_wz(
    leptons: &[PhysicsObject],
    neutrinos: &[PhysicsObject],
) -> Option<WZAssignment> {
    let nu = neutrinos.first()?;
    let mut best: Option<WZAssignment> = None;
    let mut best_score = 0.;
    for ((i, l1), (j, l2)) in leptons.iter().enumerate().tuple_combinations() {
        if !is_ossf(l1, l2) {
            continue;
        }
        let Some(lw) = leptons
            .iter()
            .enumerate()
            .find_map(|(k, l)| if k != i && k != j { Some(l) } else { None })
        else {
            continue;
        };
        if !is_w_pair(lw, nu) {
            continue;
        }
        let mz = (l1.p + l2.p).m();
        let mw = (lw.p + nu.p).m();
        let score = breit_wigner(mz, MZ, GAMMA_Z) * breit_wigner(mw, MW, GAMMA_W);
        trace!("Z candidate ({i}, {j}): m_Z = {mz}, m_W = {mw}, score {score}");
        if score > best_score {
            best_score = score;
            best = Some(WZAssignment {
                z_leptons: [*l1, *l2],
                w_leptons: [*lw, *nu],
                score,
            });
        }
    }
    best
}
