//! WW production in the eμ channel from detector-level objects (CMS,
//! arXiv:2009.00119)
//!
//! Works on LHCO events. The observable is the invariant mass of the
//! electron-muon pair.
use std::convert::Infallible;
use std::f64::consts::FRAC_PI_2;

use crate::analysis::EventAnalysis;
use crate::combine::Normalisation;
use crate::event::Event;
use crate::four_vector::FourVector;
use crate::histogram::{BinEdges, BinningError, HistogramSpec};
use crate::object::{Category, PhysicsObject, SelectedObjects, PID_JET, PID_MET};
use crate::traits::Select;

/// Bin edges of the dilepton invariant mass in GeV
pub const MLL_BIN_EDGES: [f64; 12] = [
    100., 200., 300., 400., 500., 600., 700., 750., 800., 850., 1000., 1e14,
];

/// Default normalisation: every selected event counts once
pub const NORMALISATION: Normalisation = Normalisation::CrossSection;

const MIN_LEPTON_PT: f64 = 10.;
const MAX_ELECTRON_BARREL_ABS_ETA: f64 = 1.479;
const MIN_ELECTRON_ENDCAP_ABS_ETA: f64 = 1.566;
const MAX_ELECTRON_ABS_ETA: f64 = 2.5;
const MAX_MUON_ABS_ETA: f64 = 2.4;
const MIN_JET_PT: f64 = 30.;
const MAX_JET_ABS_ETA: f64 = 4.7;
const MIN_JET_LEPTON_DR: f64 = 0.4;

const MIN_LEADING_PT: f64 = 25.;
const MIN_SUBLEADING_PT: f64 = 20.;
const MIN_MET: f64 = 20.;
const MIN_DILEPTON_MASS: f64 = 20.;
const MIN_DILEPTON_PT: f64 = 30.;
const MIN_PROJECTED_MET: f64 = 20.;

const PID_ELECTRON: i32 = 11;
const PID_MUON: i32 = 13;

// electrons in the barrel-endcap transition region are dropped
fn accept_electron(electron: &PhysicsObject) -> bool {
    let abs_eta = electron.p.abs_eta();
    electron.p.pt() > MIN_LEPTON_PT
        && (abs_eta < MAX_ELECTRON_BARREL_ABS_ETA
            || (MIN_ELECTRON_ENDCAP_ABS_ETA < abs_eta && abs_eta < MAX_ELECTRON_ABS_ETA))
}

fn accept_muon(muon: &PhysicsObject) -> bool {
    muon.p.pt() > MIN_LEPTON_PT && muon.p.abs_eta() < MAX_MUON_ABS_ETA
}

/// Selects leptons, jets, and missing energy from reconstructed objects
///
/// Electrons precede muons in [Category::Lepton]. b-tagged jets are
/// always kept so that events containing them can be vetoed. Other jets
/// need pT ≥ 30 GeV, |η| ≤ 4.7, and a distance of at least 0.4 in ΔR
/// to every selected lepton.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct CMSWWSelection;

impl CMSWWSelection {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Select<Event> for CMSWWSelection {
    type Output = SelectedObjects;
    type Error = Infallible;

    fn select(&mut self, event: Event) -> Result<SelectedObjects, Infallible> {
        let objects: Vec<_> = event.final_state().map(PhysicsObject::from).collect();
        let of_type = |abs_pid: i32| {
            objects
                .iter()
                .filter(move |o| o.abs_pid() == abs_pid)
                .copied()
        };

        let mut selected = SelectedObjects::with_weight(event.weight());
        let electrons = of_type(PID_ELECTRON).filter(accept_electron);
        let muons = of_type(PID_MUON).filter(accept_muon);
        selected.extend(Category::Lepton, electrons.chain(muons));
        selected.extend(
            Category::MissingEnergy,
            objects.iter().filter(|o| o.pid == PID_MET).copied(),
        );

        let leptons = selected.get(Category::Lepton);
        let jets: Vec<_> = objects
            .iter()
            .filter(|o| o.pid == PID_JET)
            .filter(|jet| {
                jet.is_btagged()
                    || (jet.p.pt() >= MIN_JET_PT
                        && jet.p.abs_eta() <= MAX_JET_ABS_ETA
                        && leptons
                            .iter()
                            .all(|l| jet.p.delta_r(&l.p) >= MIN_JET_LEPTON_DR))
            })
            .copied()
            .collect();
        selected.extend(Category::Jet, jets);
        Ok(selected)
    }
}

fn dilepton(objects: &SelectedObjects) -> FourVector {
    objects.get(Category::Lepton).iter().map(|l| l.p).sum()
}

fn missing_energy(objects: &SelectedObjects) -> Option<&PhysicsObject> {
    objects.get(Category::MissingEnergy).first()
}

/// Missing transverse momentum projected away from the closest lepton
///
/// If the lepton closest to the missing momentum in ΔR is more than
/// π/2 away in azimuth, this is the full missing momentum. Otherwise
/// it is the component perpendicular to the lepton's transverse
/// direction. `None` without missing momentum or leptons.
pub fn projected_met(objects: &SelectedObjects) -> Option<f64> {
    let met = missing_energy(objects)?.p;
    let mut leptons = objects.get(Category::Lepton).iter();
    let mut closest = leptons.next()?;
    let mut min_dr = met.delta_r(&closest.p);
    for lepton in leptons {
        let dr = met.delta_r(&lepton.p);
        if dr < min_dr {
            min_dr = dr;
            closest = lepton;
        }
    }
    if met.delta_phi(&closest.p).abs() > FRAC_PI_2 {
        return Some(met.spatial_norm());
    }
    let lepton_pt = closest.p.pt();
    let along = if lepton_pt > 0. {
        (met.px() * closest.p.px() + met.py() * closest.p.py()) / lepton_pt
    } else {
        0.
    };
    let perp_sq = met.spatial_norm_sq() - along * along;
    Some(perp_sq.max(0.).sqrt())
}

/// Invariant mass of the electron-muon pair
pub fn dilepton_mass(objects: &SelectedObjects) -> f64 {
    dilepton(objects).m()
}

/// The selection
pub fn analysis() -> EventAnalysis<CMSWWSelection, SelectedObjects> {
    EventAnalysis::new(CMSWWSelection::new())
        .cut("opposite-sign eμ pair", |o: &SelectedObjects| {
            let [l1, l2] = o.get(Category::Lepton) else {
                return false;
            };
            l1.abs_pid() == PID_ELECTRON
                && l2.abs_pid() == PID_MUON
                && l1.pid.id() * l2.pid.id() < 0
        })
        .cut("lepton pT", |o: &SelectedObjects| {
            let [l1, l2] = o.get(Category::Lepton) else {
                return false;
            };
            let (pt1, pt2) = (l1.p.pt(), l2.p.pt());
            pt1.max(pt2) > MIN_LEADING_PT && pt1.min(pt2) > MIN_SUBLEADING_PT
        })
        .cut("missing energy", |o: &SelectedObjects| {
            missing_energy(o).is_some_and(|met| met.p.pt() > MIN_MET)
        })
        .cut("dilepton mass and pT", |o: &SelectedObjects| {
            let ll = dilepton(o);
            ll.m() > MIN_DILEPTON_MASS && ll.pt() > MIN_DILEPTON_PT
        })
        .cut("b-jet veto", |o: &SelectedObjects| {
            !o.get(Category::Jet).iter().any(PhysicsObject::is_btagged)
        })
        .cut("at most one jet", |o: &SelectedObjects| o.len(Category::Jet) < 2)
        .cut("projected missing energy", |o: &SelectedObjects| {
            projected_met(o).is_some_and(|met| met > MIN_PROJECTED_MET)
        })
}

/// Histogram of the dilepton invariant mass
pub fn histogram(
    normalisation: Normalisation,
) -> Result<HistogramSpec<SelectedObjects>, BinningError> {
    let edges = BinEdges::try_from(MLL_BIN_EDGES)?;
    let spec = HistogramSpec::new(edges, dilepton_mass);
    Ok(normalisation.weigh(spec, SelectedObjects::weight))
}
