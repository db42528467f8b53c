//! WZ production in the fully leptonic channel (ATLAS, arXiv:1902.05759)
//!
//! Events with three prompt dressed leptons and one prompt neutrino. The
//! leptons are assigned to the Z and W bosons by maximising the product
//! of the boson propagators. The observable is the transverse mass of
//! the WZ system.
use log::trace;

use crate::analysis::EventAnalysis;
use crate::combine::Normalisation;
use crate::dressing::LeptonDresser;
use crate::event::Event;
use crate::histogram::{BinEdges, BinningError, HistogramSpec};
use crate::object::{Category, PhysicsObject, SelectedObjects};
use crate::observables::{transverse_mass, wz_transverse_mass};
use crate::particle::{is_light_lepton, is_light_neutrino, is_photon};
use crate::prompt::{AncestryError, PromptFinder};
use crate::resonance::{assign_wz, WZAssignment, MZ};
use crate::traits::Select;

/// Bin edges of the WZ transverse mass in GeV
pub const MT_WZ_BIN_EDGES: [f64; 7] = [0., 140., 180., 250., 450., 600., 1e11];

/// Default normalisation: every selected event counts once
pub const NORMALISATION: Normalisation = Normalisation::CrossSection;

const MIN_Z_LEPTON_PT: f64 = 15.;
const MIN_W_LEPTON_PT: f64 = 20.;
const MAX_LEPTON_ABS_ETA: f64 = 2.5;
const MAX_Z_MASS_WINDOW: f64 = 10.;
const MIN_W_TRANSVERSE_MASS: f64 = 30.;
const MIN_Z_LEPTON_DR: f64 = 0.2;
const MIN_ZW_LEPTON_DR: f64 = 0.3;

/// Selects prompt dressed leptons and prompt neutrinos
///
/// Both categories are sorted by decreasing transverse momentum.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WZSelection {
    dresser: LeptonDresser,
    prompt: PromptFinder,
}

impl WZSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dresser(mut self, dresser: LeptonDresser) -> Self {
        self.dresser = dresser;
        self
    }
}

impl Select<Event> for WZSelection {
    type Output = SelectedObjects;
    type Error = AncestryError;

    fn select(&mut self, event: Event) -> Result<SelectedObjects, AncestryError> {
        let mut leptons = Vec::new();
        let mut photons = Vec::new();
        let mut neutrinos = Vec::new();
        for particle in event.final_state() {
            if is_light_lepton(particle.pid) {
                leptons.push(PhysicsObject::from(particle));
            } else if is_photon(particle.pid) {
                photons.push(PhysicsObject::from(particle));
            } else if is_light_neutrino(particle.pid) {
                neutrinos.push(PhysicsObject::from(particle));
            }
        }
        let (leptons, _) = self.dresser.dress(leptons, photons);
        let (leptons, _) = self.prompt.classify(&event, leptons)?;
        let (neutrinos, _) = self.prompt.classify(&event, neutrinos)?;
        trace!(
            "Selected {} prompt leptons and {} prompt neutrinos",
            leptons.len(),
            neutrinos.len()
        );

        let mut objects = SelectedObjects::with_weight(event.weight());
        objects.insert(Category::Lepton, leptons);
        objects.insert(Category::Neutrino, neutrinos);
        objects.sort_by_pt();
        Ok(objects)
    }
}

/// Most resonant assignment of the selected leptons to the W and Z bosons
pub fn assignment(objects: &SelectedObjects) -> Option<WZAssignment> {
    assign_wz(objects.get(Category::Lepton), objects.get(Category::Neutrino))
}

fn with_assignment<F>(objects: &SelectedObjects, pass: F) -> bool
where
    F: Fn(&WZAssignment) -> bool,
{
    assignment(objects).is_some_and(|a| pass(&a))
}

/// The fiducial WZ selection
pub fn analysis() -> EventAnalysis<WZSelection, SelectedObjects> {
    EventAnalysis::new(WZSelection::new())
        .cut("three leptons, one neutrino", |o: &SelectedObjects| {
            o.len(Category::Lepton) == 3 && o.len(Category::Neutrino) == 1
        })
        .cut("resonance assignment", |o: &SelectedObjects| {
            assignment(o).is_some()
        })
        .cut("lepton pT", |o: &SelectedObjects| {
            with_assignment(o, |a| {
                a.z_leptons.iter().all(|l| l.p.pt() > MIN_Z_LEPTON_PT)
                    && a.w_leptons[0].p.pt() > MIN_W_LEPTON_PT
            })
        })
        .cut("lepton η", |o: &SelectedObjects| {
            with_assignment(o, |a| {
                a.z_leptons
                    .iter()
                    .chain(&a.w_leptons[..1])
                    .all(|l| l.p.abs_eta() < MAX_LEPTON_ABS_ETA)
            })
        })
        .cut("Z mass window", |o: &SelectedObjects| {
            with_assignment(o, |a| {
                let mz = (a.z_leptons[0].p + a.z_leptons[1].p).m();
                (mz - MZ).abs() <= MAX_Z_MASS_WINDOW
            })
        })
        .cut("W transverse mass", |o: &SelectedObjects| {
            with_assignment(o, |a| {
                let [lepton, neutrino] = &a.w_leptons;
                transverse_mass(&lepton.p, &neutrino.p)
                    .is_some_and(|mt| mt > MIN_W_TRANSVERSE_MASS)
            })
        })
        .cut("Z lepton separation", |o: &SelectedObjects| {
            with_assignment(o, |a| {
                let [l1, l2] = &a.z_leptons;
                l1.p.delta_r(&l2.p) > MIN_Z_LEPTON_DR
            })
        })
        .cut("W lepton separation", |o: &SelectedObjects| {
            with_assignment(o, |a| {
                let lw = &a.w_leptons[0];
                a.z_leptons
                    .iter()
                    .all(|lz| lz.p.delta_r(&lw.p) > MIN_ZW_LEPTON_DR)
            })
        })
}

/// Histogram of the WZ transverse mass
///
/// Events are weighted with their central weight only for
/// [Normalisation::EventWeights].
pub fn histogram(
    normalisation: Normalisation,
) -> Result<HistogramSpec<SelectedObjects>, BinningError> {
    let edges = BinEdges::try_from(MT_WZ_BIN_EDGES)?;
    let spec = HistogramSpec::new(edges, wz_transverse_mass);
    Ok(normalisation.weigh(spec, SelectedObjects::weight))
}
