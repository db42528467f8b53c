//! WW production in the eμ channel (ATLAS, arXiv:2505.11310)
//!
//! Events with exactly one prompt electron and one prompt muon of
//! opposite charge, no further loose leptons, and no b-tagged jets. The
//! observable is the transverse mass of the eμ system together with the
//! missing transverse momentum.
use log::trace;

use crate::analysis::EventAnalysis;
use crate::combine::Normalisation;
use crate::dressing::LeptonDresser;
use crate::event::Event;
use crate::four_vector::FourVector;
use crate::histogram::{BinEdges, BinningError, HistogramSpec};
use crate::jets::{btag_closest, cluster, JetAlgorithm, JetDefinition, BTAG_MAX_DR};
use crate::object::{Category, PhysicsObject, SelectedObjects, PID_MET};
use crate::particle::{is_light_lepton, is_light_neutrino, is_photon, STATUS_HARD_OUTGOING};
use crate::prompt::{AncestryError, PromptFinder, PROMPT_CANDIDATE_PIDS};
use crate::traits::Select;

/// Bin edges of the eμ transverse mass in GeV
pub const MT_EMU_BIN_EDGES: [f64; 7] = [85., 200., 300., 450., 600., 1200., 1e9];

/// Default normalisation: every selected event counts once
pub const NORMALISATION: Normalisation = Normalisation::CrossSection;

const MAX_LEPTON_ABS_ETA: f64 = 2.5;
const MIN_PROMPT_LEPTON_PT: f64 = 27.;
const MIN_LOOSE_LEPTON_PT: f64 = 10.;
const MIN_BJET_PT: f64 = 20.;
const MAX_BJET_ABS_ETA: f64 = 2.5;
const MIN_JET_PT: f64 = 30.;
const MAX_JET_ABS_ETA: f64 = 4.5;
const MIN_DILEPTON_MASS: f64 = 85.;

const B_QUARK_PID: i32 = 5;

/// Jets used in the selection: anti-kt with R = 0.4 and pT > 20 GeV
pub const WW_JET_DEFINITION: JetDefinition = JetDefinition {
    algorithm: JetAlgorithm::AntiKt,
    radius: 0.4,
    min_pt: 20.,
};

/// Selects prompt and loose leptons, prompt neutrinos, jets, b-jets,
/// and the missing momentum
///
/// Jets are clustered from all final-state particles that are not
/// prompt together with the photons not used for lepton dressing. The
/// jet closest to the outgoing b quark of the hard process is b-tagged.
/// The missing momentum balances all selected leptons and jets.
#[derive(Clone, Debug, PartialEq)]
pub struct WWSelection {
    dresser: LeptonDresser,
    prompt: PromptFinder,
    jet_def: JetDefinition,
}

impl Default for WWSelection {
    fn default() -> Self {
        Self {
            dresser: LeptonDresser::default(),
            prompt: PromptFinder::with_candidates(&PROMPT_CANDIDATE_PIDS),
            jet_def: WW_JET_DEFINITION,
        }
    }
}

impl WWSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_jet_definition(mut self, jet_def: JetDefinition) -> Self {
        self.jet_def = jet_def;
        self
    }
}

fn lepton_category(lepton: &PhysicsObject) -> Option<Category> {
    let pt = lepton.p.pt();
    if lepton.p.abs_eta() > MAX_LEPTON_ABS_ETA {
        None
    } else if pt > MIN_PROMPT_LEPTON_PT {
        Some(Category::PromptLepton)
    } else if pt > MIN_LOOSE_LEPTON_PT {
        Some(Category::LooseLepton)
    } else {
        None
    }
}

fn jet_category(jet: &PhysicsObject) -> Option<Category> {
    let pt = jet.p.pt();
    let abs_eta = jet.p.abs_eta();
    if jet.is_btagged() && pt > MIN_BJET_PT && abs_eta < MAX_BJET_ABS_ETA {
        Some(Category::BJet)
    } else if pt > MIN_JET_PT && abs_eta < MAX_JET_ABS_ETA {
        Some(Category::Jet)
    } else {
        None
    }
}

impl Select<Event> for WWSelection {
    type Output = SelectedObjects;
    type Error = AncestryError;

    fn select(&mut self, event: Event) -> Result<SelectedObjects, AncestryError> {
        let final_state: Vec<_> =
            event.final_state().map(PhysicsObject::from).collect();
        let (prompt, non_prompt) = self.prompt.classify(&event, final_state)?;

        let mut objects = SelectedObjects::with_weight(event.weight());
        let mut leptons = Vec::new();
        let mut photons = Vec::new();
        for particle in prompt {
            if is_light_lepton(particle.pid) {
                leptons.push(particle);
            } else if is_photon(particle.pid) {
                photons.push(particle);
            } else if is_light_neutrino(particle.pid) {
                objects.push(Category::Neutrino, particle);
            }
        }

        let (leptons, photons) = self.dresser.dress(leptons, photons);
        for lepton in leptons {
            if let Some(cat) = lepton_category(&lepton) {
                objects.push(cat, lepton);
            }
        }

        let jet_inputs = non_prompt.iter().chain(&photons).map(|p| p.p);
        let mut jets = cluster(jet_inputs, &self.jet_def);
        let b_quark = event.particles().iter().find(|p| {
            p.abs_pid() == B_QUARK_PID && p.status == STATUS_HARD_OUTGOING
        });
        if let Some(b) = b_quark {
            let tagged = btag_closest(&mut jets, &b.p, BTAG_MAX_DR);
            trace!("b-tagged jet: {tagged:?}");
        }
        for jet in jets {
            if let Some(cat) = jet_category(&jet) {
                objects.push(cat, jet);
            }
        }

        let visible: FourVector = [
            Category::PromptLepton,
            Category::LooseLepton,
            Category::Jet,
            Category::BJet,
        ]
        .into_iter()
        .flat_map(|cat| objects.get(cat))
        .map(|o| o.p)
        .sum();
        objects.push(Category::MissingEnergy, PhysicsObject::new(PID_MET, -visible));
        Ok(objects)
    }
}

fn dilepton(objects: &SelectedObjects) -> FourVector {
    objects.get(Category::PromptLepton).iter().map(|l| l.p).sum()
}

/// Transverse mass of the eμ system and the missing momentum
///
/// NaN if the eμ system is spacelike.
pub fn emu_transverse_mass(objects: &SelectedObjects) -> f64 {
    let ll = dilepton(objects);
    let met = objects
        .get(Category::MissingEnergy)
        .first()
        .map(|m| m.p)
        .unwrap_or_default();
    let m_ll = ll.m();
    let et_ll = (m_ll * m_ll + ll.pt2()).sqrt();
    let et = met.pt() + et_ll;
    let pt = (met + ll).pt();
    (et * et - pt * pt).sqrt()
}

/// The fiducial WW selection
pub fn analysis() -> EventAnalysis<WWSelection, SelectedObjects> {
    EventAnalysis::new(WWSelection::new())
        .cut("two prompt leptons", |o: &SelectedObjects| {
            o.len(Category::PromptLepton) == 2
        })
        .cut("opposite charge, different flavour", |o: &SelectedObjects| {
            let leptons = o.get(Category::PromptLepton);
            let [l1, l2] = leptons else {
                return false;
            };
            l1.abs_pid() != l2.abs_pid() && l1.pid.id() * l2.pid.id() < 0
        })
        .cut("no loose leptons", |o: &SelectedObjects| {
            o.is_empty(Category::LooseLepton)
        })
        .cut("b-jet veto", |o: &SelectedObjects| o.is_empty(Category::BJet))
        .cut("dilepton mass", |o: &SelectedObjects| {
            dilepton(o).m() > MIN_DILEPTON_MASS
        })
}

/// Histogram of the eμ transverse mass
///
/// Events are weighted with their central weight only for
/// [Normalisation::EventWeights].
pub fn histogram(
    normalisation: Normalisation,
) -> Result<HistogramSpec<SelectedObjects>, BinningError> {
    let edges = BinEdges::try_from(MT_EMU_BIN_EDGES)?;
    let spec = HistogramSpec::new(edges, emu_transverse_mass);
    Ok(normalisation.weigh(spec, SelectedObjects::weight))
}

#[cfg(test)]
mod tests {
    use particle_id::ParticleID;

    use super::*;
    use crate::event::EventBuilder;
    use crate::particle::STATUS_FINAL;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9 * (1. + a.abs().max(b.abs()))
    }

    fn add(ev: &mut EventBuilder, pid: i32, pt: f64, eta: f64, phi: f64) -> usize {
        ev.add_particle(
            ParticleID::new(pid),
            STATUS_FINAL,
            FourVector::from_pt_eta_phi_m(pt, eta, phi, 0.),
        )
    }

    // e- and mu+ with neutrinos, two pions, and optionally an outgoing
    // b quark close to the second pion
    fn emu_event(with_b: bool) -> Event {
        let mut ev = EventBuilder::new();
        add(&mut ev, 11, 50., 0.3, 0.);
        add(&mut ev, -13, 60., -0.4, 2.5);
        add(&mut ev, -12, 30., 0.1, -2.5);
        add(&mut ev, 14, 30., 1.1, 0.5);
        add(&mut ev, 211, 40., 1., -2.);
        add(&mut ev, -211, 25., 0., -1.);
        if with_b {
            ev.add_particle(
                ParticleID::new(B_QUARK_PID),
                STATUS_HARD_OUTGOING,
                FourVector::from_pt_eta_phi_m(50., 0.05, -1.05, 4.7),
            );
        }
        ev.build()
    }

    #[test]
    fn select_objects() {
        let objects = WWSelection::new().select(emu_event(false)).unwrap();
        let leptons = objects.get(Category::PromptLepton);
        let pids: Vec<_> = leptons.iter().map(|l| l.pid.id()).collect();
        assert_eq!(pids, [11, -13]);
        assert_eq!(objects.len(Category::Neutrino), 2);
        assert!(objects.is_empty(Category::LooseLepton));
        // the softer pion fails the pT cut for untagged jets
        assert_eq!(objects.len(Category::Jet), 1);
        assert!(objects.is_empty(Category::BJet));

        let met = objects.get(Category::MissingEnergy);
        assert_eq!(met.len(), 1);
        let visible = leptons[0].p + leptons[1].p + objects.get(Category::Jet)[0].p;
        assert!(approx_eq(met[0].p.px(), -visible.px()));
        assert!(approx_eq(met[0].p.py(), -visible.py()));
    }

    #[test]
    fn btag() {
        let objects = WWSelection::new().select(emu_event(true)).unwrap();
        assert_eq!(objects.len(Category::Jet), 1);
        assert_eq!(objects.len(Category::BJet), 1);
        assert!(objects.get(Category::BJet)[0].is_btagged());
    }

    #[test]
    fn cuts() {
        let mut analysis = analysis();
        assert!(analysis.evaluate(emu_event(false)).unwrap().0);
        assert!(!analysis.evaluate(emu_event(true)).unwrap().0);
        let cutflow = analysis.take_cutflow();
        assert_eq!(cutflow.seen(), 2);
        let passed: Vec<_> = cutflow.passed().iter().map(|(_, n)| *n).collect();
        assert_eq!(passed, [2, 2, 2, 1, 1]);
    }

    #[test]
    fn loose_lepton_veto() {
        let mut ev = EventBuilder::new();
        add(&mut ev, 11, 50., 0.3, 0.);
        add(&mut ev, -13, 60., -0.4, 2.5);
        add(&mut ev, 13, 15., 0., 1.2);
        let (selected, objects) = analysis().evaluate(ev.build()).unwrap();
        assert!(!selected);
        assert_eq!(objects.len(Category::LooseLepton), 1);
    }

    #[test]
    fn same_flavour() {
        let mut ev = EventBuilder::new();
        add(&mut ev, 11, 50., 0.3, 0.);
        add(&mut ev, -11, 60., -0.4, 2.5);
        assert!(!analysis().evaluate(ev.build()).unwrap().0);
    }

    #[test]
    fn transverse_mass() {
        let mut objects = SelectedObjects::new();
        for phi in [0., std::f64::consts::PI] {
            objects.push(
                Category::PromptLepton,
                PhysicsObject::new(
                    ParticleID::new(11),
                    FourVector::from_pt_eta_phi_m(40., 0., phi, 0.),
                ),
            );
        }
        objects.push(
            Category::MissingEnergy,
            PhysicsObject::new(PID_MET, FourVector::from_components(30., 30., 0., 0.)),
        );
        let expected = (110f64.powi(2) - 30f64.powi(2)).sqrt();
        assert!((emu_transverse_mass(&objects) - expected).abs() < 1e-9);
    }

    #[test]
    fn spacelike_dilepton() {
        let mut objects = SelectedObjects::new();
        objects.push(
            Category::PromptLepton,
            PhysicsObject::new(
                ParticleID::new(11),
                FourVector::from_components(10., 30., 0., 0.),
            ),
        );
        objects.push(
            Category::MissingEnergy,
            PhysicsObject::new(PID_MET, FourVector::from_components(5., 5., 0., 0.)),
        );
        assert!(emu_transverse_mass(&objects).is_nan());
    }

    #[test]
    fn unit_weight() {
        use std::convert::Infallible;

        use crate::event_loop::EventLoop;

        let events = [emu_event(false), emu_event(false)].map(|mut ev| {
            ev.set_weights(vec![7.5], Default::default());
            Ok::<_, Infallible>(ev)
        });
        let event_loop = EventLoop::new(histogram(NORMALISATION).unwrap());
        let (hist, n) = event_loop.analyse_events(events, &mut analysis()).unwrap();
        assert_eq!(n, 2);
        assert_eq!(hist.bins().unwrap().values().iter().sum::<f64>(), 2.);
    }
}
