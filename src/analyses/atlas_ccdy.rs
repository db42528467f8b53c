//! Charged-current Drell-Yan at particle level (ATLAS, arXiv:2502.21088)
//!
//! The hardest dressed charged lepton and the hardest neutrino of the
//! final state form the W candidate. The observable is their transverse
//! mass.
use std::convert::Infallible;

use crate::analysis::EventAnalysis;
use crate::combine::Normalisation;
use crate::dressing::LeptonDresser;
use crate::event::Event;
use crate::histogram::{BinEdges, BinningError, HistogramSpec};
use crate::object::{sort_by_pt, Category, PhysicsObject, SelectedObjects};
use crate::observables::transverse_mass;
use crate::particle::{is_light_lepton, is_light_neutrino, is_photon};
use crate::traits::Select;

/// Bin edges of the transverse mass in GeV
pub const MT_BIN_EDGES: [f64; 13] = [
    200., 250., 300., 350., 425., 500., 600., 750., 900., 1100., 1400., 2000.,
    5000.,
];

/// Default normalisation: every selected event counts once
pub const NORMALISATION: Normalisation = Normalisation::CrossSection;

/// Cone radius for dressing the charged lepton
pub const CCDY_DRESSING_RADIUS: f64 = 0.1;

const MIN_LEPTON_PT: f64 = 65.;
const MAX_LEPTON_ABS_ETA: f64 = 2.4;
const MIN_NEUTRINO_PT: f64 = 85.;

/// Selects the hardest dressed lepton and the hardest neutrino
///
/// All final-state electrons, muons, and photons take part in the
/// dressing, regardless of their origin.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CCDYSelection {
    dresser: LeptonDresser,
}

impl Default for CCDYSelection {
    fn default() -> Self {
        Self {
            dresser: LeptonDresser::new(CCDY_DRESSING_RADIUS),
        }
    }
}

impl CCDYSelection {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Select<Event> for CCDYSelection {
    type Output = SelectedObjects;
    type Error = Infallible;

    fn select(&mut self, event: Event) -> Result<SelectedObjects, Infallible> {
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
        sort_by_pt(&mut leptons);
        sort_by_pt(&mut photons);
        sort_by_pt(&mut neutrinos);

        let (leptons, _) = self.dresser.dress(leptons, photons);
        let mut objects = SelectedObjects::with_weight(event.weight());
        objects.extend(Category::Lepton, leptons.into_iter().take(1));
        objects.extend(Category::Neutrino, neutrinos.into_iter().take(1));
        Ok(objects)
    }
}

fn lepton(objects: &SelectedObjects) -> Option<&PhysicsObject> {
    objects.get(Category::Lepton).first()
}

fn neutrino(objects: &SelectedObjects) -> Option<&PhysicsObject> {
    objects.get(Category::Neutrino).first()
}

/// Transverse mass of the selected lepton and neutrino
///
/// NaN if either of them is missing or has no transverse momentum.
pub fn lepton_neutrino_transverse_mass(objects: &SelectedObjects) -> f64 {
    match (lepton(objects), neutrino(objects)) {
        (Some(l), Some(nu)) => transverse_mass(&l.p, &nu.p).unwrap_or(f64::NAN),
        _ => f64::NAN,
    }
}

/// The fiducial selection
pub fn analysis() -> EventAnalysis<CCDYSelection, SelectedObjects> {
    EventAnalysis::new(CCDYSelection::new())
        .cut("lepton and its neutrino", |o: &SelectedObjects| {
            let (Some(l), Some(nu)) = (lepton(o), neutrino(o)) else {
                return false;
            };
            (l.abs_pid() - nu.abs_pid()).abs() <= 1 && l.pid.id() * nu.pid.id() < 0
        })
        .cut("lepton pT and η", |o: &SelectedObjects| {
            lepton(o).is_some_and(|l| {
                l.p.pt() > MIN_LEPTON_PT && l.p.abs_eta() < MAX_LEPTON_ABS_ETA
            })
        })
        .cut("neutrino pT", |o: &SelectedObjects| {
            neutrino(o).is_some_and(|nu| nu.p.pt() > MIN_NEUTRINO_PT)
        })
}

/// Histogram of the lepton-neutrino transverse mass
///
/// The bin contents are integrated over each bin.
pub fn histogram(
    normalisation: Normalisation,
) -> Result<HistogramSpec<SelectedObjects>, BinningError> {
    let edges = BinEdges::try_from(MT_BIN_EDGES)?;
    let spec = HistogramSpec::new(edges, lepton_neutrino_transverse_mass);
    Ok(normalisation.weigh(spec, SelectedObjects::weight))
}

#[cfg(test)]
mod tests {
    use particle_id::ParticleID;

    use super::*;
    use crate::event::EventBuilder;
    use crate::event_loop::EventLoop;
    use crate::four_vector::FourVector;
    use crate::particle::STATUS_FINAL;

    fn add(ev: &mut EventBuilder, pid: i32, pt: f64, eta: f64, phi: f64) -> usize {
        ev.add_particle(
            ParticleID::new(pid),
            STATUS_FINAL,
            FourVector::from_pt_eta_phi_m(pt, eta, phi, 0.),
        )
    }

    // back-to-back e- and anti-neutrino with mT = 2 * pt
    fn w_event(lepton_pt: f64, neutrino_pt: f64) -> Event {
        let mut ev = EventBuilder::new();
        add(&mut ev, 11, lepton_pt, 0.5, 0.);
        add(&mut ev, -12, neutrino_pt, -0.2, std::f64::consts::PI);
        ev.build()
    }

    #[test]
    fn select_hardest() {
        let mut ev = EventBuilder::new();
        add(&mut ev, 13, 20., 1., 1.);
        add(&mut ev, 11, 100., 0.5, 0.);
        add(&mut ev, 22, 5., 0.55, 0.);
        add(&mut ev, 22, 5., -2., 0.);
        add(&mut ev, -14, 30., 0., 2.);
        add(&mut ev, -12, 90., 0., 3.);
        add(&mut ev, 211, 200., 0., -1.);
        let objects = CCDYSelection::new().select(ev.build()).unwrap();

        let leptons = objects.get(Category::Lepton);
        assert_eq!(leptons.len(), 1);
        assert_eq!(leptons[0].pid.id(), 11);
        // dressed with the close photon only
        assert!((leptons[0].p.pt() - 105.).abs() < 1e-6);

        let neutrinos = objects.get(Category::Neutrino);
        assert_eq!(neutrinos.len(), 1);
        assert_eq!(neutrinos[0].pid.id(), -12);
    }

    #[test]
    fn cuts() {
        let mut analysis = analysis();
        assert!(analysis.evaluate(w_event(100., 100.)).unwrap().0);
        assert!(!analysis.evaluate(w_event(60., 100.)).unwrap().0);
        assert!(!analysis.evaluate(w_event(100., 80.)).unwrap().0);

        let mut ev = EventBuilder::new();
        add(&mut ev, 11, 100., 0.5, 0.);
        add(&mut ev, 12, 100., 0., 3.);
        assert!(!analysis.evaluate(ev.build()).unwrap().0);

        let mut ev = EventBuilder::new();
        add(&mut ev, 11, 100., 0.5, 0.);
        assert!(!analysis.evaluate(ev.build()).unwrap().0);

        let cutflow = analysis.take_cutflow();
        assert_eq!(cutflow.seen(), 5);
        let passed: Vec<_> = cutflow.passed().iter().map(|(_, n)| *n).collect();
        assert_eq!(passed, [3, 2, 1]);
    }

    #[test]
    fn muon_channel() {
        let mut ev = EventBuilder::new();
        add(&mut ev, -13, 100., 0.5, 0.);
        add(&mut ev, 14, 100., 0., 3.);
        assert!(analysis().evaluate(ev.build()).unwrap().0);
    }

    #[test]
    fn fill() {
        let event_loop = EventLoop::new(histogram(NORMALISATION).unwrap());
        let events = [w_event(110., 110.), w_event(290., 290.), w_event(100., 50.)];
        let (hist, n) = event_loop
            .analyse_events(events.map(Ok::<_, Infallible>), &mut analysis())
            .unwrap();
        assert_eq!(n, 3);
        let bins = hist.bins().unwrap();
        // mT = 220 and 580 GeV
        assert_eq!(bins[0], 1.);
        assert_eq!(bins[5], 1.);
        assert_eq!(bins.values().iter().sum::<f64>(), 2.);
    }

    #[test]
    fn missing_neutrino() {
        let objects: SelectedObjects = [(
            Category::Lepton,
            PhysicsObject::new(
                ParticleID::new(11),
                FourVector::from_pt_eta_phi_m(100., 0., 0., 0.),
            ),
        )]
        .into_iter()
        .collect();
        assert!(lepton_neutrino_transverse_mass(&objects).is_nan());
    }
}
