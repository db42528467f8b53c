//! Drell-Yan lepton pair production at parton level
//!
//! Works directly on the final-state particles of Les Houches events
//! without any object reconstruction.
use crate::analysis::EventAnalysis;
use crate::combine::Normalisation;
use crate::event::Event;
use crate::histogram::{BinEdges, BinningError, Histogram, HistogramSpec, WeightedHistograms};
use crate::observables::{InvariantMass, TransverseMass};
use crate::traits::{NoSelection, NO_SELECTION};

/// Absolute PIDs of the particles forming the lepton pair
pub const LEPTON_PAIR_PIDS: [i32; 2] = [11, 12];

/// Bin edges of the charged-current transverse mass in GeV
pub const CC_MT_BIN_EDGES: [f64; 9] =
    [500., 750., 1000., 1250., 1500., 2000., 3000., 3500., 1e6];

/// Default normalisation of the invariant mass: every event counts once
pub const MASS_NORMALISATION: Normalisation = Normalisation::CrossSection;

/// Default normalisation of the charged-current transverse mass: the
/// event weights of the generator are in pb
pub const CHARGED_CURRENT_NORMALISATION: Normalisation = Normalisation::EventWeights;

const MIN_ELECTRON_PT: f64 = 20.;
const MAX_ELECTRON_ABS_ETA: f64 = 2.5;

/// Lepton pair invariant mass without any cuts
pub fn mass_analysis() -> EventAnalysis<NoSelection, Event> {
    EventAnalysis::new(NO_SELECTION)
}

/// Invariant mass of the lepton pair in 200 GeV bins up to 7.2 TeV
pub fn mass_histogram(
    normalisation: Normalisation,
) -> Result<HistogramSpec<Event>, BinningError> {
    let edges = BinEdges::range(0., 7200., 200.)?;
    let spec = HistogramSpec::new(edges, InvariantMass::new(LEPTON_PAIR_PIDS));
    Ok(normalisation.weigh(spec, Event::weight))
}

/// Charged-current Drell-Yan: all final-state electrons must be
/// central and hard
pub fn charged_current_analysis() -> EventAnalysis<NoSelection, Event> {
    EventAnalysis::new(NO_SELECTION).cut("electron pT and η", |event: &Event| {
        event
            .final_state()
            .filter(|p| p.abs_pid() == 11)
            .all(|e| e.p.pt() > MIN_ELECTRON_PT && e.p.abs_eta() < MAX_ELECTRON_ABS_ETA)
    })
}

/// Transverse mass of the electron-neutrino pair
///
/// Without `weight_names` the event weight follows `normalisation`.
/// Otherwise there is one histogram per named weight, which only makes
/// sense with [Normalisation::EventWeights].
pub fn charged_current_histogram(
    weight_names: &[String],
    normalisation: Normalisation,
) -> Result<Histogram<Event>, BinningError> {
    let edges = BinEdges::try_from(CC_MT_BIN_EDGES)?;
    let observable = TransverseMass::new(LEPTON_PAIR_PIDS);
    let hist = if weight_names.is_empty() {
        let spec = HistogramSpec::new(edges, observable);
        normalisation.weigh(spec, Event::weight).into()
    } else {
        WeightedHistograms::new(
            edges,
            observable,
            Event::named_weights,
            weight_names.iter().cloned(),
        )
        .into()
    };
    Ok(hist)
}

#[cfg(test)]
mod tests {
    use std::convert::Infallible;
    use std::sync::Arc;

    use particle_id::ParticleID;

    use super::*;
    use crate::event::EventBuilder;
    use crate::event_loop::EventLoop;
    use crate::four_vector::FourVector;
    use crate::particle::{STATUS_BEAM, STATUS_FINAL};

    // e- and anti-nu_e with transverse momenta `pt` back to back
    fn cc_event(pt: f64, eta: f64, weights: &[f64]) -> Event {
        let mut ev = EventBuilder::new();
        ev.add_particle(
            ParticleID::new(1),
            STATUS_BEAM,
            FourVector::from_components(3000., 0., 0., 3000.),
        );
        ev.add_particle(
            ParticleID::new(11),
            STATUS_FINAL,
            FourVector::from_pt_eta_phi_m(pt, eta, 0., 0.),
        );
        ev.add_particle(
            ParticleID::new(-12),
            STATUS_FINAL,
            FourVector::from_pt_eta_phi_m(pt, -eta, std::f64::consts::PI, 0.),
        );
        for w in weights {
            ev.add_weight(*w);
        }
        let names = ["XWGTUP", "SM", "cW"].map(String::from).to_vec();
        ev.weight_names(Arc::new(names));
        ev.build()
    }

    #[test]
    fn mass() {
        let event_loop = EventLoop::new(mass_histogram(MASS_NORMALISATION).unwrap());
        // m = 2 pt cosh(eta) for the back-to-back pair
        let events = [cc_event(150., 0., &[]), cc_event(150., 1., &[]), cc_event(5000., 0., &[])];
        let (hist, n) = event_loop
            .analyse_events(events.map(Ok::<_, Infallible>), &mut mass_analysis())
            .unwrap();
        assert_eq!(n, 3);
        let bins = hist.bins().unwrap();
        assert_eq!(bins.len(), 35);
        assert_eq!(bins[1], 1.);
        assert_eq!(bins[2], 1.);
        assert_eq!(bins.values().iter().sum::<f64>(), 2.);
    }

    #[test]
    fn electron_cuts() {
        let mut analysis = charged_current_analysis();
        assert!(analysis.evaluate(cc_event(300., 1., &[])).unwrap().0);
        assert!(!analysis.evaluate(cc_event(15., 1., &[])).unwrap().0);
        assert!(!analysis.evaluate(cc_event(300., 2.6, &[])).unwrap().0);
    }

    #[test]
    fn central_weight() {
        let event_loop = EventLoop::new(
            charged_current_histogram(&[], CHARGED_CURRENT_NORMALISATION).unwrap(),
        );
        let events = [cc_event(300., 0., &[2., 1., 3.]), cc_event(300., 0., &[])];
        let (hist, _) = event_loop
            .analyse_events(
                events.map(Ok::<_, Infallible>),
                &mut charged_current_analysis(),
            )
            .unwrap();
        assert_eq!(hist.bins().unwrap()[0], 3.);
    }

    #[test]
    fn unweighted() {
        let hist = charged_current_histogram(&[], Normalisation::CrossSection).unwrap();
        let events = [cc_event(300., 0., &[2., 1., 3.]), cc_event(300., 0., &[5.])];
        let (hist, _) = EventLoop::new(hist)
            .analyse_events(
                events.map(Ok::<_, Infallible>),
                &mut charged_current_analysis(),
            )
            .unwrap();
        assert_eq!(hist.bins().unwrap()[0], 2.);
    }

    #[test]
    fn named_weights() {
        let names = ["SM", "cW", "cHW"].map(String::from);
        let event_loop = EventLoop::new(
            charged_current_histogram(&names, CHARGED_CURRENT_NORMALISATION).unwrap(),
        );
        let events = [cc_event(300., 0., &[2., 1., 3.]), cc_event(1100., 0., &[2., 1., 3.])];
        let (hist, n) = event_loop
            .analyse_events(
                events.map(Ok::<_, Infallible>),
                &mut charged_current_analysis(),
            )
            .unwrap();
        assert_eq!(n, 2);
        let hists = hist.as_weighted().unwrap();
        assert_eq!(hists.get("SM").unwrap().values(), [1., 0., 0., 0., 0., 1., 0., 0.]);
        assert_eq!(hists.get("cW").unwrap().values(), [3., 0., 0., 0., 0., 3., 0., 0.]);
        // missing weights count as 1
        assert_eq!(hists.get("cHW").unwrap().values(), [1., 0., 0., 0., 0., 1., 0., 0.]);
    }
}
