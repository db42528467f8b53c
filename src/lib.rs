//! `evan` is a crate for fiducial analyses of collider events.
//!
//! Events are read from HepMC3, Les Houches Event, or LHCO files,
//! reduced to physics objects such as dressed prompt leptons and jets,
//! passed through a sequence of cuts, and histogrammed. Histograms of
//! several input files are normalised to cross sections and
//! combined per sample.
//!
//! # How to use
//!
//! The `evan` binary runs one of the predefined [analyses] over the
//! samples listed in a YAML configuration file, see [config].
//!
//! ## Most relevant modules
//!
//! - [prelude] exports a list of the most relevant classes and objects
//! - [event] for the internal event format
//! - [reader] for reading events from files
//! - [analysis] for object selection and cuts
//! - [histogram] for histograms of observables
//! - [event_loop] for filling histograms with analysed events
//! - [run] for running an analysis over a set of samples
//!

/// Predefined analyses
pub mod analyses;
/// Object selection and cut flow
pub mod analysis;
/// Normalisation and combination of histograms
pub mod combine;
/// Analysis configuration
pub mod config;
/// Photon dressing of charged leptons
pub mod dressing;
/// Scattering event class
pub mod event;
/// Histogram filling
pub mod event_loop;
/// Four-vector class
pub mod four_vector;
/// HepMC3 interface
pub mod hepmc3;
/// Histograms
pub mod histogram;
/// Jet clustering and b-tagging
pub mod jets;
/// LHCO interface
pub mod lhco;
/// Les Houches Event File interface
pub mod lhef;
/// Reconstructed physics objects
pub mod object;
/// Common observables
pub mod observables;
/// JSON output
pub mod output;
/// Particle class
pub mod particle;
/// Most important exports
pub mod prelude;
/// Prompt particle identification
pub mod prompt;
/// Event readers
pub mod reader;
/// Resonance assignment
pub mod resonance;
/// Running analyses over all configured samples
pub mod run;
/// Common traits
pub mod traits;
/// Cross sections from generator logs
pub mod xsection;

mod parsing;
mod util;

use lazy_static::lazy_static;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
lazy_static! {
    pub static ref VERSION_MAJOR: u32 =
        env!("CARGO_PKG_VERSION_MAJOR").parse().unwrap();
    pub static ref VERSION_MINOR: u32 =
        env!("CARGO_PKG_VERSION_MINOR").parse().unwrap();
    pub static ref VERSION_PATCH: u32 =
        env!("CARGO_PKG_VERSION_PATCH").parse().unwrap();
}
pub const GIT_REV: Option<&str> = option_env!("VERGEN_GIT_SHA");
pub const GIT_BRANCH: Option<&str> = option_env!("VERGEN_GIT_BRANCH");
