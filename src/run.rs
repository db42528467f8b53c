use std::path::{Path, PathBuf};

use log::info;
use thiserror::Error;

use crate::analyses::AnalysisError;
use crate::analysis::EventAnalysis;
use crate::combine::{Combination, CombinationError, Normalisation};
use crate::config::{AnalysisConfig, InputConfig};
use crate::event::Event;
use crate::event_loop::{EventLoop, EventLoopError};
use crate::histogram::Histogram;
use crate::reader::{
    make_reader, make_reader_with_weights, CreateError, EventReader, ReadError,
};
use crate::traits::Select;
use crate::xsection::XSectionError;

#[derive(Debug, Error)]
pub enum RunError {
    #[error("Failed to determine cross section for {0:?}: {1}")]
    XSectionErr(PathBuf, XSectionError),
    #[error("No cross section for {0:?}")]
    NoXSection(PathBuf),
    #[error("Failed to open {0:?}: {1}")]
    CreateErr(PathBuf, CreateError),
    #[error("Failed to read event from {0:?}: {1}")]
    ReadErr(PathBuf, ReadError),
    #[error("Failed to analyse event from {0:?}: {1}")]
    AnalysisErr(PathBuf, AnalysisError),
    #[error("Failed to combine samples: {0}")]
    CombinationErr(#[from] CombinationError),
}

/// Run an analysis over all configured samples
///
/// Each input file is analysed and normalised separately before it is
/// added to the histogram of its sample. With
/// [Normalisation::CrossSection] every input needs a cross section,
/// which is checked before any events are read.
pub fn run_samples<S, T>(
    config: &AnalysisConfig,
    normalisation: Normalisation,
    event_loop: &EventLoop<T>,
    analysis: &mut EventAnalysis<S, T>,
) -> Result<Combination<T>, RunError>
where
    S: Select<Event, Output = T>,
    S::Error: Into<AnalysisError>,
{
    use RunError::*;

    if normalisation.needs_cross_section() {
        for sample in &config.samples {
            for input in &sample.inputs {
                if sample.cross_section_of(input).is_none() {
                    return Err(NoXSection(input.events().to_owned()));
                }
            }
        }
    }
    info!("Normalisation: {normalisation}");

    let mut combination = Combination::new();
    for sample in &config.samples {
        info!("Analysing sample `{}`", sample.label);
        for input in &sample.inputs {
            let path = input.events();
            let scale = if normalisation.needs_cross_section() {
                sample
                    .cross_section_of(input)
                    .ok_or_else(|| NoXSection(path.to_owned()))?
                    .value()
                    .map_err(|err| XSectionErr(path.to_owned(), err))?
            } else {
                1.
            };
            let (hist, nevents) = analyse_file(input, event_loop, analysis)?;
            info!("Read {nevents} events from {path:?}");
            combination.add(&sample.label, hist, scale, nevents)?;
        }
    }
    Ok(combination)
}

/// Fill a histogram with the events of a single input file
///
/// Returns the histogram and the number of events read.
pub fn analyse_file<S, T>(
    input: &InputConfig,
    event_loop: &EventLoop<T>,
    analysis: &mut EventAnalysis<S, T>,
) -> Result<(Histogram<T>, usize), RunError>
where
    S: Select<Event, Output = T>,
    S::Error: Into<AnalysisError>,
{
    let path = input.events();
    info!("Reading events from {path:?}");
    let reader = open(path, input.weights())
        .map_err(|err| RunError::CreateErr(path.to_owned(), err))?;
    event_loop
        .analyse_events(reader, analysis)
        .map_err(|err| match err {
            EventLoopError::ReadErr(err) => RunError::ReadErr(path.to_owned(), err),
            EventLoopError::SelectErr(err) => {
                RunError::AnalysisErr(path.to_owned(), err.into())
            }
        })
}

fn open(
    events: &Path,
    weights: Option<&Path>,
) -> Result<EventReader, CreateError> {
    match weights {
        Some(weights) => make_reader_with_weights(events, weights),
        None => make_reader(events),
    }
}
