use log::{debug, info};
use thiserror::Error;

use crate::analysis::EventAnalysis;
use crate::histogram::Histogram;
use crate::traits::{Fill, Select, Template};

/// Report progress after this many events
pub const PROGRESS_INTERVAL: usize = 1000;

#[derive(Debug, Error)]
pub enum EventLoopError<R, S> {
    #[error("Failed to read event: {0}")]
    ReadErr(R),
    #[error("Failed to select objects: {0}")]
    SelectErr(S),
}

/// Fills histograms from a stream of events
///
/// Each run starts from an empty copy of the template histogram.
pub struct EventLoop<T> {
    template: Histogram<T>,
}

impl<T> EventLoop<T> {
    pub fn new(template: impl Into<Histogram<T>>) -> Self {
        Self {
            template: template.into(),
        }
    }

    pub fn template(&self) -> &Histogram<T> {
        &self.template
    }

    /// Run `analysis` on all `events`
    ///
    /// Events are processed one at a time in the order of the input.
    /// Returns the histogram filled with the selected events and the
    /// number of events read, including events failing the cuts.
    pub fn analyse_events<I, E, RErr, S>(
        &self,
        events: I,
        analysis: &mut EventAnalysis<S, T>,
    ) -> Result<(Histogram<T>, usize), EventLoopError<RErr, S::Error>>
    where
        I: IntoIterator<Item = Result<E, RErr>>,
        S: Select<E, Output = T>,
    {
        use EventLoopError::*;

        let mut hist = self.template.empty_clone();
        let mut nevents = 0;
        for event in events {
            if nevents > 0 && nevents % PROGRESS_INTERVAL == 0 {
                info!("Processed {nevents} events");
            }
            let event = event.map_err(ReadErr)?;
            let (selected, objects) =
                analysis.evaluate(event).map_err(SelectErr)?;
            if selected {
                hist.fill(&objects);
            }
            nevents += 1;
        }
        debug!("Finished after {nevents} events");
        analysis.take_cutflow().log();
        Ok((hist, nevents))
    }
}

impl<T> Clone for EventLoop<T> {
    fn clone(&self) -> Self {
        Self {
            template: self.template.clone(),
        }
    }
}
