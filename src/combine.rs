use std::fmt;

use log::info;
use serde::{ser::SerializeMap, Deserialize, Serialize, Serializer};
use strum::{Display, EnumString};
use thiserror::Error;

use crate::histogram::{Histogram, HistogramSpec};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum CombinationError {
    #[error("Cannot normalise `{0}`: no events were read")]
    NoEvents(String),
    #[error("Invalid normalisation factor {1} for `{0}`")]
    InvalidScale(String, f64),
}

/// How histograms filled from N events are turned into cross sections
///
/// Both ways count every event read in N, including those failing the
/// cuts.
#[derive(
    Deserialize,
    Serialize,
    Display,
    EnumString,
    Copy,
    Clone,
    Debug,
    Eq,
    PartialEq,
    Hash,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum Normalisation {
    /// Selected events count once and the histogram is scaled by σ / N
    CrossSection,
    /// Selected events count with their event weight in pb and the
    /// histogram is scaled by 1 / N
    EventWeights,
}

impl Normalisation {
    /// Set the event weight of `spec` as required by this normalisation
    pub fn weigh<E: 'static, F>(self, spec: HistogramSpec<E>, weight: F) -> HistogramSpec<E>
    where
        F: Fn(&E) -> f64 + Send + Sync + 'static,
    {
        match self {
            Self::CrossSection => spec,
            Self::EventWeights => spec.with_weight(weight),
        }
    }

    /// Whether the cross section of each input is needed
    pub fn needs_cross_section(self) -> bool {
        self == Self::CrossSection
    }
}

/// Normalised sum of histograms, per sample label
///
/// Each contribution is scaled by `scale / N`, where N is the number of
/// events read to fill it. `scale` is the cross section for
/// [Normalisation::CrossSection] and 1 for [Normalisation::EventWeights].
pub struct Combination<T> {
    samples: Vec<(String, Histogram<T>)>,
}

impl<T> Combination<T> {
    pub fn new() -> Self {
        Self {
            samples: Vec::new(),
        }
    }

    /// Add `hist`, filled from `nevents` events and scaled by
    /// `scale / nevents`, to the histogram with the given label
    ///
    /// # Panics
    ///
    /// Panics if `hist` is incompatible with previous contributions to
    /// the same label.
    pub fn add(
        &mut self,
        label: &str,
        mut hist: Histogram<T>,
        scale: f64,
        nevents: usize,
    ) -> Result<(), CombinationError> {
        if nevents == 0 {
            return Err(CombinationError::NoEvents(label.to_owned()));
        }
        if !scale.is_finite() {
            return Err(CombinationError::InvalidScale(label.to_owned(), scale));
        }
        let norm = scale / nevents as f64;
        info!("Adding {nevents} events to `{label}` with normalisation {norm}");
        hist *= norm;
        match self.samples.iter_mut().find(|(l, _)| l == label) {
            Some((_, total)) => *total += &hist,
            None => self.samples.push((label.to_owned(), hist)),
        }
        Ok(())
    }

    pub fn get(&self, label: &str) -> Option<&Histogram<T>> {
        self.samples
            .iter()
            .find_map(|(l, h)| if l == label { Some(h) } else { None })
    }

    /// Labels and histograms in the order in which they were first added
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Histogram<T>)> {
        self.samples.iter().map(|(l, h)| (l.as_str(), h))
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

impl<T> Default for Combination<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Combination<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<T> Serialize for Combination<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.samples.len()))?;
        for (label, hist) in &self.samples {
            map.serialize_entry(label, hist)?;
        }
        map.end()
    }
}
