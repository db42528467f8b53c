use std::{
    collections::HashSet,
    fs::File,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::combine::Normalisation;
use crate::xsection::{read_xsection, XSectionError, DEFAULT_XSECTION_MARKER};

/// Configuration of an analysis run
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct AnalysisConfig {
    /// Output JSON file
    pub output: PathBuf,
    /// Samples to analyse
    pub samples: Vec<SampleConfig>,
    /// Names of event weights to histogram separately
    #[serde(default)]
    pub weights: Vec<String>,
    /// Overrides the normalisation of the analysis
    #[serde(default)]
    pub normalisation: Option<Normalisation>,
}

/// A sample: event files summed into one histogram
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct SampleConfig {
    /// Label of the sample in the output
    pub label: String,
    /// Default cross section of all inputs
    #[serde(default)]
    pub cross_section: Option<CrossSection>,
    pub inputs: Vec<InputConfig>,
}

impl SampleConfig {
    /// Cross section of the given input
    ///
    /// Falls back to the cross section of the sample if the input has
    /// none of its own.
    pub fn cross_section_of<'a>(
        &'a self,
        input: &'a InputConfig,
    ) -> Option<&'a CrossSection> {
        input.cross_section().or(self.cross_section.as_ref())
    }
}

/// Cross section in pb
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(untagged)]
pub enum CrossSection {
    /// Explicit value
    Value(f64),
    /// Value read from a file
    File {
        file: PathBuf,
        #[serde(default = "default_marker")]
        marker: String,
    },
}

fn default_marker() -> String {
    DEFAULT_XSECTION_MARKER.to_owned()
}

impl CrossSection {
    /// The cross section in pb
    pub fn value(&self) -> Result<f64, XSectionError> {
        match self {
            Self::Value(xs) => Ok(*xs),
            Self::File { file, marker } => read_xsection(file, marker),
        }
    }
}

/// An event file
///
/// Each file is normalised separately to its own cross section.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(untagged)]
pub enum InputConfig {
    Events(PathBuf),
    Detailed {
        events: PathBuf,
        /// Les Houches Event File with the weights of LHCO events
        #[serde(default)]
        weights: Option<PathBuf>,
        #[serde(default)]
        cross_section: Option<CrossSection>,
    },
}

impl InputConfig {
    pub fn events(&self) -> &Path {
        match self {
            Self::Events(path) => path,
            Self::Detailed { events, .. } => events,
        }
    }

    pub fn weights(&self) -> Option<&Path> {
        match self {
            Self::Events(_) => None,
            Self::Detailed { weights, .. } => weights.as_deref(),
        }
    }

    pub fn cross_section(&self) -> Option<&CrossSection> {
        match self {
            Self::Events(_) => None,
            Self::Detailed { cross_section, .. } => cross_section.as_ref(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to open configuration file {0:?}: {1}")]
    Io(PathBuf, std::io::Error),
    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("No samples configured")]
    NoSamples,
    #[error("Duplicate sample label `{0}`")]
    DuplicateLabel(String),
    #[error("No input files for sample `{0}`")]
    NoInputs(String),
}

impl AnalysisConfig {
    /// Read and validate the YAML configuration at `path`
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let file =
            File::open(path).map_err(|err| ConfigError::Io(path.to_owned(), err))?;
        let config: Self = serde_yaml::from_reader(file)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a YAML configuration
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.samples.is_empty() {
            return Err(ConfigError::NoSamples);
        }
        let mut labels = HashSet::new();
        for sample in &self.samples {
            if !labels.insert(sample.label.as_str()) {
                return Err(ConfigError::DuplicateLabel(sample.label.clone()));
            }
            if sample.inputs.is_empty() {
                return Err(ConfigError::NoInputs(sample.label.clone()));
            }
        }
        Ok(())
    }
}
