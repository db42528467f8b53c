//! Reference analyses
pub mod atlas_ccdy;
pub mod atlas_ww;
pub mod atlas_wz;
pub mod cms_ww;
pub mod drell_yan;

use std::convert::Infallible;

use thiserror::Error;

use crate::prompt::AncestryError;

/// Failure to select the objects of an event
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    #[error("Failed to identify prompt particles: {0}")]
    Ancestry(#[from] AncestryError),
}

impl From<Infallible> for AnalysisError {
    fn from(err: Infallible) -> Self {
        match err {}
    }
}
