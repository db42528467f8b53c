use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use evan::combine::Normalisation;
use strum::Display;

#[derive(
    Copy, Clone, Debug, Display, Eq, PartialEq, Ord, PartialOrd, Hash, ValueEnum,
)]
#[strum(serialize_all = "kebab-case")]
pub(crate) enum AnalysisKind {
    /// ATLAS WZ transverse mass
    Wz,
    /// ATLAS WW electron-muon transverse mass
    Ww,
    /// Drell-Yan lepton pair invariant mass
    Dy,
    /// Charged-current Drell-Yan transverse mass from Les Houches events
    Ccdy,
    /// ATLAS charged-current Drell-Yan transverse mass
    AtlasCcdy,
    /// CMS WW electron-muon invariant mass from LHCO events
    CmsWw,
}

#[derive(Debug, Parser)]
#[clap(about, author, version)]
pub(crate) struct Opt {
    /// Analysis to run
    #[clap(value_enum)]
    pub(crate) analysis: AnalysisKind,

    /// YAML configuration file listing the samples
    #[clap(long, short, value_parser)]
    pub(crate) config: PathBuf,

    /// Normalisation, overriding the configuration and the analysis default
    #[clap(long, short, value_parser)]
    pub(crate) normalisation: Option<Normalisation>,

    /// Output file, overriding the one in the configuration
    #[clap(long, short, value_parser)]
    pub(crate) output: Option<PathBuf>,

    /// Verbosity level
    #[clap(
        short,
        long,
        default_value = "Info",
        help = "Verbosity level.
Possible values with increasing amount of output are
'off', 'error', 'warn', 'info', 'debug', 'trace'.\n"
    )]
    pub(crate) loglevel: String,
}
