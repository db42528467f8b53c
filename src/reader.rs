use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::{Path, PathBuf},
};

use audec::auto_decompress;
use log::debug;
use strum::Display;
use thiserror::Error;

use crate::{
    event::Event,
    hepmc3::{self, HepMCError, HEPMC_MAGIC},
    lhco::{self, LHCOError, WithWeights},
    lhef::{self, LHEFError, LHEF_MAGIC},
    util::trim_ascii_start,
};

/// Supported event file formats
#[derive(Display, Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum FileFormat {
    #[strum(serialize = "HepMC3")]
    HepMC3,
    #[strum(serialize = "Les Houches Event File")]
    Lhef,
    #[strum(serialize = "LHCO")]
    Lhco,
}

/// Determine the file format from the first bytes of a file
///
/// Anything that is neither HepMC nor a Les Houches Event File is
/// assumed to be in LHCO format.
pub fn detect_format(start: &[u8]) -> FileFormat {
    let start = trim_ascii_start(start);
    if start.starts_with(HEPMC_MAGIC.as_bytes()) {
        FileFormat::HepMC3
    } else if start.starts_with(LHEF_MAGIC.as_bytes()) {
        FileFormat::Lhef
    } else {
        FileFormat::Lhco
    }
}

/// Forward-only stream of events
pub type EventReader = Box<dyn Iterator<Item = Result<Event, ReadError>>>;

/// Returns an event reader for the file at `path`
///
/// The file may be compressed. Its format is determined from its
/// content.
pub fn make_reader<P: AsRef<Path>>(path: P) -> Result<EventReader, CreateError> {
    let (format, source) = open_detect(path.as_ref())?;
    debug!("Read {:?} as {format}", path.as_ref());
    let reader: EventReader = match format {
        FileFormat::HepMC3 => Box::new(
            hepmc3::Reader::new(source).map(|r| r.map_err(ReadError::from)),
        ),
        FileFormat::Lhef => Box::new(
            lhef::Reader::new(source).map(|r| r.map_err(ReadError::from)),
        ),
        FileFormat::Lhco => Box::new(
            lhco::Reader::new(source).map(|r| r.map_err(ReadError::from)),
        ),
    };
    Ok(reader)
}

/// Returns a reader for the LHCO file at `events` taking the event
/// weights from the Les Houches Event File at `weights`
pub fn make_reader_with_weights<P, Q>(
    events: P,
    weights: Q,
) -> Result<EventReader, CreateError>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    let (format, source) = open_detect(events.as_ref())?;
    if format != FileFormat::Lhco {
        return Err(CreateError::WeightsUnsupported(
            events.as_ref().to_owned(),
            format,
        ));
    }
    let (weight_format, weight_source) = open_detect(weights.as_ref())?;
    if weight_format != FileFormat::Lhef {
        return Err(CreateError::NotLHEF(weights.as_ref().to_owned()));
    }
    debug!(
        "Read {:?} as LHCO with weights from {:?}",
        events.as_ref(),
        weights.as_ref()
    );
    let reader = WithWeights::new(
        lhco::Reader::new(source),
        lhef::Reader::new(weight_source),
    );
    Ok(Box::new(reader.map(|r| r.map_err(ReadError::from))))
}

fn open_detect(path: &Path) -> Result<(FileFormat, Box<dyn BufRead>), CreateError> {
    let file = File::open(path)?;
    let mut source = auto_decompress(BufReader::new(file));
    let format = detect_format(source.fill_buf()?);
    Ok((format, source))
}

#[derive(Debug, Error)]
pub enum CreateError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Cannot combine `{0}` in {1} format with separate weights")]
    WeightsUnsupported(PathBuf, FileFormat),

    #[error("`{0}` is not a Les Houches Event File")]
    NotLHEF(PathBuf),
}

#[derive(Debug, Error)]
pub enum ReadError {
    #[error("Error reading HepMC record: {0}")]
    HepMCError(#[from] HepMCError),
    #[error("Error reading Les Houches Event record: {0}")]
    LHEFError(#[from] LHEFError),
    #[error("Error reading LHCO event: {0}")]
    LHCOError(#[from] LHCOError),
}
