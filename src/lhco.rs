use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use audec::auto_decompress;
use log::trace;
use nom::{
    character::complete::{space0, u32},
    sequence::preceded,
};
use particle_id::ParticleID;
use thiserror::Error;

use crate::{
    event::{Event, EventBuilder},
    four_vector::FourVector,
    lhef::LHEFError,
    object::{PID_JET, PID_MET},
    parsing::{double_entry, i32_entry, i64_entry},
    particle::STATUS_FINAL,
};

/// LHCO object type codes
pub const TYPE_PHOTON: i32 = 0;
pub const TYPE_ELECTRON: i32 = 1;
pub const TYPE_MUON: i32 = 2;
pub const TYPE_TAU: i32 = 3;
pub const TYPE_JET: i32 = 4;
pub const TYPE_MET: i32 = 6;

/// Error reading an LHCO event
#[derive(Debug, Error)]
pub enum LHCOError {
    /// Parse error
    #[error("Error parsing line in event record: {0}")]
    ParseError(String),
    /// Unknown object type
    #[error("Unknown object type {0} in line: {1}")]
    UnknownType(i32, String),
    /// Object line before the first event header
    #[error("Object outside of event: {0}")]
    NoEvent(String),
    /// Error reading the weights
    #[error("Failed to read event weights: {0}")]
    Weights(#[from] LHEFError),
    /// Fewer weight records than events
    #[error("No weights for event {0}")]
    MissingWeights(usize),
    /// I/O error
    #[error("I/O error")]
    IOError(#[from] std::io::Error),
}

impl From<nom::Err<nom::error::Error<&str>>> for LHCOError {
    fn from(source: nom::Err<nom::error::Error<&str>>) -> Self {
        Self::ParseError(source.to_string())
    }
}

/// Reader for (potentially compressed) LHCO event files
///
/// Every reconstructed object becomes a final-state particle without
/// production vertex. Events have unit weight.
pub struct Reader {
    source: Box<dyn BufRead>,
    next_event_line: Option<String>,
    finished: bool,
}

impl Reader {
    /// Read events from `source`
    pub fn new(source: Box<dyn BufRead>) -> Self {
        Self {
            source,
            next_event_line: None,
            finished: false,
        }
    }

    /// Open the (potentially compressed) LHCO file at `path`
    pub fn open(path: impl AsRef<Path>) -> Result<Self, std::io::Error> {
        let file = File::open(path)?;
        Ok(Self::new(auto_decompress(BufReader::new(file))))
    }

    // next line that is neither blank nor a comment
    fn read_line(&mut self) -> Result<Option<String>, LHCOError> {
        let mut line = String::new();
        loop {
            line.clear();
            if self.source.read_line(&mut line)? == 0 {
                return Ok(None);
            }
            let trimmed = line.trim();
            if !trimmed.is_empty() && !trimmed.starts_with('#') {
                return Ok(Some(trimmed.to_owned()));
            }
        }
    }

    fn read_event(&mut self) -> Result<Option<Event>, LHCOError> {
        let header = match self.next_event_line.take() {
            Some(line) => line,
            None => match self.read_line()? {
                Some(line) => line,
                None => return Ok(None),
            },
        };
        let (rest, index) = preceded(space0, u32)(header.as_str())?;
        if index != 0 {
            return Err(LHCOError::NoEvent(header));
        }
        let (_, number) = i64_entry(rest)?;
        trace!("Reading LHCO event {number}");

        let mut event = EventBuilder::new();
        event.id(number);
        while let Some(line) = self.read_line()? {
            let (rest, index) = preceded(space0, u32)(line.as_str())?;
            if index == 0 {
                self.next_event_line = Some(line);
                break;
            }
            parse_object(rest, &line, &mut event)?;
        }
        Ok(Some(event.build()))
    }
}

impl Iterator for Reader {
    type Item = Result<Event, LHCOError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        let res = self.read_event().transpose();
        if !matches!(res, Some(Ok(_))) {
            self.finished = true;
        }
        res
    }
}

// object line after the index:
// typ eta phi pt jmas ntrk btag had/em dum1 dum2
fn parse_object(
    rest: &str,
    line: &str,
    event: &mut EventBuilder,
) -> Result<(), LHCOError> {
    let (rest, typ) = i32_entry(rest)?;
    let (rest, eta) = double_entry(rest)?;
    let (rest, phi) = double_entry(rest)?;
    let (rest, pt) = double_entry(rest)?;
    let (rest, m) = double_entry(rest)?;
    let (rest, ntrk) = double_entry(rest)?;
    let (_, btag) = double_entry(rest)?;

    // negative track count means negative charge
    let charged = |pid: i32| {
        if ntrk > 0. {
            ParticleID::new(-pid)
        } else {
            ParticleID::new(pid)
        }
    };
    let pid = match typ {
        TYPE_PHOTON => ParticleID::new(22),
        TYPE_ELECTRON => charged(11),
        TYPE_MUON => charged(13),
        TYPE_TAU => charged(15),
        TYPE_JET => PID_JET,
        TYPE_MET => PID_MET,
        _ => return Err(LHCOError::UnknownType(typ, line.to_owned())),
    };
    let p = FourVector::from_pt_eta_phi_m(pt, eta, phi, m);
    let idx = event.add_particle(pid, STATUS_FINAL, p);
    if let Some(particle) = event.particle_mut(idx) {
        particle.tag = btag.round() as i32;
    }
    Ok(())
}

/// Combine LHCO events with the weights of the corresponding Les
/// Houches events
///
/// The n-th event of `events` gets the weights of the n-th event of
/// `weights`.
pub struct WithWeights<I, W> {
    events: I,
    weights: W,
    nevent: usize,
}

impl<I, W> WithWeights<I, W> {
    pub fn new(events: I, weights: W) -> Self {
        Self {
            events,
            weights,
            nevent: 0,
        }
    }
}

impl<I, W> Iterator for WithWeights<I, W>
where
    I: Iterator<Item = Result<Event, LHCOError>>,
    W: Iterator<Item = Result<Event, LHEFError>>,
{
    type Item = Result<Event, LHCOError>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut event = match self.events.next()? {
            Ok(event) => event,
            Err(err) => return Some(Err(err)),
        };
        let weights = match self.weights.next() {
            Some(Ok(weights)) => weights,
            Some(Err(err)) => return Some(Err(err.into())),
            None => return Some(Err(LHCOError::MissingWeights(self.nevent))),
        };
        self.nevent += 1;
        let names = weights.weight_names_shared();
        event.set_weights(weights.weights().to_vec(), names);
        Some(Ok(event))
    }
}
