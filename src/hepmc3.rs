use std::{
    collections::HashMap,
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
    sync::Arc,
};

use audec::auto_decompress;
use log::{debug, trace};
use particle_id::ParticleID;
use thiserror::Error;

use crate::{
    event::{Event, EventBuilder},
    four_vector::FourVector,
    parsing::{any_entry, double_entry, i32_entry, i32_list_entry, i64_entry, u32_entry},
};

/// First line of a HepMC3 ASCII file
pub const HEPMC_MAGIC: &str = "HepMC::";
const END_LISTING: &str = "HepMC::Asciiv3-END_EVENT_LISTING";

/// Error reading a HepMC3 event record
#[derive(Debug, Error)]
pub enum HepMCError {
    /// Parse error
    #[error("Error parsing line in event record: {0}")]
    ParseError(String),
    /// Unrecognized entry
    #[error("Line does not correspond to a known entry type: {0}")]
    BadEntry(String),
    /// Invalid energy unit
    #[error("Invalid energy unit: {0}")]
    InvalidEnergyUnit(String),
    /// Reference to an undeclared vertex
    #[error("Particle {0} refers to unknown production vertex {1}")]
    UnknownVertex(i32, i32),
    /// Reference to an undeclared particle
    #[error("Vertex {0} refers to unknown particle {1}")]
    UnknownParticle(i32, i32),
    /// Fewer particles than announced in the event line
    #[error("Truncated event record {0}: expected {1} particles, found {2}")]
    Truncated(i64, usize, usize),
    /// I/O error
    #[error("I/O error")]
    IOError(#[from] std::io::Error),
}

impl From<nom::Err<nom::error::Error<&str>>> for HepMCError {
    fn from(source: nom::Err<nom::error::Error<&str>>) -> Self {
        Self::ParseError(source.to_string())
    }
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
enum EnergyUnit {
    MeV,
    #[default]
    GeV,
}

/// Reader for (potentially compressed) HepMC3 ASCII event files
pub struct Reader {
    source: Box<dyn BufRead>,
    weight_names: Arc<Vec<String>>,
    next_event_line: Option<String>,
    finished: bool,
}

impl Reader {
    /// Read events from `source`
    pub fn new(source: Box<dyn BufRead>) -> Self {
        Self {
            source,
            weight_names: Default::default(),
            next_event_line: None,
            finished: false,
        }
    }

    /// Open the (potentially compressed) HepMC3 file at `path`
    pub fn open(path: impl AsRef<Path>) -> Result<Self, std::io::Error> {
        let file = File::open(path)?;
        Ok(Self::new(auto_decompress(BufReader::new(file))))
    }

    /// Names of the event weights declared in the file header
    pub fn weight_names(&self) -> &[String] {
        &self.weight_names
    }

    fn read_line(&mut self) -> Result<Option<String>, HepMCError> {
        let mut line = String::new();
        if self.source.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let len = line.trim_end().len();
        line.truncate(len);
        Ok(Some(line))
    }

    // skip the header up to the first event line, collecting weight names
    fn find_event_start(&mut self) -> Result<Option<String>, HepMCError> {
        while let Some(line) = self.read_line()? {
            match line.as_bytes().first() {
                Some(b'E') => return Ok(Some(line)),
                Some(b'W') => {
                    let names = line[1..].split_whitespace().map(|s| s.to_owned());
                    self.weight_names = Arc::new(names.collect());
                    debug!("HepMC weight names: {:?}", self.weight_names);
                }
                _ if line.starts_with(END_LISTING) => return Ok(None),
                _ => {}
            }
        }
        Ok(None)
    }

    fn read_record(&mut self) -> Result<Option<Vec<String>>, HepMCError> {
        let start = match self.next_event_line.take() {
            Some(line) => line,
            None => match self.find_event_start()? {
                Some(line) => line,
                None => return Ok(None),
            },
        };
        let mut record = vec![start];
        while let Some(line) = self.read_line()? {
            if line.starts_with('E') {
                self.next_event_line = Some(line);
                break;
            }
            if line.starts_with(END_LISTING) {
                break;
            }
            record.push(line);
        }
        trace!("Read HepMC record:\n{}", record.join("\n"));
        Ok(Some(record))
    }
}

impl Iterator for Reader {
    type Item = Result<Event, HepMCError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        let res = match self.read_record() {
            Ok(Some(record)) => Some(parse_record(&record, self.weight_names.clone())),
            Ok(None) => None,
            Err(err) => Some(Err(err)),
        };
        if !matches!(res, Some(Ok(_))) {
            self.finished = true;
        }
        res
    }
}

struct RecordParser {
    event: EventBuilder,
    particles: HashMap<i32, usize>,
    vertices: HashMap<i32, usize>,
    // implicit vertices of particles with a single parent
    parent_vertices: HashMap<i32, usize>,
}

impl RecordParser {
    fn new() -> Self {
        Self {
            event: EventBuilder::new(),
            particles: HashMap::new(),
            vertices: HashMap::new(),
            parent_vertices: HashMap::new(),
        }
    }

    fn parse_vertex_line(&mut self, line: &str) -> Result<(), HepMCError> {
        let (rest, id) = i32_entry(&line[1..])?;
        let (rest, _status) = i32_entry(rest)?;
        let (_, incoming) = i32_list_entry(rest)?;
        let incoming = incoming
            .into_iter()
            .map(|p| {
                self.particles
                    .get(&p)
                    .copied()
                    .ok_or(HepMCError::UnknownParticle(id, p))
            })
            .collect::<Result<_, _>>()?;
        let idx = self.event.add_vertex(incoming);
        self.vertices.insert(id, idx);
        Ok(())
    }

    fn parse_particle_line(&mut self, line: &str) -> Result<(), HepMCError> {
        let (rest, id) = i32_entry(&line[1..])?;
        let (rest, mother) = i32_entry(rest)?;
        let (rest, pid) = i32_entry(rest)?;
        let (rest, px) = double_entry(rest)?;
        let (rest, py) = double_entry(rest)?;
        let (rest, pz) = double_entry(rest)?;
        let (rest, e) = double_entry(rest)?;
        let (rest, _m) = double_entry(rest)?;
        let (_, status) = i32_entry(rest)?;
        let p = FourVector::from_components(e, px, py, pz);
        let idx = self.event.add_particle(ParticleID::new(pid), status, p);
        self.particles.insert(id, idx);

        let vertex = match mother {
            0 => None,
            vx if vx < 0 => Some(
                *self
                    .vertices
                    .get(&vx)
                    .ok_or(HepMCError::UnknownVertex(id, vx))?,
            ),
            parent => {
                let parent_idx = *self
                    .particles
                    .get(&parent)
                    .ok_or(HepMCError::UnknownParticle(id, parent))?;
                let event = &mut self.event;
                let vx = *self
                    .parent_vertices
                    .entry(parent)
                    .or_insert_with(|| event.add_vertex(vec![parent_idx]));
                Some(vx)
            }
        };
        if let Some(vx) = vertex {
            self.event.set_production_vertex(idx, vx);
        }
        Ok(())
    }
}

fn parse_units_line(line: &str) -> Result<EnergyUnit, HepMCError> {
    let (_, energy) = any_entry(&line[1..])?;
    match energy {
        "GEV" => Ok(EnergyUnit::GeV),
        "MEV" => Ok(EnergyUnit::MeV),
        _ => Err(HepMCError::InvalidEnergyUnit(energy.to_owned())),
    }
}

fn parse_weights_line(line: &str) -> Result<Vec<f64>, HepMCError> {
    let mut rest = &line[1..];
    let mut weights = Vec::new();
    while !rest.trim().is_empty() {
        let weight;
        (rest, weight) = double_entry(rest)?;
        weights.push(weight);
    }
    Ok(weights)
}

/// Parse a single HepMC3 event record
///
/// The record starts with the `E` line and contains one entry per
/// line.
pub fn parse_record<S: AsRef<str>>(
    record: &[S],
    weight_names: Arc<Vec<String>>,
) -> Result<Event, HepMCError> {
    let mut lines = record.iter().map(|l| l.as_ref());
    let Some(event_line) = lines.next().filter(|l| l.starts_with('E')) else {
        let first = record.first().map(|l| l.as_ref().to_owned());
        return Err(HepMCError::BadEntry(first.unwrap_or_default()));
    };
    let (rest, number) = i64_entry(&event_line[1..])?;
    let (rest, _nvertices) = u32_entry(rest)?;
    let (_, nparticles) = u32_entry(rest)?;
    let nparticles = nparticles as usize;

    let mut parser = RecordParser::new();
    parser.event.id(number).weight_names(weight_names);
    let mut energy_unit = EnergyUnit::GeV;
    for line in lines {
        match line.as_bytes().first() {
            Some(b'P') => parser.parse_particle_line(line)?,
            Some(b'V') => parser.parse_vertex_line(line)?,
            Some(b'U') => energy_unit = parse_units_line(line)?,
            Some(b'W') => {
                for weight in parse_weights_line(line)? {
                    parser.event.add_weight(weight);
                }
            }
            Some(b'A') | Some(b'T') => {}
            _ => {
                if !line.trim().is_empty() {
                    return Err(HepMCError::BadEntry(line.to_owned()));
                }
            }
        }
    }
    if parser.event.nparticles() != nparticles {
        return Err(HepMCError::Truncated(
            number,
            nparticles,
            parser.event.nparticles(),
        ));
    }
    if energy_unit == EnergyUnit::MeV {
        parser.event.rescale_energies(1e-3);
    }
    Ok(parser.event.build())
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::particle::STATUS_BEAM;

    const EVENTS: &str = "HepMC::Version 3.02.05
HepMC::Asciiv3-START_EVENT_LISTING
W central muR2
E 0 2 5
U MEV MM
W 2.0 4.0
P 1 0 2212 0 0 6500000 6500000 938 4
P 2 0 2212 0 0 -6500000 6500000 938 4
V -1 0 [1,2]
P 3 -1 23 0 0 0 91000 91000 62
P 4 3 11 1000 0 0 1000 0 1
P 5 3 -11 -1000 0 0 1000 0 1
E 1 0 1
W 3.0 1.0
P 1 0 22 0 0 5 5 0 1
HepMC::Asciiv3-END_EVENT_LISTING
";

    fn reader(s: &'static str) -> Reader {
        Reader::new(Box::new(Cursor::new(s)))
    }

    #[test]
    fn read_events() {
        let events: Vec<_> = reader(EVENTS).collect::<Result<_, _>>().unwrap();
        assert_eq!(events.len(), 2);

        let ev = &events[0];
        assert_eq!(ev.id(), Some(0));
        assert_eq!(ev.particles().len(), 5);
        assert_eq!(ev.particles()[0].status, STATUS_BEAM);
        assert_eq!(ev.weight(), 2.);
        assert_eq!(ev.named_weights()["muR2"], 4.);

        let z = &ev.particles()[2];
        assert_eq!(z.pid, ParticleID::new(23));
        assert_eq!(z.p.e(), 91.);
        let vx = ev.vertex(z.production_vertex.unwrap()).unwrap();
        assert_eq!(vx.incoming, [0, 1]);

        let e = &ev.particles()[3];
        let vx = ev.vertex(e.production_vertex.unwrap()).unwrap();
        assert_eq!(vx.incoming, [2]);
        assert_eq!(e.production_vertex, ev.particles()[4].production_vertex);
        assert_eq!(ev.final_state().count(), 2);

        let ev = &events[1];
        assert_eq!(ev.id(), Some(1));
        assert_eq!(ev.weights(), [3., 1.]);
        assert_eq!(ev.particles()[0].p.pz(), 5.);
    }

    #[test]
    fn truncated() {
        let truncated = "HepMC::Version 3.02.05
E 0 1 3
P 1 0 2212 0 0 6500 6500 0.938 4
P 2 0 2212 0 0 -6500 6500 0.938 4
";
        let mut reader = reader(truncated);
        assert!(matches!(reader.next(), Some(Err(HepMCError::Truncated(0, 3, 2)))));
        assert!(reader.next().is_none());
    }

    #[test]
    fn unknown_vertex() {
        let record = ["E 0 1 1", "P 1 -3 11 0 0 1 1 0 1"];
        assert!(matches!(
            parse_record(&record, Default::default()),
            Err(HepMCError::UnknownVertex(1, -3))
        ));
    }

    #[test]
    fn bad_entry() {
        let record = ["E 0 0 0", "X what"];
        assert!(matches!(
            parse_record(&record, Default::default()),
            Err(HepMCError::BadEntry(_))
        ));
    }
}
