use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
    string::FromUtf8Error,
    sync::Arc,
};

use audec::auto_decompress;
use lazy_static::lazy_static;
use log::trace;
use nom::{
    character::complete::{i32, space0, u32},
    multi::count,
    sequence::preceded,
};
use particle_id::ParticleID;
use regex::Regex;
use thiserror::Error;

use crate::{
    event::{Event, EventBuilder},
    four_vector::FourVector,
    parsing::{any_entry, double_entry, i32_entry},
    particle::STATUS_BEAM,
};

/// Start of a Les Houches Event File
pub const LHEF_MAGIC: &str = "<LesHouchesEvents";
/// Name of the central event weight
pub const CENTRAL_WEIGHT_NAME: &str = "XWGTUP";

const LHEF_INCOMING: i32 = -1;

lazy_static! {
    static ref WEIGHT_RE: Regex = Regex::new(
        r#"<wgt\s+id\s*=\s*['"]([^'"]*)['"][^>]*>\s*([^<\s]+)\s*</wgt>"#
    )
    .unwrap();
}

/// Les Houches Event Format error
#[derive(Debug, Error)]
pub enum LHEFError {
    /// No line breaks
    #[error("No line breaks in event record {0}")]
    NoLineBreak(String),
    /// Parse error
    #[error("Error parsing entry in event record: {0}")]
    ParseError(String),
    /// Incomplete record at end of file
    #[error("Truncated event record: {0}")]
    Truncated(String),
    /// Mother index outside the event record
    #[error("Particle {0} has invalid mother {1}")]
    BadMother(usize, i32),
    /// Weight that is not a number
    #[error("Failed to parse weight {0}: {1}")]
    BadWeight(String, String),
    /// Invalid UTF-8
    #[error("Event record is not valid UTF-8")]
    Utf8(#[from] FromUtf8Error),
    /// I/O error
    #[error("I/O error")]
    IOError(#[from] std::io::Error),
}

impl From<nom::Err<nom::error::Error<&str>>> for LHEFError {
    fn from(source: nom::Err<nom::error::Error<&str>>) -> Self {
        Self::ParseError(source.to_string())
    }
}

/// Reader for (potentially compressed) Les Houches Event Files
pub struct Reader {
    source: Box<dyn BufRead>,
    header_read: bool,
    nevent: i64,
    weight_names: Arc<Vec<String>>,
    finished: bool,
}

impl Reader {
    /// Read events from `source`
    pub fn new(source: Box<dyn BufRead>) -> Self {
        Self {
            source,
            header_read: false,
            nevent: 0,
            weight_names: Default::default(),
            finished: false,
        }
    }

    /// Open the (potentially compressed) Les Houches Event File at `path`
    pub fn open(path: impl AsRef<Path>) -> Result<Self, std::io::Error> {
        let file = File::open(path)?;
        Ok(Self::new(auto_decompress(BufReader::new(file))))
    }

    fn skip_header(&mut self) -> Result<(), std::io::Error> {
        let mut header = Vec::new();
        while !header.ends_with(b"</init>") {
            if self.source.read_until(b'>', &mut header)? == 0 {
                break;
            }
        }
        self.header_read = true;
        Ok(())
    }

    fn read_record(&mut self) -> Result<Option<String>, LHEFError> {
        if !self.header_read {
            self.skip_header()?;
        }
        let mut record = Vec::new();
        while !record.ends_with(b"</event>") {
            if self.source.read_until(b'>', &mut record)? == 0 {
                let record = String::from_utf8(record)?;
                if record.contains("<event") {
                    return Err(LHEFError::Truncated(record));
                }
                return Ok(None);
            }
        }
        let record = String::from_utf8(record)?;
        trace!("Read Les Houches Event record:\n{record}");
        Ok(Some(record))
    }

    fn parse_record(&mut self, record: &str) -> Result<Event, LHEFError> {
        let mut event = parse_event_body(event_body(record)?)?;
        let (names, weights) = parse_named_weights(record)?;
        if !weights.is_empty() {
            let mut all_weights = Vec::with_capacity(weights.len() + 1);
            all_weights.push(event.weight());
            all_weights.extend(weights);
            if self.weight_names.len() != names.len() + 1
                || self.weight_names[1..] != names[..]
            {
                let mut all_names = Vec::with_capacity(names.len() + 1);
                all_names.push(CENTRAL_WEIGHT_NAME.to_owned());
                all_names.extend(names);
                self.weight_names = Arc::new(all_names);
            }
            event.set_weights(all_weights, self.weight_names.clone());
        }
        Ok(event)
    }
}

impl Iterator for Reader {
    type Item = Result<Event, LHEFError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        let res = match self.read_record() {
            Ok(Some(record)) => Some(self.parse_record(&record)),
            Ok(None) => None,
            Err(err) => Some(Err(err)),
        };
        match res {
            Some(Ok(mut event)) => {
                event.set_id(self.nevent);
                self.nevent += 1;
                Some(Ok(event))
            }
            res => {
                self.finished = true;
                res
            }
        }
    }
}

// the part of the record between `<event ...>` and the first nested tag
fn event_body(record: &str) -> Result<&str, LHEFError> {
    let start = record
        .find("<event")
        .and_then(|pos| record[pos..].find('>').map(|end| pos + end + 1))
        .ok_or_else(|| LHEFError::ParseError(record.to_owned()))?;
    let body = &record[start..];
    let end = body.find('<').unwrap_or(body.len());
    Ok(&body[..end])
}

/// Parse the HEPEUP block of a Les Houches event
///
/// Incoming particles get the beam status. Mother indices become
/// production vertices.
pub fn parse_event_body(body: &str) -> Result<Event, LHEFError> {
    let body = body.trim_start();
    let Some(line_end) = body.find('\n') else {
        return Err(LHEFError::NoLineBreak(body.to_owned()));
    };
    let (info, particles) = body.split_at(line_end);
    let (rest, nparticles) = preceded(space0, u32)(info)?;
    let nparticles = nparticles as usize;
    let (rest, _idprup) = any_entry(rest)?;
    let (_, weight) = double_entry(rest)?;

    let mut event = EventBuilder::with_capacity(nparticles);
    event.add_weight(weight);
    let mut mothers = Vec::with_capacity(nparticles);
    let mut lines = particles.lines().filter(|l| !l.trim().is_empty());
    for n in 0..nparticles {
        let Some(line) = lines.next() else {
            return Err(LHEFError::Truncated(body.to_owned()));
        };
        let (rest, id) = preceded(space0, i32)(line)?;
        let (rest, mut status) = i32_entry(rest)?;
        let (rest, mother1) = i32_entry(rest)?;
        let (rest, mother2) = i32_entry(rest)?;
        // colour
        let (rest, _) = count(any_entry, 2)(rest)?;
        let (rest, px) = double_entry(rest)?;
        let (rest, py) = double_entry(rest)?;
        let (rest, pz) = double_entry(rest)?;
        let (_, e) = double_entry(rest)?;
        if status == LHEF_INCOMING {
            status = STATUS_BEAM;
        }
        let p = FourVector::from_components(e, px, py, pz);
        event.add_particle(ParticleID::new(id), status, p);
        for mother in [mother1, mother2] {
            if mother < 0 || mother as usize > nparticles {
                return Err(LHEFError::BadMother(n + 1, mother));
            }
        }
        mothers.push((mother1 as usize, mother2 as usize));
    }

    // particles with the same mothers share a production vertex
    let mut vertices: Vec<((usize, usize), usize)> = Vec::new();
    for (idx, (m1, m2)) in mothers.into_iter().enumerate() {
        if m1 == 0 {
            continue;
        }
        let vx = match vertices.iter().find(|(m, _)| *m == (m1, m2)) {
            Some((_, vx)) => *vx,
            None => {
                let incoming = if m2 > m1 {
                    (m1 - 1..m2).collect()
                } else {
                    vec![m1 - 1]
                };
                let vx = event.add_vertex(incoming);
                vertices.push(((m1, m2), vx));
                vx
            }
        };
        event.set_production_vertex(idx, vx);
    }
    Ok(event.build())
}

/// Extract the `<wgt id='...'>` weights of an event record
pub fn parse_named_weights(
    record: &str,
) -> Result<(Vec<String>, Vec<f64>), LHEFError> {
    let mut names = Vec::new();
    let mut weights = Vec::new();
    for cap in WEIGHT_RE.captures_iter(record) {
        let name = &cap[1];
        let weight = cap[2].parse::<f64>().map_err(|err| {
            LHEFError::BadWeight(name.to_owned(), err.to_string())
        })?;
        names.push(name.to_owned());
        weights.push(weight);
    }
    Ok((names, weights))
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    const EVENTS: &str = r#"<LesHouchesEvents version="3.0">
<header>
<MGGenerationInfo>
#  Number of Events        :       2
#  Integrated weight (pb)  :       1.5
</MGGenerationInfo>
</header>
<init>
2212 2212 6.5e+03 6.5e+03 0 0 247000 247000 -4 1
1.5 0.01 1.5 1
</init>
<event>
 5      1 +1.5e+00 9.1e+01 7.5e-03 1.1e-01
        2 -1    0    0  501    0 +0.0e+00 +0.0e+00 +5.0e+02 5.0e+02 0.0e+00 0.0e+00 -1.0e+00
       -2 -1    0    0    0  501 -0.0e+00 -0.0e+00 -4.0e+02 4.0e+02 0.0e+00 0.0e+00 1.0e+00
       23  2    1    2    0    0 +0.0e+00 +0.0e+00 +1.0e+02 9.0e+02 9.1e+01 0.0e+00 0.0e+00
       11  1    3    3    0    0 +3.0e+01 +4.0e+01 +1.0e+02 4.5e+02 0.0e+00 0.0e+00 1.0e+00
      -11  1    3    3    0    0 -3.0e+01 -4.0e+01 +0.0e+00 4.5e+02 0.0e+00 0.0e+00 -1.0e+00
<mgrwt>
<rscale>  0 0.91E+02</rscale>
</mgrwt>
<rwgt>
<wgt id='SM'> +1.0e+00 </wgt>
<wgt id="cW"> -2.5e-01 </wgt>
</rwgt>
</event>
<event>
 2      1 +2.0e+00 9.1e+01 7.5e-03 1.1e-01
        1 -1    0    0  501    0 +0.0e+00 +0.0e+00 +5.0e+02 5.0e+02 0.0e+00 0.0e+00 -1.0e+00
       22  1    1    1  501    0 +0.0e+00 +0.0e+00 +5.0e+02 5.0e+02 0.0e+00 0.0e+00 -1.0e+00
</event>
</LesHouchesEvents>
"#;

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
        assert_eq!(ev.weights(), [1.5, 1., -0.25]);
        assert_eq!(ev.weight_names(), [CENTRAL_WEIGHT_NAME, "SM", "cW"]);
        let weights = ev.named_weights();
        assert_eq!(weights["cW"], -0.25);

        let z = &ev.particles()[2];
        assert_eq!(z.pid, ParticleID::new(23));
        let vx = ev.vertex(z.production_vertex.unwrap()).unwrap();
        assert_eq!(vx.incoming, [0, 1]);
        let e = &ev.particles()[3];
        assert_eq!(e.p.px(), 30.);
        let vx = ev.vertex(e.production_vertex.unwrap()).unwrap();
        assert_eq!(vx.incoming, [2]);
        assert_eq!(ev.final_state().count(), 2);

        let ev = &events[1];
        assert_eq!(ev.id(), Some(1));
        assert_eq!(ev.weights(), [2.]);
        assert!(ev.named_weights().is_empty());
    }

    #[test]
    fn truncated() {
        let truncated = "<LesHouchesEvents version=\"3.0\">
<init>
</init>
<event>
 2      1 +2.0e+00 9.1e+01 7.5e-03 1.1e-01
        1 -1    0    0  501    0 +0.0e+00 +0.0e+00 +5.0e+02 5.0e+02 0.0e+00 0.0e+00 -1.0e+00
";
        let mut reader = reader(truncated);
        assert!(matches!(reader.next(), Some(Err(LHEFError::Truncated(_)))));
        assert!(reader.next().is_none());
    }

    #[test]
    fn bad_mother() {
        let body = "
 1 1 1.0 91 0.0075 0.11
 11 1 3 3 0 0 0 0 1 1 0 0 0
";
        assert!(matches!(parse_event_body(body), Err(LHEFError::BadMother(1, 3))));
    }
}
