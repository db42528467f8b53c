use std::{
    fs::File,
    io::{BufRead, BufReader},
    num::ParseFloatError,
    path::{Path, PathBuf},
};

use audec::auto_decompress;
use log::debug;
use thiserror::Error;

/// Marker of the cross-section line in MadGraph event files
pub const DEFAULT_XSECTION_MARKER: &str = "#  Integrated weight (pb)  :";

#[derive(Debug, Error)]
pub enum XSectionError {
    #[error("Failed to read cross section: {0}")]
    Io(#[from] std::io::Error),
    #[error("No line starting with `{1}` in {0:?}")]
    NotFound(PathBuf, String),
    #[error("Failed to parse cross section `{0}`: {1}")]
    Parse(String, ParseFloatError),
}

/// Read the cross section from the (potentially compressed) file at `path`
///
/// The cross section is the value after the first `:` on the first
/// line starting with `marker`.
pub fn read_xsection(
    path: impl AsRef<Path>,
    marker: &str,
) -> Result<f64, XSectionError> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let source = auto_decompress(BufReader::new(file));
    let xs = find_xsection(source, marker)?.ok_or_else(|| {
        XSectionError::NotFound(path.to_owned(), marker.to_owned())
    })?;
    debug!("Cross section from {path:?}: {xs} pb");
    Ok(xs)
}

/// Search `source` for the cross section line starting with `marker`
pub fn find_xsection(
    source: impl BufRead,
    marker: &str,
) -> Result<Option<f64>, XSectionError> {
    for line in source.lines() {
        let line = line?;
        if !line.starts_with(marker) {
            continue;
        }
        let value = match line.split_once(':') {
            Some((_, value)) => value.trim(),
            None => line[marker.len()..].trim(),
        };
        return value
            .parse()
            .map(Some)
            .map_err(|err| XSectionError::Parse(value.to_owned(), err));
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    const HEADER: &str = "<MGGenerationInfo>
#  Number of Events        :       10000
#  Integrated weight (pb)  :       0.5467
#  Integrated weight (pb)  :       12.0
</MGGenerationInfo>
";

    #[test]
    fn first_match() {
        let xs = find_xsection(Cursor::new(HEADER), DEFAULT_XSECTION_MARKER);
        assert_eq!(xs.unwrap(), Some(0.5467));
    }

    #[test]
    fn custom_marker() {
        let xs = find_xsection(Cursor::new(HEADER), "#  Number of Events");
        assert_eq!(xs.unwrap(), Some(10000.));
    }

    #[test]
    fn not_found() {
        let xs = find_xsection(Cursor::new("<init>\n</init>\n"), DEFAULT_XSECTION_MARKER);
        assert_eq!(xs.unwrap(), None);
    }

    #[test]
    fn bad_value() {
        let xs = find_xsection(
            Cursor::new("#  Integrated weight (pb)  : lots\n"),
            DEFAULT_XSECTION_MARKER,
        );
        assert!(matches!(xs, Err(XSectionError::Parse(v, _)) if v == "lots"));
    }
}
