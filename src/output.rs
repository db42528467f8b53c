use std::{
    fs::File,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use log::info;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to create {0:?}: {1}")]
    Create(PathBuf, std::io::Error),
    #[error("Failed to write JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Failed to write output: {0}")]
    Io(#[from] std::io::Error),
}

/// Write `value` as pretty-printed JSON to `path`
pub fn write_json<T: Serialize + ?Sized>(
    path: impl AsRef<Path>,
    value: &T,
) -> Result<(), OutputError> {
    let path = path.as_ref();
    let file =
        File::create(path).map_err(|err| OutputError::Create(path.to_owned(), err))?;
    let mut out = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut out, value)?;
    writeln!(out)?;
    out.flush()?;
    info!("Wrote {path:?}");
    Ok(())
}
