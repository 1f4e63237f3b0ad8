//! Typed records for the three wrangled CSV datasets, and the loader that
//! reads them.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use log::debug;
use serde::de::DeserializeOwned;
use thiserror::Error;

pub mod broadband;
pub mod ftse;
pub mod housing;

pub use broadband::BroadbandSpeed;
pub use ftse::IndexDay;
pub use housing::{PropertyPrice, PropertyType};

#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("failed to open {}: {}", path.display(), source)]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid csv: {0}")]
    Csv(#[from] csv::Error),

    #[error("{} has a header but no rows", path.display())]
    Empty { path: PathBuf },
}

pub type Result<T> = std::result::Result<T, DatasetError>;

/// Deserialize every row of a headed CSV into `T`. Fields are trimmed.
pub fn from_reader<T, R>(reader: R) -> Result<Vec<T>>
where
    T: DeserializeOwned,
    R: Read,
{
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut rows = Vec::new();
    for row in csv_reader.deserialize() {
        rows.push(row?);
    }
    Ok(rows)
}

/// Load a dataset file. A file with no data rows is an error.
pub fn from_path<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let file = File::open(path).map_err(|source| DatasetError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    let rows: Vec<T> = from_reader(BufReader::new(file))?;
    if rows.is_empty() {
        return Err(DatasetError::Empty {
            path: path.to_path_buf(),
        });
    }
    debug!("loaded {} rows from {}", rows.len(), path.display());
    Ok(rows)
}
