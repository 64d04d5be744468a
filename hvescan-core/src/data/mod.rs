//! Data ingestion: CSV price files, ticker universes, synthetic series.

pub mod reader;
pub mod synthetic;
pub mod universe;

pub use reader::{parse_date, read_series_csv, read_series_from, write_series_csv};
pub use synthetic::synthetic_series;
pub use universe::Universe;

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum DataError {
    #[error("data file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error in {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("{}: missing required column {column}", path.display())]
    MissingColumn { path: PathBuf, column: &'static str },

    #[error("invalid universe TOML: {0}")]
    UniverseToml(#[from] toml::de::Error),
}
