use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PairGenomeError {
    #[error("{path}:{line}: {reason}")]
    Parse {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    #[error("{path}:{line}: invalid record: {reason}")]
    InvalidRecord {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    #[error("chromosome table is empty")]
    EmptyChromosomeTable,

    #[error("duplicate chromosome name: {0}")]
    DuplicateChromosome(String),

    #[error("unknown chromosome: {0}")]
    UnknownChromosome(String),

    #[error("no data source at index {index} ({available} loaded)")]
    UnknownSource { index: usize, available: usize },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("can't parse config file: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("failed to encode PNG: {0}")]
    Png(#[from] lodepng::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, PairGenomeError>;
