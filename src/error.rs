use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum KeystrideError {
    #[error("corpus file {path} could not be read: {source}")]
    CorpusRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("corpus file {path} is not a valid passage corpus: {source}")]
    CorpusParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("could not write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("quotation unavailable: {0}")]
    Quote(String),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, KeystrideError>;
