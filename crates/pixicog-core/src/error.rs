//! Unified Error Model
use pixicog_codec::FormatError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::hash_chain::Digest;

pub type Result<T> = std::result::Result<T, PixicogError>;

#[derive(Error, Debug)]
pub enum PixicogError {
    #[error("STORE/IO: failed to {op} {}: {source}", path.display())]
    StoreIo {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("STORE/CORRUPT: {}: {reason}", path.display())]
    CorruptCheckpoint {
        path: PathBuf,
        reason: String,
        #[source]
        source: Option<FormatError>,
    },

    #[error(transparent)]
    Format(#[from] FormatError),

    /// A stage callable failed; `source` is the stage's own error.
    #[error("STAGE/EXEC: stage #{index} `{name}` failed at chain {chain}: {source}")]
    StageExecution {
        index: usize,
        name: String,
        chain: Digest,
        #[source]
        source: anyhow::Error,
    },

    /// A store failure while processing a stage.
    #[error("RUN/STAGE: stage #{index} `{name}` at chain {chain}: {source}")]
    AtStage {
        index: usize,
        name: String,
        chain: Digest,
        #[source]
        source: Box<PixicogError>,
    },
}

impl PixicogError {
    pub(crate) fn io(op: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::StoreIo {
            op,
            path: path.into(),
            source,
        }
    }

    /// The error with any stage annotation peeled off.
    pub fn root(&self) -> &PixicogError {
        match self {
            Self::AtStage { source, .. } => source.root(),
            other => other,
        }
    }

    /// Stage index (1-based) the error is attributed to, if any.
    pub fn stage_index(&self) -> Option<usize> {
        match self {
            Self::StageExecution { index, .. } | Self::AtStage { index, .. } => Some(*index),
            _ => None,
        }
    }
}
