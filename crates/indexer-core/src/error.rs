//! Error types for indexer-core

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

use crate::model::ModelError;

/// Result type for indexer-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Index mutation issued against the database
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    Create,
    Drop,
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperationKind::Create => write!(f, "create"),
            OperationKind::Drop => write!(f, "drop"),
        }
    }
}

/// Errors that can occur in indexer-core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Config artifact is missing, unreadable, malformed or unwritable
    #[error("Config error at {path}: {message}")]
    Config { path: PathBuf, message: String },

    /// Database unreachable or refused the session
    #[error("Connection error: {message}")]
    Connection { message: String },

    /// The database answered but refused to list a namespace
    #[error("Cannot list {namespace}: {message}")]
    Listing { namespace: String, message: String },

    /// A live index document could not be mapped to an [`IndexDescriptor`](crate::IndexDescriptor)
    #[error("Cannot decode index on collection {collection}: {source}")]
    Decode {
        collection: String,
        #[source]
        source: ModelError,
    },

    /// A create or drop call was rejected by the database
    #[error("Failed to {kind} index {index} on {collection}: {message}")]
    Operation {
        kind: OperationKind,
        collection: String,
        index: String,
        message: String,
    },
}

impl Error {
    pub fn config(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        Self::Config {
            path: path.into(),
            message: message.to_string(),
        }
    }

    pub fn connection(message: impl ToString) -> Self {
        Self::Connection {
            message: message.to_string(),
        }
    }

    pub fn listing(namespace: impl Into<String>, message: impl ToString) -> Self {
        Self::Listing {
            namespace: namespace.into(),
            message: message.to_string(),
        }
    }

    pub fn operation(
        kind: OperationKind,
        collection: impl Into<String>,
        index: impl Into<String>,
        message: impl ToString,
    ) -> Self {
        Self::Operation {
            kind,
            collection: collection.into(),
            index: index.into(),
            message: message.to_string(),
        }
    }
}
