//! Error taxonomy shared by the store, the template engine and the analyzer.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using [`GadgetError`].
pub type Result<T> = std::result::Result<T, GadgetError>;

/// Errors returned by gadget operations.
///
/// Storage failures come in three flavours (`StorageRead`, `StorageWrite`,
/// `Corrupt`); use [`GadgetError::is_storage`] to treat them as one class.
#[derive(Error, Debug)]
pub enum GadgetError {
    /// Gadget name contains characters outside `[A-Za-z0-9_-]`.
    #[error(
        "invalid gadget name '{0}': use only letters, numbers, dashes, or underscores"
    )]
    InvalidName(String),

    /// Placeholder name does not match `[A-Za-z_][A-Za-z0-9_]*`.
    #[error(
        "invalid variable name '{0}': use letters, numbers, or underscores, not starting with a digit"
    )]
    InvalidVariableName(String),

    /// A variable rename would collide with an existing variable.
    #[error("variable '{0}' already exists")]
    VariableExists(String),

    /// Command is empty or whitespace only.
    #[error("command cannot be empty")]
    EmptyCommand,

    /// No gadget with this name exists in the store.
    #[error("gadget '{0}' not found")]
    NotFound(String),

    /// The gadget file exists but could not be read.
    #[error("failed to read gadget file '{path}': {source}")]
    StorageRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The gadget file could not be written.
    #[error("failed to write gadget file '{path}': {source}")]
    StorageWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The gadget file is not valid JSON. Never reset automatically.
    #[error("gadget file '{path}' is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The collection could not be serialized.
    #[error("failed to serialize gadgets: {0}")]
    Serialize(#[source] serde_json::Error),

    /// The tokenizer collaborator failed.
    #[error("failed to tokenize command: {0}")]
    Tokenize(String),
}

impl GadgetError {
    /// Create a StorageRead error.
    pub fn storage_read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::StorageRead {
            path: path.into(),
            source,
        }
    }

    /// Create a StorageWrite error.
    pub fn storage_write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::StorageWrite {
            path: path.into(),
            source,
        }
    }

    /// True for any failure of the persisted resource.
    pub fn is_storage(&self) -> bool {
        matches!(
            self,
            Self::StorageRead { .. } | Self::StorageWrite { .. } | Self::Corrupt { .. }
        )
    }
}
