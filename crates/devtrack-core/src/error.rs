use std::path::PathBuf;
use std::sync::Arc;

/// Errors that can occur across the devtrack workspace.
///
/// Each variant wraps a specific error domain. Library crates use this type
/// directly; the binary crate converts to `miette::Report` at the boundary.
///
/// # Examples
///
/// ```
/// use devtrack_core::DevtrackError;
///
/// let err = DevtrackError::Config("missing data path".into());
/// assert!(err.to_string().contains("missing data path"));
/// ```
#[derive(Debug, thiserror::Error)]
pub enum DevtrackError {
    /// Filesystem I/O failure.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid or missing configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// JSON serialization / deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML deserialization failure.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// A required file was not found.
    #[error("file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// The CSV reader could not decode the file.
    #[error("CSV error in {}: {message}", .path.display())]
    Csv {
        /// File being read.
        path: PathBuf,
        /// Reader error message.
        message: String,
    },

    /// The CSV header lacks a column the loader needs.
    #[error("{} is missing required column `{column}`", .path.display())]
    MissingColumn {
        /// File being read.
        path: PathBuf,
        /// Name of the absent column.
        column: String,
    },

    /// A data row could not be converted into a record.
    #[error("{}:{line}: {message}", .path.display())]
    InvalidRow {
        /// File being read.
        path: PathBuf,
        /// 1-based line number in the file.
        line: u64,
        /// What was wrong with the row.
        message: String,
    },

    /// A selection pattern could not be compiled.
    #[error("pattern error: {0}")]
    Pattern(String),

    /// An error handed to more than one waiter of the same cached load.
    #[error(transparent)]
    Shared(Arc<DevtrackError>),
}
