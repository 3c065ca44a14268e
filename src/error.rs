/// Crate-level error types. The extraction engine itself never fails; these
/// cover the I/O, config, and input-format boundary around it.
use std::path::PathBuf;

/// Every error names the file or value that caused it, so the diagnostic is
/// useful without a debugger.
#[allow(clippy::error_impl_error, reason = "crate-level error type")]
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// `.codefence.toml` parsed but holds an unusable value.
    #[error("config invalid: {reason}")]
    ConfigInvalid {
        /// Which key is wrong and why.
        reason: String,
    },

    /// A conversation file exists but does not have the expected shape.
    #[error("conversation corrupt: {}: {reason}", path.display())]
    ConversationCorrupt {
        /// Conversation file or directory.
        path: PathBuf,
        /// Description of the problem.
        reason: String,
    },

    /// An input file does not exist on disk.
    #[error("file not found: {}", path.display())]
    FileNotFound {
        /// Path to the missing file.
        path: PathBuf,
    },

    /// Underlying I/O error from the filesystem.
    #[error("io: {0}")]
    Io(
        /// The wrapped I/O error.
        #[from]
        std::io::Error,
    ),

    /// JSON (de)serialization failed.
    #[error("json: {0}")]
    Json(
        /// The wrapped JSON error.
        #[from]
        serde_json::Error,
    ),

    /// TOML deserialization failed.
    #[error("toml deserialize: {0}")]
    TomlDe(
        /// The wrapped TOML deserialization error.
        #[from]
        toml::de::Error,
    ),

    /// A template identifier names no known template.
    #[error("unknown template: `{name}`")]
    UnknownTemplate {
        /// Identifier that was not recognized.
        name: String,
    },

    /// The filesystem watcher could not be set up.
    #[error("watch failed: {reason}")]
    WatchFailed {
        /// Description of the watcher failure.
        reason: String,
    },
}

/// Read a text file, mapping a missing file to `Error::FileNotFound`.
///
/// # Errors
///
/// Returns `Error::FileNotFound` if the path does not exist, or `Error::Io` for other failures.
pub fn read_text(path: &std::path::Path) -> Result<String, Error> {
    return match std::fs::read_to_string(path) {
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(Error::FileNotFound { path: path.to_path_buf() }),
        Err(e) => Err(Error::Io(e)),
        Ok(content) => Ok(content),
    };
}
