//! Error types shared by the daemon, its collaborators and the client

/// Failures raised by storage, indicators, parsing and transports.
///
/// The state controller never surfaces these to callers; it logs them and
/// keeps the in-memory timer authoritative.
#[derive(Debug, thiserror::Error)]
pub enum PomodoroError {
    /// Reading or writing the persisted record failed.
    #[error("storage error: {0}")]
    Storage(String),

    /// The persisted record or a message could not be (de)serialized.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Badge or notification delivery failed.
    #[error("indicator error: {0}")]
    Indicator(String),

    /// Unknown mode tag.
    #[error("unknown mode '{0}' (expected 25-5, 50-10 or custom)")]
    InvalidMode(String),

    /// HTTP transport to a running daemon failed.
    #[error("transport error: {0}")]
    Transport(String),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, PomodoroError>;
