//! Error types for dataset loading and playback.

use thiserror::Error;

/// Main error type for sciview operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Network or I/O failure retrieving a source
    #[error("Failed to fetch {url}: {reason}")]
    Fetch { url: String, reason: String },

    /// Fetch did not complete within the configured timeout
    #[error("Timed out after {ms} ms fetching {url}")]
    Timeout { url: String, ms: u64 },

    /// Malformed geometry payload
    #[error("Failed to parse {source_name}: {reason}")]
    Parse { source_name: String, reason: String },

    /// Compressed bundle or container could not be opened
    #[error("Failed to unpack container: {0}")]
    ContainerUnpack(String),

    /// No field available to color by
    #[error("No scalar data available for coloring")]
    MissingScalarData,

    /// Scalar range has zero width
    #[error("Scalar range is degenerate: min and max both equal {value}")]
    DegenerateRange { value: f64 },

    /// Target drawable surface not found in the host
    #[error("Drawable surface not found: {0}")]
    UnresolvedElement(String),

    /// Descriptor location does not match its kind
    #[error("Invalid source descriptor: {0}")]
    InvalidSource(String),

    /// No geometry reader registered for a format
    #[error("No reader registered for {0} format")]
    NoReader(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a fetch error.
    pub fn fetch(url: impl Into<String>, reason: impl ToString) -> Self {
        Self::Fetch { url: url.into(), reason: reason.to_string() }
    }

    /// Create a parse error.
    pub fn parse(source_name: impl Into<String>, reason: impl ToString) -> Self {
        Self::Parse { source_name: source_name.into(), reason: reason.to_string() }
    }

    /// Create an "other" error from a string.
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }

    /// Whether this error aborts a load. Informational kinds only get logged.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::MissingScalarData | Self::DegenerateRange { .. })
    }

    /// Whether a retry could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Fetch { .. } | Self::Timeout { .. } | Self::Io(_))
    }
}

impl From<zip::result::ZipError> for Error {
    fn from(e: zip::result::ZipError) -> Self {
        Self::ContainerUnpack(e.to_string())
    }
}

/// Result type alias for sciview operations.
pub type Result<T> = std::result::Result<T, Error>;
