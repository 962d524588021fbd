//! Error types for BIGSdb API operations.

use thiserror::Error;

/// Errors that can occur while fetching, assembling or navigating BIGSdb data.
#[derive(Debug, Error)]
pub enum BigsdbError {
    /// Configuration is missing or invalid.
    #[error("BIGSdb configuration invalid: {0}")]
    ConfigInvalid(String),

    /// API request returned a non-success status.
    #[error("BIGSdb API error {}: {message}", fmt_status(.status_code))]
    Api {
        message: String,
        status_code: Option<u16>,
    },

    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// JSON parsing error.
    #[error("Failed to parse response: {0}")]
    ParseError(#[from] serde_json::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    UrlError(#[from] url::ParseError),

    /// JSON value does not have the shape the target model expects.
    #[error("Cannot build {model}: {message}")]
    Shape { model: &'static str, message: String },

    /// Entity not found in an index built from a previous response.
    #[error("{entity_type} '{id}' not found")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// A link needed to continue the traversal is absent from the response.
    #[error("{model} has no '{field}' link")]
    MissingLink {
        model: &'static str,
        field: &'static str,
    },

    /// Positional access outside the collection.
    #[error("Index {index} out of range for collection of length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    /// Collection specialization has no URL-bearing attribute.
    #[error("{0} collections have no URL attribute")]
    NoUrlAttribute(&'static str),

    /// Search attribute is not one of the model's searchable fields.
    #[error("'{field}' is not a searchable {model} field")]
    UnknownField { model: &'static str, field: String },

    /// Search pattern is not a valid regular expression.
    #[error("Invalid search pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    /// Malformed FASTA payload.
    #[error("Invalid FASTA data: {0}")]
    Fasta(#[from] seq_io::fasta::Error),

    /// Reading local input failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed tab-separated profile payload.
    #[error("Invalid profile table: {0}")]
    Profiles(#[from] csv::Error),
}

impl BigsdbError {
    pub(crate) fn shape(model: &'static str, message: impl std::fmt::Display) -> Self {
        Self::Shape {
            model,
            message: message.to_string(),
        }
    }

    /// The request reached the server (or tried to) and failed.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Api { .. } | Self::HttpError(_))
    }

    /// A response did not have the expected structure.
    pub fn is_shape(&self) -> bool {
        matches!(
            self,
            Self::Shape { .. } | Self::ParseError(_) | Self::Fasta(_) | Self::Profiles(_)
        )
    }

    /// A name or index was not present; callers may skip and continue.
    pub fn is_lookup(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::MissingLink { .. })
    }

    /// The caller misused a collection or search.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::IndexOutOfRange { .. }
                | Self::NoUrlAttribute(_)
                | Self::UnknownField { .. }
                | Self::InvalidPattern(_)
        )
    }

    /// HTTP status code of a failed API request, if any.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Api { status_code, .. } => *status_code,
            Self::HttpError(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

fn fmt_status(status: &Option<u16>) -> String {
    status.map_or_else(|| "(no status)".to_string(), |c| c.to_string())
}

/// Result type alias for BIGSdb operations.
pub type Result<T> = core::result::Result<T, BigsdbError>;
