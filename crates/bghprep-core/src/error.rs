//! Common error type for remote lookups

use crate::http::HttpError;

/// Error from a single remote lookup (request + parse).
///
/// Wraps either a network/HTTP error ([`HttpError`]) or a body the parser
/// could not make sense of. Used by both the metadata and PDF-location clients.
#[derive(Debug)]
pub enum LookupError {
    Http(HttpError),
    Parse {
        endpoint: &'static str,
        message: String,
    },
}

impl std::fmt::Display for LookupError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Http(e) => write!(f, "{e}"),
            Self::Parse { endpoint, message } => write!(f, "{endpoint}: malformed response: {message}"),
        }
    }
}

impl std::error::Error for LookupError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Http(e) => Some(e),
            Self::Parse { .. } => None,
        }
    }
}

impl From<HttpError> for LookupError {
    fn from(e: HttpError) -> Self {
        Self::Http(e)
    }
}

impl LookupError {
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http(e) => e.is_retryable(),
            // Same request, same body
            Self::Parse { .. } => false,
        }
    }
}
