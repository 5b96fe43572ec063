//! Blocking HTTP GET over a shared async client.
//!
//! Uses async reqwest on a shared tokio runtime, but presents a sync
//! interface: the pipeline processes one row at a time and each lookup
//! blocks until its response arrives or the request timeout fires.

use std::sync::{LazyLock, OnceLock};
use std::time::Duration;

/// Connect timeout
const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Error types for HTTP operations
#[derive(Debug)]
pub enum HttpError {
    /// HTTP error with optional status code (`None` = no response at all)
    Http {
        status: Option<u16>,
        message: String,
    },
    /// Request could not be built (bad URL, bad header); never sent
    Request(String),
    /// I/O error
    Io(std::io::Error),
}

impl std::fmt::Display for HttpError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Http {
                status: Some(s),
                message,
            } => write!(f, "HTTP {s}: {message}"),
            Self::Http {
                status: None,
                message,
            } => write!(f, "HTTP error: {message}"),
            Self::Request(message) => write!(f, "invalid request: {message}"),
            Self::Io(e) => write!(f, "IO error: {e}"),
        }
    }
}

impl std::error::Error for HttpError {}

impl HttpError {
    /// Create HTTP error from reqwest error
    ///
    /// The URL is stripped so contact addresses in query strings stay out of logs.
    pub fn from_reqwest(e: reqwest::Error) -> Self {
        let e = e.without_url();
        if e.is_builder() {
            return Self::Request(e.to_string());
        }
        Self::Http {
            status: e.status().map(|s| s.as_u16()),
            message: e.to_string(),
        }
    }

    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http { status, .. } => {
                // No status = connect/timeout failure
                matches!(status, None | Some(408) | Some(429) | Some(500..=599))
            }
            Self::Request(_) => false,
            Self::Io(e) => e.kind() != std::io::ErrorKind::StorageFull,
        }
    }
}

impl From<std::io::Error> for HttpError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

/// Process-wide HTTP settings, set once from the CLI.
#[derive(Debug, Clone, Copy)]
pub struct HttpConfig {
    /// Whole-request timeout (connect + headers + body)
    pub request_timeout: Duration,
    /// Maximum retry attempts for transient failures
    pub max_retries: u32,
    /// Base delay for exponential backoff
    pub backoff_base: Duration,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(60),
            max_retries: 5,
            backoff_base: Duration::from_secs(2),
        }
    }
}

static HTTP_CONFIG: OnceLock<HttpConfig> = OnceLock::new();

/// Install the global HTTP config. Later calls are ignored.
pub fn set_http_config(config: HttpConfig) {
    if HTTP_CONFIG.set(config).is_err() {
        log::warn!("HTTP config already set, ignoring {config:?}");
    }
}

/// Current HTTP config (defaults if never set).
pub fn http_config() -> HttpConfig {
    HTTP_CONFIG.get().copied().unwrap_or_default()
}

/// Shared async HTTP client with connection pooling.
static SHARED_CLIENT: LazyLock<reqwest::Client> = LazyLock::new(|| {
    reqwest::Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .pool_max_idle_per_host(2)
        .user_agent(concat!("bghprep/", env!("CARGO_PKG_VERSION")))
        .build()
        .expect("failed to build HTTP client")
});

/// Shared tokio runtime for HTTP operations.
pub static SHARED_RUNTIME: LazyLock<tokio::runtime::Runtime> = LazyLock::new(|| {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .enable_all()
        .build()
        .expect("failed to build tokio runtime")
});

/// Status code and decoded body of a completed request.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    /// Turn 408/429/5xx responses into retryable errors.
    ///
    /// Other statuses (including 404) are passed through, since both lookup
    /// services report "not found" in the body.
    pub fn reject_transient(self) -> Result<Self, HttpError> {
        if matches!(self.status, 408 | 429 | 500..=599) {
            return Err(HttpError::Http {
                status: Some(self.status),
                message: truncate(&self.body, 200).to_string(),
            });
        }
        Ok(self)
    }
}

/// HTTP GET with query parameters, returning the body for any status.
///
/// Only transport failures (connect, timeout, body read) are errors here.
pub fn get_text(url: &str, query: &[(&str, &str)]) -> Result<HttpResponse, HttpError> {
    let timeout = http_config().request_timeout;
    SHARED_RUNTIME.handle().block_on(async {
        let response = SHARED_CLIENT
            .get(url)
            .query(query)
            .timeout(timeout)
            .send()
            .await
            .map_err(HttpError::from_reqwest)?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(HttpError::from_reqwest)?;
        Ok(HttpResponse { status, body })
    })
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    fn http_err(status: u16) -> HttpError {
        HttpError::Http {
            status: Some(status),
            message: "test".to_string(),
        }
    }

    fn response(status: u16) -> HttpResponse {
        HttpResponse {
            status,
            body: "body".to_string(),
        }
    }

    #[test]
    fn http_404_not_retryable() {
        assert!(!http_err(404).is_retryable());
    }

    #[test]
    fn http_400_not_retryable() {
        assert!(!http_err(400).is_retryable());
    }

    #[test]
    fn http_500_retryable() {
        assert!(http_err(500).is_retryable());
        assert!(http_err(503).is_retryable());
    }

    #[test]
    fn http_429_retryable() {
        assert!(http_err(429).is_retryable());
    }

    #[test]
    fn http_none_status_retryable() {
        let err = HttpError::Http {
            status: None,
            message: "connection refused".to_string(),
        };
        assert!(err.is_retryable());
    }

    #[test]
    fn io_storage_full_not_retryable() {
        let err = HttpError::Io(io::Error::new(io::ErrorKind::StorageFull, "disk full"));
        assert!(!err.is_retryable());
    }

    #[test]
    fn io_timeout_retryable() {
        let err = HttpError::Io(io::Error::new(io::ErrorKind::TimedOut, "timeout"));
        assert!(err.is_retryable());
    }

    #[test]
    fn invalid_url_not_retryable() {
        let err = reqwest::Client::new().get("not a url").build().unwrap_err();
        let err = HttpError::from_reqwest(err);
        assert!(matches!(err, HttpError::Request(_)), "{err:?}");
        assert!(!err.is_retryable());
    }

    #[test]
    fn get_text_rejects_invalid_url_without_retry() {
        let err = get_text("not a url", &[("id", "PMC1")]).unwrap_err();
        assert!(!err.is_retryable(), "{err}");
    }

    #[test]
    fn display_http_with_status() {
        assert_eq!(format!("{}", http_err(502)), "HTTP 502: test");
    }

    #[test]
    fn display_http_without_status() {
        let err = HttpError::Http {
            status: None,
            message: "timeout".to_string(),
        };
        assert_eq!(format!("{err}"), "HTTP error: timeout");
    }

    #[test]
    fn reject_transient_passes_not_found() {
        let resp = response(404).reject_transient().unwrap();
        assert_eq!(resp.status, 404);
        assert!(response(200).reject_transient().is_ok());
    }

    #[test]
    fn reject_transient_flags_server_errors() {
        for status in [408, 429, 500, 502, 503] {
            let err = response(status).reject_transient().unwrap_err();
            assert!(err.is_retryable(), "status {status}");
        }
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate("héllo", 2), "hé");
        assert_eq!(truncate("abc", 10), "abc");
    }

    #[test]
    fn default_config() {
        let config = HttpConfig::default();
        assert_eq!(config.max_retries, 5);
        assert_eq!(config.backoff_base, Duration::from_secs(2));
    }
}
