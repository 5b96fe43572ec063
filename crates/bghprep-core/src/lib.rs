//! bghprep Core - Common infrastructure for the sampling pipeline
//!
//! Streaming line counting, position sampling, blocking HTTP over a shared
//! runtime, retry, gzip post-processing, logging and progress reporting.

pub mod error;
pub mod gzip;
pub mod http;
pub mod line_count;
pub mod logging;
pub mod progress;
pub mod retry;
pub mod sample;
pub mod shutdown;

// Re-exports for convenience
pub use error::LookupError;
pub use gzip::{compress_in_place, remove_if_exists};
pub use http::{
    HttpConfig, HttpError, HttpResponse, SHARED_RUNTIME, get_text, http_config, set_http_config,
};
pub use line_count::count_lines;
pub use logging::{IndicatifLogger, init_logging};
pub use progress::{ProgressContext, SharedProgress};
pub use retry::{RetryPolicy, retry_with_backoff};
pub use sample::{clamp_sample_size, select_positions};
pub use shutdown::{install_signal_handlers, is_shutdown_requested, request_shutdown, shutdown_flag};
