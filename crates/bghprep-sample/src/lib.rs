//! bghprep Sample - per-year sampling pipeline for biblio-glutton-harvester
//!
//! Samples rows of a yearly bibliography CSV export and resolves each one
//! against Unpaywall (metadata) and the PMC OA web service (PDF location).
//!
//! # Outputs per (field, year)
//!
//! - `{field}{year}-UPW.jsonl.gz`: Unpaywall records, one JSON object per line
//! - `{field}{year}-PMC.txt`: harvester manifest of PMC PDF paths
//! - `{field}{year}-dump.csv`: `doi,pmc_id` pairs with no locatable PDF
//!
//! # Example
//!
//! ```ignore
//! use bghprep_sample::{Config, run};
//!
//! let config = Config {
//!     field: "cardiology".into(),
//!     sample_size: 100,
//!     ..Default::default()
//! };
//!
//! let summary = run(&config, 2018..=2020, progress)?;
//! println!("Sampled {} rows", summary.total().total);
//! ```

pub mod columns;
pub mod config;
pub mod counters;
pub mod cursor;
pub mod lookup;
pub mod manifest;
pub mod paths;
pub mod report;
pub mod router;
pub mod runner;
pub mod sinks;

// Re-exports
pub use columns::{ColumnMap, ColumnSelector};
pub use config::Config;
pub use counters::{Outcome, RunCounters};
pub use router::RowRouter;
pub use runner::{Summary, YearRun, run};
