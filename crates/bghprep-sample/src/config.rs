//! Sampling pipeline configuration

use std::path::PathBuf;

use crate::columns::ColumnMap;
use crate::lookup::pmc_oa::DEFAULT_PMC_OA_URL;
use crate::lookup::unpaywall::DEFAULT_UNPAYWALL_URL;

/// Rows sampled per year unless overridden
pub const DEFAULT_SAMPLE_SIZE: usize = 850;
/// Contact address sent with Unpaywall requests
pub const DEFAULT_EMAIL: &str = "unpaywall_01@example.com";
/// First year of the default range
pub const DEFAULT_START_YEAR: u16 = 2012;
/// Last year (inclusive) of the default range
pub const DEFAULT_END_YEAR: u16 = 2022;

/// Runtime configuration for one field's multi-year run
#[derive(Debug, Clone)]
pub struct Config {
    /// Field identifier, used in every input/output path
    pub field: String,
    /// Root of `{field}/{field}{year}.csv` inputs
    pub input_dir: PathBuf,
    /// Root of UPW / PMC outputs
    pub output_dir: PathBuf,
    /// Root of dump files and the aggregate report
    pub reports_dir: PathBuf,
    /// Requested rows per year (clamped to the population)
    pub sample_size: usize,
    /// Contact address for Unpaywall
    pub email: String,
    /// RNG seed for reproducible samples (`None` = OS entropy)
    pub seed: Option<u64>,
    /// Where the identifiers live in each row
    pub columns: ColumnMap,
    /// Unpaywall v2 base URL
    pub unpaywall_url: String,
    /// PMC OA web service endpoint
    pub pmc_oa_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            field: String::new(),
            input_dir: PathBuf::from("input"),
            output_dir: PathBuf::from("output"),
            reports_dir: PathBuf::from("reports"),
            sample_size: DEFAULT_SAMPLE_SIZE,
            email: DEFAULT_EMAIL.to_string(),
            seed: None,
            columns: ColumnMap::default(),
            unpaywall_url: DEFAULT_UNPAYWALL_URL.to_string(),
            pmc_oa_url: DEFAULT_PMC_OA_URL.to_string(),
        }
    }
}
