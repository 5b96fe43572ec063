//! Configuration loading from TOML files

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use bghprep_sample::ColumnMap;
use bghprep_sample::config::{DEFAULT_EMAIL, DEFAULT_END_YEAR, DEFAULT_SAMPLE_SIZE, DEFAULT_START_YEAR};
use bghprep_sample::lookup::pmc_oa::DEFAULT_PMC_OA_URL;
use bghprep_sample::lookup::unpaywall::DEFAULT_UNPAYWALL_URL;
use serde::Deserialize;

/// Global configuration for bghprep
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub sample: SampleConfig,
    pub paths: PathsConfig,
    pub http: HttpSettings,
    pub columns: ColumnMap,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SampleConfig {
    /// Rows sampled per year
    pub size: usize,
    /// Unpaywall contact address; `${VAR}` reads the environment
    #[serde(deserialize_with = "deserialize_env_var")]
    pub email: Option<String>,
    pub seed: Option<u64>,
    pub start_year: u16,
    pub end_year: u16,
}

impl Default for SampleConfig {
    fn default() -> Self {
        Self {
            size: DEFAULT_SAMPLE_SIZE,
            email: Some(DEFAULT_EMAIL.to_string()),
            seed: None,
            start_year: DEFAULT_START_YEAR,
            end_year: DEFAULT_END_YEAR,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub reports_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("./input"),
            output_dir: PathBuf::from("./output"),
            reports_dir: PathBuf::from("./reports"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpSettings {
    /// Whole-request timeout in seconds
    pub timeout: u64,
    /// Retries for transient PMC OA failures
    pub max_retries: u32,
    /// First backoff delay in seconds (doubles per retry)
    pub backoff: u64,
    pub unpaywall_url: String,
    pub pmc_oa_url: String,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout: 60,
            max_retries: 5,
            backoff: 2,
            unpaywall_url: DEFAULT_UNPAYWALL_URL.to_string(),
            pmc_oa_url: DEFAULT_PMC_OA_URL.to_string(),
        }
    }
}

/// Deserialize a string that may contain environment variable reference like ${VAR}
fn deserialize_env_var<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;
    Ok(opt.and_then(|s| expand_env_var(&s)))
}

/// Expand ${VAR} to environment variable value
fn expand_env_var(s: &str) -> Option<String> {
    if let Some(var_name) = s.strip_prefix("${").and_then(|s| s.strip_suffix('}')) {
        std::env::var(var_name).ok()
    } else {
        Some(s.to_string())
    }
}

impl Config {
    /// Load configuration from default locations
    ///
    /// Search order:
    /// 1. ./bghprep.toml (current directory)
    /// 2. ~/.config/bghprep/config.toml
    ///
    /// If no config file found, returns default config.
    pub fn load() -> Result<Self> {
        let local_config = PathBuf::from("bghprep.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        if let Some(config_dir) = directories::ProjectDirs::from("", "", "bghprep") {
            let user_config = config_dir.config_dir().join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        log::debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Load configuration from a specific file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Contact address, falling back to the default when `${VAR}` was unset.
    pub fn email(&self) -> &str {
        self.sample.email.as_deref().unwrap_or(DEFAULT_EMAIL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bghprep_sample::ColumnSelector;

    #[test]
    fn default_config() {
        let config = Config::default();
        assert_eq!(config.sample.size, 850);
        assert_eq!(config.sample.start_year, 2012);
        assert_eq!(config.sample.end_year, 2022);
        assert_eq!(config.email(), "unpaywall_01@example.com");
        assert_eq!(config.http.max_retries, 5);
        assert_eq!(config.columns, ColumnMap::default());
    }

    #[test]
    fn expand_env_var_literal() {
        assert_eq!(expand_env_var("me@example.org"), Some("me@example.org".to_string()));
    }

    #[test]
    fn expand_env_var_missing() {
        assert_eq!(expand_env_var("${BGHPREP_NONEXISTENT_VAR_12345}"), None);
    }

    #[test]
    fn missing_env_email_falls_back() {
        let toml = r#"
[sample]
email = "${BGHPREP_NONEXISTENT_VAR_12345}"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.email(), DEFAULT_EMAIL);
    }

    #[test]
    fn parse_config_toml() {
        let toml = r#"
[sample]
size = 200
email = "lab@example.org"
seed = 42
start_year = 2015

[paths]
input_dir = "/data/exports"

[http]
max_retries = 3

[columns]
pmc_id = "PMCID"
doi = 11
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.sample.size, 200);
        assert_eq!(config.email(), "lab@example.org");
        assert_eq!(config.sample.seed, Some(42));
        assert_eq!(config.sample.start_year, 2015);
        assert_eq!(config.sample.end_year, 2022);
        assert_eq!(config.paths.input_dir, PathBuf::from("/data/exports"));
        assert_eq!(config.paths.output_dir, PathBuf::from("./output"));
        assert_eq!(config.http.max_retries, 3);
        assert_eq!(config.http.timeout, 60);
        assert_eq!(config.columns.pubmed_id, ColumnSelector::Index(0));
        assert_eq!(config.columns.pmc_id, ColumnSelector::Name("PMCID".to_string()));
        assert_eq!(config.columns.doi, ColumnSelector::Index(11));
    }
}
