//! Per-row progress reporting without a terminal. Kept in its own test
//! binary: it installs the process-wide logger.

use std::fs;
use std::sync::Mutex;

use bghprep_core::{ProgressContext, RetryPolicy};
use bghprep_sample::lookup::{PmcOaClient, UnpaywallClient};
use bghprep_sample::runner::run_year;
use bghprep_sample::{Config, RowRouter};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tempfile::TempDir;

struct CaptureLogger {
    lines: Mutex<Vec<(log::Level, String)>>,
}

impl log::Log for CaptureLogger {
    fn enabled(&self, _metadata: &log::Metadata) -> bool {
        true
    }

    fn log(&self, record: &log::Record) {
        self.lines
            .lock()
            .unwrap()
            .push((record.level(), record.args().to_string()));
    }

    fn flush(&self) {}
}

static LOGGER: CaptureLogger = CaptureLogger {
    lines: Mutex::new(Vec::new()),
};

#[test]
fn every_sampled_row_is_reported_at_info() {
    log::set_logger(&LOGGER).unwrap();
    log::set_max_level(log::LevelFilter::Trace);

    let dir = TempDir::new().unwrap();
    let field_dir = dir.path().join("input/derm");
    fs::create_dir_all(&field_dir).unwrap();
    // 4 rows, no trailing newline: population 3, positions 1..=4 all land on rows.
    // Rows without identifiers never reach the network
    fs::write(
        field_dir.join("derm2016.csv"),
        "PMID,a,b,c,d,e,f,g,PMCID,h,DOI\n,,,,,,,,,,\n,,,,,,,,,,\n,,,,,,,,,,\n,,,,,,,,,,",
    )
    .unwrap();
    let config = Config {
        field: "derm".to_string(),
        input_dir: dir.path().join("input"),
        output_dir: dir.path().join("output"),
        reports_dir: dir.path().join("reports"),
        sample_size: 2,
        ..Default::default()
    };
    bghprep_sample::paths::ensure_dirs(&config).unwrap();

    let router = RowRouter::new(
        UnpaywallClient::new(&config.unpaywall_url, &config.email),
        PmcOaClient::new(&config.pmc_oa_url, RetryPolicy::default()),
    );
    let mut rng = StdRng::seed_from_u64(3);
    let run = run_year(&config, 2016, &router, &mut rng, &ProgressContext::with_tty(false)).unwrap();
    assert_eq!(run.counters.total, 2);

    let lines = LOGGER.lines.lock().unwrap();
    let rows: Vec<&String> = lines
        .iter()
        .filter(|(_, msg)| msg.starts_with("Processing entry"))
        .map(|(level, msg)| {
            assert_eq!(*level, log::Level::Info, "{msg}");
            msg
        })
        .collect();
    assert_eq!(rows.len(), 2);
    for (i, msg) in rows.iter().enumerate() {
        assert!(msg.starts_with(&format!("Processing entry {} ", i + 1)), "{msg}");
        assert!(msg.ends_with(": discard"), "{msg}");
    }
}
