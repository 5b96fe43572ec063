//! Shutdown handling. Kept in its own test binary: the flag is process-global.

use std::fs;
use std::sync::Arc;

use bghprep_core::{ProgressContext, request_shutdown};
use bghprep_sample::Config;
use tempfile::TempDir;

#[test]
fn shutdown_before_first_row_interrupts_run() {
    let dir = TempDir::new().unwrap();
    let field_dir = dir.path().join("input/neuro");
    fs::create_dir_all(&field_dir).unwrap();
    fs::write(
        field_dir.join("neuro2012.csv"),
        "PMID,a,b,c,d,e,f,g,PMCID,h,DOI\n,,,,,,,,,,\n,,,,,,,,,,\n,,,,,,,,,,",
    )
    .unwrap();

    let config = Config {
        field: "neuro".to_string(),
        input_dir: dir.path().join("input"),
        output_dir: dir.path().join("output"),
        reports_dir: dir.path().join("reports"),
        sample_size: 2,
        seed: Some(1),
        ..Default::default()
    };

    request_shutdown();
    let summary =
        bghprep_sample::run(&config, 2012..=2014, Arc::new(ProgressContext::with_tty(false)))
            .unwrap();

    assert!(summary.interrupted);
    assert_eq!(summary.years.len(), 1);
    assert_eq!(summary.years[0].counters.total, 0);

    // Header only: the interrupted year gets no row
    let report = fs::read_to_string(dir.path().join("reports/neuro/neuroReport.csv")).unwrap();
    assert_eq!(report, "Year,UPW,PMC,NoPubMed,NoPDF,Total,Failed\n");
    // Outputs are still flushed and post-processed
    assert!(dir.path().join("output/neuro/neuro2012-UPW.jsonl.gz").exists());
    assert!(!dir.path().join("output/neuro/neuro2012-PMC.txt").exists());
}
