//! Aggregate per-field report: one row per processed year

use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};

use crate::counters::RunCounters;

pub const REPORT_HEADER: [&str; 7] = ["Year", "UPW", "PMC", "NoPubMed", "NoPDF", "Total", "Failed"];

/// Report CSV, opened once per multi-year run and appended to per year.
pub struct ReportWriter {
    writer: csv::Writer<File>,
}

impl ReportWriter {
    /// Create (truncate) the report and write its header.
    pub fn create(path: &Path) -> Result<Self> {
        let file = File::create(path)
            .with_context(|| format!("Failed to create report {}", path.display()))?;
        let mut writer = csv::WriterBuilder::new()
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(file);
        writer.write_record(REPORT_HEADER)?;
        writer.flush()?;
        Ok(Self { writer })
    }

    /// Append and flush one year's row, so an aborted run keeps finished years.
    pub fn append(&mut self, year: u16, counters: &RunCounters) -> Result<()> {
        let row = [
            year as usize,
            counters.upw,
            counters.pmc,
            counters.discard,
            counters.no_pdf,
            counters.total,
            counters.failed,
        ];
        self.writer.write_record(row.iter().map(|n| n.to_string()))?;
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_then_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cardioReport.csv");
        let mut report = ReportWriter::create(&path).unwrap();
        report
            .append(
                2012,
                &RunCounters {
                    total: 10,
                    upw: 4,
                    pmc: 3,
                    discard: 1,
                    no_pdf: 2,
                    failed: 0,
                },
            )
            .unwrap();
        // visible before drop
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            content,
            "Year,UPW,PMC,NoPubMed,NoPDF,Total,Failed\n2012,4,3,1,2,10,0\n"
        );

        report.append(2013, &RunCounters::default()).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 3);
        assert_eq!(content.lines().last(), Some("2013,0,0,0,0,0,0"));
    }
}
