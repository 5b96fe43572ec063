//! Run subcommand - sample one field over a range of years

use std::path::PathBuf;

use anyhow::{Result, bail};
use bghprep_core::SharedProgress;
use bghprep_core::progress::fmt_num;
use bghprep_sample::Summary;
use clap::Args;
use comfy_table::{Cell, CellAlignment, Color, Table, modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL};

use crate::config::Config;

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Research field (input subdirectory and file prefix)
    pub field: String,

    /// First year to sample
    #[arg(long)]
    pub start: Option<u16>,

    /// Last year to sample (inclusive)
    #[arg(long)]
    pub end: Option<u16>,

    /// Rows sampled per year
    #[arg(short, long)]
    pub samples: Option<usize>,

    /// Contact email sent to Unpaywall
    #[arg(short, long)]
    pub email: Option<String>,

    /// RNG seed for a reproducible sample
    #[arg(long)]
    pub seed: Option<u64>,

    /// Input root (default from config: ./input)
    #[arg(long)]
    pub input_dir: Option<PathBuf>,

    /// Output root (default from config: ./output)
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Reports root (default from config: ./reports)
    #[arg(long)]
    pub reports_dir: Option<PathBuf>,
}

impl RunArgs {
    /// Merge CLI flags over config file values.
    fn sample_config(&self, config: &Config) -> bghprep_sample::Config {
        bghprep_sample::Config {
            field: self.field.clone(),
            input_dir: self
                .input_dir
                .clone()
                .unwrap_or_else(|| config.paths.input_dir.clone()),
            output_dir: self
                .output_dir
                .clone()
                .unwrap_or_else(|| config.paths.output_dir.clone()),
            reports_dir: self
                .reports_dir
                .clone()
                .unwrap_or_else(|| config.paths.reports_dir.clone()),
            sample_size: self.samples.unwrap_or(config.sample.size),
            email: self
                .email
                .clone()
                .unwrap_or_else(|| config.email().to_string()),
            seed: self.seed.or(config.sample.seed),
            columns: config.columns.clone(),
            unpaywall_url: config.http.unpaywall_url.clone(),
            pmc_oa_url: config.http.pmc_oa_url.clone(),
        }
    }

    fn years(&self, config: &Config) -> Result<(u16, u16)> {
        let start = self.start.unwrap_or(config.sample.start_year);
        let end = self.end.unwrap_or(config.sample.end_year);
        if start > end {
            bail!("--start ({start}) is after --end ({end})");
        }
        Ok((start, end))
    }
}

pub fn run(args: RunArgs, config: &Config, progress: &SharedProgress) -> Result<()> {
    if args.field.trim().is_empty() {
        bail!("field must not be empty");
    }
    let (start, end) = args.years(config)?;
    let sample_config = args.sample_config(config);

    log::info!("Sampling {} for {start}-{end}", sample_config.field);
    log::info!("  Input: {}", sample_config.input_dir.display());
    log::info!("  Output: {}", sample_config.output_dir.display());
    log::info!("  Samples per year: {}", sample_config.sample_size);

    let summary = bghprep_sample::run(&sample_config, start..=end, progress.clone())?;
    print_summary(&summary);

    if summary.interrupted {
        bail!("Interrupted");
    }
    Ok(())
}

fn print_summary(summary: &Summary) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(
            ["Year", "UPW", "PMC", "NoPubMed", "NoPDF", "Failed", "Total", "Time"]
                .into_iter()
                .map(|h| Cell::new(h).fg(Color::Cyan)),
        );

    let row = |label: String, c: &bghprep_sample::RunCounters, secs: f64| {
        let mut cells = vec![Cell::new(label)];
        cells.extend(
            [c.upw, c.pmc, c.discard, c.no_pdf, c.failed, c.total]
                .into_iter()
                .map(|n| Cell::new(fmt_num(n)).set_alignment(CellAlignment::Right)),
        );
        cells.push(Cell::new(format!("{secs:.1}s")).set_alignment(CellAlignment::Right));
        cells
    };

    for run in &summary.years {
        let label = if run.interrupted {
            format!("{} (interrupted)", run.year)
        } else {
            run.year.to_string()
        };
        table.add_row(row(label, &run.counters, run.elapsed.as_secs_f64()));
    }
    table.add_row(row(
        "All".to_string(),
        &summary.total(),
        summary.elapsed.as_secs_f64(),
    ));

    eprintln!("\n{} ({})\n{table}", summary.field, summary.report.display());
}
