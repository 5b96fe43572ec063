//! Main runner: one sampling pass per year, aggregated into the field report

use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::ops::RangeInclusive;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use bghprep_core::progress::fmt_num;
use bghprep_core::{
    ProgressContext, RetryPolicy, SharedProgress, compress_in_place, count_lines,
    is_shutdown_requested, remove_if_exists, select_positions,
};
use csv::StringRecord;
use indicatif::ProgressBar;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::columns::ColumnMap;
use crate::config::Config;
use crate::counters::RunCounters;
use crate::cursor::{SampleCursor, Step};
use crate::lookup::{MetadataLookup, PdfLocator, PmcOaClient, UnpaywallClient};
use crate::paths::{RunPaths, ensure_dirs, report_path};
use crate::report::ReportWriter;
use crate::router::RowRouter;
use crate::sinks::{FileSinks, OutputSinks};

/// Result of one (field, year) run
#[derive(Debug, Clone)]
pub struct YearRun {
    pub year: u16,
    /// Data rows in the input (header excluded)
    pub population: usize,
    /// Positions drawn (after clamping)
    pub sample_size: usize,
    pub counters: RunCounters,
    pub elapsed: Duration,
    /// Stopped early on SIGINT/SIGTERM
    pub interrupted: bool,
}

/// Multi-year execution summary
#[derive(Debug)]
pub struct Summary {
    pub field: String,
    pub years: Vec<YearRun>,
    pub report: PathBuf,
    pub interrupted: bool,
    pub elapsed: Duration,
}

impl Summary {
    /// Counters summed over all years.
    pub fn total(&self) -> RunCounters {
        let mut total = RunCounters::default();
        for run in &self.years {
            total += run.counters;
        }
        total
    }
}

/// Outcome of one pass over an input stream.
#[derive(Debug, Clone, Copy, Default)]
pub struct SamplePass {
    pub counters: RunCounters,
    pub interrupted: bool,
}

/// Run the sampling pipeline for every year in `years`.
///
/// The report is truncated at start and gets one flushed row per completed
/// year. An interrupted year gets no report row and ends the loop.
pub fn run(config: &Config, years: RangeInclusive<u16>, progress: SharedProgress) -> Result<Summary> {
    let start = Instant::now();
    ensure_dirs(config)?;

    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let router = RowRouter::new(
        UnpaywallClient::new(&config.unpaywall_url, &config.email),
        PmcOaClient::new(&config.pmc_oa_url, RetryPolicy::from_http_config()),
    );

    let report = report_path(config);
    let mut report_writer = ReportWriter::create(&report)?;

    let mut summary = Summary {
        field: config.field.clone(),
        years: Vec::new(),
        report,
        interrupted: false,
        elapsed: Duration::ZERO,
    };

    for year in years {
        let run = run_year(config, year, &router, &mut rng, &progress)?;
        if run.interrupted {
            log::warn!("{} {year}: interrupted, no report row written", config.field);
            summary.interrupted = true;
            summary.years.push(run);
            break;
        }
        report_writer.append(year, &run.counters)?;
        summary.years.push(run);
    }

    summary.elapsed = start.elapsed();
    Ok(summary)
}

/// Sample one year's input, route the sampled rows, and post-process outputs.
pub fn run_year<M, P, R>(
    config: &Config,
    year: u16,
    router: &RowRouter<M, P>,
    rng: &mut R,
    progress: &ProgressContext,
) -> Result<YearRun>
where
    M: MetadataLookup,
    P: PdfLocator,
    R: Rng + ?Sized,
{
    let start = Instant::now();
    let paths = RunPaths::new(config, year);

    let population = count_lines(&paths.input, true)
        .with_context(|| format!("Failed to count lines of {}", paths.input.display()))?;
    log::info!("{}: {} entries", paths.input.display(), fmt_num(population));

    let positions = select_positions(rng, population, config.sample_size);
    let sample_size = positions.len();
    log::info!(
        "Processing {} samples of {}",
        fmt_num(sample_size),
        paths.input.display()
    );

    let input = File::open(&paths.input)
        .map(BufReader::new)
        .with_context(|| format!("Failed to open {}", paths.input.display()))?;
    let mut sinks = FileSinks::create(&paths.metadata, &paths.manifest, &paths.dump)
        .context("Failed to create output files")?;

    let pb = progress.row_bar(&format!("{} {year}", config.field), sample_size);
    let pass = sample_rows(input, positions, &config.columns, router, &mut sinks, &pb)?;
    pb.finish_and_clear();

    let finished = sinks.finish().context("Failed to flush output files")?;
    let dump_rows = finished.dump_rows;
    drop(finished);
    finalize_outputs(&paths, &pass.counters, dump_rows)?;

    let run = YearRun {
        year,
        population,
        sample_size,
        counters: pass.counters,
        elapsed: start.elapsed(),
        interrupted: pass.interrupted,
    };
    log_year(&paths, &run);
    Ok(run)
}

/// Walk `input` once, routing the rows at `positions`.
///
/// Ordinals are physical lines after the header, the same unit
/// [`count_lines`] counts, so a blank line takes up a position and routes
/// as a row with no identifiers. Only sampled lines are parsed as CSV.
///
/// Stops as soon as every position is consumed, at end of input, or when
/// shutdown is requested.
pub fn sample_rows<R, W, M, P>(
    mut input: R,
    positions: Vec<usize>,
    columns: &ColumnMap,
    router: &RowRouter<M, P>,
    sinks: &mut OutputSinks<W>,
    pb: &ProgressBar,
) -> Result<SamplePass>
where
    R: BufRead,
    W: Write,
    M: MetadataLookup,
    P: PdfLocator,
{
    let mut line = Vec::new();
    let mut record = StringRecord::new();

    input.read_until(b'\n', &mut line).context("Failed to read header row")?;
    let header = line.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(&line);
    parse_line(header, &mut record).context("Failed to parse header row")?;
    let resolved = columns.resolve(&record)?;

    // Without a bar, the log is the only per-row progress
    let row_level = if pb.is_hidden() {
        log::Level::Info
    } else {
        log::Level::Debug
    };

    let mut cursor = SampleCursor::new(positions);
    let mut pass = SamplePass::default();

    while !cursor.is_done() {
        if is_shutdown_requested() {
            pass.interrupted = true;
            break;
        }
        line.clear();
        if input.read_until(b'\n', &mut line).context("Failed to read input row")? == 0 {
            log::debug!(
                "input ended after {} of {} sampled rows",
                cursor.consumed(),
                cursor.target()
            );
            break;
        }
        let Step::Sample(ordinal) = cursor.advance() else {
            continue;
        };

        parse_line(&line, &mut record).with_context(|| format!("Failed to parse row {ordinal}"))?;
        let ids = resolved.extract(&record);
        let outcome = router
            .route(&ids, sinks, &mut pass.counters)
            .with_context(|| format!("Failed to process row {ordinal}"))?;
        log::log!(
            row_level,
            "Processing entry {} (row {ordinal}): {}",
            pass.counters.total,
            outcome.label()
        );
        pb.inc(1);
        pb.set_message(outcome.label());
    }

    Ok(pass)
}

/// Parse one physical line into `record`; a blank line leaves it empty.
fn parse_line(line: &[u8], record: &mut StringRecord) -> Result<()> {
    record.clear();
    csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(line)
        .read_record(record)?;
    Ok(())
}

/// Gzip the metadata file; drop the manifest and dump when they hold no rows.
fn finalize_outputs(paths: &RunPaths, counters: &RunCounters, dump_rows: usize) -> Result<()> {
    let gz = compress_in_place(&paths.metadata)
        .with_context(|| format!("Failed to compress {}", paths.metadata.display()))?;
    log::debug!("compressed to {}", gz.display());

    if counters.pmc == 0 {
        remove_if_exists(&paths.manifest)
            .with_context(|| format!("Failed to remove {}", paths.manifest.display()))?;
    }
    if dump_rows == 0 {
        remove_if_exists(&paths.dump)
            .with_context(|| format!("Failed to remove {}", paths.dump.display()))?;
    }
    Ok(())
}

fn log_year(paths: &RunPaths, run: &YearRun) {
    let c = &run.counters;
    log::info!(
        "{} entries processed in {:.2} seconds",
        c.total,
        run.elapsed.as_secs_f64()
    );
    log::info!("{} entries saved to {}.gz", c.upw, paths.metadata.display());
    log::info!("{} entries saved to {}", c.pmc, paths.manifest.display());
    log::info!("{} entries discarded due to missing information", c.discard);
    log::info!("{} entries discarded due to unavailable pdf downloads", c.no_pdf);
    if c.failed > 0 {
        log::warn!("{} entries failed PMC OA lookup after retries", c.failed);
    }
}
