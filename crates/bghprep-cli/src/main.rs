//! bghprep - prepare biblio-glutton-harvester inputs from PubMed exports
//!
//! Samples yearly CSV exports per research field and resolves each sampled
//! row against Unpaywall and the PMC OA web service.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod cmd;
mod config;

use config::Config;

#[derive(Parser)]
#[command(name = "bghprep")]
#[command(about = "Sample PubMed exports into biblio-glutton-harvester inputs")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    /// Config file path (default: ./bghprep.toml or ~/.config/bghprep/config.toml)
    #[arg(short, long, global = true)]
    config: Option<std::path::PathBuf>,

    /// Request timeout in seconds
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Maximum retry attempts for transient PMC OA failures
    #[arg(long, global = true)]
    max_retries: Option<u32>,
}

#[derive(Subcommand)]
enum Command {
    /// Sample one field over a range of years
    Run(cmd::run::RunArgs),
    /// Show current configuration
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Progress context (TTY auto-detect)
    let progress = Arc::new(bghprep_core::ProgressContext::new());

    // Logging:
    //   TTY:     quiet (warn) unless --debug, the row bar shows activity
    //   non-TTY: info unless --debug, logs are the only progress indicator
    let is_tty = progress.is_tty();
    let multi = if is_tty { Some(progress.multi()) } else { None };
    let quiet = if is_tty { !cli.debug } else { false };
    bghprep_core::init_logging(quiet, cli.debug, multi);

    let config = if let Some(path) = cli.config {
        Config::from_file(&path)?
    } else {
        Config::load()?
    };

    // Config file defaults, CLI overrides
    let http_config = bghprep_core::HttpConfig {
        request_timeout: Duration::from_secs(cli.timeout.unwrap_or(config.http.timeout)),
        max_retries: cli.max_retries.unwrap_or(config.http.max_retries),
        backoff_base: Duration::from_secs(config.http.backoff),
    };
    bghprep_core::set_http_config(http_config);

    match cli.command {
        Command::Run(args) => {
            bghprep_core::install_signal_handlers()?;
            cmd::run::run(args, &config, &progress)
        }
        Command::Config => {
            use comfy_table::{
                Cell, Color, Table, modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL,
            };

            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .apply_modifier(UTF8_ROUND_CORNERS)
                .set_header(vec![
                    Cell::new("Setting").fg(Color::Cyan),
                    Cell::new("Value").fg(Color::Cyan),
                ]);

            table.add_row(vec!["Sample size", &config.sample.size.to_string()]);
            table.add_row(vec![
                "Years",
                &format!("{}-{}", config.sample.start_year, config.sample.end_year),
            ]);
            table.add_row(vec!["Unpaywall email", config.email()]);
            table.add_row(vec![
                "Seed",
                &config
                    .sample
                    .seed
                    .map_or_else(|| "random".to_string(), |s| s.to_string()),
            ]);
            table.add_row(vec![
                "Input directory",
                &config.paths.input_dir.display().to_string(),
            ]);
            table.add_row(vec![
                "Output directory",
                &config.paths.output_dir.display().to_string(),
            ]);
            table.add_row(vec![
                "Reports directory",
                &config.paths.reports_dir.display().to_string(),
            ]);
            table.add_row(vec![
                "Columns (PMID/PMCID/DOI)",
                &format!(
                    "{:?} / {:?} / {:?}",
                    config.columns.pubmed_id, config.columns.pmc_id, config.columns.doi
                ),
            ]);
            table.add_row(vec!["Unpaywall URL", &config.http.unpaywall_url]);
            table.add_row(vec!["PMC OA URL", &config.http.pmc_oa_url]);
            table.add_row(vec!["Timeout", &format!("{}s", http_config.request_timeout.as_secs())]);
            table.add_row(vec!["Max retries", &http_config.max_retries.to_string()]);
            table.add_row(vec!["Backoff", &format!("{}s", config.http.backoff)]);

            eprintln!("\n{table}");
            Ok(())
        }
    }
}
