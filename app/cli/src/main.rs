//! FILENAME: app/cli/src/main.rs
//! Reports CLI - sales pivot reports from spreadsheet exports

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use persistence::{load_worksheet, SheetSpec};
use pivot_engine::{Table, TableOptions};
use reports_lib::logging;
use reports_lib::{log_info, log_warn, terminal, ReportsFile};

#[derive(Parser)]
#[command(name = "reports")]
#[command(author, version, about = "Pivot reports from sales spreadsheet exports")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Write the full debug log to this file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    /// Echo engine debug output and render verbose rows
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the reports of a configuration file
    Run {
        /// Report configuration (JSON)
        config: PathBuf,

        /// Run only the report with this name
        #[arg(long)]
        only: Option<String>,

        /// Print `{ name, summary }` per report as JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Show the inferred column types of a worksheet
    Inspect {
        /// Input workbook (xlsx)
        input: PathBuf,

        /// Sheet name (default: first sheet)
        #[arg(short, long)]
        sheet: Option<String>,

        /// 1-based header row
        #[arg(long, default_value = "1")]
        header_row: u32,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Some(path) = &cli.log_file {
        if let Err(e) = logging::init_log_file(path) {
            eprintln!("[LOG_INIT] {}", e);
        }
    }
    logging::install(cli.verbose);

    let result = match cli.command {
        Commands::Run { config, only, json } => {
            run(&config, only.as_deref(), json, cli.verbose).await
        }
        Commands::Inspect {
            input,
            sheet,
            header_row,
        } => inspect(input, sheet, header_row).await,
    };

    if cli.log_file.is_some() {
        if let Err(e) = logging::sort_log_file() {
            eprintln!("[LOG_ERROR] {}", e);
        }
    }

    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Returns false when any report failed.
async fn run(config: &Path, only: Option<&str>, json: bool, verbose: bool) -> Result<bool> {
    let file = ReportsFile::load(config)?;
    let selected = file.select(only)?;
    log_info!("RUN", "running {} report(s) from {}", selected.len(), config.display());

    let batch = reports_lib::run_batch(&selected, verbose).await;

    if json {
        let reports: Vec<_> = batch.outputs.iter().map(|o| o.to_json()).collect();
        let text = serde_json::to_string_pretty(&reports).context("Failed to encode JSON")?;
        println!("{}", text);
    } else {
        let colors = terminal::colors_enabled();
        for output in &batch.outputs {
            for line in terminal::render(&output.report.lines, colors) {
                println!("{}", line);
            }
            if let Some(board) = &output.leaderboard {
                println!();
                for line in terminal::render(&board.lines(), colors) {
                    println!("{}", line);
                }
            }
            println!();
        }
    }

    for (name, error) in &batch.failures {
        log_warn!("RUN", "skipped '{}': {}", name, error);
    }
    log_info!(
        "RUN",
        "{} succeeded, {} failed",
        batch.outputs.len(),
        batch.failures.len()
    );
    Ok(batch.succeeded())
}

async fn inspect(input: PathBuf, sheet: Option<String>, header_row: u32) -> Result<bool> {
    let spec = SheetSpec {
        sheet,
        header_row,
        ..SheetSpec::default()
    };
    let path = input.clone();
    let worksheet = tokio::task::spawn_blocking(move || load_worksheet(&path, &spec))
        .await
        .context("Loader task failed")?
        .with_context(|| format!("Failed to open '{}'", input.display()))?;

    let table = Table::from_grid(&worksheet.grid, &worksheet.layout, TableOptions::default())
        .context("Failed to read records")?;

    println!("{} ({} records)", worksheet.name, table.len());
    let width = table.headers().iter().map(|h| h.chars().count()).max().unwrap_or(0);
    for key in table.headers() {
        println!("  {:<width$}  {}", key, table.key_type(key), width = width);
    }
    Ok(true)
}
