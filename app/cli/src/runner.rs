//! FILENAME: app/cli/src/runner.rs
// PURPOSE: Runs configured reports: load, pivot, render.

use std::time::Instant;

use anyhow::{Context, Result};
use persistence::{load_worksheet, Worksheet};
use pivot_engine::{
    Analyzer, Dictionary, Leaderboard, Modeler, RenderedReport, Reporter, Table, TableOptions,
};
use serde::Serialize;

use crate::config::ReportConfig;
use crate::{log_debug, log_enter, log_error, log_exit, log_info};

/// Everything one report run produced.
#[derive(Debug, Clone)]
pub struct ReportOutput {
    pub name: String,
    pub report: RenderedReport,
    pub leaderboard: Option<Leaderboard>,
}

/// Machine-readable form printed with `--json`.
#[derive(Debug, Clone, Serialize)]
pub struct JsonReport<'a> {
    pub name: &'a str,
    pub summary: &'a [Vec<String>],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub leaderboard: Option<&'a Leaderboard>,
}

impl ReportOutput {
    pub fn to_json(&self) -> JsonReport<'_> {
        JsonReport {
            name: &self.name,
            summary: &self.report.summary,
            leaderboard: self.leaderboard.as_ref(),
        }
    }
}

/// Outcome of a batch.
#[derive(Debug, Default)]
pub struct BatchResult {
    pub outputs: Vec<ReportOutput>,
    /// Names of the reports that failed, with their error chain.
    pub failures: Vec<(String, String)>,
}

impl BatchResult {
    pub fn succeeded(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Loads the report's workbook off the async runtime's worker threads.
pub async fn load_source(config: &ReportConfig) -> Result<Worksheet> {
    let path = config.source.clone();
    let spec = config.sheet.clone();
    let worksheet = tokio::task::spawn_blocking(move || load_worksheet(&path, &spec))
        .await
        .context("Loader task failed")?
        .with_context(|| format!("Failed to load '{}'", config.source.display()))?;
    log_debug!(
        "LOAD",
        "{}: sheet '{}' of {}",
        config.name,
        worksheet.name,
        config.source.display()
    );
    Ok(worksheet)
}

/// Runs every report in order. A failing report is logged and skipped.
pub async fn run_batch(configs: &[&ReportConfig], verbose: bool) -> BatchResult {
    let mut batch = BatchResult::default();
    for config in configs {
        let result = match load_source(config).await {
            Ok(worksheet) => run_report(config, &worksheet, verbose),
            Err(err) => Err(err),
        };
        match result {
            Ok(output) => batch.outputs.push(output),
            Err(err) => {
                log_error!("RUN", "report '{}' failed: {:#}", config.name, err);
                batch.failures.push((config.name.clone(), format!("{:#}", err)));
            }
        }
    }
    batch
}

/// Builds the table, tree and rendered report of one configured report.
pub fn run_report(config: &ReportConfig, worksheet: &Worksheet, verbose: bool) -> Result<ReportOutput> {
    log_enter!("RUN", "run_report", "name={}", config.name);
    let started = Instant::now();

    let table = build_table(config, worksheet)
        .with_context(|| format!("Failed to read records of '{}'", config.name))?;
    log_info!(
        "RUN",
        "{}: {} records, {} columns",
        config.name,
        table.len(),
        table.headers().len()
    );

    let mut modeler = Modeler::new(&table, Analyzer::new(config.missing.clone()));
    let custom = config
        .custom
        .iter()
        .map(|spec| spec.to_custom(&table, &config.format))
        .collect();
    modeler
        .build(config.rows.clone(), config.cols.clone(), config.stats.clone(), custom)
        .with_context(|| format!("Invalid configuration of '{}'", config.name))?;

    let dictionary = display_dictionary(config);
    let mut options = config.options;
    options.verbose |= verbose;
    let report = Reporter::new(&modeler, &dictionary, config.format.clone(), options)
        .render(&title(config, worksheet))
        .with_context(|| format!("Failed to render '{}'", config.name))?;

    let leaderboard = config
        .leaderboard
        .as_ref()
        .map(|spec| Leaderboard::from_verbatim(&report.verbatim, spec));

    log_exit!(
        "RUN",
        "run_report",
        "name={} lines={} in {:?}",
        config.name,
        report.lines.len(),
        started.elapsed()
    );
    Ok(ReportOutput {
        name: config.name.clone(),
        report,
        leaderboard,
    })
}

fn build_table(config: &ReportConfig, worksheet: &Worksheet) -> Result<Table> {
    let mut options = TableOptions {
        sample_size: config.sample_size,
        missing: config.missing.clone(),
        ..TableOptions::default()
    };
    options.lookup.extend(&config.lookup);
    for entry in &config.dictionary {
        if let Some(kind) = entry.kind {
            options.types.insert(entry.key.clone(), kind);
        }
    }
    for (key, kind) in &config.types {
        options.types.insert(key.clone(), *kind);
    }
    Ok(Table::from_grid(&worksheet.grid, &worksheet.layout, options)?)
}

/// Statistic names first, configured labels on top.
fn display_dictionary(config: &ReportConfig) -> Dictionary {
    let mut dictionary = Dictionary::stat_names();
    dictionary.add(config.dictionary.iter().cloned());
    dictionary
}

/// "APAC bookings (31 Mar 2018)"
fn title(config: &ReportConfig, worksheet: &Worksheet) -> String {
    let name = config
        .title
        .clone()
        .or_else(|| worksheet.report_name.clone())
        .unwrap_or_else(|| config.name.clone());
    match worksheet.report_date {
        Some(date) => format!("{} ({})", name, date.format("%d %b %Y")),
        None => name,
    }
}
