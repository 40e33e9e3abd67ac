//! FILENAME: app/cli/src/config.rs
// PURPOSE: Report configuration file (JSON).

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use persistence::SheetSpec;
use pivot_engine::{
    CalculationSpec, DictionaryEntry, Formatter, GroupingSpec, LeaderboardSpec, Lookup,
    MissingPolicy, ReportOptions, SemanticType, StatsSpec,
};
use serde::Deserialize;

/// Top-level configuration: a batch of reports.
#[derive(Debug, Clone, Deserialize)]
pub struct ReportsFile {
    pub reports: Vec<ReportConfig>,
}

/// One report: where the data is and how to pivot it.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportConfig {
    pub name: String,

    /// Printed above the report. Defaults to the sheet's report name, then `name`.
    #[serde(default)]
    pub title: Option<String>,

    /// Workbook path, relative to the configuration file.
    pub source: PathBuf,

    #[serde(default)]
    pub sheet: SheetSpec,

    pub rows: Vec<GroupingSpec>,

    #[serde(default)]
    pub cols: Vec<GroupingSpec>,

    pub stats: Vec<StatsSpec>,

    #[serde(default)]
    pub custom: Vec<CalculationSpec>,

    /// Labels and type overrides for column keys and values.
    #[serde(default)]
    pub dictionary: Vec<DictionaryEntry>,

    /// Extra canonical labels on top of the built-in ones.
    #[serde(default)]
    pub lookup: Lookup,

    /// Column types that replace the inferred ones.
    #[serde(default)]
    pub types: BTreeMap<String, SemanticType>,

    #[serde(default)]
    pub missing: MissingPolicy,

    /// Leading data rows sampled for type inference.
    #[serde(default)]
    pub sample_size: Option<usize>,

    #[serde(default)]
    pub options: ReportOptions,

    #[serde(default)]
    pub format: Formatter,

    #[serde(default)]
    pub leaderboard: Option<LeaderboardSpec>,
}

impl ReportsFile {
    /// Reads and validates a configuration file. Relative sources are
    /// resolved against the file's directory.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config '{}'", path.display()))?;
        let mut file = Self::parse(&text)
            .with_context(|| format!("Invalid config '{}'", path.display()))?;

        let base = path.parent().unwrap_or_else(|| Path::new(""));
        for report in &mut file.reports {
            if report.source.is_relative() {
                report.source = base.join(&report.source);
            }
        }
        Ok(file)
    }

    pub fn parse(text: &str) -> Result<Self> {
        let file: ReportsFile = serde_json::from_str(text)?;
        file.validate()?;
        Ok(file)
    }

    fn validate(&self) -> Result<()> {
        if self.reports.is_empty() {
            bail!("no reports configured");
        }
        let mut seen = std::collections::BTreeSet::new();
        for report in &self.reports {
            if !seen.insert(report.name.as_str()) {
                bail!("report '{}' is configured twice", report.name);
            }
            if report.rows.is_empty() {
                bail!("report '{}' has no row groupings", report.name);
            }
            if report.stats.is_empty() {
                bail!("report '{}' has no stats", report.name);
            }
        }
        Ok(())
    }

    /// The reports to run: all of them, or only `name`.
    pub fn select(&self, only: Option<&str>) -> Result<Vec<&ReportConfig>> {
        match only {
            None => Ok(self.reports.iter().collect()),
            Some(name) => match self.reports.iter().find(|r| r.name == name) {
                Some(report) => Ok(vec![report]),
                None => bail!("no report named '{}'", name),
            },
        }
    }
}
