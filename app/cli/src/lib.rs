//! FILENAME: app/cli/src/lib.rs
// PURPOSE: Report runner: configuration, logging, terminal output.

pub mod config;
pub mod logging;
pub mod runner;
pub mod terminal;

pub use config::{ReportConfig, ReportsFile};
pub use runner::{run_batch, run_report, BatchResult, ReportOutput};
