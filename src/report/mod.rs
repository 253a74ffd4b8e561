//! Report rendering.
//!
//! - [`text`] — `standard` (one `id: license` line per dependency) and `detailed` formats.
//! - [`json`] / [`csv`] — machine-readable report files.
//! - [`terminal`] — colored console output for the CLI; never written to the report file.

pub mod csv;
pub mod json;
pub mod terminal;
pub mod text;

use anyhow::Result;
use serde::Deserialize;

use crate::models::ResolvedDependency;

/// Renders the report artifact written on a successful gate run.
pub trait ReportFormatter: Send + Sync {
    fn render(&self, deps: &[ResolvedDependency]) -> Result<String>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Standard,
    Detailed,
    Json,
    Csv,
}

impl ReportFormat {
    pub fn formatter(self) -> Box<dyn ReportFormatter> {
        match self {
            ReportFormat::Standard => Box::new(text::StandardFormatter),
            ReportFormat::Detailed => Box::new(text::DetailedFormatter),
            ReportFormat::Json => Box::new(json::JsonFormatter),
            ReportFormat::Csv => Box::new(csv::CsvFormatter),
        }
    }
}
