use anyhow::{Context, Result};
use serde::Serialize;

use crate::models::{LicenseSource, ResolvedDependency};

use super::ReportFormatter;

pub struct JsonFormatter;

#[derive(Serialize)]
struct Entry<'a> {
    id: &'a str,
    name: &'a str,
    version: &'a str,
    license: &'a str,
    source: LicenseSource,
}

impl ReportFormatter for JsonFormatter {
    fn render(&self, deps: &[ResolvedDependency]) -> Result<String> {
        let entries: Vec<Entry<'_>> = deps
            .iter()
            .map(|dep| Entry {
                id: &dep.id,
                name: dep.name(),
                version: dep.version(),
                license: &dep.license,
                source: dep.source,
            })
            .collect();

        let mut out =
            serde_json::to_string_pretty(&entries).context("serializing license report")?;
        out.push('\n');
        Ok(out)
    }
}
