use std::collections::HashMap;

use colored::*;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table};

use crate::error::PolicyViolation;
use crate::gate::GateReport;
use crate::license::classifier::classify;
use crate::models::{LicenseRisk, ResolvedDependency};

/// Print the dependencies that failed the policy, before the error itself is reported.
pub fn render_violations(violation: &PolicyViolation) {
    println!(
        "\n {} {} dependencies violate the license policy ({})\n",
        "[ERROR]".red().bold(),
        violation.violations.len(),
        violation.policy
    );
    println!("{}", dependency_table(&violation.violations));
    println!();
}

/// Print the result of a successful run.
pub fn render_success(report: &GateReport, verbose: bool, quiet: bool) {
    if quiet {
        println!(
            "{} {} dependencies checked, report: {}",
            "✓".green(),
            report.entries.len(),
            report.output_path.display()
        );
        return;
    }

    println!(
        "\n {} v{}",
        "license-gate".bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!(" ┌────────────────────────────────────────────────────┐");
    println!(" │  {:<48} │", "SUMMARY".bold());
    println!(
        " │  {:<48} │",
        format!("Dependencies checked : {}", report.entries.len())
    );
    if let Some(id) = &report.excluded {
        println!(" │  {:<48} │", format!("Skipped (own package): {}", id));
    }
    println!(
        " │  {:<48} │",
        format!("{}  Licenses: {}", "✓".green(), summarize_licenses(&report.entries))
    );
    println!(" └────────────────────────────────────────────────────┘");
    println!(" Report written to {}\n", report.output_path.display());

    if verbose && !report.entries.is_empty() {
        println!("{}", dependency_table(&report.entries));
        println!();
    }
}

fn dependency_table(deps: &[ResolvedDependency]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Dependency").add_attribute(Attribute::Bold),
            Cell::new("License").add_attribute(Attribute::Bold),
            Cell::new("Source").add_attribute(Attribute::Bold),
            Cell::new("Risk").add_attribute(Attribute::Bold),
        ]);

    for dep in deps {
        let risk = classify(&dep.license);
        let risk_color = match risk {
            LicenseRisk::Permissive => Color::Green,
            LicenseRisk::WeakCopyleft => Color::Yellow,
            LicenseRisk::StrongCopyleft => Color::Red,
            LicenseRisk::Proprietary => Color::Magenta,
            LicenseRisk::Unknown => Color::DarkGrey,
        };

        table.add_row(vec![
            Cell::new(&dep.id),
            Cell::new(&dep.license),
            Cell::new(dep.source.to_string()),
            Cell::new(risk.to_string()).fg(risk_color),
        ]);
    }

    table
}

/// Top three licenses by count, e.g. `[MIT (12), ISC (4), Apache-2.0 (2)]`.
fn summarize_licenses(deps: &[ResolvedDependency]) -> String {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for dep in deps {
        *counts.entry(dep.license.as_str()).or_insert(0) += 1;
    }

    let mut pairs: Vec<(&str, usize)> = counts.into_iter().collect();
    // Ties broken by name so the summary is stable between runs.
    pairs.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));

    let summary: Vec<String> = pairs
        .iter()
        .take(3)
        .map(|(lic, cnt)| format!("{} ({})", lic, cnt))
        .collect();

    if summary.is_empty() {
        String::new()
    } else {
        format!("[{}]", summary.join(", "))
    }
}
