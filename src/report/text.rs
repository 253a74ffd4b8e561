use std::fmt::Write;

use anyhow::Result;

use crate::license::classifier::classify;
use crate::models::ResolvedDependency;

use super::ReportFormatter;

/// `id: license`, one line per dependency.
pub struct StandardFormatter;

impl ReportFormatter for StandardFormatter {
    fn render(&self, deps: &[ResolvedDependency]) -> Result<String> {
        let mut out = String::new();
        for dep in deps {
            writeln!(out, "{}: {}", dep.id, dep.license)?;
        }
        Ok(out)
    }
}

/// Standard lines plus license source and risk, under a short header.
pub struct DetailedFormatter;

impl ReportFormatter for DetailedFormatter {
    fn render(&self, deps: &[ResolvedDependency]) -> Result<String> {
        let mut out = String::new();
        writeln!(out, "Third-party licenses ({} dependencies)", deps.len())?;
        writeln!(out)?;
        for dep in deps {
            writeln!(
                out,
                "{}: {} [{}, {}]",
                dep.id,
                dep.license,
                dep.source,
                classify(&dep.license)
            )?;
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LicenseSource;

    fn dep(id: &str, license: &str, source: LicenseSource) -> ResolvedDependency {
        ResolvedDependency {
            id: id.to_string(),
            license: license.to_string(),
            source,
        }
    }

    #[test]
    fn test_standard_lines_in_order() {
        let deps = vec![
            dep("b@2", "ISC", LicenseSource::Declared),
            dep("a@1", "MIT", LicenseSource::Override),
        ];
        let out = StandardFormatter.render(&deps).unwrap();
        assert_eq!(out, "b@2: ISC\na@1: MIT\n");
    }

    #[test]
    fn test_standard_empty() {
        assert_eq!(StandardFormatter.render(&[]).unwrap(), "");
    }

    #[test]
    fn test_detailed_includes_source_and_risk() {
        let deps = vec![dep("a@1", "GPL-3.0", LicenseSource::Override)];
        let out = DetailedFormatter.render(&deps).unwrap();
        assert!(out.starts_with("Third-party licenses (1 dependencies)\n"));
        assert!(out.contains("a@1: GPL-3.0 [override, Strong Copyleft]"));
    }
}
