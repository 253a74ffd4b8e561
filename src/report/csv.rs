use std::fmt::Write;

use anyhow::Result;

use crate::models::ResolvedDependency;

use super::ReportFormatter;

pub struct CsvFormatter;

impl ReportFormatter for CsvFormatter {
    fn render(&self, deps: &[ResolvedDependency]) -> Result<String> {
        let mut out = String::from("name,version,license,source\n");
        for dep in deps {
            writeln!(
                out,
                "{},{},{},{}",
                quote(dep.name()),
                quote(dep.version()),
                quote(&dep.license),
                dep.source
            )?;
        }
        Ok(out)
    }
}

fn quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LicenseSource;

    #[test]
    fn test_csv_rows() {
        let deps = vec![ResolvedDependency {
            id: "a@1.0.0".to_string(),
            license: "MIT OR \"Apache\"".to_string(),
            source: LicenseSource::Override,
        }];
        let out = CsvFormatter.render(&deps).unwrap();
        assert_eq!(
            out,
            "name,version,license,source\n\"a\",\"1.0.0\",\"MIT OR \"\"Apache\"\"\",override\n"
        );
    }
}
