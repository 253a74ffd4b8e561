//! Sources of [`DependencyRecord`]s for the gate.
//!
//! The gate never derives this list itself; it only consumes what a source returns.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::models::DependencyRecord;

pub mod node;

pub trait Discover {
    fn discover(&self) -> Result<Vec<DependencyRecord>>;
}

/// Records produced by another tool and saved as a JSON array.
pub struct JsonFileDiscovery {
    path: PathBuf,
}

impl JsonFileDiscovery {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Discover for JsonFileDiscovery {
    fn discover(&self) -> Result<Vec<DependencyRecord>> {
        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("reading {}", self.path.display()))?;
        let records: Vec<DependencyRecord> = serde_json::from_str(&content)
            .with_context(|| format!("parsing {}", self.path.display()))?;
        tracing::debug!(path = %self.path.display(), count = records.len(), "loaded dependency records");
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_json_file_discovery() {
        let mut f = NamedTempFile::new().unwrap();
        write!(
            f,
            r#"[{{"id":"a@1","declaredLicenses":["MIT"]}},{{"id":"b@2","declaredLicenses":[]}}]"#
        )
        .unwrap();
        let records = JsonFileDiscovery::new(f.path()).discover().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].declared_licenses, vec!["MIT".to_string()]);
    }

    #[test]
    fn test_json_file_discovery_errors() {
        let mut f = NamedTempFile::new().unwrap();
        write!(f, "not json").unwrap();
        assert!(JsonFileDiscovery::new(f.path()).discover().is_err());

        let dir = tempfile::tempdir().unwrap();
        assert!(JsonFileDiscovery::new(dir.path().join("missing.json"))
            .discover()
            .is_err());
    }
}
