use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};

/// Manual `id → license` assignments that win over detected licenses.
///
/// File format is a flat JSON object, e.g. `{ "k15t-aui-ng2@0.0.23": "MIT" }`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LicenseOverrideMap {
    entries: HashMap<String, String>,
}

impl LicenseOverrideMap {
    /// Load overrides, degrading to an empty map with a warning when the file
    /// cannot be read or parsed. Never fails.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(map) => {
                tracing::debug!(path = %path.display(), entries = map.len(), "loaded license overrides");
                map
            }
            Err(err) => {
                tracing::warn!("couldn't read license config {}: {:#}", path.display(), err);
                Self::default()
            }
        }
    }

    fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let entries: HashMap<String, String> = serde_json::from_str(&content)
            .with_context(|| format!("parsing {}", path.display()))?;
        Ok(Self { entries })
    }

    /// The override for `id`, ignoring empty values.
    pub fn get(&self, id: &str) -> Option<&str> {
        self.entries
            .get(id)
            .map(String::as_str)
            .filter(|license| !license.trim().is_empty())
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, String)> for LicenseOverrideMap {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_valid_file() {
        let mut f = NamedTempFile::new().unwrap();
        write!(f, r#"{{ "a@1": "MIT", "b@2": "" }}"#).unwrap();
        let map = LicenseOverrideMap::load_or_default(f.path());
        assert_eq!(map.len(), 2);
        assert_eq!(map.get("a@1"), Some("MIT"));
        assert_eq!(map.get("b@2"), None);
        assert_eq!(map.get("c@3"), None);
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let map = LicenseOverrideMap::load_or_default(&dir.path().join("nope.json"));
        assert!(map.is_empty());
    }

    #[test]
    fn test_malformed_file_is_empty() {
        let mut f = NamedTempFile::new().unwrap();
        write!(f, r#"{{ "a@1": ["MIT"] "#).unwrap();
        assert!(LicenseOverrideMap::load_or_default(f.path()).is_empty());
    }
}
