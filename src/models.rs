use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// License string used when neither an override nor a declared license exists.
pub const NO_LICENSE: &str = "none";

/// One installed third-party package as reported by a discovery source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyRecord {
    /// `name@version`
    pub id: String,
    #[serde(default, alias = "licenses")]
    pub declared_licenses: Vec<String>,
}

impl DependencyRecord {
    pub fn new(id: impl Into<String>, declared_licenses: Vec<String>) -> Self {
        Self {
            id: id.into(),
            declared_licenses,
        }
    }

    /// Build the `name@version` id used throughout the gate.
    pub fn from_parts(name: &str, version: &str, declared_licenses: Vec<String>) -> Self {
        Self::new(format!("{}@{}", name, version), declared_licenses)
    }

    pub fn name(&self) -> &str {
        split_id(&self.id).0
    }

    pub fn version(&self) -> &str {
        split_id(&self.id).1
    }
}

/// Split `name@version`, keeping the leading `@` of scoped npm packages in the name.
pub fn split_id(id: &str) -> (&str, &str) {
    static ID_RE: OnceLock<Regex> = OnceLock::new();
    let re = ID_RE.get_or_init(|| {
        Regex::new(r"^(@?[^@]+)@(.*)$").expect("dependency id pattern is valid")
    });

    match re.captures(id) {
        Some(caps) => {
            let name = caps.get(1).map_or(id, |m| m.as_str());
            let version = caps.get(2).map_or("", |m| m.as_str());
            (name, version)
        }
        None => (id, ""),
    }
}

/// A dependency after license resolution.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedDependency {
    pub id: String,
    pub license: String,
    pub source: LicenseSource,
}

impl ResolvedDependency {
    pub fn name(&self) -> &str {
        split_id(&self.id).0
    }

    pub fn version(&self) -> &str {
        split_id(&self.id).1
    }
}

/// Where a resolved license came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LicenseSource {
    Override,
    Declared,
    Undeclared,
}

impl std::fmt::Display for LicenseSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LicenseSource::Override => write!(f, "override"),
            LicenseSource::Declared => write!(f, "declared"),
            LicenseSource::Undeclared => write!(f, "undeclared"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LicenseRisk {
    Permissive,
    WeakCopyleft,
    StrongCopyleft,
    Proprietary,
    Unknown,
}

impl std::fmt::Display for LicenseRisk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LicenseRisk::Permissive => write!(f, "Permissive"),
            LicenseRisk::WeakCopyleft => write!(f, "Weak Copyleft"),
            LicenseRisk::StrongCopyleft => write!(f, "Strong Copyleft"),
            LicenseRisk::Proprietary => write!(f, "Proprietary"),
            LicenseRisk::Unknown => write!(f, "Unknown"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_plain_id() {
        let dep = DependencyRecord::new("lodash@4.17.21", vec![]);
        assert_eq!(dep.name(), "lodash");
        assert_eq!(dep.version(), "4.17.21");
    }

    #[test]
    fn test_split_scoped_id() {
        assert_eq!(split_id("@angular/core@2.0.0"), ("@angular/core", "2.0.0"));
    }

    #[test]
    fn test_split_without_version() {
        assert_eq!(split_id("left-pad"), ("left-pad", ""));
    }

    #[test]
    fn test_deserialize_record_aliases() {
        let a: DependencyRecord =
            serde_json::from_str(r#"{"id":"a@1","declaredLicenses":["MIT"]}"#).unwrap();
        let b: DependencyRecord =
            serde_json::from_str(r#"{"id":"a@1","licenses":["MIT"]}"#).unwrap();
        let c: DependencyRecord = serde_json::from_str(r#"{"id":"a@1"}"#).unwrap();
        assert_eq!(a, b);
        assert!(c.declared_licenses.is_empty());
    }
}
