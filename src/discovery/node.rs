use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde_json::Value;

use crate::models::DependencyRecord;

use super::Discover;

/// Production dependencies of an installed npm project.
///
/// Prefers `package-lock.json` (v2/v3 `packages` map, or the v1 `dependencies` tree);
/// without a lockfile the installed `node_modules` tree is walked from the root manifest.
pub struct NodeModulesDiscovery {
    root: PathBuf,
}

impl NodeModulesDiscovery {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl Discover for NodeModulesDiscovery {
    fn discover(&self) -> Result<Vec<DependencyRecord>> {
        let manifest = self.root.join("package.json");
        if !manifest.exists() {
            bail!("no package.json found in {}", self.root.display());
        }

        let lock = self.root.join("package-lock.json");
        let deps = if lock.exists() {
            parse_package_lock(&lock, &self.root)?
        } else {
            walk_node_modules(&self.root)?
        };

        tracing::debug!(root = %self.root.display(), count = deps.len(), "discovered production dependencies");
        Ok(deps)
    }
}

/// License strings a manifest (or lockfile entry) declares, in declaration order.
///
/// Handles `"license": "MIT"`, `"license": { "type": "MIT" }` and the legacy
/// `"licenses": [ ... ]` array of strings or `{ "type": ... }` objects.
pub fn declared_licenses(manifest: &Value) -> Vec<String> {
    let mut licenses = Vec::new();

    if let Some(license) = manifest.get("license").and_then(license_name) {
        licenses.push(license);
    }

    if let Some(list) = manifest.get("licenses").and_then(|v| v.as_array()) {
        licenses.extend(list.iter().filter_map(license_name));
    }

    licenses
}

fn license_name(value: &Value) -> Option<String> {
    let name = match value {
        Value::String(s) => s.as_str(),
        Value::Object(obj) => obj.get("type").and_then(|t| t.as_str())?,
        _ => return None,
    };
    let name = name.trim();
    (!name.is_empty()).then(|| name.to_string())
}

fn read_manifest(path: &Path) -> Result<Value> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("parsing {}", path.display()))
}

fn installed_licenses(package_dir: &Path) -> Vec<String> {
    read_manifest(&package_dir.join("package.json"))
        .map(|manifest| declared_licenses(&manifest))
        .unwrap_or_default()
}

fn is_flag_set(info: &Value, flag: &str) -> bool {
    info.get(flag).and_then(|v| v.as_bool()).unwrap_or(false)
}

fn parse_package_lock(lock_path: &Path, project_root: &Path) -> Result<Vec<DependencyRecord>> {
    let json = read_manifest(lock_path)?;
    let mut deps = Vec::new();
    let mut seen = HashSet::new();

    if let Some(packages) = json.get("packages").and_then(|v| v.as_object()) {
        for (pkg_path, info) in packages {
            // The empty key is the project itself.
            if pkg_path.is_empty() || is_flag_set(info, "dev") || is_flag_set(info, "link") {
                continue;
            }

            // "node_modules/a/node_modules/@scope/b" → "@scope/b"
            let name = info
                .get("name")
                .and_then(|v| v.as_str())
                .map(str::to_string)
                .unwrap_or_else(|| {
                    pkg_path
                        .rsplit_once("node_modules/")
                        .map_or(pkg_path.as_str(), |(_, name)| name)
                        .to_string()
                });

            let Some(version) = info.get("version").and_then(|v| v.as_str()) else {
                tracing::debug!(path = %pkg_path, "skipping lock entry without version");
                continue;
            };

            let mut licenses = declared_licenses(info);
            if licenses.is_empty() {
                licenses = installed_licenses(&project_root.join(pkg_path));
            }

            let record = DependencyRecord::from_parts(&name, version, licenses);
            if seen.insert(record.id.clone()) {
                deps.push(record);
            }
        }
    } else if let Some(tree) = json.get("dependencies").and_then(|v| v.as_object()) {
        collect_lock_v1(tree, project_root, &mut deps, &mut seen);
    } else {
        bail!(
            "{} has neither a `packages` nor a `dependencies` section",
            lock_path.display()
        );
    }

    Ok(deps)
}

/// Lockfile v1: a nested `dependencies` tree mirroring the `node_modules` layout.
fn collect_lock_v1(
    tree: &serde_json::Map<String, Value>,
    parent_dir: &Path,
    deps: &mut Vec<DependencyRecord>,
    seen: &mut HashSet<String>,
) {
    for (name, info) in tree {
        if is_flag_set(info, "dev") {
            continue;
        }

        let package_dir = parent_dir.join("node_modules").join(name);

        if let Some(version) = info.get("version").and_then(|v| v.as_str()) {
            let record =
                DependencyRecord::from_parts(name, version, installed_licenses(&package_dir));
            if seen.insert(record.id.clone()) {
                deps.push(record);
            }
        }

        if let Some(nested) = info.get("dependencies").and_then(|v| v.as_object()) {
            collect_lock_v1(nested, &package_dir, deps, seen);
        }
    }
}

/// Follow `dependencies` / `optionalDependencies` from the root manifest through `node_modules`.
fn walk_node_modules(root: &Path) -> Result<Vec<DependencyRecord>> {
    let mut deps = Vec::new();
    let mut seen_ids = HashSet::new();
    let mut visited = HashSet::new();
    let mut pending = vec![root.to_path_buf()];

    while let Some(dir) = pending.pop() {
        let manifest = read_manifest(&dir.join("package.json"))?;

        for (section, required) in [("dependencies", true), ("optionalDependencies", false)] {
            let Some(names) = manifest.get(section).and_then(|v| v.as_object()) else {
                continue;
            };

            for name in names.keys() {
                let Some(package_dir) = resolve_installed(root, &dir, name) else {
                    if required {
                        bail!(
                            "dependency `{}` of {} is not installed (run `npm install`)",
                            name,
                            dir.display()
                        );
                    }
                    continue;
                };

                if !visited.insert(package_dir.clone()) {
                    continue;
                }

                let installed = read_manifest(&package_dir.join("package.json"))?;
                let version = installed
                    .get("version")
                    .and_then(|v| v.as_str())
                    .unwrap_or("*");
                let record =
                    DependencyRecord::from_parts(name, version, declared_licenses(&installed));
                if seen_ids.insert(record.id.clone()) {
                    deps.push(record);
                }

                pending.push(package_dir);
            }
        }
    }

    deps.sort_by(|a, b| a.id.cmp(&b.id));
    Ok(deps)
}

/// Node's lookup: `<dir>/node_modules/<name>`, then each ancestor up to the project root.
fn resolve_installed(root: &Path, from: &Path, name: &str) -> Option<PathBuf> {
    for dir in from.ancestors() {
        let candidate = dir.join("node_modules").join(name);
        if candidate.join("package.json").exists() {
            return Some(candidate);
        }
        if dir == root {
            break;
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;

    fn write_package(dir: &Path, manifest: Value) {
        fs::create_dir_all(dir).unwrap();
        fs::write(dir.join("package.json"), manifest.to_string()).unwrap();
    }

    #[test]
    fn test_declared_license_shapes() {
        assert_eq!(declared_licenses(&json!({ "license": "MIT" })), vec!["MIT"]);
        assert_eq!(
            declared_licenses(&json!({ "license": { "type": "ISC" } })),
            vec!["ISC"]
        );
        assert_eq!(
            declared_licenses(&json!({ "licenses": ["MIT", { "type": "Apache-2.0" }] })),
            vec!["MIT", "Apache-2.0"]
        );
        assert!(declared_licenses(&json!({ "license": "  " })).is_empty());
    }

    #[test]
    fn test_missing_manifest_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(NodeModulesDiscovery::new(dir.path()).discover().is_err());
    }

    #[test]
    fn test_package_lock_v3_skips_root_and_dev() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write_package(root, json!({ "name": "app", "version": "1.0.0" }));
        fs::write(
            root.join("package-lock.json"),
            json!({
                "lockfileVersion": 3,
                "packages": {
                    "": { "name": "app", "version": "1.0.0" },
                    "node_modules/express": { "version": "4.18.2", "license": "MIT" },
                    "node_modules/jest": { "version": "29.0.0", "license": "MIT", "dev": true },
                    "node_modules/express/node_modules/@scope/util": { "version": "1.0.0" }
                }
            })
            .to_string(),
        )
        .unwrap();
        write_package(
            &root.join("node_modules/express/node_modules/@scope/util"),
            json!({ "name": "@scope/util", "version": "1.0.0", "license": "ISC" }),
        );

        let deps = NodeModulesDiscovery::new(root).discover().unwrap();
        let ids: Vec<&str> = deps.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["express@4.18.2", "@scope/util@1.0.0"]);
        assert_eq!(deps[1].declared_licenses, vec!["ISC"]);
    }

    #[test]
    fn test_package_lock_v1_tree() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write_package(root, json!({ "name": "app", "version": "1.0.0" }));
        fs::write(
            root.join("package-lock.json"),
            json!({
                "lockfileVersion": 1,
                "dependencies": {
                    "a": {
                        "version": "1.0.0",
                        "dependencies": { "b": { "version": "2.0.0" } }
                    },
                    "mocha": { "version": "3.0.0", "dev": true }
                }
            })
            .to_string(),
        )
        .unwrap();
        write_package(
            &root.join("node_modules/a"),
            json!({ "name": "a", "version": "1.0.0", "license": "MIT" }),
        );

        let deps = NodeModulesDiscovery::new(root).discover().unwrap();
        assert_eq!(deps.len(), 2);
        assert_eq!(deps[0].id, "a@1.0.0");
        assert_eq!(deps[0].declared_licenses, vec!["MIT"]);
        assert_eq!(deps[1].id, "b@2.0.0");
        assert!(deps[1].declared_licenses.is_empty());
    }

    #[test]
    fn test_walk_without_lockfile() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write_package(
            root,
            json!({
                "name": "app",
                "version": "1.0.0",
                "dependencies": { "a": "^1.0.0" },
                "devDependencies": { "jest": "^29.0.0" }
            }),
        );
        write_package(
            &root.join("node_modules/a"),
            json!({ "name": "a", "version": "1.0.0", "license": "MIT", "dependencies": { "b": "*" } }),
        );
        write_package(
            &root.join("node_modules/b"),
            json!({ "name": "b", "version": "2.0.0", "licenses": [{ "type": "BSD" }] }),
        );

        let deps = NodeModulesDiscovery::new(root).discover().unwrap();
        let ids: Vec<&str> = deps.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["a@1.0.0", "b@2.0.0"]);
        assert_eq!(deps[1].declared_licenses, vec!["BSD"]);
    }

    #[test]
    fn test_walk_missing_dependency_fails() {
        let dir = tempfile::tempdir().unwrap();
        write_package(
            dir.path(),
            json!({ "name": "app", "dependencies": { "a": "^1.0.0" } }),
        );
        let err = NodeModulesDiscovery::new(dir.path()).discover().unwrap_err();
        assert!(err.to_string().contains("`a`"));
    }
}
