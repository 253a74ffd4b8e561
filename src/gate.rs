//! The license gate: resolve one license per dependency, check it against the
//! policy, and either fail the build or write the third-party license report.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::discovery::Discover;
use crate::error::{GateError, PolicyViolation};
use crate::models::{DependencyRecord, LicenseSource, ResolvedDependency, NO_LICENSE};
use crate::overrides::LicenseOverrideMap;
use crate::policy::{LicenseMatching, Policy};
use crate::report::{ReportFormat, ReportFormatter};

/// Construction parameters for a [`Gate`].
#[derive(Debug, Clone)]
pub struct GateOptions {
    /// Project directory; relative override and output paths resolve against it.
    pub base_path: PathBuf,
    pub overrides_path: Option<PathBuf>,
    pub output_path: PathBuf,
    pub policy: Policy,
    pub matching: LicenseMatching,
    /// `name@version` of the project being built, excluded from every check.
    pub self_package: Option<String>,
    pub format: ReportFormat,
}

impl GateOptions {
    pub fn new(base_path: impl Into<PathBuf>, output_path: impl Into<PathBuf>, policy: Policy) -> Self {
        Self {
            base_path: base_path.into(),
            overrides_path: None,
            output_path: output_path.into(),
            policy,
            matching: LicenseMatching::default(),
            self_package: None,
            format: ReportFormat::default(),
        }
    }
}

/// Outcome of checking a dependency list, before anything is written.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    /// Every evaluated dependency, in input order.
    pub resolved: Vec<ResolvedDependency>,
    /// The policy-breaking subset of `resolved`, in input order.
    pub violations: Vec<ResolvedDependency>,
    /// Id of the record skipped as the project itself, if one was present.
    pub excluded: Option<String>,
}

impl Evaluation {
    pub fn is_compliant(&self) -> bool {
        self.violations.is_empty()
    }
}

/// A successful gate run.
#[derive(Debug, Clone, PartialEq)]
pub struct GateReport {
    pub output_path: PathBuf,
    pub entries: Vec<ResolvedDependency>,
    pub excluded: Option<String>,
}

pub struct Gate {
    overrides: LicenseOverrideMap,
    output_path: PathBuf,
    policy: Policy,
    matching: LicenseMatching,
    self_package: Option<String>,
    formatter: Box<dyn ReportFormatter>,
}

impl Gate {
    /// Build a gate. A missing or malformed override file only logs a warning.
    pub fn new(options: GateOptions) -> Self {
        let overrides = match &options.overrides_path {
            Some(path) => LicenseOverrideMap::load_or_default(&resolve(&options.base_path, path)),
            None => LicenseOverrideMap::default(),
        };

        Self {
            overrides,
            output_path: resolve(&options.base_path, &options.output_path),
            policy: options.policy,
            matching: options.matching,
            self_package: options.self_package,
            formatter: options.format.formatter(),
        }
    }

    /// Replace the report formatter chosen by [`GateOptions::format`].
    pub fn with_formatter(mut self, formatter: Box<dyn ReportFormatter>) -> Self {
        self.formatter = formatter;
        self
    }

    /// Replace the override map loaded at construction.
    pub fn with_overrides(mut self, overrides: LicenseOverrideMap) -> Self {
        self.overrides = overrides;
        self
    }

    pub fn overrides(&self) -> &LicenseOverrideMap {
        &self.overrides
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    /// Override, else first declared license, else `"none"`.
    pub fn resolve_license(&self, dep: &DependencyRecord) -> ResolvedDependency {
        let (license, source) = if let Some(license) = self.overrides.get(&dep.id) {
            (license.to_string(), LicenseSource::Override)
        } else if let Some(license) = dep
            .declared_licenses
            .iter()
            .map(|l| l.trim())
            .find(|l| !l.is_empty())
        {
            (license.to_string(), LicenseSource::Declared)
        } else {
            (NO_LICENSE.to_string(), LicenseSource::Undeclared)
        };

        ResolvedDependency {
            id: dep.id.clone(),
            license,
            source,
        }
    }

    /// Resolve and classify `deps` without side effects.
    pub fn check(&self, deps: &[DependencyRecord]) -> Evaluation {
        let mut resolved = Vec::with_capacity(deps.len());
        let mut violations = Vec::new();
        let mut excluded = None;

        for dep in deps {
            if self.self_package.as_deref() == Some(dep.id.as_str()) {
                tracing::debug!(id = %dep.id, "excluding the project's own package");
                excluded = Some(dep.id.clone());
                continue;
            }

            let dep = self.resolve_license(dep);
            if self.policy.is_violation(&dep.license, self.matching) {
                violations.push(dep.clone());
            }
            resolved.push(dep);
        }

        self.log_unused_overrides(deps);

        Evaluation {
            resolved,
            violations,
            excluded,
        }
    }

    /// Check `deps`; on success render the report and write it to the output path.
    ///
    /// Nothing is written when the check or the rendering fails.
    pub async fn evaluate(&self, deps: &[DependencyRecord]) -> Result<GateReport, GateError> {
        let evaluation = self.check(deps);

        if !evaluation.is_compliant() {
            return Err(GateError::PolicyViolation(PolicyViolation {
                policy: self.policy.describe(),
                violations: evaluation.violations,
            }));
        }

        let content = self
            .formatter
            .render(&evaluation.resolved)
            .map_err(|e| GateError::Formatting(format!("{:#}", e)))?;

        write_atomically(&self.output_path, content.as_bytes()).await?;

        tracing::info!(
            path = %self.output_path.display(),
            dependencies = evaluation.resolved.len(),
            "license report written"
        );

        Ok(GateReport {
            output_path: self.output_path.clone(),
            entries: evaluation.resolved,
            excluded: evaluation.excluded,
        })
    }

    /// Build-stage hook: discover dependencies once the build output is final, then evaluate.
    pub async fn on_emit(&self, discovery: &dyn Discover) -> Result<GateReport, GateError> {
        let deps = discovery.discover().map_err(GateError::Discovery)?;
        self.evaluate(&deps).await
    }

    fn log_unused_overrides(&self, deps: &[DependencyRecord]) {
        if self.overrides.is_empty() {
            return;
        }
        let ids: HashSet<&str> = deps.iter().map(|d| d.id.as_str()).collect();
        for id in self.overrides.ids().filter(|id| !ids.contains(id)) {
            tracing::debug!(id = %id, "license override matches no dependency");
        }
    }
}

fn resolve(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

/// Write to a sibling temp file and rename it over the target.
async fn write_atomically(path: &Path, content: &[u8]) -> Result<(), GateError> {
    let write_err = |source| GateError::Write {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
    }

    let mut tmp_name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    tmp_name.push(format!(".{}.tmp", std::process::id()));
    let tmp_path = path.with_file_name(tmp_name);

    if let Err(err) = tokio::fs::write(&tmp_path, content).await {
        let _ = tokio::fs::remove_file(&tmp_path).await;
        return Err(write_err(err));
    }

    if let Err(err) = tokio::fs::rename(&tmp_path, path).await {
        let _ = tokio::fs::remove_file(&tmp_path).await;
        return Err(write_err(err));
    }

    Ok(())
}
