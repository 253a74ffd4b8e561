use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use crate::cli::Cli;
use crate::gate::GateOptions;
use crate::policy::{LicenseMatching, Policy, UnlicensedRule};
use crate::report::ReportFormat;

/// Default report file name, relative to the project directory.
pub const DEFAULT_OUTPUT: &str = "THIRD-PARTY-LICENSE.txt";
/// Override file picked up automatically when it exists in the project directory.
pub const DEFAULT_OVERRIDES: &str = "THIRD-PARTY-LICENSE.json";

/// Root configuration structure, deserialized from `.license-gate/config.toml`.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub gate: GateConfig,
    #[serde(default)]
    pub policy: PolicyConfig,
}

/// Where the gate reads from and writes to.
#[derive(Debug, Default, Deserialize)]
pub struct GateConfig {
    pub overrides: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub format: Option<ReportFormat>,
    pub self_package: Option<String>,
    pub dependencies: Option<PathBuf>,
    /// Evaluate SPDX expressions instead of exact string matching.
    #[serde(default)]
    pub spdx: bool,
}

/// License rules. Supply `allowed` or `not_allowed`, never both.
#[derive(Debug, Default, Deserialize)]
pub struct PolicyConfig {
    pub allowed: Option<Vec<String>>,
    pub not_allowed: Option<Vec<String>>,
    #[serde(default)]
    pub unlicensed: UnlicensedRule,
}

impl PolicyConfig {
    pub fn to_policy(&self) -> Result<Policy> {
        let policy = match (&self.allowed, &self.not_allowed) {
            (Some(_), Some(_)) => {
                bail!("policy: set either `allowed` or `not_allowed`, not both")
            }
            (Some(allowed), None) => Policy::allow(allowed.iter().cloned()),
            (None, Some(denied)) => Policy::deny(denied.iter().cloned()),
            (None, None) => Policy::default(),
        };
        Ok(policy.with_unlicensed(self.unlicensed))
    }
}

/// Load the configuration, searching in order:
///
/// 1. `config_override` — path passed via `--config`
/// 2. `<project_path>/.license-gate/config.toml`
/// 3. `~/.config/license-gate/config.toml`
/// 4. Built-in [`Config::default`]
pub fn load_config(project_path: &Path, config_override: Option<&Path>) -> Result<Config> {
    if let Some(path) = config_override {
        return read_config(path);
    }

    let project_config = project_path.join(".license-gate").join("config.toml");
    if project_config.exists() {
        return read_config(&project_config);
    }

    if let Some(home) = dirs::home_dir() {
        let home_config = home
            .join(".config")
            .join("license-gate")
            .join("config.toml");
        if home_config.exists() {
            return read_config(&home_config);
        }
    }

    Ok(Config::default())
}

fn read_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    let config = toml::from_str(&content)
        .with_context(|| format!("parsing config {}", path.display()))?;
    tracing::debug!(path = %path.display(), "loaded config");
    Ok(config)
}

/// Everything `main` needs to run the gate.
#[derive(Debug)]
pub struct Settings {
    pub options: GateOptions,
    /// Pre-computed dependency records; `None` means scan `node_modules`.
    pub dependencies: Option<PathBuf>,
}

/// Merge CLI flags over the config file over defaults.
///
/// `npm_self_package` is the `name@version` npm exposes to package scripts, used when
/// neither the CLI nor the config names the project's own package.
pub fn resolve_settings(
    base_path: &Path,
    cli: &Cli,
    config: &Config,
    npm_self_package: Option<String>,
) -> Result<Settings> {
    let policy = if !cli.allow.is_empty() {
        Policy::allow(cli.allow.iter().cloned())
    } else if !cli.deny.is_empty() {
        Policy::deny(cli.deny.iter().cloned())
    } else {
        config.policy.to_policy()?
    };
    let unlicensed = cli.unlicensed.unwrap_or(config.policy.unlicensed);
    let policy = policy.with_unlicensed(unlicensed);

    let overrides_path = cli
        .overrides
        .clone()
        .or_else(|| config.gate.overrides.clone())
        .or_else(|| {
            let default = base_path.join(DEFAULT_OVERRIDES);
            default.exists().then(|| PathBuf::from(DEFAULT_OVERRIDES))
        });

    let output_path = cli
        .output
        .clone()
        .or_else(|| config.gate.output.clone())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT));

    let matching = if cli.spdx || config.gate.spdx {
        LicenseMatching::Spdx
    } else {
        LicenseMatching::Exact
    };

    let options = GateOptions {
        base_path: base_path.to_path_buf(),
        overrides_path,
        output_path,
        policy,
        matching,
        self_package: cli
            .self_package
            .clone()
            .or_else(|| config.gate.self_package.clone())
            .or(npm_self_package),
        format: cli.format.or(config.gate.format).unwrap_or_default(),
    };

    let dependencies = cli
        .dependencies
        .clone()
        .or_else(|| config.gate.dependencies.clone())
        .map(|path| {
            if path.is_absolute() {
                path
            } else {
                base_path.join(path)
            }
        });

    Ok(Settings {
        options,
        dependencies,
    })
}
