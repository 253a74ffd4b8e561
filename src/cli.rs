use std::path::PathBuf;

use clap::Parser;

use crate::policy::UnlicensedRule;
use crate::report::ReportFormat;

#[derive(Parser, Debug, Default)]
#[command(
    name = "license-gate",
    about = "Fail the build when production dependencies violate the license policy",
    version
)]
pub struct Cli {
    /// Project directory (contains package.json)
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Config file [default: ./.license-gate/config.toml, fallback ~/.config/license-gate/config.toml]
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Permitted licenses; anything else fails (comma separated or repeated)
    #[arg(long, value_name = "LICENSE", value_delimiter = ',', conflicts_with = "deny")]
    pub allow: Vec<String>,

    /// Forbidden licenses; dependencies without a license fail too unless --unlicensed allow
    #[arg(long, value_name = "LICENSE", value_delimiter = ',')]
    pub deny: Vec<String>,

    /// How dependencies without any license are judged
    #[arg(long, value_name = "RULE")]
    pub unlicensed: Option<UnlicensedRule>,

    /// Evaluate SPDX expressions such as "(MIT OR Apache-2.0)" instead of exact matching
    #[arg(long)]
    pub spdx: bool,

    /// JSON file mapping dependency id to license [default: THIRD-PARTY-LICENSE.json if present]
    #[arg(long, value_name = "FILE")]
    pub overrides: Option<PathBuf>,

    /// Report destination [default: THIRD-PARTY-LICENSE.txt]
    #[arg(long, short, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Report format
    #[arg(long, value_name = "FORMAT")]
    pub format: Option<ReportFormat>,

    /// Read dependency records from a JSON file instead of scanning node_modules
    #[arg(long, value_name = "FILE")]
    pub dependencies: Option<PathBuf>,

    /// Id (name@version) of the project itself, skipped during the check
    #[arg(long, value_name = "ID")]
    pub self_package: Option<String>,

    /// Show every checked dependency and debug logs
    #[arg(short, long)]
    pub verbose: bool,

    /// Only print a summary line
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}
