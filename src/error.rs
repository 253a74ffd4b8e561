use std::path::PathBuf;

use thiserror::Error;

use crate::models::ResolvedDependency;

/// Fatal outcomes of a gate run. Any of these stops the build.
#[derive(Debug, Error)]
pub enum GateError {
    /// The dependency list itself could not be produced.
    #[error("Parsing licenses failed: {0:#}")]
    Discovery(anyhow::Error),

    #[error("{0}")]
    PolicyViolation(PolicyViolation),

    #[error("Formatting license file failed: {0}")]
    Formatting(String),

    #[error("Writing license file {} failed: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Dependencies whose resolved license breaks the policy, in input order.
#[derive(Debug, Clone, PartialEq)]
pub struct PolicyViolation {
    /// Policy parameters as rendered by [`Policy::describe`](crate::policy::Policy::describe).
    pub policy: String,
    pub violations: Vec<ResolvedDependency>,
}

impl std::fmt::Display for PolicyViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Checking licenses failed: ")?;
        write!(f, "({})", self.policy)?;
        for dep in &self.violations {
            write!(f, "\n{}: {}", dep.id, dep.license)?;
        }
        Ok(())
    }
}
