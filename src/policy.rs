use serde::Deserialize;

use crate::license::expression::Expr;
use crate::license::spdx::normalize;
use crate::models::NO_LICENSE;

/// How a dependency without any license (`"none"`) is judged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum UnlicensedRule {
    /// Follow the policy kind: an allow-list checks membership, a deny-list rejects.
    #[default]
    Policy,
    Allow,
    Deny,
}

/// How a resolved license string is compared with the policy list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LicenseMatching {
    /// Plain string membership.
    #[default]
    Exact,
    /// Exact membership first, then SPDX expression evaluation over normalized identifiers.
    Spdx,
}

/// The license rule set a gate enforces. Exactly one kind is active.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Policy {
    Allow {
        licenses: Vec<String>,
        unlicensed: UnlicensedRule,
    },
    Deny {
        licenses: Vec<String>,
        unlicensed: UnlicensedRule,
    },
}

impl Default for Policy {
    /// Nothing is explicitly denied; dependencies without a license still fail.
    fn default() -> Self {
        Policy::Deny {
            licenses: Vec::new(),
            unlicensed: UnlicensedRule::Policy,
        }
    }
}

impl Policy {
    pub fn allow<I, S>(licenses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Policy::Allow {
            licenses: licenses.into_iter().map(Into::into).collect(),
            unlicensed: UnlicensedRule::Policy,
        }
    }

    pub fn deny<I, S>(licenses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Policy::Deny {
            licenses: licenses.into_iter().map(Into::into).collect(),
            unlicensed: UnlicensedRule::Policy,
        }
    }

    pub fn with_unlicensed(self, rule: UnlicensedRule) -> Self {
        match self {
            Policy::Allow { licenses, .. } => Policy::Allow {
                licenses,
                unlicensed: rule,
            },
            Policy::Deny { licenses, .. } => Policy::Deny {
                licenses,
                unlicensed: rule,
            },
        }
    }

    /// Whether `license` (already resolved) breaks this policy.
    pub fn is_violation(&self, license: &str, matching: LicenseMatching) -> bool {
        match self {
            Policy::Allow {
                licenses,
                unlicensed,
            } => allow_list_violation(licenses, *unlicensed, license, matching),
            Policy::Deny {
                licenses,
                unlicensed,
            } => deny_list_violation(licenses, *unlicensed, license, matching),
        }
    }

    /// The policy parameters as shown in a failure message, e.g. `allowed: MIT,ISC`.
    pub fn describe(&self) -> String {
        match self {
            Policy::Allow {
                licenses,
                unlicensed,
            } => {
                let mut shown = licenses.clone();
                if *unlicensed == UnlicensedRule::Allow && !shown.iter().any(|l| l == NO_LICENSE) {
                    shown.push(NO_LICENSE.to_string());
                }
                format!("allowed: {}", shown.join(","))
            }
            Policy::Deny {
                licenses,
                unlicensed,
            } => {
                let mut shown = licenses.clone();
                if *unlicensed != UnlicensedRule::Allow && !shown.iter().any(|l| l == NO_LICENSE) {
                    shown.push(NO_LICENSE.to_string());
                }
                format!("not allowed: {}", shown.join(","))
            }
        }
    }
}

fn allow_list_violation(
    allowed: &[String],
    unlicensed: UnlicensedRule,
    license: &str,
    matching: LicenseMatching,
) -> bool {
    if license == NO_LICENSE {
        return match unlicensed {
            UnlicensedRule::Allow => false,
            UnlicensedRule::Deny => true,
            UnlicensedRule::Policy => !contains(allowed, NO_LICENSE),
        };
    }

    if contains(allowed, license) {
        return false;
    }

    match matching {
        LicenseMatching::Exact => true,
        LicenseMatching::Spdx if contains(allowed, &normalize(license)) => false,
        LicenseMatching::Spdx => !Expr::parse(license)
            .map(|expr| expr.satisfied_by(&|id| contains(allowed, &normalize(id))))
            .unwrap_or(false),
    }
}

fn deny_list_violation(
    denied: &[String],
    unlicensed: UnlicensedRule,
    license: &str,
    matching: LicenseMatching,
) -> bool {
    if license == NO_LICENSE {
        return unlicensed != UnlicensedRule::Allow;
    }

    if contains(denied, license) {
        return true;
    }

    match matching {
        LicenseMatching::Exact => false,
        LicenseMatching::Spdx if contains(denied, &normalize(license)) => true,
        // Unparseable text cannot be shown to be denied.
        LicenseMatching::Spdx => Expr::parse(license)
            .map(|expr| !expr.satisfied_by(&|id| !contains(denied, &normalize(id))))
            .unwrap_or(false),
    }
}

fn contains(list: &[String], license: &str) -> bool {
    list.iter().any(|l| l == license)
}

#[cfg(test)]
mod tests {
    use super::*;

    use LicenseMatching::{Exact, Spdx};

    #[test]
    fn test_allow_list_membership() {
        let policy = Policy::allow(["MIT", "ISC"]);
        assert!(!policy.is_violation("MIT", Exact));
        assert!(policy.is_violation("GPL-3.0", Exact));
    }

    #[test]
    fn test_deny_list_membership() {
        let policy = Policy::deny(["GPL-3.0"]);
        assert!(!policy.is_violation("MIT", Exact));
        assert!(policy.is_violation("GPL-3.0", Exact));
    }

    #[test]
    fn test_unlicensed_follows_policy_kind() {
        assert!(Policy::allow(["MIT"]).is_violation(NO_LICENSE, Exact));
        assert!(!Policy::allow(["MIT", "none"]).is_violation(NO_LICENSE, Exact));
        assert!(Policy::deny(Vec::<String>::new()).is_violation(NO_LICENSE, Exact));
    }

    #[test]
    fn test_unlicensed_rule_overrides_kind_default() {
        let allow = Policy::allow(["MIT"]).with_unlicensed(UnlicensedRule::Allow);
        assert!(!allow.is_violation(NO_LICENSE, Exact));

        let deny = Policy::deny(["GPL-3.0"]).with_unlicensed(UnlicensedRule::Allow);
        assert!(!deny.is_violation(NO_LICENSE, Exact));

        let strict = Policy::allow(["MIT", "none"]).with_unlicensed(UnlicensedRule::Deny);
        assert!(strict.is_violation(NO_LICENSE, Exact));
    }

    #[test]
    fn test_exact_matching_ignores_expressions() {
        let policy = Policy::allow(["MIT"]);
        assert!(policy.is_violation("(MIT OR Apache-2.0)", Exact));
        assert!(!Policy::deny(["GPL-3.0"]).is_violation("GPL-3.0 OR MIT", Exact));
    }

    #[test]
    fn test_spdx_allow_list() {
        let policy = Policy::allow(["MIT", "Apache-2.0"]);
        assert!(!policy.is_violation("(MIT OR GPL-3.0)", Spdx));
        assert!(policy.is_violation("MIT AND GPL-3.0", Spdx));
        assert!(!policy.is_violation("The MIT License", Spdx));
    }

    #[test]
    fn test_spdx_deny_list() {
        let policy = Policy::deny(["GPL-3.0"]);
        assert!(!policy.is_violation("GPL-3.0 OR MIT", Spdx));
        assert!(policy.is_violation("MIT AND GPL-3.0", Spdx));
        assert!(policy.is_violation("GPLv3", Spdx));
    }

    #[test]
    fn test_describe() {
        assert_eq!(Policy::allow(["MIT", "ISC"]).describe(), "allowed: MIT,ISC");
        assert_eq!(Policy::deny(["GPL-3.0"]).describe(), "not allowed: GPL-3.0,none");
        assert_eq!(
            Policy::deny(["GPL-3.0"])
                .with_unlicensed(UnlicensedRule::Allow)
                .describe(),
            "not allowed: GPL-3.0"
        );
    }
}
