use crate::license::expression::Expr;
use crate::license::spdx::{classify_spdx_id, normalize};
use crate::models::{LicenseRisk, NO_LICENSE};

/// Classify a resolved license string into a risk level for reporting.
///
/// `OR` takes the most permissive alternative, `AND` the most restrictive component.
pub fn classify(license: &str) -> LicenseRisk {
    let trimmed = license.trim();
    if trimmed.is_empty() || trimmed == NO_LICENSE {
        return LicenseRisk::Unknown;
    }

    let lower = trimmed.to_lowercase();
    if lower.contains("proprietary") || lower.contains("commercial") {
        return LicenseRisk::Proprietary;
    }

    let direct = classify_spdx_id(&normalize(trimmed));
    if direct != LicenseRisk::Unknown {
        return direct;
    }

    match Expr::parse(trimmed) {
        Some(expr) => classify_expr(&expr),
        None => LicenseRisk::Unknown,
    }
}

fn classify_expr(expr: &Expr) -> LicenseRisk {
    match expr {
        Expr::License(id) => classify_spdx_id(&normalize(id)),
        Expr::Or(a, b) => most_permissive(classify_expr(a), classify_expr(b)),
        Expr::And(a, b) => most_restrictive(classify_expr(a), classify_expr(b)),
    }
}

fn permissive_rank(risk: &LicenseRisk) -> u8 {
    match risk {
        LicenseRisk::Permissive => 0,
        LicenseRisk::WeakCopyleft => 1,
        LicenseRisk::StrongCopyleft => 2,
        LicenseRisk::Proprietary => 3,
        LicenseRisk::Unknown => 4,
    }
}

fn restrictive_rank(risk: &LicenseRisk) -> u8 {
    match risk {
        LicenseRisk::Proprietary => 0,
        LicenseRisk::StrongCopyleft => 1,
        LicenseRisk::WeakCopyleft => 2,
        LicenseRisk::Permissive => 3,
        LicenseRisk::Unknown => 4,
    }
}

fn most_permissive(a: LicenseRisk, b: LicenseRisk) -> LicenseRisk {
    if permissive_rank(&b) < permissive_rank(&a) {
        b
    } else {
        a
    }
}

fn most_restrictive(a: LicenseRisk, b: LicenseRisk) -> LicenseRisk {
    if restrictive_rank(&b) < restrictive_rank(&a) {
        b
    } else {
        a
    }
}
