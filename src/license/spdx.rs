use crate::models::LicenseRisk;

/// Risk level of a single canonical SPDX identifier.
///
/// `-only` / `-or-later` suffixes and the `+` shorthand share the risk of their base license.
pub fn classify_spdx_id(id: &str) -> LicenseRisk {
    let id = id.trim();
    let base = id
        .strip_suffix("-or-later")
        .or_else(|| id.strip_suffix("-only"))
        .or_else(|| id.strip_suffix('+'))
        .unwrap_or(id);

    match base {
        "MIT" | "MIT-0" | "Apache-2.0" | "BSD-2-Clause" | "BSD-3-Clause" | "BSD-4-Clause"
        | "ISC" | "0BSD" | "Unlicense" | "Zlib" | "CC0-1.0" | "WTFPL" | "CC-BY-3.0"
        | "CC-BY-4.0" | "PSF-2.0" | "Python-2.0" | "BlueOak-1.0.0" | "Artistic-2.0" => {
            LicenseRisk::Permissive
        }

        "LGPL-2.0" | "LGPL-2.1" | "LGPL-3.0" | "MPL-1.1" | "MPL-2.0" | "EUPL-1.2"
        | "CDDL-1.0" | "CDDL-1.1" | "EPL-1.0" | "EPL-2.0" | "OSL-3.0" => {
            LicenseRisk::WeakCopyleft
        }

        "GPL-2.0" | "GPL-3.0" | "AGPL-1.0" | "AGPL-3.0" | "EUPL-1.1" | "SSPL-1.0" => {
            LicenseRisk::StrongCopyleft
        }

        "UNLICENSED" => LicenseRisk::Proprietary,

        _ => LicenseRisk::Unknown,
    }
}

/// Map the free-form spellings found in older `package.json` files to SPDX identifiers.
///
/// A trailing `*` marks a guessed license in some npm tooling output and is dropped.
pub fn normalize(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('*').trim();
    match trimmed.to_ascii_lowercase().as_str() {
        "mit license" | "the mit license" | "mit/x11" | "expat" => "MIT".to_string(),
        "apache 2.0" | "apache2" | "apache-2" | "apache license 2.0"
        | "apache license, version 2.0" | "apache, version 2.0" => "Apache-2.0".to_string(),
        "bsd" | "bsd license" | "new bsd" | "modified bsd" | "bsd 3-clause" => {
            "BSD-3-Clause".to_string()
        }
        "bsd 2-clause" | "simplified bsd" | "freebsd" => "BSD-2-Clause".to_string(),
        "isc license" => "ISC".to_string(),
        "gplv2" | "gpl v2" | "gnu gpl v2" => "GPL-2.0".to_string(),
        "gplv3" | "gpl v3" | "gnu gpl v3" => "GPL-3.0".to_string(),
        "lgplv2.1" | "lgpl v2.1" => "LGPL-2.1".to_string(),
        "lgplv3" | "lgpl v3" => "LGPL-3.0".to_string(),
        "agplv3" | "agpl v3" => "AGPL-3.0".to_string(),
        "mpl 2.0" | "mplv2" => "MPL-2.0".to_string(),
        "public domain" | "cc0" => "CC0-1.0".to_string(),
        _ => trimmed.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_with_suffixes() {
        assert_eq!(classify_spdx_id("GPL-3.0-or-later"), LicenseRisk::StrongCopyleft);
        assert_eq!(classify_spdx_id("LGPL-2.1-only"), LicenseRisk::WeakCopyleft);
        assert_eq!(classify_spdx_id("GPL-2.0+"), LicenseRisk::StrongCopyleft);
        assert_eq!(classify_spdx_id("ISC"), LicenseRisk::Permissive);
    }

    #[test]
    fn test_unlicensed_is_proprietary() {
        assert_eq!(classify_spdx_id("UNLICENSED"), LicenseRisk::Proprietary);
    }

    #[test]
    fn test_normalize_legacy_spellings() {
        assert_eq!(normalize("The MIT License"), "MIT");
        assert_eq!(normalize("Apache License, Version 2.0"), "Apache-2.0");
        assert_eq!(normalize("BSD*"), "BSD-3-Clause");
        assert_eq!(normalize("MIT*"), "MIT");
        assert_eq!(normalize("Custom"), "Custom");
    }
}
