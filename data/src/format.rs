//! Label and number formatting for tooltip fields.

use regex::Regex;
use std::sync::LazyLock;

static CAMEL_BOUNDARY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([a-z0-9])([A-Z])").expect("static regex")
});
static SEPARATORS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[\s_\-.]+").expect("static regex"));

/// Attribute names that identify a metadata row rather than describe the entity.
const INTERNAL_FIELDS: &[&str] = &["groupid", "grouplevel", "entityid", "level", "studyid"];

/// `InvestigatorLastName` / `investigator_last_name` -> `Investigator Last Name`.
pub fn normalize_key(key: &str) -> String {
    let spaced = CAMEL_BOUNDARY.replace_all(key.trim(), "$1 $2");

    SEPARATORS
        .split(&spaced)
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn is_internal(key: &str) -> bool {
    key.starts_with('_') || INTERNAL_FIELDS.contains(&key.to_ascii_lowercase().as_str())
}

/// Fixed precision with trailing zeros trimmed; non-finite values print as is.
pub fn format_number(value: f64, decimals: usize) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let fixed = format!("{value:.decimals$}");
    if fixed.contains('.') {
        fixed.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        fixed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_title_cased_words() {
        assert_eq!(normalize_key("InvestigatorLastName"), "Investigator Last Name");
        assert_eq!(normalize_key("site_number"), "Site Number");
        assert_eq!(normalize_key("n_pat"), "N Pat");
        assert_eq!(normalize_key("GroupID"), "Group ID");
    }

    #[test]
    fn internal_fields_are_filtered() {
        assert!(is_internal("GroupID"));
        assert!(is_internal("_order"));
        assert!(!is_internal("Country"));
    }

    #[test]
    fn numbers_trim_trailing_zeros() {
        assert_eq!(format_number(12.0, 2), "12");
        assert_eq!(format_number(0.126, 2), "0.13");
        assert_eq!(format_number(f64::NAN, 2), "NaN");
    }
}
