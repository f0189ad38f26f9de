//! Whitelist and type checks for untrusted preference payloads (imports,
//! server profiles, UI patches).

use dashsync_domain::constants::SUPPORTED_LANGUAGES;
use dashsync_domain::{SidebarView, TableDensity, Theme, ValidationReport};
use serde_json::{Map, Value};

/// Validate a partial preference object.
///
/// Absent or `null` fields are not checked. Every error message starts
/// with the offending field name.
pub fn validate_preferences(payload: &Value) -> ValidationReport {
    let Some(fields) = payload.as_object() else {
        return ValidationReport::from_errors(vec![
            "preferences: expected a JSON object".to_string()
        ]);
    };

    let mut errors = Vec::new();

    check_one_of(fields, "language", SUPPORTED_LANGUAGES, &mut errors);
    check_one_of(fields, "theme", &names(Theme::ALL, Theme::as_str), &mut errors);
    check_one_of(
        fields,
        "sidebarView",
        &names(SidebarView::ALL, SidebarView::as_str),
        &mut errors,
    );
    check_one_of(
        fields,
        "tableDensity",
        &names(TableDensity::ALL, TableDensity::as_str),
        &mut errors,
    );

    if let Some(value) = present(fields, "timezone") {
        if !value.is_string() {
            errors.push("timezone: expected a string".to_string());
        }
    }

    if let Some(value) = present(fields, "sidebarCollapsed") {
        if !value.is_boolean() {
            errors.push("sidebarCollapsed: expected a boolean".to_string());
        }
    }

    ValidationReport::from_errors(errors)
}

fn present<'a>(fields: &'a Map<String, Value>, name: &str) -> Option<&'a Value> {
    fields.get(name).filter(|value| !value.is_null())
}

fn names<T>(all: &[T], as_str: fn(&T) -> &'static str) -> Vec<&'static str> {
    all.iter().map(as_str).collect()
}

fn check_one_of(
    fields: &Map<String, Value>,
    name: &str,
    allowed: &[&str],
    errors: &mut Vec<String>,
) {
    let Some(value) = present(fields, name) else {
        return;
    };

    match value.as_str() {
        Some(s) if allowed.contains(&s) => {}
        Some(s) => errors.push(format!("{name}: '{s}' is not one of {}", allowed.join(", "))),
        None => errors.push(format!("{name}: expected a string")),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn empty_object_is_valid() {
        assert_eq!(validate_preferences(&json!({})), ValidationReport::valid());
    }

    #[test]
    fn every_unsupported_language_mentions_language() {
        for code in ["EN", "it", "", "english", "zh-CN"] {
            let report = validate_preferences(&json!({ "language": code }));
            assert!(!report.is_valid, "{code} should be rejected");
            assert!(report.errors[0].contains("language"));
        }
    }

    #[test]
    fn supported_languages_pass() {
        for code in SUPPORTED_LANGUAGES {
            assert!(validate_preferences(&json!({ "language": code })).is_valid);
        }
    }

    #[test]
    fn enum_fields_are_checked() {
        let report = validate_preferences(&json!({
            "theme": "blue",
            "sidebarView": "hidden",
            "tableDensity": "spacious",
        }));

        assert_eq!(report.errors.len(), 3);
        assert!(report.errors[0].starts_with("theme"));
        assert!(report.errors[1].starts_with("sidebarView"));
        assert!(report.errors[2].starts_with("tableDensity"));
    }

    #[test]
    fn type_mismatches_are_reported() {
        let report = validate_preferences(&json!({
            "timezone": 3,
            "sidebarCollapsed": "yes",
            "theme": true,
        }));

        assert!(!report.is_valid);
        assert!(report.errors.contains(&"timezone: expected a string".to_string()));
        assert!(report.errors.contains(&"sidebarCollapsed: expected a boolean".to_string()));
        assert!(report.errors.contains(&"theme: expected a string".to_string()));
    }

    #[test]
    fn null_fields_count_as_unset() {
        assert!(validate_preferences(&json!({ "language": null, "timezone": null })).is_valid);
    }

    #[test]
    fn non_object_payload_is_rejected() {
        assert!(!validate_preferences(&json!(["theme", "dark"])).is_valid);
    }
}
