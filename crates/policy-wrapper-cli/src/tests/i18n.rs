// crates/policy-wrapper-cli/src/tests/i18n.rs
// ============================================================================
// Module: CLI i18n Tests
// Description: Unit tests for catalog parity and locale parsing.
// Purpose: Keep CLI localization consistent across supported locales.
// Dependencies: policy-wrapper-cli i18n module
// ============================================================================

//! ## Overview
//! Verifies the message catalogs stay in sync, locale parsing is tolerant,
//! and translated templates keep the English placeholder set.

use std::collections::BTreeSet;

use crate::i18n::Locale;
use crate::i18n::render;

/// Every locale with a catalog.
const LOCALES: [Locale; 2] = [Locale::En, Locale::Ca];

/// Collects `{name}` placeholders from a template.
fn placeholder_names(template: &str) -> Result<BTreeSet<String>, String> {
    let mut names = BTreeSet::new();
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        let after = &rest[start + 1 ..];
        let end = after.find('}').ok_or_else(|| format!("unclosed '{{' in '{template}'"))?;
        let name = &after[.. end];
        if name.is_empty() || !name.chars().all(|ch| ch.is_ascii_lowercase() || ch == '_') {
            return Err(format!("invalid placeholder '{name}' in '{template}'"));
        }
        names.insert(name.to_string());
        rest = &after[end + 1 ..];
    }
    if rest.contains('}') {
        return Err(format!("unmatched '}}' in '{template}'"));
    }
    Ok(names)
}

/// Returns the key set of a locale's catalog.
fn keys(locale: Locale) -> BTreeSet<&'static str> {
    locale.catalog().iter().map(|(key, _)| *key).collect()
}

#[test]
fn catalogs_have_matching_keys() {
    for locale in LOCALES {
        assert_eq!(keys(Locale::En), keys(locale), "catalog parity ({locale:?})");
    }
}

#[test]
fn catalogs_have_unique_keys_per_locale() {
    for locale in LOCALES {
        assert_eq!(keys(locale).len(), locale.catalog().len(), "duplicate keys ({locale:?})");
    }
}

#[test]
fn catalogs_have_placeholder_parity_with_english() {
    for (key, en_template) in Locale::En.catalog() {
        let expected = placeholder_names(en_template).expect("valid English template");
        for locale in LOCALES {
            let template = locale.template(key).expect("key present");
            let actual = placeholder_names(template).expect("valid localized template");
            assert_eq!(expected, actual, "placeholder mismatch for '{key}' ({locale:?})");
        }
    }
}

#[test]
fn locale_parse_accepts_region_tags() {
    assert_eq!(Locale::parse("en"), Some(Locale::En));
    assert_eq!(Locale::parse(" CA "), Some(Locale::Ca));
    assert_eq!(Locale::parse("ca_ES"), Some(Locale::Ca));
    assert_eq!(Locale::parse("en-GB"), Some(Locale::En));
    assert_eq!(Locale::parse("fr"), None);
    assert_eq!(Locale::parse(""), None);
}

#[test]
fn render_substitutes_placeholders() {
    let message = render(
        Locale::En,
        "config.load_failed",
        &[("path", "wrapper.yaml".to_string()), ("error", "missing".to_string())],
    );
    assert_eq!(message, "Failed to load transformer config wrapper.yaml: missing");
}

#[test]
fn render_localizes_and_falls_back_to_key() {
    let message = render(Locale::Ca, "function.document_invalid", &[("error", "x".to_string())]);
    assert_eq!(message, "Document de recurs no vàlid: x");
    assert_eq!(render(Locale::Ca, "no.such.key", &[]), "no.such.key");
}
