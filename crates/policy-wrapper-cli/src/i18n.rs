// crates/policy-wrapper-cli/src/i18n.rs
// ============================================================================
// Module: CLI Internationalization Helpers
// Description: Message catalog and translation utilities for the CLI.
// Purpose: Centralize user-facing strings of the wrapper function.
// Dependencies: Standard library only.
// ============================================================================

//! ## Overview
//! User-facing strings of the wrapper function live in two const catalogs
//! and are rendered through the [`t!`](crate::t) macro. The locale is chosen
//! once at startup; unknown keys fall back to English and then to the key.

use std::sync::OnceLock;

// ============================================================================
// SECTION: Locale
// ============================================================================

/// Supported CLI locales.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Locale {
    /// English (default).
    En,
    /// Catalan.
    Ca,
}

impl Locale {
    /// Parses a locale value (case-insensitive, tolerant of region tags).
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.split(['-', '_']).next().unwrap_or_default() {
            "en" => Some(Self::En),
            "ca" => Some(Self::Ca),
            _ => None,
        }
    }

    /// Returns the catalog of this locale.
    pub(crate) const fn catalog(self) -> &'static [(&'static str, &'static str)] {
        match self {
            Self::En => CATALOG_EN,
            Self::Ca => CATALOG_CA,
        }
    }

    /// Looks up the template for `key`.
    pub(crate) fn template(self, key: &str) -> Option<&'static str> {
        self.catalog().iter().find(|(entry, _)| *entry == key).map(|(_, template)| *template)
    }
}

/// Locale chosen at startup.
static CURRENT_LOCALE: OnceLock<Locale> = OnceLock::new();

/// Sets the CLI locale. Only the first call wins.
pub fn set_locale(locale: Locale) {
    let _ = CURRENT_LOCALE.set(locale);
}

// ============================================================================
// SECTION: Catalog
// ============================================================================

/// English catalog entries.
const CATALOG_EN: &[(&str, &str)] = &[
    ("main.version", "policy-wrapper {version}"),
    ("input.kind.stdin", "standard input"),
    ("input.read_failed", "Failed to read {kind}: {error}"),
    ("input.read_too_large", "Refusing to read {kind} because it is {size} bytes (limit {limit})."),
    ("input.not_utf8", "Refusing to read {kind} because it is not valid UTF-8."),
    ("config.load_failed", "Failed to load transformer config {path}: {error}"),
    ("config.invalid", "Invalid transformer config: {error}"),
    ("function.envelope_invalid", "Invalid ResourceList input: {error}"),
    (
        "function.config_missing",
        "The ResourceList carries no functionConfig. Embed one or pass --config.",
    ),
    ("function.document_invalid", "Invalid resource document: {error}"),
    ("function.wrap_failed", "Failed to wrap resources: {error}"),
    ("output.stream.stdout", "stdout"),
    ("output.stream.stderr", "stderr"),
    ("output.stream.unknown", "output"),
    ("output.write_failed", "Failed to write to {stream}: {error}"),
    ("i18n.lang.invalid_env", "Invalid value for {env}: {value}. Expected 'en' or 'ca'."),
    (
        "i18n.disclaimer.machine_translated",
        "Note: non-English output is machine-translated and may be inaccurate.",
    ),
];

/// Catalan catalog entries.
const CATALOG_CA: &[(&str, &str)] = &[
    ("main.version", "policy-wrapper {version}"),
    ("input.kind.stdin", "l'entrada estàndard"),
    ("input.read_failed", "No s'ha pogut llegir {kind}: {error}"),
    (
        "input.read_too_large",
        "Es refusa llegir {kind} perquè té {size} bytes (límit {limit}).",
    ),
    ("input.not_utf8", "Es refusa llegir {kind} perquè no és UTF-8 vàlid."),
    (
        "config.load_failed",
        "No s'ha pogut carregar la configuració del transformador {path}: {error}",
    ),
    ("config.invalid", "Configuració del transformador no vàlida: {error}"),
    ("function.envelope_invalid", "Entrada ResourceList no vàlida: {error}"),
    (
        "function.config_missing",
        "El ResourceList no porta cap functionConfig. Incloeu-ne una o passeu --config.",
    ),
    ("function.document_invalid", "Document de recurs no vàlid: {error}"),
    ("function.wrap_failed", "No s'han pogut embolcallar els recursos: {error}"),
    ("output.stream.stdout", "stdout"),
    ("output.stream.stderr", "stderr"),
    ("output.stream.unknown", "sortida"),
    ("output.write_failed", "No s'ha pogut escriure a {stream}: {error}"),
    ("i18n.lang.invalid_env", "Valor no vàlid per a {env}: {value}. S'esperava 'en' o 'ca'."),
    (
        "i18n.disclaimer.machine_translated",
        "Nota: la sortida que no és en anglès està traduïda automàticament i pot ser inexacta.",
    ),
];

// ============================================================================
// SECTION: Translation
// ============================================================================

/// Renders `key` in the startup locale, substituting `{name}` placeholders.
#[must_use]
pub fn translate(key: &str, args: &[(&str, String)]) -> String {
    render(CURRENT_LOCALE.get().copied().unwrap_or(Locale::En), key, args)
}

/// Renders `key` in `locale`.
pub(crate) fn render(locale: Locale, key: &str, args: &[(&str, String)]) -> String {
    let template =
        locale.template(key).or_else(|| Locale::En.template(key)).unwrap_or(key).to_string();
    args.iter().fold(template, |text, (name, value)| text.replace(&format!("{{{name}}}"), value))
}

/// Formats a localized message from a catalog key and named arguments.
#[macro_export]
macro_rules! t {
    ($key:literal $(, $name:ident = $value:expr )* $(,)?) => {
        $crate::i18n::translate($key, &[$( (stringify!($name), $value.to_string()) ),*])
    };
}
