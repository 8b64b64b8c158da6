// ==========================================
// Internationalisation (i18n)
// ==========================================
// rust-i18n, English (default) and Arabic
// ==========================================
// rust_i18n::i18n! is invoked in lib.rs
// ==========================================

pub const DEFAULT_LOCALE: &str = "en";
pub const SUPPORTED_LOCALES: &[&str] = &["en", "ar"];

/// Current global locale
pub fn current_locale() -> String {
    rust_i18n::locale().to_string()
}

/// Set the global locale
///
/// # Arguments
/// - locale: "en" or "ar"
pub fn set_locale(locale: &str) {
    rust_i18n::set_locale(locale);
}

/// Map a requested language tag to a supported locale
///
/// "ar-EG" -> "ar", "fr" -> "en", "" -> "en"
pub fn resolve_locale(requested: &str) -> &'static str {
    let primary = requested
        .split([',', ';', '-', '_'])
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();
    SUPPORTED_LOCALES
        .iter()
        .copied()
        .find(|l| *l == primary)
        .unwrap_or(DEFAULT_LOCALE)
}

/// Translate in the global locale
///
/// # Examples
/// ```no_run
/// use foundry_qc::i18n::t;
/// let msg = t("common.success");
/// ```
pub fn t(key: &str) -> String {
    rust_i18n::t!(key).to_string()
}

/// Translate in the global locale with `%{name}` placeholders
///
/// # Examples
/// ```no_run
/// use foundry_qc::i18n::t_with_args;
/// let msg = t_with_args("error.not_found", &[("entity", "pipe")]);
/// ```
pub fn t_with_args(key: &str, args: &[(&str, &str)]) -> String {
    fill(rust_i18n::t!(key).to_string(), args)
}

/// Translate in an explicit locale (per request)
pub fn t_in(locale: &str, key: &str) -> String {
    rust_i18n::t!(key, locale = locale).to_string()
}

pub fn t_with_args_in(locale: &str, key: &str, args: &[(&str, &str)]) -> String {
    fill(rust_i18n::t!(key, locale = locale).to_string(), args)
}

fn fill(mut message: String, args: &[(&str, &str)]) -> String {
    for (k, v) in args {
        let placeholder = format!("%{{{}}}", k);
        message = message.replace(&placeholder, v);
    }
    message
}
