use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Anything that is not a word character, whitespace, or hyphen
    static ref STRIP_REGEX: Regex = Regex::new(r"[^\w\s-]").unwrap();

    // Runs of whitespace and hyphens collapse into one separator
    static ref SEPARATOR_REGEX: Regex = Regex::new(r"[-\s]+").unwrap();
}

/// Derive a URL-safe identifier from a display name.
///
/// Normalization rules:
/// - Keep ASCII only; non-ASCII characters are dropped
/// - Remove everything except letters, digits, underscores, whitespace and hyphens
/// - Lowercase
/// - Collapse whitespace/hyphen runs into a single hyphen
/// - Trim leading/trailing hyphens and underscores
///
/// "The Midnight Players!" becomes "the-midnight-players".
pub fn slugify(name: &str) -> String {
    let ascii: String = name.chars().filter(char::is_ascii).collect();
    let stripped = STRIP_REGEX.replace_all(&ascii, "").to_lowercase();
    SEPARATOR_REGEX
        .replace_all(stripped.trim(), "-")
        .trim_matches(|c| c == '-' || c == '_')
        .to_string()
}
