use thiserror::Error;
use url::Url;

/// A form field that failed validation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Require a non-blank value no longer than `max` characters.
pub fn require_text(field: &'static str, value: &str, max: usize) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new(field, "This field is required"));
    }
    limit_text(field, value, max)
}

/// Allow blank values but cap their length.
pub fn limit_text(field: &'static str, value: &str, max: usize) -> Result<(), ValidationError> {
    let len = value.chars().count();
    if len > max {
        return Err(ValidationError::new(
            field,
            format!("Ensure this value has at most {} characters (it has {})", max, len),
        ));
    }
    Ok(())
}

/// Optional URL fields must be absolute http(s) URLs with a host when present.
pub fn optional_url(field: &'static str, value: Option<&str>) -> Result<(), ValidationError> {
    let Some(raw) = value else {
        return Ok(());
    };

    let valid = Url::parse(raw)
        .map(|url| matches!(url.scheme(), "http" | "https") && url.host_str().is_some())
        .unwrap_or(false);
    if !valid {
        return Err(ValidationError::new(
            field,
            "Enter a valid URL, e.g. https://example.com",
        ));
    }
    Ok(())
}

/// Normalize an optional form value: blank strings become `None`.
pub fn blank_to_none(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
