use crate::utils::error::{RepositoryError, Result};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

/// Rejects empty or whitespace-only required parameters before any CMS call is made.
pub fn require_argument<'a>(parameter: &'static str, value: &'a str) -> Result<&'a str> {
    if value.trim().is_empty() {
        return Err(RepositoryError::InvalidArgument { parameter });
    }
    Ok(value)
}

pub fn validate_url(field_name: &str, url_str: &str) -> std::result::Result<(), String> {
    if url_str.is_empty() {
        return Err(format!("{}: URL cannot be empty", field_name));
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(format!("{}: unsupported URL scheme {}", field_name, scheme)),
        },
        Err(e) => Err(format!("{}: invalid URL format: {}", field_name, e)),
    }
}

pub fn validate_positive_number(
    field_name: &str,
    value: u64,
    min_value: u64,
) -> std::result::Result<(), String> {
    if value < min_value {
        return Err(format!("{}: value must be at least {}", field_name, min_value));
    }
    Ok(())
}

pub fn is_blank(value: Option<&str>) -> bool {
    match value {
        Some(v) => v.trim().is_empty(),
        None => true,
    }
}

/// True when a `${VAR}` placeholder survived environment substitution.
pub fn has_unresolved_placeholder(value: Option<&str>) -> bool {
    value.is_some_and(|v| v.contains("${"))
}
