//! Field-level input validation
//!
//! The link predicate accepts `http://` / `https://` URLs (with or without a
//! `www.` prefix) and bare `www.` hosts, as long as at least two
//! non-whitespace characters follow the first dot after the host label.
//!
//! Internationalized hosts and bracketed IPv6 literals are not supported and
//! are rejected. Dotted IPv4 literals happen to satisfy the label pattern and
//! pass; they are not checked as addresses.

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

static LINK_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"^(?:",
        r"https?://(?:www\.)?[a-zA-Z0-9][a-zA-Z0-9-]+[a-zA-Z0-9]\.\S{2,}",
        r"|www\.[a-zA-Z0-9][a-zA-Z0-9-]+[a-zA-Z0-9]\.\S{2,}",
        r"|https?://(?:www\.)?[a-zA-Z0-9]+\.\S{2,}",
        r"|www\.[a-zA-Z0-9]+\.\S{2,}",
        r")$"
    ))
    .expect("link pattern is a valid regex")
});

/// Field-attributed validation failure
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("`{field}` is required")]
    Required { field: String },

    /// `value` is kept for callers; it is never part of the message
    #[error("`{field}` is not a valid link")]
    InvalidLink { field: String, value: String },

    #[error("`{field}` must be between {min} and {max}")]
    OutOfRange { field: String, min: f64, max: f64 },

    #[error("`{field}` is malformed: {reason}")]
    Malformed { field: String, reason: String },
}

impl ValidationError {
    /// Name of the offending field
    pub fn field(&self) -> &str {
        match self {
            Self::Required { field }
            | Self::InvalidLink { field, .. }
            | Self::OutOfRange { field, .. }
            | Self::Malformed { field, .. } => field,
        }
    }

    pub fn required(field: impl Into<String>) -> Self {
        Self::Required { field: field.into() }
    }

    pub fn malformed(field: impl Into<String>, reason: impl ToString) -> Self {
        Self::Malformed {
            field: field.into(),
            reason: reason.to_string(),
        }
    }
}

/// Check whether `value` has the shape of a fetchable web link.
pub fn is_resource_link(value: &str) -> bool {
    if !LINK_PATTERN.is_match(value) {
        return false;
    }

    // `http://wwwexample.com` is a typo of the www prefix, not a host.
    let host = value
        .strip_prefix("https://")
        .or_else(|| value.strip_prefix("http://"))
        .unwrap_or(value);
    !host.starts_with("www") || host.starts_with("www.")
}

/// Reject `value` unless it is a resource link, naming `field` in the error.
pub fn require_link(field: &str, value: &str) -> Result<(), ValidationError> {
    if is_resource_link(value) {
        Ok(())
    } else {
        Err(ValidationError::InvalidLink {
            field: field.to_string(),
            value: value.to_string(),
        })
    }
}

/// Reject `value` unless it lies in `[min, max]`. NaN is always rejected.
pub fn require_range(field: &str, value: f64, min: f64, max: f64) -> Result<(), ValidationError> {
    if value >= min && value <= max {
        Ok(())
    } else {
        Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min,
            max,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_scheme_and_www_links() {
        for link in [
            "https://example.com/path",
            "http://example.com/path",
            "https://www.example.com/images/a.png",
            "www.example.com/x",
            "https://cdn.example.com/p?size=large&fmt=webp",
            "https://example.com",
        ] {
            assert!(is_resource_link(link), "expected {link} to be accepted");
        }
    }

    #[test]
    fn test_rejects_malformed_links() {
        for link in [
            "not a url",
            "http://",
            "",
            "ftp://bad",
            "example.com/path",
            "https://example.com/with space",
            " https://example.com/path",
            "http://wwwexample.com/path",
            "https://[::1]/path",
            "https://bücher.example/path",
        ] {
            assert!(!is_resource_link(link), "expected {link:?} to be rejected");
        }
    }

    #[test]
    fn test_path_after_tld_needs_two_characters() {
        assert!(!is_resource_link("www.example.c"));
        assert!(is_resource_link("www.example.co"));
    }

    #[test]
    fn test_require_link_names_field() {
        let err = require_link("brandLogoLink", "ftp://user:pw@bad").unwrap_err();
        assert_eq!(err.field(), "brandLogoLink");
        assert!(err.to_string().contains("brandLogoLink"));
        assert!(!err.to_string().contains("user:pw"));
    }

    #[test]
    fn test_require_range() {
        assert!(require_range("averageRating", 5.0, 0.0, 5.0).is_ok());
        assert!(require_range("averageRating", 0.0, 0.0, 5.0).is_ok());
        assert!(require_range("averageRating", 5.1, 0.0, 5.0).is_err());
        assert!(require_range("averageRating", f64::NAN, 0.0, 5.0).is_err());
    }
}
