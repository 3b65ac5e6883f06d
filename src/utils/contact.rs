//! Contact detail checks: the format rules behind booking auto-verification and
//! the column widths contact fields must fit.
//!
//! The format rules only decide whether a lead skips manual review. They are
//! not an anti-fraud measure.

use std::sync::LazyLock;

use regex::Regex;

/// Column widths of the lead and user contact fields.
pub const MAX_NAME_LEN: usize = 100;
pub const MAX_EMAIL_LEN: usize = 255;
pub const MAX_PHONE_LEN: usize = 32;

static EMAIL_RE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").ok());

static PHONE_RE: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"^[0-9]{10,15}$").ok());

/// `local@domain.tld` where local is `[A-Za-z0-9._%+-]+`, domain is
/// `[A-Za-z0-9.-]+` and the tld has at least two ASCII letters.
#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.as_ref().is_some_and(|re| re.is_match(email))
}

/// Digits left after dropping `+`, `-` and spaces.
#[must_use]
pub fn normalize_phone(phone: &str) -> String {
    phone
        .chars()
        .filter(|c| !matches!(c, '+' | '-' | ' '))
        .collect()
}

/// 10 to 15 ASCII digits once separators are stripped.
#[must_use]
pub fn is_valid_phone(phone: &str) -> bool {
    PHONE_RE
        .as_ref()
        .is_some_and(|re| re.is_match(&normalize_phone(phone)))
}

/// Whether `value` fits a column of `max` characters.
#[must_use]
pub fn fits(value: &str, max: usize) -> bool {
    value.chars().count() <= max
}

/// Whether a booking with these details can skip admin review.
#[must_use]
pub fn qualifies_for_auto_verification(email: &str, phone: &str) -> bool {
    is_valid_email(email) && is_valid_phone(phone)
}
