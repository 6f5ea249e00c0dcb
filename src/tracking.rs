//! Tracking codes
//!
//! Format: `PREFIX-YYYYMM-XXXXXXXX`, where `YYYYMM` is the creation month
//! and the suffix is 8 random uppercase alphanumerics.

use chrono::{DateTime, Datelike, Utc};
use rand::Rng;
use thiserror::Error;

const SUFFIX_LEN: usize = 8;
const SUFFIX_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TrackingCodeError {
    #[error("Tracking code is empty")]
    Empty,
    #[error("Tracking code must look like {prefix}-YYYYMM-XXXXXXXX")]
    Malformed { prefix: String },
}

/// Generate a fresh tracking code dated `now`
pub fn generate(prefix: &str, now: DateTime<Utc>) -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..SUFFIX_LEN)
        .map(|_| SUFFIX_ALPHABET[rng.gen_range(0..SUFFIX_ALPHABET.len())] as char)
        .collect();

    format!(
        "{}-{:04}{:02}-{}",
        prefix.to_uppercase(),
        now.year(),
        now.month(),
        suffix
    )
}

/// Trim and upper-case user input before comparison
pub fn normalize(code: &str) -> String {
    code.trim().to_uppercase()
}

/// Validate the shape of a code, returning its normalized form
pub fn validate(prefix: &str, code: &str) -> Result<String, TrackingCodeError> {
    let normalized = normalize(code);
    if normalized.is_empty() {
        return Err(TrackingCodeError::Empty);
    }

    let malformed = || TrackingCodeError::Malformed {
        prefix: prefix.to_uppercase(),
    };

    let rest = normalized
        .strip_prefix(&prefix.to_uppercase())
        .and_then(|r| r.strip_prefix('-'))
        .ok_or_else(malformed)?;

    let (month, suffix) = rest.split_once('-').ok_or_else(malformed)?;

    let month_ok = month.len() == 6 && month.bytes().all(|b| b.is_ascii_digit());
    let suffix_ok = suffix.len() == SUFFIX_LEN
        && suffix
            .bytes()
            .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit());

    if month_ok && suffix_ok {
        Ok(normalized)
    } else {
        Err(malformed())
    }
}

pub fn is_valid(prefix: &str, code: &str) -> bool {
    validate(prefix, code).is_ok()
}

/// `PARTICIPADF-202601-A1B2C3D4` -> `PARTICIPADF - 2026/01 - A1B2C3D4`
///
/// The prefix may itself contain hyphens.
pub fn format_for_display(code: &str) -> String {
    let parts: Vec<&str> = code.rsplitn(3, '-').collect();
    match parts.as_slice() {
        [suffix, month, prefix] if !prefix.is_empty() && month.len() == 6 && month.is_ascii() => {
            format!("{} - {}/{} - {}", prefix, &month[..4], &month[4..], suffix)
        }
        _ => code.to_string(),
    }
}
