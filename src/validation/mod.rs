//! Input validation module

use crate::catalog::{ExtraFieldKind, SubjectEntry};
use crate::models::{AttachmentKind, FieldErrors, IdentityInput, LocationInfo};
use chrono::NaiveDate;
use std::collections::BTreeMap;
use thiserror::Error;

/// Minimum narrative length, in characters
pub const NARRATIVE_MIN_CHARS: usize = 20;

/// Maximum narrative length, in characters
pub const NARRATIVE_MAX_CHARS: usize = 13_000;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Field '{field}' is required")]
    Required { field: String },

    #[error("Field '{field}' is too long (max {max} characters)")]
    TooLong { field: String, max: usize },

    #[error("Field '{field}' is too short (min {min} characters)")]
    TooShort { field: String, min: usize },

    #[error("Field '{field}' must be a number")]
    NotANumber { field: String },

    #[error("Field '{field}' must be a date (YYYY-MM-DD)")]
    NotADate { field: String },

    #[error("Field '{field}' must be one of the listed options")]
    UnknownOption { field: String },

    #[error("Invalid email format")]
    InvalidEmail,

    #[error("Invalid CPF")]
    InvalidNationalId,

    #[error("Invalid phone number (10 or 11 digits expected)")]
    InvalidPhone,

    #[error("Consent must be accepted before submitting")]
    ConsentRequired,

    #[error("Invalid file type: {mime_type}")]
    InvalidFileType { mime_type: String },

    #[error("File too large (max {max_mb} MB)")]
    FileTooLarge { max_mb: usize },

    #[error("File is empty")]
    EmptyFile,
}

impl ValidationError {
    /// Field id the error is reported under
    pub fn field(&self) -> &str {
        match self {
            ValidationError::Required { field }
            | ValidationError::TooLong { field, .. }
            | ValidationError::TooShort { field, .. }
            | ValidationError::NotANumber { field }
            | ValidationError::NotADate { field }
            | ValidationError::UnknownOption { field } => field,
            ValidationError::InvalidEmail => "email",
            ValidationError::InvalidNationalId => "national_id",
            ValidationError::InvalidPhone => "phone",
            ValidationError::ConsentRequired => "consent",
            ValidationError::InvalidFileType { .. }
            | ValidationError::FileTooLarge { .. }
            | ValidationError::EmptyFile => "file",
        }
    }
}

/// Collect errors into a map keyed by field id (first error per field wins)
pub fn to_field_errors(errors: impl IntoIterator<Item = ValidationError>) -> FieldErrors {
    let mut map = BTreeMap::new();
    for error in errors {
        map.entry(error.field().to_string())
            .or_insert_with(|| error.to_string());
    }
    map
}

// =============================================================================
// Wizard steps
// =============================================================================

/// Validate the free-text narrative
pub fn validate_narrative(narrative: &str) -> Result<(), ValidationError> {
    if narrative.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "narrative".to_string(),
        });
    }

    let len = narrative.chars().count();
    if len < NARRATIVE_MIN_CHARS {
        return Err(ValidationError::TooShort {
            field: "narrative".to_string(),
            min: NARRATIVE_MIN_CHARS,
        });
    }
    if len > NARRATIVE_MAX_CHARS {
        return Err(ValidationError::TooLong {
            field: "narrative".to_string(),
            max: NARRATIVE_MAX_CHARS,
        });
    }

    Ok(())
}

/// Validate extra-field values against a subject's schema.
///
/// Returns one error per offending field: required fields left blank, and
/// filled fields whose value does not fit the field kind.
pub fn validate_extra_fields(
    subject: &SubjectEntry,
    values: &BTreeMap<String, String>,
) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    for spec in subject.extra_fields {
        let field = spec.id.to_string();
        let value = values.get(spec.id).map(|v| v.trim()).unwrap_or("");

        if value.is_empty() {
            if spec.required {
                errors.push(ValidationError::Required { field });
            }
            continue;
        }

        if let Some(max) = spec.max_length {
            if value.chars().count() > max {
                errors.push(ValidationError::TooLong { field, max });
                continue;
            }
        }

        match spec.kind {
            ExtraFieldKind::Number if value.parse::<f64>().is_err() => {
                errors.push(ValidationError::NotANumber { field });
            }
            ExtraFieldKind::Date if NaiveDate::parse_from_str(value, "%Y-%m-%d").is_err() => {
                errors.push(ValidationError::NotADate { field });
            }
            ExtraFieldKind::Select if !spec.options.contains(&value) => {
                errors.push(ValidationError::UnknownOption { field });
            }
            _ => {}
        }
    }

    errors
}

/// Validate the location step for the selected subject
pub fn validate_location(
    subject: Option<&SubjectEntry>,
    location: &LocationInfo,
) -> Result<(), ValidationError> {
    let required = subject.map_or(false, |s| s.requires_location);
    if required && location.description.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "location_description".to_string(),
        });
    }
    Ok(())
}

/// Validate the identity block. Anonymous submissions skip every check.
pub fn validate_identity(identity: &IdentityInput) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    if identity.anonymous {
        return errors;
    }

    if identity.name.trim().is_empty() {
        errors.push(ValidationError::Required {
            field: "name".to_string(),
        });
    } else if identity.name.chars().count() > 255 {
        errors.push(ValidationError::TooLong {
            field: "name".to_string(),
            max: 255,
        });
    }

    if identity.email.trim().is_empty() {
        errors.push(ValidationError::Required {
            field: "email".to_string(),
        });
    } else if !is_valid_email(identity.email.trim()) {
        errors.push(ValidationError::InvalidEmail);
    }

    if !identity.national_id.trim().is_empty() && !is_valid_cpf(&identity.national_id) {
        errors.push(ValidationError::InvalidNationalId);
    }

    if !identity.phone.trim().is_empty() && !is_valid_phone(&identity.phone) {
        errors.push(ValidationError::InvalidPhone);
    }

    errors
}

/// Consent must be given on the final step
pub fn validate_consent(accepted: bool) -> Result<(), ValidationError> {
    if accepted {
        Ok(())
    } else {
        Err(ValidationError::ConsentRequired)
    }
}

// =============================================================================
// Identity helpers
// =============================================================================

/// Email check backed by the `validator` crate
pub fn is_valid_email(email: &str) -> bool {
    // validator accepts dotless domains ("user@localhost"); citizens need a reachable address
    validator::validate_email(email)
        && email
            .rsplit_once('@')
            .map_or(false, |(_, domain)| domain.contains('.'))
}

fn digits(value: &str) -> Vec<u32> {
    value.chars().filter_map(|c| c.to_digit(10)).collect()
}

/// CPF check: 11 digits, not all equal, both mod-11 check digits correct
pub fn is_valid_cpf(cpf: &str) -> bool {
    let d = digits(cpf);
    if d.len() != 11 || d.iter().all(|&x| x == d[0]) {
        return false;
    }

    let check_digit = |len: usize| -> u32 {
        let weight_start = len as u32 + 1;
        let sum: u32 = d[..len]
            .iter()
            .enumerate()
            .map(|(i, &x)| x * (weight_start - i as u32))
            .sum();
        let rest = (sum * 10) % 11;
        if rest == 10 {
            0
        } else {
            rest
        }
    };

    check_digit(9) == d[9] && check_digit(10) == d[10]
}

/// Phone check: 10 or 11 digits once punctuation is stripped
pub fn is_valid_phone(phone: &str) -> bool {
    matches!(digits(phone).len(), 10 | 11)
}

/// Format a CPF as `000.000.000-00`, leaving anything else untouched
pub fn format_cpf(cpf: &str) -> String {
    let d: String = cpf.chars().filter(|c| c.is_ascii_digit()).collect();
    if d.len() == 11 {
        format!("{}.{}.{}-{}", &d[..3], &d[3..6], &d[6..9], &d[9..])
    } else {
        cpf.to_string()
    }
}

/// Format a phone as `(00) 00000-0000` or `(00) 0000-0000`
pub fn format_phone(phone: &str) -> String {
    let d: String = phone.chars().filter(|c| c.is_ascii_digit()).collect();
    match d.len() {
        11 => format!("({}) {}-{}", &d[..2], &d[2..7], &d[7..]),
        10 => format!("({}) {}-{}", &d[..2], &d[2..6], &d[6..]),
        _ => phone.to_string(),
    }
}

// =============================================================================
// Attachments
// =============================================================================

const DOCUMENT_TYPES: &[&str] = &[
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "application/vnd.ms-excel",
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    "application/vnd.oasis.opendocument.text",
    "application/rtf",
    "text/plain",
    "text/csv",
];

const IMAGE_TYPES: &[&str] = &["image/jpeg", "image/png", "image/webp", "image/gif", "image/heic"];

const AUDIO_TYPES: &[&str] = &[
    "audio/webm",
    "audio/ogg",
    "audio/mpeg",
    "audio/mp4",
    "audio/wav",
    "audio/x-wav",
];

const VIDEO_TYPES: &[&str] = &["video/webm", "video/mp4", "video/quicktime", "video/ogg"];

/// Strip MIME parameters (`audio/webm;codecs=opus` -> `audio/webm`)
pub fn base_mime(mime_type: &str) -> String {
    mime_type
        .split(';')
        .next()
        .unwrap_or(mime_type)
        .trim()
        .to_ascii_lowercase()
}

/// Validate a captured file against the attachment kind it will become
pub fn validate_attachment_upload(
    kind: AttachmentKind,
    mime_type: &str,
    file_size: usize,
    max_size_bytes: usize,
) -> Result<(), ValidationError> {
    if file_size == 0 {
        return Err(ValidationError::EmptyFile);
    }
    if file_size > max_size_bytes {
        return Err(ValidationError::FileTooLarge {
            max_mb: max_size_bytes / (1024 * 1024),
        });
    }

    let allowed = match kind {
        AttachmentKind::Image => IMAGE_TYPES,
        AttachmentKind::Audio => AUDIO_TYPES,
        AttachmentKind::Video => VIDEO_TYPES,
        AttachmentKind::Document => DOCUMENT_TYPES,
    };

    let mime = base_mime(mime_type);
    if !allowed.contains(&mime.as_str()) {
        return Err(ValidationError::InvalidFileType { mime_type: mime });
    }

    Ok(())
}

/// Dangerous file extensions that could be executed if misconfigured
const DANGEROUS_EXTENSIONS: &[&str] = &[
    // Server-side scripting
    ".php", ".phtml", ".php3", ".php4", ".php5", ".php7", ".phps", ".asp", ".aspx", ".jsp",
    ".jspx", ".cgi", ".pl", ".py", ".pyc", ".pyo", ".rb", ".erb",
    // Executables
    ".exe", ".bat", ".cmd", ".com", ".msi", ".dll", ".sh", ".bash", ".zsh", ".ksh", ".apk",
    // Scripts and markup that browsers execute
    ".js", ".jsx", ".ts", ".tsx", ".mjs", ".html", ".htm", ".svg",
    // Server config files
    ".htaccess", ".htpasswd",
    // Java
    ".jar", ".war", ".ear", ".class",
];

/// Reject filenames ending in, or hiding (`photo.exe.jpg`), a dangerous extension
pub fn validate_filename_extensions(filename: &str) -> Result<(), ValidationError> {
    let lower = filename.to_lowercase();

    for ext in DANGEROUS_EXTENSIONS {
        if lower.ends_with(ext) || lower.contains(&format!("{}.", ext)) {
            return Err(ValidationError::InvalidFileType {
                mime_type: format!("filename contains dangerous extension: {}", ext),
            });
        }
    }

    Ok(())
}

/// Reduce an uploaded filename to a safe basename
pub fn sanitize_filename(filename: &str) -> String {
    // Extract only the basename (strip any directory components)
    let basename = filename.rsplit(['/', '\\']).next().unwrap_or(filename);

    let sanitized: String = basename
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.' {
                c
            } else {
                '_'
            }
        })
        .collect();

    // Remove leading dots (prevent hidden files / traversal like ..pdf)
    let sanitized = sanitized.trim_start_matches('.').trim_matches('_');

    if sanitized.is_empty() {
        "upload".to_string()
    } else {
        sanitized.to_string()
    }
}
