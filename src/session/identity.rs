//! Session identity
//!
//! Turns generated timestamps or caller-supplied names into ids that are safe
//! to use as file names inside a shared directory.

use crate::error::{Result, SessionError};
use chrono::Utc;
use once_cell::sync::Lazy;
use regex::Regex;

/// Longest id produced from a custom name
pub const MAX_ID_LEN: usize = 64;

/// Names that collide with control files or platform device names
pub const RESERVED_NAMES: &[&str] = &[
    "index",
    "metadata",
    "last_session",
    "con",
    "prn",
    "aux",
    "nul",
    "com1",
    "com2",
    "com3",
    "com4",
    "lpt1",
    "lpt2",
    "lpt3",
    "lpt4",
];

static DISALLOWED_NAME_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-z0-9_.-]").expect("static regex"));
static DASH_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r"-{2,}").expect("static regex"));
static VALID_ID: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-zA-Z0-9_.-]+$").expect("static regex"));

/// Produce an id for a new session.
///
/// Without a name the id is `YYYY-MM-DD-HH-MM-SS-mmm-xxxx` (UTC, four random
/// hex chars), which sorts chronologically. With a name the sanitized name is
/// used and must pass [`validate_name`].
pub fn generate_id(custom_name: Option<&str>) -> Result<String> {
    match custom_name {
        Some(name) => {
            validate_name(name)?;
            Ok(sanitize_name(name))
        }
        None => {
            let suffix: [u8; 2] = rand::random();
            Ok(format!(
                "{}-{:02x}{:02x}",
                Utc::now().format("%Y-%m-%d-%H-%M-%S-%3f"),
                suffix[0],
                suffix[1]
            ))
        }
    }
}

/// Lowercase, collapse anything outside `[a-z0-9_.-]` to `-`, squeeze dashes,
/// trim dashes at both ends and cap the length.
pub fn sanitize_name(name: &str) -> String {
    let lowered = name.to_lowercase();
    let replaced = DISALLOWED_NAME_CHARS.replace_all(&lowered, "-");
    let squeezed = DASH_RUNS.replace_all(&replaced, "-");
    let capped: String = squeezed.trim_matches('-').chars().take(MAX_ID_LEN).collect();
    capped.trim_end_matches('-').to_string()
}

/// Reject names that would escape the store directory, sanitize to nothing,
/// or shadow a reserved file.
pub fn validate_name(name: &str) -> Result<()> {
    if name.contains("..") || name.contains('/') || name.contains('\\') {
        return Err(SessionError::InvalidName(format!(
            "\"{}\" must not contain path separators or \"..\"",
            name
        )));
    }

    let sanitized = sanitize_name(name);
    if sanitized.is_empty() {
        return Err(SessionError::InvalidName(format!(
            "\"{}\" has no usable characters",
            name
        )));
    }

    if sanitized.chars().all(|c| c == '.') {
        return Err(SessionError::InvalidName(format!(
            "\"{}\" sanitizes to dots only",
            name
        )));
    }

    if is_reserved_id(&sanitized) {
        return Err(SessionError::ReservedName(sanitized));
    }

    Ok(())
}

/// True if `id` names a control file or device name, ignoring case
pub fn is_reserved_id(id: &str) -> bool {
    RESERVED_NAMES
        .iter()
        .any(|reserved| reserved.eq_ignore_ascii_case(id))
}

/// [`validate_id`] plus the reserved-name check, for ids a caller wants to write under
pub fn validate_writable_id(id: &str) -> Result<()> {
    validate_id(id)?;
    if is_reserved_id(id) {
        return Err(SessionError::ReservedName(id.to_string()));
    }
    Ok(())
}

/// Path-traversal gate. Every operation that takes an id calls this before
/// touching the filesystem.
pub fn validate_id(id: &str) -> Result<()> {
    if id.is_empty() {
        return Err(SessionError::InvalidId("id is empty".to_string()));
    }
    if id.contains("..") || id.contains('/') || id.contains('\\') || id.contains('\0') {
        return Err(SessionError::InvalidId(format!("{:?} contains a path component", id)));
    }
    if !VALID_ID.is_match(id) {
        return Err(SessionError::InvalidId(format!(
            "{:?} may only contain letters, digits, '_', '.' and '-'",
            id
        )));
    }
    Ok(())
}
