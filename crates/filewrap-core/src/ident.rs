//! Identifier derivation for generated symbols.
//!
//! All generated symbols are plain ASCII: `[A-Za-z0-9_]`.

use crate::error::{Error, Result};

/// Prefix for per-file data constants. Keeps identifiers from starting with
/// a digit when the file name does.
pub const DATA_PREFIX: &str = "k";

/// Replaces every byte that is not ASCII alphanumeric with `_`.
///
/// Works on bytes, so a multi-byte UTF-8 character becomes one underscore
/// per byte and names that are not UTF-8 at all are accepted. Distinct
/// inputs may sanitize to the same string; callers that need uniqueness
/// must check for it.
pub fn sanitize(name: impl AsRef<[u8]>) -> String {
    name.as_ref()
        .iter()
        .map(|&b| if b.is_ascii_alphanumeric() { b as char } else { '_' })
        .collect()
}

/// Returns true if `s` is usable as a C/C++ identifier.
pub fn is_valid_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Identifier of the data constant holding a file's bytes.
pub fn data_identifier(basename: &[u8]) -> String {
    format!("{DATA_PREFIX}{}", sanitize(basename))
}

/// Base identifier for the accessor functions, derived from the logical name.
///
/// Hyphens fold to underscores. Anything else that would not form a valid
/// identifier is rejected rather than rewritten.
pub fn toc_identifier(name: &str) -> Result<String> {
    if name.is_empty() {
        return Err(Error::invalid_name(name, "name is empty"));
    }
    let ident = name.replace('-', "_");
    if ident.starts_with(|c: char| c.is_ascii_digit()) {
        return Err(Error::invalid_name(name, "name starts with a digit"));
    }
    if !is_valid_identifier(&ident) {
        return Err(Error::invalid_name(
            name,
            "name may only contain ASCII letters, digits, '_' and '-'",
        ));
    }
    Ok(ident)
}

/// Include guard for the declaration artifact.
pub fn header_guard(package: &str, toc_ident: &str) -> String {
    sanitize(format!("{package}_{toc_ident}_H_"))
}
