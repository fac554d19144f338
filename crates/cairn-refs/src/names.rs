//! Reference name grammar.
//!
//! A name is valid under exactly one of two grammars:
//!
//! - **Top-level** names (e.g. `HEAD`, `ORIG_HEAD`) contain only ASCII
//!   capital letters and `_`, and begin and end with a letter.
//! - **Hierarchical** names start with `refs/` and may contain anything
//!   except `~`, `^`, `:`, `\`, `?`, `[`, `*` and the sequences `..` and
//!   `@{`, which carry meaning in revision syntax.
//!
//! The check never allocates and never panics; malformed input is `false`.

use crate::error::{RefError, Result};

/// Prefix that opens the hierarchical namespace.
pub const REFS_DIR: &str = "refs/";
/// Branch namespace.
pub const HEADS_DIR: &str = "refs/heads/";
/// Tag namespace.
pub const TAGS_DIR: &str = "refs/tags/";
/// Remote-tracking namespace.
pub const REMOTES_DIR: &str = "refs/remotes/";
/// Notes namespace.
pub const NOTES_DIR: &str = "refs/notes/";
/// Name of the symbolic ref naming the current branch.
pub const HEAD: &str = "HEAD";

/// Characters that are forbidden anywhere in a hierarchical name.
const FORBIDDEN_CHARS: &[char] = &['~', '^', ':', '\\', '?', '[', '*'];

/// Sequences that are forbidden anywhere in a hierarchical name.
const FORBIDDEN_SEQUENCES: &[&str] = &["..", "@{"];

/// Returns `true` if `name` is a well-formed reference name.
///
/// # Examples
///
/// ```
/// use cairn_refs::names::is_valid_name;
///
/// assert!(is_valid_name("HEAD"));
/// assert!(is_valid_name("ORIG_HEAD"));
/// assert!(is_valid_name("refs/heads/feature/auth"));
/// assert!(!is_valid_name("head"));
/// assert!(!is_valid_name("refs/heads/bad..name"));
/// ```
pub fn is_valid_name(name: &str) -> bool {
    invalid_reason(name).is_none()
}

/// Validate a reference name, returning the reason on failure.
pub fn validate_name(name: &str) -> Result<()> {
    match invalid_reason(name) {
        None => Ok(()),
        Some(reason) => Err(RefError::InvalidName {
            name: name.to_string(),
            reason: reason.into(),
        }),
    }
}

fn invalid_reason(name: &str) -> Option<&'static str> {
    match name.strip_prefix(REFS_DIR) {
        Some(rest) => hierarchical_reason(rest),
        None => top_level_reason(name),
    }
}

fn top_level_reason(name: &str) -> Option<&'static str> {
    let bytes = name.as_bytes();
    let (first, last) = match (bytes.first(), bytes.last()) {
        (Some(first), Some(last)) => (*first, *last),
        _ => return Some("name must not be empty"),
    };
    if !bytes.iter().all(|b| b.is_ascii_uppercase() || *b == b'_') {
        return Some("top-level names may only contain capital letters and '_'");
    }
    if !first.is_ascii_uppercase() || !last.is_ascii_uppercase() {
        return Some("top-level names must begin and end with a letter");
    }
    None
}

fn hierarchical_reason(rest: &str) -> Option<&'static str> {
    if rest.is_empty() {
        return Some("name must not end at the refs/ prefix");
    }
    if rest.contains(FORBIDDEN_CHARS) {
        return Some("contains a forbidden character (one of ~ ^ : \\ ? [ *)");
    }
    if FORBIDDEN_SEQUENCES.iter().any(|seq| rest.contains(seq)) {
        return Some("contains a forbidden sequence ('..' or '@{')");
    }
    None
}
