//! URL-safe slug derivation for community names.
//!
//! Slug uniqueness is ultimately enforced by the database's unique index;
//! the candidate sequence here only decides which value to try next when
//! an insert collides.

/// Upper bound on slug insert attempts for a single creation request.
pub const MAX_SLUG_ATTEMPTS: u32 = 50;

/// Fallback for names that normalize to nothing.
const EMPTY_NAME_PLACEHOLDER: &str = "community";

/// Normalizes a human-readable name into a lowercase URL-safe slug.
/// Runs of non-alphanumeric characters collapse into a single `-`.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_separator = false;

    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_separator && !slug.is_empty() {
                slug.push('-');
            }
            pending_separator = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            pending_separator = true;
        }
    }

    if slug.is_empty() {
        EMPTY_NAME_PLACEHOLDER.to_string()
    } else {
        slug
    }
}

/// Returns the nth slug candidate for a base slug: `base`, `base-1`, `base-2`, ...
#[must_use]
pub fn candidate(base: &str, attempt: u32) -> String {
    if attempt == 0 {
        base.to_string()
    } else {
        format!("{base}-{attempt}")
    }
}
