//! Filename sanitization.
//!
//! Client-supplied filenames are untrusted. They are reduced to a fixed
//! allow-list of characters; everything else, path separators included,
//! becomes [`PLACEHOLDER`].

/// Replacement for every disallowed character.
pub const PLACEHOLDER: char = '_';

/// Longest name most filesystems accept for a single path component.
pub const MAX_NAME_LEN: usize = 255;

/// Characters kept verbatim.
fn is_allowed(c: char) -> bool {
    c.is_ascii_alphanumeric()
        || matches!(
            c,
            '-' | '_'
                | '.'
                | ','
                | ' '
                | '~'
                | '!'
                | '@'
                | '#'
                | '$'
                | '^'
                | '&'
                | '('
                | ')'
                | '+'
                | '='
                | '['
                | ']'
        )
}

/// Maps an arbitrary filename to one that is safe as a single path component.
///
/// Total and pure. The result:
/// - contains only allow-listed ASCII characters (never `/` or `\`)
/// - never starts with `.`, so it is never `.`, `..` or a hidden file
/// - is never empty
/// - is at most [`MAX_NAME_LEN`] bytes long
#[must_use]
pub fn sanitize_filename(name: &str) -> String {
    let mut leading = true;
    let mut sanitized: String = name
        .chars()
        .map(|c| {
            let c = if is_allowed(c) { c } else { PLACEHOLDER };
            if leading && c == '.' {
                return PLACEHOLDER;
            }
            leading = false;
            c
        })
        .collect();

    // Only ASCII survives the map, so any byte index is a char boundary.
    sanitized.truncate(MAX_NAME_LEN);

    if sanitized.is_empty() {
        sanitized.push(PLACEHOLDER);
    }
    sanitized
}

/// Whether `name` could have been produced by [`sanitize_filename`].
#[must_use]
pub fn is_safe_filename(name: &str) -> bool {
    !name.is_empty() && sanitize_filename(name) == name
}
