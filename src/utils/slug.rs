//! Page slugs and element ids.
//!
//! Converts titles to ASCII file stems and checks user-supplied ids.

use deunicode::deunicode;

/// Characters forbidden in element ids (they break CSS selectors and
/// Pandoc attribute syntax).
const FORBIDDEN_ID_CHARS: &[char] = &[
    '<', '>', ':', '|', '?', '*', '#', '\\', '(', ')', '[', ']', '{', '}', '"', '\'', '.', '/',
];

/// Convert a title to a lowercase ASCII slug.
///
/// | Title              | Slug               |
/// |--------------------|--------------------|
/// | `Sales Overview`   | `sales-overview`   |
/// | `Übersicht 2024`   | `ubersicht-2024`   |
/// | `Q1 / Q2 (draft)`  | `q1-q2-draft`      |
///
/// Falls back to `"page"` when nothing usable remains.
pub fn slugify(text: &str) -> String {
    let ascii = deunicode(text);
    let mut slug = String::with_capacity(ascii.len());
    let mut pending_dash = false;

    for c in ascii.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }

    if slug.is_empty() {
        "page".to_owned()
    } else {
        slug
    }
}

/// Whether `id` can be used verbatim as an element id.
pub fn is_valid_id(id: &str) -> bool {
    !id.is_empty()
        && id.chars().next().is_some_and(|c| c.is_ascii_alphabetic())
        && !id
            .chars()
            .any(|c| c.is_whitespace() || FORBIDDEN_ID_CHARS.contains(&c))
}
