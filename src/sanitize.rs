// SYNOID Voiceline - Filename Sanitizer
// Copyright (c) 2026 Xing_The_Creator | SYNOID

/// Stand-in for any character outside `[A-Za-z0-9\s]`.
///
/// Must itself map to the placeholder, otherwise re-sanitizing a sanitized
/// token would change it.
pub const PLACEHOLDER: char = '_';

/// Map arbitrary text to a token over `[A-Za-z0-9_]`.
///
/// Disallowed characters become [`PLACEHOLDER`], then each whitespace run
/// collapses to a single underscore. Distinct inputs may collide
/// (`"a.b"` and `"a?b"` both give `"a_b"`); callers treat that as the same key.
pub fn sanitize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_whitespace = false;

    for ch in text.chars() {
        if ch.is_whitespace() {
            if !in_whitespace {
                out.push('_');
            }
            in_whitespace = true;
            continue;
        }
        in_whitespace = false;

        if ch.is_ascii_alphanumeric() {
            out.push(ch);
        } else {
            out.push(PLACEHOLDER);
        }
    }

    out
}
