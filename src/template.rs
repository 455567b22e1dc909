//! Placeholder templates: `{{name}}` slots inside a command string.
//!
//! A placeholder is `{{` + one or more of `[A-Za-z0-9_]` + `}}`, matched
//! leftmost-first without overlap. The sequence `{{{{}}` is the escape for a
//! literal `{{`: it is never a placeholder, survives [`substitute`] and
//! [`rename`] untouched, and is resolved only by [`render`].

use std::collections::BTreeMap;

/// Escape sequence standing for a literal `{{`.
pub const LITERAL_OPEN: &str = "{{{{}}";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Piece<'a> {
    Literal(&'a str),
    Escape,
    Placeholder(&'a str),
}

fn is_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// Split a template into literal text, escapes and placeholders.
fn pieces(template: &str) -> Vec<Piece<'_>> {
    let bytes = template.as_bytes();
    let mut out = Vec::new();
    let mut literal_start = 0;
    let mut i = 0;

    while i < bytes.len() {
        if !bytes[i..].starts_with(b"{{") {
            i += 1;
            continue;
        }
        if bytes[i..].starts_with(LITERAL_OPEN.as_bytes()) {
            if literal_start < i {
                out.push(Piece::Literal(&template[literal_start..i]));
            }
            out.push(Piece::Escape);
            i += LITERAL_OPEN.len();
            literal_start = i;
            continue;
        }

        let name_start = i + 2;
        let mut name_end = name_start;
        while name_end < bytes.len() && is_name_byte(bytes[name_end]) {
            name_end += 1;
        }
        if name_end > name_start && bytes[name_end..].starts_with(b"}}") {
            if literal_start < i {
                out.push(Piece::Literal(&template[literal_start..i]));
            }
            out.push(Piece::Placeholder(&template[name_start..name_end]));
            i = name_end + 2;
            literal_start = i;
        } else {
            i += 1;
        }
    }
    if literal_start < bytes.len() {
        out.push(Piece::Literal(&template[literal_start..]));
    }
    out
}

/// Rebuild a template, mapping each placeholder name through `f`.
/// `f` returning `None` keeps the placeholder as written.
fn rewrite<'a, F>(template: &'a str, mut f: F) -> String
where
    F: FnMut(&'a str) -> Option<String>,
{
    let mut out = String::with_capacity(template.len());
    for piece in pieces(template) {
        match piece {
            Piece::Literal(text) => out.push_str(text),
            Piece::Escape => out.push_str(LITERAL_OPEN),
            Piece::Placeholder(name) => match f(name) {
                Some(replacement) => out.push_str(&replacement),
                None => out.push_str(&format_placeholder(name)),
            },
        }
    }
    out
}

/// Placeholder names in order of first occurrence, without duplicates.
pub fn extract_placeholders(template: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for piece in pieces(template) {
        if let Piece::Placeholder(name) = piece
            && !names.iter().any(|n| n == name)
        {
            names.push(name.to_string());
        }
    }
    names
}

/// Replace every `{{name}}` whose name is in `values`. Unknown names are
/// left as they are, so a partially filled template stays a template.
pub fn substitute(template: &str, values: &BTreeMap<String, String>) -> String {
    rewrite(template, |name| values.get(name).cloned())
}

/// Rewrite every `{{old}}` as `{{new}}`.
pub fn rename(template: &str, old: &str, new: &str) -> String {
    rewrite(template, |name| (name == old).then(|| format_placeholder(new)))
}

/// Substitute `values`, then resolve literal-brace escapes. The result is
/// the final command text; it is no longer a template.
pub fn render(template: &str, values: &BTreeMap<String, String>) -> String {
    let mut out = String::with_capacity(template.len());
    for piece in pieces(template) {
        match piece {
            Piece::Literal(text) => out.push_str(text),
            Piece::Escape => out.push_str("{{"),
            Piece::Placeholder(name) => match values.get(name) {
                Some(value) => out.push_str(value),
                None => out.push_str(&format_placeholder(name)),
            },
        }
    }
    out
}

/// Escape literal `{{` so `text` can be embedded in a template verbatim.
pub fn escape_literal(text: &str) -> String {
    text.replace("{{", LITERAL_OPEN)
}

/// `name` as a placeholder.
pub fn format_placeholder(name: &str) -> String {
    format!("{{{{{name}}}}}")
}

/// True iff `name` can appear between braces: `[A-Za-z0-9_]+`.
pub fn is_placeholder_name(name: &str) -> bool {
    !name.is_empty() && name.bytes().all(is_name_byte)
}

/// True iff `name` matches `[A-Za-z_][A-Za-z0-9_]*`.
pub fn is_valid_variable_name(name: &str) -> bool {
    let mut bytes = name.bytes();
    match bytes.next() {
        Some(first) if first.is_ascii_alphabetic() || first == b'_' => bytes.all(is_name_byte),
        _ => false,
    }
}
