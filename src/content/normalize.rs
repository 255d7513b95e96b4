//! Canonical form for rich-text HTML fragments.
//!
//! The editor regenerates its HTML on every change and keeps neither attribute
//! order, style declaration order nor line-break encoding stable. Fragments that
//! differ only in those respects normalize to the same string, and that string is
//! what decides whether a document has unsaved work.
//!
//! This is a textual transform, not an HTML parser. Attributes are recognized only
//! in the `name="value"` shape; unquoted or malformed attributes are dropped from
//! the canonical form.

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

fn tag_pattern() -> &'static Regex {
    static TAG: OnceLock<Regex> = OnceLock::new();
    TAG.get_or_init(|| Regex::new(r"<([^>]+)>").expect("tag pattern compiles"))
}

fn attribute_pattern() -> &'static Regex {
    static ATTRIBUTE: OnceLock<Regex> = OnceLock::new();
    ATTRIBUTE.get_or_init(|| Regex::new(r#"[^\s="]+="[^"]*""#).expect("attribute pattern compiles"))
}

/// Canonical form of a fragment. Only ever used for equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NormalizedFragment(String);

impl NormalizedFragment {
    pub fn of(fragment: &str) -> Self {
        NormalizedFragment(normalize(fragment))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for NormalizedFragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Normalize an HTML fragment.
///
/// Line breaks are removed, blank input becomes `""`, and every tag is rebuilt as
/// its name, its non-style attributes in source order, then a single `style`
/// attribute whose declarations are sorted by property name. Never fails.
pub fn normalize(fragment: &str) -> String {
    let folded = fold_line_breaks(fragment);
    if folded.trim().is_empty() {
        return String::new();
    }

    tag_pattern()
        .replace_all(&folded, |caps: &Captures| {
            rewrite_tag(&caps[1]).unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

/// Same as [`normalize`], with an absent fragment treated as empty.
pub fn normalize_opt(fragment: Option<&str>) -> String {
    fragment.map(normalize).unwrap_or_default()
}

/// Whether two fragments have the same canonical form.
pub fn is_content_equivalent(a: &str, b: &str) -> bool {
    a == b || normalize(a) == normalize(b)
}

fn fold_line_breaks(fragment: &str) -> String {
    fragment.replace("\r\n", "").replace('\n', "")
}

/// Rebuild the inside of one `<...>`. `None` leaves the tag as written.
fn rewrite_tag(body: &str) -> Option<String> {
    // `< p>` is not a tag the editor would emit
    if body.starts_with(char::is_whitespace) {
        return None;
    }

    let attributes: Vec<&str> = attribute_pattern()
        .find_iter(body)
        .map(|m| m.as_str())
        .collect();

    let name = tag_name(body);

    let mut others = Vec::with_capacity(attributes.len());
    let mut declarations = Vec::new();
    for attribute in attributes {
        match attribute.strip_prefix("style=\"") {
            Some(rest) => {
                let value = rest.split('"').next().unwrap_or_default();
                declarations.extend(style_declarations(value));
            }
            None => others.push(attribute),
        }
    }

    // stable: equal property names keep their source order
    declarations.sort_by(|a, b| a.0.cmp(b.0));

    let style = (!declarations.is_empty()).then(|| {
        let joined = declarations
            .iter()
            .map(|(property, value)| format!("{}: {}", property, value))
            .collect::<Vec<_>>()
            .join("; ");
        format!("style=\"{}\"", joined)
    });

    let mut parts: Vec<&str> = Vec::with_capacity(others.len() + 2);
    if !name.is_empty() {
        parts.push(name);
    }
    parts.extend(others);
    if let Some(style) = style.as_deref() {
        parts.push(style);
    }

    Some(format!("<{}>", parts.join(" ")))
}

/// Leading `/` plus the run of name characters. Empty when the body opens with
/// an attribute, so the name can never overlap one.
fn tag_name(body: &str) -> &str {
    let rest = body.strip_prefix('/').unwrap_or(body);
    let run = rest
        .find(|c: char| c.is_whitespace() || matches!(c, '=' | '"' | '/'))
        .unwrap_or(rest.len());
    if rest[run..].starts_with('=') {
        return "";
    }
    &body[..body.len() - rest.len() + run]
}

/// Split a style value into trimmed `(property, value)` pairs.
fn style_declarations(style: &str) -> Vec<(&str, String)> {
    style
        .split(';')
        .map(str::trim)
        .filter(|declaration| !declaration.is_empty())
        .map(|declaration| {
            let mut pieces = declaration.split(':').map(str::trim);
            let property = pieces.next().unwrap_or_default();
            let value = pieces.collect::<Vec<_>>().join(":");
            (property, value)
        })
        .collect()
}
