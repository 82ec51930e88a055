//! TOON encoding.
//!
//! Renders a [`Value`] tree as TOON: a line-oriented notation where
//! indentation (2 spaces per level) is the only nesting syntax.
//!
//! The rules, applied deterministically:
//!
//! - A mapping emits each key as `key:` with an inline scalar after the
//!   colon, or a newline plus an indented block for nested structure. An
//!   empty mapping value is just the bare `key:` line.
//! - Keys are unquoted when they are bare identifiers
//!   (`[A-Za-z_][A-Za-z0-9_]*`); anything else is double-quoted.
//! - Scalar strings are unquoted when non-empty and limited to
//!   `[A-Za-z0-9_-]`; anything else is double-quoted with `"`, `\` and
//!   control characters escaped. Strings that would read back as another
//!   scalar type (`true`, `null`, `42`) are quoted even though their
//!   characters are bare.
//! - A list of scalars renders inline as `key[N]: v1,v2,...,vN` with no
//!   spaces around commas. An empty list is omitted entirely.
//! - A list holding non-scalar elements renders as `key[N]:` followed by
//!   indented `- ` items.
//!
//! ```rust
//! use context_pack::{Map, Value, ser};
//!
//! let mut root = Map::new();
//! root.insert("foo".to_string(), Value::from("bar"));
//! root.insert("version".to_string(), Value::from("1.0"));
//! assert_eq!(ser::encode(&Value::Object(root)), "foo: bar\nversion: \"1.0\"\n");
//! ```

use crate::map::Map;
use crate::value::Value;
use std::fmt::Write;

/// Encodes a value tree as TOON text. Deterministic: identical input yields
/// identical output.
#[must_use]
pub fn encode(value: &Value) -> String {
    let mut encoder = Encoder {
        out: String::with_capacity(256),
    };
    match value {
        Value::Object(map) => encoder.write_map(map, 0),
        Value::Array(items) => {
            encoder.write_array_header_and_body(items, 0);
        }
        scalar => {
            encoder.write_scalar(scalar);
            encoder.out.push('\n');
        }
    }
    encoder.out
}

/// Returns `true` when `key` can be emitted without quotes: letters, digits
/// and underscore, no leading digit.
#[must_use]
pub fn is_bare_key(key: &str) -> bool {
    let mut chars = key.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Returns `true` when a string scalar can be emitted without quotes:
/// non-empty, no whitespace, no punctuation outside `_` and `-`.
#[must_use]
pub fn is_bare_scalar(s: &str) -> bool {
    !s.is_empty()
        && s.chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        && !reads_as_other_scalar(s)
}

/// A bare string that the decoder would narrow to a boolean, null or
/// number must keep its quotes.
fn reads_as_other_scalar(s: &str) -> bool {
    if matches!(s, "true" | "false" | "null") {
        return true;
    }
    let unsigned = s.strip_prefix('-').unwrap_or(s);
    if !unsigned.is_empty() && unsigned.bytes().all(|b| b.is_ascii_digit()) {
        return true;
    }
    // Exponent notation is float-shaped even without a dot (`1e300`, the
    // only float shape expressible in bare characters).
    match unsigned.split_once(|c| c == 'e' || c == 'E') {
        Some((mantissa, exponent)) => {
            let exponent = exponent.strip_prefix('-').unwrap_or(exponent);
            !mantissa.is_empty()
                && !exponent.is_empty()
                && mantissa.bytes().all(|b| b.is_ascii_digit())
                && exponent.bytes().all(|b| b.is_ascii_digit())
        }
        None => false,
    }
}

struct Encoder {
    out: String,
}

impl Encoder {
    fn indent(&mut self, depth: usize) {
        for _ in 0..depth {
            self.out.push_str("  ");
        }
    }

    fn write_map(&mut self, map: &Map, depth: usize) {
        for (key, value) in map {
            // Empty lists are absent fields; they leave no trace.
            if let Value::Array(items) = value {
                if items.is_empty() {
                    continue;
                }
            }
            self.indent(depth);
            self.write_pair_body(key, value, depth);
        }
    }

    /// Writes `key: ...` assuming indentation is already in place. Nested
    /// blocks are indented one level deeper than `depth`.
    fn write_pair_body(&mut self, key: &str, value: &Value, depth: usize) {
        self.write_key(key);
        match value {
            Value::Object(map) => {
                self.out.push_str(":\n");
                if !map.is_empty() {
                    self.write_map(map, depth + 1);
                }
            }
            Value::Array(items) => {
                self.write_array_header_and_body(items, depth);
            }
            scalar => {
                self.out.push_str(": ");
                self.write_scalar(scalar);
                self.out.push('\n');
            }
        }
    }

    /// Writes `[N]: ...` (inline) or `[N]:` plus `- ` items, directly after
    /// whatever came before (a key, a `- ` prefix, or line start).
    fn write_array_header_and_body(&mut self, items: &[Value], depth: usize) {
        let _ = write!(self.out, "[{}]:", items.len());
        if items.is_empty() {
            self.out.push('\n');
        } else if items.iter().all(Value::is_scalar) {
            self.out.push(' ');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    self.out.push(',');
                }
                self.write_scalar(item);
            }
            self.out.push('\n');
        } else {
            self.out.push('\n');
            for item in items {
                self.write_list_item(item, depth + 1);
            }
        }
    }

    fn write_list_item(&mut self, item: &Value, depth: usize) {
        self.indent(depth);
        match item {
            Value::Object(map) if map.is_empty() => self.out.push_str("-\n"),
            Value::Object(map) => {
                self.out.push_str("- ");
                for (i, (key, value)) in map.iter().enumerate() {
                    if i == 0 {
                        // First field shares the hyphen line; its block
                        // nesting is relative to the field column.
                        self.write_pair_body(key, value, depth + 1);
                    } else {
                        self.indent(depth + 1);
                        self.write_pair_body(key, value, depth + 1);
                    }
                }
            }
            Value::Array(items) => {
                self.out.push_str("- ");
                self.write_array_header_and_body(items, depth + 1);
            }
            scalar => {
                self.out.push_str("- ");
                self.write_scalar(scalar);
                self.out.push('\n');
            }
        }
    }

    fn write_key(&mut self, key: &str) {
        if is_bare_key(key) {
            self.out.push_str(key);
        } else {
            self.write_quoted(key);
        }
    }

    fn write_scalar(&mut self, value: &Value) {
        match value {
            Value::Null => self.out.push_str("null"),
            Value::Bool(true) => self.out.push_str("true"),
            Value::Bool(false) => self.out.push_str("false"),
            Value::Number(n) => {
                let _ = write!(self.out, "{n}");
            }
            Value::String(s) => {
                if is_bare_scalar(s) {
                    self.out.push_str(s);
                } else {
                    self.write_quoted(s);
                }
            }
            // Guarded by is_scalar at every call site.
            Value::Array(_) | Value::Object(_) => {}
        }
    }

    fn write_quoted(&mut self, s: &str) {
        self.out.push('"');
        for ch in s.chars() {
            match ch {
                '"' => self.out.push_str("\\\""),
                '\\' => self.out.push_str("\\\\"),
                '\n' => self.out.push_str("\\n"),
                '\r' => self.out.push_str("\\r"),
                '\t' => self.out.push_str("\\t"),
                c if (c as u32) < 0x20 => {
                    let _ = write!(self.out, "\\u{:04x}", c as u32);
                }
                c => self.out.push(c),
            }
        }
        self.out.push('"');
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Number;

    fn object(pairs: Vec<(&str, Value)>) -> Value {
        Value::Object(
            pairs
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
        )
    }

    #[test]
    fn bare_key_classification() {
        assert!(is_bare_key("foo"));
        assert!(is_bare_key("_private"));
        assert!(is_bare_key("line2"));
        assert!(!is_bare_key("2fast"));
        assert!(!is_bare_key("src/lib.rs"));
        assert!(!is_bare_key("with space"));
        assert!(!is_bare_key(""));
    }

    #[test]
    fn bare_scalar_allows_hyphens_but_not_dots() {
        assert!(is_bare_scalar("bar"));
        assert!(is_bare_scalar("JSON"));
        assert!(is_bare_scalar("foo-bar_2"));
        assert!(!is_bare_scalar("1.0"));
        assert!(!is_bare_scalar("hello world"));
        assert!(!is_bare_scalar(""));
    }

    #[test]
    fn ambiguous_strings_stay_quoted() {
        assert!(!is_bare_scalar("true"));
        assert!(!is_bare_scalar("null"));
        assert!(!is_bare_scalar("42"));
        assert!(!is_bare_scalar("-7"));
        assert!(!is_bare_scalar("1e300"));
        assert!(!is_bare_scalar("-2E-5"));
        assert!(is_bare_scalar("true-ish"));
        assert!(is_bare_scalar("42nd"));
        assert!(is_bare_scalar("e5"));
        assert!(is_bare_scalar("1e"));

        let root = object(vec![("answer", Value::from("42"))]);
        assert_eq!(encode(&root), "answer: \"42\"\n");
    }

    #[test]
    fn scalars_and_quoting() {
        let root = object(vec![
            ("name", Value::from("bar")),
            ("version", Value::from("1.0")),
            ("count", Value::Number(Number::Integer(3))),
            ("enabled", Value::Bool(true)),
            ("note", Value::from("two words")),
        ]);
        assert_eq!(
            encode(&root),
            "name: bar\nversion: \"1.0\"\ncount: 3\nenabled: true\nnote: \"two words\"\n"
        );
    }

    #[test]
    fn nested_mapping_indents_two_spaces() {
        let root = object(vec![(
            "outer",
            object(vec![("inner", Value::from("x"))]),
        )]);
        assert_eq!(encode(&root), "outer:\n  inner: x\n");
    }

    #[test]
    fn empty_mapping_is_a_bare_key_line() {
        let root = object(vec![("commands", Value::Object(Map::new()))]);
        assert_eq!(encode(&root), "commands:\n");
    }

    #[test]
    fn scalar_list_is_inline_with_count() {
        let root = object(vec![(
            "tags",
            Value::Array(vec![Value::from("lib"), Value::from("spec")]),
        )]);
        assert_eq!(encode(&root), "tags[2]: lib,spec\n");
    }

    #[test]
    fn empty_list_is_omitted_entirely() {
        let root = object(vec![
            ("tags", Value::Array(vec![])),
            ("after", Value::from("x")),
        ]);
        assert_eq!(encode(&root), "after: x\n");
    }

    #[test]
    fn quoted_list_elements_keep_commas_unambiguous() {
        let root = object(vec![(
            "items",
            Value::Array(vec![Value::from("a,b"), Value::from("c")]),
        )]);
        assert_eq!(encode(&root), "items[2]: \"a,b\",c\n");
    }

    #[test]
    fn non_bare_keys_are_quoted() {
        let root = object(vec![("src/lib.rs", Value::from("ok"))]);
        assert_eq!(encode(&root), "\"src/lib.rs\": ok\n");
    }

    #[test]
    fn control_characters_escape_in_quoted_strings() {
        let root = object(vec![("content", Value::from("a\nb\t\"c\"\\d"))]);
        assert_eq!(encode(&root), "content: \"a\\nb\\t\\\"c\\\"\\\\d\"\n");
    }

    #[test]
    fn non_scalar_list_uses_hyphen_items() {
        let root = object(vec![(
            "entries",
            Value::Array(vec![
                object(vec![
                    ("name", Value::from("alpha")),
                    ("size", Value::Number(Number::Integer(1))),
                ]),
                object(vec![("name", Value::from("beta"))]),
            ]),
        )]);
        assert_eq!(
            encode(&root),
            "entries[2]:\n  - name: alpha\n    size: 1\n  - name: beta\n"
        );
    }

    #[test]
    fn minimal_document_shape_is_byte_exact() {
        let root = object(vec![
            ("files", Value::Object(Map::new())),
            ("commands", Value::Object(Map::new())),
            (
                "metadata",
                object(vec![("version", Value::from("1.0"))]),
            ),
            ("variables", object(vec![("foo", Value::from("bar"))])),
        ]);
        assert_eq!(
            encode(&root),
            "files:\ncommands:\nmetadata:\n  version: \"1.0\"\nvariables:\n  foo: bar\n"
        );
    }
}
