//! The context script front end.
//!
//! Parses a plain-text specification into [`Directive`]s. The script is a
//! declarative surface over the same directive model the programmatic API
//! uses; nothing here touches the filesystem or the shell.
//!
//! One statement per line:
//!
//! ```text
//! # comment
//! meta version: "1.0"
//! variable branch: "main"
//! variable package: json("package.json")
//! file "src/lib.rs" tags: lib, rust
//! command "git log -1" tags: vcs
//! namespace docs {
//!   file "README.md"
//! }
//! ```
//!
//! Values are quoted strings, integers, floats, `true`/`false`, or the
//! loaders `json("path")` and `yaml("path")`. Namespaces nest; closing `}`
//! must balance.

use crate::builder::{Directive, ValueSource};
use crate::error::{Error, Result};
use crate::value::{Number, Value};

/// Parses script source into a directive list.
///
/// # Errors
///
/// Returns [`Error::Script`] with the offending line number for any
/// statement that does not match the grammar, and for unbalanced
/// `namespace { ... }` blocks.
pub fn parse(source: &str) -> Result<Vec<Directive>> {
    // Stack of open blocks: the root plus one frame per open namespace.
    let mut frames: Vec<(Option<String>, Vec<Directive>)> = vec![(None, Vec::new())];

    for (idx, raw) in source.lines().enumerate() {
        let number = idx + 1;
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if line == "}" {
            match frames.pop() {
                Some((Some(name), body)) => {
                    // frames still holds the enclosing block.
                    if let Some(parent) = frames.last_mut() {
                        parent.1.push(Directive::Namespace(name, body));
                    }
                }
                _ => return Err(Error::script(number, "unmatched `}`")),
            }
            continue;
        }

        if let Some(rest) = line.strip_prefix("namespace ") {
            let rest = rest.trim();
            let name = rest
                .strip_suffix('{')
                .map(str::trim)
                .ok_or_else(|| Error::script(number, "expected `{` after namespace name"))?;
            if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
                return Err(Error::script(number, "invalid namespace name"));
            }
            frames.push((Some(name.to_string()), Vec::new()));
            continue;
        }

        let directive = if let Some(rest) = line.strip_prefix("file ") {
            let (path, rest) = parse_quoted(rest.trim(), number)?;
            Directive::File {
                path,
                tags: parse_tags(rest, number)?,
            }
        } else if let Some(rest) = line.strip_prefix("command ") {
            let (command, rest) = parse_quoted(rest.trim(), number)?;
            Directive::Command {
                command,
                tags: parse_tags(rest, number)?,
            }
        } else if let Some(rest) = line.strip_prefix("variable ") {
            Directive::Variable(vec![parse_assignment(rest, number)?])
        } else if let Some(rest) = line.strip_prefix("meta ") {
            Directive::Meta(vec![parse_assignment(rest, number)?])
        } else {
            return Err(Error::script(number, format!("unknown directive: {line}")));
        };

        // frames is never empty: `}` pops only namespace frames.
        if let Some(frame) = frames.last_mut() {
            frame.1.push(directive);
        }
    }

    match frames.pop() {
        Some((None, body)) if frames.is_empty() => Ok(body),
        _ => Err(Error::script(
            source.lines().count(),
            "unclosed namespace block",
        )),
    }
}

/// Parses `key: VALUE` after a `variable`/`meta` keyword.
fn parse_assignment(rest: &str, number: usize) -> Result<(String, ValueSource)> {
    let rest = rest.trim();
    let (key, value) = rest
        .split_once(':')
        .ok_or_else(|| Error::script(number, "expected `key: value`"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(Error::script(number, "empty key"));
    }
    Ok((key.to_string(), parse_value_source(value.trim(), number)?))
}

fn parse_value_source(text: &str, number: usize) -> Result<ValueSource> {
    if text.starts_with('"') {
        let (content, rest) = parse_quoted(text, number)?;
        if !rest.trim().is_empty() {
            return Err(Error::script(number, "unexpected trailing characters"));
        }
        return Ok(ValueSource::Literal(Value::String(content)));
    }
    if let Some(path) = loader_argument(text, "json", number)? {
        return Ok(ValueSource::JsonFile(path));
    }
    if let Some(path) = loader_argument(text, "yaml", number)? {
        return Ok(ValueSource::YamlFile(path));
    }
    match text {
        "true" => return Ok(ValueSource::Literal(Value::Bool(true))),
        "false" => return Ok(ValueSource::Literal(Value::Bool(false))),
        _ => {}
    }
    if let Ok(i) = text.parse::<i64>() {
        return Ok(ValueSource::Literal(Value::Number(Number::Integer(i))));
    }
    if text.contains('.') {
        if let Ok(f) = text.parse::<f64>() {
            return Ok(ValueSource::Literal(Value::Number(Number::Float(f))));
        }
    }
    Err(Error::script(number, format!("invalid value: {text}")))
}

/// Matches `name("path")` for the structured-data loaders.
fn loader_argument(text: &str, name: &str, number: usize) -> Result<Option<String>> {
    let Some(inner) = text.strip_prefix(name).and_then(|t| t.strip_prefix('(')) else {
        return Ok(None);
    };
    let (path, rest) = parse_quoted(inner.trim(), number)?;
    if rest.trim() != ")" {
        return Err(Error::script(number, format!("expected `)` after {name}(...)")));
    }
    Ok(Some(path))
}

/// Parses an optional trailing `tags: a, b` clause.
fn parse_tags(rest: &str, number: usize) -> Result<Vec<String>> {
    let rest = rest.trim();
    if rest.is_empty() {
        return Ok(Vec::new());
    }
    let list = rest
        .strip_prefix("tags:")
        .ok_or_else(|| Error::script(number, "expected `tags:` or end of line"))?;
    let mut tags = Vec::new();
    for tag in list.split(',') {
        let tag = tag.trim();
        if tag.is_empty() {
            return Err(Error::script(number, "empty tag"));
        }
        tags.push(tag.to_string());
    }
    Ok(tags)
}

/// Parses a double-quoted string at the start of `text`, returning the
/// content and the remainder of the line.
fn parse_quoted(text: &str, number: usize) -> Result<(String, &str)> {
    let mut chars = text.char_indices();
    match chars.next() {
        Some((_, '"')) => {}
        _ => return Err(Error::script(number, "expected a quoted string")),
    }
    let mut content = String::new();
    while let Some((idx, ch)) = chars.next() {
        match ch {
            '"' => return Ok((content, &text[idx + 1..])),
            '\\' => match chars.next() {
                Some((_, '"')) => content.push('"'),
                Some((_, '\\')) => content.push('\\'),
                Some((_, 'n')) => content.push('\n'),
                Some((_, 't')) => content.push('\t'),
                Some((_, other)) => {
                    content.push('\\');
                    content.push(other);
                }
                None => return Err(Error::script(number, "unterminated string")),
            },
            other => content.push(other),
        }
    }
    Err(Error::script(number, "unterminated string"))
}
