//! TOON decoding.
//!
//! Parses TOON text back into a generic [`Value`] tree. Indentation (2
//! spaces per level) establishes nesting; an inline `key[N]: v1,...,vN`
//! decodes to a list of exactly `N` scalars and fails with a count mismatch
//! otherwise; quoted tokens decode via the standard escapes; unquoted tokens
//! narrow to the smallest applicable scalar type (integer, float, boolean,
//! null, else string).
//!
//! Decoding yields a value tree, not a typed document. Because the encoder
//! quotes any string that would read back as another scalar type, decoding
//! what [`ser::encode`](crate::ser::encode) produced reconstructs the
//! original tree exactly.
//!
//! ```rust
//! use context_pack::de;
//!
//! let value = de::decode("metadata:\n  version: \"1.0\"\n").unwrap();
//! let metadata = value.as_object().unwrap().get("metadata").unwrap();
//! assert_eq!(
//!     metadata.as_object().unwrap().get("version").unwrap().as_str(),
//!     Some("1.0")
//! );
//! ```

use crate::error::{Error, Result};
use crate::map::Map;
use crate::value::{Number, Value};

/// Decodes TOON text into a [`Value`].
///
/// # Errors
///
/// Returns a syntax error with line and column information for grammar
/// violations and [`Error::CountMismatch`] when a `key[N]` annotation
/// disagrees with the number of elements found.
pub fn decode(input: &str) -> Result<Value> {
    let lines = scan_lines(input)?;
    if lines.is_empty() {
        return Ok(Value::Null);
    }
    let mut decoder = Decoder { lines, pos: 0 };
    let first = decoder.lines[0];
    if first.level != 0 {
        return Err(Error::syntax(
            first.number,
            first.col(),
            "unexpected indentation at start of input",
        ));
    }

    let value = if parse_key_part(first.text, first.number, 1)?.is_some() {
        decoder.parse_map(0)?
    } else if first.text.starts_with('[') {
        let line = decoder.advance();
        let (count, rest) = parse_count_header(line.text, line.number, 1)?;
        let rest_col = 1 + line.text.len() - rest.len();
        decoder.parse_list(count, rest, rest_col, line.number, 0)?
    } else {
        let line = decoder.advance();
        parse_scalar_token(line.text, line.number, 1)?
    };

    if let Some(line) = decoder.peek() {
        return Err(Error::syntax(line.number, line.col(), "trailing content"));
    }
    Ok(value)
}

#[derive(Clone, Copy)]
struct Line<'a> {
    number: usize,
    level: usize,
    text: &'a str,
}

impl Line<'_> {
    /// 1-based column where the line's content starts.
    fn col(&self) -> usize {
        self.level * 2 + 1
    }
}

fn scan_lines(input: &str) -> Result<Vec<Line<'_>>> {
    let mut lines = Vec::new();
    for (idx, raw) in input.lines().enumerate() {
        let number = idx + 1;
        let raw = raw.strip_suffix('\r').unwrap_or(raw);
        if raw.trim().is_empty() {
            continue;
        }
        let spaces = raw.len() - raw.trim_start_matches(' ').len();
        let text = &raw[spaces..];
        if text.starts_with('\t') {
            return Err(Error::syntax(number, spaces + 1, "tabs are not allowed in indentation"));
        }
        if spaces % 2 != 0 {
            return Err(Error::syntax(
                number,
                spaces + 1,
                "indentation must be a multiple of 2 spaces",
            ));
        }
        lines.push(Line {
            number,
            level: spaces / 2,
            text,
        });
    }
    Ok(lines)
}

struct Decoder<'a> {
    lines: Vec<Line<'a>>,
    pos: usize,
}

impl<'a> Decoder<'a> {
    fn peek(&self) -> Option<Line<'a>> {
        self.lines.get(self.pos).copied()
    }

    fn advance(&mut self) -> Line<'a> {
        let line = self.lines[self.pos];
        self.pos += 1;
        line
    }

    fn parse_map(&mut self, level: usize) -> Result<Value> {
        let mut map = Map::new();
        self.parse_entries_into(level, &mut map)?;
        Ok(Value::Object(map))
    }

    fn parse_entries_into(&mut self, level: usize, map: &mut Map) -> Result<()> {
        while let Some(line) = self.peek() {
            if line.level < level {
                break;
            }
            if line.level > level {
                return Err(Error::syntax(line.number, line.col(), "unexpected indentation"));
            }
            if line.text.starts_with('-') {
                break;
            }
            let number = line.number;
            let col = line.col();
            let (key, count, rest) = parse_key_part(line.text, number, col)?
                .ok_or_else(|| Error::syntax(number, col, "expected `key:`"))?;
            // rest is a suffix of the line, so its column is length arithmetic.
            let rest_col = col + line.text.len() - rest.len();
            self.pos += 1;
            let value = match count {
                Some(declared) => self.parse_list(declared, rest, rest_col, number, level)?,
                None => self.parse_pair_value(rest, rest_col, number, level)?,
            };
            map.insert(key, value);
        }
        Ok(())
    }

    /// Value of a plain `key:` entry at `level`: inline scalar, nested block
    /// one level deeper, or an empty mapping.
    fn parse_pair_value(
        &mut self,
        rest: &str,
        rest_col: usize,
        number: usize,
        level: usize,
    ) -> Result<Value> {
        if !rest.is_empty() {
            parse_scalar_token(rest, number, rest_col)
        } else if self.peek().map_or(false, |l| l.level > level) {
            self.parse_map(level + 1)
        } else {
            Ok(Value::Object(Map::new()))
        }
    }

    /// List body for a `[N]` annotation: inline comma-joined scalars on the
    /// same line, or `- ` items one level deeper.
    fn parse_list(
        &mut self,
        declared: usize,
        rest: &str,
        rest_col: usize,
        header_number: usize,
        level: usize,
    ) -> Result<Value> {
        if !rest.is_empty() {
            let tokens = split_inline(rest, header_number, rest_col)?;
            if tokens.len() != declared {
                return Err(Error::count_mismatch(header_number, declared, tokens.len()));
            }
            let mut items = Vec::with_capacity(tokens.len());
            for (token, token_col) in tokens {
                items.push(parse_scalar_token(&token, header_number, token_col)?);
            }
            return Ok(Value::Array(items));
        }
        let mut items = Vec::new();
        while let Some(line) = self.peek() {
            if line.level != level + 1 || !line.text.starts_with('-') {
                break;
            }
            items.push(self.parse_list_item(level + 1)?);
        }
        if items.len() != declared {
            return Err(Error::count_mismatch(header_number, declared, items.len()));
        }
        Ok(Value::Array(items))
    }

    fn parse_list_item(&mut self, item_level: usize) -> Result<Value> {
        let line = self.advance();
        let number = line.number;
        let base_col = line.col();
        let after = &line.text[1..];
        if !after.is_empty() && !after.starts_with(' ') {
            return Err(Error::syntax(number, base_col + 1, "expected space after `-`"));
        }
        let after = after.trim_start();
        let after_col = base_col + line.text.len() - after.len();
        if after.is_empty() {
            return Ok(Value::Object(Map::new()));
        }

        if let Some((key, count, rest)) = parse_key_part(after, number, after_col)? {
            // Object item: the first field shares the hyphen line, the rest
            // sit one level deeper, aligned under it.
            let rest_col = after_col + after.len() - rest.len();
            let field_level = item_level + 1;
            let first = match count {
                Some(declared) => {
                    self.parse_list(declared, rest, rest_col, number, field_level)?
                }
                None => self.parse_pair_value(rest, rest_col, number, field_level)?,
            };
            let mut map = Map::new();
            map.insert(key, first);
            self.parse_entries_into(field_level, &mut map)?;
            return Ok(Value::Object(map));
        }

        if after.starts_with('[') {
            let (count, rest) = parse_count_header(after, number, after_col)?;
            let rest_col = after_col + after.len() - rest.len();
            return self.parse_list(count, rest, rest_col, number, item_level + 1);
        }

        parse_scalar_token(after, number, after_col)
    }
}

/// Splits a line into key, optional `[N]` count and the remainder after the
/// colon. Returns `None` when the line is not a key line (a bare scalar).
/// `col` is the 1-based column where `text` starts in the source line.
fn parse_key_part(
    text: &str,
    number: usize,
    col: usize,
) -> Result<Option<(String, Option<usize>, &str)>> {
    let (key, after_key) = if text.starts_with('"') {
        let (key, consumed) = scan_quoted(text, number, col)?;
        (key, &text[consumed..])
    } else {
        match text.find(|c| c == ':' || c == '[') {
            Some(0) => return Ok(None),
            Some(idx) => (text[..idx].to_string(), &text[idx..]),
            None => return Ok(None),
        }
    };
    let after_key_col = col + text.len() - after_key.len();

    let (count, after_count) = if let Some(stripped) = after_key.strip_prefix('[') {
        let close = stripped.find(']').ok_or_else(|| {
            Error::syntax(number, after_key_col, "unterminated `[N]` annotation")
        })?;
        let digits = &stripped[..close];
        let n: usize = digits.parse().map_err(|_| {
            Error::syntax(number, after_key_col + 1, "invalid element count in `[N]`")
        })?;
        (Some(n), &stripped[close + 1..])
    } else {
        (None, after_key)
    };
    let after_count_col = col + text.len() - after_count.len();

    let rest = match after_count.strip_prefix(':') {
        Some(rest) => rest,
        None if count.is_some() => {
            return Err(Error::syntax(number, after_count_col, "expected `:` after `[N]`"));
        }
        None => return Ok(None),
    };
    Ok(Some((key, count, rest.trim_start())))
}

/// Parses a root-level or list-item `[N]: ...` header without a key.
fn parse_count_header(text: &str, number: usize, col: usize) -> Result<(usize, &str)> {
    let stripped = text
        .strip_prefix('[')
        .ok_or_else(|| Error::syntax(number, col, "expected `[N]:`"))?;
    let close = stripped
        .find(']')
        .ok_or_else(|| Error::syntax(number, col, "unterminated `[N]` annotation"))?;
    let n: usize = stripped[..close]
        .parse()
        .map_err(|_| Error::syntax(number, col + 1, "invalid element count in `[N]`"))?;
    let after = &stripped[close + 1..];
    let after_col = col + text.len() - after.len();
    let rest = after
        .strip_prefix(':')
        .ok_or_else(|| Error::syntax(number, after_col, "expected `:` after `[N]`"))?;
    Ok((n, rest.trim_start()))
}

/// Splits an inline list into raw tokens and their source columns, honoring
/// quoted segments so commas inside quotes do not split.
fn split_inline(rest: &str, number: usize, col: usize) -> Result<Vec<(String, usize)>> {
    let mut tokens = Vec::new();
    let mut remaining = rest;
    loop {
        let token_col = col + rest.len() - remaining.len();
        if remaining.starts_with('"') {
            let (_, consumed) = scan_quoted(remaining, number, token_col)?;
            tokens.push((remaining[..consumed].to_string(), token_col));
            remaining = &remaining[consumed..];
            match remaining.strip_prefix(',') {
                Some(next) => remaining = next,
                None if remaining.is_empty() => break,
                None => {
                    return Err(Error::syntax(
                        number,
                        col + rest.len() - remaining.len(),
                        "expected `,` after quoted list element",
                    ))
                }
            }
        } else {
            match remaining.find(',') {
                Some(idx) => {
                    tokens.push((remaining[..idx].to_string(), token_col));
                    remaining = &remaining[idx + 1..];
                }
                None => {
                    tokens.push((remaining.to_string(), token_col));
                    break;
                }
            }
        }
    }
    Ok(tokens)
}

/// Scans a double-quoted token at the start of `text`, returning the
/// unescaped content and the number of bytes consumed including quotes.
/// `col` is the column of the opening quote.
fn scan_quoted(text: &str, number: usize, col: usize) -> Result<(String, usize)> {
    debug_assert!(text.starts_with('"'));
    let mut result = String::new();
    let mut chars = text.char_indices().skip(1);
    while let Some((idx, ch)) = chars.next() {
        match ch {
            '"' => return Ok((result, idx + 1)),
            '\\' => {
                let escape_col = col + idx;
                match chars.next() {
                    Some((_, '"')) => result.push('"'),
                    Some((_, '\\')) => result.push('\\'),
                    Some((_, 'n')) => result.push('\n'),
                    Some((_, 'r')) => result.push('\r'),
                    Some((_, 't')) => result.push('\t'),
                    Some((_, 'u')) => {
                        let mut hex = String::new();
                        for _ in 0..4 {
                            match chars.next() {
                                Some((_, c)) if c.is_ascii_hexdigit() => hex.push(c),
                                _ => {
                                    return Err(Error::syntax(
                                        number,
                                        escape_col,
                                        "invalid unicode escape (expected 4 hex digits)",
                                    ))
                                }
                            }
                        }
                        let code_point = u32::from_str_radix(&hex, 16).map_err(|_| {
                            Error::syntax(number, escape_col, "invalid hex in unicode escape")
                        })?;
                        let ch = char::from_u32(code_point).ok_or_else(|| {
                            Error::syntax(number, escape_col, "invalid unicode code point")
                        })?;
                        result.push(ch);
                    }
                    // Unknown escape, preserved literally (lenient parsing).
                    Some((_, other)) => {
                        result.push('\\');
                        result.push(other);
                    }
                    None => {
                        return Err(Error::syntax(
                            number,
                            escape_col,
                            "unexpected end of input in string",
                        ))
                    }
                }
            }
            other => result.push(other),
        }
    }
    Err(Error::syntax(number, col, "unterminated string"))
}

/// Decodes one scalar token to the narrowest applicable type. `col` is the
/// column where the raw token starts.
fn parse_scalar_token(token: &str, number: usize, col: usize) -> Result<Value> {
    let col = col + token.len() - token.trim_start().len();
    let token = token.trim();
    if token.is_empty() {
        return Err(Error::syntax(number, col, "expected a value"));
    }
    if token.starts_with('"') {
        let (content, consumed) = scan_quoted(token, number, col)?;
        if consumed != token.len() {
            return Err(Error::syntax(
                number,
                col + consumed,
                "unexpected characters after closing quote",
            ));
        }
        return Ok(Value::String(content));
    }
    match token {
        "true" => return Ok(Value::Bool(true)),
        "false" => return Ok(Value::Bool(false)),
        "null" => return Ok(Value::Null),
        _ => {}
    }
    if is_integer_shaped(token) {
        if let Ok(i) = token.parse::<i64>() {
            return Ok(Value::Number(Number::Integer(i)));
        }
    }
    if is_float_shaped(token) {
        if let Ok(f) = token.parse::<f64>() {
            return Ok(Value::Number(Number::Float(f)));
        }
    }
    Ok(Value::String(token.to_string()))
}

fn is_integer_shaped(token: &str) -> bool {
    let digits = token.strip_prefix('-').unwrap_or(token);
    !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit())
}

/// Matches `-?digits(.digits)?([eE][+-]?digits)?` with at least a fraction
/// or an exponent (pure digit runs are integer tokens).
fn is_float_shaped(token: &str) -> bool {
    let unsigned = token.strip_prefix('-').unwrap_or(token);
    let (mantissa, exponent) = match unsigned.split_once(|c| c == 'e' || c == 'E') {
        Some((m, e)) => (m, Some(e)),
        None => (unsigned, None),
    };
    let mantissa_ok = match mantissa.split_once('.') {
        Some((whole, frac)) => {
            !whole.is_empty()
                && !frac.is_empty()
                && whole.chars().all(|c| c.is_ascii_digit())
                && frac.chars().all(|c| c.is_ascii_digit())
        }
        None => {
            exponent.is_some()
                && !mantissa.is_empty()
                && mantissa.chars().all(|c| c.is_ascii_digit())
        }
    };
    let exponent_ok = match exponent {
        Some(e) => {
            let digits = e
                .strip_prefix('+')
                .or_else(|| e.strip_prefix('-'))
                .unwrap_or(e);
            !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit())
        }
        None => true,
    };
    mantissa_ok && exponent_ok
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalars_narrow_to_their_types() {
        assert_eq!(decode("42\n").unwrap(), Value::Number(Number::Integer(42)));
        assert_eq!(decode("-7\n").unwrap(), Value::Number(Number::Integer(-7)));
        assert_eq!(decode("2.5\n").unwrap(), Value::Number(Number::Float(2.5)));
        assert_eq!(decode("true\n").unwrap(), Value::Bool(true));
        assert_eq!(decode("null\n").unwrap(), Value::Null);
        assert_eq!(decode("bar\n").unwrap(), Value::from("bar"));
        assert_eq!(decode("\"1.0\"\n").unwrap(), Value::from("1.0"));
    }

    #[test]
    fn float_tokens_accept_exponent_notation() {
        assert_eq!(decode("1.0\n").unwrap(), Value::Number(Number::Float(1.0)));
        assert_eq!(
            decode("1e-300\n").unwrap(),
            Value::Number(Number::Float(1e-300))
        );
        assert_eq!(
            decode("-2.5E3\n").unwrap(),
            Value::Number(Number::Float(-2500.0))
        );
        // Malformed exponents stay strings.
        assert_eq!(decode("1e\n").unwrap(), Value::from("1e"));
        assert_eq!(decode("e5\n").unwrap(), Value::from("e5"));
    }

    #[test]
    fn nested_map_by_indentation() {
        let value = decode("outer:\n  inner: x\n  count: 3\n").unwrap();
        let outer = value.as_object().unwrap().get("outer").unwrap();
        let obj = outer.as_object().unwrap();
        assert_eq!(obj.get("inner").unwrap().as_str(), Some("x"));
        assert_eq!(obj.get("count").unwrap().as_i64(), Some(3));
    }

    #[test]
    fn bare_key_line_decodes_to_empty_mapping() {
        let value = decode("files:\ncommands:\n").unwrap();
        let root = value.as_object().unwrap();
        assert!(root.get("files").unwrap().as_object().unwrap().is_empty());
        assert!(root.get("commands").unwrap().as_object().unwrap().is_empty());
    }

    #[test]
    fn inline_list_decodes_exactly_n_elements() {
        let value = decode("tags[3]: lib,spec,\"1.0\"\n").unwrap();
        let tags = value
            .as_object()
            .unwrap()
            .get("tags")
            .unwrap()
            .as_array()
            .unwrap();
        assert_eq!(tags.len(), 3);
        assert_eq!(tags[0].as_str(), Some("lib"));
        assert_eq!(tags[2].as_str(), Some("1.0"));
    }

    #[test]
    fn count_mismatch_is_fatal() {
        let err = decode("tags[2]: a,b,c\n").unwrap_err();
        assert!(matches!(
            err,
            Error::CountMismatch {
                declared: 2,
                found: 3,
                ..
            }
        ));
    }

    #[test]
    fn block_list_count_is_validated() {
        let err = decode("items[3]:\n  - a\n  - b\n").unwrap_err();
        assert!(matches!(
            err,
            Error::CountMismatch {
                declared: 3,
                found: 2,
                ..
            }
        ));
    }

    #[test]
    fn quoted_keys_carry_paths() {
        let value = decode("\"src/lib.rs\": ok\n").unwrap();
        let root = value.as_object().unwrap();
        assert_eq!(root.get("src/lib.rs").unwrap().as_str(), Some("ok"));
    }

    #[test]
    fn escapes_unwind() {
        let value = decode("content: \"a\\nb\\t\\\"c\\\"\\\\d\"\n").unwrap();
        assert_eq!(
            value.as_object().unwrap().get("content").unwrap().as_str(),
            Some("a\nb\t\"c\"\\d")
        );
    }

    #[test]
    fn hyphen_items_decode_to_objects() {
        let toon = "entries[2]:\n  - name: alpha\n    size: 1\n  - name: beta\n";
        let value = decode(toon).unwrap();
        let entries = value
            .as_object()
            .unwrap()
            .get("entries")
            .unwrap()
            .as_array()
            .unwrap();
        assert_eq!(entries.len(), 2);
        let first = entries[0].as_object().unwrap();
        assert_eq!(first.get("name").unwrap().as_str(), Some("alpha"));
        assert_eq!(first.get("size").unwrap().as_i64(), Some(1));
    }

    #[test]
    fn odd_indentation_is_rejected() {
        let err = decode("a:\n   b: 1\n").unwrap_err();
        assert!(matches!(err, Error::Syntax { line: 2, .. }));
    }

    #[test]
    fn errors_point_at_the_offending_column() {
        // Unterminated string: the value starts at column 6 of `  b: "x`.
        let err = decode("a:\n  b: \"x\n").unwrap_err();
        assert!(matches!(err, Error::Syntax { line: 2, col: 6, .. }));

        // Over-indented line: content starts at column 5.
        let err = decode("a:\n    b: 1\n").unwrap_err();
        assert!(matches!(err, Error::Syntax { line: 2, col: 5, .. }));

        // Second inline element is missing; it would start at column 12.
        let err = decode("tags[2]: a,\n").unwrap_err();
        assert!(matches!(err, Error::Syntax { line: 1, col: 12, .. }));
    }

    #[test]
    fn empty_input_decodes_to_null() {
        assert_eq!(decode("").unwrap(), Value::Null);
        assert_eq!(decode("\n\n").unwrap(), Value::Null);
    }
}
