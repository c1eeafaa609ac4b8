//! Parser for the `.properties` bundle format
//!
//! Logical lines are split on `=`, `:` or whitespace, physical lines
//! ending in an odd number of backslashes continue onto the next line,
//! and `#`/`!` start comment lines. Escape sequences cover `\t`, `\n`,
//! `\f`, `\r`, `\uXXXX` and separator escaping; an unknown escape drops
//! the backslash. Duplicate keys keep the last value.

use std::collections::HashMap;

use thiserror::Error;

/// A `\u` escape that does not encode a character
///
/// Raised for truncated or non-hex escapes and for code points outside
/// the Unicode scalar range, such as lone surrogates.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Malformed \\u escape on line {line}")]
pub struct PropertiesError {
    /// One-based physical line on which the offending logical line starts
    pub line: usize,
}

/// Parse properties text into a key-to-value map
pub fn parse(content: &str) -> Result<HashMap<String, String>, PropertiesError> {
    let lines = physical_lines(content);
    let mut entries = HashMap::new();
    let mut index = 0;

    while index < lines.len() {
        let start_line = index + 1;
        let first = strip_leading_whitespace(lines[index]);
        index += 1;
        if first.is_empty() || first.starts_with(['#', '!']) {
            continue;
        }

        let mut logical = String::from(first);
        while ends_with_odd_backslashes(&logical) {
            logical.pop();
            if let Some(continuation) = lines.get(index) {
                index += 1;
                logical.push_str(strip_leading_whitespace(continuation));
            }
        }

        let (raw_key, raw_value) = split_key_value(&logical);
        let key = unescape(raw_key, start_line)?;
        let value = unescape(raw_value, start_line)?;
        entries.insert(key, value);
    }
    Ok(entries)
}

/// Split on `\n`, `\r` and `\r\n` alike
fn physical_lines(content: &str) -> Vec<&str> {
    let mut lines = Vec::new();
    let mut rest = content;
    while !rest.is_empty() {
        match rest.find(['\r', '\n']) {
            Some(end) => {
                lines.push(&rest[..end]);
                let mut next = end + 1;
                if rest.as_bytes()[end] == b'\r' && rest.as_bytes().get(next) == Some(&b'\n') {
                    next += 1;
                }
                rest = &rest[next..];
            }
            None => {
                lines.push(rest);
                rest = "";
            }
        }
    }
    lines
}

fn strip_leading_whitespace(line: &str) -> &str {
    line.trim_start_matches([' ', '\t', '\u{c}'])
}

fn ends_with_odd_backslashes(line: &str) -> bool {
    line.bytes().rev().take_while(|byte| *byte == b'\\').count() % 2 == 1
}

/// Find the key terminator and the start of the value
///
/// The first unescaped `=`, `:` or whitespace ends the key; whitespace
/// after it is skipped, and one `=` or `:` found during that skip still
/// counts as the separator.
fn split_key_value(line: &str) -> (&str, &str) {
    let bytes = line.as_bytes();
    let limit = bytes.len();
    let mut key_end = limit;
    let mut value_start = limit;
    let mut has_separator = false;
    let mut preceding_backslash = false;

    for (index, byte) in bytes.iter().enumerate() {
        match byte {
            b'=' | b':' if !preceding_backslash => {
                key_end = index;
                value_start = index + 1;
                has_separator = true;
                break;
            }
            b' ' | b'\t' | b'\x0c' if !preceding_backslash => {
                key_end = index;
                value_start = index + 1;
                break;
            }
            b'\\' => preceding_backslash = !preceding_backslash,
            _ => preceding_backslash = false,
        }
    }

    while value_start < limit {
        let byte = bytes[value_start];
        if byte != b' ' && byte != b'\t' && byte != b'\x0c' {
            if !has_separator && (byte == b'=' || byte == b':') {
                has_separator = true;
            } else {
                break;
            }
        }
        value_start += 1;
    }
    (&line[..key_end], &line[value_start..])
}

fn unescape(text: &str, line: usize) -> Result<String, PropertiesError> {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('u') => {
                let mut code = 0u32;
                for _ in 0..4 {
                    let digit = chars
                        .next()
                        .and_then(|hex| hex.to_digit(16))
                        .ok_or(PropertiesError { line })?;
                    code = code * 16 + digit;
                }
                let decoded = char::from_u32(code).ok_or(PropertiesError { line })?;
                out.push(decoded);
            }
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some('f') => out.push('\u{c}'),
            Some('r') => out.push('\r'),
            Some(other) => out.push(other),
            None => {}
        }
    }
    Ok(out)
}
