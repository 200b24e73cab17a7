//! Structured-text codec for the snapshot artifact.
//!
//! The format is a narrow, JSON-compatible subset of YAML. A document is a
//! single node, and a node is one of:
//!
//! - a scalar line, holding any JSON scalar (or an empty `[]` / `{}`);
//! - a sequence, one `- <scalar>` line per item, or a bare `-` followed by a
//!   nested node indented one level deeper;
//! - a mapping, one `key: <scalar>` line per entry, or `key:` followed by a
//!   nested node indented one level deeper.
//!
//! Indentation is two spaces per level. Keys made of `[A-Za-z0-9_./-]` (not
//! starting with `-`) are written bare; anything else is written as a JSON
//! string. A bare `key:` or `-` with nothing nested decodes as `null`.
//!
//! [`decode`] is the inverse of [`encode`] for every [`Value`], including map
//! key order.

use crate::error::BeaconError;
use crate::types::Snapshot;
use serde_json::{Map, Value};

const INDENT: &str = "  ";

/// Encodes a value as structured text. The output always ends with a newline.
pub fn encode(value: &Value) -> String {
    let mut lines = Vec::new();
    encode_node(value, 0, &mut lines);
    let mut out = lines.join("\n");
    out.push('\n');
    out
}

/// Decodes structured text produced by [`encode`] (or written by hand in the
/// same grammar).
///
/// # Errors
///
/// Returns [`BeaconError::Parse`] with a 1-based line number when the text
/// does not follow the grammar.
pub fn decode(text: &str) -> Result<Value, BeaconError> {
    let lines = scan(text)?;
    if lines.is_empty() {
        return Err(BeaconError::parse(1, "empty document"));
    }
    let mut parser = Parser { lines, pos: 0 };
    let value = parser.node(0)?;
    if let Some(line) = parser.peek() {
        return Err(BeaconError::parse(line.number, "unexpected trailing content"));
    }
    Ok(value)
}

pub fn encode_snapshot(snapshot: &Snapshot) -> Result<String, BeaconError> {
    Ok(encode(&serde_json::to_value(snapshot)?))
}

pub fn decode_snapshot(text: &str) -> Result<Snapshot, BeaconError> {
    Ok(serde_json::from_value(decode(text)?)?)
}

fn is_block(value: &Value) -> bool {
    match value {
        Value::Object(map) => !map.is_empty(),
        Value::Array(items) => !items.is_empty(),
        _ => false,
    }
}

fn encode_node(value: &Value, depth: usize, lines: &mut Vec<String>) {
    let pad = INDENT.repeat(depth);
    match value {
        Value::Object(map) if !map.is_empty() => {
            for (key, val) in map {
                let key = encode_key(key);
                if is_block(val) {
                    lines.push(format!("{pad}{key}:"));
                    encode_node(val, depth + 1, lines);
                } else {
                    lines.push(format!("{pad}{key}: {val}"));
                }
            }
        }
        Value::Array(items) if !items.is_empty() => {
            for item in items {
                if is_block(item) {
                    lines.push(format!("{pad}-"));
                    encode_node(item, depth + 1, lines);
                } else {
                    lines.push(format!("{pad}- {item}"));
                }
            }
        }
        scalar => lines.push(format!("{pad}{scalar}")),
    }
}

fn encode_key(key: &str) -> String {
    let plain = !key.is_empty()
        && !key.starts_with('-')
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '/' | '-'));
    if plain {
        key.to_string()
    } else {
        Value::String(key.to_string()).to_string()
    }
}

#[derive(Debug, Clone, Copy)]
struct Line<'a> {
    number: usize,
    depth: usize,
    text: &'a str,
}

fn scan(text: &str) -> Result<Vec<Line<'_>>, BeaconError> {
    let mut lines = Vec::new();
    for (idx, raw) in text.lines().enumerate() {
        let number = idx + 1;
        let raw = raw.trim_end();
        let body = raw.trim_start_matches(' ');
        if body.is_empty() || body.starts_with('#') {
            continue;
        }
        if body.starts_with('\t') {
            return Err(BeaconError::parse(number, "tabs are not allowed in indentation"));
        }
        let spaces = raw.len() - body.len();
        if spaces % INDENT.len() != 0 {
            return Err(BeaconError::parse(
                number,
                "indentation must be a multiple of two spaces",
            ));
        }
        lines.push(Line {
            number,
            depth: spaces / INDENT.len(),
            text: body,
        });
    }
    Ok(lines)
}

struct Parser<'a> {
    lines: Vec<Line<'a>>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<Line<'a>> {
        self.lines.get(self.pos).copied()
    }

    fn node(&mut self, depth: usize) -> Result<Value, BeaconError> {
        let Some(line) = self.peek() else {
            return Ok(Value::Null);
        };
        if is_item(line.text) {
            self.sequence(depth)
        } else if split_key(line.text).is_some() {
            self.mapping(depth)
        } else {
            self.pos += 1;
            scalar(line.text, line.number)
        }
    }

    /// Parses the block nested under a bare `key:` or `-` line at `depth`.
    fn nested(&mut self, depth: usize) -> Result<Value, BeaconError> {
        match self.peek() {
            Some(next) if next.depth == depth + 1 => self.node(depth + 1),
            Some(next) if next.depth > depth + 1 => {
                Err(BeaconError::parse(next.number, "unexpected indentation"))
            }
            _ => Ok(Value::Null),
        }
    }

    fn sequence(&mut self, depth: usize) -> Result<Value, BeaconError> {
        let mut items = Vec::new();
        while let Some(line) = self.peek() {
            if line.depth < depth {
                break;
            }
            if line.depth > depth {
                return Err(BeaconError::parse(line.number, "unexpected indentation"));
            }
            if !is_item(line.text) {
                return Err(BeaconError::parse(line.number, "expected a sequence item"));
            }
            self.pos += 1;
            let rest = line.text[1..].trim();
            let item = if rest.is_empty() {
                self.nested(depth)?
            } else {
                scalar(rest, line.number)?
            };
            items.push(item);
        }
        Ok(Value::Array(items))
    }

    fn mapping(&mut self, depth: usize) -> Result<Value, BeaconError> {
        let mut map = Map::new();
        while let Some(line) = self.peek() {
            if line.depth < depth {
                break;
            }
            if line.depth > depth {
                return Err(BeaconError::parse(line.number, "unexpected indentation"));
            }
            let Some((key, rest)) = split_key(line.text) else {
                return Err(BeaconError::parse(line.number, "expected a `key:` entry"));
            };
            if map.contains_key(&key) {
                return Err(BeaconError::parse(
                    line.number,
                    format!("duplicate key `{key}`"),
                ));
            }
            self.pos += 1;
            let value = if rest.is_empty() {
                self.nested(depth)?
            } else {
                scalar(rest, line.number)?
            };
            map.insert(key, value);
        }
        Ok(Value::Object(map))
    }
}

fn is_item(text: &str) -> bool {
    text == "-" || text.starts_with("- ")
}

/// Splits a `key: value` line. The returned value text is empty for a bare
/// `key:` line.
fn split_key(text: &str) -> Option<(String, &str)> {
    let (key, after) = if text.starts_with('"') {
        let mut stream = serde_json::Deserializer::from_str(text).into_iter::<String>();
        let key = stream.next()?.ok()?;
        (key, &text[stream.byte_offset()..])
    } else {
        let idx = text.find(':')?;
        if idx == 0 {
            return None;
        }
        (text[..idx].to_string(), &text[idx..])
    };
    let rest = after.strip_prefix(':')?;
    if rest.is_empty() {
        return Some((key, ""));
    }
    Some((key, rest.strip_prefix(' ')?.trim()))
}

fn scalar(text: &str, number: usize) -> Result<Value, BeaconError> {
    serde_json::from_str(text.trim())
        .map_err(|e| BeaconError::parse(number, format!("invalid scalar `{text}`: {e}")))
}
