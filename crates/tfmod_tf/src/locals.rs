//! Extraction of output declarations from a module's `locals` block.
//!
//! A module advertises what it emits through
//! `locals { output_attributes = {...} output_interfaces = {...} }`.
//! Only HCL object/list/scalar literals need to be understood here;
//! references and function calls are kept as untyped values, which the
//! tree inference then reports as `any`.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Map, Number, Value};
use tracing::debug;

use tfmod_lookup::{infer_output_tree, LookupTree};

use crate::error::{TfError, TfResult};

pub const OUTPUT_ATTRIBUTES: &str = "output_attributes";
pub const OUTPUT_INTERFACES: &str = "output_interfaces";

/// File names checked for output declarations, in order.
const OUTPUT_FILES: [&str; 2] = ["outputs.tf", "output.tf"];

/// Build the lookup tree a module advertises from its `locals` blocks.
///
/// Missing one of the two declarations yields an empty section; missing
/// both is an error, since the module then declares no outputs at all.
pub fn output_lookup_tree(source: &str) -> TfResult<LookupTree> {
    let attributes = extract_local_value(source, OUTPUT_ATTRIBUTES)?;
    let interfaces = extract_local_value(source, OUTPUT_INTERFACES)?;

    if attributes.is_none() && interfaces.is_none() {
        return Err(TfError::LocalsNotFound(OUTPUT_ATTRIBUTES.to_string()));
    }

    let empty = || Value::Object(Map::new());
    Ok(LookupTree::new(
        infer_output_tree(&attributes.unwrap_or_else(empty)),
        infer_output_tree(&interfaces.unwrap_or_else(empty)),
    ))
}

/// Read the output declarations of the module at `module_dir`.
pub fn read_output_lookup_tree(module_dir: &Path) -> TfResult<LookupTree> {
    for name in OUTPUT_FILES {
        let path = module_dir.join(name);
        if path.is_file() {
            debug!("Reading output declarations from {:?}", path);
            let source = fs::read_to_string(&path)?;
            return output_lookup_tree(&source);
        }
    }
    Err(TfError::FileMissing(PathBuf::from(OUTPUT_FILES[0])))
}

/// Find `name` among the assignments of any `locals` block in `source`.
pub fn extract_local_value(source: &str, name: &str) -> TfResult<Option<Value>> {
    for body in locals_bodies(source)? {
        let pairs = Parser::new(body).parse_pairs()?;
        if let Some(value) = pairs.get(name) {
            return Ok(Some(value.clone()));
        }
    }
    Ok(None)
}

/// Body slices of every top-level `locals { ... }` block.
fn locals_bodies(source: &str) -> TfResult<Vec<&str>> {
    let mut bodies = Vec::new();
    let mut offset = 0;
    for line in source.split_inclusive('\n') {
        let trimmed = line.trim_start();
        if let Some(rest) = trimmed.strip_prefix("locals") {
            let after = rest.trim_start();
            if after.starts_with('{') {
                let brace = offset + (line.len() - trimmed.len()) + (trimmed.len() - after.len());
                let close = matching_brace(source, brace)
                    .ok_or_else(|| TfError::Parse("unterminated locals block".to_string()))?;
                bodies.push(&source[brace + 1..close]);
            }
        }
        offset += line.len();
    }
    Ok(bodies)
}

/// Byte index of the brace matching the one at `open`, skipping quoted
/// strings and comments.
fn matching_brace(source: &str, open: usize) -> Option<usize> {
    let bytes = source.as_bytes();
    let mut depth: i64 = 0;
    let mut index = open;
    while index < bytes.len() {
        match bytes[index] {
            b'"' => index = skip_string(bytes, index)?,
            b'#' => index = skip_line(bytes, index),
            b'/' if bytes.get(index + 1) == Some(&b'/') => index = skip_line(bytes, index),
            b'/' if bytes.get(index + 1) == Some(&b'*') => {
                index += 2;
                while index + 1 < bytes.len() && !(bytes[index] == b'*' && bytes[index + 1] == b'/')
                {
                    index += 1;
                }
                index += 1;
            }
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(index);
                }
            }
            _ => {}
        }
        index += 1;
    }
    None
}

fn skip_string(bytes: &[u8], open: usize) -> Option<usize> {
    let mut index = open + 1;
    while index < bytes.len() {
        match bytes[index] {
            b'\\' => index += 1,
            b'"' => return Some(index),
            _ => {}
        }
        index += 1;
    }
    None
}

fn skip_line(bytes: &[u8], start: usize) -> usize {
    let mut index = start;
    while index < bytes.len() && bytes[index] != b'\n' {
        index += 1;
    }
    index
}

/// Recursive-descent parser over the literal subset of HCL values.
struct Parser<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(src: &'a str) -> Self {
        Parser { src, pos: 0 }
    }

    /// Parse `key = value` pairs until the input is exhausted.
    fn parse_pairs(&mut self) -> TfResult<Map<String, Value>> {
        let mut pairs = Map::new();
        loop {
            self.skip_trivia();
            if self.at_end() {
                return Ok(pairs);
            }
            let key = self.parse_key()?;
            self.skip_trivia();
            if !(self.eat('=') || self.eat(':')) {
                return Err(TfError::Parse(format!(
                    "expected '=' after key '{key}'"
                )));
            }
            let value = self.parse_value()?;
            pairs.insert(key, value);
            self.skip_trivia();
            self.eat(',');
        }
    }

    fn parse_value(&mut self) -> TfResult<Value> {
        self.skip_trivia();
        match self.peek() {
            Some('{') => self.parse_object(),
            Some('[') => self.parse_array(),
            Some('"') => self.parse_string().map(Value::String),
            Some(_) => Ok(self.parse_scalar_expression()),
            None => Err(TfError::Parse("unexpected end of input".to_string())),
        }
    }

    fn parse_object(&mut self) -> TfResult<Value> {
        self.eat('{');
        let mut map = Map::new();
        loop {
            self.skip_trivia();
            if self.eat('}') {
                return Ok(Value::Object(map));
            }
            if self.at_end() {
                return Err(TfError::Parse("unterminated object literal".to_string()));
            }
            let key = self.parse_key()?;
            self.skip_trivia();
            if !(self.eat('=') || self.eat(':')) {
                return Err(TfError::Parse(format!(
                    "expected '=' after key '{key}'"
                )));
            }
            let value = self.parse_value()?;
            map.insert(key, value);
            self.skip_trivia();
            self.eat(',');
        }
    }

    fn parse_array(&mut self) -> TfResult<Value> {
        self.eat('[');
        let mut items = Vec::new();
        loop {
            self.skip_trivia();
            if self.eat(']') {
                return Ok(Value::Array(items));
            }
            if self.at_end() {
                return Err(TfError::Parse("unterminated list literal".to_string()));
            }
            items.push(self.parse_value()?);
            self.skip_trivia();
            self.eat(',');
        }
    }

    fn parse_key(&mut self) -> TfResult<String> {
        if self.peek() == Some('"') {
            return self.parse_string();
        }
        let start = self.pos;
        while self
            .peek()
            .map(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
            .unwrap_or(false)
        {
            self.pos += 1;
        }
        if self.pos == start {
            return Err(TfError::Parse(format!(
                "expected a key at offset {start}"
            )));
        }
        Ok(self.src[start..self.pos].to_string())
    }

    /// Parse a quoted string, keeping interpolations verbatim.
    fn parse_string(&mut self) -> TfResult<String> {
        self.eat('"');
        let mut out = String::new();
        let mut interpolation: i64 = 0;
        while let Some(ch) = self.peek() {
            self.pos += ch.len_utf8();
            match ch {
                '\\' => {
                    if let Some(escaped) = self.peek() {
                        self.pos += escaped.len_utf8();
                        out.push(match escaped {
                            'n' => '\n',
                            't' => '\t',
                            'r' => '\r',
                            other => other,
                        });
                    }
                }
                '$' if self.peek() == Some('{') => {
                    interpolation += 1;
                    self.pos += 1;
                    out.push_str("${");
                }
                '}' if interpolation > 0 => {
                    interpolation -= 1;
                    out.push('}');
                }
                '"' if interpolation == 0 => return Ok(out),
                other => out.push(other),
            }
        }
        Err(TfError::Parse("unterminated string".to_string()))
    }

    /// Consume a bare scalar or expression. Literal booleans, null and
    /// numbers keep their type; anything else (references, function calls)
    /// becomes an untyped value.
    fn parse_scalar_expression(&mut self) -> Value {
        let start = self.pos;
        let mut depth: i64 = 0;
        while let Some(ch) = self.peek() {
            match ch {
                '(' | '[' | '{' => depth += 1,
                ')' | ']' | '}' if depth > 0 => depth -= 1,
                ',' | '\n' | ']' | '}' | '#' if depth == 0 => break,
                '"' => {
                    if let Some(end) = skip_string(self.src.as_bytes(), self.pos) {
                        self.pos = end;
                    }
                }
                _ => {}
            }
            self.pos += ch.len_utf8();
        }

        let token = self.src[start..self.pos].trim();
        match token {
            "true" => Value::Bool(true),
            "false" => Value::Bool(false),
            "null" => Value::Null,
            _ => {
                if let Ok(integer) = token.parse::<i64>() {
                    Value::Number(Number::from(integer))
                } else if let Some(number) =
                    token.parse::<f64>().ok().and_then(Number::from_f64)
                {
                    Value::Number(number)
                } else {
                    Value::Null
                }
            }
        }
    }

    fn skip_trivia(&mut self) {
        loop {
            match self.peek() {
                Some(c) if c.is_whitespace() => self.pos += c.len_utf8(),
                Some('#') => self.skip_to_newline(),
                Some('/') if self.src[self.pos..].starts_with("//") => self.skip_to_newline(),
                Some('/') if self.src[self.pos..].starts_with("/*") => {
                    match self.src[self.pos + 2..].find("*/") {
                        Some(end) => self.pos += 2 + end + 2,
                        None => self.pos = self.src.len(),
                    }
                }
                _ => return,
            }
        }
    }

    fn skip_to_newline(&mut self) {
        match self.src[self.pos..].find('\n') {
            Some(offset) => self.pos += offset,
            None => self.pos = self.src.len(),
        }
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += expected.len_utf8();
            true
        } else {
            false
        }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.src.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const OUTPUTS_TF: &str = r#"
locals {
  output_attributes = {
    host     = aws_db_instance.main.address
    port     = 5432
    replicas = ["a", "b"]
    tls = {
      enabled = true
    }
  }
  output_interfaces = {}
}
"#;

    #[test]
    fn test_extract_literal_values() {
        let value = extract_local_value(OUTPUTS_TF, OUTPUT_ATTRIBUTES)
            .unwrap()
            .unwrap();
        assert_eq!(value["port"], json!(5432));
        assert_eq!(value["replicas"], json!(["a", "b"]));
        assert_eq!(value["tls"]["enabled"], json!(true));
        // a resource reference has no literal type
        assert_eq!(value["host"], Value::Null);
    }

    #[test]
    fn test_output_lookup_tree_inference() {
        let tree = output_lookup_tree(OUTPUTS_TF).unwrap();
        assert_eq!(tree.out.attributes["port"], json!({"type": "number"}));
        assert_eq!(tree.out.attributes["host"], json!({"type": "any"}));
        assert_eq!(
            tree.out.attributes["replicas"],
            json!({"type": "array", "items": {"type": "string"}})
        );
        assert_eq!(tree.out.interfaces, json!({}));
    }

    #[test]
    fn test_missing_declarations_is_an_error() {
        let source = "locals {\n  name = \"db\"\n}\n";
        assert!(matches!(
            output_lookup_tree(source),
            Err(TfError::LocalsNotFound(_))
        ));
    }

    #[test]
    fn test_comments_and_function_calls_are_tolerated() {
        let source = r#"
locals {
  # exported values
  output_attributes = {
    name   = join("-", [var.a, var.b]) // computed
    labels = merge(var.tags, { app = "db" })
  }
}
"#;
        let value = extract_local_value(source, OUTPUT_ATTRIBUTES)
            .unwrap()
            .unwrap();
        assert_eq!(value["name"], Value::Null);
        assert_eq!(value["labels"], Value::Null);
    }

    #[test]
    fn test_interpolated_strings_stay_strings() {
        let source = r#"
locals {
  output_attributes = {
    endpoint = "https://${var.host}:8443"
  }
}
"#;
        let value = extract_local_value(source, OUTPUT_ATTRIBUTES)
            .unwrap()
            .unwrap();
        assert_eq!(value["endpoint"], json!("https://${var.host}:8443"));
    }

    #[test]
    fn test_unterminated_locals_block_is_reported() {
        let source = "locals {\n  output_attributes = {\n";
        assert!(matches!(
            extract_local_value(source, OUTPUT_ATTRIBUTES),
            Err(TfError::Parse(_))
        ));
    }
}
