//! Span-based patching of `variable` blocks in Terraform source.
//!
//! Patching is line oriented: a block is located as a concrete span of
//! lines, the span's inner body is re-synthesized from a flat map of
//! dotted keys to type expressions, and every line outside the span passes
//! through byte for byte. Nothing else of the Terraform grammar is
//! interpreted.

use std::collections::BTreeMap;

use tfmod_manifest::SchemaNode;

use crate::error::{TfError, TfResult};

/// A brace-delimited block as a span of line indices.
///
/// `open` carries the opening brace, `close` is the line on which the
/// block's brace depth returns to zero. The two may coincide for
/// single-line blocks such as `spec = object({})`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockSpan {
    pub open: usize,
    pub close: usize,
}

/// Find the span of `variable "<name>"` in `lines`.
pub fn locate_variable_block(lines: &[&str], name: &str) -> TfResult<BlockSpan> {
    let header = format!("variable \"{name}\"");
    let open = lines
        .iter()
        .position(|line| line.trim_start().starts_with(&header))
        .ok_or_else(|| TfError::VariableNotFound(name.to_string()))?;
    let close = close_of(lines, open)?;
    Ok(BlockSpan { open, close })
}

/// Find the `<keyword> = object({ ... })` sub-block inside a variable span.
pub fn locate_object_body(
    lines: &[&str],
    variable: BlockSpan,
    variable_name: &str,
    keyword: &str,
) -> TfResult<BlockSpan> {
    for index in variable.open + 1..=variable.close {
        let trimmed = lines[index].trim_start();
        let assigned = trimmed
            .strip_prefix(keyword)
            .map(|rest| rest.trim_start().starts_with('='))
            .unwrap_or(false);
        if assigned {
            let close = close_of(lines, index)?;
            return Ok(BlockSpan { open: index, close });
        }
    }
    Err(TfError::BlockNotFound {
        variable: variable_name.to_string(),
        keyword: keyword.to_string(),
    })
}

/// Replace the object body of `<keyword>` inside `variable "<name>"`.
///
/// `entries` maps dotted keys to Terraform type expressions; dotted keys
/// become nested `object({...})` levels. A missing variable block is a hard
/// error; a missing `<keyword>` sub-block is appended inside the variable,
/// covering the first declaration of the very first variable.
pub fn replace_variable_block_body(
    source: &str,
    variable_name: &str,
    keyword: &str,
    entries: &BTreeMap<String, String>,
) -> TfResult<String> {
    let lines: Vec<&str> = source.split('\n').collect();
    let variable = locate_variable_block(&lines, variable_name)?;

    let mut updated: Vec<String> = Vec::with_capacity(lines.len());

    match locate_object_body(&lines, variable, variable_name, keyword) {
        Ok(body) => {
            let indent = leading_whitespace(lines[body.open]);
            copy_lines(&lines[..body.open], &mut updated);
            updated.push(format!("{indent}{keyword} = object({{"));
            render_entries(entries, &format!("{indent}  "), &mut updated);
            updated.push(format!("{indent}}})"));
            copy_lines(&lines[body.close + 1..], &mut updated);
        }
        Err(TfError::BlockNotFound { .. }) => {
            let indent = format!("{}  ", leading_whitespace(lines[variable.open]));
            copy_lines(&lines[..variable.close], &mut updated);
            updated.push(format!("{indent}{keyword} = object({{"));
            render_entries(entries, &format!("{indent}  "), &mut updated);
            updated.push(format!("{indent}}})"));
            copy_lines(&lines[variable.close..], &mut updated);
        }
        Err(other) => return Err(other),
    }

    Ok(updated.join("\n"))
}

/// Replace the whole `variable "<name>"` block with `new_block`, or append
/// the block at the end of the file when no such variable exists yet.
pub fn replace_or_append_variable_block(
    source: &str,
    variable_name: &str,
    new_block: &str,
) -> TfResult<String> {
    let lines: Vec<&str> = source.split('\n').collect();
    let block_lines: Vec<&str> = new_block.trim_end().split('\n').collect();

    let mut updated: Vec<String> = Vec::with_capacity(lines.len() + block_lines.len());

    match locate_variable_block(&lines, variable_name) {
        Ok(variable) => {
            copy_lines(&lines[..variable.open], &mut updated);
            copy_lines(&block_lines, &mut updated);
            copy_lines(&lines[variable.close + 1..], &mut updated);
        }
        Err(TfError::VariableNotFound(_)) => {
            copy_lines(&lines, &mut updated);
            while updated.last().is_some_and(|line| line.is_empty()) {
                updated.pop();
            }
            updated.push(String::new());
            copy_lines(&block_lines, &mut updated);
            updated.push(String::new());
        }
        Err(other) => return Err(other),
    }

    Ok(updated.join("\n"))
}

/// Project a spec tree onto the flat dotted-key map the patcher consumes.
///
/// Fixed objects contribute one entry per leaf path; a dynamic object
/// collapses its whole subtree to `any` at the wildcard's position, since
/// its keys are unknown until runtime.
pub fn spec_type_entries(spec: &SchemaNode) -> BTreeMap<String, String> {
    let mut entries = BTreeMap::new();
    collect_entries(spec, String::new(), &mut entries);
    entries
}

fn collect_entries(node: &SchemaNode, prefix: String, entries: &mut BTreeMap<String, String>) {
    match node {
        SchemaNode::FixedObject(object) => {
            if object.properties.is_empty() {
                if !prefix.is_empty() {
                    entries.insert(prefix, "object({})".to_string());
                }
                return;
            }
            for (name, child) in &object.properties {
                let path = if prefix.is_empty() {
                    name.clone()
                } else {
                    format!("{prefix}.{name}")
                };
                collect_entries(child, path, entries);
            }
        }
        SchemaNode::DynamicObject(_) => {
            if !prefix.is_empty() {
                entries.insert(prefix, "any".to_string());
            }
        }
        SchemaNode::Leaf(leaf) => {
            if !prefix.is_empty() {
                let expression = leaf
                    .base_type
                    .map(|t| t.terraform_type().to_string())
                    .unwrap_or_else(|| "any".to_string());
                entries.insert(prefix, expression);
            }
        }
    }
}

/// One level of the re-synthesized body: either a final type expression or
/// a nested object level introduced by a dotted key.
enum EntryNode {
    Leaf(String),
    Object(BTreeMap<String, EntryNode>),
}

fn insert_nested(map: &mut BTreeMap<String, EntryNode>, segments: &[&str], expression: &str) {
    match segments {
        [] => {}
        [last] => {
            map.insert(last.to_string(), EntryNode::Leaf(expression.to_string()));
        }
        [head, rest @ ..] => {
            let child = map
                .entry(head.to_string())
                .or_insert_with(|| EntryNode::Object(BTreeMap::new()));
            // a scalar on an intermediate path loses to the deeper entry
            if let EntryNode::Leaf(_) = child {
                *child = EntryNode::Object(BTreeMap::new());
            }
            if let EntryNode::Object(inner) = child {
                insert_nested(inner, rest, expression);
            }
        }
    }
}

fn render_entries(entries: &BTreeMap<String, String>, indent: &str, out: &mut Vec<String>) {
    let mut root = BTreeMap::new();
    for (dotted, expression) in entries {
        let segments: Vec<&str> = dotted.split('.').collect();
        insert_nested(&mut root, &segments, expression);
    }
    render_nodes(&root, indent, out);
}

fn render_nodes(nodes: &BTreeMap<String, EntryNode>, indent: &str, out: &mut Vec<String>) {
    for (name, node) in nodes {
        match node {
            EntryNode::Leaf(expression) => out.push(format!("{indent}{name} = {expression}")),
            EntryNode::Object(children) => {
                out.push(format!("{indent}{name} = object({{"));
                render_nodes(children, &format!("{indent}  "), out);
                out.push(format!("{indent}}})"));
            }
        }
    }
}

fn copy_lines(lines: &[&str], out: &mut Vec<String>) {
    out.extend(lines.iter().map(|line| line.to_string()));
}

fn leading_whitespace(line: &str) -> &str {
    &line[..line.len() - line.trim_start().len()]
}

/// Line on which the block opened at `open` closes, counting braces
/// outside quoted strings.
fn close_of(lines: &[&str], open: usize) -> TfResult<usize> {
    let mut depth: i64 = 0;
    let mut opened = false;
    for (index, line) in lines.iter().enumerate().skip(open) {
        for event in brace_events(line) {
            depth += event;
            if depth > 0 {
                opened = true;
            }
            if opened && depth == 0 {
                return Ok(index);
            }
        }
    }
    Err(TfError::UnbalancedBlock(open + 1))
}

fn brace_events(line: &str) -> Vec<i64> {
    let mut events = Vec::new();
    let mut in_string = false;
    let mut escaped = false;
    for ch in line.chars() {
        if escaped {
            escaped = false;
            continue;
        }
        match ch {
            '\\' if in_string => escaped = true,
            '"' => in_string = !in_string,
            '{' if !in_string => events.push(1),
            '}' if !in_string => events.push(-1),
            _ => {}
        }
    }
    events
}
