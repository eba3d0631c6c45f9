//! Single-pass writers from the node tree back to bytes.
//!
//! The YAML writer reproduces the texture the composer captured: key order,
//! scalar quoting, flow vs block containers, anchors and aliases, comments
//! and blank lines. When nothing in the tree was touched, the output equals
//! the input byte-for-byte (modulo the documented sanitize list: multi-line
//! flow containers collapse to one line, folded scalars re-fold, interior
//! spacing of flow containers normalizes).
//!
//! The JSON writer follows the same tree; comments cannot be represented
//! and are discarded, strings are always double-quoted, containers whose
//! source spanned several lines are emitted one entry per line at the
//! detected indent, single-line containers stay on one line.

use std::fmt::Write;

use crate::config::{DocFormat, SerializeConfig};
use crate::error::Error;
use crate::node::{document_content, Node, NodeKind, NodeRef, Style};
use crate::scalars::looks_like_number;

/// Serialize a node tree under the given configuration.
pub(crate) fn emit(root: &NodeRef, cfg: &SerializeConfig) -> Result<String, Error> {
    let mut out = String::new();
    match cfg.format {
        DocFormat::Yaml => emit_yaml(&mut out, root, cfg)?,
        DocFormat::Json => emit_json(&mut out, root, cfg)?,
    }
    Ok(out)
}

// ---------------------------------------------------------------------------
// YAML
// ---------------------------------------------------------------------------

fn emit_yaml(out: &mut String, root: &NodeRef, cfg: &SerializeConfig) -> Result<(), Error> {
    let content = document_content(root);
    match content {
        None => out.push_str("null\n"),
        Some(content) => {
            for line in &content.borrow().head_comments {
                out.push_str(line);
                out.push('\n');
            }
            let node = content.borrow();
            match *node.kind {
                NodeKind::Mapping if node.style != Style::Flow => {
                    drop(node);
                    emit_block_mapping(out, &content, 0, cfg)?;
                }
                NodeKind::Sequence if node.style != Style::Flow => {
                    drop(node);
                    emit_block_sequence(out, &content, 0, cfg)?;
                }
                _ => {
                    drop(node);
                    let mut line = String::new();
                    emit_inline(&mut line, &content)?;
                    out.push_str(&line);
                    push_line_comment(out, &content);
                    out.push('\n');
                }
            }
        }
    }
    for line in &root.borrow().foot_comments {
        out.push_str(line);
        out.push('\n');
    }
    if !cfg.trailing_newline {
        while out.ends_with('\n') {
            out.pop();
        }
    }
    Ok(())
}

fn indent_str(cfg: &SerializeConfig, depth: usize) -> String {
    // YAML indentation is always spaces; tabs only survive in JSON output.
    " ".repeat(cfg.indent_step * depth)
}

fn push_line_comment(out: &mut String, node: &NodeRef) {
    if let Some(comment) = &node.borrow().line_comment {
        out.push_str(comment);
    }
}

fn push_head_comments(out: &mut String, node: &NodeRef) {
    for line in &node.borrow().head_comments {
        out.push_str(line);
        out.push('\n');
    }
}

/// True when the node renders inline (scalar, alias, flow container, or an
/// empty container of any style).
fn renders_inline(node: &NodeRef) -> bool {
    let n = node.borrow();
    match *n.kind {
        NodeKind::Scalar | NodeKind::Alias => true,
        NodeKind::Mapping | NodeKind::Sequence => n.style == Style::Flow || n.children.is_empty(),
        NodeKind::Document => false,
    }
}

fn emit_block_mapping(
    out: &mut String,
    map: &NodeRef,
    depth: usize,
    cfg: &SerializeConfig,
) -> Result<(), Error> {
    let children: Vec<NodeRef> = map.borrow().children.clone();
    let indent = indent_str(cfg, depth);
    for pair in children.chunks_exact(2) {
        let (key, value) = (&pair[0], &pair[1]);
        push_head_comments(out, key);
        out.push_str(&indent);
        emit_inline(out, key)?;
        out.push(':');
        emit_block_entry_value(out, key, value, depth, cfg)?;
    }
    Ok(())
}

fn emit_block_sequence(
    out: &mut String,
    seq: &NodeRef,
    depth: usize,
    cfg: &SerializeConfig,
) -> Result<(), Error> {
    let children: Vec<NodeRef> = seq.borrow().children.clone();
    let indent = indent_str(cfg, depth);
    for item in &children {
        push_head_comments(out, item);
        out.push_str(&indent);
        out.push('-');
        let n = item.borrow();
        let is_block_container = matches!(*n.kind, NodeKind::Mapping | NodeKind::Sequence)
            && n.style != Style::Flow
            && !n.children.is_empty();
        drop(n);
        if is_block_container {
            // Compact form: the first entry shares the dash line.
            out.push(' ');
            emit_block_container_after_dash(out, item, depth + 1, cfg)?;
        } else {
            let mut rendered = String::new();
            emit_inline(&mut rendered, item)?;
            if !rendered.is_empty() {
                out.push(' ');
                out.push_str(&rendered);
            }
            push_line_comment(out, item);
            out.push('\n');
            emit_block_scalar_body(out, item, depth + 1, cfg)?;
        }
    }
    Ok(())
}

/// Emit a block mapping/sequence item that starts on the `- ` line itself
/// (the compact sequence-entry form every Swagger document in the wild uses).
fn emit_block_container_after_dash(
    out: &mut String,
    node: &NodeRef,
    depth: usize,
    cfg: &SerializeConfig,
) -> Result<(), Error> {
    if let Some(anchor) = &node.borrow().anchor {
        out.push('&');
        out.push_str(anchor);
        out.push('\n');
        let n = node.borrow();
        let is_map = *n.kind == NodeKind::Mapping;
        drop(n);
        return if is_map {
            emit_block_mapping(out, node, depth, cfg)
        } else {
            emit_block_sequence(out, node, depth, cfg)
        };
    }
    let children: Vec<NodeRef> = node.borrow().children.clone();
    let is_map = *node.borrow().kind == NodeKind::Mapping;
    if is_map {
        // First pair inline after the dash, the rest at the child indent.
        let indent = indent_str(cfg, depth);
        let mut first = true;
        for pair in children.chunks_exact(2) {
            let (key, value) = (&pair[0], &pair[1]);
            if first {
                first = false;
            } else {
                push_head_comments(out, key);
                out.push_str(&indent);
            }
            emit_inline(out, key)?;
            out.push(':');
            emit_block_entry_value(out, key, value, depth, cfg)?;
        }
        Ok(())
    } else {
        // A sequence directly under a dash keeps its own lines.
        out.push('\n');
        emit_block_sequence(out, node, depth, cfg)
    }
}

/// Emit the value part of a `key:` entry, including the entry's newline.
fn emit_block_entry_value(
    out: &mut String,
    key: &NodeRef,
    value: &NodeRef,
    depth: usize,
    cfg: &SerializeConfig,
) -> Result<(), Error> {
    if renders_inline(value) {
        let mut rendered = String::new();
        emit_inline(&mut rendered, value)?;
        if !rendered.is_empty() {
            out.push(' ');
            out.push_str(&rendered);
        }
        push_line_comment(out, value);
        push_line_comment(out, key);
        out.push('\n');
        emit_block_scalar_body(out, value, depth + 1, cfg)?;
    } else {
        if let Some(anchor) = &value.borrow().anchor {
            out.push_str(" &");
            out.push_str(anchor);
        }
        push_line_comment(out, key);
        out.push('\n');
        push_head_comments(out, value);
        let is_map = *value.borrow().kind == NodeKind::Mapping;
        if is_map {
            emit_block_mapping(out, value, depth + 1, cfg)?;
        } else {
            let seq_depth = sequence_value_depth(key, value, depth);
            emit_block_sequence(out, value, seq_depth, cfg)?;
        }
    }
    Ok(())
}

/// Whether a block sequence under `key:` sits at the parent indent (the
/// compact style) or one level deeper. Parsed sequences follow their
/// captured source columns; built sequences use the compact style.
fn sequence_value_depth(key: &NodeRef, seq: &NodeRef, depth: usize) -> usize {
    let key_col = key.borrow().location.column;
    if key_col == 0 {
        return depth;
    }
    let first = seq.borrow().children.first().cloned();
    if let Some(first) = first {
        let item_col = first.borrow().location.column;
        // The dash sits two columns before the item's own text.
        if item_col > 2 && item_col - 2 > key_col {
            return depth + 1;
        }
    }
    depth
}

/// For literal/folded scalars the header (`|`, `>`, chomping) was written
/// inline; this writes the indented body lines.
fn emit_block_scalar_body(
    out: &mut String,
    node: &NodeRef,
    depth: usize,
    cfg: &SerializeConfig,
) -> Result<(), Error> {
    let n = node.borrow();
    if !n.is_scalar() || !matches!(n.style, Style::Literal | Style::Folded) {
        return Ok(());
    }
    let indent = indent_str(cfg, depth);
    let body = n.value.trim_end_matches('\n');
    for line in body.split('\n') {
        if line.is_empty() {
            out.push('\n');
        } else {
            out.push_str(&indent);
            out.push_str(line);
            out.push('\n');
        }
    }
    Ok(())
}

/// Render a node that fits on the current line: scalars, aliases, flow
/// containers, empty containers.
fn emit_inline(out: &mut String, node: &NodeRef) -> Result<(), Error> {
    let n = node.borrow();
    if let Some(anchor) = &n.anchor {
        out.push('&');
        out.push_str(anchor);
        if !(n.is_scalar() && n.style == Style::Plain && n.value.is_empty()) {
            out.push(' ');
        }
    }
    match *n.kind {
        NodeKind::Alias => {
            out.push('*');
            out.push_str(n.alias_name.as_deref().unwrap_or("?"));
        }
        NodeKind::Scalar => emit_scalar_inline(out, &n)?,
        NodeKind::Mapping => {
            out.push('{');
            let mut first = true;
            for pair in n.children.chunks_exact(2) {
                if !first {
                    out.push_str(", ");
                }
                first = false;
                emit_inline(out, &pair[0])?;
                out.push_str(": ");
                emit_inline(out, &pair[1])?;
            }
            out.push('}');
        }
        NodeKind::Sequence => {
            out.push('[');
            let mut first = true;
            for item in &n.children {
                if !first {
                    out.push_str(", ");
                }
                first = false;
                emit_inline(out, item)?;
            }
            out.push(']');
        }
        NodeKind::Document => return Err(Error::msg("document node in inline position")),
    }
    Ok(())
}

fn emit_scalar_inline(out: &mut String, n: &Node) -> Result<(), Error> {
    match n.style {
        Style::Plain => {
            if is_plain_safe(&n.value) || n.value.is_empty() {
                out.push_str(&n.value);
            } else {
                // Content grew unsafe for plain style (a sync wrote it);
                // fall back to single quotes.
                write_single_quoted(out, &n.value);
            }
        }
        Style::SingleQuoted => write_single_quoted(out, &n.value),
        Style::DoubleQuoted => write_double_quoted(out, &n.value),
        Style::Literal => {
            out.push('|');
            push_chomping_indicator(out, &n.value);
        }
        Style::Folded => {
            out.push('>');
            push_chomping_indicator(out, &n.value);
        }
        Style::Flow | Style::Block => out.push_str(&n.value),
    }
    Ok(())
}

fn push_chomping_indicator(out: &mut String, value: &str) {
    if !value.ends_with('\n') {
        out.push('-');
    } else if value.ends_with("\n\n") {
        out.push('+');
    }
}

fn write_single_quoted(out: &mut String, s: &str) {
    out.push('\'');
    for ch in s.chars() {
        if ch == '\'' {
            out.push_str("''");
        } else {
            out.push(ch);
        }
    }
    out.push('\'');
}

fn write_double_quoted(out: &mut String, s: &str) {
    out.push('"');
    for ch in s.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c if (c as u32) < 0x20 => {
                let _ = write!(out, "\\u{:04x}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('"');
}

/// Returns true if `s` can be emitted as a plain scalar without quoting.
/// Heuristic shared with the quoting fallback above.
pub(crate) fn is_plain_safe(s: &str) -> bool {
    if s.is_empty() {
        return false;
    }
    let bytes = s.as_bytes();
    if bytes[0].is_ascii_whitespace()
        || s.ends_with(char::is_whitespace)
        || matches!(
            bytes[0],
            b'?' | b':'
                | b'['
                | b']'
                | b'{'
                | b'}'
                | b'#'
                | b'&'
                | b'*'
                | b'!'
                | b'|'
                | b'>'
                | b'\''
                | b'"'
                | b'%'
                | b'@'
                | b'`'
                | b','
        )
    {
        return false;
    }
    if bytes[0] == b'-' && s.len() > 1 && bytes[1] == b' ' {
        return false;
    }
    if s.chars().any(|c| c.is_control()) {
        return false;
    }
    if s.contains(": ") || s.ends_with(':') || s.contains(" #") {
        return false;
    }
    true
}

// ---------------------------------------------------------------------------
// JSON
// ---------------------------------------------------------------------------

fn emit_json(out: &mut String, root: &NodeRef, cfg: &SerializeConfig) -> Result<(), Error> {
    match document_content(root) {
        None => out.push_str("null"),
        Some(content) => emit_json_value(out, &content, 0, cfg)?,
    }
    if cfg.trailing_newline && !out.ends_with('\n') {
        out.push('\n');
    }
    Ok(())
}

fn json_indent(cfg: &SerializeConfig, depth: usize) -> String {
    std::iter::repeat(cfg.indent_char)
        .take(cfg.indent_step * depth)
        .collect()
}

fn emit_json_value(
    out: &mut String,
    node: &NodeRef,
    depth: usize,
    cfg: &SerializeConfig,
) -> Result<(), Error> {
    let node = crate::node::resolve_alias(Some(node))
        .ok_or_else(|| Error::nil_node("alias with no target during JSON emission"))?;
    let n = node.borrow();
    match *n.kind {
        NodeKind::Document => {
            return Err(Error::msg("document node in JSON value position"));
        }
        NodeKind::Alias => unreachable!("aliases resolved above"),
        NodeKind::Scalar => emit_json_scalar(out, &n),
        NodeKind::Mapping => {
            if n.children.is_empty() {
                out.push_str("{}");
            } else if n.style == Style::Flow {
                out.push('{');
                let mut first = true;
                for pair in n.children.chunks_exact(2) {
                    if !first {
                        out.push_str(", ");
                    }
                    first = false;
                    emit_json_key(out, &pair[0])?;
                    out.push_str(": ");
                    emit_json_value(out, &pair[1], depth, cfg)?;
                }
                out.push('}');
            } else {
                out.push_str("{\n");
                let inner = json_indent(cfg, depth + 1);
                let mut first = true;
                for pair in n.children.chunks_exact(2) {
                    if !first {
                        out.push_str(",\n");
                    }
                    first = false;
                    out.push_str(&inner);
                    emit_json_key(out, &pair[0])?;
                    out.push_str(": ");
                    emit_json_value(out, &pair[1], depth + 1, cfg)?;
                }
                out.push('\n');
                out.push_str(&json_indent(cfg, depth));
                out.push('}');
            }
        }
        NodeKind::Sequence => {
            if n.children.is_empty() {
                out.push_str("[]");
            } else if n.style == Style::Flow {
                out.push('[');
                let mut first = true;
                for item in &n.children {
                    if !first {
                        out.push_str(", ");
                    }
                    first = false;
                    emit_json_value(out, item, depth, cfg)?;
                }
                out.push(']');
            } else {
                out.push_str("[\n");
                let inner = json_indent(cfg, depth + 1);
                let mut first = true;
                for item in &n.children {
                    if !first {
                        out.push_str(",\n");
                    }
                    first = false;
                    out.push_str(&inner);
                    emit_json_value(out, item, depth + 1, cfg)?;
                }
                out.push('\n');
                out.push_str(&json_indent(cfg, depth));
                out.push(']');
            }
        }
    }
    Ok(())
}

fn emit_json_key(out: &mut String, key: &NodeRef) -> Result<(), Error> {
    let key = crate::node::resolve_alias(Some(key))
        .ok_or_else(|| Error::nil_node("alias key with no target during JSON emission"))?;
    let k = key.borrow();
    write_json_string(out, &k.value);
    Ok(())
}

fn emit_json_scalar(out: &mut String, n: &Node) {
    let quoted = matches!(n.style, Style::SingleQuoted | Style::DoubleQuoted)
        || n.tag.as_deref().map(crate::value::is_str_tag).unwrap_or(false);
    if quoted {
        write_json_string(out, &n.value);
        return;
    }
    match n.value.as_str() {
        "" | "~" | "null" => out.push_str("null"),
        "true" => out.push_str("true"),
        "false" => out.push_str("false"),
        v if looks_like_number(v) && json_number_ok(v) => out.push_str(v),
        v => write_json_string(out, v),
    }
}

/// JSON is stricter than YAML about numeric spellings; only pass through
/// text JSON itself would accept.
fn json_number_ok(s: &str) -> bool {
    let t = s.strip_prefix('-').unwrap_or(s);
    !t.starts_with('+') && !t.starts_with('.') && !t.ends_with('.') && !t.starts_with("0x")
}

fn write_json_string(out: &mut String, s: &str) {
    out.push('"');
    for ch in s.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c if (c as u32) < 0x20 => {
                let _ = write!(out, "\\u{:04x}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('"');
}
