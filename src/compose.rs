//!
//! Composer: a node-tree builder over the YAML event stream from
//! `saphyr_parser::Parser`.
//!
//! Responsibilities
//! - Turn the raw event stream into a position-preserving [`Node`] tree.
//! - Track source locations for every node.
//! - Record anchors by id and by name; leave aliases as alias nodes that
//!   carry a resolved handle (resolution stays an explicit step for
//!   consumers).
//! - Enforce alias replay limits (alias-bomb hardening).
//! - Apply the duplicate-key policy, emitting `duplicate-key` validation
//!   errors under the default policy.
//! - Recover presentation texture the event stream does not carry, by
//!   reading the retained source text at event spans: flow vs block
//!   container style, anchor and alias names, comments and blank lines,
//!   indentation and input format.
//!
//! Document boundaries
//! - Swagger documents are single-document; a second YAML document in the
//!   stream is a fatal error advising the caller.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use nohash_hasher::BuildNoHashHasher;
use saphyr_parser::{Event, Parser, ScalarStyle, Span, StrInput};

use crate::config::SerializeConfig;
use crate::error::Error;
use crate::location::{location_from_span, Location};
use crate::node::{Node, NodeKind, NodeKindField, NodeRef, Style};
use crate::options::{AliasLimits, DuplicateKeyPolicy, Options};
use crate::validation::{Rule, ValidationError};

/// Everything the composer learned about one input.
pub(crate) struct ComposeOutcome {
    /// The document node; its single child is the root mapping.
    pub root: NodeRef,
    /// Format / indentation detected from the source.
    pub config: SerializeConfig,
    /// Structural findings (duplicate keys) collected while composing.
    pub errors: Vec<ValidationError>,
}

/// Parse one document into a node tree.
///
/// Fatal errors (scan failures, alias bombs, multiple documents) are
/// returned out-of-band; duplicate-key findings land in the outcome.
pub(crate) fn parse_str(source: &str, options: &Options) -> Result<ComposeOutcome, Error> {
    let source = source.strip_prefix('\u{FEFF}').unwrap_or(source);
    let config = SerializeConfig::detect(source);

    let mut composer = Composer {
        source,
        parser: Parser::new_from_str(source),
        anchors_by_id: HashMap::default(),
        replayed_nodes: 0,
        limits: options.alias_limits,
        duplicate_keys: options.duplicate_keys,
        errors: Vec::new(),
        last_location: Location::UNKNOWN,
    };

    let content = composer.compose_document()?;
    let root = Node::document(content);
    if config.format == crate::config::DocFormat::Json {
        // JSON containers all parse as flow; recover the pretty-printed
        // layout by marking containers whose entries span lines as block.
        assign_json_styles(&root);
    }
    attach_texture(&root, source);

    Ok(ComposeOutcome {
        root,
        config,
        errors: composer.errors,
    })
}

struct Composer<'a> {
    source: &'a str,
    parser: Parser<'a, StrInput<'a>>,
    /// Anchor id → anchored node, for alias resolution.
    anchors_by_id: HashMap<usize, NodeRef, BuildNoHashHasher<usize>>,
    /// Total nodes materialized through aliases, against the limits.
    replayed_nodes: usize,
    limits: AliasLimits,
    duplicate_keys: DuplicateKeyPolicy,
    errors: Vec<ValidationError>,
    last_location: Location,
}

impl<'a> Composer<'a> {
    fn next_event(&mut self) -> Result<Option<(Event<'a>, Span)>, Error> {
        match self.parser.next() {
            Some(Ok((ev, span))) => {
                self.last_location = location_from_span(&span);
                Ok(Some((ev, span)))
            }
            Some(Err(e)) => Err(Error::from_scan_error(e)),
            None => Ok(None),
        }
    }

    /// Pump the stream markers and compose the single document's content.
    fn compose_document(&mut self) -> Result<Option<NodeRef>, Error> {
        let mut content: Option<NodeRef> = None;
        let mut seen_document = false;
        loop {
            let Some((ev, span)) = self.next_event()? else {
                return Ok(content);
            };
            match ev {
                Event::StreamStart | Event::Nothing => continue,
                Event::StreamEnd => return Ok(content),
                Event::DocumentStart(_) => {
                    if seen_document {
                        return Err(Error::msg(
                            "multiple YAML documents detected; a Swagger description is a single document",
                        )
                        .with_location(location_from_span(&span)));
                    }
                    seen_document = true;
                }
                Event::DocumentEnd => continue,
                other => {
                    if content.is_some() {
                        return Err(Error::msg(
                            "multiple YAML documents detected; a Swagger description is a single document",
                        )
                        .with_location(location_from_span(&span)));
                    }
                    content = Some(self.compose_value(other, span)?);
                }
            }
        }
    }

    /// Compose one value from its opening event.
    fn compose_value(&mut self, ev: Event<'a>, span: Span) -> Result<NodeRef, Error> {
        let location = location_from_span(&span);
        match ev {
            Event::Scalar(val, style, anchor_id, tag) => {
                let node = Rc::new(RefCell::new(Node {
                    kind: NodeKindField(NodeKind::Scalar),
                    tag: tag.map(|t| t.to_string()),
                    value: val.into_owned(),
                    style: scalar_style(style),
                    location,
                    ..Node::default()
                }));
                self.note_anchor(anchor_id, &node, &span);
                Ok(node)
            }
            Event::SequenceStart(anchor_id, tag) => {
                let node = Rc::new(RefCell::new(Node {
                    kind: NodeKindField(NodeKind::Sequence),
                    tag: tag.map(|t| t.to_string()),
                    style: self.container_style(&span),
                    location,
                    ..Node::default()
                }));
                self.note_anchor(anchor_id, &node, &span);
                loop {
                    let Some((ev, span)) = self.next_event()? else {
                        return Err(Error::eof().with_location(self.last_location));
                    };
                    match ev {
                        Event::SequenceEnd => break,
                        Event::Nothing => continue,
                        other => {
                            let child = self.compose_value(other, span)?;
                            node.borrow_mut().children.push(child);
                        }
                    }
                }
                Ok(node)
            }
            Event::MappingStart(anchor_id, tag) => {
                let node = Rc::new(RefCell::new(Node {
                    kind: NodeKindField(NodeKind::Mapping),
                    tag: tag.map(|t| t.to_string()),
                    style: self.container_style(&span),
                    location,
                    ..Node::default()
                }));
                self.note_anchor(anchor_id, &node, &span);
                loop {
                    let Some((ev, span)) = self.next_event()? else {
                        return Err(Error::eof().with_location(self.last_location));
                    };
                    match ev {
                        Event::MappingEnd => break,
                        Event::Nothing => continue,
                        other => {
                            let child = self.compose_value(other, span)?;
                            node.borrow_mut().children.push(child);
                        }
                    }
                }
                self.apply_duplicate_policy(&node);
                Ok(node)
            }
            Event::Alias(anchor_id) => {
                let target = self
                    .anchors_by_id
                    .get(&anchor_id)
                    .cloned()
                    .ok_or_else(|| Error::UnknownAnchor {
                        name: self.alias_name_at(&span).unwrap_or_else(|| anchor_id.to_string()),
                        location,
                    })?;
                self.observe_replay(&target, location)?;
                let name = self
                    .alias_name_at(&span)
                    .or_else(|| target.borrow().anchor.clone())
                    .unwrap_or_else(|| format!("a{anchor_id}"));
                Ok(Rc::new(RefCell::new(Node {
                    kind: NodeKindField(NodeKind::Alias),
                    alias_name: Some(name),
                    alias_target: Some(target),
                    location,
                    ..Node::default()
                })))
            }
            Event::StreamStart
            | Event::StreamEnd
            | Event::DocumentStart(_)
            | Event::DocumentEnd
            | Event::SequenceEnd
            | Event::MappingEnd
            | Event::Nothing => {
                Err(Error::msg("unexpected event in value position").with_location(location))
            }
        }
    }

    /// Record an anchored node under its id and recover the anchor name
    /// (`&name`) from the source just before the node.
    fn note_anchor(&mut self, anchor_id: usize, node: &NodeRef, span: &Span) {
        if anchor_id == 0 {
            return;
        }
        let name = self
            .anchor_name_before(span)
            .unwrap_or_else(|| format!("a{anchor_id}"));
        node.borrow_mut().anchor = Some(name);
        self.anchors_by_id.insert(anchor_id, node.clone());
    }

    /// Alias-bomb hardening: count the nodes an alias makes reachable and
    /// enforce the configured limits.
    fn observe_replay(&mut self, target: &NodeRef, location: Location) -> Result<(), Error> {
        let size = subtree_size(target, 0, self.limits.max_replay_depth).ok_or_else(|| {
            Error::AliasLimit {
                msg: format!(
                    "alias nesting deeper than {} levels",
                    self.limits.max_replay_depth
                ),
                location,
            }
        })?;
        self.replayed_nodes = self.replayed_nodes.saturating_add(size);
        if self.replayed_nodes > self.limits.max_total_replayed_nodes {
            return Err(Error::AliasLimit {
                msg: format!(
                    "alias replay limit exceeded: {} nodes > {}",
                    self.replayed_nodes, self.limits.max_total_replayed_nodes
                ),
                location,
            });
        }
        Ok(())
    }

    /// Flow (`{`/`[`) or block container style, read from the source byte
    /// the container opens at.
    fn container_style(&self, span: &Span) -> Style {
        match self.source.as_bytes().get(span.start.index()) {
            Some(b'{') | Some(b'[') => Style::Flow,
            _ => Style::Block,
        }
    }

    /// Scan backwards from a node for the `&name` that anchored it.
    fn anchor_name_before(&self, span: &Span) -> Option<String> {
        let head = &self.source.as_bytes()[..span.start.index().min(self.source.len())];
        let mut i = head.len();
        while i > 0 && (head[i - 1] as char).is_ascii_whitespace() {
            i -= 1;
        }
        let end = i;
        while i > 0 && is_anchor_char(head[i - 1]) {
            i -= 1;
        }
        if i > 0 && head[i - 1] == b'&' && end > i {
            Some(self.source[i..end].to_owned())
        } else {
            None
        }
    }

    /// Read the `*name` text an alias event points at.
    fn alias_name_at(&self, span: &Span) -> Option<String> {
        let rest = self.source.get(span.start.index()..)?;
        let rest = rest.strip_prefix('*')?;
        let end = rest
            .bytes()
            .position(|b| !is_anchor_char(b))
            .unwrap_or(rest.len());
        if end == 0 {
            None
        } else {
            Some(rest[..end].to_owned())
        }
    }

    /// Enforce the duplicate-key policy on a just-finished mapping.
    fn apply_duplicate_policy(&mut self, map: &NodeRef) {
        let keys: Vec<(usize, String, Location)> = {
            let m = map.borrow();
            m.children
                .chunks_exact(2)
                .enumerate()
                .filter_map(|(i, pair)| {
                    let key = crate::node::resolve_alias(Some(&pair[0]))?;
                    let key = key.borrow();
                    Some((i, key.value.clone(), key.location))
                })
                .collect()
        };
        let mut seen: ahash::AHashMap<String, usize> = ahash::AHashMap::new();
        let mut drop_pairs: Vec<usize> = Vec::new();
        for (idx, key, location) in keys {
            match seen.get(&key) {
                None => {
                    seen.insert(key, idx);
                }
                Some(&first) => match self.duplicate_keys {
                    DuplicateKeyPolicy::Error => {
                        self.errors.push(
                            ValidationError::new(
                                Rule::DuplicateKey,
                                format!("duplicate key `{key}` in mapping"),
                                None,
                            )
                            .at(location),
                        );
                        drop_pairs.push(idx);
                    }
                    DuplicateKeyPolicy::FirstWins => drop_pairs.push(idx),
                    DuplicateKeyPolicy::LastWins => {
                        drop_pairs.push(first);
                        seen.insert(key, idx);
                    }
                },
            }
        }
        if !drop_pairs.is_empty() {
            drop_pairs.sort_unstable();
            let mut m = map.borrow_mut();
            for idx in drop_pairs.into_iter().rev() {
                m.children.drain(idx * 2..idx * 2 + 2);
            }
        }
    }
}

fn scalar_style(style: ScalarStyle) -> Style {
    match style {
        ScalarStyle::SingleQuoted => Style::SingleQuoted,
        ScalarStyle::DoubleQuoted => Style::DoubleQuoted,
        ScalarStyle::Literal => Style::Literal,
        ScalarStyle::Folded => Style::Folded,
        _ => Style::Plain,
    }
}

fn is_anchor_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_')
}

/// Node count of a subtree, following alias links, or `None` when nesting
/// exceeds `max_depth`.
fn subtree_size(node: &NodeRef, depth: usize, max_depth: usize) -> Option<usize> {
    if depth > max_depth {
        return None;
    }
    let n = node.borrow();
    let mut total = 1usize;
    if let Some(target) = &n.alias_target {
        total = total.saturating_add(subtree_size(target, depth + 1, max_depth)?);
    }
    for child in &n.children {
        total = total.saturating_add(subtree_size(child, depth, max_depth)?);
    }
    Some(total)
}

/// Returns the last source line covered by the subtree.
fn assign_json_styles(node: &NodeRef) -> usize {
    let own_line = node.borrow().location.line as usize;
    let children: Vec<NodeRef> = node.borrow().children.clone();
    let mut last_line = own_line;
    for child in &children {
        last_line = last_line.max(assign_json_styles(child));
    }
    let mut n = node.borrow_mut();
    if matches!(*n.kind, NodeKind::Mapping | NodeKind::Sequence) {
        n.style = if last_line > own_line {
            Style::Block
        } else {
            Style::Flow
        };
    }
    last_line
}

// ---------------------------------------------------------------------------
// Texture: comments and blank lines, recovered from the source by span.
// ---------------------------------------------------------------------------

/// Attach comments and blank lines to the tree.
///
/// Lines that are blank or whole-line comments are preserved verbatim as the
/// head block of the first node that starts on the next content line; lines
/// after the last content become the document's foot block. A trailing `#`
/// comment on a content line attaches (verbatim, including the whitespace
/// before `#`) to the node whose text ends last on that line.
fn attach_texture(root: &NodeRef, source: &str) {
    // Byte intervals covered by scalar text; a '#' inside one is content.
    let mut scalar_spans: Vec<(usize, usize)> = Vec::new();
    // Line ranges covered by block scalars; their lines are never texture.
    let mut block_scalar_lines: Vec<(usize, usize)> = Vec::new();
    // Pre-order list of nodes plus the byte offset their rendering ends at.
    // Container events only span their opening token, so a container's
    // effective end is derived from its last descendant (+1 for the closing
    // bracket of flow containers).
    let mut nodes: Vec<(NodeRef, usize)> = Vec::new();
    collect_nodes(root, source, &mut nodes, &mut scalar_spans, &mut block_scalar_lines);
    scalar_spans.sort_unstable();

    // First pre-order node starting on each line, and the node ending last
    // within each line.
    let mut first_on_line: ahash::AHashMap<usize, NodeRef> = ahash::AHashMap::new();
    let mut last_ending_on_line: ahash::AHashMap<usize, (usize, NodeRef)> = ahash::AHashMap::new();
    let line_starts = line_start_offsets(source);
    for (node, end) in &nodes {
        let line = node.borrow().location.line as usize;
        if line == 0 {
            continue;
        }
        first_on_line.entry(line).or_insert_with(|| node.clone());
        let line_end = line_starts
            .get(line)
            .copied()
            .unwrap_or(source.len());
        if *end <= line_end {
            let slot = last_ending_on_line.entry(line).or_insert((*end, node.clone()));
            if *end >= slot.0 {
                *slot = (*end, node.clone());
            }
        }
    }

    let mut pending: Vec<String> = Vec::new();
    for (idx, raw_line) in source.split('\n').enumerate() {
        let line_no = idx + 1;
        let raw_line = raw_line.strip_suffix('\r').unwrap_or(raw_line);
        if block_scalar_lines
            .iter()
            .any(|&(from, to)| line_no > from && line_no <= to)
        {
            continue;
        }
        let line_offset = line_starts[idx];
        if is_texture_line(raw_line, line_offset, &scalar_spans) {
            pending.push(raw_line.to_owned());
            continue;
        }
        // Content line: hand any pending texture to the first node here.
        if !pending.is_empty() {
            if let Some(node) = first_on_line.get(&line_no) {
                node.borrow_mut().head_comments.append(&mut pending);
            }
        }
        // Trailing comment?
        if let Some(col) = trailing_comment_start(raw_line, line_offset, &scalar_spans) {
            if let Some((_, node)) = last_ending_on_line.get(&line_no) {
                node.borrow_mut().line_comment = Some(raw_line[col..].to_owned());
            }
        }
    }
    if !pending.is_empty() {
        // Trailing texture after the last content line.
        let meaningful = pending.iter().any(|l| !l.trim().is_empty());
        if meaningful {
            root.borrow_mut().foot_comments = pending;
        }
    }
}

/// Returns the byte offset the node's rendering ends at.
fn collect_nodes(
    node: &NodeRef,
    source: &str,
    out: &mut Vec<(NodeRef, usize)>,
    scalar_spans: &mut Vec<(usize, usize)>,
    block_scalar_lines: &mut Vec<(usize, usize)>,
) -> usize {
    let (own_end, is_flow, is_doc) = {
        let n = node.borrow();
        let from = n.location.span.offset;
        let to = from + n.location.span.len as usize;
        if n.is_scalar() {
            scalar_spans.push((from, to));
            if matches!(n.style, Style::Literal | Style::Folded) {
                let newlines = source
                    .get(from..to)
                    .map(|s| s.matches('\n').count())
                    .unwrap_or(0);
                let start_line = n.location.line as usize;
                block_scalar_lines.push((start_line, start_line + newlines + 1));
            }
        }
        (to, n.style == Style::Flow, *n.kind == NodeKind::Document)
    };
    let slot = if is_doc {
        None
    } else {
        out.push((node.clone(), own_end));
        Some(out.len() - 1)
    };
    let mut end = own_end;
    let children: Vec<NodeRef> = node.borrow().children.clone();
    for child in &children {
        end = end.max(collect_nodes(child, source, out, scalar_spans, block_scalar_lines));
    }
    if is_flow && !children.is_empty() {
        end += 1; // the closing bracket
    }
    if let Some(i) = slot {
        out[i].1 = end;
    }
    end
}

fn line_start_offsets(source: &str) -> Vec<usize> {
    let mut starts = vec![0usize];
    for (i, b) in source.bytes().enumerate() {
        if b == b'\n' {
            starts.push(i + 1);
        }
    }
    starts
}

fn inside_scalar(offset: usize, scalar_spans: &[(usize, usize)]) -> bool {
    // Spans are sorted by start and scalars never overlap, so only the
    // closest preceding span can cover the offset.
    let idx = scalar_spans.partition_point(|&(from, _)| from <= offset);
    idx > 0 && offset < scalar_spans[idx - 1].1
}

/// Blank line, or a line whose first non-whitespace byte opens a comment.
fn is_texture_line(line: &str, line_offset: usize, scalar_spans: &[(usize, usize)]) -> bool {
    let trimmed = line.trim_start();
    if trimmed.is_empty() {
        return true;
    }
    if !trimmed.starts_with('#') {
        return false;
    }
    let hash_offset = line_offset + (line.len() - trimmed.len());
    !inside_scalar(hash_offset, scalar_spans)
}

/// Byte column (within the line) where a trailing comment begins, including
/// the whitespace run before `#`.
fn trailing_comment_start(
    line: &str,
    line_offset: usize,
    scalar_spans: &[(usize, usize)],
) -> Option<usize> {
    let bytes = line.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'#'
            && i > 0
            && bytes[i - 1].is_ascii_whitespace()
            && !inside_scalar(line_offset + i, scalar_spans)
        {
            // Include the whitespace run before '#'.
            let mut start = i;
            while start > 0 && bytes[start - 1].is_ascii_whitespace() {
                start -= 1;
            }
            // A comment that begins the line is a head line, not trailing.
            if start == 0 {
                return None;
            }
            return Some(start);
        }
        i += 1;
    }
    None
}
