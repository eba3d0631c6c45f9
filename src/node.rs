//!
//! The position-preserving node tree.
//!
//! Every model object keeps a handle to the node it was parsed from, which is
//! what makes precise error locations and byte-faithful re-emission possible.
//! A node carries:
//! - kind (document / mapping / sequence / scalar / alias),
//! - tag and scalar text,
//! - children (mapping children are alternating key/value pairs in
//!   insertion order),
//! - presentation style (flow/block for containers, quoting for scalars),
//! - anchor name and, for aliases, the referenced name plus a resolved
//!   handle,
//! - source location,
//! - comments (head lines above, trailing line comment, and for the
//!   document root the foot lines after the last content).
//!
//! Mapping invariant: `children.len()` is even; even indices are keys, odd
//! indices the corresponding values; key insertion order is the canonical
//! order for both iteration and serialization.

use std::cell::RefCell;
use std::rc::Rc;

use crate::location::Location;

/// Shared handle to a node. Documents are single-owner (spec'd as not
/// thread-safe), so `Rc<RefCell<…>>` carries the interior mutability that
/// sync-in-place needs without any locking.
pub type NodeRef = Rc<RefCell<Node>>;

/// What a node is.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeKind {
    /// The document wrapper; has exactly one child (or none when empty).
    Document,
    /// Key/value mapping.
    Mapping,
    /// Sequence of nodes.
    Sequence,
    /// Leaf text value.
    Scalar,
    /// Alias (`*name`) referring to an anchored node.
    Alias,
}

impl NodeKind {
    /// Human-readable kind name for diagnostics.
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Document => "document",
            NodeKind::Mapping => "mapping",
            NodeKind::Sequence => "sequence",
            NodeKind::Scalar => "scalar",
            NodeKind::Alias => "alias",
        }
    }
}

/// Presentation style, preserved from input to output.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Style {
    /// Unquoted scalar.
    #[default]
    Plain,
    /// `'single quoted'` scalar.
    SingleQuoted,
    /// `"double quoted"` scalar.
    DoubleQuoted,
    /// `|` block scalar.
    Literal,
    /// `>` block scalar.
    Folded,
    /// `{…}` / `[…]` container.
    Flow,
    /// Indented block container.
    Block,
}

/// A single node of the parsed document tree.
#[derive(Clone, Debug, Default)]
pub struct Node {
    pub kind: NodeKindField,
    /// Raw tag as written (`!!str`, `!custom`, …); `None` for untagged.
    pub tag: Option<String>,
    /// Scalar text (resolved escapes; empty for containers).
    pub value: String,
    /// Children; alternating key/value pairs for mappings.
    pub children: Vec<NodeRef>,
    pub style: Style,
    /// Anchor name when this node is anchored (`&name`).
    pub anchor: Option<String>,
    /// For alias nodes: the referenced anchor name.
    pub alias_name: Option<String>,
    /// For alias nodes: the anchored node, resolved at compose time.
    pub alias_target: Option<NodeRef>,
    pub location: Location,
    /// Full-line comments directly above this node (keys, for mapping
    /// entries), without the leading `#`.
    pub head_comments: Vec<String>,
    /// Trailing comment on the same line as this node, without the `#`.
    pub line_comment: Option<String>,
    /// Comment lines after the last content; only meaningful on the
    /// document node.
    pub foot_comments: Vec<String>,
}

/// Newtype so `Node::default()` has a defined kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NodeKindField(pub NodeKind);

impl Default for NodeKindField {
    fn default() -> Self {
        NodeKindField(NodeKind::Scalar)
    }
}

impl std::ops::Deref for NodeKindField {
    type Target = NodeKind;
    fn deref(&self) -> &NodeKind {
        &self.0
    }
}

impl Node {
    /// New scalar node with the given presentation style.
    pub fn scalar<S: Into<String>>(value: S, style: Style) -> NodeRef {
        Rc::new(RefCell::new(Node {
            kind: NodeKindField(NodeKind::Scalar),
            value: value.into(),
            style,
            ..Node::default()
        }))
    }

    /// New plain scalar node.
    pub fn plain<S: Into<String>>(value: S) -> NodeRef {
        Node::scalar(value, Style::Plain)
    }

    /// New empty mapping node (block by default, flow when requested).
    pub fn mapping(style: Style) -> NodeRef {
        Rc::new(RefCell::new(Node {
            kind: NodeKindField(NodeKind::Mapping),
            style,
            ..Node::default()
        }))
    }

    /// New empty sequence node.
    pub fn sequence(style: Style) -> NodeRef {
        Rc::new(RefCell::new(Node {
            kind: NodeKindField(NodeKind::Sequence),
            style,
            ..Node::default()
        }))
    }

    /// New document node wrapping `content`.
    pub fn document(content: Option<NodeRef>) -> NodeRef {
        Rc::new(RefCell::new(Node {
            kind: NodeKindField(NodeKind::Document),
            children: content.into_iter().collect(),
            style: Style::Block,
            ..Node::default()
        }))
    }

    #[inline]
    pub fn is_scalar(&self) -> bool {
        *self.kind == NodeKind::Scalar
    }

    #[inline]
    pub fn is_mapping(&self) -> bool {
        *self.kind == NodeKind::Mapping
    }

    #[inline]
    pub fn is_sequence(&self) -> bool {
        *self.kind == NodeKind::Sequence
    }

    /// True for the plain empty / `~` / `null` scalar forms.
    pub fn is_nullish(&self) -> bool {
        self.is_scalar()
            && self.style == Style::Plain
            && matches!(self.value.as_str(), "" | "~" | "null" | "Null" | "NULL")
    }
}

/// The content of a document node, if any.
pub fn document_content(doc: &NodeRef) -> Option<NodeRef> {
    let n = doc.borrow();
    if *n.kind == NodeKind::Document {
        n.children.first().cloned()
    } else {
        Some(doc.clone())
    }
}

/// Follow an alias link to the concrete node. Non-alias nodes return
/// themselves; `None` stays `None`.
pub fn resolve_alias(node: Option<&NodeRef>) -> Option<NodeRef> {
    let node = node?;
    let borrowed = node.borrow();
    if *borrowed.kind == NodeKind::Alias {
        borrowed.alias_target.clone()
    } else {
        Some(node.clone())
    }
}

/// Look up `key` in a mapping node; returns `(key_node, value_node)`.
///
/// Keys are matched on resolved scalar text; alias keys are followed first.
pub fn mapping_get(map: &NodeRef, key: &str) -> Option<(NodeRef, NodeRef)> {
    let m = map.borrow();
    if !m.is_mapping() {
        return None;
    }
    for pair in m.children.chunks_exact(2) {
        let key_node = resolve_alias(Some(&pair[0]))?;
        if key_node.borrow().value == key {
            return Some((pair[0].clone(), pair[1].clone()));
        }
    }
    None
}

/// The key-node for a given mapping child by key, used to locate error
/// positions. Returns `None` when the key is absent.
pub fn mapping_key_node(map: &NodeRef, key: &str) -> Option<NodeRef> {
    mapping_get(map, key).map(|(k, _)| k)
}

/// Append a `key: value` pair to a mapping, preserving insertion order.
pub fn mapping_push(map: &NodeRef, key_node: NodeRef, value_node: NodeRef) {
    let mut m = map.borrow_mut();
    debug_assert!(m.is_mapping());
    m.children.push(key_node);
    m.children.push(value_node);
}

/// Replace the value for `key` in place, or append the pair if absent.
/// Returns the key node actually used.
pub fn mapping_set(map: &NodeRef, key: &str, value_node: NodeRef) -> NodeRef {
    let existing = {
        let m = map.borrow();
        m.children
            .chunks_exact(2)
            .position(|pair| {
                resolve_alias(Some(&pair[0]))
                    .map(|k| k.borrow().value == key)
                    .unwrap_or(false)
            })
            .map(|i| (i * 2, m.children[i * 2].clone()))
    };
    match existing {
        Some((idx, key_node)) => {
            map.borrow_mut().children[idx + 1] = value_node;
            key_node
        }
        None => {
            let key_node = Node::plain(key);
            mapping_push(map, key_node.clone(), value_node);
            key_node
        }
    }
}

/// Delete the `key: value` pair from a mapping; true when something was
/// removed.
pub fn mapping_delete(map: &NodeRef, key: &str) -> bool {
    let idx = {
        let m = map.borrow();
        m.children.chunks_exact(2).position(|pair| {
            resolve_alias(Some(&pair[0]))
                .map(|k| k.borrow().value == key)
                .unwrap_or(false)
        })
    };
    if let Some(i) = idx {
        let mut m = map.borrow_mut();
        m.children.drain(i * 2..i * 2 + 2);
        true
    } else {
        false
    }
}

/// Mapping keys in insertion order (resolved scalar text).
pub fn mapping_keys(map: &NodeRef) -> Vec<String> {
    let m = map.borrow();
    if !m.is_mapping() {
        return Vec::new();
    }
    m.children
        .chunks_exact(2)
        .filter_map(|pair| resolve_alias(Some(&pair[0])))
        .map(|k| k.borrow().value.clone())
        .collect()
}

/// Deep structural equality: kind, tag, scalar text, and children, ignoring
/// styles, comments and source positions. Upgrade-purity and round-trip
/// tests compare documents with this.
pub fn structural_eq(a: &NodeRef, b: &NodeRef) -> bool {
    let (a, b) = (a.borrow(), b.borrow());
    if *a.kind != *b.kind || a.tag != b.tag || a.value != b.value {
        return false;
    }
    if a.children.len() != b.children.len() {
        return false;
    }
    a.children
        .iter()
        .zip(b.children.iter())
        .all(|(x, y)| structural_eq(x, y))
}

/// Deep copy of a node tree. Alias targets are re-resolved against the
/// copied anchors so the clone never shares structure with the source.
pub fn deep_clone(node: &NodeRef) -> NodeRef {
    let mut anchors: ahash::AHashMap<String, NodeRef> = ahash::AHashMap::new();
    deep_clone_inner(node, &mut anchors)
}

fn deep_clone_inner(node: &NodeRef, anchors: &mut ahash::AHashMap<String, NodeRef>) -> NodeRef {
    let src = node.borrow();
    let copy = Rc::new(RefCell::new(Node {
        kind: src.kind,
        tag: src.tag.clone(),
        value: src.value.clone(),
        children: Vec::with_capacity(src.children.len()),
        style: src.style,
        anchor: src.anchor.clone(),
        alias_name: src.alias_name.clone(),
        alias_target: None,
        location: src.location,
        head_comments: src.head_comments.clone(),
        line_comment: src.line_comment.clone(),
        foot_comments: src.foot_comments.clone(),
    }));
    if let Some(name) = &src.anchor {
        anchors.insert(name.clone(), copy.clone());
    }
    for child in &src.children {
        let cloned = deep_clone_inner(child, anchors);
        copy.borrow_mut().children.push(cloned);
    }
    if let Some(name) = &src.alias_name {
        let target = anchors.get(name).cloned();
        copy.borrow_mut().alias_target = target;
    }
    copy
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mapping_order_is_insertion_order() {
        let map = Node::mapping(Style::Block);
        mapping_push(&map, Node::plain("b"), Node::plain("1"));
        mapping_push(&map, Node::plain("a"), Node::plain("2"));
        assert_eq!(mapping_keys(&map), vec!["b", "a"]);
    }

    #[test]
    fn mapping_set_overwrites_in_place() {
        let map = Node::mapping(Style::Block);
        mapping_push(&map, Node::plain("a"), Node::plain("1"));
        mapping_push(&map, Node::plain("b"), Node::plain("2"));
        mapping_set(&map, "a", Node::plain("3"));
        assert_eq!(mapping_keys(&map), vec!["a", "b"]);
        let (_, v) = mapping_get(&map, "a").unwrap();
        assert_eq!(v.borrow().value, "3");
    }

    #[test]
    fn deep_clone_shares_nothing() {
        let map = Node::mapping(Style::Block);
        mapping_push(&map, Node::plain("a"), Node::plain("1"));
        let copy = deep_clone(&map);
        assert!(structural_eq(&map, &copy));
        mapping_set(&copy, "a", Node::plain("9"));
        let (_, original) = mapping_get(&map, "a").unwrap();
        assert_eq!(original.borrow().value, "1");
    }
}
