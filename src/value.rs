//! Arbitrary YAML/JSON values for `default`, `enum`, `example` and friends.
//!
//! Modeled as a tagged sum over the JSON data model, not coerced to any
//! narrower type, and keeping a handle to the source node so positions and
//! presentation survive a round trip.

use crate::node::{resolve_alias, Node, NodeKind, NodeRef, Style};
use crate::scalars;
use crate::seqmap::SequencedMap;

/// One arbitrary value.
#[derive(Clone, Debug, Default)]
pub struct Value {
    pub kind: ValueKind,
    /// The node this value was parsed from; `None` for built values.
    node: Option<NodeRef>,
}

#[derive(Clone, Debug, Default)]
pub enum ValueKind {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Seq(Vec<Value>),
    Map(SequencedMap<String, Value>),
}

impl Value {
    pub fn null() -> Self {
        Value::default()
    }

    pub fn str<S: Into<String>>(s: S) -> Self {
        Value {
            kind: ValueKind::Str(s.into()),
            node: None,
        }
    }

    pub fn bool(b: bool) -> Self {
        Value {
            kind: ValueKind::Bool(b),
            node: None,
        }
    }

    pub fn int(i: i64) -> Self {
        Value {
            kind: ValueKind::Int(i),
            node: None,
        }
    }

    /// The source node, when this value came from a document.
    pub fn node(&self) -> Option<&NodeRef> {
        self.node.as_ref()
    }

    pub fn as_str(&self) -> Option<&str> {
        match &self.kind {
            ValueKind::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self.kind {
            ValueKind::Bool(b) => Some(b),
            _ => None,
        }
    }

    /// Diagnostic name of the variant.
    pub fn kind_name(&self) -> &'static str {
        match self.kind {
            ValueKind::Null => "null",
            ValueKind::Bool(_) => "bool",
            ValueKind::Int(_) => "int",
            ValueKind::Float(_) => "float",
            ValueKind::Str(_) => "string",
            ValueKind::Seq(_) => "sequence",
            ValueKind::Map(_) => "mapping",
        }
    }

    /// Read a value out of a node. Quoting or an explicit `!!str` tag pins
    /// the string interpretation; plain scalars resolve through the YAML
    /// 1.2 core schema.
    pub(crate) fn from_node(node: &NodeRef) -> Value {
        let Some(node) = resolve_alias(Some(node)) else {
            return Value::null();
        };
        let n = node.borrow();
        let kind = match *n.kind {
            NodeKind::Mapping => {
                let mut map = SequencedMap::new();
                for pair in n.children.chunks_exact(2) {
                    if let Some(key) = resolve_alias(Some(&pair[0])) {
                        map.set(key.borrow().value.clone(), Value::from_node(&pair[1]));
                    }
                }
                ValueKind::Map(map)
            }
            NodeKind::Sequence => ValueKind::Seq(n.children.iter().map(Value::from_node).collect()),
            NodeKind::Document | NodeKind::Alias | NodeKind::Scalar => {
                scalar_kind(&n.value, n.style, n.tag.as_deref())
            }
        };
        drop(n);
        Value {
            kind,
            node: Some(node),
        }
    }

    /// Build a fresh node rendering this value. Presentation of parsed
    /// values comes from their retained node; built values pick the
    /// conventional styles (double-quoted strings stay plain when safe).
    pub(crate) fn to_node(&self) -> NodeRef {
        if let Some(node) = &self.node {
            return crate::node::deep_clone(node);
        }
        match &self.kind {
            ValueKind::Null => Node::plain("null"),
            ValueKind::Bool(b) => Node::plain(if *b { "true" } else { "false" }),
            ValueKind::Int(i) => Node::plain(i.to_string()),
            ValueKind::Float(f) => Node::plain(scalars::format_float(*f)),
            ValueKind::Str(s) => {
                if scalars::looks_like_number(s) || crate::emit::is_plain_safe(s) {
                    // Numeric-looking strings must keep quotes to stay strings.
                    if scalars::looks_like_number(s)
                        || scalars::parse_yaml12_bool(s).is_ok()
                        || s == "null"
                    {
                        Node::scalar(s.clone(), Style::DoubleQuoted)
                    } else {
                        Node::plain(s.clone())
                    }
                } else {
                    Node::scalar(s.clone(), Style::DoubleQuoted)
                }
            }
            ValueKind::Seq(items) => {
                let seq = Node::sequence(Style::Block);
                for item in items {
                    seq.borrow_mut().children.push(item.to_node());
                }
                seq
            }
            ValueKind::Map(map) => {
                let out = Node::mapping(Style::Block);
                for (k, v) in map.iter() {
                    crate::node::mapping_push(&out, Node::plain(k.clone()), v.to_node());
                }
                out
            }
        }
    }
}

fn scalar_kind(text: &str, style: Style, tag: Option<&str>) -> ValueKind {
    if matches!(style, Style::SingleQuoted | Style::DoubleQuoted | Style::Literal | Style::Folded)
        || tag.map(is_str_tag).unwrap_or(false)
    {
        return ValueKind::Str(text.to_owned());
    }
    match text {
        "" | "~" | "null" | "Null" | "NULL" => return ValueKind::Null,
        _ => {}
    }
    if let Ok(b) = scalars::parse_yaml12_bool(text) {
        return ValueKind::Bool(b);
    }
    if let Ok(i) = scalars::parse_yaml12_int(text) {
        return ValueKind::Int(i);
    }
    if text.contains(['.', 'e', 'E']) || text.contains("inf") || text.contains("nan") {
        if let Ok(f) = scalars::parse_yaml12_float(text) {
            return ValueKind::Float(f);
        }
    }
    ValueKind::Str(text.to_owned())
}

/// Both spellings of the core-schema string tag.
pub(crate) fn is_str_tag(tag: &str) -> bool {
    matches!(tag, "!!str" | "tag:yaml.org,2002:str")
}

/// Structural equality ignoring source nodes.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (&self.kind, &other.kind) {
            (ValueKind::Null, ValueKind::Null) => true,
            (ValueKind::Bool(a), ValueKind::Bool(b)) => a == b,
            (ValueKind::Int(a), ValueKind::Int(b)) => a == b,
            (ValueKind::Float(a), ValueKind::Float(b)) => a == b || (a.is_nan() && b.is_nan()),
            (ValueKind::Str(a), ValueKind::Str(b)) => a == b,
            (ValueKind::Seq(a), ValueKind::Seq(b)) => a == b,
            (ValueKind::Map(a), ValueKind::Map(b)) => {
                a.len() == b.len()
                    && a.iter().zip(b.iter()).all(|((ka, va), (kb, vb))| ka == kb && va == vb)
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quoted_numbers_stay_strings() {
        let node = Node::scalar("2.0", Style::DoubleQuoted);
        let v = Value::from_node(&node);
        assert_eq!(v.as_str(), Some("2.0"));
    }

    #[test]
    fn plain_scalars_resolve_core_schema() {
        assert_eq!(Value::from_node(&Node::plain("42")).kind_name(), "int");
        assert_eq!(Value::from_node(&Node::plain("true")).kind_name(), "bool");
        assert_eq!(Value::from_node(&Node::plain("~")).kind_name(), "null");
        assert_eq!(Value::from_node(&Node::plain("1.5")).kind_name(), "float");
        assert_eq!(Value::from_node(&Node::plain("petstore")).kind_name(), "string");
    }

    #[test]
    fn built_string_value_quotes_ambiguous_text() {
        let built = Value::str("2.0").to_node();
        assert_eq!(built.borrow().style, Style::DoubleQuoted);
        let plain = Value::str("binary").to_node();
        assert_eq!(plain.borrow().style, Style::Plain);
    }
}
