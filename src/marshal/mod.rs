//!
//! The marshalling engine.
//!
//! Core structs declare their wire shape through [`core_object!`]
//! (`src/marshal/macros.rs`), which expands each field's key / required /
//! model tags into a [`CoreValue`] implementation: unmarshal a node into the
//! typed struct, collect every content problem as a validation error while
//! still populating best-effort, and build nodes back for marshalling. The
//! polymorphic holders ([`Either`], [`Reference`]) and the extensions
//! collection live in their own submodules.
//!
//! Fatal errors (nil nodes where structure requires one, factory misses,
//! unreadable input) travel out-of-band as `Err`; user-content mismatches
//! land in the context's error slice, exactly one of the two — never both.

use std::any::Any;

use crate::config::SerializeConfig;
use crate::error::Error;
use crate::node::{resolve_alias, Node, NodeRef, Style};
use crate::registry;
use crate::scalars;
use crate::seqmap::SequencedMap;
use crate::validation::{Rule, ValidationError};
use crate::value::Value;

pub mod either;
pub mod extensions;
pub mod field;
#[macro_use]
pub mod macros;
pub mod reference;

pub use either::Either;
pub use extensions::Extensions;
pub use field::{CoreMeta, NodeField};
pub use reference::Reference;

/// State threaded through one unmarshal pass.
pub struct UnmarshalCtx<'a> {
    /// Accumulated content errors for the whole document.
    pub errors: &'a mut Vec<ValidationError>,
    /// Serialization configuration captured from the source.
    pub config: SerializeConfig,
}

/// Result of unmarshalling one value: the (best-effort) value plus whether
/// its shape matched cleanly.
pub struct Unmarshaled<T> {
    pub value: T,
    pub ok: bool,
}

impl<T> Unmarshaled<T> {
    pub(crate) fn clean(value: T) -> Self {
        Self { value, ok: true }
    }

    pub(crate) fn dirty(value: T) -> Self {
        Self { value, ok: false }
    }
}

/// A value that can be read from and written to the node tree.
///
/// `label` is the dotted path used in error messages (`info.title`,
/// `parameter.type`, …).
pub trait CoreValue: Sized + Any {
    fn unmarshal(
        node: &NodeRef,
        label: &str,
        ctx: &mut UnmarshalCtx,
    ) -> Result<Unmarshaled<Self>, Error>;

    /// Build a fresh node rendering this value.
    fn build_node(&self) -> Result<NodeRef, Error>;

    /// Materialize via the factory registry, then populate. Mirrors the
    /// factory-then-fill flow generic containers use.
    fn unmarshal_into(
        &mut self,
        node: &NodeRef,
        label: &str,
        ctx: &mut UnmarshalCtx,
    ) -> Result<bool, Error> {
        let um = Self::unmarshal(node, label, ctx)?;
        *self = um.value;
        Ok(um.ok)
    }
}

/// Record a type mismatch against `node` and return the zero value.
pub(crate) fn type_mismatch<T: Default>(
    label: &str,
    expected: &str,
    node: &NodeRef,
    ctx: &mut UnmarshalCtx,
) -> Unmarshaled<T> {
    let got = node.borrow().kind.as_str();
    ctx.errors.push(ValidationError::new(
        Rule::TypeMismatch,
        format!("{label} expected {expected}, got {got}"),
        Some(node),
    ));
    Unmarshaled::dirty(T::default())
}

/// Resolve aliases and hand back the concrete node, or record a mismatch.
pub(crate) fn concrete(
    node: &NodeRef,
    label: &str,
    ctx: &mut UnmarshalCtx,
) -> Result<Option<NodeRef>, Error> {
    match resolve_alias(Some(node)) {
        Some(n) => Ok(Some(n)),
        None => {
            ctx.errors.push(ValidationError::new(
                Rule::InvalidSyntax,
                format!("{label} alias does not resolve"),
                Some(node),
            ));
            Ok(None)
        }
    }
}

// ---------------------------------------------------------------------------
// Scalar implementations
// ---------------------------------------------------------------------------

impl CoreValue for String {
    fn unmarshal(
        node: &NodeRef,
        label: &str,
        ctx: &mut UnmarshalCtx,
    ) -> Result<Unmarshaled<Self>, Error> {
        let Some(node) = concrete(node, label, ctx)? else {
            return Ok(Unmarshaled::dirty(String::new()));
        };
        let n = node.borrow();
        if !n.is_scalar() {
            drop(n);
            return Ok(type_mismatch(label, "string", &node, ctx));
        }
        Ok(Unmarshaled::clean(n.value.clone()))
    }

    fn build_node(&self) -> Result<NodeRef, Error> {
        // Quote text a plain scalar would re-type (numbers, booleans, null).
        let needs_quotes = self.is_empty()
            || scalars::looks_like_number(self)
            || scalars::parse_yaml12_bool(self).is_ok()
            || matches!(self.as_str(), "null" | "~")
            || !crate::emit::is_plain_safe(self);
        Ok(if needs_quotes {
            Node::scalar(self.clone(), Style::DoubleQuoted)
        } else {
            Node::plain(self.clone())
        })
    }
}

impl CoreValue for bool {
    fn unmarshal(
        node: &NodeRef,
        label: &str,
        ctx: &mut UnmarshalCtx,
    ) -> Result<Unmarshaled<Self>, Error> {
        let Some(node) = concrete(node, label, ctx)? else {
            return Ok(Unmarshaled::dirty(false));
        };
        let n = node.borrow();
        if !n.is_scalar() {
            drop(n);
            return Ok(type_mismatch(label, "boolean", &node, ctx));
        }
        match scalars::parse_yaml12_bool(&n.value) {
            Ok(b) => Ok(Unmarshaled::clean(b)),
            Err(_) => {
                drop(n);
                Ok(type_mismatch(label, "boolean", &node, ctx))
            }
        }
    }

    fn build_node(&self) -> Result<NodeRef, Error> {
        Ok(Node::plain(if *self { "true" } else { "false" }))
    }
}

impl CoreValue for i64 {
    fn unmarshal(
        node: &NodeRef,
        label: &str,
        ctx: &mut UnmarshalCtx,
    ) -> Result<Unmarshaled<Self>, Error> {
        let Some(node) = concrete(node, label, ctx)? else {
            return Ok(Unmarshaled::dirty(0));
        };
        let n = node.borrow();
        if !n.is_scalar() {
            drop(n);
            return Ok(type_mismatch(label, "integer", &node, ctx));
        }
        match scalars::parse_yaml12_int(&n.value) {
            Ok(i) => Ok(Unmarshaled::clean(i)),
            Err(_) => {
                drop(n);
                Ok(type_mismatch(label, "integer", &node, ctx))
            }
        }
    }

    fn build_node(&self) -> Result<NodeRef, Error> {
        Ok(Node::plain(self.to_string()))
    }
}

impl CoreValue for f64 {
    fn unmarshal(
        node: &NodeRef,
        label: &str,
        ctx: &mut UnmarshalCtx,
    ) -> Result<Unmarshaled<Self>, Error> {
        let Some(node) = concrete(node, label, ctx)? else {
            return Ok(Unmarshaled::dirty(0.0));
        };
        let n = node.borrow();
        if !n.is_scalar() {
            drop(n);
            return Ok(type_mismatch(label, "number", &node, ctx));
        }
        match scalars::parse_yaml12_float(&n.value) {
            Ok(f) => Ok(Unmarshaled::clean(f)),
            Err(_) => {
                drop(n);
                Ok(type_mismatch(label, "number", &node, ctx))
            }
        }
    }

    fn build_node(&self) -> Result<NodeRef, Error> {
        Ok(Node::plain(scalars::format_float(*self)))
    }
}

impl CoreValue for Value {
    fn unmarshal(
        node: &NodeRef,
        _label: &str,
        _ctx: &mut UnmarshalCtx,
    ) -> Result<Unmarshaled<Self>, Error> {
        Ok(Unmarshaled::clean(Value::from_node(node)))
    }

    fn build_node(&self) -> Result<NodeRef, Error> {
        Ok(self.to_node())
    }
}

/// Self-referential models (schemas inside schemas) break the recursion
/// through a box; marshalling just delegates.
impl<T: CoreValue + Default> CoreValue for Box<T> {
    fn unmarshal(
        node: &NodeRef,
        label: &str,
        ctx: &mut UnmarshalCtx,
    ) -> Result<Unmarshaled<Self>, Error> {
        let um = T::unmarshal(node, label, ctx)?;
        Ok(Unmarshaled {
            value: Box::new(um.value),
            ok: um.ok,
        })
    }

    fn build_node(&self) -> Result<NodeRef, Error> {
        (**self).build_node()
    }
}

// ---------------------------------------------------------------------------
// Containers
// ---------------------------------------------------------------------------

impl<T: CoreValue + Default> CoreValue for Vec<T> {
    fn unmarshal(
        node: &NodeRef,
        label: &str,
        ctx: &mut UnmarshalCtx,
    ) -> Result<Unmarshaled<Self>, Error> {
        let Some(node) = concrete(node, label, ctx)? else {
            return Ok(Unmarshaled::dirty(Vec::new()));
        };
        if !node.borrow().is_sequence() {
            return Ok(type_mismatch(label, "sequence", &node, ctx));
        }
        let children: Vec<NodeRef> = node.borrow().children.clone();
        let mut out = Vec::with_capacity(children.len());
        let mut ok = true;
        for child in &children {
            let um = T::unmarshal(child, label, ctx)?;
            ok &= um.ok;
            out.push(um.value);
        }
        Ok(Unmarshaled { value: out, ok })
    }

    fn build_node(&self) -> Result<NodeRef, Error> {
        let seq = Node::sequence(Style::Block);
        for item in self {
            let child = item.build_node()?;
            seq.borrow_mut().children.push(child);
        }
        Ok(seq)
    }
}

impl<V: CoreValue + Default> CoreValue for SequencedMap<String, V> {
    fn unmarshal(
        node: &NodeRef,
        label: &str,
        ctx: &mut UnmarshalCtx,
    ) -> Result<Unmarshaled<Self>, Error> {
        let Some(node) = concrete(node, label, ctx)? else {
            return Ok(Unmarshaled::dirty(SequencedMap::default()));
        };
        if !node.borrow().is_mapping() {
            return Ok(type_mismatch(label, "mapping", &node, ctx));
        }
        let children: Vec<NodeRef> = node.borrow().children.clone();
        let mut map = SequencedMap::new();
        let mut ok = true;
        for pair in children.chunks_exact(2) {
            let Some(key) = resolve_alias(Some(&pair[0])) else {
                continue;
            };
            let key_text = key.borrow().value.clone();
            // Values whose static type is only known through the map's
            // parameterization come from the factory registry, then are
            // populated in place.
            let mut slot: V = registry::create::<V>()?;
            ok &= slot.unmarshal_into(&pair[1], &format!("{label}.{key_text}"), ctx)?;
            map.set(key_text, slot);
        }
        Ok(Unmarshaled { value: map, ok })
    }

    fn build_node(&self) -> Result<NodeRef, Error> {
        let map = Node::mapping(if self.is_empty() { Style::Flow } else { Style::Block });
        for (k, v) in self.iter() {
            crate::node::mapping_push(&map, Node::plain(k.clone()), v.build_node()?);
        }
        Ok(map)
    }
}
