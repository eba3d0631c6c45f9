//! The node-tracking envelope and per-field slot every core struct is built
//! from.

use crate::config::SerializeConfig;
use crate::error::Error;
use crate::marshal::CoreValue;
use crate::node::{self, NodeKind, NodeRef};

/// Envelope embedded in every core model struct.
#[derive(Clone, Debug, Default)]
pub struct CoreMeta {
    /// The mapping node this object was parsed from (or built into).
    pub root: Option<NodeRef>,
    /// True when the YAML shape matched the declared schema at parse time.
    pub parsed_ok: bool,
    /// True when the last `Validate` pass found no content errors.
    pub valid: bool,
    /// Serialization configuration captured from the source document.
    pub config: SerializeConfig,
    /// Object name used in error messages (`info`, `parameter`, …).
    pub model: &'static str,
}

impl CoreMeta {
    /// The key-node for a mapping child by key; used to locate error
    /// positions.
    pub fn key_node(&self, key: &str) -> Option<NodeRef> {
        node::mapping_key_node(self.root.as_ref()?, key)
    }

    /// The value-node for a mapping child by key.
    pub fn value_node(&self, key: &str) -> Option<NodeRef> {
        node::mapping_get(self.root.as_ref()?, key).map(|(_, v)| v)
    }
}

/// One wire-visible field: `{present, value, key-node, value-node}`.
///
/// Presence is the `Option`: `None` means the key was absent from the
/// mapping, `Some(zero)` means the key was present with a zero value — the
/// distinction the round trip depends on. The node handles give every error
/// a precise source position and let sync rewrite values without disturbing
/// surrounding texture.
#[derive(Clone, Debug, Default)]
pub struct NodeField<T> {
    pub value: Option<T>,
    pub key_node: Option<NodeRef>,
    pub value_node: Option<NodeRef>,
}

/// Field equality is value equality; the node handles are bookkeeping.
impl<T: PartialEq> PartialEq for NodeField<T> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl<T> NodeField<T> {
    /// Whether the mapping key appeared in the input.
    pub fn present(&self) -> bool {
        self.value.is_some()
    }

    pub fn get(&self) -> Option<&T> {
        self.value.as_ref()
    }

    pub(crate) fn of(value: T, key_node: NodeRef, value_node: NodeRef) -> Self {
        Self {
            value: Some(value),
            key_node: Some(key_node),
            value_node: Some(value_node),
        }
    }

    /// Take the value out for population, leaving the node bookkeeping
    /// behind.
    pub(crate) fn take_opt(&mut self) -> Option<T> {
        self.value.take()
    }
}

/// Reconcile a high-level field value into its core slot and the parent
/// mapping node. Unchanged values touch nothing; changed scalars are
/// rewritten in place (keeping quoting style and comments); added fields
/// append `key: value` pairs in order; removed fields delete their pair.
pub(crate) fn sync_field<T>(
    root: &NodeRef,
    key: &str,
    desired: Option<&T>,
    field: &mut NodeField<T>,
) -> Result<(), Error>
where
    T: CoreValue + PartialEq + Clone,
{
    match desired {
        Some(value) => {
            if field.value.as_ref() == Some(value) {
                return Ok(());
            }
            let fresh = value.build_node()?;
            let node = match &field.value_node {
                Some(existing) if merge_scalar_into(existing, &fresh) => existing.clone(),
                _ => {
                    let key_node = node::mapping_set(root, key, fresh.clone());
                    field.key_node = Some(key_node);
                    fresh
                }
            };
            field.value = Some(value.clone());
            field.value_node = Some(node);
            if field.key_node.is_none() {
                field.key_node = node::mapping_key_node(root, key);
            }
        }
        None => {
            if field.present() {
                node::mapping_delete(root, key);
                field.value = None;
                field.value_node = None;
                field.key_node = None;
            }
        }
    }
    Ok(())
}

/// If both nodes are scalars, rewrite `target` with `fresh`'s text in place
/// (preserving the original quoting style where it can still represent the
/// text) and return true.
pub(crate) fn merge_scalar_into(target: &NodeRef, fresh: &NodeRef) -> bool {
    let f = fresh.borrow();
    if !f.is_scalar() {
        return false;
    }
    let mut t = target.borrow_mut();
    if *t.kind != NodeKind::Scalar {
        return false;
    }
    t.value = f.value.clone();
    if t.style == crate::node::Style::Plain && f.style != crate::node::Style::Plain {
        // The new text needs quoting the old style cannot provide.
        t.style = f.style;
    }
    true
}
