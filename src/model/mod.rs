//! The high-level model: the ergonomic façade over the core layer.
//!
//! Each struct mirrors its core counterpart with direct optional fields, a
//! backpointer to the core struct (`get_core()`), zero-safe getters, a
//! `validate` method, and a `sync` that reconciles mutations back into the
//! node tree with minimal textual churn.
//!
//! Population moves nested core structs into their high-level owners and
//! clones leaf values, so the core keeps carrying the parsed leaf values
//! sync diffs against.

use crate::error::Error;
use crate::marshal::Reference;
use crate::node::{self, NodeRef};
use crate::seqmap::SequencedMap;

mod info;
mod operation;
mod parameter;
mod paths;
mod responses;
mod schema;
mod security;
mod swagger;

pub use info::{Contact, Info, License};
pub use operation::{Operation, OperationMediaTypes};
pub use parameter::{Items, Parameter};
pub use paths::{PathItem, Paths};
pub use responses::{Header, Response, Responses};
pub use schema::{Schema, Xml};
pub use security::{SecurityRequirement, SecurityScheme};
pub use swagger::{DocumentMediaTypes, ExternalDocumentation, SecuritySchemeTypes, Swagger, Tag};

/// Backpointer and root-node plumbing shared by every high-level struct.
macro_rules! root_helpers {
    ($CoreTy:ty) => {
        pub fn get_core(&self) -> &$CoreTy {
            &self.core
        }

        pub(crate) fn ensure_root(&mut self) -> crate::node::NodeRef {
            if let Some(root) = &self.core.core.root {
                return root.clone();
            }
            let map = crate::node::Node::mapping(crate::node::Style::Block);
            self.core.core.root = Some(map.clone());
            map
        }

        pub(crate) fn core_root(&self) -> crate::node::NodeRef {
            self.core
                .core
                .root
                .clone()
                .unwrap_or_else(|| crate::node::Node::mapping(crate::node::Style::Block))
        }
    };
}
pub(crate) use root_helpers;

/// Map a reference-or-inline through a populate function, keeping the
/// reference branch untouched.
pub(crate) fn map_reference<C, M>(r: Reference<C>, populate: impl FnOnce(C) -> M) -> Reference<M> {
    Reference {
        reference: r.reference,
        inline: r.inline.map(|boxed| Box::new(populate(*boxed))),
        node: r.node,
    }
}

/// Reconcile one reference-or-inline holder and hand back the node that
/// should sit in the parent container.
pub(crate) fn sync_reference<M>(
    holder: &mut Reference<M>,
    sync_inline: impl FnOnce(&mut M) -> Result<NodeRef, Error>,
) -> Result<NodeRef, Error> {
    if let Some(target) = holder.reference.value.clone() {
        if let Some(existing) = &holder.node {
            if existing.borrow().is_mapping() {
                let unchanged = node::mapping_get(existing, "$ref")
                    .map(|(_, v)| v.borrow().value == target)
                    .unwrap_or(false);
                if !unchanged {
                    let value = crate::node::Node::scalar(
                        target.clone(),
                        crate::node::Style::DoubleQuoted,
                    );
                    holder.reference.key_node =
                        Some(node::mapping_set(existing, "$ref", value.clone()));
                    holder.reference.value_node = Some(value);
                }
                return Ok(existing.clone());
            }
        }
        let fresh = crate::node::Node::mapping(crate::node::Style::Block);
        let value = crate::node::Node::scalar(target, crate::node::Style::DoubleQuoted);
        let key = crate::node::Node::plain("$ref");
        node::mapping_push(&fresh, key.clone(), value.clone());
        holder.node = Some(fresh.clone());
        holder.reference.key_node = Some(key);
        holder.reference.value_node = Some(value);
        Ok(fresh)
    } else if let Some(inline) = holder.inline.as_deref_mut() {
        sync_inline(inline)
    } else {
        Ok(crate::node::Node::mapping(crate::node::Style::Flow))
    }
}

/// Populate a whole ordered map of core values.
pub(crate) fn map_values<C, M>(
    map: SequencedMap<String, C>,
    populate: impl Fn(C) -> M,
) -> SequencedMap<String, M> {
    let mut out = SequencedMap::new();
    for (k, v) in map {
        out.set(k, populate(v));
    }
    out
}

/// Attach a synced child's root node under `key` of the parent mapping,
/// unless it is already the node sitting there.
pub(crate) fn attach_child(parent: &NodeRef, key: &str, child_root: &NodeRef) {
    let already = node::mapping_get(parent, key)
        .map(|(_, v)| std::rc::Rc::ptr_eq(&v, child_root))
        .unwrap_or(false);
    if !already {
        node::mapping_set(parent, key, child_root.clone());
    }
}

/// Reconcile an ordered map of synced child nodes into the mapping node
/// under the parent: delete vanished keys, rewrite changed values in place,
/// append new pairs in order.
pub(crate) fn sync_map_node(
    map_node: &NodeRef,
    desired: &[(String, NodeRef)],
) -> Result<(), Error> {
    sync_map_node_with_keys(map_node, desired, |key| crate::node::Node::plain(key))
}

/// [`sync_map_node`] with caller-chosen key nodes for appended pairs
/// (response code keys stay double-quoted, for one).
pub(crate) fn sync_map_node_with_keys(
    map_node: &NodeRef,
    desired: &[(String, NodeRef)],
    mut make_key: impl FnMut(&str) -> NodeRef,
) -> Result<(), Error> {
    {
        // An empty flow container (`{}`) gaining entries reads better, and
        // re-parses identically, in block style.
        let mut m = map_node.borrow_mut();
        if m.style == crate::node::Style::Flow && m.children.is_empty() && !desired.is_empty() {
            m.style = crate::node::Style::Block;
        }
    }
    let desired_keys: Vec<&str> = desired.iter().map(|(k, _)| k.as_str()).collect();
    for existing in node::mapping_keys(map_node) {
        // Extension entries share the container mapping; they are owned by
        // the extensions sync, never deleted here.
        if existing.starts_with("x-") {
            continue;
        }
        if !desired_keys.contains(&existing.as_str()) {
            node::mapping_delete(map_node, &existing);
        }
    }
    for (key, child) in desired {
        match node::mapping_get(map_node, key) {
            Some((_, existing)) if std::rc::Rc::ptr_eq(&existing, child) => {}
            Some(_) => {
                node::mapping_set(map_node, key, child.clone());
            }
            None => {
                node::mapping_push(map_node, make_key(key), child.clone());
            }
        }
    }
    Ok(())
}

/// The sequence node under `key`, created (or replaced) when absent or of
/// the wrong kind.
pub(crate) fn ensure_seq_node(root: &NodeRef, key: &str) -> NodeRef {
    match node::mapping_get(root, key) {
        Some((_, v)) if v.borrow().is_sequence() => v,
        _ => {
            let seq = crate::node::Node::sequence(crate::node::Style::Block);
            node::mapping_set(root, key, seq.clone());
            seq
        }
    }
}

/// The mapping node under `key`, created (or replaced) when absent or of
/// the wrong kind.
pub(crate) fn ensure_map_node(root: &NodeRef, key: &str) -> NodeRef {
    match node::mapping_get(root, key) {
        Some((_, v)) if v.borrow().is_mapping() => v,
        _ => {
            let map = crate::node::Node::mapping(crate::node::Style::Block);
            node::mapping_set(root, key, map.clone());
            map
        }
    }
}

/// Reconcile an optional list of (possibly referenced) parameters under
/// `key` of a path-item or operation mapping.
pub(crate) fn sync_parameter_list(
    root: &NodeRef,
    key: &str,
    parameters: Option<&mut Vec<Reference<Parameter>>>,
) -> Result<(), Error> {
    match parameters {
        Some(parameters) => {
            let mut nodes = Vec::with_capacity(parameters.len());
            for parameter in parameters.iter_mut() {
                nodes.push(sync_reference(parameter, |inline| {
                    inline.sync()?;
                    Ok(inline.core_root())
                })?);
            }
            let seq = ensure_seq_node(root, key);
            sync_seq_node(&seq, nodes);
        }
        None => {
            node::mapping_delete(root, key);
        }
    }
    Ok(())
}

/// Rewrite a sequence node's children to the synced child nodes, keeping
/// the sequence node itself (and its style and comments) in place.
pub(crate) fn sync_seq_node(seq_node: &NodeRef, desired: Vec<NodeRef>) {
    let unchanged = {
        let n = seq_node.borrow();
        n.children.len() == desired.len()
            && n.children
                .iter()
                .zip(desired.iter())
                .all(|(a, b)| std::rc::Rc::ptr_eq(a, b))
    };
    if !unchanged {
        let mut n = seq_node.borrow_mut();
        if n.style == crate::node::Style::Flow && n.children.is_empty() && !desired.is_empty() {
            n.style = crate::node::Style::Block;
        }
        n.children = desired;
    }
}
