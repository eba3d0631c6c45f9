//! Specification extensions: every `x-`-prefixed key on an object, captured
//! in input order instead of being reported as unknown.

use crate::error::Error;
use crate::marshal::field::NodeField;
use crate::node::{self, NodeRef};
use crate::seqmap::SequencedMap;
use crate::value::Value;

/// Key prefix the specification reserves for extensions.
pub const EXTENSION_PREFIX: &str = "x-";

/// Ordered collection of extension entries on one object.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Extensions {
    entries: SequencedMap<String, NodeField<Value>>,
}

impl Extensions {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(&key.to_owned()).and_then(|f| f.value.as_ref())
    }

    pub fn set<K: Into<String>>(&mut self, key: K, value: Value) {
        self.entries.set(
            key.into(),
            NodeField {
                value: Some(value),
                key_node: None,
                value_node: None,
            },
        );
    }

    pub fn delete(&mut self, key: &str) -> bool {
        self.entries.delete(&key.to_owned()).is_some()
    }

    /// Entries in input order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &NodeField<Value>)> {
        self.entries.iter()
    }

    /// The untyped container surface, for generic tooling.
    pub fn as_any_map(&self) -> &dyn crate::seqmap::AnySequencedMap {
        &self.entries
    }

    /// Collect one mapping entry when its key carries the extension prefix.
    /// Returns true when the entry was consumed.
    pub(crate) fn maybe_collect(
        &mut self,
        key_text: &str,
        key_node: &NodeRef,
        value_node: &NodeRef,
    ) -> bool {
        if !key_text.starts_with(EXTENSION_PREFIX) {
            return false;
        }
        self.entries.set(
            key_text.to_owned(),
            NodeField::of(
                Value::from_node(value_node),
                key_node.clone(),
                value_node.clone(),
            ),
        );
        true
    }

    /// Reconcile extension entries into the owning object's mapping node.
    pub(crate) fn sync_into(&mut self, root: &NodeRef) -> Result<(), Error> {
        // Remove extension keys that are gone from the collection.
        let existing: Vec<String> = node::mapping_keys(root)
            .into_iter()
            .filter(|k| k.starts_with(EXTENSION_PREFIX))
            .collect();
        for key in existing {
            if !self.entries.contains_key(&key) {
                node::mapping_delete(root, &key);
            }
        }
        // Write changed or added entries in order.
        for (key, field) in self.entries.iter_mut() {
            let Some(value) = field.value.clone() else { continue };
            let unchanged = field
                .value_node
                .as_ref()
                .map(|n| Value::from_node(n) == value)
                .unwrap_or(false);
            if unchanged {
                continue;
            }
            let fresh = value.to_node();
            let key_node = node::mapping_set(root, key, fresh.clone());
            field.key_node = Some(key_node);
            field.value_node = Some(fresh);
        }
        Ok(())
    }

    /// Append all entries to a freshly built mapping node.
    pub(crate) fn build_into(&self, map: &NodeRef) -> Result<(), Error> {
        for (key, field) in self.entries.iter() {
            let Some(value) = &field.value else { continue };
            node::mapping_push(map, crate::node::Node::plain(key.clone()), value.to_node());
        }
        Ok(())
    }
}
