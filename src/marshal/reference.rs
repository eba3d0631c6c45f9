//! Reference-or-inline: either `{$ref: "…"}` or the object itself.
//!
//! The presence of the `$ref` key forces the reference branch; without it
//! the mapping unmarshals as the inline object. References stay strings —
//! resolution across the document (or across documents) is a deliberate,
//! on-demand operation elsewhere, which also keeps the object graph
//! acyclic when schemas reference themselves.

use crate::error::Error;
use crate::marshal::field::NodeField;
use crate::marshal::{concrete, CoreValue, Unmarshaled, UnmarshalCtx};
use crate::node::{self, Node, NodeRef, Style};

pub(crate) const REF_KEY: &str = "$ref";

/// Holds exactly one of: a reference string, or an inline `T`.
#[derive(Clone, Debug, Default)]
pub struct Reference<T> {
    /// The `$ref` string when this is the reference branch.
    pub reference: NodeField<String>,
    /// The inlined object when no `$ref` key is present.
    pub inline: Option<Box<T>>,
    /// The mapping node this holder was parsed from (reference branch).
    pub(crate) node: Option<NodeRef>,
}

impl<T> Reference<T> {
    pub fn is_reference(&self) -> bool {
        self.reference.present()
    }

    /// The reference string, when the reference branch is active.
    pub fn reference(&self) -> Option<&str> {
        self.reference.get().map(String::as_str)
    }

    pub fn inline(&self) -> Option<&T> {
        self.inline.as_deref()
    }

    pub fn inline_mut(&mut self) -> Option<&mut T> {
        self.inline.as_deref_mut()
    }

    /// Wrap an inline object.
    pub fn of(inner: T) -> Self {
        Reference {
            reference: NodeField::default(),
            inline: Some(Box::new(inner)),
            node: None,
        }
    }

    /// Build the reference branch.
    pub fn to_target<S: Into<String>>(target: S) -> Self {
        Reference {
            reference: NodeField {
                value: Some(target.into()),
                key_node: None,
                value_node: None,
            },
            inline: None,
            node: None,
        }
    }
}

impl<T> PartialEq for Reference<T>
where
    T: PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.reference.value == other.reference.value && self.inline == other.inline
    }
}

impl<T> CoreValue for Reference<T>
where
    T: CoreValue + Default,
{
    fn unmarshal(
        node: &NodeRef,
        label: &str,
        ctx: &mut UnmarshalCtx,
    ) -> Result<Unmarshaled<Self>, Error> {
        let Some(resolved) = concrete(node, label, ctx)? else {
            return Ok(Unmarshaled::dirty(Reference::default()));
        };
        if resolved.borrow().is_mapping() {
            if let Some((key_node, value_node)) = node::mapping_get(&resolved, REF_KEY) {
                let um = String::unmarshal(&value_node, &format!("{label}.$ref"), ctx)?;
                return Ok(Unmarshaled {
                    value: Reference {
                        reference: NodeField::of(um.value, key_node, value_node),
                        inline: None,
                        node: Some(resolved.clone()),
                    },
                    ok: um.ok,
                });
            }
        }
        let um = T::unmarshal(&resolved, label, ctx)?;
        Ok(Unmarshaled {
            value: Reference::of(um.value),
            ok: um.ok,
        })
    }

    fn build_node(&self) -> Result<NodeRef, Error> {
        if let Some(target) = &self.reference.value {
            // A reference marshals as the `$ref` key alone.
            let map = Node::mapping(Style::Block);
            node::mapping_push(
                &map,
                Node::plain(REF_KEY),
                Node::scalar(target.clone(), Style::DoubleQuoted),
            );
            Ok(map)
        } else if let Some(inner) = &self.inline {
            inner.build_node()
        } else {
            Ok(Node::mapping(Style::Flow))
        }
    }
}
