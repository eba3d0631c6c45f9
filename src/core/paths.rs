//! Wire shape of the `paths` container and individual path items.

use crate::error::Error;
use crate::marshal::macros::{core_object, core_required};
use crate::marshal::{
    concrete, CoreMeta, CoreValue, Extensions, Reference, Unmarshaled, UnmarshalCtx,
};
use crate::node::{self, Node, NodeRef, Style};
use crate::registry;
use crate::seqmap::SequencedMap;
use crate::validation::{Rule, ValidationError};

use super::{Operation, Parameter};

/// The relative paths to the individual endpoints, in document order.
///
/// A map-at-root object: every key starting with `/` is a path item
/// (possibly a `$ref`), `x-` keys are extensions, anything else is flagged.
#[derive(Clone, Debug, Default)]
pub struct Paths {
    pub core: CoreMeta,
    pub items: SequencedMap<String, Reference<PathItem>>,
    pub extensions: Extensions,
}

impl Paths {
    pub const MODEL: &'static str = "paths";
}

impl CoreValue for Paths {
    fn unmarshal(
        node: &NodeRef,
        label: &str,
        ctx: &mut UnmarshalCtx,
    ) -> Result<Unmarshaled<Self>, Error> {
        let mut out = Paths {
            core: CoreMeta {
                model: Self::MODEL,
                config: ctx.config,
                ..CoreMeta::default()
            },
            items: SequencedMap::new(),
            extensions: Extensions::default(),
        };
        let Some(mapping) = concrete(node, label, ctx)? else {
            return Ok(Unmarshaled::dirty(out));
        };
        if !mapping.borrow().is_mapping() {
            let got = mapping.borrow().kind.as_str();
            ctx.errors.push(ValidationError::new(
                Rule::TypeMismatch,
                format!("{label} expected object, got {got}"),
                Some(&mapping),
            ));
            return Ok(Unmarshaled::dirty(out));
        }
        out.core.root = Some(mapping.clone());
        let children: Vec<NodeRef> = mapping.borrow().children.clone();
        let mut ok = true;
        for pair in children.chunks_exact(2) {
            let Some(key_node) = node::resolve_alias(Some(&pair[0])) else {
                continue;
            };
            let key_text = key_node.borrow().value.clone();
            if out.extensions.maybe_collect(&key_text, &pair[0], &pair[1]) {
                continue;
            }
            // Path keys must start with `/`; the content rule is enforced by
            // validation, but anything else is still captured as a path item
            // so the model remains complete.
            let mut slot: Reference<PathItem> = registry::create()?;
            ok &= slot.unmarshal_into(&pair[1], &format!("{label}.{key_text}"), ctx)?;
            out.items.set(key_text, slot);
        }
        out.core.parsed_ok = ok;
        Ok(Unmarshaled { value: out, ok })
    }

    fn build_node(&self) -> Result<NodeRef, Error> {
        if let Some(root) = &self.core.root {
            return Ok(root.clone());
        }
        let map = Node::mapping(if self.items.is_empty() && self.extensions.is_empty() {
            Style::Flow
        } else {
            Style::Block
        });
        for (key, item) in self.items.iter() {
            node::mapping_push(&map, Node::plain(key.clone()), item.build_node()?);
        }
        self.extensions.build_into(&map)?;
        Ok(map)
    }
}

core_object! {
    /// Operations available on a single path, plus parameters shared by all
    /// of them. A path item may also be a bare `$ref` to another document's
    /// item; the reference wrapper upstream handles that branch.
    pub struct PathItem, model = "pathItem" {
        get: Operation, key = "get";
        put: Operation, key = "put";
        post: Operation, key = "post";
        delete: Operation, key = "delete";
        options: Operation, key = "options";
        head: Operation, key = "head";
        patch: Operation, key = "patch";
        parameters: Vec<Reference<Parameter>>, key = "parameters";
    }
}
