//! Wire shape of operation responses, single responses and headers.

use crate::error::Error;
use crate::marshal::macros::{core_object, core_required};
use crate::marshal::{
    concrete, CoreMeta, CoreValue, Extensions, NodeField, Reference, Unmarshaled, UnmarshalCtx,
};
use crate::node::{self, Node, NodeRef, Style};
use crate::registry;
use crate::seqmap::SequencedMap;
use crate::validation::{Rule, ValidationError};
use crate::value::Value;

use super::{Items, Schema};

/// The possible responses of an operation: status-code keys in document
/// order plus the optional `default`.
#[derive(Clone, Debug, Default)]
pub struct Responses {
    pub core: CoreMeta,
    pub default: NodeField<Reference<Response>>,
    pub codes: SequencedMap<String, Reference<Response>>,
    pub extensions: Extensions,
}

impl Responses {
    pub const MODEL: &'static str = "responses";
}

impl CoreValue for Responses {
    fn unmarshal(
        node: &NodeRef,
        label: &str,
        ctx: &mut UnmarshalCtx,
    ) -> Result<Unmarshaled<Self>, Error> {
        let mut out = Responses {
            core: CoreMeta {
                model: Self::MODEL,
                config: ctx.config,
                ..CoreMeta::default()
            },
            default: NodeField::default(),
            codes: SequencedMap::new(),
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
            if key_text == "default" {
                let um = Reference::<Response>::unmarshal(
                    &pair[1],
                    &format!("{label}.default"),
                    ctx,
                )?;
                ok &= um.ok;
                out.default = NodeField::of(um.value, pair[0].clone(), pair[1].clone());
                continue;
            }
            if out.extensions.maybe_collect(&key_text, &pair[0], &pair[1]) {
                continue;
            }
            let mut slot: Reference<Response> = registry::create()?;
            ok &= slot.unmarshal_into(&pair[1], &format!("{label}.{key_text}"), ctx)?;
            out.codes.set(key_text, slot);
        }
        out.core.parsed_ok = ok;
        Ok(Unmarshaled { value: out, ok })
    }

    fn build_node(&self) -> Result<NodeRef, Error> {
        if let Some(root) = &self.core.root {
            return Ok(root.clone());
        }
        let empty = self.codes.is_empty() && !self.default.present() && self.extensions.is_empty();
        let map = Node::mapping(if empty { Style::Flow } else { Style::Block });
        for (key, item) in self.codes.iter() {
            node::mapping_push(
                &map,
                Node::scalar(key.clone(), Style::DoubleQuoted),
                item.build_node()?,
            );
        }
        if let Some(default) = &self.default.value {
            node::mapping_push(&map, Node::plain("default"), default.build_node()?);
        }
        self.extensions.build_into(&map)?;
        Ok(map)
    }
}

core_object! {
    /// A single response from an operation.
    pub struct Response, model = "response" {
        description: String, key = "description", required;
        schema: Box<Schema>, key = "schema";
        headers: SequencedMap<String, Header>, key = "headers";
        examples: SequencedMap<String, Value>, key = "examples";
    }
}

core_object! {
    /// A header sent with a response. Shares the primitive descriptor
    /// vocabulary with non-body parameters.
    pub struct Header, model = "header" {
        description: String, key = "description";
        r#type: String, key = "type", required;
        format: String, key = "format";
        items: Box<Items>, key = "items";
        collection_format: String, key = "collectionFormat";
        default: Value, key = "default";
        maximum: f64, key = "maximum";
        exclusive_maximum: bool, key = "exclusiveMaximum";
        minimum: f64, key = "minimum";
        exclusive_minimum: bool, key = "exclusiveMinimum";
        max_length: i64, key = "maxLength";
        min_length: i64, key = "minLength";
        pattern: String, key = "pattern";
        max_items: i64, key = "maxItems";
        min_items: i64, key = "minItems";
        unique_items: bool, key = "uniqueItems";
        r#enum: Vec<Value>, key = "enum";
        multiple_of: f64, key = "multipleOf";
    }
}
