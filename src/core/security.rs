//! Wire shape of security schemes and requirements.

use crate::error::Error;
use crate::marshal::macros::{core_object, core_required};
use crate::marshal::{concrete, CoreMeta, CoreValue, Unmarshaled, UnmarshalCtx};
use crate::node::{self, Node, NodeRef, Style};
use crate::seqmap::SequencedMap;
use crate::validation::{Rule, ValidationError};

core_object! {
    /// A security scheme definition (`basic`, `apiKey` or `oauth2`).
    pub struct SecurityScheme, model = "securityScheme" {
        r#type: String, key = "type", required;
        description: String, key = "description";
        name: String, key = "name";
        r#in: String, key = "in";
        flow: String, key = "flow";
        authorization_url: String, key = "authorizationUrl";
        token_url: String, key = "tokenUrl";
        scopes: SequencedMap<String, String>, key = "scopes";
    }
}

/// One alternative set of required security schemes: scheme name → list of
/// scope names (empty for non-oauth2 schemes). A map-at-root object with no
/// extension surface.
#[derive(Clone, Debug, Default)]
pub struct SecurityRequirement {
    pub core: CoreMeta,
    pub schemes: SequencedMap<String, Vec<String>>,
}

impl SecurityRequirement {
    pub const MODEL: &'static str = "securityRequirement";
}

impl CoreValue for SecurityRequirement {
    fn unmarshal(
        node: &NodeRef,
        label: &str,
        ctx: &mut UnmarshalCtx,
    ) -> Result<Unmarshaled<Self>, Error> {
        let mut out = SecurityRequirement {
            core: CoreMeta {
                model: Self::MODEL,
                config: ctx.config,
                ..CoreMeta::default()
            },
            schemes: SequencedMap::new(),
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
            let um =
                Vec::<String>::unmarshal(&pair[1], &format!("{label}.{key_text}"), ctx)?;
            ok &= um.ok;
            out.schemes.set(key_text, um.value);
        }
        out.core.parsed_ok = ok;
        Ok(Unmarshaled { value: out, ok })
    }

    fn build_node(&self) -> Result<NodeRef, Error> {
        if let Some(root) = &self.core.root {
            return Ok(root.clone());
        }
        let map = Node::mapping(if self.schemes.is_empty() {
            Style::Flow
        } else {
            Style::Block
        });
        for (key, scopes) in self.schemes.iter() {
            node::mapping_push(&map, Node::plain(key.clone()), scopes.build_node()?);
        }
        Ok(map)
    }
}
