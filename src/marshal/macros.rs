//! `core_object!`: compile-time expansion of per-field wire tags.
//!
//! Each core struct declares, per field, the mapping key it binds to and
//! whether the key is required; the macro expands that into the struct
//! definition (every field wrapped in a [`crate::marshal::NodeField`]
//! envelope, plus the `core` meta and the `x-` extensions collection) and a
//! [`crate::marshal::CoreValue`] implementation:
//!
//! - unmarshal walks the declared keys against the mapping node, records
//!   key/value nodes for error positions, flags missing required keys,
//!   collects `x-` keys into extensions, and warns on unknown keys;
//! - build-node renders present fields back in declaration order.
//!
//! This replaces the runtime reflection a dynamic language would use; the
//! contracts the expansion satisfies are fixed, the field lists are data.

/// Expands an optional `required` marker to a boolean.
macro_rules! core_required {
    () => {
        false
    };
    (required) => {
        true
    };
}

macro_rules! core_object {
    (
        $(#[$meta:meta])*
        $vis:vis struct $Name:ident, model = $model:literal {
            $(
                $(#[$fmeta:meta])*
                $field:ident : $T:ty, key = $key:literal $(, $req:ident)? ;
            )*
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Debug, Default)]
        $vis struct $Name {
            /// Envelope: root node, validity flags, serialization config.
            pub core: $crate::marshal::CoreMeta,
            $(
                $(#[$fmeta])*
                pub $field: $crate::marshal::NodeField<$T>,
            )*
            /// `x-` extension entries, in input order.
            pub extensions: $crate::marshal::Extensions,
        }

        impl $Name {
            pub const MODEL: &'static str = $model;
            pub(crate) const KEYS: &'static [&'static str] = &[$($key),*];
        }

        impl $crate::marshal::CoreValue for $Name {
            fn unmarshal(
                node: &$crate::node::NodeRef,
                label: &str,
                ctx: &mut $crate::marshal::UnmarshalCtx<'_>,
            ) -> Result<$crate::marshal::Unmarshaled<Self>, $crate::error::Error> {
                let mut out = Self::default();
                out.core.model = $model;
                out.core.config = ctx.config;
                let Some(mapping) = $crate::marshal::concrete(node, label, ctx)? else {
                    return Ok($crate::marshal::Unmarshaled::dirty(out));
                };
                if !mapping.borrow().is_mapping() {
                    let got = mapping.borrow().kind.as_str();
                    ctx.errors.push($crate::validation::ValidationError::new(
                        $crate::validation::Rule::TypeMismatch,
                        format!("{label} expected object, got {got}"),
                        Some(&mapping),
                    ));
                    return Ok($crate::marshal::Unmarshaled::dirty(out));
                }
                out.core.root = Some(mapping.clone());
                let mut ok = true;
                $(
                    match $crate::node::mapping_get(&mapping, $key) {
                        Some((key_node, value_node)) => {
                            let um = <$T as $crate::marshal::CoreValue>::unmarshal(
                                &value_node,
                                concat!($model, ".", $key),
                                ctx,
                            )?;
                            ok &= um.ok;
                            out.$field = $crate::marshal::NodeField::of(
                                um.value, key_node, value_node,
                            );
                        }
                        None => {
                            if core_required!($($req)?) {
                                ctx.errors.push($crate::validation::ValidationError::new(
                                    $crate::validation::Rule::RequiredField,
                                    concat!($model, ".", $key, " is missing"),
                                    Some(&mapping),
                                ));
                                ok = false;
                            }
                        }
                    }
                )*
                // Remaining keys: `x-` entries are extensions, anything else
                // is an unknown-key warning.
                {
                    let children: Vec<$crate::node::NodeRef> =
                        mapping.borrow().children.clone();
                    for pair in children.chunks_exact(2) {
                        let Some(key_node) =
                            $crate::node::resolve_alias(Some(&pair[0]))
                        else {
                            continue;
                        };
                        let key_text = key_node.borrow().value.clone();
                        if Self::KEYS.contains(&key_text.as_str()) {
                            continue;
                        }
                        if out.extensions.maybe_collect(&key_text, &pair[0], &pair[1]) {
                            continue;
                        }
                        ctx.errors.push($crate::validation::ValidationError::warning(
                            $crate::validation::Rule::InvalidSyntax,
                            format!(concat!("unknown key `{}` on ", $model), key_text),
                            Some(&pair[0]),
                        ));
                    }
                }
                out.core.parsed_ok = ok;
                Ok($crate::marshal::Unmarshaled { value: out, ok })
            }

            fn build_node(&self) -> Result<$crate::node::NodeRef, $crate::error::Error> {
                if let Some(root) = &self.core.root {
                    return Ok(root.clone());
                }
                let map = $crate::node::Node::mapping($crate::node::Style::Block);
                $(
                    if let Some(value) = &self.$field.value {
                        let value_node = match &self.$field.value_node {
                            Some(existing) => existing.clone(),
                            None => $crate::marshal::CoreValue::build_node(value)?,
                        };
                        $crate::node::mapping_push(
                            &map,
                            $crate::node::Node::plain($key),
                            value_node,
                        );
                    }
                )*
                self.extensions.build_into(&map)?;
                Ok(map)
            }
        }
    };
}

pub(crate) use {core_object, core_required};
