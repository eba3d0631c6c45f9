//! High-level JSON Schema (the OAS3-compatible subset Swagger embeds).

use crate::core;
use crate::error::Error;
use crate::marshal::field::sync_field;
use crate::marshal::{Either, Extensions};
use crate::node;
use crate::seqmap::SequencedMap;
use crate::validation::{Rule, ValidationError, ValidationOptions};
use crate::value::Value;

use super::{
    attach_child, ensure_map_node, ensure_seq_node, map_values, root_helpers, sync_map_node,
    sync_seq_node, ExternalDocumentation,
};

/// The values `type` may take in an embedded schema.
const SCHEMA_TYPES: &[&str] = &[
    "array", "boolean", "integer", "null", "number", "object", "string", "file",
];

/// A JSON Schema definition (or `$ref` to one).
#[derive(Clone, Debug, Default)]
pub struct Schema {
    pub reference: Option<String>,
    pub format: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub default: Option<Value>,
    pub multiple_of: Option<f64>,
    pub maximum: Option<f64>,
    pub exclusive_maximum: Option<Either<bool, f64>>,
    pub minimum: Option<f64>,
    pub exclusive_minimum: Option<Either<bool, f64>>,
    pub max_length: Option<i64>,
    pub min_length: Option<i64>,
    pub pattern: Option<String>,
    pub max_items: Option<i64>,
    pub min_items: Option<i64>,
    pub unique_items: Option<bool>,
    pub max_properties: Option<i64>,
    pub min_properties: Option<i64>,
    pub required: Option<Vec<String>>,
    pub r#enum: Option<Vec<Value>>,
    pub r#type: Option<Either<Vec<String>, String>>,
    pub items: Option<Box<Schema>>,
    pub all_of: Option<Vec<Schema>>,
    pub properties: Option<SequencedMap<String, Schema>>,
    pub additional_properties: Option<Either<Box<Schema>, bool>>,
    pub discriminator: Option<String>,
    pub read_only: Option<bool>,
    pub xml: Option<Xml>,
    pub external_docs: Option<ExternalDocumentation>,
    pub example: Option<Value>,
    pub extensions: Extensions,
    core: core::Schema,
}

impl Schema {
    pub(crate) fn from_core(mut core: core::Schema) -> Self {
        Self {
            reference: core.r#ref.value.clone(),
            format: core.format.value.clone(),
            title: core.title.value.clone(),
            description: core.description.value.clone(),
            default: core.default.value.clone(),
            multiple_of: core.multiple_of.value,
            maximum: core.maximum.value,
            exclusive_maximum: core.exclusive_maximum.value.clone(),
            minimum: core.minimum.value,
            exclusive_minimum: core.exclusive_minimum.value.clone(),
            max_length: core.max_length.value,
            min_length: core.min_length.value,
            pattern: core.pattern.value.clone(),
            max_items: core.max_items.value,
            min_items: core.min_items.value,
            unique_items: core.unique_items.value,
            max_properties: core.max_properties.value,
            min_properties: core.min_properties.value,
            required: core.required.value.clone(),
            r#enum: core.r#enum.value.clone(),
            r#type: core.r#type.value.clone(),
            items: core
                .items
                .take_opt()
                .map(|boxed| Box::new(Schema::from_core(*boxed))),
            all_of: core
                .all_of
                .take_opt()
                .map(|v| v.into_iter().map(Schema::from_core).collect()),
            properties: core
                .properties
                .take_opt()
                .map(|m| map_values(m, Schema::from_core)),
            additional_properties: match core.additional_properties.value.take() {
                None => None,
                Some(Either::Left(boxed)) => {
                    Some(Either::Left(Box::new(Schema::from_core(*boxed))))
                }
                Some(Either::Right(flag)) => {
                    // Keep the bool branch carried in the core for diffing.
                    core.additional_properties.value = Some(Either::Right(flag));
                    Some(Either::Right(flag))
                }
            },
            discriminator: core.discriminator.value.clone(),
            read_only: core.read_only.value,
            xml: core.xml.take_opt().map(Xml::from_core),
            external_docs: core
                .external_docs
                .take_opt()
                .map(ExternalDocumentation::from_core),
            example: core.example.value.clone(),
            extensions: std::mem::take(&mut core.extensions),
            core,
        }
    }

    root_helpers!(core::Schema);

    /// True when this schema is a `$ref`.
    pub fn is_reference(&self) -> bool {
        self.reference.is_some()
    }

    /// The single `type` string, regardless of which branch carries it.
    pub fn type_str(&self) -> Option<&str> {
        match self.r#type.as_ref()? {
            Either::Left(types) => types.first().map(String::as_str),
            Either::Right(single) => Some(single.as_str()),
        }
    }

    pub fn format(&self) -> &str {
        self.format.as_deref().unwrap_or_default()
    }

    pub fn properties(&self) -> impl Iterator<Item = (&String, &Schema)> {
        self.properties.iter().flat_map(|m| m.iter())
    }

    pub fn validate(&self, opts: &ValidationOptions) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        if let Some(type_field) = &self.r#type {
            let names: Vec<&str> = match type_field {
                Either::Left(list) => list.iter().map(String::as_str).collect(),
                Either::Right(one) => vec![one.as_str()],
            };
            for name in names {
                if !SCHEMA_TYPES.contains(&name) {
                    errors.push(ValidationError::new(
                        Rule::InvalidSchema,
                        format!("schema.type value `{name}` is not a JSON Schema type"),
                        self.core.r#type.value_node.as_ref(),
                    ));
                }
            }
        }
        if self.type_str() == Some("array") && self.items.is_none() && self.reference.is_none() {
            errors.push(ValidationError::new(
                Rule::InvalidSchema,
                "schema.items is required when schema.type is array",
                self.core.r#type.value_node.as_ref(),
            ));
        }
        if let Some(items) = &self.items {
            errors.extend(items.validate(opts));
        }
        if let Some(all_of) = &self.all_of {
            for schema in all_of {
                errors.extend(schema.validate(opts));
            }
        }
        if let Some(properties) = &self.properties {
            for (_, schema) in properties.iter() {
                errors.extend(schema.validate(opts));
            }
        }
        if let Some(Either::Left(schema)) = &self.additional_properties {
            errors.extend(schema.validate(opts));
        }
        if let Some(docs) = &self.external_docs {
            errors.extend(docs.validate(opts));
        }
        errors
    }

    pub(crate) fn sync(&mut self) -> Result<(), Error> {
        let root = self.ensure_root();
        sync_field(&root, "$ref", self.reference.as_ref(), &mut self.core.r#ref)?;
        sync_field(&root, "format", self.format.as_ref(), &mut self.core.format)?;
        sync_field(&root, "title", self.title.as_ref(), &mut self.core.title)?;
        sync_field(&root, "description", self.description.as_ref(), &mut self.core.description)?;
        sync_field(&root, "default", self.default.as_ref(), &mut self.core.default)?;
        sync_field(&root, "multipleOf", self.multiple_of.as_ref(), &mut self.core.multiple_of)?;
        sync_field(&root, "maximum", self.maximum.as_ref(), &mut self.core.maximum)?;
        sync_field(
            &root,
            "exclusiveMaximum",
            self.exclusive_maximum.as_ref(),
            &mut self.core.exclusive_maximum,
        )?;
        sync_field(&root, "minimum", self.minimum.as_ref(), &mut self.core.minimum)?;
        sync_field(
            &root,
            "exclusiveMinimum",
            self.exclusive_minimum.as_ref(),
            &mut self.core.exclusive_minimum,
        )?;
        sync_field(&root, "maxLength", self.max_length.as_ref(), &mut self.core.max_length)?;
        sync_field(&root, "minLength", self.min_length.as_ref(), &mut self.core.min_length)?;
        sync_field(&root, "pattern", self.pattern.as_ref(), &mut self.core.pattern)?;
        sync_field(&root, "maxItems", self.max_items.as_ref(), &mut self.core.max_items)?;
        sync_field(&root, "minItems", self.min_items.as_ref(), &mut self.core.min_items)?;
        sync_field(&root, "uniqueItems", self.unique_items.as_ref(), &mut self.core.unique_items)?;
        sync_field(
            &root,
            "maxProperties",
            self.max_properties.as_ref(),
            &mut self.core.max_properties,
        )?;
        sync_field(
            &root,
            "minProperties",
            self.min_properties.as_ref(),
            &mut self.core.min_properties,
        )?;
        sync_field(&root, "required", self.required.as_ref(), &mut self.core.required)?;
        sync_field(&root, "enum", self.r#enum.as_ref(), &mut self.core.r#enum)?;
        sync_field(&root, "type", self.r#type.as_ref(), &mut self.core.r#type)?;
        match &mut self.items {
            Some(items) => {
                items.sync()?;
                attach_child(&root, "items", &items.core_root());
            }
            None => {
                node::mapping_delete(&root, "items");
            }
        }
        match &mut self.all_of {
            Some(all_of) => {
                let mut nodes = Vec::with_capacity(all_of.len());
                for schema in all_of.iter_mut() {
                    schema.sync()?;
                    nodes.push(schema.core_root());
                }
                let seq = ensure_seq_node(&root, "allOf");
                sync_seq_node(&seq, nodes);
            }
            None => {
                node::mapping_delete(&root, "allOf");
            }
        }
        match &mut self.properties {
            Some(properties) => {
                let mut desired = Vec::with_capacity(properties.len());
                for (key, schema) in properties.iter_mut() {
                    schema.sync()?;
                    desired.push((key.clone(), schema.core_root()));
                }
                let map_node = ensure_map_node(&root, "properties");
                sync_map_node(&map_node, &desired)?;
            }
            None => {
                node::mapping_delete(&root, "properties");
            }
        }
        match &mut self.additional_properties {
            Some(Either::Left(schema)) => {
                schema.sync()?;
                attach_child(&root, "additionalProperties", &schema.core_root());
            }
            Some(Either::Right(flag)) => {
                let desired = *flag;
                let unchanged = matches!(
                    self.core.additional_properties.value.as_ref(),
                    Some(Either::Right(carried)) if *carried == desired
                );
                if !unchanged {
                    let fresh = crate::node::Node::plain(if desired { "true" } else { "false" });
                    let key_node = node::mapping_set(&root, "additionalProperties", fresh.clone());
                    self.core.additional_properties =
                        crate::marshal::NodeField::of(Either::Right(desired), key_node, fresh);
                }
            }
            None => {
                node::mapping_delete(&root, "additionalProperties");
            }
        }
        sync_field(
            &root,
            "discriminator",
            self.discriminator.as_ref(),
            &mut self.core.discriminator,
        )?;
        sync_field(&root, "readOnly", self.read_only.as_ref(), &mut self.core.read_only)?;
        match &mut self.xml {
            Some(xml) => {
                xml.sync()?;
                attach_child(&root, "xml", &xml.core_root());
            }
            None => {
                node::mapping_delete(&root, "xml");
            }
        }
        match &mut self.external_docs {
            Some(docs) => {
                docs.sync()?;
                attach_child(&root, "externalDocs", &docs.core_root());
            }
            None => {
                node::mapping_delete(&root, "externalDocs");
            }
        }
        sync_field(&root, "example", self.example.as_ref(), &mut self.core.example)?;
        self.extensions.sync_into(&root)
    }
}

/// XML representation fine-tuning for a schema property.
#[derive(Clone, Debug, Default)]
pub struct Xml {
    pub name: Option<String>,
    pub namespace: Option<String>,
    pub prefix: Option<String>,
    pub attribute: Option<bool>,
    pub wrapped: Option<bool>,
    pub extensions: Extensions,
    core: core::Xml,
}

impl Xml {
    pub(crate) fn from_core(mut core: core::Xml) -> Self {
        Self {
            name: core.name.value.clone(),
            namespace: core.namespace.value.clone(),
            prefix: core.prefix.value.clone(),
            attribute: core.attribute.value,
            wrapped: core.wrapped.value,
            extensions: std::mem::take(&mut core.extensions),
            core,
        }
    }

    root_helpers!(core::Xml);

    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or_default()
    }

    pub fn validate(&self, _opts: &ValidationOptions) -> Vec<ValidationError> {
        Vec::new()
    }

    pub(crate) fn sync(&mut self) -> Result<(), Error> {
        let root = self.ensure_root();
        sync_field(&root, "name", self.name.as_ref(), &mut self.core.name)?;
        sync_field(&root, "namespace", self.namespace.as_ref(), &mut self.core.namespace)?;
        sync_field(&root, "prefix", self.prefix.as_ref(), &mut self.core.prefix)?;
        sync_field(&root, "attribute", self.attribute.as_ref(), &mut self.core.attribute)?;
        sync_field(&root, "wrapped", self.wrapped.as_ref(), &mut self.core.wrapped)?;
        self.extensions.sync_into(&root)
    }
}
