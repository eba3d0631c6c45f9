//! High-level responses container, single responses and headers.

use crate::core;
use crate::error::Error;
use crate::marshal::field::sync_field;
use crate::marshal::{Extensions, Reference};
use crate::node::{self, NodeRef};
use crate::seqmap::SequencedMap;
use crate::validation::{Rule, ValidationError, ValidationOptions};
use crate::value::Value;

use super::{
    attach_child, ensure_map_node, map_reference, map_values, root_helpers, sync_map_node,
    sync_reference, Items, Schema,
};

const HEADER_TYPES: &[&str] = &["string", "number", "integer", "boolean", "array"];

/// The possible responses of an operation: a typed ordered map from status
/// code to (possibly referenced) response, plus the optional `default`.
#[derive(Clone, Debug, Default)]
pub struct Responses {
    pub default: Option<Reference<Response>>,
    codes: SequencedMap<String, Reference<Response>>,
    pub extensions: Extensions,
    core: core::Responses,
}

impl Responses {
    /// An initialized empty container; serializes as `{}` rather than
    /// being omitted.
    pub fn new() -> Self {
        Responses {
            default: None,
            codes: SequencedMap::new(),
            extensions: Extensions::default(),
            core: core::Responses::default(),
        }
    }

    pub(crate) fn from_core(mut core: core::Responses) -> Self {
        let codes = std::mem::take(&mut core.codes);
        Responses {
            default: core
                .default
                .take_opt()
                .map(|r| map_reference(r, Response::from_core)),
            codes: map_values(codes, |r| map_reference(r, Response::from_core)),
            extensions: std::mem::take(&mut core.extensions),
            core,
        }
    }

    root_helpers!(core::Responses);

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    pub fn get(&self, code: &str) -> Option<&Reference<Response>> {
        self.codes.get(&code.to_owned())
    }

    pub fn set<K: Into<String>>(&mut self, code: K, response: Reference<Response>) {
        self.codes.set(code.into(), response);
    }

    pub fn delete(&mut self, code: &str) -> bool {
        self.codes.delete(&code.to_owned()).is_some()
    }

    /// Status-code entries in document order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Reference<Response>)> {
        self.codes.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&String, &mut Reference<Response>)> {
        self.codes.iter_mut()
    }

    pub fn validate(&self, opts: &ValidationOptions) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        if self.codes.is_empty() && self.default.is_none() {
            errors.push(ValidationError::new(
                Rule::RequiredField,
                "operation.responses must contain at least one response code or default",
                self.core.core.root.as_ref(),
            ));
        }
        if let Some(default) = &self.default {
            if let Some(response) = default.inline() {
                errors.extend(response.validate(opts));
            }
        }
        for (_, response) in self.codes.iter() {
            if let Some(response) = response.inline() {
                errors.extend(response.validate(opts));
            }
        }
        errors
    }

    pub(crate) fn sync(&mut self) -> Result<(), Error> {
        let root = self.ensure_root();
        let mut desired: Vec<(String, NodeRef)> = Vec::with_capacity(self.codes.len() + 1);
        for (code, response) in self.codes.iter_mut() {
            let node = sync_reference(response, |inline| {
                inline.sync()?;
                Ok(inline.core_root())
            })?;
            desired.push((code.clone(), node));
        }
        if let Some(default) = &mut self.default {
            let node = sync_reference(default, |inline| {
                inline.sync()?;
                Ok(inline.core_root())
            })?;
            desired.push(("default".to_owned(), node));
        } else {
            node::mapping_delete(&root, "default");
        }
        // Response codes conventionally keep their quotes; `default` is a
        // keyword and stays plain.
        super::sync_map_node_with_keys(&root, &desired, |key| {
            if key == "default" {
                crate::node::Node::plain(key)
            } else {
                crate::node::Node::scalar(key, crate::node::Style::DoubleQuoted)
            }
        })?;
        self.extensions.sync_into(&root)
    }
}

/// A single response from an operation.
#[derive(Clone, Debug, Default)]
pub struct Response {
    pub description: Option<String>,
    pub schema: Option<Box<Schema>>,
    pub headers: Option<SequencedMap<String, Header>>,
    pub examples: Option<SequencedMap<String, Value>>,
    pub extensions: Extensions,
    core: core::Response,
}

impl Response {
    pub(crate) fn from_core(mut core: core::Response) -> Self {
        Self {
            description: core.description.value.clone(),
            schema: core
                .schema
                .take_opt()
                .map(|boxed| Box::new(Schema::from_core(*boxed))),
            headers: core
                .headers
                .take_opt()
                .map(|m| map_values(m, Header::from_core)),
            examples: core.examples.value.clone(),
            extensions: std::mem::take(&mut core.extensions),
            core,
        }
    }

    root_helpers!(core::Response);

    pub fn description(&self) -> &str {
        self.description.as_deref().unwrap_or_default()
    }

    pub fn schema(&self) -> Option<&Schema> {
        self.schema.as_deref()
    }

    pub fn validate(&self, opts: &ValidationOptions) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        if let Some(schema) = &self.schema {
            errors.extend(schema.validate(opts));
        }
        if let Some(headers) = &self.headers {
            for (_, header) in headers.iter() {
                errors.extend(header.validate(opts));
            }
        }
        errors
    }

    pub(crate) fn sync(&mut self) -> Result<(), Error> {
        let root = self.ensure_root();
        sync_field(&root, "description", self.description.as_ref(), &mut self.core.description)?;
        match &mut self.schema {
            Some(schema) => {
                schema.sync()?;
                attach_child(&root, "schema", &schema.core_root());
            }
            None => {
                node::mapping_delete(&root, "schema");
            }
        }
        match &mut self.headers {
            Some(headers) => {
                let mut desired = Vec::with_capacity(headers.len());
                for (name, header) in headers.iter_mut() {
                    header.sync()?;
                    desired.push((name.clone(), header.core_root()));
                }
                let map_node = ensure_map_node(&root, "headers");
                sync_map_node(&map_node, &desired)?;
            }
            None => {
                node::mapping_delete(&root, "headers");
            }
        }
        sync_field(&root, "examples", self.examples.as_ref(), &mut self.core.examples)?;
        self.extensions.sync_into(&root)
    }
}

/// A header sent with a response.
#[derive(Clone, Debug, Default)]
pub struct Header {
    pub description: Option<String>,
    pub r#type: Option<String>,
    pub format: Option<String>,
    pub items: Option<Box<Items>>,
    pub collection_format: Option<String>,
    pub default: Option<Value>,
    pub maximum: Option<f64>,
    pub exclusive_maximum: Option<bool>,
    pub minimum: Option<f64>,
    pub exclusive_minimum: Option<bool>,
    pub max_length: Option<i64>,
    pub min_length: Option<i64>,
    pub pattern: Option<String>,
    pub max_items: Option<i64>,
    pub min_items: Option<i64>,
    pub unique_items: Option<bool>,
    pub r#enum: Option<Vec<Value>>,
    pub multiple_of: Option<f64>,
    pub extensions: Extensions,
    core: core::Header,
}

impl Header {
    pub(crate) fn from_core(mut core: core::Header) -> Self {
        Self {
            description: core.description.value.clone(),
            r#type: core.r#type.value.clone(),
            format: core.format.value.clone(),
            items: core
                .items
                .take_opt()
                .map(|boxed| Box::new(Items::from_core(*boxed))),
            collection_format: core.collection_format.value.clone(),
            default: core.default.value.clone(),
            maximum: core.maximum.value,
            exclusive_maximum: core.exclusive_maximum.value,
            minimum: core.minimum.value,
            exclusive_minimum: core.exclusive_minimum.value,
            max_length: core.max_length.value,
            min_length: core.min_length.value,
            pattern: core.pattern.value.clone(),
            max_items: core.max_items.value,
            min_items: core.min_items.value,
            unique_items: core.unique_items.value,
            r#enum: core.r#enum.value.clone(),
            multiple_of: core.multiple_of.value,
            extensions: std::mem::take(&mut core.extensions),
            core,
        }
    }

    root_helpers!(core::Header);

    pub fn type_str(&self) -> &str {
        self.r#type.as_deref().unwrap_or_default()
    }

    pub fn validate(&self, opts: &ValidationOptions) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        if let Some(type_name) = &self.r#type {
            if !HEADER_TYPES.contains(&type_name.as_str()) {
                errors.push(ValidationError::new(
                    Rule::AllowedValues,
                    format!(
                        "header.type must be one of string, number, integer, boolean, array; got `{type_name}`"
                    ),
                    self.core.r#type.value_node.as_ref(),
                ));
            }
        }
        if self.type_str() == "array" && self.items.is_none() {
            errors.push(ValidationError::new(
                Rule::RequiredField,
                "header.items is required when header.type is array",
                self.core.r#type.value_node.as_ref(),
            ));
        }
        if let Some(items) = &self.items {
            errors.extend(items.validate(opts));
        }
        errors
    }

    pub(crate) fn sync(&mut self) -> Result<(), Error> {
        let root = self.ensure_root();
        sync_field(&root, "description", self.description.as_ref(), &mut self.core.description)?;
        sync_field(&root, "type", self.r#type.as_ref(), &mut self.core.r#type)?;
        sync_field(&root, "format", self.format.as_ref(), &mut self.core.format)?;
        match &mut self.items {
            Some(items) => {
                items.sync()?;
                attach_child(&root, "items", &items.core_root());
            }
            None => {
                node::mapping_delete(&root, "items");
            }
        }
        sync_field(
            &root,
            "collectionFormat",
            self.collection_format.as_ref(),
            &mut self.core.collection_format,
        )?;
        sync_field(&root, "default", self.default.as_ref(), &mut self.core.default)?;
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
        sync_field(&root, "enum", self.r#enum.as_ref(), &mut self.core.r#enum)?;
        sync_field(&root, "multipleOf", self.multiple_of.as_ref(), &mut self.core.multiple_of)?;
        self.extensions.sync_into(&root)
    }
}
