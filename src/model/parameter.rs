//! High-level parameters and the primitive `items` descriptor, with the
//! densest rule set of the specification.

use crate::core;
use crate::error::Error;
use crate::marshal::field::sync_field;
use crate::marshal::Extensions;
use crate::node;
use crate::validation::{Rule, ValidationError, ValidationOptions};
use crate::value::Value;

use super::operation::OperationMediaTypes;
use super::{attach_child, root_helpers, Schema};

const PARAMETER_LOCATIONS: &[&str] = &["query", "header", "path", "formData", "body"];
const PARAMETER_TYPES: &[&str] = &["string", "number", "integer", "boolean", "array", "file"];
const ITEM_TYPES: &[&str] = &["string", "number", "integer", "boolean", "array"];
const COLLECTION_FORMATS: &[&str] = &["csv", "ssv", "tsv", "pipes", "multi"];
const FORM_MEDIA_TYPES: &[&str] = &["multipart/form-data", "application/x-www-form-urlencoded"];

/// A single operation parameter.
#[derive(Clone, Debug, Default)]
pub struct Parameter {
    pub name: Option<String>,
    pub r#in: Option<String>,
    pub description: Option<String>,
    pub required: Option<bool>,
    pub schema: Option<Box<Schema>>,
    pub r#type: Option<String>,
    pub format: Option<String>,
    pub allow_empty_value: Option<bool>,
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
    core: core::Parameter,
}

impl Parameter {
    pub(crate) fn from_core(mut core: core::Parameter) -> Self {
        Self {
            name: core.name.value.clone(),
            r#in: core.r#in.value.clone(),
            description: core.description.value.clone(),
            required: core.required.value,
            schema: core
                .schema
                .take_opt()
                .map(|boxed| Box::new(Schema::from_core(*boxed))),
            r#type: core.r#type.value.clone(),
            format: core.format.value.clone(),
            allow_empty_value: core.allow_empty_value.value,
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

    root_helpers!(core::Parameter);

    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or_default()
    }

    /// Where the parameter lives (`query`, `header`, `path`, `formData`,
    /// `body`).
    pub fn location(&self) -> &str {
        self.r#in.as_deref().unwrap_or_default()
    }

    pub fn required(&self) -> bool {
        self.required.unwrap_or(false)
    }

    pub fn type_str(&self) -> &str {
        self.r#type.as_deref().unwrap_or_default()
    }

    pub fn format(&self) -> &str {
        self.format.as_deref().unwrap_or_default()
    }

    /// Collection format, defaulted the way the specification reads it.
    pub fn collection_format(&self) -> &str {
        self.collection_format.as_deref().unwrap_or("csv")
    }

    pub fn schema(&self) -> Option<&Schema> {
        self.schema.as_deref()
    }

    pub fn validate(&self, opts: &ValidationOptions) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        let location = self.location();
        let at_in = self.core.r#in.value_node.as_ref();
        let at_root = self.core.core.root.as_ref();

        if self.r#in.is_some() && !PARAMETER_LOCATIONS.contains(&location) {
            errors.push(ValidationError::new(
                Rule::AllowedValues,
                format!(
                    "parameter.in must be one of query, header, path, formData, body; got `{location}`"
                ),
                at_in,
            ));
            return errors;
        }
        if location == "body" {
            if self.schema.is_none() {
                errors.push(ValidationError::new(
                    Rule::RequiredField,
                    "parameter.schema is required for body parameters",
                    at_root,
                ));
            }
        } else if self.r#in.is_some() {
            match &self.r#type {
                None => errors.push(ValidationError::new(
                    Rule::RequiredField,
                    "parameter.type is required for non-body parameters",
                    at_root,
                )),
                Some(type_name) => {
                    if !PARAMETER_TYPES.contains(&type_name.as_str()) {
                        errors.push(ValidationError::new(
                            Rule::AllowedValues,
                            format!(
                                "parameter.type must be one of string, number, integer, boolean, array, file; got `{type_name}`"
                            ),
                            self.core.r#type.value_node.as_ref(),
                        ));
                    }
                }
            }
        }
        if location == "path" && self.required != Some(true) {
            errors.push(ValidationError::new(
                Rule::RequiredField,
                format!(
                    "parameter.in=path requires required=true for parameter `{}`",
                    self.name()
                ),
                at_root,
            ));
        }
        if self.type_str() == "file" {
            if location != "formData" {
                errors.push(ValidationError::new(
                    Rule::AllowedValues,
                    "parameter.type=file is allowed only for formData parameters",
                    self.core.r#type.value_node.as_ref(),
                ));
            }
            if let Some(media) = opts.get::<OperationMediaTypes>() {
                let has_form = media
                    .consumes
                    .iter()
                    .any(|mt| FORM_MEDIA_TYPES.contains(&mt.as_str()));
                if !has_form {
                    errors.push(ValidationError::new(
                        Rule::AllowedValues,
                        "parameter.type=file requires operation.consumes to include \
                         multipart/form-data or application/x-www-form-urlencoded",
                        self.core.r#type.value_node.as_ref(),
                    ));
                }
            }
        }
        if self.type_str() == "array" && self.items.is_none() {
            errors.push(ValidationError::new(
                Rule::RequiredField,
                "parameter.items is required when parameter.type is array",
                self.core.r#type.value_node.as_ref(),
            ));
        }
        if self.allow_empty_value.is_some() && !matches!(location, "query" | "formData") {
            errors.push(ValidationError::new(
                Rule::AllowedValues,
                "parameter.allowEmptyValue is allowed only for query or formData parameters",
                self.core.allow_empty_value.key_node.as_ref(),
            ));
        }
        if let Some(collection_format) = &self.collection_format {
            if !COLLECTION_FORMATS.contains(&collection_format.as_str()) {
                errors.push(ValidationError::new(
                    Rule::AllowedValues,
                    format!(
                        "parameter.collectionFormat must be one of csv, ssv, tsv, pipes, multi; got `{collection_format}`"
                    ),
                    self.core.collection_format.value_node.as_ref(),
                ));
            } else if collection_format == "multi" && !matches!(location, "query" | "formData") {
                errors.push(ValidationError::new(
                    Rule::AllowedValues,
                    "parameter.collectionFormat=multi is allowed only for query or formData parameters",
                    self.core.collection_format.value_node.as_ref(),
                ));
            }
        }
        if let Some(schema) = &self.schema {
            errors.extend(schema.validate(opts));
        }
        if let Some(items) = &self.items {
            errors.extend(items.validate(opts));
        }
        errors
    }

    pub(crate) fn sync(&mut self) -> Result<(), Error> {
        let root = self.ensure_root();
        sync_field(&root, "name", self.name.as_ref(), &mut self.core.name)?;
        sync_field(&root, "in", self.r#in.as_ref(), &mut self.core.r#in)?;
        sync_field(&root, "description", self.description.as_ref(), &mut self.core.description)?;
        sync_field(&root, "required", self.required.as_ref(), &mut self.core.required)?;
        match &mut self.schema {
            Some(schema) => {
                schema.sync()?;
                attach_child(&root, "schema", &schema.core_root());
            }
            None => {
                node::mapping_delete(&root, "schema");
            }
        }
        sync_field(&root, "type", self.r#type.as_ref(), &mut self.core.r#type)?;
        sync_field(&root, "format", self.format.as_ref(), &mut self.core.format)?;
        sync_field(
            &root,
            "allowEmptyValue",
            self.allow_empty_value.as_ref(),
            &mut self.core.allow_empty_value,
        )?;
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

/// Array item descriptor for non-body parameters and headers.
#[derive(Clone, Debug, Default)]
pub struct Items {
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
    core: core::Items,
}

impl Items {
    pub(crate) fn from_core(mut core: core::Items) -> Self {
        Self {
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

    root_helpers!(core::Items);

    pub fn type_str(&self) -> &str {
        self.r#type.as_deref().unwrap_or_default()
    }

    pub fn format(&self) -> &str {
        self.format.as_deref().unwrap_or_default()
    }

    pub fn validate(&self, opts: &ValidationOptions) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        match &self.r#type {
            None => errors.push(ValidationError::new(
                Rule::RequiredField,
                "items.type is missing",
                self.core.core.root.as_ref(),
            )),
            Some(type_name) => {
                if !ITEM_TYPES.contains(&type_name.as_str()) {
                    errors.push(ValidationError::new(
                        Rule::AllowedValues,
                        format!(
                            "items.type must be one of string, number, integer, boolean, array; got `{type_name}`"
                        ),
                        self.core.r#type.value_node.as_ref(),
                    ));
                }
            }
        }
        if self.type_str() == "array" && self.items.is_none() {
            errors.push(ValidationError::new(
                Rule::RequiredField,
                "items.items is required when items.type is array",
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
