//! Wire shape of the JSON Schema variant Swagger embeds (the
//! OAS3-compatible subset), including the polymorphic fields:
//! `type` (list of strings or single string), `exclusiveMaximum` /
//! `exclusiveMinimum` (boolean or number), `additionalProperties`
//! (schema or boolean).

use crate::marshal::macros::{core_object, core_required};
use crate::marshal::Either;
use crate::seqmap::SequencedMap;
use crate::value::Value;

use super::ExternalDocumentation;

core_object! {
    /// A JSON Schema definition. `$ref` stays a string; resolution is a
    /// deliberate, on-demand operation so self-referential schemas keep the
    /// object graph acyclic.
    pub struct Schema, model = "schema" {
        r#ref: String, key = "$ref";
        format: String, key = "format";
        title: String, key = "title";
        description: String, key = "description";
        default: Value, key = "default";
        multiple_of: f64, key = "multipleOf";
        maximum: f64, key = "maximum";
        exclusive_maximum: Either<bool, f64>, key = "exclusiveMaximum";
        minimum: f64, key = "minimum";
        exclusive_minimum: Either<bool, f64>, key = "exclusiveMinimum";
        max_length: i64, key = "maxLength";
        min_length: i64, key = "minLength";
        pattern: String, key = "pattern";
        max_items: i64, key = "maxItems";
        min_items: i64, key = "minItems";
        unique_items: bool, key = "uniqueItems";
        max_properties: i64, key = "maxProperties";
        min_properties: i64, key = "minProperties";
        required: Vec<String>, key = "required";
        r#enum: Vec<Value>, key = "enum";
        r#type: Either<Vec<String>, String>, key = "type";
        items: Box<Schema>, key = "items";
        all_of: Vec<Schema>, key = "allOf";
        properties: SequencedMap<String, Schema>, key = "properties";
        additional_properties: Either<Box<Schema>, bool>, key = "additionalProperties";
        discriminator: String, key = "discriminator";
        read_only: bool, key = "readOnly";
        xml: Xml, key = "xml";
        external_docs: ExternalDocumentation, key = "externalDocs";
        example: Value, key = "example";
    }
}

core_object! {
    /// Fine-tuning of XML representations for a schema property.
    pub struct Xml, model = "xml" {
        name: String, key = "name";
        namespace: String, key = "namespace";
        prefix: String, key = "prefix";
        attribute: bool, key = "attribute";
        wrapped: bool, key = "wrapped";
    }
}
