//! Wire shape of parameters and the primitive `items` descriptor.

use crate::marshal::macros::{core_object, core_required};
use crate::value::Value;

use super::Schema;

core_object! {
    /// A single operation parameter. Body parameters carry `schema`;
    /// non-body parameters describe a primitive with `type`/`format` and
    /// the numeric constraint fields.
    pub struct Parameter, model = "parameter" {
        name: String, key = "name", required;
        r#in: String, key = "in", required;
        description: String, key = "description";
        required: bool, key = "required";
        schema: Box<Schema>, key = "schema";
        r#type: String, key = "type";
        format: String, key = "format";
        allow_empty_value: bool, key = "allowEmptyValue";
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

core_object! {
    /// Limited JSON-Schema subset describing array items of non-body
    /// parameters and headers.
    pub struct Items, model = "items" {
        r#type: String, key = "type";
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
