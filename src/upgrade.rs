//!
//! The Swagger 2.0 → OpenAPI 3.0 upgrade: a pure re-projection of the
//! parsed model into a freshly built [`crate::openapi3::OpenApi`].
//!
//! Nothing in the source document is mutated; every carried subtree is a
//! deep clone with its `#/definitions/` (and component) reference targets
//! rewritten. Component-map keys respect input order; path keys are emitted
//! sorted so repeated upgrades of the same input are textually stable.

use itertools::Itertools;

use crate::model;
use crate::node::{self, Node, NodeKind, NodeRef, Style};
use crate::openapi3::{
    Components, Header, MediaType, OAuthFlow, OAuthFlows, OpenApi, Operation, Parameter, PathItem,
    RequestBody, Response, SecurityScheme, Server,
};
use crate::value::Value;

const DEFAULT_MEDIA_TYPE: &str = "application/json";
const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";
const MULTIPART_FORM: &str = "multipart/form-data";

/// Upgrade a parsed Swagger 2.0 document into the OpenAPI 3.0 shape.
pub fn upgrade(doc: &model::Swagger) -> OpenApi {
    tracing::debug!("upgrading document to OpenAPI 3.0");
    let mut out = OpenApi {
        openapi: "3.0.0".to_owned(),
        config: *doc.config(),
        ..OpenApi::default()
    };

    if let Some(info) = &doc.info {
        out.info = Some(rewrite_refs(&info.core_root()));
    }
    if let Some(docs) = &doc.external_docs {
        out.external_docs = Some(rewrite_refs(&docs.core_root()));
    }
    out.servers = build_servers(doc);
    if let Some(tags) = &doc.tags {
        out.tags = tags.iter().map(|t| rewrite_refs(&t.core_root())).collect();
    }
    if let Some(security) = &doc.security {
        out.security = security.iter().map(|s| rewrite_refs(&s.core_root())).collect();
    }
    for (key, field) in doc.extensions.iter() {
        if let Some(value) = &field.value {
            out.extensions.push((key.clone(), value.to_node()));
        }
    }

    if let Some(definitions) = &doc.definitions {
        for (name, schema) in definitions.iter() {
            out.components
                .schemas
                .push((name.clone(), rewrite_refs(&schema.core_root())));
        }
    }
    upgrade_global_parameters(doc, &mut out.components);
    if let Some(responses) = &doc.responses {
        for (name, response) in responses.iter() {
            out.components
                .responses
                .push((name.clone(), upgrade_response(response, doc, None)));
        }
    }
    if let Some(definitions) = &doc.security_definitions {
        for (name, scheme) in definitions.iter() {
            out.components
                .security_schemes
                .push((name.clone(), upgrade_security_scheme(scheme)));
        }
    }

    if let Some(paths) = doc.paths() {
        // Sorted path strings keep the upgraded output stable.
        for path in paths.iter().map(|(p, _)| p.clone()).sorted() {
            let Some(item) = paths.get(&path) else { continue };
            let Some(item) = item.inline() else { continue };
            out.paths.push((path.clone(), upgrade_path_item(item, doc)));
        }
    }
    out
}

/// `host` + `basePath` + `schemes` → one server per scheme. No host, no
/// servers.
fn build_servers(doc: &model::Swagger) -> Vec<Server> {
    let host = doc.host();
    if host.is_empty() {
        return Vec::new();
    }
    let base_path = match doc.base_path() {
        "" => "/",
        other => other,
    };
    let schemes: Vec<&str> = if doc.schemes().is_empty() {
        vec!["https"]
    } else {
        doc.schemes().iter().map(String::as_str).collect()
    };
    schemes
        .into_iter()
        .map(|scheme| Server {
            url: format!("{scheme}://{host}{base_path}"),
        })
        .collect()
}

/// Global `parameters`: non-body entries become component parameters, body
/// entries become component request bodies (one media type per element of
/// global `consumes`).
fn upgrade_global_parameters(doc: &model::Swagger, components: &mut Components) {
    let Some(parameters) = &doc.parameters else { return };
    for (name, parameter) in parameters.iter() {
        if parameter.location() == "body" {
            let media_types = media_types_or_default(doc.consumes());
            components
                .request_bodies
                .push((name.clone(), body_request_body(parameter, &media_types)));
        } else {
            components
                .parameters
                .push((name.clone(), upgrade_parameter(parameter)));
        }
    }
}

fn upgrade_path_item(item: &model::PathItem, doc: &model::Swagger) -> PathItem {
    let mut out = PathItem::default();
    if let Some(parameters) = &item.parameters {
        for parameter in parameters {
            if let Some(converted) = upgrade_parameter_entry(parameter, doc) {
                out.parameters.push(converted);
            }
        }
    }
    for (method, operation) in item.operations() {
        out.operations
            .push((method.to_owned(), upgrade_operation(operation, doc)));
    }
    for (key, field) in item.extensions.iter() {
        if let Some(value) = &field.value {
            out.extensions.push((key.clone(), value.to_node()));
        }
    }
    out
}

fn upgrade_operation(operation: &model::Operation, doc: &model::Swagger) -> Operation {
    let mut out = Operation {
        tags: operation.tags.clone(),
        summary: operation.summary.clone(),
        description: operation.description.clone(),
        external_docs: operation
            .external_docs
            .as_ref()
            .map(|d| rewrite_refs(&d.core_root())),
        operation_id: operation.operation_id.clone(),
        deprecated: operation.deprecated,
        ..Operation::default()
    };
    if let Some(security) = &operation.security {
        out.security = security.iter().map(|s| rewrite_refs(&s.core_root())).collect();
    }
    for (key, field) in operation.extensions.iter() {
        if let Some(value) = &field.value {
            out.extensions.push((key.clone(), value.to_node()));
        }
    }

    // Split the 2.0 parameter list: body and formData fold into the request
    // body, the rest carry over.
    let consumes = operation_consumes(operation, doc);
    let mut form_fields: Vec<&model::Parameter> = Vec::new();
    for holder in operation.parameters() {
        if let Some(reference) = holder.reference() {
            if let Some(converted) = upgrade_parameter_ref(reference, doc) {
                match converted {
                    UpgradedRef::Parameter(p) => out.parameters.push(p),
                    UpgradedRef::RequestBody(b) => out.request_body = Some(b),
                }
            }
            continue;
        }
        let Some(parameter) = holder.inline() else { continue };
        match parameter.location() {
            "body" => {
                out.request_body = Some(body_request_body(parameter, &consumes));
            }
            "formData" => form_fields.push(parameter),
            _ => out.parameters.push(upgrade_parameter(parameter)),
        }
    }
    if !form_fields.is_empty() {
        out.request_body = Some(form_request_body(&form_fields));
    }

    if let Some(responses) = operation.responses() {
        for (code, holder) in responses.iter() {
            out.responses
                .push((code.clone(), upgrade_response_entry(holder, doc, Some(operation))));
        }
        if let Some(default) = &responses.default {
            out.responses
                .push(("default".to_owned(), upgrade_response_entry(default, doc, Some(operation))));
        }
    }
    out
}

enum UpgradedRef {
    Parameter(Parameter),
    RequestBody(RequestBody),
}

/// `#/parameters/X` references become `#/components/parameters/X`, unless
/// the target is a body parameter, which lives under request bodies now.
fn upgrade_parameter_ref(reference: &str, doc: &model::Swagger) -> Option<UpgradedRef> {
    let name = reference.strip_prefix("#/parameters/")?;
    let is_body = doc
        .parameters
        .as_ref()
        .and_then(|m| m.get(&name.to_owned()))
        .map(|p| p.location() == "body")
        .unwrap_or(false);
    Some(if is_body {
        UpgradedRef::RequestBody(RequestBody {
            reference: Some(format!("#/components/requestBodies/{name}")),
            ..RequestBody::default()
        })
    } else {
        UpgradedRef::Parameter(Parameter {
            reference: Some(format!("#/components/parameters/{name}")),
            ..Parameter::default()
        })
    })
}

/// A path-level parameter entry: reference or inline non-body parameter.
/// Body parameters at path level are rare enough that they fold into each
/// operation during the per-operation pass instead.
fn upgrade_parameter_entry(
    holder: &crate::marshal::Reference<model::Parameter>,
    doc: &model::Swagger,
) -> Option<Parameter> {
    if let Some(reference) = holder.reference() {
        return match upgrade_parameter_ref(reference, doc)? {
            UpgradedRef::Parameter(p) => Some(p),
            UpgradedRef::RequestBody(_) => None,
        };
    }
    let parameter = holder.inline()?;
    match parameter.location() {
        "body" | "formData" => None,
        _ => Some(upgrade_parameter(parameter)),
    }
}

/// Non-body parameter: the primitive descriptor becomes a schema, and
/// `collectionFormat` maps onto style/explode.
fn upgrade_parameter(parameter: &model::Parameter) -> Parameter {
    let mut out = Parameter {
        name: parameter.name.clone(),
        location: parameter.r#in.clone(),
        description: parameter.description.clone(),
        required: parameter.required,
        allow_empty_value: parameter.allow_empty_value,
        schema: Some(primitive_schema_node(
            parameter.r#type.as_deref(),
            parameter.format.as_deref(),
            parameter.items.as_deref(),
            parameter.r#enum.as_deref(),
            parameter.default.as_ref(),
            &NumericBounds::of_parameter(parameter),
        )),
        ..Parameter::default()
    };
    if parameter.type_str() == "array" || parameter.collection_format.is_some() {
        let (style, explode) = match parameter.collection_format() {
            "multi" => ("form", true),
            "ssv" => ("spaceDelimited", false),
            "pipes" => ("pipeDelimited", false),
            // `tsv` has no OAS3 counterpart; `form` is the safe fallback.
            _ => ("form", false),
        };
        out.style = Some(style.to_owned());
        out.explode = Some(explode);
    }
    for (key, field) in parameter.extensions.iter() {
        if let Some(value) = &field.value {
            out.extensions.push((key.clone(), value.to_node()));
        }
    }
    out
}

/// Body parameter → request body: one media type per consumed type, all
/// sharing the body schema.
fn body_request_body(parameter: &model::Parameter, media_types: &[String]) -> RequestBody {
    let schema = parameter
        .schema
        .as_ref()
        .map(|s| rewrite_refs(&s.core_root()));
    RequestBody {
        reference: None,
        description: parameter.description.clone(),
        required: parameter.required,
        content: media_types
            .iter()
            .map(|mt| {
                (
                    mt.clone(),
                    MediaType {
                        schema: schema.as_ref().map(node::deep_clone),
                        example: None,
                    },
                )
            })
            .collect(),
    }
}

/// formData parameters → one aggregated object schema under a form media
/// type; multipart when any field is a file.
fn form_request_body(fields: &[&model::Parameter]) -> RequestBody {
    let any_file = fields.iter().any(|f| f.type_str() == "file");
    let media_type = if any_file { MULTIPART_FORM } else { FORM_URLENCODED };
    let properties = Node::mapping(Style::Block);
    for field in fields {
        let schema = if field.type_str() == "file" {
            let file = Node::mapping(Style::Block);
            push_plain(&file, "type", "string");
            push_plain(&file, "format", "binary");
            file
        } else {
            primitive_schema_node(
                field.r#type.as_deref(),
                field.format.as_deref(),
                field.items.as_deref(),
                field.r#enum.as_deref(),
                field.default.as_ref(),
                &NumericBounds::of_parameter(field),
            )
        };
        node::mapping_push(&properties, Node::plain(field.name().to_owned()), schema);
    }
    let schema = Node::mapping(Style::Block);
    push_plain(&schema, "type", "object");
    node::mapping_push(&schema, Node::plain("properties"), properties);
    RequestBody {
        reference: None,
        description: None,
        required: Some(fields.iter().any(|f| f.required())).filter(|r| *r),
        content: vec![(
            media_type.to_owned(),
            MediaType {
                schema: Some(schema),
                example: None,
            },
        )],
    }
    .normalized()
}

fn upgrade_response_entry(
    holder: &crate::marshal::Reference<model::Response>,
    doc: &model::Swagger,
    operation: Option<&model::Operation>,
) -> Response {
    if let Some(reference) = holder.reference() {
        let rewritten = reference
            .strip_prefix("#/responses/")
            .map(|name| format!("#/components/responses/{name}"))
            .unwrap_or_else(|| reference.to_owned());
        return Response {
            reference: Some(rewritten),
            ..Response::default()
        };
    }
    match holder.inline() {
        Some(response) => upgrade_response(response, doc, operation),
        None => Response::default(),
    }
}

fn upgrade_response(
    response: &model::Response,
    doc: &model::Swagger,
    operation: Option<&model::Operation>,
) -> Response {
    let mut out = Response {
        reference: None,
        description: response.description.clone(),
        ..Response::default()
    };
    if let Some(headers) = &response.headers {
        for (name, header) in headers.iter() {
            out.headers.push((
                name.clone(),
                Header {
                    description: header.description.clone(),
                    schema: Some(primitive_schema_node(
                        header.r#type.as_deref(),
                        header.format.as_deref(),
                        header.items.as_deref(),
                        header.r#enum.as_deref(),
                        header.default.as_ref(),
                        &NumericBounds::of_header(header),
                    )),
                },
            ));
        }
    }
    let schema = response.schema.as_ref().map(|s| rewrite_refs(&s.core_root()));
    let examples: Vec<(String, &Value)> = response
        .examples
        .as_ref()
        .map(|m| m.iter().map(|(k, v)| (k.clone(), v)).collect())
        .unwrap_or_default();
    if schema.is_some() || !examples.is_empty() {
        let media_types = response_media_types(doc, operation, &examples);
        for mt in media_types {
            let example = examples
                .iter()
                .find(|(k, _)| *k == mt)
                .map(|(_, v)| v.to_node());
            out.content.push((
                mt,
                MediaType {
                    schema: schema.as_ref().map(node::deep_clone),
                    example,
                },
            ));
        }
    }
    out
}

/// Media types for a response body: operation produces, then root produces,
/// then any example keys, then `application/json`.
fn response_media_types(
    doc: &model::Swagger,
    operation: Option<&model::Operation>,
    examples: &[(String, &Value)],
) -> Vec<String> {
    if let Some(operation) = operation {
        if !operation.produces().is_empty() {
            return operation.produces().to_vec();
        }
    }
    if !doc.produces().is_empty() {
        return doc.produces().to_vec();
    }
    if !examples.is_empty() {
        return examples.iter().map(|(k, _)| k.clone()).collect();
    }
    vec![DEFAULT_MEDIA_TYPE.to_owned()]
}

fn operation_consumes(operation: &model::Operation, doc: &model::Swagger) -> Vec<String> {
    if !operation.consumes().is_empty() {
        return operation.consumes().to_vec();
    }
    media_types_or_default(doc.consumes())
}

fn media_types_or_default(list: &[String]) -> Vec<String> {
    if list.is_empty() {
        vec![DEFAULT_MEDIA_TYPE.to_owned()]
    } else {
        list.to_vec()
    }
}

fn upgrade_security_scheme(scheme: &model::SecurityScheme) -> SecurityScheme {
    let mut out = SecurityScheme {
        description: scheme.description.clone(),
        ..SecurityScheme::default()
    };
    match scheme.type_str() {
        "basic" => {
            out.r#type = "http".to_owned();
            out.scheme = Some("basic".to_owned());
        }
        "apiKey" => {
            // Cookie location does not exist in Swagger 2.0; name and the
            // query/header location carry over unchanged.
            out.r#type = "apiKey".to_owned();
            out.name = scheme.name.clone();
            out.location = scheme.r#in.clone();
        }
        "oauth2" => {
            out.r#type = "oauth2".to_owned();
            let scopes: Vec<(String, String)> = scheme
                .scopes
                .as_ref()
                .map(|m| m.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
                .unwrap_or_default();
            let flow = OAuthFlow {
                authorization_url: scheme.authorization_url.clone(),
                token_url: scheme.token_url.clone(),
                scopes,
            };
            let mut flows = OAuthFlows::default();
            match scheme.flow() {
                "implicit" => {
                    flows.implicit = Some(OAuthFlow {
                        token_url: None,
                        ..flow
                    })
                }
                "password" => {
                    flows.password = Some(OAuthFlow {
                        authorization_url: None,
                        ..flow
                    })
                }
                "application" => {
                    flows.client_credentials = Some(OAuthFlow {
                        authorization_url: None,
                        ..flow
                    })
                }
                _ => flows.authorization_code = Some(flow),
            }
            out.flows = Some(flows);
        }
        other => {
            out.r#type = other.to_owned();
        }
    }
    out
}

/// Numeric constraint bundle shared by parameters and headers.
struct NumericBounds {
    maximum: Option<f64>,
    exclusive_maximum: Option<bool>,
    minimum: Option<f64>,
    exclusive_minimum: Option<bool>,
    max_length: Option<i64>,
    min_length: Option<i64>,
    pattern: Option<String>,
    max_items: Option<i64>,
    min_items: Option<i64>,
    unique_items: Option<bool>,
    multiple_of: Option<f64>,
}

impl NumericBounds {
    fn of_parameter(p: &model::Parameter) -> Self {
        Self {
            maximum: p.maximum,
            exclusive_maximum: p.exclusive_maximum,
            minimum: p.minimum,
            exclusive_minimum: p.exclusive_minimum,
            max_length: p.max_length,
            min_length: p.min_length,
            pattern: p.pattern.clone(),
            max_items: p.max_items,
            min_items: p.min_items,
            unique_items: p.unique_items,
            multiple_of: p.multiple_of,
        }
    }

    fn of_header(h: &model::Header) -> Self {
        Self {
            maximum: h.maximum,
            exclusive_maximum: h.exclusive_maximum,
            minimum: h.minimum,
            exclusive_minimum: h.exclusive_minimum,
            max_length: h.max_length,
            min_length: h.min_length,
            pattern: h.pattern.clone(),
            max_items: h.max_items,
            min_items: h.min_items,
            unique_items: h.unique_items,
            multiple_of: h.multiple_of,
        }
    }

    fn of_items(i: &model::Items) -> Self {
        Self {
            maximum: i.maximum,
            exclusive_maximum: i.exclusive_maximum,
            minimum: i.minimum,
            exclusive_minimum: i.exclusive_minimum,
            max_length: i.max_length,
            min_length: i.min_length,
            pattern: i.pattern.clone(),
            max_items: i.max_items,
            min_items: i.min_items,
            unique_items: i.unique_items,
            multiple_of: i.multiple_of,
        }
    }
}

/// Build an OAS3 schema node from a 2.0 primitive descriptor
/// (`type`/`format`/`items`/`enum`/`default` plus the numeric constraints).
fn primitive_schema_node(
    type_name: Option<&str>,
    format: Option<&str>,
    items: Option<&model::Items>,
    enumeration: Option<&[Value]>,
    default: Option<&Value>,
    bounds: &NumericBounds,
) -> NodeRef {
    let schema = Node::mapping(Style::Block);
    if let Some(type_name) = type_name {
        push_plain(&schema, "type", type_name);
    }
    if let Some(format) = format {
        push_plain(&schema, "format", format);
    }
    if let Some(items) = items {
        let child = primitive_schema_node(
            items.r#type.as_deref(),
            items.format.as_deref(),
            items.items.as_deref(),
            items.r#enum.as_deref(),
            items.default.as_ref(),
            &NumericBounds::of_items(items),
        );
        node::mapping_push(&schema, Node::plain("items"), child);
    }
    if let Some(default) = default {
        node::mapping_push(&schema, Node::plain("default"), default.to_node());
    }
    if let Some(values) = enumeration {
        let seq = Node::sequence(Style::Block);
        for value in values {
            seq.borrow_mut().children.push(value.to_node());
        }
        node::mapping_push(&schema, Node::plain("enum"), seq);
    }
    push_opt_number(&schema, "maximum", bounds.maximum);
    push_opt_bool(&schema, "exclusiveMaximum", bounds.exclusive_maximum);
    push_opt_number(&schema, "minimum", bounds.minimum);
    push_opt_bool(&schema, "exclusiveMinimum", bounds.exclusive_minimum);
    push_opt_int(&schema, "maxLength", bounds.max_length);
    push_opt_int(&schema, "minLength", bounds.min_length);
    if let Some(pattern) = &bounds.pattern {
        node::mapping_push(
            &schema,
            Node::plain("pattern"),
            Node::scalar(pattern.clone(), Style::DoubleQuoted),
        );
    }
    push_opt_int(&schema, "maxItems", bounds.max_items);
    push_opt_int(&schema, "minItems", bounds.min_items);
    push_opt_bool(&schema, "uniqueItems", bounds.unique_items);
    push_opt_number(&schema, "multipleOf", bounds.multiple_of);
    schema
}

/// Deep-clone a node subtree, rewriting every `$ref` whose target moved in
/// the 3.0 layout.
pub(crate) fn rewrite_refs(root: &NodeRef) -> NodeRef {
    let copy = node::deep_clone(root);
    rewrite_refs_in_place(&copy);
    copy
}

fn rewrite_refs_in_place(node_ref: &NodeRef) {
    let children: Vec<NodeRef> = node_ref.borrow().children.clone();
    let is_mapping = *node_ref.borrow().kind == NodeKind::Mapping;
    if is_mapping {
        for pair in children.chunks_exact(2) {
            let is_ref_key = pair[0].borrow().value == "$ref";
            if is_ref_key && *pair[1].borrow().kind == NodeKind::Scalar {
                let mut value = pair[1].borrow_mut();
                if let Some(name) = value.value.strip_prefix("#/definitions/") {
                    value.value = format!("#/components/schemas/{name}");
                }
            }
        }
    }
    for child in &children {
        rewrite_refs_in_place(child);
    }
}

impl RequestBody {
    /// `required: Some(false)` on a synthesized body is noise; drop it.
    fn normalized(mut self) -> Self {
        if self.required == Some(false) {
            self.required = None;
        }
        self
    }
}

fn push_plain(map: &NodeRef, key: &str, value: &str) {
    node::mapping_push(map, Node::plain(key), Node::plain(value));
}

fn push_opt_number(map: &NodeRef, key: &str, value: Option<f64>) {
    if let Some(value) = value {
        node::mapping_push(map, Node::plain(key), Node::plain(crate::scalars::format_float(value)));
    }
}

fn push_opt_int(map: &NodeRef, key: &str, value: Option<i64>) {
    if let Some(value) = value {
        node::mapping_push(map, Node::plain(key), Node::plain(value.to_string()));
    }
}

fn push_opt_bool(map: &NodeRef, key: &str, value: Option<bool>) {
    if let Some(value) = value {
        node::mapping_push(map, Node::plain(key), Node::plain(if value { "true" } else { "false" }));
    }
}
