//!
//! Deterministic traversal over every object of a document.
//!
//! The walker visits objects in document order (info before paths before
//! definitions before security), invoking the caller's [`Matcher`]
//! callbacks keyed by model type. Each visit carries a [`Loc`]: the ordered
//! list of (field, optional index, optional key) frames from the root,
//! renderable as a JSON Pointer. A callback returns
//! [`std::ops::ControlFlow::Break`] to stop the walk promptly.

use std::ops::ControlFlow;

use smallvec::SmallVec;

use crate::marshal::{Extensions, Reference};
use crate::model::{
    Contact, ExternalDocumentation, Header, Info, Items, License, Operation, Parameter, PathItem,
    Paths, Response, Responses, Schema, SecurityRequirement, SecurityScheme, Swagger, Tag, Xml,
};

/// One step of a structural location.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LocFrame {
    /// Field name on the parent object (`paths`, `parameters`, …).
    pub field: &'static str,
    /// Index when the parent field is a sequence.
    pub index: Option<usize>,
    /// Key when the parent field is a map.
    pub key: Option<String>,
}

/// A structural location within the document, renderable as a JSON Pointer.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Loc {
    frames: SmallVec<[LocFrame; 8]>,
}

impl Loc {
    fn push_field(&self, field: &'static str) -> Loc {
        let mut frames = self.frames.clone();
        frames.push(LocFrame {
            field,
            index: None,
            key: None,
        });
        Loc { frames }
    }

    fn push_index(&self, field: &'static str, index: usize) -> Loc {
        let mut frames = self.frames.clone();
        frames.push(LocFrame {
            field,
            index: Some(index),
            key: None,
        });
        Loc { frames }
    }

    fn push_key(&self, field: &'static str, key: &str) -> Loc {
        let mut frames = self.frames.clone();
        frames.push(LocFrame {
            field,
            index: None,
            key: Some(key.to_owned()),
        });
        Loc { frames }
    }

    pub fn frames(&self) -> &[LocFrame] {
        &self.frames
    }

    /// RFC 6901 rendering: `/paths/~1users~1{id}/get/parameters/0`.
    pub fn to_json_pointer(&self) -> String {
        let mut out = String::new();
        for frame in &self.frames {
            out.push('/');
            out.push_str(&escape_pointer_token(frame.field));
            if let Some(key) = &frame.key {
                out.push('/');
                out.push_str(&escape_pointer_token(key));
            }
            if let Some(index) = frame.index {
                out.push('/');
                out.push_str(&index.to_string());
            }
        }
        out
    }
}

fn escape_pointer_token(token: &str) -> String {
    token.replace('~', "~0").replace('/', "~1")
}

type Callback<'a, T> = Box<dyn FnMut(&T, &Loc) -> ControlFlow<()> + 'a>;

/// One optional callback per model type, plus a catch-all invoked for every
/// visit. Unset callbacks are skipped.
#[derive(Default)]
pub struct Matcher<'a> {
    pub swagger: Option<Callback<'a, Swagger>>,
    pub info: Option<Callback<'a, Info>>,
    pub contact: Option<Callback<'a, Contact>>,
    pub license: Option<Callback<'a, License>>,
    pub external_docs: Option<Callback<'a, ExternalDocumentation>>,
    pub tag: Option<Callback<'a, Tag>>,
    pub paths: Option<Callback<'a, Paths>>,
    pub path_item: Option<Callback<'a, PathItem>>,
    pub operation: Option<Callback<'a, Operation>>,
    pub parameter: Option<Callback<'a, Parameter>>,
    pub items: Option<Callback<'a, Items>>,
    pub responses: Option<Callback<'a, Responses>>,
    pub response: Option<Callback<'a, Response>>,
    pub header: Option<Callback<'a, Header>>,
    pub security_requirement: Option<Callback<'a, SecurityRequirement>>,
    pub security_scheme: Option<Callback<'a, SecurityScheme>>,
    pub schema: Option<Callback<'a, Schema>>,
    pub xml: Option<Callback<'a, Xml>>,
    pub extensions: Option<Callback<'a, Extensions>>,
    /// Catch-all, called for every visited object after its typed callback.
    pub any: Option<Box<dyn FnMut(&Loc) -> ControlFlow<()> + 'a>>,
}

macro_rules! visit {
    ($matcher:expr, $slot:ident, $value:expr, $loc:expr) => {{
        if let Some(cb) = $matcher.$slot.as_mut() {
            cb($value, $loc)?;
        }
        if let Some(any) = $matcher.any.as_mut() {
            any($loc)?;
        }
        ControlFlow::Continue(())
    }};
}

/// Walk the whole document. Returns `true` when the traversal completed,
/// `false` when a callback terminated it early.
pub fn walk(doc: &Swagger, matcher: &mut Matcher) -> bool {
    walk_swagger(doc, matcher).is_continue()
}

fn walk_swagger(doc: &Swagger, matcher: &mut Matcher) -> ControlFlow<()> {
    let root = Loc::default();
    visit!(matcher, swagger, doc, &root)?;
    walk_extensions(&doc.extensions, matcher, &root)?;
    if let Some(info) = &doc.info {
        let loc = root.push_field("info");
        visit!(matcher, info, info, &loc)?;
        walk_extensions(&info.extensions, matcher, &loc)?;
        if let Some(contact) = &info.contact {
            let loc = loc.push_field("contact");
            visit!(matcher, contact, contact, &loc)?;
            walk_extensions(&contact.extensions, matcher, &loc)?;
        }
        if let Some(license) = &info.license {
            let loc = loc.push_field("license");
            visit!(matcher, license, license, &loc)?;
            walk_extensions(&license.extensions, matcher, &loc)?;
        }
    }
    if let Some(tags) = &doc.tags {
        for (i, tag) in tags.iter().enumerate() {
            let loc = root.push_index("tags", i);
            visit!(matcher, tag, tag, &loc)?;
            walk_extensions(&tag.extensions, matcher, &loc)?;
            if let Some(docs) = &tag.external_docs {
                walk_external_docs(docs, matcher, &loc.push_field("externalDocs"))?;
            }
        }
    }
    if let Some(docs) = &doc.external_docs {
        walk_external_docs(docs, matcher, &root.push_field("externalDocs"))?;
    }
    if let Some(paths) = &doc.paths {
        let loc = root.push_field("paths");
        visit!(matcher, paths, paths, &loc)?;
        walk_extensions(&paths.extensions, matcher, &loc)?;
        for (path, item) in paths.iter() {
            if let Some(item) = item.inline() {
                walk_path_item(item, matcher, &root.push_key("paths", path))?;
            }
        }
    }
    if let Some(definitions) = &doc.definitions {
        for (name, schema) in definitions.iter() {
            walk_schema(schema, matcher, &root.push_key("definitions", name))?;
        }
    }
    if let Some(parameters) = &doc.parameters {
        for (name, parameter) in parameters.iter() {
            walk_parameter(parameter, matcher, &root.push_key("parameters", name))?;
        }
    }
    if let Some(responses) = &doc.responses {
        for (name, response) in responses.iter() {
            walk_response(response, matcher, &root.push_key("responses", name))?;
        }
    }
    if let Some(definitions) = &doc.security_definitions {
        for (name, scheme) in definitions.iter() {
            let loc = root.push_key("securityDefinitions", name);
            visit!(matcher, security_scheme, scheme, &loc)?;
            walk_extensions(&scheme.extensions, matcher, &loc)?;
        }
    }
    if let Some(security) = &doc.security {
        for (i, requirement) in security.iter().enumerate() {
            let loc = root.push_index("security", i);
            visit!(matcher, security_requirement, requirement, &loc)?;
        }
    }
    ControlFlow::Continue(())
}

fn walk_external_docs(
    docs: &ExternalDocumentation,
    matcher: &mut Matcher,
    loc: &Loc,
) -> ControlFlow<()> {
    visit!(matcher, external_docs, docs, loc)?;
    walk_extensions(&docs.extensions, matcher, loc)
}

fn walk_path_item(item: &PathItem, matcher: &mut Matcher, loc: &Loc) -> ControlFlow<()> {
    visit!(matcher, path_item, item, loc)?;
    walk_extensions(&item.extensions, matcher, loc)?;
    if let Some(parameters) = &item.parameters {
        walk_parameter_list(parameters, matcher, loc)?;
    }
    for (method, operation) in item.operations() {
        walk_operation(operation, matcher, &loc.push_field(method))?;
    }
    ControlFlow::Continue(())
}

fn walk_operation(operation: &Operation, matcher: &mut Matcher, loc: &Loc) -> ControlFlow<()> {
    visit!(matcher, operation, operation, loc)?;
    walk_extensions(&operation.extensions, matcher, loc)?;
    if let Some(docs) = &operation.external_docs {
        walk_external_docs(docs, matcher, &loc.push_field("externalDocs"))?;
    }
    if let Some(parameters) = &operation.parameters {
        walk_parameter_list(parameters, matcher, loc)?;
    }
    if let Some(responses) = &operation.responses {
        let responses_loc = loc.push_field("responses");
        visit!(matcher, responses, responses, &responses_loc)?;
        walk_extensions(&responses.extensions, matcher, &responses_loc)?;
        if let Some(default) = &responses.default {
            if let Some(response) = default.inline() {
                walk_response(response, matcher, &responses_loc.push_field("default"))?;
            }
        }
        for (code, response) in responses.iter() {
            if let Some(response) = response.inline() {
                walk_response(response, matcher, &loc.push_key("responses", code))?;
            }
        }
    }
    if let Some(security) = &operation.security {
        for (i, requirement) in security.iter().enumerate() {
            let loc = loc.push_index("security", i);
            visit!(matcher, security_requirement, requirement, &loc)?;
        }
    }
    ControlFlow::Continue(())
}

fn walk_parameter_list(
    parameters: &[Reference<Parameter>],
    matcher: &mut Matcher,
    loc: &Loc,
) -> ControlFlow<()> {
    for (i, parameter) in parameters.iter().enumerate() {
        if let Some(parameter) = parameter.inline() {
            walk_parameter(parameter, matcher, &loc.push_index("parameters", i))?;
        }
    }
    ControlFlow::Continue(())
}

fn walk_parameter(parameter: &Parameter, matcher: &mut Matcher, loc: &Loc) -> ControlFlow<()> {
    visit!(matcher, parameter, parameter, loc)?;
    walk_extensions(&parameter.extensions, matcher, loc)?;
    if let Some(schema) = &parameter.schema {
        walk_schema(schema, matcher, &loc.push_field("schema"))?;
    }
    if let Some(items) = &parameter.items {
        walk_items(items, matcher, &loc.push_field("items"))?;
    }
    ControlFlow::Continue(())
}

fn walk_items(items: &Items, matcher: &mut Matcher, loc: &Loc) -> ControlFlow<()> {
    visit!(matcher, items, items, loc)?;
    walk_extensions(&items.extensions, matcher, loc)?;
    if let Some(nested) = &items.items {
        walk_items(nested, matcher, &loc.push_field("items"))?;
    }
    ControlFlow::Continue(())
}

fn walk_response(response: &Response, matcher: &mut Matcher, loc: &Loc) -> ControlFlow<()> {
    visit!(matcher, response, response, loc)?;
    walk_extensions(&response.extensions, matcher, loc)?;
    if let Some(schema) = &response.schema {
        walk_schema(schema, matcher, &loc.push_field("schema"))?;
    }
    if let Some(headers) = &response.headers {
        for (name, header) in headers.iter() {
            let loc = loc.push_key("headers", name);
            visit!(matcher, header, header, &loc)?;
            walk_extensions(&header.extensions, matcher, &loc)?;
            if let Some(items) = &header.items {
                walk_items(items, matcher, &loc.push_field("items"))?;
            }
        }
    }
    ControlFlow::Continue(())
}

fn walk_schema(schema: &Schema, matcher: &mut Matcher, loc: &Loc) -> ControlFlow<()> {
    visit!(matcher, schema, schema, loc)?;
    walk_extensions(&schema.extensions, matcher, loc)?;
    if let Some(items) = &schema.items {
        walk_schema(items, matcher, &loc.push_field("items"))?;
    }
    if let Some(all_of) = &schema.all_of {
        for (i, sub) in all_of.iter().enumerate() {
            walk_schema(sub, matcher, &loc.push_index("allOf", i))?;
        }
    }
    if let Some(properties) = &schema.properties {
        for (name, property) in properties.iter() {
            walk_schema(property, matcher, &loc.push_key("properties", name))?;
        }
    }
    if let Some(crate::marshal::Either::Left(additional)) = &schema.additional_properties {
        walk_schema(additional, matcher, &loc.push_field("additionalProperties"))?;
    }
    if let Some(xml) = &schema.xml {
        let loc = loc.push_field("xml");
        visit!(matcher, xml, xml, &loc)?;
        walk_extensions(&xml.extensions, matcher, &loc)?;
    }
    if let Some(docs) = &schema.external_docs {
        walk_external_docs(docs, matcher, &loc.push_field("externalDocs"))?;
    }
    ControlFlow::Continue(())
}

fn walk_extensions(extensions: &Extensions, matcher: &mut Matcher, loc: &Loc) -> ControlFlow<()> {
    if extensions.is_empty() {
        return ControlFlow::Continue(());
    }
    let loc = loc.push_field("extensions");
    visit!(matcher, extensions, extensions, &loc)
}
