//!
//! Write-side OpenAPI 3.0 document model — the target of the upgrade
//! pathway.
//!
//! Typed where the upgrade transformation has to reason about shape
//! (servers, request bodies, parameters, security schemes); schema bodies
//! and verbatim-carried subtrees (info, tags, security requirements,
//! extension values) travel as converted node clones. `to_node` marshals
//! the whole document through the same node-tree emitter the Swagger side
//! uses, under the serialization configuration propagated from the source.

use crate::config::SerializeConfig;
use crate::error::Error;
use crate::node::{self, Node, NodeRef, Style};

/// The root OpenAPI 3.0 document.
#[derive(Clone, Debug, Default)]
pub struct OpenApi {
    /// Always `3.0.0` for upgraded documents.
    pub openapi: String,
    /// Converted clone of the source `info` object.
    pub info: Option<NodeRef>,
    pub servers: Vec<Server>,
    /// Converted clones of the source tags.
    pub tags: Vec<NodeRef>,
    pub external_docs: Option<NodeRef>,
    /// Path items in emission order.
    pub paths: Vec<(String, PathItem)>,
    pub components: Components,
    /// Converted clones of the source security requirements.
    pub security: Vec<NodeRef>,
    pub extensions: Vec<(String, NodeRef)>,
    pub(crate) config: SerializeConfig,
}

#[derive(Clone, Debug, Default)]
pub struct Server {
    pub url: String,
}

#[derive(Clone, Debug, Default)]
pub struct Components {
    pub schemas: Vec<(String, NodeRef)>,
    pub parameters: Vec<(String, Parameter)>,
    pub request_bodies: Vec<(String, RequestBody)>,
    pub responses: Vec<(String, Response)>,
    pub security_schemes: Vec<(String, SecurityScheme)>,
}

impl Components {
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
            && self.parameters.is_empty()
            && self.request_bodies.is_empty()
            && self.responses.is_empty()
            && self.security_schemes.is_empty()
    }

    /// Schema node by component name.
    pub fn schema(&self, name: &str) -> Option<&NodeRef> {
        self.schemas.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }
}

#[derive(Clone, Debug, Default)]
pub struct PathItem {
    /// (method, operation) pairs in source order.
    pub operations: Vec<(String, Operation)>,
    pub parameters: Vec<Parameter>,
    pub extensions: Vec<(String, NodeRef)>,
}

#[derive(Clone, Debug, Default)]
pub struct Operation {
    pub tags: Option<Vec<String>>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub external_docs: Option<NodeRef>,
    pub operation_id: Option<String>,
    pub parameters: Vec<Parameter>,
    pub request_body: Option<RequestBody>,
    /// (status code or `default`, response) pairs in source order.
    pub responses: Vec<(String, Response)>,
    pub deprecated: Option<bool>,
    pub security: Vec<NodeRef>,
    pub extensions: Vec<(String, NodeRef)>,
}

impl Operation {
    pub fn parameter(&self, name: &str) -> Option<&Parameter> {
        self.parameters
            .iter()
            .find(|p| p.name.as_deref() == Some(name))
    }

    pub fn response(&self, code: &str) -> Option<&Response> {
        self.responses.iter().find(|(c, _)| c == code).map(|(_, r)| r)
    }
}

/// An OAS3 parameter, or a `$ref` to a component parameter.
#[derive(Clone, Debug, Default)]
pub struct Parameter {
    pub reference: Option<String>,
    pub name: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub required: Option<bool>,
    pub deprecated: Option<bool>,
    pub allow_empty_value: Option<bool>,
    pub style: Option<String>,
    pub explode: Option<bool>,
    pub schema: Option<NodeRef>,
    pub extensions: Vec<(String, NodeRef)>,
}

/// A request body, or a `$ref` to a component request body.
#[derive(Clone, Debug, Default)]
pub struct RequestBody {
    pub reference: Option<String>,
    pub description: Option<String>,
    pub required: Option<bool>,
    /// (media type, content) pairs in emission order.
    pub content: Vec<(String, MediaType)>,
}

impl RequestBody {
    pub fn media_type(&self, mt: &str) -> Option<&MediaType> {
        self.content.iter().find(|(m, _)| m == mt).map(|(_, c)| c)
    }
}

#[derive(Clone, Debug, Default)]
pub struct MediaType {
    pub schema: Option<NodeRef>,
    pub example: Option<NodeRef>,
}

/// A response, or a `$ref` to a component response.
#[derive(Clone, Debug, Default)]
pub struct Response {
    pub reference: Option<String>,
    pub description: Option<String>,
    pub headers: Vec<(String, Header)>,
    pub content: Vec<(String, MediaType)>,
}

impl Response {
    pub fn media_type(&self, mt: &str) -> Option<&MediaType> {
        self.content.iter().find(|(m, _)| m == mt).map(|(_, c)| c)
    }
}

#[derive(Clone, Debug, Default)]
pub struct Header {
    pub description: Option<String>,
    pub schema: Option<NodeRef>,
}

#[derive(Clone, Debug, Default)]
pub struct SecurityScheme {
    pub r#type: String,
    pub description: Option<String>,
    /// `http` schemes: the authorization scheme (`basic`).
    pub scheme: Option<String>,
    /// `apiKey` schemes: carried name and location.
    pub name: Option<String>,
    pub location: Option<String>,
    pub flows: Option<OAuthFlows>,
}

#[derive(Clone, Debug, Default)]
pub struct OAuthFlows {
    pub implicit: Option<OAuthFlow>,
    pub password: Option<OAuthFlow>,
    pub client_credentials: Option<OAuthFlow>,
    pub authorization_code: Option<OAuthFlow>,
}

#[derive(Clone, Debug, Default)]
pub struct OAuthFlow {
    pub authorization_url: Option<String>,
    pub token_url: Option<String>,
    pub scopes: Vec<(String, String)>,
}

impl OpenApi {
    pub fn config(&self) -> &SerializeConfig {
        &self.config
    }

    pub fn path(&self, path: &str) -> Option<&PathItem> {
        self.paths.iter().find(|(p, _)| p == path).map(|(_, i)| i)
    }

    pub fn operation(&self, path: &str, method: &str) -> Option<&Operation> {
        self.path(path)?
            .operations
            .iter()
            .find(|(m, _)| m == method)
            .map(|(_, op)| op)
    }

    /// Serialize under the configuration propagated from the source
    /// document (same format, same indentation).
    pub fn marshal(&self) -> Result<String, Error> {
        let root = self.to_node()?;
        crate::emit::emit(&root, &self.config)
    }

    /// Materialize the document node tree.
    pub fn to_node(&self) -> Result<NodeRef, Error> {
        let map = Node::mapping(Style::Block);
        push_str(&map, "openapi", &self.openapi);
        if let Some(info) = &self.info {
            node::mapping_push(&map, Node::plain("info"), node::deep_clone(info));
        }
        if let Some(docs) = &self.external_docs {
            node::mapping_push(&map, Node::plain("externalDocs"), node::deep_clone(docs));
        }
        if !self.servers.is_empty() {
            let seq = Node::sequence(Style::Block);
            for server in &self.servers {
                let entry = Node::mapping(Style::Block);
                push_str(&entry, "url", &server.url);
                seq.borrow_mut().children.push(entry);
            }
            node::mapping_push(&map, Node::plain("servers"), seq);
        }
        if !self.tags.is_empty() {
            let seq = Node::sequence(Style::Block);
            for tag in &self.tags {
                seq.borrow_mut().children.push(node::deep_clone(tag));
            }
            node::mapping_push(&map, Node::plain("tags"), seq);
        }
        let paths = Node::mapping(if self.paths.is_empty() { Style::Flow } else { Style::Block });
        for (path, item) in &self.paths {
            node::mapping_push(&paths, Node::plain(path.clone()), item.to_node()?);
        }
        node::mapping_push(&map, Node::plain("paths"), paths);
        if !self.components.is_empty() {
            node::mapping_push(&map, Node::plain("components"), self.components.to_node()?);
        }
        if !self.security.is_empty() {
            let seq = Node::sequence(Style::Block);
            for requirement in &self.security {
                seq.borrow_mut().children.push(node::deep_clone(requirement));
            }
            node::mapping_push(&map, Node::plain("security"), seq);
        }
        for (key, value) in &self.extensions {
            node::mapping_push(&map, Node::plain(key.clone()), node::deep_clone(value));
        }
        Ok(Node::document(Some(map)))
    }
}

impl Components {
    fn to_node(&self) -> Result<NodeRef, Error> {
        let map = Node::mapping(Style::Block);
        if !self.schemas.is_empty() {
            let schemas = Node::mapping(Style::Block);
            for (name, schema) in &self.schemas {
                node::mapping_push(&schemas, Node::plain(name.clone()), node::deep_clone(schema));
            }
            node::mapping_push(&map, Node::plain("schemas"), schemas);
        }
        if !self.responses.is_empty() {
            let responses = Node::mapping(Style::Block);
            for (name, response) in &self.responses {
                node::mapping_push(&responses, Node::plain(name.clone()), response.to_node()?);
            }
            node::mapping_push(&map, Node::plain("responses"), responses);
        }
        if !self.parameters.is_empty() {
            let parameters = Node::mapping(Style::Block);
            for (name, parameter) in &self.parameters {
                node::mapping_push(&parameters, Node::plain(name.clone()), parameter.to_node()?);
            }
            node::mapping_push(&map, Node::plain("parameters"), parameters);
        }
        if !self.request_bodies.is_empty() {
            let bodies = Node::mapping(Style::Block);
            for (name, body) in &self.request_bodies {
                node::mapping_push(&bodies, Node::plain(name.clone()), body.to_node()?);
            }
            node::mapping_push(&map, Node::plain("requestBodies"), bodies);
        }
        if !self.security_schemes.is_empty() {
            let schemes = Node::mapping(Style::Block);
            for (name, scheme) in &self.security_schemes {
                node::mapping_push(&schemes, Node::plain(name.clone()), scheme.to_node()?);
            }
            node::mapping_push(&map, Node::plain("securitySchemes"), schemes);
        }
        Ok(map)
    }
}

impl PathItem {
    fn to_node(&self) -> Result<NodeRef, Error> {
        let map = Node::mapping(Style::Block);
        if !self.parameters.is_empty() {
            let seq = Node::sequence(Style::Block);
            for parameter in &self.parameters {
                seq.borrow_mut().children.push(parameter.to_node()?);
            }
            node::mapping_push(&map, Node::plain("parameters"), seq);
        }
        for (method, operation) in &self.operations {
            node::mapping_push(&map, Node::plain(method.clone()), operation.to_node()?);
        }
        for (key, value) in &self.extensions {
            node::mapping_push(&map, Node::plain(key.clone()), node::deep_clone(value));
        }
        Ok(map)
    }
}

impl Operation {
    fn to_node(&self) -> Result<NodeRef, Error> {
        let map = Node::mapping(Style::Block);
        if let Some(tags) = &self.tags {
            let seq = Node::sequence(Style::Block);
            for tag in tags {
                seq.borrow_mut().children.push(Node::plain(tag.clone()));
            }
            node::mapping_push(&map, Node::plain("tags"), seq);
        }
        push_opt_str(&map, "summary", self.summary.as_deref());
        push_opt_str(&map, "description", self.description.as_deref());
        if let Some(docs) = &self.external_docs {
            node::mapping_push(&map, Node::plain("externalDocs"), node::deep_clone(docs));
        }
        push_opt_str(&map, "operationId", self.operation_id.as_deref());
        if !self.parameters.is_empty() {
            let seq = Node::sequence(Style::Block);
            for parameter in &self.parameters {
                seq.borrow_mut().children.push(parameter.to_node()?);
            }
            node::mapping_push(&map, Node::plain("parameters"), seq);
        }
        if let Some(body) = &self.request_body {
            node::mapping_push(&map, Node::plain("requestBody"), body.to_node()?);
        }
        let responses = Node::mapping(if self.responses.is_empty() {
            Style::Flow
        } else {
            Style::Block
        });
        for (code, response) in &self.responses {
            let key = if code == "default" {
                Node::plain("default")
            } else {
                Node::scalar(code.clone(), Style::DoubleQuoted)
            };
            node::mapping_push(&responses, key, response.to_node()?);
        }
        node::mapping_push(&map, Node::plain("responses"), responses);
        if let Some(deprecated) = self.deprecated {
            push_bool(&map, "deprecated", deprecated);
        }
        if !self.security.is_empty() {
            let seq = Node::sequence(Style::Block);
            for requirement in &self.security {
                seq.borrow_mut().children.push(node::deep_clone(requirement));
            }
            node::mapping_push(&map, Node::plain("security"), seq);
        }
        for (key, value) in &self.extensions {
            node::mapping_push(&map, Node::plain(key.clone()), node::deep_clone(value));
        }
        Ok(map)
    }
}

impl Parameter {
    fn to_node(&self) -> Result<NodeRef, Error> {
        let map = Node::mapping(Style::Block);
        if let Some(reference) = &self.reference {
            node::mapping_push(
                &map,
                Node::plain("$ref"),
                Node::scalar(reference.clone(), Style::DoubleQuoted),
            );
            return Ok(map);
        }
        push_opt_str(&map, "name", self.name.as_deref());
        push_opt_str(&map, "in", self.location.as_deref());
        push_opt_str(&map, "description", self.description.as_deref());
        if let Some(required) = self.required {
            push_bool(&map, "required", required);
        }
        if let Some(deprecated) = self.deprecated {
            push_bool(&map, "deprecated", deprecated);
        }
        if let Some(allow) = self.allow_empty_value {
            push_bool(&map, "allowEmptyValue", allow);
        }
        push_opt_str(&map, "style", self.style.as_deref());
        if let Some(explode) = self.explode {
            push_bool(&map, "explode", explode);
        }
        if let Some(schema) = &self.schema {
            node::mapping_push(&map, Node::plain("schema"), node::deep_clone(schema));
        }
        for (key, value) in &self.extensions {
            node::mapping_push(&map, Node::plain(key.clone()), node::deep_clone(value));
        }
        Ok(map)
    }
}

impl RequestBody {
    fn to_node(&self) -> Result<NodeRef, Error> {
        let map = Node::mapping(Style::Block);
        if let Some(reference) = &self.reference {
            node::mapping_push(
                &map,
                Node::plain("$ref"),
                Node::scalar(reference.clone(), Style::DoubleQuoted),
            );
            return Ok(map);
        }
        push_opt_str(&map, "description", self.description.as_deref());
        if !self.content.is_empty() {
            let content = Node::mapping(Style::Block);
            for (mt, media) in &self.content {
                node::mapping_push(&content, Node::plain(mt.clone()), media.to_node()?);
            }
            node::mapping_push(&map, Node::plain("content"), content);
        }
        if let Some(required) = self.required {
            push_bool(&map, "required", required);
        }
        Ok(map)
    }
}

impl MediaType {
    fn to_node(&self) -> Result<NodeRef, Error> {
        let map = Node::mapping(Style::Block);
        if let Some(schema) = &self.schema {
            node::mapping_push(&map, Node::plain("schema"), node::deep_clone(schema));
        }
        if let Some(example) = &self.example {
            node::mapping_push(&map, Node::plain("example"), node::deep_clone(example));
        }
        Ok(map)
    }
}

impl Response {
    fn to_node(&self) -> Result<NodeRef, Error> {
        let map = Node::mapping(Style::Block);
        if let Some(reference) = &self.reference {
            node::mapping_push(
                &map,
                Node::plain("$ref"),
                Node::scalar(reference.clone(), Style::DoubleQuoted),
            );
            return Ok(map);
        }
        push_opt_str(&map, "description", self.description.as_deref());
        if !self.headers.is_empty() {
            let headers = Node::mapping(Style::Block);
            for (name, header) in &self.headers {
                node::mapping_push(&headers, Node::plain(name.clone()), header.to_node()?);
            }
            node::mapping_push(&map, Node::plain("headers"), headers);
        }
        if !self.content.is_empty() {
            let content = Node::mapping(Style::Block);
            for (mt, media) in &self.content {
                node::mapping_push(&content, Node::plain(mt.clone()), media.to_node()?);
            }
            node::mapping_push(&map, Node::plain("content"), content);
        }
        Ok(map)
    }
}

impl Header {
    fn to_node(&self) -> Result<NodeRef, Error> {
        let map = Node::mapping(Style::Block);
        push_opt_str(&map, "description", self.description.as_deref());
        if let Some(schema) = &self.schema {
            node::mapping_push(&map, Node::plain("schema"), node::deep_clone(schema));
        }
        Ok(map)
    }
}

impl SecurityScheme {
    fn to_node(&self) -> Result<NodeRef, Error> {
        let map = Node::mapping(Style::Block);
        push_str(&map, "type", &self.r#type);
        push_opt_str(&map, "description", self.description.as_deref());
        push_opt_str(&map, "scheme", self.scheme.as_deref());
        push_opt_str(&map, "name", self.name.as_deref());
        push_opt_str(&map, "in", self.location.as_deref());
        if let Some(flows) = &self.flows {
            node::mapping_push(&map, Node::plain("flows"), flows.to_node()?);
        }
        Ok(map)
    }
}

impl OAuthFlows {
    fn to_node(&self) -> Result<NodeRef, Error> {
        let map = Node::mapping(Style::Block);
        for (key, flow) in [
            ("implicit", &self.implicit),
            ("password", &self.password),
            ("clientCredentials", &self.client_credentials),
            ("authorizationCode", &self.authorization_code),
        ] {
            if let Some(flow) = flow {
                node::mapping_push(&map, Node::plain(key), flow.to_node()?);
            }
        }
        Ok(map)
    }
}

impl OAuthFlow {
    fn to_node(&self) -> Result<NodeRef, Error> {
        let map = Node::mapping(Style::Block);
        push_opt_str(&map, "authorizationUrl", self.authorization_url.as_deref());
        push_opt_str(&map, "tokenUrl", self.token_url.as_deref());
        // `scopes` is required on every flow; an empty map still emits.
        let scopes = Node::mapping(if self.scopes.is_empty() { Style::Flow } else { Style::Block });
        for (scope, description) in &self.scopes {
            node::mapping_push(
                &scopes,
                Node::plain(scope.clone()),
                Node::plain(description.clone()),
            );
        }
        node::mapping_push(&map, Node::plain("scopes"), scopes);
        Ok(map)
    }
}

fn push_str(map: &NodeRef, key: &str, value: &str) {
    let style = if crate::scalars::looks_like_number(value) || value.contains('.') {
        Style::DoubleQuoted
    } else {
        Style::Plain
    };
    node::mapping_push(map, Node::plain(key), Node::scalar(value, style));
}

fn push_opt_str(map: &NodeRef, key: &str, value: Option<&str>) {
    if let Some(value) = value {
        let node = if crate::emit::is_plain_safe(value) && !crate::scalars::looks_like_number(value)
        {
            Node::plain(value)
        } else {
            Node::scalar(value, Style::DoubleQuoted)
        };
        node::mapping_push(map, Node::plain(key), node);
    }
}

fn push_bool(map: &NodeRef, key: &str, value: bool) {
    node::mapping_push(map, Node::plain(key), Node::plain(if value { "true" } else { "false" }));
}
