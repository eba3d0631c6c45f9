//! High-level root document object, tags and external documentation.

use crate::config::SerializeConfig;
use crate::core;
use crate::error::Error;
use crate::marshal::field::sync_field;
use crate::marshal::Extensions;
use crate::node::{self, Node, NodeRef, Style};
use crate::seqmap::SequencedMap;
use crate::validation::{Rule, ValidationError, ValidationOptions};

use super::{
    attach_child, ensure_map_node, ensure_seq_node, map_values, root_helpers, sync_map_node,
    sync_seq_node, Info, Parameter, Paths, Response, Schema, SecurityRequirement, SecurityScheme,
};

/// Transfer protocols the specification allows.
pub(crate) const ALLOWED_SCHEMES: &[&str] = &["http", "https", "ws", "wss"];

/// Validation context: the document's global `consumes`/`produces`.
pub struct DocumentMediaTypes {
    pub consumes: Vec<String>,
    pub produces: Vec<String>,
}

/// Validation context: scheme name → scheme type for every entry of
/// `securityDefinitions`, consulted by security requirements.
pub struct SecuritySchemeTypes {
    pub types: ahash::AHashMap<String, String>,
}

/// The parsed document.
#[derive(Clone, Debug)]
pub struct Swagger {
    pub swagger: Option<String>,
    pub info: Option<Info>,
    pub host: Option<String>,
    pub base_path: Option<String>,
    pub schemes: Option<Vec<String>>,
    pub consumes: Option<Vec<String>>,
    pub produces: Option<Vec<String>>,
    pub paths: Option<Paths>,
    pub definitions: Option<SequencedMap<String, Schema>>,
    pub parameters: Option<SequencedMap<String, Parameter>>,
    pub responses: Option<SequencedMap<String, Response>>,
    pub security_definitions: Option<SequencedMap<String, SecurityScheme>>,
    pub security: Option<Vec<SecurityRequirement>>,
    pub tags: Option<Vec<Tag>>,
    pub external_docs: Option<ExternalDocumentation>,
    pub extensions: Extensions,
    core: core::Swagger,
    document: NodeRef,
    config: SerializeConfig,
}

impl Default for Swagger {
    fn default() -> Self {
        Self::new()
    }
}

impl Swagger {
    /// An empty document shell for building descriptions programmatically.
    pub fn new() -> Self {
        let root = Node::mapping(Style::Block);
        let document = Node::document(Some(root.clone()));
        let mut core = core::Swagger::default();
        core.core.root = Some(root);
        Self {
            swagger: None,
            info: None,
            host: None,
            base_path: None,
            schemes: None,
            consumes: None,
            produces: None,
            paths: None,
            definitions: None,
            parameters: None,
            responses: None,
            security_definitions: None,
            security: None,
            tags: None,
            external_docs: None,
            extensions: Extensions::default(),
            core,
            document,
            config: SerializeConfig::default(),
        }
    }

    pub(crate) fn from_core(
        mut core: core::Swagger,
        document: NodeRef,
        config: SerializeConfig,
    ) -> Self {
        Self {
            swagger: core.swagger.value.clone(),
            info: core.info.take_opt().map(Info::from_core),
            host: core.host.value.clone(),
            base_path: core.base_path.value.clone(),
            schemes: core.schemes.value.clone(),
            consumes: core.consumes.value.clone(),
            produces: core.produces.value.clone(),
            paths: core.paths.take_opt().map(Paths::from_core),
            definitions: core
                .definitions
                .take_opt()
                .map(|m| map_values(m, Schema::from_core)),
            parameters: core
                .parameters
                .take_opt()
                .map(|m| map_values(m, Parameter::from_core)),
            responses: core
                .responses
                .take_opt()
                .map(|m| map_values(m, Response::from_core)),
            security_definitions: core
                .security_definitions
                .take_opt()
                .map(|m| map_values(m, SecurityScheme::from_core)),
            security: core
                .security
                .take_opt()
                .map(|v| v.into_iter().map(SecurityRequirement::from_core).collect()),
            tags: core
                .tags
                .take_opt()
                .map(|v| v.into_iter().map(Tag::from_core).collect()),
            external_docs: core
                .external_docs
                .take_opt()
                .map(ExternalDocumentation::from_core),
            extensions: std::mem::take(&mut core.extensions),
            core,
            document,
            config,
        }
    }

    root_helpers!(core::Swagger);

    /// The document node backing this model; the single source of truth for
    /// marshalling.
    pub fn document(&self) -> &NodeRef {
        &self.document
    }

    pub fn config(&self) -> &SerializeConfig {
        &self.config
    }

    pub(crate) fn set_semantic_valid(&mut self, valid: bool) {
        self.core.core.valid = valid;
    }

    /// Whether the last validation pass found no content errors.
    pub fn is_valid(&self) -> bool {
        self.core.core.valid
    }

    pub fn swagger(&self) -> &str {
        self.swagger.as_deref().unwrap_or_default()
    }

    pub fn info_title(&self) -> &str {
        self.info.as_ref().map(|i| i.title()).unwrap_or_default()
    }

    pub fn host(&self) -> &str {
        self.host.as_deref().unwrap_or_default()
    }

    pub fn base_path(&self) -> &str {
        self.base_path.as_deref().unwrap_or_default()
    }

    pub fn schemes(&self) -> &[String] {
        self.schemes.as_deref().unwrap_or_default()
    }

    pub fn consumes(&self) -> &[String] {
        self.consumes.as_deref().unwrap_or_default()
    }

    pub fn produces(&self) -> &[String] {
        self.produces.as_deref().unwrap_or_default()
    }

    pub fn paths(&self) -> Option<&Paths> {
        self.paths.as_ref()
    }

    pub fn tags(&self) -> &[Tag] {
        self.tags.as_deref().unwrap_or_default()
    }

    /// Validate the whole document against the Swagger 2.0 rules.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut scheme_types = ahash::AHashMap::new();
        if let Some(defs) = &self.security_definitions {
            for (name, scheme) in defs.iter() {
                scheme_types.insert(name.clone(), scheme.type_str().to_owned());
            }
        }
        let opts = ValidationOptions::new()
            .with(DocumentMediaTypes {
                consumes: self.consumes().to_vec(),
                produces: self.produces().to_vec(),
            })
            .with(SecuritySchemeTypes { types: scheme_types });
        self.validate_with(&opts)
    }

    fn validate_with(&self, opts: &ValidationOptions) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if let Some(version) = &self.swagger {
            if version != "2.0" {
                errors.push(ValidationError::new(
                    Rule::SupportedVersion,
                    format!("swagger must be `2.0`, got `{version}`"),
                    self.core.swagger.value_node.as_ref(),
                ));
            }
        }
        if let Some(base_path) = &self.base_path {
            if !base_path.starts_with('/') {
                errors.push(ValidationError::new(
                    Rule::InvalidFormat,
                    format!("swagger.basePath must start with `/`, got `{base_path}`"),
                    self.core.base_path.value_node.as_ref(),
                ));
            }
        }
        if let Some(schemes) = &self.schemes {
            for scheme in schemes {
                if !ALLOWED_SCHEMES.contains(&scheme.as_str()) {
                    errors.push(ValidationError::new(
                        Rule::AllowedValues,
                        format!(
                            "swagger.schemes value `{scheme}` must be one of http, https, ws, wss"
                        ),
                        self.core.schemes.value_node.as_ref(),
                    ));
                }
            }
        }
        check_media_types(
            &mut errors,
            "swagger.consumes",
            self.consumes.as_deref(),
            self.core.consumes.value_node.as_ref(),
        );
        check_media_types(
            &mut errors,
            "swagger.produces",
            self.produces.as_deref(),
            self.core.produces.value_node.as_ref(),
        );
        if let Some(info) = &self.info {
            errors.extend(info.validate(opts));
        }
        if let Some(paths) = &self.paths {
            errors.extend(paths.validate(opts));
        }
        if let Some(definitions) = &self.definitions {
            for (_, schema) in definitions.iter() {
                errors.extend(schema.validate(opts));
            }
        }
        if let Some(parameters) = &self.parameters {
            for (_, parameter) in parameters.iter() {
                errors.extend(parameter.validate(opts));
            }
        }
        if let Some(responses) = &self.responses {
            for (_, response) in responses.iter() {
                errors.extend(response.validate(opts));
            }
        }
        if let Some(defs) = &self.security_definitions {
            for (_, scheme) in defs.iter() {
                errors.extend(scheme.validate(opts));
            }
        }
        if let Some(security) = &self.security {
            for requirement in security {
                errors.extend(requirement.validate(opts));
            }
        }
        if let Some(tags) = &self.tags {
            let mut seen = ahash::AHashSet::new();
            for tag in tags {
                if let Some(name) = &tag.name {
                    if !seen.insert(name.clone()) {
                        errors.push(ValidationError::new(
                            Rule::DuplicateKey,
                            format!("tag.name `{name}` is not unique"),
                            tag.get_core().name.value_node.as_ref(),
                        ));
                    }
                }
                errors.extend(tag.validate(opts));
            }
        }
        if let Some(docs) = &self.external_docs {
            errors.extend(docs.validate(opts));
        }
        // operationIds must be unique across every operation of the document.
        let mut seen_ids = ahash::AHashSet::new();
        if let Some(paths) = &self.paths {
            for (_, item) in paths.iter() {
                let Some(item) = item.inline() else { continue };
                for (_, operation) in item.operations() {
                    if let Some(id) = &operation.operation_id {
                        if !seen_ids.insert(id.clone()) {
                            errors.push(ValidationError::new(
                                Rule::DuplicateKey,
                                format!("operation.operationId `{id}` is not unique"),
                                operation.get_core().operation_id.value_node.as_ref(),
                            ));
                        }
                    }
                }
            }
        }
        errors
    }

    /// Reconcile every mutation on the high-level tree back into the node
    /// tree. After this the document node is the single source of truth.
    pub fn sync(&mut self) -> Result<(), Error> {
        tracing::debug!(model = "swagger", "syncing document model into node tree");
        let root = self.ensure_root();
        // A fresh root must also be wired into the document node.
        {
            let mut doc = self.document.borrow_mut();
            if doc.children.is_empty() {
                doc.children.push(root.clone());
            }
        }
        sync_field(&root, "swagger", self.swagger.as_ref(), &mut self.core.swagger)?;
        match &mut self.info {
            Some(info) => {
                info.sync()?;
                attach_child(&root, "info", &info.core_root());
            }
            None => {
                node::mapping_delete(&root, "info");
            }
        }
        sync_field(&root, "host", self.host.as_ref(), &mut self.core.host)?;
        sync_field(&root, "basePath", self.base_path.as_ref(), &mut self.core.base_path)?;
        sync_field(&root, "schemes", self.schemes.as_ref(), &mut self.core.schemes)?;
        sync_field(&root, "consumes", self.consumes.as_ref(), &mut self.core.consumes)?;
        sync_field(&root, "produces", self.produces.as_ref(), &mut self.core.produces)?;
        match &mut self.paths {
            Some(paths) => {
                paths.sync()?;
                attach_child(&root, "paths", &paths.core_root());
            }
            None => {
                node::mapping_delete(&root, "paths");
            }
        }
        sync_model_map(&root, "definitions", self.definitions.as_mut(), |s: &mut Schema| {
            s.sync().map(|_| s.core_root())
        })?;
        sync_model_map(&root, "parameters", self.parameters.as_mut(), |p: &mut Parameter| {
            p.sync().map(|_| p.core_root())
        })?;
        sync_model_map(&root, "responses", self.responses.as_mut(), |r: &mut Response| {
            r.sync().map(|_| r.core_root())
        })?;
        sync_model_map(
            &root,
            "securityDefinitions",
            self.security_definitions.as_mut(),
            |s: &mut SecurityScheme| s.sync().map(|_| s.core_root()),
        )?;
        match &mut self.security {
            Some(requirements) => {
                let mut nodes = Vec::with_capacity(requirements.len());
                for requirement in requirements.iter_mut() {
                    requirement.sync()?;
                    nodes.push(requirement.core_root());
                }
                let seq = ensure_seq_node(&root, "security");
                sync_seq_node(&seq, nodes);
            }
            None => {
                node::mapping_delete(&root, "security");
            }
        }
        match &mut self.tags {
            Some(tags) => {
                let mut nodes = Vec::with_capacity(tags.len());
                for tag in tags.iter_mut() {
                    tag.sync()?;
                    nodes.push(tag.core_root());
                }
                let seq = ensure_seq_node(&root, "tags");
                sync_seq_node(&seq, nodes);
            }
            None => {
                node::mapping_delete(&root, "tags");
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
        self.extensions.sync_into(&root)
    }
}

/// Reconcile an optional high-level ordered map of model objects under
/// `key` of the root mapping.
fn sync_model_map<M>(
    root: &NodeRef,
    key: &str,
    map: Option<&mut SequencedMap<String, M>>,
    mut sync_one: impl FnMut(&mut M) -> Result<NodeRef, Error>,
) -> Result<(), Error> {
    match map {
        Some(map) => {
            let mut desired = Vec::with_capacity(map.len());
            for (name, item) in map.iter_mut() {
                desired.push((name.clone(), sync_one(item)?));
            }
            let map_node = ensure_map_node(root, key);
            sync_map_node(&map_node, &desired)?;
        }
        None => {
            node::mapping_delete(root, key);
        }
    }
    Ok(())
}

/// Media-type list validation shared by the document and operations.
pub(crate) fn check_media_types(
    errors: &mut Vec<ValidationError>,
    label: &str,
    media_types: Option<&[String]>,
    node: Option<&NodeRef>,
) {
    let Some(media_types) = media_types else { return };
    for mt in media_types {
        if mt.parse::<mime::Mime>().is_err() {
            errors.push(ValidationError::new(
                Rule::InvalidFormat,
                format!("{label} value `{mt}` is not a valid MIME type"),
                node,
            ));
        }
    }
}

/// A tag used by the specification with additional metadata.
#[derive(Clone, Debug, Default)]
pub struct Tag {
    pub name: Option<String>,
    pub description: Option<String>,
    pub external_docs: Option<ExternalDocumentation>,
    pub extensions: Extensions,
    core: core::Tag,
}

impl Tag {
    pub(crate) fn from_core(mut core: core::Tag) -> Self {
        Self {
            name: core.name.value.clone(),
            description: core.description.value.clone(),
            external_docs: core
                .external_docs
                .take_opt()
                .map(ExternalDocumentation::from_core),
            extensions: std::mem::take(&mut core.extensions),
            core,
        }
    }

    root_helpers!(core::Tag);

    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or_default()
    }

    pub fn description(&self) -> &str {
        self.description.as_deref().unwrap_or_default()
    }

    pub fn validate(&self, opts: &ValidationOptions) -> Vec<ValidationError> {
        match &self.external_docs {
            Some(docs) => docs.validate(opts),
            None => Vec::new(),
        }
    }

    pub(crate) fn sync(&mut self) -> Result<(), Error> {
        let root = self.ensure_root();
        sync_field(&root, "name", self.name.as_ref(), &mut self.core.name)?;
        sync_field(&root, "description", self.description.as_ref(), &mut self.core.description)?;
        match &mut self.external_docs {
            Some(docs) => {
                docs.sync()?;
                attach_child(&root, "externalDocs", &docs.core_root());
            }
            None => {
                node::mapping_delete(&root, "externalDocs");
            }
        }
        self.extensions.sync_into(&root)
    }
}

/// Additional external documentation.
#[derive(Clone, Debug, Default)]
pub struct ExternalDocumentation {
    pub description: Option<String>,
    pub url: Option<String>,
    pub extensions: Extensions,
    core: core::ExternalDocumentation,
}

impl ExternalDocumentation {
    pub(crate) fn from_core(mut core: core::ExternalDocumentation) -> Self {
        Self {
            description: core.description.value.clone(),
            url: core.url.value.clone(),
            extensions: std::mem::take(&mut core.extensions),
            core,
        }
    }

    root_helpers!(core::ExternalDocumentation);

    pub fn url(&self) -> &str {
        self.url.as_deref().unwrap_or_default()
    }

    pub fn validate(&self, _opts: &ValidationOptions) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        if let Some(url) = &self.url {
            if url::Url::parse(url).is_err() {
                errors.push(ValidationError::new(
                    Rule::InvalidFormat,
                    format!("externalDocs.url must be a valid URI, got `{url}`"),
                    self.core.url.value_node.as_ref(),
                ));
            }
        }
        errors
    }

    pub(crate) fn sync(&mut self) -> Result<(), Error> {
        let root = self.ensure_root();
        sync_field(&root, "description", self.description.as_ref(), &mut self.core.description)?;
        sync_field(&root, "url", self.url.as_ref(), &mut self.core.url)?;
        self.extensions.sync_into(&root)
    }
}
