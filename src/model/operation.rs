//! High-level API operation.

use crate::core;
use crate::error::Error;
use crate::marshal::field::sync_field;
use crate::marshal::{Extensions, Reference};
use crate::node::{self};
use crate::validation::{Rule, ValidationError, ValidationOptions};

use super::swagger::{check_media_types, DocumentMediaTypes, ALLOWED_SCHEMES};
use super::{
    attach_child, ensure_seq_node, map_reference, root_helpers, sync_parameter_list, sync_seq_node,
    ExternalDocumentation, Parameter, Responses, SecurityRequirement,
};

/// Validation context: the media types the *enclosing operation* consumes,
/// after falling back to the document-level list.
pub struct OperationMediaTypes {
    pub consumes: Vec<String>,
}

/// A single API operation on a path.
#[derive(Clone, Debug, Default)]
pub struct Operation {
    pub tags: Option<Vec<String>>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub external_docs: Option<ExternalDocumentation>,
    pub operation_id: Option<String>,
    pub consumes: Option<Vec<String>>,
    pub produces: Option<Vec<String>>,
    pub parameters: Option<Vec<Reference<Parameter>>>,
    pub responses: Option<Responses>,
    pub schemes: Option<Vec<String>>,
    pub deprecated: Option<bool>,
    pub security: Option<Vec<SecurityRequirement>>,
    pub extensions: Extensions,
    core: core::Operation,
}

impl Operation {
    pub(crate) fn from_core(mut core: core::Operation) -> Self {
        Self {
            tags: core.tags.value.clone(),
            summary: core.summary.value.clone(),
            description: core.description.value.clone(),
            external_docs: core
                .external_docs
                .take_opt()
                .map(ExternalDocumentation::from_core),
            operation_id: core.operation_id.value.clone(),
            consumes: core.consumes.value.clone(),
            produces: core.produces.value.clone(),
            parameters: core.parameters.take_opt().map(|v| {
                v.into_iter()
                    .map(|r| map_reference(r, Parameter::from_core))
                    .collect()
            }),
            responses: core.responses.take_opt().map(Responses::from_core),
            schemes: core.schemes.value.clone(),
            deprecated: core.deprecated.value,
            security: core
                .security
                .take_opt()
                .map(|v| v.into_iter().map(SecurityRequirement::from_core).collect()),
            extensions: std::mem::take(&mut core.extensions),
            core,
        }
    }

    root_helpers!(core::Operation);

    pub fn operation_id(&self) -> &str {
        self.operation_id.as_deref().unwrap_or_default()
    }

    pub fn summary(&self) -> &str {
        self.summary.as_deref().unwrap_or_default()
    }

    pub fn deprecated(&self) -> bool {
        self.deprecated.unwrap_or(false)
    }

    pub fn consumes(&self) -> &[String] {
        self.consumes.as_deref().unwrap_or_default()
    }

    pub fn produces(&self) -> &[String] {
        self.produces.as_deref().unwrap_or_default()
    }

    pub fn parameters(&self) -> &[Reference<Parameter>] {
        self.parameters.as_deref().unwrap_or_default()
    }

    pub fn responses(&self) -> Option<&Responses> {
        self.responses.as_ref()
    }

    /// The consumes list that applies to this operation: its own, falling
    /// back to the document's.
    pub fn effective_consumes(&self, opts: &ValidationOptions) -> Vec<String> {
        if let Some(own) = &self.consumes {
            return own.clone();
        }
        opts.get::<DocumentMediaTypes>()
            .map(|doc| doc.consumes.clone())
            .unwrap_or_default()
    }

    pub fn validate(&self, opts: &ValidationOptions) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        if let Some(schemes) = &self.schemes {
            for scheme in schemes {
                if !ALLOWED_SCHEMES.contains(&scheme.as_str()) {
                    errors.push(ValidationError::new(
                        Rule::AllowedValues,
                        format!(
                            "operation.schemes value `{scheme}` must be one of http, https, ws, wss"
                        ),
                        self.core.schemes.value_node.as_ref(),
                    ));
                }
            }
        }
        check_media_types(
            &mut errors,
            "operation.consumes",
            self.consumes.as_deref(),
            self.core.consumes.value_node.as_ref(),
        );
        check_media_types(
            &mut errors,
            "operation.produces",
            self.produces.as_deref(),
            self.core.produces.value_node.as_ref(),
        );
        if let Some(docs) = &self.external_docs {
            errors.extend(docs.validate(opts));
        }
        if let Some(responses) = &self.responses {
            errors.extend(responses.validate(opts));
        }
        // Parameters see the operation's resolved consumes (the file-type
        // rule couples to it).
        let mut child_opts = ValidationOptions::new();
        child_opts.set(OperationMediaTypes {
            consumes: self.effective_consumes(opts),
        });
        if let Some(parameters) = &self.parameters {
            let mut body_params = 0usize;
            for parameter in parameters {
                if let Some(parameter) = parameter.inline() {
                    if parameter.location() == "body" {
                        body_params += 1;
                    }
                    errors.extend(parameter.validate(&child_opts));
                }
            }
            if body_params > 1 {
                errors.push(ValidationError::new(
                    Rule::AllowedValues,
                    "operation.parameters allows at most one body parameter",
                    self.core.parameters.value_node.as_ref(),
                ));
            }
        }
        if let Some(security) = &self.security {
            for requirement in security {
                errors.extend(requirement.validate(opts));
            }
        }
        errors
    }

    pub(crate) fn sync(&mut self) -> Result<(), Error> {
        let root = self.ensure_root();
        sync_field(&root, "tags", self.tags.as_ref(), &mut self.core.tags)?;
        sync_field(&root, "summary", self.summary.as_ref(), &mut self.core.summary)?;
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
        sync_field(
            &root,
            "operationId",
            self.operation_id.as_ref(),
            &mut self.core.operation_id,
        )?;
        sync_field(&root, "consumes", self.consumes.as_ref(), &mut self.core.consumes)?;
        sync_field(&root, "produces", self.produces.as_ref(), &mut self.core.produces)?;
        sync_parameter_list(&root, "parameters", self.parameters.as_mut())?;
        match &mut self.responses {
            Some(responses) => {
                responses.sync()?;
                attach_child(&root, "responses", &responses.core_root());
            }
            None => {
                node::mapping_delete(&root, "responses");
            }
        }
        sync_field(&root, "schemes", self.schemes.as_ref(), &mut self.core.schemes)?;
        sync_field(&root, "deprecated", self.deprecated.as_ref(), &mut self.core.deprecated)?;
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
        self.extensions.sync_into(&root)
    }
}
