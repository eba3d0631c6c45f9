//! High-level security schemes and requirements.

use crate::core;
use crate::error::Error;
use crate::marshal::field::sync_field;
use crate::marshal::Extensions;
use crate::node::{self, Node};
use crate::seqmap::SequencedMap;
use crate::validation::{Rule, ValidationError, ValidationOptions};

use super::swagger::SecuritySchemeTypes;
use super::root_helpers;

const SCHEME_TYPES: &[&str] = &["basic", "apiKey", "oauth2"];
const API_KEY_LOCATIONS: &[&str] = &["query", "header"];
const OAUTH2_FLOWS: &[&str] = &["implicit", "password", "application", "accessCode"];

/// A security scheme definition.
#[derive(Clone, Debug, Default)]
pub struct SecurityScheme {
    pub r#type: Option<String>,
    pub description: Option<String>,
    pub name: Option<String>,
    pub r#in: Option<String>,
    pub flow: Option<String>,
    pub authorization_url: Option<String>,
    pub token_url: Option<String>,
    pub scopes: Option<SequencedMap<String, String>>,
    pub extensions: Extensions,
    core: core::SecurityScheme,
}

impl SecurityScheme {
    pub(crate) fn from_core(mut core: core::SecurityScheme) -> Self {
        Self {
            r#type: core.r#type.value.clone(),
            description: core.description.value.clone(),
            name: core.name.value.clone(),
            r#in: core.r#in.value.clone(),
            flow: core.flow.value.clone(),
            authorization_url: core.authorization_url.value.clone(),
            token_url: core.token_url.value.clone(),
            scopes: core.scopes.value.clone(),
            extensions: std::mem::take(&mut core.extensions),
            core,
        }
    }

    root_helpers!(core::SecurityScheme);

    pub fn type_str(&self) -> &str {
        self.r#type.as_deref().unwrap_or_default()
    }

    pub fn flow(&self) -> &str {
        self.flow.as_deref().unwrap_or_default()
    }

    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or_default()
    }

    pub fn location(&self) -> &str {
        self.r#in.as_deref().unwrap_or_default()
    }

    pub fn validate(&self, _opts: &ValidationOptions) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        let at_root = self.core.core.root.as_ref();
        let Some(type_name) = &self.r#type else {
            return errors;
        };
        if !SCHEME_TYPES.contains(&type_name.as_str()) {
            errors.push(ValidationError::new(
                Rule::AllowedValues,
                format!(
                    "securityScheme.type must be one of basic, apiKey, oauth2; got `{type_name}`"
                ),
                self.core.r#type.value_node.as_ref(),
            ));
            return errors;
        }
        match type_name.as_str() {
            "apiKey" => {
                if self.name.is_none() {
                    errors.push(ValidationError::new(
                        Rule::RequiredField,
                        "securityScheme.name is missing",
                        at_root,
                    ));
                }
                match &self.r#in {
                    None => errors.push(ValidationError::new(
                        Rule::RequiredField,
                        "securityScheme.in is missing",
                        at_root,
                    )),
                    Some(location) if !API_KEY_LOCATIONS.contains(&location.as_str()) => {
                        errors.push(ValidationError::new(
                            Rule::AllowedValues,
                            format!(
                                "securityScheme.in must be one of query, header; got `{location}`"
                            ),
                            self.core.r#in.value_node.as_ref(),
                        ));
                    }
                    Some(_) => {}
                }
            }
            "oauth2" => {
                match &self.flow {
                    None => errors.push(ValidationError::new(
                        Rule::RequiredField,
                        "securityScheme.flow is missing",
                        at_root,
                    )),
                    Some(flow) => {
                        if !OAUTH2_FLOWS.contains(&flow.as_str()) {
                            errors.push(ValidationError::new(
                                Rule::AllowedValues,
                                format!(
                                    "securityScheme.flow must be one of implicit, password, application, accessCode; got `{flow}`"
                                ),
                                self.core.flow.value_node.as_ref(),
                            ));
                        } else {
                            if matches!(flow.as_str(), "implicit" | "accessCode")
                                && self.authorization_url.is_none()
                            {
                                errors.push(ValidationError::new(
                                    Rule::RequiredField,
                                    "securityScheme.authorizationUrl is missing",
                                    at_root,
                                ));
                            }
                            if matches!(flow.as_str(), "password" | "application" | "accessCode")
                                && self.token_url.is_none()
                            {
                                errors.push(ValidationError::new(
                                    Rule::RequiredField,
                                    "securityScheme.tokenUrl is missing",
                                    at_root,
                                ));
                            }
                        }
                    }
                }
                if self.scopes.is_none() {
                    errors.push(ValidationError::new(
                        Rule::RequiredField,
                        "securityScheme.scopes is missing",
                        at_root,
                    ));
                }
            }
            _ => {}
        }
        errors
    }

    pub(crate) fn sync(&mut self) -> Result<(), Error> {
        let root = self.ensure_root();
        sync_field(&root, "type", self.r#type.as_ref(), &mut self.core.r#type)?;
        sync_field(&root, "description", self.description.as_ref(), &mut self.core.description)?;
        sync_field(&root, "name", self.name.as_ref(), &mut self.core.name)?;
        sync_field(&root, "in", self.r#in.as_ref(), &mut self.core.r#in)?;
        sync_field(&root, "flow", self.flow.as_ref(), &mut self.core.flow)?;
        sync_field(
            &root,
            "authorizationUrl",
            self.authorization_url.as_ref(),
            &mut self.core.authorization_url,
        )?;
        sync_field(&root, "tokenUrl", self.token_url.as_ref(), &mut self.core.token_url)?;
        sync_field(&root, "scopes", self.scopes.as_ref(), &mut self.core.scopes)?;
        self.extensions.sync_into(&root)
    }
}

/// One alternative set of required security schemes: scheme name → scopes.
#[derive(Clone, Debug, Default)]
pub struct SecurityRequirement {
    schemes: SequencedMap<String, Vec<String>>,
    core: core::SecurityRequirement,
}

impl SecurityRequirement {
    /// An initialized empty requirement (serializes as `{}`).
    pub fn new() -> Self {
        SecurityRequirement {
            schemes: SequencedMap::new(),
            core: core::SecurityRequirement::default(),
        }
    }

    pub(crate) fn from_core(core: core::SecurityRequirement) -> Self {
        SecurityRequirement {
            schemes: core.schemes.clone(),
            core,
        }
    }

    pub fn get_core(&self) -> &core::SecurityRequirement {
        &self.core
    }

    pub fn len(&self) -> usize {
        self.schemes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemes.is_empty()
    }

    pub fn get(&self, scheme: &str) -> Option<&Vec<String>> {
        self.schemes.get(&scheme.to_owned())
    }

    pub fn set<K: Into<String>>(&mut self, scheme: K, scopes: Vec<String>) {
        self.schemes.set(scheme.into(), scopes);
    }

    pub fn delete(&mut self, scheme: &str) -> bool {
        self.schemes.delete(&scheme.to_owned()).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<String>)> {
        self.schemes.iter()
    }

    pub fn validate(&self, opts: &ValidationOptions) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        let Some(defined) = opts.get::<SecuritySchemeTypes>() else {
            return errors;
        };
        for (name, scopes) in self.schemes.iter() {
            let at = node::mapping_key_node(&self.core_root_node(), name);
            match defined.types.get(name) {
                None => errors.push(ValidationError::new(
                    Rule::AllowedValues,
                    format!(
                        "securityRequirement references `{name}` which is not defined in securityDefinitions"
                    ),
                    at.as_ref(),
                )),
                Some(scheme_type) => {
                    if scheme_type != "oauth2" && !scopes.is_empty() {
                        errors.push(ValidationError::new(
                            Rule::AllowedValues,
                            format!(
                                "securityRequirement scopes must be empty for non-oauth2 scheme `{name}`"
                            ),
                            at.as_ref(),
                        ));
                    }
                }
            }
        }
        errors
    }

    fn core_root_node(&self) -> node::NodeRef {
        self.core
            .core
            .root
            .clone()
            .unwrap_or_else(|| Node::mapping(crate::node::Style::Flow))
    }

    pub(crate) fn core_root(&self) -> node::NodeRef {
        self.core_root_node()
    }

    pub(crate) fn sync(&mut self) -> Result<(), Error> {
        if self.schemes == self.core.schemes && self.core.core.root.is_some() {
            return Ok(());
        }
        let root = match &self.core.core.root {
            Some(root) => root.clone(),
            None => {
                let map = Node::mapping(if self.schemes.is_empty() {
                    crate::node::Style::Flow
                } else {
                    crate::node::Style::Block
                });
                self.core.core.root = Some(map.clone());
                map
            }
        };
        for existing in node::mapping_keys(&root) {
            if self.schemes.get(&existing).is_none() {
                node::mapping_delete(&root, &existing);
            }
        }
        for (name, scopes) in self.schemes.iter() {
            use crate::marshal::CoreValue;
            let unchanged = self.core.schemes.get(name) == Some(scopes)
                && node::mapping_get(&root, name).is_some();
            if !unchanged {
                node::mapping_set(&root, name, scopes.build_node()?);
            }
        }
        self.core.schemes = self.schemes.clone();
        Ok(())
    }
}
