//! High-level `info`, `contact` and `license` objects.

use crate::core;
use crate::error::Error;
use crate::marshal::field::sync_field;
use crate::marshal::Extensions;
use crate::node::{self, Node, NodeRef, Style};
use crate::validation::{Rule, ValidationError, ValidationOptions};

use super::attach_child;

/// Metadata about the API.
#[derive(Clone, Debug, Default)]
pub struct Info {
    pub title: Option<String>,
    pub description: Option<String>,
    pub terms_of_service: Option<String>,
    pub contact: Option<Contact>,
    pub license: Option<License>,
    pub version: Option<String>,
    pub extensions: Extensions,
    core: core::Info,
}

impl Info {
    pub(crate) fn from_core(mut core: core::Info) -> Self {
        Self {
            title: core.title.value.clone(),
            description: core.description.value.clone(),
            terms_of_service: core.terms_of_service.value.clone(),
            contact: core.contact.take_opt().map(Contact::from_core),
            license: core.license.take_opt().map(License::from_core),
            version: core.version.value.clone(),
            extensions: std::mem::take(&mut core.extensions),
            core,
        }
    }

    pub fn get_core(&self) -> &core::Info {
        &self.core
    }

    pub fn title(&self) -> &str {
        self.title.as_deref().unwrap_or_default()
    }

    pub fn description(&self) -> &str {
        self.description.as_deref().unwrap_or_default()
    }

    pub fn terms_of_service(&self) -> &str {
        self.terms_of_service.as_deref().unwrap_or_default()
    }

    pub fn contact(&self) -> Option<&Contact> {
        self.contact.as_ref()
    }

    pub fn license(&self) -> Option<&License> {
        self.license.as_ref()
    }

    pub fn version(&self) -> &str {
        self.version.as_deref().unwrap_or_default()
    }

    pub fn validate(&self, opts: &ValidationOptions) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        if let Some(terms) = &self.terms_of_service {
            if url::Url::parse(terms).is_err() {
                errors.push(ValidationError::new(
                    Rule::InvalidFormat,
                    format!("info.termsOfService must be a valid URI, got `{terms}`"),
                    self.core.terms_of_service.value_node.as_ref(),
                ));
            }
        }
        if let Some(contact) = &self.contact {
            errors.extend(contact.validate(opts));
        }
        if let Some(license) = &self.license {
            errors.extend(license.validate(opts));
        }
        errors
    }

    pub(crate) fn sync(&mut self) -> Result<(), Error> {
        let root = self.ensure_root();
        sync_field(&root, "title", self.title.as_ref(), &mut self.core.title)?;
        sync_field(&root, "description", self.description.as_ref(), &mut self.core.description)?;
        sync_field(
            &root,
            "termsOfService",
            self.terms_of_service.as_ref(),
            &mut self.core.terms_of_service,
        )?;
        match &mut self.contact {
            Some(contact) => {
                contact.sync()?;
                attach_child(&root, "contact", &contact.core_root());
            }
            None => {
                node::mapping_delete(&root, "contact");
            }
        }
        match &mut self.license {
            Some(license) => {
                license.sync()?;
                attach_child(&root, "license", &license.core_root());
            }
            None => {
                node::mapping_delete(&root, "license");
            }
        }
        sync_field(&root, "version", self.version.as_ref(), &mut self.core.version)?;
        self.extensions.sync_into(&root)
    }

    pub(crate) fn ensure_root(&mut self) -> NodeRef {
        if let Some(root) = &self.core.core.root {
            return root.clone();
        }
        let map = Node::mapping(Style::Block);
        self.core.core.root = Some(map.clone());
        map
    }

    pub(crate) fn core_root(&self) -> NodeRef {
        self.core
            .core
            .root
            .clone()
            .unwrap_or_else(|| Node::mapping(Style::Block))
    }
}

/// Contact information for the exposed API.
#[derive(Clone, Debug, Default)]
pub struct Contact {
    pub name: Option<String>,
    pub url: Option<String>,
    pub email: Option<String>,
    pub extensions: Extensions,
    core: core::Contact,
}

impl Contact {
    pub(crate) fn from_core(mut core: core::Contact) -> Self {
        Self {
            name: core.name.value.clone(),
            url: core.url.value.clone(),
            email: core.email.value.clone(),
            extensions: std::mem::take(&mut core.extensions),
            core,
        }
    }

    pub fn get_core(&self) -> &core::Contact {
        &self.core
    }

    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or_default()
    }

    pub fn url(&self) -> &str {
        self.url.as_deref().unwrap_or_default()
    }

    pub fn email(&self) -> &str {
        self.email.as_deref().unwrap_or_default()
    }

    pub fn validate(&self, _opts: &ValidationOptions) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        if let Some(url) = &self.url {
            if url::Url::parse(url).is_err() {
                errors.push(ValidationError::new(
                    Rule::InvalidFormat,
                    format!("contact.url must be a valid URI, got `{url}`"),
                    self.core.url.value_node.as_ref(),
                ));
            }
        }
        if let Some(email) = &self.email {
            if !is_valid_email(email) {
                errors.push(ValidationError::new(
                    Rule::InvalidFormat,
                    format!("contact.email must be a valid email address, got `{email}`"),
                    self.core.email.value_node.as_ref(),
                ));
            }
        }
        errors
    }

    pub(crate) fn sync(&mut self) -> Result<(), Error> {
        let root = self.ensure_root();
        sync_field(&root, "name", self.name.as_ref(), &mut self.core.name)?;
        sync_field(&root, "url", self.url.as_ref(), &mut self.core.url)?;
        sync_field(&root, "email", self.email.as_ref(), &mut self.core.email)?;
        self.extensions.sync_into(&root)
    }

    pub(crate) fn ensure_root(&mut self) -> NodeRef {
        if let Some(root) = &self.core.core.root {
            return root.clone();
        }
        let map = Node::mapping(Style::Block);
        self.core.core.root = Some(map.clone());
        map
    }

    pub(crate) fn core_root(&self) -> NodeRef {
        self.core
            .core
            .root
            .clone()
            .unwrap_or_else(|| Node::mapping(Style::Block))
    }
}

/// License information for the exposed API.
#[derive(Clone, Debug, Default)]
pub struct License {
    pub name: Option<String>,
    pub url: Option<String>,
    pub extensions: Extensions,
    core: core::License,
}

impl License {
    pub(crate) fn from_core(mut core: core::License) -> Self {
        Self {
            name: core.name.value.clone(),
            url: core.url.value.clone(),
            extensions: std::mem::take(&mut core.extensions),
            core,
        }
    }

    pub fn get_core(&self) -> &core::License {
        &self.core
    }

    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or_default()
    }

    pub fn url(&self) -> &str {
        self.url.as_deref().unwrap_or_default()
    }

    pub fn validate(&self, _opts: &ValidationOptions) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        if let Some(url) = &self.url {
            if url::Url::parse(url).is_err() {
                errors.push(ValidationError::new(
                    Rule::InvalidFormat,
                    format!("license.url must be a valid URI, got `{url}`"),
                    self.core.url.value_node.as_ref(),
                ));
            }
        }
        errors
    }

    pub(crate) fn sync(&mut self) -> Result<(), Error> {
        let root = self.ensure_root();
        sync_field(&root, "name", self.name.as_ref(), &mut self.core.name)?;
        sync_field(&root, "url", self.url.as_ref(), &mut self.core.url)?;
        self.extensions.sync_into(&root)
    }

    pub(crate) fn ensure_root(&mut self) -> NodeRef {
        if let Some(root) = &self.core.core.root {
            return root.clone();
        }
        let map = Node::mapping(Style::Block);
        self.core.core.root = Some(map.clone());
        map
    }

    pub(crate) fn core_root(&self) -> NodeRef {
        self.core
            .core
            .root
            .clone()
            .unwrap_or_else(|| Node::mapping(Style::Block))
    }
}

/// Minimal RFC 5322-flavored address check: one `@`, non-empty local part,
/// and a dotted domain with no whitespace.
pub(crate) fn is_valid_email(s: &str) -> bool {
    let Some((local, domain)) = s.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.is_empty()
        && domain.contains('.')
        && !s.chars().any(char::is_whitespace)
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}
