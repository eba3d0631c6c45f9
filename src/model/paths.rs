//! High-level `paths` container and path items.

use crate::core;
use crate::error::Error;
use crate::marshal::{Extensions, Reference};
use crate::node;
use crate::seqmap::SequencedMap;
use crate::validation::{Rule, ValidationError, ValidationOptions};

use super::{
    attach_child, map_reference, root_helpers, sync_map_node, sync_reference, Operation, Parameter,
};

/// The relative paths to the individual endpoints, embedding a typed
/// ordered map from path template to (possibly referenced) path item.
#[derive(Clone, Debug, Default)]
pub struct Paths {
    map: SequencedMap<String, Reference<PathItem>>,
    pub extensions: Extensions,
    core: core::Paths,
}

impl Paths {
    /// An initialized empty container; serializes as `{}` rather than
    /// being omitted.
    pub fn new() -> Self {
        Paths {
            map: SequencedMap::new(),
            extensions: Extensions::default(),
            core: core::Paths::default(),
        }
    }

    pub(crate) fn from_core(mut core: core::Paths) -> Self {
        let mut map = SequencedMap::new();
        let items = std::mem::take(&mut core.items);
        for (key, item) in items {
            map.set(key, map_reference(item, PathItem::from_core));
        }
        Paths {
            map,
            extensions: std::mem::take(&mut core.extensions),
            core,
        }
    }

    root_helpers!(core::Paths);

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn get(&self, path: &str) -> Option<&Reference<PathItem>> {
        self.map.get(&path.to_owned())
    }

    pub fn get_mut(&mut self, path: &str) -> Option<&mut Reference<PathItem>> {
        self.map.get_mut(&path.to_owned())
    }

    pub fn set<K: Into<String>>(&mut self, path: K, item: Reference<PathItem>) {
        self.map.set(path.into(), item);
    }

    pub fn delete(&mut self, path: &str) -> bool {
        self.map.delete(&path.to_owned()).is_some()
    }

    /// Entries in document order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Reference<PathItem>)> {
        self.map.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&String, &mut Reference<PathItem>)> {
        self.map.iter_mut()
    }

    pub fn validate(&self, opts: &ValidationOptions) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        for (path, item) in self.map.iter() {
            if !path.starts_with('/') {
                errors.push(ValidationError::new(
                    Rule::InvalidFormat,
                    format!("paths key `{path}` must start with `/`"),
                    node::mapping_key_node(
                        &self.core_root(),
                        path,
                    )
                    .as_ref(),
                ));
            }
            if let Some(item) = item.inline() {
                errors.extend(item.validate(opts));
            }
        }
        errors
    }

    pub(crate) fn sync(&mut self) -> Result<(), Error> {
        let root = self.ensure_root();
        let mut desired = Vec::with_capacity(self.map.len());
        for (path, item) in self.map.iter_mut() {
            let node = sync_reference(item, |inline| {
                inline.sync()?;
                Ok(inline.core_root())
            })?;
            desired.push((path.clone(), node));
        }
        sync_map_node(&root, &desired)?;
        self.extensions.sync_into(&root)
    }
}

/// The operations available on a single path.
#[derive(Clone, Debug, Default)]
pub struct PathItem {
    pub get: Option<Operation>,
    pub put: Option<Operation>,
    pub post: Option<Operation>,
    pub delete: Option<Operation>,
    pub options: Option<Operation>,
    pub head: Option<Operation>,
    pub patch: Option<Operation>,
    pub parameters: Option<Vec<Reference<Parameter>>>,
    pub extensions: Extensions,
    core: core::PathItem,
}

impl PathItem {
    pub(crate) fn from_core(mut core: core::PathItem) -> Self {
        Self {
            get: core.get.take_opt().map(Operation::from_core),
            put: core.put.take_opt().map(Operation::from_core),
            post: core.post.take_opt().map(Operation::from_core),
            delete: core.delete.take_opt().map(Operation::from_core),
            options: core.options.take_opt().map(Operation::from_core),
            head: core.head.take_opt().map(Operation::from_core),
            patch: core.patch.take_opt().map(Operation::from_core),
            parameters: core.parameters.take_opt().map(|v| {
                v.into_iter()
                    .map(|r| map_reference(r, Parameter::from_core))
                    .collect()
            }),
            extensions: std::mem::take(&mut core.extensions),
            core,
        }
    }

    root_helpers!(core::PathItem);

    /// Present operations in the fixed method order the wire uses.
    pub fn operations(&self) -> Vec<(&'static str, &Operation)> {
        let mut out = Vec::new();
        for (method, op) in [
            ("get", &self.get),
            ("put", &self.put),
            ("post", &self.post),
            ("delete", &self.delete),
            ("options", &self.options),
            ("head", &self.head),
            ("patch", &self.patch),
        ] {
            if let Some(op) = op {
                out.push((method, op));
            }
        }
        out
    }

    pub fn validate(&self, opts: &ValidationOptions) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        for (_, operation) in self.operations() {
            errors.extend(operation.validate(opts));
        }
        if let Some(parameters) = &self.parameters {
            for parameter in parameters {
                if let Some(parameter) = parameter.inline() {
                    errors.extend(parameter.validate(opts));
                }
            }
        }
        errors
    }

    pub(crate) fn sync(&mut self) -> Result<(), Error> {
        let root = self.ensure_root();
        macro_rules! sync_op {
            ($field:ident, $key:literal) => {
                match &mut self.$field {
                    Some(op) => {
                        op.sync()?;
                        attach_child(&root, $key, &op.core_root());
                    }
                    None => {
                        node::mapping_delete(&root, $key);
                    }
                }
            };
        }
        sync_op!(get, "get");
        sync_op!(put, "put");
        sync_op!(post, "post");
        sync_op!(delete, "delete");
        sync_op!(options, "options");
        sync_op!(head, "head");
        sync_op!(patch, "patch");
        super::sync_parameter_list(&root, "parameters", self.parameters.as_mut())?;
        self.extensions.sync_into(&root)
    }
}
