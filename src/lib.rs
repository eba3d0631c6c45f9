//! Swagger 2.0 parser, validator and OpenAPI 3.0 upgrader with
//! byte-faithful round-tripping.
//!
//! The crate parses YAML or JSON API descriptions into a two-layer model:
//! a lossless core model where every field keeps a handle to the node it
//! was parsed from, and an ergonomic high-level model on top. Validation
//! produces structured errors carrying source positions and rule tags.
//! Marshalling an untouched document reproduces the input byte-for-byte —
//! key order, quoting, flow/block styles, comments and anchors survive.
//!
//! ```rust
//! let source = "swagger: \"2.0\"\ninfo:\n  title: Test API\n  version: 1.0.0\npaths: {}\n";
//! let (doc, errors) = swagger_saphyr::unmarshal(source).unwrap();
//! assert!(errors.is_empty());
//! assert_eq!(doc.swagger(), "2.0");
//! assert_eq!(swagger_saphyr::marshal(&doc).unwrap(), source);
//! ```
//!
//! The upgrade pathway re-projects a parsed document into the OpenAPI 3.0
//! shape without touching the input:
//!
//! ```rust
//! let source = "swagger: \"2.0\"\ninfo:\n  title: T\n  version: \"1\"\npaths: {}\n";
//! let (doc, _) = swagger_saphyr::unmarshal(source).unwrap();
//! let upgraded = swagger_saphyr::upgrade::upgrade(&doc);
//! assert_eq!(upgraded.openapi, "3.0.0");
//! ```

pub use crate::config::{DocFormat, SerializeConfig};
pub use crate::error::Error;
pub use crate::location::{Location, Span};
pub use crate::marshal::{CoreMeta, CoreValue, Either, Extensions, NodeField, Reference};
pub use crate::node::{Node, NodeKind, NodeRef, Style};
pub use crate::options::{AliasLimits, DuplicateKeyPolicy, Options};
pub use crate::seqmap::{AnySequencedMap, SequencedMap};
pub use crate::validation::{
    sort_validation_errors, Rule, Severity, ValidationError, ValidationOptions,
};
pub use crate::value::{Value, ValueKind};

mod compose;
mod config;
pub mod core;
mod emit;
mod error;
mod location;
pub(crate) mod marshal;
pub mod model;
pub mod node;
pub mod openapi3;
mod options;
mod reader;
pub mod registry;
mod scalars;
pub mod seqmap;
pub mod upgrade;
mod validation;
pub mod value;
pub mod walker;

use std::io;

use crate::marshal::{CoreValue as _, UnmarshalCtx};

/// Parse one Swagger 2.0 document from a string with default options.
///
/// Returns the document model plus every validation error found; the model
/// is populated best-effort even when errors are present. Fatal conditions
/// (unparseable input, multiple documents, alias bombs) are the `Err` side.
pub fn unmarshal(input: &str) -> Result<(model::Swagger, Vec<ValidationError>), Error> {
    unmarshal_with_options(input, Options::default())
}

/// Parse one Swagger 2.0 document with configurable [`Options`].
pub fn unmarshal_with_options(
    input: &str,
    options: Options,
) -> Result<(model::Swagger, Vec<ValidationError>), Error> {
    core::register_models();
    tracing::debug!(bytes = input.len(), "unmarshalling document");

    let outcome = compose::parse_str(input, &options)?;
    let mut errors = outcome.errors;
    let Some(content) = node::document_content(&outcome.root) else {
        return Err(Error::msg("empty document"));
    };

    let mut ctx = UnmarshalCtx {
        errors: &mut errors,
        config: outcome.config,
    };
    let um = core::Swagger::unmarshal(&content, core::Swagger::MODEL, &mut ctx)?;
    let mut doc = model::Swagger::from_core(um.value, outcome.root, outcome.config);

    if !options.skip_validation {
        errors.extend(doc.validate());
    }
    doc.set_semantic_valid(errors.iter().all(|e| e.severity != Severity::Error));
    Ok((doc, errors))
}

/// Parse from any reader (UTF-8 or UTF-16 with BOM).
pub fn unmarshal_reader<R: io::Read>(
    reader: R,
    options: Options,
) -> Result<(model::Swagger, Vec<ValidationError>), Error> {
    let input = reader::decode_to_string(reader)?;
    unmarshal_with_options(&input, options)
}

/// Serialize the document's node tree back to text in its original format.
///
/// Marshal reads the node tree only: mutations made on the high-level
/// model become visible after [`sync`].
pub fn marshal(doc: &model::Swagger) -> Result<String, Error> {
    emit::emit(doc.document(), doc.config())
}

/// Serialize into an `io::Write` target.
pub fn marshal_to_writer<W: io::Write>(writer: &mut W, doc: &model::Swagger) -> Result<(), Error> {
    let text = marshal(doc)?;
    writer.write_all(text.as_bytes())?;
    Ok(())
}

/// Reconcile high-level mutations into the node tree, rewriting values in
/// place so unchanged content keeps its original bytes.
pub fn sync(doc: &mut model::Swagger) -> Result<(), Error> {
    doc.sync()
}
