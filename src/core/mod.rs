//! The core model: field-tagged structs mirroring the Swagger 2.0 wire
//! shape exactly, every field wrapped in its node-tracking envelope.
//!
//! Nothing here is ergonomic on purpose — the high-level model in
//! `crate::model` is the façade. The core layer's job is losslessness: it
//! keeps hold of every node it was parsed from so errors point at real
//! lines and marshalling reproduces the input.

use std::sync::Once;

use crate::registry;

mod info;
mod operation;
mod parameter;
mod paths;
mod responses;
mod schema;
mod security;
mod swagger;

pub use info::{Contact, Info, License};
pub use operation::Operation;
pub use parameter::{Items, Parameter};
pub use paths::{PathItem, Paths};
pub use responses::{Header, Response, Responses};
pub use schema::{Schema, Xml};
pub use security::{SecurityRequirement, SecurityScheme};
pub use swagger::{ExternalDocumentation, Swagger, Tag};

static REGISTER: Once = Once::new();

/// Populate the type factory registry with every type the marshaller may
/// need to materialize for an ordered-map value. Runs once per process;
/// the unmarshal entry points call it before touching any node.
pub(crate) fn register_models() {
    REGISTER.call_once(|| {
        registry::register::<String>();
        registry::register::<Vec<String>>();
        registry::register::<crate::value::Value>();
        registry::register::<Schema>();
        registry::register::<Parameter>();
        registry::register::<Response>();
        registry::register::<Header>();
        registry::register::<SecurityScheme>();
        registry::register::<PathItem>();
        registry::register::<crate::marshal::Reference<Response>>();
        registry::register::<crate::marshal::Reference<PathItem>>();
        registry::register::<crate::marshal::Reference<Parameter>>();
    });
}
