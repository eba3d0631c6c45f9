//! Wire shape of the root document object, tags and external docs.

use crate::marshal::macros::{core_object, core_required};
use crate::seqmap::SequencedMap;

use super::{Info, Parameter, Paths, Response, Schema, SecurityRequirement, SecurityScheme};

core_object! {
    /// The root document object.
    ///
    /// ```yaml
    /// swagger: "2.0"
    /// info:
    ///   title: Swagger Petstore
    ///   version: "1.0.0"
    /// host: petstore.swagger.io
    /// basePath: /api
    /// schemes:
    ///   - https
    /// paths:
    ///   /pets:
    ///     get:
    ///       responses:
    ///         "200":
    ///           description: A list of pets.
    /// ```
    pub struct Swagger, model = "swagger" {
        swagger: String, key = "swagger", required;
        info: Info, key = "info", required;
        host: String, key = "host";
        base_path: String, key = "basePath";
        schemes: Vec<String>, key = "schemes";
        consumes: Vec<String>, key = "consumes";
        produces: Vec<String>, key = "produces";
        paths: Paths, key = "paths", required;
        definitions: SequencedMap<String, Schema>, key = "definitions";
        parameters: SequencedMap<String, Parameter>, key = "parameters";
        responses: SequencedMap<String, Response>, key = "responses";
        security_definitions: SequencedMap<String, SecurityScheme>, key = "securityDefinitions";
        security: Vec<SecurityRequirement>, key = "security";
        tags: Vec<Tag>, key = "tags";
        external_docs: ExternalDocumentation, key = "externalDocs";
    }
}

core_object! {
    /// A tag used by the specification with additional metadata.
    pub struct Tag, model = "tag" {
        name: String, key = "name", required;
        description: String, key = "description";
        external_docs: ExternalDocumentation, key = "externalDocs";
    }
}

core_object! {
    /// Additional external documentation.
    pub struct ExternalDocumentation, model = "externalDocs" {
        description: String, key = "description";
        url: String, key = "url", required;
    }
}
