//! Wire shape of a single API operation.

use crate::marshal::macros::{core_object, core_required};
use crate::marshal::Reference;

use super::{ExternalDocumentation, Parameter, Responses, SecurityRequirement};

core_object! {
    /// A single API operation on a path.
    pub struct Operation, model = "operation" {
        tags: Vec<String>, key = "tags";
        summary: String, key = "summary";
        description: String, key = "description";
        external_docs: ExternalDocumentation, key = "externalDocs";
        operation_id: String, key = "operationId";
        consumes: Vec<String>, key = "consumes";
        produces: Vec<String>, key = "produces";
        parameters: Vec<Reference<Parameter>>, key = "parameters";
        responses: Responses, key = "responses", required;
        schemes: Vec<String>, key = "schemes";
        deprecated: bool, key = "deprecated";
        security: Vec<SecurityRequirement>, key = "security";
    }
}
