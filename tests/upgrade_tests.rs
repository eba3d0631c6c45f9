//! The Swagger 2.0 → OpenAPI 3.0 upgrade pathway.

use indoc::indoc;
use pretty_assertions::assert_eq;
use swagger_saphyr::node::{mapping_get, structural_eq};
use swagger_saphyr::upgrade::upgrade;
use swagger_saphyr::{marshal, unmarshal};

fn parse(source: &str) -> swagger_saphyr::model::Swagger {
    let (doc, errors) = unmarshal(source).unwrap();
    assert!(errors.is_empty(), "fixture errors: {errors:?}");
    doc
}

#[test]
fn version_and_servers() {
    let doc = parse(indoc! {r#"
        swagger: "2.0"
        info:
          title: T
          version: "1"
        host: api.example.com
        basePath: /v1
        schemes:
          - https
          - http
        paths: {}
    "#});
    let up = upgrade(&doc);
    assert_eq!(up.openapi, "3.0.0");
    let urls: Vec<&str> = up.servers.iter().map(|s| s.url.as_str()).collect();
    assert_eq!(urls, vec!["https://api.example.com/v1", "http://api.example.com/v1"]);
}

#[test]
fn host_without_base_path_or_schemes_defaults() {
    let doc = parse(indoc! {r#"
        swagger: "2.0"
        info:
          title: T
          version: "1"
        host: api.example.com
        paths: {}
    "#});
    let up = upgrade(&doc);
    let urls: Vec<&str> = up.servers.iter().map(|s| s.url.as_str()).collect();
    assert_eq!(urls, vec!["https://api.example.com/"]);

    let doc = parse("swagger: \"2.0\"\ninfo:\n  title: T\n  version: \"1\"\npaths: {}\n");
    assert!(upgrade(&doc).servers.is_empty());
}

#[test]
fn body_parameter_becomes_request_body() {
    let doc = parse(indoc! {r#"
        swagger: "2.0"
        info:
          title: T
          version: "1"
        consumes:
          - application/json
        paths:
          /pets:
            post:
              parameters:
                - in: body
                  name: body
                  required: true
                  schema:
                    type: object
                    properties:
                      name:
                        type: string
              responses:
                "200":
                  description: ok
    "#});
    let up = upgrade(&doc);
    let operation = up.operation("/pets", "post").unwrap();
    assert!(operation.parameters.is_empty(), "body must not remain a parameter");
    let body = operation.request_body.as_ref().unwrap();
    assert_eq!(body.required, Some(true));
    let media = body.media_type("application/json").unwrap();
    let upgraded_schema = media.schema.as_ref().unwrap();

    // The schema carried over structurally intact.
    let original = doc.paths().unwrap().get("/pets").unwrap().inline().unwrap();
    let original = original.post.as_ref().unwrap().parameters()[0]
        .inline()
        .unwrap()
        .schema()
        .unwrap()
        .get_core()
        .core
        .root
        .clone()
        .unwrap();
    assert!(structural_eq(upgraded_schema, &original));
}

#[test]
fn form_data_with_file_becomes_multipart_request_body() {
    let doc = parse(indoc! {r#"
        swagger: "2.0"
        info:
          title: T
          version: "1"
        paths:
          /upload:
            post:
              consumes:
                - multipart/form-data
              parameters:
                - in: formData
                  name: file
                  type: file
                - in: formData
                  name: title
                  type: string
                  required: true
              responses:
                "200":
                  description: ok
    "#});
    let up = upgrade(&doc);
    let operation = up.operation("/upload", "post").unwrap();
    let body = operation.request_body.as_ref().unwrap();
    assert_eq!(body.required, Some(true));
    let media = body.media_type("multipart/form-data").unwrap();
    let schema = media.schema.as_ref().unwrap();

    // {type: object, properties: {file: {type: string, format: binary},
    //  title: {type: string}}}
    let (_, type_node) = mapping_get(schema, "type").unwrap();
    assert_eq!(type_node.borrow().value, "object");
    let (_, properties) = mapping_get(schema, "properties").unwrap();
    let (_, file) = mapping_get(&properties, "file").unwrap();
    assert_eq!(mapping_get(&file, "type").unwrap().1.borrow().value, "string");
    assert_eq!(mapping_get(&file, "format").unwrap().1.borrow().value, "binary");
    let (_, title) = mapping_get(&properties, "title").unwrap();
    assert_eq!(mapping_get(&title, "type").unwrap().1.borrow().value, "string");
}

#[test]
fn definition_refs_are_rewritten() {
    let doc = parse(indoc! {r##"
        swagger: "2.0"
        info:
          title: T
          version: "1"
        paths:
          /a:
            get:
              responses:
                "200":
                  description: ok
                  schema:
                    $ref: "#/definitions/MyModel"
        definitions:
          MyModel:
            type: object
    "##});
    let up = upgrade(&doc);
    assert!(up.components.schema("MyModel").is_some());
    let operation = up.operation("/a", "get").unwrap();
    let response = operation.response("200").unwrap();
    let media = response.media_type("application/json").unwrap();
    let schema = media.schema.as_ref().unwrap();
    let (_, reference) = mapping_get(schema, "$ref").unwrap();
    assert_eq!(reference.borrow().value, "#/components/schemas/MyModel");
}

#[test]
fn parameter_and_response_refs_move_into_components() {
    let doc = parse(indoc! {r##"
        swagger: "2.0"
        info:
          title: T
          version: "1"
        paths:
          /a:
            get:
              parameters:
                - $ref: "#/parameters/Limit"
              responses:
                "200":
                  $ref: "#/responses/Listing"
        parameters:
          Limit:
            name: limit
            in: query
            type: integer
          Payload:
            name: payload
            in: body
            schema:
              type: object
        responses:
          Listing:
            description: a canned response
    "##});
    let up = upgrade(&doc);
    let operation = up.operation("/a", "get").unwrap();
    assert_eq!(
        operation.parameters[0].reference.as_deref(),
        Some("#/components/parameters/Limit")
    );
    let (_, response) = &operation.responses[0];
    assert_eq!(
        response.reference.as_deref(),
        Some("#/components/responses/Listing")
    );
    // Global split: non-body parameter stays a parameter, body becomes a
    // request body component.
    assert!(up.components.parameters.iter().any(|(n, _)| n == "Limit"));
    assert!(up.components.request_bodies.iter().any(|(n, _)| n == "Payload"));
    assert!(up.components.responses.iter().any(|(n, _)| n == "Listing"));
}

#[test]
fn body_parameter_ref_becomes_request_body_ref() {
    let doc = parse(indoc! {r##"
        swagger: "2.0"
        info:
          title: T
          version: "1"
        paths:
          /a:
            post:
              parameters:
                - $ref: "#/parameters/Payload"
              responses:
                "200":
                  description: ok
        parameters:
          Payload:
            name: payload
            in: body
            schema:
              type: object
    "##});
    let up = upgrade(&doc);
    let operation = up.operation("/a", "post").unwrap();
    assert!(operation.parameters.is_empty());
    assert_eq!(
        operation.request_body.as_ref().unwrap().reference.as_deref(),
        Some("#/components/requestBodies/Payload")
    );
}

#[test]
fn non_body_parameters_gain_schemas_and_styles() {
    let doc = parse(indoc! {r#"
        swagger: "2.0"
        info:
          title: T
          version: "1"
        paths:
          /a:
            get:
              parameters:
                - name: ids
                  in: query
                  type: array
                  collectionFormat: multi
                  items:
                    type: integer
                    format: int64
                - name: fields
                  in: query
                  type: array
                  collectionFormat: ssv
                  items:
                    type: string
              responses:
                "200":
                  description: ok
    "#});
    let up = upgrade(&doc);
    let operation = up.operation("/a", "get").unwrap();
    let ids = operation.parameter("ids").unwrap();
    assert_eq!(ids.style.as_deref(), Some("form"));
    assert_eq!(ids.explode, Some(true));
    let schema = ids.schema.as_ref().unwrap();
    assert_eq!(mapping_get(schema, "type").unwrap().1.borrow().value, "array");
    let (_, items) = mapping_get(schema, "items").unwrap();
    assert_eq!(mapping_get(&items, "type").unwrap().1.borrow().value, "integer");
    assert_eq!(mapping_get(&items, "format").unwrap().1.borrow().value, "int64");

    let fields = operation.parameter("fields").unwrap();
    assert_eq!(fields.style.as_deref(), Some("spaceDelimited"));
    assert_eq!(fields.explode, Some(false));
}

#[test]
fn response_examples_become_content_examples() {
    let doc = parse(indoc! {r#"
        swagger: "2.0"
        info:
          title: T
          version: "1"
        produces:
          - application/json
        paths:
          /a:
            get:
              responses:
                "200":
                  description: ok
                  schema:
                    type: object
                  examples:
                    application/json:
                      hello: world
    "#});
    let up = upgrade(&doc);
    let operation = up.operation("/a", "get").unwrap();
    let response = operation.response("200").unwrap();
    let media = response.media_type("application/json").unwrap();
    assert!(media.schema.is_some());
    let example = media.example.as_ref().unwrap();
    assert_eq!(mapping_get(example, "hello").unwrap().1.borrow().value, "world");
}

#[test]
fn security_definitions_map_to_oas3_schemes() {
    let doc = parse(indoc! {r#"
        swagger: "2.0"
        info:
          title: T
          version: "1"
        securityDefinitions:
          basic_auth:
            type: basic
          key_auth:
            type: apiKey
            name: X-Api-Key
            in: header
          oauth_implicit:
            type: oauth2
            flow: implicit
            authorizationUrl: https://auth.example.com/authorize
            scopes:
              read: read access
          oauth_app:
            type: oauth2
            flow: application
            tokenUrl: https://auth.example.com/token
            scopes: {}
        paths: {}
    "#});
    let up = upgrade(&doc);
    let scheme = |name: &str| {
        up.components
            .security_schemes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, s)| s)
            .unwrap()
    };
    let basic = scheme("basic_auth");
    assert_eq!(basic.r#type, "http");
    assert_eq!(basic.scheme.as_deref(), Some("basic"));

    let key = scheme("key_auth");
    assert_eq!(key.r#type, "apiKey");
    assert_eq!(key.name.as_deref(), Some("X-Api-Key"));
    assert_eq!(key.location.as_deref(), Some("header"));

    let implicit = scheme("oauth_implicit").flows.as_ref().unwrap();
    let flow = implicit.implicit.as_ref().unwrap();
    assert_eq!(flow.authorization_url.as_deref(), Some("https://auth.example.com/authorize"));
    assert!(flow.token_url.is_none());
    assert_eq!(flow.scopes, vec![("read".to_owned(), "read access".to_owned())]);

    let app = scheme("oauth_app").flows.as_ref().unwrap();
    assert!(app.client_credentials.is_some());
    assert!(app.implicit.is_none());
}

#[test]
fn upgrade_is_pure_and_deterministic() {
    let source = indoc! {r#"
        swagger: "2.0"
        info:
          title: T
          version: "1"
        host: api.example.com
        paths:
          /b:
            get:
              responses:
                "200":
                  description: ok
          /a:
            get:
              responses:
                "200":
                  description: ok
        definitions:
          M:
            type: object
    "#};
    let (doc, _) = unmarshal(source).unwrap();
    let before = marshal(&doc).unwrap();
    let first = upgrade(&doc).marshal().unwrap();
    let second = upgrade(&doc).marshal().unwrap();
    // Purity: the source document is untouched.
    assert_eq!(marshal(&doc).unwrap(), before);
    // Determinism: identical output, with sorted path keys.
    assert_eq!(first, second);
    let a = first.find("/a:").unwrap();
    let b = first.find("/b:").unwrap();
    assert!(a < b, "paths must be emitted sorted:\n{first}");
}

#[test]
fn upgraded_document_keeps_source_format() {
    let source = "{\n  \"swagger\": \"2.0\",\n  \"info\": {\n    \"title\": \"T\",\n    \"version\": \"1\"\n  },\n  \"paths\": {}\n}\n";
    let (doc, _) = unmarshal(source).unwrap();
    let up = upgrade(&doc);
    let out = up.marshal().unwrap();
    assert!(out.trim_start().starts_with('{'), "JSON in, JSON out:\n{out}");
    assert!(out.contains("\"openapi\": \"3.0.0\""));
}

#[test]
fn info_tags_and_extensions_carry_over() {
    let doc = parse(indoc! {r#"
        swagger: "2.0"
        info:
          title: T
          version: "1"
        tags:
          - name: pets
            description: Pet operations
        x-audience: internal
        paths: {}
    "#});
    let up = upgrade(&doc);
    assert_eq!(up.tags.len(), 1);
    assert_eq!(
        mapping_get(&up.tags[0], "name").unwrap().1.borrow().value,
        "pets"
    );
    assert!(up
        .extensions
        .iter()
        .any(|(k, v)| k == "x-audience" && v.borrow().value == "internal"));
    let info = up.info.as_ref().unwrap();
    assert_eq!(mapping_get(info, "title").unwrap().1.borrow().value, "T");
}
