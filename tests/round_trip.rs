//! Round-trip fidelity: for untouched documents, marshal(unmarshal(b)) == b.

use indoc::indoc;
use pretty_assertions::assert_eq;
use swagger_saphyr::{marshal, unmarshal};

#[test]
fn minimal_document_round_trips_and_populates() {
    let source = indoc! {r#"
        swagger: "2.0"
        info:
          title: Test API
          version: 1.0.0
        paths: {}
    "#};
    let (doc, errors) = unmarshal(source).unwrap();
    assert!(errors.is_empty(), "unexpected errors: {errors:?}");
    assert_eq!(doc.swagger(), "2.0");
    assert_eq!(doc.info.as_ref().unwrap().title(), "Test API");
    assert_eq!(doc.info.as_ref().unwrap().version(), "1.0.0");
    let paths = doc.paths().unwrap();
    assert!(paths.is_empty());
    assert_eq!(marshal(&doc).unwrap(), source);
}

#[test]
fn key_order_is_preserved() {
    // `info` deliberately after `paths`, reversed fields inside `info`.
    let source = indoc! {r#"
        swagger: "2.0"
        paths: {}
        info:
          version: 1.0.0
          title: Later
    "#};
    let (doc, _) = unmarshal(source).unwrap();
    assert_eq!(marshal(&doc).unwrap(), source);
}

#[test]
fn quoting_styles_survive() {
    let source = indoc! {r#"
        swagger: "2.0"
        info:
          title: 'Single quoted'
          description: "Double quoted"
          version: plain
        paths: {}
    "#};
    let (doc, _) = unmarshal(source).unwrap();
    assert_eq!(marshal(&doc).unwrap(), source);
    assert_eq!(doc.info.as_ref().unwrap().title(), "Single quoted");
}

#[test]
fn comments_and_blank_lines_survive() {
    let source = indoc! {r#"
        # API description for the pet store.
        swagger: "2.0" # the only supported version
        info:
          title: Petstore
          version: 1.0.0

        # Paths are filled in later.
        paths: {}
    "#};
    let (doc, _) = unmarshal(source).unwrap();
    assert_eq!(marshal(&doc).unwrap(), source);
}

#[test]
fn sequences_round_trip_in_both_indent_styles() {
    let compact = indoc! {r#"
        swagger: "2.0"
        info:
          title: T
          version: "1"
        schemes:
        - https
        - http
        paths: {}
    "#};
    let (doc, _) = unmarshal(compact).unwrap();
    assert_eq!(marshal(&doc).unwrap(), compact);

    let indented = indoc! {r#"
        swagger: "2.0"
        info:
          title: T
          version: "1"
        schemes:
          - https
          - http
        paths: {}
    "#};
    let (doc, _) = unmarshal(indented).unwrap();
    assert_eq!(marshal(&doc).unwrap(), indented);
}

#[test]
fn full_document_round_trips() {
    let source = indoc! {r##"
        swagger: "2.0"
        info:
          title: Swagger Petstore
          version: 1.0.0
          license:
            name: MIT
        host: petstore.swagger.io
        basePath: /v1
        schemes:
          - https
        consumes:
          - application/json
        produces:
          - application/json
        paths:
          /pets:
            get:
              summary: List all pets
              operationId: listPets
              tags:
                - pets
              parameters:
                - name: limit
                  in: query
                  description: How many items to return
                  required: false
                  type: integer
                  format: int32
              responses:
                "200":
                  description: A paged array of pets
                  schema:
                    $ref: "#/definitions/Pets"
                default:
                  description: unexpected error
                  schema:
                    $ref: "#/definitions/Error"
        definitions:
          Pet:
            type: object
            required:
              - id
              - name
            properties:
              id:
                type: integer
                format: int64
              name:
                type: string
          Pets:
            type: array
            items:
              $ref: "#/definitions/Pet"
          Error:
            type: object
            properties:
              code:
                type: integer
                format: int32
              message:
                type: string
    "##};
    let (doc, errors) = unmarshal(source).unwrap();
    assert!(errors.is_empty(), "unexpected errors: {errors:?}");
    assert_eq!(marshal(&doc).unwrap(), source);
}

#[test]
fn json_input_round_trips_as_json() {
    let source = "{\n  \"swagger\": \"2.0\",\n  \"info\": {\n    \"title\": \"T\",\n    \"version\": \"1\"\n  },\n  \"paths\": {}\n}\n";
    let (doc, errors) = unmarshal(source).unwrap();
    assert!(errors.is_empty(), "unexpected errors: {errors:?}");
    assert_eq!(doc.config().format, swagger_saphyr::DocFormat::Json);
    assert_eq!(marshal(&doc).unwrap(), source);
}

#[test]
fn json_four_space_indent_is_detected() {
    let source = "{\n    \"swagger\": \"2.0\",\n    \"info\": {\n        \"title\": \"T\",\n        \"version\": \"1\"\n    },\n    \"paths\": {}\n}\n";
    let (doc, _) = unmarshal(source).unwrap();
    assert_eq!(doc.config().indent_step, 4);
    assert_eq!(marshal(&doc).unwrap(), source);
}

#[test]
fn anchors_and_aliases_survive() {
    let source = indoc! {r#"
        swagger: "2.0"
        info:
          title: T
          version: "1"
        x-shared: &shared
          note: reused
        x-copy: *shared
        paths: {}
    "#};
    let (doc, _) = unmarshal(source).unwrap();
    assert_eq!(marshal(&doc).unwrap(), source);
}

#[test]
fn bom_is_tolerated() {
    let source = "\u{FEFF}swagger: \"2.0\"\ninfo:\n  title: T\n  version: \"1\"\npaths: {}\n";
    let (doc, errors) = unmarshal(source).unwrap();
    assert!(errors.is_empty());
    assert_eq!(doc.swagger(), "2.0");
}

#[test]
fn multiple_documents_are_rejected() {
    let source = "swagger: \"2.0\"\ninfo: {title: T, version: \"1\"}\npaths: {}\n---\nsecond: doc\n";
    let err = unmarshal(source).unwrap_err();
    assert!(err.to_string().contains("single document"), "{err}");
}

#[test]
fn reader_input_is_decoded() {
    let bytes: &[u8] = b"swagger: \"2.0\"\ninfo:\n  title: T\n  version: \"1\"\npaths: {}\n";
    let (doc, errors) =
        swagger_saphyr::unmarshal_reader(bytes, swagger_saphyr::Options::default()).unwrap();
    assert!(errors.is_empty());
    assert_eq!(doc.info_title(), "T");
}
