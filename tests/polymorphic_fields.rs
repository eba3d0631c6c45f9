//! Either-value fallback and reference-or-inline branch exclusivity.

use indoc::indoc;
use pretty_assertions::assert_eq;
use swagger_saphyr::{marshal, unmarshal, Either, Rule};

#[test]
fn additional_properties_as_bool_takes_the_right_branch() {
    let source = indoc! {r#"
        swagger: "2.0"
        info:
          title: T
          version: "1"
        paths: {}
        definitions:
          Thing:
            type: object
            additionalProperties: false
    "#};
    let (doc, errors) = unmarshal(source).unwrap();
    assert!(errors.is_empty(), "errors: {errors:?}");
    let thing = doc
        .definitions
        .as_ref()
        .unwrap()
        .get(&"Thing".to_owned())
        .unwrap();
    match thing.additional_properties.as_ref().unwrap() {
        Either::Right(allowed) => assert!(!allowed),
        Either::Left(_) => panic!("bool branch expected"),
    }
    assert_eq!(marshal(&doc).unwrap(), source);
}

#[test]
fn additional_properties_as_schema_takes_the_left_branch() {
    let source = indoc! {r#"
        swagger: "2.0"
        info:
          title: T
          version: "1"
        paths: {}
        definitions:
          Thing:
            type: object
            additionalProperties:
              type: string
    "#};
    let (doc, errors) = unmarshal(source).unwrap();
    assert!(errors.is_empty(), "errors: {errors:?}");
    let thing = doc
        .definitions
        .as_ref()
        .unwrap()
        .get(&"Thing".to_owned())
        .unwrap();
    match thing.additional_properties.as_ref().unwrap() {
        Either::Left(schema) => assert_eq!(schema.type_str(), Some("string")),
        Either::Right(_) => panic!("schema branch expected"),
    }
}

#[test]
fn type_accepts_string_and_array_forms() {
    let source = indoc! {r#"
        swagger: "2.0"
        info:
          title: T
          version: "1"
        paths: {}
        definitions:
          Single:
            type: string
          Listed:
            type:
              - string
              - "null"
    "#};
    let (doc, errors) = unmarshal(source).unwrap();
    assert!(errors.is_empty(), "errors: {errors:?}");
    let definitions = doc.definitions.as_ref().unwrap();
    let single = definitions.get(&"Single".to_owned()).unwrap();
    assert!(single.r#type.as_ref().unwrap().is_right());
    let listed = definitions.get(&"Listed".to_owned()).unwrap();
    match listed.r#type.as_ref().unwrap() {
        Either::Left(types) => assert_eq!(types, &["string", "null"]),
        Either::Right(_) => panic!("array branch expected"),
    }
    assert_eq!(marshal(&doc).unwrap(), source);
}

#[test]
fn value_invalid_for_both_branches_reports_one_combined_error() {
    // `additionalProperties` as a sequence matches neither schema nor bool.
    let source = indoc! {r#"
        swagger: "2.0"
        info:
          title: T
          version: "1"
        paths: {}
        definitions:
          Thing:
            additionalProperties:
              - what
    "#};
    let (_, errors) = unmarshal(source).unwrap();
    let combined: Vec<_> = errors
        .iter()
        .filter(|e| e.message.contains("failed to validate either"))
        .collect();
    assert_eq!(combined.len(), 1, "errors: {errors:?}");
    assert_eq!(combined[0].rule, Rule::TypeMismatch);
}

#[test]
fn ref_key_forces_the_reference_branch() {
    let source = indoc! {r##"
        swagger: "2.0"
        info:
          title: T
          version: "1"
        paths:
          /a:
            get:
              responses:
                "200":
                  $ref: "#/responses/Listing"
        responses:
          Listing:
            description: a canned response
    "##};
    let (doc, errors) = unmarshal(source).unwrap();
    assert!(errors.is_empty(), "errors: {errors:?}");
    let paths = doc.paths().unwrap();
    let item = paths.get("/a").unwrap().inline().unwrap();
    let response = item
        .get
        .as_ref()
        .unwrap()
        .responses()
        .unwrap()
        .get("200")
        .unwrap();
    assert!(response.is_reference());
    assert_eq!(response.reference(), Some("#/responses/Listing"));
    assert!(response.inline().is_none());
    // Marshalling the reference emits only the `$ref` key.
    assert_eq!(marshal(&doc).unwrap(), source);
}

#[test]
fn mapping_without_ref_is_the_inline_branch() {
    let source = indoc! {r#"
        swagger: "2.0"
        info:
          title: T
          version: "1"
        paths:
          /a:
            get:
              responses:
                "200":
                  description: inline response
    "#};
    let (doc, _) = unmarshal(source).unwrap();
    let paths = doc.paths().unwrap();
    let item = paths.get("/a").unwrap().inline().unwrap();
    let response = item
        .get
        .as_ref()
        .unwrap()
        .responses()
        .unwrap()
        .get("200")
        .unwrap();
    assert!(!response.is_reference());
    assert_eq!(response.inline().unwrap().description(), "inline response");
}

#[test]
fn exclusive_maximum_accepts_bool_and_number() {
    let source = indoc! {r#"
        swagger: "2.0"
        info:
          title: T
          version: "1"
        paths: {}
        definitions:
          Bounded:
            type: number
            maximum: 100.0
            exclusiveMaximum: true
          ModernBounded:
            type: number
            exclusiveMaximum: 99.5
    "#};
    let (doc, errors) = unmarshal(source).unwrap();
    assert!(errors.is_empty(), "errors: {errors:?}");
    let definitions = doc.definitions.as_ref().unwrap();
    let bounded = definitions.get(&"Bounded".to_owned()).unwrap();
    assert_eq!(bounded.exclusive_maximum, Some(Either::Left(true)));
    let modern = definitions.get(&"ModernBounded".to_owned()).unwrap();
    assert_eq!(modern.exclusive_maximum, Some(Either::Right(99.5)));
    assert_eq!(marshal(&doc).unwrap(), source);
}
