//! Sync: reconciling high-level mutations into the node tree with minimal
//! textual churn.

use indoc::indoc;
use pretty_assertions::assert_eq;
use swagger_saphyr::{marshal, sync, unmarshal};

#[test]
fn untouched_document_syncs_to_identical_bytes() {
    let source = indoc! {r#"
        # header comment
        swagger: "2.0"
        info:
          title: Petstore # trailing
          version: 1.0.0
        paths: {}
    "#};
    let (mut doc, _) = unmarshal(source).unwrap();
    sync(&mut doc).unwrap();
    assert_eq!(marshal(&doc).unwrap(), source);
}

#[test]
fn scalar_mutation_rewrites_in_place() {
    let source = indoc! {r#"
        swagger: "2.0"
        info:
          title: Old Title # keep me
          version: 1.0.0
        paths: {}
    "#};
    let (mut doc, _) = unmarshal(source).unwrap();
    doc.info.as_mut().unwrap().title = Some("New Title".to_owned());
    sync(&mut doc).unwrap();
    let expected = indoc! {r#"
        swagger: "2.0"
        info:
          title: New Title # keep me
          version: 1.0.0
        paths: {}
    "#};
    assert_eq!(marshal(&doc).unwrap(), expected);
}

#[test]
fn added_field_appends_in_order() {
    let source = indoc! {r#"
        swagger: "2.0"
        info:
          title: T
          version: "1"
        paths: {}
    "#};
    let (mut doc, _) = unmarshal(source).unwrap();
    doc.host = Some("api.example.com".to_owned());
    doc.info.as_mut().unwrap().description = Some("A description".to_owned());
    sync(&mut doc).unwrap();
    let out = marshal(&doc).unwrap();
    let expected = indoc! {r#"
        swagger: "2.0"
        info:
          title: T
          version: "1"
          description: A description
        paths: {}
        host: api.example.com
    "#};
    assert_eq!(out, expected);
}

#[test]
fn removed_field_deletes_its_pair() {
    let source = indoc! {r#"
        swagger: "2.0"
        info:
          title: T
          description: delete me
          version: "1"
        paths: {}
    "#};
    let (mut doc, _) = unmarshal(source).unwrap();
    doc.info.as_mut().unwrap().description = None;
    sync(&mut doc).unwrap();
    let expected = indoc! {r#"
        swagger: "2.0"
        info:
          title: T
          version: "1"
        paths: {}
    "#};
    assert_eq!(marshal(&doc).unwrap(), expected);
}

#[test]
fn quoted_style_survives_value_rewrite() {
    let source = indoc! {r#"
        swagger: "2.0"
        info:
          title: "Quoted Title"
          version: "1"
        paths: {}
    "#};
    let (mut doc, _) = unmarshal(source).unwrap();
    doc.info.as_mut().unwrap().title = Some("Another Title".to_owned());
    sync(&mut doc).unwrap();
    let out = marshal(&doc).unwrap();
    assert!(out.contains("title: \"Another Title\""), "{out}");
}

#[test]
fn value_needing_quotes_gains_them() {
    let source = indoc! {r#"
        swagger: "2.0"
        info:
          title: Plain
          version: "1"
        paths: {}
    "#};
    let (mut doc, _) = unmarshal(source).unwrap();
    // A plain `2.0` would re-parse as a number; the writer must protect it.
    doc.info.as_mut().unwrap().title = Some("2.0".to_owned());
    sync(&mut doc).unwrap();
    let out = marshal(&doc).unwrap();
    assert!(out.contains("title: \"2.0\""), "{out}");
    let (reparsed, _) = unmarshal(&out).unwrap();
    assert_eq!(reparsed.info.as_ref().unwrap().title(), "2.0");
}

#[test]
fn extension_mutations_sync() {
    let source = indoc! {r#"
        swagger: "2.0"
        info:
          title: T
          version: "1"
        x-stage: dev
        paths: {}
    "#};
    let (mut doc, _) = unmarshal(source).unwrap();
    doc.extensions
        .set("x-stage", swagger_saphyr::Value::str("prod"));
    doc.extensions
        .set("x-owner", swagger_saphyr::Value::str("platform"));
    sync(&mut doc).unwrap();
    let out = marshal(&doc).unwrap();
    assert!(out.contains("x-stage: prod"), "{out}");
    assert!(out.contains("x-owner: platform"), "{out}");
    // Unrelated lines untouched.
    assert!(out.starts_with("swagger: \"2.0\"\n"));
}

#[test]
fn new_path_entry_is_created() {
    use swagger_saphyr::model::{Operation, PathItem, Response, Responses};
    use swagger_saphyr::Reference;

    let source = indoc! {r#"
        swagger: "2.0"
        info:
          title: T
          version: "1"
        paths: {}
    "#};
    let (mut doc, _) = unmarshal(source).unwrap();

    let mut response = Response::default();
    response.description = Some("ok".to_owned());
    let mut responses = Responses::new();
    responses.set("200", Reference::of(response));
    let mut operation = Operation::default();
    operation.responses = Some(responses);
    let mut item = PathItem::default();
    item.get = Some(operation);
    doc.paths.as_mut().unwrap().set("/new", Reference::of(item));
    sync(&mut doc).unwrap();
    let out = marshal(&doc).unwrap();
    let expected = indoc! {r#"
        swagger: "2.0"
        info:
          title: T
          version: "1"
        paths:
          /new:
            get:
              responses:
                "200":
                  description: ok
    "#};
    assert_eq!(out, expected);

    // And the mutated document round-trips through a fresh parse.
    let (reparsed, errors) = unmarshal(&out).unwrap();
    assert!(errors.is_empty(), "errors: {errors:?}");
    assert_eq!(marshal(&reparsed).unwrap(), out);
}
