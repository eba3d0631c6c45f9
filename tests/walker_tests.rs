//! Walker coverage, termination and location rendering.

use std::ops::ControlFlow;

use indoc::indoc;
use swagger_saphyr::unmarshal;
use swagger_saphyr::walker::{walk, Matcher};

const PETSTORE: &str = indoc! {r##"
    swagger: "2.0"
    info:
      title: T
      version: "1"
      contact:
        email: a@b.example
    paths:
      /users/{id}:
        get:
          parameters:
            - name: id
              in: path
              required: true
              type: string
          responses:
            "200":
              description: ok
              schema:
                $ref: "#/definitions/User"
    definitions:
      User:
        type: object
        properties:
          id:
            type: integer
    securityDefinitions:
      basic_auth:
        type: basic
"##};

#[test]
fn every_object_is_visited_exactly_once() {
    let (doc, errors) = unmarshal(PETSTORE).unwrap();
    assert!(errors.is_empty(), "errors: {errors:?}");

    let mut pointers: Vec<String> = Vec::new();
    let mut matcher = Matcher {
        any: Some(Box::new(|loc| {
            pointers.push(loc.to_json_pointer());
            ControlFlow::Continue(())
        })),
        ..Matcher::default()
    };
    let completed = walk(&doc, &mut matcher);
    drop(matcher);
    assert!(completed);

    // Exactly once: no duplicate locations.
    let mut deduped = pointers.clone();
    deduped.sort();
    deduped.dedup();
    assert_eq!(deduped.len(), pointers.len(), "duplicate visits: {pointers:?}");

    // Root, info, contact, paths, path item, operation, parameter,
    // responses, response, response schema, User schema, its property,
    // security scheme.
    assert_eq!(pointers.len(), 13, "visited: {pointers:?}");

    // Document order: info before paths before definitions before security.
    let pos = |needle: &str| {
        pointers
            .iter()
            .position(|p| p.starts_with(needle))
            .unwrap_or_else(|| panic!("{needle} not visited: {pointers:?}"))
    };
    assert!(pos("/info") < pos("/paths"));
    assert!(pos("/paths") < pos("/definitions"));
    assert!(pos("/definitions") < pos("/securityDefinitions"));
}

#[test]
fn typed_callbacks_fire_with_locations() {
    let (doc, _) = unmarshal(PETSTORE).unwrap();
    let mut parameter_pointers = Vec::new();
    let mut schema_count = 0usize;
    let mut matcher = Matcher {
        parameter: Some(Box::new(|parameter, loc| {
            assert_eq!(parameter.name(), "id");
            parameter_pointers.push(loc.to_json_pointer());
            ControlFlow::Continue(())
        })),
        schema: Some(Box::new(|_, _| {
            schema_count += 1;
            ControlFlow::Continue(())
        })),
        ..Matcher::default()
    };
    walk(&doc, &mut matcher);
    drop(matcher);
    assert_eq!(
        parameter_pointers,
        vec!["/paths/~1users~1{id}/get/parameters/0".to_owned()]
    );
    // Response schema, User, and User.properties.id.
    assert_eq!(schema_count, 3);
}

#[test]
fn terminate_stops_promptly() {
    let (doc, _) = unmarshal(PETSTORE).unwrap();
    let mut visits = 0usize;
    let mut matcher = Matcher {
        any: Some(Box::new(|_| {
            visits += 1;
            if visits == 2 {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        })),
        ..Matcher::default()
    };
    let completed = walk(&doc, &mut matcher);
    drop(matcher);
    assert!(!completed);
    assert_eq!(visits, 2);
}

#[test]
fn extensions_are_visited() {
    let source = indoc! {r#"
        swagger: "2.0"
        info:
          title: T
          version: "1"
          x-logo: ducks.png
        paths: {}
    "#};
    let (doc, _) = unmarshal(source).unwrap();
    let mut seen = Vec::new();
    let mut matcher = Matcher {
        extensions: Some(Box::new(|extensions, loc| {
            assert_eq!(extensions.len(), 1);
            seen.push(loc.to_json_pointer());
            ControlFlow::Continue(())
        })),
        ..Matcher::default()
    };
    walk(&doc, &mut matcher);
    drop(matcher);
    assert_eq!(seen, vec!["/info/extensions".to_owned()]);
}
