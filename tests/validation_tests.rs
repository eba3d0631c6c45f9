//! The Swagger 2.0 rule battery: structured errors with positions and
//! stable ordering.

use indoc::indoc;
use swagger_saphyr::{sort_validation_errors, unmarshal, Rule, Severity};

#[test]
fn missing_swagger_version_is_reported_at_line_one() {
    let source = indoc! {r#"
        info:
          title: Test API
          version: 1.0.0
        paths: {}
    "#};
    let (_, errors) = unmarshal(source).unwrap();
    let missing: Vec<_> = errors
        .iter()
        .filter(|e| e.rule == Rule::RequiredField && e.message.contains("swagger is missing"))
        .collect();
    assert_eq!(missing.len(), 1, "errors: {errors:?}");
    assert_eq!(missing[0].line(), 1);
}

#[test]
fn missing_info_fields_are_reported_once_each() {
    let source = "swagger: \"2.0\"\ninfo: {}\npaths: {}\n";
    let (_, errors) = unmarshal(source).unwrap();
    let titles = errors
        .iter()
        .filter(|e| e.message.contains("info.title is missing"))
        .count();
    let versions = errors
        .iter()
        .filter(|e| e.message.contains("info.version is missing"))
        .count();
    assert_eq!((titles, versions), (1, 1), "errors: {errors:?}");
}

#[test]
fn wrong_swagger_version_is_a_supported_version_error() {
    let source = "swagger: \"3.0\"\ninfo:\n  title: T\n  version: \"1\"\npaths: {}\n";
    let (doc, errors) = unmarshal(source).unwrap();
    assert!(errors
        .iter()
        .any(|e| e.rule == Rule::SupportedVersion && e.message.contains("must be `2.0`")));
    assert!(!doc.is_valid());
}

#[test]
fn base_path_must_start_with_slash() {
    let source = "swagger: \"2.0\"\ninfo:\n  title: T\n  version: \"1\"\nbasePath: v1\npaths: {}\n";
    let (_, errors) = unmarshal(source).unwrap();
    assert!(errors
        .iter()
        .any(|e| e.rule == Rule::InvalidFormat && e.message.contains("basePath")));
}

#[test]
fn schemes_are_restricted() {
    let source = indoc! {r#"
        swagger: "2.0"
        info:
          title: T
          version: "1"
        schemes:
          - https
          - ftp
        paths: {}
    "#};
    let (_, errors) = unmarshal(source).unwrap();
    assert!(errors
        .iter()
        .any(|e| e.rule == Rule::AllowedValues && e.message.contains("`ftp`")));
}

#[test]
fn consumes_must_be_mime_types() {
    let source = indoc! {r#"
        swagger: "2.0"
        info:
          title: T
          version: "1"
        consumes:
          - application/json
          - not a mime type
        paths: {}
    "#};
    let (_, errors) = unmarshal(source).unwrap();
    assert!(errors
        .iter()
        .any(|e| e.rule == Rule::InvalidFormat && e.message.contains("MIME")));
}

#[test]
fn contact_email_and_urls_are_checked() {
    let source = indoc! {r#"
        swagger: "2.0"
        info:
          title: T
          version: "1"
          termsOfService: not-a-uri
          contact:
            email: not-an-email
            url: also not a uri
          license:
            name: MIT
            url: "::broken::"
        paths: {}
    "#};
    let (_, errors) = unmarshal(source).unwrap();
    assert!(errors.iter().any(|e| e.message.contains("termsOfService")));
    assert!(errors.iter().any(|e| e.message.contains("contact.email")));
    assert!(errors.iter().any(|e| e.message.contains("contact.url")));
    assert!(errors.iter().any(|e| e.message.contains("license.url")));
}

#[test]
fn path_keys_must_start_with_slash() {
    let source = indoc! {r#"
        swagger: "2.0"
        info:
          title: T
          version: "1"
        paths:
          pets:
            get:
              responses:
                "200":
                  description: ok
    "#};
    let (_, errors) = unmarshal(source).unwrap();
    assert!(errors
        .iter()
        .any(|e| e.rule == Rule::InvalidFormat && e.message.contains("must start with `/`")));
}

#[test]
fn path_parameter_requires_required_true() {
    let source = indoc! {r#"
        swagger: "2.0"
        info:
          title: T
          version: "1"
        paths:
          /users/{id}:
            get:
              parameters:
                - name: id
                  in: path
                  type: string
              responses:
                "200":
                  description: ok
    "#};
    let (_, errors) = unmarshal(source).unwrap();
    assert!(
        errors
            .iter()
            .any(|e| e.message.contains("parameter.in=path requires required=true")),
        "errors: {errors:?}"
    );
}

#[test]
fn operation_requires_responses_with_content() {
    let source = indoc! {r#"
        swagger: "2.0"
        info:
          title: T
          version: "1"
        paths:
          /a:
            get:
              responses: {}
    "#};
    let (_, errors) = unmarshal(source).unwrap();
    assert!(errors
        .iter()
        .any(|e| e.message.contains("at least one response code or default")));

    let source = indoc! {r#"
        swagger: "2.0"
        info:
          title: T
          version: "1"
        paths:
          /a:
            get: {}
    "#};
    let (_, errors) = unmarshal(source).unwrap();
    assert!(errors
        .iter()
        .any(|e| e.rule == Rule::RequiredField
            && e.message.contains("operation.responses is missing")));
}

#[test]
fn response_requires_description() {
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
                  schema:
                    type: string
    "#};
    let (_, errors) = unmarshal(source).unwrap();
    assert!(errors
        .iter()
        .any(|e| e.message.contains("response.description is missing")));
}

#[test]
fn file_parameters_couple_to_consumes() {
    let body = indoc! {r#"
        swagger: "2.0"
        info:
          title: T
          version: "1"
        paths:
          /upload:
            post:
              {CONSUMES}parameters:
                - name: file
                  in: formData
                  type: file
              responses:
                "200":
                  description: ok
    "#};
    // Without consumes: the file-type coupling fires.
    let source = body.replace("{CONSUMES}", "");
    let (_, errors) = unmarshal(&source).unwrap();
    assert!(
        errors
            .iter()
            .any(|e| e.message.contains("multipart/form-data")),
        "errors: {errors:?}"
    );
    // With multipart consumes: clean.
    let source = body.replace(
        "{CONSUMES}",
        "consumes:\n        - multipart/form-data\n      ",
    );
    let (_, errors) = unmarshal(&source).unwrap();
    assert!(
        !errors.iter().any(|e| e.message.contains("multipart")),
        "errors: {errors:?}"
    );
}

#[test]
fn required_non_path_parameter_without_consumes_is_fine() {
    let source = indoc! {r#"
        swagger: "2.0"
        info:
          title: T
          version: "1"
        paths:
          /a:
            get:
              parameters:
                - name: q
                  in: query
                  type: string
                  required: true
              responses:
                "200":
                  description: ok
    "#};
    let (_, errors) = unmarshal(source).unwrap();
    assert!(errors.is_empty(), "errors: {errors:?}");
}

#[test]
fn array_parameter_requires_items() {
    let source = indoc! {r#"
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
              responses:
                "200":
                  description: ok
    "#};
    let (_, errors) = unmarshal(source).unwrap();
    assert!(errors
        .iter()
        .any(|e| e.message.contains("parameter.items is required")));
}

#[test]
fn header_rules() {
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
                  description: ok
                  headers:
                    X-Limit:
                      type: array
                    X-Odd:
                      type: object
    "#};
    let (_, errors) = unmarshal(source).unwrap();
    assert!(errors
        .iter()
        .any(|e| e.message.contains("header.items is required")));
    assert!(errors
        .iter()
        .any(|e| e.rule == Rule::AllowedValues && e.message.contains("header.type")));
}

#[test]
fn security_scheme_rules() {
    let source = indoc! {r#"
        swagger: "2.0"
        info:
          title: T
          version: "1"
        securityDefinitions:
          broken_kind:
            type: carrier-pigeon
          key_no_name:
            type: apiKey
            in: cookie
          oauth_missing_bits:
            type: oauth2
            flow: implicit
        paths: {}
    "#};
    let (_, errors) = unmarshal(source).unwrap();
    assert!(errors
        .iter()
        .any(|e| e.message.contains("securityScheme.type")));
    assert!(errors
        .iter()
        .any(|e| e.message.contains("securityScheme.name is missing")));
    assert!(errors
        .iter()
        .any(|e| e.message.contains("securityScheme.in must be one of query, header")));
    assert!(errors
        .iter()
        .any(|e| e.message.contains("securityScheme.authorizationUrl is missing")));
    assert!(errors
        .iter()
        .any(|e| e.message.contains("securityScheme.scopes is missing")));
}

#[test]
fn security_requirements_must_reference_defined_schemes() {
    let source = indoc! {r#"
        swagger: "2.0"
        info:
          title: T
          version: "1"
        securityDefinitions:
          basic_auth:
            type: basic
        security:
          - basic_auth:
              - should-not-have-scopes
          - undefined_scheme: []
        paths: {}
    "#};
    let (_, errors) = unmarshal(source).unwrap();
    assert!(errors
        .iter()
        .any(|e| e.message.contains("scopes must be empty")));
    assert!(errors
        .iter()
        .any(|e| e.message.contains("`undefined_scheme`")));
}

#[test]
fn duplicate_tag_names_and_operation_ids() {
    let source = indoc! {r#"
        swagger: "2.0"
        info:
          title: T
          version: "1"
        tags:
          - name: pets
          - name: pets
        paths:
          /a:
            get:
              operationId: doIt
              responses:
                "200":
                  description: ok
          /b:
            get:
              operationId: doIt
              responses:
                "200":
                  description: ok
    "#};
    let (_, errors) = unmarshal(source).unwrap();
    assert!(errors
        .iter()
        .any(|e| e.rule == Rule::DuplicateKey && e.message.contains("tag.name")));
    assert!(errors
        .iter()
        .any(|e| e.rule == Rule::DuplicateKey && e.message.contains("operationId")));
}

#[test]
fn duplicate_mapping_keys_are_reported() {
    let source = "swagger: \"2.0\"\ninfo:\n  title: T\n  title: Again\n  version: \"1\"\npaths: {}\n";
    let (_, errors) = unmarshal(source).unwrap();
    assert!(errors
        .iter()
        .any(|e| e.rule == Rule::DuplicateKey && e.message.contains("`title`")));
}

#[test]
fn external_docs_require_url() {
    let source = indoc! {r#"
        swagger: "2.0"
        info:
          title: T
          version: "1"
        externalDocs:
          description: docs without a url
        paths: {}
    "#};
    let (_, errors) = unmarshal(source).unwrap();
    assert!(errors
        .iter()
        .any(|e| e.message.contains("externalDocs.url is missing")));
}

#[test]
fn type_mismatches_carry_positions() {
    let source = "swagger: \"2.0\"\ninfo: not-an-object\npaths: {}\n";
    let (_, errors) = unmarshal(source).unwrap();
    let mismatch = errors
        .iter()
        .find(|e| e.rule == Rule::TypeMismatch)
        .expect("type mismatch reported");
    assert_eq!(mismatch.line(), 2);
    assert!(mismatch.message.contains("expected object, got scalar"));
}

#[test]
fn unknown_keys_are_warnings_not_errors() {
    let source = "swagger: \"2.0\"\ninfo:\n  title: T\n  version: \"1\"\n  banana: yes\npaths: {}\n";
    let (doc, errors) = unmarshal(source).unwrap();
    let warning = errors
        .iter()
        .find(|e| e.message.contains("banana"))
        .expect("unknown key surfaced");
    assert_eq!(warning.severity, Severity::Warning);
    // Warnings do not make the document invalid.
    assert!(doc.is_valid());
}

#[test]
fn sorted_errors_are_a_stable_total_order() {
    let source = indoc! {r#"
        info:
          contact:
            email: broken
          termsOfService: also broken
        paths:
          no-slash:
            get: {}
    "#};
    let (_, mut a) = unmarshal(source).unwrap();
    let (_, mut b) = unmarshal(source).unwrap();
    b.reverse();
    sort_validation_errors(&mut a);
    sort_validation_errors(&mut b);
    assert_eq!(a, b);
    // Line-major ordering.
    let lines: Vec<u64> = a.iter().map(|e| e.line()).collect();
    let mut sorted = lines.clone();
    sorted.sort_unstable();
    assert_eq!(lines, sorted);
}

#[test]
fn skip_validation_still_reports_shape_errors() {
    let options = swagger_saphyr::Options {
        skip_validation: true,
        ..swagger_saphyr::Options::default()
    };
    // Wrong version would be a validation error; scalar-for-object is shape.
    let source = "swagger: \"3.0\"\ninfo: 12\npaths: {}\n";
    let (_, errors) = swagger_saphyr::unmarshal_with_options(source, options).unwrap();
    assert!(errors.iter().any(|e| e.rule == Rule::TypeMismatch));
    assert!(!errors.iter().any(|e| e.rule == Rule::SupportedVersion));
}

#[test]
fn errors_render_with_position_and_rule_tag() {
    let source = "info:\n  title: T\n  version: \"1\"\npaths: {}\n";
    let (_, mut errors) = unmarshal(source).unwrap();
    sort_validation_errors(&mut errors);
    let rendered = errors[0].to_string();
    assert!(rendered.starts_with("[1:1] error required-field"), "{rendered}");
}
