use oap_core::error::ParseError;
use oap_core::parse;
use oap_core::parse::parameter::{ParameterLocation, ParameterOrRef};
use oap_core::parse::ref_resolve::RefResolver;
use oap_core::parse::response::ResponseOrRef;
use oap_core::parse::schema::SchemaOrRef;

const TYPES: &str = include_str!("fixtures/types.yaml");
const RESPONSES: &str = include_str!("fixtures/responses.yaml");

#[test]
fn parse_types_fixture() {
    let spec = parse::from_yaml(TYPES).expect("should parse types.yaml");
    assert_eq!(spec.openapi, "3.0.3");
    assert_eq!(spec.info.title, "Types");
    assert_eq!(spec.paths.len(), 8);

    let get = spec.paths["/pets"].get.as_ref().expect("GET /pets");
    assert_eq!(get.operation_id.as_deref(), Some("listPets"));
    assert_eq!(get.tags, ["pets"]);
    match &get.parameters[1] {
        ParameterOrRef::Parameter(p) => {
            assert_eq!(p.name, "X-Trace");
            assert_eq!(p.location, ParameterLocation::Header);
        }
        other => panic!("expected an inline parameter, got {other:?}"),
    }

    let schemas = &spec.components.as_ref().unwrap().schemas;
    let names: Vec<&str> = schemas.keys().map(String::as_str).collect();
    assert_eq!(&names[..3], ["Pet", "Color", "Node"]);
}

#[test]
fn parse_responses_fixture() {
    let spec = parse::from_yaml(RESPONSES).expect("should parse responses.yaml");
    assert_eq!(spec.servers[0].expanded_url(), "https://example.com/api/v1");

    let upload = spec.paths["/upload"].post.as_ref().unwrap();
    let resolver = RefResolver::new(&spec);
    let body = resolver
        .resolve_request_body(upload.request_body.as_ref().unwrap())
        .unwrap();
    assert!(body.required);
    let media = &body.content["multipart/form-data"];
    assert_eq!(media.part_content_type("meta"), Some("application/json"));
    assert_eq!(media.part_content_type("file"), None);

    let differ = spec.paths["/differ"].get.as_ref().unwrap();
    let statuses: Vec<&str> = differ.responses.keys().map(String::as_str).collect();
    assert_eq!(statuses, ["200", "202"]);
    match &differ.responses["202"] {
        ResponseOrRef::Response(r) => assert_eq!(r.description, "a bar"),
        ResponseOrRef::Ref { .. } => panic!("expected an inline response"),
    }
}

#[test]
fn resolve_component_refs_by_name() {
    let spec = parse::from_yaml(TYPES).unwrap();
    let resolver = RefResolver::new(&spec);

    let pet = resolver.resolve_schema("#/components/schemas/Pet").unwrap();
    assert_eq!(pet.name, Some("Pet"));

    let color = resolver
        .resolve_schema("#/components/schemas/Pet/properties/color")
        .unwrap();
    assert_eq!(color.name, None);
    assert!(matches!(color.target, SchemaOrRef::Ref { .. }));
    assert_eq!(
        resolver.schema_of(color.target).unwrap().enum_values.len(),
        3
    );
}

#[test]
fn parse_json_document() {
    let json = r#"{
        "openapi": "3.1.0",
        "info": { "title": "json", "version": "1" },
        "paths": {
            "/ping": {
                "get": {
                    "responses": {
                        "200": {
                            "description": "pong",
                            "content": {
                                "text/plain": { "schema": { "type": ["string", "null"] } }
                            }
                        }
                    }
                }
            }
        }
    }"#;
    let spec = parse::from_json(json).expect("should parse JSON");
    assert_eq!(spec.openapi, "3.1.0");
    assert!(spec.paths["/ping"].get.is_some());
}

#[test]
fn reject_swagger_2() {
    let err = parse::from_yaml("openapi: 2.0.0\ninfo: { title: old, version: '1' }\n").unwrap_err();
    assert!(matches!(err, ParseError::UnsupportedVersion(ref v) if v == "2.0.0"));
}
