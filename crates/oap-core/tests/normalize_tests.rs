use oap_core::ir::HttpMethod;
use oap_core::ir::grouping::interface_name;
use oap_core::transform::content_type::marker_key;
use oap_core::transform::name_normalizer::{model_type_name, normalize_name, to_class};

#[test]
fn test_schema_names() {
    let n = normalize_name("pet-store");
    assert_eq!(n.pascal_case, "PetStore");
    assert_eq!(n.camel_case, "petStore");
    assert_eq!(n.snake_case, "pet_store");
    assert_eq!(n.screaming_snake, "PET_STORE");
    assert_eq!(n.original, "pet-store");
}

#[test]
fn test_path_to_class() {
    assert_eq!(to_class("/pets/{petId}"), "PetsPetId");
    assert_eq!(to_class("/"), "Unnamed");
    assert_eq!(to_class("application/vnd.api+json"), "ApplicationVndApiJson");
}

#[test]
fn test_suffix_applied_once() {
    assert_eq!(model_type_name("pet", "Dto").pascal_case, "PetDto");
    assert_eq!(model_type_name("PetDto", "Dto").pascal_case, "PetDto");
    assert_eq!(model_type_name("pet", "").pascal_case, "Pet");
}

#[test]
fn test_interface_names() {
    assert_eq!(interface_name(&["pet store".into()], false).pascal_case, "PetStore");
    assert_eq!(interface_name(&[], true).pascal_case, "DefaultExcluded");
}

#[test]
fn test_marker_names() {
    assert_eq!(
        marker_key("/pets/{id}", HttpMethod::Get, "application/json"),
        "PetsIdGetResponse"
    );
    assert_eq!(
        marker_key("/pets", HttpMethod::Post, "text/plain"),
        "PetsPostResponseTextPlain"
    );
}
