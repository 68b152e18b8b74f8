use indexmap::IndexMap;

use crate::ir::{ContentTypeMarker, DataType, HttpMethod, NamedKind, NamedType, Response};
use crate::mapping::ResultStyle;

use super::name_normalizer::{normalize_name, to_class};
use super::wrappers::unwrap;

const JSON: &str = "application/json";

/// Registry key of the marker interface for one content type of an endpoint:
/// `<PathClass><Method>Response`, plus the content type unless it is JSON.
pub fn marker_key(path: &str, method: HttpMethod, content_type: &str) -> String {
    let mut key = format!("{}{}Response", to_class(path), method.pascal_case());
    if content_type != JSON {
        key.push_str(&to_class(content_type));
    }
    key
}

/// The marker interface shared by the responses of one content type.
pub fn content_type_interface(
    path: &str,
    method: HttpMethod,
    content_type: &str,
    package: String,
) -> NamedType {
    let key = marker_key(path, method, content_type);
    let name = normalize_name(&key);
    NamedType::new(
        key,
        name,
        package,
        NamedKind::ContentTypeInterface(ContentTypeMarker {
            path: path.to_string(),
            method,
            content_type: content_type.to_string(),
        }),
    )
}

/// Content types whose responses carry different types across statuses.
///
/// Types are compared after the single, result and null wrappers are
/// removed. Scalar responses never ask for a marker. With
/// [`ResultStyle::Success`] error statuses are left out of the comparison.
pub fn differing_content_types(
    responses: &IndexMap<String, Vec<Response>>,
    style: ResultStyle,
) -> Vec<String> {
    let mut by_content_type: IndexMap<&str, Vec<&DataType>> = IndexMap::new();
    for (status, list) in responses {
        if style == ResultStyle::Success && is_error_status(status) {
            continue;
        }
        for response in list.iter().filter(|r| !r.is_empty()) {
            by_content_type
                .entry(response.content_type.as_str())
                .or_default()
                .push(unwrap(&response.data_type));
        }
    }

    by_content_type
        .into_iter()
        .filter(|(_, types)| differ(types))
        .map(|(content_type, _)| content_type.to_string())
        .collect()
}

fn differ(types: &[&DataType]) -> bool {
    let Some((first, rest)) = types.split_first() else {
        return false;
    };
    rest.iter().any(|t| t != first && !t.is_scalar())
}

fn is_error_status(status: &str) -> bool {
    status.starts_with('4') || status.starts_with('5')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{ScalarKind, TypeId, TypeRegistry};

    fn response(content_type: &str, data_type: DataType) -> Response {
        Response {
            content_type: content_type.to_string(),
            data_type,
            description: None,
            content_type_interface: None,
        }
    }

    fn named(registry: &mut TypeRegistry, key: &str) -> TypeId {
        registry.add(content_type_interface("/x", HttpMethod::Get, key, "io.m".into()))
    }

    #[test]
    fn test_marker_key() {
        assert_eq!(marker_key("/foo", HttpMethod::Get, JSON), "FooGetResponse");
        assert_eq!(
            marker_key("/foo/{id}", HttpMethod::Post, "application/xml"),
            "FooIdPostResponseApplicationXml"
        );
    }

    #[test]
    fn test_differing_types_need_a_marker() {
        let mut registry = TypeRegistry::new();
        let foo = named(&mut registry, "a/foo");
        let bar = named(&mut registry, "a/bar");

        let mut responses = IndexMap::new();
        responses.insert("200".to_string(), vec![response(JSON, DataType::Named(foo))]);
        responses.insert("202".to_string(), vec![response(JSON, DataType::Named(bar))]);
        assert_eq!(differing_content_types(&responses, ResultStyle::Success), [JSON]);
    }

    #[test]
    fn test_identical_types_need_no_marker() {
        let mut registry = TypeRegistry::new();
        let foo = named(&mut registry, "a/foo");

        let mut responses = IndexMap::new();
        responses.insert("200".to_string(), vec![response(JSON, DataType::Named(foo))]);
        responses.insert("202".to_string(), vec![response(JSON, DataType::Named(foo))]);
        assert!(differing_content_types(&responses, ResultStyle::Success).is_empty());
    }

    #[test]
    fn test_error_statuses_follow_result_style() {
        let mut registry = TypeRegistry::new();
        let foo = named(&mut registry, "a/foo");
        let error = named(&mut registry, "a/error");

        let mut responses = IndexMap::new();
        responses.insert("200".to_string(), vec![response(JSON, DataType::Named(foo))]);
        responses.insert("400".to_string(), vec![response(JSON, DataType::Named(error))]);
        assert!(differing_content_types(&responses, ResultStyle::Success).is_empty());
        assert_eq!(differing_content_types(&responses, ResultStyle::All), [JSON]);
    }

    #[test]
    fn test_scalar_responses_are_skipped() {
        let mut registry = TypeRegistry::new();
        let foo = named(&mut registry, "a/foo");

        let mut responses = IndexMap::new();
        responses.insert("200".to_string(), vec![response(JSON, DataType::Named(foo))]);
        responses.insert(
            "202".to_string(),
            vec![response(JSON, DataType::scalar(ScalarKind::String))],
        );
        assert!(differing_content_types(&responses, ResultStyle::Success).is_empty());
    }
}
