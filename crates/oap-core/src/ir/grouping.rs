use indexmap::IndexMap;

use super::api::{Endpoint, Interface};
use super::types::NormalizedName;
use crate::transform::name_normalizer::normalize_name;

/// Interface name for untagged endpoints.
pub const DEFAULT_INTERFACE: &str = "default";

/// Suffix of the interface that collects endpoints excluded by configuration.
pub const EXCLUDED_SUFFIX: &str = "Excluded";

/// The interface an endpoint belongs to: its first tag, or the default
/// interface when untagged, with the excluded suffix when configuration
/// marks it excluded.
pub fn interface_name(tags: &[String], excluded: bool) -> NormalizedName {
    let base = tags
        .first()
        .map(String::as_str)
        .filter(|t| !t.trim().is_empty())
        .unwrap_or(DEFAULT_INTERFACE);
    if excluded {
        normalize_name(&format!("{base}-{EXCLUDED_SUFFIX}"))
    } else {
        normalize_name(base)
    }
}

/// Group endpoints into interfaces, keeping first-seen interface order and
/// endpoint order within each interface. A `None` endpoint still creates its
/// interface, so a tag whose endpoints were all dropped stays visible.
pub fn group_endpoints(
    endpoints: impl IntoIterator<Item = (NormalizedName, Option<Endpoint>)>,
    package: &str,
) -> Vec<Interface> {
    let mut groups: IndexMap<String, Interface> = IndexMap::new();

    for (name, endpoint) in endpoints {
        let interface = groups
            .entry(name.pascal_case.clone())
            .or_insert_with(|| Interface {
                name,
                package: package.to_string(),
                endpoints: Vec::new(),
            });
        interface.endpoints.extend(endpoint);
    }

    groups.into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::api::HttpMethod;

    fn endpoint(path: &str) -> Endpoint {
        Endpoint {
            path: path.into(),
            method: HttpMethod::Get,
            operation_id: None,
            summary: None,
            description: None,
            deprecated: false,
            excluded: false,
            parameters: Vec::new(),
            request_bodies: Vec::new(),
            responses: IndexMap::new(),
        }
    }

    #[test]
    fn test_interface_name() {
        assert_eq!(interface_name(&["pet-store".into()], false).pascal_case, "PetStore");
        assert_eq!(interface_name(&[], false).pascal_case, "Default");
        assert_eq!(
            interface_name(&["pet".into(), "other".into()], true).pascal_case,
            "PetExcluded"
        );
    }

    #[test]
    fn test_group_endpoints_keeps_order() {
        let grouped = group_endpoints(
            vec![
                (interface_name(&["b".into()], false), Some(endpoint("/b1"))),
                (interface_name(&["a".into()], false), Some(endpoint("/a1"))),
                (interface_name(&["b".into()], false), Some(endpoint("/b2"))),
            ],
            "io.api",
        );
        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped[0].name.pascal_case, "B");
        let paths: Vec<&str> = grouped[0].endpoints.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, ["/b1", "/b2"]);
        assert_eq!(grouped[1].package, "io.api");
    }

    #[test]
    fn test_dropped_endpoint_keeps_interface() {
        let grouped = group_endpoints(
            vec![
                (interface_name(&["a".into()], false), Some(endpoint("/a1"))),
                (interface_name(&["b".into()], false), None),
            ],
            "io.api",
        );
        let names: Vec<&str> = grouped.iter().map(|i| i.name.pascal_case.as_str()).collect();
        assert_eq!(names, ["A", "B"]);
        assert!(grouped[1].endpoints.is_empty());
    }
}
