use indexmap::IndexMap;

use super::mappings::{EndpointMappings, Mappings};
use super::model::ExtensionMapping;
use crate::ir::Annotation;

/// All configured overrides: the global scope, per-path scopes, and
/// extension annotations.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MappingRepository {
    pub global: Mappings,
    pub endpoints: IndexMap<String, EndpointMappings>,
    pub extensions: IndexMap<String, ExtensionMapping>,
}

impl MappingRepository {
    pub fn new(global: Mappings) -> Self {
        Self {
            global,
            ..Self::default()
        }
    }

    pub fn with_endpoint(mut self, path: impl Into<String>, mappings: EndpointMappings) -> Self {
        self.endpoints.insert(path.into(), mappings);
        self
    }

    pub fn with_extension(mut self, mapping: ExtensionMapping) -> Self {
        self.extensions.insert(mapping.extension.clone(), mapping);
        self
    }

    pub fn endpoint(&self, path: Option<&str>) -> Option<&EndpointMappings> {
        path.and_then(|p| self.endpoints.get(p))
    }

    /// Annotations configured for `value` of the `extension` key.
    pub fn extension_annotations(&self, extension: &str, value: &str) -> Vec<&Annotation> {
        self.extensions
            .get(extension)
            .map(|ext| {
                ext.values
                    .iter()
                    .filter(|m| m.name == value)
                    .map(|m| &m.annotation)
                    .collect()
            })
            .unwrap_or_default()
    }
}
