use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use serde::Deserialize;

use crate::error::ConfigError;
use crate::ir::Annotation;

/// Processor configuration: generation options plus the mapping document.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProcessorConfig {
    pub options: ProcessorOptions,
    pub map: MapConfig,
}

/// Global generation options.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ProcessorOptions {
    pub package_name: String,
    pub model_name_suffix: String,
    pub model_type: ModelType,
    pub enum_type: EnumStyle,
    pub one_of_interface: bool,
    /// Synthesize marker interfaces over differing responses of one content type.
    pub response_interface: bool,
    pub bean_validation: bool,
    pub base_path: BasePathOptions,
}

impl Default for ProcessorOptions {
    fn default() -> Self {
        Self {
            package_name: "io.openapiprocessor.generated".to_string(),
            model_name_suffix: String::new(),
            model_type: ModelType::Default,
            enum_type: EnumStyle::Default,
            one_of_interface: false,
            response_interface: false,
            bean_validation: false,
            base_path: BasePathOptions::default(),
        }
    }
}

impl ProcessorOptions {
    pub fn model_package(&self) -> String {
        format!("{}.model", self.package_name)
    }

    pub fn api_package(&self) -> String {
        format!("{}.api", self.package_name)
    }
}

/// How object models are emitted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelType {
    #[default]
    Default,
    Record,
}

/// How string enums are represented.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnumStyle {
    /// A named enum type.
    #[default]
    Default,
    /// A plain string.
    String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct BasePathOptions {
    /// Index into the document's servers; absent disables the base path.
    pub server_url: Option<usize>,
}

/// The `map` document: the global scope, per-path scopes, and extension
/// annotations.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    #[serde(flatten)]
    pub scope: ScopeConfig,
    pub paths: IndexMap<String, ScopeConfig>,
    pub extensions: IndexMap<String, IndexMap<String, Vec<Annotation>>>,
}

/// The keys shared by the global, path, and method scopes.
///
/// Keys that are not known here land in `other`; under a path they are read
/// as HTTP method scopes.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ScopeConfig {
    pub result: Option<String>,
    pub result_style: Option<String>,
    pub single: Option<String>,
    pub multi: Option<String>,
    /// `<type>` or `<type> = <init>`.
    pub null: Option<String>,
    pub exclude: bool,
    pub types: Vec<MappingEntry>,
    pub schemas: Vec<MappingEntry>,
    pub parameters: Vec<MappingEntry>,
    pub responses: Vec<MappingEntry>,
    #[serde(flatten)]
    pub other: IndexMap<String, serde_yaml_ng::Value>,
}

/// One entry of a `types`, `schemas`, `parameters` or `responses` list.
///
/// Which keys are set decides the kind of mapping; the combinations are
/// validated when the repository is built.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct MappingEntry {
    pub from: Option<String>,
    pub to: Option<String>,
    pub generics: Vec<String>,
    pub annotation: Option<Annotation>,
    pub name: Option<String>,
    pub add: Option<String>,
    pub drop: Option<String>,
    pub content_type: Option<String>,
}

/// Default config file name.
pub const CONFIG_FILE_NAME: &str = "mapping.yaml";

/// Load config from a YAML file. Returns `None` if the file doesn't exist.
pub fn load_config(path: &Path) -> Result<Option<ProcessorConfig>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let config = from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Some(config))
}

pub fn from_str(yaml: &str) -> Result<ProcessorConfig, serde_yaml_ng::Error> {
    if yaml.trim().is_empty() {
        return Ok(ProcessorConfig::default());
    }
    serde_yaml_ng::from_str(yaml)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_default_config() {
        let config = ProcessorConfig::default();
        assert_eq!(config.options.package_name, "io.openapiprocessor.generated");
        assert_eq!(config.options.enum_type, EnumStyle::Default);
        assert!(!config.options.one_of_interface);
        assert!(config.options.base_path.server_url.is_none());
        assert!(config.map.scope.types.is_empty());
        assert_eq!(config.options.model_package(), "io.openapiprocessor.generated.model");
    }

    #[test]
    fn test_parse_config_yaml() {
        let yaml = r#"
options:
  package-name: io.example
  model-name-suffix: Dto
  enum-type: string
  one-of-interface: true
  base-path:
    server-url: 0
map:
  result: org.springframework.http.ResponseEntity
  result-style: all
  "null": org.openapitools.jackson.nullable.JsonNullable = JsonNullable.undefined()
  types:
    - from: string:uuid
      to: java.util.UUID
    - from: array
      to: java.util.Set
  parameters:
    - name: foo
      to: io.Foo
    - drop: bar
  paths:
    /foo:
      exclude: true
      get:
        result: plain
  extensions:
    x-marker:
      lower:
        - type: io.Lower
"#;
        let config = from_str(yaml).unwrap();
        assert_eq!(config.options.package_name, "io.example");
        assert_eq!(config.options.model_name_suffix, "Dto");
        assert_eq!(config.options.enum_type, EnumStyle::String);
        assert!(config.options.one_of_interface);
        assert_eq!(config.options.base_path.server_url, Some(0));

        let map = &config.map;
        assert_eq!(map.scope.result_style.as_deref(), Some("all"));
        assert_eq!(map.scope.types.len(), 2);
        assert_eq!(map.scope.types[0].from.as_deref(), Some("string:uuid"));
        assert_eq!(map.scope.parameters[1].drop.as_deref(), Some("bar"));
        assert!(map.scope.other.is_empty());

        let foo = &map.paths["/foo"];
        assert!(foo.exclude);
        assert!(foo.other.contains_key("get"));
        assert_eq!(map.extensions["x-marker"]["lower"][0].type_name, "io.Lower");
    }

    #[test]
    fn test_load_missing_config() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = load_config(&dir.path().join(CONFIG_FILE_NAME)).unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn test_load_config_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "options:\n  package-name: io.disk").unwrap();
        let loaded = load_config(file.path()).unwrap().unwrap();
        assert_eq!(loaded.options.package_name, "io.disk");
    }

    #[test]
    fn test_load_config_parse_error_names_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "options: [not, a, map]").unwrap();
        let err = load_config(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains(&file.path().display().to_string()));
    }
}
