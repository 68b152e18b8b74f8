use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    #[error("failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported OpenAPI version: {0}")]
    UnsupportedVersion(String),

    #[error("missing required field: {0}")]
    MissingField(String),
}

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("circular reference detected: {0}")]
    CircularRef(String),

    #[error("invalid reference format: {0}")]
    InvalidRefFormat(String),

    #[error("reference target not found: {0}")]
    RefTargetNotFound(String),
}

#[derive(Debug, Error)]
pub enum MappingError {
    #[error("ambiguous type mapping for {query}: {}", .mappings.join(", "))]
    AmbiguousTypeMapping { query: String, mappings: Vec<String> },

    #[error("invalid mapping: {0}")]
    InvalidMapping(String),
}

#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("unknown data type for schema '{name}': type '{type_name}', format '{}'", .format.as_deref().unwrap_or("<none>"))]
    UnknownDataType {
        name: String,
        type_name: String,
        format: Option<String>,
    },

    #[error("unknown parameter location '{location}' for parameter '{name}'")]
    UnknownParameterType { name: String, location: String },

    #[error("request body of {path} has no object schema")]
    NoRequestBodySchema { path: String },

    #[error("multipart request body of {path} is not an object")]
    MultipartResponseBody { path: String },

    #[error(transparent)]
    Mapping(#[from] MappingError),

    #[error(transparent)]
    Resolve(#[from] ResolveError),
}

impl ConvertError {
    /// Errors that only invalidate the endpoint being converted. The endpoint
    /// is dropped and conversion continues with the next one.
    pub fn is_endpoint_local(&self) -> bool {
        matches!(
            self,
            ConvertError::UnknownDataType { .. }
                | ConvertError::UnknownParameterType { .. }
                | ConvertError::Resolve(_)
        )
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: serde_yaml_ng::Error,
    },

    #[error(transparent)]
    Mapping(#[from] MappingError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_local_classification() {
        let unknown = ConvertError::UnknownDataType {
            name: "Foo".into(),
            type_name: "unknown".into(),
            format: None,
        };
        assert!(unknown.is_endpoint_local());

        let ambiguous = ConvertError::from(MappingError::AmbiguousTypeMapping {
            query: "string".into(),
            mappings: vec!["a".into(), "b".into()],
        });
        assert!(!ambiguous.is_endpoint_local());

        let multipart = ConvertError::MultipartResponseBody { path: "/f".into() };
        assert!(!multipart.is_endpoint_local());
    }

    #[test]
    fn test_unknown_data_type_message() {
        let err = ConvertError::UnknownDataType {
            name: "Foo".into(),
            type_name: "string".into(),
            format: Some("weird".into()),
        };
        assert_eq!(
            err.to_string(),
            "unknown data type for schema 'Foo': type 'string', format 'weird'"
        );
    }
}
