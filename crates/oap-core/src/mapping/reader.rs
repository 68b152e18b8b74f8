use std::collections::HashMap;

use super::mappings::{EndpointMappings, Mappings};
use super::model::{
    AddParameterTypeMapping, AnnotationNameMapping, AnnotationTypeMapping, ContentTypeMapping,
    DropParameterTypeMapping, ExtensionMapping, Mapping, NameTypeMapping, NullTypeMapping,
    ResultStyle, ResultTypeMapping, SourceType, TypeMapping,
};
use super::repository::MappingRepository;
use crate::config::{MapConfig, MappingEntry, ScopeConfig};
use crate::error::MappingError;
use crate::ir::{HttpMethod, TargetType};

fn invalid(message: impl Into<String>) -> MappingError {
    MappingError::InvalidMapping(message.into())
}

impl MappingRepository {
    /// Build the repository from a `map` document, validating every entry.
    pub fn from_config(map: &MapConfig) -> Result<Self, MappingError> {
        let global = read_scope(&map.scope, "map")?;
        if let Some(key) = map.scope.other.keys().next() {
            return Err(invalid(format!("unknown key '{key}' in map")));
        }

        let mut repository = MappingRepository::new(global);
        for (path, scope) in &map.paths {
            repository = repository.with_endpoint(path.clone(), read_endpoint(path, scope)?);
        }
        for (extension, values) in &map.extensions {
            let values = values
                .iter()
                .flat_map(|(name, annotations)| {
                    annotations.iter().map(|annotation| AnnotationNameMapping {
                        name: name.clone(),
                        annotation: annotation.clone(),
                    })
                })
                .collect();
            repository = repository.with_extension(ExtensionMapping {
                extension: extension.clone(),
                values,
            });
        }
        Ok(repository)
    }
}

fn read_endpoint(path: &str, scope: &ScopeConfig) -> Result<EndpointMappings, MappingError> {
    let mut methods = HashMap::new();
    for (key, value) in &scope.other {
        let method: HttpMethod = key
            .parse()
            .map_err(|_| invalid(format!("unknown http method '{key}' at path '{path}'")))?;
        let method_scope: ScopeConfig = serde_yaml_ng::from_value(value.clone())
            .map_err(|e| invalid(format!("{path} {key}: {e}")))?;
        let location = format!("{path} {}", method.as_str());
        if let Some(nested) = method_scope.other.keys().next() {
            return Err(invalid(format!("unknown key '{nested}' at {location}")));
        }
        methods.insert(method, read_scope(&method_scope, &location)?);
    }
    Ok(EndpointMappings {
        path: read_scope(scope, path)?,
        methods,
    })
}

fn read_scope(scope: &ScopeConfig, location: &str) -> Result<Mappings, MappingError> {
    Ok(Mappings {
        result: scope
            .result
            .as_deref()
            .map(|r| r.parse().map(|target| ResultTypeMapping { target }))
            .transpose()?,
        result_style: scope
            .result_style
            .as_deref()
            .map(str::parse::<ResultStyle>)
            .transpose()?,
        single: parse_target(scope.single.as_deref())?,
        multi: parse_target(scope.multi.as_deref())?,
        null: scope.null.as_deref().map(read_null).transpose()?,
        types: read_entries(&scope.types, location, read_type_entry)?,
        schemas: read_entries(&scope.schemas, location, read_type_entry)?,
        parameters: read_entries(&scope.parameters, location, read_parameter_entry)?,
        responses: read_entries(&scope.responses, location, read_response_entry)?,
        exclude: scope.exclude,
    })
}

fn read_entries(
    entries: &[MappingEntry],
    location: &str,
    read: fn(&MappingEntry) -> Result<Mapping, MappingError>,
) -> Result<Vec<Mapping>, MappingError> {
    entries
        .iter()
        .map(|entry| {
            read(entry).map_err(|e| match e {
                MappingError::InvalidMapping(message) => invalid(format!("{location}: {message}")),
                other => other,
            })
        })
        .collect()
}

fn parse_target(target: Option<&str>) -> Result<Option<TargetType>, MappingError> {
    target.map(str::parse).transpose()
}

/// `to` plus optional `generics`; generics inside `to` are accepted too.
fn read_target(entry: &MappingEntry) -> Result<Option<TargetType>, MappingError> {
    let Some(to) = entry.to.as_deref() else {
        return Ok(None);
    };
    let target: TargetType = to.parse()?;
    if entry.generics.is_empty() {
        return Ok(Some(target));
    }
    if !target.generics.is_empty() {
        return Err(invalid(format!("'{to}' has generics and a generics list")));
    }
    let generics = entry
        .generics
        .iter()
        .map(|g| g.parse())
        .collect::<Result<Vec<TargetType>, _>>()?;
    Ok(Some(target.with_generics(generics)))
}

fn read_source(entry: &MappingEntry) -> Result<SourceType, MappingError> {
    match entry.from.as_deref() {
        Some(from) => from.parse(),
        None => Err(invalid("mapping without 'from'")),
    }
}

fn read_type_entry(entry: &MappingEntry) -> Result<Mapping, MappingError> {
    let source = read_source(entry)?;
    match (read_target(entry)?, &entry.annotation) {
        (Some(target), None) => Ok(Mapping::Type(TypeMapping { source, target })),
        (None, Some(annotation)) => Ok(Mapping::AnnotationType(AnnotationTypeMapping {
            source,
            annotation: annotation.clone(),
        })),
        (Some(_), Some(_)) => Err(invalid(format!(
            "'{source}' has both a target type and an annotation"
        ))),
        (None, None) => Err(invalid(format!(
            "'{source}' has neither a target type nor an annotation"
        ))),
    }
}

fn read_parameter_entry(entry: &MappingEntry) -> Result<Mapping, MappingError> {
    if let Some(drop) = &entry.drop {
        if entry.to.is_some() || entry.annotation.is_some() {
            return Err(invalid(format!("drop '{drop}' with a target or annotation")));
        }
        return Ok(Mapping::DropParameter(DropParameterTypeMapping {
            parameter_name: drop.clone(),
        }));
    }

    if let Some(add) = &entry.add {
        let target = read_target(entry)?;
        if target.is_none() && entry.annotation.is_none() {
            return Err(invalid(format!("add '{add}' without a target or annotation")));
        }
        return Ok(Mapping::AddParameter(AddParameterTypeMapping {
            parameter_name: add.clone(),
            target,
            annotation: entry.annotation.clone(),
        }));
    }

    if let Some(name) = &entry.name {
        return match (read_target(entry)?, &entry.annotation) {
            (Some(target), None) => Ok(Mapping::NameType(NameTypeMapping {
                parameter_name: name.clone(),
                target,
            })),
            (None, Some(annotation)) => Ok(Mapping::AnnotationName(AnnotationNameMapping {
                name: name.clone(),
                annotation: annotation.clone(),
            })),
            _ => Err(invalid(format!(
                "parameter '{name}' needs exactly one of a target type or an annotation"
            ))),
        };
    }

    read_type_entry(entry)
}

fn read_response_entry(entry: &MappingEntry) -> Result<Mapping, MappingError> {
    if let Some(content_type) = entry.content_type.as_deref() {
        let target = read_target(entry)?
            .ok_or_else(|| invalid(format!("content type '{content_type}' without a target")))?;
        return Ok(Mapping::ContentType(ContentTypeMapping {
            content_type: content_type.to_string(),
            target,
        }));
    }
    read_type_entry(entry)
}

/// `org.x.JsonNullable` or `org.x.JsonNullable = JsonNullable.undefined()`.
fn read_null(value: &str) -> Result<NullTypeMapping, MappingError> {
    let (target, init) = match value.split_once('=') {
        Some((target, init)) => (target, Some(init.trim().to_string())),
        None => (value, None),
    };
    Ok(NullTypeMapping {
        target: target.parse()?,
        init: init.filter(|i| !i.is_empty()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config;

    fn repository(yaml: &str) -> Result<MappingRepository, MappingError> {
        let config = config::from_str(yaml).unwrap();
        MappingRepository::from_config(&config.map)
    }

    #[test]
    fn test_reads_global_and_path_scopes() {
        let repo = repository(
            r#"
map:
  result: plain
  "null": org.x.JsonNullable = JsonNullable.undefined()
  types:
    - from: string:uuid
      to: java.util.UUID
    - from: object
      to: java.util.Map
      generics: [java.lang.String, java.lang.Object]
  parameters:
    - name: foo
      to: io.Foo
    - add: request
      to: javax.servlet.http.HttpServletRequest
    - drop: ignored
  responses:
    - content-type: application/vnd.any
      to: io.Any
  paths:
    /foo:
      exclude: true
      get:
        types:
          - from: string:uuid
            to: io.FooUuid
  extensions:
    x-kind:
      lower:
        - type: io.Lower
"#,
        )
        .unwrap();

        assert!(repo.global.result.as_ref().is_some_and(|r| r.is_plain()));
        let null = repo.global.null.as_ref().unwrap();
        assert_eq!(null.init.as_deref(), Some("JsonNullable.undefined()"));
        assert_eq!(repo.global.types.len(), 2);
        assert_eq!(
            repo.global.types[1].target().unwrap().to_string(),
            "java.util.Map<java.lang.String, java.lang.Object>"
        );
        assert!(matches!(repo.global.parameters[0], Mapping::NameType(_)));
        assert!(matches!(repo.global.parameters[1], Mapping::AddParameter(_)));
        assert!(matches!(repo.global.parameters[2], Mapping::DropParameter(_)));
        assert!(matches!(repo.global.responses[0], Mapping::ContentType(_)));

        let foo = repo.endpoint(Some("/foo")).unwrap();
        assert!(foo.path.exclude);
        assert_eq!(foo.methods[&HttpMethod::Get].types.len(), 1);
        assert_eq!(repo.extension_annotations("x-kind", "lower").len(), 1);
    }

    #[test]
    fn test_rejects_entry_without_target_or_annotation() {
        let err = repository("map:\n  types:\n    - from: string:uuid\n").unwrap_err();
        assert!(err.to_string().contains("neither a target type nor an annotation"));
    }

    #[test]
    fn test_rejects_drop_with_target() {
        let err = repository("map:\n  parameters:\n    - drop: foo\n      to: io.Foo\n").unwrap_err();
        assert!(matches!(err, MappingError::InvalidMapping(_)));
    }

    #[test]
    fn test_rejects_empty_from_and_bad_format() {
        assert!(repository("map:\n  types:\n    - from: ''\n      to: io.X\n").is_err());
        assert!(repository("map:\n  types:\n    - from: 'string:'\n      to: io.X\n").is_err());
    }

    #[test]
    fn test_rejects_unknown_method_key() {
        let err = repository("map:\n  paths:\n    /foo:\n      fetch:\n        exclude: true\n")
            .unwrap_err();
        assert!(err.to_string().contains("unknown http method 'fetch'"));
    }

    #[test]
    fn test_error_names_location() {
        let err = repository(
            "map:\n  paths:\n    /foo:\n      get:\n        types:\n          - from: integer\n",
        )
        .unwrap_err();
        assert!(err.to_string().contains("/foo GET"));
    }
}
