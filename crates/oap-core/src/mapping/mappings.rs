use std::collections::HashMap;

use log::debug;

use super::matcher::MappingMatcher;
use super::model::{Mapping, NullTypeMapping, ResultStyle, ResultTypeMapping};
use super::query::MappingQuery;
use crate::error::MappingError;
use crate::ir::{HttpMethod, TargetType};

/// The lists a [`Mappings`] scope keeps its overrides in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bucket {
    /// `types`: applies to every schema.
    Types,
    /// `schemas`: applies to schemas nested below parameters and bodies.
    Schemas,
    /// `parameters`: type, name, add and drop mappings.
    Parameters,
    /// `responses`: content type mappings.
    Responses,
}

/// Overrides configured for one scope (global, a path, or a path and method).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mappings {
    pub result: Option<ResultTypeMapping>,
    pub result_style: Option<ResultStyle>,
    pub single: Option<TargetType>,
    pub multi: Option<TargetType>,
    pub null: Option<NullTypeMapping>,
    pub types: Vec<Mapping>,
    pub schemas: Vec<Mapping>,
    pub parameters: Vec<Mapping>,
    pub responses: Vec<Mapping>,
    pub exclude: bool,
}

impl Mappings {
    pub fn bucket(&self, bucket: Bucket) -> &[Mapping] {
        match bucket {
            Bucket::Types => &self.types,
            Bucket::Schemas => &self.schemas,
            Bucket::Parameters => &self.parameters,
            Bucket::Responses => &self.responses,
        }
    }

    /// Every mapping in `bucket` accepted by `matcher`.
    pub fn filter<'m>(&'m self, bucket: Bucket, matcher: &dyn MappingMatcher) -> Vec<&'m Mapping> {
        self.bucket(bucket)
            .iter()
            .filter(|m| matcher.matches(m))
            .collect()
    }

    /// The single mapping in `bucket` accepted by `matcher`. More than one
    /// match is a configuration defect.
    pub fn find<'m>(
        &'m self,
        bucket: Bucket,
        matcher: &dyn MappingMatcher,
        query: &MappingQuery,
    ) -> Result<Option<&'m Mapping>, MappingError> {
        let found = self.filter(bucket, matcher);
        match found.as_slice() {
            [] => Ok(None),
            [mapping] => {
                debug!("mapping match for {query}: {mapping}");
                Ok(Some(*mapping))
            }
            _ => Err(MappingError::AmbiguousTypeMapping {
                query: query.to_string(),
                mappings: found.iter().map(|m| m.to_string()).collect(),
            }),
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Mappings::default()
    }
}

/// Overrides for one path: method-specific scopes are consulted before the
/// path-wide one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EndpointMappings {
    pub path: Mappings,
    pub methods: HashMap<HttpMethod, Mappings>,
}

impl EndpointMappings {
    /// The scopes that apply to `method`, most specific first.
    pub fn scopes(&self, method: Option<HttpMethod>) -> impl Iterator<Item = &Mappings> {
        method
            .and_then(|m| self.methods.get(&m))
            .into_iter()
            .chain(std::iter::once(&self.path))
    }

    /// First scope that yields a value.
    pub fn get<'m, T>(
        &'m self,
        method: Option<HttpMethod>,
        getter: impl Fn(&'m Mappings) -> Option<T>,
    ) -> Option<T> {
        self.scopes(method).find_map(getter)
    }

    /// First scope with a match; ambiguity in a scope is an error.
    pub fn find<'m>(
        &'m self,
        bucket: Bucket,
        matcher: &dyn MappingMatcher,
        query: &MappingQuery,
    ) -> Result<Option<&'m Mapping>, MappingError> {
        for scope in self.scopes(query.method) {
            if let Some(found) = scope.find(bucket, matcher, query)? {
                return Ok(Some(found));
            }
        }
        Ok(None)
    }

    /// All matches of the first scope that has any.
    pub fn filter<'m>(
        &'m self,
        method: Option<HttpMethod>,
        bucket: Bucket,
        matcher: &dyn MappingMatcher,
    ) -> Vec<&'m Mapping> {
        self.scopes(method)
            .map(|scope| scope.filter(bucket, matcher))
            .find(|found| !found.is_empty())
            .unwrap_or_default()
    }

    pub fn is_excluded(&self, method: Option<HttpMethod>) -> bool {
        self.scopes(method).any(|scope| scope.exclude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::matcher::TypeMatcher;
    use crate::mapping::model::TypeMapping;

    fn type_mapping(source: &str, target: &str) -> Mapping {
        Mapping::Type(TypeMapping {
            source: source.parse().unwrap(),
            target: TargetType::new(target),
        })
    }

    fn string_query() -> MappingQuery {
        MappingQuery::endpoint("/foo", HttpMethod::Get)
            .with_type(Some("string"), None)
            .primitive(true)
    }

    #[test]
    fn test_find_reports_ambiguity() {
        let mappings = Mappings {
            types: vec![type_mapping("string", "io.A"), type_mapping("string", "io.B")],
            ..Mappings::default()
        };
        let query = string_query();
        let err = mappings
            .find(Bucket::Types, &TypeMatcher(&query), &query)
            .unwrap_err();
        assert!(matches!(err, MappingError::AmbiguousTypeMapping { ref mappings, .. } if mappings.len() == 2));
    }

    #[test]
    fn test_method_scope_before_path_scope() {
        let mut endpoint = EndpointMappings {
            path: Mappings {
                types: vec![type_mapping("string", "io.Path")],
                ..Mappings::default()
            },
            ..EndpointMappings::default()
        };
        endpoint.methods.insert(
            HttpMethod::Get,
            Mappings {
                types: vec![type_mapping("string", "io.Get")],
                ..Mappings::default()
            },
        );

        let query = string_query();
        let found = endpoint
            .find(Bucket::Types, &TypeMatcher(&query), &query)
            .unwrap()
            .and_then(Mapping::target)
            .unwrap();
        assert_eq!(found.type_name, "io.Get");

        let mut post = string_query();
        post.method = Some(HttpMethod::Post);
        let found = endpoint
            .find(Bucket::Types, &TypeMatcher(&post), &post)
            .unwrap()
            .and_then(Mapping::target)
            .unwrap();
        assert_eq!(found.type_name, "io.Path");
    }

    #[test]
    fn test_get_prefers_method_value() {
        let mut endpoint = EndpointMappings::default();
        endpoint.path.single = Some(TargetType::new("io.PathSingle"));
        endpoint.methods.insert(
            HttpMethod::Post,
            Mappings {
                single: Some(TargetType::new("io.PostSingle")),
                ..Mappings::default()
            },
        );
        let single = endpoint.get(Some(HttpMethod::Post), |m| m.single.as_ref());
        assert_eq!(single.map(|t| t.name()), Some("PostSingle"));
        let single = endpoint.get(Some(HttpMethod::Get), |m| m.single.as_ref());
        assert_eq!(single.map(|t| t.name()), Some("PathSingle"));
    }
}
