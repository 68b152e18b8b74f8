use super::mappings::{Bucket, Mappings};
use super::matcher::{
    AddParameterTypeMatcher, AnnotationParameterNameMatcher, AnnotationTypeMatcher,
    ContentTypeMatcher, DropParameterTypeMatcher, MappingMatcher, ParameterNameTypeMatcher,
    TypeMatcher,
};
use super::model::{
    AddParameterTypeMapping, Mapping, NullTypeMapping, ResultStyle, ResultTypeMapping,
};
use super::query::{MappingQuery, QueryOrigin};
use super::repository::MappingRepository;
use crate::error::MappingError;
use crate::ir::{Annotation, TargetType};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    Endpoint,
    Global,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lookup {
    ParameterType,
    ParameterName,
    ContentType,
    Type,
}

/// Type mapping precedence. The first step with a match wins.
const TYPE_PRECEDENCE: [(Scope, Lookup); 8] = [
    (Scope::Endpoint, Lookup::ParameterType),
    (Scope::Endpoint, Lookup::ParameterName),
    (Scope::Endpoint, Lookup::ContentType),
    (Scope::Endpoint, Lookup::Type),
    (Scope::Global, Lookup::ParameterType),
    (Scope::Global, Lookup::ParameterName),
    (Scope::Global, Lookup::ContentType),
    (Scope::Global, Lookup::Type),
];

/// Looks up overrides for a [`MappingQuery`] across the configured scopes.
#[derive(Debug, Clone, Copy)]
pub struct MappingFinder<'r> {
    repository: &'r MappingRepository,
}

impl<'r> MappingFinder<'r> {
    pub fn new(repository: &'r MappingRepository) -> Self {
        Self { repository }
    }

    /// The replacement type for the queried schema, if any.
    pub fn find_type_mapping(
        &self,
        query: &MappingQuery,
    ) -> Result<Option<&'r TargetType>, MappingError> {
        for (scope, lookup) in TYPE_PRECEDENCE {
            if let Some(mapping) = self.lookup(scope, lookup, query)? {
                return Ok(mapping.target());
            }
        }
        Ok(None)
    }

    fn lookup(
        &self,
        scope: Scope,
        lookup: Lookup,
        query: &MappingQuery,
    ) -> Result<Option<&'r Mapping>, MappingError> {
        match lookup {
            Lookup::ParameterType if query.origin == QueryOrigin::Parameter => {
                self.find_in(scope, Bucket::Parameters, &TypeMatcher(query), query)
            }
            Lookup::ParameterName if query.origin == QueryOrigin::Parameter => {
                self.find_in(scope, Bucket::Parameters, &ParameterNameTypeMatcher(query), query)
            }
            Lookup::ContentType
                if query.origin == QueryOrigin::Response && query.content_type.is_some() =>
            {
                self.find_in(scope, Bucket::Responses, &ContentTypeMatcher(query), query)
            }
            Lookup::Type => {
                if query.origin == QueryOrigin::Schema {
                    let found = self.find_in(scope, Bucket::Schemas, &TypeMatcher(query), query)?;
                    if found.is_some() {
                        return Ok(found);
                    }
                }
                self.find_in(scope, Bucket::Types, &TypeMatcher(query), query)
            }
            _ => Ok(None),
        }
    }

    fn find_in(
        &self,
        scope: Scope,
        bucket: Bucket,
        matcher: &dyn MappingMatcher,
        query: &MappingQuery,
    ) -> Result<Option<&'r Mapping>, MappingError> {
        match scope {
            Scope::Endpoint => match self.repository.endpoint(query.path.as_deref()) {
                Some(endpoint) => endpoint.find(bucket, matcher, query),
                None => Ok(None),
            },
            Scope::Global => self.repository.global.find(bucket, matcher, query),
        }
    }

    /// Matches of the endpoint scope if it has any, otherwise the global ones.
    fn filter(
        &self,
        bucket: Bucket,
        matcher: &dyn MappingMatcher,
        query: &MappingQuery,
    ) -> Vec<&'r Mapping> {
        let endpoint = self
            .repository
            .endpoint(query.path.as_deref())
            .map(|e| e.filter(query.method, bucket, matcher))
            .unwrap_or_default();
        if !endpoint.is_empty() {
            return endpoint;
        }
        self.repository.global.filter(bucket, matcher)
    }

    /// A single-valued setting: method scope, path scope, then global.
    fn setting<T>(
        &self,
        query: &MappingQuery,
        getter: impl Fn(&'r Mappings) -> Option<T> + Copy,
    ) -> Option<T> {
        self.repository
            .endpoint(query.path.as_deref())
            .and_then(|e| e.get(query.method, getter))
            .or_else(|| getter(&self.repository.global))
    }

    /// Annotations for a schema by name or type.
    pub fn find_annotation_type_mappings(&self, query: &MappingQuery) -> Vec<&'r Annotation> {
        annotations(self.filter(Bucket::Types, &AnnotationTypeMatcher(query), query))
    }

    /// Annotations for a parameter by its type.
    pub fn find_parameter_type_annotations(&self, query: &MappingQuery) -> Vec<&'r Annotation> {
        annotations(self.filter(Bucket::Parameters, &AnnotationTypeMatcher(query), query))
    }

    /// Annotations for a parameter by its name.
    pub fn find_parameter_name_annotations(&self, query: &MappingQuery) -> Vec<&'r Annotation> {
        annotations(self.filter(
            Bucket::Parameters,
            &AnnotationParameterNameMatcher(query),
            query,
        ))
    }

    pub fn find_add_parameters(&self, query: &MappingQuery) -> Vec<&'r AddParameterTypeMapping> {
        self.filter(Bucket::Parameters, &AddParameterTypeMatcher, query)
            .into_iter()
            .filter_map(|m| match m {
                Mapping::AddParameter(add) => Some(add),
                _ => None,
            })
            .collect()
    }

    /// Names of declared parameters to remove.
    pub fn find_drop_parameters(&self, query: &MappingQuery) -> Vec<&'r str> {
        self.filter(Bucket::Parameters, &DropParameterTypeMatcher, query)
            .into_iter()
            .filter_map(|m| match m {
                Mapping::DropParameter(drop) => Some(drop.parameter_name.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn result_mapping(&self, query: &MappingQuery) -> Option<&'r ResultTypeMapping> {
        self.setting(query, |m| m.result.as_ref())
    }

    pub fn result_style(&self, query: &MappingQuery) -> ResultStyle {
        self.setting(query, |m| m.result_style).unwrap_or_default()
    }

    pub fn single_mapping(&self, query: &MappingQuery) -> Option<&'r TargetType> {
        self.setting(query, |m| m.single.as_ref())
    }

    pub fn multi_mapping(&self, query: &MappingQuery) -> Option<&'r TargetType> {
        self.setting(query, |m| m.multi.as_ref())
    }

    pub fn null_mapping(&self, query: &MappingQuery) -> Option<&'r NullTypeMapping> {
        self.setting(query, |m| m.null.as_ref())
    }

    pub fn extension_annotations(&self, extension: &str, value: &str) -> Vec<&'r Annotation> {
        self.repository.extension_annotations(extension, value)
    }

    pub fn is_excluded(&self, query: &MappingQuery) -> bool {
        self.repository
            .endpoint(query.path.as_deref())
            .is_some_and(|e| e.is_excluded(query.method))
    }
}

fn annotations(mappings: Vec<&Mapping>) -> Vec<&Annotation> {
    mappings.into_iter().filter_map(Mapping::annotation).collect()
}
