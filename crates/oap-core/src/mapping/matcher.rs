use log::trace;

use super::model::{Mapping, SourceType};
use super::query::MappingQuery;

/// Decides whether a mapping applies to a query.
pub trait MappingMatcher {
    fn matches(&self, mapping: &Mapping) -> bool;
}

fn log_decision(kind: &str, mapping: &Mapping, matched: bool) -> bool {
    trace!(
        "{kind}: {}matched: {mapping}",
        if matched { "" } else { "not " }
    );
    matched
}

fn format_matches(source: &SourceType, query: &MappingQuery) -> bool {
    source.format == query.format
}

/// Type mappings: by schema name, by primitive `type:format`, or the
/// `array` pseudo type for arrays.
pub struct TypeMatcher<'q>(pub &'q MappingQuery);

impl MappingMatcher for TypeMatcher<'_> {
    fn matches(&self, mapping: &Mapping) -> bool {
        let Mapping::Type(m) = mapping else {
            return false;
        };
        let query = self.0;
        let source = &m.source;
        let by_name =
            query.name.as_deref() == Some(source.type_name.as_str()) && format_matches(source, query);
        let by_type = query.primitive
            && query.type_name.as_deref() == Some(source.type_name.as_str())
            && format_matches(source, query);
        let by_array = query.array && source.type_name == "array";
        log_decision("type", mapping, by_name || by_type || by_array)
    }
}

/// Annotation type mappings: by name or `type:format`; `object` matches any
/// object when the query allows it.
pub struct AnnotationTypeMatcher<'q>(pub &'q MappingQuery);

impl MappingMatcher for AnnotationTypeMatcher<'_> {
    fn matches(&self, mapping: &Mapping) -> bool {
        let Mapping::AnnotationType(m) = mapping else {
            return false;
        };
        let query = self.0;
        let source = &m.source;
        let by_name =
            query.name.as_deref() == Some(source.type_name.as_str()) && format_matches(source, query);
        let by_type = query.type_name.as_deref() == Some(source.type_name.as_str())
            && format_matches(source, query);
        let by_object = query.allow_object && source.type_name == "object";
        log_decision("annotation type", mapping, by_name || by_type || by_object)
    }
}

pub struct ParameterNameTypeMatcher<'q>(pub &'q MappingQuery);

impl MappingMatcher for ParameterNameTypeMatcher<'_> {
    fn matches(&self, mapping: &Mapping) -> bool {
        let Mapping::NameType(m) = mapping else {
            return false;
        };
        let matched = self.0.parameter_name() == Some(m.parameter_name.as_str());
        log_decision("parameter name", mapping, matched)
    }
}

pub struct AnnotationParameterNameMatcher<'q>(pub &'q MappingQuery);

impl MappingMatcher for AnnotationParameterNameMatcher<'_> {
    fn matches(&self, mapping: &Mapping) -> bool {
        let Mapping::AnnotationName(m) = mapping else {
            return false;
        };
        let matched = self.0.parameter_name() == Some(m.name.as_str());
        log_decision("annotation parameter name", mapping, matched)
    }
}

pub struct ContentTypeMatcher<'q>(pub &'q MappingQuery);

impl MappingMatcher for ContentTypeMatcher<'_> {
    fn matches(&self, mapping: &Mapping) -> bool {
        let Mapping::ContentType(m) = mapping else {
            return false;
        };
        let matched = self.0.content_type.as_deref() == Some(m.content_type.as_str());
        log_decision("content type", mapping, matched)
    }
}

pub struct AddParameterTypeMatcher;

impl MappingMatcher for AddParameterTypeMatcher {
    fn matches(&self, mapping: &Mapping) -> bool {
        matches!(mapping, Mapping::AddParameter(_))
    }
}

pub struct DropParameterTypeMatcher;

impl MappingMatcher for DropParameterTypeMatcher {
    fn matches(&self, mapping: &Mapping) -> bool {
        matches!(mapping, Mapping::DropParameter(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{Annotation, TargetType};
    use crate::mapping::model::{AnnotationTypeMapping, TypeMapping};

    fn type_mapping(source: &str) -> Mapping {
        Mapping::Type(TypeMapping {
            source: source.parse().unwrap(),
            target: TargetType::new("io.Target"),
        })
    }

    #[test]
    fn test_type_matcher_by_primitive_type_and_format() {
        let query = MappingQuery::default()
            .with_name("Foo")
            .with_type(Some("string"), Some("uuid"))
            .primitive(true);
        assert!(TypeMatcher(&query).matches(&type_mapping("string:uuid")));
        assert!(!TypeMatcher(&query).matches(&type_mapping("string")));
        assert!(!TypeMatcher(&query).matches(&type_mapping("string:date")));
    }

    #[test]
    fn test_type_matcher_type_requires_primitive() {
        let query = MappingQuery::default()
            .with_name("Foo")
            .with_type(Some("object"), None);
        assert!(!TypeMatcher(&query).matches(&type_mapping("object")));
        assert!(TypeMatcher(&query).matches(&type_mapping("Foo")));
    }

    #[test]
    fn test_type_matcher_array() {
        let query = MappingQuery::default()
            .with_name("FooArray")
            .with_type(Some("array"), None)
            .array(true);
        assert!(TypeMatcher(&query).matches(&type_mapping("array")));
    }

    #[test]
    fn test_annotation_matcher_object() {
        let mapping = Mapping::AnnotationType(AnnotationTypeMapping {
            source: "object".parse().unwrap(),
            annotation: Annotation::new("io.Marker"),
        });
        let query = MappingQuery::default()
            .with_name("Foo")
            .with_type(Some("object"), None);
        assert!(AnnotationTypeMatcher(&query).matches(&mapping));

        let query = MappingQuery::default()
            .with_name("Foo")
            .with_type(Some("string"), None)
            .allow_object(true);
        assert!(AnnotationTypeMatcher(&query).matches(&mapping));

        let query = MappingQuery::default().with_type(Some("string"), None);
        assert!(!AnnotationTypeMatcher(&query).matches(&mapping));
    }

    #[test]
    fn test_matchers_ignore_other_variants() {
        let query = MappingQuery::default().with_name("Foo");
        let mapping = type_mapping("Foo");
        assert!(!ParameterNameTypeMatcher(&query).matches(&mapping));
        assert!(!ContentTypeMatcher(&query).matches(&mapping));
        assert!(!AddParameterTypeMatcher.matches(&mapping));
        assert!(!DropParameterTypeMatcher.matches(&mapping));
    }
}
