use crate::ir::{DataType, NullType, WrapperType};
use crate::mapping::{MappingFinder, MappingQuery};

/// Wrap a non-collection body or response in the configured `single` type.
pub fn wrap_single(data_type: DataType, finder: &MappingFinder<'_>, query: &MappingQuery) -> DataType {
    match finder.single_mapping(query) {
        Some(target) if !target.is_plain() => DataType::Single(WrapperType {
            target: target.clone(),
            inner: Box::new(data_type),
        }),
        _ => data_type,
    }
}

/// Re-express an array as the configured `multi` type over its item.
pub fn wrap_multi(data_type: DataType, finder: &MappingFinder<'_>, query: &MappingQuery) -> DataType {
    let Some(target) = finder.multi_mapping(query).filter(|t| !t.is_plain()) else {
        return data_type;
    };
    let item = match data_type {
        DataType::Array(array) => array.item,
        DataType::MappedCollection(collection) => collection.item,
        other => return other,
    };
    DataType::Multi(WrapperType {
        target: target.clone(),
        inner: item,
    })
}

/// Single for plain types, multi for arrays.
pub fn wrap_body(data_type: DataType, finder: &MappingFinder<'_>, query: &MappingQuery) -> DataType {
    if matches!(data_type, DataType::Array(_) | DataType::MappedCollection(_)) {
        wrap_multi(data_type, finder, query)
    } else {
        wrap_single(data_type, finder, query)
    }
}

/// Wrap a response type in the configured `result` type. No content inside a
/// result becomes its `in_result` variant.
pub fn wrap_result(data_type: DataType, finder: &MappingFinder<'_>, query: &MappingQuery) -> DataType {
    let Some(mapping) = finder.result_mapping(query) else {
        return data_type;
    };
    if mapping.is_plain() {
        return data_type;
    }
    let inner = match data_type {
        DataType::Void { .. } => DataType::Void { in_result: true },
        other => other,
    };
    DataType::Result(WrapperType {
        target: mapping.target.clone(),
        inner: Box::new(inner),
    })
}

/// Wrap a nullable property in the configured `null` type.
pub fn wrap_null(data_type: DataType, finder: &MappingFinder<'_>, query: &MappingQuery) -> DataType {
    match finder.null_mapping(query) {
        Some(null) => DataType::Null(NullType {
            target: null.target.clone(),
            init: null.init.clone(),
            inner: Box::new(data_type),
        }),
        None => data_type,
    }
}

/// The type a response or body carries once single, result and null
/// wrappers are peeled off.
pub fn unwrap(data_type: &DataType) -> &DataType {
    match data_type {
        DataType::Single(w) | DataType::Result(w) => unwrap(&w.inner),
        DataType::Null(n) => unwrap(&n.inner),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{ArrayType, Constraints, HttpMethod, ScalarKind, TargetType};
    use crate::mapping::{Mappings, MappingRepository, NullTypeMapping, ResultTypeMapping};

    fn finder_for(mappings: Mappings) -> MappingRepository {
        MappingRepository::new(mappings)
    }

    fn query() -> MappingQuery {
        MappingQuery::endpoint("/foo", HttpMethod::Get)
    }

    fn string_array() -> DataType {
        DataType::Array(ArrayType {
            item: Box::new(DataType::scalar(ScalarKind::String)),
            min_items: 0,
            max_items: None,
            unique_items: false,
            constraints: Constraints::default(),
            deprecated: false,
        })
    }

    #[test]
    fn test_reactive_wrappers() {
        let repo = finder_for(Mappings {
            single: Some(TargetType::new("reactor.core.publisher.Mono")),
            multi: Some(TargetType::new("reactor.core.publisher.Flux")),
            ..Mappings::default()
        });
        let finder = MappingFinder::new(&repo);

        let single = wrap_body(DataType::scalar(ScalarKind::String), &finder, &query());
        assert!(matches!(single, DataType::Single(_)));

        let multi = wrap_body(string_array(), &finder, &query());
        let DataType::Multi(wrapper) = multi else {
            panic!("expected multi wrapper");
        };
        assert_eq!(wrapper.target.name(), "Flux");
        assert!(wrapper.inner.is_scalar());
    }

    #[test]
    fn test_plain_result_keeps_type() {
        let repo = finder_for(Mappings {
            result: Some(ResultTypeMapping {
                target: TargetType::new("plain"),
            }),
            ..Mappings::default()
        });
        let finder = MappingFinder::new(&repo);
        let wrapped = wrap_result(DataType::Void { in_result: false }, &finder, &query());
        assert_eq!(wrapped, DataType::Void { in_result: false });
    }

    #[test]
    fn test_result_marks_void() {
        let repo = finder_for(Mappings {
            result: Some(ResultTypeMapping {
                target: TargetType::new("org.springframework.http.ResponseEntity"),
            }),
            ..Mappings::default()
        });
        let finder = MappingFinder::new(&repo);
        let wrapped = wrap_result(DataType::Void { in_result: false }, &finder, &query());
        let DataType::Result(wrapper) = &wrapped else {
            panic!("expected result wrapper");
        };
        assert_eq!(*wrapper.inner, DataType::Void { in_result: true });
        assert_eq!(unwrap(&wrapped), &DataType::Void { in_result: true });
    }

    #[test]
    fn test_null_wrapper_only_when_configured() {
        let none = MappingRepository::default();
        let plain = wrap_null(
            DataType::scalar(ScalarKind::String),
            &MappingFinder::new(&none),
            &query(),
        );
        assert!(plain.is_scalar());

        let repo = finder_for(Mappings {
            null: Some(NullTypeMapping {
                target: TargetType::new("org.openapitools.jackson.nullable.JsonNullable"),
                init: Some("JsonNullable.undefined()".into()),
            }),
            ..Mappings::default()
        });
        let wrapped = wrap_null(
            DataType::scalar(ScalarKind::String),
            &MappingFinder::new(&repo),
            &query(),
        );
        let DataType::Null(null) = wrapped else {
            panic!("expected null wrapper");
        };
        assert_eq!(null.init.as_deref(), Some("JsonNullable.undefined()"));
    }
}
