use super::registry::{TypeId, TypeRegistry};
use super::types::TargetType;
use crate::parse::schema::Schema;

/// Scalar kinds supported by the `(type, format)` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    Integer,
    Long,
    Float,
    Double,
    Boolean,
    String,
    Date,
    DateTime,
}

impl ScalarKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            ScalarKind::Integer => "Integer",
            ScalarKind::Long => "Long",
            ScalarKind::Float => "Float",
            ScalarKind::Double => "Double",
            ScalarKind::Boolean => "Boolean",
            ScalarKind::String => "String",
            ScalarKind::Date => "LocalDate",
            ScalarKind::DateTime => "OffsetDateTime",
        }
    }
}

/// Validation-relevant facts copied from the schema.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Constraints {
    pub default_value: Option<serde_json::Value>,
    pub nullable: bool,
    pub min_length: Option<u64>,
    pub max_length: Option<u64>,
    pub minimum: Option<f64>,
    pub exclusive_minimum: bool,
    pub maximum: Option<f64>,
    pub exclusive_maximum: bool,
    pub pattern: Option<String>,
    pub enum_values: Vec<serde_json::Value>,
}

impl Constraints {
    pub fn from_schema(schema: &Schema) -> Self {
        Self {
            default_value: schema.default_value.clone(),
            nullable: schema.is_nullable(),
            min_length: schema.min_length,
            max_length: schema.max_length,
            minimum: schema.lower_bound(),
            exclusive_minimum: schema.is_exclusive_minimum(),
            maximum: schema.upper_bound(),
            exclusive_maximum: schema.is_exclusive_maximum(),
            pattern: schema.pattern.clone(),
            enum_values: schema.enum_values.clone(),
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Constraints::default()
    }
}

/// A scalar value type.
#[derive(Debug, Clone, PartialEq)]
pub struct ScalarType {
    pub kind: ScalarKind,
    pub format: Option<String>,
    pub constraints: Constraints,
    pub deprecated: bool,
    pub description: Option<String>,
}

impl ScalarType {
    pub fn new(kind: ScalarKind) -> Self {
        Self {
            kind,
            format: None,
            constraints: Constraints::default(),
            deprecated: false,
            description: None,
        }
    }
}

/// An inline array of `item`.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayType {
    pub item: Box<DataType>,
    pub min_items: u64,
    pub max_items: Option<u64>,
    pub unique_items: bool,
    pub constraints: Constraints,
    pub deprecated: bool,
}

/// A schema without a declared type.
#[derive(Debug, Clone, PartialEq)]
pub struct NoDataType {
    pub name: String,
    pub constraints: Constraints,
    pub deprecated: bool,
}

/// A type replaced by a mapping. `source` keeps what the schema produced.
#[derive(Debug, Clone, PartialEq)]
pub struct MappedType {
    pub target: TargetType,
    pub source: Option<Box<DataType>>,
}

/// An array re-expressed as a mapped collection type over its item.
#[derive(Debug, Clone, PartialEq)]
pub struct MappedCollectionType {
    pub target: TargetType,
    pub item: Box<DataType>,
    pub source: Box<DataType>,
}

/// A single/multi/result wrapper around `inner`.
#[derive(Debug, Clone, PartialEq)]
pub struct WrapperType {
    pub target: TargetType,
    pub inner: Box<DataType>,
}

/// A nullable value wrapper with its optional initializer.
#[derive(Debug, Clone, PartialEq)]
pub struct NullType {
    pub target: TargetType,
    pub init: Option<String>,
    pub inner: Box<DataType>,
}

/// A resolved data type.
///
/// Named types (objects, enums, composed types) live in the [`TypeRegistry`]
/// and are referenced by id; everything else is allocated per use.
#[derive(Debug, Clone, PartialEq)]
pub enum DataType {
    Scalar(ScalarType),
    Array(ArrayType),
    Named(TypeId),
    /// A forward reference to a named type that is still being built.
    Lazy(String),
    NoData(NoDataType),
    Mapped(MappedType),
    MappedCollection(MappedCollectionType),
    Null(NullType),
    Single(WrapperType),
    Multi(WrapperType),
    Result(WrapperType),
    /// No content. `in_result` marks the variant wrapped in a result type.
    Void { in_result: bool },
}

impl DataType {
    pub fn scalar(kind: ScalarKind) -> Self {
        DataType::Scalar(ScalarType::new(kind))
    }

    pub fn named_id(&self) -> Option<TypeId> {
        match self {
            DataType::Named(id) => Some(*id),
            _ => None,
        }
    }

    pub fn is_scalar(&self) -> bool {
        matches!(self, DataType::Scalar(_))
    }

    pub fn is_no_data(&self) -> bool {
        matches!(self, DataType::NoData(_))
    }

    pub fn is_array(&self) -> bool {
        matches!(self, DataType::Array(_))
    }

    /// The type a mapping replaced, if any.
    pub fn source(&self) -> Option<&DataType> {
        match self {
            DataType::Mapped(m) => m.source.as_deref(),
            DataType::MappedCollection(m) => Some(&m.source),
            _ => None,
        }
    }

    /// The named type behind this data type, looking through forward references.
    pub fn resolve_named(&self, registry: &TypeRegistry) -> Option<TypeId> {
        match self {
            DataType::Named(id) => Some(*id),
            DataType::Lazy(key) => registry.find(key),
            _ => None,
        }
    }

    /// True for named object and composed types, the kinds that can implement
    /// a marker interface.
    pub fn is_model(&self, registry: &TypeRegistry) -> bool {
        self.resolve_named(registry)
            .and_then(|id| registry.get(id))
            .is_some_and(|t| t.kind.is_model())
    }

    /// Renders the type the way an emitter would spell it, for diagnostics.
    pub fn display(&self, registry: &TypeRegistry) -> String {
        match self {
            DataType::Scalar(s) => s.kind.type_name().to_string(),
            DataType::Array(a) => format!("{}[]", a.item.display(registry)),
            DataType::Named(id) => registry
                .get(*id)
                .map_or_else(|| format!("#{}", id.index()), |t| t.type_name()),
            DataType::Lazy(key) => registry
                .find(key)
                .and_then(|id| registry.get(id))
                .map_or_else(|| key.clone(), |t| t.type_name()),
            DataType::NoData(_) => "Object".to_string(),
            DataType::Mapped(m) => render_target(&m.target),
            DataType::MappedCollection(m) => {
                format!("{}<{}>", m.target.name(), m.item.display(registry))
            }
            DataType::Null(n) => format!("{}<{}>", n.target.name(), n.inner.display(registry)),
            DataType::Single(w) | DataType::Multi(w) | DataType::Result(w) => {
                if w.target.is_plain() {
                    w.inner.display(registry)
                } else {
                    format!("{}<{}>", w.target.name(), w.inner.display(registry))
                }
            }
            DataType::Void { in_result: true } => "?".to_string(),
            DataType::Void { in_result: false } => "void".to_string(),
        }
    }
}

fn render_target(target: &TargetType) -> String {
    if target.generics.is_empty() {
        return target.name().to_string();
    }
    let generics: Vec<String> = target.generics.iter().map(render_target).collect();
    format!("{}<{}>", target.name(), generics.join(", "))
}
