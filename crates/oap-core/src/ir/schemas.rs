use indexmap::IndexMap;

use super::api::HttpMethod;
use super::data_type::{Constraints, DataType};
use super::registry::TypeId;
use super::types::{Annotation, NormalizedName};
use crate::parse::schema::Composition;

/// A registered named type.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedType {
    /// Registry key: the contextual name the type was built under.
    pub key: String,
    /// The emitted type name, including any model name suffix.
    pub name: NormalizedName,
    pub package: String,
    pub kind: NamedKind,
    pub description: Option<String>,
    pub deprecated: bool,
    /// Interfaces this type implements, in the order they were attached.
    pub implements: Vec<TypeId>,
    pub annotations: Vec<Annotation>,
}

impl NamedType {
    pub fn new(key: impl Into<String>, name: NormalizedName, package: String, kind: NamedKind) -> Self {
        Self {
            key: key.into(),
            name,
            package,
            kind,
            description: None,
            deprecated: false,
            implements: Vec::new(),
            annotations: Vec::new(),
        }
    }

    pub fn type_name(&self) -> String {
        self.name.pascal_case.clone()
    }

    pub fn qualified_name(&self) -> String {
        if self.package.is_empty() {
            self.type_name()
        } else {
            format!("{}.{}", self.package, self.type_name())
        }
    }

    /// Attach an interface, ignoring duplicates.
    pub fn implement(&mut self, interface: TypeId) {
        if !self.implements.contains(&interface) {
            self.implements.push(interface);
        }
    }
}

/// The shape of a named type.
#[derive(Debug, Clone, PartialEq)]
pub enum NamedKind {
    Object(ObjectType),
    /// allOf: the members merged into one object.
    AllOf(ComposedType),
    /// oneOf over objects: a marker interface implemented by every member.
    Interface(ComposedType),
    /// oneOf/anyOf without interface synthesis: an untyped holder.
    AnyOneOf(ComposedType),
    Enum(EnumType),
    /// Marker shared by the differing responses of one content type.
    ContentTypeInterface(ContentTypeMarker),
}

impl NamedKind {
    /// Object-like kinds: plain objects and merged allOf objects.
    pub fn is_model(&self) -> bool {
        matches!(self, NamedKind::Object(_) | NamedKind::AllOf(_))
    }

    pub fn is_interface(&self) -> bool {
        matches!(
            self,
            NamedKind::Interface(_) | NamedKind::ContentTypeInterface(_)
        )
    }

    pub fn as_object(&self) -> Option<&ObjectType> {
        match self {
            NamedKind::Object(o) => Some(o),
            _ => None,
        }
    }

    pub fn as_enum(&self) -> Option<&EnumType> {
        match self {
            NamedKind::Enum(e) => Some(e),
            _ => None,
        }
    }

    pub fn members(&self) -> &[DataType] {
        match self {
            NamedKind::AllOf(c) | NamedKind::Interface(c) | NamedKind::AnyOneOf(c) => &c.members,
            _ => &[],
        }
    }
}

/// An object with properties in declaration order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ObjectType {
    pub properties: IndexMap<String, Property>,
    pub constraints: Constraints,
}

/// A property of an object type.
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub data_type: DataType,
    pub required: bool,
    pub read_only: bool,
    pub write_only: bool,
    pub deprecated: bool,
    pub description: Option<String>,
    pub annotations: Vec<Annotation>,
    /// `x-` extensions declared on the property schema.
    pub extensions: IndexMap<String, serde_json::Value>,
}

impl Property {
    pub fn new(data_type: DataType) -> Self {
        Self {
            data_type,
            required: false,
            read_only: false,
            write_only: false,
            deprecated: false,
            description: None,
            annotations: Vec::new(),
            extensions: IndexMap::new(),
        }
    }
}

/// Members of an allOf/oneOf/anyOf composition in declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct ComposedType {
    pub composition: Composition,
    pub members: Vec<DataType>,
    /// For allOf: the merged properties of all object members.
    pub properties: IndexMap<String, Property>,
}

/// A string enum. Values keep declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumType {
    pub values: Vec<String>,
    pub constraints: Constraints,
}

/// The endpoint a content-type marker belongs to.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentTypeMarker {
    pub path: String,
    pub method: HttpMethod,
    pub content_type: String,
}
