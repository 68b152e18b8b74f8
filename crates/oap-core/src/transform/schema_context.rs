use crate::error::ResolveError;
use crate::ir::HttpMethod;
use crate::mapping::{MappingQuery, QueryOrigin};
use crate::parse::ref_resolve::RefResolver;
use crate::parse::schema::{Composition, Schema, SchemaOrRef};

use super::name_normalizer::capitalize_first;

/// Longest chain of `$ref`-to-`$ref` hops followed from one context.
const MAX_REF_HOPS: usize = 32;

const PRIMITIVES: [&str; 4] = ["boolean", "integer", "number", "string"];

/// How a schema node is converted. Checked in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaKind {
    Ref,
    Composed(Composition),
    Array,
    Object,
    TypeLess,
    Simple,
}

/// A schema node plus the position it is converted at.
///
/// The contextual `name` identifies the node for naming, registry lookups
/// and cycle detection. Child contexts derive their names from it.
#[derive(Debug, Clone)]
pub struct SchemaContext<'a> {
    pub path: &'a str,
    pub method: HttpMethod,
    pub name: String,
    pub content_type: Option<&'a str>,
    pub node: &'a SchemaOrRef,
    pub origin: QueryOrigin,
    /// The declared parameter name when converting a parameter schema.
    pub parameter: Option<&'a str>,
    resolver: RefResolver<'a>,
    /// Set once a `$ref` was followed; further refs keep the current name.
    ref_name: bool,
    ref_hops: usize,
    /// Treat a composed schema as a plain object over its own properties.
    own_properties: bool,
}

impl<'a> SchemaContext<'a> {
    pub fn new(
        path: &'a str,
        method: HttpMethod,
        name: impl Into<String>,
        node: &'a SchemaOrRef,
        resolver: RefResolver<'a>,
    ) -> Self {
        Self {
            path,
            method,
            name: name.into(),
            content_type: None,
            node,
            origin: QueryOrigin::Schema,
            parameter: None,
            resolver,
            ref_name: false,
            ref_hops: 0,
            own_properties: false,
        }
    }

    pub fn with_content_type(mut self, content_type: &'a str) -> Self {
        self.content_type = (!content_type.is_empty()).then_some(content_type);
        self
    }

    pub fn with_origin(mut self, origin: QueryOrigin) -> Self {
        self.origin = origin;
        self
    }

    pub fn with_parameter(mut self, parameter: &'a str) -> Self {
        self.parameter = Some(parameter);
        self.origin = QueryOrigin::Parameter;
        self
    }

    /// The inline schema, `None` for a `$ref` node.
    pub fn schema(&self) -> Option<&'a Schema> {
        match self.node {
            SchemaOrRef::Schema(s) => Some(&**s),
            SchemaOrRef::Ref { .. } => None,
        }
    }

    pub fn kind(&self) -> SchemaKind {
        let Some(schema) = self.schema() else {
            return SchemaKind::Ref;
        };
        if !self.own_properties {
            if let Some(composition) = schema.composition() {
                return SchemaKind::Composed(composition);
            }
        }
        match schema.type_name() {
            Some("array") => SchemaKind::Array,
            Some("object") => SchemaKind::Object,
            _ if !schema.properties.is_empty() => SchemaKind::Object,
            None => SchemaKind::TypeLess,
            Some(_) => SchemaKind::Simple,
        }
    }

    pub fn is_ref(&self) -> bool {
        matches!(self.node, SchemaOrRef::Ref { .. })
    }

    pub fn type_name(&self) -> Option<&'a str> {
        self.schema().and_then(Schema::type_name)
    }

    pub fn format(&self) -> Option<&'a str> {
        self.schema().and_then(|s| s.format.as_deref())
    }

    pub fn is_primitive(&self) -> bool {
        self.type_name().is_some_and(|t| PRIMITIVES.contains(&t))
    }

    pub fn is_array(&self) -> bool {
        self.type_name() == Some("array")
    }

    pub fn is_nullable(&self) -> bool {
        self.schema().is_some_and(Schema::is_nullable)
    }

    pub fn is_deprecated(&self) -> bool {
        self.schema().is_some_and(Schema::is_deprecated)
    }

    pub fn is_read_only(&self) -> bool {
        self.schema().and_then(|s| s.read_only).unwrap_or(false)
    }

    pub fn is_write_only(&self) -> bool {
        self.schema().and_then(|s| s.write_only).unwrap_or(false)
    }

    pub fn description(&self) -> Option<String> {
        self.schema().and_then(|s| s.description.clone())
    }

    pub fn is_enum(&self) -> bool {
        self.schema().is_some_and(|s| !s.enum_values.is_empty())
    }

    /// The lookup key for mappings of this node.
    pub fn query(&self) -> MappingQuery {
        let mut query = MappingQuery::endpoint(self.path, self.method)
            .with_name(self.name.as_str())
            .with_type(self.type_name(), self.format())
            .with_content_type(self.content_type.unwrap_or_default())
            .primitive(self.is_primitive())
            .array(self.is_array())
            .with_origin(self.origin);
        query.parameter = self.parameter.map(str::to_string);
        query
    }

    /// Follow this node's `$ref`.
    ///
    /// The target keeps the referencing name when a ref was already followed
    /// or the pointer carries no component name; otherwise it takes the
    /// component name. Content type and parameter scope carry over.
    pub fn for_ref(&self) -> Result<SchemaContext<'a>, ResolveError> {
        let SchemaOrRef::Ref { ref_path } = self.node else {
            return Ok(self.clone());
        };
        if self.ref_hops >= MAX_REF_HOPS {
            return Err(ResolveError::CircularRef(ref_path.clone()));
        }
        let resolved = self.resolver.resolve_schema(ref_path)?;
        let name = match resolved.name {
            Some(name) if !self.ref_name => name.to_string(),
            _ => self.name.clone(),
        };
        Ok(SchemaContext {
            name,
            node: resolved.target,
            ref_name: true,
            ref_hops: self.ref_hops + 1,
            own_properties: false,
            ..self.clone()
        })
    }

    /// Follow refs until an inline schema is reached.
    pub fn resolved(&self) -> Result<SchemaContext<'a>, ResolveError> {
        let mut current = self.clone();
        while current.is_ref() {
            current = current.for_ref()?;
        }
        Ok(current)
    }

    fn child(&self, name: String, node: &'a SchemaOrRef) -> SchemaContext<'a> {
        SchemaContext::new(self.path, self.method, name, node, self.resolver)
    }

    /// `<parent><Property>`
    pub fn for_property(&self, property: &str, node: &'a SchemaOrRef) -> SchemaContext<'a> {
        self.child(format!("{}{}", self.name, capitalize_first(property)), node)
    }

    /// `<parent>ArrayItem`, `None` when the array declares no items.
    pub fn for_item(&self) -> Option<SchemaContext<'a>> {
        let items = self.schema()?.items.as_deref()?;
        Some(self.child(format!("{}ArrayItem", self.name), items))
    }

    /// `<parent>AdditionalProperties`, when `additionalProperties` is a schema.
    pub fn for_additional_properties(&self) -> Option<SchemaContext<'a>> {
        let node = self.schema()?.additional_properties_schema()?;
        Some(self.child(format!("{}AdditionalProperties", self.name), node))
    }

    /// The composition members, named `<parent><Kind><index>`.
    pub fn members(&self) -> Vec<SchemaContext<'a>> {
        let Some(schema) = self.schema() else {
            return Vec::new();
        };
        let Some(composition) = schema.composition() else {
            return Vec::new();
        };
        let kind = capitalize_first(composition.as_str());
        schema
            .composition_members()
            .iter()
            .enumerate()
            .map(|(index, member)| self.child(format!("{}{kind}{index}", self.name), member))
            .collect()
    }

    /// The properties a composed schema declares next to its members, as an
    /// object named `<parent><Kind>`.
    pub fn for_own_properties(&self) -> Option<SchemaContext<'a>> {
        let schema = self.schema()?;
        let composition = schema.composition()?;
        if schema.properties.is_empty() {
            return None;
        }
        let mut own = self.child(
            format!("{}{}", self.name, capitalize_first(composition.as_str())),
            self.node,
        );
        own.own_properties = true;
        Some(own)
    }
}
