use indexmap::IndexMap;
use log::warn;

use crate::config::{EnumStyle, ProcessorOptions};
use crate::error::ConvertError;
use crate::ir::{
    Annotation, ArrayType, ComposedType, Constraints, DataType, EnumType, MappedCollectionType,
    MappedType, NamedKind, NamedType, NoDataType, ObjectType, Property, ScalarKind, ScalarType,
    TargetType, TypeId, TypeRegistry,
};
use crate::mapping::MappingFinder;
use crate::parse::schema::Composition;

use super::name_normalizer::{capitalize_first, model_type_name};
use super::schema_context::{SchemaContext, SchemaKind};
use super::wrappers::wrap_null;

/// Formats that select a scalar kind. Other formats fall back to the base type.
const SUPPORTED_FORMATS: [&str; 6] = ["int32", "int64", "float", "double", "date", "date-time"];

/// The scalar kind of a `(type, format)` pair.
pub fn scalar_kind(type_name: &str, format: Option<&str>) -> Option<ScalarKind> {
    let format = format.filter(|f| SUPPORTED_FORMATS.contains(f));
    let kind = match (type_name, format) {
        ("integer", None | Some("int32")) => ScalarKind::Integer,
        ("integer", Some("int64")) => ScalarKind::Long,
        ("number", None | Some("float")) => ScalarKind::Float,
        ("number", Some("double")) => ScalarKind::Double,
        ("boolean", None) => ScalarKind::Boolean,
        ("string", None) => ScalarKind::String,
        ("string", Some("date")) => ScalarKind::Date,
        ("string", Some("date-time")) => ScalarKind::DateTime,
        _ => return None,
    };
    Some(kind)
}

/// A context on the in-progress stack.
#[derive(Debug)]
struct InProgress {
    name: String,
    is_ref: bool,
}

/// Converts schema contexts into data types, registering named types.
///
/// Conversion is depth first. Contexts under construction are tracked on a
/// stack: meeting a non-ref context with the same name again yields a
/// [`DataType::Lazy`] reference instead of recursing. When the outermost
/// conversion returns, the registry's reachability walk runs over its result.
pub struct DataTypeConverter<'c> {
    options: &'c ProcessorOptions,
    finder: MappingFinder<'c>,
    current: Vec<InProgress>,
}

impl<'c> DataTypeConverter<'c> {
    pub fn new(options: &'c ProcessorOptions, finder: MappingFinder<'c>) -> Self {
        Self {
            options,
            finder,
            current: Vec::new(),
        }
    }

    pub fn convert(
        &mut self,
        ctx: &SchemaContext<'_>,
        registry: &mut TypeRegistry,
    ) -> Result<DataType, ConvertError> {
        if self.is_loop(ctx) {
            return Ok(registry.lazy(&ctx.name));
        }

        self.current.push(InProgress {
            name: ctx.name.clone(),
            is_ref: ctx.is_ref(),
        });
        let result = self.dispatch(ctx, registry);
        self.current.pop();
        let result = result?;

        if self.current.is_empty() {
            registry.collect_reachable(&result);
        }
        Ok(result)
    }

    fn is_loop(&self, ctx: &SchemaContext<'_>) -> bool {
        self.current
            .iter()
            .any(|c| c.name == ctx.name && !c.is_ref)
    }

    fn dispatch(
        &mut self,
        ctx: &SchemaContext<'_>,
        registry: &mut TypeRegistry,
    ) -> Result<DataType, ConvertError> {
        match ctx.kind() {
            SchemaKind::Ref => {
                let target = ctx.for_ref()?;
                self.convert(&target, registry)
            }
            SchemaKind::Composed(composition) => self.create_composed(ctx, composition, registry),
            SchemaKind::Array => self.create_array(ctx, registry),
            SchemaKind::Object => self.create_object(ctx, registry),
            SchemaKind::TypeLess => self.create_no_data(ctx),
            SchemaKind::Simple => self.create_simple(ctx, registry),
        }
    }

    fn mapped_type(&self, ctx: &SchemaContext<'_>) -> Result<Option<TargetType>, ConvertError> {
        Ok(self.finder.find_type_mapping(&ctx.query())?.cloned())
    }

    fn named(&self, ctx: &SchemaContext<'_>, key: &str, kind: NamedKind) -> NamedType {
        let mut named = NamedType::new(
            key,
            model_type_name(key, &self.options.model_name_suffix),
            self.options.model_package(),
            kind,
        );
        named.description = ctx.description();
        named.deprecated = ctx.is_deprecated();
        named
    }

    /// Return `Named(id)`, or the mapping's target with the named type as source.
    fn named_or_mapped(&self, ctx: &SchemaContext<'_>, id: TypeId) -> Result<DataType, ConvertError> {
        let data_type = DataType::Named(id);
        match self.mapped_type(ctx)? {
            Some(target) => Ok(DataType::Mapped(MappedType {
                target,
                source: Some(Box::new(data_type)),
            })),
            None => Ok(data_type),
        }
    }

    fn create_composed(
        &mut self,
        ctx: &SchemaContext<'_>,
        composition: Composition,
        registry: &mut TypeRegistry,
    ) -> Result<DataType, ConvertError> {
        let mut members = Vec::new();
        if let Some(own) = ctx.for_own_properties() {
            members.push(self.convert(&own, registry)?);
        }
        for member in ctx.members() {
            members.push(self.convert(&member, registry)?);
        }

        let kind = match composition {
            Composition::AllOf => {
                let mut filled = members.iter().filter(|m| !m.is_no_data());
                if let (Some(only), None) = (filled.next(), filled.next()) {
                    let only = only.clone();
                    return match self.mapped_type(ctx)? {
                        Some(target) => Ok(DataType::Mapped(MappedType {
                            target,
                            source: Some(Box::new(only)),
                        })),
                        None => Ok(only),
                    };
                }
                let properties = merge_properties(ctx, &members, registry);
                NamedKind::AllOf(ComposedType {
                    composition,
                    members,
                    properties,
                })
            }
            Composition::OneOf if self.should_generate_interface(&members, registry) => {
                NamedKind::Interface(ComposedType {
                    composition,
                    members,
                    properties: IndexMap::new(),
                })
            }
            _ => NamedKind::AnyOneOf(ComposedType {
                composition,
                members,
                properties: IndexMap::new(),
            }),
        };

        let is_new = registry.find(&ctx.name).is_none();
        let id = registry.add(self.named(ctx, &ctx.name, kind));
        if is_new {
            attach_interface(id, registry);
        }
        self.named_or_mapped(ctx, id)
    }

    fn should_generate_interface(&self, members: &[DataType], registry: &TypeRegistry) -> bool {
        self.options.one_of_interface
            && !members.is_empty()
            && members.iter().all(|m| m.is_model(registry))
    }

    fn create_array(
        &mut self,
        ctx: &SchemaContext<'_>,
        registry: &mut TypeRegistry,
    ) -> Result<DataType, ConvertError> {
        let item = match ctx.for_item() {
            Some(item) => self.convert(&item, registry)?,
            None => DataType::NoData(NoDataType {
                name: format!("{}ArrayItem", ctx.name),
                constraints: Constraints::default(),
                deprecated: false,
            }),
        };

        let schema = ctx.schema();
        let array = ArrayType {
            item: Box::new(item.clone()),
            min_items: schema.and_then(|s| s.min_items).unwrap_or(0),
            max_items: schema.and_then(|s| s.max_items),
            unique_items: schema.and_then(|s| s.unique_items).unwrap_or(false),
            constraints: schema.map(Constraints::from_schema).unwrap_or_default(),
            deprecated: ctx.is_deprecated(),
        };

        match self.mapped_type(ctx)? {
            Some(target) => Ok(DataType::MappedCollection(MappedCollectionType {
                target,
                item: Box::new(item),
                source: Box::new(DataType::Array(array)),
            })),
            None => Ok(DataType::Array(array)),
        }
    }

    fn create_object(
        &mut self,
        ctx: &SchemaContext<'_>,
        registry: &mut TypeRegistry,
    ) -> Result<DataType, ConvertError> {
        let Some(schema) = ctx.schema() else {
            return Ok(registry.lazy(&ctx.name));
        };

        let mut object = ObjectType {
            properties: IndexMap::new(),
            constraints: Constraints::from_schema(schema),
        };
        let parent_query = ctx.query();
        for (name, node) in &schema.properties {
            let prop_ctx = ctx.for_property(name, node);
            let mut data_type = self.convert(&prop_ctx, registry)?;
            if prop_ctx.resolved()?.is_nullable() {
                data_type = wrap_null(data_type, &self.finder, &parent_query);
            }

            let mut property = Property::new(data_type);
            property.required = schema.required.contains(name);
            property.read_only = prop_ctx.is_read_only();
            property.write_only = prop_ctx.is_write_only();
            property.deprecated = prop_ctx.is_deprecated();
            property.description = prop_ctx.description();
            property.annotations = self.property_annotations(&prop_ctx)?;
            property.extensions = prop_ctx
                .schema()
                .map(|s| {
                    s.extensions()
                        .map(|(k, v)| (k.clone(), v.clone()))
                        .collect()
                })
                .unwrap_or_default();
            object.properties.insert(name.clone(), property);
        }

        // only registers what is nested below; the result is not a property
        if let Some(additional) = ctx.for_additional_properties() {
            self.convert(&additional, registry)?;
        }

        let mut named = self.named(ctx, &ctx.name, NamedKind::Object(object));
        named.annotations = self
            .finder
            .find_annotation_type_mappings(&parent_query.allow_object(true))
            .into_iter()
            .cloned()
            .collect();
        let id = registry.add(named);
        self.named_or_mapped(ctx, id)
    }

    /// Type annotations of the property schema plus extension annotations.
    fn property_annotations(
        &self,
        prop_ctx: &SchemaContext<'_>,
    ) -> Result<Vec<Annotation>, ConvertError> {
        let resolved = prop_ctx.resolved()?;
        let mut annotations: Vec<Annotation> = self
            .finder
            .find_annotation_type_mappings(&resolved.query())
            .into_iter()
            .cloned()
            .collect();

        let Some(schema) = prop_ctx.schema() else {
            return Ok(annotations);
        };
        for (extension, value) in schema.extensions() {
            let values: Vec<&str> = match value {
                serde_json::Value::String(s) => vec![s.as_str()],
                serde_json::Value::Array(items) => items.iter().filter_map(|v| v.as_str()).collect(),
                _ => Vec::new(),
            };
            for value in values {
                annotations.extend(
                    self.finder
                        .extension_annotations(extension, value)
                        .into_iter()
                        .cloned(),
                );
            }
        }
        Ok(annotations)
    }

    fn create_no_data(&self, ctx: &SchemaContext<'_>) -> Result<DataType, ConvertError> {
        let no_data = DataType::NoData(NoDataType {
            name: ctx.name.clone(),
            constraints: ctx.schema().map(Constraints::from_schema).unwrap_or_default(),
            deprecated: ctx.is_deprecated(),
        });
        match self.mapped_type(ctx)? {
            Some(target) => Ok(DataType::Mapped(MappedType {
                target,
                source: Some(Box::new(no_data)),
            })),
            None => Ok(no_data),
        }
    }

    fn create_simple(
        &self,
        ctx: &SchemaContext<'_>,
        registry: &mut TypeRegistry,
    ) -> Result<DataType, ConvertError> {
        let type_name = ctx.type_name().unwrap_or_default();
        let simple = match scalar_kind(type_name, ctx.format()) {
            Some(ScalarKind::String) if ctx.is_enum() => Some(self.create_string_enum(ctx, registry)),
            Some(kind) => Some(self.scalar(ctx, kind)),
            None => None,
        };

        match (self.mapped_type(ctx)?, simple) {
            (Some(target), source) => Ok(DataType::Mapped(MappedType {
                target,
                source: source.map(Box::new),
            })),
            (None, Some(data_type)) => Ok(data_type),
            (None, None) => Err(ConvertError::UnknownDataType {
                name: ctx.name.clone(),
                type_name: type_name.to_string(),
                format: ctx.format().map(str::to_string),
            }),
        }
    }

    fn scalar(&self, ctx: &SchemaContext<'_>, kind: ScalarKind) -> DataType {
        let mut scalar = ScalarType::new(kind);
        scalar.format = ctx.format().map(str::to_string);
        scalar.constraints = ctx.schema().map(Constraints::from_schema).unwrap_or_default();
        scalar.deprecated = ctx.is_deprecated();
        scalar.description = ctx.description();
        DataType::Scalar(scalar)
    }

    /// A named enum keyed by the capitalized context name, or a plain string
    /// when enums are configured as strings.
    fn create_string_enum(&self, ctx: &SchemaContext<'_>, registry: &mut TypeRegistry) -> DataType {
        if self.options.enum_type == EnumStyle::String {
            return self.scalar(ctx, ScalarKind::String);
        }

        let key = capitalize_first(&ctx.name);
        if let Some(id) = registry.find(&key) {
            return DataType::Named(id);
        }

        let constraints = ctx.schema().map(Constraints::from_schema).unwrap_or_default();
        let values = constraints
            .enum_values
            .iter()
            .filter_map(|v| match v {
                serde_json::Value::String(s) => Some(s.clone()),
                serde_json::Value::Null => None,
                other => Some(other.to_string()),
            })
            .collect();
        let named = self.named(ctx, &key, NamedKind::Enum(EnumType { values, constraints }));
        DataType::Named(registry.add(named))
    }
}

/// Merge the properties of the allOf members in member order. The first
/// declaration of a property name wins.
fn merge_properties(
    ctx: &SchemaContext<'_>,
    members: &[DataType],
    registry: &TypeRegistry,
) -> IndexMap<String, Property> {
    let mut properties = IndexMap::new();
    for member in members {
        let Some(named) = member.resolve_named(registry).and_then(|id| registry.get(id)) else {
            if matches!(member, DataType::Lazy(_)) {
                warn!(
                    "allOf member of '{}' is still being built and cannot be merged",
                    ctx.name
                );
            }
            continue;
        };
        let source = match &named.kind {
            NamedKind::Object(o) => &o.properties,
            NamedKind::AllOf(c) => &c.properties,
            _ => continue,
        };
        for (name, property) in source {
            properties
                .entry(name.clone())
                .or_insert_with(|| property.clone());
        }
    }
    properties
}

/// Mark every model member of a new oneOf interface as implementing it.
fn attach_interface(id: TypeId, registry: &mut TypeRegistry) {
    let members: Vec<TypeId> = match registry.get(id).map(|t| &t.kind) {
        Some(NamedKind::Interface(c)) => c
            .members
            .iter()
            .filter_map(|m| m.resolve_named(registry))
            .collect(),
        _ => return,
    };
    for member in members {
        if let Some(ty) = registry.get_mut(member) {
            ty.implement(id);
        }
    }
}
