use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A JSON Schema type keyword value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaType {
    String,
    Number,
    Integer,
    Boolean,
    Array,
    Object,
    Null,
    #[serde(untagged)]
    Other(String),
}

impl SchemaType {
    pub fn as_str(&self) -> &str {
        match self {
            SchemaType::String => "string",
            SchemaType::Number => "number",
            SchemaType::Integer => "integer",
            SchemaType::Boolean => "boolean",
            SchemaType::Array => "array",
            SchemaType::Object => "object",
            SchemaType::Null => "null",
            SchemaType::Other(other) => other,
        }
    }
}

/// The `type` field can be a single type or an array of types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TypeSet {
    Single(SchemaType),
    Multiple(Vec<SchemaType>),
}

/// A reference or inline schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SchemaOrRef {
    Ref {
        #[serde(rename = "$ref")]
        ref_path: String,
    },
    Schema(Box<Schema>),
}

/// Discriminator for polymorphic schemas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Discriminator {
    #[serde(rename = "propertyName")]
    pub property_name: String,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub mapping: IndexMap<String, String>,
}

/// `exclusiveMinimum` / `exclusiveMaximum`: a flag in OpenAPI 3.0, a bound in 3.1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExclusiveBound {
    Flag(bool),
    Value(f64),
}

/// A JSON Schema object (OpenAPI 3.0 / 3.1 superset).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Schema {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<TypeSet>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(rename = "default", skip_serializing_if = "Option::is_none")]
    pub default_value: Option<serde_json::Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub nullable: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<bool>,

    // Object properties
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub properties: IndexMap<String, SchemaOrRef>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,

    #[serde(
        rename = "additionalProperties",
        skip_serializing_if = "Option::is_none"
    )]
    pub additional_properties: Option<AdditionalProperties>,

    // Array items
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<SchemaOrRef>>,

    // Composition
    #[serde(rename = "allOf", default, skip_serializing_if = "Vec::is_empty")]
    pub all_of: Vec<SchemaOrRef>,

    #[serde(rename = "oneOf", default, skip_serializing_if = "Vec::is_empty")]
    pub one_of: Vec<SchemaOrRef>,

    #[serde(rename = "anyOf", default, skip_serializing_if = "Vec::is_empty")]
    pub any_of: Vec<SchemaOrRef>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub discriminator: Option<Discriminator>,

    // Enum values
    #[serde(rename = "enum", default, skip_serializing_if = "Vec::is_empty")]
    pub enum_values: Vec<serde_json::Value>,

    // Numeric constraints
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum: Option<f64>,
    #[serde(rename = "exclusiveMinimum", skip_serializing_if = "Option::is_none")]
    pub exclusive_minimum: Option<ExclusiveBound>,
    #[serde(rename = "exclusiveMaximum", skip_serializing_if = "Option::is_none")]
    pub exclusive_maximum: Option<ExclusiveBound>,

    // String constraints
    #[serde(rename = "minLength", skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u64>,
    #[serde(rename = "maxLength", skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,

    // Array constraints
    #[serde(rename = "minItems", skip_serializing_if = "Option::is_none")]
    pub min_items: Option<u64>,
    #[serde(rename = "maxItems", skip_serializing_if = "Option::is_none")]
    pub max_items: Option<u64>,
    #[serde(rename = "uniqueItems", skip_serializing_if = "Option::is_none")]
    pub unique_items: Option<bool>,

    // Read/Write only
    #[serde(rename = "readOnly", skip_serializing_if = "Option::is_none")]
    pub read_only: Option<bool>,
    #[serde(rename = "writeOnly", skip_serializing_if = "Option::is_none")]
    pub write_only: Option<bool>,

    // Const
    #[serde(rename = "const", skip_serializing_if = "Option::is_none")]
    pub const_value: Option<serde_json::Value>,

    // Example
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<serde_json::Value>,

    /// Every key not modelled above; `x-` vendor extensions are read from here.
    #[serde(flatten)]
    pub extra: IndexMap<String, serde_json::Value>,
}

/// `additionalProperties` can be a boolean or a schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AdditionalProperties {
    Bool(bool),
    Schema(Box<SchemaOrRef>),
}

/// Which composition keyword a composed schema uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Composition {
    AllOf,
    AnyOf,
    OneOf,
}

impl Composition {
    pub fn as_str(&self) -> &'static str {
        match self {
            Composition::AllOf => "allOf",
            Composition::AnyOf => "anyOf",
            Composition::OneOf => "oneOf",
        }
    }
}

impl Schema {
    /// The declared type. With a 3.1 type list the first non-`null` entry wins.
    pub fn type_name(&self) -> Option<&str> {
        match &self.schema_type {
            Some(TypeSet::Single(SchemaType::Null)) => None,
            Some(TypeSet::Single(t)) => Some(t.as_str()),
            Some(TypeSet::Multiple(types)) => types
                .iter()
                .find(|t| **t != SchemaType::Null)
                .map(SchemaType::as_str),
            None => None,
        }
    }

    /// `nullable: true` (3.0) or a `null` entry in the type list (3.1).
    pub fn is_nullable(&self) -> bool {
        if self.nullable.unwrap_or(false) {
            return true;
        }
        matches!(&self.schema_type, Some(TypeSet::Multiple(types)) if types.contains(&SchemaType::Null))
    }

    pub fn is_deprecated(&self) -> bool {
        self.deprecated.unwrap_or(false)
    }

    /// The composition keyword, checked in allOf, anyOf, oneOf order.
    pub fn composition(&self) -> Option<Composition> {
        if !self.all_of.is_empty() {
            Some(Composition::AllOf)
        } else if !self.any_of.is_empty() {
            Some(Composition::AnyOf)
        } else if !self.one_of.is_empty() {
            Some(Composition::OneOf)
        } else {
            None
        }
    }

    pub fn composition_members(&self) -> &[SchemaOrRef] {
        match self.composition() {
            Some(Composition::AllOf) => &self.all_of,
            Some(Composition::AnyOf) => &self.any_of,
            Some(Composition::OneOf) => &self.one_of,
            None => &[],
        }
    }

    /// The schema of `additionalProperties`, if it is a schema and not a flag.
    pub fn additional_properties_schema(&self) -> Option<&SchemaOrRef> {
        match &self.additional_properties {
            Some(AdditionalProperties::Schema(s)) => Some(&**s),
            _ => None,
        }
    }

    /// `x-` vendor extensions in declaration order.
    pub fn extensions(&self) -> impl Iterator<Item = (&String, &serde_json::Value)> {
        self.extra.iter().filter(|(key, _)| key.starts_with("x-"))
    }

    pub fn is_exclusive_minimum(&self) -> bool {
        matches!(
            self.exclusive_minimum,
            Some(ExclusiveBound::Flag(true)) | Some(ExclusiveBound::Value(_))
        )
    }

    pub fn is_exclusive_maximum(&self) -> bool {
        matches!(
            self.exclusive_maximum,
            Some(ExclusiveBound::Flag(true)) | Some(ExclusiveBound::Value(_))
        )
    }

    /// The effective lower bound; a 3.1 exclusive bound replaces `minimum`.
    pub fn lower_bound(&self) -> Option<f64> {
        match self.exclusive_minimum {
            Some(ExclusiveBound::Value(v)) => Some(v),
            _ => self.minimum,
        }
    }

    /// The effective upper bound; a 3.1 exclusive bound replaces `maximum`.
    pub fn upper_bound(&self) -> Option<f64> {
        match self.exclusive_maximum {
            Some(ExclusiveBound::Value(v)) => Some(v),
            _ => self.maximum,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(yaml: &str) -> Schema {
        serde_yaml_ng::from_str(yaml).unwrap()
    }

    #[test]
    fn test_type_list_with_null() {
        let schema = parse("type: [string, 'null']\n");
        assert_eq!(schema.type_name(), Some("string"));
        assert!(schema.is_nullable());
    }

    #[test]
    fn test_unknown_type_is_kept() {
        let schema = parse("type: unknown\n");
        assert_eq!(schema.type_name(), Some("unknown"));
    }

    #[test]
    fn test_extensions_are_collected() {
        let schema = parse(
            r#"
type: string
x-foo: bar
x-list: [a, b]
"#,
        );
        let keys: Vec<&String> = schema.extensions().map(|(k, _)| k).collect();
        assert_eq!(keys, ["x-foo", "x-list"]);
    }

    #[test]
    fn test_exclusive_bounds() {
        let v30 = parse("type: integer\nminimum: 1\nexclusiveMinimum: true\n");
        assert!(v30.is_exclusive_minimum());
        assert_eq!(v30.lower_bound(), Some(1.0));

        let v31 = parse("type: integer\nexclusiveMaximum: 10\n");
        assert!(v31.is_exclusive_maximum());
        assert_eq!(v31.upper_bound(), Some(10.0));
    }

    #[test]
    fn test_composition_order() {
        let schema = parse(
            r#"
oneOf:
  - type: string
allOf:
  - type: object
"#,
        );
        assert_eq!(schema.composition(), Some(Composition::AllOf));
        assert_eq!(schema.composition_members().len(), 1);
    }
}
