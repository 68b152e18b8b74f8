use std::fmt;
use std::str::FromStr;

use crate::error::MappingError;
use crate::ir::{Annotation, TargetType};

/// The source side of a type mapping: a schema name or an OpenAPI type with
/// optional format, written `type:format`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceType {
    pub type_name: String,
    pub format: Option<String>,
}

impl SourceType {
    pub fn new(type_name: impl Into<String>, format: Option<&str>) -> Self {
        Self {
            type_name: type_name.into(),
            format: format.map(str::to_string),
        }
    }
}

impl FromStr for SourceType {
    type Err = MappingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || MappingError::InvalidMapping(format!("invalid source type '{s}'"));
        let mut parts = s.split(':').map(str::trim);
        let type_name = parts.next().filter(|t| !t.is_empty()).ok_or_else(invalid)?;
        let format = match parts.next() {
            Some("") => return Err(invalid()),
            other => other,
        };
        if parts.next().is_some() {
            return Err(invalid());
        }
        Ok(SourceType::new(type_name, format))
    }
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.format {
            Some(format) => write!(f, "{}:{}", self.type_name, format),
            None => write!(f, "{}", self.type_name),
        }
    }
}

/// Replace `source` with `target`.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeMapping {
    pub source: SourceType,
    pub target: TargetType,
}

/// Attach `annotation` wherever `source` is used.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationTypeMapping {
    pub source: SourceType,
    pub annotation: Annotation,
}

/// Replace the type of the parameter called `parameter_name`.
#[derive(Debug, Clone, PartialEq)]
pub struct NameTypeMapping {
    pub parameter_name: String,
    pub target: TargetType,
}

/// Attach `annotation` to the parameter (or extension value) called `name`.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationNameMapping {
    pub name: String,
    pub annotation: Annotation,
}

/// Replace the response type of `content_type`.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentTypeMapping {
    pub content_type: String,
    pub target: TargetType,
}

/// Wrapper type for every response, or `plain` for none.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultTypeMapping {
    pub target: TargetType,
}

impl ResultTypeMapping {
    /// `result: plain`: responses are not wrapped.
    pub fn is_plain(&self) -> bool {
        self.target.is_plain()
    }
}

/// A synthetic parameter that is not part of the request.
#[derive(Debug, Clone, PartialEq)]
pub struct AddParameterTypeMapping {
    pub parameter_name: String,
    pub target: Option<TargetType>,
    pub annotation: Option<Annotation>,
}

/// Remove a declared parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct DropParameterTypeMapping {
    pub parameter_name: String,
}

/// Wrapper for nullable properties, with its initializer expression.
#[derive(Debug, Clone, PartialEq)]
pub struct NullTypeMapping {
    pub target: TargetType,
    pub init: Option<String>,
}

/// Annotations keyed by the value of an `x-` extension.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtensionMapping {
    pub extension: String,
    pub values: Vec<AnnotationNameMapping>,
}

/// Whether error responses take part in response type decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResultStyle {
    /// Only 2xx (and `default`) responses count.
    #[default]
    Success,
    All,
}

impl FromStr for ResultStyle {
    type Err = MappingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "success" => Ok(ResultStyle::Success),
            "all" => Ok(ResultStyle::All),
            other => Err(MappingError::InvalidMapping(format!(
                "unknown result-style '{other}'"
            ))),
        }
    }
}

/// A configured override.
#[derive(Debug, Clone, PartialEq)]
pub enum Mapping {
    Type(TypeMapping),
    AnnotationType(AnnotationTypeMapping),
    NameType(NameTypeMapping),
    AnnotationName(AnnotationNameMapping),
    ContentType(ContentTypeMapping),
    AddParameter(AddParameterTypeMapping),
    DropParameter(DropParameterTypeMapping),
}

impl Mapping {
    /// The replacement type, for the variants that carry one.
    pub fn target(&self) -> Option<&TargetType> {
        match self {
            Mapping::Type(m) => Some(&m.target),
            Mapping::NameType(m) => Some(&m.target),
            Mapping::ContentType(m) => Some(&m.target),
            Mapping::AddParameter(m) => m.target.as_ref(),
            _ => None,
        }
    }

    pub fn annotation(&self) -> Option<&Annotation> {
        match self {
            Mapping::AnnotationType(m) => Some(&m.annotation),
            Mapping::AnnotationName(m) => Some(&m.annotation),
            Mapping::AddParameter(m) => m.annotation.as_ref(),
            _ => None,
        }
    }
}

impl fmt::Display for Mapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mapping::Type(m) => write!(f, "{} => {}", m.source, m.target),
            Mapping::AnnotationType(m) => write!(f, "{} @ {}", m.source, m.annotation),
            Mapping::NameType(m) => write!(f, "name {} => {}", m.parameter_name, m.target),
            Mapping::AnnotationName(m) => write!(f, "name {} @ {}", m.name, m.annotation),
            Mapping::ContentType(m) => write!(f, "{} => {}", m.content_type, m.target),
            Mapping::AddParameter(m) => {
                write!(f, "add {}", m.parameter_name)?;
                if let Some(target) = &m.target {
                    write!(f, " => {target}")?;
                }
                if let Some(annotation) = &m.annotation {
                    write!(f, " @ {annotation}")?;
                }
                Ok(())
            }
            Mapping::DropParameter(m) => write!(f, "drop {}", m.parameter_name),
        }
    }
}
