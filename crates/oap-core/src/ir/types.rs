use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::Deserialize;

use crate::error::MappingError;

/// A name with multiple casing variants pre-computed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NormalizedName {
    pub original: String,
    pub pascal_case: String,
    pub camel_case: String,
    pub snake_case: String,
    pub screaming_snake: String,
}

impl fmt::Display for NormalizedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.original)
    }
}

/// A fully qualified target type, e.g. `java.util.Map<java.lang.String, io.Foo>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TargetType {
    pub type_name: String,
    pub generics: Vec<TargetType>,
}

impl TargetType {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            generics: Vec::new(),
        }
    }

    pub fn with_generics(mut self, generics: Vec<TargetType>) -> Self {
        self.generics = generics;
        self
    }

    /// The simple name, i.e. the last dotted segment.
    pub fn name(&self) -> &str {
        self.type_name
            .rsplit_once('.')
            .map_or(self.type_name.as_str(), |(_, name)| name)
    }

    /// The package prefix, empty for unqualified names.
    pub fn package(&self) -> &str {
        self.type_name.rsplit_once('.').map_or("", |(pkg, _)| pkg)
    }

    /// The `plain` pseudo type disables wrapping.
    pub fn is_plain(&self) -> bool {
        self.type_name == "plain"
    }

    /// Every fully qualified name used by this type and its generics.
    pub fn qualified_names(&self) -> Vec<&str> {
        let mut names = vec![self.type_name.as_str()];
        for generic in &self.generics {
            names.extend(generic.qualified_names());
        }
        names
    }
}

impl fmt::Display for TargetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.type_name)?;
        if !self.generics.is_empty() {
            write!(f, "<")?;
            for (i, generic) in self.generics.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{generic}")?;
            }
            write!(f, ">")?;
        }
        Ok(())
    }
}

impl FromStr for TargetType {
    type Err = MappingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || MappingError::InvalidMapping(format!("invalid target type '{s}'"));
        let s = s.trim();
        let Some(open) = s.find('<') else {
            if s.is_empty() || s.contains('>') || s.contains(',') {
                return Err(invalid());
            }
            return Ok(TargetType::new(s));
        };
        let inner = s[open + 1..].strip_suffix('>').ok_or_else(invalid)?;
        let type_name = s[..open].trim();
        if type_name.is_empty() {
            return Err(invalid());
        }
        let generics = split_generics(inner)
            .ok_or_else(invalid)?
            .into_iter()
            .map(str::parse)
            .collect::<Result<Vec<TargetType>, _>>()?;
        Ok(TargetType::new(type_name).with_generics(generics))
    }
}

/// Split a generic argument list on top-level commas.
fn split_generics(inner: &str) -> Option<Vec<&str>> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, ch) in inner.char_indices() {
        match ch {
            '<' => depth += 1,
            '>' => depth = depth.checked_sub(1)?,
            ',' if depth == 0 => {
                parts.push(&inner[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    if depth != 0 {
        return None;
    }
    parts.push(&inner[start..]);
    Some(parts)
}

/// An annotation to attach to a parameter, property or model type.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Annotation {
    #[serde(rename = "type")]
    pub type_name: String,
    /// Annotation parameters in declaration order. The key `value` is rendered
    /// positionally when it is the only parameter.
    #[serde(default)]
    pub parameters: IndexMap<String, serde_json::Value>,
}

impl Annotation {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            parameters: IndexMap::new(),
        }
    }
}

impl fmt::Display for Annotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.type_name)?;
        if self.parameters.is_empty() {
            return Ok(());
        }
        write!(f, "(")?;
        if self.parameters.len() == 1 {
            if let Some(value) = self.parameters.get("value") {
                write!(f, "{value})")?;
                return Ok(());
            }
        }
        for (i, (key, value)) in self.parameters.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{key} = {value}")?;
        }
        write!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_type_parts() {
        let t: TargetType = "java.time.LocalDate".parse().unwrap();
        assert_eq!(t.name(), "LocalDate");
        assert_eq!(t.package(), "java.time");
        assert!(t.generics.is_empty());
    }

    #[test]
    fn test_target_type_nested_generics() {
        let t: TargetType = "java.util.Map<java.lang.String, java.util.List<io.Foo>>"
            .parse()
            .unwrap();
        assert_eq!(t.generics.len(), 2);
        assert_eq!(t.generics[1].generics[0].type_name, "io.Foo");
        assert_eq!(
            t.to_string(),
            "java.util.Map<java.lang.String, java.util.List<io.Foo>>"
        );
    }

    #[test]
    fn test_target_type_rejects_unbalanced() {
        assert!("java.util.List<io.Foo".parse::<TargetType>().is_err());
        assert!("".parse::<TargetType>().is_err());
        assert!("a<b>>".parse::<TargetType>().is_err());
    }

    #[test]
    fn test_annotation_display() {
        let mut a = Annotation::new("io.Size");
        assert_eq!(a.to_string(), "@io.Size");
        a.parameters.insert("value".into(), serde_json::json!("x"));
        assert_eq!(a.to_string(), "@io.Size(\"x\")");
        a.parameters.insert("max".into(), serde_json::json!(4));
        assert_eq!(a.to_string(), "@io.Size(value = \"x\", max = 4)");
    }
}
