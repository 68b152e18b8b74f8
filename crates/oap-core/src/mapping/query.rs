use std::fmt;

use crate::ir::HttpMethod;

/// Where the schema being looked up is used. Parameter and content-type
/// lookups only apply to their own origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QueryOrigin {
    Parameter,
    RequestBody,
    Response,
    #[default]
    Schema,
}

/// The lookup key for every mapping category.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MappingQuery {
    pub path: Option<String>,
    pub method: Option<HttpMethod>,
    /// Contextual name: parameter, inline body/response name, or schema name.
    pub name: Option<String>,
    /// The declared parameter name, when the query is for a parameter.
    pub parameter: Option<String>,
    pub type_name: Option<String>,
    pub format: Option<String>,
    pub content_type: Option<String>,
    pub primitive: bool,
    pub array: bool,
    /// Let `object` annotation mappings match.
    pub allow_object: bool,
    pub origin: QueryOrigin,
}

impl MappingQuery {
    /// A query scoped to one endpoint.
    pub fn endpoint(path: &str, method: HttpMethod) -> Self {
        Self {
            path: Some(path.to_string()),
            method: Some(method),
            ..Self::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_type(mut self, type_name: Option<&str>, format: Option<&str>) -> Self {
        self.type_name = type_name.map(str::to_string);
        self.format = format.map(str::to_string);
        self
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        let content_type = content_type.into();
        self.content_type = (!content_type.is_empty()).then_some(content_type);
        self
    }

    pub fn with_parameter(mut self, parameter: impl Into<String>) -> Self {
        self.parameter = Some(parameter.into());
        self.origin = QueryOrigin::Parameter;
        self
    }

    pub fn with_origin(mut self, origin: QueryOrigin) -> Self {
        self.origin = origin;
        self
    }

    pub fn primitive(mut self, primitive: bool) -> Self {
        self.primitive = primitive;
        self
    }

    pub fn array(mut self, array: bool) -> Self {
        self.array = array;
        self
    }

    pub fn allow_object(mut self, allow_object: bool) -> Self {
        self.allow_object = allow_object;
        self
    }

    /// The name parameter-name mappings compare against.
    pub fn parameter_name(&self) -> Option<&str> {
        self.parameter.as_deref().or(self.name.as_deref())
    }
}

impl fmt::Display for MappingQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts: Vec<String> = Vec::new();

        if let Some(name) = &self.name {
            parts.push(format!("name: '{name}'"));
        }

        if let Some(path) = &self.path {
            let mut part = String::from("path: ");
            if let Some(method) = self.method {
                part.push_str(method.as_str());
                part.push(' ');
            }
            part.push_str(&format!("'{path}'"));
            parts.push(part);
        }

        if let Some(content_type) = self.content_type.as_deref().filter(|c| !c.trim().is_empty()) {
            parts.push(content_type.to_string());
        }

        if let Some(type_name) = &self.type_name {
            match &self.format {
                Some(format) => parts.push(format!("type: '{type_name}:{format}'")),
                None => parts.push(format!("type: '{type_name}'")),
            }
        }

        let mut flags = String::new();
        if self.primitive {
            flags.push('P');
        }
        if self.array {
            flags.push('A');
        }
        if self.allow_object {
            flags.push('O');
        }
        if !flags.is_empty() {
            parts.push(flags);
        }

        write!(f, "{}", parts.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_full_query() {
        let query = MappingQuery::endpoint("/foo", HttpMethod::Get)
            .with_name("FooResponse200")
            .with_content_type("application/json")
            .with_type(Some("string"), Some("uuid"))
            .primitive(true)
            .allow_object(true);
        insta::assert_snapshot!(
            query.to_string(),
            @"name: 'FooResponse200' path: GET '/foo' application/json type: 'string:uuid' PO"
        );
    }

    #[test]
    fn test_display_type_only() {
        let query = MappingQuery::default().with_type(Some("array"), None).array(true);
        assert_eq!(query.to_string(), "type: 'array' A");
    }

    #[test]
    fn test_parameter_name_falls_back_to_name() {
        let query = MappingQuery::default().with_name("Foo");
        assert_eq!(query.parameter_name(), Some("Foo"));
        let query = query.with_parameter("foo");
        assert_eq!(query.parameter_name(), Some("foo"));
        assert_eq!(query.origin, QueryOrigin::Parameter);
    }
}
