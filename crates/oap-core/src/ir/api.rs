use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;

use super::data_type::DataType;
use super::registry::{TypeId, TypeRegistry};
use super::types::{Annotation, NormalizedName};

/// HTTP method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Put,
    Post,
    Delete,
    Options,
    Head,
    Patch,
    Trace,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Put => "PUT",
            HttpMethod::Post => "POST",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Head => "HEAD",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Trace => "TRACE",
        }
    }

    /// The method as used in generated names, e.g. `Get`.
    pub fn pascal_case(&self) -> &'static str {
        match self {
            HttpMethod::Get => "Get",
            HttpMethod::Put => "Put",
            HttpMethod::Post => "Post",
            HttpMethod::Delete => "Delete",
            HttpMethod::Options => "Options",
            HttpMethod::Head => "Head",
            HttpMethod::Patch => "Patch",
            HttpMethod::Trace => "Trace",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "get" => Ok(HttpMethod::Get),
            "put" => Ok(HttpMethod::Put),
            "post" => Ok(HttpMethod::Post),
            "delete" => Ok(HttpMethod::Delete),
            "options" => Ok(HttpMethod::Options),
            "head" => Ok(HttpMethod::Head),
            "patch" => Ok(HttpMethod::Patch),
            "trace" => Ok(HttpMethod::Trace),
            _ => Err(format!("unknown http method '{s}'")),
        }
    }
}

/// The converted API: interfaces with their endpoints plus every named type.
#[derive(Debug, Clone, Default)]
pub struct Api {
    pub interfaces: Vec<Interface>,
    pub registry: TypeRegistry,
    /// Endpoints dropped because their conversion failed.
    pub failures: Vec<EndpointFailure>,
    /// Path component of the selected server URL.
    pub base_path: Option<String>,
}

impl Api {
    pub fn interface(&self, name: &str) -> Option<&Interface> {
        self.interfaces
            .iter()
            .find(|i| i.name.original == name || i.name.pascal_case == name)
    }

    pub fn endpoints(&self) -> impl Iterator<Item = &Endpoint> {
        self.interfaces.iter().flat_map(|i| i.endpoints.iter())
    }

    pub fn endpoint(&self, path: &str, method: HttpMethod) -> Option<&Endpoint> {
        self.endpoints()
            .find(|e| e.path == path && e.method == method)
    }
}

/// An endpoint that was dropped, with the reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointFailure {
    pub path: String,
    pub method: HttpMethod,
    pub message: String,
}

/// A group of endpoints emitted together, derived from the first tag.
#[derive(Debug, Clone)]
pub struct Interface {
    pub name: NormalizedName,
    pub package: String,
    pub endpoints: Vec<Endpoint>,
}

/// A converted operation.
#[derive(Debug, Clone)]
pub struct Endpoint {
    pub path: String,
    pub method: HttpMethod,
    pub operation_id: Option<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub deprecated: bool,
    pub excluded: bool,
    pub parameters: Vec<Parameter>,
    pub request_bodies: Vec<RequestBody>,
    /// Responses by status in declaration order, one entry per content type.
    pub responses: IndexMap<String, Vec<Response>>,
}

impl Endpoint {
    /// Responses of 2xx statuses and `default`.
    pub fn success_responses(&self) -> impl Iterator<Item = (&String, &Response)> {
        self.flat_responses().filter(|(status, _)| !is_error_status(status))
    }

    /// Responses of 4xx and 5xx statuses.
    pub fn error_responses(&self) -> impl Iterator<Item = (&String, &Response)> {
        self.flat_responses().filter(|(status, _)| is_error_status(status))
    }

    fn flat_responses(&self) -> impl Iterator<Item = (&String, &Response)> {
        self.responses
            .iter()
            .flat_map(|(status, list)| list.iter().map(move |r| (status, r)))
    }

    /// Distinct request content types in declaration order.
    pub fn consumes_content_types(&self) -> Vec<&str> {
        let mut types: Vec<&str> = Vec::new();
        for body in &self.request_bodies {
            if !types.contains(&body.content_type.as_str()) {
                types.push(&body.content_type);
            }
        }
        for param in &self.parameters {
            if param.location == ParameterLocation::Multipart {
                if let Some(content_type) = &param.body_content_type {
                    if !types.contains(&content_type.as_str()) {
                        types.push(content_type);
                    }
                }
            }
        }
        types
    }

    /// Distinct non-empty response content types in declaration order.
    pub fn produces_content_types(&self) -> Vec<&str> {
        let mut types: Vec<&str> = Vec::new();
        for (_, response) in self.flat_responses() {
            if !response.content_type.is_empty() && !types.contains(&response.content_type.as_str()) {
                types.push(&response.content_type);
            }
        }
        types
    }

    pub fn has_success_response(&self) -> bool {
        self.responses.keys().any(|status| status.starts_with('2'))
    }
}

fn is_error_status(status: &str) -> bool {
    status.starts_with('4') || status.starts_with('5')
}

/// Where a parameter travels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterLocation {
    Path,
    Query,
    Header,
    Cookie,
    /// A property of a multipart or form body.
    Multipart,
    /// Added by an `add` parameter mapping; not part of the request.
    Additional,
}

/// A converted parameter.
#[derive(Debug, Clone)]
pub struct Parameter {
    pub name: String,
    pub location: ParameterLocation,
    pub data_type: DataType,
    pub required: bool,
    pub deprecated: bool,
    pub description: Option<String>,
    pub annotations: Vec<Annotation>,
    /// For multipart parameters: the part's declared content type.
    pub part_content_type: Option<String>,
    /// For multipart parameters: the content type of the exploded body.
    pub body_content_type: Option<String>,
}

impl Parameter {
    pub fn new(name: impl Into<String>, location: ParameterLocation, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            location,
            data_type,
            required: false,
            deprecated: false,
            description: None,
            annotations: Vec::new(),
            part_content_type: None,
            body_content_type: None,
        }
    }
}

/// A request body for one content type.
#[derive(Debug, Clone)]
pub struct RequestBody {
    pub content_type: String,
    pub data_type: DataType,
    pub required: bool,
    pub description: Option<String>,
}

/// A response for one status and content type. An empty content type means
/// the response has no body.
#[derive(Debug, Clone)]
pub struct Response {
    pub content_type: String,
    pub data_type: DataType,
    pub description: Option<String>,
    /// Marker interface shared with other responses of this content type.
    pub content_type_interface: Option<TypeId>,
}

impl Response {
    pub fn is_empty(&self) -> bool {
        self.content_type.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::data_type::ScalarKind;

    fn response(content_type: &str) -> Response {
        Response {
            content_type: content_type.to_string(),
            data_type: DataType::scalar(ScalarKind::String),
            description: None,
            content_type_interface: None,
        }
    }

    fn endpoint() -> Endpoint {
        let mut responses = IndexMap::new();
        responses.insert("200".to_string(), vec![response("application/json"), response("text/plain")]);
        responses.insert("404".to_string(), vec![response("application/json")]);
        responses.insert("default".to_string(), vec![response("application/json")]);
        Endpoint {
            path: "/foo".into(),
            method: HttpMethod::Get,
            operation_id: None,
            summary: None,
            description: None,
            deprecated: false,
            excluded: false,
            parameters: Vec::new(),
            request_bodies: Vec::new(),
            responses,
        }
    }

    #[test]
    fn test_success_and_error_responses() {
        let e = endpoint();
        let success: Vec<&String> = e.success_responses().map(|(s, _)| s).collect();
        assert_eq!(success, ["200", "200", "default"]);
        let errors: Vec<&String> = e.error_responses().map(|(s, _)| s).collect();
        assert_eq!(errors, ["404"]);
        assert!(e.has_success_response());
    }

    #[test]
    fn test_produces_content_types_are_distinct() {
        let e = endpoint();
        assert_eq!(e.produces_content_types(), ["application/json", "text/plain"]);
    }

    #[test]
    fn test_http_method_from_str() {
        assert_eq!("GET".parse::<HttpMethod>(), Ok(HttpMethod::Get));
        assert_eq!("patch".parse::<HttpMethod>(), Ok(HttpMethod::Patch));
        assert!("fetch".parse::<HttpMethod>().is_err());
    }
}
