use super::components::Components;
use super::parameter::{Parameter, ParameterOrRef};
use super::request_body::{RequestBody, RequestBodyOrRef};
use super::response::{Response, ResponseOrRef};
use super::schema::{Schema, SchemaOrRef};
use super::spec::OpenApiSpec;
use crate::error::ResolveError;

/// Longest `$ref` chain followed before giving up on a reference loop.
const MAX_REF_DEPTH: usize = 32;

const SCHEMAS_PREFIX: &str = "#/components/schemas/";

/// The target of a schema `$ref`.
#[derive(Debug, Clone, Copy)]
pub struct ResolvedSchema<'a> {
    /// The component name, when the pointer names a component schema directly.
    /// Pointers into a component (`.../Foo/properties/bar`) carry no name.
    pub name: Option<&'a str>,
    pub target: &'a SchemaOrRef,
}

/// Resolves `$ref` pointers on demand against the document's components.
///
/// Nothing is inlined ahead of time: callers follow references while they
/// walk the document, which keeps recursive schemas finite.
#[derive(Debug, Clone, Copy)]
pub struct RefResolver<'a> {
    components: Option<&'a Components>,
}

impl<'a> RefResolver<'a> {
    pub fn new(spec: &'a OpenApiSpec) -> Self {
        Self {
            components: spec.components.as_ref(),
        }
    }

    /// Resolve a schema pointer. Supports component schemas and JSON pointers
    /// into them through `properties`, `items`, `allOf`/`anyOf`/`oneOf` and
    /// `additionalProperties`.
    pub fn resolve_schema(&self, ref_path: &str) -> Result<ResolvedSchema<'a>, ResolveError> {
        self.resolve_schema_at(ref_path, 0)
    }

    fn resolve_schema_at(
        &self,
        ref_path: &str,
        depth: usize,
    ) -> Result<ResolvedSchema<'a>, ResolveError> {
        if depth > MAX_REF_DEPTH {
            return Err(ResolveError::CircularRef(ref_path.to_string()));
        }
        let pointer = ref_path
            .strip_prefix(SCHEMAS_PREFIX)
            .ok_or_else(|| ResolveError::InvalidRefFormat(ref_path.to_string()))?;
        let mut segments = pointer.split('/').map(unescape_pointer);
        let name = segments
            .next()
            .filter(|n| !n.is_empty())
            .ok_or_else(|| ResolveError::InvalidRefFormat(ref_path.to_string()))?;
        let not_found = || ResolveError::RefTargetNotFound(ref_path.to_string());

        let (name, mut current) = self
            .components
            .and_then(|c| c.schemas.get_key_value(&name))
            .ok_or_else(not_found)?;
        let mut nested = false;

        while let Some(segment) = segments.next() {
            nested = true;
            let schema = self.deref(current, depth + 1)?;
            current = match segment.as_str() {
                "properties" => segments
                    .next()
                    .and_then(|key| schema.properties.get(&key)),
                "items" => schema.items.as_deref(),
                "additionalProperties" => schema.additional_properties_schema(),
                "allOf" | "anyOf" | "oneOf" => {
                    let members = match segment.as_str() {
                        "allOf" => &schema.all_of,
                        "anyOf" => &schema.any_of,
                        _ => &schema.one_of,
                    };
                    segments
                        .next()
                        .and_then(|index| index.parse::<usize>().ok())
                        .and_then(|index| members.get(index))
                }
                _ => None,
            }
            .ok_or_else(not_found)?;
        }

        Ok(ResolvedSchema {
            name: (!nested).then_some(name.as_str()),
            target: current,
        })
    }

    /// Follow references until an inline schema is reached.
    fn deref(&self, schema: &'a SchemaOrRef, depth: usize) -> Result<&'a Schema, ResolveError> {
        match schema {
            SchemaOrRef::Schema(s) => Ok(&**s),
            SchemaOrRef::Ref { ref_path } => {
                let resolved = self.resolve_schema_at(ref_path, depth)?;
                self.deref(resolved.target, depth + 1)
            }
        }
    }

    /// Follow a schema reference chain to the inline schema at its end.
    pub fn schema_of(&self, schema: &'a SchemaOrRef) -> Result<&'a Schema, ResolveError> {
        self.deref(schema, 0)
    }

    pub fn resolve_parameter(
        &self,
        param: &'a ParameterOrRef,
    ) -> Result<&'a Parameter, ResolveError> {
        let mut current = param;
        for _ in 0..MAX_REF_DEPTH {
            match current {
                ParameterOrRef::Parameter(p) => return Ok(p),
                ParameterOrRef::Ref { ref_path } => {
                    let name = parse_ref_name(ref_path, "parameters")?;
                    current = self
                        .components
                        .and_then(|c| c.parameters.get(name))
                        .ok_or_else(|| ResolveError::RefTargetNotFound(ref_path.clone()))?;
                }
            }
        }
        Err(ResolveError::CircularRef(describe_parameter(param)))
    }

    pub fn resolve_request_body(
        &self,
        body: &'a RequestBodyOrRef,
    ) -> Result<&'a RequestBody, ResolveError> {
        let mut current = body;
        for _ in 0..MAX_REF_DEPTH {
            match current {
                RequestBodyOrRef::RequestBody(b) => return Ok(b),
                RequestBodyOrRef::Ref { ref_path } => {
                    let name = parse_ref_name(ref_path, "requestBodies")?;
                    current = self
                        .components
                        .and_then(|c| c.request_bodies.get(name))
                        .ok_or_else(|| ResolveError::RefTargetNotFound(ref_path.clone()))?;
                }
            }
        }
        Err(ResolveError::CircularRef("requestBody".to_string()))
    }

    pub fn resolve_response(
        &self,
        response: &'a ResponseOrRef,
    ) -> Result<&'a Response, ResolveError> {
        let mut current = response;
        for _ in 0..MAX_REF_DEPTH {
            match current {
                ResponseOrRef::Response(r) => return Ok(r),
                ResponseOrRef::Ref { ref_path } => {
                    let name = parse_ref_name(ref_path, "responses")?;
                    current = self
                        .components
                        .and_then(|c| c.responses.get(name))
                        .ok_or_else(|| ResolveError::RefTargetNotFound(ref_path.clone()))?;
                }
            }
        }
        Err(ResolveError::CircularRef("response".to_string()))
    }
}

fn describe_parameter(param: &ParameterOrRef) -> String {
    match param {
        ParameterOrRef::Ref { ref_path } => ref_path.clone(),
        ParameterOrRef::Parameter(p) => p.name.clone(),
    }
}

/// Undo JSON pointer escaping (`~1` is `/`, `~0` is `~`).
fn unescape_pointer(segment: &str) -> String {
    segment.replace("~1", "/").replace("~0", "~")
}

/// Parse a `$ref` path like `#/components/schemas/Foo` and extract the name.
fn parse_ref_name<'r>(ref_path: &'r str, expected_section: &str) -> Result<&'r str, ResolveError> {
    let stripped = ref_path
        .strip_prefix("#/components/")
        .ok_or_else(|| ResolveError::InvalidRefFormat(ref_path.to_string()))?;
    let (section, name) = stripped
        .split_once('/')
        .ok_or_else(|| ResolveError::InvalidRefFormat(ref_path.to_string()))?;
    if section != expected_section {
        return Err(ResolveError::InvalidRefFormat(format!(
            "expected section '{}', got '{}' in {}",
            expected_section, section, ref_path
        )));
    }
    Ok(name)
}
