use indexmap::IndexMap;
use log::{debug, error, warn};
use url::Url;

use crate::config::ProcessorOptions;
use crate::error::ConvertError;
use crate::ir::grouping::{group_endpoints, interface_name};
use crate::ir::{
    Api, Constraints, DataType, Endpoint, EndpointFailure, HttpMethod, MappedType, NoDataType,
    Parameter, ParameterLocation, RequestBody, Response, TypeId, TypeRegistry,
};
use crate::mapping::{MappingFinder, MappingQuery, QueryOrigin};
use crate::parse::media_type::{MediaType, is_multipart};
use crate::parse::operation::{Operation, PathItem};
use crate::parse::parameter::{self, ParameterLocation as DeclaredLocation};
use crate::parse::ref_resolve::RefResolver;
use crate::parse::schema::SchemaOrRef;
use crate::parse::spec::OpenApiSpec;

use super::content_type::{content_type_interface, differing_content_types};
use super::data_type_converter::DataTypeConverter;
use super::name_normalizer::to_class;
use super::schema_context::SchemaContext;
use super::wrappers::{unwrap, wrap_body, wrap_result, wrap_single};

/// The operation being converted.
#[derive(Clone, Copy)]
struct EndpointContext<'a> {
    path: &'a str,
    method: HttpMethod,
    resolver: RefResolver<'a>,
}

impl<'a> EndpointContext<'a> {
    fn query(&self) -> MappingQuery {
        MappingQuery::endpoint(self.path, self.method)
    }

    fn schema(&self, name: impl Into<String>, node: &'a SchemaOrRef) -> SchemaContext<'a> {
        SchemaContext::new(self.path, self.method, name, node, self.resolver)
    }

    fn inline_name(&self, suffix: &str) -> String {
        format!("{}{}{suffix}", to_class(self.path), self.method.pascal_case())
    }

    fn no_data(&self, name: impl Into<String>) -> DataType {
        DataType::NoData(NoDataType {
            name: name.into(),
            constraints: Constraints::default(),
            deprecated: false,
        })
    }
}

/// Converts every operation of a document into endpoints grouped by
/// interface, registering the named types they use.
///
/// An endpoint whose conversion fails with an endpoint-local error is
/// dropped and recorded in [`Api::failures`]; any other error aborts the
/// conversion.
pub struct ApiConverter<'c> {
    options: &'c ProcessorOptions,
    finder: MappingFinder<'c>,
}

impl<'c> ApiConverter<'c> {
    pub fn new(options: &'c ProcessorOptions, finder: MappingFinder<'c>) -> Self {
        Self { options, finder }
    }

    pub fn convert(&self, spec: &OpenApiSpec) -> Result<Api, ConvertError> {
        let resolver = RefResolver::new(spec);
        let mut registry = TypeRegistry::new();
        let mut failures = Vec::new();
        let mut endpoints = Vec::new();

        for (path, item) in &spec.paths {
            for (method, operation) in item.operations() {
                let ctx = EndpointContext {
                    path,
                    method,
                    resolver,
                };
                let excluded = self.finder.is_excluded(&ctx.query());
                let interface = interface_name(&operation.tags, excluded);
                match self.create_endpoint(ctx, item, operation, excluded, &mut registry) {
                    Ok(endpoint) => {
                        if !endpoint.has_success_response() {
                            warn!("endpoint '{path}' has no success 2xx response.");
                        }
                        endpoints.push((interface, Some(endpoint)));
                    }
                    Err(e) if e.is_endpoint_local() => {
                        error!("failed to convert endpoint {method} {path}: {e}");
                        failures.push(EndpointFailure {
                            path: path.clone(),
                            method,
                            message: e.to_string(),
                        });
                        endpoints.push((interface, None));
                    }
                    Err(e) => return Err(e),
                }
            }
        }

        Ok(Api {
            interfaces: group_endpoints(endpoints, &self.options.api_package()),
            registry,
            failures,
            base_path: self.base_path(spec),
        })
    }

    fn create_endpoint<'a>(
        &self,
        ctx: EndpointContext<'a>,
        item: &'a PathItem,
        operation: &'a Operation,
        excluded: bool,
        registry: &mut TypeRegistry,
    ) -> Result<Endpoint, ConvertError> {
        let mut converter = DataTypeConverter::new(self.options, self.finder);

        let mut parameters = self.collect_parameters(ctx, item, operation, &mut converter, registry)?;
        let (request_bodies, multipart) =
            self.collect_request_bodies(ctx, operation, &mut converter, registry)?;
        parameters.extend(multipart);

        let markers = if self.options.response_interface {
            self.create_markers(ctx, operation, registry)?
        } else {
            IndexMap::new()
        };
        let mut responses = self.collect_responses(ctx, operation, &mut converter, registry)?;
        attach_markers(&mut responses, &markers, registry);

        Ok(Endpoint {
            path: ctx.path.to_string(),
            method: ctx.method,
            operation_id: operation.operation_id.clone(),
            summary: operation.summary.clone(),
            description: operation.description.clone(),
            deprecated: operation.deprecated.unwrap_or(false),
            excluded,
            parameters,
            request_bodies,
            responses,
        })
    }

    /// Declared parameters (path level first, overridden by the operation on
    /// the same name and location), minus dropped ones, plus added ones.
    fn collect_parameters<'a>(
        &self,
        ctx: EndpointContext<'a>,
        item: &'a PathItem,
        operation: &'a Operation,
        converter: &mut DataTypeConverter<'_>,
        registry: &mut TypeRegistry,
    ) -> Result<Vec<Parameter>, ConvertError> {
        let mut declared: Vec<&'a parameter::Parameter> = Vec::new();
        for param in item.parameters.iter().chain(&operation.parameters) {
            let param = ctx.resolver.resolve_parameter(param)?;
            match declared
                .iter_mut()
                .find(|d| d.name == param.name && d.location == param.location)
            {
                Some(slot) => *slot = param,
                None => declared.push(param),
            }
        }

        let query = ctx.query();
        let dropped = self.finder.find_drop_parameters(&query);
        let mut parameters = Vec::new();
        for param in declared {
            if dropped.contains(&param.name.as_str()) {
                continue;
            }
            parameters.push(self.create_parameter(ctx, param, converter, registry)?);
        }

        for add in self.finder.find_add_parameters(&query) {
            let data_type = match &add.target {
                Some(target) => DataType::Mapped(MappedType {
                    target: target.clone(),
                    source: None,
                }),
                None => ctx.no_data(&add.parameter_name),
            };
            registry.collect_reachable(&data_type);
            let mut parameter =
                Parameter::new(&add.parameter_name, ParameterLocation::Additional, data_type);
            parameter.annotations = add.annotation.iter().cloned().collect();
            parameters.push(parameter);
        }
        Ok(parameters)
    }

    fn create_parameter<'a>(
        &self,
        ctx: EndpointContext<'a>,
        param: &'a parameter::Parameter,
        converter: &mut DataTypeConverter<'_>,
        registry: &mut TypeRegistry,
    ) -> Result<Parameter, ConvertError> {
        let location = match &param.location {
            DeclaredLocation::Path => ParameterLocation::Path,
            DeclaredLocation::Query => ParameterLocation::Query,
            DeclaredLocation::Header => ParameterLocation::Header,
            DeclaredLocation::Cookie => ParameterLocation::Cookie,
            DeclaredLocation::Other(other) => {
                return Err(ConvertError::UnknownParameterType {
                    name: param.name.clone(),
                    location: other.clone(),
                });
            }
        };

        let (data_type, query) = match &param.schema {
            Some(node) => {
                let schema = ctx.schema(param.name.as_str(), node).with_parameter(&param.name);
                let data_type = converter.convert(&schema, registry)?;
                (data_type, schema.resolved()?.query())
            }
            None => (
                ctx.no_data(&param.name),
                ctx.query().with_name(param.name.as_str()).with_parameter(&param.name),
            ),
        };

        let mut parameter = Parameter::new(&param.name, location, data_type);
        parameter.required = param.required;
        parameter.deprecated = param.deprecated.unwrap_or(false);
        parameter.description = param.description.clone();
        parameter.annotations = self
            .finder
            .find_parameter_type_annotations(&query)
            .into_iter()
            .chain(self.finder.find_parameter_name_annotations(&query))
            .cloned()
            .collect();
        Ok(parameter)
    }

    /// One body per content type. Multipart and form bodies are exploded
    /// into one parameter per property instead.
    fn collect_request_bodies<'a>(
        &self,
        ctx: EndpointContext<'a>,
        operation: &'a Operation,
        converter: &mut DataTypeConverter<'_>,
        registry: &mut TypeRegistry,
    ) -> Result<(Vec<RequestBody>, Vec<Parameter>), ConvertError> {
        let Some(body) = &operation.request_body else {
            return Ok((Vec::new(), Vec::new()));
        };
        let body = ctx.resolver.resolve_request_body(body)?;
        let name = ctx.inline_name("RequestBody");

        let mut bodies = Vec::new();
        let mut parameters = Vec::new();
        for (content_type, media) in &body.content {
            let Some(node) = &media.schema else {
                return Err(ConvertError::NoRequestBodySchema {
                    path: ctx.path.to_string(),
                });
            };
            let schema = ctx
                .schema(name.as_str(), node)
                .with_origin(QueryOrigin::RequestBody);

            if is_multipart(content_type) {
                parameters.extend(self.multipart_parameters(
                    ctx,
                    &schema,
                    content_type,
                    media,
                    converter,
                    registry,
                )?);
            } else {
                let data_type = converter.convert(&schema, registry)?;
                bodies.push(RequestBody {
                    content_type: content_type.clone(),
                    data_type: wrap_body(data_type, &self.finder, &schema.query()),
                    required: body.required,
                    description: body.description.clone(),
                });
            }
        }
        Ok((bodies, parameters))
    }

    /// The properties of a multipart body as parameters. The body object is
    /// removed from the registry unless it was registered before, e.g. as a
    /// component that other bodies or responses use.
    fn multipart_parameters(
        &self,
        ctx: EndpointContext<'_>,
        schema: &SchemaContext<'_>,
        content_type: &str,
        media: &MediaType,
        converter: &mut DataTypeConverter<'_>,
        registry: &mut TypeRegistry,
    ) -> Result<Vec<Parameter>, ConvertError> {
        let mark = registry.mark();
        let data_type = converter.convert(schema, registry)?;
        let (id, key, object) = data_type
            .named_id()
            .and_then(|id| registry.get(id).map(|ty| (id, ty)))
            .and_then(|(id, ty)| ty.kind.as_object().map(|o| (id, ty.key.clone(), o.clone())))
            .ok_or_else(|| ConvertError::MultipartResponseBody {
                path: ctx.path.to_string(),
            })?;
        if registry.is_newer(id, mark) {
            registry.remove(&key);
        }

        let parameters = object
            .properties
            .into_iter()
            .map(|(name, property)| {
                let mut parameter =
                    Parameter::new(name.as_str(), ParameterLocation::Multipart, property.data_type);
                parameter.required = property.required;
                parameter.deprecated = property.deprecated;
                parameter.description = property.description;
                parameter.annotations = property.annotations;
                parameter.part_content_type = media.part_content_type(&name).map(str::to_string);
                parameter.body_content_type = Some(content_type.to_string());
                parameter
            })
            .collect();
        Ok(parameters)
    }

    /// Responses by status, one per content type. A response without content
    /// becomes a single `Void` response with an empty content type.
    fn collect_responses<'a>(
        &self,
        ctx: EndpointContext<'a>,
        operation: &'a Operation,
        converter: &mut DataTypeConverter<'_>,
        registry: &mut TypeRegistry,
    ) -> Result<IndexMap<String, Vec<Response>>, ConvertError> {
        let mut responses = IndexMap::new();
        for (status, response) in &operation.responses {
            let response = ctx.resolver.resolve_response(response)?;
            let description = (!response.description.is_empty()).then(|| response.description.clone());

            if response.content.is_empty() {
                let query = ctx.query();
                let data_type = wrap_single(DataType::Void { in_result: false }, &self.finder, &query);
                responses.insert(
                    status.clone(),
                    vec![Response {
                        content_type: String::new(),
                        data_type: wrap_result(data_type, &self.finder, &query),
                        description,
                        content_type_interface: None,
                    }],
                );
                continue;
            }

            let name = ctx.inline_name(&format!("Response{status}"));
            let mut list = Vec::new();
            for (content_type, media) in &response.content {
                let (data_type, query) = match &media.schema {
                    Some(node) => {
                        let schema = ctx
                            .schema(name.as_str(), node)
                            .with_content_type(content_type)
                            .with_origin(QueryOrigin::Response);
                        (converter.convert(&schema, registry)?, schema.query())
                    }
                    None => (
                        ctx.no_data(name.as_str()),
                        ctx.query()
                            .with_name(name.as_str())
                            .with_content_type(content_type.as_str())
                            .with_origin(QueryOrigin::Response),
                    ),
                };
                let data_type = wrap_body(data_type, &self.finder, &query);
                list.push(Response {
                    content_type: content_type.clone(),
                    data_type: wrap_result(data_type, &self.finder, &query),
                    description: description.clone(),
                    content_type_interface: None,
                });
            }
            responses.insert(status.clone(), list);
        }
        Ok(responses)
    }

    /// Convert the responses once against a scratch registry and register a
    /// marker interface for every content type whose statuses differ.
    fn create_markers<'a>(
        &self,
        ctx: EndpointContext<'a>,
        operation: &'a Operation,
        registry: &mut TypeRegistry,
    ) -> Result<IndexMap<String, TypeId>, ConvertError> {
        let mut scratch = registry.clone();
        let mut converter = DataTypeConverter::new(self.options, self.finder);
        let probe = self.collect_responses(ctx, operation, &mut converter, &mut scratch)?;

        let style = self.finder.result_style(&ctx.query());
        let mut markers = IndexMap::new();
        for content_type in differing_content_types(&probe, style) {
            let marker = content_type_interface(
                ctx.path,
                ctx.method,
                &content_type,
                self.options.model_package(),
            );
            debug!(
                "content type interface '{}' for {} {} ({content_type})",
                marker.key, ctx.method, ctx.path
            );
            let id = registry.add(marker);
            registry.add_ref(id);
            markers.insert(content_type, id);
        }
        Ok(markers)
    }

    /// Path component of the configured server url.
    fn base_path(&self, spec: &OpenApiSpec) -> Option<String> {
        let index = self.options.base_path.server_url?;
        let Some(server) = spec.servers.get(index) else {
            warn!("server-url index {index} has no matching server");
            return None;
        };
        let raw = server.expanded_url();
        match Url::parse("http://localhost").and_then(|base| base.join(&raw)) {
            Ok(url) => Some(url.path().to_string()),
            Err(e) => {
                warn!("cannot read base path of server url '{raw}': {e}");
                None
            }
        }
    }
}

/// Point each response of a marked content type at its marker and let the
/// model types behind those responses implement it.
fn attach_markers(
    responses: &mut IndexMap<String, Vec<Response>>,
    markers: &IndexMap<String, TypeId>,
    registry: &mut TypeRegistry,
) {
    if markers.is_empty() {
        return;
    }
    for response in responses.values_mut().flatten() {
        let Some(&marker) = markers.get(&response.content_type) else {
            continue;
        };
        response.content_type_interface = Some(marker);
        let inner = unwrap(&response.data_type);
        if !inner.is_model(registry) {
            continue;
        }
        if let Some(ty) = inner.resolve_named(registry).and_then(|id| registry.get_mut(id)) {
            ty.implement(marker);
        }
    }
}
