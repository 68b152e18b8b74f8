pub mod config;
pub mod error;
pub mod ir;
pub mod mapping;
pub mod parse;
pub mod transform;

use config::ProcessorConfig;
use error::ConvertError;
use ir::Api;
use mapping::{MappingFinder, MappingRepository};
use parse::spec::OpenApiSpec;

/// Convert a parsed document with the given configuration.
///
/// The mapping document is validated before any endpoint is converted.
pub fn process(spec: &OpenApiSpec, config: &ProcessorConfig) -> Result<Api, ConvertError> {
    let repository = MappingRepository::from_config(&config.map)?;
    transform::ApiConverter::new(&config.options, MappingFinder::new(&repository)).convert(spec)
}
