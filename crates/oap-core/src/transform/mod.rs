pub mod api_converter;
pub mod content_type;
pub mod data_type_converter;
pub mod name_normalizer;
pub mod schema_context;
pub mod wrappers;

pub use api_converter::ApiConverter;
pub use data_type_converter::DataTypeConverter;
pub use schema_context::{SchemaContext, SchemaKind};
