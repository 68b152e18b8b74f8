pub mod finder;
pub mod mappings;
pub mod matcher;
pub mod model;
pub mod query;
mod reader;
pub mod repository;

pub use finder::MappingFinder;
pub use mappings::{Bucket, EndpointMappings, Mappings};
pub use model::*;
pub use query::{MappingQuery, QueryOrigin};
pub use repository::MappingRepository;
