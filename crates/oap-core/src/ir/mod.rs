pub mod api;
pub mod data_type;
pub mod grouping;
pub mod registry;
pub mod schemas;
pub mod types;

pub use api::*;
pub use data_type::*;
pub use registry::{TypeId, TypeRegistry};
pub use schemas::*;
pub use types::{Annotation, NormalizedName, TargetType};
