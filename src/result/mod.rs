//! Query result model and markdown normalization.

pub mod format;
pub mod normalize;
pub mod types;

pub use normalize::{normalize, normalize_value, NO_DATA};
pub use types::{ColumnSchema, NormalizedAnswer, QueryResult, TabularResult};
