//! Value objects - immutable types that represent domain concepts

mod field_map;
mod user_id;

pub use field_map::{Field, FieldMap, FieldParseError};
pub use user_id::{UserId, UserIdParseError};
