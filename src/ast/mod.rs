pub mod expression;
pub mod program;
pub mod schema;
pub mod types;
pub mod value;

pub use expression::*;
pub use program::*;
pub use schema::*;
pub use types::*;
pub use value::*;
