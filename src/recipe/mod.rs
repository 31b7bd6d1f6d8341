pub mod definition;
mod replay;

pub use definition::*;
