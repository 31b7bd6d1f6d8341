//! Prelude module for convenient imports
//!
//! This module re-exports the most commonly used types and traits from the
//! crate, so front ends can get going with a single `use`.
//!
//! # Example
//!
//! ```rust,no_run
//! use thingtalk_builder::prelude::*;
//!
//! # async fn run_example() -> Result<()> {
//! let recipe = Recipe::from_file("path/to/recipe.json")?;
//! let catalog = StaticCatalog::from_file("path/to/catalog.json")?;
//! let session = Session::new(catalog);
//!
//! let preview = recipe.replay(&session).await?;
//! println!("{}", preview);
//! # Ok(())
//! # }
//! ```

// Builder and session
pub use crate::builder::{
    Applied, FieldEditor, FieldValue, Form, FormKind, FormRow, FormSubmission, FunctionCandidate,
    ParameterCandidate, RuleBuilder, Stage,
};
pub use crate::session::Session;

// AST types
pub use crate::ast::{
    Action, BooleanExpression, ClassDef, ComparisonOp, FunctionDef, Program, Stream, Table, Type,
    Value,
};

// Catalog, grammar and configuration
pub use crate::catalog::{Catalog, DeviceSummary, StaticCatalog, ThingpediaClient};
pub use crate::config::BuilderConfig;
pub use crate::grammar::{parse_class, parse_classes};
pub use crate::recipe::Recipe;

// Error types
pub use crate::error::{BuilderError, CatalogError, ParseError, RecipeError, SessionError};

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
