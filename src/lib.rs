//! # thingtalk-builder - Form-driven rule builder
//!
//! **thingtalk-builder** assembles small automation rules of the form
//! "when *something happens*, get *some data*, do *something*" from a series
//! of picker and form interactions, and keeps a live textual preview of the
//! resulting program.
//!
//! ## Core Workflow
//!
//! 1.  **Pick a stage**: `start_stage` selects the stream ("when"), query
//!     ("get") or action ("do") slot to edit.
//! 2.  **Find a function**: search the [`Catalog`](catalog::Catalog) for a
//!     device, fetch its class definition and choose one of the functions that
//!     fit the stage.
//! 3.  **Fill parameters**: render the input or filter [`Form`](builder::Form),
//!     let the user fill it, and apply the [`FormSubmission`](builder::FormSubmission).
//!     Outputs of earlier stages are offered as values for later ones.
//! 4.  **Preview**: the three slots are merged into one
//!     [`Program`](ast::Program) and pretty-printed after every edit.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use thingtalk_builder::prelude::*;
//!
//! # async fn run() -> std::result::Result<(), Box<dyn std::error::Error>> {
//! let catalog = StaticCatalog::new().with_device(
//!     "com.xkcd",
//!     "XKCD",
//!     r#"class @com.xkcd {
//!          monitorable query get_comic(in opt number: Number, out title: String)
//!          #_[canonical="get xkcd comic"];
//!        }"#,
//! );
//! let session = Session::new(catalog);
//!
//! session.start_stage(Stage::Stream);
//! session.search_devices("xkcd").await?;
//! session.select_device("com.xkcd").await?;
//! session.select_function("get_comic")?;
//!
//! println!("{}", session.preview());
//! // monitor (@com.xkcd.get_comic()) => notify;
//! # Ok(())
//! # }
//! ```

pub mod ast;
pub mod builder;
pub mod catalog;
pub mod config;
pub mod error;
pub mod grammar;
pub mod prelude;
pub mod recipe;
pub mod session;
