use crate::builder::Stage;
use crate::grammar::Rule;
use thiserror::Error;

/// Errors raised by the rule builder while editing a stage.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BuilderError {
    #[error("No stage is being edited")]
    NoActiveStage,

    #[error("No function has been selected for the {0} stage")]
    NoFunctionSelected(Stage),

    #[error("No device has been chosen in the function picker")]
    NoDeviceSelected,

    #[error("Device '{kind}' has no function '{function}' usable in the {stage} stage")]
    UnknownFunction {
        kind: String,
        function: String,
        stage: Stage,
    },

    #[error("Parameter '{name}' has a type that is not supported: {type_name}")]
    UnsupportedType { name: String, type_name: String },

    #[error("Parameter '{name}' expects a number, but got '{raw}'")]
    InvalidNumber { name: String, raw: String },

    #[error("Parameter '{name}' expects one of [{entries}], but got '{raw}'")]
    InvalidEnum {
        name: String,
        raw: String,
        entries: String,
    },

    #[error("Parameter '{name}' expects a location like '$home', but got '{raw}'")]
    UnsupportedLocation { name: String, raw: String },

    #[error("The {0} stage cannot be filtered")]
    NotFilterable(Stage),

    #[error("Operator '{op}' is not valid for parameter '{name}'")]
    UnknownOperator { name: String, op: String },
}

/// Errors raised while parsing a device class definition.
#[derive(Error, Debug, Clone)]
pub enum ParseError {
    #[error("Syntax error in class definition: {0}")]
    Syntax(#[from] Box<pest::error::Error<Rule>>),

    #[error("Unknown type '{0}'")]
    UnknownType(String),

    #[error("Invalid number literal '{0}'")]
    InvalidNumber(String),

    #[error("Expected exactly one class definition, found {0}")]
    ClassCount(usize),
}

impl From<pest::error::Error<Rule>> for ParseError {
    fn from(err: pest::error::Error<Rule>) -> Self {
        ParseError::Syntax(Box::new(err))
    }
}

/// Errors raised by catalog lookups.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Catalog request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Catalog returned status {status} for '{url}'")]
    Status { status: u16, url: String },

    #[error("Failed to decode catalog data: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Device '{0}' is not in the catalog")]
    UnknownDevice(String),

    #[error("Could not read catalog file '{path}': {message}")]
    Io { path: String, message: String },
}

/// Errors surfaced by a [`Session`](crate::session::Session) operation.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    Builder(#[from] BuilderError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// Errors raised while loading or replaying a rule recipe.
#[derive(Error, Debug)]
pub enum RecipeError {
    #[error("Failed to parse recipe JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Could not read recipe file '{path}': {message}")]
    Io { path: String, message: String },

    #[error("Filter on '{name}' uses unknown operator '{op}'")]
    UnknownOperator { name: String, op: String },

    #[error("Lookup of device '{0}' was superseded")]
    Superseded(String),

    #[error(transparent)]
    Session(#[from] SessionError),
}
