use super::Type;
use ahash::AHashMap;
use serde::{Deserialize, Serialize};

/// How an argument flows through a function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArgDirection {
    InReq,
    InOpt,
    Out,
}

/// A literal attached to a class, function or argument through `#[...]` or
/// `#_[...]` annotations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AnnotationValue {
    String(String),
    Number { value: f64, unit: Option<String> },
    Boolean(bool),
    Ident(String),
    Array(Vec<AnnotationValue>),
    Object(Vec<(String, AnnotationValue)>),
}

impl AnnotationValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AnnotationValue::String(s) | AnnotationValue::Ident(s) => Some(s),
            _ => None,
        }
    }
}

pub type Annotations = AHashMap<String, AnnotationValue>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArgumentDef {
    pub name: String,
    pub ty: Type,
    pub direction: ArgDirection,
    #[serde(default)]
    pub annotations: Annotations,
}

impl ArgumentDef {
    pub fn is_input(&self) -> bool {
        !matches!(self.direction, ArgDirection::Out)
    }

    pub fn is_required(&self) -> bool {
        matches!(self.direction, ArgDirection::InReq)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FunctionKind {
    Query,
    Action,
}

/// Signature of a device function, as declared in its class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDef {
    pub kind: FunctionKind,
    pub name: String,
    pub args: Vec<ArgumentDef>,
    pub is_list: bool,
    pub is_monitorable: bool,
    #[serde(default)]
    pub annotations: Annotations,
}

impl FunctionDef {
    pub fn input_arguments(&self) -> impl Iterator<Item = &ArgumentDef> {
        self.args.iter().filter(|a| a.is_input())
    }

    pub fn output_arguments(&self) -> impl Iterator<Item = &ArgumentDef> {
        self.args.iter().filter(|a| !a.is_input())
    }

    pub fn argument(&self, name: &str) -> Option<&ArgumentDef> {
        self.args.iter().find(|a| a.name == name)
    }

    /// The `canonical` annotation, falling back to the function name.
    pub fn canonical(&self) -> &str {
        self.annotations
            .get("canonical")
            .and_then(AnnotationValue::as_str)
            .unwrap_or(&self.name)
    }
}

/// A device class: the unit returned by the catalog's device-code lookup.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ClassDef {
    pub kind: String,
    pub extends: Vec<String>,
    /// Kinds of the mixins imported by the class (`import loader from @x()`).
    pub imports: Vec<String>,
    pub queries: Vec<FunctionDef>,
    pub actions: Vec<FunctionDef>,
    #[serde(default)]
    pub annotations: Annotations,
}

impl ClassDef {
    pub fn query(&self, name: &str) -> Option<&FunctionDef> {
        self.queries.iter().find(|f| f.name == name)
    }

    pub fn action(&self, name: &str) -> Option<&FunctionDef> {
        self.actions.iter().find(|f| f.name == name)
    }
}
