use serde::{Deserialize, Serialize};
use std::fmt;

/// A location literal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Location {
    /// A named location resolved from the user's context (`home`, `work`,
    /// `current_location`).
    Relative(String),
    Absolute {
        lat: f64,
        lon: f64,
        display: Option<String>,
    },
}

/// Literal values and variable references that can appear as parameter
/// values and on the right-hand side of filters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    String(String),
    Number(f64),
    Boolean(bool),
    Enum(String),
    Location(Location),
    Entity {
        value: String,
        kind: String,
        display: Option<String>,
    },
    /// Reference to an output parameter of an upstream stage.
    VarRef(String),
}

impl Value {
    pub fn is_var_ref(&self) -> bool {
        matches!(self, Value::VarRef(_))
    }
}

fn quote(s: &str) -> String {
    serde_json::to_string(s).unwrap_or_else(|_| format!("\"{}\"", s))
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => write!(f, "{}", quote(s)),
            Value::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 9_007_199_254_740_992.0 {
                    write!(f, "{}", *n as i64)
                } else {
                    write!(f, "{}", n)
                }
            }
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Enum(e) => write!(f, "enum({})", e),
            Value::Location(Location::Relative(name)) => write!(f, "$context.location.{}", name),
            Value::Location(Location::Absolute { lat, lon, display }) => match display {
                Some(d) => write!(f, "new Location({}, {}, {})", lat, lon, quote(d)),
                None => write!(f, "new Location({}, {})", lat, lon),
            },
            Value::Entity {
                value,
                kind,
                display,
            } => match display {
                Some(d) => write!(f, "{}^^{}({})", quote(value), kind, quote(d)),
                None => write!(f, "{}^^{}", quote(value), kind),
            },
            Value::VarRef(name) => write!(f, "{}", name),
        }
    }
}
