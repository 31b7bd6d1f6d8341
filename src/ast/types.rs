use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Declared type of a function argument.
///
/// The set is closed: adding a type means touching every exhaustive match
/// over it, in particular [`Type::kind`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Type {
    String,
    Number,
    Boolean,
    Enum(Vec<String>),
    Location,
    /// Entity type name, e.g. `tt:url`.
    Entity(String),
    /// Measure with its base unit, e.g. `C` or `byte`.
    Measure(String),
    Date,
    Time,
    Currency,
    Array(Box<Type>),
    Any,
}

/// Kinds of values the forms know how to edit and resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    String,
    Number,
    Enum,
    Location,
    Boolean,
    Entity,
    Unsupported,
}

impl Type {
    pub fn kind(&self) -> ValueKind {
        match self {
            Type::String => ValueKind::String,
            Type::Number => ValueKind::Number,
            Type::Boolean => ValueKind::Boolean,
            Type::Enum(_) => ValueKind::Enum,
            Type::Location => ValueKind::Location,
            Type::Entity(_) => ValueKind::Entity,
            Type::Measure(_)
            | Type::Date
            | Type::Time
            | Type::Currency
            | Type::Array(_)
            | Type::Any => ValueKind::Unsupported,
        }
    }

    /// Entries of an enum type; empty for every other type.
    pub fn enum_entries(&self) -> &[String] {
        match self {
            Type::Enum(entries) => entries,
            _ => &[],
        }
    }

    /// Resolves a type name with optional parenthesized arguments, as written
    /// in class definitions.
    pub fn from_parts(name: &str, args: Vec<String>, element: Option<Type>) -> Option<Type> {
        let ty = match name {
            "String" => Type::String,
            "Number" => Type::Number,
            "Boolean" => Type::Boolean,
            "Location" => Type::Location,
            "Date" => Type::Date,
            "Time" => Type::Time,
            "Currency" => Type::Currency,
            "Any" => Type::Any,
            "Enum" => Type::Enum(args),
            "Entity" => Type::Entity(args.into_iter().next()?),
            "Measure" => Type::Measure(args.into_iter().next()?),
            "Array" => Type::Array(Box::new(element?)),
            _ => return None,
        };
        Some(ty)
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::String => write!(f, "String"),
            Type::Number => write!(f, "Number"),
            Type::Boolean => write!(f, "Boolean"),
            Type::Enum(entries) => write!(f, "Enum({})", entries.iter().join(",")),
            Type::Location => write!(f, "Location"),
            Type::Entity(name) => write!(f, "Entity({})", name),
            Type::Measure(unit) => write!(f, "Measure({})", unit),
            Type::Date => write!(f, "Date"),
            Type::Time => write!(f, "Time"),
            Type::Currency => write!(f, "Currency"),
            Type::Array(elem) => write!(f, "Array({})", elem),
            Type::Any => write!(f, "Any"),
        }
    }
}
