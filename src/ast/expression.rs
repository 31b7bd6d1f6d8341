use super::Value;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Defines the comparison operators together with their rule-language symbol
/// and the label shown in filter forms.
macro_rules! define_comparison_ops {
    ( $( ($variant:ident, $symbol:expr, $label:expr) ),* $(,)? ) => {
        /// Comparison operator of a filter atom.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum ComparisonOp {
            $( $variant, )*
        }

        impl ComparisonOp {
            pub fn symbol(&self) -> &'static str {
                match self {
                    $( ComparisonOp::$variant => $symbol, )*
                }
            }

            pub fn label(&self) -> &'static str {
                match self {
                    $( ComparisonOp::$variant => $label, )*
                }
            }

            /// Accepts either the symbol or the form label.
            pub fn from_symbol(s: &str) -> Option<Self> {
                $(
                    if s == $symbol || s == $label {
                        return Some(ComparisonOp::$variant);
                    }
                )*
                None
            }
        }
    };
}

define_comparison_ops! {
    (Equal, "==", "=="),
    (GreaterThanOrEqual, ">=", ">="),
    (SmallerThanOrEqual, "<=", "<="),
    (Contains, "=~", "contains"),
}

impl fmt::Display for ComparisonOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Boolean predicate used by edge filters and row filters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BooleanExpression {
    True,
    Atom {
        name: String,
        op: ComparisonOp,
        value: Value,
    },
    And(Vec<BooleanExpression>),
    Or(Vec<BooleanExpression>),
    Not(Box<BooleanExpression>),
}

impl BooleanExpression {
    pub fn atom(name: impl Into<String>, op: ComparisonOp, value: Value) -> Self {
        BooleanExpression::Atom {
            name: name.into(),
            op,
            value,
        }
    }

    /// Combines predicates: nothing for an empty list, the atom itself for a
    /// single one, a conjunction in the given order otherwise.
    pub fn conjunction(mut atoms: Vec<BooleanExpression>) -> Option<Self> {
        match atoms.len() {
            0 => None,
            1 => atoms.pop(),
            _ => Some(BooleanExpression::And(atoms)),
        }
    }
}

impl fmt::Display for BooleanExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BooleanExpression::True => write!(f, "true"),
            BooleanExpression::Atom { name, op, value } => write!(f, "{} {} {}", name, op, value),
            BooleanExpression::And(children) => {
                write!(f, "({})", children.iter().join(" && "))
            }
            BooleanExpression::Or(children) => {
                write!(f, "({})", children.iter().join(" || "))
            }
            BooleanExpression::Not(child) => write!(f, "!({})", child),
        }
    }
}
