use crate::ast::{FunctionDef, FunctionKind};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the three slots of a when/get/do rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Stream,
    Query,
    Action,
}

impl Stage {
    pub const ALL: [Stage; 3] = [Stage::Stream, Stage::Query, Stage::Action];

    /// Whether `function` can fill this stage. Streams need a monitorable query.
    pub fn accepts(&self, function: &FunctionDef) -> bool {
        match self {
            Stage::Stream => function.kind == FunctionKind::Query && function.is_monitorable,
            Stage::Query => function.kind == FunctionKind::Query,
            Stage::Action => function.kind == FunctionKind::Action,
        }
    }

    /// Human label of `function` when used in this stage.
    pub fn full_canonical(&self, function: &FunctionDef) -> String {
        let canonical = function.canonical();
        if *self == Stage::Action {
            return canonical.to_string();
        }
        let canonical = canonical.strip_prefix("get ").unwrap_or(canonical);
        match self {
            Stage::Query => format!("get {}", canonical),
            _ => format!("when {} changes", canonical),
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Stream => write!(f, "stream"),
            Stage::Query => write!(f, "query"),
            Stage::Action => write!(f, "action"),
        }
    }
}
