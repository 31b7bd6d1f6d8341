use crate::ast::ComparisonOp;
use crate::builder::{FieldValue, FormSubmission, Stage};
use crate::error::RecipeError;
use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::fs;

/// Prefix marking an input value as "use the upstream output of this name".
pub const UPSTREAM_PREFIX: char = '@';

/// A declarative description of a rule, stage by stage.
///
/// ```json
/// {
///   "stream": { "kind": "org.weather", "function": "current",
///               "inputs": { "location": "$home" },
///               "filters": [ { "name": "temperature", "op": ">=", "value": "30" } ] },
///   "action": { "kind": "com.twitter", "function": "post",
///               "inputs": { "status": "@summary" } }
/// }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Recipe {
    #[serde(default)]
    pub stream: Option<StageRecipe>,
    #[serde(default)]
    pub query: Option<StageRecipe>,
    #[serde(default)]
    pub action: Option<StageRecipe>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageRecipe {
    pub kind: String,
    pub function: String,
    #[serde(default)]
    pub inputs: AHashMap<String, String>,
    #[serde(default)]
    pub filters: Vec<FilterRecipe>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterRecipe {
    pub name: String,
    /// Operator symbol or form label; the row's default when absent.
    #[serde(default)]
    pub op: Option<String>,
    pub value: String,
}

impl Recipe {
    pub fn from_json(json: &str) -> Result<Self, RecipeError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: &str) -> Result<Self, RecipeError> {
        let content = fs::read_to_string(path).map_err(|e| RecipeError::Io {
            path: path.to_string(),
            message: e.to_string(),
        })?;
        Self::from_json(&content)
    }

    /// The stages present in the recipe, in pipeline order.
    pub fn stages(&self) -> impl Iterator<Item = (Stage, &StageRecipe)> {
        [
            (Stage::Stream, self.stream.as_ref()),
            (Stage::Query, self.query.as_ref()),
            (Stage::Action, self.action.as_ref()),
        ]
        .into_iter()
        .filter_map(|(stage, recipe)| recipe.map(|r| (stage, r)))
    }
}

impl StageRecipe {
    /// The input dialog submission this stage describes.
    pub fn input_submission(&self) -> FormSubmission {
        self.inputs
            .iter()
            .fold(FormSubmission::new(), |submission, (name, raw)| {
                match raw.strip_prefix(UPSTREAM_PREFIX) {
                    Some(output) => submission.upstream(name, output),
                    None => submission.value(name, raw),
                }
            })
    }

    /// The filter dialog submission this stage describes.
    pub fn filter_submission(&self) -> Result<FormSubmission, RecipeError> {
        let mut submission = FormSubmission::new();
        for filter in &self.filters {
            let op = match filter.op.as_deref() {
                Some(symbol) => Some(ComparisonOp::from_symbol(symbol).ok_or_else(|| {
                    RecipeError::UnknownOperator {
                        name: filter.name.clone(),
                        op: symbol.to_string(),
                    }
                })?),
                None => None,
            };
            let (raw, use_upstream) = match filter.value.strip_prefix(UPSTREAM_PREFIX) {
                Some(output) => (output.to_string(), true),
                None => (filter.value.clone(), false),
            };
            submission = submission.field(
                &filter.name,
                FieldValue {
                    raw,
                    use_upstream,
                    op,
                },
            );
        }
        Ok(submission)
    }
}
