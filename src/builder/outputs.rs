use super::Stage;
use crate::ast::{FunctionDef, Type};
use ahash::AHashMap;

/// Output parameters of one stage, grouped by the display form of their type.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OutputCatalog {
    by_type: AHashMap<String, Vec<String>>,
}

impl OutputCatalog {
    /// Builds the catalog from scratch; it is never patched incrementally.
    pub fn from_schema(schema: &FunctionDef) -> Self {
        let mut by_type: AHashMap<String, Vec<String>> = AHashMap::new();
        for arg in schema.output_arguments() {
            let names = by_type.entry(arg.ty.to_string()).or_default();
            if !names.contains(&arg.name) {
                names.push(arg.name.clone());
            }
        }
        Self { by_type }
    }

    /// Output names of type `ty`, in declaration order.
    pub fn names_of(&self, ty: &Type) -> &[String] {
        self.by_type
            .get(&ty.to_string())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// An upstream output offered as the value of a downstream parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterCandidate {
    pub name: String,
    pub label: String,
    pub source: Stage,
}

impl ParameterCandidate {
    pub fn new(name: &str, source: Stage, source_canonical: &str) -> Self {
        Self {
            name: name.to_string(),
            label: format!("Use {} from {}", name, source_canonical),
            source,
        }
    }
}
