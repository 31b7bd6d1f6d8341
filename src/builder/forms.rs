//! UI-agnostic description of the input and filter dialogs.
//!
//! The builder describes what to show ([`Form`]) and reads back what the
//! user typed ([`FormSubmission`]); rendering is left to the front end.
use super::{ParameterCandidate, Stage};
use crate::ast::{ArgumentDef, ComparisonOp, Type, ValueKind};

pub const UNSUPPORTED_PLACEHOLDER: &str = "Not supported type";
pub const TYPE_YOUR_OWN: &str = "Type your own";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormKind {
    Input,
    Filter,
}

impl FormKind {
    fn id_prefix(&self) -> &'static str {
        match self {
            FormKind::Input => "thingtalk-input-value",
            FormKind::Filter => "thingtalk-filter-value",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    pub label: String,
    pub value: String,
}

impl SelectOption {
    fn same(text: &str) -> Self {
        Self {
            label: text.to_string(),
            value: text.to_string(),
        }
    }
}

/// Value editor of one form row.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldEditor {
    /// Free text, with no upstream value to offer.
    Text { id: String },
    /// Free text plus a dropdown of upstream values and a
    /// [`TYPE_YOUR_OWN`] entry that re-enables typing.
    Combo {
        id: String,
        candidates: Vec<ParameterCandidate>,
    },
    /// Fixed options followed by the upstream values.
    Select {
        id: String,
        options: Vec<SelectOption>,
        candidates: Vec<ParameterCandidate>,
    },
    /// Disabled control; it never yields a value.
    Unsupported { id: String, type_name: String },
}

impl FieldEditor {
    /// Picks the editor for a parameter of type `ty`.
    pub fn for_type(ty: &Type, candidates: Vec<ParameterCandidate>, id: String) -> Self {
        let options = match ty.kind() {
            ValueKind::String | ValueKind::Number | ValueKind::Entity => {
                return if candidates.is_empty() {
                    FieldEditor::Text { id }
                } else {
                    FieldEditor::Combo { id, candidates }
                };
            }
            ValueKind::Enum => ty.enum_entries().iter().map(|e| SelectOption::same(e)).collect(),
            ValueKind::Location => vec![
                SelectOption {
                    label: "home".to_string(),
                    value: "$home".to_string(),
                },
                SelectOption {
                    label: "work".to_string(),
                    value: "$work".to_string(),
                },
                SelectOption {
                    label: "here".to_string(),
                    value: "$current_location".to_string(),
                },
            ],
            ValueKind::Boolean => vec![SelectOption::same("true"), SelectOption::same("false")],
            ValueKind::Unsupported => {
                return FieldEditor::Unsupported {
                    id,
                    type_name: ty.to_string(),
                };
            }
        };
        FieldEditor::Select {
            id,
            options,
            candidates,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            FieldEditor::Text { id }
            | FieldEditor::Combo { id, .. }
            | FieldEditor::Select { id, .. }
            | FieldEditor::Unsupported { id, .. } => id,
        }
    }

    pub fn candidates(&self) -> &[ParameterCandidate] {
        match self {
            FieldEditor::Combo { candidates, .. } | FieldEditor::Select { candidates, .. } => {
                candidates
            }
            FieldEditor::Text { .. } | FieldEditor::Unsupported { .. } => &[],
        }
    }

    pub fn is_enabled(&self) -> bool {
        !matches!(self, FieldEditor::Unsupported { .. })
    }
}

/// Comparison operators offered for a filter on a parameter of type `ty`.
/// The first one is the default.
pub fn filter_operators(ty: &Type) -> Vec<ComparisonOp> {
    match ty.kind() {
        ValueKind::Number => vec![
            ComparisonOp::Equal,
            ComparisonOp::GreaterThanOrEqual,
            ComparisonOp::SmallerThanOrEqual,
        ],
        ValueKind::String => vec![ComparisonOp::Contains],
        _ => vec![ComparisonOp::Equal],
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FormRow {
    pub name: String,
    pub ty: Type,
    /// Empty for input rows, which always read `=`.
    pub operators: Vec<ComparisonOp>,
    pub editor: FieldEditor,
}

impl FormRow {
    pub(super) fn new(
        kind: FormKind,
        arg: &ArgumentDef,
        candidates: Vec<ParameterCandidate>,
    ) -> Self {
        let id = format!("{}-{}", kind.id_prefix(), arg.name);
        let operators = match kind {
            FormKind::Input => Vec::new(),
            FormKind::Filter => filter_operators(&arg.ty),
        };
        Self {
            name: arg.name.clone(),
            ty: arg.ty.clone(),
            operators,
            editor: FieldEditor::for_type(&arg.ty, candidates, id),
        }
    }

    pub fn operator_labels(&self) -> Vec<&'static str> {
        if self.operators.is_empty() {
            vec!["="]
        } else {
            self.operators.iter().map(ComparisonOp::label).collect()
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Form {
    pub stage: Stage,
    pub kind: FormKind,
    pub rows: Vec<FormRow>,
}

impl Form {
    pub fn row(&self, name: &str) -> Option<&FormRow> {
        self.rows.iter().find(|r| r.name == name)
    }
}

/// What the user entered in one field.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FieldValue {
    pub raw: String,
    /// Set when the value was picked from the upstream candidates; `raw` is
    /// then the upstream parameter name.
    pub use_upstream: bool,
    /// Chosen filter operator; `None` means the row's default.
    pub op: Option<ComparisonOp>,
}

impl FieldValue {
    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }
}

/// Field values of a submitted form, keyed by parameter name.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FormSubmission {
    fields: Vec<(String, FieldValue)>,
}

impl FormSubmission {
    pub fn new() -> Self {
        Self::default()
    }

    /// A typed-in value.
    pub fn value(self, name: &str, raw: &str) -> Self {
        self.field(
            name,
            FieldValue {
                raw: raw.to_string(),
                ..FieldValue::default()
            },
        )
    }

    /// An upstream output chosen from the candidates.
    pub fn upstream(self, name: &str, output: &str) -> Self {
        self.field(
            name,
            FieldValue {
                raw: output.to_string(),
                use_upstream: true,
                op: None,
            },
        )
    }

    /// A typed-in filter value with an explicit operator.
    pub fn filter(self, name: &str, op: ComparisonOp, raw: &str) -> Self {
        self.field(
            name,
            FieldValue {
                raw: raw.to_string(),
                use_upstream: false,
                op: Some(op),
            },
        )
    }

    /// Sets a field, replacing any earlier value for the same name.
    pub fn field(mut self, name: &str, value: FieldValue) -> Self {
        self.fields.retain(|(n, _)| n != name);
        self.fields.push((name.to_string(), value));
        self
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.iter().all(|(_, v)| v.is_empty())
    }
}
