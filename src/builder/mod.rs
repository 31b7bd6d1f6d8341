//! The rule builder: three stage slots, their forms, and the merged preview.
//!
//! A [`RuleBuilder`] holds the current selection for the stream ("when"),
//! query ("get") and action ("do") stages. Every edit re-derives two things:
//! the merged program text, and the output catalogs that later stages draw
//! parameter-passing candidates from.
//!
//! The builder is synchronous. Network work lives in
//! [`Session`](crate::session::Session), which brackets every catalog call
//! with a [`Ticket`] so that a completion is only applied if no newer
//! request or stage change happened in the meantime.
use crate::ast::{
    Action, BooleanExpression, ClassDef, ComparisonOp, FunctionDef, InputParam, Invocation,
    Program, Stream, Table, Type,
};
use crate::catalog::DeviceSummary;
use crate::error::BuilderError;
use tracing::{debug, warn};

mod assembly;
mod forms;
mod outputs;
mod resolve;
mod stage;

pub use assembly::NOTHING_SELECTED;
pub use forms::{
    FieldEditor, FieldValue, Form, FormKind, FormRow, FormSubmission, SelectOption,
    TYPE_YOUR_OWN, UNSUPPORTED_PLACEHOLDER, filter_operators,
};
pub use outputs::{OutputCatalog, ParameterCandidate};
pub use resolve::{LOCATION_MARKER, resolve_value};
pub use stage::Stage;

pub const NO_DEVICE_FOUND: &str = "No device found";
pub const DEVICES_FOUND: &str = "Do you mean?";
pub const NO_COMPATIBLE_FUNCTION: &str = "No compatible example found for this device.";
pub const CHOOSE_FUNCTION: &str = "Choose the function you want to use:";

/// Request generation captured before an asynchronous lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticket(u64);

/// Outcome of applying an asynchronous completion.
#[derive(Debug, Clone, PartialEq)]
pub enum Applied<T> {
    Current(T),
    /// A newer request or a stage change made this completion stale; the
    /// builder state was left untouched.
    Superseded,
}

impl<T> Applied<T> {
    pub fn is_current(&self) -> bool {
        matches!(self, Applied::Current(_))
    }

    pub fn current(self) -> Option<T> {
        match self {
            Applied::Current(value) => Some(value),
            Applied::Superseded => None,
        }
    }
}

/// A function offered by the function picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionCandidate {
    pub name: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq)]
struct Slot<T> {
    node: T,
    canonical: String,
}

#[derive(Debug, Default)]
pub struct RuleBuilder {
    stream: Option<Slot<Stream>>,
    query: Option<Slot<Table>>,
    action: Option<Slot<Action>>,

    stream_output: OutputCatalog,
    query_output: OutputCatalog,

    current: Option<Stage>,
    generation: u64,

    device_candidates: Vec<DeviceSummary>,
    device_hint: Option<&'static str>,
    selected_class: Option<ClassDef>,
    function_candidates: Vec<FunctionCandidate>,
    function_hint: Option<&'static str>,

    preview: String,
}

impl RuleBuilder {
    pub fn new() -> Self {
        Self {
            preview: NOTHING_SELECTED.to_string(),
            ..Self::default()
        }
    }

    // --- Stage lifecycle ---

    /// Makes `stage` the one being edited and clears the picker's transient
    /// candidate lists. Outstanding lookups become stale.
    pub fn start_stage(&mut self, stage: Stage) {
        debug!(%stage, "start stage");
        self.current = Some(stage);
        self.generation += 1;
        self.reset_device_candidates();
        self.reset_function_candidates();
    }

    pub fn current_stage(&self) -> Result<Stage, BuilderError> {
        self.current.ok_or(BuilderError::NoActiveStage)
    }

    /// Drops the selection of `stage` together with its output catalog.
    pub fn clear_stage(&mut self, stage: Stage) {
        debug!(%stage, "clear stage");
        match stage {
            Stage::Stream => {
                self.stream = None;
                self.stream_output = OutputCatalog::default();
            }
            Stage::Query => {
                self.query = None;
                self.query_output = OutputCatalog::default();
            }
            Stage::Action => self.action = None,
        }
        self.render_preview();
    }

    // --- Request generations ---

    /// Starts a new lookup, invalidating every earlier ticket.
    pub fn begin_request(&mut self) -> Ticket {
        self.generation += 1;
        Ticket(self.generation)
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        ticket.0 == self.generation
    }

    // --- Device and function pickers ---

    /// Shows the result of a device search started with `ticket`.
    pub fn show_devices(
        &mut self,
        ticket: Ticket,
        devices: Vec<DeviceSummary>,
    ) -> Applied<Vec<DeviceSummary>> {
        if !self.is_current(ticket) {
            warn!(count = devices.len(), "dropping superseded device search result");
            return Applied::Superseded;
        }
        self.reset_device_candidates();
        self.reset_function_candidates();
        self.device_hint = Some(if devices.is_empty() {
            NO_DEVICE_FOUND
        } else {
            DEVICES_FOUND
        });
        debug!(count = devices.len(), "device candidates");
        self.device_candidates = devices.clone();
        Applied::Current(devices)
    }

    /// Shows the functions of a device class fetched with `ticket`.
    pub fn show_functions(
        &mut self,
        ticket: Ticket,
        class: ClassDef,
    ) -> Result<Applied<Vec<FunctionCandidate>>, BuilderError> {
        if !self.is_current(ticket) {
            warn!(kind = %class.kind, "dropping superseded device class");
            return Ok(Applied::Superseded);
        }
        self.select_device(class).map(Applied::Current)
    }

    /// Lists the functions of `class` that fit the current stage.
    pub fn select_device(
        &mut self,
        class: ClassDef,
    ) -> Result<Vec<FunctionCandidate>, BuilderError> {
        let stage = self.current_stage()?;
        self.reset_function_candidates();

        let functions = match stage {
            Stage::Action => &class.actions,
            Stage::Stream | Stage::Query => &class.queries,
        };
        let candidates: Vec<FunctionCandidate> = functions
            .iter()
            .filter(|f| stage.accepts(f))
            .map(|f| FunctionCandidate {
                name: f.name.clone(),
                label: stage.full_canonical(f),
            })
            .collect();

        self.function_hint = Some(if candidates.is_empty() {
            NO_COMPATIBLE_FUNCTION
        } else {
            CHOOSE_FUNCTION
        });
        debug!(kind = %class.kind, %stage, count = candidates.len(), "function candidates");
        self.function_candidates = candidates.clone();
        self.selected_class = Some(class);
        Ok(candidates)
    }

    /// Selects `function` from the class last shown by the function picker.
    pub fn choose_function(&mut self, function: &str) -> Result<(), BuilderError> {
        let class = self
            .selected_class
            .take()
            .ok_or(BuilderError::NoDeviceSelected)?;
        let result = self.select_function(&class, function);
        if result.is_err() {
            self.selected_class = Some(class);
        }
        result
    }

    /// Fills the current stage with `function` of `class`, recomputes that
    /// stage's output catalog and the preview, then closes the picker.
    pub fn select_function(&mut self, class: &ClassDef, function: &str) -> Result<(), BuilderError> {
        let stage = self.current_stage()?;
        let schema = match stage {
            Stage::Action => class.action(function),
            Stage::Stream | Stage::Query => class.query(function),
        }
        .filter(|f| stage.accepts(f))
        .ok_or_else(|| BuilderError::UnknownFunction {
            kind: class.kind.clone(),
            function: function.to_string(),
            stage,
        })?;

        let canonical = stage.full_canonical(schema);
        let invocation = Invocation::new(&class.kind, schema.clone());
        debug!(%stage, kind = %class.kind, function, "function selected");

        match stage {
            Stage::Stream => {
                self.stream_output = OutputCatalog::from_schema(schema);
                self.stream = Some(Slot {
                    node: Stream::Monitor(Table::Invocation(invocation)),
                    canonical,
                });
            }
            Stage::Query => {
                self.query_output = OutputCatalog::from_schema(schema);
                self.query = Some(Slot {
                    node: Table::Invocation(invocation),
                    canonical,
                });
            }
            Stage::Action => {
                self.action = Some(Slot {
                    node: Action::Invocation(invocation),
                    canonical,
                });
            }
        }

        self.render_preview();
        self.reset_device_candidates();
        self.reset_function_candidates();
        Ok(())
    }

    // --- Input parameters ---

    /// One row per input parameter of the current stage's function.
    pub fn render_input_form(&self) -> Result<Form, BuilderError> {
        let stage = self.current_stage()?;
        let schema = self.schema_of(stage)?;
        let rows = schema
            .input_arguments()
            .map(|arg| {
                FormRow::new(
                    FormKind::Input,
                    arg,
                    self.parameter_passing_candidates(&arg.ty),
                )
            })
            .collect();
        Ok(Form {
            stage,
            kind: FormKind::Input,
            rows,
        })
    }

    /// Replaces the parameters of the current stage's invocation with the
    /// non-empty fields of `submission`. Returns `false`, leaving the
    /// invocation untouched, when no field was filled.
    pub fn apply_input_values(&mut self, submission: &FormSubmission) -> Result<bool, BuilderError> {
        let stage = self.current_stage()?;
        let schema = self.schema_of(stage)?;

        let mut params = Vec::new();
        for arg in schema.input_arguments() {
            let Some(field) = submission.get(&arg.name).filter(|f| !f.is_empty()) else {
                continue;
            };
            let value = resolve_value(&arg.name, &arg.ty, &field.raw, field.use_upstream)?;
            params.push(InputParam {
                name: arg.name.clone(),
                value,
            });
        }

        if params.is_empty() {
            debug!(%stage, "no input values provided");
            return Ok(false);
        }
        debug!(%stage, count = params.len(), "input values applied");
        self.invocation_mut(stage)?.in_params = params;
        self.render_preview();
        Ok(true)
    }

    // --- Filters ---

    /// One row per output parameter of the current stage's function.
    pub fn render_filter_form(&self) -> Result<Form, BuilderError> {
        let stage = self.filterable_stage()?;
        let schema = self.schema_of(stage)?;
        let rows = schema
            .output_arguments()
            .map(|arg| {
                FormRow::new(
                    FormKind::Filter,
                    arg,
                    self.parameter_passing_candidates(&arg.ty),
                )
            })
            .collect();
        Ok(Form {
            stage,
            kind: FormKind::Filter,
            rows,
        })
    }

    /// Builds a predicate from the non-empty fields of `submission`, in form
    /// order, and attaches it to the current stage: as an edge filter on a
    /// stream, as a row filter on a query. Returns the attached predicate.
    pub fn apply_filters(
        &mut self,
        submission: &FormSubmission,
    ) -> Result<Option<BooleanExpression>, BuilderError> {
        let stage = self.filterable_stage()?;
        let schema = self.schema_of(stage)?;

        let mut atoms = Vec::new();
        for arg in schema.output_arguments() {
            let Some(field) = submission.get(&arg.name).filter(|f| !f.is_empty()) else {
                continue;
            };
            let allowed = filter_operators(&arg.ty);
            let op = match field.op {
                Some(op) if allowed.contains(&op) => op,
                Some(op) => {
                    return Err(BuilderError::UnknownOperator {
                        name: arg.name.clone(),
                        op: op.symbol().to_string(),
                    });
                }
                None => allowed.first().copied().unwrap_or(ComparisonOp::Equal),
            };
            let value = resolve_value(&arg.name, &arg.ty, &field.raw, field.use_upstream)?;
            atoms.push(BooleanExpression::atom(arg.name.clone(), op, value));
        }

        let filter = BooleanExpression::conjunction(atoms);
        if let Some(filter) = &filter {
            debug!(%stage, %filter, "filter applied");
            match stage {
                Stage::Stream => {
                    self.stream = self.stream.take().map(|slot| Slot {
                        node: Stream::EdgeFilter {
                            stream: Box::new(slot.node),
                            filter: filter.clone(),
                        },
                        canonical: slot.canonical,
                    });
                }
                Stage::Query => {
                    self.query = self.query.take().map(|slot| Slot {
                        node: Table::Filter {
                            table: Box::new(slot.node),
                            filter: filter.clone(),
                        },
                        canonical: slot.canonical,
                    });
                }
                Stage::Action => {}
            }
        }
        self.render_preview();
        Ok(filter)
    }

    // --- Parameter passing ---

    /// Upstream outputs of type `ty` usable by the current stage.
    ///
    /// The stream offers nothing (it always comes first). The query sees the
    /// stream's outputs. The action sees the query's outputs, then the
    /// stream's, with query names winning on collision.
    pub fn parameter_passing_candidates(&self, ty: &Type) -> Vec<ParameterCandidate> {
        let mut candidates: Vec<ParameterCandidate> = Vec::new();
        let upstream: &[Stage] = match self.current {
            Some(Stage::Query) => &[Stage::Stream],
            Some(Stage::Action) => &[Stage::Query, Stage::Stream],
            Some(Stage::Stream) | None => &[],
        };

        for &source in upstream {
            let Some(canonical) = self.canonical(source) else {
                continue;
            };
            let Some(outputs) = self.outputs(source) else {
                continue;
            };
            for name in outputs.names_of(ty) {
                if candidates.iter().all(|c| &c.name != name) {
                    candidates.push(ParameterCandidate::new(name, source, canonical));
                }
            }
        }
        candidates
    }

    // --- Preview ---

    /// Merges the selected stages into one program, or `None` if nothing is
    /// selected yet.
    pub fn build_program(&self) -> Option<Program> {
        assembly::assemble(
            self.stream.as_ref().map(|s| &s.node),
            self.query.as_ref().map(|s| &s.node),
            self.action.as_ref().map(|s| &s.node),
        )
    }

    /// Recomputes the preview text of the merged program.
    pub fn render_preview(&mut self) -> &str {
        self.preview = match self.build_program() {
            Some(program) => program.prettyprint(),
            None => NOTHING_SELECTED.to_string(),
        };
        &self.preview
    }

    /// The preview as of the last edit.
    pub fn preview(&self) -> &str {
        &self.preview
    }

    /// Text of a single stage's clause, empty if the stage is not set.
    pub fn component_preview(&self, stage: Stage) -> String {
        match stage {
            Stage::Stream => self.stream.as_ref().map(|s| s.node.to_string()),
            Stage::Query => self.query.as_ref().map(|s| s.node.to_string()),
            Stage::Action => self.action.as_ref().map(|s| s.node.to_string()),
        }
        .unwrap_or_default()
    }

    // --- Accessors ---

    pub fn stream(&self) -> Option<&Stream> {
        self.stream.as_ref().map(|s| &s.node)
    }

    pub fn query(&self) -> Option<&Table> {
        self.query.as_ref().map(|s| &s.node)
    }

    pub fn action(&self) -> Option<&Action> {
        self.action.as_ref().map(|s| &s.node)
    }

    /// Label of the function selected for `stage`.
    pub fn canonical(&self, stage: Stage) -> Option<&str> {
        match stage {
            Stage::Stream => self.stream.as_ref().map(|s| s.canonical.as_str()),
            Stage::Query => self.query.as_ref().map(|s| s.canonical.as_str()),
            Stage::Action => self.action.as_ref().map(|s| s.canonical.as_str()),
        }
    }

    /// Output catalog of `stage`; `None` for the action stage, which feeds
    /// nothing downstream.
    pub fn outputs(&self, stage: Stage) -> Option<&OutputCatalog> {
        match stage {
            Stage::Stream => Some(&self.stream_output),
            Stage::Query => Some(&self.query_output),
            Stage::Action => None,
        }
    }

    pub fn device_candidates(&self) -> &[DeviceSummary] {
        &self.device_candidates
    }

    pub fn device_hint(&self) -> Option<&'static str> {
        self.device_hint
    }

    pub fn function_candidates(&self) -> &[FunctionCandidate] {
        &self.function_candidates
    }

    pub fn function_hint(&self) -> Option<&'static str> {
        self.function_hint
    }

    // --- Internals ---

    fn filterable_stage(&self) -> Result<Stage, BuilderError> {
        match self.current_stage()? {
            Stage::Action => Err(BuilderError::NotFilterable(Stage::Action)),
            stage => Ok(stage),
        }
    }

    fn schema_of(&self, stage: Stage) -> Result<&FunctionDef, BuilderError> {
        match stage {
            Stage::Stream => self.stream.as_ref().map(|s| s.node.schema()),
            Stage::Query => self.query.as_ref().map(|s| s.node.schema()),
            Stage::Action => self
                .action
                .as_ref()
                .and_then(|s| s.node.invocation())
                .map(|inv| &inv.schema),
        }
        .ok_or(BuilderError::NoFunctionSelected(stage))
    }

    fn invocation_mut(&mut self, stage: Stage) -> Result<&mut Invocation, BuilderError> {
        match stage {
            Stage::Stream => self.stream.as_mut().map(|s| s.node.invocation_mut()),
            Stage::Query => self.query.as_mut().map(|s| s.node.invocation_mut()),
            Stage::Action => self
                .action
                .as_mut()
                .and_then(|s| s.node.invocation_mut()),
        }
        .ok_or(BuilderError::NoFunctionSelected(stage))
    }

    fn reset_device_candidates(&mut self) {
        self.device_candidates.clear();
        self.device_hint = None;
    }

    fn reset_function_candidates(&mut self) {
        self.function_candidates.clear();
        self.function_hint = None;
        self.selected_class = None;
    }
}
