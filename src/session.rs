//! Application state for one builder page.
//!
//! A [`Session`] is created once at start-up and owns the catalog client and
//! the [`RuleBuilder`]. Every operation a front end triggers goes through it.
//! The builder sits behind a mutex that is only held for synchronous
//! sections, never across a catalog call, so several lookups may be in
//! flight at once; each one carries a [`Ticket`] and its completion is
//! dropped if the ticket went stale.
use crate::ast::{BooleanExpression, Type};
use crate::builder::{
    Applied, Form, FormSubmission, FunctionCandidate, ParameterCandidate, RuleBuilder, Stage,
};
use crate::catalog::{Catalog, DeviceSummary};
use crate::error::SessionError;
use crate::grammar::parse_class;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::info;

pub struct Session<C: Catalog> {
    catalog: C,
    builder: Mutex<RuleBuilder>,
}

impl<C: Catalog> Session<C> {
    pub fn new(catalog: C) -> Self {
        Self {
            catalog,
            builder: Mutex::new(RuleBuilder::new()),
        }
    }

    fn state(&self) -> MutexGuard<'_, RuleBuilder> {
        self.builder.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Runs `f` against the builder state.
    pub fn with_builder<R>(&self, f: impl FnOnce(&RuleBuilder) -> R) -> R {
        f(&self.state())
    }

    pub fn start_stage(&self, stage: Stage) {
        self.state().start_stage(stage);
    }

    pub fn clear_stage(&self, stage: Stage) {
        self.state().clear_stage(stage);
    }

    /// Searches the catalog and fills the device picker.
    pub async fn search_devices(
        &self,
        query: &str,
    ) -> Result<Applied<Vec<DeviceSummary>>, SessionError> {
        let ticket = self.state().begin_request();
        info!(query, "searching devices");
        let devices = self.catalog.search_devices(query).await?;
        Ok(self.state().show_devices(ticket, devices))
    }

    /// Fetches and parses the class of `kind`, then fills the function picker
    /// with the functions that fit the current stage.
    pub async fn select_device(
        &self,
        kind: &str,
    ) -> Result<Applied<Vec<FunctionCandidate>>, SessionError> {
        let ticket = self.state().begin_request();
        info!(kind, "fetching device class");
        let code = self.catalog.device_code(kind).await?;
        let class = parse_class(&code)?;
        Ok(self.state().show_functions(ticket, class)?)
    }

    /// Picks `function` from the function picker for the current stage.
    pub fn select_function(&self, function: &str) -> Result<(), SessionError> {
        Ok(self.state().choose_function(function)?)
    }

    pub fn render_input_form(&self) -> Result<Form, SessionError> {
        Ok(self.state().render_input_form()?)
    }

    pub fn apply_input_values(&self, submission: &FormSubmission) -> Result<bool, SessionError> {
        Ok(self.state().apply_input_values(submission)?)
    }

    pub fn render_filter_form(&self) -> Result<Form, SessionError> {
        Ok(self.state().render_filter_form()?)
    }

    pub fn apply_filters(
        &self,
        submission: &FormSubmission,
    ) -> Result<Option<BooleanExpression>, SessionError> {
        Ok(self.state().apply_filters(submission)?)
    }

    pub fn parameter_passing_candidates(&self, ty: &Type) -> Vec<ParameterCandidate> {
        self.state().parameter_passing_candidates(ty)
    }

    pub fn preview(&self) -> String {
        self.state().preview().to_string()
    }

    pub fn component_preview(&self, stage: Stage) -> String {
        self.state().component_preview(stage)
    }
}
