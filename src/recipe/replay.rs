use super::Recipe;
use crate::builder::Applied;
use crate::catalog::Catalog;
use crate::error::RecipeError;
use crate::session::Session;
use tracing::debug;

impl Recipe {
    /// Drives `session` through the clicks a user would make to build this
    /// rule, and returns the resulting preview.
    pub async fn replay<C: Catalog>(&self, session: &Session<C>) -> Result<String, RecipeError> {
        for (stage, recipe) in self.stages() {
            debug!(%stage, kind = %recipe.kind, function = %recipe.function, "replaying stage");

            session.start_stage(stage);
            if let Applied::Superseded = session.select_device(&recipe.kind).await? {
                return Err(RecipeError::Superseded(recipe.kind.clone()));
            }
            session.select_function(&recipe.function)?;

            if !recipe.inputs.is_empty() {
                session.start_stage(stage);
                session.render_input_form()?;
                session.apply_input_values(&recipe.input_submission())?;
            }

            if !recipe.filters.is_empty() {
                session.start_stage(stage);
                session.render_filter_form()?;
                session.apply_filters(&recipe.filter_submission()?)?;
            }
        }
        Ok(session.preview())
    }
}
