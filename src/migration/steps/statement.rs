//! Raw statement step rendered from templates.

use super::{StepContext, TaskStep};
use crate::migration::domain::{Reversibility, StepError, StepResult};
use async_trait::async_trait;
use minijinja::{Environment, UndefinedBehavior};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::debug;

/// Executes raw statements that predicate composition cannot express.
///
/// Statements are `minijinja` templates rendered with `version`, `task` and
/// every declared parameter in scope. Referencing an undefined variable is
/// an error. Without undo statements the step is irreversible.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatementStep {
    apply: Vec<String>,
    undo: Vec<String>,
    parameters: BTreeMap<String, Value>,
}

impl StatementStep {
    /// Creates a step executing one statement.
    #[must_use]
    pub fn new(statement: impl Into<String>) -> Self {
        Self {
            apply: vec![statement.into()],
            ..Self::default()
        }
    }

    /// Appends another statement to apply.
    #[must_use]
    pub fn then(mut self, statement: impl Into<String>) -> Self {
        self.apply.push(statement.into());
        self
    }

    /// Appends a statement executed on undo.
    #[must_use]
    pub fn with_undo(mut self, statement: impl Into<String>) -> Self {
        self.undo.push(statement.into());
        self
    }

    /// Declares a template parameter.
    #[must_use]
    pub fn with_parameter(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.parameters.insert(name.into(), value.into());
        self
    }

    /// Renders the apply statements for `ctx` without executing them.
    ///
    /// # Errors
    ///
    /// Returns [`StepError::Template`] when a template cannot be rendered.
    pub fn render_apply(&self, ctx: &StepContext) -> StepResult<Vec<String>> {
        self.render_all(&self.apply, ctx)
    }

    fn render_all(&self, templates: &[String], ctx: &StepContext) -> StepResult<Vec<String>> {
        let mut environment = Environment::new();
        environment.set_undefined_behavior(UndefinedBehavior::Strict);
        let context = self.template_context(ctx);
        templates
            .iter()
            .map(|template| {
                let rendered = environment
                    .render_str(template, &context)
                    .map_err(|error| StepError::Template(error.to_string()))?;
                if rendered.trim().is_empty() {
                    return Err(StepError::Template(format!(
                        "template rendered an empty statement: {template}"
                    )));
                }
                Ok(rendered)
            })
            .collect()
    }

    fn template_context(&self, ctx: &StepContext) -> Map<String, Value> {
        let mut context = Map::new();
        context.insert(
            "version".to_owned(),
            Value::String(ctx.version().as_str().to_owned()),
        );
        context.insert("task".to_owned(), Value::String(ctx.task().as_str().to_owned()));
        for (key, value) in &self.parameters {
            context.insert(key.clone(), value.clone());
        }
        context
    }

    async fn execute(&self, templates: &[String], ctx: &StepContext) -> StepResult<()> {
        for statement in self.render_all(templates, ctx)? {
            let affected = ctx.store().execute_raw(&statement).await?;
            debug!(task = %ctx.task(), affected, "executed statement");
        }
        Ok(())
    }
}

#[async_trait]
impl TaskStep for StatementStep {
    async fn apply(&self, ctx: &StepContext) -> StepResult<()> {
        self.execute(&self.apply, ctx).await
    }

    async fn undo(&self, ctx: &StepContext) -> StepResult<()> {
        self.execute(&self.undo, ctx).await
    }

    fn reversibility(&self) -> Reversibility {
        if self.undo.is_empty() {
            Reversibility::Irreversible
        } else {
            Reversibility::Reversible
        }
    }
}
