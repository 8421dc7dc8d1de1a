// birdidq-core/src/infrastructure/render/jinja.rs

// Renders the data docs page and the quality report from JSON contexts.

use minijinja::{AutoEscape, Environment};

use crate::application::ports::TemplateEngine;
use crate::error::BirdiError;
use crate::infrastructure::error::InfrastructureError;

pub struct JinjaRenderer<'a> {
    env: Environment<'a>,
}

impl<'a> JinjaRenderer<'a> {
    pub fn new() -> Self {
        let mut env = Environment::new();

        // Templates are inline strings: escaping is driven by the `|e` filter,
        // Markdown output must stay raw.
        env.set_auto_escape_callback(|_| AutoEscape::None);

        env.add_filter("upper", |value: &str| value.to_uppercase());
        env.add_filter("lower", |value: &str| value.to_lowercase());

        Self { env }
    }
}

impl<'a> Default for JinjaRenderer<'a> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> TemplateEngine for JinjaRenderer<'a> {
    fn render(&self, template: &str, context: &serde_json::Value) -> Result<String, BirdiError> {
        self.env
            .render_str(template, context)
            .map_err(|e| BirdiError::Infrastructure(InfrastructureError::TemplateError(e)))
    }
}
