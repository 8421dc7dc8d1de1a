use crate::error::BirdiError;

/// Renders a template string against a JSON context.
pub trait TemplateEngine: Send + Sync {
    fn render(&self, template: &str, context: &serde_json::Value) -> Result<String, BirdiError>;
}
