/// Template renderer using Tera for the config files installed on nodes
use super::embedded_templates;
use crate::error::BootstrapError;
use tera::{Context, Tera};

pub struct TemplateRenderer {
    tera: Tera,
}

impl TemplateRenderer {
    /// Create a TemplateRenderer from the templates compiled into the binary.
    pub fn from_embedded() -> Result<Self, BootstrapError> {
        let mut tera = Tera::default();

        for (name, content) in embedded_templates::ALL_TEMPLATES {
            tera.add_raw_template(name, content).map_err(|e| {
                BootstrapError::Template(format!("Failed to add embedded template {}: {}", name, e))
            })?;
            tracing::debug!("[TemplateRenderer] Loaded embedded template: {}", name);
        }

        Ok(Self { tera })
    }

    /// Register or replace a template.
    pub fn add_template(&mut self, name: &str, content: &str) -> Result<(), BootstrapError> {
        self.tera.add_raw_template(name, content).map_err(|e| {
            BootstrapError::Template(format!("Failed to add template {}: {}", name, e))
        })
    }

    /// Render a template with a Tera Context
    pub fn render(&self, template_name: &str, context: &Context) -> Result<String, BootstrapError> {
        let rendered = self.tera.render(template_name, context).map_err(|e| {
            BootstrapError::Template(format!("Failed to render template {}: {}", template_name, e))
        })?;

        tracing::debug!(
            "[TemplateRenderer] Rendered template {} ({} bytes)",
            template_name,
            rendered.len()
        );

        Ok(rendered)
    }

    /// List all loaded template names
    pub fn list_templates(&self) -> Vec<String> {
        self.tera.get_template_names().map(String::from).collect()
    }
}
