use minijinja::{AutoEscape, Environment, UndefinedBehavior};
use rust_embed::RustEmbed;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use super::BundleError;
use crate::config::Resources;

#[derive(RustEmbed)]
#[folder = "templates"]
struct BuiltinTemplates;

/// A named template source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateSource {
    pub name: String,
    pub content: String,
}

impl TemplateSource {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }

    fn builtin(file: &'static str, name: &str) -> Result<Self, BundleError> {
        let asset = BuiltinTemplates::get(file).ok_or(BundleError::MissingTemplate(file))?;
        Ok(Self::new(name, String::from_utf8_lossy(&asset.data).into_owned()))
    }

    /// Reads a template from disk, named after its path
    pub fn from_file(path: &Path) -> Result<Self, BundleError> {
        let content = fs::read_to_string(path).map_err(|source| BundleError::ReadTemplate {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::new(path.display().to_string(), content))
    }
}

/// The four templates an extension bundle is rendered from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateSet {
    pub extension: TemplateSource,
    pub config: TemplateSource,
    pub deployment: TemplateSource,
    pub rbac: TemplateSource,
}

impl TemplateSet {
    pub fn builtin() -> Result<Self, BundleError> {
        Ok(Self {
            extension: TemplateSource::builtin("extension-touch.js.j2", "extension-touch.js")?,
            config: TemplateSource::builtin("argocd-helm-values.yaml.j2", "argocd-helm-values.yaml")?,
            deployment: TemplateSource::builtin(
                "argocd-server-deployment.yaml.j2",
                "argocd-server-deployment.yaml",
            )?,
            rbac: TemplateSource::builtin("extension-proxy-rbac.yaml.j2", "extension-proxy-rbac.yaml")?,
        })
    }
}

/// Values every template can reference
#[derive(Debug, Serialize)]
pub struct TemplateData<'a> {
    #[serde(rename = "Resources")]
    pub resources: &'a Resources,
    #[serde(rename = "ServiceAddress")]
    pub service_address: &'a str,
    #[serde(rename = "ResourcesByGroup")]
    pub resources_by_group: BTreeMap<String, Vec<String>>,
}

impl<'a> TemplateData<'a> {
    pub fn new(resources: &'a Resources, service_address: &'a str) -> Self {
        Self {
            resources,
            service_address,
            resources_by_group: resources.names_by_group(),
        }
    }
}

/// Renders a template. Referencing a value that does not exist is an error.
pub fn render_template(source: &TemplateSource, data: &TemplateData<'_>) -> Result<String, minijinja::Error> {
    let mut env = Environment::new();
    env.set_undefined_behavior(UndefinedBehavior::Strict);
    env.set_auto_escape_callback(|_| AutoEscape::None);

    let template = env.template_from_named_str(&source.name, &source.content)?;
    template.render(data)
}
