// Generated UI extension and the Argo CD manifests that install it
pub mod archive;
pub mod render;

use std::io;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, info};

use crate::config::{Resources, TouchConfig};
pub use archive::{create_tar_gz, sha256_hex, EXTENSION_JS_PATH};
pub use render::{render_template, TemplateData, TemplateSet, TemplateSource};

pub const EXTENSION_JS: &str = "extension-touch.js";
pub const EXTENSION_ARCHIVE: &str = "extension.tar.gz";
pub const EXTENSION_CHECKSUM: &str = "extension_checksum.txt";

#[derive(Debug, Error)]
pub enum BundleError {
    #[error("extension {operation} failed: {source}")]
    Render {
        operation: &'static str,
        #[source]
        source: minijinja::Error,
    },
    #[error("failed to read extension template {path}: {source}")]
    ReadTemplate {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("missing built-in template {0}")]
    MissingTemplate(&'static str),
    #[error("extension create tar failed: {0}")]
    Archive(#[from] io::Error),
}

/// Everything the service hands out, rendered once at startup
#[derive(Debug, Clone)]
pub struct ExtensionBundle {
    resources: Resources,
    extension_js: String,
    extension_js_checksum: String,
    archive: Vec<u8>,
    archive_checksum: String,
    argocd_config: String,
    argocd_deployment: String,
    rbac: String,
}

impl ExtensionBundle {
    /// Renders the built-in templates, or the configured UI template override
    pub fn new(config: &TouchConfig) -> Result<Self, BundleError> {
        let mut templates = TemplateSet::builtin()?;
        if let Some(path) = &config.extension_template {
            info!("Using UI extension template from: {:?}", path);
            templates.extension = TemplateSource::from_file(path)?;
        }
        Self::with_templates(config, &templates)
    }

    pub fn with_templates(config: &TouchConfig, templates: &TemplateSet) -> Result<Self, BundleError> {
        let data = TemplateData::new(&config.resources, &config.service_address);
        let render = |operation: &'static str, source: &TemplateSource| {
            render_template(source, &data).map_err(|source| BundleError::Render { operation, source })
        };

        let extension_js = render("render extension", &templates.extension)?;
        let archive = create_tar_gz(EXTENSION_JS_PATH, extension_js.as_bytes())?;
        let argocd_config = render("render config", &templates.config)?;
        let argocd_deployment = render("render deployment", &templates.deployment)?;
        let rbac = render("render rbac", &templates.rbac)?;

        let bundle = Self {
            resources: config.resources.clone(),
            extension_js_checksum: sha256_hex(extension_js.as_bytes()),
            archive_checksum: sha256_hex(&archive),
            extension_js,
            archive,
            argocd_config,
            argocd_deployment,
            rbac,
        };
        debug!(
            "Rendered extension bundle ({} bytes archive, sha256 {})",
            bundle.archive.len(),
            bundle.archive_checksum
        );
        Ok(bundle)
    }

    pub fn resources(&self) -> &Resources {
        &self.resources
    }

    pub fn extension_js(&self) -> &str {
        &self.extension_js
    }

    pub fn extension_js_checksum(&self) -> &str {
        &self.extension_js_checksum
    }

    pub fn archive(&self) -> &[u8] {
        &self.archive
    }

    pub fn archive_checksum(&self) -> &str {
        &self.archive_checksum
    }

    pub fn argocd_config(&self) -> &str {
        &self.argocd_config
    }

    pub fn argocd_deployment(&self) -> &str {
        &self.argocd_deployment
    }

    pub fn proxy_rbac(&self) -> &str {
        &self.rbac
    }

    /// sha256sum style listing of the archive and the script
    pub fn checksum_file(&self) -> String {
        format!(
            "{}  {}\n{}  {}",
            self.archive_checksum, EXTENSION_ARCHIVE, self.extension_js_checksum, EXTENSION_JS
        )
    }
}
