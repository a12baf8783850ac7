use tracing::info;

use super::host::{ExtensionOptions, ExtensionsApi};
use super::touch::TouchWiring;
use super::view::{make_touch_view, TouchViewConfig};
use crate::config::Resources;

/// Tab title used when a resource does not configure one
pub const DEFAULT_TAB_TITLE: &str = "Touch";

/// A set of touch views registered together against a host
#[derive(Clone)]
pub struct ExtensionModule {
    views: Vec<TouchViewConfig>,
    wiring: TouchWiring,
}

impl ExtensionModule {
    pub fn new(views: Vec<TouchViewConfig>, wiring: TouchWiring) -> Self {
        Self { views, wiring }
    }

    /// One touch view per configured resource, keyed by the resource key
    pub fn from_resources(resources: &Resources, wiring: TouchWiring) -> Self {
        let views = resources
            .iter()
            .map(|(key, resource)| {
                let ui = resource.ui_extension.as_ref();
                TouchViewConfig {
                    slug: key.clone(),
                    group: resource.group.clone(),
                    kind: resource.kind.clone(),
                    title: ui
                        .and_then(|ui| ui.tab_title.clone())
                        .filter(|title| !title.is_empty())
                        .unwrap_or_else(|| DEFAULT_TAB_TITLE.to_string()),
                    icon: ui.and_then(|ui| ui.icon.clone()),
                }
            })
            .collect();
        Self::new(views, wiring)
    }

    pub fn views(&self) -> &[TouchViewConfig] {
        &self.views
    }

    /// Registers every view with the host, one call per view in order
    pub fn init(&self, host: &mut dyn ExtensionsApi) {
        for view in &self.views {
            let options = view
                .icon
                .as_ref()
                .filter(|icon| !icon.is_empty())
                .map(|icon| ExtensionOptions {
                    icon: Some(icon.clone()),
                });

            host.register_resource_extension(
                make_touch_view(&view.slug, &self.wiring),
                &view.group,
                &view.kind,
                &view.title,
                options,
            );
        }
        info!("Registered {} resource extensions", self.views.len());
    }
}
