use std::fmt;
use tracing::debug;

use super::view::{Node, ViewContext, ViewFactory};

/// Optional display metadata of a registration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtensionOptions {
    /// Icon identifier interpreted by the host's icon set, e.g. "fa-box"
    pub icon: Option<String>,
}

/// Registration surface the host hands to an extension module
pub trait ExtensionsApi {
    fn register_resource_extension(
        &mut self,
        view: ViewFactory,
        group: &str,
        kind: &str,
        title: &str,
        options: Option<ExtensionOptions>,
    );
}

/// One recorded call against the registration surface
#[derive(Clone)]
pub struct RegistrationCall {
    pub view: ViewFactory,
    pub group: String,
    pub kind: String,
    pub title: String,
    pub options: Option<ExtensionOptions>,
}

impl RegistrationCall {
    pub fn icon(&self) -> Option<&str> {
        self.options.as_ref().and_then(|o| o.icon.as_deref())
    }

    pub fn render(&self, context: &ViewContext) -> Node {
        (self.view)(context)
    }
}

impl fmt::Debug for RegistrationCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistrationCall")
            .field("group", &self.group)
            .field("kind", &self.kind)
            .field("title", &self.title)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

/// In-memory host that keeps every registration in call order.
/// Registering the same tuple twice keeps both entries.
#[derive(Debug, Default)]
pub struct RegistrationTable {
    calls: Vec<RegistrationCall>,
}

impl RegistrationTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> &[RegistrationCall] {
        &self.calls
    }

    pub fn len(&self) -> usize {
        self.calls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }

    /// Registrations eligible for a resource of the given group and kind
    pub fn matching(&self, group: &str, kind: &str) -> Vec<&RegistrationCall> {
        self.calls
            .iter()
            .filter(|call| call.group == group && call.kind == kind)
            .collect()
    }
}

impl ExtensionsApi for RegistrationTable {
    fn register_resource_extension(
        &mut self,
        view: ViewFactory,
        group: &str,
        kind: &str,
        title: &str,
        options: Option<ExtensionOptions>,
    ) {
        debug!("Registering resource extension {:?} for {}/{}", title, group, kind);
        self.calls.push(RegistrationCall {
            view,
            group: group.to_string(),
            kind: kind.to_string(),
            title: title.to_string(),
            options,
        });
    }
}
