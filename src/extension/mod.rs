// Resource extensions: registration, views and the touch action
pub mod host;
pub mod module;
pub mod touch;
pub mod view;

pub use host::{ExtensionOptions, ExtensionsApi, RegistrationCall, RegistrationTable};
pub use module::ExtensionModule;
pub use touch::{
    DiagnosticSink, HttpTransport, MemoryDiagnostics, ResourceTarget, TouchAction, TouchError,
    TouchRequest, TouchTransport, TouchWiring, TracingDiagnostics,
};
pub use view::{make_text_view, make_touch_view, Node, TouchViewConfig, ViewContext, ViewFactory};
