// Re-export modules so they can be used from tests
pub mod app;
pub mod bundle;
pub mod cli;
pub mod config;
pub mod extension;
pub mod install;
pub mod k8s;
pub mod logging;
pub mod server;
pub mod version;
