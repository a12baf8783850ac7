use clap::{Parser, Subcommand, ValueEnum};
use std::net::SocketAddr;
use std::path::PathBuf;

use crate::config::DEFAULT_SERVICE_ADDRESS;
use crate::version;

#[derive(Parser, Debug, Clone)]
#[command(
    name = version::NAME,
    version = version::VERSION,
    about = "Argo CD extension that touches Kubernetes resources",
    long_about = "Serves an Argo CD UI extension that adds a \"Touch\" tab to configured resource kinds.\n\
Touching a resource sets the argocd.bakito.ch/touch annotation to the current time, which\n\
triggers controllers watching the object without changing its desired state.\n\
---\n\
Resource configuration maps a key to a resource kind, e.g. in YAML:\n\
  configmaps:\n\
    group: \"\"\n\
    kind: ConfigMap\n\
  pods:\n\
    kind: Pod\n\
    uiExtension:\n\
      tabTitle: Touch Pod\n\
      icon: fa-box"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Run the extension service
    Serve(ServeArgs),
    /// Print generated configuration files
    Config(ConfigArgs),
    /// Install the UI extension into the Argo CD server
    Install,
    /// Show the resource extensions the UI module registers
    Registrations(RegistrationsArgs),
}

/// Where the resource configuration comes from
#[derive(clap::Args, Debug, Clone)]
pub struct SourceArgs {
    /// Location of the config file (.json, .yaml, .yml or .toml)
    #[arg(short, long)]
    pub config: PathBuf,

    /// Address under which Argo CD reaches this service
    #[arg(long, default_value = DEFAULT_SERVICE_ADDRESS)]
    pub service_address: String,

    /// Allows overwriting the UI extension template
    #[arg(long)]
    pub extension_template: Option<PathBuf>,
}

#[derive(clap::Args, Debug, Clone, Default)]
pub struct ClusterArgs {
    /// Path to kubeconfig file
    #[arg(short, long)]
    pub kubeconfig: Option<PathBuf>,

    /// Kubernetes context to use
    #[arg(short = 'x', long)]
    pub context: Option<String>,
}

#[derive(clap::Args, Debug, Clone)]
pub struct ServeArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    #[command(flatten)]
    pub cluster: ClusterArgs,

    /// Address to listen on
    #[arg(long, default_value = "0.0.0.0:8080")]
    pub bind: SocketAddr,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,
}

#[derive(clap::Args, Debug, Clone)]
pub struct ConfigArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    #[command(flatten)]
    pub cluster: ClusterArgs,

    /// Output type
    #[arg(short = 't', long = "type", value_enum, default_value_t = OutputType::All)]
    pub output: OutputType,
}

#[derive(clap::Args, Debug, Clone)]
pub struct RegistrationsArgs {
    /// Location of the config file (.json, .yaml, .yml or .toml)
    #[arg(short, long)]
    pub config: PathBuf,

    /// Argo CD URL the touch requests are resolved against
    #[arg(long, default_value = "http://localhost:8080")]
    pub argocd_url: String,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputType {
    All,
    Config,
    Deployment,
    Rbac,
    Extension,
}

impl Args {
    /// Debug logging is only available for the service
    pub fn debug(&self) -> bool {
        matches!(&self.command, Commands::Serve(serve) if serve.debug)
    }
}

pub fn parse_args() -> Args {
    Args::parse()
}
