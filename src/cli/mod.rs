mod args;

pub use args::{parse_args, Args, ClusterArgs, Commands, ConfigArgs, OutputType, RegistrationsArgs, ServeArgs, SourceArgs};
use anyhow::{Context, Result};
use comfy_table::{presets::UTF8_FULL, Cell, ContentArrangement, Table};
use std::sync::Arc;
use tracing::info;

use crate::app::Application;
use crate::bundle::ExtensionBundle;
use crate::config::{self, TouchConfig};
use crate::extension::{ExtensionModule, RegistrationTable, TouchWiring, ViewContext};
use crate::install;
use crate::k8s::{create_client, KubeResourceClient};
use crate::version;

pub async fn run(args: Args) -> Result<()> {
    match args.command {
        Commands::Serve(serve) => run_serve(serve).await,
        Commands::Config(config) => run_config(config).await,
        Commands::Install => run_install().await,
        Commands::Registrations(registrations) => run_registrations(registrations),
    }
}

fn load_config(source: &SourceArgs) -> Result<TouchConfig> {
    let mut cfg = config::load(&source.config)?;
    cfg.service_address = source.service_address.clone();
    cfg.extension_template = source.extension_template.clone();
    Ok(cfg)
}

async fn application(source: &SourceArgs, cluster: &ClusterArgs) -> Result<Application> {
    let cfg = load_config(source)?;
    let client = create_client(cluster.kubeconfig.as_deref(), cluster.context.as_deref()).await?;
    Ok(Application::new(Arc::new(KubeResourceClient::new(client)), cfg))
}

async fn run_serve(args: ServeArgs) -> Result<()> {
    info!("Starting {}", version::print());
    let app = application(&args.source, &args.cluster).await?;
    app.run(args.bind, args.debug).await
}

async fn run_config(args: ConfigArgs) -> Result<()> {
    let app = application(&args.source, &args.cluster).await?;
    let bundle = app.extension().await?;
    println!("{}", render_output(&bundle, args.output));
    Ok(())
}

/// Text printed by the config command for an output type
pub fn render_output(bundle: &ExtensionBundle, output: OutputType) -> String {
    match output {
        OutputType::Config => bundle.argocd_config().to_string(),
        OutputType::Deployment => bundle.argocd_deployment().to_string(),
        OutputType::Rbac => bundle.proxy_rbac().to_string(),
        OutputType::Extension => bundle.extension_js().to_string(),
        OutputType::All => format!(
            "=== ArgoCD Config ===\n{}\n\n=== ArgoCD Deployment ===\n{}\n\n=== RBAC Configuration ===\n{}\n\n=== JS Extension ===\n{}",
            bundle.argocd_config(),
            bundle.argocd_deployment(),
            bundle.proxy_rbac(),
            bundle.extension_js()
        ),
    }
}

async fn run_install() -> Result<()> {
    let installed = install::install_from_env()
        .await
        .context("Failed to install extension")?;
    println!("{} {}", installed.extension_url, installed.checksum_url);
    Ok(())
}

fn run_registrations(args: RegistrationsArgs) -> Result<()> {
    let cfg = config::load(&args.config)?;
    let module = ExtensionModule::from_resources(&cfg.resources, TouchWiring::http(&args.argocd_url)?);

    let mut host = RegistrationTable::new();
    module.init(&mut host);

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Group", "Kind", "Title", "Icon", "Touch path"]);

    let context = ViewContext::default();
    for call in host.calls() {
        let node = call.render(&context);
        let paths: Vec<String> = node
            .buttons()
            .iter()
            .map(|action| action.request().path())
            .collect();
        table.add_row(vec![
            Cell::new(if call.group.is_empty() { "(core)" } else { call.group.as_str() }),
            Cell::new(&call.kind),
            Cell::new(&call.title),
            Cell::new(call.icon().unwrap_or("-")),
            Cell::new(paths.join(", ")),
        ]);
    }

    println!("{table}");
    Ok(())
}
