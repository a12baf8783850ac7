use anyhow::Result;
use argo_touch::{cli, logging};

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::parse_args();

    // Debug logging only applies to the service
    logging::setup_logger(args.debug())?;

    cli::run(args).await
}
