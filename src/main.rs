use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use folio::app::AppContext;
use folio::cli::{commands, Cli, Commands};
use folio::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins over --verbose
    let default_level = if cli.verbose { "folio=debug" } else { "folio=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    match cli.command {
        Commands::Crawl(args) => {
            let mut config = Config::load(args.config.as_deref())?;
            args.apply(&mut config);

            let ctx = AppContext::new(config)?;
            commands::crawl(&ctx, &args.url).await?;
        }
        Commands::InitConfig { config, force } => {
            commands::init_config(config.as_deref(), force)?;
        }
    }

    Ok(())
}
