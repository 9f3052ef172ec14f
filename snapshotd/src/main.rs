use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use snapshotd::cli::{Cli, Commands};
use snapshotd::commands;
use snapshotd::config::ConfigManager;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let env_filter = EnvFilter::from_default_env()
        .add_directive("snapshotd=info".parse()?)
        .add_directive("reqwest=warn".parse()?)
        .add_directive("hyper=warn".parse()?);

    fmt().with_env_filter(env_filter).init();

    let config_manager = ConfigManager::load(cli.config.as_deref()).await?;
    let config = config_manager.get_current_config();

    match cli.command {
        Commands::Create { node } => commands::create::execute(&config, &node).await,
        Commands::Upload { node, file } => commands::upload::execute(&config, &node, &file).await,
        Commands::Daemon {
            node,
            interval_seconds,
        } => commands::daemon::execute(&config, &node, interval_seconds).await,
        Commands::List => {
            commands::list::execute(&config);
            Ok(())
        }
    }
}
