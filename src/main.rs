use anyhow::Result;
use clap::Parser;
use tracing::info;

use portfolio::cli::{Cli, Commands};
use portfolio::config::{get_config, init_config_from};
use portfolio::runtime::modes::{run_config_command, run_server};
use portfolio::system::logging::init_logging;

#[actix_web::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    if let Some(Commands::Config { action }) = cli.command {
        return run_config_command(action);
    }

    init_config_from(&cli.config);
    let config = get_config();

    // 必须持有 guard，否则非阻塞日志不会落盘
    let _log_guard = init_logging(&config.logging)?;
    info!(
        "portfolio {} starting (config: {})",
        env!("CARGO_PKG_VERSION"),
        cli.config
    );

    run_server(&config).await
}
