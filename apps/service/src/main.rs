use std::path::PathBuf;

use clap::Parser;
use pingboard::{AppError, Config, Orchestrator};

#[derive(Debug, Parser)]
#[command(name = "pingboard", version, about = "Uptime monitor with a status API")]
struct Cli {
    /// Path to the config file (created with defaults if missing)
    #[arg(short, long, env = "PINGBOARD_CONFIG")]
    config: Option<PathBuf>,

    /// Print the effective configuration and exit
    #[arg(long)]
    print_config: bool,
}

#[actix_web::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config_path = Config::resolve_path(cli.config.as_ref())?;
    let wrote_defaults = !config_path.exists();

    let mut config = Config::from_config(Some(&config_path))?;
    config.apply_env_overrides()?;

    if cli.print_config {
        print!("{config}");
        return Ok(());
    }

    logger::init_tracing(config.logging.level_filter()?, config.logging.log_format()?);
    if wrote_defaults {
        tracing::info!("No config at {}, wrote defaults", config_path.display());
    }
    tracing::debug!("{}", config);

    Orchestrator::start(config).await
}
