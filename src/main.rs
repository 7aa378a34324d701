use bo_cli::cli::{self, build_registry};
use bo_cli::config::Config;
use bo_cli::db::Database;
use bo_cli::error::Result;
use bo_cli::setup_logging;
use colored::*;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load()?;

    // Held until exit so the file writer can flush
    let _log_guard = setup_logging(&config)?;

    info!("Starting {} {}", cli::PROGRAM, cli::VERSION);

    let db = Database::new_lazy(&config.database_url, config.max_connections)?;
    let registry = match build_registry::<Database>() {
        Ok(registry) => registry,
        Err(e) => {
            error!("Failed to register options: {:?}", e);
            println!("{}", "Error: Failed to initialize options. Check logs.".red());
            return Err(e);
        },
    };

    let args: Vec<String> = std::env::args().collect();
    if args.len() <= 1 {
        return cli::run_menu(&registry, &db).await;
    }

    match registry.dispatch(&args, &db).await {
        Ok(count) => {
            info!("Executed {} option(s)", count);
            Ok(())
        },
        Err(e) => {
            error!("Command execution failed: {:?}", e);
            eprintln!("{} {}", "Error:".red(), e.to_string().red());
            Err(e)
        },
    }
}
