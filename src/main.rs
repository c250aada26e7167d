use clap::Parser;
use log::{error, info};
use service::{config::Config, logging::Logger};

mod cli;
mod commands;
mod output;

use cli::Cli;

#[tokio::main]
async fn main() {
    Config::load_dotenv();
    let cli = Cli::parse();

    if let Err(e) = Logger::init_logger(&cli.config) {
        eprintln!("Failed to start logger: {e}");
    }

    info!("Using taskdeck API at {}", cli.config.api_url);

    let manager = match commands::build_manager(&cli.config) {
        Ok(manager) => manager,
        Err(e) => {
            error!("Failed to set up session: {e}");
            output::print_error(&e);
            std::process::exit(1);
        }
    };

    if let Err(e) = commands::run(cli.command, &manager).await {
        output::print_error(&e);
        std::process::exit(1);
    }
}
