//! Main entry point for TicketBot.

use ticketbot_bot::TicketBot;
use ticketbot_common::logging::init_logging;
use ticketbot_config::ConfigLoader;
use tracing::info;

#[tokio::main]
async fn main() {
    let loader = ConfigLoader::from_env();

    let guard = match init_logging(&loader.logging()) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            None
        }
    };

    info!("Starting TicketBot v{}", env!("CARGO_PKG_VERSION"));

    let bot = TicketBot::new(loader);
    let code = bot.run().await;

    // Flush the file sink before exiting.
    drop(guard);
    std::process::exit(code);
}
