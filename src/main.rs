use clap::Parser;

use linkvault::cli::Cli;
use linkvault::config::{get_config, init_config_from};
use linkvault::errors::LinkvaultError;
use linkvault::runtime::run_command;
use linkvault::system::init_logging;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    if let Err(e) = init_config_from(cli.config.as_deref()) {
        eprintln!("{}", e.format_colored());
        std::process::exit(1);
    }
    let config = get_config();

    // 日志 guard 必须存活到进程结束
    let _guard = if cli.command.needs_storage() {
        match init_logging(&config.logging) {
            Ok(guard) => Some(guard),
            Err(e) => {
                eprintln!("Failed to initialize logging: {:#}", e);
                std::process::exit(1);
            }
        }
    } else {
        None
    };

    if let Err(e) = run_command(cli.command, &config).await {
        match e.downcast_ref::<LinkvaultError>() {
            Some(err) => eprintln!("{}", err.format_colored()),
            None => eprintln!("Error: {:#}", e),
        }
        std::process::exit(1);
    }
}
