use clap::Parser;
use federated_onehot::app::config::AppConfig;
use federated_onehot::app::error_handling::handle_fatal_error;
use federated_onehot::app::logging::init_logging;
use federated_onehot::cli::{execute_command, Cli};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let config = AppConfig::new(cli.verbose);
    init_logging(&config);

    if let Err(e) = execute_command(cli.command).await {
        handle_fatal_error(e, config.verbose);
    }
}
