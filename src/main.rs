use clap::Parser;

use twap_keeper::adapter::inbound::cli::command::Cli;
use twap_keeper::adapter::inbound::cli::{dispatch, output};

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    if let Err(e) = dispatch(cli).await {
        output::error(&e.to_string());
        std::process::exit(1);
    }
}
