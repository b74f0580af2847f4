use std::process::ExitCode;

use clap::Parser;
use log::error;

use filehttp::cli::Args;
use filehttp::HttpServer;

#[tokio::main]
async fn main() -> ExitCode {
    // Parse before logging is set up so --help and --version stay quiet
    let args = Args::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let server = match args.into_config().and_then(HttpServer::new) {
        Ok(server) => server,
        Err(e) => {
            error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    match server.start().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Server error: {e}");
            ExitCode::FAILURE
        }
    }
}
