mod cli;

use crate::cli::CliCommand;

#[tokio::main]
async fn main() {
    // Parse CLI and dispatch; the command decides the exit code.
    match CliCommand::run_from_args().await {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("urlscan error: {:#}", err);
            std::process::exit(1);
        }
    }
}
