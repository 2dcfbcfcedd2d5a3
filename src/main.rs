use std::fs;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "fire-compare",
    about = "Compare net worth growth across countries' tax rules and return scenarios"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the JSON comparison API.
    Serve {
        #[arg(long, default_value_t = 8080)]
        port: u16,
    },
    /// Run one comparison from a JSON payload file and print the result.
    Compare {
        #[arg(help = "Path to a comparison payload; missing fields use the defaults")]
        payload: PathBuf,
        #[arg(long, help = "Pretty-print the JSON output")]
        pretty: bool,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Serve { port } => {
            if let Err(e) = fire_compare::api::run_http_server(port).await {
                eprintln!("Server error: {e}");
                std::process::exit(1);
            }
        }
        Command::Compare { payload, pretty } => {
            let json = match fs::read_to_string(&payload) {
                Ok(json) => json,
                Err(e) => {
                    eprintln!("Cannot read {}: {e}", payload.display());
                    std::process::exit(1);
                }
            };
            match fire_compare::api::compare_json(&json, pretty) {
                Ok(output) => println!("{output}"),
                Err(e) => {
                    eprintln!("{e}");
                    std::process::exit(1);
                }
            }
        }
    }
}
