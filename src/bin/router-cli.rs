use clap::{Parser, Subcommand};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "router-cli")]
#[command(about = "Management CLI for the content router", long_about = None)]
struct Cli {
    /// Base URL of the admin listener.
    #[arg(short, long, default_value = "http://localhost:8081")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check the router is alive
    Healthcheck,
    /// Show the route count and checksum of the published table
    Stats,
    /// Rebuild the route table from the store
    Reload,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    let res = match cli.command {
        Commands::Healthcheck => client.get(format!("{}/healthcheck", base)).send().await?,
        Commands::Stats => client.get(format!("{}/stats", base)).send().await?,
        Commands::Reload => client.post(format!("{}/reload", base)).send().await?,
    };
    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;

    let rendered = match serde_json::from_str::<Value>(&text) {
        Ok(json) => serde_json::to_string_pretty(&json)?,
        Err(_) => text,
    };

    if status.is_success() {
        println!("{}", rendered);
        Ok(())
    } else {
        eprintln!("Error: admin API returned status {}", status);
        eprintln!("{}", rendered);
        std::process::exit(1);
    }
}
