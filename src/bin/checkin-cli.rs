use clap::{Parser, Subcommand};
use reqwest::header::CONTENT_TYPE;

use checkin_service::http::CheckInRequest;
use checkin_service::http::middleware::seal::{seal, unseal};
use checkin_service::observability::TRACEPARENT;

#[derive(Parser)]
#[command(name = "checkin-cli")]
#[command(about = "Client for the check-in service (speaks the sealed wire format)", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://127.0.0.1:8000")]
    url: String,

    /// Correlation identifier sent as `traceparent`.
    #[arg(short, long)]
    traceparent: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Record a visit
    Checkin {
        /// Visitor identifier
        id: i64,
        /// Place identifier
        place_id: i64,
    },
    /// Check out from the current place
    Checkout,
    /// List currently visited places
    Currents,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let (path, payload) = match cli.command {
        Commands::Checkin { id, place_id } => {
            ("checkin", serde_json::to_vec(&CheckInRequest { id, place_id })?)
        }
        Commands::Checkout => ("checkout", Vec::new()),
        Commands::Currents => ("currents", Vec::new()),
    };

    let mut request = client
        .post(format!("{}/{}", cli.url.trim_end_matches('/'), path))
        .header(CONTENT_TYPE, "text/plain")
        .body(seal(&payload));
    if let Some(traceparent) = &cli.traceparent {
        request = request.header(TRACEPARENT.as_str(), traceparent.as_str());
    }

    let res = request.send().await?;
    let status = res.status();
    let raw = res.bytes().await?;

    if !status.is_success() {
        eprintln!("Error: service returned status {}", status);
    }

    match unseal(&raw) {
        Ok(body) if body.is_empty() => {}
        Ok(body) => match serde_json::from_slice::<serde_json::Value>(&body) {
            Ok(json) => println!("{}", serde_json::to_string_pretty(&json)?),
            Err(_) => println!("{}", String::from_utf8_lossy(&body)),
        },
        Err(e) => eprintln!("Response was not sealed ({}): {}", e, String::from_utf8_lossy(&raw)),
    }

    Ok(())
}
