//! llmhub: multi-provider LLM chat gateway with news and weather lookups.

use std::sync::Arc;

use llmhub_core::GatewayConfig;
use llmhub_server::{build_router, AppState};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn print_help() {
    println!("llmhub: multi-provider LLM chat gateway");
    println!();
    println!("Usage: llmhub [command]");
    println!();
    println!("Commands:");
    println!("  (none)          Start the server");
    println!("  check-config    Build all providers from the environment and exit");
    println!("  help            Show this help message");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() > 1 {
        match args[1].as_str() {
            "--check-config" | "check-config" => {
                match AppState::new(GatewayConfig::from_env()) {
                    Ok(state) => {
                        println!("Configuration OK: {}", state.dispatcher.providers().join(", "));
                        return Ok(());
                    }
                    Err(e) => {
                        eprintln!("{}", e);
                        std::process::exit(1);
                    }
                }
            }
            "--help" | "-h" | "help" => {
                print_help();
                return Ok(());
            }
            _ => {
                eprintln!("Unknown command: {}. Use 'llmhub help' for usage.", args[1]);
                std::process::exit(1);
            }
        }
    }

    let config = GatewayConfig::from_env();
    let port = config.port;

    let state = AppState::new(config)
        .map_err(|e| anyhow::anyhow!("Failed to initialise providers: {}", e))?;
    let app = build_router(Arc::new(state));

    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("llmhub listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
