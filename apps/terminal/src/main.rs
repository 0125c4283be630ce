mod config;
mod render;

use std::sync::Arc;

use dashboard_client::{
    bind_session, ClientState, FirebaseIdentityProvider, HttpQuoteSource, MarketDataClient,
    Session,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use config::Config;
use render::render_state;

const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

/// Logs go to stderr so they don't interleave with the dashboard; default
/// level is `warn`.
fn init_tracing() {
    let log_format = std::env::var("DASHBOARD_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_line_number(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    init_tracing();

    let identity = Arc::new(FirebaseIdentityProvider::new(config.firebase_api_key.clone())?);
    let session = Session::new(identity);

    let source = Arc::new(HttpQuoteSource::new(&config.api_url)?);
    let client = MarketDataClient::new(
        source,
        config.refresh,
        ClientState::with_default_instruments(),
    );
    let binding = bind_session(&session, client.clone());

    println!("Signing in as {}...", config.email);
    if let Err(e) = session.login(&config.email, &config.password).await {
        eprintln!("{}", e);
        drop(session);
        binding.await?;
        std::process::exit(1);
    }

    let mut updates = client.subscribe();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = updates.borrow_and_update().clone();
                print!("{}{}", CLEAR_SCREEN, render_state(&state));
                println!("[Enter] refresh  [Ctrl+C] sign out");
            }
            line = lines.next_line(), if stdin_open => match line {
                Ok(Some(_)) => {
                    let client = client.clone();
                    tokio::spawn(async move {
                        client.refresh_now().await;
                    });
                }
                Ok(None) => stdin_open = false,
                Err(e) => {
                    tracing::warn!("Failed to read stdin: {}", e);
                    stdin_open = false;
                }
            },
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    session.logout().await;
    client.stop();
    drop(session);
    binding.await?;
    println!("Signed out");
    Ok(())
}
