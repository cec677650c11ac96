//! Backend entry-point: wires REST endpoints and OpenAPI docs.

mod server;

use std::env;
use std::net::SocketAddr;

use actix_web::cookie::Key;
use clap::Parser;
use color_eyre::eyre::eyre;
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};
use url::Url;

use server::ServerConfig;

/// Command-line and environment configuration for the server process.
#[derive(Debug, Parser)]
#[command(name = "bookswap-backend", about = "Book exchange marketplace backend")]
struct Cli {
    /// Socket address to bind the HTTP listener to.
    #[arg(long, env = "BIND_ADDR", default_value = "0.0.0.0:8080")]
    bind: SocketAddr,

    /// PostgreSQL connection URL; without it the server runs on fixtures.
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// Volumes API endpoint used for ISBN metadata lookups.
    #[arg(
        long,
        env = "BOOKS_API_URL",
        default_value = "https://www.googleapis.com/books/v1/volumes"
    )]
    books_api_url: Url,
}

fn load_session_key() -> color_eyre::Result<Key> {
    let key_path =
        env::var("SESSION_KEY_FILE").unwrap_or_else(|_| "/var/run/secrets/session_key".into());
    match std::fs::read(&key_path) {
        Ok(bytes) => Ok(Key::derive_from(&bytes)),
        Err(error) => {
            let allow_dev = env::var("SESSION_ALLOW_EPHEMERAL").ok().as_deref() == Some("1");
            if cfg!(debug_assertions) || allow_dev {
                warn!(path = %key_path, %error, "using temporary session key (dev only)");
                Ok(Key::generate())
            } else {
                Err(eyre!("failed to read session key at {key_path}: {error}"))
            }
        }
    }
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    if let Err(error) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(%error, "tracing init failed");
    }

    let cli = Cli::parse();
    let key = load_session_key()?;
    let cookie_secure = env::var("SESSION_COOKIE_SECURE")
        .map(|v| v != "0")
        .unwrap_or(true);

    let config = ServerConfig::new(key, cookie_secure, cli.bind, cli.books_api_url)
        .with_database_url(cli.database_url);

    server::run(config).await
}
