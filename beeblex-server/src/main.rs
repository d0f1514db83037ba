//! Beeblex reference server
//!
//! Runs the handshake and encrypted transaction endpoints locally so the
//! SDK can be exercised without the production service.
//!
//! Usage:
//!   beeblex-server --port 8080 --api-key ABC123
//!
//! The RSA key is read from `--key`, or generated and written there on first
//! start.

use std::{fs, path::PathBuf, sync::Arc};
use anyhow::{Context, Result};
use beeblex_crypto::{CipherSuite, PrivateKey, WrapPadding};
use beeblex_server::{build_router, ServerState};
use beeblex_types::ApiKey;
use clap::{Parser, ValueEnum};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "beeblex-server")]
#[command(about = "Beeblex reference license server")]
struct Args {
    /// HTTP port to listen on
    #[arg(short, long, default_value = "8080")]
    port: u16,

    /// Path to the PKCS#8 PEM private key
    #[arg(short, long, default_value = "beeblex-server.pem")]
    key: PathBuf,

    /// API key to accept (repeatable; none accepts any key)
    #[arg(long = "api-key")]
    api_keys: Vec<String>,

    /// Payload cipher
    #[arg(long, value_enum, default_value_t = Suite::Chacha20Poly1305)]
    cipher: Suite,

    /// Session key wrap padding
    #[arg(long, value_enum, default_value_t = Padding::OaepSha256)]
    padding: Padding,

    /// Enable verbose debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Suite {
    Chacha20Poly1305,
    Aes256Gcm,
}

impl From<Suite> for CipherSuite {
    fn from(suite: Suite) -> Self {
        match suite {
            Suite::Chacha20Poly1305 => CipherSuite::ChaCha20Poly1305,
            Suite::Aes256Gcm => CipherSuite::Aes256Gcm,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Padding {
    OaepSha256,
    Pkcs1v15,
}

impl From<Padding> for WrapPadding {
    fn from(padding: Padding) -> Self {
        match padding {
            Padding::OaepSha256 => WrapPadding::OaepSha256,
            Padding::Pkcs1v15 => WrapPadding::Pkcs1v15,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let log_level = if args.verbose { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .compact()
        .init();

    info!("Beeblex server starting...");
    let private_key = load_or_generate_key(&args.key)?;

    let api_keys = args
        .api_keys
        .iter()
        .map(|k| ApiKey::parse(k).with_context(|| format!("Invalid API key {k:?}")))
        .collect::<Result<Vec<_>>>()?;

    let mut state = ServerState::new(private_key).with_api_keys(api_keys);
    state.suite = args.cipher.into();
    state.padding = args.padding.into();

    if state.api_keys.is_empty() {
        info!("No --api-key given; accepting any well-formed key");
    }
    info!("Cipher: {}, padding: {}", state.suite, state.padding);

    let app = build_router(Arc::new(state));
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", args.port))
        .await
        .context("Failed to bind HTTP port")?;
    info!("HTTP API listening on port {}", args.port);

    axum::serve(listener, app).await.context("HTTP server failed")
}

fn load_or_generate_key(path: &PathBuf) -> Result<PrivateKey> {
    if path.exists() {
        info!("Loading private key from {:?}", path);
        let pem = fs::read_to_string(path).context("Failed to read key file")?;
        PrivateKey::from_pem(&pem).context("Failed to decode private key")
    } else {
        info!("Generating new 2048-bit key at {:?}", path);
        let key = PrivateKey::generate(2048).context("Failed to generate key")?;
        fs::write(path, key.to_pem()?).context("Failed to write key file")?;
        Ok(key)
    }
}
