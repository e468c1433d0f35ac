//! `cafetch-server`: serve canned responses over TLS with a fresh self-signed certificate.

use std::net::{Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use cafetch_server::{CannedResponse, Identity, Result, ServerConfig, TlsServer};
use clap::Parser;
use tracing::info;

#[derive(Parser)]
#[command(name = "cafetch-server")]
#[command(about = "TLS test server writing its self-signed cert.pem to the working directory", long_about = None)]
#[command(version)]
struct Opts {
    /// Host name the certificate is issued for
    #[arg(long, default_value = "localhost")]
    hostname: String,

    /// Response body files, served in turn
    #[arg(long = "file")]
    files: Vec<PathBuf>,

    /// Status codes paired with the files
    #[arg(long = "status")]
    statuses: Vec<u16>,

    /// Port to listen on
    #[arg(long, default_value_t = 8080)]
    port: u16,
}

impl Opts {
    fn responses(&self) -> Result<Vec<CannedResponse>> {
        self.files
            .iter()
            .zip(&self.statuses)
            .map(|(path, status)| {
                let body = std::fs::read(path)?;
                Ok(CannedResponse::new(
                    *status,
                    String::from_utf8_lossy(&body),
                ))
            })
            .collect()
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let opts = Opts::parse();
    tracing_subscriber::fmt()
        .json()
        .with_max_level(tracing::Level::TRACE)
        .with_current_span(false)
        .init();

    let identity = Identity::generate([opts.hostname.clone()])?;
    let (cert_path, key_path) = identity.write_pem(".")?;
    info!(cert = %cert_path.display(), key = %key_path.display(), "wrote identity");

    let config = ServerConfig {
        bind: SocketAddr::from((Ipv4Addr::UNSPECIFIED, opts.port)),
        hostnames: vec![opts.hostname.clone()],
        responses: opts.responses()?,
    };

    let server = TlsServer::start_with_identity(config, identity).await?;
    server.join().await
}
