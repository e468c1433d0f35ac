//! `cafetch`: GET one HTTPS URL trusting only the given CA file, print the body.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use cafetch::{DEFAULT_CA_CERT_PATH, DEFAULT_TARGET_URL, FetchConfig};
use clap::Parser;
use http::Uri;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "cafetch")]
#[command(about = "Fetch an HTTPS URL trusting only the CA certificates of a PEM file", long_about = None)]
#[command(version)]
struct Cli {
    /// PEM file with the trusted CA certificates
    #[arg(long, env = "CAFETCH_CA_CERT", default_value = DEFAULT_CA_CERT_PATH)]
    ca_cert: PathBuf,

    /// URL to fetch
    #[arg(long, env = "CAFETCH_URL", default_value = DEFAULT_TARGET_URL)]
    url: Uri,

    /// Request timeout in seconds (none by default)
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Connection timeout in seconds (none by default)
    #[arg(long, value_name = "SECS")]
    connect_timeout: Option<u64>,

    /// Fail before connecting if the CA file contains no certificate
    #[arg(long)]
    require_roots: bool,

    /// Always exit with status 0, even when the fetch failed
    #[arg(long)]
    legacy_exit_status: bool,
}

impl Cli {
    fn config(&self) -> FetchConfig {
        let mut builder = FetchConfig::builder()
            .ca_cert_path(&self.ca_cert)
            .target_url(self.url.clone())
            .require_roots(self.require_roots);
        if let Some(secs) = self.timeout {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        if let Some(secs) = self.connect_timeout {
            builder = builder.connect_timeout(Duration::from_secs(secs));
        }
        builder.build()
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = cli.config();
    let mut stdout = std::io::stdout().lock();

    match cafetch::run(&config, &mut stdout) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::debug!(kind = %err.kind(), "fetch failed");
            if cli.legacy_exit_status {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(err.kind().exit_code())
            }
        }
    }
}
