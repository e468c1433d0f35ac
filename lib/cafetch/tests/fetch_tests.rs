//! End-to-end tests of the fetch flow against the TLS test server.

use std::path::PathBuf;
use std::time::Duration;

use assert2::let_assert;
use cafetch::{Error, ErrorKind, FetchConfig};
use cafetch_server::{CannedResponse, Identity, ServerConfig, TlsServer};
use http::Uri;
use tempfile::TempDir;
use tokio::runtime::Runtime;

/// Server running on its own runtime, plus a scratch directory for the CA file.
struct Fixture {
    server: TlsServer,
    _runtime: Runtime,
    dir: TempDir,
}

impl Fixture {
    fn start(config: ServerConfig) -> Self {
        let runtime = Runtime::new().expect("runtime");
        let server = runtime
            .block_on(TlsServer::start(config))
            .expect("server");
        let dir = tempfile::tempdir().expect("tempdir");
        server.identity().write_pem(dir.path()).expect("write identity");

        Self {
            server,
            _runtime: runtime,
            dir,
        }
    }

    fn ca_path(&self) -> PathBuf {
        self.dir.path().join("cert.pem")
    }

    fn overwrite_ca(&self, contents: &str) {
        std::fs::write(self.ca_path(), contents).expect("write CA file");
    }

    fn config(&self) -> FetchConfig {
        FetchConfig::builder()
            .ca_cert_path(self.ca_path())
            .target_url(self.server.url().parse::<Uri>().expect("url"))
            .timeout(Duration::from_secs(10))
            .build()
    }

    fn run(&self) -> (cafetch::Result<()>, String) {
        let mut out = Vec::new();
        let result = cafetch::run(&self.config(), &mut out);
        (result, String::from_utf8(out).expect("utf-8 output"))
    }
}

#[test]
fn prints_body_from_trusted_server() {
    let fixture = Fixture::start(ServerConfig::default());

    let (result, printed) = fixture.run();

    let_assert!(Ok(()) = result);
    assert_eq!(printed, "Response body: Hello\n");
    assert_eq!(fixture.server.requests_served(), 1);
}

#[test]
fn buffered_response_keeps_status_and_headers() {
    let fixture = Fixture::start(
        ServerConfig::default().with_response(CannedResponse::new(201, "created")),
    );

    let_assert!(Ok(response) = cafetch::fetch_blocking(&fixture.config()));
    assert_eq!(response.status(), 201);
    assert_eq!(response.header("content-length"), Some("7"));
    assert_eq!(response.text_lossy(), "created");
}

#[test]
fn missing_ca_file_skips_network() {
    let fixture = Fixture::start(ServerConfig::default());
    std::fs::remove_file(fixture.ca_path()).expect("remove CA file");

    let (result, printed) = fixture.run();

    let_assert!(Err(err) = result);
    assert_eq!(err.kind(), ErrorKind::FileRead);
    assert_eq!(printed.lines().count(), 1);
    assert!(printed.starts_with("Error reading CA certificate: "));
    assert_eq!(fixture.server.requests_served(), 0);
}

#[test]
fn ca_file_without_certificates_fails_handshake() {
    let fixture = Fixture::start(ServerConfig::default());
    fixture.overwrite_ca("this file holds no PEM block\n");

    let (result, printed) = fixture.run();

    let_assert!(Err(err) = result);
    assert!(err.is_tls(), "unexpected error: {err}");
    assert_eq!(err.kind(), ErrorKind::Request);
    assert!(printed.starts_with("Error making HTTPS request: TLS error: "));
    assert_eq!(printed.lines().count(), 1);
    assert_eq!(fixture.server.requests_served(), 0);
}

#[test]
fn ca_file_without_certificates_with_required_roots() {
    let fixture = Fixture::start(ServerConfig::default());
    fixture.overwrite_ca("this file holds no PEM block\n");
    let config = FetchConfig {
        require_roots: true,
        ..fixture.config()
    };

    let mut out = Vec::new();
    let_assert!(Err(err) = cafetch::run(&config, &mut out));
    let_assert!(Error::EmptyTrustStore { .. } = &err);

    let printed = String::from_utf8(out).expect("utf-8 output");
    assert!(printed.starts_with("Error loading CA certificate: no valid certificate found in "));
    assert_eq!(fixture.server.requests_served(), 0);
}

#[test]
fn server_signed_by_another_ca_is_rejected() {
    let fixture = Fixture::start(ServerConfig::default());
    let other = Identity::generate(["localhost"]).expect("identity");
    fixture.overwrite_ca(other.cert_pem());

    let (result, printed) = fixture.run();

    let_assert!(Err(err) = result);
    assert!(err.is_tls(), "unexpected error: {err}");
    assert!(printed.starts_with("Error making HTTPS request: "));
    assert!(!printed.contains("Response body"));
    assert_eq!(fixture.server.requests_served(), 0);
}

#[test]
fn certificate_for_another_host_is_rejected() {
    let fixture = Fixture::start(ServerConfig::default().with_hostnames(["example.test"]));

    let (result, _) = fixture.run();

    let_assert!(Err(err) = result);
    assert!(err.is_tls(), "unexpected error: {err}");
}

#[test]
fn connection_refused() {
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
        listener.local_addr().expect("addr").port()
    };
    let dir = tempfile::tempdir().expect("tempdir");
    let identity = Identity::generate(["localhost"]).expect("identity");
    let (ca_path, _) = identity.write_pem(dir.path()).expect("write identity");

    let config = FetchConfig::builder()
        .ca_cert_path(ca_path)
        .target_url(format!("https://127.0.0.1:{port}").parse::<Uri>().expect("url"))
        .timeout(Duration::from_secs(10))
        .build();

    let mut out = Vec::new();
    let_assert!(Err(err) = cafetch::run(&config, &mut out));
    assert!(err.is_connection(), "unexpected error: {err}");

    let printed = String::from_utf8(out).expect("utf-8 output");
    assert!(printed.starts_with("Error making HTTPS request: connection error: "));
}

#[test]
fn unresponsive_peer_times_out() {
    // Accepted by the kernel backlog, never answered.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().expect("addr").port();
    let dir = tempfile::tempdir().expect("tempdir");
    let identity = Identity::generate(["localhost"]).expect("identity");
    let (ca_path, _) = identity.write_pem(dir.path()).expect("write identity");

    let config = FetchConfig::builder()
        .ca_cert_path(ca_path)
        .target_url(format!("https://127.0.0.1:{port}").parse::<Uri>().expect("url"))
        .timeout(Duration::from_millis(300))
        .build();

    let_assert!(Err(err) = cafetch::fetch_blocking(&config));
    assert!(err.is_timeout(), "unexpected error: {err}");
    assert_eq!(err.kind(), ErrorKind::Request);
    drop(listener);
}

#[test]
fn truncated_body_is_a_body_error() {
    let fixture = Fixture::start(
        ServerConfig::default()
            .with_response(CannedResponse::new(200, "short").with_content_length(64)),
    );

    let (result, printed) = fixture.run();

    let_assert!(Err(err) = result);
    assert_eq!(err.kind(), ErrorKind::BodyRead);
    assert!(printed.starts_with("Error reading response body: "));
    assert_eq!(fixture.server.requests_served(), 1);
}

#[test]
fn error_status_body_is_still_printed() {
    let fixture = Fixture::start(
        ServerConfig::default().with_response(CannedResponse::new(404, "no such page")),
    );

    let (result, printed) = fixture.run();

    let_assert!(Ok(()) = result);
    assert_eq!(printed, "Response body: no such page\n");
}

#[test]
fn repeated_runs_print_identical_output() {
    let fixture = Fixture::start(ServerConfig::default());

    let (first_result, first) = fixture.run();
    let (second_result, second) = fixture.run();

    assert!(first_result.is_ok());
    assert!(second_result.is_ok());
    assert_eq!(first, second);
    assert_eq!(fixture.server.requests_served(), 2);
}

#[test]
fn each_run_opens_a_new_connection() {
    let fixture = Fixture::start(
        ServerConfig::default()
            .with_response(CannedResponse::new(200, "first"))
            .with_response(CannedResponse::new(200, "second")),
    );

    assert_eq!(fixture.run().1, "Response body: first\n");
    assert_eq!(fixture.run().1, "Response body: second\n");
    assert_eq!(fixture.run().1, "Response body: first\n");
}

#[tokio::test]
async fn async_fetch_on_caller_runtime() {
    let server = TlsServer::start(
        ServerConfig::default().with_response(CannedResponse::new(200, "from async")),
    )
    .await
    .expect("server");
    let dir = tempfile::tempdir().expect("tempdir");
    let (ca_path, _) = server.identity().write_pem(dir.path()).expect("write identity");

    let config = FetchConfig::builder()
        .ca_cert_path(ca_path)
        .target_url(server.url().parse::<Uri>().expect("url"))
        .timeout(Duration::from_secs(10))
        .build();

    let_assert!(Ok(response) = cafetch::fetch(&config).await);
    assert!(response.is_success());
    assert_eq!(response.text().expect("utf-8"), "from async");
}
