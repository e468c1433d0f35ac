//! TLS server answering every connection with a canned HTTP/1.0 response.

use std::io;
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use http::StatusCode;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use tokio_rustls::TlsAcceptor;
use tracing::{Instrument, debug, info, info_span, warn};

use crate::{Identity, Result, ServerError};

/// Size of the single read taken as the request.
const REQUEST_BUFFER_SIZE: usize = 2048;

/// One response the server can send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CannedResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body.
    pub body: String,
    /// `Content-length` to announce instead of the body length.
    pub content_length: Option<usize>,
}

impl CannedResponse {
    /// Create a response with the given status and body.
    #[must_use]
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
            content_length: None,
        }
    }

    /// Announce a `Content-length` that differs from the actual body.
    #[must_use]
    pub const fn with_content_length(mut self, length: usize) -> Self {
        self.content_length = Some(length);
        self
    }

    /// Serialize as an HTTP/1.0 response closing the connection.
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        let reason = StatusCode::from_u16(self.status)
            .ok()
            .and_then(|status| status.canonical_reason())
            .unwrap_or("");
        let length = self.content_length.unwrap_or(self.body.len());

        let mut out = format!(
            "HTTP/1.0 {} {reason}\r\nConnection: close\r\nContent-length: {length}\r\n\r\n",
            self.status
        )
        .into_bytes();
        out.extend_from_slice(self.body.as_bytes());
        out
    }
}

impl Default for CannedResponse {
    fn default() -> Self {
        Self::new(200, "Hello")
    }
}

/// Configuration for [`TlsServer`].
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind.
    pub bind: SocketAddr,
    /// Host names the generated certificate is valid for.
    pub hostnames: Vec<String>,
    /// Responses served in turn, one per connection.
    pub responses: Vec<CannedResponse>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from((Ipv4Addr::LOCALHOST, 0)),
            hostnames: vec!["localhost".to_string()],
            responses: Vec::new(),
        }
    }
}

impl ServerConfig {
    /// Bind to the given address.
    #[must_use]
    pub const fn with_bind(mut self, bind: SocketAddr) -> Self {
        self.bind = bind;
        self
    }

    /// Issue the certificate for these host names.
    #[must_use]
    pub fn with_hostnames<I, S>(mut self, hostnames: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.hostnames = hostnames.into_iter().map(Into::into).collect();
        self
    }

    /// Append a response to the rotation.
    #[must_use]
    pub fn with_response(mut self, response: CannedResponse) -> Self {
        self.responses.push(response);
        self
    }
}

/// Running TLS server.
///
/// The accept loop runs on the Tokio runtime that started it and is aborted
/// when the server is dropped.
///
/// # Example
///
/// ```ignore
/// let server = TlsServer::start(ServerConfig::default()).await?;
/// std::fs::write("cert.pem", server.identity().cert_pem())?;
/// println!("listening on {}", server.url());
/// ```
#[derive(Debug)]
pub struct TlsServer {
    local_addr: SocketAddr,
    identity: Identity,
    served: Arc<AtomicUsize>,
    task: JoinHandle<()>,
}

impl TlsServer {
    /// Generate an identity for the configured host names and start serving.
    pub async fn start(config: ServerConfig) -> Result<Self> {
        let identity = Identity::generate(config.hostnames.iter().cloned())?;
        Self::start_with_identity(config, identity).await
    }

    /// Start serving with an existing identity.
    pub async fn start_with_identity(config: ServerConfig, identity: Identity) -> Result<Self> {
        if let Some(bad) = config
            .responses
            .iter()
            .find(|response| StatusCode::from_u16(response.status).is_err())
        {
            return Err(ServerError::InvalidStatus(bad.status));
        }

        let acceptor = TlsAcceptor::from(Arc::new(identity.server_config()?));
        let listener = TcpListener::bind(config.bind).await?;
        let local_addr = listener.local_addr()?;
        let responses: Arc<[CannedResponse]> = config.responses.into();
        let served = Arc::new(AtomicUsize::new(0));

        let task = tokio::spawn(
            accept_loop(listener, acceptor, responses, Arc::clone(&served))
                .instrument(info_span!("tls_server", %local_addr)),
        );
        info!(%local_addr, "TLS server listening");

        Ok(Self {
            local_addr,
            identity,
            served,
            task,
        })
    }

    /// Bound address.
    #[must_use]
    pub const fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Bound port.
    #[must_use]
    pub const fn port(&self) -> u16 {
        self.local_addr.port()
    }

    /// `https://localhost:<port>`.
    #[must_use]
    pub fn url(&self) -> String {
        format!("https://localhost:{}", self.port())
    }

    /// Identity presented to clients.
    #[must_use]
    pub const fn identity(&self) -> &Identity {
        &self.identity
    }

    /// Number of requests that completed a TLS handshake and got a response.
    #[must_use]
    pub fn requests_served(&self) -> usize {
        self.served.load(Ordering::SeqCst)
    }

    /// Wait for the accept loop, which only ends when aborted.
    pub async fn join(mut self) -> Result<()> {
        (&mut self.task).await.map_err(|err| ServerError::Io(io::Error::other(err)))
    }

    /// Stop accepting connections.
    pub fn shutdown(self) {
        self.task.abort();
    }
}

impl Drop for TlsServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn accept_loop(
    listener: TcpListener,
    acceptor: TlsAcceptor,
    responses: Arc<[CannedResponse]>,
    served: Arc<AtomicUsize>,
) {
    loop {
        let (stream, peer) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(err) => {
                warn!(%err, "accept failed");
                continue;
            }
        };

        let acceptor = acceptor.clone();
        let responses = Arc::clone(&responses);
        let served = Arc::clone(&served);
        tokio::spawn(
            async move {
                if let Err(err) = handle_connection(acceptor, stream, &responses, &served).await {
                    debug!(%err, "connection failed");
                }
            }
            .instrument(info_span!("connection", %peer)),
        );
    }
}

async fn handle_connection(
    acceptor: TlsAcceptor,
    stream: TcpStream,
    responses: &[CannedResponse],
    served: &AtomicUsize,
) -> io::Result<()> {
    let mut stream = acceptor.accept(stream).await?;

    let mut buffer = vec![0; REQUEST_BUFFER_SIZE];
    let read = stream.read(&mut buffer).await?;
    buffer.truncate(read);
    debug!(request = %String::from_utf8_lossy(&buffer), "request received");

    let index = served.fetch_add(1, Ordering::SeqCst);
    let response = pick(responses, index);
    info!(status = response.status, bytes = response.body.len(), "sending response");

    stream.write_all(&response.encode()).await?;
    stream.flush().await?;
    stream.shutdown().await
}

/// Response for the `index`-th request, cycling through `responses`.
fn pick(responses: &[CannedResponse], index: usize) -> CannedResponse {
    index
        .checked_rem(responses.len())
        .and_then(|i| responses.get(i))
        .cloned()
        .unwrap_or_default()
}
