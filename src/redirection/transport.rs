//! Transport to the redirection service.
//!
//! # Responsibilities
//! - Deliver a [`Command`] to one of the configured endpoints
//! - Return the service's rule answer for match commands
//!
//! # Design Decisions
//! - The endpoint list is opaque to callers; the transport decides how to use it
//! - [`SocketTransport`] fails over across endpoints in configured order,
//!   but never re-sends a command once a connection was established
//! - The default framing is one JSON document per line in each direction

use async_trait::async_trait;
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::time::timeout;

use crate::redirection::error::{ClientError, ClientResult};
use crate::redirection::types::{Command, Endpoint, RuleMatch};

/// Upper bound on one reply line from the service.
const MAX_REPLY_BYTES: u64 = 64 * 1024;

/// Carries commands to the redirection service.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send `command` for `project_key` using the given endpoints.
    ///
    /// Returns the rule answer for match commands that found a rule,
    /// `None` otherwise.
    async fn send(
        &self,
        endpoints: &[Endpoint],
        project_key: &str,
        command: &Command,
    ) -> ClientResult<Option<RuleMatch>>;
}

/// Wire envelope written by [`SocketTransport`].
#[derive(Serialize)]
struct Envelope<'a> {
    project_key: &'a str,
    #[serde(flatten)]
    command: &'a Command,
}

/// Parsed form of an endpoint's `remote_socket`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SocketAddress {
    Tcp(String),
    Unix(PathBuf),
}

impl SocketAddress {
    /// Accepts `tcp://host:port`, `unix:///path` or a bare `host:port`.
    pub fn parse(endpoint: &Endpoint) -> ClientResult<Self> {
        let raw = endpoint.remote_socket.trim();
        let invalid = |reason: &str| ClientError::InvalidEndpoint {
            name: endpoint.name.clone(),
            reason: reason.to_string(),
        };

        if raw.is_empty() {
            return Err(invalid("empty address"));
        }
        if let Some(path) = raw.strip_prefix("unix://") {
            if path.is_empty() {
                return Err(invalid("empty socket path"));
            }
            return Ok(SocketAddress::Unix(PathBuf::from(path)));
        }
        let addr = raw.strip_prefix("tcp://").unwrap_or(raw);
        if addr.contains("://") {
            return Err(invalid("unsupported scheme"));
        }
        match addr.rsplit_once(':') {
            Some((host, port)) if !host.is_empty() && port.parse::<u16>().is_ok() => {}
            _ => return Err(invalid("expected host:port")),
        }
        Ok(SocketAddress::Tcp(addr.to_string()))
    }
}

/// Line-delimited JSON transport over TCP or Unix sockets.
#[derive(Debug, Clone)]
pub struct SocketTransport {
    connect_timeout: Duration,
}

impl SocketTransport {
    pub fn new(connect_timeout: Duration) -> Self {
        Self { connect_timeout }
    }

    async fn exchange<S>(
        &self,
        stream: S,
        line: &[u8],
        expects_reply: bool,
    ) -> ClientResult<Option<RuleMatch>>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let mut stream = BufReader::new(stream);
        stream.get_mut().write_all(line).await?;
        stream.get_mut().flush().await?;

        if !expects_reply {
            return Ok(None);
        }

        let mut reply = String::new();
        let read = (&mut stream)
            .take(MAX_REPLY_BYTES)
            .read_line(&mut reply)
            .await?;
        if read == 0 {
            return Err(ClientError::Protocol(
                "connection closed before reply".to_string(),
            ));
        }
        if !reply.ends_with('\n') && read as u64 >= MAX_REPLY_BYTES {
            return Err(ClientError::Protocol(format!(
                "reply exceeds {} bytes",
                MAX_REPLY_BYTES
            )));
        }
        Ok(serde_json::from_str::<Option<RuleMatch>>(reply.trim())?)
    }

    async fn try_endpoint(
        &self,
        address: &SocketAddress,
        line: &[u8],
        expects_reply: bool,
    ) -> Result<ClientResult<Option<RuleMatch>>, String> {
        match address {
            SocketAddress::Tcp(addr) => {
                let stream =
                    connect(self.connect_timeout, TcpStream::connect(addr.as_str())).await?;
                Ok(self.exchange(stream, line, expects_reply).await)
            }
            #[cfg(unix)]
            SocketAddress::Unix(path) => {
                let stream =
                    connect(self.connect_timeout, tokio::net::UnixStream::connect(path)).await?;
                Ok(self.exchange(stream, line, expects_reply).await)
            }
            #[cfg(not(unix))]
            SocketAddress::Unix(_) => {
                Err("unix sockets are not supported on this platform".to_string())
            }
        }
    }
}

async fn connect<S, F>(limit: Duration, fut: F) -> Result<S, String>
where
    F: std::future::Future<Output = std::io::Result<S>>,
{
    match timeout(limit, fut).await {
        Ok(Ok(stream)) => Ok(stream),
        Ok(Err(e)) => Err(e.to_string()),
        Err(_) => Err(format!("connect timeout after {} ms", limit.as_millis())),
    }
}

#[async_trait]
impl Transport for SocketTransport {
    async fn send(
        &self,
        endpoints: &[Endpoint],
        project_key: &str,
        command: &Command,
    ) -> ClientResult<Option<RuleMatch>> {
        if endpoints.is_empty() {
            return Err(ClientError::NoEndpoint);
        }

        let mut line = serde_json::to_vec(&Envelope {
            project_key,
            command,
        })?;
        line.push(b'\n');

        let mut failures = Vec::new();
        for endpoint in endpoints {
            let address = match SocketAddress::parse(endpoint) {
                Ok(address) => address,
                Err(e) => {
                    tracing::warn!(error = %e, "Skipping redirection endpoint");
                    failures.push(e.to_string());
                    continue;
                }
            };

            match self.try_endpoint(&address, &line, command.expects_reply()).await {
                Ok(result) => return result,
                Err(reason) => {
                    tracing::warn!(
                        endpoint = %endpoint.name,
                        remote_socket = %endpoint.remote_socket,
                        error = %reason,
                        "Redirection endpoint unreachable, trying next"
                    );
                    failures.push(format!("{}: {}", endpoint.name, reason));
                }
            }
        }

        Err(ClientError::Connection(failures.join("; ")))
    }
}
