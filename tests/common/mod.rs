//! Shared utilities for integration tests.
#![allow(dead_code)]

use async_trait::async_trait;
use axum::http::{header, StatusCode};
use axum::routing::get;
use axum::Router;
use serde_json::Value;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;

use redirection_edge::config::{ConnectionConfig, EdgeConfig};
use redirection_edge::http::RequestContext;
use redirection_edge::redirection::{
    ClientError, ClientResult, Command, Endpoint, LogRequest, RuleMatch, Transport,
};

/// Transport that answers from a path → rule table and records every command.
#[derive(Default)]
pub struct RecordingTransport {
    rules: HashMap<String, RuleMatch>,
    fail: bool,
    log_delay: Option<Duration>,
    sent: Mutex<Vec<Command>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// A transport whose service is always unreachable.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn with_rule(mut self, path: &str, rule: RuleMatch) -> Self {
        self.rules.insert(path.to_string(), rule);
        self
    }

    /// Make every log command take `delay` before completing.
    pub fn with_log_delay(mut self, delay: Duration) -> Self {
        self.log_delay = Some(delay);
        self
    }

    /// Wait until at least `count` commands were sent.
    ///
    /// Log commands are delivered in the background, after the response.
    pub async fn wait_for_commands(&self, count: usize) -> Vec<Command> {
        for _ in 0..100 {
            let commands = self.commands();
            if commands.len() >= count {
                return commands;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        self.commands()
    }

    /// Wait until at least `count` log commands were sent.
    pub async fn wait_for_logs(&self, count: usize) -> Vec<LogRequest> {
        for _ in 0..100 {
            let logs = self.logs();
            if logs.len() >= count {
                return logs;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        self.logs()
    }

    pub fn commands(&self) -> Vec<Command> {
        self.sent.lock().unwrap().clone()
    }

    pub fn matches(&self) -> Vec<RequestContext> {
        self.commands()
            .into_iter()
            .filter_map(|c| match c {
                Command::Match(request) => Some(request),
                Command::Log(_) => None,
            })
            .collect()
    }

    pub fn logs(&self) -> Vec<LogRequest> {
        self.commands()
            .into_iter()
            .filter_map(|c| match c {
                Command::Log(log) => Some(log),
                Command::Match(_) => None,
            })
            .collect()
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn send(
        &self,
        _endpoints: &[Endpoint],
        _project_key: &str,
        command: &Command,
    ) -> ClientResult<Option<RuleMatch>> {
        self.sent.lock().unwrap().push(command.clone());
        if self.fail {
            return Err(ClientError::Connection("agent: connection refused".into()));
        }
        match command {
            Command::Match(request) => Ok(self.rules.get(&request.path).cloned()),
            Command::Log(_) => {
                if let Some(delay) = self.log_delay {
                    tokio::time::sleep(delay).await;
                }
                Ok(None)
            }
        }
    }
}

pub fn rule(status_code: u16, location: Option<&str>, rule_id: Option<&str>) -> RuleMatch {
    RuleMatch {
        status_code,
        location: location.map(str::to_string),
        rule_id: rule_id.map(str::to_string),
    }
}

/// Configuration with a usable redirection project pointing at `remote_socket`.
pub fn configured(remote_socket: &str) -> EdgeConfig {
    let mut config = EdgeConfig::default();
    config.redirection.project_key = "test-project".into();
    config.redirection.connections = Some(vec![ConnectionConfig {
        name: "agent".into(),
        remote_socket: remote_socket.into(),
    }]);
    config.timeouts.command_ms = 500;
    config
}

/// Start a site upstream on an ephemeral port.
///
/// `/moved` answers 302 to `/elsewhere`, `/missing` answers 404, and every
/// other path answers 200 with a short page.
pub async fn start_mock_upstream() -> SocketAddr {
    let app = Router::new()
        .route(
            "/moved",
            get(|| async { (StatusCode::FOUND, [(header::LOCATION, "/elsewhere")]) }),
        )
        .route("/missing", get(|| async { StatusCode::NOT_FOUND }))
        .fallback(|| async { "upstream page" });

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    addr
}

/// A line-delimited JSON redirection service listening on an ephemeral port.
pub struct FakeDaemon {
    pub addr: SocketAddr,
    received: Arc<Mutex<Vec<Value>>>,
}

impl FakeDaemon {
    pub fn remote_socket(&self) -> String {
        format!("tcp://{}", self.addr)
    }

    pub fn received(&self) -> Vec<Value> {
        self.received.lock().unwrap().clone()
    }

    /// Wait until at least `count` commands arrived.
    pub async fn wait_for(&self, count: usize) -> Vec<Value> {
        for _ in 0..100 {
            let received = self.received();
            if received.len() >= count {
                return received;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        self.received()
    }
}

/// Start a fake service.
///
/// `reply` is called for every match command; `Some(line)` is written back
/// as the answer and `None` leaves the connection silent.
pub async fn start_fake_daemon<F>(reply: F) -> FakeDaemon
where
    F: Fn(&Value) -> Option<String> + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let received = Arc::new(Mutex::new(Vec::new()));
    let reply = Arc::new(reply);

    let sink = received.clone();
    tokio::spawn(async move {
        while let Ok((socket, _)) = listener.accept().await {
            let sink = sink.clone();
            let reply = reply.clone();
            tokio::spawn(async move {
                let mut socket = BufReader::new(socket);
                let mut line = String::new();
                if socket.read_line(&mut line).await.unwrap_or(0) == 0 {
                    return;
                }
                let Ok(command) = serde_json::from_str::<Value>(line.trim()) else {
                    return;
                };
                sink.lock().unwrap().push(command.clone());

                if command["command"] == "match" {
                    match reply(&command) {
                        Some(answer) => {
                            let _ = socket.get_mut().write_all(answer.as_bytes()).await;
                            let _ = socket.get_mut().write_all(b"\n").await;
                        }
                        None => tokio::time::sleep(Duration::from_secs(30)).await,
                    }
                }
            });
        }
    });

    FakeDaemon { addr, received }
}
