//! Request identity as seen by the redirection service.
//!
//! # Responsibilities
//! - Capture the raw request environment (headers, URI, TLS flag)
//! - Normalize it into a [`RequestContext`] (host, path, agent, referrer, scheme)
//! - Generate a request ID for log correlation
//!
//! # Design Decisions
//! - Missing headers become empty strings, never errors
//! - The context is rebuilt by each interception phase from the same environment
//! - Scheme honours `X-Forwarded-Proto` first, so TLS offloaded by a front
//!   proxy is still reported as https

use axum::http::{header, HeaderMap, HeaderValue, Request};
use serde::{Deserialize, Serialize};
use std::fmt;
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

/// Header carrying the request ID.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Header set by TLS-terminating proxies in front of the edge.
pub const X_FORWARDED_PROTO: &str = "x-forwarded-proto";

/// Request extension marking a request received over TLS by this process.
#[derive(Debug, Clone, Copy, Default)]
pub struct ServedOverTls;

/// Raw server environment of one request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestEnvironment {
    /// `Host` header, or the URI authority for HTTP/2 requests.
    pub host: Option<String>,
    /// Path and query string as requested.
    pub request_uri: String,
    pub user_agent: Option<String>,
    pub referrer: Option<String>,
    /// Raw `X-Forwarded-Proto` value.
    pub forwarded_proto: Option<String>,
    /// Whether the connection to this process is TLS.
    pub tls: bool,
}

impl RequestEnvironment {
    /// Capture the environment of an incoming request.
    pub fn from_request<B>(request: &Request<B>) -> Self {
        let headers = request.headers();
        let uri = request.uri();

        let host = header_string(headers, header::HOST)
            .or_else(|| uri.authority().map(|a| a.as_str().to_string()));

        let request_uri = uri
            .path_and_query()
            .map(|pq| pq.as_str().to_string())
            .unwrap_or_else(|| "/".to_string());

        let tls = request.extensions().get::<ServedOverTls>().is_some()
            || uri.scheme_str() == Some("https");

        Self {
            host,
            request_uri,
            user_agent: header_string(headers, header::USER_AGENT),
            referrer: header_string(headers, header::REFERER),
            forwarded_proto: header_string(headers, X_FORWARDED_PROTO),
            tls,
        }
    }
}

fn header_string<K: header::AsHeaderName>(headers: &HeaderMap, name: K) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

/// URL scheme of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Scheme {
    #[default]
    Http,
    Https,
}

impl Scheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scheme::Http => "http",
            Scheme::Https => "https",
        }
    }

    /// Resolve the scheme: forwarded header, then TLS flag, then plain http.
    ///
    /// Only the first value of a comma-separated `X-Forwarded-Proto` is
    /// considered; anything other than http/https is ignored.
    pub fn resolve(forwarded_proto: Option<&str>, tls: bool) -> Self {
        let forwarded = forwarded_proto
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .and_then(|proto| {
                if proto.eq_ignore_ascii_case("https") {
                    Some(Scheme::Https)
                } else if proto.eq_ignore_ascii_case("http") {
                    Some(Scheme::Http)
                } else {
                    None
                }
            });

        match forwarded {
            Some(scheme) => scheme,
            None if tls => Scheme::Https,
            None => Scheme::Http,
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalized identity of a request, sent with every service command.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestContext {
    pub host: String,
    /// Path including the query string.
    pub path: String,
    pub user_agent: String,
    pub referrer: String,
    pub scheme: Scheme,
}

impl RequestContext {
    /// Build the context from a request environment.
    pub fn build(env: &RequestEnvironment) -> Self {
        Self {
            host: env.host.clone().unwrap_or_default(),
            path: env.request_uri.clone(),
            user_agent: env.user_agent.clone().unwrap_or_default(),
            referrer: env.referrer.clone().unwrap_or_default(),
            scheme: Scheme::resolve(env.forwarded_proto.as_deref(), env.tls),
        }
    }
}

/// Generates UUID v4 request IDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidRequestId;

impl MakeRequestId for UuidRequestId {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}
