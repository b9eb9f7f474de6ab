//! Terminal responses and emitted-response inspection.
//!
//! # Responsibilities
//! - Build the short-circuit responses (redirect, 410 Gone)
//! - Mark responses that caches must not keep
//! - Read back the final status and `Location` of whatever the host sent

use axum::body::Body;
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::Response;
use thiserror::Error;

/// Response extension telling caching layers not to store this page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DoNotCachePage;

const NO_CACHE: &str = "no-cache, no-store, must-revalidate";

/// A redirect the host cannot emit.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InvalidRedirect {
    #[error("status {0} is not a redirection status")]
    Status(u16),
    #[error("location '{0}' is not a valid header value")]
    Location(String),
}

/// Build a redirect response with the given status and target.
pub fn redirect(status: u16, location: &str) -> Result<Response, InvalidRedirect> {
    let status = StatusCode::from_u16(status)
        .ok()
        .filter(StatusCode::is_redirection)
        .ok_or(InvalidRedirect::Status(status))?;
    let location = HeaderValue::from_str(location)
        .map_err(|_| InvalidRedirect::Location(location.to_string()))?;

    let mut response = Response::new(Body::empty());
    *response.status_mut() = status;
    response.headers_mut().insert(header::LOCATION, location);
    Ok(response)
}

/// Build a 410 Gone response that caches must not store.
pub fn gone() -> Response {
    let mut response = Response::new(Body::empty());
    *response.status_mut() = StatusCode::GONE;
    mark_do_not_cache(&mut response);
    response
}

/// Flag a response as uncacheable, both for HTTP caches and in-process layers.
pub fn mark_do_not_cache(response: &mut Response) {
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static(NO_CACHE));
    response.extensions_mut().insert(DoNotCachePage);
}

/// Find the redirect target among the emitted headers.
///
/// Every header is rendered as a `name: value` line and searched for
/// `location: `, ignoring case. The text after the marker on the last
/// matching line is returned. Values outside visible ASCII are decoded as
/// UTF-8, lossily.
pub fn emitted_location(headers: &HeaderMap) -> Option<String> {
    const MARKER: &str = "location: ";

    let mut location = None;
    for (name, value) in headers.iter() {
        let value = String::from_utf8_lossy(value.as_bytes());
        let line = format!("{}: {}", name.as_str(), value);
        if let Some(pos) = line.to_ascii_lowercase().find(MARKER) {
            location = Some(line[pos + MARKER.len()..].trim().to_string());
        }
    }
    location
}
