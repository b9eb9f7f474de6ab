//! Logging phase, run once the final response is known.

use axum::http::{HeaderMap, StatusCode};
use tokio::task::JoinHandle;
use tracing::Instrument;

use crate::http::request::{RequestContext, RequestEnvironment};
use crate::http::response::emitted_location;
use crate::interception::session::Session;
use crate::interception::Interceptor;
use crate::redirection::LoggedResponse;

impl Interceptor {
    /// Report the final response of the request to the redirection service.
    ///
    /// The report is captured from `status` and `headers` right away and
    /// delivered by a background task, so the visitor never waits on the
    /// service. Returns `None` when nothing is sent because the decision
    /// phase found the edge misconfigured.
    pub fn on_late_dispatch(
        &self,
        session: Session,
        env: &RequestEnvironment,
        status: StatusCode,
        headers: &HeaderMap,
    ) -> Option<JoinHandle<()>> {
        if session.is_misconfigured() {
            return None;
        }
        let Session { state, client } = session;
        let client = client?;

        let request = RequestContext::build(env);
        let response = LoggedResponse {
            status_code: status.as_u16(),
            rule_id: state.last_rule_id,
            location: emitted_location(headers),
        };

        tracing::debug!(
            path = %request.path,
            status = response.status_code,
            rule_id = response.rule_id.as_deref().unwrap_or("-"),
            "Reporting response to redirection service"
        );
        Some(tokio::spawn(
            async move { client.log(&request, &response).await }
                .instrument(tracing::Span::current()),
        ))
    }
}
