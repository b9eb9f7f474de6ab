//! Decision phase, run before the host handles the request.

use std::time::Duration;

use crate::http::request::{RequestContext, RequestEnvironment};
use crate::http::response;
use crate::interception::admin::AdminPathClassifier;
use crate::interception::session::Session;
use crate::interception::{EarlyOutcome, Interceptor};
use crate::observability::metrics::{self, DecisionOutcome};
use crate::redirection::{Decision, RedirectionClient};

impl Interceptor {
    /// Decide whether the request is answered by a redirection rule.
    ///
    /// Always starts a fresh [`Session`], which must be handed to
    /// [`Interceptor::on_late_dispatch`] once the response is final.
    pub async fn on_early_dispatch(&self, env: &RequestEnvironment) -> (Session, EarlyOutcome) {
        let mut session = Session::start();
        let outcome = self.decide(&mut session, env).await;
        (session, outcome)
    }

    async fn decide(&self, session: &mut Session, env: &RequestEnvironment) -> EarlyOutcome {
        let config = self.store.snapshot();
        let command_timeout = Duration::from_millis(config.timeouts.command_ms);

        let Some(client) = RedirectionClient::from_config(
            &config.redirection,
            self.transport.clone(),
            command_timeout,
        ) else {
            session.state.misconfigured = true;
            tracing::debug!("Redirection project not configured, passing request through");
            metrics::record_decision(DecisionOutcome::Misconfigured);
            return EarlyOutcome::PassThrough;
        };
        let client = session.client.insert(client);

        let request = RequestContext::build(env);

        if config.redirection.do_not_redirect_admin
            && AdminPathClassifier::from_site(&config.site).is_admin(&request.path)
        {
            tracing::debug!(path = %request.path, "Admin path excluded from redirection");
            metrics::record_decision(DecisionOutcome::AdminExcluded);
            return EarlyOutcome::PassThrough;
        }

        let Some(decision) = client.match_request(&request).await else {
            metrics::record_decision(DecisionOutcome::PassThrough);
            return EarlyOutcome::PassThrough;
        };

        let (built, outcome) = match &decision {
            Decision::Gone { .. } => (Ok(response::gone()), DecisionOutcome::Gone),
            Decision::Redirect {
                status, location, ..
            } => (
                response::redirect(*status, location),
                DecisionOutcome::Redirect,
            ),
        };

        match built {
            Ok(terminal) => {
                tracing::info!(
                    host = %request.host,
                    path = %request.path,
                    status = terminal.status().as_u16(),
                    rule_id = decision.rule_id().unwrap_or("-"),
                    "Request answered by redirection rule"
                );
                metrics::record_decision(outcome);
                session.state.last_rule_id = decision.into_rule_id();
                EarlyOutcome::Terminate(terminal)
            }
            Err(e) => {
                tracing::warn!(
                    path = %request.path,
                    rule_id = decision.rule_id().unwrap_or("-"),
                    error = %e,
                    "Cannot apply redirection rule, passing request through"
                );
                metrics::record_decision(DecisionOutcome::PassThrough);
                EarlyOutcome::PassThrough
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConfigStore, ConnectionConfig, EdgeConfig};
    use crate::redirection::{ClientResult, Command, Endpoint, RuleMatch, Transport};
    use async_trait::async_trait;
    use axum::http::{HeaderMap, StatusCode};
    use std::sync::{Arc, Mutex};

    struct OneRule {
        sent: Mutex<Vec<&'static str>>,
    }

    #[async_trait]
    impl Transport for OneRule {
        async fn send(
            &self,
            _endpoints: &[Endpoint],
            _project_key: &str,
            command: &Command,
        ) -> ClientResult<Option<RuleMatch>> {
            self.sent.lock().unwrap().push(command.name());
            match command {
                Command::Match(request) if request.path == "/gone" => Ok(Some(RuleMatch {
                    status_code: 410,
                    location: None,
                    rule_id: Some("r1".into()),
                })),
                _ => Ok(None),
            }
        }
    }

    fn interceptor(config: EdgeConfig) -> (Interceptor, Arc<OneRule>) {
        let transport = Arc::new(OneRule {
            sent: Mutex::new(Vec::new()),
        });
        let interceptor = Interceptor::new(Arc::new(ConfigStore::new(config)), transport.clone());
        (interceptor, transport)
    }

    fn configured() -> EdgeConfig {
        let mut config = EdgeConfig::default();
        config.redirection.project_key = "key".into();
        config.redirection.connections = Some(vec![ConnectionConfig {
            name: "agent".into(),
            remote_socket: "tcp://127.0.0.1:20301".into(),
        }]);
        config
    }

    fn env(path: &str) -> RequestEnvironment {
        RequestEnvironment {
            host: Some("example.com".into()),
            request_uri: path.into(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_fresh_install_is_misconfigured() {
        let (interceptor, transport) = interceptor(EdgeConfig::default());

        let (session, outcome) = interceptor.on_early_dispatch(&env("/gone")).await;
        assert!(outcome.is_pass_through());
        assert!(session.is_misconfigured());

        let report =
            interceptor.on_late_dispatch(session, &env("/gone"), StatusCode::OK, &HeaderMap::new());
        assert!(report.is_none());
        assert!(transport.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_matched_rule_is_recorded_in_session() {
        let (interceptor, transport) = interceptor(configured());

        let (session, outcome) = interceptor.on_early_dispatch(&env("/gone")).await;
        match outcome {
            EarlyOutcome::Terminate(response) => assert_eq!(response.status(), StatusCode::GONE),
            EarlyOutcome::PassThrough => panic!("expected a terminal response"),
        }
        assert_eq!(session.last_rule_id(), Some("r1"));

        interceptor
            .on_late_dispatch(session, &env("/gone"), StatusCode::GONE, &HeaderMap::new())
            .unwrap()
            .await
            .unwrap();
        assert_eq!(*transport.sent.lock().unwrap(), vec!["match", "log"]);
    }

    #[tokio::test]
    async fn test_each_request_starts_a_clean_session() {
        let (interceptor, _) = interceptor(configured());

        let (first, _) = interceptor.on_early_dispatch(&env("/gone")).await;
        let (second, outcome) = interceptor.on_early_dispatch(&env("/page")).await;

        assert_eq!(first.last_rule_id(), Some("r1"));
        assert!(outcome.is_pass_through());
        assert_eq!(second.state(), &crate::interception::SessionState::default());
    }
}
