//! Axum adapter driving both interception phases around the host handler.

use axum::{
    extract::{Request, State},
    middleware::{self, Next},
    response::Response,
    Router,
};
use std::sync::Arc;

use crate::http::request::RequestEnvironment;
use crate::interception::{EarlyOutcome, Interceptor};

pub async fn interception_middleware(
    State(interceptor): State<Arc<Interceptor>>,
    request: Request,
    next: Next,
) -> Response {
    let env = RequestEnvironment::from_request(&request);

    let (session, outcome) = interceptor.on_early_dispatch(&env).await;
    let response = match outcome {
        EarlyOutcome::Terminate(response) => response,
        EarlyOutcome::PassThrough => next.run(request).await,
    };

    interceptor.on_late_dispatch(session, &env, response.status(), response.headers());
    response
}

/// Wrap every route of `router` (fallback included) with interception.
pub fn intercept<S>(router: Router<S>, interceptor: Arc<Interceptor>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router.layer(middleware::from_fn_with_state(
        interceptor,
        interception_middleware,
    ))
}
