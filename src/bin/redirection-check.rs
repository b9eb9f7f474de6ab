//! Ask the redirection service what it would do with a URL.
//!
//! Runs the same client the edge uses, with the edge's configuration, and
//! prints the outcome as JSON. Nothing is logged to the service.

use clap::Parser;
use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

use redirection_edge::config::{load_config, EdgeConfig};
use redirection_edge::http::request::{RequestContext, RequestEnvironment};
use redirection_edge::interception::AdminPathClassifier;
use redirection_edge::redirection::{Decision, RedirectionClient, SocketTransport};

#[derive(Parser)]
#[command(name = "redirection-check")]
#[command(about = "Query the redirection service for a single URL", long_about = None)]
struct Cli {
    /// URL to check, e.g. https://example.com/old-page?x=1
    url: String,

    /// Path to the TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[arg(long, default_value = "")]
    user_agent: String,

    #[arg(long, default_value = "")]
    referrer: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => EdgeConfig::default(),
    };

    let env = environment(&cli)?;
    let request = RequestContext::build(&env);
    let outcome = check(&config, &request).await;

    println!(
        "{}",
        serde_json::to_string_pretty(&json!({ "request": request, "outcome": outcome }))?
    );
    Ok(())
}

fn environment(cli: &Cli) -> Result<RequestEnvironment, url::ParseError> {
    let url = Url::parse(&cli.url)?;

    let host = url.host_str().map(|host| match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    });
    let request_uri = match url.query() {
        Some(query) => format!("{}?{}", url.path(), query),
        None => url.path().to_string(),
    };
    let non_empty = |s: &str| (!s.is_empty()).then(|| s.to_string());

    Ok(RequestEnvironment {
        host,
        request_uri,
        user_agent: non_empty(&cli.user_agent),
        referrer: non_empty(&cli.referrer),
        forwarded_proto: Some(url.scheme().to_string()),
        tls: false,
    })
}

async fn check(config: &EdgeConfig, request: &RequestContext) -> Value {
    let transport = Arc::new(SocketTransport::new(Duration::from_millis(
        config.timeouts.connect_ms,
    )));
    let Some(client) = RedirectionClient::from_config(
        &config.redirection,
        transport,
        Duration::from_millis(config.timeouts.command_ms),
    ) else {
        return json!({ "result": "misconfigured" });
    };

    if config.redirection.do_not_redirect_admin
        && AdminPathClassifier::from_site(&config.site).is_admin(&request.path)
    {
        return json!({ "result": "admin_excluded" });
    }

    match client.match_request(request).await {
        None => json!({ "result": "pass_through" }),
        Some(Decision::Gone { rule_id }) => json!({
            "result": "gone",
            "status": 410,
            "rule_id": rule_id,
        }),
        Some(Decision::Redirect {
            status,
            location,
            rule_id,
        }) => json!({
            "result": "redirect",
            "status": status,
            "location": location,
            "rule_id": rule_id,
        }),
    }
}
