//! A toy redirection service speaking the edge's JSON-lines protocol.
//!
//! ```text
//! cargo run --example redirection_daemon -- --listen 127.0.0.1:20301
//! ```
//!
//! Rules are fixed: `/old` redirects to `/new` (301) and `/retired` is gone.
//! Log commands are printed to stdout.

use clap::Parser;
use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;

#[derive(Parser)]
struct Args {
    #[arg(long, default_value = "127.0.0.1:20301")]
    listen: String,
}

fn answer(payload: &Value) -> Value {
    let path = payload["path"].as_str().unwrap_or_default();
    let path = path.split('?').next().unwrap_or_default();
    match path {
        "/old" => json!({
            "status_code": 301,
            "location": format!("{}://{}/new", payload["scheme"].as_str().unwrap_or("http"), payload["host"].as_str().unwrap_or("localhost")),
            "rule_id": "demo-old",
        }),
        "/retired" => json!({ "status_code": 410, "rule_id": "demo-retired" }),
        _ => Value::Null,
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let listener = TcpListener::bind(&args.listen).await?;
    println!("Redirection daemon listening on {}", listener.local_addr()?);

    loop {
        let (socket, peer) = listener.accept().await?;
        tokio::spawn(async move {
            let mut socket = BufReader::new(socket);
            let mut line = String::new();
            if socket.read_line(&mut line).await.unwrap_or(0) == 0 {
                return;
            }
            let command: Value = match serde_json::from_str(line.trim()) {
                Ok(command) => command,
                Err(e) => {
                    eprintln!("{peer}: bad command: {e}");
                    return;
                }
            };

            match command["command"].as_str() {
                Some("match") => {
                    let reply = answer(&command["payload"]);
                    println!("match {} -> {}", command["payload"]["path"], reply);
                    let _ = socket.get_mut().write_all(format!("{reply}\n").as_bytes()).await;
                }
                Some("log") => println!("log {}", command["payload"]),
                _ => eprintln!("{peer}: unknown command"),
            }
        });
    }
}
