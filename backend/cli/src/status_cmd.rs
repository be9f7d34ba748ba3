//! CLI Status Command
//!
//! Queries `/health` on a running gateway.

use std::time::Duration;

use anyhow::Result;
use serde_json::Value;

use crate::terminal_output::{note_error, note_success};

/// Health URL for a gateway bound to `bind:port`; wildcard binds are reached via loopback.
pub fn health_url(bind: &str, port: u16) -> String {
    let host = match bind {
        "0.0.0.0" | "::" | "[::]" | "" => "127.0.0.1",
        other => other,
    };
    format!("http://{host}:{port}/health")
}

pub async fn run(bind: &str, port: u16) -> Result<()> {
    let url = health_url(bind, port);
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(5))
        .build()?;

    match client.get(&url).send().await {
        Ok(resp) => {
            let body: Value = resp.json().await?;
            note_success(&format!("kvforge gateway is up at {url}"));
            println!("{}", serde_json::to_string_pretty(&body)?);
        }
        Err(e) => {
            note_error(&format!("kvforge gateway is not reachable at {url}: {e}"));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wildcard_bind_uses_loopback() {
        assert_eq!(health_url("0.0.0.0", 8000), "http://127.0.0.1:8000/health");
        assert_eq!(health_url("10.1.2.3", 9000), "http://10.1.2.3:9000/health");
    }
}
