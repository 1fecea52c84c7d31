//! Optional Prometheus snapshot for one-shot runs.
//!
//! The pipeline records through the `metrics` facade unconditionally. A
//! recorder is only installed when a Pushgateway is configured, so plain CLI
//! runs pay nothing. Short-lived processes cannot be scraped, hence the push.

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;
use std::time::Duration;
use tracing::{info, warn};

pub const PUSHGATEWAY_ENV: &str = "BSKY2MASTO_PUSHGATEWAY_URL";

static HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install the Prometheus recorder if `BSKY2MASTO_PUSHGATEWAY_URL` is set. Idempotent.
pub fn init_metrics() {
    if pushgateway_url().is_none() || HANDLE.get().is_some() {
        return;
    }

    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            let _ = HANDLE.set(handle);
            info!("Prometheus recorder installed");
        }
        Err(e) => warn!("Failed to install Prometheus recorder: {}", e),
    }
}

fn pushgateway_url() -> Option<String> {
    std::env::var(PUSHGATEWAY_ENV)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub fn push_url(base: &str, instance: &str) -> String {
    format!(
        "{}/metrics/job/bsky2masto/instance/{}",
        base.trim_end_matches('/'),
        instance
    )
}

/// Push the current snapshot to the Pushgateway. Never fails the run.
pub async fn push_snapshot(instance: &str, timeout: Duration) {
    let (Some(base), Some(handle)) = (pushgateway_url(), HANDLE.get()) else {
        return;
    };

    send_snapshot(&push_url(&base, instance), handle.render(), timeout).await;
}

async fn send_snapshot(url: &str, body: String, timeout: Duration) -> bool {
    let client = match reqwest::Client::builder().timeout(timeout).build() {
        Ok(client) => client,
        Err(e) => {
            warn!("Failed to build Pushgateway client: {}", e);
            return false;
        }
    };

    match client
        .post(url)
        .header("Content-Type", "text/plain; version=0.0.4")
        .body(body)
        .send()
        .await
    {
        Ok(r) if r.status().is_success() => {
            info!("Pushed metrics to {}", url);
            true
        }
        Ok(r) => {
            warn!(
                "Pushgateway responded with status {} for {}",
                r.status().as_u16(),
                url
            );
            false
        }
        Err(e) => {
            warn!("Failed to push metrics to {}: {}", url, e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_url_trims_trailing_slash() {
        assert_eq!(
            push_url("http://localhost:9091/", "alice.bsky.social"),
            "http://localhost:9091/metrics/job/bsky2masto/instance/alice.bsky.social"
        );
    }

    #[tokio::test]
    async fn test_silent_pushgateway_times_out() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let pushed = tokio::time::timeout(
            Duration::from_secs(5),
            send_snapshot(
                &push_url(&format!("http://{}", addr), "alice.bsky.social"),
                "bsky2masto_matches_total 1\n".to_string(),
                Duration::from_millis(200),
            ),
        )
        .await
        .expect("push should give up after the client timeout");

        assert!(!pushed);
    }
}
