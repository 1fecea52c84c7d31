use crate::app::ports::HandleVerifier;
use crate::config::{BridgeConfig, HttpConfig, VerifyConfig};
use crate::constants::WEBFINGER_PATH;
use crate::error::Result;
use crate::infra::http_client::build_client;
use async_trait::async_trait;
use metrics::counter;
use tracing::{debug, instrument};

/// WebFinger used purely as an existence oracle: any JSON body means "exists".
pub struct WebfingerClient {
    client: reqwest::Client,
    scheme: String,
    bridge_domain: String,
}

impl WebfingerClient {
    pub fn new(bridge: &BridgeConfig, verify: &VerifyConfig, http: &HttpConfig) -> Result<Self> {
        Ok(Self {
            client: build_client(http)?,
            scheme: verify.scheme.clone(),
            bridge_domain: bridge.domain.clone(),
        })
    }

    async fn lookup(&self, domain: &str, resource: &str) -> Result<serde_json::Value> {
        let url = format!("{}://{}{}", self.scheme, domain, WEBFINGER_PATH);
        let response = self
            .client
            .get(&url)
            .query(&[("resource", resource)])
            .send()
            .await?
            .error_for_status()?;
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn resolves(&self, kind: &'static str, domain: &str, resource: &str) -> bool {
        match self.lookup(domain, resource).await {
            Ok(_) => {
                counter!("bsky2masto_lookups_total", "kind" => kind, "outcome" => "found")
                    .increment(1);
                true
            }
            Err(e) => {
                debug!("WebFinger lookup for {} failed: {}", resource, e);
                counter!("bsky2masto_lookups_total", "kind" => kind, "outcome" => "missing")
                    .increment(1);
                false
            }
        }
    }
}

#[async_trait]
impl HandleVerifier for WebfingerClient {
    #[instrument(skip(self))]
    async fn check_bridged(&self, bsky_handle: &str) -> bool {
        let resource = format!("acct:{}@{}", bsky_handle, self.bridge_domain);
        self.resolves("bridge", &self.bridge_domain, &resource).await
    }

    #[instrument(skip(self))]
    async fn check_handle_exists(&self, handle: &str) -> bool {
        let Some((local, domain)) = handle.split_once('@') else {
            return false;
        };
        let resource = format!("acct:{}@{}", local, domain);
        self.resolves("handle", domain, &resource).await
    }
}
