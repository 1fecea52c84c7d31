use crate::app::ports::FollowsApi;
use crate::config::{BlueskyConfig, HttpConfig};
use crate::constants::GET_FOLLOWS_ENDPOINT;
use crate::error::{MigrateError, Result};
use crate::infra::http_client::build_client;
use crate::types::{FollowedProfile, FollowsPage};
use async_trait::async_trait;
use metrics::counter;
use tracing::{debug, info, instrument};

/// Public Bluesky AppView client; no authentication needed for follows.
pub struct BlueskyClient {
    client: reqwest::Client,
    api_base: String,
}

impl BlueskyClient {
    pub fn new(bluesky: &BlueskyConfig, http: &HttpConfig) -> Result<Self> {
        Ok(Self {
            client: build_client(http)?,
            api_base: bluesky.api_base.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint_url(&self) -> String {
        format!("{}/{}", self.api_base, GET_FOLLOWS_ENDPOINT)
    }
}

#[async_trait]
impl FollowsApi for BlueskyClient {
    #[instrument(skip(self))]
    async fn get_follows_page(
        &self,
        actor: &str,
        limit: u32,
        cursor: Option<&str>,
    ) -> Result<FollowsPage> {
        let url = self.endpoint_url();
        let limit = limit.to_string();
        let mut query = vec![("actor", actor), ("limit", limit.as_str())];
        if let Some(cursor) = cursor {
            query.push(("cursor", cursor));
        }

        let response = self.client.get(&url).query(&query).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(MigrateError::Status {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("").to_string(),
                url,
            });
        }

        let body = response.text().await?;
        let page: FollowsPage = serde_json::from_str(&body)?;
        debug!("Fetched page with {} follows", page.follows.len());
        Ok(page)
    }
}

/// Walk the follows listing for `actor` until the cursor runs out or `max_follows` is reached.
///
/// Any failed page fails the whole fetch; pages already read are dropped.
#[instrument(skip(api))]
pub async fn fetch_follows(
    api: &dyn FollowsApi,
    actor: &str,
    max_follows: Option<usize>,
    page_size: u32,
) -> Result<Vec<FollowedProfile>> {
    let mut follows: Vec<FollowedProfile> = Vec::new();
    let mut cursor: Option<String> = None;
    let mut page = 0;

    info!("[1/3] Fetching follows for {}...", actor);

    loop {
        let batch = api
            .get_follows_page(actor, page_size, cursor.as_deref())
            .await?;
        let added = batch.follows.len();
        follows.extend(batch.follows);
        page += 1;
        info!("  page {}: +{} (total {})", page, added, follows.len());

        if let Some(max) = max_follows {
            if follows.len() >= max {
                follows.truncate(max);
                break;
            }
        }

        match batch.cursor {
            Some(next) if !next.is_empty() => cursor = Some(next),
            _ => break,
        }
    }

    counter!("bsky2masto_follows_fetched_total").increment(follows.len() as u64);
    info!("Fetched {} follows", follows.len());
    Ok(follows)
}
