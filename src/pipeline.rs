use crate::apis::bluesky::fetch_follows;
use crate::app::ports::{FollowsApi, HandleVerifier};
use crate::constants::{self, BRIDGE_PROGRESS_EVERY, VERIFY_PROGRESS_EVERY};
use crate::error::Result;
use crate::handles::extract_candidates;
use crate::types::{CandidateHandle, FollowedProfile, Match, Provenance, Verdict};
use futures::stream::{self, StreamExt};
use metrics::{counter, histogram};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument};

#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub max_follows: Option<usize>,
    pub include_bridgy: bool,
    pub verify: bool,
    /// Sleep before every Bridgy Fed lookup
    pub bridge_pause: Duration,
    pub workers: usize,
    pub page_size: u32,
    pub bridge_domain: String,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            max_follows: None,
            include_bridgy: false,
            verify: false,
            bridge_pause: Duration::from_millis(constants::DEFAULT_BRIDGE_PAUSE_MS),
            workers: constants::DEFAULT_WORKERS,
            page_size: constants::FOLLOWS_PAGE_SIZE,
            bridge_domain: constants::BRIDGE_DOMAIN.to_string(),
        }
    }
}

/// Result of a complete pipeline run
#[derive(Debug)]
pub struct PipelineResult {
    pub matches: Vec<Match>,
    /// Number of follows fetched and scanned
    pub scanned: usize,
}

impl PipelineResult {
    /// Handles for the import list: everything not rejected by verification
    pub fn importable_handles(&self) -> Vec<String> {
        self.matches
            .iter()
            .filter(|m| m.verified.is_importable())
            .map(|m| m.mastodon_handle.clone())
            .collect()
    }
}

/// A followed profile after extraction, candidates deduped in first-seen order
#[derive(Debug)]
struct ScannedProfile {
    handle: String,
    display_name: String,
    candidates: Vec<CandidateHandle>,
}

pub struct MatchPipeline {
    follows: Arc<dyn FollowsApi>,
    verifier: Arc<dyn HandleVerifier>,
    options: PipelineOptions,
}

impl MatchPipeline {
    pub fn new(
        follows: Arc<dyn FollowsApi>,
        verifier: Arc<dyn HandleVerifier>,
        options: PipelineOptions,
    ) -> Self {
        Self {
            follows,
            verifier,
            options,
        }
    }

    /// Fetch, scan, verify and assemble matches for `actor`.
    ///
    /// Only a failed fetch is an error; failed lookups become negative verdicts.
    #[instrument(skip(self), fields(verify = self.options.verify, bridgy = self.options.include_bridgy))]
    pub async fn run(&self, actor: &str) -> Result<PipelineResult> {
        let t_fetch = Instant::now();
        let follows = fetch_follows(
            self.follows.as_ref(),
            actor,
            self.options.max_follows,
            self.options.page_size,
        )
        .await?;
        histogram!("bsky2masto_stage_duration_seconds", "stage" => "fetch")
            .record(t_fetch.elapsed().as_secs_f64());

        info!(
            "[2/3] Scanning {} followed profiles (verify={}, bridgy={}, workers={})...",
            follows.len(),
            on_off(self.options.verify),
            on_off(self.options.include_bridgy),
            self.workers()
        );
        let profiles = scan_profiles(&follows);

        let t_verify = Instant::now();
        let verify_results = if self.options.verify {
            let unique: BTreeSet<String> = profiles
                .iter()
                .flat_map(|p| p.candidates.iter().map(|c| c.handle.clone()))
                .collect();
            self.verify_candidates(unique).await
        } else {
            HashMap::new()
        };

        let bridged = if self.options.include_bridgy {
            let mut seen = HashSet::new();
            let handles: Vec<String> = profiles
                .iter()
                .filter(|p| !p.handle.is_empty())
                .filter(|p| seen.insert(p.handle.clone()))
                .map(|p| p.handle.clone())
                .collect();
            self.check_bridged(handles).await
        } else {
            HashSet::new()
        };
        histogram!("bsky2masto_stage_duration_seconds", "stage" => "verify")
            .record(t_verify.elapsed().as_secs_f64());

        let matches = assemble_matches(&profiles, &verify_results, &bridged, &self.options);
        counter!("bsky2masto_matches_total").increment(matches.len() as u64);

        Ok(PipelineResult {
            matches,
            scanned: follows.len(),
        })
    }

    fn workers(&self) -> usize {
        self.options.workers.max(1)
    }

    async fn verify_candidates(&self, candidates: BTreeSet<String>) -> HashMap<String, bool> {
        if candidates.is_empty() {
            return HashMap::new();
        }

        let total = candidates.len();
        let workers = self.workers();
        info!(
            "  verifying {} unique discovered handles with {} workers...",
            total, workers
        );

        let verifier = &self.verifier;
        let mut lookups = stream::iter(candidates.into_iter().map(|candidate| async move {
            let exists = verifier.check_handle_exists(&candidate).await;
            (candidate, exists)
        }))
        .buffer_unordered(workers);

        let mut results = HashMap::with_capacity(total);
        let mut done = 0;
        while let Some((candidate, exists)) = lookups.next().await {
            results.insert(candidate, exists);
            done += 1;
            if done % VERIFY_PROGRESS_EVERY == 0 || done == total {
                info!("    verified {}/{}", done, total);
            }
        }
        results
    }

    async fn check_bridged(&self, handles: Vec<String>) -> HashSet<String> {
        if handles.is_empty() {
            return HashSet::new();
        }

        let total = handles.len();
        let workers = self.workers();
        info!(
            "  checking Bridgy Fed opt-in for {} follows with {} workers...",
            total, workers
        );

        let verifier = &self.verifier;
        let pause = self.options.bridge_pause;
        let mut lookups = stream::iter(handles.into_iter().map(|handle| async move {
            if !pause.is_zero() {
                tokio::time::sleep(pause).await;
            }
            let bridged = verifier.check_bridged(&handle).await;
            (handle, bridged)
        }))
        .buffer_unordered(workers);

        let mut bridged = HashSet::new();
        let mut done = 0;
        while let Some((handle, is_bridged)) = lookups.next().await {
            if is_bridged {
                bridged.insert(handle);
            }
            done += 1;
            if done % BRIDGE_PROGRESS_EVERY == 0 || done == total {
                info!("    bridgy checked {}/{}", done, total);
            }
        }
        bridged
    }
}

fn on_off(flag: bool) -> &'static str {
    if flag {
        "on"
    } else {
        "off"
    }
}

fn scan_profiles(follows: &[FollowedProfile]) -> Vec<ScannedProfile> {
    let total = follows.len();
    follows
        .iter()
        .enumerate()
        .map(|(idx, follow)| {
            let handle = follow.handle.trim().to_string();
            let display_name = follow.display_name.trim().to_string();
            debug!("  [{}/{}] {}", idx + 1, total, handle);

            let mut seen = HashSet::new();
            let candidates: Vec<CandidateHandle> = extract_candidates(&follow.description)
                .into_iter()
                .chain(extract_candidates(&display_name))
                .filter(|c| seen.insert(c.handle.clone()))
                .collect();

            for candidate in &candidates {
                counter!("bsky2masto_candidates_total", "source" => candidate.provenance.as_str())
                    .increment(1);
            }

            ScannedProfile {
                handle,
                display_name,
                candidates,
            }
        })
        .collect()
}

fn assemble_matches(
    profiles: &[ScannedProfile],
    verify_results: &HashMap<String, bool>,
    bridged: &HashSet<String>,
    options: &PipelineOptions,
) -> Vec<Match> {
    let mut matches = Vec::new();

    for profile in profiles {
        for candidate in &profile.candidates {
            let verified = if !options.verify {
                Verdict::Skipped
            } else if verify_results.get(&candidate.handle).copied().unwrap_or(false) {
                Verdict::Verified
            } else {
                Verdict::Unverified
            };

            matches.push(Match {
                bluesky_handle: profile.handle.clone(),
                bluesky_display_name: profile.display_name.clone(),
                mastodon_handle: candidate.handle.clone(),
                source: candidate.provenance,
                verified,
            });
        }

        if options.include_bridgy && bridged.contains(&profile.handle) {
            matches.push(Match {
                bluesky_handle: profile.handle.clone(),
                bluesky_display_name: profile.display_name.clone(),
                mastodon_handle: format!("{}@{}", profile.handle, options.bridge_domain),
                source: Provenance::Bridge,
                verified: Verdict::Verified,
            });
        }
    }

    matches
}
