use serde::Deserialize;
use std::fmt;

/// A profile the actor follows, as returned by `app.bsky.graph.getFollows`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowedProfile {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub handle: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub display_name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub description: String,
}

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// One page of the follows listing
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FollowsPage {
    #[serde(default)]
    pub follows: Vec<FollowedProfile>,
    #[serde(default)]
    pub cursor: Option<String>,
}

/// Where a Mastodon handle was found
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Provenance {
    /// `@user@domain` written in profile text
    TextHandle,
    /// `https://domain/@user` style profile link
    LinkHandle,
    /// Bluesky account mirrored by Bridgy Fed
    Bridge,
}

impl Provenance {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provenance::TextHandle => "acct_in_profile",
            Provenance::LinkHandle => "url_in_profile",
            Provenance::Bridge => "bridgy_fed",
        }
    }
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A normalized `local@domain` handle plus the pattern family that found it
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CandidateHandle {
    pub handle: String,
    pub provenance: Provenance,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verdict {
    Verified,
    Unverified,
    Skipped,
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Verified => "yes",
            Verdict::Unverified => "no",
            Verdict::Skipped => "skipped",
        }
    }

    /// Whether a match with this verdict belongs in the import list
    pub fn is_importable(&self) -> bool {
        !matches!(self, Verdict::Unverified)
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the audit trail: a Mastodon handle tied to the Bluesky profile it came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    pub bluesky_handle: String,
    pub bluesky_display_name: String,
    pub mastodon_handle: String,
    pub source: Provenance,
    pub verified: Verdict,
}
