use once_cell::sync::Lazy;
use regex::Regex;

static LOCAL_PART: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_][A-Za-z0-9._-]{0,100}$").unwrap());
static DOMAIN_PART: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9.-]+$").unwrap());

const EDGE_PUNCTUATION: &[char] = &[
    '"', '\'', '(', ')', '[', ']', '{', '}', '<', '>', ',', '.', ';', ':', '!', '?',
];

/// Canonicalize a raw handle into lowercase `local@domain`.
///
/// Accepts surrounding punctuation and one leading `@`. Returns `None` for
/// anything that is not a plausible fediverse account address.
pub fn normalize_handle(raw: &str) -> Option<String> {
    let trimmed = raw.trim().trim_matches(EDGE_PUNCTUATION);
    let trimmed = trimmed.strip_prefix('@').unwrap_or(trimmed);

    let (local, domain) = trimmed.split_once('@')?;
    if domain.contains('@') {
        return None;
    }

    let local = local.trim();
    let domain = domain.trim().trim_matches('.').to_lowercase();

    if local.is_empty() || domain.is_empty() {
        return None;
    }
    if !domain.contains('.') {
        return None;
    }
    if !LOCAL_PART.is_match(local) || !DOMAIN_PART.is_match(&domain) {
        return None;
    }

    Some(format!("{}@{}", local.to_lowercase(), domain))
}
