use crate::handles::normalize::normalize_handle;
use crate::types::{CandidateHandle, Provenance};
use once_cell::sync::Lazy;
use regex::Regex;

// Anchored: tried at every start position so the boundary rules can be
// checked by hand (the regex crate has no lookaround).
static ACCT_AT_START: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^@?([A-Za-z0-9_][A-Za-z0-9._-]{0,63})@([A-Za-z0-9.-]+\.[A-Za-z]{2,})").unwrap()
});

static PROFILE_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)https?://([A-Za-z0-9.-]+\.[A-Za-z]{2,})/(?:@|users/|u/)([A-Za-z0-9_][A-Za-z0-9._-]{0,63})",
    )
    .unwrap()
});

/// A pattern family that spots raw `(local, domain)` pairs in text.
pub trait HandleMatcher: Sync {
    fn provenance(&self) -> Provenance;

    fn raw_pairs(&self, text: &str) -> Vec<(String, String)>;
}

/// `@alice@example.social` or `alice@example.social` written in prose
pub struct AcctMatcher;

/// `https://example.social/@alice`, `/users/alice` or `/u/alice` links
pub struct ProfileUrlMatcher;

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

impl HandleMatcher for AcctMatcher {
    fn provenance(&self) -> Provenance {
        Provenance::TextHandle
    }

    fn raw_pairs(&self, text: &str) -> Vec<(String, String)> {
        let mut out = Vec::new();
        let mut prev: Option<char> = None;
        let mut pos = 0;

        while pos < text.len() {
            let rest = &text[pos..];
            let left_ok = !matches!(prev, Some(c) if is_word_char(c) || c == '/');

            if left_ok {
                if let Some(caps) = ACCT_AT_START.captures(rest) {
                    let end = caps.get(0).map(|m| m.end()).unwrap_or(0);
                    let right_ok = !matches!(
                        rest[end..].chars().next(),
                        Some(c) if is_word_char(c) || c == '.' || c == '-'
                    );
                    if right_ok && end > 0 {
                        out.push((caps[1].to_string(), caps[2].to_string()));
                        prev = rest[..end].chars().next_back();
                        pos += end;
                        continue;
                    }
                }
            }

            let Some(c) = rest.chars().next() else { break };
            prev = Some(c);
            pos += c.len_utf8();
        }

        out
    }
}

impl HandleMatcher for ProfileUrlMatcher {
    fn provenance(&self) -> Provenance {
        Provenance::LinkHandle
    }

    fn raw_pairs(&self, text: &str) -> Vec<(String, String)> {
        PROFILE_URL
            .captures_iter(text)
            .map(|caps| (caps[2].to_string(), caps[1].to_string()))
            .collect()
    }
}

static DEFAULT_MATCHERS: [&dyn HandleMatcher; 2] = [&AcctMatcher, &ProfileUrlMatcher];

/// Find every normalizable handle in `text` using the built-in matchers.
///
/// Results come matcher by matcher, in text order within each matcher.
/// Duplicates are kept; callers dedupe per profile.
pub fn extract_candidates(text: &str) -> Vec<CandidateHandle> {
    extract_with(text, &DEFAULT_MATCHERS)
}

pub fn extract_with(text: &str, matchers: &[&dyn HandleMatcher]) -> Vec<CandidateHandle> {
    if text.is_empty() {
        return Vec::new();
    }

    let mut out = Vec::new();
    for matcher in matchers {
        for (local, domain) in matcher.raw_pairs(text) {
            if let Some(handle) = normalize_handle(&format!("{}@{}", local, domain)) {
                out.push(CandidateHandle {
                    handle,
                    provenance: matcher.provenance(),
                });
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handles(text: &str) -> Vec<(String, Provenance)> {
        extract_candidates(text)
            .into_iter()
            .map(|c| (c.handle, c.provenance))
            .collect()
    }

    #[test]
    fn test_extract_acct_pattern() {
        let found = handles("Find me at @alice@example.social and maybe @bob@social.example");
        assert_eq!(
            found,
            vec![
                ("alice@example.social".to_string(), Provenance::TextHandle),
                ("bob@social.example".to_string(), Provenance::TextHandle),
            ]
        );
    }

    #[test]
    fn test_extract_url_pattern() {
        let found = handles("Profiles: https://mastodon.social/@alice and https://hachyderm.io/users/bob");
        assert_eq!(
            found,
            vec![
                ("alice@mastodon.social".to_string(), Provenance::LinkHandle),
                ("bob@hachyderm.io".to_string(), Provenance::LinkHandle),
            ]
        );
    }

    #[test]
    fn test_extract_url_pattern_is_case_insensitive() {
        let found = handles("HTTPS://Mastodon.Social/U/Carol");
        assert_eq!(found, vec![("carol@mastodon.social".to_string(), Provenance::LinkHandle)]);
    }

    #[test]
    fn test_extract_without_leading_at_and_with_punctuation() {
        let found = handles("(alice@example.social), or \"@Bob@Example.COM\".");
        assert_eq!(
            found,
            vec![
                ("alice@example.social".to_string(), Provenance::TextHandle),
                ("bob@example.com".to_string(), Provenance::TextHandle),
            ]
        );
    }

    #[test]
    fn test_extract_ignores_email_like_tails_and_path_segments() {
        // preceded by a word char: no match at that start, but one further right
        assert_eq!(
            handles("x@alice@example.social"),
            vec![("alice@example.social".to_string(), Provenance::TextHandle)]
        );
        // preceded by a slash
        assert!(handles("see /alice@example.social").is_empty());
        // followed by a word char, dot or hyphen
        assert!(handles("@alice@example.social_x").is_empty());
        assert!(handles("@alice@example.social-x").is_empty());
    }

    #[test]
    fn test_extract_trailing_dot_blocks_match() {
        assert!(handles("mail @alice@example.social.").is_empty());
        assert_eq!(
            handles("mail @alice@example.social!"),
            vec![("alice@example.social".to_string(), Provenance::TextHandle)]
        );
    }

    #[test]
    fn test_extract_requires_tld_of_two_letters() {
        assert!(handles("@alice@localhost").is_empty());
        assert!(handles("@alice@example.c").is_empty());
        assert!(handles("@alice@10.0.0.1").is_empty());
    }

    #[test]
    fn test_extract_empty_and_plain_text() {
        assert!(extract_candidates("").is_empty());
        assert!(extract_candidates("just a bio about birds").is_empty());
    }

    #[test]
    fn test_extract_keeps_matcher_order_and_duplicates() {
        let found = handles("https://mastodon.social/@alice @alice@mastodon.social");
        assert_eq!(
            found,
            vec![
                ("alice@mastodon.social".to_string(), Provenance::TextHandle),
                ("alice@mastodon.social".to_string(), Provenance::LinkHandle),
            ]
        );
    }

    #[test]
    fn test_extract_never_panics_on_odd_input() {
        let inputs = [
            "@",
            "@@@@",
            "@é@ü.中国",
            "💥@alice@example.social💥",
            "https://",
            "https://x.yz/@",
            "a@b@c@d.ef@g.hi",
        ];
        for input in inputs {
            let _ = extract_candidates(input);
        }
        assert_eq!(
            handles("💥@alice@example.social💥"),
            vec![("alice@example.social".to_string(), Provenance::TextHandle)]
        );
    }

    #[test]
    fn test_extract_with_custom_matcher() {
        struct Fixed;
        impl HandleMatcher for Fixed {
            fn provenance(&self) -> Provenance {
                Provenance::LinkHandle
            }
            fn raw_pairs(&self, _text: &str) -> Vec<(String, String)> {
                vec![
                    ("Zed".to_string(), "Example.Net".to_string()),
                    ("bad user".to_string(), "example.net".to_string()),
                ]
            }
        }

        let matchers: [&dyn HandleMatcher; 1] = [&Fixed];
        let found = extract_with("anything", &matchers);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].handle, "zed@example.net");
    }
}
