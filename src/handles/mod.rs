//! Finding Mastodon handles in free-form Bluesky profile text.
//!
//! `extract` runs independent pattern matchers over a string and feeds every
//! raw `(local, domain)` pair through `normalize`. Adding another way of
//! spotting handles means adding a `HandleMatcher`, nothing else.

pub mod extract;
pub mod normalize;

pub use extract::{extract_candidates, extract_with, AcctMatcher, HandleMatcher, ProfileUrlMatcher};
pub use normalize::normalize_handle;
