pub mod bluesky;
pub mod webfinger;
