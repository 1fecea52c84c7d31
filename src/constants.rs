//! Defaults shared by the config layer, the clients and the CLI.

// Bluesky AppView
pub const BSKY_API_BASE: &str = "https://public.api.bsky.app/xrpc";
pub const GET_FOLLOWS_ENDPOINT: &str = "app.bsky.graph.getFollows";
pub const FOLLOWS_PAGE_SIZE: u32 = 100;

// Discovery
pub const WEBFINGER_PATH: &str = "/.well-known/webfinger";
pub const BRIDGE_DOMAIN: &str = "bsky.brid.gy";
pub const DISCOVERY_SCHEME: &str = "https";

// HTTP
pub const DEFAULT_TIMEOUT_SECS: u64 = 12;
pub const USER_AGENT: &str = concat!("bsky2masto/", env!("CARGO_PKG_VERSION"));
pub const ACCEPT: &str = "application/json, application/jrd+json;q=0.9, */*;q=0.1";

// Pacing and concurrency
pub const DEFAULT_BRIDGE_PAUSE_MS: u64 = 150;
pub const DEFAULT_WORKERS: usize = 8;

// Progress cadence
pub const VERIFY_PROGRESS_EVERY: usize = 25;
pub const BRIDGE_PROGRESS_EVERY: usize = 50;

// Output files
pub const DEFAULT_IMPORT_OUTPUT: &str = "mastodon-import.csv";
pub const DEFAULT_MATCHES_OUTPUT: &str = "matches.csv";
pub const DEFAULT_CONFIG_FILE: &str = "bsky2masto.toml";

pub const IMPORT_HEADER: [&str; 4] = [
    "Account address",
    "Show boosts",
    "Notify on new posts",
    "Languages",
];

pub const MATCHES_HEADER: [&str; 5] = [
    "Bluesky handle",
    "Bluesky display name",
    "Mastodon handle",
    "Source",
    "Verified",
];
