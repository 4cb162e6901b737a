//! Pipeline configuration.
//!
//! A handful of run-level flags and sizes, settable from the environment
//! the way the deployed service is configured, or built directly in tests.

use serde::Deserialize;

/// Run-level configuration for the assembly pipeline.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// When true, circulating bibs are still filtered out of batches but no
    /// delete calls are issued against the search index.
    pub disable_circulating_delete: bool,
    /// When true, recap enrichment skips the live off-site registry query
    /// and returns bibs unmodified.
    pub disable_scsb_query: bool,
    /// Maximum number of home-institution bibs per batched holdings query.
    pub holdings_prefetch_chunk_size: usize,
    /// Page size for item fetches against the catalog API.
    pub items_page_size: u32,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            disable_circulating_delete: false,
            disable_scsb_query: false,
            holdings_prefetch_chunk_size: 25,
            items_page_size: 500,
        }
    }
}

impl Config {
    /// Build a config from environment variables, falling back to defaults:
    /// `DISABLE_CIRC_DELETE`, `DISABLE_SCSB_LIVE_QUERY` (both `"true"` to
    /// enable), `HOLDINGS_PREFETCH_CHUNK_SIZE`, `ITEMS_PAGE_SIZE`.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Config::default();
        Config {
            disable_circulating_delete: env_flag("DISABLE_CIRC_DELETE"),
            disable_scsb_query: env_flag("DISABLE_SCSB_LIVE_QUERY"),
            holdings_prefetch_chunk_size: env_parse("HOLDINGS_PREFETCH_CHUNK_SIZE")
                .unwrap_or(defaults.holdings_prefetch_chunk_size),
            items_page_size: env_parse("ITEMS_PAGE_SIZE").unwrap_or(defaults.items_page_size),
        }
    }
}

fn env_flag(name: &str) -> bool {
    std::env::var(name).is_ok_and(|v| v == "true")
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| v.parse().ok())
}
