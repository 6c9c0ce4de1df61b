use std::time::Duration;

/// Runtime settings shared by the client, the search controller and the UI.
#[derive(Debug, Clone)]
pub struct Config {
    /// Root of the search API, without a trailing slash.
    pub api_base_url: String,
    pub user_agent: String,
    pub request_timeout: Duration,
    /// Quiet period after the last keystroke before a search is sent.
    pub debounce: Duration,
    /// Fixed height of one result row in the virtualized list.
    pub row_height: f32,
    /// How many rows one page of results is assumed to fill.
    pub rows_per_page: usize,
    /// Fraction of the loaded pages that has to be scrolled past before the next page is requested.
    pub prefetch_ratio: f32,
    /// How long an inline error notice stays visible.
    pub notice_ttl: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: "https://hn.algolia.com/api/v1".to_string(),
            user_agent: concat!("hn_search/", env!("CARGO_PKG_VERSION")).to_string(),
            request_timeout: Duration::from_secs(30),
            debounce: Duration::from_millis(750),
            row_height: 120.0,
            rows_per_page: 20,
            prefetch_ratio: 0.8,
            notice_ttl: Duration::from_secs(6),
        }
    }
}

impl Config {
    /// Scroll offset past which the page after `current_page` should be requested.
    pub fn prefetch_offset(&self, current_page: u32) -> f32 {
        self.row_height * self.rows_per_page as f32 * current_page as f32 * self.prefetch_ratio
    }
}
