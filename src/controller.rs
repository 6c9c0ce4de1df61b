//! Debounced search and scroll-driven pagination for the result list.
//!
//! The controller never performs I/O. It hands out [`Request`]s for the
//! worker to run and takes the finished [`Outcome`]s back through
//! [`SearchController::apply`]. All state changes happen on the caller's
//! thread.

use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::config::Config;
use crate::debounce::Debouncer;
use crate::error::{GatewayError, GatewayResult};
use crate::models::{PostSummary, SearchPage};
use crate::pagination::{Message, PageCursor};

/// Work the controller wants done against the search API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// First page for a freshly typed query.
    Search { generation: u64, query: String },
    /// A follow-up page for the list currently on screen. `page` is zero-based.
    Page {
        generation: u64,
        query: String,
        page: u32,
    },
}

/// A finished [`Request`].
#[derive(Debug)]
pub enum Outcome {
    Search {
        generation: u64,
        query: String,
        result: GatewayResult<SearchPage>,
    },
    Page {
        generation: u64,
        result: GatewayResult<SearchPage>,
    },
}

/// A transient message shown above the list.
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub message: String,
    pub raised_at: Instant,
}

pub struct SearchController {
    config: Config,
    /// What is in the search box.
    query: String,
    /// The query the visible results belong to.
    active_query: String,
    results: Vec<PostSummary>,
    debouncer: Debouncer,
    cursor: PageCursor,
    // Bumped on every dispatched search; older search outcomes are dropped.
    search_generation: u64,
    // Bumped whenever the list is replaced or cleared; older page outcomes are dropped.
    list_generation: u64,
    searching: bool,
    notice: Option<Notice>,
}

impl SearchController {
    pub fn new(config: Config) -> Self {
        let debouncer = Debouncer::new(config.debounce);
        Self {
            config,
            query: String::new(),
            active_query: String::new(),
            results: Vec::new(),
            debouncer,
            cursor: PageCursor::new(),
            search_generation: 0,
            list_generation: 0,
            searching: false,
            notice: None,
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn active_query(&self) -> &str {
        &self.active_query
    }

    pub fn results(&self) -> &[PostSummary] {
        &self.results
    }

    pub fn cursor(&self) -> &PageCursor {
        &self.cursor
    }

    /// Changes every time the list is replaced or cleared.
    pub fn list_generation(&self) -> u64 {
        self.list_generation
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    /// True while the first page of a query is being fetched.
    pub fn is_searching(&self) -> bool {
        self.searching
    }

    pub fn is_debouncing(&self) -> bool {
        self.debouncer.is_pending()
    }

    /// Records a new value of the search box.
    ///
    /// A non-blank value (re)starts the quiet period. A blank value cancels any
    /// pending search and clears the list immediately.
    pub fn set_query(&mut self, query: impl Into<String>, now: Instant) {
        let query = query.into();
        if query == self.query {
            return;
        }
        self.query = query;

        if self.query.trim().is_empty() {
            self.debouncer.cancel();
            self.results.clear();
            self.active_query.clear();
            self.cursor.update(Message::Reset);
            self.search_generation += 1;
            self.list_generation += 1;
            self.searching = false;
            debug!("query cleared");
            return;
        }

        self.debouncer.schedule(now);
    }

    /// Advances timers. Returns the search to send once the quiet period is over.
    pub fn tick(&mut self, now: Instant) -> Option<Request> {
        if let Some(notice) = &self.notice {
            if now.saturating_duration_since(notice.raised_at) >= self.config.notice_ttl {
                self.notice = None;
            }
        }

        if !self.debouncer.fire(now) || self.query.trim().is_empty() {
            return None;
        }

        self.search_generation += 1;
        self.searching = true;
        info!(query = %self.query, generation = self.search_generation, "dispatching search");
        Some(Request::Search {
            generation: self.search_generation,
            query: self.query.clone(),
        })
    }

    /// How long the caller may sleep before [`tick`](Self::tick) has work to do.
    pub fn next_wake(&self, now: Instant) -> Option<Duration> {
        let notice_expiry = self.notice.as_ref().map(|notice| {
            (notice.raised_at + self.config.notice_ttl).saturating_duration_since(now)
        });
        match (self.debouncer.remaining(now), notice_expiry) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Called with the list's scroll offset whenever it changes.
    ///
    /// The prefetch threshold is capped to the last row of the loaded list, so
    /// a viewport taller than the unscrolled remainder still reaches it.
    pub fn on_scroll(&mut self, scroll_offset: f32, viewport_height: f32) -> Option<Request> {
        let content_height = self.results.len() as f32 * self.config.row_height;
        let reachable = (content_height - viewport_height - self.config.row_height).max(0.0);
        let threshold = self
            .config
            .prefetch_offset(self.cursor.current_page())
            .min(reachable);
        if scroll_offset <= threshold {
            return None;
        }

        let page = self.cursor.update(Message::ThresholdCrossed)?;
        info!(query = %self.active_query, page, "fetching next page");
        Some(Request::Page {
            generation: self.list_generation,
            query: self.active_query.clone(),
            page,
        })
    }

    pub fn apply(&mut self, outcome: Outcome, now: Instant) {
        match outcome {
            Outcome::Search {
                generation,
                query,
                result,
            } => {
                if generation != self.search_generation {
                    debug!(generation, current = self.search_generation, "dropping stale search");
                    return;
                }
                self.searching = false;

                match result {
                    Ok(page) => {
                        info!(
                            query = %query,
                            hits = page.posts.len(),
                            total_pages = page.total_pages,
                            "search loaded"
                        );
                        self.results = page.posts;
                        self.active_query = query;
                        self.list_generation += 1;
                        self.cursor.update(Message::FirstPageLoaded {
                            total_pages: page.total_pages,
                        });
                    }
                    Err(error) => self.raise(&error, "Search failed", now),
                }
            }
            Outcome::Page { generation, result } => {
                if generation != self.list_generation || !self.cursor.fetch_in_flight() {
                    debug!(generation, current = self.list_generation, "dropping stale page");
                    return;
                }

                match result {
                    Ok(page) => {
                        debug!(
                            page = self.cursor.current_page(),
                            hits = page.posts.len(),
                            "page appended"
                        );
                        self.results.extend(page.posts);
                        self.cursor.update(Message::PageLoaded);
                    }
                    Err(error) => {
                        self.cursor.update(Message::PageFailed);
                        self.raise(&error, "Loading more results failed", now);
                    }
                }
            }
        }
    }

    fn raise(&mut self, error: &GatewayError, context: &str, now: Instant) {
        warn!(kind = error.kind(), %error, "{}", context);
        self.notice = Some(Notice {
            message: format!("{}: {}", context, error),
            raised_at: now,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const QUIET: Duration = Duration::from_millis(750);
    // Short enough that the prefetch formula, not the last-row cap, decides.
    const VIEWPORT: f32 = 100.0;

    fn config() -> Config {
        Config {
            row_height: 100.0,
            ..Config::default()
        }
    }

    fn summaries(ids: std::ops::Range<usize>) -> Vec<PostSummary> {
        ids.map(|i| PostSummary {
            id: i.to_string(),
            title: format!("Post {}", i),
            url: format!("https://example.com/{}", i),
            author: "someone".to_string(),
            created_at: None,
        })
        .collect()
    }

    fn page(ids: std::ops::Range<usize>, total_pages: u32) -> SearchPage {
        SearchPage {
            posts: summaries(ids),
            total_pages,
        }
    }

    /// Types `query`, waits out the quiet period and feeds back `first`.
    fn searched(query: &str, first: SearchPage) -> (SearchController, Instant) {
        searched_with(config(), query, first)
    }

    fn searched_with(
        config: Config,
        query: &str,
        first: SearchPage,
    ) -> (SearchController, Instant) {
        let start = Instant::now();
        let mut controller = SearchController::new(config);
        controller.set_query(query, start);
        let now = start + QUIET;
        let request = controller.tick(now).expect("search should be dispatched");
        let Request::Search { generation, query } = request else {
            panic!("expected a search request");
        };
        controller.apply(
            Outcome::Search {
                generation,
                query,
                result: Ok(first),
            },
            now,
        );
        (controller, now)
    }

    #[test]
    fn one_search_after_quiet_period() {
        let start = Instant::now();
        let mut controller = SearchController::new(config());
        controller.set_query("rust", start);

        assert_eq!(controller.tick(start + Duration::from_millis(700)), None);
        assert_eq!(
            controller.tick(start + QUIET),
            Some(Request::Search {
                generation: 1,
                query: "rust".to_string()
            })
        );
        assert!(controller.is_searching());
        assert_eq!(controller.tick(start + QUIET * 3), None);
    }

    #[test]
    fn rapid_keystrokes_only_search_final_query() {
        let start = Instant::now();
        let mut controller = SearchController::new(config());
        for (i, query) in ["r", "ru", "rus", "rust"].iter().enumerate() {
            let at = start + Duration::from_millis(200 * i as u64);
            controller.set_query(*query, at);
            assert_eq!(controller.tick(at), None);
        }

        let last_keystroke = start + Duration::from_millis(600);
        assert_eq!(controller.tick(last_keystroke + Duration::from_millis(749)), None);
        let request = controller.tick(last_keystroke + QUIET);
        assert!(matches!(request, Some(Request::Search { ref query, .. }) if query == "rust"));
        assert_eq!(controller.tick(last_keystroke + QUIET * 2), None);
    }

    #[test]
    fn clearing_query_empties_results_without_request() {
        let (mut controller, now) = searched("rust", page(0..20, 5));
        assert_eq!(controller.results().len(), 20);

        controller.set_query("rus", now);
        controller.set_query("", now);
        assert!(controller.results().is_empty());
        assert!(!controller.is_debouncing());
        assert_eq!(controller.tick(now + QUIET * 2), None);
        assert_eq!(controller.cursor().current_page(), 0);
    }

    #[test]
    fn blank_query_clears_like_empty_query() {
        let (mut controller, now) = searched("rust", page(0..20, 5));

        controller.set_query("   ", now);
        assert!(controller.results().is_empty());
        assert!(controller.active_query().is_empty());
        assert!(!controller.is_debouncing());
        assert_eq!(controller.tick(now + QUIET * 2), None);
    }

    #[test]
    fn unchanged_query_issues_nothing() {
        let (mut controller, now) = searched("rust", page(0..20, 5));
        controller.set_query("rust", now);
        assert!(!controller.is_debouncing());
        assert_eq!(controller.tick(now + QUIET * 2), None);
        assert_eq!(controller.on_scroll(0.0, VIEWPORT), None);
    }

    #[test]
    fn first_page_sets_cursor() {
        let (controller, _) = searched("rust", page(0..20, 5));
        assert!(!controller.is_searching());
        assert_eq!(controller.active_query(), "rust");
        assert_eq!(controller.cursor().current_page(), 1);
        assert_eq!(controller.cursor().total_pages(), 5);
        assert!(controller.cursor().fetched_current_page());
    }

    #[test]
    fn scrolling_past_threshold_appends_next_page_in_order() {
        let (mut controller, now) = searched("rust", page(0..20, 5));

        // One page is 20 rows of 100 units; 80% of it is 1600.
        assert_eq!(controller.on_scroll(1600.0, VIEWPORT), None);
        let request = controller.on_scroll(1601.0, VIEWPORT);
        assert_eq!(
            request,
            Some(Request::Page {
                generation: 1,
                query: "rust".to_string(),
                page: 1
            })
        );
        assert_eq!(controller.cursor().current_page(), 2);
        assert!(controller.cursor().fetch_in_flight());

        controller.apply(
            Outcome::Page {
                generation: 1,
                result: Ok(page(20..40, 5)),
            },
            now,
        );

        let ids: Vec<_> = controller.results().iter().map(|p| p.id.clone()).collect();
        let expected: Vec<_> = (0..40).map(|i| i.to_string()).collect();
        assert_eq!(ids, expected);
        assert!(controller.cursor().fetched_current_page());
    }

    #[test]
    fn bottom_of_first_page_fetches_next_in_default_window() {
        let config = Config::default();
        let (mut controller, _) = searched_with(config.clone(), "rust", page(0..20, 5));

        // An 800px window leaves roughly 650px for the list.
        let viewport = 650.0;
        let bottom = 20.0 * config.row_height - viewport;
        assert!(bottom < config.prefetch_offset(1));

        assert!(matches!(
            controller.on_scroll(bottom, viewport),
            Some(Request::Page { page: 1, .. })
        ));
    }

    #[test]
    fn list_shorter_than_viewport_does_not_fetch_before_scrolling() {
        let (mut controller, _) = searched("rust", page(0..20, 5));
        assert_eq!(controller.on_scroll(0.0, 5000.0), None);
    }

    #[test]
    fn scroll_events_during_fetch_are_ignored() {
        let (mut controller, _) = searched("rust", page(0..20, 5));
        assert!(controller.on_scroll(1700.0, VIEWPORT).is_some());
        assert_eq!(controller.on_scroll(1800.0, VIEWPORT), None);
        assert_eq!(controller.on_scroll(5000.0, VIEWPORT), None);
        assert_eq!(controller.cursor().current_page(), 2);
    }

    #[test]
    fn no_fetch_once_all_pages_loaded() {
        let (mut controller, _) = searched("rust", page(0..20, 1));
        assert_eq!(controller.on_scroll(100_000.0, VIEWPORT), None);
        assert_eq!(controller.cursor().current_page(), 1);
    }

    #[test]
    fn failed_search_keeps_previous_results_and_raises_notice() {
        let (mut controller, now) = searched("rust", page(0..20, 5));
        controller.set_query("go", now);
        let Some(Request::Search { generation, query }) = controller.tick(now + QUIET) else {
            panic!("expected a search request");
        };
        controller.apply(
            Outcome::Search {
                generation,
                query,
                result: Err(GatewayError::Api("boom".to_string())),
            },
            now + QUIET,
        );

        assert_eq!(controller.results().len(), 20);
        assert_eq!(controller.active_query(), "rust");
        assert!(!controller.is_searching());
        let notice = controller.notice().expect("notice should be raised");
        assert!(notice.message.contains("boom"));

        // Notices fade out on their own.
        controller.tick(now + QUIET + config().notice_ttl);
        assert!(controller.notice().is_none());
    }

    #[test]
    fn failed_page_rolls_back_and_can_be_requested_again() {
        let (mut controller, now) = searched("rust", page(0..20, 5));
        let Some(Request::Page { generation, .. }) = controller.on_scroll(1700.0, VIEWPORT) else {
            panic!("expected a page request");
        };
        controller.apply(
            Outcome::Page {
                generation,
                result: Err(GatewayError::Api("HTTP 503".to_string())),
            },
            now,
        );

        assert_eq!(controller.results().len(), 20);
        assert_eq!(controller.cursor().current_page(), 1);
        assert!(controller.notice().is_some());
        assert!(matches!(
            controller.on_scroll(1700.0, VIEWPORT),
            Some(Request::Page { page: 1, .. })
        ));
    }

    #[test]
    fn stale_search_outcome_is_dropped() {
        let start = Instant::now();
        let mut controller = SearchController::new(config());
        controller.set_query("rust", start);
        let Some(Request::Search { generation: old, .. }) = controller.tick(start + QUIET) else {
            panic!("expected a search request");
        };

        controller.set_query("go", start + QUIET);
        let Some(Request::Search { generation: new, .. }) = controller.tick(start + QUIET * 2)
        else {
            panic!("expected a search request");
        };

        controller.apply(
            Outcome::Search {
                generation: new,
                query: "go".to_string(),
                result: Ok(page(100..110, 1)),
            },
            start + QUIET * 2,
        );
        controller.apply(
            Outcome::Search {
                generation: old,
                query: "rust".to_string(),
                result: Ok(page(0..20, 5)),
            },
            start + QUIET * 2,
        );

        assert_eq!(controller.active_query(), "go");
        assert_eq!(controller.results().len(), 10);
        assert_eq!(controller.results()[0].id, "100");
    }

    #[test]
    fn page_for_replaced_list_is_dropped() {
        let (mut controller, now) = searched("rust", page(0..20, 5));
        let Some(Request::Page { generation, .. }) = controller.on_scroll(1700.0, VIEWPORT) else {
            panic!("expected a page request");
        };

        controller.set_query("go", now);
        let Some(Request::Search {
            generation: search, ..
        }) = controller.tick(now + QUIET)
        else {
            panic!("expected a search request");
        };
        controller.apply(
            Outcome::Search {
                generation: search,
                query: "go".to_string(),
                result: Ok(page(100..120, 3)),
            },
            now + QUIET,
        );
        controller.apply(
            Outcome::Page {
                generation,
                result: Ok(page(20..40, 5)),
            },
            now + QUIET,
        );

        assert_eq!(controller.results().len(), 20);
        assert!(controller.results().iter().all(|p| p.id.parse::<usize>().unwrap() >= 100));
        assert_eq!(controller.cursor().current_page(), 1);
        assert_eq!(controller.cursor().total_pages(), 3);
    }

    #[test]
    fn outcome_after_clear_is_dropped() {
        let start = Instant::now();
        let mut controller = SearchController::new(config());
        controller.set_query("rust", start);
        let Some(Request::Search { generation, query }) = controller.tick(start + QUIET) else {
            panic!("expected a search request");
        };
        controller.set_query("", start + QUIET);
        controller.apply(
            Outcome::Search {
                generation,
                query,
                result: Ok(page(0..20, 5)),
            },
            start + QUIET,
        );

        assert!(controller.results().is_empty());
        assert!(!controller.is_searching());
    }

    #[test]
    fn next_wake_tracks_debounce_deadline() {
        let start = Instant::now();
        let mut controller = SearchController::new(config());
        assert_eq!(controller.next_wake(start), None);

        controller.set_query("rust", start);
        assert_eq!(
            controller.next_wake(start + Duration::from_millis(250)),
            Some(Duration::from_millis(500))
        );
    }

    proptest! {
        #[test]
        fn typing_burst_searches_only_final_query(
            keys in proptest::collection::vec(("[a-z0-9]", 0u64..750), 1..16)
        ) {
            let start = Instant::now();
            let mut controller = SearchController::new(config());
            let mut typed = String::new();
            let mut at = start;

            for (key, gap) in &keys {
                at += Duration::from_millis(*gap);
                prop_assert_eq!(controller.tick(at), None);
                typed.push_str(key);
                controller.set_query(typed.clone(), at);
                prop_assert_eq!(controller.tick(at), None);
            }

            prop_assert_eq!(controller.tick(at + QUIET - Duration::from_millis(1)), None);
            prop_assert_eq!(
                controller.tick(at + QUIET),
                Some(Request::Search { generation: 1, query: typed.clone() })
            );
            prop_assert_eq!(controller.tick(at + QUIET * 4), None);
        }
    }
}
