//! Page cursor for the scroll-driven result list.
//!
//! The cursor is a small state machine (`Idle -> Fetching -> Idle`). It only
//! changes through [`PageCursor::update`], so a second scroll event that
//! arrives while a page is still loading cannot start another fetch or move
//! the cursor.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    /// A follow-up page is loading; `current_page` already points at it.
    Fetching,
}

/// Things that happened to the result list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Message {
    /// First page of a new query arrived.
    FirstPageLoaded { total_pages: u32 },
    /// The viewport was scrolled past the prefetch threshold.
    ThresholdCrossed,
    /// The page being fetched arrived and was appended.
    PageLoaded,
    /// The page being fetched failed.
    PageFailed,
    /// The query was cleared or replaced.
    Reset,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageCursor {
    /// One-based number of the last requested page, 0 before the first result.
    current_page: u32,
    total_pages: u32,
    phase: Phase,
}

impl Default for PageCursor {
    fn default() -> Self {
        Self::new()
    }
}

impl PageCursor {
    pub fn new() -> Self {
        Self {
            current_page: 0,
            total_pages: 0,
            phase: Phase::Idle,
        }
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    pub fn fetch_in_flight(&self) -> bool {
        self.phase == Phase::Fetching
    }

    pub fn fetched_current_page(&self) -> bool {
        self.phase == Phase::Idle && self.current_page > 0
    }

    pub fn is_exhausted(&self) -> bool {
        self.current_page >= self.total_pages
    }

    /// Applies a message. Returns the zero-based API page index to request
    /// when the message starts a fetch.
    pub fn update(&mut self, message: Message) -> Option<u32> {
        match message {
            Message::FirstPageLoaded { total_pages } => {
                self.current_page = total_pages.min(1);
                self.total_pages = total_pages;
                self.phase = Phase::Idle;
                None
            }
            Message::ThresholdCrossed => {
                if self.phase == Phase::Fetching
                    || self.current_page == 0
                    || self.is_exhausted()
                {
                    return None;
                }
                self.current_page += 1;
                self.phase = Phase::Fetching;
                Some(self.current_page - 1)
            }
            Message::PageLoaded => {
                self.phase = Phase::Idle;
                None
            }
            Message::PageFailed => {
                if self.phase == Phase::Fetching {
                    self.current_page -= 1;
                    self.phase = Phase::Idle;
                }
                None
            }
            Message::Reset => {
                *self = Self::new();
                None
            }
        }
    }
}
