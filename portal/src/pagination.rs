//! Page requests and paged results.
//!
//! Every listing owns its own default page size, looked up through
//! [`Listing::default_per_page`].

use serde::{Deserialize, Serialize};

/// The listings that accept a page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Listing {
    Words,
    Groups,
    GroupWords,
    GroupStudySessions,
    StudyActivities,
    StudySessions,
    StudySessionWords,
}

impl Listing {
    pub const fn default_per_page(self) -> u32 {
        match self {
            Listing::Words => 10,
            Listing::Groups
            | Listing::GroupWords
            | Listing::GroupStudySessions
            | Listing::StudyActivities
            | Listing::StudySessions
            | Listing::StudySessionWords => 100,
        }
    }
}

/// A normalized, 1-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    per_page: u32,
}

impl PageRequest {
    /// Build a request from raw caller input.
    ///
    /// `page < 1` becomes 1 and `per_page < 1` becomes the listing's default.
    pub fn new(page: i64, per_page: i64, listing: Listing) -> Self {
        let page = if page < 1 {
            1
        } else {
            u32::try_from(page).unwrap_or(u32::MAX)
        };
        let per_page = if per_page < 1 {
            listing.default_per_page()
        } else {
            u32::try_from(per_page).unwrap_or(u32::MAX)
        };
        Self { page, per_page }
    }

    /// First page at the listing's default size.
    pub fn first(listing: Listing) -> Self {
        Self::new(1, 0, listing)
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn per_page(&self) -> u32 {
        self.per_page
    }

    /// Value for `LIMIT`.
    pub fn limit(&self) -> i64 {
        i64::from(self.per_page)
    }

    /// Value for `OFFSET`. Saturates at `i64::MAX` for pages past any real table.
    pub fn offset(&self) -> i64 {
        i64::from(self.page - 1).saturating_mul(i64::from(self.per_page))
    }
}

/// `ceil(total / per_page)`, zero when nothing matched.
pub fn total_pages(total_items: u64, per_page: u32) -> u64 {
    if per_page == 0 {
        return 0;
    }
    total_items.div_ceil(u64::from(per_page))
}

/// One page of results plus the total number of matching records.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total_items: u64,
    pub current_page: u32,
    pub per_page: u32,
    pub total_pages: u64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total_items: u64, request: PageRequest) -> Self {
        Self {
            items,
            total_items,
            current_page: request.page(),
            per_page: request.per_page(),
            total_pages: total_pages(total_items, request.per_page()),
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total_items: self.total_items,
            current_page: self.current_page,
            per_page: self.per_page,
            total_pages: self.total_pages,
        }
    }
}
