//! Page-number pagination for list endpoints.
//!
//! ```rust,ignore
//! // In a handler
//! let page = args.validate(EVENTS_PER_PAGE)?;
//!
//! // In a model
//! let (items, total) = Event::find_future_paginated(today, None, &page, pool).await?;
//!
//! // Build the response
//! let page = Page::new(items, total, &page);
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Upper bound on a client-requested page size.
pub const MAX_PER_PAGE: i64 = 100;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PaginationError {
    #[error("page must be 1 or greater")]
    InvalidPage,

    #[error("per_page must be between 1 and 100")]
    InvalidPerPage,
}

/// Raw pagination query parameters (`?page=2&per_page=12`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageArgs {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl PageArgs {
    /// Validate against the list's default page size.
    pub fn validate(&self, default_per_page: i64) -> Result<ValidatedPage, PaginationError> {
        let page = self.page.unwrap_or(1);
        if page < 1 {
            return Err(PaginationError::InvalidPage);
        }

        let per_page = self.per_page.unwrap_or(default_per_page);
        if !(1..=MAX_PER_PAGE).contains(&per_page) {
            return Err(PaginationError::InvalidPerPage);
        }

        // The row offset has to fit in an i64 for Postgres
        if (page - 1).checked_mul(per_page).is_none() {
            return Err(PaginationError::InvalidPage);
        }

        Ok(ValidatedPage { page, per_page })
    }
}

/// Pagination arguments that passed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidatedPage {
    pub page: i64,
    pub per_page: i64,
}

impl ValidatedPage {
    pub fn first(per_page: i64) -> Self {
        Self { page: 1, per_page }
    }

    pub fn limit(&self) -> i64 {
        self.per_page
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.per_page)
    }
}

/// One page of results plus the numbers a client needs to render a pager.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: i64,
    pub per_page: i64,
    pub total: i64,
    pub num_pages: i64,
    pub has_next: bool,
    pub has_previous: bool,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: i64, args: &ValidatedPage) -> Self {
        let num_pages = if total == 0 {
            1
        } else {
            (total + args.per_page - 1) / args.per_page
        };

        Self {
            items,
            page: args.page,
            per_page: args.per_page,
            total,
            num_pages,
            has_next: args.page < num_pages,
            has_previous: args.page > 1,
        }
    }

    /// An empty first page, used when a query is blank.
    pub fn empty(args: &ValidatedPage) -> Self {
        Self::new(Vec::new(), 0, args)
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            per_page: self.per_page,
            total: self.total,
            num_pages: self.num_pages,
            has_next: self.has_next,
            has_previous: self.has_previous,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_first_page() {
        let page = PageArgs::default().validate(12).unwrap();
        assert_eq!(page, ValidatedPage { page: 1, per_page: 12 });
        assert_eq!(page.offset(), 0);
    }

    #[test]
    fn offset_skips_previous_pages() {
        let args = PageArgs {
            page: Some(3),
            per_page: Some(24),
        };
        assert_eq!(args.validate(12).unwrap().offset(), 48);
    }

    #[test]
    fn rejects_out_of_range_arguments() {
        let zero_page = PageArgs {
            page: Some(0),
            per_page: None,
        };
        assert_eq!(zero_page.validate(12), Err(PaginationError::InvalidPage));

        let huge = PageArgs {
            page: None,
            per_page: Some(MAX_PER_PAGE + 1),
        };
        assert_eq!(huge.validate(12), Err(PaginationError::InvalidPerPage));
    }

    #[test]
    fn rejects_pages_past_the_addressable_range() {
        let args = PageArgs {
            page: Some(i64::MAX),
            per_page: None,
        };
        assert_eq!(args.validate(12), Err(PaginationError::InvalidPage));

        // Still fine with a single row per page
        let args = PageArgs {
            page: Some(i64::MAX),
            per_page: Some(1),
        };
        assert_eq!(args.validate(12).unwrap().offset(), i64::MAX - 1);
    }

    #[test]
    fn page_counts_round_up() {
        let args = ValidatedPage { page: 2, per_page: 12 };
        let page = Page::new(vec![1, 2, 3], 27, &args);
        assert_eq!(page.num_pages, 3);
        assert!(page.has_next);
        assert!(page.has_previous);

        let last = Page::new(vec![1], 25, &ValidatedPage { page: 3, per_page: 12 });
        assert!(!last.has_next);
    }

    #[test]
    fn empty_page_has_one_page() {
        let page: Page<i32> = Page::empty(&ValidatedPage::first(12));
        assert_eq!(page.num_pages, 1);
        assert!(!page.has_next);
        assert!(!page.has_previous);
    }
}
