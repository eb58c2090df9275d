//! Page parameter validation and slicing.
//!
//! Slicing assumes its input is already in the stable order for the
//! resource (primary key or grouping-key tuple, ascending), so that
//! consecutive pages never overlap and never skip an item.

use crate::QueryError;
use crate::params::present;

/// Page used when `page` is absent.
pub const DEFAULT_PAGE: u32 = 1;

/// Page size used when `page_size` is absent.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Largest accepted `page_size` unless configured otherwise.
pub const DEFAULT_MAX_PAGE_SIZE: u32 = 1000;

/// A validated, 1-indexed page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// 1-indexed page number.
    pub page: u32,
    /// Items per page.
    pub page_size: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageRequest {
    /// Validates raw `page` and `page_size` values.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::InvalidParameter`] if either value is not a
    /// positive integer, or `page_size` exceeds `max_page_size`.
    pub fn parse(
        page: Option<&str>,
        page_size: Option<&str>,
        max_page_size: u32,
    ) -> Result<Self, QueryError> {
        let page = present(page)
            .map(|raw| positive("page", raw))
            .transpose()?
            .unwrap_or(DEFAULT_PAGE);

        let page_size = present(page_size)
            .map(|raw| positive("page_size", raw))
            .transpose()?
            .unwrap_or(DEFAULT_PAGE_SIZE);

        if page_size > max_page_size {
            return Err(QueryError::invalid(
                "page_size",
                format!("{page_size} exceeds the maximum of {max_page_size}"),
            ));
        }

        Ok(Self { page, page_size })
    }

    /// Number of items preceding this page.
    #[must_use]
    pub fn offset(&self) -> usize {
        let preceding = usize::try_from(self.page - 1).unwrap_or(usize::MAX);
        preceding.saturating_mul(self.limit())
    }

    /// Maximum number of items on this page.
    #[must_use]
    pub fn limit(&self) -> usize {
        usize::try_from(self.page_size).unwrap_or(usize::MAX)
    }

    /// Takes this page out of an already ordered sequence.
    ///
    /// Pages past the end yield an empty vector.
    pub fn slice<I: IntoIterator>(&self, items: I) -> Vec<I::Item> {
        items
            .into_iter()
            .skip(self.offset())
            .take(self.limit())
            .collect()
    }
}

fn positive(name: &'static str, raw: &str) -> Result<u32, QueryError> {
    raw.parse::<u32>()
        .ok()
        .filter(|v| *v > 0)
        .ok_or_else(|| QueryError::invalid(name, format!("'{raw}' is not a positive integer")))
}
