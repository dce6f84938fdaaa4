//! Backend-agnostic query values.
//!
//! A [`Query`] is a plain value: an optional filter tree, an ordered list of
//! sorts, optional projections, and pagination parameters. Nothing here
//! knows about SQL; the engine compiles queries through the active dialect.
//!
//! ```
//! use blogstore_core::query::{Filter, PageCount, Query, SortDirection};
//!
//! let query = Query::new()
//!     .filter(Filter::or(vec![
//!         Filter::eq("tag_title", "t1"),
//!         Filter::eq("tag_title", "t2"),
//!     ]))
//!     .sort("tag_title", SortDirection::Ascending)
//!     .page(1, 20)
//!     .page_count(PageCount::Known(1));
//!
//! assert_eq!(query.sorts.len(), 1);
//! assert_eq!(query.page_size, 20);
//! ```

mod filter;

pub use filter::{
    CompositeFilter, CompositeOperator, Filter, FilterOperator, Operand, PropertyFilter,
};

use blogstore_codec::Record;
use serde::Serialize;

/// Page size meaning "no limit".
pub const UNBOUNDED_PAGE_SIZE: u32 = u32::MAX;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortDirection {
    /// Smallest first.
    Ascending,
    /// Largest first.
    Descending,
}

impl SortDirection {
    /// SQL spelling of the direction.
    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Ascending => "asc",
            Self::Descending => "desc",
        }
    }
}

/// One sort key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sort {
    /// Field name.
    pub key: String,
    /// Direction.
    pub direction: SortDirection,
}

/// How the total page count is obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PageCount {
    /// Run a count query and compute it.
    #[default]
    Compute,
    /// The caller asserts the page count; no count query is issued.
    ///
    /// `Known(0)` returns no records without touching the table.
    Known(u32),
}

/// A query against one table.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    /// Filter tree, if any.
    pub filter: Option<Filter>,
    /// Sort keys, primary first. Keys are unique.
    pub sorts: Vec<Sort>,
    /// Columns to select; empty selects every column.
    pub projections: Vec<String>,
    /// One-based page number.
    pub current_page_num: u32,
    /// Records per page.
    pub page_size: u32,
    /// Page count mode.
    pub page_count: PageCount,
}

impl Default for Query {
    fn default() -> Self {
        Self {
            filter: None,
            sorts: Vec::new(),
            projections: Vec::new(),
            current_page_num: 1,
            page_size: UNBOUNDED_PAGE_SIZE,
            page_count: PageCount::Compute,
        }
    }
}

impl Query {
    /// Creates a query matching every record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the filter.
    #[must_use]
    pub fn filter(mut self, filter: impl Into<Filter>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    /// Adds a sort key. Sorting an existing key again replaces its
    /// direction and keeps its position.
    #[must_use]
    pub fn sort(mut self, key: impl Into<String>, direction: SortDirection) -> Self {
        let key = key.into();
        match self.sorts.iter_mut().find(|s| s.key == key) {
            Some(existing) => existing.direction = direction,
            None => self.sorts.push(Sort { key, direction }),
        }
        self
    }

    /// Adds a projected column.
    #[must_use]
    pub fn projection(mut self, column: impl Into<String>) -> Self {
        let column = column.into();
        if !self.projections.contains(&column) {
            self.projections.push(column);
        }
        self
    }

    /// Sets the page number and page size.
    #[must_use]
    pub fn page(mut self, current_page_num: u32, page_size: u32) -> Self {
        self.current_page_num = current_page_num;
        self.page_size = page_size;
        self
    }

    /// Sets the page count mode.
    #[must_use]
    pub fn page_count(mut self, page_count: PageCount) -> Self {
        self.page_count = page_count;
        self
    }

    /// Returns true if the page size is unbounded.
    pub fn is_unbounded(&self) -> bool {
        self.page_size == UNBOUNDED_PAGE_SIZE
    }
}

/// Pagination facts about a query result.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Pagination {
    /// Total pages, computed or as asserted by the caller.
    pub page_count: u32,
    /// Total matching records; 0 when the page count was asserted.
    pub record_count: u64,
}

impl Pagination {
    /// Computes pagination from a total record count.
    ///
    /// A zero page size yields zero pages.
    pub fn computed(record_count: u64, page_size: u32) -> Self {
        let page_count = if page_size == 0 {
            0
        } else {
            u32::try_from(record_count.div_ceil(u64::from(page_size))).unwrap_or(u32::MAX)
        };
        Self {
            page_count,
            record_count,
        }
    }

    /// Pagination for an asserted page count.
    pub fn known(page_count: u32) -> Self {
        Self {
            page_count,
            record_count: 0,
        }
    }
}

/// Records and pagination returned by a query.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QueryResult {
    /// Matching records of the requested page.
    pub records: Vec<Record>,
    /// Pagination facts.
    pub pagination: Pagination,
}

impl QueryResult {
    /// An empty, zero-page result.
    pub fn empty() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let query = Query::new();
        assert_eq!(query.current_page_num, 1);
        assert!(query.is_unbounded());
        assert_eq!(query.page_count, PageCount::Compute);
        assert!(query.filter.is_none());
    }

    #[test]
    fn resorting_replaces_direction_in_place() {
        let query = Query::new()
            .sort("a", SortDirection::Ascending)
            .sort("b", SortDirection::Ascending)
            .sort("a", SortDirection::Descending);

        let keys: Vec<_> = query
            .sorts
            .iter()
            .map(|s| (s.key.as_str(), s.direction))
            .collect();
        assert_eq!(
            keys,
            vec![("a", SortDirection::Descending), ("b", SortDirection::Ascending)]
        );
    }

    #[test]
    fn computed_pagination_rounds_up() {
        assert_eq!(Pagination::computed(0, 10).page_count, 0);
        assert_eq!(Pagination::computed(10, 10).page_count, 1);
        assert_eq!(Pagination::computed(11, 10).page_count, 2);
        assert_eq!(Pagination::computed(5, 0).page_count, 0);
        assert_eq!(Pagination::computed(5, UNBOUNDED_PAGE_SIZE).page_count, 1);
    }

    #[test]
    fn known_pagination_reports_no_records() {
        let pagination = Pagination::known(1);
        assert_eq!(pagination.page_count, 1);
        assert_eq!(pagination.record_count, 0);
    }
}
