//! Navigation pages.

use crate::{first, list};
use blogstore_core::{CoreResult, Filter, Query, Record, SortDirection};

/// Permalink column.
pub const PERMALINK: &str = "page_permalink";
/// Position of the page in the navigation.
pub const ORDER: &str = "page_order";

blog_repository!(
    /// Repository of the `page` table.
    PageRepository,
    "page"
);

impl PageRepository {
    /// Finds a page by permalink.
    pub fn by_permalink(&self, permalink: &str) -> CoreResult<Option<Record>> {
        first(self, Query::new().filter(Filter::eq(PERMALINK, permalink)))
    }

    /// The highest order in use, or `-1` without pages.
    pub fn max_order(&self) -> CoreResult<i64> {
        let query = Query::new()
            .sort(ORDER, SortDirection::Descending)
            .page(1, 1);
        Ok(first(self, query)?
            .and_then(|page| page.opt_i64(ORDER))
            .unwrap_or(-1))
    }

    /// The page just above `id` in the navigation.
    pub fn upper(&self, id: &str) -> CoreResult<Option<Record>> {
        let Some(order) = self.order_of(id)? else {
            return Ok(None);
        };
        let query = Query::new()
            .filter(Filter::lt(ORDER, order))
            .sort(ORDER, SortDirection::Descending)
            .page(1, 1);
        first(self, query)
    }

    /// The page just below `id` in the navigation.
    pub fn under(&self, id: &str) -> CoreResult<Option<Record>> {
        let Some(order) = self.order_of(id)? else {
            return Ok(None);
        };
        let query = Query::new()
            .filter(Filter::gt(ORDER, order))
            .sort(ORDER, SortDirection::Ascending)
            .page(1, 1);
        first(self, query)
    }

    fn order_of(&self, id: &str) -> CoreResult<Option<i64>> {
        Ok(self.get(id)?.map(|page| page.opt_i64(ORDER).unwrap_or(0)))
    }

    /// Finds the page at an order.
    pub fn by_order(&self, order: i64) -> CoreResult<Option<Record>> {
        first(self, Query::new().filter(Filter::eq(ORDER, order)))
    }

    /// Every page in navigation order.
    pub fn pages(&self) -> CoreResult<Vec<Record>> {
        list(self, Query::new().sort(ORDER, SortDirection::Ascending))
    }
}
