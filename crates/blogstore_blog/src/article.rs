//! Articles.

use crate::{first, list, page_size};
use blogstore_core::{
    CoreResult, Filter, PageCount, Query, QueryResult, Record, SortDirection, OBJECT_ID,
};

/// Article title column.
pub const TITLE: &str = "article_title";
/// Permalink column.
pub const PERMALINK: &str = "article_permalink";
/// Abstract column.
pub const ABSTRACT: &str = "article_abstract";
/// Author email column.
pub const AUTHOR_EMAIL: &str = "article_author_email";
/// Published flag column.
pub const IS_PUBLISHED: &str = "article_is_published";
/// Comment counter column.
pub const COMMENT_COUNT: &str = "article_comment_count";
/// View counter column.
pub const VIEW_COUNT: &str = "article_view_count";
/// Last update column.
pub const UPDATE_DATE: &str = "article_update_date";
/// Uniform value in `[0, 1)` used to pick random articles.
pub const RANDOM_DOUBLE: &str = "article_random_double";

blog_repository!(
    /// Repository of the `article` table.
    ArticleRepository,
    "article"
);

impl ArticleRepository {
    /// Finds an article by permalink.
    pub fn by_permalink(&self, permalink: &str) -> CoreResult<Option<Record>> {
        first(self, Query::new().filter(Filter::eq(PERMALINK, permalink)))
    }

    /// Returns true if the article exists and is published.
    pub fn is_published(&self, id: &str) -> CoreResult<bool> {
        Ok(self
            .get(id)?
            .and_then(|article| article.opt_bool(IS_PUBLISHED))
            .unwrap_or(false))
    }

    /// The `n` most recently updated published articles.
    pub fn recent(&self, n: usize) -> CoreResult<Vec<Record>> {
        self.top_published(UPDATE_DATE, n)
    }

    /// The `n` published articles with the most comments.
    pub fn most_commented(&self, n: usize) -> CoreResult<Vec<Record>> {
        self.top_published(COMMENT_COUNT, n)
    }

    /// The `n` published articles with the most views.
    pub fn most_viewed(&self, n: usize) -> CoreResult<Vec<Record>> {
        self.top_published(VIEW_COUNT, n)
    }

    fn top_published(&self, column: &str, n: usize) -> CoreResult<Vec<Record>> {
        let query = Query::new()
            .filter(Filter::eq(IS_PUBLISHED, true))
            .sort(column, SortDirection::Descending)
            .sort(OBJECT_ID, SortDirection::Descending)
            .page(1, page_size(n));
        list(self, query)
    }

    /// One page of the published articles of an author, newest first.
    pub fn by_author_email(&self, email: &str, page: u32, size: u32) -> CoreResult<QueryResult> {
        let query = Query::new()
            .filter(Filter::and(vec![
                Filter::eq(AUTHOR_EMAIL, email),
                Filter::eq(IS_PUBLISHED, true),
            ]))
            .sort(UPDATE_DATE, SortDirection::Descending)
            .page(page, size)
            .page_count(PageCount::Known(1));
        self.query(&query)
    }

    /// The published article created just before `id`.
    ///
    /// Only the title, permalink, and abstract are fetched.
    pub fn previous(&self, id: &str) -> CoreResult<Option<Record>> {
        self.neighbour(Filter::lt(OBJECT_ID, id), SortDirection::Descending)
    }

    /// The published article created just after `id`.
    ///
    /// Only the title, permalink, and abstract are fetched.
    pub fn next(&self, id: &str) -> CoreResult<Option<Record>> {
        self.neighbour(Filter::gt(OBJECT_ID, id), SortDirection::Ascending)
    }

    fn neighbour(&self, bound: Filter, direction: SortDirection) -> CoreResult<Option<Record>> {
        let query = Query::new()
            .filter(Filter::and(vec![bound, Filter::eq(IS_PUBLISHED, true)]))
            .sort(OBJECT_ID, direction)
            .page(1, 1)
            .projection(TITLE)
            .projection(PERMALINK)
            .projection(ABSTRACT);
        first(self, query)
    }

    /// Up to `n` published articles picked at random.
    ///
    /// A pivot is drawn in `[0, 1)`; articles whose random value lies at or
    /// above it come first, and the rest of the quota is filled from below.
    pub fn random_published(&self, n: usize) -> CoreResult<Vec<Record>> {
        if n == 0 {
            return Ok(Vec::new());
        }
        let pivot = random_double();
        let pick = |side: Filter, wanted: usize| {
            let query = Query::new()
                .filter(Filter::and(vec![side, Filter::eq(IS_PUBLISHED, true)]))
                .page(1, page_size(wanted));
            list(self, query)
        };

        let mut articles = pick(Filter::ge(RANDOM_DOUBLE, pivot), n)?;
        if articles.len() < n {
            articles.extend(pick(Filter::lt(RANDOM_DOUBLE, pivot), n - articles.len())?);
        }
        Ok(articles)
    }
}

/// A uniform value in `[0, 1)` for [`RANDOM_DOUBLE`].
#[allow(clippy::cast_precision_loss)]
pub fn random_double() -> f64 {
    const MANTISSA: u128 = (1 << 53) - 1;
    let bits = uuid::Uuid::new_v4().as_u128() & MANTISSA;
    bits as f64 / (MANTISSA + 1) as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_double_is_a_unit_value() {
        for _ in 0..1000 {
            let value = random_double();
            assert!((0.0..1.0).contains(&value));
        }
    }
}
