//! Monthly archives and their links to articles.

use crate::{first, join_column, list};
use blogstore_core::{
    CoreError, CoreResult, Filter, PageCount, Query, QueryResult, Record, SortDirection,
};
use chrono::NaiveDate;

/// First millisecond of the archived month, UTC.
pub const TIME: &str = "archive_time";
/// Number of published articles in the month.
pub const PUBLISHED_ARTICLE_COUNT: &str = "archive_date_published_article_count";

/// Converts a `yyyy/MM` month into its [`TIME`] value.
///
/// # Errors
///
/// Returns an invalid query error if `month` is not a `yyyy/MM` month.
pub fn archive_time(month: &str) -> CoreResult<i64> {
    let first_day = NaiveDate::parse_from_str(&format!("{}/01", month.trim()), "%Y/%m/%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0));
    match first_day {
        Some(start) => Ok(start.and_utc().timestamp_millis()),
        None => {
            tracing::error!(month, "can not parse archive date");
            Err(CoreError::invalid_query(format!(
                "can not parse archive date {month}"
            )))
        }
    }
}

blog_repository!(
    /// Repository of the `archive_date` table.
    ArchiveDateRepository,
    "archive_date"
);

impl ArchiveDateRepository {
    /// Finds the archive of a `yyyy/MM` month.
    ///
    /// # Errors
    ///
    /// Returns an invalid query error for a malformed month.
    pub fn by_archive_date(&self, month: &str) -> CoreResult<Option<Record>> {
        let time = archive_time(month)?;
        tracing::trace!(month, time, "archive date parsed");
        first(self, Query::new().filter(Filter::eq(TIME, time)))
    }

    /// Archives holding published articles, newest month first.
    pub fn archive_dates(&self) -> CoreResult<Vec<Record>> {
        let mut dates = list(self, Query::new().sort(TIME, SortDirection::Descending))?;
        dates.retain(|date| date.opt_i64(PUBLISHED_ARTICLE_COUNT).unwrap_or(0) != 0);
        Ok(dates)
    }
}

blog_repository!(
    /// Repository of the `archive_date_article` link table.
    ArchiveDateArticleRepository,
    "archive_date_article"
);

impl ArchiveDateArticleRepository {
    /// One page of the links of an archive, newest article first.
    pub fn by_archive_date_id(
        &self,
        archive_date_id: &str,
        page: u32,
        size: u32,
    ) -> CoreResult<QueryResult> {
        let query = Query::new()
            .filter(Filter::eq(join_column("archive_date"), archive_date_id))
            .sort(join_column("article"), SortDirection::Descending)
            .page(page, size)
            .page_count(PageCount::Known(1));
        self.query(&query)
    }

    /// The archive link of an article.
    pub fn by_article_id(&self, article_id: &str) -> CoreResult<Option<Record>> {
        first(
            self,
            Query::new().filter(Filter::eq(join_column("article"), article_id)),
        )
    }
}
