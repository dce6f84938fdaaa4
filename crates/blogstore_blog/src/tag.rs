//! Tags and their links to articles.

use crate::{first, join_column, list, page_size};
use blogstore_core::{
    CoreResult, Filter, PageCount, Query, QueryResult, Record, Repository, SortDirection, Store,
};
use std::ops::Deref;

/// Tag title column.
pub const TITLE: &str = "tag_title";
/// Number of articles referencing the tag.
pub const REFERENCE_COUNT: &str = "tag_reference_count";
/// Number of published articles referencing the tag.
pub const PUBLISHED_REFERENCE_COUNT: &str = "tag_published_reference_count";

/// Repository of the `tag` table.
#[derive(Debug, Clone)]
pub struct TagRepository {
    inner: Repository,
    tag_article: TagArticleRepository,
}

impl TagRepository {
    /// Logical table name.
    pub const TABLE: &'static str = "tag";

    /// Opens the repository on `store`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the store's schema lacks the tag
    /// tables.
    pub fn new(store: &Store) -> CoreResult<Self> {
        Ok(Self {
            inner: store.repository(Self::TABLE)?,
            tag_article: TagArticleRepository::new(store)?,
        })
    }

    /// Finds a tag by its exact title.
    pub fn by_title(&self, title: &str) -> CoreResult<Option<Record>> {
        first(self, Query::new().filter(Filter::eq(TITLE, title)))
    }

    /// The `n` tags with the most published references, ordered by title.
    pub fn most_used(&self, n: usize) -> CoreResult<Vec<Record>> {
        let query = Query::new()
            .sort(PUBLISHED_REFERENCE_COUNT, SortDirection::Descending)
            .page(1, page_size(n));
        let mut tags = list(self, query)?;
        tags.sort_by_key(|tag| tag.opt_str(TITLE).unwrap_or_default());
        Ok(tags)
    }

    /// Tags attached to an article, in link order.
    ///
    /// Links pointing at deleted tags are skipped.
    pub fn by_article_id(&self, article_id: &str) -> CoreResult<Vec<Record>> {
        let mut tags = Vec::new();
        for link in self.tag_article.by_article_id(article_id)? {
            let Some(tag_id) = link.opt_str(&join_column(Self::TABLE)) else {
                continue;
            };
            match self.get(&tag_id)? {
                Some(tag) => tags.push(tag),
                None => tracing::debug!(tag = %tag_id, "dangling tag link"),
            }
        }
        Ok(tags)
    }
}

impl Deref for TagRepository {
    type Target = Repository;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

blog_repository!(
    /// Repository of the `tag_article` link table.
    TagArticleRepository,
    "tag_article"
);

impl TagArticleRepository {
    /// Every link of an article.
    pub fn by_article_id(&self, article_id: &str) -> CoreResult<Vec<Record>> {
        list(
            self,
            Query::new().filter(Filter::eq(join_column("article"), article_id)),
        )
    }

    /// One page of the links of a tag, newest article first.
    pub fn by_tag_id(&self, tag_id: &str, page: u32, size: u32) -> CoreResult<QueryResult> {
        let query = Query::new()
            .filter(Filter::eq(join_column("tag"), tag_id))
            .sort(join_column("article"), SortDirection::Descending)
            .page(page, size)
            .page_count(PageCount::Known(1));
        self.query(&query)
    }
}
