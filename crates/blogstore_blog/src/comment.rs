//! Comments on articles and pages.

use crate::article::ArticleRepository;
use crate::{list, page_size};
use blogstore_core::{
    CoreResult, Filter, Query, Record, Repository, SortDirection, Store, UNBOUNDED_PAGE_SIZE,
    OBJECT_ID,
};
use std::ops::Deref;

/// Id of the commented article or page.
pub const ON_ID: &str = "comment_on_id";
/// Kind of the commented entity, `article` or `page`.
pub const ON_TYPE: &str = "comment_on_type";

/// Repository of the `comment` table.
#[derive(Debug, Clone)]
pub struct CommentRepository {
    inner: Repository,
    articles: ArticleRepository,
}

impl CommentRepository {
    /// Logical table name.
    pub const TABLE: &'static str = "comment";

    /// Opens the repository on `store`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the store's schema lacks the comment
    /// or article table.
    pub fn new(store: &Store) -> CoreResult<Self> {
        Ok(Self {
            inner: store.repository(Self::TABLE)?,
            articles: ArticleRepository::new(store)?,
        })
    }

    /// One page of the comments on an entity, newest first.
    pub fn comments_on(&self, on_id: &str, page: u32, size: u32) -> CoreResult<Vec<Record>> {
        let query = Query::new()
            .filter(Filter::eq(ON_ID, on_id))
            .sort(OBJECT_ID, SortDirection::Descending)
            .page(page, size);
        list(self, query)
    }

    /// The `n` newest comments, leaving out those on unpublished articles.
    ///
    /// Filtering happens after the fetch, so fewer than `n` may come back.
    pub fn recent(&self, n: usize) -> CoreResult<Vec<Record>> {
        let query = Query::new()
            .sort(OBJECT_ID, SortDirection::Descending)
            .page(1, page_size(n));
        let mut kept = Vec::new();
        for comment in list(self, query)? {
            if comment.opt_str(ON_TYPE).as_deref() == Some(ArticleRepository::TABLE) {
                let article = comment.opt_str(ON_ID).unwrap_or_default();
                if !self.articles.is_published(&article)? {
                    continue;
                }
            }
            kept.push(comment);
        }
        Ok(kept)
    }

    /// Removes every comment on an entity and returns how many there were.
    pub fn remove_comments(&self, on_id: &str) -> CoreResult<usize> {
        let comments = self.comments_on(on_id, 1, UNBOUNDED_PAGE_SIZE)?;
        for comment in &comments {
            if let Some(id) = comment.id() {
                self.remove(&id)?;
            }
        }
        tracing::debug!(on = %on_id, removed = comments.len(), "removed comments");
        Ok(comments.len())
    }
}

impl Deref for CommentRepository {
    type Target = Repository;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}
