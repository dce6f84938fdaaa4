//! Categories and their links to tags.

use crate::{first, join_column, list};
use blogstore_core::{CoreResult, Filter, PageCount, Query, QueryResult, Record};

/// Category title column.
pub const TITLE: &str = "category_title";

blog_repository!(
    /// Repository of the `category` table.
    CategoryRepository,
    "category"
);

impl CategoryRepository {
    /// Finds a category by its exact title.
    pub fn by_title(&self, title: &str) -> CoreResult<Option<Record>> {
        first(self, Query::new().filter(Filter::eq(TITLE, title)))
    }
}

blog_repository!(
    /// Repository of the `category_tag` link table.
    CategoryTagRepository,
    "category_tag"
);

impl CategoryTagRepository {
    /// One page of the links of a category.
    pub fn by_category_id(
        &self,
        category_id: &str,
        page: u32,
        size: u32,
    ) -> CoreResult<QueryResult> {
        self.page_of(join_column("category"), category_id, page, size)
    }

    /// One page of the links of a tag.
    pub fn by_tag_id(&self, tag_id: &str, page: u32, size: u32) -> CoreResult<QueryResult> {
        self.page_of(join_column("tag"), tag_id, page, size)
    }

    fn page_of(&self, column: String, id: &str, page: u32, size: u32) -> CoreResult<QueryResult> {
        let query = Query::new()
            .filter(Filter::eq(column, id))
            .page(page, size)
            .page_count(PageCount::Known(1));
        self.query(&query)
    }

    /// Removes every link of a category.
    pub fn remove_by_category_id(&self, category_id: &str) -> CoreResult<()> {
        self.remove_links(join_column("category"), category_id)
    }

    /// Removes every link of a tag.
    pub fn remove_by_tag_id(&self, tag_id: &str) -> CoreResult<()> {
        self.remove_links(join_column("tag"), tag_id)
    }

    fn remove_links(&self, column: String, id: &str) -> CoreResult<()> {
        for link in list(self, Query::new().filter(Filter::eq(column, id)))? {
            if let Some(link_id) = link.id() {
                self.remove(&link_id)?;
            }
        }
        Ok(())
    }
}
