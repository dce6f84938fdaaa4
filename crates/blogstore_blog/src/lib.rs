//! # Blogstore Blog
//!
//! Blog repositories built on `blogstore_core`.
//!
//! This crate provides:
//! - The bundled schema describing every blog table
//! - One repository per table, each adding its entity-specific queries
//! - [`BlogRepositories`], opening all of them on one store
//!
//! Every repository dereferences to [`Repository`], so the generic CRUD and
//! query contract is always available next to the helpers.
//!
//! ## Usage
//!
//! ```rust
//! use blogstore_blog::{open_store, BlogRepositories};
//! use blogstore_core::{Record, StoreConfig};
//!
//! let store = open_store(StoreConfig::new()).unwrap();
//! store.init_tables();
//! let blog = BlogRepositories::new(&store).unwrap();
//!
//! blog.tag.add(
//!     Record::new()
//!         .with("tag_title", "rust")
//!         .with("tag_reference_count", 1)
//!         .with("tag_published_reference_count", 1),
//! ).unwrap();
//! assert!(blog.tag.by_title("rust").unwrap().is_some());
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

use blogstore_core::{
    CoreResult, PageCount, Query, Record, Repository, SchemaRegistry, Store, StoreConfig,
};

/// Declares a repository wrapper that dereferences to [`Repository`].
macro_rules! blog_repository {
    ($(#[$meta:meta])* $name:ident, $table:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone)]
        pub struct $name {
            inner: blogstore_core::Repository,
        }

        impl $name {
            /// Logical table name.
            pub const TABLE: &'static str = $table;

            /// Opens the repository on `store`.
            ///
            /// # Errors
            ///
            /// Returns a configuration error if the store's schema does not
            /// describe the table.
            pub fn new(store: &blogstore_core::Store) -> blogstore_core::CoreResult<Self> {
                Ok(Self {
                    inner: store.repository($table)?,
                })
            }
        }

        impl std::ops::Deref for $name {
            type Target = blogstore_core::Repository;

            fn deref(&self) -> &Self::Target {
                &self.inner
            }
        }
    };
}

pub mod archive_date;
pub mod article;
pub mod category;
pub mod comment;
pub mod page;
pub mod plugin;
pub mod statistic;
pub mod tag;
pub mod user;

pub use archive_date::{ArchiveDateArticleRepository, ArchiveDateRepository};
pub use article::ArticleRepository;
pub use category::{CategoryRepository, CategoryTagRepository};
pub use comment::CommentRepository;
pub use page::PageRepository;
pub use plugin::PluginRepository;
pub use statistic::StatisticRepository;
pub use tag::{TagArticleRepository, TagRepository};
pub use user::UserRepository;

/// The bundled schema document.
pub const BUNDLED_SCHEMA: &str = include_str!("../resources/repository.json");

/// Parses the bundled schema.
///
/// # Errors
///
/// Only fails if the bundled document itself is broken.
pub fn bundled_schema(prefix: Option<&str>) -> CoreResult<SchemaRegistry> {
    SchemaRegistry::from_json(BUNDLED_SCHEMA, prefix)
}

/// Opens a store, falling back to the bundled schema when the configuration
/// names no schema file.
///
/// # Errors
///
/// Returns an error if the store cannot be opened.
pub fn open_store(config: StoreConfig) -> CoreResult<Store> {
    if config.schema_path.is_some() {
        return Store::open(config);
    }
    let schema = bundled_schema(config.table_prefix.as_deref())?;
    Store::open_with_schema(config, schema)
}

/// Every blog repository, opened on one store.
#[derive(Debug, Clone)]
pub struct BlogRepositories {
    /// Articles.
    pub article: ArticleRepository,
    /// Archive months.
    pub archive_date: ArchiveDateRepository,
    /// Archive month to article links.
    pub archive_date_article: ArchiveDateArticleRepository,
    /// Categories.
    pub category: CategoryRepository,
    /// Category to tag links.
    pub category_tag: CategoryTagRepository,
    /// Comments on articles and pages.
    pub comment: CommentRepository,
    /// Navigation pages.
    pub page: PageRepository,
    /// Plugin states.
    pub plugin: PluginRepository,
    /// Blog statistics.
    pub statistic: StatisticRepository,
    /// Tags.
    pub tag: TagRepository,
    /// Tag to article links.
    pub tag_article: TagArticleRepository,
    /// Users.
    pub user: UserRepository,
}

impl BlogRepositories {
    /// Opens every repository.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the store's schema lacks a blog
    /// table.
    pub fn new(store: &Store) -> CoreResult<Self> {
        Ok(Self {
            article: ArticleRepository::new(store)?,
            archive_date: ArchiveDateRepository::new(store)?,
            archive_date_article: ArchiveDateArticleRepository::new(store)?,
            category: CategoryRepository::new(store)?,
            category_tag: CategoryTagRepository::new(store)?,
            comment: CommentRepository::new(store)?,
            page: PageRepository::new(store)?,
            plugin: PluginRepository::new(store)?,
            statistic: StatisticRepository::new(store)?,
            tag: TagRepository::new(store)?,
            tag_article: TagArticleRepository::new(store)?,
            user: UserRepository::new(store)?,
        })
    }

    /// Every repository, for bulk maintenance.
    pub fn all(&self) -> Vec<&Repository> {
        vec![
            &*self.article,
            &*self.archive_date,
            &*self.archive_date_article,
            &*self.category,
            &*self.category_tag,
            &*self.comment,
            &*self.page,
            &*self.plugin,
            &*self.statistic,
            &*self.tag,
            &*self.tag_article,
            &*self.user,
        ]
    }
}

/// Runs a listing query: the page count is taken as known so no count
/// statement is issued.
pub(crate) fn list(repo: &Repository, query: Query) -> CoreResult<Vec<Record>> {
    Ok(repo
        .query(&query.page_count(PageCount::Known(1)))?
        .records)
}

/// First record of a listing query.
pub(crate) fn first(repo: &Repository, query: Query) -> CoreResult<Option<Record>> {
    Ok(list(repo, query)?.into_iter().next())
}

/// Clamps a requested record count to a page size.
pub(crate) fn page_size(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

/// Join column holding the id of a row in `table`.
pub(crate) fn join_column(table: &str) -> String {
    format!("{table}_{}", blogstore_core::OBJECT_ID)
}
