//! Blog repositories against the bundled schema.

use blogstore_blog::article::{random_double, RANDOM_DOUBLE};
use blogstore_blog::{archive_date, bundled_schema, BlogRepositories};
use blogstore_core::{CoreError, Record, StoreConfig};
use blogstore_testkit::TestStore;
use chrono::NaiveDate;

fn blog() -> (TestStore, BlogRepositories) {
    let store = TestStore::temporary(bundled_schema(None).unwrap());
    let blog = BlogRepositories::new(&store).unwrap();
    (store, blog)
}

fn article(title: &str, published: bool, comments: i64, views: i64) -> Record {
    let date = NaiveDate::from_ymd_opt(2024, 3, 1)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap();
    Record::new()
        .with("article_title", title)
        .with("article_tags", "rust")
        .with("article_author_email", "admin@b3log.org")
        .with("article_comment_count", comments)
        .with("article_view_count", views)
        .with("article_content", format!("content of {title}"))
        .with("article_permalink", format!("/articles/{title}"))
        .with("article_had_been_published", published)
        .with("article_is_published", published)
        .with("article_put_top", false)
        .with("article_create_date", date)
        .with("article_update_date", date)
        .with(RANDOM_DOUBLE, random_double())
        .with("article_commentable", true)
}

fn tag(title: &str, published_refs: i64) -> Record {
    Record::new()
        .with("tag_title", title)
        .with("tag_reference_count", published_refs)
        .with("tag_published_reference_count", published_refs)
}

fn comment(on_id: &str, on_type: &str) -> Record {
    let date = NaiveDate::from_ymd_opt(2024, 3, 2)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    Record::new()
        .with("comment_content", "nice")
        .with("comment_email", "reader@example.com")
        .with("comment_name", "reader")
        .with("comment_on_id", on_id)
        .with("comment_on_type", on_type)
        .with("comment_date", date)
        .with("comment_sharp_url", "/articles/x#c")
}

fn page(title: &str, order: i64) -> Record {
    Record::new()
        .with("page_title", title)
        .with("page_content", "")
        .with("page_order", order)
        .with("page_comment_count", 0)
        .with("page_permalink", format!("/{title}"))
        .with("page_type", "page")
}

fn user(email: &str, role: &str) -> Record {
    Record::new()
        .with("user_name", "someone")
        .with("user_email", email)
        .with("user_password", "x")
        .with("user_role", role)
        .with("user_article_count", 0)
        .with("user_published_article_count", 0)
}

#[test]
fn bundled_schema_creates_every_table() {
    let (store, blog) = blog();
    assert_eq!(store.table_names().unwrap().len(), 12);
    assert_eq!(blog.all().len(), 12);
}

#[test]
fn prefixed_store_uses_physical_names() {
    let config = StoreConfig::new().table_prefix("b3");
    let store = TestStore::temporary_with(config, bundled_schema(Some("b3")).unwrap());
    let blog = BlogRepositories::new(&store).unwrap();
    assert_eq!(blog.tag.table_name(), "b3_tag");
    assert!(store.table_names().unwrap().iter().all(|t| t.starts_with("b3_")));
}

#[test]
fn articles_are_listed_by_published_state() {
    let (_store, blog) = blog();
    let a = blog.article.add(article("a", true, 5, 10)).unwrap();
    let b = blog.article.add(article("b", false, 50, 100)).unwrap();
    let c = blog.article.add(article("c", true, 7, 1)).unwrap();

    assert!(blog.article.is_published(&a).unwrap());
    assert!(!blog.article.is_published(&b).unwrap());
    assert!(!blog.article.is_published("missing").unwrap());

    let titles = |records: Vec<Record>| -> Vec<String> {
        records.iter().filter_map(|r| r.opt_str("article_title")).collect()
    };
    assert_eq!(titles(blog.article.most_commented(5).unwrap()), vec!["c", "a"]);
    assert_eq!(titles(blog.article.most_viewed(1).unwrap()), vec!["a"]);
    assert_eq!(titles(blog.article.recent(5).unwrap()), vec!["c", "a"]);

    let found = blog.article.by_permalink("/articles/b").unwrap().unwrap();
    assert_eq!(found.id(), Some(b));

    let previous = blog.article.previous(&c).unwrap().unwrap();
    assert_eq!(previous.opt_str("article_title").as_deref(), Some("a"));
    assert!(previous.get("article_content").is_none());
    let next = blog.article.next(&a).unwrap().unwrap();
    assert_eq!(next.opt_str("article_title").as_deref(), Some("c"));
    assert!(blog.article.next(&c).unwrap().is_none());

    let by_author = blog.article.by_author_email("admin@b3log.org", 1, 10).unwrap();
    assert_eq!(by_author.records.len(), 2);
    assert_eq!(by_author.pagination.page_count, 1);

    let random = blog.article.random_published(5).unwrap();
    assert_eq!(random.len(), 2);
    assert!(random.iter().all(|r| r.opt_bool("article_is_published") == Some(true)));
    assert!(blog.article.random_published(0).unwrap().is_empty());
}

#[test]
fn tags_follow_their_article_links() {
    let (_store, blog) = blog();
    let rust = blog.tag.add(tag("rust", 3)).unwrap();
    let go = blog.tag.add(tag("go", 9)).unwrap();
    blog.tag.add(tag("zig", 1)).unwrap();

    assert_eq!(blog.tag.by_title("go").unwrap().unwrap().id(), Some(go.clone()));
    assert!(blog.tag.by_title("java").unwrap().is_none());

    let most_used: Vec<_> = blog
        .tag
        .most_used(2)
        .unwrap()
        .iter()
        .filter_map(|t| t.opt_str("tag_title"))
        .collect();
    assert_eq!(most_used, vec!["go", "rust"]);

    for tag_id in [&rust, &go] {
        blog.tag_article
            .add(Record::new().with("tag_oId", tag_id.as_str()).with("article_oId", "42"))
            .unwrap();
    }
    let tags = blog.tag.by_article_id("42").unwrap();
    assert_eq!(tags.len(), 2);
    assert!(blog.tag.by_article_id("43").unwrap().is_empty());

    let links = blog.tag_article.by_tag_id(&rust, 1, 10).unwrap();
    assert_eq!(links.records.len(), 1);
}

#[test]
fn comments_skip_unpublished_articles() {
    let (_store, blog) = blog();
    let published = blog.article.add(article("p", true, 0, 0)).unwrap();
    let draft = blog.article.add(article("d", false, 0, 0)).unwrap();

    blog.comment.add(comment(&published, "article")).unwrap();
    blog.comment.add(comment(&draft, "article")).unwrap();
    blog.comment.add(comment("page-1", "page")).unwrap();
    blog.comment.add(comment(&published, "article")).unwrap();

    assert_eq!(blog.comment.recent(10).unwrap().len(), 3);
    assert_eq!(blog.comment.comments_on(&published, 1, 1).unwrap().len(), 1);
    assert_eq!(blog.comment.comments_on(&published, 1, 10).unwrap().len(), 2);

    assert_eq!(blog.comment.remove_comments(&published).unwrap(), 2);
    assert_eq!(blog.comment.count().unwrap(), 2);
}

#[test]
fn pages_are_navigated_by_order() {
    let (_store, blog) = blog();
    assert_eq!(blog.page.max_order().unwrap(), -1);

    let first = blog.page.add(page("about", 1)).unwrap();
    let second = blog.page.add(page("links", 2)).unwrap();
    let third = blog.page.add(page("faq", 5)).unwrap();

    assert_eq!(blog.page.max_order().unwrap(), 5);
    assert_eq!(blog.page.upper(&second).unwrap().unwrap().id(), Some(first.clone()));
    assert_eq!(blog.page.under(&second).unwrap().unwrap().id(), Some(third.clone()));
    assert!(blog.page.upper(&first).unwrap().is_none());
    assert!(blog.page.under(&third).unwrap().is_none());
    assert!(blog.page.upper("missing").unwrap().is_none());
    assert_eq!(blog.page.by_order(2).unwrap().unwrap().id(), Some(second));
    assert_eq!(
        blog.page.by_permalink("/faq").unwrap().unwrap().id(),
        Some(third)
    );
    assert_eq!(blog.page.pages().unwrap().len(), 3);
}

#[test]
fn users_are_found_by_normalised_email() {
    let (_store, blog) = blog();
    blog.user.add(user("admin@b3log.org", "adminRole")).unwrap();
    blog.user.add(user("visitor@b3log.org", "visitorRole")).unwrap();

    assert!(blog.user.by_email("  Admin@B3log.org ").unwrap().is_some());
    assert!(blog.user.is_admin_email("ADMIN@b3log.org").unwrap());
    assert!(!blog.user.is_admin_email("visitor@b3log.org").unwrap());
    assert!(!blog.user.is_admin_email("nobody@b3log.org").unwrap());
    assert_eq!(
        blog.user.admin().unwrap().unwrap().opt_str("user_email").as_deref(),
        Some("admin@b3log.org")
    );
}

#[test]
fn archive_dates_hide_empty_months() {
    let (_store, blog) = blog();
    let month = |m: &str, published: i64| {
        Record::new()
            .with("archive_time", archive_date::archive_time(m).unwrap())
            .with("archive_date_article_count", published + 1)
            .with("archive_date_published_article_count", published)
    };
    let march = blog.archive_date.add(month("2024/03", 2)).unwrap();
    blog.archive_date.add(month("2024/04", 0)).unwrap();
    blog.archive_date.add(month("2023/12", 1)).unwrap();

    let found = blog.archive_date.by_archive_date("2024/03").unwrap().unwrap();
    assert_eq!(found.id(), Some(march.clone()));
    assert!(blog.archive_date.by_archive_date("2020/01").unwrap().is_none());
    assert!(matches!(
        blog.archive_date.by_archive_date("March"),
        Err(CoreError::InvalidQuery { .. })
    ));
    assert_eq!(blog.archive_date.archive_dates().unwrap().len(), 2);

    blog.archive_date_article
        .add(Record::new().with("archive_date_oId", march.as_str()).with("article_oId", "7"))
        .unwrap();
    assert!(blog.archive_date_article.by_article_id("7").unwrap().is_some());
    let links = blog.archive_date_article.by_archive_date_id(&march, 1, 10).unwrap();
    assert_eq!(links.records.len(), 1);
}

#[test]
fn category_links_are_removed_in_bulk() {
    let (_store, blog) = blog();
    let category = blog
        .category
        .add(
            Record::new()
                .with("category_title", "lang")
                .with("category_uri", "lang")
                .with("category_order", 0)
                .with("category_tag_count", 2),
        )
        .unwrap();
    assert!(blog.category.by_title("lang").unwrap().is_some());

    for tag_id in ["1", "2"] {
        blog.category_tag
            .add(Record::new().with("category_oId", category.as_str()).with("tag_oId", tag_id))
            .unwrap();
    }
    assert_eq!(blog.category_tag.by_category_id(&category, 1, 10).unwrap().records.len(), 2);
    assert_eq!(blog.category_tag.by_tag_id("1", 1, 10).unwrap().records.len(), 1);

    blog.category_tag.remove_by_tag_id("1").unwrap();
    assert_eq!(blog.category_tag.count().unwrap(), 1);
    blog.category_tag.remove_by_category_id(&category).unwrap();
    assert_eq!(blog.category_tag.count().unwrap(), 0);
}

#[test]
fn plugins_keep_caller_supplied_ids() {
    let (_store, blog) = blog();
    let id = blog
        .plugin
        .add(
            Record::new()
                .with("oId", "hello-world")
                .with("plugin_name", "Hello")
                .with("plugin_version", "1.0")
                .with("plugin_status", "ENABLED"),
        )
        .unwrap();
    assert_eq!(id, "hello-world");

    let disabled = Record::new()
        .with("oId", id.as_str())
        .with("plugin_name", "Hello")
        .with("plugin_version", "1.0")
        .with("plugin_status", "DISABLED");
    blog.plugin.update(&id, &disabled).unwrap();
    let stored = blog.plugin.get(&id).unwrap().unwrap();
    assert_eq!(stored.opt_str("plugin_status").as_deref(), Some("DISABLED"));
    assert_eq!(blog.statistic.count().unwrap(), 0);
}
