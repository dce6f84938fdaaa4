//! Store-level properties, checked against SQLite.

use blogstore_core::{
    CallContext, CoreError, Filter, PageCount, Query, Record, SortDirection, Value, OBJECT_ID,
};
use chrono::NaiveDate;
use blogstore_testkit::prelude::*;
use proptest::prelude::*;

fn config() -> ProptestConfig {
    ProptestConfig::with_cases(32)
}

proptest! {
    #![proptest_config(config())]

    #[test]
    fn add_then_get_round_trips(record in tag_record_strategy()) {
        let (id, stored) = with_temp_store(tag_schema(), |store| {
            let tags = store.repository("tag").unwrap();
            let id = tags.add(record.clone()).unwrap();
            (id.clone(), tags.get(&id).unwrap())
        });
        let mut expected = record;
        if !expected.contains_key("tag_reference_count") {
            expected.insert("tag_reference_count", Value::Null);
        }
        expected.set_id(id);
        prop_assert_eq!(stored, Some(expected));
    }

    #[test]
    fn every_column_type_round_trips(record in typed_record_strategy()) {
        let (id, stored) = with_temp_store(typed_schema(), |store| {
            let samples = store.repository("sample").unwrap();
            let id = samples.add(record.clone()).unwrap();
            (id.clone(), samples.get(&id).unwrap())
        });

        let mut expected = record;
        expected.set_id(id);
        prop_assert_eq!(stored, Some(expected));
    }

    #[test]
    fn redundant_keys_are_rejected_whatever_is_ignored(column in column_name_strategy()) {
        let lowered = column.to_lowercase();
        prop_assume!(!["oid", "tag_title", "tag_reference_count"].contains(&lowered.as_str()));
        let schema = tag_schema();
        let record = Record::new().with("tag_title", "go").with(column.as_str(), 1_i64);

        let err = schema.check("tag", &record, &[OBJECT_ID, column.as_str()]).unwrap_err();
        let is_violation = matches!(err, CoreError::SchemaViolation { .. });
        prop_assert!(is_violation);
    }

    #[test]
    fn computed_pagination_rounds_up(total in 0_usize..20, size in 1_u32..7) {
        let (store, _) = scenarios::tagged_store(total);
        let tags = store.repository("tag").unwrap();

        let result = tags.query(&Query::new().page(1, size)).unwrap();
        let expected = u32::try_from(total).unwrap().div_ceil(size);
        prop_assert_eq!(result.pagination.page_count, expected);
        prop_assert_eq!(result.pagination.record_count, total as u64);
        prop_assert_eq!(result.records.len(), total.min(size as usize));
    }

    #[test]
    fn query_and_count_agree(filter in title_filter_strategy()) {
        let (store, _) = scenarios::tagged_store(6);
        let tags = store.repository("tag").unwrap();

        let query = Query::new().filter(filter);
        let listed = tags.query(&query).unwrap();
        let counted = tags.count_query(&query).unwrap();
        prop_assert_eq!(listed.records.len() as u64, counted);
        prop_assert_eq!(listed.pagination.record_count, counted);
    }
}

#[test]
fn missing_non_nullable_column_depends_on_ignored_keys() {
    let schema = tag_schema();
    let record = Record::new().with(OBJECT_ID, "1");

    assert!(matches!(
        schema.check("tag", &record, &[OBJECT_ID]),
        Err(CoreError::SchemaViolation { .. })
    ));
    schema
        .check("tag", &record, &[OBJECT_ID, "tag_title"])
        .unwrap();

    with_temp_store(tag_schema(), |store| {
        let tags = store.repository("tag").unwrap();
        let err = tags.add(Record::new().with("tag_reference_count", 1)).unwrap_err();
        assert!(matches!(err, CoreError::SchemaViolation { .. }));
        assert_eq!(tags.count().unwrap(), 0);
    });
}

#[test]
fn update_keeps_sub_millisecond_changes() {
    with_temp_store(typed_schema(), |store| {
        let samples = store.repository("sample").unwrap();
        let day = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let before = day.and_hms_micro_opt(3, 4, 5, 123_456).unwrap();
        let after = day.and_hms_micro_opt(3, 4, 5, 123_457).unwrap();

        let id = samples
            .add(Record::new().with("sample_title", "t").with("sample_at", before))
            .unwrap();
        let stored = samples.get(&id).unwrap().unwrap();
        assert_eq!(stored.get("sample_at"), Some(&Value::DateTime(before)));

        samples.update(&id, &stored.with("sample_at", after)).unwrap();
        let stored = samples.get(&id).unwrap().unwrap();
        assert_eq!(stored.get("sample_at"), Some(&Value::DateTime(after)));
    });
}

#[test]
fn known_page_count_skips_the_count_statement() {
    let (store, log) = TestStore::recording(tag_schema());
    let tags = store.repository("tag").unwrap();
    for title in ["a", "b", "c"] {
        tags.add(Record::new().with("tag_title", title)).unwrap();
    }
    log.clear();

    let result = tags
        .query(&Query::new().page(1, 2).page_count(PageCount::Known(1)))
        .unwrap();
    assert_eq!(result.records.len(), 2);
    assert_eq!(result.pagination.page_count, 1);
    assert_eq!(result.pagination.record_count, 0);
    assert_eq!(log.count_matching("count("), 0);

    let result = tags.query(&Query::new().page(1, 2)).unwrap();
    assert_eq!(result.pagination.page_count, 2);
    assert_eq!(log.count_matching("count("), 1);
}

#[test]
fn empty_table_reports_zero_pages_without_selecting() {
    let (store, log) = TestStore::recording(tag_schema());
    let tags = store.repository("tag").unwrap();

    let result = tags.query(&Query::new().page(1, 10)).unwrap();
    assert!(result.records.is_empty());
    assert_eq!(result.pagination.page_count, 0);
    assert_eq!(log.statements().len(), 1);
}

#[test]
fn or_filter_returns_each_match_once() {
    let (store, _) = scenarios::tagged_store(4);
    let tags = store.repository("tag").unwrap();

    let query = Query::new()
        .filter(Filter::or(vec![
            Filter::eq("tag_title", "t1"),
            Filter::eq("tag_title", "t2"),
            Filter::eq("tag_title", "t1"),
        ]))
        .sort("tag_title", SortDirection::Ascending);
    let titles: Vec<_> = tags
        .query(&query)
        .unwrap()
        .records
        .iter()
        .filter_map(|r| r.opt_str("tag_title"))
        .collect();
    assert_eq!(titles, vec!["t1", "t2"]);
}

#[test]
fn frozen_table_admits_only_internal_writes() {
    let (store, ids) = scenarios::tagged_store(1);
    let tags = store.repository("tag").unwrap();
    tags.set_writable(false);

    let update = Record::new().with("tag_title", "renamed");
    assert!(matches!(
        tags.update(&ids[0], &update),
        Err(CoreError::NotWritable { .. })
    ));
    assert!(matches!(tags.remove(&ids[0]), Err(CoreError::NotWritable { .. })));

    let internal = CallContext::internal(store.writability().internal_access());
    tags.update_with(&internal, &ids[0], &update).unwrap();
    let stored = tags.get(&ids[0]).unwrap().unwrap();
    assert_eq!(stored.opt_str("tag_title").as_deref(), Some("renamed"));

    store.writability().set_all_writable(true);
    tags.remove(&ids[0]).unwrap();
    assert!(!tags.has(&ids[0]).unwrap());
}

#[test]
fn commit_is_visible_and_rollback_is_not() {
    let (store, log) = TestStore::recording(tag_schema());
    let tags = store.repository("tag").unwrap();

    let kept = store
        .transaction(|| tags.add(Record::new().with("tag_title", "kept")))
        .unwrap();
    let failed: Result<String, CoreError> = store.transaction(|| {
        tags.add(Record::new().with("tag_title", "lost"))?;
        Err(CoreError::invalid_operation("abort"))
    });
    assert!(failed.is_err());

    assert!(tags.has(&kept).unwrap());
    let lost = Query::new().filter(Filter::eq("tag_title", "lost"));
    assert_eq!(tags.count_query(&lost).unwrap(), 0);
    assert_eq!(log.count_matching("COMMIT"), 1);
    assert_eq!(log.count_matching("ROLLBACK"), 1);

    let mut txn = store.begin().unwrap();
    txn.commit().unwrap();
    assert!(matches!(txn.commit(), Err(CoreError::InvalidOperation { .. })));
    assert!(matches!(txn.rollback(), Err(CoreError::InvalidOperation { .. })));
}
