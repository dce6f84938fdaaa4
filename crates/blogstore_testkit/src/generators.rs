//! Property-based test generators using proptest.
//!
//! Provides strategies for generating records, values, and filters that
//! stay within what a schema accepts.

use blogstore_codec::Value;
use blogstore_core::{Filter, Record};
use chrono::{NaiveDate, NaiveDateTime};
use proptest::prelude::*;

/// Strategy for generating SQL-safe column names.
pub fn column_name_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z][a-z0-9_]{0,15}").expect("Invalid regex")
}

/// Strategy for generating tag titles, including non-ASCII text.
pub fn title_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-zA-Z0-9 \u{4e00}-\u{4e20}]{1,24}").expect("Invalid regex")
}

/// Strategy for generating dates between 1970 and 2100.
pub fn date_strategy() -> impl Strategy<Value = NaiveDate> {
    (0_i64..47_482).prop_map(|days| {
        NaiveDate::from_ymd_opt(1970, 1, 1).expect("Invalid epoch") + chrono::Days::new(days as u64)
    })
}

/// Strategy for generating datetimes down to the nanosecond.
///
/// Half of the values are whole milliseconds, the rest carry arbitrary
/// sub-millisecond digits.
pub fn datetime_strategy() -> impl Strategy<Value = NaiveDateTime> {
    let nanos = prop_oneof![
        (0_u32..1000).prop_map(|millis| millis * 1_000_000),
        0_u32..1_000_000_000,
    ];
    (date_strategy(), 0_u32..86_400, nanos).prop_map(|(date, secs, nanos)| {
        date.and_hms_nano_opt(secs / 3600, secs / 60 % 60, secs % 60, nanos)
            .expect("Invalid time of day")
    })
}

/// Strategy for generating scalar values of every kind.
pub fn value_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::Integer),
        (-1.0e9_f64..1.0e9).prop_map(Value::Double),
        title_strategy().prop_map(Value::Text),
        prop::collection::vec(any::<u8>(), 0..64).prop_map(Value::Bytes),
        date_strategy().prop_map(Value::Date),
        datetime_strategy().prop_map(Value::DateTime),
    ]
}

/// Strategy for generating records over arbitrary columns.
pub fn record_strategy() -> impl Strategy<Value = Record> {
    prop::collection::btree_map(column_name_strategy(), value_strategy(), 0..8)
        .prop_map(|fields| fields.into_iter().collect())
}

/// Strategy for generating records that satisfy the tag table of
/// [`crate::TAG_SCHEMA`].
pub fn tag_record_strategy() -> impl Strategy<Value = Record> {
    (title_strategy(), prop::option::of(0_i64..10_000)).prop_map(|(title, count)| {
        let record = Record::new().with("tag_title", title);
        match count {
            Some(count) => record.with("tag_reference_count", count),
            None => record,
        }
    })
}

/// Strategy for generating records for the sample table of
/// [`crate::TYPED_SCHEMA`], with every nullable column sometimes null.
pub fn typed_record_strategy() -> impl Strategy<Value = Record> {
    (
        title_strategy(),
        prop::option::of(any::<i32>()),
        prop::option::of(any::<i64>()),
        prop::option::of(-1.0e9_f64..1.0e9),
        prop::option::of((-1_000_000_i64..1_000_000).prop_map(|cents| cents as f64 / 100.0)),
        prop::option::of(any::<bool>()),
        prop::option::of(date_strategy()),
        prop::option::of(datetime_strategy()),
        prop::option::of(
            prop::string::string_regex("[\\PC\n]{0,300}").expect("Invalid regex"),
        ),
        prop::option::of(prop::collection::vec(any::<u8>(), 1..64)),
    )
        .prop_map(
            |(title, int, long, double, decimal, flag, day, at, body, blob)| {
                Record::new()
                    .with("sample_title", title)
                    .with("sample_int", int)
                    .with("sample_long", long)
                    .with("sample_double", double)
                    .with("sample_decimal", decimal)
                    .with("sample_flag", flag)
                    .with("sample_day", day)
                    .with("sample_at", at)
                    .with("sample_body", body)
                    .with("sample_blob", blob)
            },
        )
}

/// Strategy for generating filters on `tag_title` nested up to three levels.
pub fn title_filter_strategy() -> impl Strategy<Value = Filter> {
    let leaf = prop_oneof![
        title_strategy().prop_map(|t| Filter::eq("tag_title", t)),
        title_strategy().prop_map(|t| Filter::ne("tag_title", t)),
        title_strategy().prop_map(|t| Filter::like("tag_title", format!("%{t}%"))),
        prop::collection::vec(title_strategy(), 0..4)
            .prop_map(|titles| Filter::in_list("tag_title", titles)),
    ];
    leaf.prop_recursive(3, 16, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 2..4).prop_map(Filter::and),
            prop::collection::vec(inner, 2..4).prop_map(Filter::or),
        ]
    })
}
