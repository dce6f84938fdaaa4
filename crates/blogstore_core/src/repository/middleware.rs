//! Decorators around a [`TableStore`].

use super::TableStore;
use crate::error::{CoreError, CoreResult};
use crate::query::{Query, QueryResult};
use crate::schema::SchemaRegistry;
use crate::writability::{CallContext, WritabilityService};
use blogstore_codec::{Record, Value, OBJECT_ID};
use std::collections::HashMap;
use std::sync::Arc;

/// Forwards the listed `TableStore` methods to `self.inner`.
macro_rules! delegate {
    ($($name:ident(&self $(, $arg:ident: $ty:ty)*) -> $ret:ty;)*) => {
        $(
            fn $name(&self $(, $arg: $ty)*) -> $ret {
                self.inner.$name($($arg),*)
            }
        )*
    };
}

/// Validates records against the table descriptor before writing.
///
/// The key column is never required; the engine generates it.
#[derive(Debug)]
pub struct SchemaCheck<S> {
    inner: S,
    schema: Arc<SchemaRegistry>,
}

impl<S: TableStore> SchemaCheck<S> {
    /// Wraps `inner`.
    pub fn new(inner: S, schema: Arc<SchemaRegistry>) -> Self {
        Self { inner, schema }
    }
}

impl<S: TableStore> TableStore for SchemaCheck<S> {
    fn add(&self, ctx: &CallContext, record: Record) -> CoreResult<String> {
        self.schema
            .check(self.inner.table_name(), &record, &[OBJECT_ID])?;
        self.inner.add(ctx, record)
    }

    fn update(&self, ctx: &CallContext, id: &str, record: &Record) -> CoreResult<()> {
        self.schema
            .check(self.inner.table_name(), record, &[OBJECT_ID])?;
        self.inner.update(ctx, id, record)
    }

    delegate! {
        table_name(&self) -> &str;
        remove(&self, ctx: &CallContext, id: &str) -> CoreResult<()>;
        get(&self, id: &str) -> CoreResult<Option<Record>>;
        get_many(&self, ids: &[String]) -> CoreResult<HashMap<String, Record>>;
        has(&self, id: &str) -> CoreResult<bool>;
        query(&self, query: &Query) -> CoreResult<QueryResult>;
        select(&self, sql: &str, params: &[Value]) -> CoreResult<Vec<Record>>;
        get_randomly(&self, fetch_size: usize) -> CoreResult<Vec<Record>>;
        count(&self) -> CoreResult<u64>;
        count_query(&self, query: &Query) -> CoreResult<u64>;
    }
}

/// Rejects writes to frozen tables unless the caller holds internal access.
#[derive(Debug)]
pub struct WriteGate<S> {
    inner: S,
    writability: Arc<WritabilityService>,
}

impl<S: TableStore> WriteGate<S> {
    /// Wraps `inner`.
    pub fn new(inner: S, writability: Arc<WritabilityService>) -> Self {
        Self { inner, writability }
    }

    fn admit(&self, ctx: &CallContext) -> CoreResult<()> {
        let table = self.inner.table_name();
        if self.writability.permits(table, ctx) {
            Ok(())
        } else {
            Err(CoreError::not_writable(table))
        }
    }
}

impl<S: TableStore> TableStore for WriteGate<S> {
    fn add(&self, ctx: &CallContext, record: Record) -> CoreResult<String> {
        self.admit(ctx)?;
        self.inner.add(ctx, record)
    }

    fn update(&self, ctx: &CallContext, id: &str, record: &Record) -> CoreResult<()> {
        self.admit(ctx)?;
        self.inner.update(ctx, id, record)
    }

    fn remove(&self, ctx: &CallContext, id: &str) -> CoreResult<()> {
        self.admit(ctx)?;
        self.inner.remove(ctx, id)
    }

    delegate! {
        table_name(&self) -> &str;
        get(&self, id: &str) -> CoreResult<Option<Record>>;
        get_many(&self, ids: &[String]) -> CoreResult<HashMap<String, Record>>;
        has(&self, id: &str) -> CoreResult<bool>;
        query(&self, query: &Query) -> CoreResult<QueryResult>;
        select(&self, sql: &str, params: &[Value]) -> CoreResult<Vec<Record>>;
        get_randomly(&self, fetch_size: usize) -> CoreResult<Vec<Record>>;
        count(&self) -> CoreResult<u64>;
        count_query(&self, query: &Query) -> CoreResult<u64>;
    }
}

/// Turns execution failures on read paths into empty results.
///
/// `get` degrades to `None`, `query` to an empty zero-page result, `select`
/// and `get_many` to empty collections. Counts and writes propagate.
#[derive(Debug)]
pub struct ReadFallback<S> {
    inner: S,
}

impl<S: TableStore> ReadFallback<S> {
    /// Wraps `inner`.
    pub fn new(inner: S) -> Self {
        Self { inner }
    }

    fn degrade<T>(
        &self,
        op: &str,
        result: CoreResult<T>,
        fallback: impl FnOnce() -> T,
    ) -> CoreResult<T> {
        match result {
            Err(e) if e.is_degradable() => {
                tracing::warn!(
                    table = %self.inner.table_name(),
                    op,
                    error = %e,
                    "read failed, returning empty result"
                );
                Ok(fallback())
            }
            other => other,
        }
    }
}

impl<S: TableStore> TableStore for ReadFallback<S> {
    fn get(&self, id: &str) -> CoreResult<Option<Record>> {
        self.degrade("get", self.inner.get(id), || None)
    }

    fn get_many(&self, ids: &[String]) -> CoreResult<HashMap<String, Record>> {
        self.degrade("get_many", self.inner.get_many(ids), HashMap::new)
    }

    fn has(&self, id: &str) -> CoreResult<bool> {
        Ok(self.get(id)?.is_some())
    }

    fn query(&self, query: &Query) -> CoreResult<QueryResult> {
        self.degrade("query", self.inner.query(query), QueryResult::empty)
    }

    fn select(&self, sql: &str, params: &[Value]) -> CoreResult<Vec<Record>> {
        self.degrade("select", self.inner.select(sql, params), Vec::new)
    }

    delegate! {
        table_name(&self) -> &str;
        add(&self, ctx: &CallContext, record: Record) -> CoreResult<String>;
        update(&self, ctx: &CallContext, id: &str, record: &Record) -> CoreResult<()>;
        remove(&self, ctx: &CallContext, id: &str) -> CoreResult<()>;
        get_randomly(&self, fetch_size: usize) -> CoreResult<Vec<Record>>;
        count(&self) -> CoreResult<u64>;
        count_query(&self, query: &Query) -> CoreResult<u64>;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::Pagination;
    use blogstore_storage::StorageError;
    use parking_lot::Mutex;

    /// A store that records calls and fails reads on demand.
    #[derive(Default)]
    struct FakeStore {
        fail_reads: bool,
        added: Mutex<Vec<Record>>,
    }

    fn failure() -> CoreError {
        CoreError::Execution(StorageError::Io(std::io::Error::other("offline")))
    }

    impl TableStore for FakeStore {
        fn table_name(&self) -> &str {
            "tag"
        }

        fn add(&self, _ctx: &CallContext, record: Record) -> CoreResult<String> {
            self.added.lock().push(record);
            Ok("1".to_string())
        }

        fn update(&self, _ctx: &CallContext, _id: &str, _record: &Record) -> CoreResult<()> {
            Ok(())
        }

        fn remove(&self, _ctx: &CallContext, _id: &str) -> CoreResult<()> {
            Ok(())
        }

        fn get(&self, _id: &str) -> CoreResult<Option<Record>> {
            if self.fail_reads {
                Err(failure())
            } else {
                Ok(Some(Record::new()))
            }
        }

        fn get_many(&self, _ids: &[String]) -> CoreResult<HashMap<String, Record>> {
            Err(failure())
        }

        fn query(&self, _query: &Query) -> CoreResult<QueryResult> {
            Err(failure())
        }

        fn select(&self, _sql: &str, _params: &[Value]) -> CoreResult<Vec<Record>> {
            Err(CoreError::configuration("no schema"))
        }

        fn get_randomly(&self, _fetch_size: usize) -> CoreResult<Vec<Record>> {
            Err(failure())
        }

        fn count(&self) -> CoreResult<u64> {
            Err(failure())
        }

        fn count_query(&self, _query: &Query) -> CoreResult<u64> {
            Ok(0)
        }
    }

    fn tag_schema() -> Arc<SchemaRegistry> {
        let json = r#"{"tables":[{"name":"tag","keys":[
            {"name":"oId","type":"String","iskey":true},
            {"name":"tag_title","type":"String"}]}]}"#;
        Arc::new(SchemaRegistry::from_json(json, None).unwrap())
    }

    #[test]
    fn read_fallback_degrades_execution_failures() {
        let store = ReadFallback::new(FakeStore {
            fail_reads: true,
            ..FakeStore::default()
        });
        assert_eq!(store.get("1").unwrap(), None);
        assert!(!store.has("1").unwrap());
        assert!(store.get_many(&["1".into()]).unwrap().is_empty());

        let result = store.query(&Query::new()).unwrap();
        assert!(result.records.is_empty());
        assert_eq!(result.pagination, Pagination::default());
    }

    #[test]
    fn read_fallback_keeps_other_errors() {
        let store = ReadFallback::new(FakeStore::default());
        assert!(matches!(
            store.select("select 1", &[]),
            Err(CoreError::Configuration { .. })
        ));
        assert!(store.count().is_err());
        assert!(store.get_randomly(1).is_err());
    }

    #[test]
    fn schema_check_rejects_before_inner_store() {
        let store = SchemaCheck::new(FakeStore::default(), tag_schema());
        let ctx = CallContext::standard();

        let err = store
            .add(&ctx, Record::new().with("tag_title", "go").with("extra", 1_i64))
            .unwrap_err();
        assert!(matches!(err, CoreError::SchemaViolation { .. }));
        assert!(store.inner.added.lock().is_empty());

        store.add(&ctx, Record::new().with("tag_title", "go")).unwrap();
        assert_eq!(store.inner.added.lock().len(), 1);
    }

    #[test]
    fn write_gate_honors_internal_access() {
        let writability = Arc::new(WritabilityService::new());
        let store = WriteGate::new(FakeStore::default(), Arc::clone(&writability));
        writability.set_writable("tag", false);

        let standard = CallContext::standard();
        assert!(matches!(
            store.add(&standard, Record::new()),
            Err(CoreError::NotWritable { .. })
        ));
        assert!(store.update(&standard, "1", &Record::new()).is_err());
        assert!(store.remove(&standard, "1").is_err());

        let internal = CallContext::internal(writability.internal_access());
        store.add(&internal, Record::new()).unwrap();
        store.remove(&internal, "1").unwrap();
    }
}
