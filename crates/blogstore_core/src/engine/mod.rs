//! Execution and mapping engine.
//!
//! [`SqlEngine`] is the innermost [`TableStore`]: it compiles records and
//! queries into parameterized SQL through the active dialect, runs them on
//! the calling thread's connection, and maps rows back into records. It does
//! no validation and no gating; those are middleware layers around it.

mod compile;
mod mapping;

use crate::dialect::{Dialect, RowWindow};
use crate::error::{CoreError, CoreResult};
use crate::keygen::KeyGenerator;
use crate::query::{PageCount, Pagination, Query, QueryResult};
use crate::repository::TableStore;
use crate::schema::TableDescriptor;
use crate::transaction::TransactionManager;
use crate::writability::CallContext;
use blogstore_codec::{Record, Value, OBJECT_ID};
use blogstore_storage::{Cell, Connection};
use std::collections::HashMap;
use std::sync::Arc;

/// SQL execution for one physical table.
#[derive(Debug)]
pub struct SqlEngine {
    table: String,
    descriptor: Option<TableDescriptor>,
    dialect: Arc<dyn Dialect>,
    transactions: Arc<TransactionManager>,
    keygen: Arc<dyn KeyGenerator>,
}

impl SqlEngine {
    /// Creates an engine for `table` (the physical name).
    ///
    /// Without a descriptor, rows map using storage classes only.
    pub fn new(
        table: impl Into<String>,
        descriptor: Option<TableDescriptor>,
        dialect: Arc<dyn Dialect>,
        transactions: Arc<TransactionManager>,
        keygen: Arc<dyn KeyGenerator>,
    ) -> Self {
        Self {
            table: table.into(),
            descriptor,
            dialect,
            transactions,
            keygen,
        }
    }

    fn execute(&self, sql: &str, params: &[Value]) -> CoreResult<usize> {
        tracing::trace!(table = %self.table, sql, params = params.len(), "execute");
        self.transactions
            .with_connection(|conn| Ok(conn.execute(sql, params)?))
    }

    fn fetch(&self, sql: &str, params: &[Value]) -> CoreResult<Vec<Record>> {
        tracing::trace!(table = %self.table, sql, params = params.len(), "query");
        let rows = self
            .transactions
            .with_connection(|conn| Ok(conn.query(sql, params)?))?;
        Ok(mapping::map_rows(
            rows,
            self.descriptor.as_ref(),
            self.dialect.as_ref(),
        ))
    }

    fn count_on(
        &self,
        conn: &mut dyn Connection,
        filter: &str,
        params: &[Value],
    ) -> CoreResult<u64> {
        let mut sql = format!("select count(*) from {}", self.table);
        if !filter.is_empty() {
            sql.push_str(" where ");
            sql.push_str(filter);
        }
        tracing::trace!(table = %self.table, sql = %sql, "count");
        let rows = conn.query(&sql, params)?;
        match rows.scalar() {
            Some(Cell::Integer(n)) => Ok(u64::try_from(*n).unwrap_or(0)),
            other => Err(CoreError::invalid_operation(format!(
                "count returned {other:?}"
            ))),
        }
    }
}

impl TableStore for SqlEngine {
    fn table_name(&self) -> &str {
        &self.table
    }

    fn add(&self, _ctx: &CallContext, mut record: Record) -> CoreResult<String> {
        let id = match record.id().filter(|id| !id.trim().is_empty()) {
            Some(id) => id,
            None => {
                let id = self.keygen.generate();
                record.set_id(id.clone());
                id
            }
        };
        let (sql, params) = compile::insert(&self.table, &record)?;
        self.execute(&sql, &params)?;
        tracing::debug!(table = %self.table, id = %id, "added record");
        Ok(id)
    }

    fn update(&self, _ctx: &CallContext, id: &str, record: &Record) -> CoreResult<()> {
        if id.trim().is_empty() {
            return Ok(());
        }
        let Some(old) = self.get(id)? else {
            tracing::debug!(table = %self.table, id, "update of missing record ignored");
            return Ok(());
        };
        let changes = compile::changed_columns(&old, record);
        if changes.is_empty() {
            return Ok(());
        }
        let (sql, params) = compile::update(&self.table, id, changes)?;
        self.execute(&sql, &params)?;
        Ok(())
    }

    fn remove(&self, _ctx: &CallContext, id: &str) -> CoreResult<()> {
        if id.trim().is_empty() {
            return Ok(());
        }
        let sql = format!("delete from {} where {OBJECT_ID} = ?", self.table);
        self.execute(&sql, &[Value::from(id)])?;
        Ok(())
    }

    fn get(&self, id: &str) -> CoreResult<Option<Record>> {
        let sql = format!("select * from {} where {OBJECT_ID} = ?", self.table);
        Ok(self.fetch(&sql, &[Value::from(id)])?.into_iter().next())
    }

    fn get_many(&self, ids: &[String]) -> CoreResult<HashMap<String, Record>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let placeholders = vec!["?"; ids.len()].join(", ");
        let sql = format!(
            "select * from {} where {OBJECT_ID} in ({placeholders})",
            self.table
        );
        let params: Vec<Value> = ids.iter().map(|id| Value::from(id.as_str())).collect();
        Ok(self
            .fetch(&sql, &params)?
            .into_iter()
            .filter_map(|record| record.id().map(|id| (id, record)))
            .collect())
    }

    fn query(&self, query: &Query) -> CoreResult<QueryResult> {
        if query.current_page_num < 1 {
            return Err(CoreError::invalid_query("current page number must be at least 1"));
        }
        let (filter, params) = compile::filter(query.filter.as_ref())?;
        let order_by = compile::order_by(&query.sorts)?;
        let select = compile::select_list(&query.projections)?;

        let (pagination, rows) = self.transactions.with_connection(|conn| {
            let pagination = match query.page_count {
                PageCount::Known(0) => return Ok((Pagination::known(0), None)),
                PageCount::Known(pages) => Pagination::known(pages),
                PageCount::Compute => {
                    let total = self.count_on(conn, &filter, &params)?;
                    let pagination = Pagination::computed(total, query.page_size);
                    if pagination.page_count == 0 {
                        return Ok((pagination, None));
                    }
                    pagination
                }
            };
            if query.page_size == 0 {
                return Ok((pagination, None));
            }

            let window = RowWindow::for_page(query.current_page_num, query.page_size);
            let sql = self
                .dialect
                .query_page_sql(window, &select, &filter, &order_by, &self.table);
            tracing::trace!(table = %self.table, sql = %sql, "query page");
            Ok((pagination, Some(conn.query(&sql, &params)?)))
        })?;

        let records = rows
            .map(|rows| mapping::map_rows(rows, self.descriptor.as_ref(), self.dialect.as_ref()))
            .unwrap_or_default();
        Ok(QueryResult {
            records,
            pagination,
        })
    }

    fn select(&self, sql: &str, params: &[Value]) -> CoreResult<Vec<Record>> {
        self.fetch(sql, params)
    }

    fn get_randomly(&self, fetch_size: usize) -> CoreResult<Vec<Record>> {
        if fetch_size == 0 {
            return Ok(Vec::new());
        }
        let sql = self.dialect.random_sql(&self.table, fetch_size);
        self.fetch(&sql, &[])
    }

    fn count(&self) -> CoreResult<u64> {
        self.transactions
            .with_connection(|conn| self.count_on(conn, "", &[]))
    }

    fn count_query(&self, query: &Query) -> CoreResult<u64> {
        let (filter, params) = compile::filter(query.filter.as_ref())?;
        self.transactions
            .with_connection(|conn| self.count_on(conn, &filter, &params))
    }
}
