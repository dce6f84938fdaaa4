//! SQLite dialect.

use super::{base_select, integer_bool, Dialect, DialectId, RowWindow};
use crate::schema::{ColumnDescriptor, ColumnType};
use blogstore_storage::Cell;

/// The embedded dialect.
///
/// SQLite has type affinities rather than column types, so strings of
/// every length are `TEXT` and booleans are stored as 0/1 integers.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteDialect;

impl Dialect for SqliteDialect {
    fn id(&self) -> DialectId {
        DialectId::Sqlite
    }

    fn column_type(&self, column: &ColumnDescriptor) -> String {
        match column.column_type {
            ColumnType::String
            | ColumnType::Date
            | ColumnType::DateTime
            | ColumnType::LargeText => "TEXT",
            ColumnType::Int | ColumnType::Long | ColumnType::Boolean => "INTEGER",
            ColumnType::Double => "REAL",
            ColumnType::Decimal | ColumnType::FixedPrecision => "NUMERIC",
            ColumnType::LargeBinary => "BLOB",
        }
        .to_string()
    }

    fn query_page_sql(
        &self,
        window: RowWindow,
        select: &str,
        filter: &str,
        order_by: &str,
        table: &str,
    ) -> String {
        format!(
            "{} limit {} offset {}",
            base_select(select, table, filter, order_by),
            window.len(),
            window.start
        )
    }

    fn random_sql(&self, table: &str, fetch_size: usize) -> String {
        format!("select * from {table} order by random() limit {fetch_size}")
    }

    fn read_bool(&self, cell: &Cell) -> Option<bool> {
        integer_bool(cell)
    }
}
