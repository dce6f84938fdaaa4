//! SQL dialects.
//!
//! A [`Dialect`] owns everything that differs between backends: native
//! column types, the table DDL, paginated and random selects, and how a
//! boolean comes back from the driver. Shared code never branches on the
//! backend; it asks the dialect.
//!
//! Dialects are selected once at startup through [`DialectId`].
//!
//! Only SQLite ships a driver. [`MySqlDialect`] renders SQL (the `ddl`
//! command prints its table definitions), but `Store::open` and
//! `Store::open_with_schema` refuse it; running MySQL statements needs a
//! `ConnectionSource` passed to `Store::open_with_source`.

mod mysql;
mod sqlite;

pub use mysql::MySqlDialect;
pub use sqlite::SqliteDialect;

use crate::error::{CoreError, CoreResult};
use crate::schema::{ColumnDescriptor, TableDescriptor};
use blogstore_storage::Cell;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// A `[start, end)` row window of one page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowWindow {
    /// Offset of the first row.
    pub start: u64,
    /// Offset one past the last row.
    pub end: u64,
}

impl RowWindow {
    /// Computes the window of a one-based page.
    pub fn for_page(current_page_num: u32, page_size: u32) -> Self {
        let start = u64::from(current_page_num.saturating_sub(1)) * u64::from(page_size);
        Self {
            start,
            end: start + u64::from(page_size),
        }
    }

    /// Number of rows in the window.
    pub fn len(&self) -> u64 {
        self.end.saturating_sub(self.start)
    }

    /// Returns true if the window holds no rows.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Backend-specific SQL generation.
pub trait Dialect: Send + Sync + fmt::Debug {
    /// Identifier of this dialect.
    fn id(&self) -> DialectId;

    /// Native column type for a column, without constraints.
    fn column_type(&self, column: &ColumnDescriptor) -> String;

    /// Trailing table options appended after the column list.
    fn table_options(&self) -> &'static str {
        ""
    }

    /// Renders `create table` for a descriptor under a physical name.
    fn create_table_sql(&self, table: &str, descriptor: &TableDescriptor) -> String {
        let columns: Vec<String> = descriptor
            .columns
            .iter()
            .map(|column| {
                let mut sql = format!("{} {}", column.name, self.column_type(column));
                if !column.nullable {
                    sql.push_str(" not null");
                }
                if column.is_key {
                    sql.push_str(" primary key");
                }
                sql
            })
            .collect();
        format!(
            "create table if not exists {table} ({}){}",
            columns.join(", "),
            self.table_options()
        )
    }

    /// Renders a statement emptying or dropping a table.
    fn clear_table_sql(&self, table: &str, drop: bool) -> String {
        if drop {
            format!("drop table if exists {table}")
        } else {
            format!("delete from {table}")
        }
    }

    /// Renders one page of a select.
    ///
    /// `select` is the column list (`*` or projections), `filter` a `where`
    /// condition and `order_by` a sort list; either may be empty.
    fn query_page_sql(
        &self,
        window: RowWindow,
        select: &str,
        filter: &str,
        order_by: &str,
        table: &str,
    ) -> String;

    /// Renders a select of `fetch_size` random rows.
    fn random_sql(&self, table: &str, fetch_size: usize) -> String;

    /// Reads a boolean column value.
    fn read_bool(&self, cell: &Cell) -> Option<bool>;
}

/// Renders `select .. from .. [where ..] [order by ..]`.
pub fn base_select(select: &str, table: &str, filter: &str, order_by: &str) -> String {
    let mut sql = format!("select {select} from {table}");
    if !filter.is_empty() {
        sql.push_str(" where ");
        sql.push_str(filter);
    }
    if !order_by.is_empty() {
        sql.push_str(" order by ");
        sql.push_str(order_by);
    }
    sql
}

/// Boolean decoding shared by backends that store booleans as integers.
pub(crate) fn integer_bool(cell: &Cell) -> Option<bool> {
    match cell {
        Cell::Null => None,
        Cell::Integer(n) => Some(*n != 0),
        Cell::Real(n) => Some(*n != 0.0),
        Cell::Text(s) => match s.trim() {
            "1" => Some(true),
            "0" => Some(false),
            other => other.parse().ok(),
        },
        Cell::Blob(bytes) => Some(bytes.iter().any(|b| *b != 0)),
    }
}

/// Compile-time registry of dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DialectId {
    /// MySQL, the full relational dialect. Render-only without a custom
    /// connection source.
    #[serde(alias = "MySQL")]
    MySql,
    /// SQLite, the embedded dialect.
    #[default]
    #[serde(alias = "SQLite")]
    Sqlite,
}

impl DialectId {
    /// Every registered dialect.
    pub const ALL: [DialectId; 2] = [DialectId::MySql, DialectId::Sqlite];

    /// Constructs the dialect.
    pub fn create(self) -> Arc<dyn Dialect> {
        match self {
            DialectId::MySql => Arc::new(MySqlDialect),
            DialectId::Sqlite => Arc::new(SqliteDialect),
        }
    }

    /// Configuration name of the dialect.
    pub fn name(self) -> &'static str {
        match self {
            DialectId::MySql => "mysql",
            DialectId::Sqlite => "sqlite",
        }
    }
}

impl fmt::Display for DialectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DialectId {
    type Err = CoreError;

    fn from_str(s: &str) -> CoreResult<Self> {
        DialectId::ALL
            .into_iter()
            .find(|id| id.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| CoreError::configuration(format!("unknown dialect {s}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ColumnType;

    fn tag() -> TableDescriptor {
        TableDescriptor {
            name: "tag".into(),
            columns: vec![
                ColumnDescriptor::new("oId", ColumnType::String).key().length(19),
                ColumnDescriptor::new("tag_title", ColumnType::String)
                    .nullable(false)
                    .length(64),
                ColumnDescriptor::new("tag_count", ColumnType::Int),
            ],
        }
    }

    #[test]
    fn windows_are_half_open() {
        assert_eq!(RowWindow::for_page(1, 10), RowWindow { start: 0, end: 10 });
        assert_eq!(RowWindow::for_page(3, 10), RowWindow { start: 20, end: 30 });
        assert!(RowWindow::for_page(2, 0).is_empty());
    }

    #[test]
    fn base_select_omits_empty_clauses() {
        assert_eq!(base_select("*", "t", "", ""), "select * from t");
        assert_eq!(
            base_select("a, b", "t", "a = ?", "b desc"),
            "select a, b from t where a = ? order by b desc"
        );
    }

    #[test]
    fn dialect_ids_parse_case_insensitively() {
        assert_eq!("MySQL".parse::<DialectId>().unwrap(), DialectId::MySql);
        assert_eq!(" sqlite ".parse::<DialectId>().unwrap(), DialectId::Sqlite);
        assert!("oracle".parse::<DialectId>().is_err());
        for id in DialectId::ALL {
            assert_eq!(id.create().id(), id);
        }
    }

    #[test]
    fn dialect_ids_deserialize() {
        let id: DialectId = serde_json::from_str("\"mysql\"").unwrap();
        assert_eq!(id, DialectId::MySql);
    }

    #[test]
    fn create_table_marks_key_and_not_null() {
        let sql = SqliteDialect.create_table_sql("b3_tag", &tag());
        assert_eq!(
            sql,
            "create table if not exists b3_tag (oId TEXT not null primary key, \
             tag_title TEXT not null, tag_count INTEGER)"
        );
    }

    #[test]
    fn clear_table_deletes_or_drops() {
        assert_eq!(MySqlDialect.clear_table_sql("t", false), "delete from t");
        assert_eq!(SqliteDialect.clear_table_sql("t", true), "drop table if exists t");
    }

    #[test]
    fn integer_booleans() {
        assert_eq!(integer_bool(&Cell::Integer(1)), Some(true));
        assert_eq!(integer_bool(&Cell::Integer(0)), Some(false));
        assert_eq!(integer_bool(&Cell::Text("true".into())), Some(true));
        assert_eq!(integer_bool(&Cell::Blob(vec![1])), Some(true));
        assert_eq!(integer_bool(&Cell::Null), None);
    }
}
