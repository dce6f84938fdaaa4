//! MySQL dialect.

use super::{base_select, integer_bool, Dialect, DialectId, RowWindow};
use crate::schema::{ColumnDescriptor, ColumnType};
use blogstore_storage::Cell;

/// Longest string kept as `varchar`.
const VARCHAR_MAX: u32 = 255;
/// Longest string kept as `text`.
const TEXT_MAX: u32 = 65_535;
/// Longest string kept as `mediumtext`.
const MEDIUMTEXT_MAX: u32 = 16_777_215;
/// `varchar` length used when the schema gives none.
const DEFAULT_VARCHAR_LENGTH: u32 = 100;

/// The full relational dialect.
///
/// No MySQL driver is bundled; the store opens it only over a caller
/// supplied connection source.
#[derive(Debug, Clone, Copy, Default)]
pub struct MySqlDialect;

impl MySqlDialect {
    fn string_type(length: u32) -> String {
        if length > MEDIUMTEXT_MAX {
            "longtext".to_string()
        } else if length > TEXT_MAX {
            "mediumtext".to_string()
        } else if length > VARCHAR_MAX {
            "text".to_string()
        } else if length < 1 {
            format!("varchar({DEFAULT_VARCHAR_LENGTH})")
        } else {
            format!("varchar({length})")
        }
    }
}

impl Dialect for MySqlDialect {
    fn id(&self) -> DialectId {
        DialectId::MySql
    }

    fn column_type(&self, column: &ColumnDescriptor) -> String {
        let length = column.length.unwrap_or(0);
        match column.column_type {
            ColumnType::String => Self::string_type(length),
            ColumnType::Int => "int".to_string(),
            ColumnType::Long => "bigint".to_string(),
            ColumnType::Double => "double".to_string(),
            ColumnType::Boolean => "tinyint(1)".to_string(),
            ColumnType::Date => "date".to_string(),
            ColumnType::DateTime => "datetime".to_string(),
            ColumnType::Decimal => format!(
                "decimal({},{})",
                column.length.unwrap_or(10),
                column.precision.unwrap_or(0)
            ),
            ColumnType::FixedPrecision => format!(
                "numeric({},{})",
                column.length.unwrap_or(10),
                column.precision.unwrap_or(0)
            ),
            ColumnType::LargeText => "longtext".to_string(),
            ColumnType::LargeBinary => "longblob".to_string(),
        }
    }

    fn table_options(&self) -> &'static str {
        " ENGINE=InnoDB DEFAULT CHARSET=utf8mb4"
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
            "{} limit {}, {}",
            base_select(select, table, filter, order_by),
            window.start,
            window.len()
        )
    }

    fn random_sql(&self, table: &str, fetch_size: usize) -> String {
        format!("select * from {table} order by rand() limit {fetch_size}")
    }

    fn read_bool(&self, cell: &Cell) -> Option<bool> {
        integer_bool(cell)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn string(length: u32) -> String {
        MySqlDialect.column_type(&ColumnDescriptor::new("s", ColumnType::String).length(length))
    }

    #[test]
    fn string_lengths_pick_text_types() {
        assert_eq!(string(0), "varchar(100)");
        assert_eq!(string(64), "varchar(64)");
        assert_eq!(string(255), "varchar(255)");
        assert_eq!(string(256), "text");
        assert_eq!(string(65_536), "mediumtext");
        assert_eq!(string(16_777_216), "longtext");
    }

    #[test]
    fn pages_use_offset_comma_count() {
        let sql = MySqlDialect.query_page_sql(
            RowWindow::for_page(2, 15),
            "*",
            "a = ?",
            "oId desc",
            "b3_article",
        );
        assert_eq!(
            sql,
            "select * from b3_article where a = ? order by oId desc limit 15, 15"
        );
    }

    #[test]
    fn random_uses_rand() {
        assert_eq!(
            MySqlDialect.random_sql("t", 3),
            "select * from t order by rand() limit 3"
        );
    }

    #[test]
    fn ddl_carries_table_options() {
        let table = crate::schema::TableDescriptor {
            name: "t".into(),
            columns: vec![
                ColumnDescriptor::new("oId", ColumnType::String).key().length(19),
                ColumnDescriptor::new("n", ColumnType::Long).nullable(false),
                ColumnDescriptor::new("flag", ColumnType::Boolean),
            ],
        };
        assert_eq!(
            MySqlDialect.create_table_sql("t", &table),
            "create table if not exists t (oId varchar(19) not null primary key, \
             n bigint not null, flag tinyint(1)) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4"
        );
    }
}
