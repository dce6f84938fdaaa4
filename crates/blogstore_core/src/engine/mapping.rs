//! Maps raw result rows back into records.

use crate::dialect::Dialect;
use crate::schema::{ColumnType, TableDescriptor};
use blogstore_codec::{Record, Value, DATETIME_FORMAT, DATE_FORMAT};
use blogstore_storage::{Cell, RawRows};
use chrono::{NaiveDate, NaiveDateTime};

/// Maps every row of a result set.
///
/// Columns found in the descriptor (ignoring case) are renamed to their
/// declared name and coerced to their logical type. Other columns, such as
/// aggregates, pass through under their raw label.
pub(crate) fn map_rows(
    rows: RawRows,
    descriptor: Option<&TableDescriptor>,
    dialect: &dyn Dialect,
) -> Vec<Record> {
    let columns: Vec<(String, Option<ColumnType>)> = rows
        .columns
        .iter()
        .map(|label| match descriptor.and_then(|d| d.column(label)) {
            Some(column) => (column.name.clone(), Some(column.column_type)),
            None => (label.clone(), None),
        })
        .collect();

    rows.rows
        .into_iter()
        .map(|row| {
            columns
                .iter()
                .zip(row)
                .map(|((name, column_type), cell)| {
                    let value = match column_type {
                        Some(ty) => coerce(name, *ty, cell, dialect),
                        None => raw(cell),
                    };
                    (name.clone(), value)
                })
                .collect()
        })
        .collect()
}

fn raw(cell: Cell) -> Value {
    match cell {
        Cell::Null => Value::Null,
        Cell::Integer(n) => Value::Integer(n),
        Cell::Real(n) => Value::Double(n),
        Cell::Text(s) => Value::Text(s),
        Cell::Blob(b) => Value::Bytes(b),
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn coerce(name: &str, column_type: ColumnType, cell: Cell, dialect: &dyn Dialect) -> Value {
    if cell.is_null() {
        return Value::Null;
    }
    match column_type {
        ColumnType::Boolean => dialect.read_bool(&cell).map_or(Value::Null, Value::Bool),
        ColumnType::String => match cell {
            Cell::Integer(n) => Value::Text(n.to_string()),
            Cell::Real(n) => Value::Text(n.to_string()),
            Cell::Blob(b) => Value::Text(String::from_utf8_lossy(&b).into_owned()),
            other => raw(other),
        },
        ColumnType::Int | ColumnType::Long => match cell {
            Cell::Real(n) => Value::Integer(n as i64),
            Cell::Text(s) => s
                .trim()
                .parse()
                .map_or(Value::Text(s), Value::Integer),
            other => raw(other),
        },
        ColumnType::Double | ColumnType::Decimal | ColumnType::FixedPrecision => match cell {
            Cell::Integer(n) => Value::Double(n as f64),
            Cell::Text(s) => s.trim().parse().map_or(Value::Text(s), Value::Double),
            other => raw(other),
        },
        ColumnType::Date => match cell {
            Cell::Text(s) => parse_date(&s).map_or(Value::Text(s), Value::Date),
            other => raw(other),
        },
        ColumnType::DateTime => match cell {
            Cell::Text(s) => parse_datetime(&s).map_or(Value::Text(s), Value::DateTime),
            other => raw(other),
        },
        ColumnType::LargeText => match cell {
            Cell::Blob(bytes) => match String::from_utf8(bytes) {
                Ok(text) => Value::Text(text),
                Err(e) => {
                    tracing::error!(column = name, error = %e, "unreadable large text");
                    Value::Null
                }
            },
            other => raw(other),
        },
        ColumnType::LargeBinary => match cell {
            Cell::Text(s) => Value::Bytes(s.into_bytes()),
            other => raw(other),
        },
    }
}

fn parse_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    NaiveDate::parse_from_str(text, DATE_FORMAT)
        .ok()
        .or_else(|| parse_datetime(text).map(|dt| dt.date()))
}

fn parse_datetime(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    NaiveDateTime::parse_from_str(text, DATETIME_FORMAT)
        .ok()
        .or_else(|| NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f").ok())
        .or_else(|| {
            NaiveDate::parse_from_str(text, DATE_FORMAT)
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}
