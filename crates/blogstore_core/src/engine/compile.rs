//! Compiles records and queries into SQL fragments with `?` parameters.

use crate::error::{CoreError, CoreResult};
use crate::query::{Filter, FilterOperator, Operand, PropertyFilter, Sort};
use blogstore_codec::{Record, Value, OBJECT_ID};

/// SQL text with its positional parameters.
pub(crate) type Statement = (String, Vec<Value>);

/// Rejects names that cannot be spliced into SQL as identifiers.
pub(crate) fn identifier(name: &str) -> CoreResult<&str> {
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(name)
    } else {
        Err(CoreError::invalid_query(format!("invalid identifier {name:?}")))
    }
}

/// `insert into t (a, b) values (?, ?)`
pub(crate) fn insert(table: &str, record: &Record) -> CoreResult<Statement> {
    let mut columns = Vec::with_capacity(record.len());
    let mut params = Vec::with_capacity(record.len());
    for (key, value) in record {
        columns.push(identifier(key)?);
        params.push(value.clone());
    }
    let placeholders = vec!["?"; columns.len()].join(", ");
    Ok((
        format!(
            "insert into {table} ({}) values ({placeholders})",
            columns.join(", ")
        ),
        params,
    ))
}

/// `update t set a = ?, b = ? where oId = ?`
pub(crate) fn update(
    table: &str,
    id: &str,
    changes: Vec<(String, Value)>,
) -> CoreResult<Statement> {
    let mut sets = Vec::with_capacity(changes.len());
    let mut params = Vec::with_capacity(changes.len() + 1);
    for (key, value) in changes {
        sets.push(format!("{} = ?", identifier(&key)?));
        params.push(value);
    }
    params.push(Value::from(id));
    Ok((
        format!("update {table} set {} where {OBJECT_ID} = ?", sets.join(", ")),
        params,
    ))
}

/// Columns whose new value renders differently from the old one.
///
/// Only keys present in `new` are compared; the key column is skipped.
pub(crate) fn changed_columns(old: &Record, new: &Record) -> Vec<(String, Value)> {
    new.iter()
        .filter(|(key, _)| key.as_str() != OBJECT_ID)
        .filter(|(key, value)| old.get(key).and_then(Value::to_text) != value.to_text())
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

/// Compiles a filter tree into a `where` condition.
///
/// No filter compiles to an empty condition.
pub(crate) fn filter(filter: Option<&Filter>) -> CoreResult<Statement> {
    let mut sql = String::new();
    let mut params = Vec::new();
    if let Some(filter) = filter {
        write_filter(filter, &mut sql, &mut params)?;
    }
    Ok((sql, params))
}

fn write_filter(filter: &Filter, sql: &mut String, params: &mut Vec<Value>) -> CoreResult<()> {
    match filter {
        Filter::Property(property) => write_property(property, sql, params),
        Filter::Composite(composite) => {
            if composite.filters.len() < 2 {
                return Err(CoreError::invalid_query(format!(
                    "composite filter needs at least two children, found {}",
                    composite.filters.len()
                )));
            }
            sql.push('(');
            for (i, child) in composite.filters.iter().enumerate() {
                if i > 0 {
                    sql.push(' ');
                    sql.push_str(composite.operator.as_sql());
                    sql.push(' ');
                }
                write_filter(child, sql, params)?;
            }
            sql.push(')');
            Ok(())
        }
    }
}

fn write_property(
    property: &PropertyFilter,
    sql: &mut String,
    params: &mut Vec<Value>,
) -> CoreResult<()> {
    let key = identifier(&property.key)?;
    match (&property.operator, &property.operand) {
        (FilterOperator::In, Operand::List(values)) if values.is_empty() => {
            sql.push_str("1 != 1");
        }
        (FilterOperator::In, Operand::List(values)) => {
            let placeholders = vec!["?"; values.len()].join(", ");
            sql.push_str(&format!("{key} in ({placeholders})"));
            params.extend(values.iter().cloned());
        }
        (FilterOperator::In, Operand::Single(value)) => {
            sql.push_str(&format!("{key} in (?)"));
            params.push(value.clone());
        }
        (operator, Operand::Single(value)) => {
            sql.push_str(&format!("{key} {} ?", operator.as_sql()));
            params.push(value.clone());
        }
        (operator, Operand::List(_)) => {
            return Err(CoreError::invalid_query(format!(
                "operator {operator} on {key} takes a single value"
            )));
        }
    }
    Ok(())
}

/// `a asc, b desc`, or empty.
pub(crate) fn order_by(sorts: &[Sort]) -> CoreResult<String> {
    let parts = sorts
        .iter()
        .map(|s| Ok(format!("{} {}", identifier(&s.key)?, s.direction.as_sql())))
        .collect::<CoreResult<Vec<_>>>()?;
    Ok(parts.join(", "))
}

/// `*` or the projected columns.
pub(crate) fn select_list(projections: &[String]) -> CoreResult<String> {
    if projections.is_empty() {
        return Ok("*".to_string());
    }
    let columns = projections
        .iter()
        .map(|p| identifier(p))
        .collect::<CoreResult<Vec<_>>>()?;
    Ok(columns.join(", "))
}
