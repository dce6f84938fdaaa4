//! Raw result cells as returned by the driver.

/// A single column value exactly as the driver returned it.
///
/// Cells carry storage classes, not schema types. Turning a cell into a
/// typed record value is the job of the mapping layer, which knows the
/// declared column type.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    /// SQL `NULL`.
    Null,
    /// Integer storage class.
    Integer(i64),
    /// Floating point storage class.
    Real(f64),
    /// Text storage class.
    Text(String),
    /// Blob storage class.
    Blob(Vec<u8>),
}

impl Cell {
    /// Returns true if this cell is `NULL`.
    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }
}

/// A fully materialized result set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRows {
    /// Column labels in select order.
    pub columns: Vec<String>,
    /// Row cells, each row as wide as `columns`.
    pub rows: Vec<Vec<Cell>>,
}

impl RawRows {
    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if there are no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns the first cell of the first row, if any.
    ///
    /// Handy for `count(..)` style queries.
    pub fn scalar(&self) -> Option<&Cell> {
        self.rows.first().and_then(|row| row.first())
    }
}
