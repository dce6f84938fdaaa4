//! Filters over record fields.

use blogstore_codec::Value;
use std::fmt;

/// Comparison operator of a [`PropertyFilter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterOperator {
    /// `=`
    Equal,
    /// `!=`
    NotEqual,
    /// `<`
    LessThan,
    /// `<=`
    LessThanOrEqual,
    /// `>`
    GreaterThan,
    /// `>=`
    GreaterThanOrEqual,
    /// `in (..)`
    In,
    /// `like`
    Like,
    /// `not like`
    NotLike,
}

impl FilterOperator {
    /// SQL spelling of the operator.
    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Equal => "=",
            Self::NotEqual => "!=",
            Self::LessThan => "<",
            Self::LessThanOrEqual => "<=",
            Self::GreaterThan => ">",
            Self::GreaterThanOrEqual => ">=",
            Self::In => "in",
            Self::Like => "like",
            Self::NotLike => "not like",
        }
    }
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// Right-hand side of a property filter.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// A single value.
    Single(Value),
    /// A list of values, for `IN`.
    List(Vec<Value>),
}

/// Compares one field against an operand.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyFilter {
    /// Field (column) name.
    pub key: String,
    /// Comparison operator.
    pub operator: FilterOperator,
    /// Right-hand side.
    pub operand: Operand,
}

impl PropertyFilter {
    /// Creates a filter with a single operand.
    pub fn new(key: impl Into<String>, operator: FilterOperator, value: impl Into<Value>) -> Self {
        Self {
            key: key.into(),
            operator,
            operand: Operand::Single(value.into()),
        }
    }

    /// Creates an `IN` filter.
    pub fn in_list<I, V>(key: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self {
            key: key.into(),
            operator: FilterOperator::In,
            operand: Operand::List(values.into_iter().map(Into::into).collect()),
        }
    }
}

/// Joins the children of a [`CompositeFilter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompositeOperator {
    /// Every child must match.
    And,
    /// Any child may match.
    Or,
}

impl CompositeOperator {
    /// SQL spelling of the operator.
    pub fn as_sql(self) -> &'static str {
        match self {
            Self::And => "and",
            Self::Or => "or",
        }
    }
}

/// Combines two or more filters.
#[derive(Debug, Clone, PartialEq)]
pub struct CompositeFilter {
    /// How children are joined.
    pub operator: CompositeOperator,
    /// Child filters; fewer than two is rejected at compile time.
    pub filters: Vec<Filter>,
}

/// A filter tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Leaf comparison.
    Property(PropertyFilter),
    /// Nested combination.
    Composite(CompositeFilter),
}

impl Filter {
    /// `key = value`
    pub fn eq(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Property(PropertyFilter::new(key, FilterOperator::Equal, value))
    }

    /// `key != value`
    pub fn ne(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Property(PropertyFilter::new(key, FilterOperator::NotEqual, value))
    }

    /// `key < value`
    pub fn lt(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Property(PropertyFilter::new(key, FilterOperator::LessThan, value))
    }

    /// `key <= value`
    pub fn le(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Property(PropertyFilter::new(key, FilterOperator::LessThanOrEqual, value))
    }

    /// `key > value`
    pub fn gt(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Property(PropertyFilter::new(key, FilterOperator::GreaterThan, value))
    }

    /// `key >= value`
    pub fn ge(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Property(PropertyFilter::new(key, FilterOperator::GreaterThanOrEqual, value))
    }

    /// `key like pattern`
    pub fn like(key: impl Into<String>, pattern: impl Into<Value>) -> Self {
        Filter::Property(PropertyFilter::new(key, FilterOperator::Like, pattern))
    }

    /// `key not like pattern`
    pub fn not_like(key: impl Into<String>, pattern: impl Into<Value>) -> Self {
        Filter::Property(PropertyFilter::new(key, FilterOperator::NotLike, pattern))
    }

    /// `key in (values..)`
    pub fn in_list<I, V>(key: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Filter::Property(PropertyFilter::in_list(key, values))
    }

    /// Every filter must match.
    pub fn and(filters: Vec<Filter>) -> Self {
        Filter::Composite(CompositeFilter {
            operator: CompositeOperator::And,
            filters,
        })
    }

    /// Any filter may match.
    pub fn or(filters: Vec<Filter>) -> Self {
        Filter::Composite(CompositeFilter {
            operator: CompositeOperator::Or,
            filters,
        })
    }
}

impl From<PropertyFilter> for Filter {
    fn from(filter: PropertyFilter) -> Self {
        Filter::Property(filter)
    }
}

impl From<CompositeFilter> for Filter {
    fn from(filter: CompositeFilter) -> Self {
        Filter::Composite(filter)
    }
}
