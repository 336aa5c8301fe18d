//! The clause algebra.
//!
//! A [`Clause`] is a closed tree of predicates: primitive comparisons,
//! set membership, ranges, column-to-column join conditions, boolean
//! combinators and a raw escape hatch. Trees are built per query and
//! compiled once by [`compile`](crate::compile).
//!
//! # Example
//!
//! ```
//! use model_query_core::{Clause, compile};
//!
//! let clause = Clause::and([
//!     Clause::eq("x", 1),
//!     Clause::or([Clause::eq("y", 2), Clause::eq("y", 3)]),
//! ]);
//! let compiled = compile(&clause).unwrap();
//! assert_eq!(compiled.sql(), "x = ? AND (y = ? OR y = ?)");
//! assert_eq!(compiled.args().len(), 3);
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::value::Value;

/// Comparison operators accepted by [`Clause::Compare`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Operator {
    Equal,
    NotEqual,
    Greater,
    GreaterOrEqual,
    Less,
    LessOrEqual,
    Like,
}

impl Operator {
    /// SQL spelling of the operator.
    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Equal => "=",
            Self::NotEqual => "!=",
            Self::Greater => ">",
            Self::GreaterOrEqual => ">=",
            Self::Less => "<",
            Self::LessOrEqual => "<=",
            Self::Like => "LIKE",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// A node of a WHERE / ON / HAVING condition.
#[derive(Debug, Clone, PartialEq)]
pub enum Clause {
    /// `<column> <op> ?`, or `IS [NOT] NULL` for a null equality.
    Compare {
        column: String,
        op: Operator,
        value: Value,
    },
    /// `<column> IN (?, ...)`.
    In { column: String, values: Vec<Value> },
    /// `<column> BETWEEN ? AND ?`, wrapped in `NOT (...)` when negated.
    Between {
        column: String,
        low: Value,
        high: Value,
        negated: bool,
    },
    /// Column-to-column equality used by join conditions.
    On { left: String, right: String },
    /// `NOT (<clause>)`.
    Not(Box<Clause>),
    And(Vec<Clause>),
    Or(Vec<Clause>),
    /// Passed through verbatim.
    Raw { sql: String, args: Vec<Value> },
}

impl Clause {
    pub fn compare(column: impl Into<String>, op: Operator, value: impl Into<Value>) -> Self {
        Self::Compare {
            column: column.into(),
            op,
            value: value.into(),
        }
    }

    pub fn eq(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(column, Operator::Equal, value)
    }

    pub fn ne(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(column, Operator::NotEqual, value)
    }

    pub fn gt(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(column, Operator::Greater, value)
    }

    pub fn ge(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(column, Operator::GreaterOrEqual, value)
    }

    pub fn lt(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(column, Operator::Less, value)
    }

    pub fn le(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(column, Operator::LessOrEqual, value)
    }

    pub fn like(column: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self::compare(column, Operator::Like, Value::Text(pattern.into()))
    }

    pub fn is_null(column: impl Into<String>) -> Self {
        Self::compare(column, Operator::Equal, Value::Null)
    }

    pub fn is_not_null(column: impl Into<String>) -> Self {
        Self::compare(column, Operator::NotEqual, Value::Null)
    }

    pub fn in_list<V: Into<Value>>(
        column: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        Self::In {
            column: column.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn between(
        column: impl Into<String>,
        low: impl Into<Value>,
        high: impl Into<Value>,
    ) -> Self {
        Self::Between {
            column: column.into(),
            low: low.into(),
            high: high.into(),
            negated: false,
        }
    }

    pub fn not_between(
        column: impl Into<String>,
        low: impl Into<Value>,
        high: impl Into<Value>,
    ) -> Self {
        Self::Between {
            column: column.into(),
            low: low.into(),
            high: high.into(),
            negated: true,
        }
    }

    pub fn on(left: impl Into<String>, right: impl Into<String>) -> Self {
        Self::On {
            left: left.into(),
            right: right.into(),
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(clause: Clause) -> Self {
        Self::Not(Box::new(clause))
    }

    pub fn and(clauses: impl IntoIterator<Item = Clause>) -> Self {
        Self::And(clauses.into_iter().collect())
    }

    pub fn or(clauses: impl IntoIterator<Item = Clause>) -> Self {
        Self::Or(clauses.into_iter().collect())
    }

    pub fn raw<V: Into<Value>>(sql: impl Into<String>, args: impl IntoIterator<Item = V>) -> Self {
        Self::Raw {
            sql: sql.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Follows single-child `AND` / `OR` groups down to the clause that is
    /// actually emitted.
    pub(crate) fn effective(&self) -> &Clause {
        let mut current = self;
        while let Self::And(children) | Self::Or(children) = current {
            match children.as_slice() {
                [only] => current = only,
                _ => break,
            }
        }
        current
    }

    /// Whether this clause needs parentheses when nested inside another
    /// group: a bare `AND` / `OR` chain, or raw SQL that may contain one.
    pub(crate) fn is_compound(&self) -> bool {
        match self.effective() {
            Self::And(children) | Self::Or(children) => children.len() > 1,
            Self::Raw { .. } => true,
            _ => false,
        }
    }
}
