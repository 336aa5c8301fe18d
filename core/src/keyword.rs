//! Query keywords: ordering, limits, joins and insert conflict policies.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::clause::Clause;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Order {
    #[default]
    Asc,
    Desc,
    /// Shuffled order; the column is ignored.
    Random,
}

/// Collating sequence applied to an ordering term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Collate {
    #[default]
    None,
    Binary,
    NoCase,
    RTrim,
}

impl Collate {
    fn as_sql(self) -> Option<&'static str> {
        match self {
            Self::None => None,
            Self::Binary => Some("BINARY"),
            Self::NoCase => Some("NOCASE"),
            Self::RTrim => Some("RTRIM"),
        }
    }
}

/// One `ORDER BY` term.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderBy {
    pub column: String,
    pub order: Order,
    #[serde(default)]
    pub collate: Collate,
}

impl OrderBy {
    pub fn asc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            order: Order::Asc,
            collate: Collate::None,
        }
    }

    pub fn desc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            order: Order::Desc,
            collate: Collate::None,
        }
    }

    pub fn random() -> Self {
        Self {
            column: String::new(),
            order: Order::Random,
            collate: Collate::None,
        }
    }

    pub fn collate(mut self, collate: Collate) -> Self {
        self.collate = collate;
        self
    }

    /// SQL spelling of the term, e.g. `name COLLATE NOCASE DESC`.
    pub fn to_sql(&self) -> String {
        if self.order == Order::Random {
            return "RANDOM()".to_string();
        }
        let mut sql = self.column.clone();
        if let Some(collate) = self.collate.as_sql() {
            sql.push_str(" COLLATE ");
            sql.push_str(collate);
        }
        sql.push_str(match self.order {
            Order::Desc => " DESC",
            _ => " ASC",
        });
        sql
    }
}

/// Comma-joined `ORDER BY` body, or `None` when there are no terms.
pub fn order_by_sql(terms: &[OrderBy]) -> Option<String> {
    if terms.is_empty() {
        return None;
    }
    Some(
        terms
            .iter()
            .map(OrderBy::to_sql)
            .collect::<Vec<_>>()
            .join(", "),
    )
}

/// `LIMIT count OFFSET offset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Limit {
    pub offset: u64,
    pub count: u64,
}

impl Limit {
    pub fn new(count: u64) -> Self {
        Self { offset: 0, count }
    }

    pub fn with_offset(offset: u64, count: u64) -> Self {
        Self { offset, count }
    }

    pub fn to_sql(&self) -> String {
        if self.offset == 0 {
            format!("LIMIT {}", self.count)
        } else {
            format!("LIMIT {} OFFSET {}", self.count, self.offset)
        }
    }
}

/// Join flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JoinKind {
    Inner,
    LeftOuter,
    Cross,
    Natural,
}

impl JoinKind {
    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Inner => "INNER JOIN",
            Self::LeftOuter => "LEFT OUTER JOIN",
            Self::Cross => "CROSS JOIN",
            Self::Natural => "NATURAL JOIN",
        }
    }
}

/// A join against another table, with an optional `ON` condition.
#[derive(Debug, Clone, PartialEq)]
pub struct Join {
    pub kind: JoinKind,
    pub table: String,
    pub on: Option<Clause>,
}

impl Join {
    pub fn inner(table: impl Into<String>, on: Clause) -> Self {
        Self {
            kind: JoinKind::Inner,
            table: table.into(),
            on: Some(on),
        }
    }

    pub fn left_outer(table: impl Into<String>, on: Clause) -> Self {
        Self {
            kind: JoinKind::LeftOuter,
            table: table.into(),
            on: Some(on),
        }
    }

    pub fn cross(table: impl Into<String>) -> Self {
        Self {
            kind: JoinKind::Cross,
            table: table.into(),
            on: None,
        }
    }

    pub fn natural(table: impl Into<String>) -> Self {
        Self {
            kind: JoinKind::Natural,
            table: table.into(),
            on: None,
        }
    }
}

/// Conflict resolution for inserts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConflictPolicy {
    Abort,
    #[default]
    Ignore,
    Replace,
    Fail,
    Rollback,
}

impl ConflictPolicy {
    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Abort => "ABORT",
            Self::Ignore => "IGNORE",
            Self::Replace => "REPLACE",
            Self::Fail => "FAIL",
            Self::Rollback => "ROLLBACK",
        }
    }
}

impl fmt::Display for ConflictPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}
