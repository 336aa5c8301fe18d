//! SQL statement text for embedded-SQL providers.
//!
//! Each builder returns a [`Statement`] whose arguments are ordered to
//! match its placeholders left to right: join conditions, then the
//! `WHERE` clause, then `HAVING`.

use crate::compile::CompiledClause;
use crate::keyword::{ConflictPolicy, order_by_sql};
use crate::provider::SelectRequest;
use crate::row::Values;
use crate::value::Value;

/// SQL text plus its bound arguments.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Statement {
    pub sql: String,
    pub args: Vec<Value>,
}

impl Statement {
    fn push_where(&mut self, selection: &CompiledClause) {
        if !selection.is_empty() {
            self.sql.push_str(" WHERE ");
            self.sql.push_str(selection.sql());
            self.args.extend_from_slice(selection.args());
        }
    }
}

fn projection(request: &SelectRequest) -> String {
    if request.columns.is_empty() {
        return "*".to_string();
    }
    if request.joins.is_empty() {
        return request.columns.join(", ");
    }
    // qualify bare columns so joined tables cannot make them ambiguous
    request
        .columns
        .iter()
        .map(|column| {
            if column.contains(['.', '(', ' ']) {
                column.clone()
            } else {
                format!("{}.{column} AS {column}", request.table)
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// `SELECT` statement for `request`.
pub fn select_statement(request: &SelectRequest) -> Statement {
    let mut statement = Statement {
        sql: format!("SELECT {} FROM {}", projection(request), request.table),
        args: Vec::new(),
    };

    for join in &request.joins {
        statement.sql.push(' ');
        statement.sql.push_str(join.kind.as_sql());
        statement.sql.push(' ');
        statement.sql.push_str(&join.table);
        if !join.on.is_empty() {
            statement.sql.push_str(" ON ");
            statement.sql.push_str(join.on.sql());
            statement.args.extend_from_slice(join.on.args());
        }
    }

    statement.push_where(&request.selection);

    if !request.group_by.is_empty() {
        statement.sql.push_str(" GROUP BY ");
        statement.sql.push_str(&request.group_by.join(", "));
    }
    if !request.having.is_empty() {
        statement.sql.push_str(" HAVING ");
        statement.sql.push_str(request.having.sql());
        statement.args.extend_from_slice(request.having.args());
    }
    if let Some(order) = order_by_sql(&request.order_by) {
        statement.sql.push_str(" ORDER BY ");
        statement.sql.push_str(&order);
    }
    if let Some(limit) = &request.limit {
        statement.sql.push(' ');
        statement.sql.push_str(&limit.to_sql());
    }
    statement
}

/// `INSERT OR <policy>` statement for one row.
pub fn insert_statement(table: &str, values: &Values, policy: ConflictPolicy) -> Statement {
    if values.is_empty() {
        return Statement {
            sql: format!("INSERT OR {policy} INTO {table} DEFAULT VALUES"),
            args: Vec::new(),
        };
    }
    let columns: Vec<&str> = values.columns().collect();
    let placeholders = vec!["?"; columns.len()].join(", ");
    Statement {
        sql: format!(
            "INSERT OR {policy} INTO {table} ({}) VALUES ({placeholders})",
            columns.join(", ")
        ),
        args: values.iter().map(|(_, value)| value.clone()).collect(),
    }
}

/// `UPDATE` statement; `SET` arguments precede `WHERE` arguments.
pub fn update_statement(table: &str, values: &Values, selection: &CompiledClause) -> Statement {
    let assignments: Vec<String> = values.columns().map(|c| format!("{c} = ?")).collect();
    let mut statement = Statement {
        sql: format!("UPDATE {table} SET {}", assignments.join(", ")),
        args: values.iter().map(|(_, value)| value.clone()).collect(),
    };
    statement.push_where(selection);
    statement
}

pub fn delete_statement(table: &str, selection: &CompiledClause) -> Statement {
    let mut statement = Statement {
        sql: format!("DELETE FROM {table}"),
        args: Vec::new(),
    };
    statement.push_where(selection);
    statement
}

pub fn count_statement(table: &str, selection: &CompiledClause) -> Statement {
    let mut statement = Statement {
        sql: format!("SELECT COUNT(*) FROM {table}"),
        args: Vec::new(),
    };
    statement.push_where(selection);
    statement
}
