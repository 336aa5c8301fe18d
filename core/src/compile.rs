//! Clause compilation into a parameterized SQL fragment.
//!
//! [`compile`] walks a [`Clause`] tree once, appending SQL text and bound
//! arguments in the same left-to-right pass, so argument order always
//! matches placeholder order. Nested `AND` / `OR` chains are
//! parenthesized so an inner `OR` never leaks into an outer `AND`.

use crate::clause::{Clause, Operator};
use crate::error::CompileError;
use crate::value::Value;

/// Result of compiling a clause: SQL text plus ordered arguments.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CompiledClause {
    sql: String,
    args: Vec<Value>,
}

impl CompiledClause {
    /// The empty clause: no SQL and no arguments.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn args(&self) -> &[Value] {
        &self.args
    }

    /// `true` when no condition was supplied; callers omit `WHERE`.
    pub fn is_empty(&self) -> bool {
        self.sql.is_empty()
    }

    pub fn into_parts(self) -> (String, Vec<Value>) {
        (self.sql, self.args)
    }
}

/// Compiles one clause tree.
///
/// # Errors
///
/// Returns a [`CompileError`] for empty `IN` lists, empty groups, `NULL`
/// used with an ordering operator or as a `BETWEEN` bound, and blob
/// arguments.
pub fn compile(clause: &Clause) -> Result<CompiledClause, CompileError> {
    let mut compiler = Compiler::default();
    compiler.emit(clause)?;
    Ok(compiler.finish())
}

/// Compiles the clauses supplied to a query, joined with `AND`.
///
/// An empty slice yields [`CompiledClause::empty`].
pub fn compile_all(clauses: &[Clause]) -> Result<CompiledClause, CompileError> {
    match clauses {
        [] => Ok(CompiledClause::empty()),
        [single] => compile(single),
        many => {
            let mut compiler = Compiler::default();
            compiler.emit_group(many, " AND ")?;
            Ok(compiler.finish())
        }
    }
}

#[derive(Default)]
struct Compiler {
    sql: String,
    args: Vec<Value>,
}

impl Compiler {
    fn finish(self) -> CompiledClause {
        CompiledClause {
            sql: self.sql,
            args: self.args,
        }
    }

    fn emit(&mut self, clause: &Clause) -> Result<(), CompileError> {
        match clause.effective() {
            Clause::Compare { column, op, value } => self.emit_compare(column, *op, value),
            Clause::In { column, values } => self.emit_in(column, values),
            Clause::Between {
                column,
                low,
                high,
                negated,
            } => self.emit_between(column, low, high, *negated),
            Clause::On { left, right } => {
                check_column(left)?;
                check_column(right)?;
                self.sql.push_str(left);
                self.sql.push_str(" = ");
                self.sql.push_str(right);
                Ok(())
            }
            Clause::Not(inner) => {
                self.sql.push_str("NOT (");
                self.emit(inner)?;
                self.sql.push(')');
                Ok(())
            }
            Clause::And(children) => {
                if children.is_empty() {
                    return Err(CompileError::EmptyGroup("AND"));
                }
                self.emit_group(children, " AND ")
            }
            Clause::Or(children) => {
                if children.is_empty() {
                    return Err(CompileError::EmptyGroup("OR"));
                }
                self.emit_group(children, " OR ")
            }
            Clause::Raw { sql, args } => {
                self.sql.push_str(sql);
                self.args.extend(args.iter().cloned());
                Ok(())
            }
        }
    }

    fn emit_group(&mut self, children: &[Clause], separator: &str) -> Result<(), CompileError> {
        for (idx, child) in children.iter().enumerate() {
            if idx > 0 {
                self.sql.push_str(separator);
            }
            if child.is_compound() {
                self.sql.push('(');
                self.emit(child)?;
                self.sql.push(')');
            } else {
                self.emit(child)?;
            }
        }
        Ok(())
    }

    fn emit_compare(&mut self, column: &str, op: Operator, value: &Value) -> Result<(), CompileError> {
        check_column(column)?;
        if value.is_null() {
            // `= NULL` never matches in SQL
            let suffix = match op {
                Operator::Equal => " IS NULL",
                Operator::NotEqual => " IS NOT NULL",
                op => {
                    return Err(CompileError::NullComparison {
                        column: column.to_string(),
                        op,
                    });
                }
            };
            self.sql.push_str(column);
            self.sql.push_str(suffix);
            return Ok(());
        }

        check_value(column, value)?;
        self.sql.push_str(column);
        self.sql.push(' ');
        self.sql.push_str(op.as_sql());
        self.sql.push_str(" ?");
        self.args.push(value.clone());
        Ok(())
    }

    fn emit_in(&mut self, column: &str, values: &[Value]) -> Result<(), CompileError> {
        check_column(column)?;
        if values.is_empty() {
            return Err(CompileError::EmptyInList(column.to_string()));
        }
        for value in values {
            check_value(column, value)?;
        }

        self.sql.push_str(column);
        self.sql.push_str(" IN (");
        for idx in 0..values.len() {
            if idx > 0 {
                self.sql.push_str(", ");
            }
            self.sql.push('?');
        }
        self.sql.push(')');
        self.args.extend(values.iter().cloned());
        Ok(())
    }

    fn emit_between(
        &mut self,
        column: &str,
        low: &Value,
        high: &Value,
        negated: bool,
    ) -> Result<(), CompileError> {
        check_column(column)?;
        if low.is_null() || high.is_null() {
            return Err(CompileError::NullBound(column.to_string()));
        }
        check_value(column, low)?;
        check_value(column, high)?;

        if negated {
            self.sql.push_str("NOT (");
        }
        self.sql.push_str(column);
        self.sql.push_str(" BETWEEN ? AND ?");
        if negated {
            self.sql.push(')');
        }
        self.args.push(low.clone());
        self.args.push(high.clone());
        Ok(())
    }
}

fn check_column(column: &str) -> Result<(), CompileError> {
    if column.trim().is_empty() {
        return Err(CompileError::EmptyColumn);
    }
    Ok(())
}

fn check_value(column: &str, value: &Value) -> Result<(), CompileError> {
    match value {
        Value::Blob(_) => Err(CompileError::UnsupportedValue {
            column: column.to_string(),
            found: value.type_name(),
        }),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn ints(values: &[i64]) -> Vec<Value> {
        values.iter().copied().map(Value::Integer).collect()
    }

    #[test]
    fn test_and_parenthesizes_nested_or() {
        let clause = Clause::and([
            Clause::eq("x", 1),
            Clause::or([Clause::eq("y", 2), Clause::eq("y", 3)]),
        ]);
        let compiled = compile(&clause).unwrap();
        assert_eq!(compiled.sql(), "x = ? AND (y = ? OR y = ?)");
        assert_eq!(compiled.args(), ints(&[1, 2, 3]).as_slice());
    }

    #[test]
    fn test_or_parenthesizes_nested_and() {
        let clause = Clause::or([
            Clause::and([Clause::eq("a", 1), Clause::eq("b", 2)]),
            Clause::eq("c", 3),
        ]);
        let compiled = compile(&clause).unwrap();
        assert_eq!(compiled.sql(), "(a = ? AND b = ?) OR c = ?");
        assert_eq!(compiled.args(), ints(&[1, 2, 3]).as_slice());
    }

    #[test]
    fn test_single_child_group_collapses() {
        let clause = Clause::and([
            Clause::eq("x", 1),
            Clause::and([Clause::or([Clause::eq("y", 2), Clause::eq("z", 3)])]),
        ]);
        let compiled = compile(&clause).unwrap();
        assert_eq!(compiled.sql(), "x = ? AND (y = ? OR z = ?)");

        let single = compile(&Clause::or([Clause::ge("t", 5)])).unwrap();
        assert_eq!(single.sql(), "t >= ?");
    }

    #[test]
    fn test_null_equality_becomes_is_null() {
        let compiled = compile(&Clause::eq("x", Value::Null)).unwrap();
        assert_eq!(compiled.sql(), "x IS NULL");
        assert!(compiled.args().is_empty());

        let compiled = compile(&Clause::ne("x", Value::Null)).unwrap();
        assert_eq!(compiled.sql(), "x IS NOT NULL");
        assert!(compiled.args().is_empty());
    }

    #[test]
    fn test_null_with_ordering_operator_fails() {
        let err = compile(&Clause::gt("x", Value::Null)).unwrap_err();
        assert_eq!(
            err,
            CompileError::NullComparison {
                column: "x".to_string(),
                op: Operator::Greater,
            }
        );
    }

    #[test]
    fn test_empty_in_list_fails() {
        let err = compile(&Clause::in_list("x", Vec::<i64>::new())).unwrap_err();
        assert_eq!(err, CompileError::EmptyInList("x".to_string()));
    }

    #[test]
    fn test_in_list_placeholders() {
        let compiled = compile(&Clause::in_list("name", ["clyde", "angie"])).unwrap();
        assert_eq!(compiled.sql(), "name IN (?, ?)");
        assert_eq!(
            compiled.args(),
            &[Value::Text("clyde".into()), Value::Text("angie".into())]
        );
    }

    #[test]
    fn test_between_and_not_between() {
        let compiled = compile(&Clause::between("ts", 10, 20)).unwrap();
        assert_eq!(compiled.sql(), "ts BETWEEN ? AND ?");
        assert_eq!(compiled.args(), ints(&[10, 20]).as_slice());

        let compiled = compile(&Clause::not_between("ts", 10, 20)).unwrap();
        assert_eq!(compiled.sql(), "NOT (ts BETWEEN ? AND ?)");
        assert_eq!(compiled.args(), ints(&[10, 20]).as_slice());
    }

    #[test]
    fn test_between_null_bound_fails() {
        let err = compile(&Clause::between("ts", Value::Null, 3)).unwrap_err();
        assert_eq!(err, CompileError::NullBound("ts".to_string()));
    }

    #[test]
    fn test_empty_group_fails() {
        assert_eq!(
            compile(&Clause::And(Vec::new())).unwrap_err(),
            CompileError::EmptyGroup("AND")
        );
        assert_eq!(
            compile(&Clause::Or(Vec::new())).unwrap_err(),
            CompileError::EmptyGroup("OR")
        );
    }

    #[test]
    fn test_blob_argument_rejected() {
        let err = compile(&Clause::eq("data", vec![1_u8, 2])).unwrap_err();
        assert!(matches!(err, CompileError::UnsupportedValue { found: "blob", .. }));
    }

    #[test]
    fn test_bool_serializes_to_integer() {
        let compiled = compile(&Clause::eq("is_registered", true)).unwrap();
        assert_eq!(compiled.args(), &[Value::Integer(1)]);
    }

    #[test]
    fn test_raw_passes_through() {
        let compiled = compile(&Clause::raw("length(name) > ?", [3])).unwrap();
        assert_eq!(compiled.sql(), "length(name) > ?");

        let clause = Clause::and([
            Clause::eq("a", 1),
            Clause::raw("length(name) > ?", [3]),
        ]);
        let compiled = compile(&clause).unwrap();
        assert_eq!(compiled.sql(), "a = ? AND (length(name) > ?)");
        assert_eq!(compiled.args(), ints(&[1, 3]).as_slice());
    }

    #[test]
    fn test_raw_with_or_keeps_precedence_inside_and() {
        let clause = Clause::and([
            Clause::raw("a = ? OR b = ?", [1, 2]),
            Clause::eq("c", 3),
        ]);
        let compiled = compile(&clause).unwrap();
        assert_eq!(compiled.sql(), "(a = ? OR b = ?) AND c = ?");
        assert_eq!(compiled.args(), ints(&[1, 2, 3]).as_slice());

        let compiled = compile_all(&[
            Clause::eq("c", 3),
            Clause::raw("a = 1 OR b = 2", Vec::<i64>::new()),
        ])
        .unwrap();
        assert_eq!(compiled.sql(), "c = ? AND (a = 1 OR b = 2)");

        let compiled = compile(&Clause::or([Clause::raw("x > 0", Vec::<i64>::new())])).unwrap();
        assert_eq!(compiled.sql(), "x > 0");
    }

    #[test]
    fn test_not_and_on() {
        let compiled = compile(&Clause::not(Clause::or([
            Clause::eq("a", 1),
            Clause::eq("b", 2),
        ])))
        .unwrap();
        assert_eq!(compiled.sql(), "NOT (a = ? OR b = ?)");

        let compiled = compile(&Clause::on("post.user_id", "user._id")).unwrap();
        assert_eq!(compiled.sql(), "post.user_id = user._id");
        assert!(compiled.args().is_empty());
    }

    #[test]
    fn test_compile_all() {
        assert!(compile_all(&[]).unwrap().is_empty());

        let compiled = compile_all(&[
            Clause::eq("a", 1),
            Clause::or([Clause::eq("b", 2), Clause::eq("c", 3)]),
        ])
        .unwrap();
        assert_eq!(compiled.sql(), "a = ? AND (b = ? OR c = ?)");
    }

    fn leaf() -> impl Strategy<Value = Clause> {
        prop_oneof![
            (0..100_i64).prop_map(|v| Clause::eq("a", v)),
            (0..100_i64).prop_map(|v| Clause::lt("b", v)),
            Just(Clause::is_null("c")),
            proptest::collection::vec(0..100_i64, 1..5).prop_map(|v| Clause::in_list("d", v)),
            (0..50_i64, 50..100_i64).prop_map(|(lo, hi)| Clause::not_between("e", lo, hi)),
            Just(Clause::on("f", "g")),
        ]
    }

    fn tree() -> impl Strategy<Value = Clause> {
        leaf().prop_recursive(4, 32, 4, |inner| {
            prop_oneof![
                proptest::collection::vec(inner.clone(), 1..4).prop_map(Clause::And),
                proptest::collection::vec(inner.clone(), 1..4).prop_map(Clause::Or),
                inner.prop_map(Clause::not),
            ]
        })
    }

    proptest! {
        #[test]
        fn test_placeholders_match_args(clause in tree()) {
            let compiled = compile(&clause).unwrap();
            let placeholders = compiled.sql().matches('?').count();
            prop_assert_eq!(placeholders, compiled.args().len());
        }

        #[test]
        fn test_parentheses_balance(clause in tree()) {
            let compiled = compile(&clause).unwrap();
            let open = compiled.sql().matches('(').count();
            let close = compiled.sql().matches(')').count();
            prop_assert_eq!(open, close);
        }
    }
}
