//! Predicate Evaluation
//!
//! Evaluates WHERE comparisons and boolean predicate trees against rows.

use crate::engine::config::{EngineConfig, WhereMode};
use crate::error::ExecutionError;
use crate::sql::types::{ComparisonOperator, Predicate, WhereClause};
use crate::types::{Row, Value};
use std::cmp::Ordering;

/// Options that change how predicates are evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EvalOptions {
    pub where_mode: WhereMode,
    pub like_case_insensitive: bool,
}

impl From<&EngineConfig> for EvalOptions {
    fn from(config: &EngineConfig) -> Self {
        Self {
            where_mode: config.where_mode,
            like_case_insensitive: config.like_case_insensitive,
        }
    }
}

/// Evaluate a single comparison against a row.
///
/// Fails with `MissingField` when the row does not carry the field.
pub fn evaluate(
    row: &Row,
    clause: &WhereClause,
    options: &EvalOptions,
) -> Result<bool, ExecutionError> {
    let actual = row.lookup(&clause.field)?;
    Ok(compare_values(
        actual,
        clause.operator,
        &clause.value,
        options.like_case_insensitive,
    ))
}

impl Predicate {
    /// Evaluate the predicate tree against a row.
    pub fn evaluate(&self, row: &Row, options: &EvalOptions) -> Result<bool, ExecutionError> {
        match options.where_mode {
            WhereMode::Boolean => self.evaluate_tree(row, options),
            WhereMode::Conjunctive => {
                for clause in self.comparisons() {
                    if !evaluate(row, clause, options)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
        }
    }

    fn evaluate_tree(&self, row: &Row, options: &EvalOptions) -> Result<bool, ExecutionError> {
        match self {
            Predicate::Compare(clause) => evaluate(row, clause, options),
            // both sides are evaluated so a missing field always surfaces
            Predicate::And(left, right) => {
                let l = left.evaluate_tree(row, options)?;
                let r = right.evaluate_tree(row, options)?;
                Ok(l && r)
            }
            Predicate::Or(left, right) => {
                let l = left.evaluate_tree(row, options)?;
                let r = right.evaluate_tree(row, options)?;
                Ok(l || r)
            }
        }
    }
}

/// Apply a comparison operator. Any NULL operand yields false.
pub fn compare_values(
    actual: &Value,
    operator: ComparisonOperator,
    expected: &Value,
    like_case_insensitive: bool,
) -> bool {
    if actual.is_null() || expected.is_null() {
        return false;
    }

    if operator == ComparisonOperator::Like {
        return like_match(
            &actual.to_string(),
            &expected.to_string(),
            like_case_insensitive,
        );
    }

    let Some(ordering) = actual.compare(expected) else {
        return false;
    };
    match operator {
        ComparisonOperator::Eq => ordering == Ordering::Equal,
        ComparisonOperator::NotEq => ordering != Ordering::Equal,
        ComparisonOperator::Gt => ordering == Ordering::Greater,
        ComparisonOperator::Lt => ordering == Ordering::Less,
        ComparisonOperator::GtEq => ordering != Ordering::Less,
        ComparisonOperator::LtEq => ordering != Ordering::Greater,
        ComparisonOperator::Like => false,
    }
}

/// SQL LIKE matching: `%` matches any run of characters (including none),
/// `_` matches exactly one character, everything else matches itself.
pub fn like_match(text: &str, pattern: &str, case_insensitive: bool) -> bool {
    let (text, pattern): (Vec<char>, Vec<char>) = if case_insensitive {
        (
            text.to_lowercase().chars().collect(),
            pattern.to_lowercase().chars().collect(),
        )
    } else {
        (text.chars().collect(), pattern.chars().collect())
    };

    let (mut t, mut p) = (0, 0);
    // (pattern index of the last `%`, text index it is currently matched up to)
    let mut backtrack: Option<(usize, usize)> = None;

    while t < text.len() {
        match pattern.get(p) {
            Some('%') => {
                backtrack = Some((p, t));
                p += 1;
            }
            Some(&c) if c == '_' || c == text[t] => {
                t += 1;
                p += 1;
            }
            _ => match backtrack {
                Some((star, consumed)) => {
                    p = star + 1;
                    t = consumed + 1;
                    backtrack = Some((star, consumed + 1));
                }
                None => return false,
            },
        }
    }

    pattern[p..].iter().all(|&c| c == '%')
}

/// A WHERE predicate bound to its evaluation options.
///
/// Handed to table providers for DELETE; an absent predicate matches
/// every row.
#[derive(Debug, Clone, PartialEq)]
pub struct RowFilter {
    predicate: Option<Predicate>,
    options: EvalOptions,
}

impl RowFilter {
    pub fn new(predicate: Option<Predicate>, options: EvalOptions) -> Self {
        Self { predicate, options }
    }

    /// Filter that accepts every row.
    pub fn all() -> Self {
        Self::new(None, EvalOptions::default())
    }

    pub fn predicate(&self) -> Option<&Predicate> {
        self.predicate.as_ref()
    }

    pub fn options(&self) -> &EvalOptions {
        &self.options
    }

    pub fn matches(&self, row: &Row) -> Result<bool, ExecutionError> {
        match &self.predicate {
            Some(predicate) => predicate.evaluate(row, &self.options),
            None => Ok(true),
        }
    }
}
