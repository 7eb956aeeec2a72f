//! Lowering of a validated tree into an executable predicate.

use chrono::{DateTime, TimeDelta, Utc};
use tracing::debug;

use super::ast::{DateCondition, DateField, DayComparison, Leaf, Node, NumberComparison, NumberField, TextField, TextOp};
use crate::schema::SongRecord;

/// Boolean test over one song. Immutable once compiled, so it can be shared
/// across threads and evaluated any number of times.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    All(Vec<Predicate>),
    Any(Vec<Predicate>),
    Not(Box<Predicate>),
    /// Case-insensitive text test; `needle` is stored lower-cased.
    Text {
        field: TextField,
        op: TextOp,
        needle: String,
    },
    Number {
        field: NumberField,
        comparison: NumberComparison,
    },
    /// Compares the calendar day (UTC) of a timestamp.
    Day {
        field: DateField,
        comparison: DayComparison,
    },
    /// `within`: timestamp >= cutoff, otherwise timestamp < cutoff.
    Recent {
        field: DateField,
        cutoff: DateTime<Utc>,
        within: bool,
    },
}

impl Predicate {
    pub fn text(field: TextField, op: TextOp, needle: &str) -> Self {
        Predicate::Text {
            field,
            op,
            needle: needle.to_lowercase(),
        }
    }

    pub fn negate(self) -> Self {
        Predicate::Not(Box::new(self))
    }

    pub fn matches(&self, song: &SongRecord) -> bool {
        match self {
            Predicate::All(parts) => parts.iter().all(|p| p.matches(song)),
            Predicate::Any(parts) => parts.iter().any(|p| p.matches(song)),
            Predicate::Not(inner) => !inner.matches(song),
            Predicate::Text { field, op, needle } => {
                op.apply(&song.text(*field).to_lowercase(), needle)
            }
            Predicate::Number { field, comparison } => comparison.matches(&song.number(*field)),
            // Songs without the timestamp never satisfy a date test.
            Predicate::Day { field, comparison } => song
                .timestamp(*field)
                .is_some_and(|ts| comparison.matches(&ts.date_naive())),
            Predicate::Recent {
                field,
                cutoff,
                within,
            } => song
                .timestamp(*field)
                .is_some_and(|ts| (ts >= *cutoff) == *within),
        }
    }
}

/// Compile a validated tree. `now` anchors relative date windows.
///
/// Only call this on a tree that built without validation errors.
pub fn compile(node: &Node, now: DateTime<Utc>) -> Predicate {
    let predicate = lower(node, now);
    debug!(criteria = node.criterion_count(), "compiled filter predicate");
    predicate
}

fn lower(node: &Node, now: DateTime<Utc>) -> Predicate {
    match node {
        Node::Branch(branch) => {
            let parts = branch.children.iter().map(|child| lower(child, now)).collect();
            let joined = if branch.combinator.is_disjunction() {
                Predicate::Any(parts)
            } else {
                Predicate::All(parts)
            };
            if branch.combinator.is_negated() {
                joined.negate()
            } else {
                joined
            }
        }
        Node::Leaf(leaf) => lower_leaf(leaf, now),
    }
}

fn lower_leaf(leaf: &Leaf, now: DateTime<Utc>) -> Predicate {
    match leaf {
        Leaf::Text { field, rule, value } => {
            let (op, negated) = rule.op();
            let test = Predicate::text(*field, op, value);
            if negated {
                test.negate()
            } else {
                test
            }
        }
        Leaf::Number { field, comparison } => Predicate::Number {
            field: *field,
            comparison: *comparison,
        },
        Leaf::Date {
            field,
            condition: DateCondition::Calendar(comparison),
        } => Predicate::Day {
            field: *field,
            comparison: *comparison,
        },
        Leaf::Date {
            field,
            condition:
                DateCondition::Recent {
                    count,
                    unit,
                    negated,
                },
        } => {
            let span = unit.span(*count);
            let cutoff = now.checked_sub_signed(span).unwrap_or(if span > TimeDelta::zero() {
                DateTime::<Utc>::MIN_UTC
            } else {
                DateTime::<Utc>::MAX_UTC
            });
            Predicate::Recent {
                field: *field,
                cutoff,
                within: !*negated,
            }
        }
    }
}
