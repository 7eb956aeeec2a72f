//! Flat key namespace and the address resolver.
//!
//! # Address grammar
//!
//! - `k` holds either a combinator (`and`, `or`, `nand`, `nor`) or a field kind.
//! - A branch's children live at `k_0`, `k_1`, ... up to the first gap.
//! - A leaf's rule lives at `k_r`, its operands at `k_f0` and `k_f1`.

use std::collections::HashMap;

use super::ast::{
    Combinator, DateField, DateRule, DayComparison, FieldKind, NumberComparison, NumberField, NumberRule, Span, TextField,
    TextRule,
};
use super::error::SchemaFault;

/// Flat `address -> text` map, as submitted by the filter form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Namespace {
    fields: HashMap<String, String>,
}

impl Namespace {
    /// Parse an `application/x-www-form-urlencoded` query string.
    ///
    /// `+` decodes to a space and later duplicates replace earlier ones.
    pub fn from_query_string(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        query
            .split('&')
            .filter(|segment| !segment.is_empty())
            .map(|segment| {
                let (key, value) = segment.split_once('=').unwrap_or((segment, ""));
                (decode_component(key), decode_component(value))
            })
            .collect()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Namespace {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

fn decode_component(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    String::from_utf8_lossy(&urlencoding::decode_binary(spaced.as_bytes())).into_owned()
}

/// Address of the `index`-th child of a branch.
pub fn child_address(address: &str, index: usize) -> String {
    format!("{}_{}", address, index)
}

/// Address of a leaf's rule token.
pub fn rule_address(address: &str) -> String {
    format!("{}_r", address)
}

/// Address of a leaf's `n`-th operand.
pub fn operand_address(address: &str, n: usize) -> String {
    format!("{}_f{}", address, n)
}

/// Child addresses of the branch at `address`, in index order, stopping at
/// the first index with no entry.
pub fn children<'a>(ns: &'a Namespace, address: &'a str) -> impl Iterator<Item = String> + 'a {
    (0..)
        .map(move |i| child_address(address, i))
        .take_while(move |child| ns.contains(child))
}

/// What the namespace holds at an address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolved<'a> {
    /// No node here.
    Absent,
    /// A text criterion left blank. Its rule is never read.
    Blank,
    Branch(Combinator),
    Leaf(LeafFields<'a>),
}

/// A leaf's family-checked rule, with its raw operands in the shape the
/// rule reads them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeafFields<'a> {
    Text {
        field: TextField,
        rule: TextRule,
        /// Never blank.
        operand: &'a str,
    },
    Number {
        field: NumberField,
        comparison: NumberComparison<&'a str>,
    },
    Date {
        field: DateField,
        operands: DateOperands<'a>,
    },
}

/// Raw operands of a timestamp leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateOperands<'a> {
    Calendar(DayComparison<&'a str>),
    Recent {
        count: &'a str,
        unit: &'a str,
        negated: bool,
    },
}

/// Classify the node at `address`.
pub fn resolve<'a>(ns: &'a Namespace, address: &str) -> Result<Resolved<'a>, SchemaFault> {
    let Some(token) = ns.get(address) else {
        return Ok(Resolved::Absent);
    };

    if let Some(combinator) = Combinator::parse(token) {
        return Ok(Resolved::Branch(combinator));
    }

    let kind = FieldKind::parse(token).ok_or_else(|| SchemaFault::UnknownKind {
        address: address.to_string(),
        token: token.to_string(),
    })?;

    let text_operand = ns.get(&operand_address(address, 0)).unwrap_or_default();
    if matches!(kind, FieldKind::Text(_)) && text_operand.trim().is_empty() {
        return Ok(Resolved::Blank);
    }

    let rule_token = ns
        .get(&rule_address(address))
        .ok_or_else(|| SchemaFault::MissingRule {
            address: address.to_string(),
        })?;
    let bad_rule = || SchemaFault::UnknownRule {
        address: address.to_string(),
        kind: kind.as_str(),
        rule: rule_token.to_string(),
    };

    let fields = match kind {
        FieldKind::Text(field) => LeafFields::Text {
            field,
            rule: TextRule::parse(rule_token).ok_or_else(bad_rule)?,
            operand: text_operand,
        },
        FieldKind::Number(field) => {
            let rule = NumberRule::parse(rule_token).ok_or_else(bad_rule)?;
            let first = required_operand(ns, address, 0)?;
            let comparison = match rule {
                NumberRule::Lte => NumberComparison::AtMost(first),
                NumberRule::Gte => NumberComparison::AtLeast(first),
                NumberRule::Is => NumberComparison::Equal(first),
                NumberRule::NotIs => NumberComparison::NotEqual(first),
                NumberRule::Inside => NumberComparison::Inside(Span::new(first, required_operand(ns, address, 1)?)),
                NumberRule::Outside => NumberComparison::Outside(Span::new(first, required_operand(ns, address, 1)?)),
            };
            LeafFields::Number { field, comparison }
        }
        FieldKind::Date(field) => {
            let rule = DateRule::parse(rule_token).ok_or_else(bad_rule)?;
            let first = required_operand(ns, address, 0)?;
            let operands = match rule {
                DateRule::Last | DateRule::NoLast => DateOperands::Recent {
                    count: first,
                    unit: required_operand(ns, address, 1)?,
                    negated: rule == DateRule::NoLast,
                },
                DateRule::Before => DateOperands::Calendar(DayComparison::Before(first)),
                DateRule::After => DateOperands::Calendar(DayComparison::After(first)),
                DateRule::Inside => {
                    DateOperands::Calendar(DayComparison::Inside(Span::new(first, required_operand(ns, address, 1)?)))
                }
                DateRule::Outside => {
                    DateOperands::Calendar(DayComparison::Outside(Span::new(first, required_operand(ns, address, 1)?)))
                }
            };
            LeafFields::Date { field, operands }
        }
    };

    Ok(Resolved::Leaf(fields))
}

fn required_operand<'a>(ns: &'a Namespace, address: &str, n: usize) -> Result<&'a str, SchemaFault> {
    let key = operand_address(address, n);
    ns.get(&key).ok_or(SchemaFault::MissingOperand { key })
}
