//! Tree builder: namespace -> validated expression tree.

use chrono::NaiveDate;
use tracing::{debug, warn};

use super::address::{children, operand_address, resolve, DateOperands, LeafFields, Resolved};
use super::ast::{Branch, DateCondition, Leaf, Node, NumberField};
use super::error::{ParseFailure, SchemaFault, ValidationError};
use super::value::{parse_date, parse_duration, parse_integer, TimeUnit};
use super::Namespace;

/// Branches nested deeper than this are rejected as malformed.
pub const MAX_DEPTH: usize = 64;

/// Result of building the subtree at one address.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Built {
    /// The subtree, if anything survived pruning and parsing.
    pub node: Option<Node>,
    /// Number of criteria counted, including leaves whose operands failed
    /// to parse.
    pub count: usize,
    /// Operand parse failures in address order.
    pub errors: Vec<ValidationError>,
}

impl Built {
    /// No criteria were supplied at all.
    pub fn is_empty(&self) -> bool {
        self.count == 0 && self.errors.is_empty()
    }

    /// Every operand parsed.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn void() -> Self {
        Self::default()
    }

    fn leaf(leaf: Leaf) -> Self {
        Self {
            node: Some(Node::Leaf(leaf)),
            count: 1,
            errors: Vec::new(),
        }
    }

    /// A leaf that counts as a criterion but produced no node.
    fn rejected(errors: Vec<ValidationError>) -> Self {
        Self {
            node: None,
            count: 1,
            errors,
        }
    }
}

/// Build the subtree rooted at `address`.
///
/// `today` anchors the `today`/`yesterday` date keywords.
pub fn build(ns: &Namespace, address: &str, today: NaiveDate) -> Result<Built, SchemaFault> {
    let built = build_at(ns, address, today, 0).inspect_err(|fault| {
        warn!(%fault, "rejecting malformed filter namespace");
    })?;
    debug!(
        address,
        criteria = built.count,
        errors = built.errors.len(),
        "built filter tree"
    );
    Ok(built)
}

fn build_at(ns: &Namespace, address: &str, today: NaiveDate, depth: usize) -> Result<Built, SchemaFault> {
    if depth > MAX_DEPTH {
        return Err(SchemaFault::TooDeep {
            address: address.to_string(),
        });
    }

    match resolve(ns, address)? {
        Resolved::Absent | Resolved::Blank => Ok(Built::void()),
        Resolved::Branch(combinator) => {
            let mut nodes = Vec::new();
            let mut count = 0;
            let mut errors = Vec::new();

            for child in children(ns, address) {
                let sub = build_at(ns, &child, today, depth + 1)?;
                // Children without criteria are pruned.
                if sub.count == 0 {
                    continue;
                }
                count += sub.count;
                errors.extend(sub.errors);
                nodes.extend(sub.node);
            }

            if count == 0 {
                return Ok(Built {
                    node: None,
                    count: 0,
                    errors,
                });
            }

            // Every child failed to parse; the errors carry the outcome.
            let node = (!nodes.is_empty()).then(|| {
                Node::Branch(Branch {
                    combinator,
                    children: nodes,
                })
            });
            Ok(Built {
                node,
                count,
                errors,
            })
        }
        Resolved::Leaf(fields) => build_leaf(address, fields, today),
    }
}

fn build_leaf(address: &str, fields: LeafFields<'_>, today: NaiveDate) -> Result<Built, SchemaFault> {
    match fields {
        LeafFields::Text {
            field,
            rule,
            operand,
        } => Ok(Built::leaf(Leaf::Text {
            field,
            rule,
            value: operand.to_string(),
        })),

        LeafFields::Number { field, comparison } => {
            let mut errors = Vec::new();
            let parsed =
                comparison.try_map(|n, text| parse_number(field, text, &operand_address(address, n), &mut errors))?;
            match parsed.transpose() {
                Some(comparison) if errors.is_empty() => Ok(Built::leaf(Leaf::Number { field, comparison })),
                _ => Ok(Built::rejected(errors)),
            }
        }

        LeafFields::Date {
            field,
            operands: DateOperands::Recent {
                count,
                unit,
                negated,
            },
        } => {
            // A bad count is reported before the unit is looked at.
            let count = match parse_integer(count) {
                Ok(count) => count,
                Err(err) => {
                    return Ok(Built::rejected(vec![ValidationError::new(
                        operand_address(address, 0),
                        err,
                    )]))
                }
            };
            // The unit comes from a fixed select list, not from the user.
            let unit = TimeUnit::parse(unit).ok_or_else(|| SchemaFault::UnknownUnit {
                address: address.to_string(),
                unit: unit.to_string(),
            })?;

            Ok(Built::leaf(Leaf::Date {
                field,
                condition: DateCondition::Recent { count, unit, negated },
            }))
        }

        LeafFields::Date {
            field,
            operands: DateOperands::Calendar(comparison),
        } => {
            // Stops at the first bad date so one leaf reports one problem.
            let parsed = comparison.try_map(|n, text| {
                parse_date(text, today).map_err(|err| ValidationError::new(operand_address(address, n), err))
            });
            match parsed {
                Ok(comparison) => Ok(Built::leaf(Leaf::Date {
                    field,
                    condition: DateCondition::Calendar(comparison),
                })),
                Err(error) => Ok(Built::rejected(vec![error])),
            }
        }
    }
}

/// Parse one numeric operand, recording soft failures in `errors`.
fn parse_number(
    field: NumberField,
    text: &str,
    key: &str,
    errors: &mut Vec<ValidationError>,
) -> Result<Option<i64>, SchemaFault> {
    let parsed = match field {
        NumberField::Time => parse_duration(text),
        NumberField::Track | NumberField::PlayCount => parse_integer(text).map_err(ParseFailure::from),
    };
    match parsed {
        Ok(value) => Ok(Some(value)),
        Err(ParseFailure::Value(err)) => {
            errors.push(ValidationError::new(key, err));
            Ok(None)
        }
        Err(ParseFailure::Schema(fault)) => Err(fault),
    }
}
