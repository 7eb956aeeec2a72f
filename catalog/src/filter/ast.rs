//! Expression tree produced by the builder.
//!
//! Every leaf carries operands that are already parsed, and each field
//! family only admits its own rules, so a tree that exists is a tree the
//! compiler can lower without further checks.

use std::fmt;

use chrono::NaiveDate;

use super::value::TimeUnit;

/// Boolean combinator of a branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    And,
    Or,
    /// Negated conjunction.
    Nand,
    /// Negated disjunction.
    Nor,
}

impl Combinator {
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "and" => Some(Combinator::And),
            "or" => Some(Combinator::Or),
            "nand" => Some(Combinator::Nand),
            "nor" => Some(Combinator::Nor),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Combinator::And => "and",
            Combinator::Or => "or",
            Combinator::Nand => "nand",
            Combinator::Nor => "nor",
        }
    }

    /// Whether the children are joined by OR (before any negation).
    pub fn is_disjunction(&self) -> bool {
        matches!(self, Combinator::Or | Combinator::Nor)
    }

    pub fn is_negated(&self) -> bool {
        matches!(self, Combinator::Nand | Combinator::Nor)
    }
}

/// Free-text song fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextField {
    Title,
    Album,
    Artist,
}

/// Integer song fields. `Time` is the duration in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberField {
    Time,
    Track,
    PlayCount,
}

/// Timestamp song fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateField {
    DateAdded,
    LastQueued,
}

/// A field kind as named in the namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text(TextField),
    Number(NumberField),
    Date(DateField),
}

impl FieldKind {
    pub fn parse(token: &str) -> Option<Self> {
        let kind = match token {
            "title" => FieldKind::Text(TextField::Title),
            "album" => FieldKind::Text(TextField::Album),
            "artist" => FieldKind::Text(TextField::Artist),
            "time" => FieldKind::Number(NumberField::Time),
            "track" => FieldKind::Number(NumberField::Track),
            "play_count" => FieldKind::Number(NumberField::PlayCount),
            "date_added" => FieldKind::Date(DateField::DateAdded),
            "last_queued" => FieldKind::Date(DateField::LastQueued),
            _ => return None,
        };
        Some(kind)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::Text(field) => field.as_str(),
            FieldKind::Number(field) => field.as_str(),
            FieldKind::Date(field) => field.as_str(),
        }
    }
}

impl TextField {
    pub fn as_str(&self) -> &'static str {
        match self {
            TextField::Title => "title",
            TextField::Album => "album",
            TextField::Artist => "artist",
        }
    }
}

impl NumberField {
    pub fn as_str(&self) -> &'static str {
        match self {
            NumberField::Time => "time",
            NumberField::Track => "track",
            NumberField::PlayCount => "play_count",
        }
    }
}

impl DateField {
    pub fn as_str(&self) -> &'static str {
        match self {
            DateField::DateAdded => "date_added",
            DateField::LastQueued => "last_queued",
        }
    }
}

/// Rules accepted by text fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextRule {
    In,
    NotIn,
    Start,
    NotStart,
    End,
    NotEnd,
    Is,
    NotIs,
}

impl TextRule {
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "in" => Some(TextRule::In),
            "notin" => Some(TextRule::NotIn),
            "start" => Some(TextRule::Start),
            "notstart" => Some(TextRule::NotStart),
            "end" => Some(TextRule::End),
            "notend" => Some(TextRule::NotEnd),
            "is" => Some(TextRule::Is),
            "notis" => Some(TextRule::NotIs),
            _ => None,
        }
    }

    /// The match operation and whether its result is negated.
    pub fn op(&self) -> (TextOp, bool) {
        match self {
            TextRule::In => (TextOp::Contains, false),
            TextRule::NotIn => (TextOp::Contains, true),
            TextRule::Start => (TextOp::StartsWith, false),
            TextRule::NotStart => (TextOp::StartsWith, true),
            TextRule::End => (TextOp::EndsWith, false),
            TextRule::NotEnd => (TextOp::EndsWith, true),
            TextRule::Is => (TextOp::Equals, false),
            TextRule::NotIs => (TextOp::Equals, true),
        }
    }
}

/// Case-insensitive string test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextOp {
    Contains,
    StartsWith,
    EndsWith,
    Equals,
}

impl TextOp {
    /// Apply to an already lower-cased haystack and needle.
    pub fn apply(&self, haystack: &str, needle: &str) -> bool {
        match self {
            TextOp::Contains => haystack.contains(needle),
            TextOp::StartsWith => haystack.starts_with(needle),
            TextOp::EndsWith => haystack.ends_with(needle),
            TextOp::Equals => haystack == needle,
        }
    }

    fn describe(&self, negated: bool) -> &'static str {
        match (self, negated) {
            (TextOp::Contains, false) => "contains",
            (TextOp::Contains, true) => "does not contain",
            (TextOp::StartsWith, false) => "starts with",
            (TextOp::StartsWith, true) => "does not start with",
            (TextOp::EndsWith, false) => "ends with",
            (TextOp::EndsWith, true) => "does not end with",
            (TextOp::Equals, false) => "is",
            (TextOp::Equals, true) => "is not",
        }
    }
}

/// Rules accepted by integer fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberRule {
    Lte,
    Gte,
    Is,
    NotIs,
    Inside,
    Outside,
}

impl NumberRule {
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "lte" => Some(NumberRule::Lte),
            "gte" => Some(NumberRule::Gte),
            "is" => Some(NumberRule::Is),
            "notis" => Some(NumberRule::NotIs),
            "inside" => Some(NumberRule::Inside),
            "outside" => Some(NumberRule::Outside),
            _ => None,
        }
    }
}

/// Rules accepted by timestamp fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateRule {
    Last,
    NoLast,
    Before,
    After,
    Inside,
    Outside,
}

impl DateRule {
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "last" => Some(DateRule::Last),
            "nolast" => Some(DateRule::NoLast),
            "before" => Some(DateRule::Before),
            "after" => Some(DateRule::After),
            "inside" => Some(DateRule::Inside),
            "outside" => Some(DateRule::Outside),
            _ => None,
        }
    }
}

/// Inclusive range `lo..=hi`. Bounds are kept as given, so `lo > hi`
/// contains nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span<T> {
    pub lo: T,
    pub hi: T,
}

impl<T> Span<T> {
    pub fn new(lo: T, hi: T) -> Self {
        Self { lo, hi }
    }
}

impl<T: PartialOrd> Span<T> {
    pub fn contains(&self, value: &T) -> bool {
        &self.lo <= value && value <= &self.hi
    }
}

impl<T: fmt::Display> fmt::Display for Span<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.lo, self.hi)
    }
}

/// Test on an integer field.
///
/// Generic over the operand so the resolver can hand out the raw text in
/// the same shape the builder parses it into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberComparison<T = i64> {
    AtMost(T),
    AtLeast(T),
    Equal(T),
    NotEqual(T),
    Inside(Span<T>),
    /// Always matches when the span is inverted.
    Outside(Span<T>),
}

impl<T> NumberComparison<T> {
    /// Convert each operand in order; `f` also receives the operand index.
    pub fn try_map<U, E>(self, mut f: impl FnMut(usize, T) -> Result<U, E>) -> Result<NumberComparison<U>, E> {
        Ok(match self {
            NumberComparison::AtMost(v) => NumberComparison::AtMost(f(0, v)?),
            NumberComparison::AtLeast(v) => NumberComparison::AtLeast(f(0, v)?),
            NumberComparison::Equal(v) => NumberComparison::Equal(f(0, v)?),
            NumberComparison::NotEqual(v) => NumberComparison::NotEqual(f(0, v)?),
            NumberComparison::Inside(span) => NumberComparison::Inside(Span::new(f(0, span.lo)?, f(1, span.hi)?)),
            NumberComparison::Outside(span) => NumberComparison::Outside(Span::new(f(0, span.lo)?, f(1, span.hi)?)),
        })
    }
}

impl<T> NumberComparison<Option<T>> {
    /// `Some` only when every operand is present.
    pub fn transpose(self) -> Option<NumberComparison<T>> {
        self.try_map(|_, v| v.ok_or(())).ok()
    }
}

impl<T: PartialOrd> NumberComparison<T> {
    pub fn matches(&self, value: &T) -> bool {
        match self {
            NumberComparison::AtMost(bound) => value <= bound,
            NumberComparison::AtLeast(bound) => value >= bound,
            NumberComparison::Equal(bound) => value == bound,
            NumberComparison::NotEqual(bound) => value != bound,
            NumberComparison::Inside(span) => span.contains(value),
            NumberComparison::Outside(span) => !span.contains(value),
        }
    }
}

impl<T: fmt::Display> fmt::Display for NumberComparison<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NumberComparison::AtMost(v) => write!(f, "<= {}", v),
            NumberComparison::AtLeast(v) => write!(f, ">= {}", v),
            NumberComparison::Equal(v) => write!(f, "= {}", v),
            NumberComparison::NotEqual(v) => write!(f, "<> {}", v),
            NumberComparison::Inside(span) => write!(f, "inside {}", span),
            NumberComparison::Outside(span) => write!(f, "outside {}", span),
        }
    }
}

/// Calendar-day test on a timestamp field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayComparison<T = NaiveDate> {
    Before(T),
    After(T),
    Inside(Span<T>),
    Outside(Span<T>),
}

impl<T> DayComparison<T> {
    /// Convert each operand in order, stopping at the first failure.
    pub fn try_map<U, E>(self, mut f: impl FnMut(usize, T) -> Result<U, E>) -> Result<DayComparison<U>, E> {
        Ok(match self {
            DayComparison::Before(v) => DayComparison::Before(f(0, v)?),
            DayComparison::After(v) => DayComparison::After(f(0, v)?),
            DayComparison::Inside(span) => DayComparison::Inside(Span::new(f(0, span.lo)?, f(1, span.hi)?)),
            DayComparison::Outside(span) => DayComparison::Outside(Span::new(f(0, span.lo)?, f(1, span.hi)?)),
        })
    }
}

impl<T: PartialOrd> DayComparison<T> {
    pub fn matches(&self, value: &T) -> bool {
        match self {
            DayComparison::Before(bound) => value < bound,
            DayComparison::After(bound) => value > bound,
            DayComparison::Inside(span) => span.contains(value),
            DayComparison::Outside(span) => !span.contains(value),
        }
    }
}

impl<T: fmt::Display> fmt::Display for DayComparison<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DayComparison::Before(v) => write!(f, "before {}", v),
            DayComparison::After(v) => write!(f, "after {}", v),
            DayComparison::Inside(span) => write!(f, "inside {}", span),
            DayComparison::Outside(span) => write!(f, "outside {}", span),
        }
    }
}

/// Condition on a timestamp field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateCondition {
    /// Day-granularity comparison against calendar dates.
    Calendar(DayComparison),
    /// Within (or, when negated, not within) the last `count` units.
    Recent {
        count: i64,
        unit: TimeUnit,
        negated: bool,
    },
}

/// One typed field comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Leaf {
    Text {
        field: TextField,
        rule: TextRule,
        value: String,
    },
    Number {
        field: NumberField,
        comparison: NumberComparison,
    },
    Date {
        field: DateField,
        condition: DateCondition,
    },
}

/// A combinator over child nodes. Never empty once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Branch {
    pub combinator: Combinator,
    pub children: Vec<Node>,
}

/// Expression tree node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Leaf(Leaf),
    Branch(Branch),
}

impl Node {
    /// Number of leaves in the tree.
    pub fn criterion_count(&self) -> usize {
        match self {
            Node::Leaf(_) => 1,
            Node::Branch(branch) => branch.children.iter().map(Node::criterion_count).sum(),
        }
    }
}

impl fmt::Display for Leaf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Leaf::Text { field, rule, value } => {
                let (op, negated) = rule.op();
                write!(f, "{} {} {:?}", field.as_str(), op.describe(negated), value)
            }
            Leaf::Number { field, comparison } => write!(f, "{} {}", field.as_str(), comparison),
            Leaf::Date { field, condition } => match condition {
                DateCondition::Calendar(comparison) => {
                    write!(f, "{} {}", field.as_str(), comparison)
                }
                DateCondition::Recent {
                    count,
                    unit,
                    negated,
                } => {
                    let within = if *negated { "not within" } else { "within" };
                    write!(f, "{} {} last {} {}", field.as_str(), within, count, unit)
                }
            },
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Leaf(leaf) => write!(f, "{}", leaf),
            Node::Branch(branch) => {
                let joiner = if branch.combinator.is_disjunction() {
                    " or "
                } else {
                    " and "
                };
                if branch.combinator.is_negated() {
                    f.write_str("not ")?;
                }
                f.write_str("(")?;
                for (i, child) in branch.children.iter().enumerate() {
                    if i > 0 {
                        f.write_str(joiner)?;
                    }
                    write!(f, "{}", child)?;
                }
                f.write_str(")")
            }
        }
    }
}
