//! Structured filter expression engine.
//!
//! # Pipeline
//!
//! 1. [`Namespace`]: flat `address -> text` map from the filter form.
//! 2. [`build`]: resolve addresses into a validated [`Node`] tree, counting
//!    criteria and collecting operand errors.
//! 3. [`compile`]: lower the tree into a [`Predicate`] over songs.
//! 4. [`run_filter`]: apply it to a [`Catalog`]'s visible songs.
//!
//! # Address grammar
//!
//! ```text
//! k=and  k_0=title  k_0_r=in   k_0_f0=love
//!        k_1=track  k_1_r=gte  k_1_f0=3
//! ```

mod address;
mod ast;
mod builder;
mod compiler;
mod error;
mod executor;
mod value;

pub use address::{
    child_address, children, operand_address, resolve, rule_address, DateOperands, LeafFields, Namespace, Resolved,
};
pub use ast::{
    Branch, Combinator, DateCondition, DateField, DateRule, DayComparison, FieldKind, Leaf, Node, NumberComparison,
    NumberField, NumberRule, Span, TextField, TextOp, TextRule,
};
pub use builder::{build, Built, MAX_DEPTH};
pub use compiler::{compile, Predicate};
pub use error::{ParseFailure, SchemaFault, ValidationError, ValueError};
pub use executor::{apply, run_filter, Catalog, FilterOutcome};
pub use value::{parse_date, parse_duration, parse_integer, TimeUnit};
