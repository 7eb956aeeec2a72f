//! Error channels for the filter engine.
//!
//! Two channels are kept apart: [`SchemaFault`] means the namespace does not
//! follow the address grammar (a defect in whatever generated it) and aborts
//! the whole build, while [`ValidationError`] records a user-typed operand
//! that failed to parse and is collected as data.

/// The namespace violates the address grammar.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaFault {
    #[error("unknown field kind {token:?} at '{address}'")]
    UnknownKind { address: String, token: String },

    #[error("missing rule for '{address}'")]
    MissingRule { address: String },

    #[error("rule {rule:?} is not valid for {kind} at '{address}'")]
    UnknownRule {
        address: String,
        kind: &'static str,
        rule: String,
    },

    #[error("missing operand '{key}'")]
    MissingOperand { key: String },

    #[error("unknown time unit {unit:?} at '{address}'")]
    UnknownUnit { address: String, unit: String },

    #[error("duration {text:?} has more than three components")]
    DurationComponents { text: String },

    #[error("filter nested too deeply at '{address}'")]
    TooDeep { address: String },
}

/// A user-supplied operand could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValueError {
    #[error("invalid integer: '{text}'")]
    Integer { text: String },

    #[error("invalid duration: '{text}'")]
    Duration { text: String },

    #[error("invalid date: '{text}'")]
    Date { text: String },
}

/// Failure of a parser that can hit either channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseFailure {
    Value(ValueError),
    Schema(SchemaFault),
}

impl From<ValueError> for ParseFailure {
    fn from(err: ValueError) -> Self {
        ParseFailure::Value(err)
    }
}

impl From<SchemaFault> for ParseFailure {
    fn from(err: SchemaFault) -> Self {
        ParseFailure::Schema(err)
    }
}

/// One rejected operand, tagged with the address it was read from.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{address}: {error}")]
pub struct ValidationError {
    /// Namespace key of the offending operand (e.g. `k_1_f0`).
    pub address: String,
    #[source]
    pub error: ValueError,
}

impl ValidationError {
    pub fn new(address: impl Into<String>, error: ValueError) -> Self {
        Self {
            address: address.into(),
            error,
        }
    }
}
