use thiserror::Error;

/// Errors raised while compiling, binding or evaluating a [`crate::Formula`].
///
/// Math-domain situations (log of a non-positive number, division by zero)
/// are deliberately absent: evaluation follows IEEE-754 and lets `NaN` and
/// `inf` flow through as ordinary values.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FormulaError {
    /// The formula text is not syntactically valid.
    #[error("parse error at position {position}: {message}")]
    Parse { position: usize, message: String },

    /// The text references identifiers that were not declared as variables.
    #[error("formula '{formula}' references undeclared identifiers: {}", .names.join(", "))]
    UnboundIdentifier { formula: String, names: Vec<String> },

    /// A binding was attempted for a name the formula never declared.
    #[error("'{0}' is not a declared variable")]
    UnknownVariable(String),

    /// A referenced variable had no binding at evaluation time.
    #[error("variable '{0}' has no bound value")]
    UnboundVariable(String),
}

impl FormulaError {
    pub(crate) fn parse(position: usize, message: impl Into<String>) -> Self {
        FormulaError::Parse {
            position,
            message: message.into(),
        }
    }
}
