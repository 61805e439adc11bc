//! Core error taxonomy.
//!
//! Table lookups and admission-time validation fail fast, before any
//! ticket is consumed; everything that happens after admission is captured
//! as data in the outcomes instead of being thrown across the relay
//! boundary.

use crate::MethodId;

/// Errors building or querying a method table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableError {
    /// Two declared signatures are identical.
    DuplicateMethod(String),
    /// The signature is not part of this capability.
    UnknownMethod(String),
    /// The ordinal is out of range for this table build.
    InvalidOrdinal(MethodId),
}

impl std::fmt::Display for TableError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TableError::DuplicateMethod(sig) => write!(f, "duplicate method signature {sig}"),
            TableError::UnknownMethod(sig) => write!(f, "unknown method {sig}"),
            TableError::InvalidOrdinal(id) => write!(f, "invalid method ordinal {}", id.get()),
        }
    }
}

impl std::error::Error for TableError {}

/// Admission-time validation errors for a call descriptor.
///
/// These are raised before a ticket is issued (or, for calls that arrived
/// off the wire with a ticket, before their slot blocks the cursor), so a
/// malformed call never stalls subsequent callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallError {
    /// Argument count does not match the resolved signature.
    ArityMismatch { expected: usize, got: usize },
    /// The method could not be resolved against the relay's table.
    Table(TableError),
    /// The relay is shut down and admits no new calls.
    Closed,
}

impl std::fmt::Display for CallError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CallError::ArityMismatch { expected, got } => {
                write!(f, "arity mismatch: method takes {expected} args, call has {got}")
            }
            CallError::Table(e) => write!(f, "{e}"),
            CallError::Closed => write!(f, "relay is closed"),
        }
    }
}

impl std::error::Error for CallError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CallError::Table(e) => Some(e),
            _ => None,
        }
    }
}

impl From<TableError> for CallError {
    fn from(e: TableError) -> Self {
        CallError::Table(e)
    }
}

/// Errors reading an outcome set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeError {
    /// Every handler failed, or none were bound.
    NoSuccessfulOutcome,
}

impl std::fmt::Display for OutcomeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutcomeError::NoSuccessfulOutcome => write!(f, "no successful outcome"),
        }
    }
}

impl std::error::Error for OutcomeError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_descriptive() {
        let e = CallError::ArityMismatch {
            expected: 1,
            got: 2,
        };
        let text = e.to_string();
        assert!(text.contains("takes 1"));
        assert!(text.contains("has 2"));

        let e = TableError::InvalidOrdinal(MethodId::new(9));
        assert!(e.to_string().contains('9'));
    }

    #[test]
    fn table_error_converts_into_call_error() {
        let e: CallError = TableError::UnknownMethod("ban(str)".into()).into();
        assert!(matches!(e, CallError::Table(TableError::UnknownMethod(_))));
    }
}
