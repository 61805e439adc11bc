//! Relay-layer errors.

use muster_core::{CallError, RelayName, TableError};

/// Errors binding a handler to a relay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindError {
    /// A handler with this label is already bound; outcomes must stay
    /// attributable to exactly one handler.
    DuplicateLabel(String),
}

impl std::fmt::Display for BindError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BindError::DuplicateLabel(label) => {
                write!(f, "handler label {label:?} is already bound")
            }
        }
    }
}

impl std::error::Error for BindError {}

/// Errors surfaced by `Relay::invoke`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvokeError {
    /// The descriptor names a different relay.
    WrongRelay { expected: RelayName, got: RelayName },
    /// The descriptor failed validation; its ticket (if any) was skipped.
    Call(CallError),
    /// The call's ticket was forcibly skipped while the caller waited.
    Skipped,
    /// The relay shut down while the caller waited.
    Closed,
    /// The caller's wait was cancelled; the ticket has been abandoned.
    TimedOut,
}

impl std::fmt::Display for InvokeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InvokeError::WrongRelay { expected, got } => {
                write!(f, "call for relay {got} submitted to relay {expected}")
            }
            InvokeError::Call(e) => write!(f, "{e}"),
            InvokeError::Skipped => write!(f, "ticket was skipped"),
            InvokeError::Closed => write!(f, "relay is closed"),
            InvokeError::TimedOut => write!(f, "timed out waiting for turn"),
        }
    }
}

impl std::error::Error for InvokeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            InvokeError::Call(e) => Some(e),
            _ => None,
        }
    }
}

impl From<CallError> for InvokeError {
    fn from(e: CallError) -> Self {
        InvokeError::Call(e)
    }
}

/// Errors from the per-node relay hub.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HubError {
    /// A capability spec declared an empty name.
    EmptyName,
    /// A relay with this name is already registered.
    DuplicateRelay(String),
    /// No relay with this name on this node.
    UnknownRelay(String),
    /// The capability spec did not produce a valid method table.
    Table(TableError),
    /// Routing succeeded but the relay rejected the call.
    Invoke(InvokeError),
}

impl std::fmt::Display for HubError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HubError::EmptyName => write!(f, "capability name is empty"),
            HubError::DuplicateRelay(name) => write!(f, "relay {name:?} is already registered"),
            HubError::UnknownRelay(name) => write!(f, "no relay named {name:?}"),
            HubError::Table(e) => write!(f, "{e}"),
            HubError::Invoke(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for HubError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            HubError::Table(e) => Some(e),
            HubError::Invoke(e) => Some(e),
            _ => None,
        }
    }
}

impl From<TableError> for HubError {
    fn from(e: TableError) -> Self {
        HubError::Table(e)
    }
}

impl From<InvokeError> for HubError {
    fn from(e: InvokeError) -> Self {
        HubError::Invoke(e)
    }
}
