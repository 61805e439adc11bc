//! Call descriptors.
//!
//! A [`RemoteCall`] is everything needed to describe one invocation in a
//! single serializable package: the target relay, the method (by compact
//! id or by full signature), the argument values, and the admission
//! ticket. Descriptors are immutable once constructed and safe to hand
//! across threads or nodes.

use serde::{Deserialize, Serialize};

use crate::{MethodId, MethodSig, RelayName, Ticket, Value};

/// How a call names its method: compact ordinal (the normal wire form) or
/// full signature (self-describing, usable before the peer's table is
/// known to match).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MethodAddr {
    Id(MethodId),
    Sig(MethodSig),
}

impl From<MethodId> for MethodAddr {
    fn from(id: MethodId) -> Self {
        MethodAddr::Id(id)
    }
}

impl From<MethodSig> for MethodAddr {
    fn from(sig: MethodSig) -> Self {
        MethodAddr::Sig(sig)
    }
}

/// Immutable record of one invocation request.
///
/// Constructed by `Relay::prepare`, which validates the method and arity
/// and embeds a freshly issued ticket, or deserialized from the wire with
/// the issuer's ticket already embedded. Consumed by `Relay::invoke`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteCall {
    relay: RelayName,
    method: MethodAddr,
    args: Vec<Value>,
    ticket: Ticket,
}

impl RemoteCall {
    /// Assemble a descriptor from already-validated parts.
    ///
    /// Callers normally go through `Relay::prepare` instead, which checks
    /// method resolution and arity against the relay's table before any
    /// ticket is issued.
    pub fn new(
        relay: RelayName,
        method: impl Into<MethodAddr>,
        args: Vec<Value>,
        ticket: Ticket,
    ) -> Self {
        RemoteCall {
            relay,
            method: method.into(),
            args,
            ticket,
        }
    }

    pub fn relay(&self) -> &RelayName {
        &self.relay
    }

    pub fn method(&self) -> &MethodAddr {
        &self.method
    }

    pub fn args(&self) -> &[Value] {
        &self.args
    }

    pub fn ticket(&self) -> Ticket {
        self.ticket
    }
}

impl std::fmt::Display for RemoteCall {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.method {
            MethodAddr::Id(id) => write!(
                f,
                "call #{} on {} (ticket {})",
                id.get(),
                self.relay,
                self.ticket.get()
            ),
            MethodAddr::Sig(sig) => {
                write!(f, "call {sig} on {} (ticket {})", self.relay, self.ticket.get())
            }
        }
    }
}
