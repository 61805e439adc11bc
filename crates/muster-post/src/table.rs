//! The per-listener dispatch table.
//!
//! One binding per payload type, registered at startup. Dispatch is a
//! tag lookup plus the envelope's single type check — no per-site type
//! inspection, no mutable bookkeeping, so re-dispatching an envelope is
//! indistinguishable from dispatching it the first time.

use std::collections::HashMap;

use crate::envelope::{Envelope, EnvelopeError, Payload};

/// Errors routing an envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// No binding is registered for the envelope's tag.
    UnboundTag(String),
    /// The binding matched but the payload failed to decode.
    Envelope(EnvelopeError),
}

impl std::fmt::Display for DispatchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DispatchError::UnboundTag(tag) => write!(f, "no binding for message tag {tag:?}"),
            DispatchError::Envelope(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for DispatchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DispatchError::Envelope(e) => Some(e),
            _ => None,
        }
    }
}

impl From<EnvelopeError> for DispatchError {
    fn from(e: EnvelopeError) -> Self {
        DispatchError::Envelope(e)
    }
}

type Binding<L> = Box<dyn Fn(&L, &Envelope) -> Result<(), DispatchError> + Send + Sync>;

/// Routes envelopes to the listener method that consumes their payload
/// type.
///
/// `L` is the listener: the object whose methods the bindings call into.
/// Bindings are registered once at startup and are stateless thereafter.
pub struct DispatchTable<L> {
    bindings: HashMap<&'static str, Binding<L>>,
}

impl<L> DispatchTable<L> {
    pub fn new() -> Self {
        DispatchTable {
            bindings: HashMap::new(),
        }
    }

    /// Register the binding for payload type `P`.
    ///
    /// # Panics
    ///
    /// Panics if a binding for `P::TAG` is already registered — bindings
    /// are startup wiring, and a duplicate is a programmer error.
    pub fn bind<P>(&mut self, handler: impl Fn(&L, P) + Send + Sync + 'static) -> &mut Self
    where
        P: Payload + 'static,
    {
        let binding: Binding<L> = Box::new(move |listener, envelope| {
            let payload = envelope.unwrap::<P>()?;
            handler(listener, payload);
            Ok(())
        });
        let prev = self.bindings.insert(P::TAG, binding);
        assert!(
            prev.is_none(),
            "binding already registered for tag {:?}",
            P::TAG
        );
        self
    }

    pub fn is_bound(&self, tag: &str) -> bool {
        self.bindings.contains_key(tag)
    }

    /// Route one envelope to its binding.
    pub fn dispatch(&self, envelope: &Envelope, listener: &L) -> Result<(), DispatchError> {
        match self.bindings.get(envelope.tag()) {
            Some(binding) => binding(listener, envelope),
            None => Err(DispatchError::UnboundTag(envelope.tag().to_string())),
        }
    }

    /// Boundary policy for inbound loops: a failed dispatch is logged and
    /// the single envelope dropped; the loop and the connection carry on.
    pub fn dispatch_or_drop(&self, envelope: &Envelope, listener: &L) {
        if let Err(e) = self.dispatch(envelope, listener) {
            tracing::warn!(tag = envelope.tag(), error = %e, "dropping envelope");
        }
    }
}

impl<L> Default for DispatchTable<L> {
    fn default() -> Self {
        DispatchTable::new()
    }
}
