//! The relay: one capability name, its bound handlers, and the total
//! execution order every handler observes.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use muster_core::{
    CallError, CallOutcomes, CapabilitySpec, Fault, MethodAddr, MethodSig, MethodTable, Outcome,
    RelayName, RemoteCall, Ticket, Value,
};

use crate::error::{BindError, InvokeError};
use crate::turnstile::{Turn, TurnError, Turnstile};

/// A local implementor of one capability.
///
/// `call` receives the resolved signature and the argument values; a
/// returned [`Fault`] is recorded in the outcomes and never aborts the
/// sibling handlers.
pub trait Handler: Send + Sync {
    fn call(&self, method: &MethodSig, args: &[Value]) -> Result<Value, Fault>;
}

#[derive(Clone)]
struct Bound {
    label: String,
    handler: Arc<dyn Handler>,
}

/// The ordering and fan-out unit for one capability name.
///
/// Multiple tasks may race to submit calls; the turnstile serializes them
/// so every bound handler sees calls in exactly ticket order — the
/// invariant that keeps replicated game state identical on every node
/// that executes the same call sequence.
pub struct Relay {
    name: RelayName,
    table: MethodTable,
    /// Insertion order is the fan-out order.
    handlers: Mutex<Vec<Bound>>,
    turnstile: Turnstile,
}

impl Relay {
    /// Build a relay for a capability.
    ///
    /// Fails if the spec's name is empty or its method table does not
    /// build (duplicate signatures).
    pub fn new(spec: &CapabilitySpec) -> Result<Self, crate::HubError> {
        let name = RelayName::new(spec.name()).ok_or(crate::HubError::EmptyName)?;
        let table = MethodTable::build(spec)?;
        Ok(Relay {
            name,
            table,
            handlers: Mutex::new(Vec::new()),
            turnstile: Turnstile::new(),
        })
    }

    pub fn name(&self) -> &RelayName {
        &self.name
    }

    pub fn table(&self) -> &MethodTable {
        &self.table
    }

    pub fn turnstile(&self) -> &Turnstile {
        &self.turnstile
    }

    /// Bind a handler. Effective for every call admitted after the bind.
    pub fn bind(&self, label: impl Into<String>, handler: Arc<dyn Handler>) -> Result<(), BindError> {
        let label = label.into();
        let mut handlers = self.handlers.lock();
        if handlers.iter().any(|b| b.label == label) {
            return Err(BindError::DuplicateLabel(label));
        }
        tracing::debug!(relay = %self.name, handler = %label, "bound handler");
        handlers.push(Bound { label, handler });
        Ok(())
    }

    /// Unbind a handler. Returns whether it was bound.
    ///
    /// A call whose turn arrives after the unbind omits the handler from
    /// its outcomes, even if the call was admitted earlier — the handler
    /// list is snapshotted when the turn starts, not at submission.
    pub fn unbind(&self, label: &str) -> bool {
        let mut handlers = self.handlers.lock();
        let before = handlers.len();
        handlers.retain(|b| b.label != label);
        let removed = handlers.len() != before;
        if removed {
            tracing::debug!(relay = %self.name, handler = %label, "unbound handler");
        }
        removed
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.lock().len()
    }

    /// Validate a method reference and argument list against the table.
    fn resolve(
        &self,
        method: &MethodAddr,
        arg_count: usize,
    ) -> Result<(muster_core::MethodId, &MethodSig), CallError> {
        let id = match method {
            MethodAddr::Id(id) => *id,
            MethodAddr::Sig(sig) => self.table.id_of(sig)?,
        };
        let sig = self.table.sig_of(id)?;
        if sig.arity() != arg_count {
            return Err(CallError::ArityMismatch {
                expected: sig.arity(),
                got: arg_count,
            });
        }
        Ok((id, sig))
    }

    /// Validate and ticket a local call.
    ///
    /// Validation happens first: a malformed call fails here and never
    /// takes a ticket, so it cannot occupy a slot in the execution order.
    /// The returned descriptor carries the issued ticket and is ready for
    /// [`Relay::invoke`] or the wire.
    pub fn prepare(
        &self,
        method: impl Into<MethodAddr>,
        args: Vec<Value>,
    ) -> Result<RemoteCall, CallError> {
        let method = method.into();
        let (id, sig) = self.resolve(&method, args.len())?;
        let ticket = self.turnstile.issue().map_err(|_| CallError::Closed)?;
        tracing::trace!(relay = %self.name, ticket = ticket.get(), method = %sig, "issued ticket");
        Ok(RemoteCall::new(self.name.clone(), id, args, ticket))
    }

    /// Execute a call against every bound handler, in ticket order.
    ///
    /// Blocks (asynchronously) until all lower tickets have completed,
    /// then runs each handler sequentially in registration order,
    /// capturing one [`Outcome`] per handler. Zero bound handlers yields
    /// an empty outcome set, not an error.
    ///
    /// A wire-received call that fails validation abandons its embedded
    /// ticket so the cursor can pass it, then reports the error.
    pub async fn invoke(&self, call: &RemoteCall) -> Result<CallOutcomes, InvokeError> {
        if call.relay() != &self.name {
            return Err(InvokeError::WrongRelay {
                expected: self.name.clone(),
                got: call.relay().clone(),
            });
        }

        let sig = match self.resolve(call.method(), call.args().len()) {
            Ok((_, sig)) => sig,
            Err(e) => {
                tracing::warn!(relay = %self.name, ticket = call.ticket().get(), error = %e,
                    "rejecting malformed call, skipping its ticket");
                self.turnstile.abandon(call.ticket());
                return Err(e.into());
            }
        };

        let turn = Turn::new(&self.turnstile, call.ticket());
        turn.wait().await.map_err(|e| match e {
            TurnError::Skipped => InvokeError::Skipped,
            TurnError::Closed => InvokeError::Closed,
        })?;

        // Our turn: no lock is needed during execution, the turnstile
        // guarantees exclusivity. Snapshot the handler list so a
        // concurrent unbind simply omits the handler.
        let bound: Vec<Bound> = self.handlers.lock().clone();

        let mut outcomes = Vec::with_capacity(bound.len());
        for b in &bound {
            let outcome = match b.handler.call(sig, call.args()) {
                Ok(value) => Outcome::success(b.label.as_str(), value),
                Err(fault) => {
                    tracing::debug!(relay = %self.name, handler = %b.label, fault = %fault,
                        "handler faulted");
                    Outcome::failure(b.label.as_str(), fault)
                }
            };
            outcomes.push(outcome);
        }

        turn.finish();
        tracing::trace!(relay = %self.name, ticket = call.ticket().get(), "call executed");
        Ok(CallOutcomes::new(outcomes))
    }

    /// [`Relay::invoke`] with a bound on the turn wait.
    ///
    /// On timeout the call's ticket is abandoned (the turn's drop guard
    /// skips it), so later tickets are not stalled by this caller.
    pub async fn invoke_timeout(
        &self,
        call: &RemoteCall,
        wait: Duration,
    ) -> Result<CallOutcomes, InvokeError> {
        match tokio::time::timeout(wait, self.invoke(call)).await {
            Ok(result) => result,
            Err(_) => {
                tracing::debug!(relay = %self.name, ticket = call.ticket().get(),
                    "invoke timed out, ticket abandoned");
                Err(InvokeError::TimedOut)
            }
        }
    }

    /// Forcibly skip a ticket that was issued but never invoked.
    ///
    /// Recovery hook for callers that died between `prepare` and
    /// `invoke`; without it one lost ticket would stall the relay
    /// forever.
    pub fn skip(&self, ticket: Ticket) {
        tracing::warn!(relay = %self.name, ticket = ticket.get(), "forcibly skipping ticket");
        self.turnstile.abandon(ticket);
    }

    /// Shut down: reject new `prepare` calls and wake every parked waiter
    /// with [`InvokeError::Closed`]. Pending tickets are discarded.
    pub fn close(&self) {
        tracing::debug!(relay = %self.name, "closing relay");
        self.turnstile.close();
    }

    pub fn is_closed(&self) -> bool {
        self.turnstile.is_closed()
    }
}
