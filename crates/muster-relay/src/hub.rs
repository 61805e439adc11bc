//! The per-node relay registry.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use muster_core::{CallOutcomes, CapabilitySpec, RemoteCall};

use crate::error::HubError;
use crate::relay::Relay;

/// Maps capability names to their relays on one node.
///
/// Different relays are fully independent: there is no cross-relay
/// ordering, and calls for different capability names execute
/// concurrently.
#[derive(Default)]
pub struct RelayHub {
    relays: Mutex<HashMap<String, Arc<Relay>>>,
}

impl RelayHub {
    pub fn new() -> Self {
        RelayHub::default()
    }

    /// Create and register the relay for a capability.
    ///
    /// Fails with [`HubError::DuplicateRelay`] if the name is taken.
    pub fn register(&self, spec: &CapabilitySpec) -> Result<Arc<Relay>, HubError> {
        let relay = Arc::new(Relay::new(spec)?);
        let mut relays = self.relays.lock();
        if relays.contains_key(spec.name()) {
            return Err(HubError::DuplicateRelay(spec.name().to_string()));
        }
        tracing::debug!(relay = spec.name(), "registered relay");
        relays.insert(spec.name().to_string(), relay.clone());
        Ok(relay)
    }

    pub fn get(&self, name: &str) -> Option<Arc<Relay>> {
        self.relays.lock().get(name).cloned()
    }

    /// Unregister and close a relay. Returns it if it existed.
    pub fn remove(&self, name: &str) -> Option<Arc<Relay>> {
        let relay = self.relays.lock().remove(name);
        if let Some(relay) = &relay {
            relay.close();
        }
        relay
    }

    /// Registered relay names, sorted for stable diagnostics.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.relays.lock().keys().cloned().collect();
        names.sort();
        names
    }

    /// Route a call to the relay it names and invoke it.
    ///
    /// This is the inbound entry point for calls arriving off the wire.
    pub async fn route(&self, call: &RemoteCall) -> Result<CallOutcomes, HubError> {
        let relay = self
            .get(call.relay().as_str())
            .ok_or_else(|| HubError::UnknownRelay(call.relay().as_str().to_string()))?;
        Ok(relay.invoke(call).await?)
    }

    /// Close every relay. New calls are rejected, parked waiters wake.
    pub fn close_all(&self) {
        for relay in self.relays.lock().values() {
            relay.close();
        }
    }
}
