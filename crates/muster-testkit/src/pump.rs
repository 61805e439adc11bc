//! The inbound pump: one node's demux loop.
//!
//! Only the pump consumes the inbound queue — all routing happens here,
//! so no other code races for incoming messages. Calls go to the relay
//! hub (and execute in ticket order), events go through the dispatch
//! table; a message that cannot be handled is logged and dropped, and
//! the loop carries on.

use std::sync::Arc;

use tokio::sync::mpsc;

use muster_post::{DispatchTable, WireMessage};
use muster_relay::RelayHub;

/// Demultiplexes one node's inbound messages.
pub struct NodePump<L> {
    hub: Arc<RelayHub>,
    table: DispatchTable<L>,
    listener: L,
}

impl<L> NodePump<L> {
    pub fn new(hub: Arc<RelayHub>, table: DispatchTable<L>, listener: L) -> Self {
        NodePump {
            hub,
            table,
            listener,
        }
    }

    /// Drain the inbound queue until the sender side closes.
    ///
    /// The queue is FIFO per connection; the relay turnstile turns that
    /// into the total execution order every handler observes.
    pub async fn run(self, mut rx: mpsc::Receiver<WireMessage>) {
        while let Some(msg) = rx.recv().await {
            match msg {
                WireMessage::Call(call) => match self.hub.route(&call).await {
                    Ok(outcomes) => {
                        tracing::trace!(
                            relay = %call.relay(),
                            ticket = call.ticket().get(),
                            handlers = outcomes.len(),
                            "applied inbound call"
                        );
                    }
                    Err(e) => {
                        tracing::warn!(relay = %call.relay(), error = %e, "dropping inbound call");
                    }
                },
                WireMessage::Event(envelope) => {
                    self.table.dispatch_or_drop(&envelope, &self.listener);
                }
            }
        }
        tracing::debug!("inbound queue closed, pump stopping");
    }
}
