//! muster-post: server-pushed message plumbing.
//!
//! Heterogeneous pushed messages (chat lines, presence changes,
//! moderation events) ride in type-tagged [`Envelope`]s. A receiving node
//! routes each envelope through its [`DispatchTable`] — built once at
//! startup, one binding per payload type — to the listener method that
//! consumes it, with no type inspection at the call sites. Presence
//! payloads typically land in the node's [`Roster`].
//!
//! Envelopes and remote calls share one wire frame shape ([`WireMessage`])
//! with postcard bodies and COBS framing; byte transport itself stays an
//! external collaborator.

mod envelope;
mod frame;
mod roster;
mod table;

pub use envelope::*;
pub use frame::*;
pub use roster::*;
pub use table::*;
