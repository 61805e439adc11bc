//! muster-testkit: shared fixtures and the inbound pump.
//!
//! Cross-crate tests live here rather than in the leaf crates, so the
//! leaves stay free of circular dev-dependencies. The fixtures model a
//! small game room: a score-keeping capability replicated through a
//! relay, and presence/chat messages routed through a dispatch table
//! into a roster.

mod fixtures;
mod pump;

pub use fixtures::*;
pub use pump::*;
