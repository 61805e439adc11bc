//! muster-relay: ticket-ordered fan-out of remote calls.
//!
//! A [`Relay`] binds one capability name to its local handlers and
//! guarantees that every handler observes calls in one total order, no
//! matter how many tasks race to submit them:
//!
//! ```text
//!   caller A ──prepare──► ticket 0 ─┐
//!   caller B ──prepare──► ticket 1 ─┤   turnstile cursor
//!                                   ├──► 0, 1, 2, ...   (one at a time)
//!   wire     ──────────► ticket 2 ─┘         │
//!                                            ▼
//!                              handlers, in registration order
//!                                            │
//!                                            ▼
//!                              CallOutcomes (one entry per handler)
//! ```
//!
//! The ticket establishes total order of *admission*; the cursor wait
//! establishes total order of *execution*. A [`RelayHub`] keeps the
//! per-node map from capability name to relay; different relays are fully
//! independent.

mod error;
mod hub;
mod relay;
mod turnstile;

pub use error::*;
pub use hub::*;
pub use relay::*;
pub use turnstile::Turnstile;
