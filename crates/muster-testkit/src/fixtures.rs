//! Game-room fixtures used across the workspace tests.

use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use muster_core::{CapabilitySpec, Fault, MethodSig, TypeDesc, Value};
use muster_post::{DispatchTable, Payload, Roster};
use muster_relay::Handler;

/// The replicated score-keeping capability.
pub fn score_spec() -> CapabilitySpec {
    CapabilitySpec::new(
        "game-state",
        vec![
            MethodSig::new("set_score", [TypeDesc::I64]),
            MethodSig::new("add", [TypeDesc::I64]),
            MethodSig::new("add", [TypeDesc::I64, TypeDesc::I64]),
        ],
    )
}

/// Shorthand for the `set_score(i64)` signature.
pub fn set_score_sig() -> MethodSig {
    MethodSig::new("set_score", [TypeDesc::I64])
}

/// A handler that applies score updates and remembers every one, in
/// order. The observable order is what the replication tests assert on.
pub struct ScoreBoard {
    applied: Mutex<Vec<i64>>,
}

impl ScoreBoard {
    #[allow(clippy::new_ret_no_self)]
    pub fn new() -> Arc<ScoreBoard> {
        Arc::new(ScoreBoard {
            applied: Mutex::new(Vec::new()),
        })
    }

    /// Every score applied, in application order.
    pub fn applied(&self) -> Vec<i64> {
        self.applied.lock().clone()
    }

    /// The current score: the last applied value.
    pub fn score(&self) -> Option<i64> {
        self.applied.lock().last().copied()
    }
}

impl Handler for ScoreBoard {
    fn call(&self, method: &MethodSig, args: &[Value]) -> Result<Value, Fault> {
        match method.name() {
            "set_score" => {
                let v = args[0]
                    .as_i64()
                    .ok_or_else(|| Fault::new("set_score takes an i64"))?;
                self.applied.lock().push(v);
                Ok(Value::Unit)
            }
            "add" => Ok(Value::I64(args.iter().filter_map(|a| a.as_i64()).sum())),
            other => Err(Fault::new(format!("unhandled method {other}"))),
        }
    }
}

/// A handler that fails every call; for outcome-aggregation tests.
pub struct FlakyHandler;

impl Handler for FlakyHandler {
    fn call(&self, _method: &MethodSig, _args: &[Value]) -> Result<Value, Fault> {
        Err(Fault::new("flaky handler refused the call"))
    }
}

// ---------------------------------------------------------------------------
// Pushed-message fixtures
// ---------------------------------------------------------------------------

/// A participant's status changed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresenceUpdate {
    pub who: String,
    pub status: String,
    pub seq: u64,
}

impl Payload for PresenceUpdate {
    const TAG: &'static str = "presence-update";
}

/// A participant left.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Farewell {
    pub who: String,
}

impl Payload for Farewell {
    const TAG: &'static str = "farewell";
}

/// A chat line for the room panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatLine {
    pub from: String,
    pub text: String,
}

impl Payload for ChatLine {
    const TAG: &'static str = "chat-line";
}

/// The room-side listener: presence lands in the roster, chat in the
/// transcript.
#[derive(Clone, Default)]
pub struct RoomListener {
    pub roster: Arc<Roster>,
    pub transcript: Arc<Mutex<Vec<String>>>,
}

/// Bindings for everything a room listener consumes. Built once at
/// startup, stateless afterwards.
pub fn room_table() -> DispatchTable<RoomListener> {
    let mut table = DispatchTable::new();
    table
        .bind(|room: &RoomListener, update: PresenceUpdate| {
            room.roster.upsert(&update.who, update.status, update.seq);
        })
        .bind(|room: &RoomListener, farewell: Farewell| {
            room.roster.remove(&farewell.who);
        })
        .bind(|room: &RoomListener, line: ChatLine| {
            room.transcript.lock().push(format!("{}: {}", line.from, line.text));
        });
    table
}
