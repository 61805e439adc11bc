//! End-to-end replication: a leader applies ticketed calls locally,
//! ships them (plus pushed events) over a framed byte stream, and a
//! follower node replays everything through its pump.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use muster_core::{MethodId, RelayName, RemoteCall, Ticket, Value};
use muster_post::{Envelope, FrameCursor, Payload, WireMessage, encode_frame};
use muster_relay::{Relay, RelayHub};
use muster_testkit::{
    ChatLine, Farewell, NodePump, PresenceUpdate, RoomListener, ScoreBoard, room_table, score_spec,
    set_score_sig,
};

/// A message type the follower has no binding for.
#[derive(Debug, Serialize, Deserialize)]
struct VoicePing {
    who: String,
}

impl Payload for VoicePing {
    const TAG: &'static str = "voice-ping";
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

/// Build a follower node: relay hub with two score boards, room listener,
/// and a running pump fed by the returned sender.
struct Follower {
    p1: Arc<ScoreBoard>,
    p2: Arc<ScoreBoard>,
    listener: RoomListener,
    tx: mpsc::Sender<WireMessage>,
    pump: tokio::task::JoinHandle<()>,
}

fn follower_node() -> Follower {
    let hub = Arc::new(RelayHub::new());
    let relay = hub.register(&score_spec()).unwrap();
    let p1 = ScoreBoard::new();
    let p2 = ScoreBoard::new();
    relay.bind("p1", p1.clone()).unwrap();
    relay.bind("p2", p2.clone()).unwrap();

    let listener = RoomListener::default();
    let pump = NodePump::new(hub, room_table(), listener.clone());
    let (tx, rx) = mpsc::channel(16);
    let pump = tokio::spawn(pump.run(rx));

    Follower {
        p1,
        p2,
        listener,
        tx,
        pump,
    }
}

#[tokio::test]
async fn replicated_state_converges() {
    init_tracing();

    // Leader side: apply locally, collect the byte stream to ship.
    let leader_relay = Relay::new(&score_spec()).unwrap();
    let leader_board = ScoreBoard::new();
    leader_relay.bind("leader", leader_board.clone()).unwrap();

    let mut stream = Vec::new();
    for score in [5, 7] {
        let call = leader_relay
            .prepare(set_score_sig(), vec![Value::I64(score)])
            .unwrap();
        leader_relay.invoke(&call).await.unwrap();
        stream.extend(encode_frame(&WireMessage::Call(call)).unwrap());
    }

    // Pushed events ride the same stream: presence (including one stale
    // update and one unknown tag), chat, and a departure.
    let events = [
        Envelope::wrap(&PresenceUpdate {
            who: "elinor".into(),
            status: "online".into(),
            seq: 2,
        })
        .unwrap(),
        Envelope::wrap(&VoicePing {
            who: "elinor".into(),
        })
        .unwrap(),
        Envelope::wrap(&PresenceUpdate {
            who: "elinor".into(),
            status: "away".into(),
            seq: 1,
        })
        .unwrap(),
        Envelope::wrap(&PresenceUpdate {
            who: "marlow".into(),
            status: "online".into(),
            seq: 1,
        })
        .unwrap(),
        Envelope::wrap(&ChatLine {
            from: "marlow".into(),
            text: "good luck".into(),
        })
        .unwrap(),
        Envelope::wrap(&Farewell {
            who: "marlow".into(),
        })
        .unwrap(),
    ];
    for event in events {
        stream.extend(encode_frame(&WireMessage::Event(event)).unwrap());
    }

    // Follower side: reassemble frames from dribbled chunks and pump them.
    let follower = follower_node();
    let mut cursor = FrameCursor::new();
    for chunk in stream.chunks(5) {
        cursor.extend(chunk);
        while let Some(msg) = cursor.next_message() {
            follower.tx.send(msg.unwrap()).await.unwrap();
        }
    }
    drop(follower.tx);
    follower.pump.await.unwrap();

    // Both follower boards applied the same sequence as the leader.
    assert_eq!(leader_board.applied(), vec![5, 7]);
    assert_eq!(follower.p1.applied(), vec![5, 7]);
    assert_eq!(follower.p2.applied(), vec![5, 7]);
    assert_eq!(follower.p1.score(), Some(7));

    // Presence: the stale "away" lost, the departed participant is gone,
    // and the unknown tag was dropped without taking the pump down.
    let roster = &follower.listener.roster;
    assert_eq!(roster.status_of("elinor").unwrap(), "online");
    assert!(roster.status_of("marlow").is_err());
    assert_eq!(
        follower.listener.transcript.lock().as_slice(),
        ["marlow: good luck"]
    );
}

#[tokio::test]
async fn pump_survives_malformed_inbound_calls() {
    init_tracing();
    let follower = follower_node();

    let name = RelayName::new("game-state").unwrap();

    // A call for a relay this node never registered: dropped.
    let stray = RemoteCall::new(
        RelayName::new("map-editor").unwrap(),
        MethodId::new(0),
        vec![],
        Ticket::new(0),
    );
    // A call with an out-of-range ordinal: rejected, its ticket skipped.
    let bad = RemoteCall::new(name.clone(), MethodId::new(42), vec![], Ticket::new(0));
    // A well-formed call behind the bad one's ticket.
    let good = RemoteCall::new(
        name,
        muster_core::MethodSig::new("set_score", [muster_core::TypeDesc::I64]),
        vec![Value::I64(3)],
        Ticket::new(1),
    );

    for msg in [stray, bad, good] {
        follower.tx.send(WireMessage::Call(msg)).await.unwrap();
    }
    drop(follower.tx);
    follower.pump.await.unwrap();

    assert_eq!(follower.p1.applied(), vec![3]);
    assert_eq!(follower.p2.applied(), vec![3]);
}
