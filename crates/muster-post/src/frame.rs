//! Wire framing for calls and envelopes.
//!
//! One frame = one postcard-encoded [`WireMessage`], COBS-encoded and
//! terminated by a `0x00` delimiter. The byte transport underneath only
//! has to deliver bytes in FIFO order per connection; cross-connection
//! ordering is the relay's job, not the transport's.

use serde::{Deserialize, Serialize};

use muster_core::RemoteCall;

use crate::envelope::Envelope;

/// Frame delimiter byte. COBS guarantees it never appears in a body.
pub const FRAME_DELIMITER: u8 = 0x00;

/// Everything that crosses the wire between nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum WireMessage {
    /// A ticketed invocation to replay.
    Call(RemoteCall),
    /// A pushed, type-tagged event.
    Event(Envelope),
}

/// Errors encoding or decoding a frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    /// COBS framing was violated.
    Cobs(String),
    /// The frame body does not decode as a [`WireMessage`].
    Postcard(String),
}

impl std::fmt::Display for FrameError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FrameError::Cobs(msg) => write!(f, "cobs: {msg}"),
            FrameError::Postcard(msg) => write!(f, "postcard: {msg}"),
        }
    }
}

impl std::error::Error for FrameError {}

/// Encode one message as a delimited frame, ready to write to a stream.
pub fn encode_frame(msg: &WireMessage) -> Result<Vec<u8>, FrameError> {
    let payload = postcard::to_allocvec(msg).map_err(|e| FrameError::Postcard(e.to_string()))?;
    let mut framed = cobs::encode_vec(&payload);
    framed.push(FRAME_DELIMITER);
    Ok(framed)
}

/// Decode one frame body (without its trailing delimiter).
pub fn decode_frame(frame: &[u8]) -> Result<WireMessage, FrameError> {
    let decoded = cobs::decode_vec(frame).map_err(|e| FrameError::Cobs(format!("{e:?}")))?;
    postcard::from_bytes(&decoded).map_err(|e| FrameError::Postcard(e.to_string()))
}

/// Incremental frame decoder for a byte stream.
///
/// Feed it whatever chunks arrive; it scans for delimiters and yields one
/// decoded message per complete frame. A frame that fails to decode is
/// consumed and reported without poisoning the frames behind it.
#[derive(Default)]
pub struct FrameCursor {
    buf: Vec<u8>,
}

impl FrameCursor {
    pub fn new() -> Self {
        FrameCursor::default()
    }

    /// Append newly received bytes.
    pub fn extend(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Decode the next complete frame, if one is buffered.
    pub fn next_message(&mut self) -> Option<Result<WireMessage, FrameError>> {
        let idx = self.buf.iter().position(|b| *b == FRAME_DELIMITER)?;
        let frame: Vec<u8> = self.buf.drain(..idx).collect();
        self.buf.drain(..1); // delimiter
        Some(decode_frame(&frame))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envelope::Payload;
    use muster_core::{MethodId, RelayName, Ticket, Value};

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct ChatLine {
        text: String,
    }

    impl Payload for ChatLine {
        const TAG: &'static str = "chat-line";
    }

    fn sample_call() -> WireMessage {
        WireMessage::Call(RemoteCall::new(
            RelayName::new("game-state").unwrap(),
            MethodId::new(2),
            vec![Value::I64(5), Value::Str("hill".into())],
            Ticket::new(11),
        ))
    }

    fn sample_event() -> WireMessage {
        WireMessage::Event(Envelope::wrap(&ChatLine { text: "gg".into() }).unwrap())
    }

    #[test]
    fn frames_round_trip() {
        for msg in [sample_call(), sample_event()] {
            let framed = encode_frame(&msg).unwrap();
            assert_eq!(*framed.last().unwrap(), FRAME_DELIMITER);
            // Body contains no delimiter: that's the COBS guarantee the
            // cursor relies on.
            assert!(!framed[..framed.len() - 1].contains(&FRAME_DELIMITER));
            let decoded = decode_frame(&framed[..framed.len() - 1]).unwrap();
            assert_eq!(decoded, msg);
        }
    }

    #[test]
    fn cursor_reassembles_chunked_frames() {
        let mut bytes = encode_frame(&sample_call()).unwrap();
        bytes.extend(encode_frame(&sample_event()).unwrap());

        let mut cursor = FrameCursor::new();
        let mut seen = Vec::new();
        // Dribble the stream in three-byte chunks.
        for chunk in bytes.chunks(3) {
            cursor.extend(chunk);
            while let Some(msg) = cursor.next_message() {
                seen.push(msg.unwrap());
            }
        }
        assert_eq!(seen, [sample_call(), sample_event()]);
    }

    #[test]
    fn corrupt_frame_does_not_poison_the_stream() {
        let mut cursor = FrameCursor::new();
        // A lone delimiter yields an empty frame, which cannot decode.
        cursor.extend(&[FRAME_DELIMITER]);
        cursor.extend(&encode_frame(&sample_event()).unwrap());

        assert!(cursor.next_message().unwrap().is_err());
        assert_eq!(cursor.next_message().unwrap().unwrap(), sample_event());
        assert!(cursor.next_message().is_none());
    }
}
