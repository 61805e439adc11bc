//! Type-tagged message envelopes.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// A message type that can ride in an [`Envelope`].
///
/// `TAG` is the wire identity of the payload type. Tags must be unique
/// across the message set a node binds; the dispatch table asserts this
/// at registration time.
pub trait Payload: Serialize + DeserializeOwned {
    const TAG: &'static str;
}

/// Errors wrapping or unwrapping an envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvelopeError {
    /// The envelope's tag does not match the expected payload type.
    TypeMismatch {
        expected: &'static str,
        found: String,
    },
    /// The payload failed to serialize.
    Encode(String),
    /// The body bytes do not decode as the tagged type.
    Decode(String),
}

impl std::fmt::Display for EnvelopeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EnvelopeError::TypeMismatch { expected, found } => {
                write!(f, "expected payload {expected:?}, envelope is tagged {found:?}")
            }
            EnvelopeError::Encode(msg) => write!(f, "encode failed: {msg}"),
            EnvelopeError::Decode(msg) => write!(f, "decode failed: {msg}"),
        }
    }
}

impl std::error::Error for EnvelopeError {}

/// An immutable type-tagged container for one pushed message.
///
/// The tag check in [`Envelope::unwrap`] is the sole type-check point:
/// everything downstream is statically typed against the already-decoded
/// payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    tag: String,
    body: Vec<u8>,
}

impl Envelope {
    /// Wrap a payload: tag it and encode its body.
    pub fn wrap<P: Payload>(payload: &P) -> Result<Envelope, EnvelopeError> {
        let body =
            postcard::to_allocvec(payload).map_err(|e| EnvelopeError::Encode(e.to_string()))?;
        Ok(Envelope {
            tag: P::TAG.to_string(),
            body,
        })
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Decode the payload as `P`.
    ///
    /// Fails with [`EnvelopeError::TypeMismatch`] if the envelope is
    /// tagged for a different type. Unwrapping does not consume anything:
    /// the same envelope unwraps identically any number of times.
    pub fn unwrap<P: Payload>(&self) -> Result<P, EnvelopeError> {
        if self.tag != P::TAG {
            return Err(EnvelopeError::TypeMismatch {
                expected: P::TAG,
                found: self.tag.clone(),
            });
        }
        postcard::from_bytes(&self.body).map_err(|e| EnvelopeError::Decode(e.to_string()))
    }
}
