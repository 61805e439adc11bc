//! Per-handler outcome aggregation.
//!
//! Executing one call against every handler bound to a relay produces one
//! [`Outcome`] per handler. A handler failure is captured as data
//! ([`Fault`]) rather than propagated — it never aborts the sibling
//! handlers and never fails the invoke as a whole.

use serde::{Deserialize, Serialize};

use crate::{OutcomeError, Value};

/// A captured handler failure: what went wrong, as a description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fault {
    message: String,
}

impl Fault {
    pub fn new(message: impl Into<String>) -> Self {
        Fault {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for Fault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for Fault {}

impl From<String> for Fault {
    fn from(message: String) -> Self {
        Fault { message }
    }
}

impl From<&str> for Fault {
    fn from(message: &str) -> Self {
        Fault {
            message: message.to_string(),
        }
    }
}

/// The result of applying one call to one bound handler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outcome {
    handler: String,
    result: Result<Value, Fault>,
}

impl Outcome {
    pub fn success(handler: impl Into<String>, value: Value) -> Self {
        Outcome {
            handler: handler.into(),
            result: Ok(value),
        }
    }

    pub fn failure(handler: impl Into<String>, fault: Fault) -> Self {
        Outcome {
            handler: handler.into(),
            result: Err(fault),
        }
    }

    /// Label of the handler this outcome belongs to.
    pub fn handler(&self) -> &str {
        &self.handler
    }

    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    pub fn value(&self) -> Option<&Value> {
        self.result.as_ref().ok()
    }

    pub fn fault(&self) -> Option<&Fault> {
        self.result.as_ref().err()
    }
}

/// Ordered outcomes of one call, one entry per handler that was bound when
/// the call's turn arrived, in registration order.
///
/// Zero bound handlers is a valid, empty set — not an error.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CallOutcomes {
    outcomes: Vec<Outcome>,
}

impl CallOutcomes {
    pub fn new(outcomes: Vec<Outcome>) -> Self {
        CallOutcomes { outcomes }
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Outcome of the i-th handler bound at invocation time.
    pub fn get(&self, index: usize) -> Option<&Outcome> {
        self.outcomes.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Outcome> {
        self.outcomes.iter()
    }

    /// The first successful return value.
    ///
    /// Fails with [`OutcomeError::NoSuccessfulOutcome`] if every handler
    /// failed or none were bound.
    pub fn first_value(&self) -> Result<&Value, OutcomeError> {
        self.outcomes
            .iter()
            .find_map(|o| o.value())
            .ok_or(OutcomeError::NoSuccessfulOutcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_registration_order() {
        let set = CallOutcomes::new(vec![
            Outcome::failure("p1", Fault::new("boom")),
            Outcome::success("p2", Value::I64(7)),
        ]);
        assert_eq!(set.len(), 2);
        assert_eq!(set.get(0).unwrap().handler(), "p1");
        assert_eq!(set.get(1).unwrap().handler(), "p2");
    }

    #[test]
    fn first_value_skips_failures() {
        let set = CallOutcomes::new(vec![
            Outcome::failure("p1", Fault::new("boom")),
            Outcome::success("p2", Value::I64(7)),
            Outcome::success("p3", Value::I64(9)),
        ]);
        assert_eq!(set.first_value().unwrap(), &Value::I64(7));
    }

    #[test]
    fn first_value_fails_when_all_failed() {
        let set = CallOutcomes::new(vec![Outcome::failure("p1", Fault::new("boom"))]);
        assert!(matches!(
            set.first_value(),
            Err(OutcomeError::NoSuccessfulOutcome)
        ));
    }

    #[test]
    fn first_value_fails_when_empty() {
        let set = CallOutcomes::default();
        assert!(set.is_empty());
        assert!(matches!(
            set.first_value(),
            Err(OutcomeError::NoSuccessfulOutcome)
        ));
    }

    #[test]
    fn fault_carries_its_message() {
        let fault = Fault::new("handler refused");
        assert_eq!(fault.message(), "handler refused");
        assert_eq!(fault.to_string(), "handler refused");
    }
}
