use serde::{Deserialize, Serialize};

/// Name of a relay (one logical capability). Never empty.
#[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct RelayName(String);

impl RelayName {
    /// Create a relay name. Returns None if `name` is empty.
    pub fn new(name: impl Into<String>) -> Option<Self> {
        let name = name.into();
        if name.is_empty() { None } else { Some(RelayName(name)) }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RelayName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Compact method ordinal for wire dispatch.
///
/// Assigned by [`crate::MethodTable`] at build time; bijective with the
/// method signatures of one capability for the lifetime of that build.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct MethodId(pub(crate) u32);

impl MethodId {
    pub fn new(id: u32) -> Self {
        MethodId(id)
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

/// Admission token, monotonically increasing per relay. Never reused.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub struct Ticket(pub(crate) u64);

impl Ticket {
    pub fn new(ticket: u64) -> Self {
        Ticket(ticket)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}
