//! Capability descriptions and the method ordinal table.
//!
//! A [`CapabilitySpec`] is an explicit description of one capability
//! interface: its name and the signatures implementors satisfy. The
//! [`MethodTable`] built from it assigns each signature a compact
//! [`MethodId`] so a call can reference an overloaded method with one or
//! two bytes on the wire instead of a name plus a type list.
//!
//! The assignment is deterministic: signatures are ordered by method name
//! (lexicographic), then by parameter count (ascending), then by the
//! per-position parameter type descriptor names (lexicographic). Two peers
//! that build a table from equal specs — in separate processes, with no
//! shared runtime type identity — get identical id ↔ signature mappings.

use serde::{Deserialize, Serialize};

use crate::{MethodId, TableError, TypeDesc};

/// One method signature: name plus ordered parameter type descriptors.
///
/// Overloads share a name and differ in `params`; each overload gets its
/// own [`MethodId`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MethodSig {
    name: String,
    params: Vec<TypeDesc>,
}

impl MethodSig {
    pub fn new(name: impl Into<String>, params: impl Into<Vec<TypeDesc>>) -> Self {
        MethodSig {
            name: name.into(),
            params: params.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn params(&self) -> &[TypeDesc] {
        &self.params
    }

    /// Number of arguments a call to this method must carry.
    pub fn arity(&self) -> usize {
        self.params.len()
    }

    /// Sort key for the deterministic table ordering.
    fn order_key(&self) -> (&str, usize, Vec<&'static str>) {
        (
            self.name.as_str(),
            self.params.len(),
            self.params.iter().map(|p| p.name()).collect(),
        )
    }
}

impl std::fmt::Display for MethodSig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}(", self.name)?;
        for (i, p) in self.params.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{p}")?;
        }
        write!(f, ")")
    }
}

/// Explicit description of one capability interface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilitySpec {
    name: String,
    methods: Vec<MethodSig>,
}

impl CapabilitySpec {
    pub fn new(name: impl Into<String>, methods: impl Into<Vec<MethodSig>>) -> Self {
        CapabilitySpec {
            name: name.into(),
            methods: methods.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn methods(&self) -> &[MethodSig] {
        &self.methods
    }
}

/// Bijective mapping between a capability's method signatures and their
/// compact ids, valid for the lifetime of one build.
#[derive(Debug, Clone)]
pub struct MethodTable {
    // Index position == MethodId value.
    ordered: Vec<MethodSig>,
}

impl MethodTable {
    /// Build the table for a capability.
    ///
    /// Fails with [`TableError::DuplicateMethod`] if two declared
    /// signatures are identical (same name and same parameter list).
    /// Zero- and one-method specs build valid, trivially small tables.
    pub fn build(spec: &CapabilitySpec) -> Result<Self, TableError> {
        let mut ordered = spec.methods().to_vec();
        ordered.sort_by(|a, b| a.order_key().cmp(&b.order_key()));

        for pair in ordered.windows(2) {
            if pair[0] == pair[1] {
                return Err(TableError::DuplicateMethod(pair[0].to_string()));
            }
        }

        Ok(MethodTable { ordered })
    }

    /// Number of methods in the table.
    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }

    /// Resolve a signature to its compact id.
    pub fn id_of(&self, sig: &MethodSig) -> Result<MethodId, TableError> {
        self.ordered
            .binary_search_by(|probe| probe.order_key().cmp(&sig.order_key()))
            .map(|idx| MethodId(idx as u32))
            .map_err(|_| TableError::UnknownMethod(sig.to_string()))
    }

    /// Resolve a compact id back to its signature.
    pub fn sig_of(&self, id: MethodId) -> Result<&MethodSig, TableError> {
        self.ordered
            .get(id.get() as usize)
            .ok_or(TableError::InvalidOrdinal(id))
    }

    /// Iterate signatures in id order.
    pub fn sigs(&self) -> impl Iterator<Item = (MethodId, &MethodSig)> {
        self.ordered
            .iter()
            .enumerate()
            .map(|(idx, sig)| (MethodId(idx as u32), sig))
    }
}
