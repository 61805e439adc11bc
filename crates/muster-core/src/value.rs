//! Argument/return values and their wire-safe type descriptors.

use serde::{Deserialize, Serialize};

/// A value passed to or returned from a remote method.
///
/// Closed set: every variant has a stable wire encoding and a matching
/// [`TypeDesc`], so peers agree on signatures without sharing any runtime
/// type identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Unit,
    Bool(bool),
    I64(i64),
    U64(u64),
    F64(f64),
    Str(String),
    Bytes(Vec<u8>),
    List(Vec<Value>),
}

impl Value {
    /// The type descriptor this value carries.
    pub fn type_desc(&self) -> TypeDesc {
        match self {
            Value::Unit => TypeDesc::Unit,
            Value::Bool(_) => TypeDesc::Bool,
            Value::I64(_) => TypeDesc::I64,
            Value::U64(_) => TypeDesc::U64,
            Value::F64(_) => TypeDesc::F64,
            Value::Str(_) => TypeDesc::Str,
            Value::Bytes(_) => TypeDesc::Bytes,
            Value::List(_) => TypeDesc::List,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::I64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }
}

/// Describes a parameter type in a method signature.
///
/// The descriptor names are part of the deterministic table ordering rule,
/// so they are stable strings, not derived debug output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TypeDesc {
    Unit,
    Bool,
    I64,
    U64,
    F64,
    Str,
    Bytes,
    List,
}

impl TypeDesc {
    /// Stable descriptor name used for wire display and table ordering.
    pub fn name(self) -> &'static str {
        match self {
            TypeDesc::Unit => "unit",
            TypeDesc::Bool => "bool",
            TypeDesc::I64 => "i64",
            TypeDesc::U64 => "u64",
            TypeDesc::F64 => "f64",
            TypeDesc::Str => "str",
            TypeDesc::Bytes => "bytes",
            TypeDesc::List => "list",
        }
    }
}

impl std::fmt::Display for TypeDesc {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_reports_its_type() {
        assert_eq!(Value::I64(5).type_desc(), TypeDesc::I64);
        assert_eq!(Value::Str("x".into()).type_desc(), TypeDesc::Str);
        assert_eq!(Value::Unit.type_desc(), TypeDesc::Unit);
    }

    #[test]
    fn type_desc_names_are_distinct() {
        let all = [
            TypeDesc::Unit,
            TypeDesc::Bool,
            TypeDesc::I64,
            TypeDesc::U64,
            TypeDesc::F64,
            TypeDesc::Str,
            TypeDesc::Bytes,
            TypeDesc::List,
        ];
        for (i, a) in all.iter().enumerate() {
            for b in &all[i + 1..] {
                assert_ne!(a.name(), b.name());
            }
        }
    }

    #[test]
    fn accessors() {
        assert_eq!(Value::I64(9).as_i64(), Some(9));
        assert_eq!(Value::Bool(true).as_i64(), None);
        assert_eq!(Value::Str("hi".into()).as_str(), Some("hi"));
    }
}
