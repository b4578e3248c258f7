//! Opaque ID newtypes for context-owned IR objects.
//!
//! Each ID is a `u32` wrapper produced by [`Arena::alloc`](crate::arena::Arena::alloc).
//! Wireables use the two-part [`WireableId`](crate::wireable::WireableId) instead.

use crate::arena::ArenaId;
use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident, $tag:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
        pub struct $name(u32);

        impl $name {
            /// Creates an ID from a raw index.
            pub fn from_raw(index: u32) -> Self {
                Self(index)
            }

            /// Returns the raw index.
            pub fn as_raw(self) -> u32 {
                self.0
            }
        }

        impl ArenaId for $name {
            fn from_raw(index: u32) -> Self {
                Self(index)
            }

            fn as_raw(self) -> u32 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($tag, "#{}"), self.0)
            }
        }
    };
}

define_id!(
    /// A canonical type in the context's type cache.
    TypeId,
    "type"
);

define_id!(
    /// A single argument value.
    ArgId,
    "arg"
);

define_id!(
    /// An interned argument record.
    ArgsId,
    "args"
);

define_id!(
    /// A generator or module parameter signature.
    ParamsId,
    "params"
);

define_id!(
    /// An ordered record field list.
    RecordParamsId,
    "record"
);

define_id!(
    /// A namespace registered with the context.
    NamespaceId,
    "ns"
);

define_id!(
    /// A module owned by a namespace.
    ModuleId,
    "module"
);

define_id!(
    /// A generator owned by a namespace.
    GeneratorId,
    "gen"
);

define_id!(
    /// A bulk interop array owned by the context.
    BulkArrayId,
    "bulk"
);

define_id!(
    /// A module definition body. Every `ModuleDef` ever created gets a fresh one.
    DefId,
    "def"
);

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn raw_roundtrip() {
        assert_eq!(TypeId::from_raw(12).as_raw(), 12);
    }

    #[test]
    fn display_has_tag() {
        assert_eq!(ModuleId::from_raw(3).to_string(), "module#3");
        assert_eq!(DefId::from_raw(0).to_string(), "def#0");
    }

    #[test]
    fn hash_in_set() {
        let mut set = HashSet::new();
        set.insert(ArgsId::from_raw(1));
        set.insert(ArgsId::from_raw(1));
        set.insert(ArgsId::from_raw(2));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn serde_roundtrip() {
        let id = GeneratorId::from_raw(5);
        let json = serde_json::to_string(&id).unwrap();
        let back: GeneratorId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, back);
    }
}
