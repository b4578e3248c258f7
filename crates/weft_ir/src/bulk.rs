//! Fixed-size slot arrays handed to foreign callers.
//!
//! A caller that fills many handles at once (a loader, a binding layer)
//! asks the context for an array of `n` empty slots and writes into it
//! through [`Context::bulk_array_mut`](crate::context::Context::bulk_array_mut).
//! Arrays live until the context is dropped.

use crate::wireable::{Connection, WireableId};
use serde::{Deserialize, Serialize};

/// One bulk array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BulkArray {
    /// Instance handles.
    Instances(Vec<Option<WireableId>>),
    /// Connection values built by the caller.
    Connections(Vec<Option<Connection>>),
    /// Handles to connections that already exist in some body.
    ConnectionRefs(Vec<Option<Connection>>),
    /// Wireable handles of any variant.
    Wireables(Vec<Option<WireableId>>),
    /// Strings such as instance names or paths.
    Strings(Vec<String>),
}

impl BulkArray {
    /// Number of slots.
    pub fn len(&self) -> usize {
        match self {
            BulkArray::Instances(v) | BulkArray::Wireables(v) => v.len(),
            BulkArray::Connections(v) | BulkArray::ConnectionRefs(v) => v.len(),
            BulkArray::Strings(v) => v.len(),
        }
    }

    /// Returns `true` for a zero-length array.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Short name of the element kind, for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            BulkArray::Instances(_) => "instance",
            BulkArray::Connections(_) => "connection",
            BulkArray::ConnectionRefs(_) => "connection-ref",
            BulkArray::Wireables(_) => "wireable",
            BulkArray::Strings(_) => "string",
        }
    }
}
