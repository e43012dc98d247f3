use serde::{Deserialize, Serialize};

/// A persisted record with opaque identity.
///
/// The record holds nothing beyond the identity the persistence layer
/// assigns. Job dispatch passes the whole record as payload and never
/// mutates the underlying row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Objekt {
    pub id: i64,
    /// Creation time as unix timestamp (seconds).
    pub created: i64,
}
