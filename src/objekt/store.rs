//! ObjektStore trait definition.

use super::model::Objekt;
use anyhow::Result;

/// Trait for objekt storage backends.
pub trait ObjektStore: Send + Sync {
    /// Insert a new objekt and return it with its assigned id.
    fn create_objekt(&self) -> Result<Objekt>;

    /// Get an objekt by id.
    fn get_objekt(&self, id: i64) -> Result<Option<Objekt>>;

    /// Delete an objekt by id. Returns true when a row was removed.
    fn delete_objekt(&self, id: i64) -> Result<bool>;

    /// Number of stored objekts.
    fn count_objekts(&self) -> Result<usize>;
}
