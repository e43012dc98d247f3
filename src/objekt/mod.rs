//! The objekt record and its persistence.
//!
//! An objekt carries no domain fields beyond its persistence identity; its
//! dispatch methods submit the whole record as payload to background jobs.

mod dispatch;
mod model;
mod sqlite_objekt_store;
mod store;

pub use model::Objekt;
pub use sqlite_objekt_store::SqliteObjektStore;
pub use store::ObjektStore;
