//! SQLite-backed objekt store implementation.

use super::model::Objekt;
use super::store::ObjektStore;
use anyhow::{bail, Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::Mutex;

const OBJEKT_DB_VERSION: i32 = 1;

const TABLE_OBJEKT: &str = "objekt";

const SCHEMA_V_1: &[&str] = &[
    "CREATE TABLE objekt (id INTEGER NOT NULL UNIQUE, created INTEGER NOT NULL DEFAULT (cast(strftime('%s','now') as int)), PRIMARY KEY (id));",
];

/// SQLite-backed objekt store.
pub struct SqliteObjektStore {
    conn: Mutex<Connection>,
}

impl SqliteObjektStore {
    pub fn new<T: AsRef<Path>>(db_path: T) -> Result<Self> {
        let conn = if db_path.as_ref().exists() {
            Connection::open_with_flags(
                db_path,
                rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                    | rusqlite::OpenFlags::SQLITE_OPEN_URI
                    | rusqlite::OpenFlags::SQLITE_OPEN_NO_MUTEX,
            )?
        } else {
            let conn = Connection::open(db_path)?;
            Self::create_schema(&conn)?;
            conn
        };

        let version: i32 = conn
            .query_row("PRAGMA user_version;", [], |row| row.get(0))
            .context("Failed to read objekt database version")?;

        match version {
            OBJEKT_DB_VERSION => Self::validate_schema_1(&conn)?,
            _ => bail!("Unknown objekt database version {}", version),
        }

        Ok(SqliteObjektStore {
            conn: Mutex::new(conn),
        })
    }

    fn create_schema(conn: &Connection) -> Result<()> {
        for statement in SCHEMA_V_1 {
            conn.execute(statement, [])?;
        }
        conn.execute(&format!("PRAGMA user_version = {}", OBJEKT_DB_VERSION), [])?;

        Ok(())
    }

    fn validate_schema_1(conn: &Connection) -> Result<()> {
        let mut stmt = conn.prepare(&format!("PRAGMA table_info({});", TABLE_OBJEKT))?;
        let columns: Vec<String> = stmt
            .query_map([], |row| row.get(1))?
            .collect::<Result<_, _>>()?;

        if columns != ["id", "created"] {
            bail!(
                "Schema validation failed for objekt table, found {:?}",
                columns
            );
        }

        Ok(())
    }
}

impl ObjektStore for SqliteObjektStore {
    fn create_objekt(&self) -> Result<Objekt> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            &format!("INSERT INTO {} DEFAULT VALUES", TABLE_OBJEKT),
            [],
        )
        .context("Failed to create objekt")?;
        let id = conn.last_insert_rowid();
        let created: i64 = conn.query_row(
            &format!("SELECT created FROM {} WHERE id = ?1", TABLE_OBJEKT),
            params![id],
            |row| row.get(0),
        )?;

        Ok(Objekt { id, created })
    }

    fn get_objekt(&self, id: i64) -> Result<Option<Objekt>> {
        let conn = self.conn.lock().unwrap();
        conn.query_row(
            &format!("SELECT id, created FROM {} WHERE id = ?1", TABLE_OBJEKT),
            params![id],
            |row| {
                Ok(Objekt {
                    id: row.get(0)?,
                    created: row.get(1)?,
                })
            },
        )
        .optional()
        .with_context(|| format!("Failed to get objekt {}", id))
    }

    fn delete_objekt(&self, id: i64) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        let deleted = conn.execute(
            &format!("DELETE FROM {} WHERE id = ?1", TABLE_OBJEKT),
            params![id],
        )?;

        Ok(deleted > 0)
    }

    fn count_objekts(&self) -> Result<usize> {
        let conn = self.conn.lock().unwrap();
        let count: usize = conn.query_row(
            &format!("SELECT COUNT(*) FROM {}", TABLE_OBJEKT),
            [],
            |row| row.get(0),
        )?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_store() -> (TempDir, SqliteObjektStore) {
        let tmp = TempDir::new().unwrap();
        let store = SqliteObjektStore::new(tmp.path().join("objekt.db")).unwrap();
        (tmp, store)
    }

    #[test]
    fn test_create_and_get_objekt() {
        let (_tmp, store) = test_store();

        let objekt = store.create_objekt().unwrap();
        assert!(objekt.id > 0);
        assert!(objekt.created > 0);

        let fetched = store.get_objekt(objekt.id).unwrap().unwrap();
        assert_eq!(fetched, objekt);
    }

    #[test]
    fn test_get_missing_objekt_returns_none() {
        let (_tmp, store) = test_store();

        assert!(store.get_objekt(42).unwrap().is_none());
    }

    #[test]
    fn test_delete_objekt() {
        let (_tmp, store) = test_store();

        let objekt = store.create_objekt().unwrap();
        assert!(store.delete_objekt(objekt.id).unwrap());
        assert!(!store.delete_objekt(objekt.id).unwrap());
        assert!(store.get_objekt(objekt.id).unwrap().is_none());
    }

    #[test]
    fn test_count_objekts() {
        let (_tmp, store) = test_store();

        assert_eq!(store.count_objekts().unwrap(), 0);
        store.create_objekt().unwrap();
        store.create_objekt().unwrap();
        assert_eq!(store.count_objekts().unwrap(), 2);
    }

    #[test]
    fn test_reopen_existing_database() {
        let tmp = TempDir::new().unwrap();
        let db_path = tmp.path().join("objekt.db");

        let id = {
            let store = SqliteObjektStore::new(&db_path).unwrap();
            store.create_objekt().unwrap().id
        };

        let store = SqliteObjektStore::new(&db_path).unwrap();
        assert!(store.get_objekt(id).unwrap().is_some());
    }
}
