//! SQLite-backed server store implementation.

use super::{JobAuditEvent, JobAuditEventType, ServerStore};
use anyhow::{anyhow, bail, Context, Result};
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::Mutex;
use tracing::warn;
use uuid::Uuid;

const SERVER_DB_VERSION: i32 = 1;

const TABLE_JOB_AUDIT: &str = "job_audit";

const SCHEMA_V_1: &[&str] = &[
    "CREATE TABLE job_audit (id INTEGER NOT NULL UNIQUE, job_id TEXT NOT NULL, submission_id TEXT NOT NULL, event_type TEXT NOT NULL, attempt INTEGER, duration_ms INTEGER, details TEXT, error TEXT, created INTEGER NOT NULL DEFAULT (cast(strftime('%s','now') as int)), PRIMARY KEY (id));",
    "CREATE INDEX job_audit_job_id_index ON job_audit (job_id);",
    "CREATE INDEX job_audit_submission_id_index ON job_audit (submission_id);",
];

/// SQLite-backed server store.
pub struct SqliteServerStore {
    conn: Mutex<Connection>,
}

impl SqliteServerStore {
    pub fn new<T: AsRef<Path>>(db_path: T) -> Result<Self> {
        let conn = Connection::open_with_flags(
            db_path,
            rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                | rusqlite::OpenFlags::SQLITE_OPEN_CREATE
                | rusqlite::OpenFlags::SQLITE_OPEN_URI
                | rusqlite::OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .context("Failed to open server database")?;

        conn.pragma_update(None, "journal_mode", "WAL")
            .context("Failed to set WAL mode on server database")?;

        let table_count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'",
                [],
                |r| r.get(0),
            )
            .unwrap_or(0);

        if table_count == 0 {
            Self::create_schema(&conn)?;
        } else {
            let version: i32 = conn
                .query_row("PRAGMA user_version;", [], |row| row.get(0))
                .context("Failed to read server database version")?;
            if version != SERVER_DB_VERSION {
                bail!("Unknown server database version {}", version);
            }
        }

        Ok(SqliteServerStore {
            conn: Mutex::new(conn),
        })
    }

    fn create_schema(conn: &Connection) -> Result<()> {
        for statement in SCHEMA_V_1 {
            conn.execute(statement, [])?;
        }
        conn.execute(&format!("PRAGMA user_version = {}", SERVER_DB_VERSION), [])?;

        Ok(())
    }

    fn query_events(&self, where_clause: &str, param: &str, limit: i64) -> Result<Vec<JobAuditEvent>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT id, job_id, submission_id, event_type, attempt, duration_ms, details, error, created \
             FROM {} WHERE {} ORDER BY id ASC LIMIT ?2",
            TABLE_JOB_AUDIT, where_clause
        ))?;

        let rows = stmt.query_map(params![param, limit], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, Option<u32>>(4)?,
                row.get::<_, Option<i64>>(5)?,
                row.get::<_, Option<String>>(6)?,
                row.get::<_, Option<String>>(7)?,
                row.get::<_, i64>(8)?,
            ))
        })?;

        let mut events = Vec::new();
        for row in rows {
            let (id, job_id, submission_id, event_type, attempt, duration_ms, details, error, created) = row?;
            let event_type = JobAuditEventType::parse(&event_type)
                .ok_or_else(|| anyhow!("Unknown audit event type '{}'", event_type))?;
            let details = details.and_then(|json| {
                serde_json::from_str(&json)
                    .map_err(|e| {
                        warn!("Malformed JSON details in job audit row {}: {}", id, e);
                        e
                    })
                    .ok()
            });
            events.push(JobAuditEvent {
                id,
                job_id,
                submission_id,
                event_type,
                attempt,
                duration_ms,
                details,
                error,
                created,
            });
        }

        Ok(events)
    }
}

impl ServerStore for SqliteServerStore {
    fn log_job_audit(
        &self,
        job_id: &str,
        submission_id: Uuid,
        event_type: JobAuditEventType,
        attempt: Option<u32>,
        duration_ms: Option<i64>,
        details: Option<&serde_json::Value>,
        error: Option<&str>,
    ) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            &format!(
                "INSERT INTO {} (job_id, submission_id, event_type, attempt, duration_ms, details, error) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                TABLE_JOB_AUDIT
            ),
            params![
                job_id,
                submission_id.to_string(),
                event_type.as_str(),
                attempt,
                duration_ms,
                details.map(|d| d.to_string()),
                error,
            ],
        )
        .with_context(|| format!("Failed to log audit event for job {}", job_id))?;

        Ok(())
    }

    fn get_job_audit_events(&self, job_id: &str, limit: usize) -> Result<Vec<JobAuditEvent>> {
        self.query_events("job_id = ?1", job_id, limit as i64)
    }

    fn get_submission_audit_events(&self, submission_id: Uuid) -> Result<Vec<JobAuditEvent>> {
        self.query_events("submission_id = ?1", &submission_id.to_string(), i64::MAX)
    }
}
