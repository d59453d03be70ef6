//! Schema migrations.
//!
//! Applied versions are tracked in `_migrations`; each migration runs at
//! most once, in order.

use rusqlite::{params, Connection};
use tracing::info;

use crate::error::{DatabaseError, DatabaseResult};

struct Migration {
    version: u32,
    description: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        description: "create_videos_table",
        sql: include_str!("sql/001_create_videos.sql"),
    },
    Migration {
        version: 2,
        description: "index_videos_created_at",
        sql: include_str!("sql/002_index_videos_created_at.sql"),
    },
];

/// Runs all pending migrations on the given connection.
pub fn run_all(conn: &Connection) -> DatabaseResult<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS _migrations (
            version INTEGER PRIMARY KEY,
            description TEXT NOT NULL,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );",
    )?;

    let current_version: u32 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM _migrations",
        [],
        |r| r.get(0),
    )?;

    for migration in MIGRATIONS.iter().filter(|m| m.version > current_version) {
        info!(
            version = migration.version,
            description = migration.description,
            "Running migration"
        );

        conn.execute_batch(migration.sql)
            .map_err(|e| DatabaseError::Migration {
                version: migration.version,
                reason: e.to_string(),
            })?;

        conn.execute(
            "INSERT INTO _migrations (version, description) VALUES (?1, ?2)",
            params![migration.version, migration.description],
        )?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn applied(conn: &Connection) -> u32 {
        conn.query_row("SELECT COUNT(*) FROM _migrations", [], |r| r.get(0))
            .unwrap()
    }

    #[test]
    fn test_migrations_run_on_fresh_db() {
        let conn = Connection::open_in_memory().unwrap();
        run_all(&conn).unwrap();
        assert_eq!(applied(&conn), MIGRATIONS.len() as u32);

        let columns: Vec<String> = conn
            .prepare("PRAGMA table_info(videos)")
            .unwrap()
            .query_map([], |row| row.get(1))
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(
            columns,
            vec![
                "id",
                "name",
                "status",
                "thumbnail_url",
                "video_url",
                "created_at",
                "updated_at",
                "duration",
                "error"
            ]
        );
    }

    #[test]
    fn test_migrations_are_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        run_all(&conn).unwrap();
        run_all(&conn).unwrap();
        assert_eq!(applied(&conn), MIGRATIONS.len() as u32);
    }
}
