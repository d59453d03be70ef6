//! Job repository: reads and writes for the `videos` table.
//!
//! Writes are single statements keyed on the job id, so a status sync racing
//! a rename can never clobber the user's title.

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, OptionalExtension, Row};

use vstudio_models::{Job, JobId, JobStatus};

use crate::{Database, DatabaseError, DatabaseResult};

const COLUMNS: &str =
    "id, name, status, thumbnail_url, video_url, created_at, updated_at, duration, error";

/// A raw row from the `videos` table.
#[derive(Debug, Clone)]
struct JobRow {
    id: String,
    name: String,
    status: String,
    thumbnail_url: Option<String>,
    video_url: Option<String>,
    created_at: String,
    updated_at: String,
    duration: Option<String>,
    error: Option<String>,
}

impl JobRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            status: row.get(2)?,
            thumbnail_url: row.get(3)?,
            video_url: row.get(4)?,
            created_at: row.get(5)?,
            updated_at: row.get(6)?,
            duration: row.get(7)?,
            error: row.get(8)?,
        })
    }

    fn into_job(self) -> DatabaseResult<Job> {
        let created_at = parse_timestamp(&self.id, &self.created_at)?;
        let updated_at = parse_timestamp(&self.id, &self.updated_at)?;

        Ok(Job {
            id: JobId::from(self.id),
            name: self.name,
            status: JobStatus::parse(&self.status),
            thumbnail_url: self.thumbnail_url,
            video_url: self.video_url,
            created_at,
            updated_at,
            duration: self.duration,
            error: self.error,
        })
    }
}

/// Fixed-width UTC form, so that text ordering is chronological ordering.
pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(id: &str, raw: &str) -> DatabaseResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| DatabaseError::CorruptRow {
            id: id.to_string(),
            reason: format!("bad timestamp '{}': {}", raw, e),
        })
}

/// Inserts a job, or merges remote-owned fields into the existing row.
///
/// On conflict the stored `name` and `created_at` are kept and `updated_at`
/// only moves forward.
pub fn upsert(db: &Database, job: &Job) -> DatabaseResult<()> {
    db.with_conn(|conn| {
        conn.execute(
            "INSERT INTO videos (id, name, status, thumbnail_url, video_url, created_at, updated_at, duration, error)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
             ON CONFLICT(id) DO UPDATE SET
               status = excluded.status,
               thumbnail_url = excluded.thumbnail_url,
               video_url = excluded.video_url,
               duration = excluded.duration,
               error = excluded.error,
               updated_at = MAX(videos.updated_at, excluded.updated_at)",
            params![
                job.id.as_str(),
                job.name,
                job.status.as_str(),
                job.thumbnail_url,
                job.video_url,
                format_timestamp(job.created_at),
                format_timestamp(job.updated_at),
                job.duration,
                job.error,
            ],
        )?;
        Ok(())
    })
}

/// Inserts a freshly submitted job. Returns `false` if the id already exists.
pub fn insert_submitted(db: &Database, job: &Job) -> DatabaseResult<bool> {
    db.with_conn(|conn| {
        let inserted = conn.execute(
            "INSERT INTO videos (id, name, status, thumbnail_url, video_url, created_at, updated_at, duration, error)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
             ON CONFLICT(id) DO NOTHING",
            params![
                job.id.as_str(),
                job.name,
                job.status.as_str(),
                job.thumbnail_url,
                job.video_url,
                format_timestamp(job.created_at),
                format_timestamp(job.updated_at),
                job.duration,
                job.error,
            ],
        )?;
        Ok(inserted > 0)
    })
}

/// Sets the display name. Returns `false` if no such job exists.
///
/// `title` must already be validated.
pub fn rename(db: &Database, id: &JobId, title: &str, now: DateTime<Utc>) -> DatabaseResult<bool> {
    db.with_conn(|conn| {
        let updated = conn.execute(
            "UPDATE videos SET name = ?2, updated_at = MAX(updated_at, ?3) WHERE id = ?1",
            params![id.as_str(), title, format_timestamp(now)],
        )?;
        Ok(updated > 0)
    })
}

/// Finds a job by id.
pub fn find_by_id(db: &Database, id: &JobId) -> DatabaseResult<Option<Job>> {
    let row = db.with_conn(|conn| {
        let row = conn
            .query_row(
                &format!("SELECT {} FROM videos WHERE id = ?1", COLUMNS),
                params![id.as_str()],
                JobRow::from_row,
            )
            .optional()?;
        Ok(row)
    })?;

    row.map(JobRow::into_job).transpose()
}

/// Most recently created jobs first.
pub fn list_recent(db: &Database, limit: u32) -> DatabaseResult<Vec<Job>> {
    let rows = db.with_conn(|conn| {
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM videos ORDER BY created_at DESC, id ASC LIMIT ?1",
            COLUMNS
        ))?;
        let rows = stmt
            .query_map(params![limit], JobRow::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    })?;

    rows.into_iter().map(JobRow::into_job).collect()
}

/// Number of stored jobs.
pub fn count(db: &Database) -> DatabaseResult<u64> {
    db.with_conn(|conn| {
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM videos", [], |r| r.get(0))?;
        Ok(count.max(0) as u64)
    })
}
