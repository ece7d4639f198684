use anyhow::{Context, Result};
use rusqlite::Connection;

use crate::record::MetricsRecord;

pub const DB_PATH: &str = "data/metrics.sqlite";

pub fn connect(path: &str) -> Result<Connection> {
    if let Some(dir) = std::path::Path::new(path).parent() {
        if !dir.as_os_str().is_empty() {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create {}", dir.display()))?;
        }
    }
    let conn = Connection::open(path)?;
    conn.execute_batch("PRAGMA journal_mode=WAL;")?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS snapshots (
            id            INTEGER PRIMARY KEY,
            root          TEXT NOT NULL,
            parsed_at     TEXT NOT NULL,
            results       TEXT NOT NULL,
            architecture  TEXT NOT NULL,
            recorded_at   TEXT NOT NULL DEFAULT (datetime('now'))
        );
        CREATE INDEX IF NOT EXISTS idx_snapshots_root ON snapshots(root);
        ",
    )?;
    Ok(())
}

// ── Snapshots ──

pub struct SnapshotRow {
    pub id: i64,
    pub root: String,
    pub parsed_at: String,
    pub results: String,
    pub architecture: String,
}

pub fn save_snapshot(conn: &Connection, root: &str, record: &MetricsRecord) -> Result<i64> {
    let results = serde_json::to_string(&record.results)?;
    let architecture = serde_json::to_string(&record.architecture)?;
    conn.execute(
        "INSERT INTO snapshots (root, parsed_at, results, architecture)
         VALUES (?1, ?2, ?3, ?4)",
        rusqlite::params![root, record.parsed_at.to_rfc3339(), results, architecture],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn fetch_snapshots(conn: &Connection, limit: usize) -> Result<Vec<SnapshotRow>> {
    let sql = format!(
        "SELECT id, root, parsed_at, results, architecture
         FROM snapshots
         ORDER BY id DESC
         LIMIT {}",
        limit
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map([], snapshot_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Most recent snapshot for one project root.
pub fn fetch_latest(conn: &Connection, root: &str) -> Result<Option<SnapshotRow>> {
    let mut stmt = conn.prepare(
        "SELECT id, root, parsed_at, results, architecture
         FROM snapshots
         WHERE root = ?1
         ORDER BY id DESC
         LIMIT 1",
    )?;
    let mut rows = stmt.query_map([root], snapshot_from_row)?;
    Ok(rows.next().transpose()?)
}

fn snapshot_from_row(row: &rusqlite::Row) -> rusqlite::Result<SnapshotRow> {
    Ok(SnapshotRow {
        id: row.get(0)?,
        root: row.get(1)?,
        parsed_at: row.get(2)?,
        results: row.get(3)?,
        architecture: row.get(4)?,
    })
}

/// Rebuild a record from a stored snapshot.
pub fn load_record(row: &SnapshotRow) -> Result<MetricsRecord> {
    let parsed_at = chrono::DateTime::parse_from_rfc3339(&row.parsed_at)
        .with_context(|| format!("Bad timestamp in snapshot {}", row.id))?
        .with_timezone(&chrono::Local);
    Ok(MetricsRecord {
        results: serde_json::from_str(&row.results)?,
        architecture: serde_json::from_str(&row.architecture)?,
        parsed_at,
    })
}

// ── Stats ──

pub struct Stats {
    pub snapshots: usize,
    pub roots: usize,
    /// UTC `recorded_at` of the newest snapshot.
    pub latest: Option<String>,
}

pub fn get_stats(conn: &Connection) -> Result<Stats> {
    let snapshots: usize = conn.query_row("SELECT COUNT(*) FROM snapshots", [], |r| r.get(0))?;
    let roots: usize =
        conn.query_row("SELECT COUNT(DISTINCT root) FROM snapshots", [], |r| r.get(0))?;
    let latest: Option<String> =
        conn.query_row("SELECT MAX(recorded_at) FROM snapshots", [], |r| r.get(0))?;
    Ok(Stats {
        snapshots,
        roots,
        latest,
    })
}
