use chrono::{DateTime, SecondsFormat, Utc};
use log::{debug, info};
use rusqlite::{params, types::Type, Connection, Row};
use std::path::Path;

use crate::app_dirs::AppDirs;
use crate::error::StoreError;
use crate::summary::{SessionId, SessionSummary};

/// Batch size used when paging through saved sessions
pub const PAGE_SIZE: usize = 100;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortOrder {
    OldestFirst,
    NewestFirst,
}

impl SortOrder {
    fn sql(self) -> &'static str {
        match self {
            SortOrder::OldestFirst => "ASC",
            SortOrder::NewestFirst => "DESC",
        }
    }
}

/// Durable storage for saved session summaries
pub trait SessionStore {
    fn insert(&self, summary: &SessionSummary) -> Result<(), StoreError>;

    fn get(&self, id: SessionId) -> Result<Option<SessionSummary>, StoreError>;

    /// One batch of summaries sorted by date
    fn page(
        &self,
        order: SortOrder,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<SessionSummary>, StoreError>;

    fn count(&self) -> Result<usize, StoreError>;

    /// Replaces the labels of a saved session; numeric fields are never touched
    fn update_labels(
        &self,
        id: SessionId,
        bag_type: &str,
        throwing_style: Option<&str>,
    ) -> Result<(), StoreError>;

    fn delete(&self, id: SessionId) -> Result<(), StoreError>;

    /// Every saved session, fetched in batches of [`PAGE_SIZE`]
    fn load_all(&self, order: SortOrder) -> Result<Vec<SessionSummary>, StoreError> {
        let mut all = Vec::new();
        loop {
            let batch = self.page(order, all.len(), PAGE_SIZE)?;
            let done = batch.len() < PAGE_SIZE;
            all.extend(batch);
            if done {
                return Ok(all);
            }
        }
    }
}

/// SQLite-backed session store
#[derive(Debug)]
pub struct SqliteSessionStore {
    conn: Connection,
}

impl SqliteSessionStore {
    /// Open (creating if needed) the database under the default state directory
    pub fn open_default() -> Result<Self, StoreError> {
        let path = AppDirs::db_path().unwrap_or_else(|| "bags_sessions.db".into());
        Self::open(path)
    }

    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        debug!("opening session database at {}", path.display());
        Self::init(Connection::open(path)?)
    }

    pub fn in_memory() -> Result<Self, StoreError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS practice_sessions (
                id TEXT PRIMARY KEY,
                date TEXT NOT NULL,
                points_per_round REAL NOT NULL,
                total_bags_in_hole INTEGER NOT NULL,
                bags_on_board INTEGER NOT NULL,
                bags_off_board INTEGER NOT NULL,
                four_baggers INTEGER NOT NULL,
                bag_type TEXT NOT NULL,
                throwing_style TEXT
            )
            "#,
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_practice_sessions_date ON practice_sessions(date)",
            [],
        )?;

        Ok(Self { conn })
    }

    fn from_row(row: &Row) -> rusqlite::Result<SessionSummary> {
        let id: String = row.get(0)?;
        let id = SessionId::parse_str(&id)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(0, Type::Text, Box::new(e)))?;
        let date: String = row.get(1)?;
        let date = DateTime::parse_from_rfc3339(&date)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(1, Type::Text, Box::new(e)))?
            .with_timezone(&Utc);

        Ok(SessionSummary {
            id,
            date,
            points_per_round: row.get(2)?,
            total_bags_in_hole: row.get(3)?,
            bags_on_board: row.get(4)?,
            bags_off_board: row.get(5)?,
            four_baggers: row.get(6)?,
            bag_type: row.get(7)?,
            throwing_style: row.get(8)?,
        })
    }
}

/// Fixed-width UTC timestamps sort lexicographically in date order
fn encode_date(date: &DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

const COLUMNS: &str = "id, date, points_per_round, total_bags_in_hole, bags_on_board, \
                       bags_off_board, four_baggers, bag_type, throwing_style";

impl SessionStore for SqliteSessionStore {
    fn insert(&self, summary: &SessionSummary) -> Result<(), StoreError> {
        self.conn.execute(
            &format!(
                "INSERT INTO practice_sessions ({COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)"
            ),
            params![
                summary.id.to_string(),
                encode_date(&summary.date),
                summary.points_per_round,
                summary.total_bags_in_hole,
                summary.bags_on_board,
                summary.bags_off_board,
                summary.four_baggers,
                summary.bag_type,
                summary.throwing_style,
            ],
        )?;
        info!(
            "saved session {} ({:.2} ppr, bag '{}')",
            summary.id, summary.points_per_round, summary.bag_type
        );
        Ok(())
    }

    fn get(&self, id: SessionId) -> Result<Option<SessionSummary>, StoreError> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {COLUMNS} FROM practice_sessions WHERE id = ?1"))?;
        let mut rows = stmt.query_map([id.to_string()], Self::from_row)?;
        Ok(rows.next().transpose()?)
    }

    fn page(
        &self,
        order: SortOrder,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<SessionSummary>, StoreError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {COLUMNS} FROM practice_sessions ORDER BY date {dir}, rowid {dir} LIMIT ?1 OFFSET ?2",
            dir = order.sql()
        ))?;

        // Offsets past i64::MAX cannot match any row
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let offset = i64::try_from(offset).unwrap_or(i64::MAX);
        let rows = stmt.query_map(params![limit, offset], Self::from_row)?;

        let mut sessions = Vec::new();
        for row in rows {
            sessions.push(row?);
        }
        Ok(sessions)
    }

    fn count(&self) -> Result<usize, StoreError> {
        let count: i64 =
            self.conn
                .query_row("SELECT COUNT(*) FROM practice_sessions", [], |row| row.get(0))?;
        usize::try_from(count).map_err(|_| StoreError::Corrupt(format!("negative count {count}")))
    }

    fn update_labels(
        &self,
        id: SessionId,
        bag_type: &str,
        throwing_style: Option<&str>,
    ) -> Result<(), StoreError> {
        let changed = self.conn.execute(
            "UPDATE practice_sessions SET bag_type = ?1, throwing_style = ?2 WHERE id = ?3",
            params![bag_type, throwing_style, id.to_string()],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound(id));
        }
        info!("relabelled session {id} as bag '{bag_type}'");
        Ok(())
    }

    fn delete(&self, id: SessionId) -> Result<(), StoreError> {
        let changed = self.conn.execute(
            "DELETE FROM practice_sessions WHERE id = ?1",
            [id.to_string()],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound(id));
        }
        info!("deleted session {id}");
        Ok(())
    }
}
