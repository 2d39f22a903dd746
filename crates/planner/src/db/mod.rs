/// Database module for persisting scraped section rows per term

use rusqlite::{Connection, OptionalExtension};
use std::path::Path;
use std::sync::Mutex;
use tracing::info;

use crate::planner::error::{PlannerError, Result};
use crate::planner::{Catalog, CatalogBuilder, Meeting, SectionKind, SectionRow};

const SCHEMA_SQL: &str = include_str!("../../../../sql/init_catalog.sql");

pub struct CatalogStore {
    db: Mutex<Connection>,
}

impl CatalogStore {
    /// Opens (or creates) the store and initializes the schema
    pub fn new(db_path: &Path) -> Result<Self> {
        Self::with_connection(Connection::open(db_path)?)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA_SQL)?;
        Ok(Self {
            db: Mutex::new(conn),
        })
    }

    /// Checks if a term already has rows in the database
    pub fn term_has_data(&self, term: &str) -> Result<bool> {
        let db = self.db.lock().unwrap();
        let found = db
            .query_row(
                "SELECT 1 FROM section_rows WHERE term = ? LIMIT 1",
                [term],
                |row| row.get::<_, i64>(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    /// Appends rows for a term, preserving their order
    pub fn insert_rows(&self, term: &str, rows: &[SectionRow]) -> Result<usize> {
        if rows.is_empty() {
            return Ok(0);
        }

        let mut db = self.db.lock().unwrap();
        let tx = db.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO section_rows (
                    term, course, section_type, identifier, lecture,
                    days, time, building, room, seats, created_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, datetime('now'))",
            )?;

            for row in rows {
                stmt.execute((
                    term,
                    &row.course,
                    row.kind.code(),
                    &row.identifier,
                    &row.lecture,
                    &row.meeting.days,
                    &row.meeting.time,
                    &row.meeting.building,
                    &row.meeting.room,
                    &row.meeting.seats,
                ))?;
            }
        }
        tx.commit()?;

        info!("Stored {} section rows for term {}", rows.len(), term);
        Ok(rows.len())
    }

    /// Gets all rows for a term in insertion order
    pub fn load_rows(&self, term: &str) -> Result<Vec<SectionRow>> {
        let db = self.db.lock().unwrap();
        let mut stmt = db.prepare(
            "SELECT course, section_type, identifier, lecture,
                    days, time, building, room, seats
             FROM section_rows
             WHERE term = ?
             ORDER BY row_id",
        )?;

        let raw = stmt
            .query_map([term], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, Option<String>>(3)?,
                    Meeting {
                        days: row.get(4)?,
                        time: row.get(5)?,
                        building: row.get(6)?,
                        room: row.get(7)?,
                        seats: row.get(8)?,
                    },
                ))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        raw.into_iter()
            .map(|(course, kind, identifier, lecture, meeting)| {
                let kind = SectionKind::from_code(&kind).ok_or_else(|| PlannerError::InvalidRecord {
                    message: format!("unknown section type {kind:?} for {course} {identifier}"),
                })?;
                Ok(SectionRow {
                    course,
                    kind,
                    identifier,
                    lecture,
                    meeting,
                })
            })
            .collect()
    }

    /// Folds a term's rows into a catalog
    pub fn load_catalog(&self, term: &str) -> Result<Catalog> {
        let rows = self.load_rows(term)?;
        info!("Loaded {} section rows for term {}", rows.len(), term);
        CatalogBuilder::from_rows(rows)
    }

    /// Removes every row of a term, returning how many were deleted
    pub fn clear_term(&self, term: &str) -> Result<usize> {
        let db = self.db.lock().unwrap();
        Ok(db.execute("DELETE FROM section_rows WHERE term = ?", [term])?)
    }
}
