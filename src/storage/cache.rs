use std::path::Path;

use rusqlite::{Connection, Result as SqliteResult};
use thiserror::Error;

use crate::calendar::{Category, Event};

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] rusqlite::Error),
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// Offline snapshot of the hosted catalog. The whole catalog is small, so
/// the cache stores it wholesale: each refresh replaces every row.
pub struct Cache {
    conn: Connection,
}

impl Cache {
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    pub fn open(path: &Path) -> Result<Self, CacheError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).ok();
        }
        let cache = Self::new(Connection::open(path)?);
        cache.initialize()?;
        Ok(cache)
    }

    pub fn initialize(&self) -> Result<(), CacheError> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS events (
                id TEXT PRIMARY KEY,
                data TEXT NOT NULL,
                start_time TEXT NOT NULL
            )",
            [],
        )?;

        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS categories (
                id TEXT PRIMARY KEY,
                data TEXT NOT NULL
            )",
            [],
        )?;

        Ok(())
    }

    pub fn store_snapshot(
        &mut self,
        events: &[Event],
        categories: &[Category],
    ) -> Result<(), CacheError> {
        let tx = self.conn.transaction()?;

        tx.execute("DELETE FROM events", [])?;
        tx.execute("DELETE FROM categories", [])?;

        for event in events {
            let data = serde_json::to_string(event)?;
            tx.execute(
                "INSERT INTO events (id, data, start_time) VALUES (?1, ?2, ?3)",
                rusqlite::params![&event.id, &data, event.start_time.to_rfc3339()],
            )?;
        }

        for category in categories {
            let data = serde_json::to_string(category)?;
            tx.execute(
                "INSERT INTO categories (id, data) VALUES (?1, ?2)",
                rusqlite::params![&category.id, &data],
            )?;
        }

        tx.commit()?;
        Ok(())
    }

    pub fn load_events(&self) -> Result<Vec<Event>, CacheError> {
        let mut stmt = self
            .conn
            .prepare("SELECT data FROM events ORDER BY start_time")?;
        let mut rows = stmt.query([])?;

        let mut events = Vec::new();
        while let Some(row) = rows.next()? {
            let data: String = row.get(0)?;
            events.push(serde_json::from_str(&data)?);
        }
        Ok(events)
    }

    pub fn load_categories(&self) -> Result<Vec<Category>, CacheError> {
        let mut stmt = self.conn.prepare("SELECT data FROM categories")?;
        let mut rows = stmt.query([])?;

        let mut categories = Vec::new();
        while let Some(row) = rows.next()? {
            let data: String = row.get(0)?;
            categories.push(serde_json::from_str(&data)?);
        }
        Ok(categories)
    }

    pub fn table_exists(&self, table_name: &str) -> bool {
        let result: SqliteResult<i32> = self.conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?1",
            [table_name],
            |row| row.get(0),
        );
        result.unwrap_or(0) > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::event::test_support::*;

    fn create_test_cache() -> Cache {
        let conn = Connection::open_in_memory().unwrap();
        let cache = Cache::new(conn);
        cache.initialize().unwrap();
        cache
    }

    #[test]
    fn creates_database_schema() {
        let conn = Connection::open_in_memory().unwrap();
        let cache = Cache::new(conn);

        cache.initialize().unwrap();

        assert!(cache.table_exists("events"));
        assert!(cache.table_exists("categories"));
    }

    #[test]
    fn snapshot_round_trips_events_and_categories() {
        let mut cache = create_test_cache();
        let events = vec![
            event_at("e1", "WWDC 2024", utc(2024, 6, 10, 17, 0), None),
            event_at("e2", "Google I/O", utc(2024, 5, 14, 17, 0), None),
        ];
        let categories = vec![category("c1", "Conferences", "#007AFF")];

        cache.store_snapshot(&events, &categories).unwrap();

        let loaded_events = cache.load_events().unwrap();
        assert_eq!(loaded_events.len(), 2);
        // Rows come back ordered by start time, not insertion order.
        assert_eq!(loaded_events[0].id, "e2");
        assert_eq!(loaded_events[1].id, "e1");
        assert_eq!(cache.load_categories().unwrap(), categories);
    }

    #[test]
    fn store_snapshot_replaces_previous_rows() {
        let mut cache = create_test_cache();
        let first = vec![event_at("e1", "Old", utc(2024, 1, 1, 9, 0), None)];
        let second = vec![event_at("e2", "New", utc(2024, 2, 1, 9, 0), None)];
        cache.store_snapshot(&first, &[]).unwrap();

        cache.store_snapshot(&second, &[]).unwrap();

        let loaded = cache.load_events().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].id, "e2");
    }

    #[test]
    fn empty_cache_loads_nothing() {
        let cache = create_test_cache();

        assert!(cache.load_events().unwrap().is_empty());
        assert!(cache.load_categories().unwrap().is_empty());
    }
}
