use crate::app_dirs::AppDirs;
use crate::error::{StoreError, StoreResult};
use crate::session::PracticeSession;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Persistence collaborator for practice sessions. Writes are whole-session snapshots.
pub trait SessionStore {
    fn create_session(&mut self, session: &PracticeSession) -> StoreResult<()>;
    /// The unfinished session, if any. Counters are rebuilt from the throw history.
    fn get_active_session(&self) -> StoreResult<Option<PracticeSession>>;
    fn update_session(&mut self, session: &PracticeSession) -> StoreResult<()>;
    /// Newest first
    fn get_all_sessions(&self) -> StoreResult<Vec<PracticeSession>>;
    fn delete_session(&mut self, id: &str) -> StoreResult<()>;
}

/// SQLite-backed session store
#[derive(Debug)]
pub struct SqliteSessionStore {
    conn: Connection,
}

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS practice_sessions (
        id TEXT PRIMARY KEY,
        session_type TEXT NOT NULL,
        is_complete BOOLEAN NOT NULL,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL,
        snapshot TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_practice_sessions_active
        ON practice_sessions(is_complete, updated_at);
"#;

impl SqliteSessionStore {
    /// Opens the store at the default state location
    pub fn open_default() -> StoreResult<Self> {
        let path = AppDirs::db_path().unwrap_or_else(|| PathBuf::from("kubb_sessions.db"));
        Self::open(path)
    }

    pub fn open<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        debug!(path = %path.display(), "opening session store");
        Self::with_connection(Connection::open(path)?)
    }

    pub fn open_in_memory() -> StoreResult<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> StoreResult<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    fn decode(snapshot: &str) -> StoreResult<PracticeSession> {
        let mut session: PracticeSession = serde_json::from_str(snapshot)?;
        session.restore();
        Ok(session)
    }

    fn write(&mut self, session: &PracticeSession) -> StoreResult<usize> {
        let snapshot = serde_json::to_string(session)?;
        let changed = self.conn.execute(
            r#"
            INSERT INTO practice_sessions
            (id, session_type, is_complete, created_at, updated_at, snapshot)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ON CONFLICT(id) DO UPDATE SET
                session_type = excluded.session_type,
                is_complete = excluded.is_complete,
                updated_at = excluded.updated_at,
                snapshot = excluded.snapshot
            "#,
            params![
                session.id,
                session.session_type.to_string(),
                session.is_complete,
                session.created_at.to_rfc3339(),
                session.updated_at.to_rfc3339(),
                snapshot,
            ],
        )?;
        Ok(changed)
    }

    fn exists(&self, id: &str) -> StoreResult<bool> {
        let found = self
            .conn
            .query_row(
                "SELECT 1 FROM practice_sessions WHERE id = ?1",
                [id],
                |_| Ok(()),
            )
            .optional()?;
        Ok(found.is_some())
    }
}

impl SessionStore for SqliteSessionStore {
    fn create_session(&mut self, session: &PracticeSession) -> StoreResult<()> {
        self.write(session)?;
        debug!(id = %session.id, "session stored");
        Ok(())
    }

    fn get_active_session(&self) -> StoreResult<Option<PracticeSession>> {
        let snapshot: Option<String> = self
            .conn
            .query_row(
                r#"
                SELECT snapshot FROM practice_sessions
                WHERE is_complete = 0
                ORDER BY updated_at DESC
                LIMIT 1
                "#,
                [],
                |row| row.get(0),
            )
            .optional()?;
        snapshot.as_deref().map(Self::decode).transpose()
    }

    fn update_session(&mut self, session: &PracticeSession) -> StoreResult<()> {
        if !self.exists(&session.id)? {
            return Err(StoreError::NotFound(session.id.clone()));
        }
        self.write(session)?;
        Ok(())
    }

    fn get_all_sessions(&self) -> StoreResult<Vec<PracticeSession>> {
        let mut stmt = self.conn.prepare(
            "SELECT snapshot FROM practice_sessions ORDER BY created_at DESC, updated_at DESC",
        )?;
        let snapshots = stmt.query_map([], |row| row.get::<_, String>(0))?;

        let mut sessions = Vec::new();
        for snapshot in snapshots {
            sessions.push(Self::decode(&snapshot?)?);
        }
        Ok(sessions)
    }

    fn delete_session(&mut self, id: &str) -> StoreResult<()> {
        let removed = self
            .conn
            .execute("DELETE FROM practice_sessions WHERE id = ?1", [id])?;
        if removed == 0 {
            return Err(StoreError::NotFound(id.to_string()));
        }
        debug!(id, "session deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionType;
    use crate::throws::ThrowInput;
    use assert_matches::assert_matches;
    use tempfile::tempdir;

    #[test]
    fn test_create_and_get_active() {
        let mut store = SqliteSessionStore::open_in_memory().unwrap();
        assert!(store.get_active_session().unwrap().is_none());

        let session = PracticeSession::new(SessionType::Standard, 30, None);
        store.create_session(&session).unwrap();

        let active = store.get_active_session().unwrap().unwrap();
        assert_eq!(active, session);
    }

    #[test]
    fn test_update_replaces_snapshot() {
        let mut store = SqliteSessionStore::open_in_memory().unwrap();
        let mut session = PracticeSession::new(SessionType::Standard, 6, None);
        store.create_session(&session).unwrap();

        for _ in 0..6 {
            session.record_throw(ThrowInput::hit());
        }
        store.update_session(&session).unwrap();
        let loaded = store.get_active_session().unwrap().unwrap();
        assert_eq!(loaded.total_batons, 6);
        assert!(loaded.rounds[0].is_complete);

        session.complete_session();
        store.update_session(&session).unwrap();
        assert!(store.get_active_session().unwrap().is_none());
        assert_eq!(store.get_all_sessions().unwrap().len(), 1);
    }

    #[test]
    fn test_update_unknown_session_fails() {
        let mut store = SqliteSessionStore::open_in_memory().unwrap();
        let session = PracticeSession::new(SessionType::Standard, 30, None);
        assert_matches!(
            store.update_session(&session),
            Err(StoreError::NotFound(id)) if id == session.id
        );
    }

    #[test]
    fn test_delete_session() {
        let mut store = SqliteSessionStore::open_in_memory().unwrap();
        let session = PracticeSession::new(SessionType::InkastBlast, 30, Some(10));
        store.create_session(&session).unwrap();
        store.delete_session(&session.id).unwrap();
        assert!(store.get_all_sessions().unwrap().is_empty());
        assert_matches!(
            store.delete_session(&session.id),
            Err(StoreError::NotFound(_))
        );
    }

    #[test]
    fn test_loaded_counters_rebuilt_from_history() {
        let mut store = SqliteSessionStore::open_in_memory().unwrap();
        let mut session = PracticeSession::new(SessionType::AroundThePitch, 11, Some(21));
        session.record_throw(ThrowInput::hit());
        session.record_throw(ThrowInput::hit());
        let mut tampered = session.clone();
        tampered.total_batons = 40;
        store.create_session(&tampered).unwrap();

        let loaded = store.get_active_session().unwrap().unwrap();
        assert_eq!(loaded.total_batons, 2);
        assert_eq!(loaded.pitch_board(), session.pitch_board());
    }

    #[test]
    fn test_file_store_persists_across_opens() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("sessions.db");
        let session = PracticeSession::new(SessionType::Standard, 30, None);
        {
            let mut store = SqliteSessionStore::open(&path).unwrap();
            store.create_session(&session).unwrap();
        }
        let store = SqliteSessionStore::open(&path).unwrap();
        assert_eq!(store.get_active_session().unwrap().unwrap().id, session.id);
    }
}
