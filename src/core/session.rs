//! Connection provider: one short-lived database session per operation

use rusqlite::Connection;
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::core::error::{CoreError, Result};

/// How long a statement waits on a locked database before failing
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Hands out database sessions
///
/// Callers acquire a session at the start of an operation and drop it before
/// returning; the connection is released on every exit path.
pub trait SessionProvider {
    fn acquire(&self) -> Result<Session>;
}

/// An open database session
pub struct Session {
    conn: Connection,
}

impl Session {
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }
}

impl Deref for Session {
    type Target = Connection;

    fn deref(&self) -> &Connection {
        &self.conn
    }
}

/// Opens a fresh connection to a SQLite file for each session
#[derive(Debug, Clone)]
pub struct SqliteProvider {
    path: PathBuf,
}

impl SqliteProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionProvider for SqliteProvider {
    fn acquire(&self) -> Result<Session> {
        let conn = Connection::open(&self.path).map_err(CoreError::DataAccess)?;
        conn.busy_timeout(BUSY_TIMEOUT)
            .map_err(CoreError::DataAccess)?;
        tracing::trace!(path = %self.path.display(), "session acquired");
        Ok(Session::new(conn))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_sessions_share_the_file() {
        let tmp = TempDir::new().unwrap();
        let provider = SqliteProvider::new(tmp.path().join("company.db"));

        {
            let session = provider.acquire().unwrap();
            session
                .execute_batch("CREATE TABLE ADMIN (ssn TEXT PRIMARY KEY); INSERT INTO ADMIN VALUES ('888665555');")
                .unwrap();
        }

        let session = provider.acquire().unwrap();
        let count: i64 = session
            .query_row("SELECT COUNT(*) FROM ADMIN", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_unopenable_path_is_data_access_error() {
        let tmp = TempDir::new().unwrap();
        let provider = SqliteProvider::new(tmp.path().join("missing").join("company.db"));
        assert!(matches!(provider.acquire(), Err(CoreError::DataAccess(_))));
    }
}
