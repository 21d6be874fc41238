//! Blob repository contract with SQLite and in-memory implementations.

use crate::db::DbError;
use rusqlite::{params, Connection, OptionalExtension};
use std::cell::RefCell;
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Persistence substrate failure.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Key-value store holding opaque text blobs.
pub trait BlobRepository {
    /// Returns the blob stored under `key`, if any.
    fn get(&self, key: &str) -> RepoResult<Option<String>>;
    /// Stores `blob` under `key`, replacing any previous value atomically.
    fn set(&self, key: &str, blob: &str) -> RepoResult<()>;
    /// Removes the blob under `key`. Missing keys are not an error.
    fn clear(&self, key: &str) -> RepoResult<()>;
}

impl<T: BlobRepository + ?Sized> BlobRepository for &T {
    fn get(&self, key: &str) -> RepoResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, blob: &str) -> RepoResult<()> {
        (**self).set(key, blob)
    }

    fn clear(&self, key: &str) -> RepoResult<()> {
        (**self).clear(key)
    }
}

/// SQLite-backed blob repository over the `kv_blobs` table.
pub struct SqliteBlobRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteBlobRepository<'conn> {
    /// Wraps a connection opened through `db::open_db*`.
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl BlobRepository for SqliteBlobRepository<'_> {
    fn get(&self, key: &str) -> RepoResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv_blobs WHERE key = ?1;",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, blob: &str) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO kv_blobs (key, value, updated_at)
             VALUES (?1, ?2, (strftime('%s', 'now') * 1000))
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at;",
            params![key, blob],
        )?;
        Ok(())
    }

    fn clear(&self, key: &str) -> RepoResult<()> {
        self.conn
            .execute("DELETE FROM kv_blobs WHERE key = ?1;", [key])?;
        Ok(())
    }
}

/// Process-local blob repository for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryBlobRepository {
    blobs: RefCell<HashMap<String, String>>,
}

impl MemoryBlobRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.blobs.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.blobs.borrow().is_empty()
    }
}

impl BlobRepository for MemoryBlobRepository {
    fn get(&self, key: &str) -> RepoResult<Option<String>> {
        Ok(self.blobs.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, blob: &str) -> RepoResult<()> {
        self.blobs
            .borrow_mut()
            .insert(key.to_string(), blob.to_string());
        Ok(())
    }

    fn clear(&self, key: &str) -> RepoResult<()> {
        self.blobs.borrow_mut().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{BlobRepository, MemoryBlobRepository, SqliteBlobRepository};
    use crate::db::open_db_in_memory;

    #[test]
    fn sqlite_set_get_overwrite_and_clear() {
        let conn = open_db_in_memory().unwrap();
        let repo = SqliteBlobRepository::new(&conn);

        assert_eq!(repo.get("k").unwrap(), None);
        repo.set("k", "first").unwrap();
        repo.set("k", "second").unwrap();
        assert_eq!(repo.get("k").unwrap().as_deref(), Some("second"));

        repo.clear("k").unwrap();
        repo.clear("k").unwrap();
        assert_eq!(repo.get("k").unwrap(), None);
    }

    #[test]
    fn memory_repository_through_shared_reference() {
        let repo = MemoryBlobRepository::new();
        let shared = &repo;
        shared.set("k", "v").unwrap();
        assert_eq!(repo.get("k").unwrap().as_deref(), Some("v"));
        assert_eq!(repo.len(), 1);
        shared.clear("k").unwrap();
        assert!(repo.is_empty());
    }
}
