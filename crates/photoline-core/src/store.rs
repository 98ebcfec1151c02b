//! Persistence for users and their uploaded photos.
//!
//! Two tables: `users(user_id PK)` and `photos(id PK AUTOINCREMENT, url,
//! user_id FK)`. Deleting a user cascades to its photos inside one explicit
//! transaction, so a partially applied cascade is never observable.

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::OptionalExtension;
use tracing::info;

use crate::error::StoreError;

pub type DbPool = Pool<SqliteConnectionManager>;

/// A platform user, keyed by the platform-issued identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub user_id: String,
}

/// One uploaded photo. Never mutated after insert; `id` is assigned by the
/// database in insertion order.
#[derive(Debug, Clone, PartialEq)]
pub struct Photo {
    pub id: i64,
    pub url: String,
    pub owner_id: String,
}

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS users (
    user_id TEXT PRIMARY KEY
);
CREATE TABLE IF NOT EXISTS photos (
    id      INTEGER PRIMARY KEY AUTOINCREMENT,
    url     TEXT NOT NULL,
    user_id TEXT NOT NULL REFERENCES users(user_id)
);
CREATE INDEX IF NOT EXISTS idx_photos_user ON photos(user_id);
";

/// Pooled handle to the photo store. Cheap to clone.
#[derive(Clone)]
pub struct PhotoStore {
    pool: DbPool,
}

impl PhotoStore {
    /// Open (creating if needed) the database at `path`.
    pub fn open(path: &str) -> Result<Self, StoreError> {
        let manager = SqliteConnectionManager::file(path);
        let pool = Pool::builder().max_size(10).build(manager)?;
        let store = Self { pool };
        store.init_schema()?;
        info!("Photo store opened at {}", path);
        Ok(store)
    }

    /// In-memory store for tests. A single pooled connection keeps every
    /// caller on the same database.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let manager = SqliteConnectionManager::memory();
        let pool = Pool::builder().max_size(1).build(manager)?;
        let store = Self { pool };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> Result<(), StoreError> {
        let conn = self.pool.get()?;
        conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    /// Create a user. A second create for the same id is rejected with
    /// `DuplicateUser`; Follow is deliberately not idempotent.
    pub fn create_user(&self, user_id: &str) -> Result<User, StoreError> {
        let conn = self.pool.get()?;
        match conn.execute("INSERT INTO users (user_id) VALUES (?1)", [user_id]) {
            Ok(_) => Ok(User {
                user_id: user_id.to_string(),
            }),
            Err(rusqlite::Error::SqliteFailure(e, _))
                if e.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                Err(StoreError::DuplicateUser(user_id.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Delete a user and every photo it owns, atomically.
    pub fn delete_user(&self, user_id: &str) -> Result<(), StoreError> {
        let mut conn = self.pool.get()?;
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM photos WHERE user_id = ?1", [user_id])?;
        let deleted = tx.execute("DELETE FROM users WHERE user_id = ?1", [user_id])?;
        if deleted == 0 {
            // Implicit rollback on drop.
            return Err(StoreError::UserNotFound(user_id.to_string()));
        }
        tx.commit()?;
        Ok(())
    }

    pub fn find_user(&self, user_id: &str) -> Result<Option<User>, StoreError> {
        let conn = self.pool.get()?;
        let user = conn
            .query_row(
                "SELECT user_id FROM users WHERE user_id = ?1",
                [user_id],
                |row| {
                    Ok(User {
                        user_id: row.get(0)?,
                    })
                },
            )
            .optional()?;
        Ok(user)
    }

    /// Append a photo to a user's collection. The owner is looked up inside
    /// the same transaction as the insert, so the foreign key can never
    /// reference a user deleted in between.
    pub fn add_photo(&self, owner_id: &str, url: &str) -> Result<Photo, StoreError> {
        let mut conn = self.pool.get()?;
        let tx = conn.transaction()?;
        let owner_exists: bool = tx
            .query_row(
                "SELECT 1 FROM users WHERE user_id = ?1",
                [owner_id],
                |_| Ok(true),
            )
            .optional()?
            .unwrap_or(false);
        if !owner_exists {
            return Err(StoreError::OwnerNotFound(owner_id.to_string()));
        }
        tx.execute(
            "INSERT INTO photos (url, user_id) VALUES (?1, ?2)",
            [url, owner_id],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;
        Ok(Photo {
            id,
            url: url.to_string(),
            owner_id: owner_id.to_string(),
        })
    }

    /// The most recently created photo for a user, by descending surrogate
    /// key, or `None`.
    pub fn latest_photo_for(&self, owner_id: &str) -> Result<Option<Photo>, StoreError> {
        let conn = self.pool.get()?;
        let photo = conn
            .query_row(
                "SELECT id, url, user_id FROM photos WHERE user_id = ?1 \
                 ORDER BY id DESC LIMIT 1",
                [owner_id],
                |row| {
                    Ok(Photo {
                        id: row.get(0)?,
                        url: row.get(1)?,
                        owner_id: row.get(2)?,
                    })
                },
            )
            .optional()?;
        Ok(photo)
    }

    /// Number of photos a user owns.
    pub fn photo_count_for(&self, owner_id: &str) -> Result<i64, StoreError> {
        let conn = self.pool.get()?;
        let count = conn.query_row(
            "SELECT COUNT(*) FROM photos WHERE user_id = ?1",
            [owner_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}
