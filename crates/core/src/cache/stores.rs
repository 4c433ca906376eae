//! Store-level operations: open, enumerate, delete.
//!
//! A store is a named bucket of entries. Deleting a store removes every
//! entry in it through the `ON DELETE CASCADE` foreign key.

use super::connection::CacheDb;
use crate::Error;
use tokio_rusqlite::params;

impl CacheDb {
    /// Open the named store, creating it if absent.
    pub async fn open_store(&self, name: &str) -> Result<(), Error> {
        let name = name.to_string();
        let created_at = chrono::Utc::now().to_rfc3339();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                let created = conn.execute(
                    "INSERT OR IGNORE INTO cache_stores (name, created_at) VALUES (?1, ?2)",
                    params![name, created_at],
                )?;
                if created > 0 {
                    tracing::debug!(store = %name, "created cache store");
                }
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Whether a store with this name exists.
    pub async fn has_store(&self, name: &str) -> Result<bool, Error> {
        let name = name.to_string();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let exists = conn.query_row(
                    "SELECT EXISTS(SELECT 1 FROM cache_stores WHERE name = ?1)",
                    params![name],
                    |row| row.get(0),
                )?;
                Ok(exists)
            })
            .await
            .map_err(Error::from)
    }

    /// Names of all stores, oldest first.
    pub async fn store_names(&self) -> Result<Vec<String>, Error> {
        self.conn
            .call(|conn| -> Result<Vec<String>, Error> {
                let mut stmt = conn.prepare("SELECT name FROM cache_stores ORDER BY created_at ASC, name ASC")?;
                let names = stmt
                    .query_map([], |row| row.get(0))?
                    .collect::<Result<Vec<String>, _>>()?;
                Ok(names)
            })
            .await
            .map_err(Error::from)
    }

    /// Delete a store and all of its entries.
    ///
    /// Returns false if no store had that name.
    pub async fn delete_store(&self, name: &str) -> Result<bool, Error> {
        let name = name.to_string();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let deleted = conn.execute("DELETE FROM cache_stores WHERE name = ?1", params![name])?;
                Ok(deleted > 0)
            })
            .await
            .map_err(Error::from)
    }

    /// Number of entries held by a store (0 for an unknown store).
    pub async fn entry_count(&self, name: &str) -> Result<u64, Error> {
        let name = name.to_string();
        self.conn
            .call(move |conn| -> Result<u64, Error> {
                let count: i64 =
                    conn.query_row("SELECT COUNT(*) FROM cache_entries WHERE store = ?1", params![name], |row| {
                        row.get(0)
                    })?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Request, Response};
    use url::Url;

    #[tokio::test]
    async fn test_open_is_idempotent() {
        let db = CacheDb::open_in_memory().await.unwrap();
        db.open_store("aramaps-v1").await.unwrap();
        db.open_store("aramaps-v1").await.unwrap();

        assert_eq!(db.store_names().await.unwrap(), vec!["aramaps-v1"]);
        assert!(db.has_store("aramaps-v1").await.unwrap());
        assert!(!db.has_store("aramaps-v0").await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_missing_store_is_noop() {
        let db = CacheDb::open_in_memory().await.unwrap();
        assert!(!db.delete_store("never-created").await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_cascades_entries() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let request = Request::get(Url::parse("https://example.com/a.png").unwrap());
        let response = Response::new("https://example.com/a.png", 200, vec![0u8; 4]);
        db.put_entry("aramaps-v0", &request, &response).await.unwrap();
        assert_eq!(db.entry_count("aramaps-v0").await.unwrap(), 1);

        assert!(db.delete_store("aramaps-v0").await.unwrap());
        assert!(!db.has_store("aramaps-v0").await.unwrap());
        assert_eq!(db.entry_count("aramaps-v0").await.unwrap(), 0);
    }
}
