//! Entry operations: match and put.
//!
//! Entries are keyed by `(store, key_hash)` where the hash covers the
//! request method and URL. A put replaces the whole entry.

use super::connection::CacheDb;
use super::hash::compute_request_key;
use crate::{Error, Request, Response};
use tokio_rusqlite::rusqlite::{self, OptionalExtension};
use tokio_rusqlite::params;
use url::Url;

const UPSERT_ENTRY: &str = "INSERT INTO cache_entries (
        store, key_hash, method, url, status, headers_json, body, stored_at
    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
    ON CONFLICT(store, key_hash) DO UPDATE SET
        method = excluded.method,
        url = excluded.url,
        status = excluded.status,
        headers_json = excluded.headers_json,
        body = excluded.body,
        stored_at = excluded.stored_at";

const ENSURE_STORE: &str = "INSERT OR IGNORE INTO cache_stores (name, created_at) VALUES (?1, ?2)";

/// A stored request/response pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    pub store: String,
    pub key_hash: String,
    pub request: Request,
    pub response: Response,
    pub stored_at: String,
}

/// Owned, SQL-ready form of one entry.
struct EntryRow {
    key_hash: String,
    method: String,
    request_url: String,
    status: u16,
    headers_json: String,
    body: Vec<u8>,
}

impl EntryRow {
    fn new(request: &Request, response: &Response) -> Result<Self, Error> {
        // headers_json holds (response url, headers)
        let headers_json = serde_json::to_string(&(&response.url, &response.headers))
            .map_err(|e| Error::InvalidInput(format!("unserializable headers: {e}")))?;
        Ok(Self {
            key_hash: compute_request_key(request.method(), request.url().as_str()),
            method: request.method().to_string(),
            request_url: request.url().to_string(),
            status: response.status,
            headers_json,
            body: response.body.to_vec(),
        })
    }

    fn write(&self, conn: &rusqlite::Connection, store: &str, stored_at: &str) -> Result<(), rusqlite::Error> {
        conn.execute(
            UPSERT_ENTRY,
            params![
                store,
                &self.key_hash,
                &self.method,
                &self.request_url,
                self.status,
                &self.headers_json,
                &self.body,
                stored_at,
            ],
        )?;
        tracing::trace!(store, url = %self.request_url, "stored cache entry");
        Ok(())
    }
}

/// An entry as read back from SQLite, before decoding.
struct RawEntry {
    store: String,
    key_hash: String,
    method: String,
    url: String,
    status: u16,
    headers_json: String,
    body: Vec<u8>,
    stored_at: String,
}

impl RawEntry {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            store: row.get(0)?,
            key_hash: row.get(1)?,
            method: row.get(2)?,
            url: row.get(3)?,
            status: row.get(4)?,
            headers_json: row.get(5)?,
            body: row.get(6)?,
            stored_at: row.get(7)?,
        })
    }

    fn decode(self) -> Result<CacheEntry, Error> {
        let url = self.url;
        let request_url = Url::parse(&url).map_err(|e| Error::CorruptEntry(format!("{url}: {e}")))?;
        let (response_url, headers): (String, Vec<(String, String)>) =
            serde_json::from_str(&self.headers_json).map_err(|e| Error::CorruptEntry(format!("{url}: {e}")))?;

        Ok(CacheEntry {
            store: self.store,
            key_hash: self.key_hash,
            request: Request::new(&self.method, request_url),
            response: Response { url: response_url, status: self.status, headers, body: self.body.into() },
            stored_at: self.stored_at,
        })
    }
}

impl CacheDb {
    /// Store one entry, creating the store if needed and replacing any
    /// previous entry for the same request.
    pub async fn put_entry(&self, store: &str, request: &Request, response: &Response) -> Result<(), Error> {
        let row = EntryRow::new(request, response)?;
        let store = store.to_string();
        let now = chrono::Utc::now().to_rfc3339();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(ENSURE_STORE, params![&store, &now])?;
                row.write(conn, &store, &now)?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Store several entries in one transaction. Either every entry is
    /// written or none is.
    pub async fn put_entries(&self, store: &str, entries: &[(Request, Response)]) -> Result<(), Error> {
        let rows = entries
            .iter()
            .map(|(request, response)| EntryRow::new(request, response))
            .collect::<Result<Vec<_>, _>>()?;
        let store = store.to_string();
        let now = chrono::Utc::now().to_rfc3339();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                let tx = conn.transaction()?;
                tx.execute(ENSURE_STORE, params![&store, &now])?;
                for row in &rows {
                    row.write(&tx, &store, &now)?;
                }
                tx.commit()?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Look up the entry for a request in a store.
    ///
    /// Returns None if the store or the entry doesn't exist.
    pub async fn get_entry(&self, store: &str, request: &Request) -> Result<Option<CacheEntry>, Error> {
        let store = store.to_string();
        let key_hash = compute_request_key(request.method(), request.url().as_str());
        let raw = self
            .conn
            .call(move |conn| -> Result<Option<RawEntry>, Error> {
                let raw = conn
                    .query_row(
                        "SELECT store, key_hash, method, url, status, headers_json, body, stored_at
                         FROM cache_entries WHERE store = ?1 AND key_hash = ?2",
                        params![store, key_hash],
                        RawEntry::from_row,
                    )
                    .optional()?;
                Ok(raw)
            })
            .await
            .map_err(Error::from)?;

        raw.map(RawEntry::decode).transpose()
    }

    /// Look up only the response for a request.
    pub async fn match_entry(&self, store: &str, request: &Request) -> Result<Option<Response>, Error> {
        Ok(self.get_entry(store, request).await?.map(|entry| entry.response))
    }
}
