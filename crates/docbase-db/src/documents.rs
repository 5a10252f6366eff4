use std::sync::Arc;

use tracing::info;

use docbase_types::Document;

use crate::error::DbError;
use crate::Database;

/// Persists document records and answers listing and name-substring
/// queries. Records are created and deleted, never edited in place.
pub struct DocumentStore {
    db: Arc<Database>,
}

impl DocumentStore {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Insert a record and return its assigned id. Duplicate field values
    /// are allowed; non-emptiness is enforced by the caller.
    pub fn add_document(
        &self,
        name: &str,
        content: &str,
        keywords: &str,
        category: &str,
    ) -> Result<i64, DbError> {
        let id = self.db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO documents (name, content, keywords, category) VALUES (?1, ?2, ?3, ?4)",
                rusqlite::params![name, content, keywords, category],
            )?;
            Ok(conn.last_insert_rowid())
        })?;

        info!(id, name, "added document");
        Ok(id)
    }

    /// All documents in insertion order, read fresh per call.
    pub fn list_documents(&self) -> Result<Vec<Document>, DbError> {
        self.db.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, name, content, keywords, category FROM documents ORDER BY id",
            )?;
            let rows = stmt
                .query_map([], |row| {
                    Ok(Document {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        content: row.get(2)?,
                        keywords: row.get(3)?,
                        category: row.get(4)?,
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Case-insensitive substring filter on the `name` field only.
    /// An empty query matches every document. This is a client-side pass
    /// over the full listing, not an indexed search; keywords are never
    /// consulted.
    pub fn search_documents(&self, query: &str) -> Result<Vec<Document>, DbError> {
        let needle = query.to_lowercase();
        let docs = self
            .list_documents()?
            .into_iter()
            .filter(|doc| doc.name.to_lowercase().contains(&needle))
            .collect();
        Ok(docs)
    }

    /// Delete by id. Reports `DocumentNotFound` when no row existed, so
    /// callers get a true found/absent distinction.
    pub fn delete_document(&self, id: i64) -> Result<(), DbError> {
        let affected = self.db.with_conn(|conn| {
            Ok(conn.execute("DELETE FROM documents WHERE id = ?1", [id])?)
        })?;

        if affected == 0 {
            return Err(DbError::DocumentNotFound(id));
        }

        info!(id, "deleted document");
        Ok(())
    }
}
