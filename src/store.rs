//! The embedded tabular store: a thin contract over a SQLite file
//! holding a single `pairs(key TEXT, value TEXT)` table, configured for
//! throughput over durability (no journal, async fsync, no locking
//! escalation).

use std::path::{Path, PathBuf};

use rusqlite::{params, Connection};

use crate::error::EngineError;
use crate::pair::Pair;

const SCHEMA: &str = "CREATE TABLE pairs(key TEXT, value TEXT)";
const PRAGMAS: &str = "PRAGMA journal_mode=OFF; PRAGMA synchronous=OFF; PRAGMA locking_mode=NORMAL;";

/// A single shard file: a `pairs` table with no indices.
pub struct Store {
    conn: Connection,
    path: PathBuf,
}

impl Store {
    /// Creates a new shard file. Fails if `path` already exists.
    pub fn create(path: &Path) -> Result<Store, EngineError> {
        if path.exists() {
            return Err(EngineError::Store(format!(
                "shard already exists: {}",
                path.display()
            )));
        }
        let conn = Connection::open(path).map_err(|e| EngineError::Store(e.to_string()))?;
        conn.execute_batch(PRAGMAS)?;
        conn.execute(SCHEMA, [])?;
        Ok(Store {
            conn,
            path: path.to_path_buf(),
        })
    }

    /// Opens an existing shard file.
    pub fn open(path: &Path) -> Result<Store, EngineError> {
        if !path.exists() {
            return Err(EngineError::Store(format!(
                "no such shard: {}",
                path.display()
            )));
        }
        let conn = Connection::open(path).map_err(|e| EngineError::Store(e.to_string()))?;
        conn.execute_batch(PRAGMAS)?;
        Ok(Store {
            conn,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Unordered, forward-only scan in the store's natural row order
    /// (insertion / rowid order). Used by the Splitter, which must
    /// preserve input order rather than sort by key.
    pub fn scan(&self, mut f: impl FnMut(Pair) -> Result<(), EngineError>) -> Result<(), EngineError> {
        let mut stmt = self.conn.prepare("SELECT key, value FROM pairs")?;
        let mut rows = stmt.query([])?;
        while let Some(row) = rows.next()? {
            let key: String = row.get(0)?;
            let value: String = row.get(1)?;
            f(Pair { key, value })?;
        }
        Ok(())
    }

    /// Scan ordered ascending by `(key, value)`, used by the Grouping
    /// Coroutine to turn a shard into consecutive key groups.
    pub fn scan_ordered(
        &self,
        mut f: impl FnMut(Pair) -> Result<(), EngineError>,
    ) -> Result<(), EngineError> {
        let mut stmt = self
            .conn
            .prepare("SELECT key, value FROM pairs ORDER BY key, value")?;
        let mut rows = stmt.query([])?;
        while let Some(row) = rows.next()? {
            let key: String = row.get(0)?;
            let value: String = row.get(1)?;
            f(Pair { key, value })?;
        }
        Ok(())
    }

    /// Starts a transaction-scoped inserter. All inserts made through the
    /// returned `Inserter` occur inside one transaction, reusing one
    /// cached prepared statement to keep the insert hot loop cheap.
    pub fn begin_insert(&mut self) -> Result<Inserter<'_>, EngineError> {
        let tx = self.conn.transaction().map_err(|e| EngineError::Store(e.to_string()))?;
        Ok(Inserter { tx })
    }

    /// Atomically attaches `other_path`, copies all of its rows into
    /// `self.pairs`, then detaches it.
    pub fn merge(&mut self, other_path: &Path) -> Result<(), EngineError> {
        let other = other_path
            .to_str()
            .ok_or_else(|| EngineError::Merge(format!("non-utf8 path: {}", other_path.display())))?;
        self.conn
            .execute("ATTACH DATABASE ?1 AS merge_src", params![other])?;
        let result: Result<(), EngineError> = (|| {
            self.conn
                .execute("INSERT INTO pairs SELECT * FROM merge_src.pairs", [])?;
            Ok(())
        })();
        self.conn.execute("DETACH DATABASE merge_src", [])?;
        result
    }

    pub fn count(&self) -> Result<i64, EngineError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM pairs", [], |row| row.get(0))?;
        Ok(count)
    }
}

/// A transaction-scoped, prepared-statement-backed inserter.
pub struct Inserter<'a> {
    tx: rusqlite::Transaction<'a>,
}

impl<'a> Inserter<'a> {
    pub fn insert(&self, key: &str, value: &str) -> Result<(), EngineError> {
        self.tx
            .prepare_cached("INSERT INTO pairs(key, value) VALUES (?1, ?2)")?
            .execute(params![key, value])?;
        Ok(())
    }

    pub fn commit(self) -> Result<(), EngineError> {
        self.tx.commit().map_err(|e| EngineError::Store(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn create_open_insert_scan_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a.db");
        let mut store = Store::create(&path).unwrap();
        {
            let ins = store.begin_insert().unwrap();
            ins.insert("b", "2").unwrap();
            ins.insert("a", "1").unwrap();
            ins.commit().unwrap();
        }
        assert_eq!(store.count().unwrap(), 2);

        let mut ordered = Vec::new();
        store
            .scan_ordered(|p| {
                ordered.push((p.key, p.value));
                Ok(())
            })
            .unwrap();
        assert_eq!(ordered, vec![("a".into(), "1".into()), ("b".into(), "2".into())]);
    }

    #[test]
    fn create_fails_if_exists() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a.db");
        Store::create(&path).unwrap();
        assert!(Store::create(&path).is_err());
    }

    #[test]
    fn merge_copies_rows_and_leaves_source_intact() {
        let dir = tempdir().unwrap();
        let mut a = Store::create(&dir.path().join("a.db")).unwrap();
        {
            let ins = a.begin_insert().unwrap();
            ins.insert("x", "1").unwrap();
            ins.commit().unwrap();
        }
        let b_path = dir.path().join("b.db");
        {
            let mut b = Store::create(&b_path).unwrap();
            let ins = b.begin_insert().unwrap();
            ins.insert("y", "2").unwrap();
            ins.commit().unwrap();
        }
        a.merge(&b_path).unwrap();
        assert_eq!(a.count().unwrap(), 2);
    }
}
