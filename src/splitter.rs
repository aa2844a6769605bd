//! The Splitter: deterministic N→M row partitioner.

use std::path::Path;

use crate::error::EngineError;
use crate::shardname;
use crate::store::{Inserter, Store};

/// Partitions `source`'s rows into `m` shard files under `out_dir`, named
/// `map_<i>_source`. Ordering within a shard is the scan order of the
/// source. Returns the empty vector if `source` has fewer than `m`
/// rows — a degenerate input the caller must handle (the engine treats it
/// as zero map shards; see `engine::Engine::run`).
pub fn split(source: &Path, out_dir: &Path, m: usize) -> Result<Vec<std::path::PathBuf>, EngineError> {
    let src = Store::open(source)?;
    let count = src.count()? as usize;
    if count < m {
        return Ok(Vec::new());
    }

    let q = count / m;
    let rem = count - q * m;

    let mut paths = Vec::with_capacity(m);
    let mut shards = Vec::with_capacity(m);
    for i in 0..m {
        let path = shardname::map_source(out_dir, i);
        shards.push(Store::create(&path)?);
        paths.push(path);
    }
    let mut inserters: Vec<Inserter<'_>> = shards
        .iter_mut()
        .map(|s| s.begin_insert())
        .collect::<Result<_, _>>()?;

    let mut row_index = 0usize;
    let block_end = q * m;
    src.scan(|pair| {
        let shard = if row_index < block_end {
            row_index / q
        } else {
            row_index - block_end
        };
        inserters[shard].insert(&pair.key, &pair.value)?;
        row_index += 1;
        Ok(())
    })?;
    debug_assert_eq!(row_index, count);
    let _ = rem;

    for ins in inserters {
        ins.commit()?;
    }

    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn make_source(dir: &Path, rows: &[(&str, &str)]) -> std::path::PathBuf {
        let path = dir.join("source");
        let mut store = Store::create(&path).unwrap();
        let ins = store.begin_insert().unwrap();
        for (k, v) in rows {
            ins.insert(k, v).unwrap();
        }
        ins.commit().unwrap();
        path
    }

    #[test]
    fn distributes_remainder_across_first_shards() {
        let dir = tempdir().unwrap();
        let rows: Vec<(String, String)> = (0..7).map(|i| (format!("k{i}"), format!("v{i}"))).collect();
        let rows_ref: Vec<(&str, &str)> = rows.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
        let source = make_source(dir.path(), &rows_ref);

        let shards = split(&source, dir.path(), 3).unwrap();
        assert_eq!(shards.len(), 3);

        let counts: Vec<i64> = shards
            .iter()
            .map(|p| Store::open(p).unwrap().count().unwrap())
            .collect();
        // 7 rows / 3 shards: q=2, rem=1 -> shard 0 gets 3, others get 2.
        assert_eq!(counts, vec![3, 2, 2]);
        assert_eq!(counts.iter().sum::<i64>(), 7);
    }

    #[test]
    fn degenerate_when_fewer_rows_than_shards() {
        let dir = tempdir().unwrap();
        let source = make_source(dir.path(), &[("a", "1")]);
        let shards = split(&source, dir.path(), 4).unwrap();
        assert!(shards.is_empty());
    }

    #[test]
    fn preserves_scan_order_within_a_shard() {
        let dir = tempdir().unwrap();
        let rows: Vec<(&str, &str)> = vec![("a", "1"), ("b", "2"), ("c", "3"), ("d", "4")];
        let source = make_source(dir.path(), &rows);
        let shards = split(&source, dir.path(), 2).unwrap();
        let mut first_shard_rows = Vec::new();
        Store::open(&shards[0])
            .unwrap()
            .scan(|p| {
                first_shard_rows.push(p.key);
                Ok(())
            })
            .unwrap();
        assert_eq!(first_shard_rows, vec!["a", "b"]);
    }
}
