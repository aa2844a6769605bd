//! The Reduce Worker.

use std::path::Path;
use std::sync::mpsc::sync_channel;

use crate::error::EngineError;
use crate::fetch;
use crate::group::GroupStream;
use crate::mapreducer::MapReduce;
use crate::pair::Pair;
use crate::shardname;
use crate::store::Store;

const PAIR_CHANNEL_CAPACITY: usize = 100;

/// The reduce task's identity and map-output source hosts. Immutable
/// after construction.
#[derive(Clone, Debug)]
pub struct ReduceTask {
    pub m: usize,
    pub r: usize,
    pub n: usize,
    pub source_hosts: Vec<String>,
    pub keep_temp_files: bool,
}

impl ReduceTask {
    /// Runs this reduce task: fetch and merge `map_<i>_output_<n>` for
    /// every mapper `i` in `[0, m)` — every mapper writes an output
    /// shard for every reducer, so reducer `n` must read all `m` of
    /// them — group the merged input by key, and invoke `client.reduce`
    /// per key.
    pub fn process<MR: MapReduce + Sync>(&self, temp_dir: &Path, client: &MR) -> Result<(), EngineError> {
        let input_path = shardname::reduce_input(temp_dir, self.n);
        let mut input = Store::create(&input_path)?;

        for i in 0..self.m {
            let host = &self.source_hosts[i];
            let url = shardname::map_output_url(host, i, self.n);
            let fetched = temp_dir.join(format!("map_{}_output_{}_fetched", i, self.n));
            fetch::fetch_shard(&url, &fetched)?;
            input.merge(&fetched)?;
            std::fs::remove_file(&fetched).map_err(|e| EngineError::io(&fetched, e))?;
        }

        let mut output = Store::create(&shardname::reduce_output(temp_dir, self.n))?;
        let inserter = output.begin_insert()?;

        let mut groups = GroupStream::spawn(input);
        while let Some(group) = groups.next_group() {
            let (pair_tx, pair_rx) = sync_channel::<Pair>(PAIR_CHANNEL_CAPACITY);

            let (reduce_result, write_result) = std::thread::scope(|scope| {
                let reducer = scope.spawn(move || {
                    let reduce_result = client
                        .reduce(&group.key, group.values, &pair_tx)
                        .map_err(|e| EngineError::ReduceUser(e.to_string()));
                    drop(pair_tx);
                    reduce_result
                });

                let write_result: Result<(), EngineError> = (|| {
                    for pair in pair_rx.iter() {
                        inserter
                            .insert(&pair.key, &pair.value)
                            .map_err(|e| EngineError::ReduceOutput(e.to_string()))?;
                    }
                    Ok(())
                })();

                let reduce_result = reducer
                    .join()
                    .unwrap_or_else(|_| Err(EngineError::ReduceUser("reduce thread panicked".into())));
                (reduce_result, write_result)
            });

            groups.advance();
            reduce_result?;
            write_result?;
        }
        groups.finish()?;

        inserter.commit()?;
        if !self.keep_temp_files {
            std::fs::remove_file(&input_path).map_err(|e| EngineError::io(&input_path, e))?;
        }

        Ok(())
    }
}
