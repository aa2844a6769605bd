//! The Map Worker.

use std::path::Path;
use std::sync::mpsc::sync_channel;

use crate::error::EngineError;
use crate::fetch;
use crate::hash;
use crate::mapreducer::MapReduce;
use crate::pair::Pair;
use crate::shardname;
use crate::store::{Inserter, Store};

const PAIR_CHANNEL_CAPACITY: usize = 100;

/// The map task's identity and source host. Immutable after
/// construction.
#[derive(Clone, Debug)]
pub struct MapTask {
    pub m: usize,
    pub r: usize,
    pub n: usize,
    pub source_host: String,
}

impl MapTask {
    /// Runs this map task: fetch the source shard, stream its rows
    /// through `client.map`, hash-partition emissions into `r` output
    /// shards.
    pub fn process<MR: MapReduce + Sync>(&self, temp_dir: &Path, client: &MR) -> Result<(), EngineError> {
        let url = shardname::map_source_url(&self.source_host, self.n);
        let input_path = shardname::map_input(temp_dir, self.n);
        fetch::fetch_shard(&url, &input_path)?;

        let input = Store::open(&input_path)?;

        let mut outputs: Vec<Store> = (0..self.r)
            .map(|r| Store::create(&shardname::map_output(temp_dir, self.n, r)))
            .collect::<Result<_, _>>()?;
        let mut inserters: Vec<Inserter<'_>> = outputs
            .iter_mut()
            .map(|s| s.begin_insert())
            .collect::<Result<_, _>>()?;

        let r = self.r;
        input.scan(|pair| {
            let (pair_tx, pair_rx) = sync_channel::<Pair>(PAIR_CHANNEL_CAPACITY);

            let (map_result, write_result) = std::thread::scope(|scope| {
                let mapper = scope.spawn(move || {
                    let map_result = client
                        .map(&pair.key, &pair.value, &pair_tx)
                        .map_err(|e| EngineError::MapUser(e.to_string()));
                    // The core closes the channel on the callback's behalf:
                    // dropping `pair_tx` here ends the reader's `.iter()`.
                    drop(pair_tx);
                    map_result
                });

                let write_result: Result<(), EngineError> = (|| {
                    for emitted in pair_rx.iter() {
                        let shard = hash::shard_for_key(&emitted.key, r);
                        inserters[shard]
                            .insert(&emitted.key, &emitted.value)
                            .map_err(|e| EngineError::MapOutput(e.to_string()))?;
                    }
                    Ok(())
                })();

                let map_result = mapper
                    .join()
                    .unwrap_or_else(|_| Err(EngineError::MapUser("map thread panicked".into())));
                (map_result, write_result)
            });

            map_result?;
            write_result?;
            Ok(())
        })?;

        drop(input);

        for ins in inserters {
            ins.commit()?;
        }

        Ok(())
    }
}

