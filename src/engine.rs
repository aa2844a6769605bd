//! The top-level engine driver: split, serve, dispatch the map phase,
//! dispatch the reduce phase, merge, clean up.

use std::path::PathBuf;

use crate::config::Config;
use crate::error::EngineError;
use crate::map_worker::MapTask;
use crate::mapreducer::MapReduce;
use crate::merge;
use crate::reduce_worker::ReduceTask;
use crate::scheduler::Scheduler;
use crate::server::ShardServer;
use crate::shardname;
use crate::splitter;

pub struct Engine<MR: MapReduce> {
    config: Config,
    client: MR,
}

impl<MR: MapReduce + Sync> Engine<MR> {
    pub fn new(config: Config, client: MR) -> Engine<MR> {
        Engine { config, client }
    }

    /// Runs one complete mapreduce pass. Returns the path to the final
    /// result shard on success.
    pub fn run(&self) -> Result<PathBuf, EngineError> {
        let temp_dir = &self.config.temp_root;
        std::fs::create_dir_all(temp_dir).map_err(|e| EngineError::io(temp_dir, e))?;

        log::info!(
            "starting run: m={} r={} p={} input={}",
            self.config.m,
            self.config.r,
            self.config.p,
            self.config.input_path.display()
        );

        let source_shards = splitter::split(&self.config.input_path, temp_dir, self.config.m)
            .map_err(|e| EngineError::Split(e.to_string()))?;
        // A degenerate split (fewer input rows than M) yields no source
        // shards; the engine treats this as zero map tasks rather than
        // failing, so empty input still completes with an empty result.
        let m_actual = source_shards.len();
        log::info!("split input into {} map shard(s)", m_actual);

        let server = ShardServer::start(temp_dir.clone(), &self.config.listen_address)?;
        let host = server.local_addr.to_string();
        log::info!("shard server listening on http://{}/data/", host);

        let mut scheduler = Scheduler::new(self.config.p);

        let map_tasks: Vec<MapTask> = (0..m_actual)
            .map(|n| MapTask {
                m: m_actual,
                r: self.config.r,
                n,
                source_host: host.clone(),
            })
            .collect();
        let client = self.client.clone();
        scheduler.run_phase(map_tasks, {
            let temp_dir = temp_dir.clone();
            move |task: MapTask| task.process(&temp_dir, &client)
        })?;
        log::info!("map phase complete");

        let source_hosts = vec![host.clone(); m_actual];
        let reduce_tasks: Vec<ReduceTask> = (0..self.config.r)
            .map(|n| ReduceTask {
                m: m_actual,
                r: self.config.r,
                n,
                source_hosts: source_hosts.clone(),
                keep_temp_files: self.config.keep_temp_files,
            })
            .collect();
        let client = self.client.clone();
        scheduler.run_phase(reduce_tasks, {
            let temp_dir = temp_dir.clone();
            move |task: ReduceTask| task.process(&temp_dir, &client)
        })?;
        log::info!("reduce phase complete");

        let reduce_outputs: Vec<PathBuf> = (0..self.config.r)
            .map(|n| shardname::reduce_output(temp_dir, n))
            .collect();
        let result_path = self.config.result_path();
        merge::merge_all(&reduce_outputs, &result_path, self.config.keep_temp_files)?;
        log::info!("merged {} reduce output(s) into {}", self.config.r, result_path.display());

        if !self.config.keep_temp_files {
            for n in 0..m_actual {
                let _ = std::fs::remove_file(shardname::map_source(temp_dir, n));
                let _ = std::fs::remove_file(shardname::map_input(temp_dir, n));
                for r in 0..self.config.r {
                    let _ = std::fs::remove_file(shardname::map_output(temp_dir, n, r));
                }
            }
        }

        Ok(result_path)
    }
}
