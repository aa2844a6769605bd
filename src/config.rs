//! Configuration for a mapreduce run.

use std::path::PathBuf;

/// `M`, `R`, `P`, the shard server's listen address, the temp root, and
/// the input path, plus `keep_temp_files`, set via a builder style.
#[derive(Clone, Debug)]
pub struct Config {
    /// Number of map shards / map tasks.
    pub m: usize,
    /// Number of reduce shards / reduce tasks.
    pub r: usize,
    /// Fixed concurrency budget: the maximum number of in-flight tasks
    /// within a phase.
    pub p: usize,
    /// Loopback address the shard server listens on, e.g. "127.0.0.1:0".
    pub listen_address: String,
    /// Working directory for this run's shards. Created if missing.
    pub temp_root: PathBuf,
    /// Path to the embedded input table.
    pub input_path: PathBuf,
    /// If true, intermediate and final shards under `temp_root` are kept
    /// after the run instead of being deleted.
    pub keep_temp_files: bool,
}

impl Config {
    pub fn new(input_path: impl Into<PathBuf>, temp_root: impl Into<PathBuf>) -> Config {
        Config {
            m: 4,
            r: 4,
            p: 8,
            listen_address: String::from("127.0.0.1:0"),
            temp_root: temp_root.into(),
            input_path: input_path.into(),
            keep_temp_files: false,
        }
    }

    /// Number of map shards and reduce shards. Default 4/4.
    pub fn set_shards(mut self, m: usize, r: usize) -> Config {
        self.m = m;
        self.r = r;
        self
    }

    /// The fixed concurrency budget `P`. Default 8.
    pub fn set_concurrency(mut self, p: usize) -> Config {
        self.p = p;
        self
    }

    /// The loopback address the shard server binds to.
    pub fn set_listen_address(mut self, addr: impl Into<String>) -> Config {
        self.listen_address = addr.into();
        self
    }

    pub fn keep_temp_files(mut self, keep: bool) -> Config {
        self.keep_temp_files = keep;
        self
    }

    pub fn result_path(&self) -> PathBuf {
        self.temp_root.join("result")
    }
}
