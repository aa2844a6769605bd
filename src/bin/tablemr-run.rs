//! CLI entry point: parses run parameters, builds a `Config`, and runs
//! one mapreduce pass with a chosen demo plug-in.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};

use tablemr::config::Config;
use tablemr::demos::{identity::Identity, wordcount::WordCount};
use tablemr::engine::Engine;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Plugin {
    Wordcount,
    Identity,
}

/// Single-node mapreduce run over an embedded `(key, value)` table.
#[derive(Parser, Debug)]
#[command(name = "tablemr-run", version, about)]
struct Args {
    /// Path to the input table (sqlite database with a `pairs(key, value)` table).
    input_path: PathBuf,

    /// Working directory for shards and the final result.
    #[arg(long, default_value = "tablemr-tmp")]
    temp_root: PathBuf,

    /// Number of map shards.
    #[arg(long, default_value_t = 4)]
    m: usize,

    /// Number of reduce shards.
    #[arg(long, default_value_t = 4)]
    r: usize,

    /// Fixed concurrency budget for each phase.
    #[arg(long, default_value_t = 8)]
    p: usize,

    /// Loopback address the shard server binds to.
    #[arg(long, default_value = "127.0.0.1:0")]
    listen_address: String,

    /// Keep intermediate shard files after the run.
    #[arg(long)]
    keep_temp: bool,

    /// Which bundled plug-in to run.
    #[arg(long, value_enum, default_value_t = Plugin::Wordcount)]
    plugin: Plugin,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let config = Config::new(args.input_path, args.temp_root)
        .set_shards(args.m, args.r)
        .set_concurrency(args.p)
        .set_listen_address(args.listen_address)
        .keep_temp_files(args.keep_temp);

    let result = match args.plugin {
        Plugin::Wordcount => Engine::new(config, WordCount).run(),
        Plugin::Identity => Engine::new(config, Identity).run(),
    };

    match result {
        Ok(path) => {
            log::info!("result written to {}", path.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("run failed: {e}");
            ExitCode::FAILURE
        }
    }
}
