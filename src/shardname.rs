//! Shard file and URL naming for the working directory's filesystem
//! layout.

use std::path::{Path, PathBuf};

pub fn map_source(dir: &Path, m: usize) -> PathBuf {
    dir.join(format!("map_{}_source", m))
}

pub fn map_input(dir: &Path, m: usize) -> PathBuf {
    dir.join(format!("map_{}_input", m))
}

pub fn map_output(dir: &Path, m: usize, r: usize) -> PathBuf {
    dir.join(format!("map_{}_output_{}", m, r))
}

pub fn reduce_input(dir: &Path, r: usize) -> PathBuf {
    dir.join(format!("reduce_{}_input", r))
}

pub fn reduce_output(dir: &Path, r: usize) -> PathBuf {
    dir.join(format!("reduce_{}_output", r))
}

pub fn result(dir: &Path) -> PathBuf {
    dir.join("result")
}

pub fn map_source_url(host: &str, m: usize) -> String {
    format!("http://{}/data/map_{}_source", host, m)
}

pub fn map_output_url(host: &str, m: usize, r: usize) -> String {
    format!("http://{}/data/map_{}_output_{}", host, m, r)
}
