//! The Final Merger: merges the R reduce outputs into the single final
//! result shard.

use std::path::{Path, PathBuf};

use crate::error::EngineError;
use crate::store::Store;

/// Creates `result_path` and merges each of `inputs` into it via
/// attach/insert/detach. Each input is deleted after it has been merged
/// unless `keep_temp_files` is set.
pub fn merge_all(inputs: &[PathBuf], result_path: &Path, keep_temp_files: bool) -> Result<(), EngineError> {
    let mut result = Store::create(result_path)?;
    for input in inputs {
        result
            .merge(input)
            .map_err(|e| EngineError::Merge(e.to_string()))?;
        if !keep_temp_files {
            std::fs::remove_file(input).map_err(|e| EngineError::io(input, e))?;
        }
    }
    Ok(())
}
