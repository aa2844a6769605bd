//! The Shard Fetcher.

use std::fs::File;
use std::io;
use std::path::Path;

use crate::error::EngineError;

/// Issues `GET url`, streaming the response body to `dest`. Fails with a
/// fetch error on a non-2xx response or I/O error. Idempotent: any
/// existing file at `dest` is overwritten.
pub fn fetch_shard(url: &str, dest: &Path) -> Result<(), EngineError> {
    let response = reqwest::blocking::get(url).map_err(|source| EngineError::Fetch {
        url: url.to_string(),
        source,
    })?;

    let status = response.status();
    if !status.is_success() {
        return Err(EngineError::FetchStatus {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let mut body = response;
    let mut out = File::create(dest).map_err(|e| EngineError::io(dest, e))?;
    io::copy(&mut body, &mut out).map_err(|e| EngineError::io(dest, e))?;
    Ok(())
}
