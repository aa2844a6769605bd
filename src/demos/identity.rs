//! Identity mappers: `map(k, v) -> {(k, v)}`, `reduce(k, vs) -> {(k,
//! join(vs))}`. Used to check end-to-end idempotence on key sets.

use std::sync::mpsc::{Receiver, SyncSender};

use crate::error::EngineError;
use crate::mapreducer::MapReduce;
use crate::pair::Pair;

#[derive(Clone, Debug, Default)]
pub struct Identity;

impl MapReduce for Identity {
    fn map(&self, key: &str, value: &str, out: &SyncSender<Pair>) -> Result<(), EngineError> {
        out.send(Pair::new(key, value))
            .map_err(|_| EngineError::MapUser("output channel closed".into()))
    }

    fn reduce(&self, key: &str, values: Receiver<String>, out: &SyncSender<Pair>) -> Result<(), EngineError> {
        let joined = values.iter().collect::<Vec<_>>().join(",");
        out.send(Pair::new(key, joined))
            .map_err(|_| EngineError::ReduceUser("output channel closed".into()))
    }
}
