//! Word count: tokenizes values on whitespace, lowercases and strips
//! punctuation, and sums counts per word in `reduce`.

use std::sync::mpsc::{Receiver, SyncSender};

use crate::error::EngineError;
use crate::mapreducer::MapReduce;
use crate::pair::Pair;

#[derive(Clone, Debug, Default)]
pub struct WordCount;

impl MapReduce for WordCount {
    fn map(&self, _key: &str, value: &str, out: &SyncSender<Pair>) -> Result<(), EngineError> {
        for token in value.split_whitespace() {
            let word: String = token
                .chars()
                .filter(|c| c.is_alphanumeric())
                .flat_map(|c| c.to_lowercase())
                .collect();
            if word.is_empty() {
                continue;
            }
            out.send(Pair::new(word, "1"))
                .map_err(|_| EngineError::MapUser("output channel closed".into()))?;
        }
        Ok(())
    }

    fn reduce(&self, key: &str, values: Receiver<String>, out: &SyncSender<Pair>) -> Result<(), EngineError> {
        let mut count: i64 = 0;
        for v in values.iter() {
            count += v
                .parse::<i64>()
                .map_err(|e| EngineError::ReduceUser(format!("non-numeric count {v:?}: {e}")))?;
        }
        out.send(Pair::new(key, count.to_string()))
            .map_err(|_| EngineError::ReduceUser("output channel closed".into()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc::sync_channel;

    #[test]
    fn map_tokenizes_and_lowercases() {
        let wc = WordCount;
        let (tx, rx) = sync_channel(16);
        wc.map("ignored", "Hello, World! hello.", &tx).unwrap();
        drop(tx);
        let words: Vec<String> = rx.iter().map(|p| p.key).collect();
        assert_eq!(words, vec!["hello", "world", "hello"]);
    }

    #[test]
    fn reduce_sums_counts() {
        let wc = WordCount;
        let (vtx, vrx) = sync_channel(16);
        for _ in 0..3 {
            vtx.send("1".to_string()).unwrap();
        }
        drop(vtx);
        let (otx, orx) = sync_channel(1);
        wc.reduce("hello", vrx, &otx).unwrap();
        drop(otx);
        let out: Vec<Pair> = orx.iter().collect();
        assert_eq!(out, vec![Pair::new("hello", "3")]);
    }
}
