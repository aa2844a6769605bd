//! The Grouping Coroutine: turns a sorted row stream into a sequence of
//! `(key, value-stream)` groups, synchronized with the reduce worker's
//! per-key writer so that exactly one reducer invocation is in flight
//! per reduce task at a time.
//!
//! Expressed as a background thread plus two rendezvous channels:
//! `groups_tx` (capacity 0, so the grouper blocks until the reduce
//! worker actually picks up a group) and `advance_rx` (a one-shot-per-
//! group signal the reduce worker sends after its writer for the
//! *previous* group has finished).

use std::sync::mpsc::{sync_channel, Receiver, RecvError, SyncSender};
use std::thread::{self, JoinHandle};

use crate::error::EngineError;
use crate::pair::Pair;
use crate::store::Store;

const VALUE_CHANNEL_CAPACITY: usize = 100;

/// One group: a key and the (bounded, ordered) stream of values for it.
pub struct Group {
    pub key: String,
    pub values: Receiver<String>,
}

/// Drives the row → group state machine on a background thread and
/// exposes the resulting groups as an iterator-like cursor.
pub struct GroupStream {
    groups_rx: Receiver<Group>,
    advance_tx: SyncSender<()>,
    handle: Option<JoinHandle<Result<(), EngineError>>>,
}

impl GroupStream {
    /// Spawns the grouping coroutine over `store`'s ordered scan.
    pub fn spawn(store: Store) -> GroupStream {
        let (groups_tx, groups_rx) = sync_channel::<Group>(0);
        let (advance_tx, advance_rx) = sync_channel::<()>(0);

        let handle = thread::spawn(move || run(store, groups_tx, advance_rx));

        GroupStream {
            groups_rx,
            advance_tx,
            handle: Some(handle),
        }
    }

    /// Blocks for the next group, or `None` once the stream is drained.
    /// The caller must call `advance()` after it has fully processed a
    /// group (its writer has finished) before requesting the next one.
    pub fn next_group(&mut self) -> Option<Group> {
        match self.groups_rx.recv() {
            Ok(group) => Some(group),
            Err(RecvError) => None,
        }
    }

    /// Signals that the previous group's reducer writer has finished,
    /// allowing the grouper to proceed to the next key (or finish).
    pub fn advance(&self) {
        // The grouper is always waiting to receive this exactly when a
        // group boundary (or end of input) is reached; a send error
        // here means the grouper thread died, which `finish()` surfaces.
        let _ = self.advance_tx.send(());
    }

    /// Joins the background thread and returns its result. Call after
    /// `next_group()` has returned `None`.
    pub fn finish(&mut self) -> Result<(), EngineError> {
        match self.handle.take() {
            Some(h) => h.join().unwrap_or_else(|_| {
                Err(EngineError::Grouping("grouping thread panicked".into()))
            }),
            None => Ok(()),
        }
    }
}

fn run(store: Store, groups_tx: SyncSender<Group>, advance_rx: Receiver<()>) -> Result<(), EngineError> {
    let mut current_tx: Option<SyncSender<String>> = None;
    let mut previous_key: Option<String> = None;

    let scan_result = store.scan_ordered(|pair: Pair| {
        let same_group = previous_key.as_deref() == Some(pair.key.as_str());
        if same_group {
            let tx = current_tx.as_ref().expect("group in progress");
            tx.send(pair.value)
                .map_err(|_| EngineError::Grouping("reducer stopped reading values".into()))?;
            return Ok(());
        }

        if previous_key.is_some() {
            // Close the previous group's value stream and wait for its
            // writer to finish before starting a new one.
            current_tx.take();
            advance_rx
                .recv()
                .map_err(|_| EngineError::Grouping("reduce worker disappeared".into()))?;
        }

        let (value_tx, value_rx) = sync_channel(VALUE_CHANNEL_CAPACITY);
        value_tx
            .send(pair.value)
            .map_err(|_| EngineError::Grouping("reducer stopped reading values".into()))?;
        groups_tx
            .send(Group {
                key: pair.key.clone(),
                values: value_rx,
            })
            .map_err(|_| EngineError::Grouping("reduce worker stopped reading groups".into()))?;
        current_tx = Some(value_tx);
        previous_key = Some(pair.key);
        Ok(())
    });

    // Close the final group (if any) and wait for its writer too, so the
    // reduce worker's last `advance()` call always has a matching recv.
    if previous_key.is_some() {
        current_tx.take();
        let _ = advance_rx.recv();
    }
    drop(groups_tx);

    scan_result
}
