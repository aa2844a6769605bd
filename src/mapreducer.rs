//! The `MapReduce` trait and associated types: the user plug-in
//! contract, expressed with the channel-based signatures the streaming
//! map/reduce workers need.

use std::sync::mpsc::{Receiver, SyncSender};

use crate::error::EngineError;
use crate::pair::Pair;

/// A type implementing `map()` and `reduce()`. Cloned once per map/reduce
/// task; implementations are expected to be cheap to clone (e.g. a
/// zero-sized type or an `Arc`-wrapped configuration).
pub trait MapReduce: Clone + Send + 'static {
    /// Processes one `(key, value)` pair, sending zero or more result
    /// pairs to `out`. The core closes `out` itself once `map` returns:
    /// ownership of the `Sender` never passes to the callback, so
    /// nothing is left to leak.
    fn map(&self, key: &str, value: &str, out: &SyncSender<Pair>) -> Result<(), EngineError>;

    /// Consumes every value from `values` (until the channel closes),
    /// then sends zero or more result pairs to `out`. As with `map`, the
    /// core closes `out` after `reduce` returns.
    fn reduce(&self, key: &str, values: Receiver<String>, out: &SyncSender<Pair>) -> Result<(), EngineError>;
}
