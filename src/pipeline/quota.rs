//! Counting permit pool gating the slow-digest primitive.

use crossbeam_channel::{bounded, Receiver, Sender};

/// Capacity-bounded permit pool shared by every worker that takes the
/// slow-digest path. Built on a bounded token channel: acquiring sends a
/// token (blocking while the buffer is full), releasing receives one back.
/// Capacity can therefore never be exceeded, and release order is the
/// channel's fair FIFO.
///
/// Share across workers with `Arc<Quota>`; there is one pool per pipeline
/// run and no state outlives the run.
pub struct Quota {
    slots_tx: Sender<()>,
    slots_rx: Receiver<()>,
    capacity: usize,
}

impl Quota {
    /// New pool allowing up to `capacity` concurrent permit holders.
    /// `capacity` must be at least 1, otherwise every acquire would block
    /// forever.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity >= 1, "quota capacity must be at least 1");
        let (slots_tx, slots_rx) = bounded::<()>(capacity);
        Self {
            slots_tx,
            slots_rx,
            capacity,
        }
    }

    /// Block until a permit is free, then take it. The permit is released
    /// when the returned guard drops, on every exit path including unwinds.
    pub fn acquire(&self) -> Permit<'_> {
        // Both channel ends live in self, so the send can only block, never
        // fail with a disconnect.
        let _ = self.slots_tx.send(());
        Permit { pool: self }
    }

    /// Configured ceiling.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Permits currently held. Instrumentation only; racy by nature.
    pub fn in_use(&self) -> usize {
        self.slots_rx.len()
    }
}

/// RAII permit handed out by [`Quota::acquire`].
pub struct Permit<'a> {
    pool: &'a Quota,
}

impl Drop for Permit<'_> {
    fn drop(&mut self) {
        // A live permit implies a buffered token, so this cannot block.
        let _ = self.pool.slots_rx.try_recv();
    }
}
