//! Stage chaining: wire stages together with rendezvous channels and drive
//! them to completion on their own threads.

use crossbeam_channel::{bounded, Receiver, Sender};
use log::debug;
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use crate::types::{Item, StageError};

/// Inter-stage channel capacity. Zero-capacity rendezvous: a producer blocks
/// on send until its consumer is ready to receive. This handoff is the
/// pipeline's only flow control; there is no timeout or cancellation path,
/// so a stalled slow digest stalls the run.
pub const STAGE_CHANNEL_CAP: usize = 0;

/// One pipeline stage: consume `in_rx` until it disconnects, send results on
/// `out_tx`. The sender is dropped when the stage returns, which is what
/// closes the downstream stream — a stage must not return while it still
/// intends to emit.
pub type StageFn =
    Box<dyn FnOnce(Receiver<Item>, Sender<Item>) -> Result<(), StageError> + Send + 'static>;

/// First stage error observed across the run, shared with every stage thread.
pub type FirstError = Arc<Mutex<Option<StageError>>>;

/// Handles returned by [`spawn_pipeline`] for streaming: receive final items
/// from `out_rx`, then call [`join`](PipelineHandles::join).
pub struct PipelineHandles {
    pub out_rx: Receiver<Item>,
    pub stage_handles: Vec<JoinHandle<()>>,
    pub first_error: FirstError,
}

impl PipelineHandles {
    /// Join every stage thread, then surface the first recorded stage error.
    /// Call only after draining `out_rx`; joining first would deadlock on the
    /// rendezvous send of the final stage.
    pub fn join(self) -> Result<(), StageError> {
        let mut panicked = false;
        for h in self.stage_handles {
            if h.join().is_err() {
                panicked = true;
            }
        }
        if let Some(err) = self.first_error.lock().unwrap().take() {
            return Err(err);
        }
        if panicked {
            return Err(StageError::StagePanicked);
        }
        Ok(())
    }
}

/// Chain `stages` over rendezvous channels and start one thread per stage.
///
/// Stage 0 reads from the caller-supplied `source`; stage *i*'s output feeds
/// stage *i+1*'s input; the last stage's output receiver comes back in the
/// handles. A failing stage records the first error and returns, dropping
/// both its channel ends — upstream sends then fail and upstream stops,
/// downstream sees end-of-stream and drains. The run halts deterministically
/// without a final result.
pub fn spawn_pipeline(stages: Vec<StageFn>, source: Receiver<Item>) -> PipelineHandles {
    let first_error: FirstError = Arc::new(Mutex::new(None));
    let mut stage_handles = Vec::with_capacity(stages.len());
    let mut in_rx = source;

    for (idx, stage) in stages.into_iter().enumerate() {
        let (out_tx, out_rx) = bounded::<Item>(STAGE_CHANNEL_CAP);
        let first_error = Arc::clone(&first_error);
        let rx = in_rx;
        stage_handles.push(thread::spawn(move || {
            // out_tx is owned by the stage and dropped when it returns;
            // that drop is the downstream end-of-stream signal.
            if let Err(err) = stage(rx, out_tx) {
                debug!("stage {idx} failed: {err}");
                first_error.lock().unwrap().get_or_insert(err);
            }
        }));
        in_rx = out_rx;
    }

    PipelineHandles {
        out_rx: in_rx,
        stage_handles,
        first_error,
    }
}

/// Run `stages` to completion: spawn, drain the final output into a Vec,
/// join all stage threads, and surface the first stage error if one was
/// recorded. Walk → stage threads → final channel → Vec.
pub fn run_pipeline(stages: Vec<StageFn>, source: Receiver<Item>) -> Result<Vec<Item>, StageError> {
    let handles = spawn_pipeline(stages, source);
    let mut items = Vec::new();
    while let Ok(item) = handles.out_rx.recv() {
        items.push(item);
    }
    debug!("pipeline output closed, {} items collected", items.len());
    handles.join()?;
    Ok(items)
}

/// Feed `items` into a rendezvous channel from a dedicated thread, dropping
/// the sender when done (end-of-stream for stage 0). Returns the receiver to
/// hand to [`spawn_pipeline`] and the feeder handle, which yields the number
/// of items actually accepted downstream.
pub fn spawn_feeder(items: Vec<Item>) -> (Receiver<Item>, JoinHandle<usize>) {
    let (tx, rx) = bounded::<Item>(STAGE_CHANNEL_CAP);
    let handle = thread::spawn(move || {
        let mut sent = 0_usize;
        for item in items {
            if tx.send(item).is_err() {
                // Pipeline aborted and dropped its input end; stop producing.
                break;
            }
            sent += 1;
        }
        sent
    });
    (rx, handle)
}
