//! The three concrete stages: dual hash, fan hash, combine.
//!
//! The hash stages fan out one worker thread per incoming item (unbounded);
//! the only brake on in-flight work is the rendezvous handoff upstream and
//! the quota on the slow-digest half. Emission order across items is
//! unconstrained in both.

use crossbeam_channel::Sender;
use log::debug;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::digest::DigestSuite;
use crate::types::{Item, StageError};

use super::quota::Quota;
use super::runner::StageFn;

/// Number of indexed sub-digests the fan stage computes per item.
pub const FAN_WIDTH: usize = 6;

/// Default ceiling on concurrent slow-digest calls per run.
pub const DEFAULT_QUOTA_CAPACITY: usize = 1;

/// Joins the plain and layered halves of a dual-hash result.
const DUAL_SEPARATOR: &str = "~";

/// Joins the sorted strings of the final combined result.
const COMBINE_SEPARATOR: &str = "_";

type WorkerHandle = JoinHandle<Result<(), StageError>>;

/// Join per-item workers, folding the first worker failure into `failure`.
fn join_workers(workers: Vec<WorkerHandle>, failure: &mut Option<StageError>) {
    for w in workers {
        match w.join() {
            Ok(Ok(())) => {}
            Ok(Err(err)) => {
                failure.get_or_insert(err);
            }
            Err(_) => {
                failure.get_or_insert(StageError::StagePanicked);
            }
        }
    }
}

/// Stage 1: per seed, emit `fast(s) ~ fast(slow(s))` where `s` is the seed's
/// decimal form and the slow call holds one quota permit.
pub fn dual_hash_stage(digests: Arc<dyn DigestSuite>, quota: Arc<Quota>) -> StageFn {
    Box::new(move |in_rx, out_tx| {
        let mut workers: Vec<WorkerHandle> = Vec::new();
        let mut failure: Option<StageError> = None;
        while let Ok(item) = in_rx.recv() {
            match item.into_seed() {
                Ok(seed) => {
                    let digests = Arc::clone(&digests);
                    let quota = Arc::clone(&quota);
                    let out_tx = out_tx.clone();
                    workers.push(thread::spawn(move || {
                        dual_hash_worker(seed, digests, &quota, &out_tx)
                    }));
                }
                Err(err) => {
                    failure = Some(err);
                    break;
                }
            }
        }
        // Disconnect upstream before joining so a blocked producer unblocks.
        drop(in_rx);
        join_workers(workers, &mut failure);
        match failure {
            Some(err) => Err(err),
            None => Ok(()),
        }
    })
}

/// One dual-hash worker: the fast half runs on its own thread while the
/// layered half runs here — slow digest under a quota permit, then the fast
/// digest of its result. The permit is scoped to the slow call alone.
fn dual_hash_worker(
    seed: u64,
    digests: Arc<dyn DigestSuite>,
    quota: &Quota,
    out_tx: &Sender<Item>,
) -> Result<(), StageError> {
    let text = seed.to_string();
    let fast_handle = {
        let digests = Arc::clone(&digests);
        let text = text.clone();
        thread::spawn(move || digests.fast_digest(&text))
    };
    let inner = {
        let _permit = quota.acquire();
        digests.slow_digest(&text)
    };
    let layered = digests.fast_digest(&inner);
    let fast = fast_handle.join().map_err(|_| StageError::StagePanicked)?;
    let _ = out_tx.send(Item::Digest(format!("{fast}{DUAL_SEPARATOR}{layered}")));
    Ok(())
}

/// Stage 2: per digest string `s`, emit the concatenation of
/// `fast("0" + s)` through `fast("5" + s)` in ascending index order.
pub fn fan_hash_stage(digests: Arc<dyn DigestSuite>) -> StageFn {
    Box::new(move |in_rx, out_tx| {
        let mut workers: Vec<WorkerHandle> = Vec::new();
        let mut failure: Option<StageError> = None;
        while let Ok(item) = in_rx.recv() {
            match item.into_digest() {
                Ok(text) => {
                    let digests = Arc::clone(&digests);
                    let out_tx = out_tx.clone();
                    workers.push(thread::spawn(move || {
                        fan_hash_worker(text, digests, &out_tx)
                    }));
                }
                Err(err) => {
                    failure = Some(err);
                    break;
                }
            }
        }
        drop(in_rx);
        join_workers(workers, &mut failure);
        match failure {
            Some(err) => Err(err),
            None => Ok(()),
        }
    })
}

/// One fan worker: the six sub-digests race on their own threads; joining
/// the handles in spawn order rebuilds the ascending-index concatenation no
/// matter which finishes first. Each sub-result comes back through its own
/// join handle, so there is no shared per-item state to guard.
fn fan_hash_worker(
    text: String,
    digests: Arc<dyn DigestSuite>,
    out_tx: &Sender<Item>,
) -> Result<(), StageError> {
    let subs: Vec<JoinHandle<String>> = (0..FAN_WIDTH)
        .map(|idx| {
            let digests = Arc::clone(&digests);
            let text = text.clone();
            thread::spawn(move || digests.fast_digest(&format!("{idx}{text}")))
        })
        .collect();
    let mut joined = String::new();
    for sub in subs {
        let part = sub.join().map_err(|_| StageError::StagePanicked)?;
        joined.push_str(&part);
    }
    let _ = out_tx.send(Item::Digest(joined));
    Ok(())
}

/// Stage 3: drain the input, sort once at end-of-stream, and emit exactly
/// one digest joining everything with `_`. Zero inputs yield the empty join.
/// No internal concurrency; items are folded one at a time, so the final
/// output depends only on the set of strings received.
pub fn combine_stage() -> StageFn {
    Box::new(move |in_rx, out_tx| {
        let mut results: Vec<String> = Vec::new();
        while let Ok(item) = in_rx.recv() {
            results.push(item.into_digest()?);
        }
        results.sort_unstable();
        debug!("combine: joining {} results", results.len());
        let _ = out_tx.send(Item::Digest(results.join(COMBINE_SEPARATOR)));
        Ok(())
    })
}
