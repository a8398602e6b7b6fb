//! Hashloom: layered digest pipeline over integer streams.
//!
//! Three concurrent stages chained over rendezvous channels: a per-item
//! dual-hash stage gated by a global slow-digest quota, a six-way fan-hash
//! stage, and a sort-and-join combiner producing one final digest.

pub mod cli;
pub mod digest;
pub mod handlers;
pub mod pipeline;
pub mod tree;
pub mod types;
pub mod utils;

/// Re-export types for API
pub use types::*;

use log::debug;
use std::sync::Arc;

use digest::{DigestSuite, StockDigests};
use pipeline::{combine_stage, dual_hash_stage, fan_hash_stage, run_pipeline, spawn_feeder, Quota};

/// Result alias used by the public hashloom API
pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, Error>;

/// Single entry point: push `values` through the three-stage signing
/// pipeline with the stock digest suite and return the final combined
/// digest. An empty `values` slice yields the empty join `""`.
pub fn sign_values(values: &[u64], opts: &LoomOpts) -> Result<String> {
    sign_values_with(values, Arc::new(StockDigests), opts)
}

/// As [`sign_values`], with a caller-supplied digest suite (e.g. a cheap
/// deterministic fake in tests).
///
/// Feeder → dual hash (quota-gated slow half) → fan hash → combine → one
/// final digest. All stages run concurrently; control returns only after
/// every stage thread has finished.
pub fn sign_values_with(
    values: &[u64],
    digests: Arc<dyn DigestSuite>,
    opts: &LoomOpts,
) -> Result<String> {
    debug!(
        "{} CONFIG:{:#?}",
        env!("CARGO_PKG_NAME").to_uppercase(),
        opts
    );

    if opts.quota_capacity == 0 {
        anyhow::bail!("quota capacity must be at least 1");
    }

    let quota = Arc::new(Quota::new(opts.quota_capacity));
    let stages = vec![
        dual_hash_stage(Arc::clone(&digests), quota),
        fan_hash_stage(digests),
        combine_stage(),
    ];

    let items: Vec<Item> = values.iter().copied().map(Item::Seed).collect();
    let (source, feeder) = spawn_feeder(items);
    let outputs = run_pipeline(stages, source);
    // Every stage has been joined by now, so the feeder has either drained
    // or seen its send fail; this join cannot block, on either path.
    feeder
        .join()
        .map_err(|_| anyhow::anyhow!("feeder thread panicked"))?;
    let outputs = outputs?;

    match outputs.into_iter().next() {
        Some(item) => Ok(item.into_digest()?),
        None => Err(StageError::MissingFinal.into()),
    }
}
