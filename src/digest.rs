//! Digest primitives consumed by the pipeline stages.

use std::thread;
use std::time::Duration;

/// Per-call cost simulated by [`StockDigests::slow_digest`], standing in for
/// the externally rate-limited resource. 10 ms.
pub const SLOW_DIGEST_COST: Duration = Duration::from_millis(10);

/// The two hash primitives the pipeline layers over its input.
///
/// Both functions are deterministic: the same text always yields the same
/// digest. `fast_digest` is safe for unbounded concurrent invocation.
/// `slow_digest` models a costly, externally rate-limited call; callers must
/// hold a [`Quota`](crate::pipeline::Quota) permit around each invocation
/// (the stages enforce this).
pub trait DigestSuite: Send + Sync {
    fn fast_digest(&self, text: &str) -> String;
    fn slow_digest(&self, text: &str) -> String;
}

/// Stock production suite: xxh3-64 for the fast path, blake3 for the slow
/// path with a simulated per-call cost.
#[derive(Clone, Copy, Debug, Default)]
pub struct StockDigests;

impl DigestSuite for StockDigests {
    fn fast_digest(&self, text: &str) -> String {
        format!("{:016x}", xxhash_rust::xxh3::xxh3_64(text.as_bytes()))
    }

    fn slow_digest(&self, text: &str) -> String {
        thread::sleep(SLOW_DIGEST_COST);
        blake3::hash(text.as_bytes()).to_hex().to_string()
    }
}
