use hashloom::digest::DigestSuite;
use hashloom::pipeline::{
    combine_stage, dual_hash_stage, fan_hash_stage, run_pipeline, spawn_feeder, Quota, FAN_WIDTH,
};
use hashloom::{sign_values_with, Item, ItemKind, LoomOpts, StageError};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

// --- fake digest suites ---

/// fast = identity, slow = G(x): every expected string is a literal.
struct IdentityDigests;

impl DigestSuite for IdentityDigests {
    fn fast_digest(&self, text: &str) -> String {
        text.to_string()
    }

    fn slow_digest(&self, text: &str) -> String {
        format!("G({text})")
    }
}

/// Identity suite with per-index delays skewed so that higher fan indices
/// finish first: an index-prefixed input sleeps (5 - index) * 10 ms.
struct SkewedDigests;

impl DigestSuite for SkewedDigests {
    fn fast_digest(&self, text: &str) -> String {
        if let Some(d) = text.chars().next().and_then(|c| c.to_digit(10)) {
            thread::sleep(Duration::from_millis(5u64.saturating_sub(d as u64) * 10));
        }
        text.to_string()
    }

    fn slow_digest(&self, text: &str) -> String {
        format!("G({text})")
    }
}

/// Suite whose fast digest panics, for exercising panic surfacing.
struct ExplodingDigests;

impl DigestSuite for ExplodingDigests {
    fn fast_digest(&self, _text: &str) -> String {
        panic!("digest blew up")
    }

    fn slow_digest(&self, text: &str) -> String {
        format!("G({text})")
    }
}

/// Identity suite tracking the concurrent slow-digest call count and its
/// high-water mark.
struct CountingDigests {
    current: AtomicUsize,
    peak: AtomicUsize,
}

impl CountingDigests {
    fn new() -> Self {
        Self {
            current: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        }
    }
}

impl DigestSuite for CountingDigests {
    fn fast_digest(&self, text: &str) -> String {
        text.to_string()
    }

    fn slow_digest(&self, text: &str) -> String {
        let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        thread::sleep(Duration::from_millis(5));
        self.current.fetch_sub(1, Ordering::SeqCst);
        format!("G({text})")
    }
}

fn opts(quota_capacity: usize) -> LoomOpts {
    LoomOpts { quota_capacity }
}

fn digest_strings(items: Vec<Item>) -> Vec<String> {
    items
        .into_iter()
        .map(|i| i.into_digest().expect("stage emitted a non-digest item"))
        .collect()
}

// --- dual hash stage ---

#[test]
fn test_dual_stage_formula() {
    let digests: Arc<dyn DigestSuite> = Arc::new(IdentityDigests);
    let quota = Arc::new(Quota::new(1));
    let (source, _feeder) = spawn_feeder(vec![Item::Seed(7)]);
    let out = run_pipeline(vec![dual_hash_stage(digests, quota)], source).unwrap();
    assert_eq!(digest_strings(out), vec!["7~G(7)".to_string()]);
}

#[test]
fn test_dual_stage_many_items_unordered() {
    let digests: Arc<dyn DigestSuite> = Arc::new(IdentityDigests);
    let quota = Arc::new(Quota::new(1));
    let items: Vec<Item> = (0..8).map(Item::Seed).collect();
    let (source, _feeder) = spawn_feeder(items);
    let out = run_pipeline(vec![dual_hash_stage(digests, quota)], source).unwrap();
    let mut got = digest_strings(out);
    got.sort();
    let mut expected: Vec<String> = (0..8).map(|n| format!("{n}~G({n})")).collect();
    expected.sort();
    assert_eq!(got, expected);
}

// --- fan hash stage ---

#[test]
fn test_fan_stage_formula() {
    assert_eq!(FAN_WIDTH, 6);
    let digests: Arc<dyn DigestSuite> = Arc::new(IdentityDigests);
    let (source, _feeder) = spawn_feeder(vec![Item::Digest("ab".to_string())]);
    let out = run_pipeline(vec![fan_hash_stage(digests)], source).unwrap();
    assert_eq!(digest_strings(out), vec!["0ab1ab2ab3ab4ab5ab".to_string()]);
}

#[test]
fn test_fan_stage_index_order_survives_skewed_completion() {
    // Higher indices complete first under SkewedDigests; the output must
    // still concatenate by ascending index.
    let digests: Arc<dyn DigestSuite> = Arc::new(SkewedDigests);
    let (source, _feeder) = spawn_feeder(vec![Item::Digest("ab".to_string())]);
    let out = run_pipeline(vec![fan_hash_stage(digests)], source).unwrap();
    assert_eq!(digest_strings(out), vec!["0ab1ab2ab3ab4ab5ab".to_string()]);
}

// --- combine stage ---

#[test]
fn test_combine_order_independent() {
    let permutations: [[&str; 3]; 3] = [["a", "b", "c"], ["c", "a", "b"], ["b", "c", "a"]];
    for perm in permutations {
        let items: Vec<Item> = perm.iter().map(|s| Item::Digest(s.to_string())).collect();
        let (source, _feeder) = spawn_feeder(items);
        let out = run_pipeline(vec![combine_stage()], source).unwrap();
        assert_eq!(digest_strings(out), vec!["a_b_c".to_string()]);
    }
}

#[test]
fn test_combine_empty_input_emits_empty_join() {
    let (source, _feeder) = spawn_feeder(Vec::new());
    let out = run_pipeline(vec![combine_stage()], source).unwrap();
    assert_eq!(digest_strings(out), vec![String::new()]);
}

// --- quota invariant ---

#[test]
fn test_quota_ceiling_capacity_one() {
    let digests = Arc::new(CountingDigests::new());
    let values: Vec<u64> = (0..24).collect();
    let suite: Arc<dyn DigestSuite> = Arc::clone(&digests) as Arc<dyn DigestSuite>;
    sign_values_with(&values, suite, &opts(1)).unwrap();
    assert!(digests.peak.load(Ordering::SeqCst) <= 1);
    assert_eq!(digests.current.load(Ordering::SeqCst), 0);
}

#[test]
fn test_quota_ceiling_capacity_three() {
    let digests = Arc::new(CountingDigests::new());
    let values: Vec<u64> = (0..24).collect();
    let suite: Arc<dyn DigestSuite> = Arc::clone(&digests) as Arc<dyn DigestSuite>;
    sign_values_with(&values, suite, &opts(3)).unwrap();
    assert!(digests.peak.load(Ordering::SeqCst) <= 3);
    assert_eq!(digests.current.load(Ordering::SeqCst), 0);
}

// --- end to end ---

#[test]
fn test_end_to_end_literal() {
    let combined = sign_values_with(&[0, 1], Arc::new(IdentityDigests), &opts(1)).unwrap();
    let fan0 = "00~G(0)10~G(0)20~G(0)30~G(0)40~G(0)50~G(0)";
    let fan1 = "01~G(1)11~G(1)21~G(1)31~G(1)41~G(1)51~G(1)";
    assert_eq!(combined, format!("{fan0}_{fan1}"));
}

#[test]
fn test_end_to_end_input_order_does_not_matter() {
    let forward = sign_values_with(&[0, 1, 2], Arc::new(IdentityDigests), &opts(1)).unwrap();
    let reversed = sign_values_with(&[2, 1, 0], Arc::new(IdentityDigests), &opts(1)).unwrap();
    assert_eq!(forward, reversed);
}

#[test]
fn test_end_to_end_empty_input() {
    let combined = sign_values_with(&[], Arc::new(IdentityDigests), &opts(1)).unwrap();
    assert_eq!(combined, "");
}

// --- fatal type mismatch ---

#[test]
fn test_type_mismatch_aborts_dual_stage() {
    let digests: Arc<dyn DigestSuite> = Arc::new(IdentityDigests);
    let quota = Arc::new(Quota::new(1));
    let (source, _feeder) = spawn_feeder(vec![Item::Digest("oops".to_string())]);
    let err = run_pipeline(vec![dual_hash_stage(digests, quota)], source).unwrap_err();
    assert_eq!(
        err,
        StageError::TypeMismatch {
            expected: ItemKind::Seed,
            found: ItemKind::Digest,
        }
    );
}

#[test]
fn test_panicking_digest_surfaces_stage_panicked() {
    // A panicking digest must come back as a typed error at join time, not
    // crash the caller; the feeder join on this path must not block either.
    let err = sign_values_with(&[1], Arc::new(ExplodingDigests), &opts(1)).unwrap_err();
    assert_eq!(
        err.downcast::<StageError>().unwrap(),
        StageError::StagePanicked
    );
}

#[test]
fn test_zero_quota_capacity_is_rejected() {
    let err = sign_values_with(&[1], Arc::new(IdentityDigests), &opts(0)).unwrap_err();
    assert!(err.to_string().contains("quota capacity"));
}

#[test]
fn test_type_mismatch_halts_full_chain() {
    let digests: Arc<dyn DigestSuite> = Arc::new(IdentityDigests);
    let quota = Arc::new(Quota::new(1));
    let stages = vec![
        dual_hash_stage(Arc::clone(&digests), quota),
        fan_hash_stage(digests),
        combine_stage(),
    ];
    // A well-typed seed followed by a mismatched item: the run must halt
    // with the typed error and never surface a final combined digest.
    let (source, _feeder) = spawn_feeder(vec![Item::Seed(1), Item::Digest("bad".to_string())]);
    let err = run_pipeline(stages, source).unwrap_err();
    assert_eq!(
        err,
        StageError::TypeMismatch {
            expected: ItemKind::Seed,
            found: ItemKind::Digest,
        }
    );
}
