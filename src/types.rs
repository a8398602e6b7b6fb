//! Public and internal types for the hashloom API and pipeline.

use thiserror::Error;

/// One value flowing between pipeline stages.
///
/// The pipeline entry feeds [`Item::Seed`]s; the dual-hash stage turns each
/// seed into an [`Item::Digest`], and every later stage consumes and produces
/// digests. Stages validate the variant they receive and fail with
/// [`StageError::TypeMismatch`] instead of coercing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Item {
    /// Integer identifier supplied by the caller at pipeline entry.
    Seed(u64),
    /// Digest string produced by a stage.
    Digest(String),
}

impl Item {
    /// Variant tag, used in error reporting.
    pub fn kind(&self) -> ItemKind {
        match self {
            Item::Seed(_) => ItemKind::Seed,
            Item::Digest(_) => ItemKind::Digest,
        }
    }

    /// Consume as a seed, or report a mismatch.
    pub fn into_seed(self) -> Result<u64, StageError> {
        match self {
            Item::Seed(n) => Ok(n),
            other => Err(StageError::TypeMismatch {
                expected: ItemKind::Seed,
                found: other.kind(),
            }),
        }
    }

    /// Consume as a digest string, or report a mismatch.
    pub fn into_digest(self) -> Result<String, StageError> {
        match self {
            Item::Digest(s) => Ok(s),
            other => Err(StageError::TypeMismatch {
                expected: ItemKind::Digest,
                found: other.kind(),
            }),
        }
    }
}

/// Variant tag of an [`Item`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ItemKind {
    Seed,
    Digest,
}

impl std::fmt::Display for ItemKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ItemKind::Seed => write!(f, "seed"),
            ItemKind::Digest => write!(f, "digest"),
        }
    }
}

/// Fatal pipeline errors. None of these are recovered or retried; the run
/// halts without producing a final combined digest.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum StageError {
    /// An item arrived at a stage that expects the other variant.
    #[error("stage expected a {expected} item, got a {found}")]
    TypeMismatch {
        expected: ItemKind,
        found: ItemKind,
    },
    /// A stage thread panicked; observed when the runner joins it.
    #[error("stage thread panicked")]
    StagePanicked,
    /// The final stage closed its output without emitting a combined digest.
    #[error("pipeline produced no final digest")]
    MissingFinal,
}

/// Lib-only options for [`sign_values`](crate::sign_values). Only the fields
/// that apply when using the crate directly.
#[derive(Clone, Debug)]
pub struct LoomOpts {
    /// Concurrent slow-digest call ceiling shared by the whole run.
    pub quota_capacity: usize,
}

impl Default for LoomOpts {
    fn default() -> Self {
        Self {
            quota_capacity: crate::pipeline::DEFAULT_QUOTA_CAPACITY,
        }
    }
}

/// Full options (CLI). Use [`LoomOpts`] for lib.
#[derive(Clone, Debug)]
pub struct Opts {
    /// Concurrent slow-digest call ceiling shared by the whole run.
    pub quota_capacity: usize,
    /// Verbose output (debug logging).
    pub verbose: bool,
}

impl Default for Opts {
    fn default() -> Self {
        Self {
            quota_capacity: crate::pipeline::DEFAULT_QUOTA_CAPACITY,
            verbose: false,
        }
    }
}

impl From<&Opts> for LoomOpts {
    fn from(o: &Opts) -> Self {
        LoomOpts {
            quota_capacity: o.quota_capacity,
        }
    }
}
