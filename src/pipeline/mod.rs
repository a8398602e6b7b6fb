//! Pipeline components: quota, runner, stages.

pub mod quota;
pub mod runner;
pub mod stages;

pub use quota::{Permit, Quota};
pub use runner::{
    run_pipeline, spawn_feeder, spawn_pipeline, FirstError, PipelineHandles, StageFn,
    STAGE_CHANNEL_CAP,
};
pub use stages::{
    combine_stage, dual_hash_stage, fan_hash_stage, DEFAULT_QUOTA_CAPACITY, FAN_WIDTH,
};
