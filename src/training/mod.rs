//! Training infrastructure: episode driver, evaluation, rolling metrics and
//! the checkpointing trainer loop.

pub mod episode;
pub mod metrics;
pub mod trainer;
