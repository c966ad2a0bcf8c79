// src/pipeline/mod.rs

//! Aggregation pipeline: orchestrator and host-facing output contract.

mod aggregate;
mod sink;

pub use aggregate::{Aggregator, SearchRequest};
pub use sink::{CourseResult, ResultSink, VecSink};
