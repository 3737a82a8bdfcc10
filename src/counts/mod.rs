//! Mention count aggregation
//!
//! Topic ids are counted through `topic_insights`, which accepts at most
//! [`MAX_CHUNK_SECONDS`] per request, so their windows are split into chunks
//! and the per-chunk totals and breakdowns summed. Hashtags are counted with a
//! single `hashtag_counts` request and matched back to the spelling the caller
//! used.

pub mod breakdown;
pub mod classify;
pub mod engine;
pub mod hashtag;
pub mod topic;
pub mod window;

mod response;

/// Longest window the remote API accepts in one topic insights request
pub const MAX_CHUNK_SECONDS: i64 = 21_600;

pub use breakdown::{BreakdownAggregator, BreakdownKey, Observation};
pub use classify::{classify, IdentifierKind};
pub use engine::CountEngine;
pub use hashtag::normalize;
pub use topic::TopicBatch;
pub use window::{Chunk, Chunks, Clock, FixedClock, SystemClock, TimeWindow};
