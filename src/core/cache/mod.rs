//! Challenge caching.
//!
//! A single-slot cache keyed by learner level and practice mode, with
//! 5-minute TTL expiry and in-flight request deduplication.

pub mod challenge_cache;

pub use challenge_cache::{CHALLENGE_TTL, ChallengeCache, ChallengeLoader, SharedChallengeLoad};
