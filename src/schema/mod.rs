//! Aggregate wire schema
//!
//! This module defines the per-video aggregate record as it is delivered by the
//! interaction server: liked points, playback sessions, and content-analysis
//! (MCA) output keyed by algorithm name.

mod raw_aggregate;

pub use raw_aggregate::*;
