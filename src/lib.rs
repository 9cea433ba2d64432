//! LikeLines - Interest heat-maps and keyframes for videos
//!
//! LikeLines turns the interaction data collected for one video into a
//! normalized interest curve over its timeline and picks the most salient
//! moments from it, through a deterministic pipeline: aggregate parsing →
//! duration estimation → smoothing and resampling of every evidence signal →
//! weighted heat-map composition → hysteresis peak detection → keyframe
//! ranking.
//!
//! ## Evidence
//!
//! - **Likes**: explicit "like" clicks, smoothed with a kernel density estimate
//! - **Playback**: per-second count of sessions that watched each moment
//! - **Content analysis**: weighted CURVE or POINT series from external
//!   analyzers such as motion activity

pub mod aggregate;
pub mod combiner;
pub mod config;
pub mod encoder;
pub mod error;
pub mod heatmap;
pub mod keyframes;
pub mod motion;
pub mod normalizer;
pub mod peaks;
pub mod pipeline;
pub mod resample;
pub mod schema;
pub mod smoothing;
pub mod types;

#[cfg(feature = "cli")]
pub mod logging;

// FFI bindings for C interop (always available for cdylib/staticlib builds)
pub mod ffi;

pub use aggregate::AggregateSnapshot;
pub use config::AnalysisConfig;
pub use error::ComputeError;
pub use heatmap::{heatmap, HeatmapCompositor, DEFAULT_HEATMAP_SIZE};
pub use keyframes::{top_n_keyframes, KeyframeSelector};
pub use pipeline::{aggregate_to_heatmap, aggregate_to_keyframes, LikeLinesProcessor};

// Schema exports
pub use schema::{RawAggregate, RawMcaRecord};

/// LikeLines version embedded in all reports
pub const LIKELINES_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for reports
pub const PRODUCER_NAME: &str = "likelines";
