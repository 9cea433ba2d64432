//! Aggregate snapshot
//!
//! An [`AggregateSnapshot`] is the read-only, per-request view of one video's
//! interaction data. It is built once from the wire record, fixes the
//! duration estimate that every derived array is sized by, and provides the
//! playback histogram.

use std::collections::BTreeMap;
use tracing::{debug, warn};

use crate::error::ComputeError;
use crate::schema::RawAggregate;
use crate::types::{
    ContentAnalysisSeries, PlaybackSession, PlayedSegment, SeriesKind, DEEPLINKS_SERIES,
};

/// Longest accepted duration estimate: three days, in seconds
pub const DEFAULT_MAX_DURATION: usize = 3 * 24 * 60 * 60;

/// Immutable per-video interaction data
#[derive(Debug, Clone)]
pub struct AggregateSnapshot {
    liked_points: Vec<f64>,
    playbacks: Vec<PlaybackSession>,
    content_series: BTreeMap<String, ContentAnalysisSeries>,
    duration_estimate: usize,
}

impl AggregateSnapshot {
    /// Build a snapshot, excluding the "deeplinks" series from duration estimation
    pub fn new(
        liked_points: Vec<f64>,
        playbacks: Vec<PlaybackSession>,
        content_series: Vec<ContentAnalysisSeries>,
    ) -> Self {
        Self::with_excluded_series(
            liked_points,
            playbacks,
            content_series,
            &[DEEPLINKS_SERIES.to_string()],
        )
    }

    /// Build a snapshot with an explicit list of POINT series that do not
    /// count towards the duration estimate.
    ///
    /// Estimates beyond [`DEFAULT_MAX_DURATION`] are clamped to it; use
    /// [`AggregateSnapshot::from_raw`] to reject such records instead.
    pub fn with_excluded_series(
        liked_points: Vec<f64>,
        playbacks: Vec<PlaybackSession>,
        content_series: Vec<ContentAnalysisSeries>,
        excluded: &[String],
    ) -> Self {
        let content_series = index_series(content_series);
        let estimate =
            estimate_duration(&liked_points, &playbacks, content_series.values(), excluded);
        let duration_estimate = if estimate > DEFAULT_MAX_DURATION as f64 {
            warn!(estimate, limit = DEFAULT_MAX_DURATION, "clamping duration estimate");
            DEFAULT_MAX_DURATION
        } else {
            estimate as usize
        };
        Self::assemble(liked_points, playbacks, content_series, duration_estimate)
    }

    /// Convert a validated wire record into a snapshot.
    ///
    /// Fails with [`ComputeError::MalformedInput`] when the duration estimate
    /// exceeds `max_duration` seconds.
    pub fn from_raw(
        raw: &RawAggregate,
        excluded: &[String],
        max_duration: usize,
    ) -> Result<Self, ComputeError> {
        raw.validate()?;

        let playbacks: Vec<PlaybackSession> = raw
            .playbacks
            .iter()
            .map(|session| {
                PlaybackSession::new(
                    session
                        .iter()
                        .map(|pair| PlayedSegment::from_endpoints(pair[0], pair[1]))
                        .collect(),
                )
            })
            .collect();

        let mut series = Vec::with_capacity(raw.mca.len());
        for (name, record) in &raw.mca {
            let kind: SeriesKind = record
                .kind
                .parse()
                .map_err(ComputeError::MalformedInput)?;
            let weight = record.weight.unwrap_or(ContentAnalysisSeries::DEFAULT_WEIGHT);
            if record.data.is_empty() {
                warn!(series = %name, "content-analysis series has no values");
            }
            series.push(
                ContentAnalysisSeries::new(name.clone(), kind, record.data.clone())
                    .with_weight(weight),
            );
        }
        let content_series = index_series(series);

        let estimate =
            estimate_duration(&raw.liked_points, &playbacks, content_series.values(), excluded);
        if estimate > max_duration as f64 {
            return Err(ComputeError::MalformedInput(format!(
                "estimated duration of {estimate} s exceeds the limit of {max_duration} s"
            )));
        }

        Ok(Self::assemble(
            raw.liked_points.clone(),
            playbacks,
            content_series,
            estimate as usize,
        ))
    }

    /// Parse and convert an aggregate JSON document
    pub fn from_json(json: &str) -> Result<Self, ComputeError> {
        let raw = RawAggregate::from_json(json)?;
        Self::from_raw(&raw, &[DEEPLINKS_SERIES.to_string()], DEFAULT_MAX_DURATION)
    }

    fn assemble(
        liked_points: Vec<f64>,
        playbacks: Vec<PlaybackSession>,
        content_series: BTreeMap<String, ContentAnalysisSeries>,
        duration_estimate: usize,
    ) -> Self {
        debug!(
            liked_points = liked_points.len(),
            sessions = playbacks.len(),
            series = content_series.len(),
            duration_estimate,
            "built aggregate snapshot"
        );

        Self {
            liked_points,
            playbacks,
            content_series,
            duration_estimate,
        }
    }

    pub fn liked_points(&self) -> &[f64] {
        &self.liked_points
    }

    pub fn playbacks(&self) -> &[PlaybackSession] {
        &self.playbacks
    }

    /// Content-analysis series in name order
    pub fn content_series(&self) -> impl Iterator<Item = &ContentAnalysisSeries> {
        self.content_series.values()
    }

    pub fn series(&self, name: &str) -> Option<&ContentAnalysisSeries> {
        self.content_series.get(name)
    }

    /// Estimated video length in whole seconds (always >= 1)
    pub fn duration_estimate(&self) -> usize {
        self.duration_estimate
    }

    /// Total seconds watched across all sessions
    pub fn time_watched(&self) -> f64 {
        self.segments().map(PlayedSegment::duration).sum()
    }

    /// Number of sessions covering each second of the video.
    ///
    /// Bin `i` counts every played segment with
    /// `floor(start) <= i <= min(ceil(end), duration_estimate - 1)`.
    pub fn playback_histogram(&self) -> Vec<f64> {
        let len = self.duration_estimate;
        let mut histogram = vec![0.0; len];
        let last = (len - 1) as f64;

        for segment in self.segments() {
            if !segment.start.is_finite() || !segment.end.is_finite() {
                continue;
            }
            if segment.end < segment.start {
                warn!(
                    start = segment.start,
                    end = segment.end,
                    "played segment ends before it starts"
                );
            }

            let lo = segment.start.floor().max(0.0);
            let hi = segment.end.ceil().min(last);
            if hi < lo {
                continue;
            }
            for bin in &mut histogram[lo as usize..=hi as usize] {
                *bin += 1.0;
            }
        }

        histogram
    }

    fn segments(&self) -> impl Iterator<Item = &PlayedSegment> {
        self.playbacks.iter().flat_map(|session| session.iter())
    }
}

fn index_series(series: Vec<ContentAnalysisSeries>) -> BTreeMap<String, ContentAnalysisSeries> {
    series
        .into_iter()
        .map(|series| (series.name.clone(), series))
        .collect()
}

/// `ceil(max(1, likes, segment ends, duration-informing POINT values))`
fn estimate_duration<'a>(
    liked_points: &[f64],
    playbacks: &[PlaybackSession],
    series: impl Iterator<Item = &'a ContentAnalysisSeries>,
    excluded: &[String],
) -> f64 {
    let likes = liked_points.iter().copied();
    let ends = playbacks
        .iter()
        .flat_map(|session| session.iter().map(|segment| segment.end));
    let points = series
        .filter(|s| s.informs_duration(excluded))
        .flat_map(|s| s.values.iter().copied());

    let estimate = likes
        .chain(ends)
        .chain(points)
        .filter(|v| v.is_finite())
        .fold(1.0_f64, f64::max)
        .ceil();
    estimate
}
