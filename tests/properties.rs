//! Property tests for the numeric building blocks

use likelines::aggregate::AggregateSnapshot;
use likelines::heatmap::heatmap;
use likelines::keyframes::KeyframeSelector;
use likelines::normalizer::{normalize, scale_of};
use likelines::peaks::Peaks;
use likelines::resample::resample;
use likelines::types::{PlaybackSession, PlayedSegment};
use proptest::prelude::*;

fn segments() -> impl Strategy<Value = Vec<PlaybackSession>> {
    prop::collection::vec(
        prop::collection::vec((0.0..300.0f64, 0.0..60.0f64), 1..4).prop_map(|pairs| {
            PlaybackSession::new(
                pairs
                    .into_iter()
                    .map(|(start, len)| PlayedSegment::new(start, start + len))
                    .collect(),
            )
        }),
        0..4,
    )
}

proptest! {
    #[test]
    fn prop_resample_constant(value in -1e6..1e6f64, n in 1usize..500) {
        prop_assert_eq!(resample(&[value], n), vec![value; n]);
    }

    #[test]
    fn prop_resample_length_and_endpoints(
        data in prop::collection::vec(-1e3..1e3f64, 1..200),
        n in 2usize..1000,
    ) {
        let out = resample(&data, n);
        prop_assert_eq!(out.len(), n);
        prop_assert_eq!(out[0], data[0]);
        prop_assert_eq!(out[n - 1], data[data.len() - 1]);
    }

    #[test]
    fn prop_resample_stays_within_input_range(
        data in prop::collection::vec(-1e3..1e3f64, 1..100),
        n in 1usize..500,
    ) {
        let lo = data.iter().copied().fold(f64::INFINITY, f64::min);
        let hi = data.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        for v in resample(&data, n) {
            prop_assert!(v >= lo - 1e-9 && v <= hi + 1e-9);
        }
    }

    #[test]
    fn prop_normalize_bounds_and_round_trip(data in prop::collection::vec(-1e6..1e6f64, 0..200)) {
        let scale = scale_of(&data);
        let normalized = normalize(&data);
        prop_assert_eq!(normalized.len(), data.len());
        for (n, a) in normalized.iter().zip(&data) {
            prop_assert!(n.abs() <= 1.0);
            if scale != 0.0 {
                prop_assert!((n * scale - a).abs() <= 1e-9 * scale.max(1.0));
            }
        }
    }

    #[test]
    fn prop_heatmap_length_and_range(
        likes in prop::collection::vec(0.0..300.0f64, 0..20),
        playbacks in segments(),
        size in 0usize..600,
    ) {
        let snapshot = AggregateSnapshot::new(likes, playbacks, vec![]);
        let map = heatmap(&snapshot, size);
        prop_assert_eq!(map.len(), size);
        prop_assert!(map.iter().all(|v| (0.0..=1.0).contains(v)));
    }

    #[test]
    fn prop_per_second_heatmap_peaks_at_one(
        likes in prop::collection::vec(0.0..300.0f64, 1..20),
        playbacks in segments(),
    ) {
        let snapshot = AggregateSnapshot::new(likes, playbacks, vec![]);
        let map = heatmap(&snapshot, snapshot.duration_estimate());
        let max = map.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        prop_assert_eq!(max, 1.0);
    }

    #[test]
    fn prop_peaks_alternate_with_valleys(
        signal in prop::collection::vec(-10.0..10.0f64, 0..300),
        delta in 0.01..5.0f64,
    ) {
        let peaks = Peaks::extract(&signal, None, delta).unwrap();
        prop_assert!(
            peaks.peaks.len() == peaks.valleys.len()
                || peaks.peaks.len() == peaks.valleys.len() + 1
        );
        for (peak, valley) in peaks.peaks.iter().zip(&peaks.valleys) {
            prop_assert!(peak.x < valley.x);
            prop_assert!(peak.y - valley.y > delta);
        }
    }

    #[test]
    fn prop_keyframes_are_ranked(
        likes in prop::collection::vec(0.0..200.0f64, 0..30),
        playbacks in segments(),
        n in 0usize..10,
    ) {
        let snapshot = AggregateSnapshot::new(likes, playbacks, vec![]);
        let keyframes = KeyframeSelector::default().keyframes(&snapshot, n).unwrap();
        prop_assert!(keyframes.len() <= n);
        for pair in keyframes.windows(2) {
            prop_assert!(pair[0].score >= pair[1].score);
        }
        for k in &keyframes {
            prop_assert!(k.timecode >= 1.0);
            prop_assert!(k.timecode <= snapshot.duration_estimate() as f64);
        }
    }
}
