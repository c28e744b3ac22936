//! Integration tests for the fixed-capacity position history.
//!
//! Covers the fill lifecycle (empty, partial, full) and the derived
//! queries that depend on where the write cursor sits in the ring.

use marker_tracker::{FillState, Point3, PositionHistory, TrackingError, DEFAULT_LABEL};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn p(x: f64, y: f64, z: f64) -> Point3 {
    Point3::new(x, y, z)
}

fn history_with(capacity: usize, points: &[Point3]) -> PositionHistory {
    let mut history = PositionHistory::new(capacity, 1, "test").expect("valid capacity");
    for &point in points {
        history.insert(point);
    }
    history
}

#[test]
fn zero_capacity_is_rejected() {
    let res = PositionHistory::new(0, 4, "bad");
    assert!(matches!(res, Err(TrackingError::InvalidConfiguration(_))));
}

#[test]
fn default_label_is_applied() {
    let history = PositionHistory::with_default_label(3, 12).unwrap();
    assert_eq!(history.label(), DEFAULT_LABEL);
    assert_eq!(history.id(), 12);
    assert_eq!(history.to_string(), "PositionHistory(3, 12, unlabelled marker)");
}

#[test]
fn empty_history_rejects_every_query() {
    let history = PositionHistory::new(3, 1, "empty").unwrap();

    assert_eq!(history.len(), 0);
    assert_eq!(history.fill_state(), FillState::Empty);
    assert!(matches!(history.last(), Err(TrackingError::EmptyHistory)));
    assert!(matches!(history.first(), Err(TrackingError::EmptyHistory)));
    assert!(matches!(history.prev(), Err(TrackingError::EmptyHistory)));
    assert!(matches!(history.get(0), Err(TrackingError::EmptyHistory)));
    assert!(matches!(history.velocity(), Err(TrackingError::EmptyHistory)));
    assert!(matches!(history.distance(), Err(TrackingError::EmptyHistory)));
    assert_eq!(history.iter().count(), 0);
}

#[test]
fn single_point_has_no_motion() {
    let history = history_with(4, &[p(1.0, 2.0, 3.0)]);

    assert_eq!(history.fill_state(), FillState::Partial(1));
    assert_eq!(history.last().unwrap(), p(1.0, 2.0, 3.0));
    assert_eq!(history.first().unwrap(), p(1.0, 2.0, 3.0));
    assert_eq!(history.prev().unwrap(), p(1.0, 2.0, 3.0));
    assert_eq!(history.velocity().unwrap(), Point3::ORIGIN);
    assert_eq!(history.distance().unwrap(), 0.0);
}

#[test]
fn two_points_give_finite_difference_velocity() {
    let history = history_with(5, &[p(1.0, 1.0, 1.0), p(3.0, 0.5, 4.0)]);

    assert_eq!(history.prev().unwrap(), p(1.0, 1.0, 1.0));
    assert_eq!(history.velocity().unwrap(), p(2.0, -0.5, 3.0));
}

#[test]
fn wraparound_keeps_newest_window() {
    // capacity 2, three inserts: the first point has been overwritten.
    let history = history_with(2, &[p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(2.0, 0.0, 0.0)]);

    assert_eq!(history.len(), 2);
    assert_eq!(history.fill_state(), FillState::Full);
    assert_eq!(history.last().unwrap(), p(2.0, 0.0, 0.0));
    assert_eq!(history.first().unwrap(), p(1.0, 0.0, 0.0));
    assert_eq!(history.velocity().unwrap(), p(1.0, 0.0, 0.0));
    assert_eq!(history.distance().unwrap(), 1.0);
}

#[test]
fn first_tracks_oldest_surviving_point() {
    let points: Vec<Point3> = (0..4).map(|i| p(i as f64, 0.0, 0.0)).collect();

    let exactly_full = history_with(3, &points[..3]);
    assert_eq!(exactly_full.first().unwrap(), points[0]);

    let one_over = history_with(3, &points);
    assert_eq!(one_over.first().unwrap(), points[1]);
    assert_eq!(one_over.last().unwrap(), points[3]);
    assert_eq!(one_over.prev().unwrap(), points[2]);
}

#[test]
fn distance_is_net_displacement_not_path_length() {
    // Goes out and comes back: path length 4, net displacement 0.
    let history = history_with(
        5,
        &[p(0.0, 0.0, 0.0), p(2.0, 0.0, 0.0), p(0.0, 0.0, 0.0)],
    );
    assert_eq!(history.distance().unwrap(), 0.0);

    let history = history_with(5, &[p(0.0, 0.0, 0.0), p(3.0, 4.0, 0.0)]);
    assert_eq!(history.distance().unwrap(), 5.0);
}

#[test]
fn get_wraps_negative_and_large_indices() {
    let history = history_with(3, &[p(1.0, 0.0, 0.0), p(2.0, 0.0, 0.0), p(3.0, 0.0, 0.0)]);

    assert_eq!(history.get(0).unwrap(), p(1.0, 0.0, 0.0));
    assert_eq!(history.get(-1).unwrap(), p(3.0, 0.0, 0.0));
    assert_eq!(history.get(4).unwrap(), p(2.0, 0.0, 0.0));
}

#[test]
fn partial_history_rejects_unwritten_slots() {
    let history = history_with(5, &[p(1.0, 0.0, 0.0), p(2.0, 0.0, 0.0)]);

    assert_eq!(history.get(0).unwrap(), p(1.0, 0.0, 0.0));
    assert_eq!(history.get(1).unwrap(), p(2.0, 0.0, 0.0));
    assert_eq!(history.get(-1).unwrap(), p(2.0, 0.0, 0.0));
    assert_eq!(history.get(-2).unwrap(), p(1.0, 0.0, 0.0));

    for index in [2, 4, -3] {
        let res = history.get(index);
        assert!(
            matches!(res, Err(TrackingError::IndexOutOfRange { index: i, len: 2 }) if i == index),
            "get({}) returned {:?}",
            index,
            res
        );
    }
}

#[test]
fn full_history_still_wraps_any_index() {
    let history = history_with(3, &[p(1.0, 0.0, 0.0), p(2.0, 0.0, 0.0), p(3.0, 0.0, 0.0)]);

    assert_eq!(history.get(5).unwrap(), p(3.0, 0.0, 0.0));
    assert_eq!(history.get(-4).unwrap(), p(3.0, 0.0, 0.0));
    assert_eq!(history.first().unwrap(), p(1.0, 0.0, 0.0));
}

#[test]
fn iteration_is_chronological_and_restartable() {
    let points: Vec<Point3> = (0..5).map(|i| p(i as f64, 0.0, 0.0)).collect();

    let partial = history_with(8, &points);
    assert_eq!(partial.iter().collect::<Vec<_>>(), points);

    let wrapped = history_with(3, &points);
    let expected = points[2..].to_vec();
    assert_eq!(wrapped.iter().collect::<Vec<_>>(), expected);
    assert_eq!(wrapped.iter().len(), 3);
    // a second pass yields the same sequence
    assert_eq!((&wrapped).into_iter().collect::<Vec<_>>(), expected);
}

#[test]
fn non_finite_values_propagate() {
    let history = history_with(3, &[p(0.0, 0.0, 0.0), p(f64::INFINITY, 0.0, 0.0)]);
    assert!(history.distance().unwrap().is_infinite());

    let history = history_with(3, &[p(f64::NAN, 0.0, 0.0), p(1.0, 0.0, 0.0)]);
    assert!(history.velocity().unwrap().x.is_nan());
}

proptest! {
    #[test]
    fn length_is_min_of_inserts_and_capacity(capacity in 1usize..16, inserts in 0usize..48) {
        let mut history = PositionHistory::new(capacity, 0, "prop").unwrap();
        for i in 0..inserts {
            history.insert(Point3::new(i as f64, 0.0, 0.0));
        }
        prop_assert_eq!(history.len(), inserts.min(capacity));
    }

    #[test]
    fn window_holds_the_latest_points(capacity in 1usize..16, inserts in 1usize..48) {
        let points: Vec<Point3> = (0..inserts).map(|i| Point3::new(i as f64, -(i as f64), 0.5)).collect();
        let mut history = PositionHistory::new(capacity, 0, "prop").unwrap();
        for &point in &points {
            history.insert(point);
        }

        let kept = inserts.min(capacity);
        let window = &points[inserts - kept..];
        prop_assert_eq!(history.last().unwrap(), points[inserts - 1]);
        prop_assert_eq!(history.first().unwrap(), window[0]);
        prop_assert_eq!(history.iter().collect::<Vec<_>>(), window.to_vec());
        prop_assert_eq!(history.distance().unwrap(), window[kept - 1].distance_to(&window[0]));
    }
}
