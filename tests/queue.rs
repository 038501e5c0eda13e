mod common;

use common::constant;
use storemix_core::{MixError, Track, TrackQueue};

fn queue(names: &[&str]) -> TrackQueue {
    let mut q = TrackQueue::new();
    q.extend(
        names
            .iter()
            .map(|n| Track::voiceover(*n, constant(1, 8000, 0.0, 8000))),
    );
    q
}

fn names(q: &TrackQueue) -> Vec<&str> {
    q.iter().map(|t| t.name.as_str()).collect()
}

#[test]
fn push_front_puts_track_first() {
    let mut q = queue(&["a", "b"]);
    q.push_front(Track::voiceover("intro", constant(1, 10, 0.0, 8000)));
    assert_eq!(names(&q), vec!["intro", "a", "b"]);
}

#[test]
fn remove_by_id() {
    let mut q = queue(&["a", "b", "c"]);
    let id = q.get(1).unwrap().id;

    let removed = q.remove(id).unwrap();
    assert_eq!(removed.name, "b");
    assert_eq!(names(&q), vec!["a", "c"]);
    assert!(q.remove(id).is_none());
}

#[test]
fn move_track_shifts_neighbours() {
    let mut q = queue(&["a", "b", "c", "d"]);
    q.move_track(0, 2).unwrap();
    assert_eq!(names(&q), vec!["b", "c", "a", "d"]);

    q.move_track(3, 0).unwrap();
    assert_eq!(names(&q), vec!["d", "b", "c", "a"]);

    assert!(matches!(q.move_track(4, 0), Err(MixError::Reorder(_))));
}

#[test]
fn permutation_maps_new_position_to_old_index() {
    let mut q = queue(&["a", "b", "c"]);
    q.apply_permutation(&[2, 0, 1]).unwrap();
    assert_eq!(names(&q), vec!["c", "a", "b"]);
}

#[test]
fn bad_permutations_leave_queue_untouched() {
    let mut q = queue(&["a", "b", "c"]);
    for order in [&[0, 1][..], &[0, 1, 1], &[0, 1, 3], &[0, 1, 2, 3]] {
        assert!(matches!(q.apply_permutation(order), Err(MixError::Reorder(_))));
        assert_eq!(names(&q), vec!["a", "b", "c"]);
    }
}

#[test]
fn total_duration_sums_tracks() {
    let q = queue(&["a", "b", "c"]);
    assert!((q.total_duration_secs() - 3.0).abs() < 1e-9);

    let mut q = q;
    q.clear();
    assert!(q.is_empty());
    assert_eq!(q.total_duration_secs(), 0.0);
}
