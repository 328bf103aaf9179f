use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Dimensions of one hex cell plus the distance tolerances derived from it.
/// All values are play-area pixels and do not change with zoom.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct HexMetrics {
    /// Center-to-center distance of horizontal neighbors.
    pub width: f32,
    /// Cell height. Diagonal neighbors sit 0.75 * height above or below.
    pub height: f32,
    /// Two points closer than this are the same slot.
    pub collision_threshold: f32,
    /// Maximum distance a dropped element travels to reach a snap slot.
    pub snap_distance: f32,
    /// Slack allowed when testing "exactly two cells apart".
    pub implicit_tolerance: f32,
}

impl Default for HexMetrics {
    fn default() -> Self {
        // height = 2w / sqrt(3) keeps all six neighbors at distance `width`.
        Self {
            width: 100.0,
            height: 115.470_05,
            collision_threshold: 40.0,
            snap_distance: 60.0,
            implicit_tolerance: 5.0,
        }
    }
}

impl HexMetrics {
    pub fn half_extent(&self) -> Vec2 {
        Vec2::new(self.width * 0.5, self.height * 0.5)
    }

    /// Neighbor offsets. Opposite directions are paired: `i ^ 1` is the
    /// reverse of `i`.
    pub fn neighbor_offsets(&self) -> [Vec2; 6] {
        let w = self.width;
        let half_w = w * 0.5;
        let dy = self.height * 0.75;
        [
            Vec2::new(w, 0.0),
            Vec2::new(-w, 0.0),
            Vec2::new(half_w, -dy),
            Vec2::new(-half_w, dy),
            Vec2::new(-half_w, -dy),
            Vec2::new(half_w, dy),
        ]
    }

    pub fn is_valid(&self) -> bool {
        self.width > 0.0
            && self.height > 0.0
            && self.collision_threshold > 0.0
            && self.collision_threshold < self.width
            && self.snap_distance >= 0.0
            && self.implicit_tolerance >= 0.0
    }
}

/// Index of the direction pointing back at the origin.
pub fn opposite(direction: usize) -> usize {
    direction ^ 1
}

/// The six slot centers surrounding `center`.
pub fn neighbor_points(center: Vec2, metrics: &HexMetrics) -> [Vec2; 6] {
    metrics.neighbor_offsets().map(|offset| center + offset)
}

pub fn same_slot(a: Vec2, b: Vec2, metrics: &HexMetrics) -> bool {
    a.distance(b) < metrics.collision_threshold
}

/// True if `b` occupies one of the six slots around `a`.
pub fn is_adjacent(a: Vec2, b: Vec2, metrics: &HexMetrics) -> bool {
    neighbor_points(a, metrics)
        .iter()
        .any(|&n| same_slot(n, b, metrics))
}

/// Dedup key for search: rounds to whole pixels so float drift from
/// repeated offsets still maps onto the same slot.
pub fn slot_key(point: Vec2) -> (i32, i32) {
    (point.x.round() as i32, point.y.round() as i32)
}

/// The slot around `points[0]` that is adjacent to every other point and is
/// not itself one of them. This is the hub a partial ring closes around.
pub fn common_neighbor(points: &[Vec2], metrics: &HexMetrics) -> Option<Vec2> {
    let (&first, rest) = points.split_first()?;
    if rest.is_empty() {
        return None;
    }
    neighbor_points(first, metrics).into_iter().find(|&candidate| {
        rest.iter().all(|&p| is_adjacent(p, candidate, metrics))
            && !points.iter().any(|&p| same_slot(p, candidate, metrics))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn default_metrics_place_every_neighbor_one_width_away() {
        let m = HexMetrics::default();
        let origin = Vec2::new(600.0, 400.0);
        for n in neighbor_points(origin, &m) {
            let d = origin.distance(n);
            assert!((d - m.width).abs() < 0.01, "neighbor at distance {d}");
        }
    }

    #[test]
    fn neighbors_are_distinct_slots() {
        let m = HexMetrics::default();
        let pts = neighbor_points(Vec2::ZERO, &m);
        for i in 0..6 {
            for j in (i + 1)..6 {
                assert!(!same_slot(pts[i], pts[j], &m), "{i} and {j} collide");
            }
        }
    }

    #[test]
    fn opposite_offsets_cancel() {
        let m = HexMetrics::default();
        let offsets = m.neighbor_offsets();
        for i in 0..6 {
            let sum = offsets[i] + offsets[opposite(i)];
            assert!(sum.length() < 1e-4);
        }
    }

    #[test]
    fn adjacency_is_not_reflexive() {
        let m = HexMetrics::default();
        let p = Vec2::new(10.0, 10.0);
        assert!(!is_adjacent(p, p, &m));
        assert!(is_adjacent(p, p + Vec2::new(m.width, 0.0), &m));
        assert!(!is_adjacent(p, p + Vec2::new(2.0 * m.width, 0.0), &m));
    }

    #[test]
    fn slot_key_rounds_drift() {
        assert_eq!(slot_key(Vec2::new(99.999, 200.4)), (100, 200));
        assert_eq!(slot_key(Vec2::new(-0.4, -50.6)), (0, -51));
    }

    #[test]
    fn common_neighbor_of_bent_triple_is_the_hub() {
        let m = HexMetrics::default();
        let hub = Vec2::new(500.0, 500.0);
        let around = neighbor_points(hub, &m);
        // East, south-east, south-west walk around the hub.
        let triple = [around[0], around[5], around[3]];
        let found = common_neighbor(&triple, &m).unwrap();
        assert!(same_slot(found, hub, &m));
    }

    #[test]
    fn straight_line_has_no_common_neighbor() {
        let m = HexMetrics::default();
        let a = Vec2::ZERO;
        let line = [a, a + Vec2::new(m.width, 0.0), a + Vec2::new(2.0 * m.width, 0.0)];
        assert!(common_neighbor(&line, &m).is_none());
    }

    #[test]
    fn single_point_has_no_common_neighbor() {
        let m = HexMetrics::default();
        assert!(common_neighbor(&[Vec2::ZERO], &m).is_none());
        assert!(common_neighbor(&[], &m).is_none());
    }

    proptest! {
        #[test]
        fn stepping_out_and_back_returns_home(
            x in -5000.0f32..5000.0,
            y in -5000.0f32..5000.0,
            dir in 0usize..6,
        ) {
            let m = HexMetrics::default();
            let home = Vec2::new(x, y);
            let out = neighbor_points(home, &m)[dir];
            let back = neighbor_points(out, &m)[opposite(dir)];
            prop_assert!(home.distance(back) < 0.01);
            prop_assert!(is_adjacent(out, home, &m));
        }
    }
}
