use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::lattice::HexMetrics;

/// The rectangular blueprint surface modules are arranged on, in pixels.
/// Terrain is described in percent of this rectangle.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlayArea {
    pub width: f32,
    pub height: f32,
}

impl Default for PlayArea {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 800.0,
        }
    }
}

impl PlayArea {
    /// Canonical search origin for new modules.
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width * 0.5, self.height * 0.5)
    }

    /// Whether a cell centered at `center` lies fully inside the area.
    pub fn contains_cell(&self, center: Vec2, metrics: &HexMetrics) -> bool {
        let half = metrics.half_extent();
        center.x - half.x >= 0.0
            && center.y - half.y >= 0.0
            && center.x + half.x <= self.width
            && center.y + half.y <= self.height
    }

    /// Pixel point to percent-of-area coordinates.
    pub fn to_percent(&self, point: Vec2) -> Vec2 {
        Vec2::new(point.x / self.width * 100.0, point.y / self.height * 100.0)
    }

    pub fn from_percent(&self, percent: Vec2) -> Vec2 {
        Vec2::new(percent.x * self.width / 100.0, percent.y * self.height / 100.0)
    }

    /// Narrow `delta` so that every cell centered at one of `centers`,
    /// moved by it, stays inside the area.
    pub fn clamp_translation(&self, centers: &[Vec2], delta: Vec2, metrics: &HexMetrics) -> Vec2 {
        if centers.is_empty() {
            return delta;
        }
        let half = metrics.half_extent();
        let (mut min, mut max) = (Vec2::splat(f32::MAX), Vec2::splat(f32::MIN));
        for &c in centers {
            min = min.min(c - half);
            max = max.max(c + half);
        }
        let lower = -min;
        let upper = Vec2::new(self.width, self.height) - max;
        // A cluster larger than the area cannot fit anywhere; leave it put.
        Vec2::new(
            if lower.x > upper.x { 0.0 } else { delta.x.clamp(lower.x, upper.x) },
            if lower.y > upper.y { 0.0 } else { delta.y.clamp(lower.y, upper.y) },
        )
    }

    pub fn is_valid(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }
}
