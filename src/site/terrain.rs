use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::PlannerError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerrainKind {
    Stable,
    SolarHotspot,
    Unstable,
    WaterIceDeposit,
}

/// A circular terrain region, in percent of the play area.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TerrainZone {
    pub kind: TerrainKind,
    pub center: Vec2,
    pub radius: f32,
}

impl TerrainZone {
    pub fn new(kind: TerrainKind, x: f32, y: f32, radius: f32) -> Self {
        Self {
            kind,
            center: Vec2::new(x, y),
            radius,
        }
    }

    pub fn covers(&self, percent: Vec2) -> bool {
        self.center.distance(percent) <= self.radius
    }
}

/// The rover survey of the blueprint area.
pub fn default_terrain() -> Vec<TerrainZone> {
    vec![
        TerrainZone::new(TerrainKind::Stable, 50.0, 50.0, 40.0),
        TerrainZone::new(TerrainKind::SolarHotspot, 15.0, 50.0, 25.0),
        TerrainZone::new(TerrainKind::Unstable, 90.0, 15.0, 18.0),
        TerrainZone::new(TerrainKind::WaterIceDeposit, 85.0, 85.0, 20.0),
    ]
}

/// A candidate landing site.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LunarZone {
    pub id: u32,
    pub name: String,
    /// Solar exposure in percent.
    pub solar: u8,
    pub water: String,
    pub terrain: String,
    pub details: String,
}

pub fn default_zones() -> Vec<LunarZone> {
    let zone = |id, name: &str, solar, water: &str, terrain: &str, details: &str| LunarZone {
        id,
        name: name.to_string(),
        solar,
        water: water.to_string(),
        terrain: terrain.to_string(),
        details: details.to_string(),
    };
    vec![
        zone(
            1,
            "Shackleton Crater",
            95,
            "A+",
            "Stable",
            "Near-constant sunlight, ideal for power. Direct access to water ice deposits.",
        ),
        zone(
            2,
            "Sea of Serenity",
            60,
            "C-",
            "Flat",
            "Extremely flat terrain, safe for landings. Poor in water resources.",
        ),
        zone(
            3,
            "Malapert Peak",
            88,
            "B",
            "Irregular",
            "High ground with good lighting and direct line of sight to Earth, excellent for communications.",
        ),
    ]
}

/// Terrain facts for the selected landing site.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TerrainContext {
    pub zone: LunarZone,
    pub terrain: Vec<TerrainZone>,
}

impl TerrainContext {
    pub fn new(zone: LunarZone, terrain: Vec<TerrainZone>) -> Self {
        Self { zone, terrain }
    }

    /// Look up `id` in `zones` and pair it with the terrain table.
    pub fn select(zones: &[LunarZone], terrain: &[TerrainZone], id: u32) -> Result<Self, PlannerError> {
        let zone = zones
            .iter()
            .find(|z| z.id == id)
            .cloned()
            .ok_or(PlannerError::UnknownZone(id))?;
        Ok(Self::new(zone, terrain.to_vec()))
    }

    /// Every terrain kind under `percent`, in table order. Ground that is
    /// not unstable counts as stable even outside the stable region.
    pub fn features_at(&self, percent: Vec2) -> Vec<TerrainKind> {
        let mut features: Vec<TerrainKind> = Vec::new();
        for zone in &self.terrain {
            if zone.covers(percent) && !features.contains(&zone.kind) {
                features.push(zone.kind);
            }
        }
        if !features.contains(&TerrainKind::Unstable) && !features.contains(&TerrainKind::Stable) {
            features.push(TerrainKind::Stable);
        }
        features
    }
}
