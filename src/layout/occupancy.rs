use std::collections::HashSet;

use glam::Vec2;

use super::world::{CorridorId, LayoutState, ModuleId, RingId};
use crate::hex::lattice::{is_adjacent, same_slot};

/// Elements that are in flight and must not count as obstacles for
/// themselves.
#[derive(Clone, Debug, Default)]
pub struct MovingSet {
    pub modules: HashSet<ModuleId>,
    pub corridors: HashSet<CorridorId>,
    pub rings: HashSet<RingId>,
}

impl LayoutState {
    /// Whether any module or corridor sits in the slot at `point`, ignoring
    /// `exclude`.
    pub fn is_occupied(&self, point: Vec2, exclude: Option<ModuleId>) -> bool {
        let m = &self.metrics;
        self.modules
            .iter()
            .filter(|(id, _)| Some(*id) != exclude)
            .any(|(_, module)| same_slot(module.center(m), point, m))
            || self.corridors.values().any(|c| same_slot(c.position, point, m))
    }

    /// Occupancy against everything that is not part of `moving`.
    pub fn is_occupied_by_static(&self, point: Vec2, moving: &MovingSet) -> bool {
        let m = &self.metrics;
        self.modules
            .iter()
            .filter(|(id, _)| !moving.modules.contains(id))
            .any(|(_, module)| same_slot(module.center(m), point, m))
            || self
                .corridors
                .iter()
                .filter(|(id, _)| !moving.corridors.contains(id))
                .any(|(_, c)| same_slot(c.position, point, m))
    }

    /// Hub slots of finished rings and of the chain in progress. They read
    /// as free but must stay empty.
    pub fn is_reserved(&self, point: Vec2) -> bool {
        self.is_reserved_by_static(point, &MovingSet::default())
    }

    pub fn is_reserved_by_static(&self, point: Vec2, moving: &MovingSet) -> bool {
        let m = &self.metrics;
        self.rings
            .iter()
            .filter(|(id, _)| !moving.rings.contains(id))
            .any(|(_, r)| same_slot(r.center, point, m))
            || self
                .chain
                .as_ref()
                .is_some_and(|c| same_slot(c.center, point, m))
    }

    /// A slot a new or dropped module may take.
    pub fn is_free_for_module(&self, point: Vec2, exclude: Option<ModuleId>) -> bool {
        self.area.contains_cell(point, &self.metrics)
            && !self.is_occupied(point, exclude)
            && !self.is_reserved(point)
    }

    pub fn module_at(&self, point: Vec2) -> Option<ModuleId> {
        let m = &self.metrics;
        self.modules
            .iter()
            .find(|(_, module)| same_slot(module.center(m), point, m))
            .map(|(id, _)| id)
    }

    /// Modules adjacent to `point`, nearest first.
    pub fn modules_adjacent_to(&self, point: Vec2, exclude: Option<ModuleId>) -> Vec<ModuleId> {
        let m = &self.metrics;
        let mut found: Vec<(f32, ModuleId)> = self
            .modules
            .iter()
            .filter(|(id, _)| Some(*id) != exclude)
            .filter_map(|(id, module)| {
                let c = module.center(m);
                is_adjacent(point, c, m).then(|| (c.distance(point), id))
            })
            .collect();
        found.sort_by(|a, b| a.0.total_cmp(&b.0));
        found.into_iter().map(|(_, id)| id).collect()
    }
}
