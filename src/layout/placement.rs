use std::collections::{HashSet, VecDeque};

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::chain::{MIN_CHAIN, RING_SIZE};
use super::world::{CorridorId, LayoutState, ModuleId, RingId};
use crate::error::PlannerError;
use crate::hex::lattice::{is_adjacent, neighbor_points, slot_key};

/// Result of placing a new module.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub module: ModuleId,
    pub closed_ring: Option<RingId>,
    /// Corridors to rings sitting two cells from a freshly closed ring.
    pub created_corridors: Vec<CorridorId>,
}

impl LayoutState {
    /// Breadth-first walk of the lattice from `start`, returning the first
    /// slot a module may take. Gives up after `limit` visited slots.
    pub fn find_free_slot(&self, start: Vec2, limit: usize) -> Option<Vec2> {
        let mut seen = HashSet::new();
        let mut queue = VecDeque::new();
        seen.insert(slot_key(start));
        queue.push_back(start);

        let mut visited = 0;
        while let Some(slot) = queue.pop_front() {
            visited += 1;
            if visited > limit {
                break;
            }
            if self.is_free_for_module(slot, None) {
                return Some(slot);
            }
            for n in neighbor_points(slot, &self.metrics) {
                if !self.area.contains_cell(n, &self.metrics) {
                    continue;
                }
                if seen.insert(slot_key(n)) {
                    queue.push_back(n);
                }
            }
        }
        log::debug!("no free slot within {limit} steps of ({:.0}, {:.0})", start.x, start.y);
        None
    }

    /// Free slots that would extend the ring in progress, nearest end
    /// first. Empty when no chain of 3 to 5 modules is active.
    pub fn chain_extension_slots(&self) -> Vec<Vec2> {
        let Some(chain) = &self.chain else {
            return Vec::new();
        };
        if !(MIN_CHAIN..RING_SIZE).contains(&chain.modules.len()) {
            return Vec::new();
        }
        let mut slots: Vec<Vec2> = Vec::new();
        for end in [chain.last(), chain.first()].into_iter().flatten() {
            let Some(end_center) = self.center_of(end) else {
                continue;
            };
            for n in neighbor_points(end_center, &self.metrics) {
                if is_adjacent(n, chain.center, &self.metrics)
                    && self.is_free_for_module(n, None)
                    && !slots.iter().any(|s| slot_key(*s) == slot_key(n))
                {
                    slots.push(n);
                }
            }
        }
        slots
    }

    /// Ring-aware search: continue the chain in progress when possible,
    /// otherwise fall back to the general search.
    pub fn find_free_slot_for_ring(&self, start: Vec2, limit: usize) -> Option<Vec2> {
        self.chain_extension_slots()
            .into_iter()
            .next()
            .or_else(|| self.find_free_slot(start, limit))
    }

    /// Create a module of `kind` in the nearest free slot and wire it in.
    /// Leaves the layout untouched when no slot is found.
    pub fn place_module(&mut self, kind: &str, limit: usize) -> Result<Placement, PlannerError> {
        let start = self.area.center();
        let slot = self
            .find_free_slot_for_ring(start, limit)
            .ok_or(PlannerError::NoSpaceAvailable)?;
        let module = self.insert_module(kind, slot);
        let closed_ring = self.attach(module);
        let created_corridors = match closed_ring {
            Some(_) => self.check_for_implicit_connections(),
            None => Vec::new(),
        };
        self.audit("placement");
        log::info!("placed {kind} at ({:.0}, {:.0})", slot.x, slot.y);
        Ok(Placement {
            module,
            closed_ring,
            created_corridors,
        })
    }
}
