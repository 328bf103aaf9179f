use serde::{Deserialize, Serialize};

use super::world::{CorridorId, LayoutState, ModuleId, RingId};

/// Everything a deletion took off the blueprint.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RemovedEntities {
    pub modules: Vec<ModuleId>,
    pub rings: Vec<RingId>,
    pub corridors: Vec<CorridorId>,
}

impl RemovedEntities {
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty() && self.rings.is_empty() && self.corridors.is_empty()
    }
}

impl LayoutState {
    /// Delete a module. A ring member takes its whole connected ring
    /// cluster with it. Returns `None` for an unknown id.
    pub fn delete_module(&mut self, id: ModuleId) -> Option<RemovedEntities> {
        let ring = self.modules.get(id)?.ring;
        let removed = match ring {
            Some(ring) => self.delete_ring_cluster(ring),
            None => {
                self.detach(id);
                self.modules.remove(id);
                RemovedEntities {
                    modules: vec![id],
                    ..Default::default()
                }
            }
        };
        self.audit("deletion");
        Some(removed)
    }

    /// Delete `ring`, every ring connected to it, their modules and every
    /// corridor touching them.
    pub fn delete_ring_cluster(&mut self, ring: RingId) -> RemovedEntities {
        let mut removed = RemovedEntities::default();
        for r in self.find_connected_cluster(ring) {
            // Corridors go first so none ever points at a missing ring.
            for corridor in self.corridors_touching(r) {
                if self.corridors.remove(corridor).is_some() {
                    removed.corridors.push(corridor);
                }
            }
            let Some(dead) = self.rings.remove(r) else {
                continue;
            };
            for member in dead.modules {
                self.unlink_all(member);
                if self.modules.remove(member).is_some() {
                    removed.modules.push(member);
                }
            }
            removed.rings.push(r);
        }
        if !removed.rings.is_empty() {
            log::info!(
                "deleted {} ring(s), {} module(s), {} corridor(s)",
                removed.rings.len(),
                removed.modules.len(),
                removed.corridors.len()
            );
        }
        removed
    }

    /// Wipe the blueprint.
    pub fn clear(&mut self) -> RemovedEntities {
        let removed = RemovedEntities {
            modules: self.modules.keys().collect(),
            rings: self.rings.keys().collect(),
            corridors: self.corridors.keys().collect(),
        };
        self.reset();
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hex::area::PlayArea;
    use crate::hex::lattice::{neighbor_points, HexMetrics};
    use glam::Vec2;

    fn state() -> LayoutState {
        LayoutState::new(HexMetrics::default(), PlayArea::default())
    }

    fn ring_at(s: &mut LayoutState, hub: Vec2) -> RingId {
        let n = neighbor_points(hub, s.metrics());
        let mut closed = None;
        for slot in [n[0], n[5], n[3], n[1], n[4], n[2]] {
            let id = s.insert_module("habitat", slot);
            closed = s.attach(id).or(closed);
        }
        closed.expect("ring should close")
    }

    #[test]
    fn standalone_delete_strips_neighbor_links() {
        let mut s = state();
        let a = s.insert_module("habitat", Vec2::new(600.0, 400.0));
        let b = s.insert_module("power", Vec2::new(700.0, 400.0));
        s.attach(b);
        let removed = s.delete_module(b).unwrap();
        assert_eq!(removed.modules, vec![b]);
        assert_eq!(s.degree(a), 0);
        assert!(s.integrity_violations().is_empty());
    }

    #[test]
    fn unknown_module_is_none() {
        let mut s = state();
        let a = s.insert_module("habitat", Vec2::new(600.0, 400.0));
        s.delete_module(a);
        assert!(s.delete_module(a).is_none());
    }

    #[test]
    fn deleting_ring_member_removes_cluster() {
        let mut s = state();
        let a = ring_at(&mut s, Vec2::new(300.0, 400.0));
        let b = ring_at(&mut s, Vec2::new(700.0, 400.0));
        let c = ring_at(&mut s, Vec2::new(1000.0, 150.0));
        s.check_for_implicit_connections();
        assert!(s.connection_exists(a, b));
        assert_eq!(s.corridor_count(), 1);
        let loner = s.insert_module("power", Vec2::new(1100.0, 700.0));

        let member = s.ring(a).unwrap().modules[3];
        let removed = s.delete_module(member).unwrap();
        assert_eq!(removed.rings.len(), 2);
        assert!(removed.rings.contains(&a) && removed.rings.contains(&b));
        assert_eq!(removed.modules.len(), 12);
        assert_eq!(removed.corridors.len(), 1);
        assert_eq!(s.corridor_count(), 0);
        assert!(s.ring(c).is_some());
        assert!(s.module(loner).is_some());
        assert_eq!(s.module_count(), 7);
        assert!(s.integrity_violations().is_empty());
    }

    #[test]
    fn deleting_chain_end_shrinks_chain() {
        let mut s = state();
        let hub = Vec2::new(600.0, 400.0);
        let n = neighbor_points(hub, s.metrics());
        let ids: Vec<_> = [n[0], n[5], n[3], n[1]]
            .into_iter()
            .map(|p| {
                let id = s.insert_module("habitat", p);
                s.attach(id);
                id
            })
            .collect();
        s.delete_module(ids[0]).unwrap();
        assert_eq!(s.chain().unwrap().modules, ids[1..].to_vec());
        s.delete_module(ids[2]).unwrap();
        assert!(s.chain().is_none());
        assert!(s.integrity_violations().is_empty());
    }

    #[test]
    fn clear_reports_everything() {
        let mut s = state();
        ring_at(&mut s, Vec2::new(300.0, 400.0));
        s.insert_module("power", Vec2::new(900.0, 400.0));
        let removed = s.clear();
        assert_eq!(removed.modules.len(), 7);
        assert_eq!(removed.rings.len(), 1);
        assert_eq!(s.module_count(), 0);
        assert!(s.chain().is_none());
        assert!(s.clear().is_empty());
    }
}
