use std::collections::{HashSet, VecDeque};

use glam::Vec2;

use super::world::{CorridorId, LayoutState, RingId};

impl LayoutState {
    /// Whether a corridor already joins `a` and `b`, in either direction.
    pub fn connection_exists(&self, a: RingId, b: RingId) -> bool {
        self.corridors.values().any(|c| c.links(a, b))
    }

    pub fn corridors_touching(&self, ring: RingId) -> Vec<CorridorId> {
        self.corridors
            .iter()
            .filter(|(_, c)| c.touches(ring))
            .map(|(id, _)| id)
            .collect()
    }

    /// Every ring reachable from `start` through corridors, `start` first.
    pub fn find_connected_cluster(&self, start: RingId) -> Vec<RingId> {
        if !self.rings.contains_key(start) {
            return Vec::new();
        }
        let mut visited = HashSet::new();
        let mut cluster = Vec::new();
        let mut queue = VecDeque::new();
        visited.insert(start);
        queue.push_back(start);

        while let Some(ring) = queue.pop_front() {
            cluster.push(ring);
            for corridor in self.corridors.values() {
                let Some(next) = corridor.other_end(ring) else {
                    continue;
                };
                if visited.insert(next) {
                    queue.push_back(next);
                }
            }
        }
        cluster
    }

    /// Add a corridor unless the rings are the same, missing, or already
    /// connected.
    pub(crate) fn create_corridor(&mut self, a: RingId, b: RingId, position: Vec2) -> Option<CorridorId> {
        if a == b || !self.rings.contains_key(a) || !self.rings.contains_key(b) {
            return None;
        }
        if self.connection_exists(a, b) {
            return None;
        }
        let id = self.insert_corridor(a, b, position);
        log::info!(
            "corridor {} links {} and {}",
            self.corridors[id].serial,
            self.rings[a].label(),
            self.rings[b].label()
        );
        Some(id)
    }

    /// Reconcile corridors with geometry: any unconnected ring pair whose
    /// closest members sit exactly two cells apart gets a corridor in the
    /// slot between them, if that slot is free.
    pub fn check_for_implicit_connections(&mut self) -> Vec<CorridorId> {
        let ring_ids: Vec<RingId> = self.rings.keys().collect();
        let mut created = Vec::new();
        let target = 2.0 * self.metrics.width;

        for (i, &a) in ring_ids.iter().enumerate() {
            for &b in &ring_ids[i + 1..] {
                if self.connection_exists(a, b) {
                    continue;
                }
                let Some((ca, cb)) = self.closest_members(a, b) else {
                    continue;
                };
                if (ca.distance(cb) - target).abs() > self.metrics.implicit_tolerance {
                    continue;
                }
                let mid = (ca + cb) * 0.5;
                if !self.area.contains_cell(mid, &self.metrics) || self.is_occupied(mid, None) || self.is_reserved(mid) {
                    continue;
                }
                if let Some(id) = self.create_corridor(a, b, mid) {
                    log::debug!("implicit corridor between adjacent rings");
                    created.push(id);
                }
            }
        }
        created
    }

    /// Centers of the nearest pair of members across two rings.
    fn closest_members(&self, a: RingId, b: RingId) -> Option<(Vec2, Vec2)> {
        let ra = self.rings.get(a)?;
        let rb = self.rings.get(b)?;
        let mut best: Option<(f32, Vec2, Vec2)> = None;
        for &ma in &ra.modules {
            let Some(ca) = self.center_of(ma) else { continue };
            for &mb in &rb.modules {
                let Some(cb) = self.center_of(mb) else { continue };
                let d = ca.distance(cb);
                if best.map_or(true, |(bd, _, _)| d < bd) {
                    best = Some((d, ca, cb));
                }
            }
        }
        best.map(|(_, ca, cb)| (ca, cb))
    }
}
