use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::occupancy::MovingSet;
use super::world::{Connections, CorridorId, LayoutState, ModuleId, RingId};
use crate::error::PlannerError;
use crate::hex::lattice::{neighbor_points, same_slot};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DragTarget {
    /// A single module. A ring member drags its whole ring cluster instead.
    Module(ModuleId),
    /// A ring together with every ring connected to it.
    Ring(RingId),
    /// A ring alone; its corridors are severed when the drop commits.
    DetachRing(RingId),
}

/// One pointer drag, from pick-up to release. Holds the pre-drag snapshot;
/// the layout itself is not touched until the drag is released.
#[derive(Clone, Debug)]
pub struct DragSession {
    target: DragTarget,
    moving: MovingSet,
    /// Pre-drag centers.
    module_origins: Vec<(ModuleId, Vec2)>,
    corridor_origins: Vec<(CorridorId, Vec2)>,
    ring_origins: Vec<(RingId, Vec2)>,
    severed: Vec<CorridorId>,
    /// Links of a standalone module before pick-up.
    prior_connections: Connections,
    delta: Vec2,
}

impl DragSession {
    pub fn target(&self) -> DragTarget {
        self.target
    }

    /// Current pointer offset from the pick-up point, after clamping.
    pub fn delta(&self) -> Vec2 {
        self.delta
    }

    pub fn modules(&self) -> impl Iterator<Item = ModuleId> + '_ {
        self.module_origins.iter().map(|(id, _)| *id)
    }

    pub fn rings(&self) -> impl Iterator<Item = RingId> + '_ {
        self.ring_origins.iter().map(|(id, _)| *id)
    }

    pub fn severed(&self) -> &[CorridorId] {
        &self.severed
    }

    pub fn prior_connections(&self) -> &Connections {
        &self.prior_connections
    }

    /// Where each dragged module is drawn right now (cell centers).
    pub fn preview_centers(&self) -> Vec<(ModuleId, Vec2)> {
        self.module_origins
            .iter()
            .map(|&(id, origin)| (id, origin + self.delta))
            .collect()
    }

    fn is_ring_drag(&self) -> bool {
        !self.ring_origins.is_empty()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DropOutcome {
    /// Landed on a snap slot.
    Snapped,
    /// Moved by the raw pointer delta.
    Moved,
    /// Released where it started.
    Unchanged,
    /// The landing spot was taken; everything is back at its pre-drag
    /// position.
    InvalidDrop,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CommitResult {
    pub outcome: DropOutcome,
    /// Top-left positions of every dragged module after the release.
    pub final_positions: Vec<(ModuleId, Vec2)>,
    pub created_corridors: Vec<CorridorId>,
    pub severed_corridors: Vec<CorridorId>,
    pub closed_ring: Option<RingId>,
}

/// Best corridor placement found for a ring drop.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CorridorSnap {
    /// Offset from the pre-drag positions to apply to the whole drag set.
    pub translation: Vec2,
    pub slot: Vec2,
    pub dragged_ring: RingId,
    pub static_ring: RingId,
    /// How far the dragged module travels from its drag position.
    pub distance: f32,
}

impl LayoutState {
    /// Snapshot everything `target` moves. Read-only.
    pub fn begin_drag(&self, target: DragTarget) -> Result<DragSession, PlannerError> {
        let mut session = DragSession {
            target,
            moving: MovingSet::default(),
            module_origins: Vec::new(),
            corridor_origins: Vec::new(),
            ring_origins: Vec::new(),
            severed: Vec::new(),
            prior_connections: Connections::new(),
            delta: Vec2::ZERO,
        };

        let rings = match target {
            DragTarget::Module(id) => {
                let module = self.modules.get(id).ok_or(PlannerError::UnknownModule)?;
                match module.ring {
                    Some(ring) => self.find_connected_cluster(ring),
                    None => {
                        session.moving.modules.insert(id);
                        session.module_origins.push((id, module.center(&self.metrics)));
                        session.prior_connections = module.connections.clone();
                        return Ok(session);
                    }
                }
            }
            DragTarget::Ring(ring) => {
                if !self.rings.contains_key(ring) {
                    return Err(PlannerError::UnknownRing);
                }
                self.find_connected_cluster(ring)
            }
            DragTarget::DetachRing(ring) => {
                if !self.rings.contains_key(ring) {
                    return Err(PlannerError::UnknownRing);
                }
                session.severed = self.corridors_touching(ring);
                session.moving.corridors.extend(session.severed.iter().copied());
                vec![ring]
            }
        };

        for ring in rings {
            let Some(r) = self.rings.get(ring) else {
                continue;
            };
            session.moving.rings.insert(ring);
            session.ring_origins.push((ring, r.center));
            for &member in &r.modules {
                if let Some(center) = self.center_of(member) {
                    session.moving.modules.insert(member);
                    session.module_origins.push((member, center));
                }
            }
        }
        if !matches!(target, DragTarget::DetachRing(_)) {
            for (id, corridor) in &self.corridors {
                if session.moving.rings.contains(&corridor.ring_a) && session.moving.rings.contains(&corridor.ring_b) {
                    session.moving.corridors.insert(id);
                    session.corridor_origins.push((id, corridor.position));
                }
            }
        }
        Ok(session)
    }

    /// Record the pointer offset, clamped so the drag set stays on the
    /// blueprint. Visual only.
    pub fn update_drag(&self, session: &mut DragSession, delta: Vec2) {
        let centers: Vec<Vec2> = session
            .module_origins
            .iter()
            .map(|(_, c)| *c)
            .chain(session.corridor_origins.iter().map(|(_, c)| *c))
            .collect();
        session.delta = self.area.clamp_translation(&centers, delta, &self.metrics);
    }

    /// Copy of the layout with the drag set drawn at its current offset.
    pub fn with_drag_preview(&self, session: &DragSession) -> LayoutState {
        let mut preview = self.clone();
        preview.translate(session, session.delta);
        preview
    }

    /// Release the drag: resolve snapping, validate, and commit or revert.
    pub fn end_drag(&mut self, session: DragSession) -> CommitResult {
        let result = if session.is_ring_drag() {
            self.drop_rings(&session)
        } else {
            self.drop_module(&session)
        };
        match result.outcome {
            DropOutcome::InvalidDrop => log::info!("drop rejected, {:?} restored", session.target),
            DropOutcome::Unchanged => {}
            _ => {
                self.audit("drag release");
            }
        }
        result
    }

    fn drop_module(&mut self, session: &DragSession) -> CommitResult {
        let Some(&(id, origin)) = session.module_origins.first() else {
            return self.unchanged(session, DropOutcome::InvalidDrop);
        };
        if !self.modules.contains_key(id) {
            return self.unchanged(session, DropOutcome::InvalidDrop);
        }
        let dropped = origin + session.delta;
        let (landing, outcome) = match self.module_snap(id, dropped) {
            Some(slot) => (slot, DropOutcome::Snapped),
            None if self.is_free_for_module(dropped, Some(id)) => (dropped, DropOutcome::Moved),
            None => return self.unchanged(session, DropOutcome::InvalidDrop),
        };
        if same_slot(landing, origin, &self.metrics) {
            return self.unchanged(session, DropOutcome::Unchanged);
        }

        self.detach(id);
        let half = self.metrics.half_extent();
        if let Some(m) = self.modules.get_mut(id) {
            m.position = landing - half;
        }
        let closed_ring = self.attach(id);
        let created_corridors = match closed_ring {
            Some(_) => self.check_for_implicit_connections(),
            None => Vec::new(),
        };
        CommitResult {
            outcome,
            final_positions: vec![(id, landing - half)],
            created_corridors,
            severed_corridors: Vec::new(),
            closed_ring,
        }
    }

    /// Nearest free slot next to another module within snap distance of
    /// `dropped`.
    fn module_snap(&self, id: ModuleId, dropped: Vec2) -> Option<Vec2> {
        let reach = self.metrics.width + self.metrics.snap_distance;
        let mut best: Option<(f32, Vec2)> = None;
        for (other, module) in &self.modules {
            if other == id {
                continue;
            }
            let center = module.center(&self.metrics);
            if center.distance(dropped) > reach {
                continue;
            }
            for slot in neighbor_points(center, &self.metrics) {
                let d = slot.distance(dropped);
                if d > self.metrics.snap_distance || best.is_some_and(|(bd, _)| bd <= d) {
                    continue;
                }
                if self.is_free_for_module(slot, Some(id)) {
                    best = Some((d, slot));
                }
            }
        }
        best.map(|(_, slot)| slot)
    }

    fn drop_rings(&mut self, session: &DragSession) -> CommitResult {
        let snap = self.best_corridor_snap(session);
        let translation = match snap {
            Some(s) => s.translation,
            None if self.translation_is_clear(session, session.delta) => session.delta,
            None => return self.unchanged(session, DropOutcome::InvalidDrop),
        };
        if snap.is_none() && translation == Vec2::ZERO && session.severed.is_empty() {
            return self.unchanged(session, DropOutcome::Unchanged);
        }

        for &corridor in &session.severed {
            self.corridors.remove(corridor);
        }
        self.translate(session, translation);

        let mut created = Vec::new();
        if let Some(s) = snap {
            created.extend(self.create_corridor(s.dragged_ring, s.static_ring, s.slot));
        }
        created.extend(self.check_for_implicit_connections());

        let half = self.metrics.half_extent();
        CommitResult {
            outcome: if snap.is_some() { DropOutcome::Snapped } else { DropOutcome::Moved },
            final_positions: session
                .module_origins
                .iter()
                .map(|&(id, origin)| (id, origin + translation - half))
                .collect(),
            created_corridors: created,
            severed_corridors: session.severed.clone(),
            closed_ring: None,
        }
    }

    /// Search every neighbor-of-neighbor slot around the stationary rings
    /// for the corridor placement nearest to where the dragged modules are
    /// now.
    pub fn best_corridor_snap(&self, session: &DragSession) -> Option<CorridorSnap> {
        let m = self.metrics;
        let reach = 2.0 * m.width + m.snap_distance;
        let mut best: Option<CorridorSnap> = None;

        for &(dragged, origin) in &session.module_origins {
            let Some(dragged_ring) = self.modules.get(dragged).and_then(|d| d.ring) else {
                continue;
            };
            let pos = origin + session.delta;
            for (static_ring, ring) in &self.rings {
                if session.moving.rings.contains(&static_ring)
                    || self.linked_ignoring(dragged_ring, static_ring, &session.severed)
                {
                    continue;
                }
                for &member in &ring.modules {
                    let Some(anchor) = self.center_of(member) else {
                        continue;
                    };
                    if anchor.distance(pos) > reach {
                        continue;
                    }
                    for slot in neighbor_points(anchor, &m) {
                        for landing in neighbor_points(slot, &m) {
                            if same_slot(landing, anchor, &m) {
                                continue;
                            }
                            let d = landing.distance(pos);
                            if d > m.snap_distance || best.is_some_and(|b| b.distance <= d) {
                                continue;
                            }
                            let translation = landing - origin;
                            if !self.corridor_slot_is_clear(session, slot, translation)
                                || !self.translation_is_clear(session, translation)
                            {
                                continue;
                            }
                            best = Some(CorridorSnap {
                                translation,
                                slot,
                                dragged_ring,
                                static_ring,
                                distance: d,
                            });
                        }
                    }
                }
            }
        }
        best
    }

    fn linked_ignoring(&self, a: RingId, b: RingId, severed: &[CorridorId]) -> bool {
        self.corridors
            .iter()
            .any(|(id, c)| !severed.contains(&id) && c.links(a, b))
    }

    /// Whether moving the whole drag set by `translation` keeps it inside
    /// the area and off every stationary element.
    fn translation_is_clear(&self, session: &DragSession, translation: Vec2) -> bool {
        let moving = &session.moving;
        let cells_clear = session
            .module_origins
            .iter()
            .map(|(_, c)| *c)
            .chain(session.corridor_origins.iter().map(|(_, c)| *c))
            .all(|origin| {
                let p = origin + translation;
                self.area.contains_cell(p, &self.metrics)
                    && !self.is_occupied_by_static(p, moving)
                    && !self.is_reserved_by_static(p, moving)
            });
        cells_clear
            && session
                .ring_origins
                .iter()
                .all(|(_, hub)| !self.is_occupied_by_static(*hub + translation, moving))
    }

    fn corridor_slot_is_clear(&self, session: &DragSession, slot: Vec2, translation: Vec2) -> bool {
        let m = &self.metrics;
        let moving = &session.moving;
        if !self.area.contains_cell(slot, m)
            || self.is_occupied_by_static(slot, moving)
            || self.is_reserved_by_static(slot, moving)
        {
            return false;
        }
        let hits = |origin: Vec2| same_slot(origin + translation, slot, m);
        !session.module_origins.iter().any(|(_, c)| hits(*c))
            && !session.corridor_origins.iter().any(|(_, c)| hits(*c))
            && !session.ring_origins.iter().any(|(_, c)| hits(*c))
    }

    /// Move the drag set to pre-drag position + `translation`.
    fn translate(&mut self, session: &DragSession, translation: Vec2) {
        let half = self.metrics.half_extent();
        for &(id, origin) in &session.module_origins {
            if let Some(m) = self.modules.get_mut(id) {
                m.position = origin + translation - half;
            }
        }
        for &(id, origin) in &session.corridor_origins {
            if let Some(c) = self.corridors.get_mut(id) {
                c.position = origin + translation;
            }
        }
        for &(id, origin) in &session.ring_origins {
            if let Some(r) = self.rings.get_mut(id) {
                r.center = origin + translation;
            }
        }
    }

    fn unchanged(&self, session: &DragSession, outcome: DropOutcome) -> CommitResult {
        let half = self.metrics.half_extent();
        CommitResult {
            outcome,
            final_positions: session
                .module_origins
                .iter()
                .map(|&(id, origin)| (id, origin - half))
                .collect(),
            created_corridors: Vec::new(),
            severed_corridors: Vec::new(),
            closed_ring: None,
        }
    }
}
