use glam::Vec2;
use serde::{Deserialize, Serialize};
use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;

use crate::hex::area::PlayArea;
use crate::hex::lattice::{is_adjacent, HexMetrics};

new_key_type! {
    /// Stable handle to a placed module. Generational, so a handle to a
    /// deleted module never aliases a newer one.
    pub struct ModuleId;
    pub struct RingId;
    pub struct CorridorId;
}

/// Up to two chain or ring neighbors.
pub type Connections = SmallVec<[ModuleId; 2]>;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Module {
    /// User-facing number, strictly increasing in creation order.
    pub serial: u32,
    /// Top-left corner of the cell.
    pub position: Vec2,
    /// Catalog key.
    pub kind: String,
    pub connections: Connections,
    pub ring: Option<RingId>,
}

impl Module {
    pub fn center(&self, metrics: &HexMetrics) -> Vec2 {
        self.position + metrics.half_extent()
    }

    pub fn is_linked_to(&self, other: ModuleId) -> bool {
        self.connections.contains(&other)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Ring {
    pub serial: u32,
    /// Empty hub slot the six members surround.
    pub center: Vec2,
    /// Members in cycle order.
    pub modules: [ModuleId; 6],
    pub name: Option<String>,
}

impl Ring {
    pub fn label(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| format!("Ring {}", self.serial))
    }
}

/// Connector occupying one slot between two rings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Corridor {
    pub serial: u32,
    pub ring_a: RingId,
    pub ring_b: RingId,
    /// Center of the occupied slot.
    pub position: Vec2,
}

impl Corridor {
    pub fn touches(&self, ring: RingId) -> bool {
        self.ring_a == ring || self.ring_b == ring
    }

    pub fn links(&self, a: RingId, b: RingId) -> bool {
        (self.ring_a == a && self.ring_b == b) || (self.ring_a == b && self.ring_b == a)
    }

    pub fn other_end(&self, ring: RingId) -> Option<RingId> {
        if self.ring_a == ring {
            Some(self.ring_b)
        } else if self.ring_b == ring {
            Some(self.ring_a)
        } else {
            None
        }
    }
}

/// Partial ring under construction: 3 to 5 linked modules in walk order
/// around a validated hub.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Chain {
    pub modules: Vec<ModuleId>,
    pub center: Vec2,
}

impl Chain {
    pub fn first(&self) -> Option<ModuleId> {
        self.modules.first().copied()
    }

    pub fn last(&self) -> Option<ModuleId> {
        self.modules.last().copied()
    }

    pub fn is_end(&self, module: ModuleId) -> bool {
        self.first() == Some(module) || self.last() == Some(module)
    }
}

/// A reference that should not exist. Deletion cascades make these
/// impossible; finding one means an engine bug.
#[derive(Clone, Debug, PartialEq)]
pub enum IntegrityViolation {
    DanglingConnection { module: ModuleId, missing: ModuleId },
    OneWayConnection { from: ModuleId, to: ModuleId },
    TooManyConnections { module: ModuleId, count: usize },
    DanglingRing { module: ModuleId },
    DanglingRingMember { ring: RingId, missing: ModuleId },
    RingMembershipMismatch { ring: RingId, module: ModuleId },
    DanglingCorridorEnd { corridor: CorridorId },
    DuplicateCorridor { ring_a: RingId, ring_b: RingId },
    DanglingChainMember { missing: ModuleId },
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
struct Serials {
    module: u32,
    ring: u32,
    corridor: u32,
}

fn bump(counter: &mut u32) -> u32 {
    *counter += 1;
    *counter
}

/// Complete layout of one planning session. Mutated only by placement,
/// drag release and deletion.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LayoutState {
    pub(crate) metrics: HexMetrics,
    pub(crate) area: PlayArea,
    pub(crate) modules: SlotMap<ModuleId, Module>,
    pub(crate) rings: SlotMap<RingId, Ring>,
    pub(crate) corridors: SlotMap<CorridorId, Corridor>,
    pub(crate) chain: Option<Chain>,
    serials: Serials,
}

impl LayoutState {
    pub fn new(metrics: HexMetrics, area: PlayArea) -> Self {
        Self {
            metrics,
            area,
            modules: SlotMap::with_key(),
            rings: SlotMap::with_key(),
            corridors: SlotMap::with_key(),
            chain: None,
            serials: Serials::default(),
        }
    }

    pub fn metrics(&self) -> &HexMetrics {
        &self.metrics
    }

    pub fn area(&self) -> &PlayArea {
        &self.area
    }

    pub fn module(&self, id: ModuleId) -> Option<&Module> {
        self.modules.get(id)
    }

    pub fn ring(&self, id: RingId) -> Option<&Ring> {
        self.rings.get(id)
    }

    pub fn corridor(&self, id: CorridorId) -> Option<&Corridor> {
        self.corridors.get(id)
    }

    pub fn chain(&self) -> Option<&Chain> {
        self.chain.as_ref()
    }

    pub fn module_count(&self) -> usize {
        self.modules.len()
    }

    pub fn ring_count(&self) -> usize {
        self.rings.len()
    }

    pub fn corridor_count(&self) -> usize {
        self.corridors.len()
    }

    pub fn modules(&self) -> impl Iterator<Item = (ModuleId, &Module)> {
        self.modules.iter()
    }

    pub fn rings(&self) -> impl Iterator<Item = (RingId, &Ring)> {
        self.rings.iter()
    }

    pub fn corridors(&self) -> impl Iterator<Item = (CorridorId, &Corridor)> {
        self.corridors.iter()
    }

    /// Modules in creation order.
    pub fn modules_in_order(&self) -> Vec<(ModuleId, &Module)> {
        let mut all: Vec<_> = self.modules.iter().collect();
        all.sort_by_key(|(_, m)| m.serial);
        all
    }

    pub fn center_of(&self, id: ModuleId) -> Option<Vec2> {
        self.modules.get(id).map(|m| m.center(&self.metrics))
    }

    pub fn degree(&self, id: ModuleId) -> usize {
        self.modules.get(id).map_or(0, |m| m.connections.len())
    }

    /// Whether two live modules sit in neighboring slots.
    pub fn are_adjacent(&self, a: ModuleId, b: ModuleId) -> bool {
        match (self.center_of(a), self.center_of(b)) {
            (Some(ca), Some(cb)) => is_adjacent(ca, cb, &self.metrics),
            _ => false,
        }
    }

    pub(crate) fn insert_module(&mut self, kind: &str, center: Vec2) -> ModuleId {
        let serial = bump(&mut self.serials.module);
        self.modules.insert(Module {
            serial,
            position: center - self.metrics.half_extent(),
            kind: kind.to_string(),
            connections: Connections::new(),
            ring: None,
        })
    }

    pub(crate) fn insert_ring(&mut self, center: Vec2, modules: [ModuleId; 6]) -> RingId {
        let serial = bump(&mut self.serials.ring);
        self.rings.insert(Ring {
            serial,
            center,
            modules,
            name: None,
        })
    }

    pub(crate) fn insert_corridor(&mut self, ring_a: RingId, ring_b: RingId, position: Vec2) -> CorridorId {
        let serial = bump(&mut self.serials.corridor);
        self.corridors.insert(Corridor {
            serial,
            ring_a,
            ring_b,
            position,
        })
    }

    /// Link two modules both ways. Refuses self-links, duplicates and
    /// links that would exceed two connections.
    pub(crate) fn link(&mut self, a: ModuleId, b: ModuleId) -> bool {
        if a == b || self.degree(a) >= 2 || self.degree(b) >= 2 {
            return false;
        }
        match self.modules.get_disjoint_mut([a, b]) {
            Some([ma, mb]) => {
                if ma.is_linked_to(b) {
                    return false;
                }
                ma.connections.push(b);
                mb.connections.push(a);
                true
            }
            None => false,
        }
    }

    pub(crate) fn unlink(&mut self, a: ModuleId, b: ModuleId) {
        if let Some(m) = self.modules.get_mut(a) {
            m.connections.retain(|c| *c != b);
        }
        if let Some(m) = self.modules.get_mut(b) {
            m.connections.retain(|c| *c != a);
        }
    }

    /// Drops every link of `id`, on both sides.
    pub(crate) fn unlink_all(&mut self, id: ModuleId) {
        let neighbors = match self.modules.get(id) {
            Some(m) => m.connections.clone(),
            None => return,
        };
        for n in neighbors {
            self.unlink(id, n);
        }
    }

    pub(crate) fn reset(&mut self) {
        self.modules.clear();
        self.rings.clear();
        self.corridors.clear();
        self.chain = None;
    }

    pub fn integrity_violations(&self) -> Vec<IntegrityViolation> {
        let mut out = Vec::new();

        for (id, module) in &self.modules {
            if module.connections.len() > 2 {
                out.push(IntegrityViolation::TooManyConnections {
                    module: id,
                    count: module.connections.len(),
                });
            }
            for &other in &module.connections {
                match self.modules.get(other) {
                    None => out.push(IntegrityViolation::DanglingConnection { module: id, missing: other }),
                    Some(o) if !o.is_linked_to(id) => {
                        out.push(IntegrityViolation::OneWayConnection { from: id, to: other })
                    }
                    Some(_) => {}
                }
            }
            if let Some(ring) = module.ring {
                match self.rings.get(ring) {
                    None => out.push(IntegrityViolation::DanglingRing { module: id }),
                    Some(r) if !r.modules.contains(&id) => {
                        out.push(IntegrityViolation::RingMembershipMismatch { ring, module: id })
                    }
                    Some(_) => {}
                }
            }
        }

        for (rid, ring) in &self.rings {
            for &member in &ring.modules {
                match self.modules.get(member) {
                    None => out.push(IntegrityViolation::DanglingRingMember { ring: rid, missing: member }),
                    Some(m) if m.ring != Some(rid) => {
                        out.push(IntegrityViolation::RingMembershipMismatch { ring: rid, module: member })
                    }
                    Some(_) => {}
                }
            }
        }

        let corridors: Vec<_> = self.corridors.iter().collect();
        for (i, (cid, corridor)) in corridors.iter().enumerate() {
            if !self.rings.contains_key(corridor.ring_a) || !self.rings.contains_key(corridor.ring_b) {
                out.push(IntegrityViolation::DanglingCorridorEnd { corridor: *cid });
            }
            if corridors[i + 1..]
                .iter()
                .any(|(_, other)| other.links(corridor.ring_a, corridor.ring_b))
            {
                out.push(IntegrityViolation::DuplicateCorridor {
                    ring_a: corridor.ring_a,
                    ring_b: corridor.ring_b,
                });
            }
        }

        if let Some(chain) = &self.chain {
            for &member in &chain.modules {
                if !self.modules.contains_key(member) {
                    out.push(IntegrityViolation::DanglingChainMember { missing: member });
                }
            }
        }

        out
    }

    /// Logs every integrity violation. Returns whether the state was clean.
    pub(crate) fn audit(&self, after: &str) -> bool {
        let violations = self.integrity_violations();
        for v in &violations {
            log::error!("layout integrity violation after {after}: {v:?}");
        }
        violations.is_empty()
    }
}
