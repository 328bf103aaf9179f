use glam::Vec2;

use super::world::{Chain, Connections, LayoutState, ModuleId, RingId};
use crate::hex::lattice::{common_neighbor, is_adjacent};

/// Members needed to close a ring.
pub const RING_SIZE: usize = 6;
/// Smallest linked run that is tracked as a ring in progress.
pub const MIN_CHAIN: usize = 3;

impl LayoutState {
    /// Hub slot shared by every module of `chain`, if one exists.
    pub fn find_ring_center(&self, chain: &[ModuleId]) -> Option<Vec2> {
        let centers: Option<Vec<Vec2>> = chain.iter().map(|&id| self.center_of(id)).collect();
        common_neighbor(&centers?, &self.metrics)
    }

    /// The linked run that ends at `tail`, walked from its far end.
    /// `tail` must have at most one link; longer runs are cut at
    /// `RING_SIZE` modules.
    pub fn linear_run(&self, tail: ModuleId) -> Vec<ModuleId> {
        let mut run = vec![tail];
        let mut prev = None;
        let mut cur = tail;
        while run.len() < RING_SIZE {
            let next = self
                .modules
                .get(cur)
                .and_then(|m| m.connections.iter().copied().find(|&c| Some(c) != prev));
            match next {
                Some(n) if n != tail => {
                    run.push(n);
                    prev = Some(cur);
                    cur = n;
                }
                _ => break,
            }
        }
        run.reverse();
        run
    }

    /// Wire a freshly positioned module into its surroundings: extend the
    /// chain in progress, start one, pair with a lone neighbor, or close a
    /// ring. Returns the ring if one closed.
    pub(crate) fn attach(&mut self, id: ModuleId) -> Option<RingId> {
        let point = self.center_of(id)?;

        if let Some(outcome) = self.extend_chain(id, point) {
            return outcome;
        }

        let candidates: Vec<ModuleId> = self
            .modules_adjacent_to(point, Some(id))
            .into_iter()
            .filter(|&n| self.modules.get(n).is_some_and(|m| m.ring.is_none() && m.connections.len() < 2))
            .collect();

        for tail in candidates {
            let mut run = self.linear_run(tail);
            if run.contains(&id) || run.len() >= RING_SIZE {
                continue;
            }
            if self.chain.as_ref().is_some_and(|c| run.iter().any(|m| c.modules.contains(m))) {
                continue;
            }
            run.push(id);

            if run.len() == 2 {
                self.link(tail, id);
                return None;
            }

            let Some(center) = self.find_ring_center(&run) else {
                continue;
            };
            if self.is_occupied(center, None) || self.is_reserved(center) {
                continue;
            }

            if run.len() == RING_SIZE {
                let head = run[0];
                if self.degree(head) >= 2 || !is_adjacent(point, self.center_of(head)?, &self.metrics) {
                    continue;
                }
                self.link(tail, id);
                self.link(head, id);
                return Some(self.close_ring(run, center));
            }

            if self.chain.is_some() {
                continue;
            }
            self.link(tail, id);
            log::debug!("ring in progress with {} modules", run.len());
            self.chain = Some(Chain { modules: run, center });
            return None;
        }
        None
    }

    /// `Some(outcome)` if the module joined the active chain.
    fn extend_chain(&mut self, id: ModuleId, point: Vec2) -> Option<Option<RingId>> {
        let chain = self.chain.clone()?;
        let (first, last) = (chain.first()?, chain.last()?);
        if chain.modules.contains(&id) || !is_adjacent(point, chain.center, &self.metrics) {
            return None;
        }
        let touches = |end: ModuleId| {
            self.degree(end) < 2
                && self
                    .center_of(end)
                    .is_some_and(|c| is_adjacent(point, c, &self.metrics))
        };
        let (at_first, at_last) = (touches(first), touches(last));

        if chain.modules.len() == RING_SIZE - 1 {
            if !(at_first && at_last) {
                return None;
            }
            self.link(last, id);
            self.link(first, id);
            let mut run = chain.modules;
            run.push(id);
            return Some(Some(self.close_ring(run, chain.center)));
        }

        let active = self.chain.as_mut()?;
        if at_last {
            active.modules.push(id);
            self.link(last, id);
        } else if at_first {
            active.modules.insert(0, id);
            self.link(first, id);
        } else {
            return None;
        }
        Some(None)
    }

    /// Promote six modules in cycle order to a ring.
    fn close_ring(&mut self, run: Vec<ModuleId>, center: Vec2) -> RingId {
        let mut members = [ModuleId::default(); RING_SIZE];
        members.copy_from_slice(&run[..RING_SIZE]);
        let ring = self.insert_ring(center, members);
        for (i, &id) in members.iter().enumerate() {
            let prev = members[(i + RING_SIZE - 1) % RING_SIZE];
            let next = members[(i + 1) % RING_SIZE];
            if let Some(m) = self.modules.get_mut(id) {
                m.connections = Connections::from_slice(&[prev, next]);
                m.ring = Some(ring);
            }
        }
        if self
            .chain
            .as_ref()
            .is_some_and(|c| c.modules.iter().any(|m| members.contains(m)))
        {
            self.chain = None;
        }
        log::info!("ring {} closed around ({:.0}, {:.0})", self.rings[ring].serial, center.x, center.y);
        ring
    }

    /// Take a module out of the chain in progress. Losing an end shrinks
    /// the chain; losing an interior member breaks it.
    pub(crate) fn release_from_chain(&mut self, id: ModuleId) {
        let Some(chain) = self.chain.as_mut() else {
            return;
        };
        if !chain.modules.contains(&id) {
            return;
        }
        if chain.is_end(id) {
            chain.modules.retain(|m| *m != id);
            if chain.modules.len() >= MIN_CHAIN {
                return;
            }
        }
        log::debug!("ring in progress broken");
        self.chain = None;
    }

    /// Remove a standalone module from every structure it takes part in,
    /// leaving it linkless in place.
    pub(crate) fn detach(&mut self, id: ModuleId) {
        self.release_from_chain(id);
        self.unlink_all(id);
    }
}
