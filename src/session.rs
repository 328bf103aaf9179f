use std::collections::HashSet;

use glam::Vec2;

use crate::error::PlannerError;
use crate::layout::deletion::RemovedEntities;
use crate::layout::drag::{CommitResult, DragSession, DragTarget};
use crate::layout::placement::Placement;
use crate::layout::world::{LayoutState, ModuleId, RingId};
use crate::site::catalog::ModuleCatalog;
use crate::site::config::PlannerConfig;
use crate::site::feedback::{check_all_collisions, evaluate_feedback, FeedbackMessage};
use crate::site::terrain::{LunarZone, TerrainContext};

/// Everything one planning session owns: the configuration it was opened
/// with, the selected landing site, the blueprint, and at most one drag.
pub struct Session {
    config: PlannerConfig,
    layout: LayoutState,
    context: Option<TerrainContext>,
    drag: Option<DragSession>,
}

impl Session {
    pub fn new(config: PlannerConfig) -> Result<Self, PlannerError> {
        config.validate()?;
        let layout = LayoutState::new(config.lattice, config.area);
        Ok(Self {
            config,
            layout,
            context: None,
            drag: None,
        })
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    pub fn catalog(&self) -> &ModuleCatalog {
        &self.config.modules
    }

    pub fn zones(&self) -> &[LunarZone] {
        &self.config.zones
    }

    pub fn context(&self) -> Option<&TerrainContext> {
        self.context.as_ref()
    }

    pub fn layout(&self) -> &LayoutState {
        &self.layout
    }

    pub fn drag(&self) -> Option<&DragSession> {
        self.drag.as_ref()
    }

    /// Pick a landing site and open an empty blueprint for it.
    pub fn select_zone(&mut self, id: u32) -> Result<&TerrainContext, PlannerError> {
        let context = TerrainContext::select(&self.config.zones, &self.config.terrain, id)?;
        self.drag = None;
        self.layout.clear();
        log::info!("landing zone selected: {}", context.zone.name);
        Ok(&*self.context.insert(context))
    }

    /// Back to site selection. The blueprint is discarded.
    pub fn leave_zone(&mut self) {
        if let Some(context) = self.context.take() {
            log::info!("left landing zone {}", context.zone.name);
        }
        self.drag = None;
        self.layout.clear();
    }

    fn require_zone(&self) -> Result<&TerrainContext, PlannerError> {
        self.context.as_ref().ok_or(PlannerError::NoZoneSelected)
    }

    fn require_idle(&self) -> Result<(), PlannerError> {
        if self.drag.is_some() {
            return Err(PlannerError::DragInProgress);
        }
        Ok(())
    }

    pub fn place_new_module(&mut self, kind: &str) -> Result<Placement, PlannerError> {
        self.require_zone()?;
        self.require_idle()?;
        if !self.config.modules.contains(kind) {
            return Err(PlannerError::UnknownModuleType(kind.to_string()));
        }
        self.layout.place_module(kind, self.config.search.iteration_cap)
    }

    pub fn begin_drag(&mut self, target: DragTarget) -> Result<&DragSession, PlannerError> {
        self.require_zone()?;
        self.require_idle()?;
        let session = self.layout.begin_drag(target)?;
        Ok(&*self.drag.insert(session))
    }

    /// Move the active drag to `delta` from its pick-up point.
    pub fn update_drag(&mut self, delta: Vec2) -> Result<Vec2, PlannerError> {
        let session = self.drag.as_mut().ok_or(PlannerError::NoActiveDrag)?;
        self.layout.update_drag(session, delta);
        Ok(session.delta())
    }

    /// The blueprint as it would look if the drag were dropped in place,
    /// without snapping.
    pub fn drag_preview(&self) -> Result<LayoutState, PlannerError> {
        let session = self.drag.as_ref().ok_or(PlannerError::NoActiveDrag)?;
        Ok(self.layout.with_drag_preview(session))
    }

    /// Feedback for the drag preview, so the panel can update live.
    pub fn preview_feedback(&self) -> Result<Vec<FeedbackMessage>, PlannerError> {
        let preview = self.drag_preview()?;
        Ok(self.feedback_for(&preview))
    }

    pub fn end_drag(&mut self) -> Result<CommitResult, PlannerError> {
        let session = self.drag.take().ok_or(PlannerError::NoActiveDrag)?;
        Ok(self.layout.end_drag(session))
    }

    /// Drop the drag without committing anything.
    pub fn cancel_drag(&mut self) -> Result<(), PlannerError> {
        self.drag.take().map(|_| ()).ok_or(PlannerError::NoActiveDrag)
    }

    pub fn delete_module(&mut self, id: ModuleId) -> Result<RemovedEntities, PlannerError> {
        self.require_idle()?;
        self.layout.delete_module(id).ok_or(PlannerError::UnknownModule)
    }

    /// Remove every module, ring and corridor. Cancels any drag.
    pub fn clear_all(&mut self) -> RemovedEntities {
        self.drag = None;
        let removed = self.layout.clear();
        log::info!("blueprint cleared ({} modules)", removed.modules.len());
        removed
    }

    /// Label a ring. A blank name restores the default label.
    pub fn rename_ring(&mut self, id: RingId, name: &str) -> Result<(), PlannerError> {
        let ring = self.layout.rings.get_mut(id).ok_or(PlannerError::UnknownRing)?;
        let name = name.trim();
        ring.name = (!name.is_empty()).then(|| name.to_string());
        Ok(())
    }

    /// The viability panel for the committed blueprint. Empty until a
    /// landing zone is selected.
    pub fn feedback(&self) -> Vec<FeedbackMessage> {
        self.feedback_for(&self.layout)
    }

    fn feedback_for(&self, layout: &LayoutState) -> Vec<FeedbackMessage> {
        match self.require_zone() {
            Ok(context) => evaluate_feedback(layout, context, &self.config.modules, &self.config.feedback),
            Err(_) => Vec::new(),
        }
    }

    pub fn collisions(&self) -> HashSet<ModuleId> {
        check_all_collisions(&self.layout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hex::lattice::{neighbor_points, same_slot};
    use crate::layout::drag::DropOutcome;
    use crate::site::feedback::Severity;

    fn session() -> Session {
        let mut s = Session::new(PlannerConfig::default()).unwrap();
        s.select_zone(1).unwrap();
        s
    }

    fn ring_at(s: &mut Session, hub: Vec2) -> RingId {
        let n = neighbor_points(hub, s.layout.metrics());
        let mut closed = None;
        for slot in [n[0], n[5], n[3], n[1], n[4], n[2]] {
            let id = s.layout.insert_module("habitat", slot);
            closed = s.layout.attach(id).or(closed);
        }
        closed.expect("ring should close")
    }

    #[test]
    fn placement_needs_a_zone() {
        let mut s = Session::new(PlannerConfig::default()).unwrap();
        assert_eq!(s.place_new_module("habitat").unwrap_err(), PlannerError::NoZoneSelected);
        assert!(s.feedback().is_empty());
        assert_eq!(s.select_zone(42).unwrap_err(), PlannerError::UnknownZone(42));
    }

    #[test]
    fn unknown_module_type_is_rejected() {
        let mut s = session();
        let err = s.place_new_module("rocket").unwrap_err();
        assert_eq!(err, PlannerError::UnknownModuleType("rocket".into()));
        assert_eq!(s.layout().module_count(), 0);
    }

    #[test]
    fn invalid_config_is_refused() {
        let mut config = PlannerConfig::default();
        config.search.iteration_cap = 0;
        assert!(matches!(Session::new(config), Err(PlannerError::InvalidConfig(_))));
    }

    #[test]
    fn first_placement_reports_missing_power() {
        let mut s = session();
        let placed = s.place_new_module("habitat").unwrap();
        let center = s.layout().center_of(placed.module).unwrap();
        assert!(same_slot(center, s.layout().area().center(), s.layout().metrics()));
        let feedback = s.feedback();
        assert!(feedback
            .iter()
            .any(|m| m.severity == Severity::Danger && m.text.contains("no power plant")));
        assert!(feedback.iter().any(|m| m.severity == Severity::Good && m.text.starts_with("Habitat")));
    }

    #[test]
    fn one_drag_at_a_time() {
        let mut s = session();
        let a = s.place_new_module("habitat").unwrap().module;
        let b = s.place_new_module("power").unwrap().module;
        s.begin_drag(DragTarget::Module(a)).unwrap();
        assert_eq!(s.begin_drag(DragTarget::Module(b)).unwrap_err(), PlannerError::DragInProgress);
        assert_eq!(s.place_new_module("isru").unwrap_err(), PlannerError::DragInProgress);
        assert_eq!(s.delete_module(b).unwrap_err(), PlannerError::DragInProgress);
        s.cancel_drag().unwrap();
        assert_eq!(s.cancel_drag().unwrap_err(), PlannerError::NoActiveDrag);
        assert_eq!(s.end_drag().unwrap_err(), PlannerError::NoActiveDrag);
        assert_eq!(s.update_drag(Vec2::X).unwrap_err(), PlannerError::NoActiveDrag);
    }

    #[test]
    fn drag_preview_feeds_live_feedback() {
        let mut s = session();
        s.place_new_module("habitat").unwrap();
        let power = s.place_new_module("power").unwrap().module;
        let start = s.layout().center_of(power).unwrap();
        s.begin_drag(DragTarget::Module(power)).unwrap();
        // Over the solar hotspot at 15% x 50%.
        s.update_drag(Vec2::new(180.0, 400.0) - start).unwrap();

        let live = s.preview_feedback().unwrap();
        assert!(live
            .iter()
            .any(|m| m.severity == Severity::Good && m.text.contains("Power Plant")));
        // Committed state is untouched until release.
        assert!(s
            .feedback()
            .iter()
            .any(|m| m.severity == Severity::Warn && m.text.contains("Power Plant")));

        let result = s.end_drag().unwrap();
        assert_eq!(result.outcome, DropOutcome::Moved);
        assert!(s.drag().is_none());
        assert!(s
            .feedback()
            .iter()
            .any(|m| m.severity == Severity::Good && m.text.contains("Power Plant")));
    }

    #[test]
    fn cancel_leaves_layout_alone() {
        let mut s = session();
        let a = s.place_new_module("habitat").unwrap().module;
        let before = s.layout().module(a).unwrap().position;
        s.begin_drag(DragTarget::Module(a)).unwrap();
        s.update_drag(Vec2::new(250.0, 0.0)).unwrap();
        s.cancel_drag().unwrap();
        assert_eq!(s.layout().module(a).unwrap().position, before);
    }

    #[test]
    fn ring_drop_through_session_links_rings() {
        let mut s = session();
        let a = ring_at(&mut s, Vec2::new(300.0, 400.0));
        let b = ring_at(&mut s, Vec2::new(760.0, 420.0));
        s.begin_drag(DragTarget::Ring(b)).unwrap();
        s.update_drag(Vec2::new(-55.0, -25.0)).unwrap();
        let result = s.end_drag().unwrap();
        assert_eq!(result.outcome, DropOutcome::Snapped);
        assert_eq!(result.final_positions.len(), 6);
        assert!(s.layout().connection_exists(a, b));

        let member = s.layout().ring(b).unwrap().modules[0];
        let removed = s.delete_module(member).unwrap();
        assert_eq!(removed.rings.len(), 2);
        assert_eq!(s.layout().module_count(), 0);
        assert_eq!(s.layout().corridor_count(), 0);
    }

    #[test]
    fn rename_ring_sets_and_clears_label() {
        let mut s = session();
        let ring = ring_at(&mut s, Vec2::new(600.0, 400.0));
        s.rename_ring(ring, "  Alpha  ").unwrap();
        assert_eq!(s.layout().ring(ring).unwrap().label(), "Alpha");
        s.rename_ring(ring, "").unwrap();
        assert_eq!(s.layout().ring(ring).unwrap().name, None);

        s.clear_all();
        assert_eq!(s.rename_ring(ring, "Beta").unwrap_err(), PlannerError::UnknownRing);
    }

    #[test]
    fn unknown_module_delete_fails() {
        let mut s = session();
        let a = s.place_new_module("ltv").unwrap().module;
        s.delete_module(a).unwrap();
        assert_eq!(s.delete_module(a).unwrap_err(), PlannerError::UnknownModule);
    }

    #[test]
    fn leaving_zone_resets_everything() {
        let mut s = session();
        s.place_new_module("habitat").unwrap();
        s.place_new_module("power").unwrap();
        let a = s.layout().modules().next().unwrap().0;
        s.begin_drag(DragTarget::Module(a)).unwrap();

        s.leave_zone();
        assert!(s.context().is_none());
        assert!(s.drag().is_none());
        assert_eq!(s.layout().module_count(), 0);
        assert_eq!(s.place_new_module("habitat").unwrap_err(), PlannerError::NoZoneSelected);

        let context = s.select_zone(3).unwrap();
        assert_eq!(context.zone.name, "Malapert Peak");
    }

    #[test]
    fn collisions_are_reported_for_stacked_modules() {
        let mut s = session();
        let a = s.layout.insert_module("habitat", Vec2::new(600.0, 400.0));
        let b = s.layout.insert_module("power", Vec2::new(605.0, 400.0));
        let colliding = s.collisions();
        assert!(colliding.contains(&a) && colliding.contains(&b));
        assert!(s.feedback()[0].text.contains("overlap"));
    }
}
