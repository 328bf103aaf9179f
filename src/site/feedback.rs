use std::collections::HashSet;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::catalog::{ModuleCatalog, ModuleCategory};
use super::terrain::{TerrainContext, TerrainKind};
use crate::hex::lattice::same_slot;
use crate::layout::world::{LayoutState, ModuleId};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Good,
    Warn,
    Danger,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FeedbackMessage {
    pub severity: Severity,
    pub text: String,
}

impl FeedbackMessage {
    fn new(severity: Severity, text: impl Into<String>) -> Self {
        Self {
            severity,
            text: text.into(),
        }
    }
}

/// Tunables for the viability panel.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FeedbackConfig {
    /// How loudly to complain about a base with no power module.
    pub missing_power: Severity,
    /// Sites with less solar exposure than this (percent) get a warning
    /// once power modules are placed.
    pub low_solar_threshold: u8,
}

impl Default for FeedbackConfig {
    fn default() -> Self {
        Self {
            missing_power: Severity::Danger,
            low_solar_threshold: 70,
        }
    }
}

/// Every module whose center shares a slot with another module's.
pub fn check_all_collisions(state: &LayoutState) -> HashSet<ModuleId> {
    let metrics = state.metrics();
    let centers: Vec<(ModuleId, Vec2)> = state.modules().map(|(id, m)| (id, m.center(metrics))).collect();
    let mut colliding = HashSet::new();
    for (i, &(a, ca)) in centers.iter().enumerate() {
        for &(b, cb) in &centers[i + 1..] {
            if same_slot(ca, cb, metrics) {
                colliding.insert(a);
                colliding.insert(b);
            }
        }
    }
    colliding
}

/// Build the viability panel for the current layout. Nothing is cached:
/// the list is derived from `state` alone on every call.
pub fn evaluate_feedback(
    state: &LayoutState,
    context: &TerrainContext,
    catalog: &ModuleCatalog,
    config: &FeedbackConfig,
) -> Vec<FeedbackMessage> {
    let mut messages = Vec::new();
    if state.module_count() == 0 {
        return messages;
    }

    let has = |category: ModuleCategory| {
        state
            .modules()
            .any(|(_, m)| catalog.category(&m.kind) == Some(category))
    };

    if !check_all_collisions(state).is_empty() {
        messages.push(FeedbackMessage::new(
            Severity::Danger,
            "Layout error: modules overlap. Adjust their positions.",
        ));
    }
    let has_power = has(ModuleCategory::Power);
    if !has_power {
        messages.push(FeedbackMessage::new(
            config.missing_power,
            "Critical alert: the base has no power plant.",
        ));
    }
    if !has(ModuleCategory::Habitat) {
        messages.push(FeedbackMessage::new(
            Severity::Danger,
            "Critical alert: the crew has nowhere to live. Add a habitat.",
        ));
    }

    let area = state.area();
    for (_, module) in state.modules_in_order() {
        let features = context.features_at(area.to_percent(module.center(state.metrics())));
        let name = catalog.display_name(&module.kind);

        if features.contains(&TerrainKind::Unstable) {
            messages.push(FeedbackMessage::new(
                Severity::Danger,
                format!("Danger: module {name} sits on unstable terrain. High structural risk!"),
            ));
        }

        match catalog.category(&module.kind) {
            Some(ModuleCategory::Power) => {
                if features.contains(&TerrainKind::SolarHotspot) {
                    messages.push(FeedbackMessage::new(
                        Severity::Good,
                        format!("Power status: {name} on a solar hotspot maximizes generation."),
                    ));
                } else {
                    messages.push(FeedbackMessage::new(
                        Severity::Warn,
                        format!("Power warning: {name} is not on a solar hotspot. Efficiency will be reduced."),
                    ));
                }
            }
            Some(ModuleCategory::Extraction) => {
                if features.contains(&TerrainKind::WaterIceDeposit) {
                    messages.push(FeedbackMessage::new(
                        Severity::Good,
                        format!("{name} status: direct access to the water ice deposit."),
                    ));
                } else {
                    messages.push(FeedbackMessage::new(
                        Severity::Warn,
                        format!("{name} warning: far from resource deposits. Extraction will be inefficient or impossible."),
                    ));
                }
            }
            Some(ModuleCategory::Habitat) => {
                if features.contains(&TerrainKind::Stable) {
                    messages.push(FeedbackMessage::new(
                        Severity::Good,
                        format!("{name} status: sits on safe, stable terrain."),
                    ));
                }
            }
            _ => {}
        }
    }

    let mut rings: Vec<_> = state.rings().map(|(_, r)| r).collect();
    rings.sort_by_key(|r| r.serial);
    for ring in rings {
        if context
            .features_at(area.to_percent(ring.center))
            .contains(&TerrainKind::Unstable)
        {
            messages.push(FeedbackMessage::new(
                Severity::Danger,
                format!("Danger: {} is centered on unstable terrain.", ring.label()),
            ));
        }
    }

    if has_power && context.zone.solar < config.low_solar_threshold {
        messages.push(FeedbackMessage::new(
            Severity::Warn,
            format!(
                "Site warning: {} receives only {}% sunlight. Power output will be limited.",
                context.zone.name, context.zone.solar
            ),
        ));
    }

    messages
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hex::area::PlayArea;
    use crate::hex::lattice::HexMetrics;
    use crate::site::terrain::{default_terrain, default_zones};

    fn context(zone: u32) -> TerrainContext {
        TerrainContext::select(&default_zones(), &default_terrain(), zone).unwrap()
    }

    fn state() -> LayoutState {
        LayoutState::new(HexMetrics::default(), PlayArea::default())
    }

    fn run(s: &LayoutState, zone: u32) -> Vec<FeedbackMessage> {
        evaluate_feedback(s, &context(zone), &ModuleCatalog::default(), &FeedbackConfig::default())
    }

    #[test]
    fn empty_layout_has_no_messages() {
        assert!(run(&state(), 1).is_empty());
    }

    #[test]
    fn power_on_hotspot_is_good_and_off_it_warns() {
        let mut s = state();
        // 15% x 50% of a 1200x800 area.
        s.insert_module("power", Vec2::new(180.0, 400.0));
        s.insert_module("habitat", Vec2::new(600.0, 400.0));
        let on = run(&s, 1);
        assert!(on
            .iter()
            .any(|m| m.severity == Severity::Good && m.text.contains("Power Plant")));
        assert!(!on.iter().any(|m| m.severity == Severity::Danger));

        let mut moved = state();
        moved.insert_module("power", Vec2::new(700.0, 400.0));
        moved.insert_module("habitat", Vec2::new(600.0, 400.0));
        let off = run(&moved, 1);
        assert!(off
            .iter()
            .any(|m| m.severity == Severity::Warn && m.text.contains("Power Plant")));
        assert!(!off.iter().any(|m| m.severity == Severity::Good && m.text.contains("Power Plant")));
    }

    #[test]
    fn coinciding_modules_collide() {
        let mut s = state();
        let a = s.insert_module("habitat", Vec2::new(600.0, 400.0));
        let b = s.insert_module("power", Vec2::new(610.0, 405.0));
        let c = s.insert_module("isru", Vec2::new(900.0, 400.0));
        let colliding = check_all_collisions(&s);
        assert!(colliding.contains(&a) && colliding.contains(&b));
        assert!(!colliding.contains(&c));
        let messages = run(&s, 1);
        assert_eq!(messages[0].severity, Severity::Danger);
        assert!(messages[0].text.contains("overlap"));
    }

    #[test]
    fn missing_essentials_are_reported_in_order() {
        let mut s = state();
        s.insert_module("ltv", Vec2::new(600.0, 400.0));
        let messages = run(&s, 1);
        assert_eq!(messages.len(), 2);
        assert!(messages[0].text.contains("power"));
        assert!(messages[1].text.contains("habitat"));
    }

    #[test]
    fn missing_power_severity_is_configurable() {
        let mut s = state();
        s.insert_module("habitat", Vec2::new(600.0, 400.0));
        let config = FeedbackConfig {
            missing_power: Severity::Warn,
            ..Default::default()
        };
        let messages = evaluate_feedback(&s, &context(1), &ModuleCatalog::default(), &config);
        assert_eq!(messages[0].severity, Severity::Warn);
    }

    #[test]
    fn unstable_ground_is_dangerous() {
        let mut s = state();
        // 90% x 15%.
        s.insert_module("habitat", Vec2::new(1080.0, 120.0));
        let messages = run(&s, 1);
        assert!(messages
            .iter()
            .any(|m| m.severity == Severity::Danger && m.text.contains("unstable")));
        assert!(!messages.iter().any(|m| m.severity == Severity::Good));
    }

    #[test]
    fn isru_wants_water_ice() {
        let mut s = state();
        // 85% x 85%.
        s.insert_module("isru", Vec2::new(1020.0, 680.0));
        let messages = run(&s, 1);
        assert!(messages
            .iter()
            .any(|m| m.severity == Severity::Good && m.text.starts_with("ISRU")));
    }

    #[test]
    fn dim_site_warns_about_power() {
        let mut s = state();
        s.insert_module("power", Vec2::new(180.0, 400.0));
        s.insert_module("habitat", Vec2::new(600.0, 400.0));
        assert!(!run(&s, 1).iter().any(|m| m.text.starts_with("Site warning")));
        let dim = run(&s, 2);
        let last = dim.last().unwrap();
        assert_eq!(last.severity, Severity::Warn);
        assert!(last.text.contains("Sea of Serenity"));
    }
}
