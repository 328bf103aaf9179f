use serde::{Deserialize, Serialize};

/// What a module is for. Feedback rules key off the category, so a
/// catalog may add new types without touching the evaluator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModuleCategory {
    Habitat,
    Power,
    Extraction,
    Access,
    Vehicle,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ModuleType {
    pub key: String,
    pub name: String,
    /// Icon key handed through to the presentation layer.
    pub icon: String,
    pub category: ModuleCategory,
}

impl ModuleType {
    fn new(key: &str, name: &str, icon: &str, category: ModuleCategory) -> Self {
        Self {
            key: key.to_string(),
            name: name.to_string(),
            icon: icon.to_string(),
            category,
        }
    }
}

/// The module types a player can place, in palette order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ModuleCatalog {
    pub types: Vec<ModuleType>,
}

impl Default for ModuleCatalog {
    fn default() -> Self {
        use ModuleCategory::*;
        Self {
            types: vec![
                ModuleType::new("habitat", "Habitat", "fa-house-user", Habitat),
                ModuleType::new("airlock", "Airlock", "fa-door-open", Access),
                ModuleType::new("power", "Power Plant", "fa-solar-panel", Power),
                ModuleType::new("ltv", "LTV", "fa-car-side", Vehicle),
                ModuleType::new("isru", "ISRU", "fa-industry", Extraction),
                ModuleType::new("pressurized-rover", "Pressurized Rover", "fa-truck-monster", Vehicle),
            ],
        }
    }
}

impl ModuleCatalog {
    pub fn get(&self, key: &str) -> Option<&ModuleType> {
        self.types.iter().find(|t| t.key == key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn category(&self, key: &str) -> Option<ModuleCategory> {
        self.get(key).map(|t| t.category)
    }

    /// Display name for `key`, falling back to the key itself.
    pub fn display_name<'a>(&'a self, key: &'a str) -> &'a str {
        self.get(key).map_or(key, |t| t.name.as_str())
    }

    /// First duplicated key, if any.
    pub fn duplicate_key(&self) -> Option<&str> {
        self.types.iter().enumerate().find_map(|(i, t)| {
            self.types[..i]
                .iter()
                .any(|prev| prev.key == t.key)
                .then_some(t.key.as_str())
        })
    }
}
