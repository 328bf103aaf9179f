use std::fmt;

/// Errors surfaced to the presentation layer. None of them are fatal: every
/// failing operation leaves the layout exactly as it was.
#[derive(Clone, Debug, PartialEq)]
pub enum PlannerError {
    /// Placement search exhausted its iteration cap without a free slot.
    NoSpaceAvailable,
    /// The requested module type key is not in the catalog.
    UnknownModuleType(String),
    /// No lunar zone with this id exists.
    UnknownZone(u32),
    /// Layout operations require a selected landing zone.
    NoZoneSelected,
    /// The module id does not refer to a live module.
    UnknownModule,
    /// The ring id does not refer to a live ring.
    UnknownRing,
    /// A drag is already active; release or cancel it first.
    DragInProgress,
    /// No drag is active.
    NoActiveDrag,
    /// The configuration failed validation.
    InvalidConfig(String),
}

impl fmt::Display for PlannerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlannerError::NoSpaceAvailable => write!(f, "No free space left on the blueprint"),
            PlannerError::UnknownModuleType(key) => write!(f, "Unknown module type: {key}"),
            PlannerError::UnknownZone(id) => write!(f, "Unknown landing zone: {id}"),
            PlannerError::NoZoneSelected => write!(f, "No landing zone selected"),
            PlannerError::UnknownModule => write!(f, "Module does not exist"),
            PlannerError::UnknownRing => write!(f, "Ring does not exist"),
            PlannerError::DragInProgress => write!(f, "Another drag is still active"),
            PlannerError::NoActiveDrag => write!(f, "No drag is active"),
            PlannerError::InvalidConfig(msg) => write!(f, "Invalid configuration: {msg}"),
        }
    }
}

impl std::error::Error for PlannerError {}
