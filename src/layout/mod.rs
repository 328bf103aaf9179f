pub mod chain;
pub mod corridor;
pub mod deletion;
pub mod drag;
pub mod occupancy;
pub mod placement;
pub mod world;
