pub mod catalog;
pub mod config;
pub mod feedback;
pub mod terrain;
