//! Hex-lattice layout engine for planning a lunar surface base.
//!
//! The presentation layer owns one [`Session`] and drives it with placement,
//! drag and deletion calls; everything it needs to draw is read back from the
//! session's [`LayoutState`](layout::world::LayoutState).

pub mod error;
pub mod hex;
pub mod layout;
pub mod session;
pub mod site;

pub use error::PlannerError;
pub use session::Session;
