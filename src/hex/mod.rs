pub mod area;
pub mod lattice;
