//! # Utility data structures

pub mod int_map;

pub use int_map::IntMap;
