//! Progress tracking for migration runs

pub mod events;

pub use events::*;
