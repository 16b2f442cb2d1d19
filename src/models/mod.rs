//! Data models for Wardwatch

pub mod bed;
pub mod bed_history;
pub mod equipment;
pub mod input;
pub mod user;

// Re-export commonly used types
pub use bed::{Bed, BedEvent, BedState, WardType};
pub use bed_history::BedHistory;
pub use equipment::{Equipment, EquipmentEvent, EquipmentState};
pub use user::{Identity, Role, User};
