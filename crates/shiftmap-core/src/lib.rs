//! Core types, configuration, and error handling for shiftmap.
//!
//! This crate provides the shared foundation used by the other shiftmap crates:
//! - [`ShiftmapError`]: unified error type using `thiserror`
//! - [`ShiftmapConfig`]: configuration loaded from `.shiftmap.toml`
//! - Shared types: [`WorkInterval`], [`TimeSlot`], [`ExpertiseWeights`],
//!   [`OvernightPolicy`], [`OutputFormat`]

mod config;
mod error;
mod types;

pub use config::{CoverageConfig, ShiftmapConfig, SlotConfig};
pub use error::ShiftmapError;
pub use types::{
    ExpertiseWeights, OutputFormat, OvernightPolicy, TimeSlot, WorkInterval, MAX_WEIGHT,
    STANDARD_LEVELS,
};

/// A convenience `Result` type for shiftmap operations.
pub type Result<T> = std::result::Result<T, ShiftmapError>;
