//! Team skill coverage: loading, weighted aggregation, gaps, and timelines.
//!
//! Flattens a YAML team description into work intervals, samples them at
//! fixed time slots weighted by expertise, and derives the tables that chart
//! front ends consume: coverage heatmaps and trends, coverage gaps, and
//! per-skill working-hour bars.

pub mod aggregate;
pub mod gaps;
pub mod roster;
pub mod timeline;
