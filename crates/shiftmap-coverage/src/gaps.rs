//! Coverage gaps: how far each slot falls short of full staffing.
//!
//! A skill's capacity is the score it would reach if every interval under it
//! were held by someone at every expertise level at once:
//! `intervals_with_skill * sum(weights)`. The gap at a slot is capacity minus
//! the coverage actually reached there.

use std::collections::BTreeMap;

use serde::Serialize;
use shiftmap_core::{ExpertiseWeights, ShiftmapError, WorkInterval};

use crate::aggregate::CoverageTable;

/// Per-slot shortfall against each skill's capacity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GapTable {
    /// Maximum attainable score per skill.
    pub capacity: BTreeMap<String, u32>,
    /// `capacity - coverage` per `(slot, skill)`, same shape as the input table.
    pub gaps: CoverageTable,
}

impl GapTable {
    /// Capacity of `skill`, or `None` if the skill is not in the table.
    pub fn capacity(&self, skill: &str) -> Option<u32> {
        self.capacity.get(skill).copied()
    }

    /// The slots where `skill` is furthest from capacity, in row order.
    pub fn worst_slots(&self, skill: &str) -> Vec<shiftmap_core::TimeSlot> {
        let Some(column) = self.gaps.column(skill) else {
            return Vec::new();
        };
        let Some(worst) = column.iter().copied().max() else {
            return Vec::new();
        };
        self.gaps
            .slots()
            .iter()
            .zip(column)
            .filter(|(_, gap)| *gap == worst)
            .map(|(slot, _)| *slot)
            .collect()
    }
}

/// Invert a coverage table into a gap table.
///
/// `intervals` must be the set the table was aggregated from; it supplies
/// the per-skill interval counts.
///
/// # Errors
///
/// Returns [`ShiftmapError::CoverageOverflow`] if a skill's capacity does
/// not fit in a `u32`.
///
/// # Examples
///
/// ```
/// use chrono::NaiveTime;
/// use shiftmap_core::{ExpertiseWeights, OvernightPolicy, TimeSlot, WorkInterval};
/// use shiftmap_coverage::aggregate::aggregate;
/// use shiftmap_coverage::gaps::coverage_gaps;
///
/// let intervals = vec![WorkInterval {
///     person: "A".into(),
///     skill: "Go".into(),
///     start: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
///     end: NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
///     expertise: "Senior Developer".into(),
/// }];
/// let weights = ExpertiseWeights::standard();
/// let slots = TimeSlot::hourly();
/// let table = aggregate(&intervals, &slots, &weights, OvernightPolicy::Wrap).unwrap();
///
/// let gaps = coverage_gaps(&table, &intervals, &weights).unwrap();
/// assert_eq!(gaps.capacity("Go"), Some(10));
/// assert_eq!(gaps.gaps.get(TimeSlot::new(10, 0).unwrap(), "Go"), Some(7));
/// assert_eq!(gaps.gaps.get(TimeSlot::new(3, 0).unwrap(), "Go"), Some(10));
/// ```
pub fn coverage_gaps(
    table: &CoverageTable,
    intervals: &[WorkInterval],
    weights: &ExpertiseWeights,
) -> Result<GapTable, ShiftmapError> {
    let overflow = |skill: &str| ShiftmapError::CoverageOverflow {
        skill: skill.to_string(),
        slot: "capacity".into(),
    };
    let per_interval = weights.total();
    let mut capacity: BTreeMap<String, u32> = table
        .skills()
        .iter()
        .map(|skill| (skill.clone(), 0))
        .collect();
    for interval in intervals {
        if let Some(cap) = capacity.get_mut(&interval.skill) {
            *cap = per_interval
                .and_then(|per_interval| cap.checked_add(per_interval))
                .ok_or_else(|| overflow(&interval.skill))?;
        }
    }

    let gaps = table.map_cells(|skill, covered| {
        capacity
            .get(skill)
            .copied()
            .unwrap_or(0)
            .saturating_sub(covered)
    });

    Ok(GapTable { capacity, gaps })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::aggregate;
    use chrono::NaiveTime;
    use shiftmap_core::{OvernightPolicy, TimeSlot};

    fn interval(person: &str, skill: &str, start: u32, end: u32, expertise: &str) -> WorkInterval {
        WorkInterval {
            person: person.into(),
            skill: skill.into(),
            start: NaiveTime::from_hms_opt(start, 0, 0).unwrap(),
            end: NaiveTime::from_hms_opt(end, 0, 0).unwrap(),
            expertise: expertise.into(),
        }
    }

    fn gaps_for(intervals: &[WorkInterval]) -> GapTable {
        let weights = ExpertiseWeights::standard();
        let table = aggregate(intervals, &TimeSlot::hourly(), &weights, OvernightPolicy::Wrap)
            .unwrap();
        coverage_gaps(&table, intervals, &weights).unwrap()
    }

    #[test]
    fn capacity_scales_with_interval_count() {
        let gaps = gaps_for(&[
            interval("A", "Go", 9, 17, "Senior Developer"),
            interval("B", "Go", 12, 20, "Junior Developer"),
            interval("C", "Rust", 9, 17, "Junior Developer"),
        ]);
        assert_eq!(gaps.capacity("Go"), Some(20));
        assert_eq!(gaps.capacity("Rust"), Some(10));
        assert_eq!(gaps.capacity("Python"), None);
    }

    #[test]
    fn gap_is_capacity_minus_coverage() {
        let gaps = gaps_for(&[
            interval("A", "Go", 9, 17, "Senior Developer"),
            interval("B", "Go", 12, 20, "Junior Developer"),
        ]);
        let slot = |h| TimeSlot::new(h, 0).unwrap();
        assert_eq!(gaps.gaps.get(slot(8), "Go"), Some(20));
        assert_eq!(gaps.gaps.get(slot(10), "Go"), Some(17));
        assert_eq!(gaps.gaps.get(slot(13), "Go"), Some(16));
        assert_eq!(gaps.gaps.get(slot(18), "Go"), Some(19));
    }

    #[test]
    fn worst_slots_are_the_uncovered_ones() {
        let gaps = gaps_for(&[interval("A", "Go", 0, 23, "Senior Developer")]);
        assert_eq!(gaps.worst_slots("Go"), vec![TimeSlot::new(23, 0).unwrap()]);
        assert!(gaps.worst_slots("Rust").is_empty());
    }

    #[test]
    fn capacity_overflow_is_an_error() {
        let weights: ExpertiseWeights = [("Heavy".to_string(), u32::MAX / 2 + 1)]
            .into_iter()
            .collect();
        let intervals = [
            interval("A", "Go", 9, 10, "Heavy"),
            interval("B", "Go", 11, 12, "Heavy"),
        ];
        let table = aggregate(&intervals, &TimeSlot::hourly(), &weights, OvernightPolicy::Wrap)
            .unwrap();
        let err = coverage_gaps(&table, &intervals, &weights).unwrap_err();
        assert!(matches!(err, ShiftmapError::CoverageOverflow { ref skill, .. } if skill == "Go"));
    }
}
