//! Weighted interval-to-slot aggregation.
//!
//! Samples every work interval at each time slot and sums the expertise
//! weights of the people covering a skill at that instant. Slots are point
//! samples, so coverage is a step function that is exact for hour-aligned
//! intervals and approximate otherwise.

use std::collections::{BTreeSet, HashMap};

use serde::Serialize;
use shiftmap_core::{ExpertiseWeights, OvernightPolicy, ShiftmapError, TimeSlot, WorkInterval};

/// Weighted coverage per `(slot, skill)`.
///
/// Rows follow the slot order given to [`aggregate`]; skill columns are in
/// ascending lexicographic order.
///
/// # Examples
///
/// ```
/// use chrono::NaiveTime;
/// use shiftmap_core::{ExpertiseWeights, OvernightPolicy, TimeSlot, WorkInterval};
/// use shiftmap_coverage::aggregate::aggregate;
///
/// let intervals = vec![WorkInterval {
///     person: "A".into(),
///     skill: "Go".into(),
///     start: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
///     end: NaiveTime::from_hms_opt(11, 0, 0).unwrap(),
///     expertise: "Senior".into(),
/// }];
/// let weights: ExpertiseWeights = [("Senior".to_string(), 3)].into_iter().collect();
/// let slots: Vec<TimeSlot> = (9..12).filter_map(|h| TimeSlot::new(h, 0)).collect();
///
/// let table = aggregate(&intervals, &slots, &weights, OvernightPolicy::Wrap).unwrap();
/// assert_eq!(table.column("Go"), Some(vec![3, 3, 0]));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageTable {
    slots: Vec<TimeSlot>,
    skills: Vec<String>,
    rows: Vec<Vec<u32>>,
}

impl CoverageTable {
    /// Slots in row order.
    pub fn slots(&self) -> &[TimeSlot] {
        &self.slots
    }

    /// Skills in column order.
    pub fn skills(&self) -> &[String] {
        &self.skills
    }

    /// Returns `true` when the table has no skill columns.
    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
    }

    /// Value of one cell, or `None` if the slot or skill is not in the table.
    pub fn get(&self, slot: TimeSlot, skill: &str) -> Option<u32> {
        let row = self.slots.iter().position(|s| *s == slot)?;
        let col = self.skill_index(skill)?;
        Some(self.rows[row][col])
    }

    /// Every slot's value for `skill`, in row order.
    pub fn column(&self, skill: &str) -> Option<Vec<u32>> {
        let col = self.skill_index(skill)?;
        Some(self.rows.iter().map(|row| row[col]).collect())
    }

    /// Rows paired with their slot.
    pub fn rows(&self) -> impl Iterator<Item = (TimeSlot, &[u32])> {
        self.slots
            .iter()
            .copied()
            .zip(self.rows.iter().map(Vec::as_slice))
    }

    /// Highest value reached by `skill` across the day.
    pub fn peak(&self, skill: &str) -> Option<u32> {
        self.column(skill)?.into_iter().max()
    }

    /// A table of the same shape with every cell rewritten by `f(skill, value)`.
    pub(crate) fn map_cells(&self, f: impl Fn(&str, u32) -> u32) -> Self {
        let rows = self
            .rows
            .iter()
            .map(|row| {
                row.iter()
                    .zip(&self.skills)
                    .map(|(value, skill)| f(skill, *value))
                    .collect()
            })
            .collect();
        Self {
            slots: self.slots.clone(),
            skills: self.skills.clone(),
            rows,
        }
    }

    fn skill_index(&self, skill: &str) -> Option<usize> {
        self.skills
            .binary_search_by(|s| s.as_str().cmp(skill))
            .ok()
    }
}

/// Build the coverage table for `intervals` sampled at `slots`.
///
/// An interval contributes `weights[expertise]` to `(slot, skill)` when
/// `start <= slot < end`. Intervals with `start == end` contribute nothing.
/// Intervals with `end < start` cross midnight and are handled per
/// `overnight`.
///
/// The result does not depend on the order of `intervals`.
///
/// # Errors
///
/// Returns [`ShiftmapError::UnknownExpertiseLevel`] if any interval's
/// expertise is missing from `weights`, and
/// [`ShiftmapError::OvernightInterval`] for a midnight-crossing interval
/// under [`OvernightPolicy::Reject`]. Either aborts the whole run.
pub fn aggregate(
    intervals: &[WorkInterval],
    slots: &[TimeSlot],
    weights: &ExpertiseWeights,
    overnight: OvernightPolicy,
) -> Result<CoverageTable, ShiftmapError> {
    let skills: Vec<String> = intervals
        .iter()
        .map(|i| i.skill.as_str())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect();
    let columns: HashMap<&str, usize> = skills
        .iter()
        .enumerate()
        .map(|(idx, skill)| (skill.as_str(), idx))
        .collect();

    let mut rows = vec![vec![0u32; skills.len()]; slots.len()];

    for interval in intervals {
        let weight = weights.get(&interval.expertise).ok_or_else(|| {
            ShiftmapError::UnknownExpertiseLevel {
                person: interval.person.clone(),
                skill: interval.skill.clone(),
                expertise: interval.expertise.clone(),
            }
        })?;

        if interval.crosses_midnight() && overnight == OvernightPolicy::Reject {
            return Err(ShiftmapError::OvernightInterval {
                person: interval.person.clone(),
                skill: interval.skill.clone(),
                start: TimeSlot::from(interval.start).to_string(),
                end: TimeSlot::from(interval.end).to_string(),
            });
        }

        let col = columns[interval.skill.as_str()];
        for (row, slot) in rows.iter_mut().zip(slots) {
            if covers(interval, *slot) {
                row[col] = row[col].checked_add(weight).ok_or_else(|| {
                    ShiftmapError::CoverageOverflow {
                        skill: interval.skill.clone(),
                        slot: slot.to_string(),
                    }
                })?;
            }
        }
    }

    Ok(CoverageTable {
        slots: slots.to_vec(),
        skills,
        rows,
    })
}

/// Whether `slot` falls inside `interval`, left-inclusive and right-exclusive.
///
/// Midnight-crossing intervals cover `[start, 24:00)` and `[00:00, end)`.
///
/// # Examples
///
/// ```
/// use chrono::NaiveTime;
/// use shiftmap_core::{TimeSlot, WorkInterval};
/// use shiftmap_coverage::aggregate::covers;
///
/// let night = WorkInterval {
///     person: "N".into(),
///     skill: "Ops".into(),
///     start: NaiveTime::from_hms_opt(22, 0, 0).unwrap(),
///     end: NaiveTime::from_hms_opt(6, 0, 0).unwrap(),
///     expertise: "Senior Developer".into(),
/// };
/// assert!(covers(&night, TimeSlot::new(23, 0).unwrap()));
/// assert!(covers(&night, TimeSlot::new(5, 0).unwrap()));
/// assert!(!covers(&night, TimeSlot::new(6, 0).unwrap()));
/// ```
pub fn covers(interval: &WorkInterval, slot: TimeSlot) -> bool {
    let t = slot.time();
    if interval.crosses_midnight() {
        t >= interval.start || t < interval.end
    } else {
        interval.start <= t && t < interval.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    fn at(hour: u32, minute: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
    }

    fn slot(hour: u32) -> TimeSlot {
        TimeSlot::new(hour, 0).unwrap()
    }

    fn interval(person: &str, skill: &str, start: u32, end: u32, expertise: &str) -> WorkInterval {
        WorkInterval {
            person: person.into(),
            skill: skill.into(),
            start: at(start, 0),
            end: at(end, 0),
            expertise: expertise.into(),
        }
    }

    fn standard(intervals: &[WorkInterval]) -> CoverageTable {
        aggregate(
            intervals,
            &TimeSlot::hourly(),
            &ExpertiseWeights::standard(),
            OvernightPolicy::Wrap,
        )
        .unwrap()
    }

    #[test]
    fn senior_go_scenario() {
        let intervals = vec![interval("A", "Go", 9, 11, "Senior")];
        let weights: ExpertiseWeights = [("Senior".to_string(), 3)].into_iter().collect();
        let slots = vec![slot(9), slot(10), slot(11)];

        let table = aggregate(&intervals, &slots, &weights, OvernightPolicy::Wrap).unwrap();
        assert_eq!(table.get(slot(9), "Go"), Some(3));
        assert_eq!(table.get(slot(10), "Go"), Some(3));
        assert_eq!(table.get(slot(11), "Go"), Some(0));
    }

    #[test]
    fn half_open_boundaries() {
        let table = standard(&[interval("A", "Rust", 9, 17, "Senior Developer")]);
        assert_eq!(table.get(slot(8), "Rust"), Some(0));
        assert_eq!(table.get(slot(9), "Rust"), Some(3));
        assert_eq!(table.get(slot(16), "Rust"), Some(3));
        assert_eq!(table.get(slot(17), "Rust"), Some(0));
    }

    #[test]
    fn overlapping_intervals_sum() {
        let table = standard(&[
            interval("A", "Go", 9, 12, "Junior Developer"),
            interval("B", "Go", 10, 14, "Senior Developer"),
        ]);
        assert_eq!(table.get(slot(9), "Go"), Some(1));
        assert_eq!(table.get(slot(10), "Go"), Some(4));
        assert_eq!(table.get(slot(13), "Go"), Some(3));
        assert_eq!(table.peak("Go"), Some(4));
    }

    #[test]
    fn empty_interval_contributes_nothing() {
        let table = standard(&[interval("A", "Go", 9, 9, "Principal/Lead Developer")]);
        assert_eq!(table.skills(), ["Go".to_string()]);
        assert_eq!(table.peak("Go"), Some(0));
    }

    #[test]
    fn unaligned_interval_is_sampled_at_slot_points() {
        let mut half = interval("A", "Go", 9, 11, "Junior Developer");
        half.start = at(9, 30);
        half.end = at(11, 30);
        let table = standard(&[half]);
        assert_eq!(table.get(slot(9), "Go"), Some(0));
        assert_eq!(table.get(slot(10), "Go"), Some(1));
        assert_eq!(table.get(slot(11), "Go"), Some(1));
        assert_eq!(table.get(slot(12), "Go"), Some(0));
    }

    #[test]
    fn unknown_expertise_aborts_the_run() {
        let intervals = vec![
            interval("A", "Go", 9, 17, "Senior Developer"),
            interval("B", "Go", 9, 17, "Staff Engineer"),
        ];
        let err = aggregate(
            &intervals,
            &TimeSlot::hourly(),
            &ExpertiseWeights::standard(),
            OvernightPolicy::Wrap,
        )
        .unwrap_err();
        match err {
            ShiftmapError::UnknownExpertiseLevel {
                person, expertise, ..
            } => {
                assert_eq!(person, "B");
                assert_eq!(expertise, "Staff Engineer");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn skills_are_sorted_and_rows_follow_slot_order() {
        let slots = vec![slot(14), slot(2), slot(9)];
        let table = aggregate(
            &[
                interval("A", "Rust", 8, 16, "Junior Developer"),
                interval("B", "C++", 8, 16, "Junior Developer"),
                interval("C", "Go", 8, 16, "Junior Developer"),
            ],
            &slots,
            &ExpertiseWeights::standard(),
            OvernightPolicy::Wrap,
        )
        .unwrap();
        assert_eq!(table.skills(), ["C++", "Go", "Rust"].map(String::from));
        assert_eq!(table.slots(), slots.as_slice());
        assert_eq!(table.column("Rust"), Some(vec![1, 0, 1]));
    }

    #[test]
    fn reordering_and_repeating_give_identical_tables() {
        let intervals = vec![
            interval("A", "Go", 9, 17, "Senior Developer"),
            interval("B", "Go", 12, 20, "Junior Developer"),
            interval("C", "Rust", 22, 6, "Mid-Level Developer"),
            interval("D", "Rust", 0, 8, "Principal/Lead Developer"),
        ];
        let first = standard(&intervals);
        assert_eq!(first, standard(&intervals));

        let mut reversed = intervals.clone();
        reversed.reverse();
        assert_eq!(first, standard(&reversed));

        let mut rotated = intervals.clone();
        rotated.rotate_left(1);
        assert_eq!(first, standard(&rotated));
    }

    #[test]
    fn cells_never_exceed_covering_count_times_max_weight() {
        let intervals = vec![
            interval("A", "Go", 9, 17, "Senior Developer"),
            interval("B", "Go", 6, 14, "Principal/Lead Developer"),
            interval("C", "Go", 20, 4, "Junior Developer"),
            interval("D", "Go", 11, 11, "Mid-Level Developer"),
        ];
        let weights = ExpertiseWeights::standard();
        let table = standard(&intervals);
        for (slot, row) in table.rows() {
            let covering = intervals.iter().filter(|i| covers(i, slot)).count() as u32;
            assert!(row[0] <= covering * weights.max(), "slot {slot} over bound");
        }
    }

    #[test]
    fn overnight_wraps_by_default() {
        let table = standard(&[interval("N", "Ops", 22, 6, "Senior Developer")]);
        assert_eq!(table.get(slot(21), "Ops"), Some(0));
        assert_eq!(table.get(slot(22), "Ops"), Some(3));
        assert_eq!(table.get(slot(0), "Ops"), Some(3));
        assert_eq!(table.get(slot(5), "Ops"), Some(3));
        assert_eq!(table.get(slot(6), "Ops"), Some(0));
    }

    #[test]
    fn overnight_rejected_when_configured() {
        let err = aggregate(
            &[interval("N", "Ops", 22, 6, "Senior Developer")],
            &TimeSlot::hourly(),
            &ExpertiseWeights::standard(),
            OvernightPolicy::Reject,
        )
        .unwrap_err();
        assert!(matches!(err, ShiftmapError::OvernightInterval { .. }));
        assert!(err.to_string().contains("22:00 -> 06:00"));
    }

    #[test]
    fn oversized_weights_overflow_into_an_error() {
        let weights: ExpertiseWeights = [("Big".to_string(), u32::MAX), ("Small".to_string(), 1)]
            .into_iter()
            .collect();
        let err = aggregate(
            &[
                interval("A", "Go", 9, 10, "Big"),
                interval("B", "Go", 9, 10, "Big"),
            ],
            &TimeSlot::hourly(),
            &weights,
            OvernightPolicy::Wrap,
        )
        .unwrap_err();
        assert!(matches!(err, ShiftmapError::CoverageOverflow { .. }));
        assert!(err.to_string().contains("09:00"));
    }

    #[test]
    fn no_intervals_gives_empty_columns() {
        let table = standard(&[]);
        assert!(table.is_empty());
        assert_eq!(table.slots().len(), 24);
        assert_eq!(table.get(slot(0), "Go"), None);
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let table = aggregate(
            &[interval("A", "Go", 9, 10, "Senior Developer")],
            &[slot(9)],
            &ExpertiseWeights::standard(),
            OvernightPolicy::Wrap,
        )
        .unwrap();
        let json = serde_json::to_value(&table).unwrap();
        assert_eq!(json["slots"][0], "09:00");
        assert_eq!(json["skills"][0], "Go");
        assert_eq!(json["rows"][0][0], 3);
    }
}
