//! Per-skill working-hour bars for Gantt-style consumers.

use chrono::{NaiveTime, Timelike};
use serde::Serialize;

use crate::roster::TeamRoster;

/// One person's working window within a skill lane.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Bar {
    /// Developer name.
    pub person: String,
    /// Expertise label.
    pub expertise: String,
    /// Main skill from the `People` section, if recorded.
    pub main_skill: Option<String>,
    /// Start as fractional hours since midnight.
    pub start_hours: f64,
    /// Length in hours; windows crossing midnight wrap into the next day.
    pub duration_hours: f64,
}

impl Bar {
    /// End as fractional hours; may exceed 24 for overnight windows.
    pub fn end_hours(&self) -> f64 {
        self.start_hours + self.duration_hours
    }
}

/// Bars for one skill.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Lane {
    /// Skill name.
    pub skill: String,
    /// Bars ordered by start time, then person.
    pub bars: Vec<Bar>,
}

/// All lanes, skills ascending.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Timeline {
    /// One lane per skill.
    pub lanes: Vec<Lane>,
}

impl Timeline {
    /// Largest number of bars in any lane.
    pub fn max_lane_len(&self) -> usize {
        self.lanes.iter().map(|l| l.bars.len()).max().unwrap_or(0)
    }
}

/// Group the roster's intervals into per-skill lanes.
///
/// # Examples
///
/// ```
/// use shiftmap_coverage::roster::parse_team;
/// use shiftmap_coverage::timeline::build_timeline;
///
/// let roster = parse_team(r#"
/// Ops:
///   Night: {start: "10:00 PM", end: "6:00 AM", expertise: Senior Developer}
/// "#).unwrap();
/// let timeline = build_timeline(&roster);
/// let bar = &timeline.lanes[0].bars[0];
/// assert_eq!(bar.start_hours, 22.0);
/// assert_eq!(bar.duration_hours, 8.0);
/// ```
pub fn build_timeline(roster: &TeamRoster) -> Timeline {
    let mut lanes: Vec<Lane> = roster
        .skills()
        .into_iter()
        .map(|skill| Lane {
            skill: skill.to_string(),
            bars: Vec::new(),
        })
        .collect();

    for interval in &roster.intervals {
        let Ok(idx) = lanes.binary_search_by(|lane| lane.skill.as_str().cmp(&interval.skill))
        else {
            continue;
        };
        let start_hours = fractional_hours(interval.start);
        let mut duration_hours = fractional_hours(interval.end) - start_hours;
        if duration_hours < 0.0 {
            duration_hours += 24.0;
        }
        lanes[idx].bars.push(Bar {
            person: interval.person.clone(),
            expertise: interval.expertise.clone(),
            main_skill: roster.main_skill(&interval.person).map(str::to_string),
            start_hours,
            duration_hours,
        });
    }

    for lane in &mut lanes {
        lane.bars.sort_by(|a, b| {
            a.start_hours
                .total_cmp(&b.start_hours)
                .then_with(|| a.person.cmp(&b.person))
        });
    }

    Timeline { lanes }
}

fn fractional_hours(time: NaiveTime) -> f64 {
    f64::from(time.hour()) + f64::from(time.minute()) / 60.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::parse_team;

    const TEAM: &str = r#"
Rust:
  Zed:
    start: "9:00 AM"
    end: "5:00 PM"
    expertise: Senior Developer
  Amy:
    start: "9:00 AM"
    end: "1:30 PM"
    expertise: Junior Developer
  Kim:
    start: "7:00 AM"
    end: "3:00 PM"
    expertise: Mid-Level Developer
Go:
  Amy:
    start: "11:00 PM"
    end: "2:00 AM"
    expertise: Principal/Lead Developer
People:
  Amy:
    main_skill: Rust
"#;

    #[test]
    fn lanes_are_sorted_by_skill() {
        let timeline = build_timeline(&parse_team(TEAM).unwrap());
        let skills: Vec<_> = timeline.lanes.iter().map(|l| l.skill.as_str()).collect();
        assert_eq!(skills, vec!["Go", "Rust"]);
        assert_eq!(timeline.max_lane_len(), 3);
    }

    #[test]
    fn bars_are_sorted_by_start_then_person() {
        let timeline = build_timeline(&parse_team(TEAM).unwrap());
        let rust = &timeline.lanes[1];
        let people: Vec<_> = rust.bars.iter().map(|b| b.person.as_str()).collect();
        assert_eq!(people, vec!["Kim", "Amy", "Zed"]);
        assert_eq!(rust.bars[1].duration_hours, 4.5);
        assert_eq!(rust.bars[1].main_skill.as_deref(), Some("Rust"));
        assert_eq!(rust.bars[0].main_skill, None);
    }

    #[test]
    fn overnight_bar_wraps_duration() {
        let timeline = build_timeline(&parse_team(TEAM).unwrap());
        let go = &timeline.lanes[0].bars[0];
        assert_eq!(go.start_hours, 23.0);
        assert_eq!(go.duration_hours, 3.0);
        assert_eq!(go.end_hours(), 26.0);
    }

    #[test]
    fn empty_roster_has_no_lanes() {
        let timeline = build_timeline(&TeamRoster::default());
        assert!(timeline.lanes.is_empty());
        assert_eq!(timeline.max_lane_len(), 0);
    }
}
