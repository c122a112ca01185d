use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize, Serializer};

use crate::error::ShiftmapError;

const MINUTES_PER_DAY: u32 = 24 * 60;

/// Largest weight a single expertise level may carry.
pub const MAX_WEIGHT: u32 = u16::MAX as u32;

/// The four expertise levels of the standard taxonomy and their weights.
pub const STANDARD_LEVELS: [(&str, u32); 4] = [
    ("Junior Developer", 1),
    ("Mid-Level Developer", 2),
    ("Senior Developer", 3),
    ("Principal/Lead Developer", 4),
];

/// One developer's working hours for one skill.
///
/// `start` and `end` are wall-clock times within a single day. An interval
/// whose `end` is earlier than its `start` crosses midnight.
///
/// # Examples
///
/// ```
/// use chrono::NaiveTime;
/// use shiftmap_core::WorkInterval;
///
/// let interval = WorkInterval {
///     person: "Alice".into(),
///     skill: "Go".into(),
///     start: NaiveTime::from_hms_opt(22, 0, 0).unwrap(),
///     end: NaiveTime::from_hms_opt(6, 0, 0).unwrap(),
///     expertise: "Senior Developer".into(),
/// };
/// assert!(interval.crosses_midnight());
/// assert!(!interval.is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkInterval {
    /// Developer name.
    pub person: String,
    /// Skill category the hours apply to.
    pub skill: String,
    /// Start of the working window.
    pub start: NaiveTime,
    /// End of the working window (exclusive).
    pub end: NaiveTime,
    /// Expertise label, looked up in [`ExpertiseWeights`].
    pub expertise: String,
}

impl WorkInterval {
    /// Returns `true` when the interval covers no time at all.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Returns `true` when the interval ends on the following day.
    pub fn crosses_midnight(&self) -> bool {
        self.end < self.start
    }
}

/// A point-in-time sample within the day, such as the top of an hour.
///
/// Serializes as `"HH:MM"`.
///
/// # Examples
///
/// ```
/// use shiftmap_core::TimeSlot;
///
/// let slots = TimeSlot::hourly();
/// assert_eq!(slots.len(), 24);
/// assert_eq!(slots[9].to_string(), "09:00");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeSlot(NaiveTime);

impl TimeSlot {
    /// Create a slot at `hour:minute`, or `None` if out of range.
    pub fn new(hour: u32, minute: u32) -> Option<Self> {
        NaiveTime::from_hms_opt(hour, minute, 0).map(Self)
    }

    /// The 24 hourly boundaries `00:00 .. 23:00`.
    pub fn hourly() -> Vec<Self> {
        (0..24)
            .filter_map(|hour| Self::new(hour, 0))
            .collect()
    }

    /// Slots every `step_minutes` starting at midnight.
    ///
    /// # Errors
    ///
    /// Returns [`ShiftmapError::Config`] if the step is zero or does not
    /// divide the day evenly.
    ///
    /// # Examples
    ///
    /// ```
    /// use shiftmap_core::TimeSlot;
    ///
    /// let slots = TimeSlot::every(30).unwrap();
    /// assert_eq!(slots.len(), 48);
    /// assert_eq!(slots[1].to_string(), "00:30");
    /// assert!(TimeSlot::every(7).is_err());
    /// ```
    pub fn every(step_minutes: u32) -> Result<Vec<Self>, ShiftmapError> {
        if step_minutes == 0 || MINUTES_PER_DAY % step_minutes != 0 {
            return Err(ShiftmapError::Config(format!(
                "slot step of {step_minutes} minutes does not divide the day"
            )));
        }
        Ok((0..MINUTES_PER_DAY)
            .step_by(step_minutes as usize)
            .filter_map(|m| Self::new(m / 60, m % 60))
            .collect())
    }

    /// The wall-clock time this slot samples.
    pub fn time(self) -> NaiveTime {
        self.0
    }
}

impl From<NaiveTime> for TimeSlot {
    fn from(time: NaiveTime) -> Self {
        Self(time)
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.0.hour(), self.0.minute())
    }
}

impl Serialize for TimeSlot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Expertise label to coverage weight.
///
/// Passed explicitly to the aggregation kernel so callers can vary the
/// taxonomy. Weights must be positive.
///
/// # Examples
///
/// ```
/// use shiftmap_core::ExpertiseWeights;
///
/// let weights = ExpertiseWeights::standard();
/// assert_eq!(weights.get("Senior Developer"), Some(3));
/// assert_eq!(weights.get("Staff Engineer"), None);
/// assert_eq!(weights.total(), Some(10));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExpertiseWeights(BTreeMap<String, u32>);

impl ExpertiseWeights {
    /// Junior=1, Mid-Level=2, Senior=3, Principal/Lead=4.
    pub fn standard() -> Self {
        STANDARD_LEVELS
            .iter()
            .map(|(label, weight)| ((*label).to_string(), *weight))
            .collect()
    }

    /// Weight for `label`, if the label is known.
    pub fn get(&self, label: &str) -> Option<u32> {
        self.0.get(label).copied()
    }

    /// Sum of every weight, or `None` if it does not fit in a `u32`.
    pub fn total(&self) -> Option<u32> {
        self.0
            .values()
            .try_fold(0u32, |acc, weight| acc.checked_add(*weight))
    }

    /// Largest single weight, or 0 for an empty mapping.
    pub fn max(&self) -> u32 {
        self.0.values().copied().max().unwrap_or(0)
    }

    /// Number of known levels.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if no levels are defined.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Check the mapping is usable for scoring.
    ///
    /// # Errors
    ///
    /// Returns [`ShiftmapError::Config`] if the mapping is empty, any
    /// weight is zero or above [`MAX_WEIGHT`], or the weights do not sum
    /// within a `u32`.
    pub fn validate(&self) -> Result<(), ShiftmapError> {
        if self.0.is_empty() {
            return Err(ShiftmapError::Config(
                "at least one expertise level is required".into(),
            ));
        }
        if let Some((label, _)) = self.0.iter().find(|(_, weight)| **weight == 0) {
            return Err(ShiftmapError::Config(format!(
                "expertise weight for '{label}' must be positive"
            )));
        }
        if let Some((label, weight)) = self.0.iter().find(|(_, weight)| **weight > MAX_WEIGHT) {
            return Err(ShiftmapError::Config(format!(
                "expertise weight for '{label}' is {weight}, above the maximum of {MAX_WEIGHT}"
            )));
        }
        if self.total().is_none() {
            return Err(ShiftmapError::Config(
                "expertise weights sum past the supported range".into(),
            ));
        }
        Ok(())
    }
}

impl Default for ExpertiseWeights {
    fn default() -> Self {
        Self::standard()
    }
}

impl FromIterator<(String, u32)> for ExpertiseWeights {
    fn from_iter<I: IntoIterator<Item = (String, u32)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// What the aggregator does with intervals that cross midnight.
///
/// # Examples
///
/// ```
/// use shiftmap_core::OvernightPolicy;
///
/// let policy: OvernightPolicy = "reject".parse().unwrap();
/// assert_eq!(policy, OvernightPolicy::Reject);
/// assert_eq!(OvernightPolicy::default(), OvernightPolicy::Wrap);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OvernightPolicy {
    /// Cover `[start, 24:00)` and `[00:00, end)`.
    #[default]
    Wrap,
    /// Fail the run with [`ShiftmapError::OvernightInterval`].
    Reject,
}

impl fmt::Display for OvernightPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OvernightPolicy::Wrap => write!(f, "wrap"),
            OvernightPolicy::Reject => write!(f, "reject"),
        }
    }
}

impl FromStr for OvernightPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "wrap" => Ok(OvernightPolicy::Wrap),
            "reject" => Ok(OvernightPolicy::Reject),
            other => Err(format!("unknown overnight policy: {other}")),
        }
    }
}

/// Output format for CLI and tool results.
///
/// # Examples
///
/// ```
/// use shiftmap_core::OutputFormat;
///
/// let fmt: OutputFormat = "json".parse().unwrap();
/// assert_eq!(fmt, OutputFormat::Json);
///
/// let fmt: OutputFormat = "md".parse().unwrap();
/// assert_eq!(fmt, OutputFormat::Markdown);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable tables and summaries.
    #[default]
    Text,
    /// Machine-readable JSON with camelCase keys.
    Json,
    /// Markdown-formatted output.
    Markdown,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Markdown => write!(f, "markdown"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            other => Err(format!("unknown output format: {other}")),
        }
    }
}
