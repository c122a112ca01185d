//! Team document loading.
//!
//! Flattens a YAML team description into [`WorkInterval`] records. The
//! document maps `skill -> person -> {start, end, expertise}`; the reserved
//! `People` section maps `person -> {main_skill}`. Records with missing or
//! unreadable fields are skipped and reported as [`SkippedRecord`]s so the
//! caller decides whether to abort, warn, or proceed.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::Path;

use chrono::NaiveTime;
use serde::Serialize;
use serde_yaml::{Mapping, Value};
use shiftmap_core::{ShiftmapError, WorkInterval};

/// Top-level key holding per-person metadata rather than a skill.
pub const PEOPLE_SECTION: &str = "People";

const TIME_FORMATS: [&str; 5] = ["%I:%M %p", "%I:%M%p", "%H:%M", "%H:%M:%S", "%I:%M:%S %p"];

/// Everything recovered from a team document.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamRoster {
    /// Usable work intervals, in document order.
    pub intervals: Vec<WorkInterval>,
    /// Records that could not be turned into intervals.
    pub skipped: Vec<SkippedRecord>,
    /// Contents of the `People` section.
    pub people: BTreeMap<String, Person>,
}

impl TeamRoster {
    /// Main skill recorded for `person` in the `People` section.
    pub fn main_skill(&self, person: &str) -> Option<&str> {
        self.people.get(person)?.main_skill.as_deref()
    }

    /// Distinct skills with at least one usable interval, ascending.
    pub fn skills(&self) -> BTreeSet<&str> {
        self.intervals.iter().map(|i| i.skill.as_str()).collect()
    }

    /// Returns `true` when no record was skipped.
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }
}

/// Per-person metadata from the `People` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    /// The skill the person primarily works in.
    pub main_skill: Option<String>,
}

/// A record the loader refused, with the reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedRecord {
    /// Developer name.
    pub person: String,
    /// Skill section the record was found under.
    pub skill: String,
    /// Why the record was skipped.
    pub reason: SkipReason,
}

/// Why a record was skipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum SkipReason {
    /// One or more of `start`, `end`, `expertise` is absent.
    MissingField {
        /// Names of the absent fields.
        fields: Vec<String>,
    },
    /// A time field is present but not a recognisable clock time.
    InvalidTime {
        /// `start` or `end`.
        field: String,
        /// The raw value as written.
        value: String,
    },
}

impl fmt::Display for SkippedRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} in {}: ", self.person, self.skill)?;
        match &self.reason {
            SkipReason::MissingField { fields } => write!(f, "missing {}", fields.join(", ")),
            SkipReason::InvalidTime { field, value } => {
                write!(f, "unreadable {field} time '{value}'")
            }
        }
    }
}

/// Load and flatten the team document at `path`.
///
/// # Errors
///
/// Returns [`ShiftmapError::FileNotFound`] if `path` does not exist,
/// [`ShiftmapError::Io`] if it cannot be read, and the errors of
/// [`parse_team`] otherwise.
pub fn load_team(path: &Path) -> Result<TeamRoster, ShiftmapError> {
    if !path.exists() {
        return Err(ShiftmapError::FileNotFound(path.to_path_buf()));
    }
    let content = std::fs::read_to_string(path)?;
    parse_team(&content)
}

/// Flatten a YAML team document.
///
/// # Errors
///
/// Returns [`ShiftmapError::Yaml`] for malformed YAML and
/// [`ShiftmapError::InvalidTeam`] when the document or a skill section is
/// not a mapping. Individual bad records are skipped, not errors.
///
/// # Examples
///
/// ```
/// use shiftmap_coverage::roster::parse_team;
///
/// let yaml = r#"
/// Go:
///   Alice: {start: "9:00 AM", end: "5:00 PM", expertise: Senior Developer}
///   Bob: {start: "10:00 AM", expertise: Junior Developer}
/// People:
///   Alice: {main_skill: Go}
/// "#;
/// let roster = parse_team(yaml).unwrap();
/// assert_eq!(roster.intervals.len(), 1);
/// assert_eq!(roster.skipped.len(), 1);
/// assert_eq!(roster.main_skill("Alice"), Some("Go"));
/// ```
pub fn parse_team(content: &str) -> Result<TeamRoster, ShiftmapError> {
    let document: Value = serde_yaml::from_str(content)?;
    let sections = match document {
        Value::Mapping(map) => map,
        Value::Null => Mapping::new(),
        _ => {
            return Err(ShiftmapError::InvalidTeam(
                "top level must be a mapping of skills".into(),
            ))
        }
    };

    let mut roster = TeamRoster::default();

    for (key, section) in &sections {
        let name = scalar_text(key).ok_or_else(|| {
            ShiftmapError::InvalidTeam("skill names must be plain scalars".into())
        })?;

        if name == PEOPLE_SECTION {
            roster.people = parse_people(section)?;
            continue;
        }

        let members = match section {
            Value::Mapping(map) => map,
            Value::Null => continue,
            _ => {
                return Err(ShiftmapError::InvalidTeam(format!(
                    "skill '{name}' must map people to their hours"
                )))
            }
        };

        for (person_key, details) in members {
            let Some(person) = scalar_text(person_key) else {
                return Err(ShiftmapError::InvalidTeam(format!(
                    "person names under '{name}' must be plain scalars"
                )));
            };
            match flatten_record(&person, &name, details) {
                Ok(interval) => roster.intervals.push(interval),
                Err(reason) => {
                    let record = SkippedRecord {
                        person,
                        skill: name.clone(),
                        reason,
                    };
                    tracing::warn!("skipping record: {record}");
                    roster.skipped.push(record);
                }
            }
        }
    }

    tracing::debug!(
        intervals = roster.intervals.len(),
        skipped = roster.skipped.len(),
        people = roster.people.len(),
        "team document flattened"
    );

    Ok(roster)
}

fn parse_people(section: &Value) -> Result<BTreeMap<String, Person>, ShiftmapError> {
    let map = match section {
        Value::Mapping(map) => map,
        Value::Null => return Ok(BTreeMap::new()),
        _ => {
            return Err(ShiftmapError::InvalidTeam(format!(
                "'{PEOPLE_SECTION}' must map people to their details"
            )))
        }
    };
    Ok(map
        .iter()
        .filter_map(|(key, details)| {
            let name = scalar_text(key)?;
            let main_skill = details.get("main_skill").and_then(scalar_text);
            Some((name, Person { main_skill }))
        })
        .collect())
}

fn flatten_record(person: &str, skill: &str, details: &Value) -> Result<WorkInterval, SkipReason> {
    let field = |name: &str| details.get(name).filter(|v| !v.is_null());
    let (start, end, expertise) = (field("start"), field("end"), field("expertise"));

    let missing: Vec<String> = [("start", start), ("end", end), ("expertise", expertise)]
        .into_iter()
        .filter(|(_, value)| value.is_none())
        .map(|(name, _)| name.to_string())
        .collect();

    let (Some(start), Some(end), Some(expertise)) = (start, end, expertise) else {
        return Err(SkipReason::MissingField { fields: missing });
    };

    let expertise = scalar_text(expertise).ok_or_else(|| SkipReason::MissingField {
        fields: vec!["expertise".into()],
    })?;

    Ok(WorkInterval {
        person: person.to_string(),
        skill: skill.to_string(),
        start: time_field("start", start)?,
        end: time_field("end", end)?,
        expertise,
    })
}

fn time_field(field: &str, value: &Value) -> Result<NaiveTime, SkipReason> {
    let raw = scalar_text(value).unwrap_or_else(|| format!("{value:?}"));
    parse_clock_time(&raw).ok_or_else(|| SkipReason::InvalidTime {
        field: field.to_string(),
        value: raw,
    })
}

/// Parse a wall-clock time such as `9:00 AM`, `5:30pm`, `17:00`, or `17:00:00`.
///
/// # Examples
///
/// ```
/// use chrono::NaiveTime;
/// use shiftmap_coverage::roster::parse_clock_time;
///
/// let five_pm = NaiveTime::from_hms_opt(17, 0, 0).unwrap();
/// assert_eq!(parse_clock_time("5:00 PM"), Some(five_pm));
/// assert_eq!(parse_clock_time("17:00"), Some(five_pm));
/// assert_eq!(parse_clock_time("noonish"), None);
/// ```
pub fn parse_clock_time(raw: &str) -> Option<NaiveTime> {
    let raw = raw.trim();
    TIME_FORMATS
        .iter()
        .find_map(|format| NaiveTime::parse_from_str(raw, format).ok())
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
