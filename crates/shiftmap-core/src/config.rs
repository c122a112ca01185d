use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ShiftmapError;
use crate::types::{ExpertiseWeights, OvernightPolicy, TimeSlot};

/// Top-level configuration loaded from `.shiftmap.toml`.
///
/// Supports layered resolution: CLI flags > local config > defaults.
///
/// # Examples
///
/// ```
/// use shiftmap_core::ShiftmapConfig;
///
/// let config = ShiftmapConfig::default();
/// assert_eq!(config.slots.step_minutes, 60);
/// assert_eq!(config.expertise.get("Senior Developer"), Some(3));
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShiftmapConfig {
    /// Expertise label to weight. Replaces the standard taxonomy when present.
    #[serde(default)]
    pub expertise: ExpertiseWeights,
    /// Sampling of the day.
    #[serde(default)]
    pub slots: SlotConfig,
    /// Aggregation behavior.
    #[serde(default)]
    pub coverage: CoverageConfig,
}

impl ShiftmapConfig {
    /// Load configuration from a TOML file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ShiftmapError::Io`] if the file cannot be read,
    /// [`ShiftmapError::Toml`] if the content is not valid TOML, or
    /// [`ShiftmapError::Config`] if the values are unusable.
    pub fn from_file(path: &Path) -> Result<Self, ShiftmapError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse and validate configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns [`ShiftmapError::Toml`] if parsing fails, or
    /// [`ShiftmapError::Config`] if validation fails.
    ///
    /// # Examples
    ///
    /// ```
    /// use shiftmap_core::ShiftmapConfig;
    ///
    /// let toml = r#"
    /// [expertise]
    /// Apprentice = 1
    /// Expert = 5
    /// "#;
    /// let config = ShiftmapConfig::from_toml(toml).unwrap();
    /// assert_eq!(config.expertise.get("Expert"), Some(5));
    /// assert_eq!(config.expertise.get("Senior Developer"), None);
    /// ```
    pub fn from_toml(content: &str) -> Result<Self, ShiftmapError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that weights and slot step are usable.
    ///
    /// # Errors
    ///
    /// Returns [`ShiftmapError::Config`] describing the first problem found.
    pub fn validate(&self) -> Result<(), ShiftmapError> {
        self.expertise.validate()?;
        self.slots.time_slots()?;
        Ok(())
    }
}

/// How the day is sampled.
///
/// # Examples
///
/// ```
/// use shiftmap_core::SlotConfig;
///
/// let slots = SlotConfig::default().time_slots().unwrap();
/// assert_eq!(slots.len(), 24);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotConfig {
    /// Minutes between samples (default: 60). Must divide 1440.
    #[serde(default = "default_step_minutes")]
    pub step_minutes: u32,
}

fn default_step_minutes() -> u32 {
    60
}

impl Default for SlotConfig {
    fn default() -> Self {
        Self {
            step_minutes: default_step_minutes(),
        }
    }
}

impl SlotConfig {
    /// Expand into the ordered slot sequence.
    ///
    /// # Errors
    ///
    /// Returns [`ShiftmapError::Config`] for an unusable step.
    pub fn time_slots(&self) -> Result<Vec<TimeSlot>, ShiftmapError> {
        TimeSlot::every(self.step_minutes)
    }
}

/// Aggregation behavior.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CoverageConfig {
    /// Intervals ending before they start (default: wrap).
    #[serde(default)]
    pub overnight: OvernightPolicy,
}
