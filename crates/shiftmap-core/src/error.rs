use std::path::PathBuf;

/// Errors that can occur across the shiftmap crates.
///
/// Each variant wraps a specific error domain. Library crates use this type
/// directly; the binary converts to `miette::Report` at the boundary.
///
/// # Examples
///
/// ```
/// use shiftmap_core::ShiftmapError;
///
/// let err = ShiftmapError::Config("slot step must be positive".into());
/// assert!(err.to_string().contains("slot step"));
/// ```
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum ShiftmapError {
    /// Filesystem I/O failure.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid or missing configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// The team document is well-formed YAML but not a team description.
    #[error("invalid team document: {0}")]
    #[diagnostic(help("expected a mapping of skill -> person -> start, end and expertise"))]
    InvalidTeam(String),

    /// An interval's expertise label has no entry in the weight mapping.
    #[error("unknown expertise level '{expertise}' for {person} in {skill}")]
    #[diagnostic(help("add '{expertise}' under [expertise] in .shiftmap.toml"))]
    UnknownExpertiseLevel {
        /// Person the interval belongs to.
        person: String,
        /// Skill the interval belongs to.
        skill: String,
        /// The unrecognised label.
        expertise: String,
    },

    /// An interval ends before it starts and overnight intervals are rejected.
    #[error("interval for {person} in {skill} crosses midnight ({start} -> {end})")]
    #[diagnostic(help("set overnight = \"wrap\" under [coverage] to accept it"))]
    OvernightInterval {
        /// Person the interval belongs to.
        person: String,
        /// Skill the interval belongs to.
        skill: String,
        /// Start time, `HH:MM`.
        start: String,
        /// End time, `HH:MM`.
        end: String,
    },

    /// A coverage or capacity score does not fit in a `u32`.
    #[error("{skill} score overflows at {slot}")]
    #[diagnostic(help("lower the weights under [expertise] in .shiftmap.toml"))]
    CoverageOverflow {
        /// Skill whose score overflowed.
        skill: String,
        /// Slot where it happened, `HH:MM`, or `capacity`.
        slot: String,
    },

    /// YAML deserialization failure.
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// TOML deserialization failure.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// A required file was not found.
    #[error("file not found: {}", .0.display())]
    FileNotFound(PathBuf),
}
