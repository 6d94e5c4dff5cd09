use thiserror::Error;

/// Crate-wide result type alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the simulation core and its configuration loader.
///
/// A tick either completes fully or returns one of these without having
/// touched particle state; there is nothing to retry.
#[derive(Debug, Error)]
pub enum Error {
    /// A particle's pseudo-pressure came out negative. Overlaps are clamped
    /// to [0, 1] and masses are validated positive, so this indicates a
    /// defect, not a runtime condition to recover from.
    #[error("negative pseudo-pressure {pressure} for particle {particle}")]
    NegativePressure { particle: usize, pressure: f32 },

    /// The neighbor query returned a partner index outside the population.
    #[error("partner index {partner} out of range for particle {particle} ({count} particles)")]
    PartnerOutOfRange {
        particle: usize,
        partner: usize,
        count: usize,
    },

    /// Two components disagreed about array shapes.
    #[error("shape mismatch in {what}: expected {expected}, got {got}")]
    ShapeMismatch {
        what: &'static str,
        expected: usize,
        got: usize,
    },

    /// Invalid user or API parameter.
    #[error("invalid parameter: {0}")]
    InvalidParam(String),

    /// Structurally valid but semantically malformed world configuration.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// YAML parse failure while loading a world configuration.
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    /// I/O failure while reading a configuration file.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
