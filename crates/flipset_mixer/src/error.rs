//! Error types for flipset_mixer

use flipset_animation::{EasingParseError, EffectsParseError};
use thiserror::Error;

/// Errors raised synchronously when a mixer is built or a command is submitted
///
/// None of these leave the mixer partially mutated: commands are validated
/// before any target or host state changes.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MixerError {
    /// Container could not be registered or used
    #[error("invalid container: {0}")]
    InvalidContainer(String),

    /// Command shape is not valid for this mixer
    #[error("invalid command: {0}")]
    InvalidCommand(String),

    /// A filter named both a selector and a collection
    #[error("a filter may name a selector or a collection, not both")]
    ConflictingFilter,

    /// Dataset record without its unique id field
    #[error("dataset record {index} has no \"{key}\" field")]
    MissingUid { index: usize, key: String },

    /// Dataset operation without `data.uid_key` configured
    #[error("dataset operations require `data.uid_key` to be configured")]
    MissingUidKey,

    /// Same unique id appears twice in one dataset
    #[error("duplicate uid \"{0}\" in dataset")]
    DuplicateUid(String),

    /// Pre-rendered targets do not line up with the initial dataset
    #[error("dataset has {records} records but the container holds {targets} targets")]
    DatasetMismatch { records: usize, targets: usize },

    /// Inserted element is already managed
    #[error("element {0} is already managed by this mixer")]
    PreexistingElement(String),

    /// Host produced no element for a dataset record
    #[error("host did not render dataset record \"{0}\"")]
    MissingRenderer(String),

    /// Effects, easing or sort string could not be parsed
    #[error("parse error: {0}")]
    Parse(String),

    /// Invalid configuration
    #[error("configuration error: {0}")]
    Config(String),

    /// Mixer was dropped before the request completed
    #[error("mixer dropped before the request completed")]
    Dropped,
}

impl From<EffectsParseError> for MixerError {
    fn from(err: EffectsParseError) -> Self {
        MixerError::Parse(err.to_string())
    }
}

impl From<EasingParseError> for MixerError {
    fn from(err: EasingParseError) -> Self {
        MixerError::Parse(err.to_string())
    }
}

impl From<toml::de::Error> for MixerError {
    fn from(err: toml::de::Error) -> Self {
        MixerError::Config(err.to_string())
    }
}

/// Result type for flipset_mixer operations
pub type Result<T> = std::result::Result<T, MixerError>;
