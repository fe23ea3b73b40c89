//! Mixer configuration
//!
//! Every field has a default, so an empty TOML document is a valid
//! configuration:
//!
//! ```toml
//! [animation]
//! effects = "fade translateY(-20px) stagger(30ms)"
//! duration = 350
//! easing = "cubic-bezier(0.25, 0.46, 0.45, 0.94)"
//!
//! [selectors]
//! target = ".card"
//!
//! [data]
//! uid_key = "id"
//! ```

use flipset_animation::{Easing, Effects};
use serde::{Deserialize, Serialize};

use crate::command::SortCommand;
use crate::error::{MixerError, Result};
use crate::parse::parse_sort;

/// Complete mixer configuration
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct MixerConfig {
    #[serde(default)]
    pub animation: AnimationConfig,
    #[serde(default)]
    pub selectors: SelectorsConfig,
    #[serde(default)]
    pub load: LoadConfig,
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub layout: LayoutConfig,
    #[serde(default)]
    pub debug: DebugConfig,
}

// =============================================================================
// [animation]
// =============================================================================

/// How operations are animated
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct AnimationConfig {
    /// Animate at all; when false every operation completes synchronously
    #[serde(default = "default_true")]
    pub enable: bool,
    /// Effects applied to targets entering and leaving
    #[serde(default = "default_effects")]
    pub effects: String,
    /// Override of `effects` for entering targets
    #[serde(default)]
    pub effects_in: Option<String>,
    /// Override of `effects` for leaving targets
    #[serde(default)]
    pub effects_out: Option<String>,
    /// Transition duration in milliseconds
    #[serde(default = "default_duration")]
    pub duration: u32,
    #[serde(default = "default_easing")]
    pub easing: String,
    #[serde(default = "default_true")]
    pub apply_perspective: bool,
    #[serde(default = "default_perspective_distance")]
    pub perspective_distance: String,
    #[serde(default = "default_perspective_origin")]
    pub perspective_origin: String,
    /// Queue requests made while busy
    #[serde(default = "default_true")]
    pub queue: bool,
    #[serde(default = "default_queue_limit")]
    pub queue_limit: usize,
    #[serde(default = "default_true")]
    pub animate_resize_container: bool,
    #[serde(default)]
    pub animate_resize_targets: bool,
    /// Mirror translate and rotate effects for leaving targets
    #[serde(default)]
    pub reverse_out: bool,
    #[serde(default = "default_true")]
    pub nudge: bool,
    #[serde(default = "default_true")]
    pub clamp_height: bool,
    #[serde(default = "default_true")]
    pub clamp_width: bool,
}

fn default_true() -> bool {
    true
}

fn default_effects() -> String {
    "fade scale".to_string()
}

fn default_duration() -> u32 {
    600
}

fn default_easing() -> String {
    "ease".to_string()
}

fn default_perspective_distance() -> String {
    "3000px".to_string()
}

fn default_perspective_origin() -> String {
    "50% 50%".to_string()
}

fn default_queue_limit() -> usize {
    3
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            enable: true,
            effects: default_effects(),
            effects_in: None,
            effects_out: None,
            duration: default_duration(),
            easing: default_easing(),
            apply_perspective: true,
            perspective_distance: default_perspective_distance(),
            perspective_origin: default_perspective_origin(),
            queue: true,
            queue_limit: default_queue_limit(),
            animate_resize_container: true,
            animate_resize_targets: false,
            reverse_out: false,
            nudge: true,
            clamp_height: true,
            clamp_width: true,
        }
    }
}

// =============================================================================
// [selectors] [load] [data] [layout] [debug]
// =============================================================================

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct SelectorsConfig {
    /// Which container children are managed targets
    #[serde(default = "default_target_selector")]
    pub target: String,
}

fn default_target_selector() -> String {
    ".mix".to_string()
}

impl Default for SelectorsConfig {
    fn default() -> Self {
        Self {
            target: default_target_selector(),
        }
    }
}

/// Filter and sort applied when the mixer is constructed
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct LoadConfig {
    #[serde(default = "default_load_filter")]
    pub filter: String,
    #[serde(default = "default_load_sort")]
    pub sort: String,
}

fn default_load_filter() -> String {
    "all".to_string()
}

fn default_load_sort() -> String {
    "default:asc".to_string()
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            filter: default_load_filter(),
            sort: default_load_sort(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct DataConfig {
    /// Record field holding the unique id; empty disables dataset mode
    #[serde(default)]
    pub uid_key: String,
    /// Skip re-rendering records whose data did not change
    #[serde(default = "default_true")]
    pub dirty_check: bool,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            uid_key: String::new(),
            dirty_check: true,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct LayoutConfig {
    /// Layout class present on the container at load
    #[serde(default)]
    pub container_class_name: String,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct DebugConfig {
    #[serde(default = "default_true")]
    pub show_warnings: bool,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            show_warnings: true,
        }
    }
}

// =============================================================================
// Loading and validation
// =============================================================================

impl MixerConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: MixerConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every string-encoded setting parses
    pub fn validate(&self) -> Result<()> {
        if self.selectors.target.trim().is_empty() {
            return Err(MixerError::Config(
                "`selectors.target` must not be empty".to_string(),
            ));
        }
        Settings::from_config(self)?;
        parse_sort::<()>(&self.load.sort)?;
        Ok(())
    }
}

/// String settings parsed once when the mixer is built
#[derive(Clone, Debug)]
pub(crate) struct Settings {
    pub effects_in: Effects,
    pub effects_out: Effects,
    pub easing: Easing,
    pub stagger_ms: u32,
}

impl Settings {
    pub fn from_config(config: &MixerConfig) -> Result<Self> {
        let animation = &config.animation;
        let effects_in = Effects::parse(animation.effects_in.as_deref().unwrap_or(&animation.effects))?;
        let mut effects_out =
            Effects::parse(animation.effects_out.as_deref().unwrap_or(&animation.effects))?;
        if animation.reverse_out {
            effects_out = effects_out.reversed();
        }
        let easing = animation.easing.parse::<Easing>()?;
        let stagger_ms = effects_in
            .stagger_ms
            .or(effects_out.stagger_ms)
            .unwrap_or(0);

        Ok(Self {
            effects_in,
            effects_out,
            easing,
            stagger_ms,
        })
    }

    /// Load sort, typed for a particular element handle
    pub fn load_sort<E>(config: &MixerConfig) -> Result<SortCommand<E>> {
        parse_sort(&config.load.sort)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_is_default() {
        let config = MixerConfig::from_toml_str("").unwrap();
        assert_eq!(config, MixerConfig::default());
        assert_eq!(config.animation.duration, 600);
        assert_eq!(config.animation.queue_limit, 3);
        assert_eq!(config.selectors.target, ".mix");
        assert_eq!(config.load.sort, "default:asc");
        assert!(config.data.dirty_check);
    }

    #[test]
    fn test_partial_document() {
        let config = MixerConfig::from_toml_str(
            r#"
            [animation]
            effects = "fade translateY(-20px)"
            duration = 250
            reverse_out = true

            [data]
            uid_key = "id"
            "#,
        )
        .unwrap();

        assert_eq!(config.animation.duration, 250);
        assert!(config.animation.nudge);
        assert_eq!(config.data.uid_key, "id");

        let settings = Settings::from_config(&config).unwrap();
        assert_eq!(
            settings
                .effects_out
                .transforms
                .get(flipset_animation::TransformKind::TranslateY)
                .value,
            20.0
        );
    }

    #[test]
    fn test_validation_rejects_bad_strings() {
        let mut config = MixerConfig::default();
        config.animation.effects = "fade wobble".into();
        assert!(matches!(config.validate(), Err(MixerError::Parse(_))));

        let mut config = MixerConfig::default();
        config.animation.easing = "springy".into();
        assert!(matches!(config.validate(), Err(MixerError::Parse(_))));

        let mut config = MixerConfig::default();
        config.selectors.target = " ".into();
        assert!(matches!(config.validate(), Err(MixerError::Config(_))));

        assert!(matches!(
            MixerConfig::from_toml_str("[animation]\nduration = \"slow\""),
            Err(MixerError::Config(_))
        ));
    }

    #[test]
    fn test_stagger_taken_from_effects() {
        let mut config = MixerConfig::default();
        config.animation.effects = "fade stagger(45ms)".into();
        assert_eq!(Settings::from_config(&config).unwrap().stagger_ms, 45);
    }
}
