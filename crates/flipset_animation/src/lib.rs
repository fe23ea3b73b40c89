//! Flipset Animation
//!
//! Everything between "a target moved from here to there" and the style
//! declarations that make the host animate it.
//!
//! # Features
//!
//! - **Effects**: A small language (`"fade scale(0.5) translateY(-20px) stagger(40ms)"`)
//!   describing how targets enter and leave
//! - **Tween Records**: Per-target start/intermediate/final snapshots and the
//!   derived in/out styles (FLIP deltas against the natural flow position)
//! - **Transition Timing**: Duration, easing and staggered delays written as
//!   transition rules
//! - **Interpolation**: `Interpolate` for scrubbing through a measured tween

pub mod easing;
pub mod effects;
pub mod style_data;
pub mod transition;
pub mod tween;
pub mod values;

pub use easing::{Easing, EasingParseError};
pub use effects::{Effects, EffectsParseError};
pub use style_data::{StyleData, TransformData, TransformKind, TransformSet, Unit};
pub use transition::{is_recognized_property, StaggerSequence, TransitionRule, TransitionTiming};
pub use tween::{PosRecord, TweenSettings};
pub use values::Interpolate;
