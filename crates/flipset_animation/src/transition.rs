//! Transition timing
//!
//! Targets are animated by the host's own transitions. The engine writes a
//! rule per animated property and waits for the matching transition-end
//! notifications.

use std::fmt;
use std::rc::Rc;

use crate::easing::Easing;

/// Maps a target's stagger index to the multiplier used for its delay
pub type StaggerSequence = Rc<dyn Fn(usize) -> usize>;

/// One entry of a transition list
#[derive(Clone, Debug, PartialEq)]
pub struct TransitionRule {
    pub property: &'static str,
    pub duration_ms: u32,
    pub delay_ms: u32,
    pub easing: Easing,
}

impl fmt::Display for TransitionRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}ms {}ms {}",
            self.property, self.duration_ms, self.delay_ms, self.easing
        )
    }
}

/// Join rules into a single transition list
pub fn join_rules(rules: &[TransitionRule]) -> String {
    rules
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Whether a transition-end for `property` counts toward completion
pub fn is_recognized_property(property: &str, resize: bool) -> bool {
    property.contains("transform")
        || property == "opacity"
        || (resize
            && (property == "width" || property == "height" || property.starts_with("margin")))
}

/// Duration, easing and stagger shared by every target of one operation
#[derive(Clone, Default)]
pub struct TransitionTiming {
    pub duration_ms: u32,
    pub easing: Easing,
    /// Delay step between consecutive targets, zero when not staggering
    pub stagger_ms: u32,
    pub sequence: Option<StaggerSequence>,
}

impl fmt::Debug for TransitionTiming {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransitionTiming")
            .field("duration_ms", &self.duration_ms)
            .field("easing", &self.easing)
            .field("stagger_ms", &self.stagger_ms)
            .field("sequence", &self.sequence.is_some())
            .finish()
    }
}

impl TransitionTiming {
    /// Delay of the target at `index` among transitioning targets
    pub fn delay(&self, index: usize) -> u32 {
        if self.stagger_ms == 0 {
            return 0;
        }
        let step = match &self.sequence {
            Some(sequence) => sequence(index),
            None => index,
        };
        (step as u32).saturating_mul(self.stagger_ms)
    }

    /// Rule for `property` on the target at stagger `index`
    ///
    /// Opacity always runs linearly.
    pub fn rule(&self, property: &'static str, index: usize) -> TransitionRule {
        TransitionRule {
            property,
            duration_ms: self.duration_ms,
            delay_ms: self.delay(index),
            easing: if property == "opacity" {
                Easing::Linear
            } else {
                self.easing
            },
        }
    }

    /// Full transition list for one target
    pub fn transition_css(&self, index: usize, fading: bool, resize: bool) -> String {
        let mut rules = vec![self.rule("transform", index)];
        if fading {
            rules.push(self.rule("opacity", index));
        }
        if resize {
            for property in ["width", "height", "margin-right", "margin-bottom"] {
                rules.push(self.rule(property, index));
            }
        }
        join_rules(&rules)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn timing(stagger_ms: u32) -> TransitionTiming {
        TransitionTiming {
            duration_ms: 600,
            easing: Easing::Ease,
            stagger_ms,
            sequence: None,
        }
    }

    #[test]
    fn test_rule_format() {
        let rule = timing(0).rule("transform", 3);
        assert_eq!(rule.to_string(), "transform 600ms 0ms ease");
        assert_eq!(
            timing(0).rule("opacity", 0).to_string(),
            "opacity 600ms 0ms linear"
        );
    }

    #[test]
    fn test_stagger_delay() {
        assert_eq!(timing(40).delay(0), 0);
        assert_eq!(timing(40).delay(3), 120);

        let mut reversed = timing(10);
        reversed.sequence = Some(Rc::new(|i: usize| 5 - i));
        assert_eq!(reversed.delay(1), 40);
    }

    #[test]
    fn test_transition_css() {
        assert_eq!(
            timing(0).transition_css(0, true, false),
            "transform 600ms 0ms ease, opacity 600ms 0ms linear"
        );
        assert_eq!(timing(0).transition_css(0, false, true).matches(", ").count(), 4);
    }

    #[test]
    fn test_recognized_properties() {
        assert!(is_recognized_property("transform", false));
        assert!(is_recognized_property("-webkit-transform", false));
        assert!(is_recognized_property("opacity", false));
        assert!(!is_recognized_property("width", false));
        assert!(is_recognized_property("margin-right", true));
        assert!(!is_recognized_property("color", true));
    }
}
