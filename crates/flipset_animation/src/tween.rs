//! Tween records
//!
//! A [`PosRecord`] holds the three positional snapshots of one target (start,
//! intermediate, final) and the styles derived from them. Styles are offsets
//! relative to the intermediate layout, which is where every target sits in
//! flow while it animates: `pos_in` is written before the move and `pos_out`
//! is transitioned to.

use flipset_core::PosData;

use crate::effects::Effects;
use crate::style_data::{StyleData, TransformSet};
use crate::values::Interpolate;

/// Inputs shared by every tween of one operation
#[derive(Clone, Copy, Debug)]
pub struct TweenSettings<'a> {
    pub effects_in: &'a Effects,
    pub effects_out: &'a Effects,
    /// Slide hidden targets toward or away from where they will be
    pub nudge: bool,
    /// Tween width, height and trailing margins too
    pub resize: bool,
}

/// Snapshots and derived styles of one target within one operation
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PosRecord {
    pub start: PosData,
    pub inter: PosData,
    pub final_pos: PosData,
    pub pos_in: StyleData,
    pub pos_out: StyleData,
    /// `pos_out - pos_in`
    pub tween: StyleData,
}

fn non_zero_or(value: f32, fallback: f32) -> f32 {
    if value != 0.0 {
        value
    } else {
        fallback
    }
}

impl PosRecord {
    pub fn new(start: PosData) -> Self {
        Self {
            start,
            ..Default::default()
        }
    }

    /// Derive styles for a target that ends up shown
    ///
    /// `was_shown` is false for targets being revealed by this operation.
    pub fn tween_show(&mut self, was_shown: bool, settings: &TweenSettings<'_>) {
        let (start, inter, final_pos) = (self.start, self.inter, self.final_pos);
        let mut pos_in = StyleData::default();
        let mut pos_out = StyleData::default();

        if was_shown {
            pos_in.x = start.x - inter.x;
            pos_in.y = start.y - inter.y;
        }
        pos_out.x = final_pos.x - inter.x;
        pos_out.y = final_pos.y - inter.y;

        pos_in.opacity = if was_shown { 1.0 } else { settings.effects_in.opacity };
        pos_out.opacity = 1.0;

        if !was_shown && !settings.nudge {
            pos_in.x = pos_out.x;
            pos_in.y = pos_out.y;
        }

        if settings.resize {
            pos_in.width = start.width;
            pos_in.height = start.height;
            let width_change = non_zero_or(start.width, final_pos.width) - inter.width;
            let height_change = non_zero_or(start.height, final_pos.height) - inter.height;
            pos_in.margin_right = start.margin_right - width_change;
            pos_in.margin_bottom = start.margin_bottom - height_change;

            pos_out.width = final_pos.width;
            pos_out.height = final_pos.height;
            let width_change = non_zero_or(final_pos.width, start.width) - inter.width;
            let height_change = non_zero_or(final_pos.height, start.height) - inter.height;
            pos_out.margin_right = final_pos.margin_right - width_change;
            pos_out.margin_bottom = final_pos.margin_bottom - height_change;
        }

        if !was_shown {
            pos_in.transforms = settings.effects_in.transforms.clone();
        }
        pos_out.transforms = TransformSet::default();

        self.set_styles(pos_in, pos_out);
    }

    /// Derive styles for a target being hidden
    pub fn tween_hide(&mut self, was_shown: bool, settings: &TweenSettings<'_>) {
        let (start, inter) = (self.start, self.inter);
        let mut pos_in = StyleData::default();
        let mut pos_out = StyleData::default();

        if was_shown {
            pos_in.x = start.x - inter.x;
            pos_in.y = start.y - inter.y;
        }
        if !settings.nudge {
            pos_out.x = pos_in.x;
            pos_out.y = pos_in.y;
        }

        if settings.resize {
            pos_in.width = start.width;
            pos_in.height = start.height;
            pos_in.margin_right = start.margin_right - (start.width - inter.width);
            pos_in.margin_bottom = start.margin_bottom - (start.height - inter.height);
        }

        pos_in.opacity = 1.0;
        pos_out.opacity = settings.effects_out.opacity;
        pos_out.transforms = settings.effects_out.transforms.clone();

        self.set_styles(pos_in, pos_out);
    }

    fn set_styles(&mut self, pos_in: StyleData, pos_out: StyleData) {
        self.tween = pos_in.delta_to(&pos_out);
        self.pos_in = pos_in;
        self.pos_out = pos_out;
    }

    /// Style at `multiplier` (clamped to `0.0..=1.0`) of the way from in to out
    pub fn at(&self, multiplier: f32) -> StyleData {
        self.pos_in.lerp(&self.pos_out, multiplier.clamp(0.0, 1.0))
    }

    /// Whether the target needs a transition at all
    ///
    /// A target whose in and out styles match never receives a transition-end
    /// notification, so it counts as immovable.
    pub fn will_transition(&self, resize: bool) -> bool {
        const EPSILON: f32 = 0.001;
        let (from, to) = (&self.pos_in, &self.pos_out);
        if !from.x.approx_eq(&to.x, EPSILON)
            || !from.y.approx_eq(&to.y, EPSILON)
            || !from.opacity.approx_eq(&to.opacity, EPSILON)
            || !from.transforms.approx_eq(&to.transforms, EPSILON)
        {
            return true;
        }
        resize
            && !(from.width.approx_eq(&to.width, EPSILON)
                && from.height.approx_eq(&to.height, EPSILON)
                && from.margin_right.approx_eq(&to.margin_right, EPSILON)
                && from.margin_bottom.approx_eq(&to.margin_bottom, EPSILON))
    }
}
