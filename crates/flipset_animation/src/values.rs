//! Animatable value types
//!
//! Linear interpolation used when scrubbing through a measured tween.

use crate::style_data::{StyleData, TransformData, TransformSet};

/// Trait for values that can be linearly interpolated
pub trait Interpolate: Clone {
    /// Linearly interpolate between self and other by factor t (0.0 to 1.0)
    fn lerp(&self, other: &Self, t: f32) -> Self;

    /// Check if two values are approximately equal
    fn approx_eq(&self, other: &Self, epsilon: f32) -> bool;
}

// ============================================================================
// f32 Implementation
// ============================================================================

impl Interpolate for f32 {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        self + (other - self) * t
    }

    fn approx_eq(&self, other: &Self, epsilon: f32) -> bool {
        (self - other).abs() < epsilon
    }
}

// ============================================================================
// Transform Implementation
// ============================================================================

impl Interpolate for TransformData {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        TransformData {
            value: self.value.lerp(&other.value, t),
            unit: self.unit,
        }
    }

    fn approx_eq(&self, other: &Self, epsilon: f32) -> bool {
        self.value.approx_eq(&other.value, epsilon)
    }
}

impl Interpolate for TransformSet {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        let mut out = self.clone();
        for (kind, data) in self.iter() {
            out.set(kind, data.lerp(&other.get(kind), t));
        }
        out
    }

    fn approx_eq(&self, other: &Self, epsilon: f32) -> bool {
        self.iter()
            .all(|(kind, data)| data.approx_eq(&other.get(kind), epsilon))
    }
}

// ============================================================================
// StyleData Implementation
// ============================================================================

impl Interpolate for StyleData {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        StyleData {
            x: self.x.lerp(&other.x, t),
            y: self.y.lerp(&other.y, t),
            opacity: self.opacity.lerp(&other.opacity, t),
            width: self.width.lerp(&other.width, t),
            height: self.height.lerp(&other.height, t),
            margin_right: self.margin_right.lerp(&other.margin_right, t),
            margin_bottom: self.margin_bottom.lerp(&other.margin_bottom, t),
            transforms: self.transforms.lerp(&other.transforms, t),
        }
    }

    fn approx_eq(&self, other: &Self, epsilon: f32) -> bool {
        self.x.approx_eq(&other.x, epsilon)
            && self.y.approx_eq(&other.y, epsilon)
            && self.opacity.approx_eq(&other.opacity, epsilon)
            && self.width.approx_eq(&other.width, epsilon)
            && self.height.approx_eq(&other.height, epsilon)
            && self.margin_right.approx_eq(&other.margin_right, epsilon)
            && self.margin_bottom.approx_eq(&other.margin_bottom, epsilon)
            && self.transforms.approx_eq(&other.transforms, epsilon)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style_data::{TransformKind, Unit};

    #[test]
    fn test_f32_lerp() {
        assert_eq!(0.0f32.lerp(&100.0, 0.25), 25.0);
        assert!(1.0f32.approx_eq(&1.0005, 0.001));
    }

    #[test]
    fn test_style_data_lerp_midpoint() {
        let mut from = StyleData::default();
        from.x = -100.0;
        from.opacity = 0.0;
        from.transforms
            .set(TransformKind::Scale, TransformData::new(0.5, Unit::None));

        let to = StyleData::default();
        let mid = from.lerp(&to, 0.5);

        assert_eq!(mid.x, -50.0);
        assert_eq!(mid.opacity, 0.5);
        assert_eq!(mid.transforms.get(TransformKind::Scale).value, 0.75);
    }
}
