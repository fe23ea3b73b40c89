//! Geometry snapshots read from the host

use serde::{Deserialize, Serialize};

/// Bounding box of an element, positioned relative to its container
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    /// X offset from the container's left edge
    pub x: f32,
    /// Y offset from the container's top edge
    pub y: f32,
    /// Rendered width
    pub width: f32,
    /// Rendered height
    pub height: f32,
}

impl Bounds {
    /// Create bounds from position and size
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Zero-sized bounds at the origin (what a hidden element reports)
    pub fn zero() -> Self {
        Self::default()
    }

    /// Whether the box occupies any area
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

/// Computed trailing margins of an element
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Margins {
    pub right: f32,
    pub bottom: f32,
}

impl Margins {
    pub fn new(right: f32, bottom: f32) -> Self {
        Self { right, bottom }
    }
}

/// Position snapshot of one target at one checkpoint
///
/// Size and margins are only captured when target resizing is animated;
/// otherwise they stay at zero.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PosData {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub margin_right: f32,
    pub margin_bottom: f32,
}

impl PosData {
    /// Position only
    pub fn from_bounds(bounds: Bounds) -> Self {
        Self {
            x: bounds.x,
            y: bounds.y,
            ..Default::default()
        }
    }

    /// Position, size and margins
    pub fn with_size(bounds: Bounds, margins: Margins) -> Self {
        Self {
            x: bounds.x,
            y: bounds.y,
            width: bounds.width,
            height: bounds.height,
            margin_right: margins.right,
            margin_bottom: margins.bottom,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pos_data_from_bounds_drops_size() {
        let pos = PosData::from_bounds(Bounds::new(10.0, 20.0, 100.0, 50.0));
        assert_eq!(pos.x, 10.0);
        assert_eq!(pos.y, 20.0);
        assert_eq!(pos.width, 0.0);
        assert_eq!(pos.height, 0.0);
    }

    #[test]
    fn test_pos_data_with_size() {
        let pos = PosData::with_size(Bounds::new(0.0, 0.0, 80.0, 40.0), Margins::new(4.0, 8.0));
        assert_eq!(pos.width, 80.0);
        assert_eq!(pos.height, 40.0);
        assert_eq!(pos.margin_right, 4.0);
        assert_eq!(pos.margin_bottom, 8.0);
    }

    #[test]
    fn test_empty_bounds() {
        assert!(Bounds::zero().is_empty());
        assert!(!Bounds::new(0.0, 0.0, 1.0, 1.0).is_empty());
    }
}
