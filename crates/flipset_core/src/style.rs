//! Style declarations written back to the host
//!
//! A declaration only carries the properties it sets. Hosts merge the `Some`
//! fields into the element's inline style and leave everything else alone;
//! [`Host::clear_style`](crate::Host::clear_style) removes all of them at once.

/// Inline style written to a single target
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StyleDeclaration {
    /// CSS transform list, e.g. `translate(10px, 0px) scale(0.5)`
    pub transform: Option<String>,
    /// Opacity in `0.0..=1.0`
    pub opacity: Option<f32>,
    /// CSS transition list, e.g. `transform 600ms 0ms ease, opacity 600ms 0ms linear`
    pub transition: Option<String>,
    pub width: Option<f32>,
    pub height: Option<f32>,
    pub margin_right: Option<f32>,
    pub margin_bottom: Option<f32>,
}

impl StyleDeclaration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn transform(mut self, transform: impl Into<String>) -> Self {
        self.transform = Some(transform.into());
        self
    }

    pub fn opacity(mut self, opacity: f32) -> Self {
        self.opacity = Some(opacity);
        self
    }

    pub fn transition(mut self, transition: impl Into<String>) -> Self {
        self.transition = Some(transition.into());
        self
    }

    /// Set width and height together
    pub fn size(mut self, width: f32, height: f32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    /// Set the trailing margins together
    pub fn margins(mut self, right: f32, bottom: f32) -> Self {
        self.margin_right = Some(right);
        self.margin_bottom = Some(bottom);
        self
    }

    /// True when the declaration sets nothing
    pub fn is_empty(&self) -> bool {
        self.transform.is_none()
            && self.opacity.is_none()
            && self.transition.is_none()
            && self.width.is_none()
            && self.height.is_none()
            && self.margin_right.is_none()
            && self.margin_bottom.is_none()
    }

    /// Overlay `other` on top of `self`
    pub fn merge(&mut self, other: &StyleDeclaration) {
        if other.transform.is_some() {
            self.transform = other.transform.clone();
        }
        if other.opacity.is_some() {
            self.opacity = other.opacity;
        }
        if other.transition.is_some() {
            self.transition = other.transition.clone();
        }
        if other.width.is_some() {
            self.width = other.width;
        }
        if other.height.is_some() {
            self.height = other.height;
        }
        if other.margin_right.is_some() {
            self.margin_right = other.margin_right;
        }
        if other.margin_bottom.is_some() {
            self.margin_bottom = other.margin_bottom;
        }
    }
}

/// Inline style of the container for the duration of a mix
///
/// Unlike [`StyleDeclaration`], a container style replaces the previous one
/// wholesale. `ContainerStyle::default()` clears everything.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ContainerStyle {
    pub height: Option<f32>,
    pub width: Option<f32>,
    /// Clip overflowing content while the container is clamped
    pub overflow_hidden: bool,
    pub transition: Option<String>,
    pub perspective: Option<String>,
    pub perspective_origin: Option<String>,
}

impl ContainerStyle {
    /// True when the style sets nothing
    pub fn is_clear(&self) -> bool {
        *self == ContainerStyle::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_and_empty() {
        assert!(StyleDeclaration::new().is_empty());

        let style = StyleDeclaration::new()
            .transform("translate(1px, 2px)")
            .opacity(0.5);
        assert!(!style.is_empty());
        assert_eq!(style.opacity, Some(0.5));
        assert_eq!(style.transform.as_deref(), Some("translate(1px, 2px)"));
    }

    #[test]
    fn test_merge_keeps_unset_fields() {
        let mut base = StyleDeclaration::new().opacity(0.0).size(10.0, 20.0);
        base.merge(&StyleDeclaration::new().opacity(1.0).transition("opacity 100ms 0ms linear"));

        assert_eq!(base.opacity, Some(1.0));
        assert_eq!(base.width, Some(10.0));
        assert_eq!(base.height, Some(20.0));
        assert!(base.transition.is_some());
    }

    #[test]
    fn test_container_style_clear() {
        assert!(ContainerStyle::default().is_clear());
        let style = ContainerStyle {
            perspective: Some("3000px".into()),
            ..Default::default()
        };
        assert!(!style.is_clear());
    }
}
