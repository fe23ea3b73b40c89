//! Style snapshots a target animates between
//!
//! [`StyleData`] holds everything a tween can move: the translate offset,
//! opacity, size and trailing margins (when resizing), and one value per
//! supported transform function.

use std::fmt;

use flipset_core::StyleDeclaration;

/// Unit suffix of a transform value
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Unit {
    #[default]
    None,
    Px,
    Percent,
    Deg,
}

impl Unit {
    pub fn as_str(&self) -> &'static str {
        match self {
            Unit::None => "",
            Unit::Px => "px",
            Unit::Percent => "%",
            Unit::Deg => "deg",
        }
    }
}

/// Transform functions understood by the effects language
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TransformKind {
    Scale,
    TranslateX,
    TranslateY,
    TranslateZ,
    RotateX,
    RotateY,
    RotateZ,
}

impl TransformKind {
    /// Every kind, in the order transforms are written
    pub const ALL: [TransformKind; 7] = [
        TransformKind::Scale,
        TransformKind::TranslateX,
        TransformKind::TranslateY,
        TransformKind::TranslateZ,
        TransformKind::RotateX,
        TransformKind::RotateY,
        TransformKind::RotateZ,
    ];

    /// CSS function name
    pub fn name(&self) -> &'static str {
        match self {
            TransformKind::Scale => "scale",
            TransformKind::TranslateX => "translateX",
            TransformKind::TranslateY => "translateY",
            TransformKind::TranslateZ => "translateZ",
            TransformKind::RotateX => "rotateX",
            TransformKind::RotateY => "rotateY",
            TransformKind::RotateZ => "rotateZ",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    /// Value that leaves the element untouched
    pub fn identity(&self) -> TransformData {
        match self {
            TransformKind::Scale => TransformData::new(1.0, Unit::None),
            TransformKind::TranslateX | TransformKind::TranslateY | TransformKind::TranslateZ => {
                TransformData::new(0.0, Unit::Px)
            }
            TransformKind::RotateX | TransformKind::RotateY | TransformKind::RotateZ => {
                TransformData::new(0.0, Unit::Deg)
            }
        }
    }

    /// Value used when the effect is named without an argument
    pub fn default_value(&self) -> TransformData {
        match self {
            TransformKind::Scale => TransformData::new(0.01, Unit::None),
            TransformKind::TranslateX | TransformKind::TranslateY | TransformKind::TranslateZ => {
                TransformData::new(20.0, Unit::Px)
            }
            TransformKind::RotateX | TransformKind::RotateY => TransformData::new(90.0, Unit::Deg),
            TransformKind::RotateZ => TransformData::new(180.0, Unit::Deg),
        }
    }

    /// Whether `unit` is acceptable for this function
    pub fn accepts(&self, unit: Unit) -> bool {
        match self {
            TransformKind::Scale => unit == Unit::None,
            TransformKind::TranslateX | TransformKind::TranslateY | TransformKind::TranslateZ => {
                matches!(unit, Unit::Px | Unit::Percent)
            }
            TransformKind::RotateX | TransformKind::RotateY | TransformKind::RotateZ => unit == Unit::Deg,
        }
    }

    /// Translate and rotate are mirrored by `reverse_out`; scale is not
    pub fn is_directional(&self) -> bool {
        !matches!(self, TransformKind::Scale)
    }
}

/// One transform function's value
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TransformData {
    pub value: f32,
    pub unit: Unit,
}

impl TransformData {
    pub fn new(value: f32, unit: Unit) -> Self {
        Self { value, unit }
    }
}

/// Value for every [`TransformKind`], identity by default
#[derive(Clone, Debug, PartialEq)]
pub struct TransformSet {
    values: [TransformData; 7],
}

impl Default for TransformSet {
    fn default() -> Self {
        Self {
            values: TransformKind::ALL.map(|kind| kind.identity()),
        }
    }
}

impl TransformSet {
    fn slot(kind: TransformKind) -> usize {
        kind as usize
    }

    pub fn get(&self, kind: TransformKind) -> TransformData {
        self.values[Self::slot(kind)]
    }

    pub fn set(&mut self, kind: TransformKind, data: TransformData) {
        self.values[Self::slot(kind)] = data;
    }

    pub fn iter(&self) -> impl Iterator<Item = (TransformKind, TransformData)> + '_ {
        TransformKind::ALL.into_iter().map(move |kind| (kind, self.get(kind)))
    }

    /// Kinds whose value differs from identity
    pub fn active(&self) -> impl Iterator<Item = (TransformKind, TransformData)> + '_ {
        self.iter().filter(|(kind, data)| data.value != kind.identity().value)
    }

    pub fn is_identity(&self) -> bool {
        self.active().next().is_none()
    }
}

/// Everything a target can be tweened through
#[derive(Clone, Debug, PartialEq)]
pub struct StyleData {
    pub x: f32,
    pub y: f32,
    pub opacity: f32,
    pub width: f32,
    pub height: f32,
    pub margin_right: f32,
    pub margin_bottom: f32,
    pub transforms: TransformSet,
}

impl Default for StyleData {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            opacity: 1.0,
            width: 0.0,
            height: 0.0,
            margin_right: 0.0,
            margin_bottom: 0.0,
            transforms: TransformSet::default(),
        }
    }
}

impl StyleData {
    /// Field-wise `other - self`
    ///
    /// The result is a change vector rather than a style; its opacity and
    /// transform values are differences, not absolute values.
    pub fn delta_to(&self, other: &StyleData) -> StyleData {
        let mut transforms = TransformSet::default();
        for (kind, data) in self.transforms.iter() {
            let target = other.transforms.get(kind);
            transforms.set(kind, TransformData::new(target.value - data.value, data.unit));
        }
        StyleData {
            x: other.x - self.x,
            y: other.y - self.y,
            opacity: other.opacity - self.opacity,
            width: other.width - self.width,
            height: other.height - self.height,
            margin_right: other.margin_right - self.margin_right,
            margin_bottom: other.margin_bottom - self.margin_bottom,
            transforms,
        }
    }

    /// CSS transform list: the translate offset followed by active transforms
    pub fn transform_css(&self) -> String {
        let mut css = format!("translate({}px, {}px)", self.x, self.y);
        for (kind, data) in self.transforms.active() {
            css.push(' ');
            css.push_str(&format!("{}({}{})", kind.name(), data.value, data.unit.as_str()));
        }
        css
    }

    /// Declaration carrying transform and opacity, plus size when `resize`
    ///
    /// Size and margins are only written when the snapshot actually carries a
    /// size (a width above zero).
    pub fn to_declaration(&self, resize: bool) -> StyleDeclaration {
        let mut decl = StyleDeclaration::new()
            .transform(self.transform_css())
            .opacity(self.opacity);
        if resize && self.width > 0.0 {
            decl = decl
                .size(self.width, self.height)
                .margins(self.margin_right, self.margin_bottom);
        }
        decl
    }
}

impl fmt::Display for TransformData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.value, self.unit.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_transform_css() {
        let style = StyleData::default();
        assert_eq!(style.transform_css(), "translate(0px, 0px)");
        assert!(style.transforms.is_identity());
    }

    #[test]
    fn test_active_transforms_written_in_order() {
        let mut style = StyleData::default();
        style.x = -100.0;
        style
            .transforms
            .set(TransformKind::RotateZ, TransformData::new(180.0, Unit::Deg));
        style
            .transforms
            .set(TransformKind::Scale, TransformData::new(0.5, Unit::None));

        assert_eq!(
            style.transform_css(),
            "translate(-100px, 0px) scale(0.5) rotateZ(180deg)"
        );
    }

    #[test]
    fn test_delta_to() {
        let mut from = StyleData::default();
        from.x = 10.0;
        from.opacity = 0.0;
        let mut to = StyleData::default();
        to.x = 30.0;

        let delta = from.delta_to(&to);
        assert_eq!(delta.x, 20.0);
        assert_eq!(delta.opacity, 1.0);
    }

    #[test]
    fn test_declaration_size_only_when_resizing() {
        let mut style = StyleData::default();
        style.width = 100.0;
        style.height = 50.0;

        assert!(style.to_declaration(false).width.is_none());
        assert_eq!(style.to_declaration(true).width, Some(100.0));
        assert_eq!(style.to_declaration(true).opacity, Some(1.0));
    }

    #[test]
    fn test_kind_units() {
        assert!(TransformKind::TranslateX.accepts(Unit::Percent));
        assert!(!TransformKind::Scale.accepts(Unit::Px));
        assert!(!TransformKind::RotateY.accepts(Unit::Px));
        assert_eq!(TransformKind::from_name("rotateX"), Some(TransformKind::RotateX));
        assert_eq!(TransformKind::from_name("spin"), None);
    }
}
