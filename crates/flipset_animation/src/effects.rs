//! Effects language
//!
//! An effects string is a whitespace separated list of effect functions:
//!
//! ```text
//! fade scale(0.5) translateY(-20px) rotateZ stagger(40ms)
//! ```
//!
//! | Effect                      | Argument            | Default  |
//! |-----------------------------|---------------------|----------|
//! | `fade`                      | opacity             | `0`      |
//! | `scale`                     | unitless factor     | `0.01`   |
//! | `translateX/Y/Z`            | `px` or `%`         | `20px`   |
//! | `rotateX` / `rotateY`       | `deg`               | `90deg`  |
//! | `rotateZ`                   | `deg`               | `180deg` |
//! | `stagger`                   | `ms`                | `30ms`   |
//!
//! The argument is optional; naming an effect without one uses the default.
//! A later occurrence of the same effect overrides an earlier one.

use nom::{
    bytes::complete::{tag, tag_no_case, take_while1},
    branch::alt,
    character::complete::{char, multispace0, multispace1},
    combinator::{all_consuming, opt},
    error::{ParseError as NomParseError, VerboseError},
    multi::separated_list0,
    number::complete::float,
    sequence::{delimited, pair, tuple},
    Finish, IResult,
};
use thiserror::Error;

use crate::style_data::{TransformData, TransformKind, TransformSet, Unit};

type ParseResult<'a, O> = IResult<&'a str, O, VerboseError<&'a str>>;

/// Stagger step used when `stagger` is named without an argument
pub const DEFAULT_STAGGER_MS: u32 = 30;

/// Errors produced while reading an effects string
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EffectsParseError {
    #[error("invalid effects syntax at column {column} in \"{input}\"")]
    Syntax { input: String, column: usize },

    #[error("unknown effect \"{0}\"")]
    UnknownEffect(String),

    #[error("unit \"{unit}\" is not valid for effect \"{effect}\"")]
    InvalidUnit { effect: String, unit: String },
}

/// Parsed effects: what a target looks like while hidden
#[derive(Clone, Debug, PartialEq)]
pub struct Effects {
    /// Opacity of a hidden target (`1.0` when not fading)
    pub opacity: f32,
    pub transforms: TransformSet,
    /// Per-target delay step, when staggering
    pub stagger_ms: Option<u32>,
}

impl Default for Effects {
    fn default() -> Self {
        Self {
            opacity: 1.0,
            transforms: TransformSet::default(),
            stagger_ms: None,
        }
    }
}

impl Effects {
    /// Parse an effects string
    pub fn parse(input: &str) -> Result<Self, EffectsParseError> {
        let (_, calls) = all_consuming(delimited(
            multispace0,
            separated_list0(multispace1, effect_call),
            multispace0,
        ))(input)
        .finish()
        .map_err(|err: VerboseError<&str>| {
            let rest = err.errors.first().map(|(rest, _)| *rest).unwrap_or(input);
            EffectsParseError::Syntax {
                input: input.to_string(),
                column: input.len() - rest.len(),
            }
        })?;

        let mut effects = Effects::default();
        for (name, arg) in calls {
            effects.apply(name, arg)?;
        }
        Ok(effects)
    }

    fn apply(&mut self, name: &str, arg: Option<(f32, &str)>) -> Result<(), EffectsParseError> {
        let invalid_unit = |unit: &str| EffectsParseError::InvalidUnit {
            effect: name.to_string(),
            unit: unit.to_string(),
        };

        match name {
            "fade" => match arg {
                None => self.opacity = 0.0,
                Some((value, "")) => self.opacity = value.clamp(0.0, 1.0),
                Some((_, unit)) => return Err(invalid_unit(unit)),
            },
            "stagger" => match arg {
                None => self.stagger_ms = Some(DEFAULT_STAGGER_MS),
                Some((value, "" | "ms")) => self.stagger_ms = Some(value.max(0.0).round() as u32),
                Some((_, unit)) => return Err(invalid_unit(unit)),
            },
            other => {
                let kind = TransformKind::from_name(other)
                    .ok_or_else(|| EffectsParseError::UnknownEffect(other.to_string()))?;
                let data = match arg {
                    None => kind.default_value(),
                    Some((value, unit)) => {
                        let unit = match unit.to_ascii_lowercase().as_str() {
                            "" => kind.default_value().unit,
                            "px" => Unit::Px,
                            "%" => Unit::Percent,
                            "deg" => Unit::Deg,
                            _ => return Err(invalid_unit(unit)),
                        };
                        if !kind.accepts(unit) {
                            return Err(invalid_unit(unit.as_str()));
                        }
                        TransformData::new(value, unit)
                    }
                };
                self.transforms.set(kind, data);
            }
        }
        Ok(())
    }

    /// Whether hiding a target with these effects is visible at all
    pub fn has_effect(&self) -> bool {
        self.is_fading() || !self.transforms.is_identity()
    }

    pub fn is_fading(&self) -> bool {
        self.opacity != 1.0
    }

    /// Mirror of these effects with translate and rotate directions negated
    pub fn reversed(&self) -> Self {
        let mut out = self.clone();
        for (kind, data) in self.transforms.iter() {
            if kind.is_directional() {
                out.transforms.set(kind, TransformData::new(-data.value, data.unit));
            }
        }
        out
    }
}

// ============================================================================
// Nom Parsers
// ============================================================================

/// Optional whitespace
fn ws<'a, E: NomParseError<&'a str>>(input: &'a str) -> IResult<&'a str, &'a str, E> {
    multispace0(input)
}

fn effect_name(input: &str) -> ParseResult<&str> {
    take_while1(|c: char| c.is_ascii_alphabetic())(input)
}

fn unit_suffix(input: &str) -> ParseResult<&str> {
    let (input, unit) = opt(alt((
        tag("px"),
        tag("%"),
        tag_no_case("deg"),
        tag_no_case("ms"),
    )))(input)?;
    Ok((input, unit.unwrap_or("")))
}

/// `(value unit)`
fn effect_arg(input: &str) -> ParseResult<(f32, &str)> {
    let (input, _) = tuple((char('('), ws))(input)?;
    let (input, arg) = pair(float, unit_suffix)(input)?;
    let (input, _) = tuple((ws, char(')')))(input)?;
    Ok((input, arg))
}

/// `name` or `name(value unit)`
fn effect_call(input: &str) -> ParseResult<(&str, Option<(f32, &str)>)> {
    pair(effect_name, opt(effect_arg))(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_defaults() {
        let effects = Effects::parse("fade scale").unwrap();
        assert_eq!(effects.opacity, 0.0);
        assert_eq!(effects.transforms.get(TransformKind::Scale).value, 0.01);
        assert_eq!(effects.stagger_ms, None);
        assert!(effects.has_effect());
    }

    #[test]
    fn test_parse_arguments() {
        let effects =
            Effects::parse("  translateY(-20%) rotateZ(45deg)   stagger(40ms) fade(0.5) ").unwrap();
        assert_eq!(
            effects.transforms.get(TransformKind::TranslateY),
            TransformData::new(-20.0, Unit::Percent)
        );
        assert_eq!(
            effects.transforms.get(TransformKind::RotateZ),
            TransformData::new(45.0, Unit::Deg)
        );
        assert_eq!(effects.stagger_ms, Some(40));
        assert_eq!(effects.opacity, 0.5);
    }

    #[test]
    fn test_parse_unitless_translate_defaults_to_px() {
        let effects = Effects::parse("translateX(15)").unwrap();
        assert_eq!(
            effects.transforms.get(TransformKind::TranslateX),
            TransformData::new(15.0, Unit::Px)
        );
    }

    #[test]
    fn test_parse_empty_has_no_effect() {
        let effects = Effects::parse("").unwrap();
        assert!(!effects.has_effect());
        assert_eq!(effects, Effects::default());
    }

    #[test]
    fn test_stagger_alone_has_no_effect() {
        let effects = Effects::parse("stagger").unwrap();
        assert_eq!(effects.stagger_ms, Some(DEFAULT_STAGGER_MS));
        assert!(!effects.has_effect());
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            Effects::parse("fade wobble"),
            Err(EffectsParseError::UnknownEffect("wobble".into()))
        );
        assert!(matches!(
            Effects::parse("scale(2px)"),
            Err(EffectsParseError::InvalidUnit { .. })
        ));
        assert!(matches!(
            Effects::parse("rotateX(10px)"),
            Err(EffectsParseError::InvalidUnit { .. })
        ));
        assert!(matches!(
            Effects::parse("scale(0.5"),
            Err(EffectsParseError::Syntax { .. })
        ));
    }

    #[test]
    fn test_reversed_mirrors_direction_only() {
        let effects = Effects::parse("scale(0.5) translateX(20px) rotateY").unwrap();
        let reversed = effects.reversed();
        assert_eq!(reversed.transforms.get(TransformKind::Scale).value, 0.5);
        assert_eq!(reversed.transforms.get(TransformKind::TranslateX).value, -20.0);
        assert_eq!(reversed.transforms.get(TransformKind::RotateY).value, -90.0);
    }
}
