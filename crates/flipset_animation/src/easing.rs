//! Easing functions
//!
//! Easings are handed to the host as CSS timing-function strings, so this
//! type round-trips through `FromStr` and `Display`.

use std::fmt;
use std::str::FromStr;

use nom::{
    bytes::complete::tag_no_case,
    character::complete::{char, multispace0},
    combinator::all_consuming,
    error::VerboseError,
    number::complete::float,
    sequence::{delimited, preceded, tuple},
    Finish, IResult,
};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid easing \"{0}\"")]
pub struct EasingParseError(pub String);

/// Timing function of a transition
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Easing {
    Linear,
    #[default]
    Ease,
    EaseIn,
    EaseOut,
    EaseInOut,
    /// Custom cubic bezier curve (x1, y1, x2, y2)
    CubicBezier(f32, f32, f32, f32),
}

impl FromStr for Easing {
    type Err = EasingParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "linear" => Ok(Easing::Linear),
            "ease" => Ok(Easing::Ease),
            "ease-in" => Ok(Easing::EaseIn),
            "ease-out" => Ok(Easing::EaseOut),
            "ease-in-out" => Ok(Easing::EaseInOut),
            _ => all_consuming(cubic_bezier)(trimmed)
                .finish()
                .map(|(_, easing)| easing)
                .map_err(|_: VerboseError<&str>| EasingParseError(s.to_string())),
        }
    }
}

impl fmt::Display for Easing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Easing::Linear => f.write_str("linear"),
            Easing::Ease => f.write_str("ease"),
            Easing::EaseIn => f.write_str("ease-in"),
            Easing::EaseOut => f.write_str("ease-out"),
            Easing::EaseInOut => f.write_str("ease-in-out"),
            Easing::CubicBezier(x1, y1, x2, y2) => {
                write!(f, "cubic-bezier({}, {}, {}, {})", x1, y1, x2, y2)
            }
        }
    }
}

fn number(input: &str) -> IResult<&str, f32, VerboseError<&str>> {
    delimited(multispace0, float, multispace0)(input)
}

/// `cubic-bezier(x1, y1, x2, y2)`
fn cubic_bezier(input: &str) -> IResult<&str, Easing, VerboseError<&str>> {
    let (input, _) = tag_no_case("cubic-bezier")(input)?;
    let (input, _) = preceded(multispace0, char('('))(input)?;
    let (input, (x1, _, y1, _, x2, _, y2)) = tuple((
        number,
        char(','),
        number,
        char(','),
        number,
        char(','),
        number,
    ))(input)?;
    let (input, _) = char(')')(input)?;
    Ok((input, Easing::CubicBezier(x1, y1, x2, y2)))
}
