//! Sort-string parser
//!
//! ```text
//! sort     = level (ws level)*
//! level    = "random" | attr [":" order]
//! attr     = "default" | <any run without whitespace or ':'>
//! order    = "asc" | "desc" | "random"
//! ```
//!
//! `default` is the original insertion order; a missing order is `asc`.

use nom::{
    branch::alt,
    bytes::complete::{tag_no_case, take_while1},
    character::complete::{char, multispace0, multispace1},
    combinator::{all_consuming, opt},
    error::VerboseError,
    multi::separated_list1,
    sequence::{delimited, pair, preceded},
    Finish, IResult,
};

use crate::command::{SortCommand, SortOrder};
use crate::error::{MixerError, Result};

type ParseResult<'a, O> = IResult<&'a str, O, VerboseError<&'a str>>;

fn attribute(input: &str) -> ParseResult<&str> {
    take_while1(|c: char| !c.is_whitespace() && c != ':')(input)
}

fn order(input: &str) -> ParseResult<SortOrder> {
    let (input, order) = alt((
        tag_no_case("asc"),
        tag_no_case("desc"),
        tag_no_case("random"),
    ))(input)?;
    let order = match order.to_ascii_lowercase().as_str() {
        "desc" => SortOrder::Desc,
        "random" => SortOrder::Random,
        _ => SortOrder::Asc,
    };
    Ok((input, order))
}

fn level(input: &str) -> ParseResult<(&str, Option<SortOrder>)> {
    pair(attribute, opt(preceded(char(':'), order)))(input)
}

/// Parse a sort string into a chained [`SortCommand`]
pub fn parse_sort<E>(input: &str) -> Result<SortCommand<E>> {
    let (_, levels) = all_consuming(delimited(
        multispace0,
        separated_list1(multispace1, level),
        multispace0,
    ))(input)
    .finish()
    .map_err(|_: VerboseError<&str>| {
        MixerError::Parse(format!("invalid sort string \"{}\"", input))
    })?;

    let mut commands = levels.into_iter().map(|(attribute, order)| {
        if attribute.eq_ignore_ascii_case("random") {
            return SortCommand::random();
        }
        let attribute = if attribute.eq_ignore_ascii_case("default") {
            ""
        } else {
            attribute
        };
        SortCommand::by(attribute, order.unwrap_or_default())
    });

    let first = commands
        .next()
        .ok_or_else(|| MixerError::Parse("empty sort string".to_string()))?;
    Ok(commands.fold(first, SortCommand::then))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_level() {
        let sort = parse_sort::<u32>("views:desc").unwrap();
        assert_eq!(sort.attribute, "views");
        assert_eq!(sort.order, SortOrder::Desc);
        assert!(sort.next.is_none());
    }

    #[test]
    fn test_chained_levels() {
        let sort = parse_sort::<u32>("  views:desc published:ASC title ").unwrap();
        let levels: Vec<_> = sort
            .levels()
            .map(|level| (level.attribute.as_str(), level.order))
            .collect();
        assert_eq!(
            levels,
            [
                ("views", SortOrder::Desc),
                ("published", SortOrder::Asc),
                ("title", SortOrder::Asc)
            ]
        );
    }

    #[test]
    fn test_keywords() {
        assert!(parse_sort::<u32>("default").unwrap().is_default());
        assert!(parse_sort::<u32>("default:asc").unwrap().is_default());
        assert_eq!(parse_sort::<u32>("default:desc").unwrap().order, SortOrder::Desc);
        assert_eq!(parse_sort::<u32>("random").unwrap(), SortCommand::random());
    }

    #[test]
    fn test_invalid() {
        assert!(parse_sort::<u32>("").is_err());
        assert!(parse_sort::<u32>("views:sideways").is_err());
        assert!(parse_sort::<u32>("views:").is_err());
    }
}
