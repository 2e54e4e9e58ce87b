//! Nom-based message grammar.
//!
//! Produces borrowed slices into the input line; [`Message`](super::Message)
//! owns the result.

use nom::{
    bytes::complete::{take_till, take_till1},
    character::complete::{char, space0, space1},
    combinator::{opt, verify},
    sequence::{preceded, terminated},
    IResult,
};

/// Parse the prefix: `:` up to the first space, and the spaces after it.
fn parse_prefix(input: &str) -> IResult<&str, &str> {
    terminated(preceded(char(':'), take_till(|c: char| c == ' ')), space1)(input)
}

/// Parse the command token. A leading `:` would make it a trailing
/// parameter, so there is no command.
fn parse_command(input: &str) -> IResult<&str, &str> {
    verify(take_till1(|c: char| c == ' '), |cmd: &str| !cmd.starts_with(':'))(input)
}

/// Split what follows the command into parameters.
///
/// Runs of spaces separate parameters. A parameter starting with `:` is the
/// trailing one and extends to the end of the input.
fn parse_params(input: &str) -> (Vec<&str>, bool) {
    let mut params = Vec::new();
    let mut rest = input;

    loop {
        rest = rest.trim_start_matches(' ');
        if rest.is_empty() {
            return (params, false);
        }

        if let Some(trailing) = rest.strip_prefix(':') {
            params.push(trailing);
            return (params, true);
        }

        let end = rest.find(' ').unwrap_or(rest.len());
        params.push(&rest[..end]);
        rest = &rest[end..];
    }
}

/// Parse `[:prefix ]command[ param]*[ :trailing]` with the terminator
/// already removed.
pub(super) fn parse_line(input: &str) -> IResult<&str, ParsedLine<'_>> {
    let (input, _) = space0(input)?;
    let (input, prefix) = opt(parse_prefix)(input)?;
    let (input, command) = parse_command(input)?;
    let (params, has_trailing) = parse_params(input);

    Ok((
        "",
        ParsedLine {
            prefix,
            command,
            params,
            has_trailing,
        },
    ))
}

/// A parsed line borrowing from its input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct ParsedLine<'a> {
    pub prefix: Option<&'a str>,
    pub command: &'a str,
    /// Positional parameters, then the trailing one if present.
    pub params: Vec<&'a str>,
    pub has_trailing: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(input: &str) -> ParsedLine<'_> {
        parse_line(input).unwrap().1
    }

    #[test]
    fn test_command_only() {
        let line = parse("PING");
        assert_eq!(line.command, "PING");
        assert_eq!(line.prefix, None);
        assert!(line.params.is_empty());
        assert!(!line.has_trailing);
    }

    #[test]
    fn test_prefix_and_trailing() {
        let line = parse(":nick!user@host PRIVMSG #channel :Hello, world!");
        assert_eq!(line.prefix, Some("nick!user@host"));
        assert_eq!(line.command, "PRIVMSG");
        assert_eq!(line.params, ["#channel", "Hello, world!"]);
        assert!(line.has_trailing);
    }

    #[test]
    fn test_user_line() {
        let line = parse("USER guest 3 * :Real Name");
        assert_eq!(line.params, ["guest", "3", "*", "Real Name"]);
    }

    #[test]
    fn test_colon_inside_param_is_not_trailing() {
        let line = parse("MODE #a+b:c d");
        assert_eq!(line.params, ["#a+b:c", "d"]);
        assert!(!line.has_trailing);
    }

    #[test]
    fn test_trailing_spaces_are_ignored() {
        let line = parse("MODE kaa +i   ");
        assert_eq!(line.params, ["kaa", "+i"]);
    }

    #[test]
    fn test_no_command_is_an_error() {
        assert!(parse_line(":irc.example.net").is_err());
        assert!(parse_line(":irc.example.net  ").is_err());
        assert!(parse_line(":irc.example.net :orphan").is_err());
        assert!(parse_line("").is_err());
    }
}
