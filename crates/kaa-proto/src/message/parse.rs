//! Message parsing implementation.
//!
//! Grammar: `[:prefix ]command[ param]*[ :trailing]`.

use std::str::FromStr;

use crate::error::ParseError;

use super::nom_parser::parse_line;
use super::types::Message;

impl FromStr for Message {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Message, Self::Err> {
        let line = s.trim_end_matches(['\r', '\n']);
        if line.trim().is_empty() {
            return Err(ParseError::EmptyMessage);
        }

        // The command is the only required part, so any grammar failure
        // means it is missing.
        let (_, parsed) = parse_line(line).map_err(|_| ParseError::MissingCommand {
            line: line.to_owned(),
        })?;

        Ok(Message {
            prefix: parsed.prefix.map(str::to_owned),
            command: parsed.command.to_ascii_lowercase(),
            params: parsed.params.into_iter().map(str::to_owned).collect(),
            has_trailing: parsed.has_trailing,
        })
    }
}
