//! IRC message types, parsing and serialization.

mod nom_parser;
mod parse;
mod serialize;
mod types;

pub use self::serialize::format_command;
pub use self::types::Message;
