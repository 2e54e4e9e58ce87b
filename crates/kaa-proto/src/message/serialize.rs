use std::fmt::{self, Display, Formatter};

use super::types::Message;

impl Display for Message {
    /// Renders the message without a line terminator; the line codec adds it.
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if let Some(ref prefix) = self.prefix {
            write!(f, ":{} ", prefix)?;
        }

        f.write_str(&self.command.to_ascii_uppercase())?;

        for param in self.positional() {
            write!(f, " {}", param)?;
        }

        if self.has_trailing {
            write!(f, " :{}", self.trailing())?;
        }

        Ok(())
    }
}

/// Build one outbound protocol line.
///
/// All arguments are space-joined after the command. When `trailing` is set
/// the last argument is marked with `:` so it may contain spaces. Without
/// arguments the line is just the command.
///
/// ```
/// use kaa_proto::format_command;
///
/// assert_eq!(format_command::<&str>("QUIT", &[], true), "QUIT");
/// assert_eq!(format_command("NICK", &["kaa"], false), "NICK kaa");
/// assert_eq!(
///     format_command("USER", &["kaa", "3", "*", "Kaa Bot"], true),
///     "USER kaa 3 * :Kaa Bot"
/// );
/// ```
pub fn format_command<S: AsRef<str>>(command: &str, args: &[S], trailing: bool) -> String {
    let mut line = String::with_capacity(64);
    line.push_str(command);

    let Some((last, head)) = args.split_last() else {
        return line;
    };

    for arg in head {
        line.push(' ');
        line.push_str(arg.as_ref());
    }

    line.push(' ');
    if trailing {
        line.push(':');
    }
    line.push_str(last.as_ref());
    line
}
