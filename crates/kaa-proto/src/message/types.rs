/// A parsed IRC message.
///
/// The command is stored lower-cased so it can be used directly as a
/// dispatch key. When the line carried a trailing parameter it is the last
/// element of [`params`](Message::params) and
/// [`has_trailing`](Message::has_trailing) is set.
///
/// # Example
///
/// ```
/// use kaa_proto::Message;
///
/// let msg: Message = ":irc.example.net 001 kaa :Welcome to the network".parse().unwrap();
/// assert_eq!(msg.command, "001");
/// assert_eq!(msg.arg(0), Some("kaa"));
/// assert_eq!(msg.trailing(), "Welcome to the network");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Message source as sent by the server, without the leading colon.
    pub prefix: Option<String>,
    /// Lower-cased command name or three-digit numeric.
    pub command: String,
    /// Positional parameters followed by the trailing parameter, if any.
    pub params: Vec<String>,
    /// Whether the last element of `params` was sent as a trailing parameter.
    pub has_trailing: bool,
}

impl Message {
    /// Create a message without a prefix.
    ///
    /// The command is lower-cased. When `trailing` is set the last parameter
    /// is serialized with the `:` marker.
    pub fn new<S: Into<String>>(command: &str, params: Vec<S>, trailing: bool) -> Self {
        let params: Vec<String> = params.into_iter().map(Into::into).collect();
        let has_trailing = trailing && !params.is_empty();
        Self {
            prefix: None,
            command: command.to_ascii_lowercase(),
            params,
            has_trailing,
        }
    }

    /// Attach a prefix to this message.
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// The trailing parameter, or `""` when the line had none.
    pub fn trailing(&self) -> &str {
        if self.has_trailing {
            self.params.last().map(String::as_str).unwrap_or("")
        } else {
            ""
        }
    }

    /// Parameters that precede the trailing parameter.
    pub fn positional(&self) -> &[String] {
        if self.has_trailing && !self.params.is_empty() {
            &self.params[..self.params.len() - 1]
        } else {
            &self.params
        }
    }

    /// Get the parameter at `index`, trailing included.
    #[inline]
    pub fn arg(&self, index: usize) -> Option<&str> {
        self.params.get(index).map(String::as_str)
    }

    /// Whether the command is a three-digit numeric reply.
    pub fn is_numeric(&self) -> bool {
        self.command.len() == 3 && self.command.bytes().all(|b| b.is_ascii_digit())
    }

    /// Nickname part of a `nick!user@host` prefix.
    ///
    /// Returns `None` for server prefixes (`irc.example.net`) and for
    /// messages without a prefix.
    pub fn source_nick(&self) -> Option<&str> {
        let prefix = self.prefix.as_deref()?;
        match prefix.find(['!', '@']) {
            Some(end) => Some(&prefix[..end]).filter(|nick| !nick.is_empty()),
            None if prefix.contains('.') || prefix.is_empty() => None,
            None => Some(prefix),
        }
    }

    /// Where a reply to this message should go.
    ///
    /// Channel messages are answered in the channel, private messages are
    /// answered to the sender.
    pub fn response_target(&self) -> Option<&str> {
        let target = self.arg(0)?;
        if target.starts_with(['#', '&']) {
            Some(target)
        } else {
            self.source_nick()
        }
    }
}
