//! Command module
//!
//! Commands arrive already tokenized; the engine never parses raw text.
//! [`Response`] is what every command produces.

/// A tokenized player command.
///
/// `verb` is the command word (`take`, `go`, `turn on`, `read`...), `object`
/// the direct object, and `target` the indirect object after `preposition`
/// (`put leaflet in mailbox`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Command {
    pub verb: String,
    pub object: Option<String>,
    pub target: Option<String>,
    pub preposition: Option<String>,
}

impl Command {
    pub fn new(verb: impl Into<String>) -> Self {
        Self {
            verb: verb.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_object(mut self, object: impl Into<String>) -> Self {
        self.object = Some(object.into());
        self
    }

    #[must_use]
    pub fn with_target(mut self, preposition: impl Into<String>, target: impl Into<String>) -> Self {
        self.preposition = Some(preposition.into());
        self.target = Some(target.into());
        self
    }
}

/// Outcome of a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub success: bool,
    pub message: String,
    /// True when the command used up a turn.
    pub increment_turn: bool,
}

impl Response {
    /// Successful command that consumed a turn.
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            increment_turn: true,
        }
    }

    /// Successful command that took no game time (`look`, `inventory`).
    pub fn free(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            increment_turn: false,
        }
    }

    /// Refused command: nothing changed, no turn used.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            increment_turn: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builders_fill_fields() {
        let cmd = Command::new("put").with_object("leaflet").with_target("in", "mailbox");
        assert_eq!(cmd.verb, "put");
        assert_eq!(cmd.object.as_deref(), Some("leaflet"));
        assert_eq!(cmd.preposition.as_deref(), Some("in"));
        assert_eq!(cmd.target.as_deref(), Some("mailbox"));
    }

    #[test]
    fn failures_never_consume_turns() {
        let response = Response::failure("no");
        assert!(!response.success);
        assert!(!response.increment_turn);
        assert!(Response::success("yes").increment_turn);
        assert!(!Response::free("look").increment_turn);
    }
}
