//! Caller-supplied resolvable messages and argument values

use std::fmt;

use serde::{Deserialize, Serialize};

/// A single message argument
///
/// Arguments are substituted into `{N}` placeholders by position. An
/// argument may itself be a [`MessageResolvable`], in which case it is
/// resolved through the full candidate-code algorithm before the enclosing
/// template is rendered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MessageArg {
    Str(String),
    Int(i64),
    Float(f64),
    /// An argument resolved as a message of its own before formatting
    Resolvable(MessageResolvable),
}

impl fmt::Display for MessageArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(value) => f.write_str(value),
            Self::Int(value) => write!(f, "{value}"),
            Self::Float(value) => write!(f, "{value}"),
            // Unresolved resolvables degrade to their last candidate code
            Self::Resolvable(resolvable) => f.write_str(resolvable.last_code().unwrap_or_default()),
        }
    }
}

impl From<&str> for MessageArg {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for MessageArg {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<i64> for MessageArg {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for MessageArg {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<MessageResolvable> for MessageArg {
    fn from(value: MessageResolvable) -> Self {
        Self::Resolvable(value)
    }
}

/// An ordered set of candidate codes with arguments and an optional
/// default, tried as a unit
///
/// Candidates are tried first to last and the first resolving code wins.
/// When none resolves the embedded default applies, and a not-found
/// failure reports the last candidate code.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessageResolvable {
    codes: Vec<String>,
    args: Vec<MessageArg>,
    default_message: Option<String>,
}

impl MessageResolvable {
    /// Resolvable trying a single code
    pub fn code(code: impl Into<String>) -> Self {
        Self {
            codes: vec![code.into()],
            args: Vec::new(),
            default_message: None,
        }
    }

    /// Resolvable trying each code in order
    pub fn codes<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            codes: codes.into_iter().map(Into::into).collect(),
            args: Vec::new(),
            default_message: None,
        }
    }

    /// Attach positional arguments
    pub fn with_args<I>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = MessageArg>,
    {
        self.args = args.into_iter().collect();
        self
    }

    /// Attach a default message used when no candidate code resolves
    pub fn with_default(mut self, default_message: impl Into<String>) -> Self {
        self.default_message = Some(default_message.into());
        self
    }

    /// Candidate codes in resolution order
    pub fn candidate_codes(&self) -> &[String] {
        &self.codes
    }

    /// Positional arguments applied to whichever candidate resolves
    pub fn args(&self) -> &[MessageArg] {
        &self.args
    }

    /// Default message, if one was attached
    pub fn default_message(&self) -> Option<&str> {
        self.default_message.as_deref()
    }

    /// First candidate code, consulted by the code-as-default policy
    pub fn first_code(&self) -> Option<&str> {
        self.codes.first().map(String::as_str)
    }

    /// Last candidate code, the one carried by not-found failures
    pub fn last_code(&self) -> Option<&str> {
        self.codes.last().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arg_conversions() {
        assert_eq!(MessageArg::from("x"), MessageArg::Str("x".to_string()));
        assert_eq!(MessageArg::from(String::from("y")), MessageArg::Str("y".to_string()));
        assert_eq!(MessageArg::from(7), MessageArg::Int(7));
        assert_eq!(MessageArg::from(2.5), MessageArg::Float(2.5));
    }

    #[test]
    fn test_arg_display() {
        assert_eq!(MessageArg::from("Ann").to_string(), "Ann");
        assert_eq!(MessageArg::Int(-3).to_string(), "-3");
        assert_eq!(MessageArg::Float(1.25).to_string(), "1.25");
    }

    #[test]
    fn test_unresolved_resolvable_arg_displays_last_code() {
        let arg = MessageArg::from(MessageResolvable::codes(["a.b", "a.c"]));
        assert_eq!(arg.to_string(), "a.c");
    }

    #[test]
    fn test_single_code_resolvable() {
        let resolvable = MessageResolvable::code("label.greeting");
        assert_eq!(resolvable.candidate_codes(), ["label.greeting"]);
        assert_eq!(resolvable.first_code(), Some("label.greeting"));
        assert_eq!(resolvable.last_code(), Some("label.greeting"));
        assert_eq!(resolvable.default_message(), None);
    }

    #[test]
    fn test_first_and_last_codes() {
        let resolvable = MessageResolvable::codes(["a.specific", "a.general"])
            .with_args(["x".into()])
            .with_default("fallback");
        assert_eq!(resolvable.first_code(), Some("a.specific"));
        assert_eq!(resolvable.last_code(), Some("a.general"));
        assert_eq!(resolvable.args().len(), 1);
        assert_eq!(resolvable.default_message(), Some("fallback"));
    }

    #[test]
    fn test_empty_resolvable() {
        let resolvable = MessageResolvable::default();
        assert!(resolvable.candidate_codes().is_empty());
        assert_eq!(resolvable.first_code(), None);
        assert_eq!(resolvable.last_code(), None);
    }
}
