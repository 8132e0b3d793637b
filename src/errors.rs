use thiserror::Error;

use crate::values::InvalidValue;

/// Which compilation stage rejected the usage spec.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecErrorKind {
    /// The lexer could not tokenize the spec.
    Lex,
    /// The tokens do not form a valid spec.
    Parse,
}

/// A usage spec that failed to compile, with the byte position of the
/// first failure site.
#[derive(Debug, PartialEq, Eq)]
pub struct SpecError {
    /// The stage that failed.
    pub kind: SpecErrorKind,
    /// The offending spec string.
    pub input: String,
    /// What went wrong.
    pub message: String,
    /// Byte position of the failure within `input`.
    pub position: usize,
}

impl SpecError {
    pub(crate) fn lex(input: impl Into<String>, message: impl Into<String>, position: usize) -> Self {
        Self {
            kind: SpecErrorKind::Lex,
            input: input.into(),
            message: message.into(),
            position,
        }
    }

    pub(crate) fn parse(
        input: impl Into<String>,
        message: impl Into<String>,
        position: usize,
    ) -> Self {
        Self {
            kind: SpecErrorKind::Parse,
            input: input.into(),
            message: message.into(),
            position,
        }
    }

    fn indent(&self) -> String {
        // Preserve tabs so the caret lines up under the offending byte.
        self.input[..self.position.min(self.input.len())]
            .chars()
            .map(|c| if c == '\t' { c } else { ' ' })
            .collect()
    }
}

impl std::fmt::Display for SpecError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Spec error at position {pos}:\n{input}\n{indent}^ {message}",
            pos = self.position,
            input = self.input,
            indent = self.indent(),
            message = self.message,
        )
    }
}

impl std::error::Error for SpecError {}

/// Rejection of a single argument vector.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    /// The argument vector does not fit the usage spec. The engine fails
    /// positionally, so there is no payload to carry.
    #[error("incorrect usage")]
    IncorrectUsage,

    /// A matched token that the parameter's holder refused during
    /// commit.
    #[error("invalid value for '{parameter}': {source}")]
    InvalidValue {
        /// Display name of the offending option/argument.
        parameter: String,
        /// The holder's rejection, carrying the offending token.
        #[source]
        source: InvalidValue,
    },
}

/// A declaration mistake, reported when the command is compiled.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("Config error: {0}")]
pub struct ConfigError(pub(crate) String);

/// Everything that can go wrong while compiling a command.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CompileError {
    /// A declaration mistake.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The usage spec failed to lex or parse.
    #[error(transparent)]
    Spec(#[from] SpecError),
}
