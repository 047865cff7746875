use std::fmt;
use thiserror::Error;

mod model;
mod pattern;
mod splitter;

pub(crate) use model::*;
pub(crate) use pattern::*;
pub(crate) use splitter::*;

/// Why an argument vector does not fit an invocation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum Problem {
    /// The option is not declared anywhere in the usage.
    /// Matching stops immediately, without trying further invocations.
    #[error("Invalid option: '{0}'.")]
    UnknownOption(String),

    /// The option is declared, but not in this invocation.
    #[error("Option '{0}' is not valid here.")]
    NotInInvocation(String),

    /// Two options which are alternatives of one another were both given.
    #[error("Options '{0}' and '{1}' are mutually exclusive.")]
    MutuallyExclusive(String, String),

    /// A single-dash token which is both a declared option name and a group of option letters.
    /// Matching stops immediately, without trying further invocations.
    #[error("'{0}' is ambiguous: it is both an option and a group of option letters.")]
    Ambiguous(String),

    /// The option requires an argument, but none was given.
    #[error("Option '{0}' requires an argument.")]
    MissingArgument(String),

    /// The option does not take an argument, but one was attached.
    #[error("Option '{0}' does not take an argument.")]
    UnexpectedArgument(String),

    /// The option takes a single argument, but was given a second one.
    #[error("Option '{0}' may only be given one argument.")]
    RepeatedArgument(String),

    /// The operands do not fit any arrangement of the invocation.
    #[error("No matching operand pattern.")]
    NoOperandPattern,
}

/// A problem, labelled with the text of the invocation it was found in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    invocation: String,
    problem: Problem,
}

impl Diagnostic {
    pub(crate) fn new(invocation: impl Into<String>, problem: Problem) -> Self {
        Self {
            invocation: invocation.into(),
            problem,
        }
    }

    /// The invocation text, for example `prog [-v] <file>...`.
    pub fn invocation(&self) -> &str {
        &self.invocation
    }

    /// What went wrong.
    pub fn problem(&self) -> &Problem {
        &self.problem
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.invocation, self.problem)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Problem::UnknownOption("--x".to_string()), "prog: Invalid option: '--x'.")]
    #[case(Problem::MutuallyExclusive("-x".to_string(), "-y".to_string()), "prog: Options '-x' and '-y' are mutually exclusive.")]
    #[case(Problem::NoOperandPattern, "prog: No matching operand pattern.")]
    fn diagnostic_display(#[case] problem: Problem, #[case] expected: &str) {
        // Setup
        let diagnostic = Diagnostic::new("prog", problem);

        // Execute
        let text = diagnostic.to_string();

        // Verify
        assert_eq!(text, expected);
    }
}
