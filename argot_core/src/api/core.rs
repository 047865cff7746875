use crate::grammar::{CompileError, Grammar};
use crate::model::Settings;
use crate::parser::GeneralParser;

/// The usage parser builder.
///
/// ### Example
/// ```
/// # use argot_core as argot;
/// use argot::{MatchResult, UsageParser};
///
/// let parser = UsageParser::new("Usage: prog [-v] <file>...")
///     // Configure with the setters.
///     .build()
///     .unwrap();
///
/// match parser.parse_tokens(vec!["-v", "a.txt", "b.txt"].as_slice()) {
///     MatchResult::Success(matches) => {
///         assert!(matches.has("-v"));
///         assert_eq!(matches.values("<file>"), &["a.txt", "b.txt"]);
///     }
///     _ => unreachable!(),
/// }
/// ```
#[derive(Debug, Clone)]
pub struct UsageParser {
    usage: String,
    settings: Settings,
}

impl UsageParser {
    /// Create a usage parser builder for the usage text.
    pub fn new(usage: impl Into<String>) -> Self {
        Self {
            usage: usage.into(),
            settings: Settings::default(),
        }
    }

    /// Allow an option that takes a single argument to be given more than once.
    /// The last argument wins.
    ///
    /// ### Example
    /// ```
    /// # use argot_core as argot;
    /// use argot::{MatchResult, UsageParser};
    ///
    /// let parser = UsageParser::new("prog [-o <file>]")
    ///     .allow_overwrite()
    ///     .build()
    ///     .unwrap();
    ///
    /// match parser.parse_tokens(vec!["-o", "a", "-o", "b"].as_slice()) {
    ///     MatchResult::Success(matches) => assert_eq!(matches.value("-o"), Some("b")),
    ///     _ => unreachable!(),
    /// }
    /// ```
    pub fn allow_overwrite(mut self) -> Self {
        self.settings.allow_overwrite = true;
        self
    }

    /// End option processing at the first operand.
    /// Every token after it is an operand, even when it starts with `-`.
    ///
    /// ### Example
    /// ```
    /// # use argot_core as argot;
    /// use argot::{MatchResult, UsageParser};
    ///
    /// let parser = UsageParser::new("prog [-v] <command> [<args>...]")
    ///     .posix_format()
    ///     .build()
    ///     .unwrap();
    ///
    /// match parser.parse_tokens(vec!["-v", "run", "-v"].as_slice()) {
    ///     MatchResult::Success(matches) => {
    ///         assert_eq!(matches.count("-v"), 1);
    ///         assert_eq!(matches.values("<args>"), &["-v"]);
    ///         assert_eq!(matches.consumed(), 1);
    ///     }
    ///     _ => unreachable!(),
    /// }
    /// ```
    pub fn posix_format(mut self) -> Self {
        self.settings.posix = true;
        self
    }

    /// Match `--help` as an ordinary option, rather than stopping with [`StopKind::Help`](crate::StopKind::Help).
    pub fn suppress_help(mut self) -> Self {
        self.settings.suppress_help = true;
        self
    }

    /// Reserve `-v/--version`, stopping with [`StopKind::Version`](crate::StopKind::Version) when given.
    ///
    /// ### Example
    /// ```
    /// # use argot_core as argot;
    /// use argot::{MatchResult, StopKind, UsageParser};
    ///
    /// let parser = UsageParser::new("prog <file>")
    ///     .version()
    ///     .build()
    ///     .unwrap();
    ///
    /// assert_eq!(parser.parse_tokens(vec!["--version"].as_slice()), MatchResult::Stop(StopKind::Version));
    /// ```
    pub fn version(mut self) -> Self {
        self.settings.version = true;
        self
    }

    /// Reserve `-a/--about`, stopping with [`StopKind::About`](crate::StopKind::About) when given.
    pub fn about(mut self) -> Self {
        self.settings.about = true;
        self
    }

    /// Compile the usage text into a parser.
    ///
    /// ### Example
    /// ```
    /// # use argot_core as argot;
    /// use argot::{CompileError, UsageParser};
    ///
    /// let error = UsageParser::new("prog (<file>").build().unwrap_err();
    ///
    /// assert_eq!(error, CompileError::Unclosed('('));
    /// ```
    pub fn build(self) -> Result<GeneralParser, CompileError> {
        let grammar = Grammar::compile_with(&self.usage, self.settings)?;
        Ok(GeneralParser::new(grammar))
    }
}
