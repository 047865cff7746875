use std::env;

use crate::api::Matches;
use crate::grammar::Grammar;
use crate::matcher::{match_operands, Diagnostic, Problem, SplitError, Splitter, ValueStore};
use crate::model::StopKind;

#[cfg(feature = "tracing_debug")]
use tracing::debug;

/// The outcome of matching an argument vector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchResult {
    /// An invocation matched; its options and operands are bound.
    Success(Matches),
    /// A reserved option (`--help`, `--version`, `--about`) was given.
    /// Nothing is bound.
    Stop(StopKind),
    /// No invocation matched.
    /// Holds one diagnostic per invocation tried, in declaration order.
    Failure(Vec<Diagnostic>),
}

/// The configured usage parser.
/// Built via `UsageParser::build`.
#[derive(Debug, Clone)]
pub struct GeneralParser {
    grammar: Grammar,
}

impl GeneralParser {
    pub(crate) fn new(grammar: Grammar) -> Self {
        Self { grammar }
    }

    /// The compiled usage.
    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    /// The usage of every invocation, wrapped to 80 columns.
    pub fn usage(&self) -> String {
        self.grammar.usage()
    }

    /// Match the input tokens against each invocation, in declaration order.
    ///
    /// Matching an invocation happens in two phases:
    /// 1. Option splitting activates the options (and their arguments), leaving the operand tokens.
    /// 2. Pattern matching fits the operand tokens to an arrangement of the invocation's operands.
    ///
    /// The first invocation to pass both phases is the `Success`.
    /// An unknown or ambiguous option ends matching immediately, without trying further invocations.
    ///
    /// ### Example
    /// ```
    /// # use argot_core as argot;
    /// use argot::{MatchResult, UsageParser};
    ///
    /// let parser = UsageParser::new("Usage: prog add <item>\n       prog remove <item>")
    ///     .build()
    ///     .unwrap();
    ///
    /// match parser.parse_tokens(vec!["remove", "X"].as_slice()) {
    ///     MatchResult::Success(matches) => {
    ///         assert!(matches.has("remove"));
    ///         assert_eq!(matches.value("<item>"), Some("X"));
    ///     }
    ///     _ => unreachable!(),
    /// }
    /// ```
    pub fn parse_tokens(&self, tokens: &[&str]) -> MatchResult {
        let grammar = &self.grammar;
        let mut diagnostics = Vec::default();

        for head in grammar.invocations() {
            // Every attempt starts from empty match state.
            let mut store = ValueStore::new(grammar.options.len(), grammar.operands.len());

            #[cfg(feature = "tracing_debug")]
            {
                debug!("Trying invocation '{}'.", grammar.spec_of(head));
            }

            let split = match Splitter::new(grammar, head, &mut store).split(tokens) {
                Ok(split) => split,
                Err(SplitError::Stop(kind)) => return MatchResult::Stop(kind),
                Err(SplitError::Hard(problem)) => {
                    let diagnostic = Diagnostic::new(grammar.spec_of(head), problem);
                    return MatchResult::Failure(vec![diagnostic]);
                }
                Err(SplitError::Soft(problem)) => {
                    diagnostics.push(Diagnostic::new(grammar.spec_of(head), problem));
                    continue;
                }
            };

            // The reserved invocation only stands for its reserved options.
            if grammar.reserved == Some(head) && !store.any_accepted() {
                continue;
            }

            match match_operands(grammar, head, split.operands, &mut store) {
                Some(matched) => {
                    return MatchResult::Success(Matches::new(
                        grammar,
                        head,
                        &store,
                        split.consumed,
                        matched,
                    ));
                }
                None => {
                    diagnostics.push(Diagnostic::new(
                        grammar.spec_of(head),
                        Problem::NoOperandPattern,
                    ));
                }
            }
        }

        MatchResult::Failure(diagnostics)
    }

    /// Match the command line [`env::args`], without the program name.
    pub fn parse(&self) -> MatchResult {
        let command_input: Vec<String> = env::args().skip(1).collect();
        self.parse_tokens(
            command_input
                .iter()
                .map(AsRef::as_ref)
                .collect::<Vec<&str>>()
                .as_slice(),
        )
    }
}
