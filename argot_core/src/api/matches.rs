use crate::grammar::graph::NodeId;
use crate::grammar::{dashed, Grammar};
use crate::matcher::{Matched, Tally, ValueStore};

/// One matched option or operand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bound {
    name: String,
    alias: Option<String>,
    count: usize,
    values: Vec<String>,
}

impl Bound {
    fn new(name: String, alias: Option<String>, tally: &Tally) -> Self {
        Self {
            name,
            alias,
            count: tally.count,
            values: tally.values.clone(),
        }
    }

    /// The name as written in the usage: `-v`, `--verbose`, `<file>` or `find`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The other name of an option pair, for example `--verbose` for `-v`.
    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    /// How many times it was matched.
    pub fn count(&self) -> usize {
        self.count
    }

    /// The last value.
    /// For options this is the last argument.
    pub fn value(&self) -> Option<&str> {
        self.values.last().map(String::as_str)
    }

    /// Every value, in argument order.
    pub fn values(&self) -> &[String] {
        &self.values
    }

    fn is_named(&self, name: &str) -> bool {
        self.name == name || self.alias.as_deref() == Some(name)
    }
}

/// The bindings of a successful match.
///
/// Lookups accept three kinds of name:
/// * `-v` or `--verbose` only address options.
/// * `<file>` only addresses variable operands.
/// * Bare names, such as `verbose`, `file` or `find`, try the options first, then the operands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Matches {
    consumed: usize,
    invocation: String,
    pattern: String,
    options: Vec<Bound>,
    operands: Vec<Bound>,
    leftover: Vec<String>,
}

impl Matches {
    pub(crate) fn new(
        grammar: &Grammar,
        head: NodeId,
        store: &ValueStore,
        consumed: usize,
        matched: Matched,
    ) -> Self {
        let options = store
            .options()
            .map(|(id, tally)| {
                let option = grammar.option(id);
                Bound::new(option.text(), option.alt_name().map(dashed), tally)
            })
            .collect();
        let operands = grammar
            .variables
            .iter()
            .chain(grammar.literals.iter())
            .filter(|id| store.operand(**id).has())
            .map(|id| Bound::new(grammar.operand(*id).text(), None, store.operand(*id)))
            .collect();

        Self {
            consumed,
            invocation: grammar.spec_of(head),
            pattern: matched.pattern,
            options,
            operands,
            leftover: matched.leftover,
        }
    }

    /// The index in the argument vector where operands begin.
    /// Without the POSIX format, this is the length of the argument vector.
    pub fn consumed(&self) -> usize {
        self.consumed
    }

    /// The text of the matched invocation, for example `prog [-v] <file>...`.
    pub fn invocation(&self) -> &str {
        &self.invocation
    }

    /// The text of the matched operand arrangement, for example `find <pattern> <file>...`.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Every matched option, in declaration order.
    pub fn options(&self) -> &[Bound] {
        &self.options
    }

    /// Every matched operand: the variables, then the literals, each in declaration order.
    pub fn operands(&self) -> &[Bound] {
        &self.operands
    }

    /// The operand tokens not bound to any operand.
    pub fn leftover(&self) -> &[String] {
        &self.leftover
    }

    /// Whether the named option or operand was matched.
    ///
    /// ### Example
    /// ```
    /// # use argot_core as argot;
    /// use argot::{MatchResult, UsageParser};
    ///
    /// let parser = UsageParser::new("prog [-v/--verbose] find <pattern>").build().unwrap();
    ///
    /// match parser.parse_tokens(vec!["--verbose", "find", "x"].as_slice()) {
    ///     MatchResult::Success(matches) => {
    ///         assert!(matches.has("-v"));
    ///         assert!(matches.has("--verbose"));
    ///         assert!(matches.has("verbose"));
    ///         assert!(matches.has("find"));
    ///         assert!(matches.has("<pattern>"));
    ///         assert!(matches.has("pattern"));
    ///         assert!(!matches.has("<find>"));
    ///     }
    ///     _ => unreachable!(),
    /// }
    /// ```
    pub fn has(&self, name: &str) -> bool {
        self.bound(name).is_some()
    }

    /// How many times the named option or operand was matched, or `0`.
    pub fn count(&self, name: &str) -> usize {
        self.bound(name).map_or(0, Bound::count)
    }

    /// The last value of the named option or operand.
    pub fn value(&self, name: &str) -> Option<&str> {
        self.bound(name).and_then(Bound::value)
    }

    /// Every value of the named option or operand, or an empty slice.
    pub fn values(&self, name: &str) -> &[String] {
        self.bound(name).map(Bound::values).unwrap_or_default()
    }

    fn bound(&self, name: &str) -> Option<&Bound> {
        if name.starts_with('-') {
            self.options.iter().find(|bound| bound.is_named(name))
        } else if name.starts_with('<') {
            self.operands.iter().find(|bound| bound.name == name)
        } else {
            self.options
                .iter()
                .find(|bound| bound.is_named(&dashed(name)))
                .or_else(|| {
                    let variable = format!("<{name}>");
                    self.operands
                        .iter()
                        .find(|bound| bound.name == name || bound.name == variable)
                })
        }
    }
}
