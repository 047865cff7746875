use std::collections::HashMap;
use thiserror::Error;

use crate::model::{NameForm, OperandKind, Settings};

mod compiler;
pub(crate) mod graph;
mod printer;
mod tokens;

use compiler::Compiler;
use graph::*;

/// An error in the usage text.
/// No part of a grammar which fails to compile is usable.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CompileError {
    /// The usage text contains no tokens.
    #[error("No usage text to compile.")]
    MissingUsage,

    /// The token where the program name belongs is not a word.
    #[error("Expected a program name, found '{0}'.")]
    MissingProgram(String),

    /// A variable operand is missing its closing `>`.
    #[error("Invalid operand terminator: '{0}'.")]
    OperandTerminator(String),

    /// An option argument is missing its closing `>` or `]`.
    #[error("Invalid option argument terminator: '{0}'.")]
    ArgumentTerminator(String),

    /// A single dash option is not exactly one letter or digit.
    #[error("Invalid letter option: '{0}'.")]
    InvalidLetter(String),

    /// A double dash option name contains characters other than letters, digits, `-` and `_`.
    #[error("Invalid option name: '{0}'.")]
    InvalidName(String),

    /// A `,` or `/` after an option is not followed by another option.
    #[error("Expected a second option after the separator: '{0}'.")]
    SecondOption(String),

    /// The option already has an alternate name.
    #[error("Option '{0}' already has an alternate name, cannot add '{1}'.")]
    AltName(String, String),

    /// Both names of an option pair already belong to two different options.
    #[error("Specified options are different: '{0}', '{1}'.")]
    DifferentOptions(String, String),

    /// A closing bracket without its matching opening bracket.
    #[error("Unbalanced '{0}'.")]
    Unbalanced(char),

    /// A group is still open at the end of its invocation.
    #[error("Unclosed '{0}'.")]
    Unclosed(char),

    /// A group containing nothing, such as `[]` or `()`.
    #[error("Empty group.")]
    EmptyGroup,

    /// A symbol with no meaning at its position.
    #[error("Unexpected '{0}'.")]
    UnexpectedSymbol(char),

    /// Single-quoted help text which does not follow an option.
    #[error("Help text '{0}' does not follow an option.")]
    StrayHelp(String),
}

/// A positional argument of the usage.
///
/// Operands are unique by name: repeating `<file>` across invocations refers to the same operand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operand {
    pub(crate) name: String,
    pub(crate) kind: OperandKind,
    pub(crate) repeat: bool,
}

impl Operand {
    pub(crate) fn new(name: impl Into<String>, kind: OperandKind) -> Self {
        Self {
            name: name.into(),
            kind,
            repeat: false,
        }
    }

    /// The name, without angle brackets.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether this is a literal or a variable.
    pub fn kind(&self) -> OperandKind {
        self.kind
    }

    /// Whether this operand was marked with `...` or `+` somewhere in the usage.
    pub fn is_repeat(&self) -> bool {
        self.repeat
    }

    pub(crate) fn text(&self) -> String {
        match self.kind {
            OperandKind::Literal => self.name.clone(),
            OperandKind::Variable => format!("<{}>", self.name),
        }
    }
}

/// A flag of the usage, with up to two names.
///
/// The primary name is never longer than the alternate name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionSpec {
    pub(crate) name: String,
    pub(crate) alt_name: Option<String>,
    pub(crate) arg_name: Option<String>,
    pub(crate) arg_optional: bool,
    pub(crate) repeat: bool,
    pub(crate) help: Option<String>,
    pub(crate) form: NameForm,
    pub(crate) synthesized: bool,
}

impl OptionSpec {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            alt_name: None,
            arg_name: None,
            arg_optional: false,
            repeat: false,
            help: None,
            form: NameForm::Primary,
            synthesized: false,
        }
    }

    pub(crate) fn reserved(
        name: impl Into<String>,
        alt_name: Option<&str>,
        help: impl Into<String>,
    ) -> Self {
        let mut option = Self::new(name);
        option.alt_name = alt_name.map(str::to_string);
        option.help = Some(help.into());
        option.form = NameForm::Both;
        option.synthesized = true;
        option
    }

    /// The primary name, without dashes.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The alternate name, without dashes.
    pub fn alt_name(&self) -> Option<&str> {
        self.alt_name.as_deref()
    }

    /// The name of the option's argument, if it takes one.
    pub fn argument(&self) -> Option<&str> {
        self.arg_name.as_deref()
    }

    /// Whether the option's argument may be omitted.
    pub fn is_argument_optional(&self) -> bool {
        self.arg_optional
    }

    /// Whether this option was marked with `...` or `+`, accumulating each of its arguments.
    pub fn is_repeat(&self) -> bool {
        self.repeat
    }

    /// The help text, from inline single quotes or the options section.
    pub fn help(&self) -> Option<&str> {
        self.help.as_deref()
    }

    /// Which names are shown when rendering the usage.
    pub fn form(&self) -> NameForm {
        self.form
    }

    /// Whether this is a reserved option added by the compiler (help, version or about).
    pub fn is_synthesized(&self) -> bool {
        self.synthesized
    }

    pub(crate) fn matches_name(&self, name: &str) -> bool {
        self.name == name || self.alt_name.as_deref() == Some(name)
    }

    /// Set the alternate name, swapping it into the primary slot when it is the shorter one.
    pub(crate) fn set_alt_name(&mut self, alt_name: impl Into<String>) -> Result<(), CompileError> {
        let alt_name = alt_name.into();

        if self.alt_name.is_some() {
            return Err(CompileError::AltName(self.text(), dashed(&alt_name)));
        }

        if alt_name.chars().count() < self.name.chars().count() {
            let primary = std::mem::replace(&mut self.name, alt_name);
            self.alt_name = Some(primary);

            if self.form == NameForm::Primary {
                self.form = NameForm::Alternate;
            }
        } else {
            self.alt_name = Some(alt_name);
        }

        Ok(())
    }

    /// The primary name with its dashes, for example `-x` or `--long`.
    pub(crate) fn text(&self) -> String {
        dashed(&self.name)
    }

    /// The option as rendered in a usage line, or `None` when hidden.
    pub(crate) fn spec_text(&self) -> Option<String> {
        let names = match (self.form, &self.alt_name) {
            (NameForm::Hidden, _) => return None,
            (NameForm::Both, Some(alt_name)) => {
                format!("{}/{}", dashed(&self.name), dashed(alt_name))
            }
            (NameForm::Alternate, Some(alt_name)) => dashed(alt_name),
            _ => dashed(&self.name),
        };

        Some(match (&self.arg_name, self.arg_optional) {
            (None, _) => names,
            (Some(arg_name), true) => format!("{names} [{arg_name}]"),
            (Some(arg_name), false) => format!("{names} <{arg_name}>"),
        })
    }
}

pub(crate) fn dashed(name: &str) -> String {
    if name.chars().count() > 1 {
        format!("--{name}")
    } else {
        format!("-{name}")
    }
}

/// A compiled usage text.
///
/// The grammar is immutable after compilation; every match works against its own value store.
///
/// ### Example
/// ```
/// # use argot_core as argot;
/// use argot::Grammar;
///
/// let grammar = Grammar::compile("Usage: prog [-v] <file>...").unwrap();
///
/// assert_eq!(grammar.program(), "prog");
/// assert_eq!(grammar.options().len(), 2);
/// assert_eq!(grammar.operands().count(), 1);
/// assert_eq!(grammar.invocation_spec(0).unwrap(), "prog [-v] <file>...");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grammar {
    pub(crate) program: String,
    pub(crate) graph: Graph,
    pub(crate) root: SequenceId,
    pub(crate) operands: Vec<Operand>,
    pub(crate) options: Vec<OptionSpec>,
    pub(crate) literals: Vec<OperandId>,
    pub(crate) variables: Vec<OperandId>,
    pub(crate) placeholder: Option<OperandId>,
    pub(crate) reserved: Option<NodeId>,
    pub(crate) letters: HashMap<char, OptionId>,
    pub(crate) warnings: Vec<String>,
    pub(crate) settings: Settings,
}

impl Grammar {
    /// Compile the usage text with the default settings.
    ///
    /// ### Example
    /// ```
    /// # use argot_core as argot;
    /// use argot::{CompileError, Grammar};
    ///
    /// assert_eq!(Grammar::compile("prog <file"), Err(CompileError::OperandTerminator("<file".to_string())));
    /// ```
    pub fn compile(usage: &str) -> Result<Self, CompileError> {
        Self::compile_with(usage, Settings::default())
    }

    pub(crate) fn compile_with(usage: &str, settings: Settings) -> Result<Self, CompileError> {
        Compiler::new(usage, settings).compile()
    }

    /// The program name, taken from the first word after `usage:`.
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Every option, in declaration order, followed by any reserved options.
    pub fn options(&self) -> &[OptionSpec] {
        &self.options
    }

    /// Every literal operand, followed by every variable operand.
    pub fn operands(&self) -> impl Iterator<Item = &Operand> + '_ {
        self.literals
            .iter()
            .chain(self.variables.iter())
            .map(|id| self.operand(*id))
    }

    /// The number of invocations, including the synthesized reserved invocation.
    pub fn invocation_count(&self) -> usize {
        self.invocations().count()
    }

    /// The text of one invocation, for example `prog [-a] <file>...`.
    pub fn invocation_spec(&self, index: usize) -> Option<String> {
        self.invocations()
            .nth(index)
            .map(|head| printer::invocation_text(self, head))
    }

    /// The usage of every invocation, wrapped to 80 columns.
    pub fn usage(&self) -> String {
        printer::usage_text(self)
    }

    /// Non-fatal problems found while compiling, such as duplicate option letters.
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub(crate) fn invocations(&self) -> Links<'_> {
        self.graph.south(self.graph.home(self.root))
    }

    pub(crate) fn spec_of(&self, head: NodeId) -> String {
        printer::invocation_text(self, head)
    }

    pub(crate) fn option(&self, id: OptionId) -> &OptionSpec {
        &self.options[id.0]
    }

    pub(crate) fn operand(&self, id: OperandId) -> &Operand {
        &self.operands[id.0]
    }

    pub(crate) fn find_option(&self, name: &str) -> Option<OptionId> {
        self.options
            .iter()
            .position(|option| option.matches_name(name))
            .map(OptionId)
    }

    pub(crate) fn letter(&self, letter: char) -> Option<OptionId> {
        self.letters.get(&letter).copied()
    }

    pub(crate) fn settings(&self) -> Settings {
        self.settings
    }
}
