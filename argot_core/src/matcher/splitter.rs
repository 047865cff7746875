use crate::constant::*;
use crate::grammar::graph::{NodeId, OptionId};
use crate::grammar::{Grammar, OptionSpec};
use crate::matcher::{Problem, ValueStore};
use crate::model::{Settings, StopKind};

#[cfg(feature = "tracing_debug")]
use tracing::debug;

/// How splitting an argument vector against one invocation may end early.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SplitError {
    /// A reserved option was given; matching ends without binding anything.
    Stop(StopKind),
    /// Only this invocation fails.
    Soft(Problem),
    /// The whole match fails.
    Hard(Problem),
}

/// The non-option tokens, in order, and the argument index where operands begin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Split {
    pub(crate) operands: Vec<String>,
    pub(crate) consumed: usize,
}

/// Separates the options of one invocation (with their arguments) from its operands.
pub(crate) struct Splitter<'g, 's> {
    grammar: &'g Grammar,
    start: Option<NodeId>,
    store: &'s mut ValueStore,
}

impl<'g, 's> Splitter<'g, 's> {
    pub(crate) fn new(grammar: &'g Grammar, head: NodeId, store: &'s mut ValueStore) -> Self {
        Self {
            grammar,
            start: grammar.graph.node(head).next,
            store,
        }
    }

    pub(crate) fn split(&mut self, tokens: &[&str]) -> Result<Split, SplitError> {
        let posix = self.grammar.settings().posix;
        let mut operands = Vec::default();
        let mut consumed = tokens.len();
        let mut index = 0;

        while index < tokens.len() {
            let token = tokens[index];
            index += 1;

            if token == "--" {
                if posix {
                    consumed = index;
                }

                operands.extend(tokens[index..].iter().map(|t| t.to_string()));
                break;
            }

            if token == "-" || !token.starts_with('-') {
                if posix {
                    consumed = index - 1;
                    operands.extend(tokens[index - 1..].iter().map(|t| t.to_string()));
                    break;
                }

                operands.push(token.to_string());
                continue;
            }

            index = match token.strip_prefix("--") {
                Some(body) => self.long(token, body, tokens, index)?,
                None => self.short(token, &token[1..], tokens, index)?,
            };
        }

        Ok(Split { operands, consumed })
    }

    fn long(
        &mut self,
        token: &str,
        body: &str,
        tokens: &[&str],
        index: usize,
    ) -> Result<usize, SplitError> {
        let (name, attached) = split_value(body);
        let id = match self.grammar.find_option(name) {
            Some(id) if name.chars().count() > 1 => id,
            _ => return Err(SplitError::Hard(Problem::UnknownOption(token.to_string()))),
        };
        self.activate(id)?;
        self.argument(id, attached, tokens, index)
    }

    // `-x`, `-x=value`, `-xvalue`, a letter group `-xyz`, or a single-dash long name `-name`.
    fn short(
        &mut self,
        token: &str,
        body: &str,
        tokens: &[&str],
        index: usize,
    ) -> Result<usize, SplitError> {
        let grammar = self.grammar;
        let (name, attached) = split_value(body);
        let mut letters = name.chars();

        match (letters.next(), letters.next()) {
            (None, _) => Err(SplitError::Hard(Problem::UnknownOption(token.to_string()))),
            (Some(letter), None) => {
                let id = grammar
                    .letter(letter)
                    .ok_or_else(|| SplitError::Hard(Problem::UnknownOption(token.to_string())))?;
                self.activate(id)?;
                self.argument(id, attached, tokens, index)
            }
            _ => {
                let group = attached.is_none()
                    && name.chars().all(|letter| {
                        grammar
                            .letter(letter)
                            .map_or(false, |id| grammar.option(id).argument().is_none())
                    });

                match grammar.find_option(name) {
                    Some(_) if group => {
                        Err(SplitError::Hard(Problem::Ambiguous(token.to_string())))
                    }
                    Some(id) => {
                        self.activate(id)?;
                        self.argument(id, attached, tokens, index)
                    }
                    None => self.letters(body, name, attached, tokens, index),
                }
            }
        }
    }

    // Each letter is activated in turn; the first which takes an argument claims the rest of the token.
    fn letters(
        &mut self,
        body: &str,
        name: &str,
        attached: Option<&str>,
        tokens: &[&str],
        index: usize,
    ) -> Result<usize, SplitError> {
        let grammar = self.grammar;
        let mut last = None;

        for (offset, letter) in name.char_indices() {
            let id = grammar
                .letter(letter)
                .ok_or_else(|| SplitError::Hard(Problem::UnknownOption(format!("-{letter}"))))?;
            self.activate(id)?;

            if grammar.option(id).argument().is_some() {
                let rest = &body[offset + letter.len_utf8()..];
                let attached = if rest.is_empty() {
                    None
                } else {
                    Some(rest.strip_prefix('=').or_else(|| rest.strip_prefix(':')).unwrap_or(rest))
                };
                return self.argument(id, attached, tokens, index);
            }

            last = Some(id);
        }

        match (last, attached) {
            (Some(id), Some(value)) if !value.is_empty() => Err(SplitError::Soft(
                Problem::UnexpectedArgument(grammar.option(id).text()),
            )),
            _ => Ok(index),
        }
    }

    fn activate(&mut self, id: OptionId) -> Result<(), SplitError> {
        let grammar = self.grammar;
        let option = grammar.option(id);

        if let Some(kind) = stop_kind(grammar.settings(), option) {
            return Err(SplitError::Stop(kind));
        }

        if grammar.graph.find_option(self.start, &|other| other == id).is_none() {
            return Err(SplitError::Soft(Problem::NotInInvocation(option.text())));
        }

        let mut exclusions = Vec::default();
        grammar.graph.exclusions(self.start, id, &mut exclusions);

        if let Some(other) = exclusions
            .into_iter()
            .find(|other| *other != id && self.store.option(*other).has())
        {
            return Err(SplitError::Soft(Problem::MutuallyExclusive(
                grammar.option(other).text(),
                option.text(),
            )));
        }

        #[cfg(feature = "tracing_debug")]
        {
            debug!("Accepted option '{}'.", option.text());
        }

        self.store.accept(id);
        Ok(())
    }

    fn argument(
        &mut self,
        id: OptionId,
        attached: Option<&str>,
        tokens: &[&str],
        index: usize,
    ) -> Result<usize, SplitError> {
        let grammar = self.grammar;
        let option = grammar.option(id);
        let mut index = index;

        if option.argument().is_none() {
            return match attached {
                Some(value) if !value.is_empty() => {
                    Err(SplitError::Soft(Problem::UnexpectedArgument(option.text())))
                }
                _ => Ok(index),
            };
        }

        let value = match (option.is_argument_optional(), attached) {
            (_, Some(value)) if !value.is_empty() => Some(value.to_string()),
            // `--name=` promises the value in the next token.
            (true, Some(_)) => take(tokens, &mut index),
            // An optional argument is only taken from a following token after a separator token.
            (true, None) => {
                if tokens.get(index).map_or(false, |token| is_separator(token)) {
                    index += 1;
                    take(tokens, &mut index)
                } else {
                    None
                }
            }
            (false, _) => {
                while tokens.get(index).map_or(false, |token| is_separator(token)) {
                    index += 1;
                }

                take(tokens, &mut index)
            }
        };

        match value {
            Some(value) => self.set_argument(id, value)?,
            None if !option.is_argument_optional() => {
                return Err(SplitError::Soft(Problem::MissingArgument(option.text())));
            }
            None => {}
        }

        Ok(index)
    }

    fn set_argument(&mut self, id: OptionId, value: String) -> Result<(), SplitError> {
        let grammar = self.grammar;
        let option = grammar.option(id);

        if option.is_repeat() {
            self.store.add_argument(id, value);
        } else if self.store.option(id).values.is_empty() || grammar.settings().allow_overwrite {
            self.store.replace_argument(id, value);
        } else {
            return Err(SplitError::Soft(Problem::RepeatedArgument(option.text())));
        }

        Ok(())
    }
}

fn stop_kind(settings: Settings, option: &OptionSpec) -> Option<StopKind> {
    if option.matches_name(HELP_NAME) && !settings.suppress_help {
        Some(StopKind::Help)
    } else if option.matches_name(VERSION_NAME) && settings.version {
        Some(StopKind::Version)
    } else if option.matches_name(ABOUT_NAME) && settings.about {
        Some(StopKind::About)
    } else {
        None
    }
}

fn split_value(body: &str) -> (&str, Option<&str>) {
    match body.find(|c: char| c == '=' || c == ':') {
        Some(at) => (&body[..at], Some(&body[at + 1..])),
        None => (body, None),
    }
}

fn is_separator(token: &str) -> bool {
    token.is_empty() || token == "=" || token == ":"
}

fn take(tokens: &[&str], index: &mut usize) -> Option<String> {
    let token = tokens.get(*index)?;
    *index += 1;
    Some(token.to_string())
}
