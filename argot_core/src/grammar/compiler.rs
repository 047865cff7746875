use std::collections::HashMap;

use crate::constant::*;
use crate::grammar::graph::*;
use crate::grammar::tokens::{Quote, Token, Tokenizer};
use crate::grammar::{CompileError, Grammar, Operand, OptionSpec};
use crate::model::{NameForm, OperandKind, Settings};

#[cfg(feature = "tracing_debug")]
use tracing::{debug, warn};

#[derive(Debug, PartialEq, Eq)]
enum Section {
    Invocation,
    Options,
    End,
}

// An open group: where it hangs in its parent, and where the parent's cursor resumes when the group is an alternative.
#[derive(Debug)]
struct Frame {
    parent: SequenceId,
    node: NodeId,
    square: bool,
    resume: Option<NodeId>,
}

pub(crate) struct Compiler<'t> {
    tokens: Tokenizer<'t>,
    settings: Settings,
    program: String,
    program_operand: Option<OperandId>,
    graph: Graph,
    root: SequenceId,
    sequence: SequenceId,
    head: Option<NodeId>,
    stack: Vec<Frame>,
    operands: Vec<Operand>,
    options: Vec<OptionSpec>,
    literals: Vec<OperandId>,
    variables: Vec<OperandId>,
    placeholder: Option<OperandId>,
    reserved: Option<NodeId>,
    letters: HashMap<char, OptionId>,
    warnings: Vec<String>,
    exor: bool,
    option: Option<OptionId>,
    operand: Option<OperandId>,
    last_node: Option<NodeId>,
    // An inlined alternation just closed, whose members a following `...` repeats.
    alternation: Option<NodeId>,
    in_section: bool,
    new_option: bool,
}

impl<'t> Compiler<'t> {
    pub(crate) fn new(usage: &'t str, settings: Settings) -> Self {
        let mut graph = Graph::default();
        let root = graph.new_sequence();

        Self {
            tokens: Tokenizer::new(usage),
            settings,
            program: String::default(),
            program_operand: None,
            graph,
            root,
            sequence: root,
            head: None,
            stack: Vec::default(),
            operands: Vec::default(),
            options: Vec::default(),
            literals: Vec::default(),
            variables: Vec::default(),
            placeholder: None,
            reserved: None,
            letters: HashMap::default(),
            warnings: Vec::default(),
            exor: false,
            option: None,
            operand: None,
            last_node: None,
            alternation: None,
            in_section: false,
            new_option: false,
        }
    }

    pub(crate) fn compile(mut self) -> Result<Grammar, CompileError> {
        self.program = self.header()?;
        let mut section = Section::Invocation;

        while section == Section::Invocation {
            self.start_invocation();
            section = self.invocation()?;
        }

        if section == Section::Options {
            self.options_section()?;
        }

        self.expand_placeholders();
        self.index_letters();
        self.synthesize_reserved();

        Ok(Grammar {
            program: self.program,
            graph: self.graph,
            root: self.root,
            operands: self.operands,
            options: self.options,
            literals: self.literals,
            variables: self.variables,
            placeholder: self.placeholder,
            reserved: self.reserved,
            letters: self.letters,
            warnings: self.warnings,
            settings: self.settings,
        })
    }

    fn header(&mut self) -> Result<String, CompileError> {
        let mut token = self.tokens.next().ok_or(CompileError::MissingUsage)?;

        if matches!(&token, Token::Word(word) if word.eq_ignore_ascii_case(USAGE_KEYWORD)) {
            token = self
                .tokens
                .next()
                .ok_or(CompileError::MissingProgram(String::default()))?;
        }

        if token.is_symbol(':') {
            token = self
                .tokens
                .next()
                .ok_or(CompileError::MissingProgram(String::default()))?;
        }

        match token {
            Token::Word(word) => Ok(word),
            other => Err(CompileError::MissingProgram(other.text())),
        }
    }

    fn start_invocation(&mut self) {
        let program = self.program_operand();
        self.graph.go_home(self.root);
        self.graph.end_south(self.root);
        let head = self
            .graph
            .add_south(self.root, Entry::Operand(program), false);
        self.sequence = self.root;
        self.head = Some(head);
        self.last_node = Some(head);
        self.alternation = None;
        self.exor = false;
        self.option = None;
        self.operand = None;

        #[cfg(feature = "tracing_debug")]
        {
            debug!("Compiling an invocation of '{}'.", self.program);
        }
    }

    fn program_operand(&mut self) -> OperandId {
        match self.program_operand {
            Some(id) => id,
            None => {
                let id = self.push_operand(Operand::new(&self.program, OperandKind::Literal));
                self.program_operand = Some(id);
                id
            }
        }
    }

    fn invocation(&mut self) -> Result<Section, CompileError> {
        loop {
            let token = match self.tokens.next() {
                Some(token) => token,
                None => {
                    self.close_invocation()?;
                    return Ok(Section::End);
                }
            };

            match token {
                Token::Word(word) if word == self.program => {
                    self.close_invocation()?;
                    return Ok(Section::Invocation);
                }
                Token::Word(word) if word.eq_ignore_ascii_case(OPTIONS_KEYWORD) => {
                    self.close_invocation()?;
                    return Ok(Section::Options);
                }
                Token::Word(word) => self.literal(word),
                Token::Quoted(Quote::Double, text) => self.literal(text),
                Token::Quoted(Quote::Single, help) => match self.option {
                    Some(id) => self.options[id.0].help = Some(help),
                    None => return Err(CompileError::StrayHelp(help)),
                },
                Token::Repeat => self.repeat(),
                Token::Symbol('[') => self.open_square(),
                Token::Symbol('(') => self.start_group(false),
                Token::Symbol(c @ (']' | ')')) => self.end_group(c)?,
                Token::Symbol('<') => self.variable()?,
                Token::Symbol('-') => self.single_dash()?,
                Token::Symbol('|') => self.alternative()?,
                Token::Symbol(c) => return Err(CompileError::UnexpectedSymbol(c)),
                Token::LineBreak => {}
            }
        }
    }

    fn close_invocation(&mut self) -> Result<(), CompileError> {
        match self.stack.last() {
            Some(frame) => Err(CompileError::Unclosed(if frame.square { '[' } else { '(' })),
            None => Ok(()),
        }
    }

    fn add_entry(&mut self, entry: Entry, optional: bool) -> NodeId {
        let node = if self.exor {
            self.exor = false;
            self.graph.append_south(self.sequence, entry, optional)
        } else {
            self.graph.add_east(self.sequence, entry, optional)
        };
        self.last_node = Some(node);
        self.alternation = None;
        node
    }

    // Options are optional anywhere inside `[...]`, operands only directly inside it.
    fn in_square(&self) -> bool {
        self.stack.iter().any(|frame| frame.square)
    }

    fn directly_in_square(&self) -> bool {
        self.stack.last().map_or(false, |frame| frame.square)
    }

    fn push_operand(&mut self, operand: Operand) -> OperandId {
        self.operands.push(operand);
        OperandId(self.operands.len() - 1)
    }

    fn find_option(&self, name: &str) -> Option<OptionId> {
        self.options
            .iter()
            .position(|option| option.matches_name(name))
            .map(OptionId)
    }

    fn literal(&mut self, name: String) {
        self.option = None;
        let existing = self
            .literals
            .iter()
            .find(|id| self.operands[id.0].name == name)
            .copied();
        let id = match existing {
            Some(id) => id,
            None => {
                let id = self.push_operand(Operand::new(name, OperandKind::Literal));
                self.literals.push(id);
                id
            }
        };
        self.operand = Some(id);
        let optional = self.directly_in_square();
        self.add_entry(Entry::Operand(id), optional);
    }

    fn variable(&mut self) -> Result<(), CompileError> {
        self.option = None;
        let name = self.name_token();

        match (name, self.tokens.next()) {
            (Some(name), Some(Token::Symbol('>'))) => {
                let existing = self
                    .variables
                    .iter()
                    .find(|id| self.operands[id.0].name == name)
                    .copied();
                let id = match existing {
                    Some(id) => id,
                    None => {
                        let id = self.push_operand(Operand::new(name, OperandKind::Variable));
                        self.variables.push(id);
                        id
                    }
                };
                self.operand = Some(id);
                let optional = self.directly_in_square();
                self.add_entry(Entry::Operand(id), optional);
                Ok(())
            }
            (name, found) => Err(CompileError::OperandTerminator(format!(
                "<{}{}",
                name.unwrap_or_default(),
                text_of(found)
            ))),
        }
    }

    fn repeat(&mut self) {
        if let Some(node) = self.alternation {
            let members: Vec<NodeId> = self.graph.south(node).collect();

            for member in members {
                self.graph.node_mut(member).repeat = true;

                match self.graph.node(member).entry {
                    Entry::Option(id) => self.options[id.0].repeat = true,
                    Entry::Operand(id) => self.operands[id.0].repeat = true,
                    Entry::Group(_) => {}
                }
            }

            return;
        }

        if let Some(id) = self.option {
            self.options[id.0].repeat = true;
        } else if let Some(id) = self.operand {
            self.operands[id.0].repeat = true;
        }

        if let Some(node) = self.last_node {
            self.graph.node_mut(node).repeat = true;
        }
    }

    fn alternative(&mut self) -> Result<(), CompileError> {
        let current = self.graph.current(self.sequence);

        if self.exor || current.is_none() || current == self.head {
            return Err(CompileError::UnexpectedSymbol('|'));
        }

        self.exor = true;
        Ok(())
    }

    fn open_square(&mut self) {
        let mut lookahead = Vec::default();

        if let Some(first) = self.tokens.next() {
            let keyword = matches!(
                &first,
                Token::Word(word) if word.eq_ignore_ascii_case(OPTIONS_KEYWORD)
            );
            lookahead.push(first);

            if keyword {
                match self.tokens.next() {
                    Some(Token::Symbol(']')) => {
                        self.placeholder_options();
                        return;
                    }
                    Some(token) => lookahead.push(token),
                    None => {}
                }
            }
        }

        self.tokens.unread(lookahead);
        self.start_group(true);
    }

    fn placeholder_options(&mut self) {
        let id = match self.placeholder {
            Some(id) => id,
            None => {
                let id = self.push_operand(Operand::new(OPTIONS_KEYWORD, OperandKind::Literal));
                self.placeholder = Some(id);
                id
            }
        };
        self.option = None;
        self.operand = None;
        self.add_entry(Entry::Operand(id), true);
    }

    fn start_group(&mut self, square: bool) {
        let group = self.graph.new_sequence();
        let parent = self.sequence;
        let resume = if self.exor {
            self.graph.current(parent)
        } else {
            None
        };
        let optional = square || self.directly_in_square();
        let node = self.add_entry(Entry::Group(group), optional);
        self.stack.push(Frame {
            parent,
            node,
            square,
            resume,
        });
        self.sequence = group;
        self.option = None;
        self.operand = None;
    }

    fn end_group(&mut self, closing: char) -> Result<(), CompileError> {
        let frame = self
            .stack
            .pop()
            .ok_or(CompileError::Unbalanced(closing))?;

        if frame.square != (closing == ']') {
            return Err(CompileError::Unbalanced(closing));
        }

        let group = self.sequence;
        self.sequence = frame.parent;
        let home = self.graph.home(group).ok_or(CompileError::EmptyGroup)?;
        // An alternative keeps its group unless the group is a single node, since alternatives have no successors.
        let inline = self.graph.base_count(group) <= 1
            && (frame.resume.is_none() || self.graph.node(home).next.is_none());

        if inline {
            self.graph.transfer(frame.node, group);
        }

        match frame.resume {
            Some(resume) => {
                self.graph.set_current(frame.parent, resume);
                self.last_node = Some(frame.node);
            }
            None => {
                self.graph.set_current(frame.parent, frame.node);

                if inline {
                    self.graph.end_east(frame.parent);
                }

                self.last_node = self.graph.current(frame.parent);
            }
        }

        self.option = None;
        self.operand = None;

        self.alternation = None;

        if let (true, Some(last)) = (inline, self.last_node) {
            match self.graph.node(last).entry {
                Entry::Option(id) => self.option = Some(id),
                Entry::Operand(id) => self.operand = Some(id),
                Entry::Group(_) => {}
            }

            if self.graph.south(last).nth(1).is_some() {
                self.alternation = Some(last);
            }
        }

        Ok(())
    }

    fn name_token(&mut self) -> Option<String> {
        match self.tokens.next() {
            Some(Token::Word(word)) if valid_name(&word) => Some(word),
            _ => {
                self.tokens.push_back();
                None
            }
        }
    }

    fn long_name(&mut self) -> Result<String, CompileError> {
        match self.tokens.next() {
            Some(Token::Word(word)) if valid_name(&word) => Ok(word),
            found => Err(CompileError::InvalidName(format!("--{}", text_of(found)))),
        }
    }

    fn single_dash(&mut self) -> Result<(), CompileError> {
        self.operand = None;

        match self.tokens.next() {
            Some(Token::Symbol('-')) => {
                let name = self.long_name()?;
                let id = self.add_option(&name);
                self.after_option(id)
            }
            Some(Token::Word(word)) if word.chars().count() > 1 => self.letter_group(&word),
            Some(Token::Word(word)) => {
                letter(&word)?;
                let id = self.add_option(&word);
                self.after_option(id)
            }
            found => Err(CompileError::InvalidLetter(format!("-{}", text_of(found)))),
        }
    }

    fn letter_group(&mut self, letters: &str) -> Result<(), CompileError> {
        let mut last = None;

        for c in letters.chars() {
            if !c.is_alphanumeric() {
                return Err(CompileError::InvalidLetter(format!("-{c}")));
            }

            last = Some(self.add_option(&c.to_string()));
        }

        match last {
            Some(id) => self.after_option(id),
            None => Ok(()),
        }
    }

    fn add_option(&mut self, name: &str) -> OptionId {
        let id = match self.find_option(name) {
            Some(id) => id,
            None => {
                #[cfg(feature = "tracing_debug")]
                {
                    debug!("Registering option '{name}'.");
                }

                self.options.push(OptionSpec::new(name));
                OptionId(self.options.len() - 1)
            }
        };
        let optional = self.in_square();
        self.option = Some(id);
        self.add_entry(Entry::Option(id), optional);
        id
    }

    fn after_option(&mut self, id: OptionId) -> Result<(), CompileError> {
        match self.tokens.next() {
            Some(Token::Symbol('[')) => match self.bracketed_argument() {
                Some(name) => self.set_argument(id, name, true),
                None => {
                    self.tokens.push(Token::Symbol('['));
                    return Ok(());
                }
            },
            Some(Token::Symbol('<')) => {
                let name = self.name_token();

                match (name, self.tokens.next()) {
                    (Some(name), Some(Token::Symbol('>'))) => self.set_argument(id, name, false),
                    (name, found) => {
                        return Err(CompileError::ArgumentTerminator(format!(
                            "<{}{}",
                            name.unwrap_or_default(),
                            text_of(found)
                        )));
                    }
                }
            }
            Some(Token::Symbol(',' | '/')) => return self.second_name(id),
            Some(_) => {
                self.tokens.push_back();
                return Ok(());
            }
            None => return Ok(()),
        }

        // A second name may also follow the argument, as in `-o <file>, --output <file>`.
        if matches!(self.tokens.peek(), Some(Token::Symbol(',' | '/'))) {
            self.tokens.next();
            return self.second_name(id);
        }

        Ok(())
    }

    fn set_argument(&mut self, id: OptionId, name: String, optional: bool) {
        let option = &mut self.options[id.0];
        option.arg_name = Some(name);
        option.arg_optional = optional;
    }

    // Accepts `name]` or `<name>]`; anything else is unread so the `[` opens a group instead.
    fn bracketed_argument(&mut self) -> Option<String> {
        let mut lookahead = Vec::default();
        let angle = self.lookahead_symbol('<', &mut lookahead);
        let name = match self.tokens.next() {
            Some(Token::Word(word))
                if valid_name(&word) && !word.eq_ignore_ascii_case(OPTIONS_KEYWORD) =>
            {
                lookahead.push(Token::Word(word.clone()));
                Some(word)
            }
            Some(token) => {
                lookahead.push(token);
                None
            }
            None => None,
        };

        if name.is_some()
            && (!angle || self.lookahead_symbol('>', &mut lookahead))
            && self.lookahead_symbol(']', &mut lookahead)
        {
            return name;
        }

        self.tokens.unread(lookahead);
        None
    }

    fn lookahead_symbol(&mut self, symbol: char, lookahead: &mut Vec<Token>) -> bool {
        match self.tokens.next() {
            Some(token) if token.is_symbol(symbol) => {
                lookahead.push(token);
                true
            }
            Some(_) => {
                self.tokens.push_back();
                false
            }
            None => false,
        }
    }

    fn second_name(&mut self, id: OptionId) -> Result<(), CompileError> {
        let name = match self.tokens.next() {
            Some(Token::Symbol('-')) => match self.tokens.next() {
                Some(Token::Symbol('-')) => self.long_name()?,
                Some(Token::Word(word)) => {
                    letter(&word)?;
                    word
                }
                found => return Err(CompileError::InvalidLetter(format!("-{}", text_of(found)))),
            },
            found => {
                return Err(CompileError::SecondOption(format!(
                    "{}, {}",
                    self.options[id.0].text(),
                    text_of(found)
                )));
            }
        };

        let id = match self.find_option(&name) {
            None => {
                self.options[id.0].set_alt_name(name)?;
                id
            }
            Some(other) if other == id => id,
            Some(other) if self.new_option && id.0 + 1 == self.options.len() => {
                // The first name was never seen before: fold it into the existing option.
                self.new_option = false;
                let first = self
                    .options
                    .pop()
                    .unwrap_or_else(|| unreachable!("internal error - new option must be last"));
                let existing = &mut self.options[other.0];
                existing.set_alt_name(first.name)?;

                if existing.arg_name.is_none() {
                    existing.arg_name = first.arg_name;
                    existing.arg_optional = first.arg_optional;
                }

                self.option = Some(other);
                other
            }
            Some(other) => {
                return Err(CompileError::DifferentOptions(
                    self.options[id.0].text(),
                    self.options[other.0].text(),
                ));
            }
        };

        if !self.in_section {
            self.options[id.0].form = NameForm::Both;
        }

        self.after_option(id)
    }

    fn options_section(&mut self) -> Result<(), CompileError> {
        self.in_section = true;
        self.tokens.set_filter_line_breaks(false);
        self.tokens.set_quotes(false);

        if !matches!(self.tokens.next(), Some(Token::Symbol(':'))) {
            self.tokens.push_back();
        }

        let mut line_start = true;

        while let Some(token) = self.tokens.next() {
            match token {
                Token::LineBreak => line_start = true,
                Token::Symbol('-') if line_start => self.option_entry()?,
                _ => line_start = false,
            }
        }

        Ok(())
    }

    // One line of the options section, such as `-o, --output <file>  where to write`.
    fn option_entry(&mut self) -> Result<(), CompileError> {
        let name = match self.tokens.next() {
            Some(Token::Symbol('-')) => self.long_name()?,
            Some(Token::Word(word)) => {
                letter(&word)?;
                word
            }
            found => return Err(CompileError::InvalidLetter(format!("-{}", text_of(found)))),
        };

        let id = match self.find_option(&name) {
            Some(id) => {
                self.new_option = false;
                id
            }
            None => {
                self.new_option = true;
                self.options.push(OptionSpec::new(name));
                OptionId(self.options.len() - 1)
            }
        };
        self.option = Some(id);
        self.after_option(id)?;
        let id = self.option.unwrap_or(id);
        let node = if self.new_option {
            self.new_option = false;
            self.register(id)
        } else {
            None
        };

        let mut token = self.tokens.next();

        if token == Some(Token::Repeat) {
            self.options[id.0].repeat = true;

            if let Some(node) = node {
                self.graph.node_mut(node).repeat = true;
            }

            token = self.tokens.next();
        }

        self.description(id, token);
        Ok(())
    }

    // Options first declared in the options section join the first invocation, unless `[options]` will place them.
    fn register(&mut self, id: OptionId) -> Option<NodeId> {
        let option = &mut self.options[id.0];

        if self.placeholder.is_some() {
            option.form = NameForm::Hidden;
            return None;
        }

        option.form = if option.alt_name.is_some() {
            NameForm::Both
        } else {
            NameForm::Primary
        };

        let head = self.graph.go_home(self.root)?;
        let mut at = head;

        for node in self.graph.east(self.graph.node(head).next) {
            match self.graph.node(node).entry {
                Entry::Option(_) => at = node,
                _ => break,
            }
        }

        #[cfg(feature = "tracing_debug")]
        {
            debug!("Registering option '{}' from the options section.", self.options[id.0].name);
        }

        Some(self.graph.insert_after(at, Entry::Option(id), true))
    }

    fn description(&mut self, id: OptionId, first: Option<Token>) {
        self.tokens.set_trim(false);
        let mut help = String::default();
        let mut token = first;

        while let Some(next) = token {
            if next == Token::LineBreak {
                break;
            }

            help.push_str(&next.text());
            token = self.tokens.next();
        }

        self.tokens.set_trim(true);
        let help = help.trim();

        if !help.is_empty() {
            self.options[id.0].help = Some(help.to_string());
        }
    }

    fn expand_placeholders(&mut self) {
        let placeholder = match self.placeholder {
            Some(placeholder) => placeholder,
            None => return,
        };
        let heads: Vec<NodeId> = self.graph.south(self.graph.home(self.root)).collect();

        for head in heads {
            let start = self.graph.node(head).next;
            let mut sites = Vec::default();
            self.placeholder_sites(start, placeholder, &mut sites);

            for site in sites {
                let mut at = site;

                for index in 0..self.options.len() {
                    let id = OptionId(index);

                    if self.graph.find_option(start, &|option| option == id).is_none() {
                        at = self.graph.insert_after(at, Entry::Option(id), true);
                    }
                }
            }
        }
    }

    fn placeholder_sites(
        &self,
        start: Option<NodeId>,
        placeholder: OperandId,
        out: &mut Vec<NodeId>,
    ) {
        for node in self.graph.east(start) {
            for member in self.graph.south(node) {
                match self.graph.node(member).entry {
                    Entry::Operand(id) if id == placeholder => out.push(member),
                    Entry::Group(group) => {
                        self.placeholder_sites(self.graph.home(group), placeholder, out)
                    }
                    _ => {}
                }
            }
        }
    }

    // Option names are unique, so each letter belongs to one option.
    fn index_letters(&mut self) {
        for (index, option) in self.options.iter().enumerate() {
            for name in std::iter::once(&option.name).chain(option.alt_name.iter()) {
                let mut chars = name.chars();

                if let (Some(letter), None) = (chars.next(), chars.next()) {
                    self.letters.insert(letter, OptionId(index));
                }
            }
        }
    }

    // Help, and version/about when enabled, get their own invocation unless the usage declares them.
    fn synthesize_reserved(&mut self) {
        let mut reserved = Vec::default();

        if self.find_option(HELP_NAME).is_none() {
            reserved.push((HELP_LETTER, HELP_NAME, HELP_MESSAGE));
        }

        if self.settings.version && self.find_option(VERSION_NAME).is_none() {
            reserved.push((VERSION_LETTER, VERSION_NAME, VERSION_MESSAGE));
        }

        if self.settings.about && self.find_option(ABOUT_NAME).is_none() {
            reserved.push((ABOUT_LETTER, ABOUT_NAME, ABOUT_MESSAGE));
        }

        if reserved.is_empty() {
            return;
        }

        let program = self.program_operand();
        self.graph.go_home(self.root);
        self.graph.end_south(self.root);
        let head = self
            .graph
            .add_south(self.root, Entry::Operand(program), false);
        self.reserved = Some(head);

        for (index, (letter, name, help)) in reserved.into_iter().enumerate() {
            let key = letter.chars().next().unwrap_or_default();
            let option = if self.letters.contains_key(&key) || self.find_option(letter).is_some() {
                let warning = format!("Option letter -{letter} is taken, use --{name} instead.");

                #[cfg(feature = "tracing_debug")]
                {
                    warn!("{warning}");
                }

                self.warnings.push(warning);
                OptionSpec::reserved(name, None, help)
            } else {
                OptionSpec::reserved(letter, Some(name), help)
            };
            let single = option.alt_name.is_some();
            self.options.push(option);
            let id = OptionId(self.options.len() - 1);

            if single {
                self.letters.insert(key, id);
            }

            if index == 0 {
                self.graph.add_east(self.root, Entry::Option(id), false);
            } else {
                self.graph.append_south(self.root, Entry::Option(id), false);
            }
        }
    }
}

fn text_of(token: Option<Token>) -> String {
    token.map(|token| token.text()).unwrap_or_default()
}

fn valid_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
}

fn letter(name: &str) -> Result<(), CompileError> {
    let mut chars = name.chars();

    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_alphanumeric() => Ok(()),
        _ => Err(CompileError::InvalidLetter(format!("-{name}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn compile(usage: &str) -> Grammar {
        Grammar::compile(usage).unwrap()
    }

    fn heads(grammar: &Grammar) -> Vec<NodeId> {
        grammar.invocations().collect()
    }

    // The entries along the chain of an invocation, rendered as text for readability.
    fn chain(grammar: &Grammar, start: Option<NodeId>) -> Vec<String> {
        grammar
            .graph
            .east(start)
            .map(|node| {
                grammar
                    .graph
                    .south(node)
                    .map(|member| entry_text(grammar, member))
                    .collect::<Vec<String>>()
                    .join("|")
            })
            .collect()
    }

    fn entry_text(grammar: &Grammar, node: NodeId) -> String {
        let node = grammar.graph.node(node);
        let text = match node.entry {
            Entry::Operand(id) => grammar.operand(id).text(),
            Entry::Option(id) => grammar.option(id).text(),
            Entry::Group(group) => {
                format!("({})", chain(grammar, grammar.graph.home(group)).join(" "))
            }
        };
        let text = if node.optional { format!("?{text}") } else { text };

        if node.repeat {
            format!("{text}*")
        } else {
            text
        }
    }

    fn invocation(grammar: &Grammar, index: usize) -> Vec<String> {
        let head = heads(grammar)[index];
        chain(grammar, grammar.graph.node(head).next)
    }

    #[test]
    fn single_invocation() {
        // Execute
        let grammar = compile("Usage: prog find <pattern> <file>...");

        // Verify
        assert_eq!(grammar.program(), "prog");
        assert_eq!(
            invocation(&grammar, 0),
            vec!["find", "<pattern>", "<file>*"]
        );
        assert_eq!(grammar.literals.len(), 1);
        assert_eq!(grammar.variables.len(), 2);
        let file = grammar.operand(grammar.variables[1]);
        assert_eq!(file.name(), "file");
        assert!(file.is_repeat());
        assert_eq!(grammar.invocation_count(), 2);
        assert_eq!(grammar.reserved, Some(heads(&grammar)[1]));
        assert_eq!(invocation(&grammar, 1), vec!["-h"]);
    }

    #[rstest]
    #[case("prog a", "prog")]
    #[case("usage prog a", "prog")]
    #[case("USAGE: prog a", "prog")]
    #[case(": prog a", "prog")]
    #[case("usage: my-prog a", "my-prog")]
    fn header(#[case] usage: &str, #[case] expected: &str) {
        // Execute
        let grammar = compile(usage);

        // Verify
        assert_eq!(grammar.program(), expected);
        assert_eq!(invocation(&grammar, 0), vec!["a"]);
    }

    #[test]
    fn multiple_invocations() {
        // Execute
        let grammar = compile(
            "Usage:
                prog add <item>
                prog remove <item> | prog list",
        );

        // Verify
        assert_eq!(grammar.invocation_count(), 4);
        assert_eq!(invocation(&grammar, 0), vec!["add", "<item>"]);
        assert_eq!(invocation(&grammar, 1), vec!["remove", "<item>"]);
        assert_eq!(invocation(&grammar, 2), vec!["list"]);
        assert_eq!(grammar.variables.len(), 1);
        assert_eq!(grammar.literals.len(), 3);
    }

    #[rstest]
    #[case("prog [-a | -b]", vec!["?-a|?-b"])]
    #[case("prog (-a | -b)", vec!["-a|-b"])]
    #[case("prog [-a -b] <x>", vec!["?-a", "?-b", "<x>"])]
    #[case("prog [<x>]", vec!["?<x>"])]
    #[case("prog [<x> <y>]", vec!["?(?<x> ?<y>)"])]
    #[case("prog [-x <y>]", vec!["?-x", "?<y>"])]
    #[case("prog [(a b)]", vec!["?(a b)"])]
    #[case("prog [a (b c)]", vec!["?(?a ?(b c))"])]
    #[case("prog (a b) c", vec!["(a b)", "c"])]
    #[case("prog a | b c", vec!["a|b", "c"])]
    #[case("prog a | (b c) d", vec!["a|(b c)", "d"])]
    #[case("prog a | (b) d", vec!["a|b", "d"])]
    #[case("prog a | [-x -y]", vec!["a|?(?-x ?-y)"])]
    #[case("prog [a | b]...", vec!["?a*|?b*"])]
    #[case("prog (a | b)... <x>", vec!["a*|b*", "<x>"])]
    #[case("prog (<x> <y>)...", vec!["(<x> <y>)*"])]
    #[case("prog [-v]...", vec!["?-v*"])]
    #[case("prog ((a b))", vec!["(a b)"])]
    #[case("prog \"two words\"", vec!["two words"])]
    #[case("prog -abc", vec!["-a", "-b", "-c"])]
    fn groups(#[case] usage: &str, #[case] expected: Vec<&str>) {
        // Execute
        let grammar = compile(usage);

        // Verify
        assert_eq!(invocation(&grammar, 0), expected);
    }

    #[rstest]
    #[case("prog [a | b]...", vec![true, true, false])]
    #[case("prog [a | b] c...", vec![false, false, true])]
    #[case("prog a | b...", vec![false, true, false])]
    fn alternation_repeat(#[case] usage: &str, #[case] expected: Vec<bool>) {
        // Execute
        let grammar = compile(usage);

        // Verify
        let repeats: Vec<bool> = ["a", "b", "c"]
            .iter()
            .map(|name| {
                grammar
                    .operands
                    .iter()
                    .any(|operand| operand.name() == *name && operand.is_repeat())
            })
            .collect();
        assert_eq!(repeats, expected);
    }

    #[rstest]
    #[case("prog -o <file>", Some("file"), false)]
    #[case("prog -o [file]", Some("file"), true)]
    #[case("prog -o [<file>]", Some("file"), true)]
    #[case("prog --output <out-file>", Some("out-file"), false)]
    #[case("prog -o [a b]", None, false)]
    #[case("prog -o [options]", None, false)]
    #[case("prog -o", None, false)]
    fn option_argument(
        #[case] usage: &str,
        #[case] argument: Option<&str>,
        #[case] optional: bool,
    ) {
        // Execute
        let grammar = compile(usage);

        // Verify
        let option = &grammar.options()[0];
        assert_eq!(option.argument(), argument);
        assert_eq!(option.is_argument_optional(), optional);
    }

    #[test]
    fn option_argument_then_group() {
        // Execute
        let grammar = compile("prog -o [a b]");

        // Verify
        assert_eq!(invocation(&grammar, 0), vec!["-o", "?(?a ?b)"]);
    }

    #[rstest]
    #[case("prog -x/--ex", "x", Some("ex"))]
    #[case("prog -x, --ex", "x", Some("ex"))]
    #[case("prog --ex/-x", "x", Some("ex"))]
    #[case("prog -o <file>, --output <file>", "o", Some("output"))]
    fn second_name(#[case] usage: &str, #[case] name: &str, #[case] alt_name: Option<&str>) {
        // Execute
        let grammar = compile(usage);

        // Verify
        let option = &grammar.options()[0];
        assert_eq!(option.name(), name);
        assert_eq!(option.alt_name(), alt_name);
        assert_eq!(option.form(), NameForm::Both);
        assert_eq!(invocation(&grammar, 0).len(), 1);
    }

    #[test]
    fn options_are_shared() {
        // Execute
        let grammar = compile("prog -v a\nprog -v b");

        // Verify
        assert_eq!(grammar.options().len(), 2);
        assert_eq!(invocation(&grammar, 0), vec!["-v", "a"]);
        assert_eq!(invocation(&grammar, 1), vec!["-v", "b"]);
    }

    #[test]
    fn inline_help() {
        // Execute
        let grammar = compile("prog -v 'be loud' <x>");

        // Verify
        assert_eq!(grammar.options()[0].help(), Some("be loud"));
    }

    #[rstest]
    #[case("prog -v... <x>", true, false)]
    #[case("prog [-v] <x>...", false, true)]
    #[case("prog [-v] <x>+", false, true)]
    fn repeat(#[case] usage: &str, #[case] option_repeat: bool, #[case] operand_repeat: bool) {
        // Execute
        let grammar = compile(usage);

        // Verify
        assert_eq!(grammar.options()[0].is_repeat(), option_repeat);
        assert_eq!(grammar.operand(grammar.variables[0]).is_repeat(), operand_repeat);
    }

    #[test]
    fn options_section() {
        // Execute
        let grammar = compile(
            "Usage: prog [-q] <file>

            Options:
              -q, --quiet        say nothing
              -v, --verbose...   say everything
              --level <n>        how much, to say
              this line is not an option -x
            ",
        );

        // Verify
        let quiet = &grammar.options()[0];
        assert_eq!(quiet.name(), "q");
        assert_eq!(quiet.alt_name(), Some("quiet"));
        assert_eq!(quiet.form(), NameForm::Primary);
        assert_eq!(quiet.help(), Some("say nothing"));

        let verbose = &grammar.options()[1];
        assert_eq!(verbose.name(), "v");
        assert_eq!(verbose.alt_name(), Some("verbose"));
        assert!(verbose.is_repeat());
        assert_eq!(verbose.form(), NameForm::Both);
        assert_eq!(verbose.help(), Some("say everything"));

        let level = &grammar.options()[2];
        assert_eq!(level.name(), "level");
        assert_eq!(level.argument(), Some("n"));
        assert_eq!(level.help(), Some("how much, to say"));

        assert_eq!(grammar.options().len(), 4);
        assert_eq!(
            invocation(&grammar, 0),
            vec!["?-q", "?-v*", "?--level", "<file>"]
        );
    }

    #[test]
    fn options_section_merges_names() {
        // Execute
        let grammar = compile("prog --verbose\noptions:\n  -v, --verbose  more");

        // Verify
        assert_eq!(grammar.options().len(), 2);
        let verbose = &grammar.options()[0];
        assert_eq!(verbose.name(), "v");
        assert_eq!(verbose.alt_name(), Some("verbose"));
        assert_eq!(verbose.form(), NameForm::Alternate);
        assert_eq!(verbose.help(), Some("more"));
        assert_eq!(invocation(&grammar, 0), vec!["-v"]);
    }

    #[test]
    fn placeholder() {
        // Execute
        let grammar = compile(
            "usage: prog [options] <file>
                    prog -a [options]

            options:
              -a        all
              -b, --bee bees",
        );

        // Verify
        assert!(grammar.placeholder.is_some());
        assert_eq!(grammar.options()[0].form(), NameForm::Primary);
        assert_eq!(grammar.options()[1].form(), NameForm::Hidden);
        assert_eq!(grammar.options()[1].help(), Some("bees"));
        assert_eq!(
            invocation(&grammar, 0),
            vec!["?options", "?-a", "?-b", "<file>"]
        );
        assert_eq!(invocation(&grammar, 1), vec!["-a", "?options", "?-b"]);
        assert!(grammar.operands().all(|operand| operand.name() != "options"));
    }

    #[test]
    fn reserved_letters_taken() {
        // Execute
        let grammar = Grammar::compile_with(
            "prog -h -v <x>",
            Settings {
                version: true,
                about: true,
                ..Settings::default()
            },
        )
        .unwrap();

        // Verify
        let names: Vec<(&str, Option<&str>)> = grammar
            .options()
            .iter()
            .filter(|option| option.is_synthesized())
            .map(|option| (option.name(), option.alt_name()))
            .collect();
        assert_eq!(
            names,
            vec![("help", None), ("version", None), ("a", Some("about"))]
        );
        assert_eq!(invocation(&grammar, 1), vec!["--help|--version|-a"]);
        assert_eq!(grammar.warnings().len(), 2);
        assert_eq!(grammar.letter('a'), grammar.find_option("about"));
    }

    #[test]
    fn reserved_declared() {
        // Execute
        let grammar = compile("prog [-h/--help] <x>");

        // Verify
        assert_eq!(grammar.invocation_count(), 1);
        assert_eq!(grammar.reserved, None);
        assert!(grammar.options().iter().all(|option| !option.is_synthesized()));
    }

    #[rstest]
    #[case("", CompileError::MissingUsage)]
    #[case("usage:", CompileError::MissingProgram(String::default()))]
    #[case("usage: [a]", CompileError::MissingProgram("[".to_string()))]
    #[case("prog <file", CompileError::OperandTerminator("<file".to_string()))]
    #[case("prog <file]", CompileError::OperandTerminator("<file]".to_string()))]
    #[case("prog <>", CompileError::OperandTerminator("<>".to_string()))]
    #[case("prog -f <file", CompileError::ArgumentTerminator("<file".to_string()))]
    #[case("prog -f <file]", CompileError::ArgumentTerminator("<file]".to_string()))]
    #[case("prog -xy!", CompileError::InvalidLetter("-!".to_string()))]
    #[case("prog -[", CompileError::InvalidLetter("-[".to_string()))]
    #[case("prog --", CompileError::InvalidName("--".to_string()))]
    #[case("prog --a.b", CompileError::InvalidName("--a.b".to_string()))]
    #[case("prog -x, y", CompileError::SecondOption("-x, y".to_string()))]
    #[case("prog -x/--ex/--other", CompileError::AltName("-x".to_string(), "--other".to_string()))]
    #[case("prog -x --ex -x/--ex", CompileError::DifferentOptions("-x".to_string(), "--ex".to_string()))]
    #[case("prog a]", CompileError::Unbalanced(']'))]
    #[case("prog (a]", CompileError::Unbalanced(']'))]
    #[case("prog [a)", CompileError::Unbalanced(')'))]
    #[case("prog [a", CompileError::Unclosed('['))]
    #[case("prog (a\nprog b", CompileError::Unclosed('('))]
    #[case("prog ()", CompileError::EmptyGroup)]
    #[case("prog a = b", CompileError::UnexpectedSymbol('='))]
    #[case("prog | a", CompileError::UnexpectedSymbol('|'))]
    #[case("prog a | | b", CompileError::UnexpectedSymbol('|'))]
    #[case("prog 'help'", CompileError::StrayHelp("help".to_string()))]
    #[case("prog\noptions:\n  -x, y", CompileError::SecondOption("-x, y".to_string()))]
    #[case("prog\noptions:\n  -xy  letters", CompileError::InvalidLetter("-xy".to_string()))]
    fn compile_error(#[case] usage: &str, #[case] expected: CompileError) {
        // Execute
        let result = Grammar::compile(usage);

        // Verify
        assert_eq!(result, Err(expected));
    }
}
