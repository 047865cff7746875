use std::iter::Peekable;
use std::str::Chars;

const DELIMITERS: &str = " \t\r\n'-+|[]<>()=:,/";
const ELLIPSIS: &str = "...";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Quote {
    Single,
    Double,
}

impl Quote {
    fn mark(&self) -> char {
        match self {
            Quote::Single => '\'',
            Quote::Double => '"',
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Token {
    Word(String),
    Symbol(char),
    Repeat,
    LineBreak,
    Quoted(Quote, String),
}

impl Token {
    /// The token as it was written in the usage text.
    pub(crate) fn text(&self) -> String {
        match self {
            Token::Word(word) => word.clone(),
            Token::Symbol(symbol) => symbol.to_string(),
            Token::Repeat => ELLIPSIS.to_string(),
            Token::LineBreak => "\n".to_string(),
            Token::Quoted(quote, text) => format!("{q}{text}{q}", q = quote.mark()),
        }
    }

    pub(crate) fn is_symbol(&self, symbol: char) -> bool {
        matches!(self, Token::Symbol(s) if *s == symbol)
    }
}

/// Lazily splits usage text into tokens.
///
/// Delivered tokens may be pushed back any number of times; they are re-delivered in LIFO order.
pub(crate) struct Tokenizer<'t> {
    chars: Peekable<Chars<'t>>,
    stack: Vec<Token>,
    last: Option<Token>,
    trim: bool,
    filter_line_breaks: bool,
    quotes: bool,
}

impl<'t> Tokenizer<'t> {
    pub(crate) fn new(text: &'t str) -> Self {
        Self {
            chars: text.chars().peekable(),
            stack: Vec::default(),
            last: None,
            trim: true,
            filter_line_breaks: true,
            quotes: true,
        }
    }

    /// When trimming is off, runs of whitespace are delivered as words.
    pub(crate) fn set_trim(&mut self, trim: bool) {
        self.trim = trim;
    }

    /// When filtering is off, each newline is delivered as a `LineBreak`.
    pub(crate) fn set_filter_line_breaks(&mut self, filter_line_breaks: bool) {
        self.filter_line_breaks = filter_line_breaks;
    }

    /// When quoting is off, quote characters are ordinary text.
    pub(crate) fn set_quotes(&mut self, quotes: bool) {
        self.quotes = quotes;
    }

    pub(crate) fn next(&mut self) -> Option<Token> {
        let token = match self.stack.pop() {
            Some(token) => Some(token),
            None => self.scan(),
        };
        self.last = token.clone();
        token
    }

    /// Re-queue the last delivered token.
    pub(crate) fn push_back(&mut self) {
        if let Some(token) = self.last.take() {
            self.stack.push(token);
        }
    }

    /// Queue an arbitrary token.
    pub(crate) fn push(&mut self, token: Token) {
        self.last = None;
        self.stack.push(token);
    }

    /// Queue `tokens` so they are re-delivered in the same order.
    pub(crate) fn unread(&mut self, tokens: Vec<Token>) {
        self.last = None;
        self.stack.extend(tokens.into_iter().rev());
    }

    pub(crate) fn peek(&mut self) -> Option<Token> {
        let token = self.next();
        self.push_back();
        token
    }

    fn scan(&mut self) -> Option<Token> {
        loop {
            let c = self.chars.next()?;

            match c {
                '\n' => {
                    if !self.filter_line_breaks {
                        return Some(Token::LineBreak);
                    }

                    if !self.trim {
                        return Some(Token::Word(c.to_string()));
                    }
                }
                ' ' | '\t' | '\r' => {
                    if !self.trim {
                        let mut space = c.to_string();

                        while let Some(next) =
                            self.chars.next_if(|&n| matches!(n, ' ' | '\t' | '\r'))
                        {
                            space.push(next);
                        }

                        return Some(Token::Word(space));
                    }
                }
                '\'' if self.quotes => return Some(self.quoted(Quote::Single)),
                '"' if self.quotes => return Some(self.quoted(Quote::Double)),
                '+' => return Some(Token::Repeat),
                _ if DELIMITERS.contains(c) => return Some(Token::Symbol(c)),
                _ => return Some(self.word(c)),
            }
        }
    }

    // Once a word has started it continues through dashes, so `my-prog` and `long-name` stay whole.
    fn word(&mut self, first: char) -> Token {
        let mut word = first.to_string();

        while let Some(next) = self.chars.next_if(|&n| n == '-' || !DELIMITERS.contains(n)) {
            word.push(next);
        }

        if word == ELLIPSIS {
            Token::Repeat
        } else if word.len() > ELLIPSIS.len() && word.ends_with(ELLIPSIS) {
            word.truncate(word.len() - ELLIPSIS.len());
            self.stack.push(Token::Repeat);
            Token::Word(word)
        } else {
            Token::Word(word)
        }
    }

    // A backslash immediately before the closing quote escapes it (one level only).
    fn quoted(&mut self, quote: Quote) -> Token {
        let mark = quote.mark();
        let mut text = String::default();
        let mut backslash = false;

        for c in self.chars.by_ref() {
            if backslash {
                backslash = false;

                if c == mark {
                    text.pop();
                    text.push(c);
                    continue;
                }
            } else if c == '\\' {
                backslash = true;
            } else if c == mark {
                break;
            }

            text.push(c);
        }

        Token::Quoted(quote, text)
    }
}
