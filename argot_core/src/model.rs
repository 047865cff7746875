/// The kind of an operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperandKind {
    /// A bare word which must appear verbatim (compared case-insensitively).
    Literal,
    /// A `<name>` which accepts any token.
    Variable,
}

/// Which of an option's names are shown when the usage is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NameForm {
    /// Not shown; the option is reachable through the `[options]` placeholder.
    Hidden,
    /// Only the primary (shortest) name.
    Primary,
    /// Only the alternate name.
    Alternate,
    /// Both names, for example `-h/--help`.
    Both,
}

/// The reserved option which interrupted matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StopKind {
    /// `-h` or `--help`.
    Help,
    /// `-v` or `--version`.
    Version,
    /// `-a` or `--about`.
    About,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Settings {
    pub(crate) allow_overwrite: bool,
    pub(crate) posix: bool,
    pub(crate) suppress_help: bool,
    pub(crate) version: bool,
    pub(crate) about: bool,
}
