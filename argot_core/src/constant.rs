pub(crate) const USAGE_KEYWORD: &str = "usage";
pub(crate) const OPTIONS_KEYWORD: &str = "options";
pub(crate) const USAGE_WIDTH: usize = 80;

pub(crate) const HELP_NAME: &str = "help";
pub(crate) const HELP_LETTER: &str = "h";
pub(crate) const HELP_MESSAGE: &str = "show this help text";

pub(crate) const VERSION_NAME: &str = "version";
pub(crate) const VERSION_LETTER: &str = "v";
pub(crate) const VERSION_MESSAGE: &str = "show version information";

pub(crate) const ABOUT_NAME: &str = "about";
pub(crate) const ABOUT_LETTER: &str = "a";
pub(crate) const ABOUT_MESSAGE: &str = "show information about this program";
