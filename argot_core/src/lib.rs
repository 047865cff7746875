//! Core module for `argot`.
//! See [documentation root](https://docs.rs/argot/latest/argot/index.html) for full details.
#![deny(missing_docs)]
mod api;
mod constant;
mod grammar;
mod matcher;
mod model;
mod parser;

pub use api::*;
pub use grammar::{CompileError, Grammar, Operand, OptionSpec};
pub use matcher::{Diagnostic, Problem};
pub use model::*;
pub use parser::{GeneralParser, MatchResult};

#[cfg(test)]
#[macro_use]
extern crate assert_matches;
