//! `argot` compiles a docopt-like usage text into a grammar, and matches command line arguments against it.
//!
//! The usage text *is* the configuration.
//! Rather than describing each argument through an Api and generating the usage from it, `argot` reads the usage you would have written anyway.
//! Specifically, `argot` attempts to prioritize the following design concerns:
//! * *Usage first*:
//! The usage text is the single source of truth for what the program accepts.
//! * *Values, not side effects*:
//! Matching returns a [`MatchResult`]; `argot` never prints or exits on your behalf.
//! * *Explainable failures*:
//! When no invocation matches, each one reports why, labelled with its own usage line.
//!
//! `argot` does not convert values to types, nor render help beyond the usage lines.
//! Those belong to the program.
//!
//! # Usage
//! A complete program (see [the demos](https://github.com/argot-rs/argot/tree/main/demos)):
//! ```no_run
#![doc = include_str!("../demos/naval_fate.rs")]
//! ```
//!
//! # Usage Text
//! A usage text begins with an optional `Usage:` header, followed by one or more invocations.
//! Each invocation starts with the program name.
//! Every occurrence of the program name starts a new invocation, so invocations are usually written one per line.
//! ```text
//! Usage:
//!   prog add <item>
//!   prog remove [-f/--force] <item>...
//! ```
//!
//! Within an invocation:
//! * `<name>` is a *variable* operand, binding whatever token is in its position.
//! * `name` is a *literal* operand, which only matches its own text (ignoring ASCII case).
//! * `-x` is a single letter option, and `--name` is a long option.
//! Two names for the same option are joined with `/` or `,`, as in `-f/--force`.
//! * An option followed by `<arg>` takes a required argument; followed by `[arg]` or `[<arg>]`, an optional one.
//! * `[...]` marks its contents optional, and `(...)` groups them.
//! * `a | b` makes `a` and `b` mutually exclusive alternatives.
//! * `...` (or `+`) lets the preceding element repeat.
//! * `'help text'` after an option documents it.
//!
//! Options are never required.
//! An `Options:` section may follow the invocations, with one option per line:
//! ```text
//! Options:
//!   -f, --force   Remove even when in use.
//!   --depth <n>   How far to descend.
//! ```
//! An option first declared in the section applies to the first invocation, or wherever the usage writes `[options]`.
//!
//! # Matching
//! [`GeneralParser::parse_tokens`] tries each invocation in declaration order:
//! ```
//! use argot::{MatchResult, Problem, UsageParser};
//!
//! let parser = UsageParser::new("prog (-x | -y) <file>").build().unwrap();
//!
//! match parser.parse_tokens(vec!["-x", "a.txt"].as_slice()) {
//!     MatchResult::Success(matches) => {
//!         assert!(matches.has("-x"));
//!         assert_eq!(matches.value("file"), Some("a.txt"));
//!     }
//!     _ => unreachable!(),
//! }
//!
//! match parser.parse_tokens(vec!["-x", "-y", "a.txt"].as_slice()) {
//!     MatchResult::Failure(diagnostics) => {
//!         assert_eq!(
//!             diagnostics[0].problem(),
//!             &Problem::MutuallyExclusive("-x".to_string(), "-y".to_string())
//!         );
//!     }
//!     _ => unreachable!(),
//! }
//! ```
//!
//! `-h/--help` is always available, producing [`MatchResult::Stop`] with [`StopKind::Help`].
//! Enable `-v/--version` and `-a/--about` via [`UsageParser::version`] and [`UsageParser::about`].
//!
//! # Features
//! * `tracing_debug`: Emit `tracing` debug events while compiling and matching.
pub use argot_core::*;
