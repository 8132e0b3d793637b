//! `uspec` is a usage-spec driven command line parser for Rust.
//!
//! Instead of assembling a parser out of combinators or attribute
//! macros, you describe the shape of an invocation with a small,
//! docopt-like **usage spec** and bind each declared option/argument to
//! one of your own variables:
//!
//! ```
//! use uspec::{BoolValue, Command, Parameter, StringValue, StringsValue};
//!
//! let mut recursive = false;
//! let mut src: Vec<String> = Vec::default();
//! let mut dst = String::default();
//!
//! let mut cp = Command::new("cp")
//!     .spec("[-r] SRC... DST")
//!     .add(Parameter::option(BoolValue::new(&mut recursive, false), "r recursive"))
//!     .add(Parameter::argument(StringsValue::new(&mut src, Vec::default()), "SRC"))
//!     .add(Parameter::argument(StringValue::new(&mut dst, String::default()), "DST"))
//!     .compile()
//!     .unwrap();
//!
//! cp.parse(&["-r", "a", "b", "dest"]).unwrap();
//! drop(cp);
//!
//! assert!(recursive);
//! assert_eq!(src, vec!["a".to_string(), "b".to_string()]);
//! assert_eq!(dst, "dest");
//! ```
//!
//! # The usage spec
//!
//! A spec is a sequence of atoms:
//! * `ARG`: a declared positional argument (uppercase identifier).
//! * `-x`, `--name`: a declared option; `-abc` is a cluster of
//!   single-letter options.
//! * `OPTIONS`: any of the command's options, any number of times.
//! * `(...)`: grouping. `[...]`: optional. `a|b`: choice.
//!   `a...`: repetition.
//! * `--`: end of options; everything after it parses as positional,
//!   even tokens that start with `-`.
//!
//! Adjacent option atoms match in any order (`-a -b` accepts `-b -a`);
//! positional atoms keep their order. The spec is compiled once into a
//! backtracking automaton; parsing tries transitions in a fixed priority
//! order, so results are deterministic.
//!
//! # Values
//!
//! Parsed tokens are committed into typed holders writing through your
//! variables: [`BoolValue`], [`StringValue`], [`IntValue`],
//! [`FloatValue`], their sequence forms, and [`EnumValue`] for a closed
//! set of choices. Options may also be initialized from environment
//! variables via [`Parameter::env`]. Commits are atomic: a rejected
//! parse leaves every variable untouched.
#![deny(missing_docs)]

mod command;
mod container;
mod errors;
mod fsm;
mod lexer;
mod matcher;
mod parser;
mod values;

pub use command::{Command, CompiledCommand, Parameter};
pub use errors::{CompileError, ConfigError, ParseError, SpecError, SpecErrorKind};
pub use values::{
    BoolValue, EnumValue, FloatValue, FloatsValue, IntValue, IntsValue, InvalidValue, StringValue,
    StringsValue, Value,
};

#[cfg(test)]
#[macro_use]
extern crate assert_matches;
