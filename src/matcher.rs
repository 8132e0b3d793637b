//! Transition labels for the usage automaton.

use crate::container::Declarations;

mod arg;
mod context;
mod opt;
mod options;

pub(crate) use context::ParseContext;

/// A matcher consumes a prefix of the argument vector, recording any
/// captures into the [`ParseContext`]. Options and arguments are
/// referenced by index into the command's declaration tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Matcher {
    /// One occurrence of a declared option, in any recognized form.
    Opt { option: usize },
    /// One or more occurrences of any option in the list, in any order.
    Options { options: Vec<usize> },
    /// One positional value.
    Arg { argument: usize },
    /// The `--` options terminator.
    OptsEnd,
    /// The empty string. Construction-time only; removed by prepare.
    Shortcut,
}

impl Matcher {
    /// Lower priority is attempted first during backtracking.
    pub(crate) fn priority(&self) -> u8 {
        match self {
            Matcher::Opt { .. } => 1,
            Matcher::Options { .. } => 2,
            Matcher::Arg { .. } => 3,
            Matcher::OptsEnd => 9,
            Matcher::Shortcut => 10,
        }
    }

    pub(crate) fn is_shortcut(&self) -> bool {
        matches!(self, Matcher::Shortcut)
    }

    /// Attempt to consume a prefix of `args`, returning the remainder on
    /// success.
    pub(crate) fn try_match(
        &self,
        args: &[String],
        ctx: &mut ParseContext,
        decls: &Declarations,
    ) -> Option<Vec<String>> {
        match self {
            Matcher::Opt { option } => opt::try_match(*option, args, ctx, decls),
            Matcher::Options { options } => options::try_match(options, args, ctx, decls),
            Matcher::Arg { argument } => arg::try_match(*argument, args, ctx),
            Matcher::OptsEnd => {
                ctx.reject_options = true;
                Some(args.to_vec())
            }
            Matcher::Shortcut => Some(args.to_vec()),
        }
    }

    /// Human-readable label, used by the automaton dumps in tests.
    #[cfg(test)]
    pub(crate) fn label(&self, decls: &Declarations) -> String {
        match self {
            Matcher::Opt { option } => decls.options[*option].names[0].clone(),
            Matcher::Options { options } => {
                let mut label = "-".to_string();
                for option in options {
                    let name = &decls.options[*option].names[0];
                    label.push_str(name.trim_start_matches('-'));
                }
                label
            }
            Matcher::Arg { argument } => decls.arguments[*argument].name.clone(),
            Matcher::OptsEnd => "--".to_string(),
            Matcher::Shortcut => "*".to_string(),
        }
    }
}
