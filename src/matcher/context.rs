use std::collections::HashMap;

/// Tentative captures accumulated during one matching attempt.
///
/// Keys are container indices into the command's declaration tables. A
/// context is only committed to the value holders once the entire
/// argument vector accepts; partial contexts are discarded on backtrack.
#[derive(Debug, Clone, Default)]
pub(crate) struct ParseContext {
    pub(crate) opts: HashMap<usize, Vec<String>>,
    pub(crate) args: HashMap<usize, Vec<String>>,
    pub(crate) reject_options: bool,
}

impl ParseContext {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// A fresh context sharing only the `reject_options` flag, so a
    /// failing sibling branch cannot leak captures into a later
    /// successful one.
    pub(crate) fn child(&self) -> Self {
        Self {
            opts: HashMap::default(),
            args: HashMap::default(),
            reject_options: self.reject_options,
        }
    }

    pub(crate) fn push_opt(&mut self, option: usize, value: impl Into<String>) {
        self.opts.entry(option).or_default().push(value.into());
    }

    pub(crate) fn push_arg(&mut self, argument: usize, value: impl Into<String>) {
        self.args.entry(argument).or_default().push(value.into());
    }

    /// Append a successful child's captures onto this context.
    pub(crate) fn merge(&mut self, other: ParseContext) {
        for (argument, values) in other.args {
            self.args.entry(argument).or_default().extend(values);
        }
        for (option, values) in other.opts {
            self.opts.entry(option).or_default().extend(values);
        }
    }
}
