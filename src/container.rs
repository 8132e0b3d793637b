use std::collections::HashMap;

use crate::values::Value;

/// The binding site for one declared option or positional argument.
///
/// Owns the value holder exclusively; the matcher layer refers to
/// containers by index into the command's declaration tables.
pub(crate) struct Container<'a> {
    pub(crate) name: String,
    /// Recognized spellings. Options carry `-x`/`--xxx` forms; arguments
    /// carry just their name.
    pub(crate) names: Vec<String>,
    pub(crate) env_var: Option<String>,
    pub(crate) value: Box<dyn Value + 'a>,
    pub(crate) value_set_from_env: bool,
    pub(crate) value_set_by_user: Option<&'a mut bool>,
}

impl<'a> Container<'a> {
    pub(crate) fn is_bool(&self) -> bool {
        self.value.is_bool()
    }
}

impl<'a> std::fmt::Debug for Container<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Container")
            .field("name", &self.name)
            .field("names", &self.names)
            .field("env_var", &self.env_var)
            .finish()
    }
}

/// Read-only view over a command's declarations, handed to the spec
/// parser and the matchers.
///
/// `options_idx` maps every recognized option spelling to its container
/// index; `Opt` consults it to know where short-option clustering must
/// stop.
pub(crate) struct Declarations<'c, 'a> {
    pub(crate) options: &'c [Container<'a>],
    pub(crate) arguments: &'c [Container<'a>],
    pub(crate) options_idx: &'c HashMap<String, usize>,
    pub(crate) arguments_idx: &'c HashMap<String, usize>,
}
