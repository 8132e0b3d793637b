//! The command descriptor: declaration surface, compilation, parsing.

use std::collections::HashMap;

use crate::container::{Container, Declarations};
use crate::errors::{CompileError, ConfigError, ParseError};
use crate::fsm::{engine, Fsm, StateId};
use crate::lexer;
use crate::parser;
use crate::values::{set_from_env_with, Value};

enum ParameterClass {
    Opt,
    Arg,
}

/// One declared option or positional argument, built with
/// [`Parameter::option`] or [`Parameter::argument`] and handed to
/// [`Command::add`].
pub struct Parameter<'a> {
    class: ParameterClass,
    name: String,
    value: Box<dyn Value + 'a>,
    env_var: Option<String>,
    set_by_user: Option<&'a mut bool>,
}

impl<'a> Parameter<'a> {
    /// Declare an option.
    ///
    /// `name` is a space separated list of the option's names *without*
    /// dashes: one-letter names are matched as `-x`, longer ones as
    /// `--xxx`.
    ///
    /// ### Example
    /// ```
    /// use uspec::{BoolValue, Command, Parameter};
    ///
    /// let mut force = false;
    /// let mut command = Command::new("rm")
    ///     .add(Parameter::option(BoolValue::new(&mut force, false), "f force"))
    ///     .compile()
    ///     .unwrap();
    ///
    /// command.parse(&["--force"]).unwrap();
    /// drop(command);
    /// assert!(force);
    /// ```
    pub fn option(value: impl Value + 'a, name: impl Into<String>) -> Self {
        Self {
            class: ParameterClass::Opt,
            name: name.into(),
            value: Box::new(value),
            env_var: None,
            set_by_user: None,
        }
    }

    /// Declare a positional argument. `name` must match
    /// `[A-Z][A-Z0-9_]*`; `OPTIONS` is reserved.
    pub fn argument(value: impl Value + 'a, name: impl Into<String>) -> Self {
        Self {
            class: ParameterClass::Arg,
            name: name.into(),
            value: Box::new(value),
            env_var: None,
            set_by_user: None,
        }
    }

    /// Initialize this parameter from the environment: a space separated
    /// list of variable names, tried in order at compile time.
    pub fn env(mut self, env_vars: impl Into<String>) -> Self {
        self.env_var.replace(env_vars.into());
        self
    }

    /// Raise `flag` when the parse commits a user-supplied value for
    /// this parameter.
    pub fn set_by_user(mut self, flag: &'a mut bool) -> Self {
        self.set_by_user.replace(flag);
        self
    }
}

/// A command under construction.
///
/// Declaration mistakes (duplicate or malformed names) are deferred and
/// reported by [`Command::compile`].
pub struct Command<'a> {
    name: String,
    spec: Option<String>,
    options: Vec<Container<'a>>,
    arguments: Vec<Container<'a>>,
    options_idx: HashMap<String, usize>,
    arguments_idx: HashMap<String, usize>,
    deferred_error: Option<ConfigError>,
}

impl<'a> Command<'a> {
    /// Start declaring a command.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            spec: None,
            options: Vec::default(),
            arguments: Vec::default(),
            options_idx: HashMap::default(),
            arguments_idx: HashMap::default(),
            deferred_error: None,
        }
    }

    /// Attach a usage spec. Without one, a default is synthesized at
    /// compile time: `[OPTIONS]` when options exist, followed by the
    /// argument names in declaration order.
    pub fn spec(mut self, spec: impl Into<String>) -> Self {
        self.spec.replace(spec.into());
        self
    }

    /// Add an option or argument declaration.
    ///
    /// The order of argument declarations is their positional order in
    /// the synthesized default spec; option order is not significant.
    pub fn add(mut self, parameter: Parameter<'a>) -> Self {
        let Parameter {
            class,
            name,
            value,
            env_var,
            set_by_user,
        } = parameter;

        match class {
            ParameterClass::Opt => self.add_option(name, value, env_var, set_by_user),
            ParameterClass::Arg => self.add_argument(name, value, env_var, set_by_user),
        }
        self
    }

    fn add_option(
        &mut self,
        name: String,
        value: Box<dyn Value + 'a>,
        env_var: Option<String>,
        set_by_user: Option<&'a mut bool>,
    ) {
        let bare_names: Vec<&str> = name.split_whitespace().collect();
        if bare_names.is_empty() {
            self.defer(format!("Empty option name on '{}'.", self.name));
            return;
        }

        let mut names = Vec::with_capacity(bare_names.len());
        for bare in bare_names {
            if !valid_option_name(bare) {
                self.defer(format!("Invalid option name '{bare}'."));
                return;
            }
            let prefix = if bare.len() == 1 { "-" } else { "--" };
            names.push(format!("{prefix}{bare}"));
        }

        let index = self.options.len();
        for spelled in &names {
            if self.options_idx.insert(spelled.clone(), index).is_some() {
                self.defer(format!("Cannot duplicate the option '{spelled}'."));
                return;
            }
        }

        self.options.push(Container {
            name: names.join(", "),
            names,
            env_var,
            value,
            value_set_from_env: false,
            value_set_by_user: set_by_user,
        });
    }

    fn add_argument(
        &mut self,
        name: String,
        value: Box<dyn Value + 'a>,
        env_var: Option<String>,
        set_by_user: Option<&'a mut bool>,
    ) {
        if !valid_argument_name(&name) {
            self.defer(format!("Invalid argument name '{name}'."));
            return;
        }

        let index = self.arguments.len();
        if self.arguments_idx.insert(name.clone(), index).is_some() {
            self.defer(format!("Cannot duplicate the argument '{name}'."));
            return;
        }

        self.arguments.push(Container {
            name: name.clone(),
            names: vec![name],
            env_var,
            value,
            value_set_from_env: false,
            value_set_by_user: set_by_user,
        });
    }

    fn defer(&mut self, message: String) {
        // Only the first mistake is reported.
        if self.deferred_error.is_none() {
            self.deferred_error.replace(ConfigError(message));
        }
    }

    /// Apply env defaulting, compile the usage spec into its automaton,
    /// and return the ready-to-parse command.
    pub fn compile(self) -> Result<CompiledCommand<'a>, CompileError> {
        self.compile_with_env(|name| std::env::var(name).ok())
    }

    /// Like [`Command::compile`] with an injectable environment.
    pub fn compile_with_env(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<CompiledCommand<'a>, CompileError> {
        if let Some(error) = self.deferred_error {
            return Err(error.into());
        }

        for container in self.options.iter_mut().chain(self.arguments.iter_mut()) {
            if let Some(env_var) = &container.env_var {
                if set_from_env_with(container.value.as_mut(), env_var, &lookup) {
                    container.value_set_from_env = true;
                }
            }
        }

        let spec = match self.spec.take() {
            Some(spec) => spec,
            None => synthesize_spec(&self.options, &self.arguments),
        };

        let tokens = lexer::tokenize(&spec)?;
        let decls = Declarations {
            options: &self.options,
            arguments: &self.arguments,
            options_idx: &self.options_idx,
            arguments_idx: &self.arguments_idx,
        };
        let (fsm, start) = parser::parse(&spec, &tokens, &decls)?;

        Ok(CompiledCommand {
            name: self.name,
            spec,
            options: self.options,
            arguments: self.arguments,
            options_idx: self.options_idx,
            arguments_idx: self.arguments_idx,
            fsm,
            start,
        })
    }
}

fn valid_option_name(bare: &str) -> bool {
    let mut chars = bare.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if !first.is_ascii_alphabetic() {
        return false;
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

fn valid_argument_name(name: &str) -> bool {
    if name == "OPTIONS" {
        return false;
    }
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    first.is_ascii_uppercase() && chars.all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
}

fn synthesize_spec(options: &[Container], arguments: &[Container]) -> String {
    let mut spec = String::default();
    if !options.is_empty() {
        spec.push_str("[OPTIONS] ");
    }
    for argument in arguments {
        spec.push_str(&argument.name);
        spec.push(' ');
    }
    spec
}

/// A command with its prepared automaton, ready to parse argument
/// vectors. Reusable across parses; not meant to be shared between
/// threads mid-parse.
#[derive(Debug)]
pub struct CompiledCommand<'a> {
    name: String,
    spec: String,
    options: Vec<Container<'a>>,
    arguments: Vec<Container<'a>>,
    options_idx: HashMap<String, usize>,
    arguments_idx: HashMap<String, usize>,
    fsm: Fsm,
    start: StateId,
}

impl<'a> CompiledCommand<'a> {
    /// The command name given at declaration.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The usage spec in force: the declared one, or the synthesized
    /// default.
    pub fn spec(&self) -> &str {
        &self.spec
    }

    /// Parse an argument vector and commit the captures into the value
    /// holders.
    ///
    /// On any error no holder has been touched by this parse: matching
    /// happens on a scratch context, and the commit validates every
    /// capture before the first write.
    pub fn parse(&mut self, args: &[&str]) -> Result<(), ParseError> {
        let args: Vec<String> = args.iter().map(|s| s.to_string()).collect();

        let ctx = {
            let decls = Declarations {
                options: &self.options,
                arguments: &self.arguments,
                options_idx: &self.options_idx,
                arguments_idx: &self.arguments_idx,
            };
            engine::run(&self.fsm, self.start, &decls, &args)?
        };

        engine::commit(ctx, &mut self.options, &mut self.arguments)
    }

    /// Parse [`std::env::args`], skipping the program name.
    pub fn parse_env_args(&mut self) -> Result<(), ParseError> {
        let args: Vec<String> = std::env::args().skip(1).collect();
        let args: Vec<&str> = args.iter().map(AsRef::as_ref).collect();
        self.parse(&args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::values::{BoolValue, IntsValue, StringValue, StringsValue};
    use rstest::rstest;

    #[test]
    fn empty_command_compiles() {
        let command = Command::new("noop").compile().unwrap();

        assert_eq!(command.name(), "noop");
        assert_eq!(command.spec(), "");
    }

    #[test]
    fn default_spec_synthesis() {
        // Setup
        let mut force = false;
        let mut src: Vec<String> = Vec::default();
        let mut dst = String::default();

        // Execute
        let command = Command::new("cp")
            .add(Parameter::option(BoolValue::new(&mut force, false), "f"))
            .add(Parameter::argument(
                StringsValue::new(&mut src, Vec::default()),
                "SRC",
            ))
            .add(Parameter::argument(StringValue::new(&mut dst, String::default()), "DST"))
            .compile()
            .unwrap();

        // Verify
        assert_eq!(command.spec(), "[OPTIONS] SRC DST ");
    }

    #[test]
    fn default_spec_without_options() {
        let mut src = String::default();
        let command = Command::new("cat")
            .add(Parameter::argument(
                StringValue::new(&mut src, String::default()),
                "SRC",
            ))
            .compile()
            .unwrap();

        assert_eq!(command.spec(), "SRC ");
    }

    #[rstest]
    #[case("f force", vec!["-f", "--force"])]
    #[case("force", vec!["--force"])]
    #[case("f", vec!["-f"])]
    #[case("n dry-run", vec!["-n", "--dry-run"])]
    fn option_name_expansion(#[case] declared: &str, #[case] spellings: Vec<&str>) {
        let mut flag = false;
        let command = Command::new("program")
            .add(Parameter::option(BoolValue::new(&mut flag, false), declared))
            .compile()
            .unwrap();

        for spelling in spellings {
            assert!(
                command.options_idx.contains_key(spelling),
                "missing {spelling}"
            );
        }
    }

    #[rstest]
    #[case("", "Empty option name on 'program'.")]
    #[case("-f", "Invalid option name '-f'.")]
    #[case("2x", "Invalid option name '2x'.")]
    fn bad_option_names(#[case] declared: &str, #[case] expected: &str) {
        let mut flag = false;
        let error = Command::new("program")
            .add(Parameter::option(BoolValue::new(&mut flag, false), declared))
            .compile()
            .unwrap_err();

        assert_matches!(error, CompileError::Config(ConfigError(message)) => {
            assert_eq!(message, expected);
        });
    }

    #[rstest]
    #[case("src", "Invalid argument name 'src'.")]
    #[case("OPTIONS", "Invalid argument name 'OPTIONS'.")]
    #[case("X-Y", "Invalid argument name 'X-Y'.")]
    fn bad_argument_names(#[case] declared: &str, #[case] expected: &str) {
        let mut value = String::default();
        let error = Command::new("program")
            .add(Parameter::argument(
                StringValue::new(&mut value, String::default()),
                declared,
            ))
            .compile()
            .unwrap_err();

        assert_matches!(error, CompileError::Config(ConfigError(message)) => {
            assert_eq!(message, expected);
        });
    }

    #[test]
    fn duplicate_option_rejected() {
        let mut a = false;
        let mut b = false;
        let error = Command::new("program")
            .add(Parameter::option(BoolValue::new(&mut a, false), "f force"))
            .add(Parameter::option(BoolValue::new(&mut b, false), "f"))
            .compile()
            .unwrap_err();

        assert_matches!(error, CompileError::Config(ConfigError(message)) => {
            assert_eq!(message, "Cannot duplicate the option '-f'.");
        });
    }

    #[test]
    fn duplicate_argument_rejected() {
        let mut a = String::default();
        let mut b = String::default();
        let error = Command::new("program")
            .add(Parameter::argument(
                StringValue::new(&mut a, String::default()),
                "SRC",
            ))
            .add(Parameter::argument(
                StringValue::new(&mut b, String::default()),
                "SRC",
            ))
            .compile()
            .unwrap_err();

        assert_matches!(error, CompileError::Config(ConfigError(message)) => {
            assert_eq!(message, "Cannot duplicate the argument 'SRC'.");
        });
    }

    #[test]
    fn spec_errors_surface_from_compile() {
        let mut flag = false;
        let error = Command::new("program")
            .spec("[-f")
            .add(Parameter::option(BoolValue::new(&mut flag, false), "f"))
            .compile()
            .unwrap_err();

        assert_matches!(error, CompileError::Spec(spec_error) => {
            assert_eq!(spec_error.position, 3);
        });
    }

    #[test]
    fn env_defaulting_at_compile_time() {
        // Setup
        let mut limit = 0_i64;
        let mut counts: Vec<i64> = Vec::default();
        let environment = |name: &str| match name {
            "PROGRAM_LIMIT" => Some("12".to_string()),
            "PROGRAM_COUNTS" => Some("3, 4".to_string()),
            _ => None,
        };

        // Execute
        let command = Command::new("program")
            .spec("[-l] [-c...]")
            .add(
                Parameter::option(crate::values::IntValue::new(&mut limit, 0), "l")
                    .env("MISSING PROGRAM_LIMIT"),
            )
            .add(
                Parameter::option(IntsValue::new(&mut counts, Vec::default()), "c")
                    .env("PROGRAM_COUNTS"),
            )
            .compile_with_env(environment)
            .unwrap();

        // Verify
        assert!(command.options[0].value_set_from_env);
        assert!(command.options[1].value_set_from_env);
        drop(command);
        assert_eq!(limit, 12);
        assert_eq!(counts, vec![3, 4]);
    }

    #[test]
    fn user_value_overrides_env_and_flags_it() {
        // Setup
        let mut limit = 0_i64;
        let mut user_set = false;
        let environment = |name: &str| match name {
            "PROGRAM_LIMIT" => Some("12".to_string()),
            _ => None,
        };
        let mut command = Command::new("program")
            .spec("[-l]")
            .add(
                Parameter::option(crate::values::IntValue::new(&mut limit, 0), "l")
                    .env("PROGRAM_LIMIT")
                    .set_by_user(&mut user_set),
            )
            .compile_with_env(environment)
            .unwrap();
        assert!(command.options[0].value_set_from_env);

        // Execute
        command.parse(&["-l", "99"]).unwrap();

        // Verify
        assert!(!command.options[0].value_set_from_env);
        drop(command);
        assert_eq!(limit, 99);
        assert!(user_set);
    }
}
