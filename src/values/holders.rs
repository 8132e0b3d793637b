use crate::values::{InvalidValue, Value};

macro_rules! scalar_holder {
    ($(#[$doc:meta])* $name:ident, $ty:ty, $type_name:literal) => {
        $(#[$doc])*
        pub struct $name<'a> {
            variable: &'a mut $ty,
            initial: $ty,
        }

        impl<'a> $name<'a> {
            /// Bind `variable`, assigning it `initial`.
            pub fn new(variable: &'a mut $ty, initial: $ty) -> Self {
                *variable = initial.clone();
                Self { variable, initial }
            }
        }

        impl<'a> Value for $name<'a> {
            fn check(&self, token: &str) -> Result<(), InvalidValue> {
                token
                    .parse::<$ty>()
                    .map(|_| ())
                    .map_err(|_| InvalidValue::InvalidConversion {
                        token: token.to_string(),
                        type_name: $type_name,
                    })
            }

            fn set(&mut self, token: &str) -> Result<(), InvalidValue> {
                *self.variable =
                    token
                        .parse::<$ty>()
                        .map_err(|_| InvalidValue::InvalidConversion {
                            token: token.to_string(),
                            type_name: $type_name,
                        })?;
                Ok(())
            }

            fn is_default(&self) -> bool {
                *self.variable == self.initial
            }
        }
    };
}

macro_rules! sequence_holder {
    ($(#[$doc:meta])* $name:ident, $ty:ty, $type_name:literal) => {
        $(#[$doc])*
        pub struct $name<'a> {
            variable: &'a mut Vec<$ty>,
            initial: Vec<$ty>,
        }

        impl<'a> $name<'a> {
            /// Bind `variable`, assigning it `initial`.
            pub fn new(variable: &'a mut Vec<$ty>, initial: Vec<$ty>) -> Self {
                *variable = initial.clone();
                Self { variable, initial }
            }
        }

        impl<'a> Value for $name<'a> {
            fn check(&self, token: &str) -> Result<(), InvalidValue> {
                token
                    .parse::<$ty>()
                    .map(|_| ())
                    .map_err(|_| InvalidValue::InvalidConversion {
                        token: token.to_string(),
                        type_name: $type_name,
                    })
            }

            fn set(&mut self, token: &str) -> Result<(), InvalidValue> {
                let value =
                    token
                        .parse::<$ty>()
                        .map_err(|_| InvalidValue::InvalidConversion {
                            token: token.to_string(),
                            type_name: $type_name,
                        })?;
                self.variable.push(value);
                Ok(())
            }

            fn clear(&mut self) {
                self.variable.clear();
            }

            fn is_multi(&self) -> bool {
                true
            }

            fn is_default(&self) -> bool {
                *self.variable == self.initial
            }
        }
    };
}

scalar_holder!(
    /// Scalar string holder.
    StringValue,
    String,
    "string"
);
scalar_holder!(
    /// Scalar integer holder.
    IntValue,
    i64,
    "int"
);
scalar_holder!(
    /// Scalar float holder.
    FloatValue,
    f64,
    "float"
);

sequence_holder!(
    /// Ordered sequence of strings.
    StringsValue,
    String,
    "string"
);
sequence_holder!(
    /// Ordered sequence of integers.
    IntsValue,
    i64,
    "int"
);
sequence_holder!(
    /// Ordered sequence of floats.
    FloatsValue,
    f64,
    "float"
);

/// Scalar bool holder.
///
/// The only holder for which `is_bool` is true: it binds to an option
/// occurrence without consuming a following token.
pub struct BoolValue<'a> {
    variable: &'a mut bool,
    initial: bool,
}

impl<'a> BoolValue<'a> {
    /// Bind `variable`, assigning it `initial`.
    pub fn new(variable: &'a mut bool, initial: bool) -> Self {
        *variable = initial;
        Self { variable, initial }
    }
}

impl<'a> Value for BoolValue<'a> {
    fn check(&self, token: &str) -> Result<(), InvalidValue> {
        token
            .parse::<bool>()
            .map(|_| ())
            .map_err(|_| InvalidValue::InvalidConversion {
                token: token.to_string(),
                type_name: "bool",
            })
    }

    fn set(&mut self, token: &str) -> Result<(), InvalidValue> {
        *self.variable = token
            .parse::<bool>()
            .map_err(|_| InvalidValue::InvalidConversion {
                token: token.to_string(),
                type_name: "bool",
            })?;
        Ok(())
    }

    fn is_bool(&self) -> bool {
        true
    }

    fn is_default(&self) -> bool {
        *self.variable == self.initial
    }
}

/// String holder restricted to a declared set of choices.
///
/// Each choice maps an accepted token to the canonical value stored on a
/// match (often the same text).
pub struct EnumValue<'a> {
    variable: &'a mut String,
    initial: String,
    choices: Vec<(String, String)>,
}

impl<'a> EnumValue<'a> {
    /// Bind `variable`, assigning it `initial`. Each choice pairs an
    /// accepted token with the canonical value stored on a match.
    pub fn new(
        variable: &'a mut String,
        initial: impl Into<String>,
        choices: Vec<(String, String)>,
    ) -> Self {
        let initial = initial.into();
        *variable = initial.clone();
        Self {
            variable,
            initial,
            choices,
        }
    }

    fn canonical(&self, token: &str) -> Result<String, InvalidValue> {
        for (accepted, canonical) in &self.choices {
            if accepted == token {
                return Ok(canonical.clone());
            }
        }

        let choices = self
            .choices
            .iter()
            .map(|(accepted, _)| accepted.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        Err(InvalidValue::InvalidChoice {
            token: token.to_string(),
            choices,
        })
    }
}

impl<'a> Value for EnumValue<'a> {
    fn check(&self, token: &str) -> Result<(), InvalidValue> {
        self.canonical(token).map(|_| ())
    }

    fn set(&mut self, token: &str) -> Result<(), InvalidValue> {
        *self.variable = self.canonical(token)?;
        Ok(())
    }

    fn is_default(&self) -> bool {
        *self.variable == self.initial
    }
}
