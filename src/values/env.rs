use crate::values::{InvalidValue, Value};

/// Initialize a holder from the environment.
///
/// `env_vars` is a space separated list of variable names, tried in
/// order against `lookup`. The first variable whose value is nonempty
/// and fully parses is adopted and ends the search. Sequence holders
/// read a comma separated list with the elements trimmed; a single bad
/// element rejects that variable entirely, leaving the holder untouched.
pub(crate) fn set_from_env_with(
    value: &mut dyn Value,
    env_vars: &str,
    lookup: impl Fn(&str) -> Option<String>,
) -> bool {
    for env_var in env_vars.split_whitespace() {
        let Some(text) = lookup(env_var) else {
            continue;
        };
        if text.is_empty() {
            continue;
        }

        if !value.is_multi() {
            if value.set(&text).is_ok() {
                return true;
            }
            continue;
        }

        let elements: Vec<&str> = text.split(',').map(str::trim).collect();
        if set_multivalued(value, &elements).is_ok() {
            return true;
        }
    }

    false
}

fn set_multivalued(value: &mut dyn Value, elements: &[&str]) -> Result<(), InvalidValue> {
    // Validate the whole list before touching the holder, so a bad
    // element leaves the prior value intact.
    for element in elements {
        value.check(element)?;
    }

    value.clear();
    for element in elements {
        value.set(element)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::values::{IntValue, IntsValue, StringValue, StringsValue};
    use std::collections::HashMap;

    fn environment(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn scalar_first_hit_wins() {
        // Setup
        let env = environment(&[("B", "banana"), ("C", "cherry")]);
        let mut variable = String::new();
        let mut holder = StringValue::new(&mut variable, "fallback".to_string());

        // Execute
        let adopted = set_from_env_with(&mut holder, "A B C", |name| env.get(name).cloned());

        // Verify
        assert!(adopted);
        drop(holder);
        assert_eq!(variable, "banana");
    }

    #[test]
    fn scalar_empty_value_skipped() {
        let env = environment(&[("A", ""), ("B", "5")]);
        let mut variable = 0_i64;
        let mut holder = IntValue::new(&mut variable, 0);

        let adopted = set_from_env_with(&mut holder, "A B", |name| env.get(name).cloned());

        assert!(adopted);
        drop(holder);
        assert_eq!(variable, 5);
    }

    #[test]
    fn scalar_unparsable_falls_through() {
        let env = environment(&[("A", "not-an-int"), ("B", "12")]);
        let mut variable = 0_i64;
        let mut holder = IntValue::new(&mut variable, 0);

        let adopted = set_from_env_with(&mut holder, "A B", |name| env.get(name).cloned());

        assert!(adopted);
        drop(holder);
        assert_eq!(variable, 12);
    }

    #[test]
    fn scalar_no_hit() {
        let env = environment(&[]);
        let mut variable = 0_i64;
        let mut holder = IntValue::new(&mut variable, 3);

        let adopted = set_from_env_with(&mut holder, "A B", |name| env.get(name).cloned());

        assert!(!adopted);
        drop(holder);
        assert_eq!(variable, 3);
    }

    #[test]
    fn sequence_split_and_trimmed() {
        let env = environment(&[("A", "1, 2 ,3")]);
        let mut variable: Vec<i64> = Vec::default();
        let mut holder = IntsValue::new(&mut variable, Vec::default());

        let adopted = set_from_env_with(&mut holder, "A", |name| env.get(name).cloned());

        assert!(adopted);
        drop(holder);
        assert_eq!(variable, vec![1, 2, 3]);
    }

    #[test]
    fn sequence_replaces_initial() {
        let env = environment(&[("A", "x,y")]);
        let mut variable: Vec<String> = Vec::default();
        let mut holder = StringsValue::new(&mut variable, vec!["seed".to_string()]);

        let adopted = set_from_env_with(&mut holder, "A", |name| env.get(name).cloned());

        assert!(adopted);
        drop(holder);
        assert_eq!(variable, vec!["x".to_string(), "y".to_string()]);
    }

    #[test]
    fn sequence_bad_element_leaves_prior_value() {
        let env = environment(&[("A", "1,oops,3")]);
        let mut variable: Vec<i64> = Vec::default();
        let mut holder = IntsValue::new(&mut variable, vec![9, 8]);

        let adopted = set_from_env_with(&mut holder, "A", |name| env.get(name).cloned());

        assert!(!adopted);
        drop(holder);
        assert_eq!(variable, vec![9, 8]);
    }

    #[test]
    fn sequence_bad_element_falls_through_to_next_var() {
        let env = environment(&[("A", "1,oops"), ("B", "4,5")]);
        let mut variable: Vec<i64> = Vec::default();
        let mut holder = IntsValue::new(&mut variable, Vec::default());

        let adopted = set_from_env_with(&mut holder, "A B", |name| env.get(name).cloned());

        assert!(adopted);
        drop(holder);
        assert_eq!(variable, vec![4, 5]);
    }

    #[test]
    fn defaulting_is_idempotent() {
        let env = environment(&[("A", "7,8")]);
        let mut variable: Vec<i64> = Vec::default();
        let mut holder = IntsValue::new(&mut variable, Vec::default());

        set_from_env_with(&mut holder, "A", |name| env.get(name).cloned());
        set_from_env_with(&mut holder, "A", |name| env.get(name).cloned());

        drop(holder);
        assert_eq!(variable, vec![7, 8]);
    }
}
