//! Backtracking evaluation of a prepared machine, plus the commit of an
//! accepting context into the value holders.

use crate::container::{Container, Declarations};
use crate::errors::ParseError;
use crate::fsm::{Fsm, StateId};
use crate::matcher::ParseContext;

#[cfg(feature = "debug")]
use tracing::debug;

/// Run the argument vector through the machine. Returns the accepting
/// context, or `IncorrectUsage` when no path through the automaton
/// consumes every argument.
pub(crate) fn run(
    fsm: &Fsm,
    root: StateId,
    decls: &Declarations,
    args: &[String],
) -> Result<ParseContext, ParseError> {
    let mut ctx = ParseContext::new();
    if apply(fsm, root, decls, args.to_vec(), &mut ctx) {
        Ok(ctx)
    } else {
        Err(ParseError::IncorrectUsage)
    }
}

fn apply(
    fsm: &Fsm,
    state: StateId,
    decls: &Declarations,
    mut args: Vec<String>,
    ctx: &mut ParseContext,
) -> bool {
    let current = fsm.state(state);
    if current.terminal && args.is_empty() {
        return true;
    }

    // A literal `--` flips the context into reject-options mode and is
    // swallowed; everything after it reads as positional.
    if !ctx.reject_options && args.first().map(String::as_str) == Some("--") {
        ctx.reject_options = true;
        args.remove(0);
    }

    let mut candidates = Vec::default();
    for transition in &current.transitions {
        let mut fresh = ctx.child();
        if let Some(remaining) = transition.matcher.try_match(&args, &mut fresh, decls) {
            candidates.push((transition.next, remaining, fresh));
        }
    }

    #[cfg(feature = "debug")]
    {
        debug!(
            candidates = candidates.len(),
            remaining = args.len(),
            "weighing transitions"
        );
    }

    for (next, remaining, mut child) in candidates {
        if apply(fsm, next, decls, remaining, &mut child) {
            ctx.merge(child);
            return true;
        }
    }

    false
}

/// Write an accepting context into the holders.
///
/// Every capture is validated up front so a bad value leaves all holders
/// untouched; only then are the holders cleared (multi-valued ones) and
/// filled, `value_set_from_env` dropped, and `value_set_by_user` raised.
pub(crate) fn commit(
    ctx: ParseContext,
    options: &mut [Container],
    arguments: &mut [Container],
) -> Result<(), ParseError> {
    check_containers(&ctx.opts, options)?;
    check_containers(&ctx.args, arguments)?;

    fill_containers(ctx.opts, options)?;
    fill_containers(ctx.args, arguments)?;

    Ok(())
}

fn check_containers(
    captures: &std::collections::HashMap<usize, Vec<String>>,
    containers: &[Container],
) -> Result<(), ParseError> {
    for (index, values) in captures {
        let container = &containers[*index];
        for value in values {
            container
                .value
                .check(value)
                .map_err(|source| ParseError::InvalidValue {
                    parameter: container.name.clone(),
                    source,
                })?;
        }
    }
    Ok(())
}

fn fill_containers(
    captures: std::collections::HashMap<usize, Vec<String>>,
    containers: &mut [Container],
) -> Result<(), ParseError> {
    for (index, values) in captures {
        let container = &mut containers[index];
        if container.value.is_multi() {
            container.value.clear();
        }
        for value in values {
            container
                .value
                .set(&value)
                .map_err(|source| ParseError::InvalidValue {
                    parameter: container.name.clone(),
                    source,
                })?;
        }

        container.value_set_from_env = false;
        if let Some(flag) = container.value_set_by_user.as_mut() {
            **flag = true;
        }
    }
    Ok(())
}
