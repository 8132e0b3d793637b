//! The options-set matcher behind `OPTIONS` and `-abc` spec atoms.

use crate::container::Declarations;
use crate::matcher::{opt, ParseContext};

/// Greedily match occurrences of any option in the list, in any order.
/// At least one occurrence must match; iteration stops at the first
/// argument no listed option accepts.
pub(crate) fn try_match(
    options: &[usize],
    args: &[String],
    ctx: &mut ParseContext,
    decls: &Declarations,
) -> Option<Vec<String>> {
    if ctx.reject_options || args.is_empty() {
        return None;
    }

    let mut remaining = try_once(options, args, ctx, decls)?;

    loop {
        // Probe on a scratch context so a non-progress round cannot leak
        // captures, then keep going only while input is being consumed.
        let mut probe = ctx.clone();
        match try_once(options, &remaining, &mut probe, decls) {
            None => return Some(remaining),
            Some(next) => {
                if next.len() == remaining.len() && next.first() == remaining.first() {
                    return Some(remaining);
                }
                *ctx = probe;
                remaining = next;
            }
        }
    }
}

fn try_once(
    options: &[usize],
    args: &[String],
    ctx: &mut ParseContext,
    decls: &Declarations,
) -> Option<Vec<String>> {
    if args.is_empty() {
        return None;
    }
    for option in options {
        if let Some(remaining) = opt::try_match(*option, args, ctx, decls) {
            return Some(remaining);
        }
    }
    None
}
