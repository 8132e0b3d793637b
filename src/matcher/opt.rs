//! Single-option matching: long forms, short forms, and short clusters.

use crate::container::Declarations;
use crate::matcher::ParseContext;

pub(crate) fn try_match(
    option: usize,
    args: &[String],
    ctx: &mut ParseContext,
    decls: &Declarations,
) -> Option<Vec<String>> {
    if ctx.reject_options || args.is_empty() {
        return None;
    }

    let head = args[0].as_str();
    if let Some(rest) = head.strip_prefix("--") {
        if rest.is_empty() {
            // A bare `--` belongs to the engine, never to an option.
            return None;
        }
        match_long(option, args, ctx, decls)
    } else if head.starts_with('-') && head.len() > 1 {
        match_short(option, args, ctx, decls)
    } else {
        None
    }
}

fn match_long(
    option: usize,
    args: &[String],
    ctx: &mut ParseContext,
    decls: &Declarations,
) -> Option<Vec<String>> {
    let container = &decls.options[option];
    let head = args[0].as_str();
    let (name, attached) = match head.split_once('=') {
        Some((name, value)) => (name, Some(value)),
        None => (head, None),
    };

    if !container.names.iter().any(|n| n == name) {
        return None;
    }

    if let Some(value) = attached {
        if value.is_empty() {
            return None;
        }
        ctx.push_opt(option, value);
        return Some(args[1..].to_vec());
    }

    if container.is_bool() {
        ctx.push_opt(option, "true");
        return Some(args[1..].to_vec());
    }

    let value = args.get(1)?;
    if value.starts_with('-') && value != "-" {
        return None;
    }
    ctx.push_opt(option, value);
    Some(args[2..].to_vec())
}

/// Scan the cluster for this option's letter. Letters before it must be
/// bool options from the command's dictionary; an unknown letter or an
/// earlier value-taking option stops the cluster and fails the match.
fn match_short(
    option: usize,
    args: &[String],
    ctx: &mut ParseContext,
    decls: &Declarations,
) -> Option<Vec<String>> {
    let cluster = &args[0][1..];

    for (at, letter) in cluster.char_indices() {
        let found = *decls.options_idx.get(&format!("-{letter}"))?;
        if found == option {
            let prefix = &cluster[..at];
            let rest = &cluster[at + letter.len_utf8()..];
            return match_short_found(option, prefix, rest, args, ctx, decls);
        }
        if !decls.options[found].is_bool() {
            return None;
        }
    }

    None
}

fn match_short_found(
    option: usize,
    prefix: &str,
    rest: &str,
    args: &[String],
    ctx: &mut ParseContext,
    decls: &Declarations,
) -> Option<Vec<String>> {
    let container = &decls.options[option];

    if container.is_bool() {
        if let Some(value) = rest.strip_prefix('=') {
            if value.is_empty() {
                return None;
            }
            ctx.push_opt(option, value);
            return Some(reoffer(prefix, &args[1..]));
        }

        ctx.push_opt(option, "true");
        let remainder = format!("{prefix}{rest}");
        return Some(reoffer(&remainder, &args[1..]));
    }

    let (value, consumed) = if let Some(value) = rest.strip_prefix('=') {
        if value.is_empty() {
            return None;
        }
        (value.to_string(), 1)
    } else if !rest.is_empty() {
        (rest.to_string(), 1)
    } else {
        let value = args.get(1)?;
        if value.starts_with('-') && value != "-" {
            return None;
        }
        (value.clone(), 2)
    };

    ctx.push_opt(option, value);
    Some(reoffer(prefix, &args[consumed..]))
}

/// Re-emit the unconsumed cluster letters as a fresh short token ahead
/// of the remaining args.
fn reoffer(cluster: &str, remaining: &[String]) -> Vec<String> {
    let mut result = Vec::with_capacity(remaining.len() + 1);
    if !cluster.is_empty() {
        result.push(format!("-{cluster}"));
    }
    result.extend(remaining.iter().cloned());
    result
}
