//! Positional argument matching.

use crate::matcher::ParseContext;

/// Capture one argv element that is not option-shaped. Once
/// `reject_options` is set, option-shaped tokens are taken literally.
pub(crate) fn try_match(
    argument: usize,
    args: &[String],
    ctx: &mut ParseContext,
) -> Option<Vec<String>> {
    if args.is_empty() {
        return None;
    }

    let head = args[0].as_str();
    if !ctx.reject_options && head.starts_with('-') && head != "-" {
        return None;
    }

    ctx.push_arg(argument, head);
    Some(args[1..].to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn empty_args_rejected() {
        let mut ctx = ParseContext::new();

        assert!(try_match(0, &[], &mut ctx).is_none());
        assert!(ctx.args.is_empty());
    }

    #[test]
    fn captures_head() {
        let mut ctx = ParseContext::new();
        let args = strings(&["a", "b"]);

        let remaining = try_match(0, &args, &mut ctx).unwrap();

        assert_eq!(remaining, strings(&["b"]));
        assert_eq!(ctx.args[&0], strings(&["a"]));
    }

    #[test]
    fn lone_dash_is_a_value() {
        let mut ctx = ParseContext::new();
        let args = strings(&["-"]);

        let remaining = try_match(0, &args, &mut ctx).unwrap();

        assert!(remaining.is_empty());
        assert_eq!(ctx.args[&0], strings(&["-"]));
    }

    #[test]
    fn option_shaped_token_rejected() {
        let mut ctx = ParseContext::new();

        assert!(try_match(0, &strings(&["-v"]), &mut ctx).is_none());
    }

    #[test]
    fn option_shaped_token_accepted_after_opts_end() {
        let mut ctx = ParseContext::new();
        ctx.reject_options = true;

        let remaining = try_match(0, &strings(&["-v"]), &mut ctx).unwrap();

        assert!(remaining.is_empty());
        assert_eq!(ctx.args[&0], strings(&["-v"]));
    }
}
