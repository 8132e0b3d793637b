//! Recursive descent over the token stream, building the usage
//! automaton.
//!
//! Single-token lookahead, `Result` short-circuiting throughout. The one
//! construction that deserves a pointer: a run of adjacent fragments
//! whose matchers are all option-flavored is folded into a fragment that
//! accepts the fragments in either order, which is how `-a -b` accepts
//! `-b -a` while `ARG1 ARG2` stays fixed.

use crate::container::Declarations;
use crate::errors::SpecError;
use crate::fsm::{Fsm, StateId};
use crate::lexer::{Token, TokenKind};
use crate::matcher::Matcher;

/// An automaton fragment under construction: entry and exit state.
type Fragment = (StateId, StateId);

/// Build the automaton for a token stream. Returns the prepared machine
/// and its entry state.
pub(crate) fn parse(
    spec: &str,
    tokens: &[Token],
    decls: &Declarations,
) -> Result<(Fsm, StateId), SpecError> {
    let parser = SpecParser {
        spec,
        tokens,
        position: 0,
        matched: None,
        reject_options: false,
        fsm: Fsm::default(),
        decls,
    };
    parser.run()
}

struct SpecParser<'p, 'c, 'a> {
    spec: &'p str,
    tokens: &'p [Token],
    position: usize,
    matched: Option<usize>,
    /// Set by a `--` atom; no option may appear in the spec after it.
    reject_options: bool,
    fsm: Fsm,
    decls: &'p Declarations<'c, 'a>,
}

impl<'p, 'c, 'a> SpecParser<'p, 'c, 'a> {
    fn run(mut self) -> Result<(Fsm, StateId), SpecError> {
        let (start, end) = self.seq(false)?;
        if !self.eof() {
            return Err(self.error_here("Unexpected input"));
        }

        self.fsm.set_terminal(end);
        self.fsm.prepare(start);
        Ok((self.fsm, start))
    }

    /// Concatenation, with adjacent option-only fragments folded into an
    /// order-independent diamond.
    fn seq(&mut self, required: bool) -> Result<Fragment, SpecError> {
        let mut groups: Vec<(StateId, StateId, bool)> = Vec::default();

        if required {
            let fragment = self.choice()?;
            self.push_group(&mut groups, fragment);
        }
        while self.can_atom() {
            let fragment = self.choice()?;
            self.push_group(&mut groups, fragment);
        }

        let mut iter = groups.into_iter();
        let Some((start, mut end, _)) = iter.next() else {
            let lone = self.fsm.add_state();
            return Ok((lone, lone));
        };
        for (next_start, next_end, _) in iter {
            self.fsm.absorb(end, next_start);
            end = next_end;
        }

        Ok((start, end))
    }

    fn push_group(&mut self, groups: &mut Vec<(StateId, StateId, bool)>, fragment: Fragment) {
        let (start, end) = fragment;
        let option_only = self.fsm.is_option_only(start);

        match groups.last().copied() {
            Some((last_start, last_end, true)) if option_only => {
                let (start, end) = self.reorder(last_start, last_end, start, end);
                let last = groups
                    .last_mut()
                    .unwrap_or_else(|| unreachable!("internal error - a last group was just read"));
                *last = (start, end, true);
            }
            _ => groups.push((start, end, option_only)),
        }
    }

    /// A fragment accepting `L(A)·L(B) ∪ L(B)·L(A)`, for two fragments
    /// certified option-only. The reversed order runs through clones so
    /// the two paths cannot interfere.
    fn reorder(
        &mut self,
        a_start: StateId,
        a_end: StateId,
        b_start: StateId,
        b_end: StateId,
    ) -> Fragment {
        let (a2_start, a2_end) = self.fsm.clone_fragment(a_start, a_end);
        let (b2_start, b2_end) = self.fsm.clone_fragment(b_start, b_end);

        let start = self.fsm.add_state();
        let end = self.fsm.add_state();
        self.fsm.add_transition(start, Matcher::Shortcut, a_start);
        self.fsm.add_transition(a_end, Matcher::Shortcut, b_start);
        self.fsm.add_transition(b_end, Matcher::Shortcut, end);
        self.fsm.add_transition(start, Matcher::Shortcut, b2_start);
        self.fsm.add_transition(b2_end, Matcher::Shortcut, a2_start);
        self.fsm.add_transition(a2_end, Matcher::Shortcut, end);

        (start, end)
    }

    fn choice(&mut self) -> Result<Fragment, SpecError> {
        let start = self.fsm.add_state();
        let end = self.fsm.add_state();

        let (s, e) = self.atom()?;
        self.fsm.add_transition(start, Matcher::Shortcut, s);
        self.fsm.add_transition(e, Matcher::Shortcut, end);
        while self.found(TokenKind::Choice) {
            let (s, e) = self.atom()?;
            self.fsm.add_transition(start, Matcher::Shortcut, s);
            self.fsm.add_transition(e, Matcher::Shortcut, end);
        }

        Ok((start, end))
    }

    fn atom(&mut self) -> Result<Fragment, SpecError> {
        if self.eof() {
            return Err(self.error("Unexpected end of input", self.spec.len()));
        }

        let (start, end) = if self.found(TokenKind::Arg) {
            let token = self.matched_token();
            let Some(argument) = self.decls.arguments_idx.get(&token.text).copied() else {
                return Err(self.error(format!("Undeclared arg {}", token.text), token.position));
            };
            self.single(Matcher::Arg { argument })
        } else if self.found(TokenKind::Options) {
            self.no_options_after_dashes()?;
            let options: Vec<usize> = (0..self.decls.options.len()).collect();
            self.single(Matcher::Options { options })
        } else if self.found(TokenKind::ShortOpt) || self.found(TokenKind::LongOpt) {
            self.no_options_after_dashes()?;
            let token = self.matched_token();
            let Some(option) = self.decls.options_idx.get(&token.text).copied() else {
                return Err(self.error(format!("Undeclared option {}", token.text), token.position));
            };
            // The `=<name>` descriptor is decoration for help output.
            let _ = self.found(TokenKind::OptValue);
            self.single(Matcher::Opt { option })
        } else if self.found(TokenKind::OptSeq) {
            self.no_options_after_dashes()?;
            let token = self.matched_token();
            let mut options = Vec::with_capacity(token.text.len());
            for letter in token.text.chars() {
                let Some(option) = self.decls.options_idx.get(&format!("-{letter}")).copied()
                else {
                    return Err(
                        self.error(format!("Undeclared option -{letter}"), token.position)
                    );
                };
                options.push(option);
            }
            self.single(Matcher::Options { options })
        } else if self.found(TokenKind::OpenPar) {
            let fragment = self.seq(true)?;
            self.expect(TokenKind::ClosePar)?;
            fragment
        } else if self.found(TokenKind::OpenSq) {
            let (start, end) = self.seq(true)?;
            self.fsm.add_transition(start, Matcher::Shortcut, end);
            self.expect(TokenKind::CloseSq)?;
            (start, end)
        } else if self.found(TokenKind::DoubleDash) {
            self.reject_options = true;
            self.single(Matcher::OptsEnd)
        } else {
            return Err(self.error_here(
                "Unexpected input: was expecting a command or a positional argument or an option",
            ));
        };

        if self.found(TokenKind::Rep) {
            self.fsm.add_transition(end, Matcher::Shortcut, start);
        }

        Ok((start, end))
    }

    fn single(&mut self, matcher: Matcher) -> Fragment {
        let start = self.fsm.add_state();
        let end = self.fsm.add_state();
        self.fsm.add_transition(start, matcher, end);
        (start, end)
    }

    fn no_options_after_dashes(&self) -> Result<(), SpecError> {
        if self.reject_options {
            let token = self.matched_token();
            return Err(self.error("No options after --", token.position));
        }
        Ok(())
    }

    fn can_atom(&self) -> bool {
        matches!(
            self.peek(),
            Some(
                TokenKind::Arg
                    | TokenKind::Options
                    | TokenKind::ShortOpt
                    | TokenKind::LongOpt
                    | TokenKind::OptSeq
                    | TokenKind::OpenPar
                    | TokenKind::OpenSq
                    | TokenKind::DoubleDash
            )
        )
    }

    fn found(&mut self, kind: TokenKind) -> bool {
        if self.peek() == Some(kind) {
            self.matched = Some(self.position);
            self.position += 1;
            return true;
        }
        false
    }

    fn expect(&mut self, kind: TokenKind) -> Result<(), SpecError> {
        if self.found(kind) {
            Ok(())
        } else {
            Err(self.error_here(format!("Was expecting {kind}")))
        }
    }

    fn peek(&self) -> Option<TokenKind> {
        self.tokens.get(self.position).map(|t| t.kind)
    }

    fn matched_token(&self) -> &Token {
        let index = self
            .matched
            .unwrap_or_else(|| unreachable!("internal error - no token was matched"));
        &self.tokens[index]
    }

    fn eof(&self) -> bool {
        self.position >= self.tokens.len()
    }

    fn error(&self, message: impl Into<String>, position: usize) -> SpecError {
        SpecError::parse(self.spec, message, position)
    }

    /// An error at the current token, or at end of input.
    fn error_here(&self, message: impl Into<String>) -> SpecError {
        let position = self
            .tokens
            .get(self.position)
            .map(|t| t.position)
            .unwrap_or(self.spec.len());
        self.error(message, position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::testing::Declared;
    use crate::errors::SpecErrorKind;
    use crate::fsm::testing::fsm_str;
    use crate::lexer::tokenize;
    use rstest::rstest;

    fn declared() -> Declared {
        Declared::default()
            .bool_opt(&["-a", "--all"])
            .bool_opt(&["-b", "--ball"])
            .argument("ARG")
    }

    fn compile(spec: &str) -> Result<String, SpecError> {
        let declared = declared();
        let tokens = tokenize(spec)?;
        let (fsm, start) = parse(spec, &tokens, &declared.view())?;
        Ok(fsm_str(&fsm, start, &declared.view()))
    }

    fn clean(expected: &str) -> String {
        expected
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[rstest]
    #[case("", "")]
    #[case("-a", "S1 -a (S2)")]
    #[case("--all", "S1 -a (S2)")]
    #[case("-a=<value>", "S1 -a (S2)")]
    #[case(
        "-a -b",
        "
        S1 -a S2
        S1 -b S4
        S2 -b (S3)
        S4 -a (S5)
        "
    )]
    #[case(
        "-a | -b",
        "
        S1 -a (S2)
        S1 -b (S3)
        "
    )]
    #[case("[ -a ]", "(S1) -a (S2)")]
    #[case(
        "-a...",
        "
        S1 -a (S2)
        (S2) -a (S2)
        "
    )]
    #[case(
        "[-a...]",
        "
        (S1) -a (S2)
        (S2) -a (S2)
        "
    )]
    #[case(
        "[-a]...",
        "
        (S1) -a (S2)
        (S2) -a (S2)
        "
    )]
    #[case(
        "-a -b | ARG",
        "
        S1 -a S2
        S2 -b (S3)
        S2 ARG (S4)
        "
    )]
    #[case(
        "-a (-b | ARG)",
        "
        S1 -a S2
        S2 -b (S3)
        S2 ARG (S4)
        "
    )]
    #[case(
        "( -a -b ) | ARG",
        "
        S1 -a S2
        S1 -b S4
        S1 ARG (S6)
        S2 -b (S3)
        S4 -a (S5)
        "
    )]
    #[case(
        "( -a -b ) | ARG...",
        "
        S1 -a S2
        S1 -b S4
        S1 ARG (S6)
        S2 -b (S3)
        S4 -a (S5)
        (S6) ARG (S6)
        "
    )]
    #[case("-ab", "S1 -ab (S2)")]
    #[case(
        "-a -- ARG",
        "
        S1 -a S2
        S1 -- S5
        S2 -- S3
        S3 ARG (S4)
        S5 -a S6
        S6 ARG (S4)
        "
    )]
    #[case("[OPTIONS]", "(S1) -ab (S2)")]
    fn parse_specs(#[case] spec: &str, #[case] expected: &str) {
        let actual = compile(spec).unwrap();
        assert_eq!(actual, clean(expected), "spec {spec:?}");
    }

    #[rstest]
    #[case("-c", "Undeclared option -c", 0)]
    #[case("--close", "Undeclared option --close", 0)]
    #[case("NOPE", "Undeclared arg NOPE", 0)]
    #[case("ARG -- -a", "No options after --", 7)]
    #[case("ARG -- --all", "No options after --", 7)]
    #[case("ARG -- -ab", "No options after --", 7)]
    #[case("ARG -- [OPTIONS]", "No options after --", 8)]
    #[case("-- ARG -a", "No options after --", 7)]
    #[case("-a [-- ARG] -b", "No options after --", 12)]
    #[case("-ac", "Undeclared option -c", 0)]
    #[case(")", "Unexpected input", 0)]
    #[case("]", "Unexpected input", 0)]
    #[case("|", "Unexpected input", 0)]
    #[case("-a |", "Unexpected end of input", 4)]
    #[case("( -a", "Was expecting ClosePar", 4)]
    #[case("[ -a", "Was expecting CloseSq", 4)]
    fn parse_errors(#[case] spec: &str, #[case] message: &str, #[case] position: usize) {
        let error = compile(spec).unwrap_err();

        assert_eq!(error.kind, SpecErrorKind::Parse, "spec {spec:?}");
        assert!(
            error.message.contains(message),
            "spec {spec:?}: message {:?} should contain {message:?}",
            error.message
        );
        assert_eq!(error.position, position, "spec {spec:?}");
    }

    #[test]
    fn prepared_specs_have_no_shortcuts_and_sorted_transitions() {
        let declared = declared();
        for spec in [
            "",
            "-a",
            "[-a | -b] ARG...",
            "(-a -b) | (ARG... -a)",
            "[OPTIONS] ARG [ARG]",
            "-a -- ARG...",
        ] {
            let tokens = tokenize(spec).unwrap();
            let (fsm, start) = parse(spec, &tokens, &declared.view()).unwrap();
            assert_no_shortcuts_and_sorted(&fsm, start, spec);
        }
    }

    fn assert_no_shortcuts_and_sorted(fsm: &Fsm, start: StateId, spec: &str) {
        let mut pending = vec![start];
        let mut seen = std::collections::HashSet::new();
        while let Some(id) = pending.pop() {
            if !seen.insert(id) {
                continue;
            }
            let state = fsm.state(id);
            let mut previous = 0;
            for transition in &state.transitions {
                assert!(
                    !transition.matcher.is_shortcut(),
                    "spec {spec:?} left a shortcut"
                );
                assert!(
                    transition.matcher.priority() >= previous,
                    "spec {spec:?} has unsorted transitions"
                );
                previous = transition.matcher.priority();
                pending.push(transition.next);
            }
        }
    }
}
