//! Lexer for the usage grammar.

use crate::errors::SpecError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TokenKind {
    Arg,
    Options,
    ShortOpt,
    LongOpt,
    OptSeq,
    OptValue,
    OpenPar,
    ClosePar,
    OpenSq,
    CloseSq,
    Choice,
    Rep,
    DoubleDash,
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            TokenKind::Arg => "Arg",
            TokenKind::Options => "Options",
            TokenKind::ShortOpt => "ShortOpt",
            TokenKind::LongOpt => "LongOpt",
            TokenKind::OptSeq => "OptSeq",
            TokenKind::OptValue => "OptValue",
            TokenKind::OpenPar => "OpenPar",
            TokenKind::ClosePar => "ClosePar",
            TokenKind::OpenSq => "OpenSq",
            TokenKind::CloseSq => "CloseSq",
            TokenKind::Choice => "Choice",
            TokenKind::Rep => "Rep",
            TokenKind::DoubleDash => "DblDash",
        };
        write!(f, "{name}")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Token {
    pub(crate) kind: TokenKind,
    pub(crate) text: String,
    pub(crate) position: usize,
}

impl Token {
    fn new(kind: TokenKind, text: impl Into<String>, position: usize) -> Self {
        Self {
            kind,
            text: text.into(),
            position,
        }
    }
}

fn is_letter(c: u8) -> bool {
    c.is_ascii_lowercase() || c.is_ascii_uppercase()
}

fn is_ok_in_arg(c: u8) -> bool {
    c.is_ascii_uppercase() || c.is_ascii_digit() || c == b'_'
}

fn is_ok_in_long_opt(c: u8, first: bool) -> bool {
    if first {
        is_letter(c)
    } else {
        is_letter(c) || c.is_ascii_digit() || c == b'_' || c == b'-'
    }
}

/// Split the usage string into tokens, or report the byte position of
/// the first offending character.
pub(crate) fn tokenize(usage: &str) -> Result<Vec<Token>, SpecError> {
    let bytes = usage.as_bytes();
    let eof = bytes.len();
    let mut pos = 0;
    let mut tokens = Vec::default();

    let err = |message: &str, position: usize| SpecError::lex(usage, message, position);

    while pos < eof {
        match bytes[pos] {
            b' ' | b'\t' => pos += 1,
            b'[' => {
                tokens.push(Token::new(TokenKind::OpenSq, "[", pos));
                pos += 1;
            }
            b']' => {
                tokens.push(Token::new(TokenKind::CloseSq, "]", pos));
                pos += 1;
            }
            b'(' => {
                tokens.push(Token::new(TokenKind::OpenPar, "(", pos));
                pos += 1;
            }
            b')' => {
                tokens.push(Token::new(TokenKind::ClosePar, ")", pos));
                pos += 1;
            }
            b'|' => {
                tokens.push(Token::new(TokenKind::Choice, "|", pos));
                pos += 1;
            }
            b'.' => {
                let start = pos;
                pos += 1;
                if pos >= eof || bytes[pos] != b'.' {
                    return Err(err("Unexpected end of usage, was expecting '..'", pos));
                }
                pos += 1;
                if pos >= eof || bytes[pos] != b'.' {
                    return Err(err("Unexpected end of usage, was expecting '.'", pos));
                }
                tokens.push(Token::new(TokenKind::Rep, "...", start));
                pos += 1;
            }
            b'-' => {
                let start = pos;
                pos += 1;
                if pos >= eof {
                    return Err(err(
                        "Unexpected end of usage, was expecting an option name",
                        pos,
                    ));
                }

                match bytes[pos] {
                    c if is_letter(c) => {
                        pos += 1;
                        while pos < eof && is_letter(bytes[pos]) {
                            pos += 1;
                        }
                        if pos < eof && bytes[pos] == b'-' {
                            return Err(err("Invalid syntax", pos));
                        }
                        if pos - start > 2 {
                            tokens.push(Token::new(TokenKind::OptSeq, &usage[start + 1..pos], start));
                        } else {
                            tokens.push(Token::new(TokenKind::ShortOpt, &usage[start..pos], start));
                        }
                    }
                    b'-' => {
                        pos += 1;
                        if pos == eof || bytes[pos] == b' ' || bytes[pos] == b'\t' {
                            tokens.push(Token::new(TokenKind::DoubleDash, "--", start));
                            continue;
                        }
                        let name_start = pos;
                        while pos < eof && is_ok_in_long_opt(bytes[pos], pos == name_start) {
                            pos += 1;
                        }
                        if pos - start == 2 {
                            return Err(err("Was expecting a long option name", pos));
                        }
                        tokens.push(Token::new(TokenKind::LongOpt, &usage[start..pos], start));
                    }
                    _ => {
                        return Err(err("Was expecting an option name", pos));
                    }
                }
            }
            b'=' => {
                let start = pos;
                pos += 1;
                if pos >= eof || bytes[pos] != b'<' {
                    return Err(err("Unexpected end of usage, was expecting '=<'", pos));
                }
                let mut closed = false;
                while pos < eof {
                    closed = bytes[pos] == b'>';
                    if closed {
                        break;
                    }
                    pos += 1;
                }
                if !closed {
                    return Err(err("Unclosed option value", pos));
                }
                if pos - start == 2 {
                    return Err(err("Was expecting an option value", pos));
                }
                pos += 1;
                tokens.push(Token::new(TokenKind::OptValue, &usage[start..pos], start));
            }
            c if c.is_ascii_uppercase() => {
                let start = pos;
                pos += 1;
                while pos < eof && is_ok_in_arg(bytes[pos]) {
                    pos += 1;
                }
                let text = &usage[start..pos];
                let kind = if text == "OPTIONS" {
                    TokenKind::Options
                } else {
                    TokenKind::Arg
                };
                tokens.push(Token::new(kind, text, start));
            }
            _ => {
                return Err(err("Unexpected input", pos));
            }
        }
    }

    Ok(tokens)
}
