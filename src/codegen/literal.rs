//! Keyword-Argument Lexer
//!
//! Tokenizes and parses the small subset of Python literals that appear in
//! `marimo.App(...)` and `@app.cell(...)` argument lists.

use std::fmt;

/// Token types in an argument list
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TokenKind {
    Ident,
    Str,
    Int,
    Equals,
    Comma,
    OpenBracket,
    CloseBracket,
}

/// A token with its text content (strings already unescaped)
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
}

/// A Python literal value
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Str(String),
    Int(i64),
    Bool(bool),
    None,
    List(Vec<Literal>),
}

impl Literal {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Literal::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Literal::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Literal::Int(n) => Some(*n),
            _ => None,
        }
    }
}

/// Renders as Python source
impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Str(s) => write!(f, "\"{}\"", escape(s)),
            Literal::Int(n) => write!(f, "{}", n),
            Literal::Bool(true) => f.write_str("True"),
            Literal::Bool(false) => f.write_str("False"),
            Literal::None => f.write_str("None"),
            Literal::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
        }
    }
}

/// Render `name=value, ...`
pub fn format_kwargs(kwargs: &[(&str, Literal)]) -> String {
    kwargs
        .iter()
        .map(|(name, value)| format!("{}={}", name, value))
        .collect::<Vec<_>>()
        .join(", ")
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c => out.push(c),
        }
    }
    out
}

/// Tokenize an argument list (without the surrounding parentheses)
///
/// Returns `None` on characters outside the supported subset or an
/// unterminated string.
pub fn tokenize(src: &str) -> Option<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = src.char_indices().peekable();

    while let Some((start_idx, ch)) = chars.next() {
        let token = match ch {
            c if c.is_whitespace() => continue,
            '=' => Token {
                kind: TokenKind::Equals,
                text: "=".to_string(),
            },
            ',' => Token {
                kind: TokenKind::Comma,
                text: ",".to_string(),
            },
            '[' => Token {
                kind: TokenKind::OpenBracket,
                text: "[".to_string(),
            },
            ']' => Token {
                kind: TokenKind::CloseBracket,
                text: "]".to_string(),
            },

            // Quoted string, either quote style
            '"' | '\'' => {
                let quote = ch;
                let mut text = String::new();
                let mut closed = false;
                while let Some((_, c)) = chars.next() {
                    match c {
                        '\\' => match chars.next()?.1 {
                            'n' => text.push('\n'),
                            't' => text.push('\t'),
                            'r' => text.push('\r'),
                            other => text.push(other),
                        },
                        c if c == quote => {
                            closed = true;
                            break;
                        }
                        c => text.push(c),
                    }
                }
                if !closed {
                    return None;
                }
                Token {
                    kind: TokenKind::Str,
                    text,
                }
            }

            c if c.is_ascii_digit() || c == '-' => {
                let mut end_idx = start_idx + c.len_utf8();
                while let Some(&(idx, next_ch)) = chars.peek() {
                    if !next_ch.is_ascii_digit() {
                        break;
                    }
                    end_idx = idx + next_ch.len_utf8();
                    chars.next();
                }
                Token {
                    kind: TokenKind::Int,
                    text: src[start_idx..end_idx].to_string(),
                }
            }

            c if c.is_alphabetic() || c == '_' => {
                let mut end_idx = start_idx + c.len_utf8();
                while let Some(&(idx, next_ch)) = chars.peek() {
                    if !(next_ch.is_alphanumeric() || next_ch == '_') {
                        break;
                    }
                    end_idx = idx + next_ch.len_utf8();
                    chars.next();
                }
                Token {
                    kind: TokenKind::Ident,
                    text: src[start_idx..end_idx].to_string(),
                }
            }

            _ => return None,
        };
        tokens.push(token);
    }

    Some(tokens)
}

/// Parse `name=value, ...` into pairs, preserving order
pub fn parse_kwargs(src: &str) -> Option<Vec<(String, Literal)>> {
    let tokens = tokenize(src)?;
    let mut pos = 0;
    let mut kwargs = Vec::new();

    while pos < tokens.len() {
        let name = tokens.get(pos).filter(|t| t.kind == TokenKind::Ident)?;
        tokens.get(pos + 1).filter(|t| t.kind == TokenKind::Equals)?;
        pos += 2;
        let value = parse_value(&tokens, &mut pos)?;
        kwargs.push((name.text.clone(), value));

        match tokens.get(pos) {
            Some(t) if t.kind == TokenKind::Comma => pos += 1,
            Some(_) => return None,
            None => {}
        }
    }

    Some(kwargs)
}

fn parse_value(tokens: &[Token], pos: &mut usize) -> Option<Literal> {
    let token = tokens.get(*pos)?;
    *pos += 1;
    match token.kind {
        TokenKind::Str => Some(Literal::Str(token.text.clone())),
        TokenKind::Int => token.text.parse().ok().map(Literal::Int),
        TokenKind::Ident => match token.text.as_str() {
            "True" => Some(Literal::Bool(true)),
            "False" => Some(Literal::Bool(false)),
            "None" => Some(Literal::None),
            _ => None,
        },
        TokenKind::OpenBracket => {
            let mut items = Vec::new();
            loop {
                match tokens.get(*pos) {
                    Some(t) if t.kind == TokenKind::CloseBracket => {
                        *pos += 1;
                        return Some(Literal::List(items));
                    }
                    Some(_) => {
                        items.push(parse_value(tokens, pos)?);
                        if let Some(t) = tokens.get(*pos) {
                            if t.kind == TokenKind::Comma {
                                *pos += 1;
                            }
                        }
                    }
                    None => return None,
                }
            }
        }
        _ => None,
    }
}
