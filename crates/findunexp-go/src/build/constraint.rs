//! `//go:build` expression parsing and evaluation.

use thiserror::Error;

/// A parsed build constraint expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    /// A bare build tag.
    Tag(String),
    /// `!x`
    Not(Box<Expr>),
    /// `x && y`
    And(Box<Expr>, Box<Expr>),
    /// `x || y`
    Or(Box<Expr>, Box<Expr>),
}

/// Malformed constraint expression.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConstraintError {
    /// Input ended where an operand was expected.
    #[error("unexpected end of expression")]
    UnexpectedEnd,
    /// A token appeared where it is not allowed.
    #[error("unexpected token `{0}`")]
    UnexpectedToken(String),
    /// A character that cannot start any token.
    #[error("invalid character {0:?}")]
    InvalidChar(char),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    LParen,
    RParen,
    Not,
    And,
    Or,
    Tag(String),
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LParen => f.write_str("("),
            Self::RParen => f.write_str(")"),
            Self::Not => f.write_str("!"),
            Self::And => f.write_str("&&"),
            Self::Or => f.write_str("||"),
            Self::Tag(t) => f.write_str(t),
        }
    }
}

fn is_tag_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '.'
}

fn tokenize(input: &str) -> Result<Vec<Token>, ConstraintError> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        match c {
            c if c.is_whitespace() => {}
            '(' => tokens.push(Token::LParen),
            ')' => tokens.push(Token::RParen),
            '!' => tokens.push(Token::Not),
            '&' | '|' => {
                if chars.next_if(|&(_, n)| n == c).is_none() {
                    return Err(ConstraintError::InvalidChar(c));
                }
                tokens.push(if c == '&' { Token::And } else { Token::Or });
            }
            c if is_tag_char(c) => {
                let mut end = i + c.len_utf8();
                while let Some(&(j, n)) = chars.peek() {
                    if !is_tag_char(n) {
                        break;
                    }
                    end = j + n.len_utf8();
                    chars.next();
                }
                tokens.push(Token::Tag(input[i..end].to_string()));
            }
            other => return Err(ConstraintError::InvalidChar(other)),
        }
    }
    Ok(tokens)
}

struct ExprParser {
    tokens: Vec<Token>,
    pos: usize,
}

impl ExprParser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let tok = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        tok
    }

    fn or(&mut self) -> Result<Expr, ConstraintError> {
        let mut lhs = self.and()?;
        while self.peek() == Some(&Token::Or) {
            self.pos += 1;
            lhs = Expr::Or(Box::new(lhs), Box::new(self.and()?));
        }
        Ok(lhs)
    }

    fn and(&mut self) -> Result<Expr, ConstraintError> {
        let mut lhs = self.not()?;
        while self.peek() == Some(&Token::And) {
            self.pos += 1;
            lhs = Expr::And(Box::new(lhs), Box::new(self.not()?));
        }
        Ok(lhs)
    }

    fn not(&mut self) -> Result<Expr, ConstraintError> {
        if self.peek() == Some(&Token::Not) {
            self.pos += 1;
            return Ok(Expr::Not(Box::new(self.not()?)));
        }
        self.atom()
    }

    fn atom(&mut self) -> Result<Expr, ConstraintError> {
        match self.next() {
            Some(Token::Tag(t)) => Ok(Expr::Tag(t)),
            Some(Token::LParen) => {
                let inner = self.or()?;
                match self.next() {
                    Some(Token::RParen) => Ok(inner),
                    Some(other) => Err(ConstraintError::UnexpectedToken(other.to_string())),
                    None => Err(ConstraintError::UnexpectedEnd),
                }
            }
            Some(other) => Err(ConstraintError::UnexpectedToken(other.to_string())),
            None => Err(ConstraintError::UnexpectedEnd),
        }
    }
}

impl Expr {
    /// Parses the text after `//go:build`.
    ///
    /// # Errors
    ///
    /// Returns [`ConstraintError`] if the expression is malformed.
    pub fn parse(input: &str) -> Result<Self, ConstraintError> {
        let mut parser = ExprParser {
            tokens: tokenize(input)?,
            pos: 0,
        };
        let expr = parser.or()?;
        match parser.next() {
            None => Ok(expr),
            Some(tok) => Err(ConstraintError::UnexpectedToken(tok.to_string())),
        }
    }

    /// Evaluates the expression, asking `has_tag` about each tag.
    pub fn eval(&self, has_tag: &dyn Fn(&str) -> bool) -> bool {
        match self {
            Self::Tag(t) => has_tag(t),
            Self::Not(x) => !x.eval(has_tag),
            Self::And(a, b) => a.eval(has_tag) && b.eval(has_tag),
            Self::Or(a, b) => a.eval(has_tag) || b.eval(has_tag),
        }
    }
}

/// Extracts the `//go:build` expression from a file header.
///
/// Only the leading run of blank and `//` comment lines is searched, as the
/// directive must precede the package clause.
#[must_use]
pub fn find_go_build(source: &str) -> Option<&str> {
    for line in source.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let Some(comment) = line.strip_prefix("//") else {
            return None;
        };
        if let Some(expr) = comment.strip_prefix("go:build") {
            if expr.is_empty() || expr.starts_with([' ', '\t']) {
                return Some(expr.trim());
            }
        }
    }
    None
}

/// Extracts the bodies of legacy `// +build` lines from a file header.
///
/// A line only counts when a blank line follows it before the package
/// clause.
#[must_use]
pub fn find_plus_build(source: &str) -> Vec<&str> {
    let mut accepted = Vec::new();
    let mut pending = Vec::new();
    for line in source.lines() {
        let line = line.trim();
        if line.is_empty() {
            accepted.append(&mut pending);
            continue;
        }
        let Some(comment) = line.strip_prefix("//") else {
            break;
        };
        if let Some(rest) = comment.trim_start().strip_prefix("+build") {
            if rest.is_empty() || rest.starts_with([' ', '\t']) {
                pending.push(rest.trim());
            }
        }
    }
    accepted
}

/// Parses the body of one `// +build` line.
///
/// Space-separated options are ORed; comma-separated terms within an
/// option are ANDed; a term may be negated with a single `!`.
///
/// # Errors
///
/// Returns [`ConstraintError`] for an empty line or a malformed term.
pub fn parse_plus_build(line: &str) -> Result<Expr, ConstraintError> {
    let mut result: Option<Expr> = None;
    for option in line.split_whitespace() {
        let mut conj: Option<Expr> = None;
        for term in option.split(',') {
            let (negated, tag) = match term.strip_prefix('!') {
                Some(t) => (true, t),
                None => (false, term),
            };
            if tag.is_empty() || tag.starts_with('!') {
                return Err(ConstraintError::UnexpectedToken(term.to_string()));
            }
            if let Some(c) = tag.chars().find(|&c| !is_tag_char(c)) {
                return Err(ConstraintError::InvalidChar(c));
            }
            let mut e = Expr::Tag(tag.to_string());
            if negated {
                e = Expr::Not(Box::new(e));
            }
            conj = Some(match conj {
                Some(lhs) => Expr::And(Box::new(lhs), Box::new(e)),
                None => e,
            });
        }
        if let Some(c) = conj {
            result = Some(match result {
                Some(lhs) => Expr::Or(Box::new(lhs), Box::new(c)),
                None => c,
            });
        }
    }
    result.ok_or(ConstraintError::UnexpectedEnd)
}
