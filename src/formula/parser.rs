//! Lexer and recursive-descent parser for formula text.
//!
//! Grammar, loosest binding first:
//! - additive: `+` `-`
//! - multiplicative: `*` `/`
//! - power: `^` (right associative)
//! - unary minus
//! - atoms: number literals (with scientific notation), identifiers,
//!   single-argument function calls, parenthesised expressions
//!
//! Identifiers resolve at parse time: known function names (only when
//! applied with `(`), the constants `pi` and `e` (folded to literals), and
//! everything else becomes a variable reference.

use std::iter::Peekable;
use std::str::Chars;

use super::errors::FormulaError;

/// Single-argument functions the evaluator knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Func {
    Abs,
    Ln,
    Log10,
    Sqrt,
    Exp,
    Floor,
    Ceil,
    Round,
}

impl Func {
    fn from_name(name: &str) -> Option<Func> {
        match name {
            "abs" => Some(Func::Abs),
            // `log` is the natural logarithm, as in exp4j-style libraries.
            "ln" | "log" => Some(Func::Ln),
            "log10" => Some(Func::Log10),
            "sqrt" => Some(Func::Sqrt),
            "exp" => Some(Func::Exp),
            "floor" => Some(Func::Floor),
            "ceil" => Some(Func::Ceil),
            "round" => Some(Func::Round),
            _ => None,
        }
    }

    /// Applies the function with plain IEEE-754 semantics; out-of-domain
    /// arguments yield `NaN` rather than an error.
    pub fn apply(self, x: f64) -> f64 {
        match self {
            Func::Abs => x.abs(),
            Func::Ln => x.ln(),
            Func::Log10 => x.log10(),
            Func::Sqrt => x.sqrt(),
            Func::Exp => x.exp(),
            Func::Floor => x.floor(),
            Func::Ceil => x.ceil(),
            Func::Round => x.round(),
        }
    }
}

/// Parsed formula tree. Immutable after parsing.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Num(f64),
    Var(String),
    Neg(Box<Expr>),
    Bin(BinOp, Box<Expr>, Box<Expr>),
    Call(Func, Box<Expr>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

impl Expr {
    /// Appends every variable referenced by this subtree to `out` in
    /// first-seen order, skipping names already recorded.
    pub fn collect_vars(&self, out: &mut Vec<String>) {
        match self {
            Expr::Num(_) => {}
            Expr::Var(name) => {
                if !out.iter().any(|n| n == name) {
                    out.push(name.clone());
                }
            }
            Expr::Neg(inner) | Expr::Call(_, inner) => inner.collect_vars(out),
            Expr::Bin(_, lhs, rhs) => {
                lhs.collect_vars(out);
                rhs.collect_vars(out);
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Num(f64),
    Ident(String),
    Plus,
    Minus,
    Star,
    Slash,
    Caret,
    LParen,
    RParen,
    Eof,
}

struct Lexer<'a> {
    chars: Peekable<Chars<'a>>,
    position: usize,
}

impl<'a> Lexer<'a> {
    fn new(input: &'a str) -> Self {
        Lexer {
            chars: input.chars().peekable(),
            position: 0,
        }
    }

    fn advance(&mut self) -> Option<char> {
        self.position += 1;
        self.chars.next()
    }

    fn next_token(&mut self) -> Result<Token, FormulaError> {
        while matches!(self.chars.peek(), Some(c) if c.is_whitespace()) {
            self.advance();
        }

        let pos = self.position;
        match self.chars.peek() {
            None => Ok(Token::Eof),
            Some(&c) => match c {
                '+' => {
                    self.advance();
                    Ok(Token::Plus)
                }
                '-' => {
                    self.advance();
                    Ok(Token::Minus)
                }
                '*' => {
                    self.advance();
                    Ok(Token::Star)
                }
                '/' => {
                    self.advance();
                    Ok(Token::Slash)
                }
                '^' => {
                    self.advance();
                    Ok(Token::Caret)
                }
                '(' => {
                    self.advance();
                    Ok(Token::LParen)
                }
                ')' => {
                    self.advance();
                    Ok(Token::RParen)
                }
                c if c.is_ascii_digit() || c == '.' => self.read_number(),
                c if c.is_ascii_alphabetic() || c == '_' => {
                    Ok(Token::Ident(self.read_identifier()))
                }
                _ => Err(FormulaError::parse(
                    pos,
                    format!("unexpected character '{}'", c),
                )),
            },
        }
    }

    fn read_number(&mut self) -> Result<Token, FormulaError> {
        let pos = self.position;
        let mut text = String::new();
        let mut seen_dot = false;

        while let Some(&c) = self.chars.peek() {
            if c.is_ascii_digit() {
                text.push(c);
                self.advance();
            } else if c == '.' && !seen_dot {
                seen_dot = true;
                text.push(c);
                self.advance();
            } else {
                break;
            }
        }

        // Scientific notation, e.g. 1e6 or 50e-6.
        if matches!(self.chars.peek(), Some(&c) if c == 'e' || c == 'E') {
            text.push('e');
            self.advance();
            if matches!(self.chars.peek(), Some(&c) if c == '+' || c == '-') {
                text.push(self.advance().unwrap_or('+'));
            }
            while matches!(self.chars.peek(), Some(c) if c.is_ascii_digit()) {
                text.push(self.advance().unwrap_or('0'));
            }
        }

        text.parse::<f64>().map(Token::Num).map_err(|_| {
            FormulaError::parse(pos, format!("invalid number '{}'", text))
        })
    }

    fn read_identifier(&mut self) -> String {
        let mut name = String::new();
        while matches!(self.chars.peek(), Some(&c) if c.is_ascii_alphanumeric() || c == '_') {
            name.push(self.advance().unwrap_or('_'));
        }
        name
    }
}

struct Parser<'a> {
    lexer: Lexer<'a>,
    current: Token,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Result<Self, FormulaError> {
        let mut lexer = Lexer::new(input);
        let current = lexer.next_token()?;
        Ok(Parser { lexer, current })
    }

    fn advance(&mut self) -> Result<(), FormulaError> {
        self.current = self.lexer.next_token()?;
        Ok(())
    }

    fn parse_all(&mut self) -> Result<Expr, FormulaError> {
        let expr = self.parse_additive()?;
        if self.current != Token::Eof {
            return Err(FormulaError::parse(
                self.lexer.position,
                format!("unexpected trailing token {:?}", self.current),
            ));
        }
        Ok(expr)
    }

    fn parse_additive(&mut self) -> Result<Expr, FormulaError> {
        let mut lhs = self.parse_multiplicative()?;
        loop {
            let op = match self.current {
                Token::Plus => BinOp::Add,
                Token::Minus => BinOp::Sub,
                _ => break,
            };
            self.advance()?;
            let rhs = self.parse_multiplicative()?;
            lhs = Expr::Bin(op, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_multiplicative(&mut self) -> Result<Expr, FormulaError> {
        let mut lhs = self.parse_power()?;
        loop {
            let op = match self.current {
                Token::Star => BinOp::Mul,
                Token::Slash => BinOp::Div,
                _ => break,
            };
            self.advance()?;
            let rhs = self.parse_power()?;
            lhs = Expr::Bin(op, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_power(&mut self) -> Result<Expr, FormulaError> {
        let base = self.parse_unary()?;
        if self.current == Token::Caret {
            self.advance()?;
            let exp = self.parse_power()?; // right associative
            Ok(Expr::Bin(BinOp::Pow, Box::new(base), Box::new(exp)))
        } else {
            Ok(base)
        }
    }

    fn parse_unary(&mut self) -> Result<Expr, FormulaError> {
        if self.current == Token::Minus {
            self.advance()?;
            Ok(Expr::Neg(Box::new(self.parse_unary()?)))
        } else {
            self.parse_atom()
        }
    }

    fn parse_atom(&mut self) -> Result<Expr, FormulaError> {
        match self.current.clone() {
            Token::Num(n) => {
                self.advance()?;
                Ok(Expr::Num(n))
            }
            Token::Ident(name) => {
                self.advance()?;
                if self.current == Token::LParen {
                    let func = Func::from_name(&name).ok_or_else(|| {
                        FormulaError::parse(
                            self.lexer.position,
                            format!("unknown function '{}'", name),
                        )
                    })?;
                    self.advance()?;
                    let arg = self.parse_additive()?;
                    self.expect_rparen()?;
                    Ok(Expr::Call(func, Box::new(arg)))
                } else {
                    match name.as_str() {
                        "pi" => Ok(Expr::Num(std::f64::consts::PI)),
                        "e" => Ok(Expr::Num(std::f64::consts::E)),
                        _ => Ok(Expr::Var(name)),
                    }
                }
            }
            Token::LParen => {
                self.advance()?;
                let expr = self.parse_additive()?;
                self.expect_rparen()?;
                Ok(expr)
            }
            other => Err(FormulaError::parse(
                self.lexer.position,
                format!("unexpected token {:?}", other),
            )),
        }
    }

    fn expect_rparen(&mut self) -> Result<(), FormulaError> {
        if self.current != Token::RParen {
            return Err(FormulaError::parse(self.lexer.position, "expected ')'"));
        }
        self.advance()
    }
}

/// Parses formula text into an [`Expr`] tree.
pub fn parse(input: &str) -> Result<Expr, FormulaError> {
    if input.trim().is_empty() {
        return Err(FormulaError::parse(0, "empty expression"));
    }
    let mut parser = Parser::new(input)?;
    parser.parse_all()
}
