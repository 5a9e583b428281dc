//! Expression and equation parser.
//!
//! Hybrid design: a nom tokenizer feeding a recursive-descent parser that
//! threads the arena `Context`. The tokenizer records whether each token was
//! glued to its predecessor (no intervening whitespace); gluing is what
//! distinguishes the constant-fraction literal `4/9` from the division
//! `4 / 9`, and what lets `2x`, `3x(x+1)` and `(3+x)(4+x)` parse as implicit
//! multiplication.

use crate::error::ParseError;
use mathwalk_ast::{Context, Equation, Expr, ExprId, RelOp};
use nom::{
    branch::alt,
    bytes::complete::{tag, take_while1},
    character::complete::{char, digit1},
    combinator::{map, map_res},
    sequence::{pair, preceded},
    IResult,
};
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{pow::Pow, Zero};

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Integer(BigInt),
    Decimal(BigRational),
    Ident(String),
    Plus,
    Minus,
    Star,
    Slash,
    Caret,
    LParen,
    RParen,
    Comma,
    Rel(RelOp),
}

/// One token plus whether it directly touched the previous token.
#[derive(Debug, Clone)]
struct Spanned {
    token: Token,
    glued: bool,
}

fn integer(input: &str) -> IResult<&str, Token> {
    map_res(digit1, |s: &str| {
        s.parse::<BigInt>().map(Token::Integer)
    })(input)
}

fn decimal(input: &str) -> IResult<&str, Token> {
    map_res(
        pair(digit1, preceded(char('.'), digit1)),
        |(int_part, frac_part): (&str, &str)| {
            let scale = BigInt::from(10u32).pow(frac_part.len() as u32);
            format!("{}{}", int_part, frac_part)
                .parse::<BigInt>()
                .map(|numer| Token::Decimal(BigRational::new(numer, scale)))
        },
    )(input)
}

fn ident(input: &str) -> IResult<&str, Token> {
    map(take_while1(|c: char| c.is_ascii_alphabetic()), |s: &str| {
        Token::Ident(s.to_string())
    })(input)
}

fn operator(input: &str) -> IResult<&str, Token> {
    alt((
        map(tag("<="), |_| Token::Rel(RelOp::Leq)),
        map(tag(">="), |_| Token::Rel(RelOp::Geq)),
        map(char('<'), |_| Token::Rel(RelOp::Lt)),
        map(char('>'), |_| Token::Rel(RelOp::Gt)),
        map(char('='), |_| Token::Rel(RelOp::Eq)),
        map(char('+'), |_| Token::Plus),
        map(char('-'), |_| Token::Minus),
        map(char('*'), |_| Token::Star),
        map(char('/'), |_| Token::Slash),
        map(char('^'), |_| Token::Caret),
        map(char('('), |_| Token::LParen),
        map(char(')'), |_| Token::RParen),
        map(char(','), |_| Token::Comma),
    ))(input)
}

fn token(input: &str) -> IResult<&str, Token> {
    alt((decimal, integer, ident, operator))(input)
}

fn tokenize(input: &str) -> Result<Vec<Spanned>, ParseError> {
    let mut tokens = Vec::new();
    let mut rest = input;
    loop {
        let trimmed = rest.trim_start();
        if trimmed.is_empty() {
            return Ok(tokens);
        }
        let glued = trimmed.len() == rest.len() && !tokens.is_empty();
        match token(trimmed) {
            Ok((remaining, tok)) => {
                tokens.push(Spanned { token: tok, glued });
                rest = remaining;
            }
            Err(_) => return Err(ParseError::UnexpectedChar(trimmed.to_string())),
        }
    }
}

struct Parser<'a> {
    tokens: Vec<Spanned>,
    pos: usize,
    ctx: &'a mut Context,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|s| &s.token)
    }

    fn peek_at(&self, offset: usize) -> Option<&Spanned> {
        self.tokens.get(self.pos + offset)
    }

    fn bump(&mut self) -> Option<Token> {
        let tok = self.tokens.get(self.pos).map(|s| s.token.clone());
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn expect(&mut self, expected: &Token) -> Result<(), ParseError> {
        match self.bump() {
            Some(tok) if tok == *expected => Ok(()),
            Some(tok) => Err(ParseError::UnexpectedToken(format!("{:?}", tok))),
            None => Err(ParseError::UnexpectedEnd),
        }
    }

    fn expression(&mut self) -> Result<ExprId, ParseError> {
        let mut acc = self.term()?;
        loop {
            match self.peek() {
                Some(Token::Plus) => {
                    self.pos += 1;
                    let rhs = self.term()?;
                    acc = match self.ctx.get(acc).clone() {
                        Expr::Add(mut terms) => {
                            terms.push(rhs);
                            self.ctx.add(Expr::Add(terms))
                        }
                        _ => self.ctx.add(Expr::Add(vec![acc, rhs])),
                    };
                }
                Some(Token::Minus) => {
                    self.pos += 1;
                    let rhs = self.term()?;
                    acc = self.ctx.add(Expr::Sub(acc, rhs));
                }
                _ => return Ok(acc),
            }
        }
    }

    /// A factor can follow the previous one without an operator when it
    /// starts with an identifier or an opening parenthesis. Two adjacent
    /// number literals are never an implicit product.
    fn starts_implicit_factor(&self) -> bool {
        matches!(self.peek(), Some(Token::Ident(_)) | Some(Token::LParen))
    }

    fn term(&mut self) -> Result<ExprId, ParseError> {
        let mut acc = self.unary()?;
        loop {
            match self.peek() {
                Some(Token::Star) => {
                    self.pos += 1;
                    let rhs = self.unary()?;
                    acc = match self.ctx.get(acc).clone() {
                        Expr::Mul(false, mut factors) => {
                            factors.push(rhs);
                            self.ctx.add(Expr::Mul(false, factors))
                        }
                        _ => self.ctx.add(Expr::Mul(false, vec![acc, rhs])),
                    };
                }
                Some(Token::Slash) => {
                    self.pos += 1;
                    let rhs = self.unary()?;
                    acc = self.ctx.add(Expr::Div(acc, rhs));
                }
                _ if self.starts_implicit_factor() => {
                    let rhs = self.power()?;
                    acc = self.merge_implicit(acc, rhs);
                }
                _ => return Ok(acc),
            }
        }
    }

    /// Attach an implicit factor: `2 * 3x` keeps the implicit unit inside
    /// the last explicit factor, so flattening preserves `3x` as one
    /// polynomial term.
    fn merge_implicit(&mut self, acc: ExprId, rhs: ExprId) -> ExprId {
        match self.ctx.get(acc).clone() {
            Expr::Mul(true, mut factors) => {
                factors.push(rhs);
                self.ctx.add(Expr::Mul(true, factors))
            }
            Expr::Mul(false, mut factors) => match factors.pop() {
                Some(last) => {
                    let merged = self.merge_implicit(last, rhs);
                    factors.push(merged);
                    self.ctx.add(Expr::Mul(false, factors))
                }
                None => self.ctx.add(Expr::Mul(true, vec![acc, rhs])),
            },
            _ => self.ctx.add(Expr::Mul(true, vec![acc, rhs])),
        }
    }

    fn unary(&mut self) -> Result<ExprId, ParseError> {
        if matches!(self.peek(), Some(Token::Minus)) {
            self.pos += 1;
            let inner = self.unary()?;
            return Ok(self.ctx.add(Expr::Neg(inner)));
        }
        self.power()
    }

    fn power(&mut self) -> Result<ExprId, ParseError> {
        let base = self.atom()?;
        if matches!(self.peek(), Some(Token::Caret)) {
            self.pos += 1;
            // Right-associative; the exponent may carry its own sign.
            let exp = self.unary()?;
            return Ok(self.ctx.add(Expr::Pow(base, exp)));
        }
        Ok(base)
    }

    /// A glued `int/int` pair is one constant-fraction literal, unless a
    /// caret follows and would claim the denominator (`2/3^2`).
    fn fraction_literal(&mut self, numer: &BigInt) -> Option<ExprId> {
        let slash = self.peek_at(0)?;
        if slash.token != Token::Slash || !slash.glued {
            return None;
        }
        let den_tok = self.peek_at(1)?;
        let den = match (&den_tok.token, den_tok.glued) {
            (Token::Integer(d), true) => d.clone(),
            _ => return None,
        };
        if let Some(next) = self.peek_at(2) {
            if next.token == Token::Caret {
                return None;
            }
        }
        if den.is_zero() {
            return None;
        }
        self.pos += 2;
        let n = self.ctx.big(numer.clone());
        let d = self.ctx.big(den);
        Some(self.ctx.add(Expr::Div(n, d)))
    }

    fn atom(&mut self) -> Result<ExprId, ParseError> {
        match self.bump() {
            Some(Token::Integer(n)) => {
                if let Some(frac) = self.fraction_literal(&n) {
                    return Ok(frac);
                }
                Ok(self.ctx.big(n))
            }
            Some(Token::Decimal(r)) => Ok(self.ctx.rat(&r)),
            Some(Token::Ident(name)) => {
                if matches!(self.peek(), Some(Token::LParen)) {
                    self.pos += 1;
                    let mut args = vec![self.expression()?];
                    while matches!(self.peek(), Some(Token::Comma)) {
                        self.pos += 1;
                        args.push(self.expression()?);
                    }
                    self.expect(&Token::RParen)?;
                    return Ok(self.ctx.add(Expr::Function(name, args)));
                }
                Ok(self.ctx.add(Expr::Symbol(name)))
            }
            Some(Token::LParen) => {
                let inner = self.expression()?;
                self.expect(&Token::RParen)?;
                Ok(self.ctx.add(Expr::Paren(inner)))
            }
            Some(tok) => Err(ParseError::UnexpectedToken(format!("{:?}", tok))),
            None => Err(ParseError::UnexpectedEnd),
        }
    }

    fn relation(&mut self) -> Result<Statement, ParseError> {
        let lhs = self.expression()?;
        if let Some(Token::Rel(op)) = self.peek().cloned() {
            self.pos += 1;
            let rhs = self.expression()?;
            return Ok(Statement::Equation(Equation::new(lhs, op, rhs)));
        }
        Ok(Statement::Expression(lhs))
    }
}

/// Either a bare expression or a two-sided relation.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Expression(ExprId),
    Equation(Equation),
}

fn run<T>(
    input: &str,
    ctx: &mut Context,
    f: impl FnOnce(&mut Parser) -> Result<T, ParseError>,
) -> Result<T, ParseError> {
    let tokens = tokenize(input)?;
    if tokens.is_empty() {
        return Err(ParseError::UnexpectedEnd);
    }
    let mut parser = Parser {
        tokens,
        pos: 0,
        ctx,
    };
    let result = f(&mut parser)?;
    if parser.pos < parser.tokens.len() {
        return Err(ParseError::UnconsumedInput(format!(
            "{:?}",
            parser.tokens[parser.pos].token
        )));
    }
    Ok(result)
}

/// Parse a single expression.
pub fn parse(input: &str, ctx: &mut Context) -> Result<ExprId, ParseError> {
    run(input, ctx, |p| p.expression())
}

/// Parse an equation or inequality.
pub fn parse_equation(input: &str, ctx: &mut Context) -> Result<Equation, ParseError> {
    match run(input, ctx, |p| p.relation())? {
        Statement::Equation(eq) => Ok(eq),
        Statement::Expression(_) => Err(ParseError::UnexpectedEnd),
    }
}

/// Parse either form.
pub fn parse_statement(input: &str, ctx: &mut Context) -> Result<Statement, ParseError> {
    run(input, ctx, |p| p.relation())
}
