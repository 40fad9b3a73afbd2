//! # Expression Parser
//!
//! Recursive-descent parser and evaluator for catalog formula strings.
//!
//! ## Grammar
//!
//! ```text
//! expression     := additive
//! additive       := multiplicative (('+' | '-') multiplicative)*
//! multiplicative := unary (('*' | '/' | '%') unary)*
//! unary          := ('-' | '+') unary | power
//! power          := primary ('^' unary)?
//! primary        := number | identifier | identifier '(' arguments ')' | '(' expression ')'
//! arguments      := expression (',' expression)*
//! ```
//!
//! `^` is right-associative and binds tighter than unary minus, so `-2^2 = -4`
//! and `2^3^2 = 512`.
//!
//! ## Precision
//!
//! Values are `rust_decimal::Decimal` (96-bit mantissa, 28 significant
//! digits). Conversion to `f64` happens only in the evaluator boundary.
//! `asin`, `acos`, `atan` and `atan2` have no decimal implementation and are
//! computed in `f64`.

use std::collections::HashMap;
use std::str::FromStr;

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, MathematicalOps, RoundingStrategy};
use thiserror::Error;

use crate::errors::{CalcError, CalcResult};

// ============================================================================
// AST
// ============================================================================

/// Reserved constants. These never count as free variables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Constant {
    Pi,
    E,
}

impl Constant {
    /// Recognize a reserved constant name
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "pi" | "PI" | "π" => Some(Constant::Pi),
            "e" | "E" => Some(Constant::E),
            _ => None,
        }
    }

    pub fn value(&self) -> Decimal {
        match self {
            Constant::Pi => Decimal::PI,
            Constant::E => Decimal::E,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Plus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Pow,
}

impl BinaryOp {
    fn symbol(&self) -> char {
        match self {
            BinaryOp::Add => '+',
            BinaryOp::Sub => '-',
            BinaryOp::Mul => '*',
            BinaryOp::Div => '/',
            BinaryOp::Rem => '%',
            BinaryOp::Pow => '^',
        }
    }
}

/// Built-in functions callable from formulas
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Function {
    Sqrt,
    Cbrt,
    Abs,
    Sin,
    Cos,
    Tan,
    Asin,
    Acos,
    Atan,
    Atan2,
    Exp,
    Ln,
    Log,
    Log10,
    Pow,
    Min,
    Max,
    Floor,
    Ceil,
    Round,
    Deg2Rad,
    Rad2Deg,
}

impl Function {
    pub fn from_name(name: &str) -> Option<Self> {
        let function = match name {
            "sqrt" => Function::Sqrt,
            "cbrt" => Function::Cbrt,
            "abs" => Function::Abs,
            "sin" => Function::Sin,
            "cos" => Function::Cos,
            "tan" => Function::Tan,
            "asin" => Function::Asin,
            "acos" => Function::Acos,
            "atan" => Function::Atan,
            "atan2" => Function::Atan2,
            "exp" => Function::Exp,
            "ln" => Function::Ln,
            "log" => Function::Log,
            "log10" => Function::Log10,
            "pow" => Function::Pow,
            "min" => Function::Min,
            "max" => Function::Max,
            "floor" => Function::Floor,
            "ceil" => Function::Ceil,
            "round" => Function::Round,
            "deg2rad" => Function::Deg2Rad,
            "rad2deg" => Function::Rad2Deg,
            _ => return None,
        };
        Some(function)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Function::Sqrt => "sqrt",
            Function::Cbrt => "cbrt",
            Function::Abs => "abs",
            Function::Sin => "sin",
            Function::Cos => "cos",
            Function::Tan => "tan",
            Function::Asin => "asin",
            Function::Acos => "acos",
            Function::Atan => "atan",
            Function::Atan2 => "atan2",
            Function::Exp => "exp",
            Function::Ln => "ln",
            Function::Log => "log",
            Function::Log10 => "log10",
            Function::Pow => "pow",
            Function::Min => "min",
            Function::Max => "max",
            Function::Floor => "floor",
            Function::Ceil => "ceil",
            Function::Round => "round",
            Function::Deg2Rad => "deg2rad",
            Function::Rad2Deg => "rad2deg",
        }
    }

    /// Accepted argument count as (min, max); `None` max means variadic.
    fn arity(&self) -> (usize, Option<usize>) {
        match self {
            Function::Atan2 | Function::Pow => (2, Some(2)),
            Function::Log => (1, Some(2)),
            Function::Min | Function::Max => (1, None),
            _ => (1, Some(1)),
        }
    }
}

/// Parsed expression tree
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(Decimal),
    Constant(Constant),
    Variable(String),
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Call {
        function: Function,
        args: Vec<Expr>,
    },
}

impl Expr {
    /// Free variables in first-occurrence order, deduplicated.
    pub fn variables(&self) -> Vec<String> {
        let mut found = Vec::new();
        self.collect_variables(&mut found);
        found
    }

    fn collect_variables(&self, found: &mut Vec<String>) {
        match self {
            Expr::Variable(name) => {
                if !found.iter().any(|v| v == name) {
                    found.push(name.clone());
                }
            }
            Expr::Unary { operand, .. } => operand.collect_variables(found),
            Expr::Binary { left, right, .. } => {
                left.collect_variables(found);
                right.collect_variables(found);
            }
            Expr::Call { args, .. } => {
                for arg in args {
                    arg.collect_variables(found);
                }
            }
            Expr::Number(_) | Expr::Constant(_) => {}
        }
    }

    /// Evaluate against a decimal scope.
    pub fn eval(&self, scope: &HashMap<String, Decimal>) -> Result<Decimal, EvalFailure> {
        match self {
            Expr::Number(value) => Ok(*value),
            Expr::Constant(constant) => Ok(constant.value()),
            Expr::Variable(name) => scope
                .get(name)
                .copied()
                .ok_or_else(|| EvalFailure::UnknownVariable(name.clone())),
            Expr::Unary { op, operand } => {
                let value = operand.eval(scope)?;
                Ok(match op {
                    UnaryOp::Neg => -value,
                    UnaryOp::Plus => value,
                })
            }
            Expr::Binary { op, left, right } => {
                let lhs = left.eval(scope)?;
                let rhs = right.eval(scope)?;
                apply_binary(*op, lhs, rhs)
            }
            Expr::Call { function, args } => {
                let values = args
                    .iter()
                    .map(|arg| arg.eval(scope))
                    .collect::<Result<Vec<_>, _>>()?;
                apply_function(*function, &values)
            }
        }
    }
}

/// Reason an otherwise well-formed expression could not produce a value
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvalFailure {
    #[error("variable '{0}' has no value")]
    UnknownVariable(String),
    #[error("division by zero")]
    DivisionByZero,
    #[error("arithmetic overflow in '{0}'")]
    Overflow(char),
    #[error("{function}: {reason}")]
    Domain {
        function: &'static str,
        reason: &'static str,
    },
}

fn domain(function: &'static str, reason: &'static str) -> EvalFailure {
    EvalFailure::Domain { function, reason }
}

fn apply_binary(op: BinaryOp, lhs: Decimal, rhs: Decimal) -> Result<Decimal, EvalFailure> {
    let overflow = || EvalFailure::Overflow(op.symbol());
    match op {
        BinaryOp::Add => lhs.checked_add(rhs).ok_or_else(overflow),
        BinaryOp::Sub => lhs.checked_sub(rhs).ok_or_else(overflow),
        BinaryOp::Mul => lhs.checked_mul(rhs).ok_or_else(overflow),
        BinaryOp::Div => {
            if rhs.is_zero() {
                return Err(EvalFailure::DivisionByZero);
            }
            lhs.checked_div(rhs).ok_or_else(overflow)
        }
        BinaryOp::Rem => {
            if rhs.is_zero() {
                return Err(EvalFailure::DivisionByZero);
            }
            lhs.checked_rem(rhs).ok_or_else(overflow)
        }
        BinaryOp::Pow => power(lhs, rhs),
    }
}

/// True when `base^exponent` tends toward zero rather than infinity.
fn shrinks(base: Decimal, exponent: Decimal) -> bool {
    let magnitude = base.abs();
    if exponent.is_sign_negative() {
        magnitude > Decimal::ONE
    } else {
        magnitude < Decimal::ONE
    }
}

/// Results smaller than the last decimal place round to zero; large ones overflow.
fn out_of_range(base: Decimal, exponent: Decimal) -> Result<Decimal, EvalFailure> {
    if shrinks(base, exponent) {
        Ok(Decimal::ZERO)
    } else {
        Err(EvalFailure::Overflow('^'))
    }
}

fn power(base: Decimal, exponent: Decimal) -> Result<Decimal, EvalFailure> {
    if exponent.fract().is_zero() {
        if base.is_zero() && exponent.is_sign_negative() && !exponent.is_zero() {
            return Err(EvalFailure::DivisionByZero);
        }
        return match exponent.to_i64().and_then(|n| base.checked_powi(n)) {
            Some(value) => Ok(value),
            None => out_of_range(base, exponent),
        };
    }
    if base.is_sign_negative() && !base.is_zero() {
        return Err(domain("pow", "fractional power of a negative number"));
    }
    if base.is_zero() {
        return if exponent.is_sign_positive() {
            Ok(Decimal::ZERO)
        } else {
            Err(EvalFailure::DivisionByZero)
        };
    }
    match base.checked_powd(exponent) {
        Some(value) => Ok(value),
        None => out_of_range(base, exponent),
    }
}

/// Cube root: f64 seed refined by Newton steps in decimal.
fn cube_root(x: Decimal) -> Result<Decimal, EvalFailure> {
    if x.is_zero() {
        return Ok(Decimal::ZERO);
    }
    let seed = x.to_f64().map(f64::cbrt).and_then(Decimal::from_f64);
    let mut y = seed.ok_or_else(|| domain("cbrt", "value out of range"))?;
    let three = Decimal::from(3);
    for _ in 0..3 {
        let y2 = y.checked_mul(y).ok_or(EvalFailure::Overflow('^'))?;
        let residual = y2.checked_mul(y).and_then(|y3| y3.checked_sub(x));
        let slope = y2.checked_mul(three);
        match (residual, slope) {
            (Some(r), Some(s)) if !s.is_zero() => match r.checked_div(s) {
                Some(step) => y -= step,
                None => break,
            },
            _ => break,
        }
    }
    Ok(y)
}

/// Route a value through f64 for functions without a decimal implementation.
fn via_f64(function: &'static str, f: impl FnOnce(f64) -> f64, x: Decimal) -> Result<Decimal, EvalFailure> {
    let input = x.to_f64().ok_or_else(|| domain(function, "value out of range"))?;
    let output = f(input);
    if !output.is_finite() {
        return Err(domain(function, "argument outside the function domain"));
    }
    Decimal::from_f64(output).ok_or_else(|| domain(function, "result out of range"))
}

fn apply_function(function: Function, args: &[Decimal]) -> Result<Decimal, EvalFailure> {
    let name = function.name();
    let x = args[0];
    match function {
        Function::Sqrt => x.sqrt().ok_or_else(|| domain(name, "square root of a negative number")),
        Function::Cbrt => cube_root(x),
        Function::Abs => Ok(x.abs()),
        Function::Sin => x.checked_sin().ok_or_else(|| domain(name, "value out of range")),
        Function::Cos => x.checked_cos().ok_or_else(|| domain(name, "value out of range")),
        Function::Tan => x.checked_tan().ok_or_else(|| domain(name, "undefined at this angle")),
        Function::Asin => via_f64(name, f64::asin, x),
        Function::Acos => via_f64(name, f64::acos, x),
        Function::Atan => via_f64(name, f64::atan, x),
        Function::Atan2 => {
            let x_f = args[1].to_f64().ok_or_else(|| domain(name, "value out of range"))?;
            via_f64(name, |y| y.atan2(x_f), x)
        }
        Function::Exp => match x.checked_exp() {
            Some(value) => Ok(value),
            None => out_of_range(Decimal::E, x),
        },
        Function::Ln => natural_log(name, x),
        Function::Log => {
            let ln_x = natural_log(name, x)?;
            match args.get(1) {
                None => Ok(ln_x),
                Some(base) => {
                    let ln_base = natural_log(name, *base)?;
                    if ln_base.is_zero() {
                        return Err(EvalFailure::DivisionByZero);
                    }
                    ln_x.checked_div(ln_base).ok_or(EvalFailure::Overflow('/'))
                }
            }
        }
        Function::Log10 => {
            if x <= Decimal::ZERO {
                return Err(domain(name, "logarithm of a non-positive number"));
            }
            x.checked_log10().ok_or_else(|| domain(name, "value out of range"))
        }
        Function::Pow => power(x, args[1]),
        Function::Min => Ok(args.iter().copied().fold(x, Decimal::min)),
        Function::Max => Ok(args.iter().copied().fold(x, Decimal::max)),
        Function::Floor => Ok(x.floor()),
        Function::Ceil => Ok(x.ceil()),
        Function::Round => Ok(x.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)),
        Function::Deg2Rad => x
            .checked_mul(Decimal::PI)
            .and_then(|v| v.checked_div(Decimal::from(180)))
            .ok_or(EvalFailure::Overflow('*')),
        Function::Rad2Deg => x
            .checked_mul(Decimal::from(180))
            .and_then(|v| v.checked_div(Decimal::PI))
            .ok_or(EvalFailure::Overflow('*')),
    }
}

fn natural_log(name: &'static str, x: Decimal) -> Result<Decimal, EvalFailure> {
    if x <= Decimal::ZERO {
        return Err(domain(name, "logarithm of a non-positive number"));
    }
    x.checked_ln().ok_or_else(|| domain(name, "value out of range"))
}

// ============================================================================
// Tokenizer
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
enum TokenKind {
    Number(Decimal),
    Ident(String),
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Caret,
    LParen,
    RParen,
    Comma,
    End,
}

impl TokenKind {
    fn describe(&self) -> String {
        match self {
            TokenKind::Number(n) => format!("number {}", n),
            TokenKind::Ident(name) => format!("'{}'", name),
            TokenKind::Plus => "'+'".to_string(),
            TokenKind::Minus => "'-'".to_string(),
            TokenKind::Star => "'*'".to_string(),
            TokenKind::Slash => "'/'".to_string(),
            TokenKind::Percent => "'%'".to_string(),
            TokenKind::Caret => "'^'".to_string(),
            TokenKind::LParen => "'('".to_string(),
            TokenKind::RParen => "')'".to_string(),
            TokenKind::Comma => "','".to_string(),
            TokenKind::End => "end of expression".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
struct Token {
    kind: TokenKind,
    position: usize,
}

fn tokenize(source: &str) -> CalcResult<Vec<Token>> {
    let chars: Vec<char> = source.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let ch = chars[i];
        let start = i;
        let simple = match ch {
            '+' => Some(TokenKind::Plus),
            '-' => Some(TokenKind::Minus),
            '*' => Some(TokenKind::Star),
            '/' => Some(TokenKind::Slash),
            '%' => Some(TokenKind::Percent),
            '^' => Some(TokenKind::Caret),
            '(' => Some(TokenKind::LParen),
            ')' => Some(TokenKind::RParen),
            ',' => Some(TokenKind::Comma),
            _ => None,
        };
        if let Some(kind) = simple {
            tokens.push(Token { kind, position: start });
            i += 1;
            continue;
        }

        if ch.is_whitespace() {
            i += 1;
        } else if ch.is_ascii_digit() || (ch == '.' && chars.get(i + 1).is_some_and(|c| c.is_ascii_digit())) {
            let (value, next) = scan_number(source, &chars, i)?;
            tokens.push(Token {
                kind: TokenKind::Number(value),
                position: start,
            });
            i = next;
        } else if ch.is_alphabetic() || ch == '_' {
            while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_') {
                i += 1;
            }
            tokens.push(Token {
                kind: TokenKind::Ident(chars[start..i].iter().collect()),
                position: start,
            });
        } else {
            return Err(CalcError::syntax(source, start, format!("unexpected character '{}'", ch)));
        }
    }

    tokens.push(Token {
        kind: TokenKind::End,
        position: chars.len(),
    });
    Ok(tokens)
}

fn scan_number(source: &str, chars: &[char], start: usize) -> CalcResult<(Decimal, usize)> {
    let mut i = start;
    while i < chars.len() && chars[i].is_ascii_digit() {
        i += 1;
    }
    if i < chars.len() && chars[i] == '.' {
        i += 1;
        while i < chars.len() && chars[i].is_ascii_digit() {
            i += 1;
        }
    }

    // Exponent only when digits follow, so `2*e` and `2e` stay distinguishable
    let mut scientific = false;
    if i < chars.len() && (chars[i] == 'e' || chars[i] == 'E') {
        let mut j = i + 1;
        if j < chars.len() && (chars[j] == '+' || chars[j] == '-') {
            j += 1;
        }
        if j < chars.len() && chars[j].is_ascii_digit() {
            while j < chars.len() && chars[j].is_ascii_digit() {
                j += 1;
            }
            i = j;
            scientific = true;
        }
    }

    let text: String = chars[start..i].iter().collect();
    let parsed = if scientific {
        Decimal::from_scientific(&text)
    } else {
        Decimal::from_str(&text)
    };
    match parsed {
        Ok(value) => Ok((value, i)),
        // Literals below the last decimal place read as zero
        Err(_) if scientific && text.to_ascii_lowercase().contains("e-") => Ok((Decimal::ZERO, i)),
        Err(_) => Err(CalcError::syntax(source, start, format!("number '{}' is out of range", text))),
    }
}

// ============================================================================
// Parser
// ============================================================================

/// Deepest nesting of parentheses, calls, unary signs, powers and operator
/// chains a formula may use. Bounds the recursion of parsing and evaluation.
pub const MAX_NESTING: usize = 128;

struct Parser<'a> {
    source: &'a str,
    tokens: Vec<Token>,
    cursor: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn descend(&mut self, position: usize) -> CalcResult<()> {
        self.depth += 1;
        if self.depth > MAX_NESTING {
            return Err(CalcError::syntax(self.source, position, "expression nested too deeply"));
        }
        Ok(())
    }

    fn ascend(&mut self, levels: usize) {
        self.depth -= levels;
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.cursor]
    }

    fn advance(&mut self) -> Token {
        let token = self.tokens[self.cursor].clone();
        if self.cursor < self.tokens.len() - 1 {
            self.cursor += 1;
        }
        token
    }

    fn error(&self, token: &Token, message: impl Into<String>) -> CalcError {
        CalcError::syntax(self.source, token.position, message)
    }

    fn expect(&mut self, kind: TokenKind, what: &str) -> CalcResult<()> {
        let token = self.advance();
        if token.kind == kind {
            Ok(())
        } else {
            Err(self.error(&token, format!("expected {}, found {}", what, token.kind.describe())))
        }
    }

    fn parse_expression(&mut self) -> CalcResult<Expr> {
        let mut left = self.parse_multiplicative()?;
        let mut chained = 0;
        loop {
            let op = match self.peek().kind {
                TokenKind::Plus => BinaryOp::Add,
                TokenKind::Minus => BinaryOp::Sub,
                _ => {
                    self.ascend(chained);
                    return Ok(left);
                }
            };
            let position = self.advance().position;
            self.descend(position)?;
            chained += 1;
            let right = self.parse_multiplicative()?;
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
    }

    fn parse_multiplicative(&mut self) -> CalcResult<Expr> {
        let mut left = self.parse_unary()?;
        let mut chained = 0;
        loop {
            let op = match self.peek().kind {
                TokenKind::Star => BinaryOp::Mul,
                TokenKind::Slash => BinaryOp::Div,
                TokenKind::Percent => BinaryOp::Rem,
                _ => {
                    self.ascend(chained);
                    return Ok(left);
                }
            };
            let position = self.advance().position;
            self.descend(position)?;
            chained += 1;
            let right = self.parse_unary()?;
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
    }

    fn parse_unary(&mut self) -> CalcResult<Expr> {
        let op = match self.peek().kind {
            TokenKind::Minus => UnaryOp::Neg,
            TokenKind::Plus => UnaryOp::Plus,
            _ => return self.parse_power(),
        };
        let position = self.advance().position;
        self.descend(position)?;
        let operand = self.parse_unary()?;
        self.ascend(1);
        Ok(Expr::Unary {
            op,
            operand: Box::new(operand),
        })
    }

    fn parse_power(&mut self) -> CalcResult<Expr> {
        let base = self.parse_primary()?;
        if self.peek().kind != TokenKind::Caret {
            return Ok(base);
        }
        let position = self.advance().position;
        self.descend(position)?;
        let exponent = self.parse_unary()?;
        self.ascend(1);
        Ok(Expr::Binary {
            op: BinaryOp::Pow,
            left: Box::new(base),
            right: Box::new(exponent),
        })
    }

    fn parse_primary(&mut self) -> CalcResult<Expr> {
        let token = self.advance();
        match token.kind {
            TokenKind::Number(value) => Ok(Expr::Number(value)),
            TokenKind::LParen => {
                self.descend(token.position)?;
                let inner = self.parse_expression()?;
                self.expect(TokenKind::RParen, "')'")?;
                self.ascend(1);
                Ok(inner)
            }
            TokenKind::Ident(ref name) if self.peek().kind == TokenKind::LParen => {
                let function = Function::from_name(name)
                    .ok_or_else(|| self.error(&token, format!("unknown function '{}'", name)))?;
                self.advance();
                self.descend(token.position)?;
                let args = self.parse_arguments()?;
                self.ascend(1);
                let (min, max) = function.arity();
                if args.len() < min || max.is_some_and(|m| args.len() > m) {
                    let expected = match max {
                        Some(m) if m == min => format!("{}", min),
                        Some(m) => format!("{} to {}", min, m),
                        None => format!("at least {}", min),
                    };
                    return Err(self.error(
                        &token,
                        format!("{}() takes {} argument(s), got {}", name, expected, args.len()),
                    ));
                }
                Ok(Expr::Call { function, args })
            }
            TokenKind::Ident(name) => Ok(match Constant::from_name(&name) {
                Some(constant) => Expr::Constant(constant),
                None => Expr::Variable(name),
            }),
            ref other => Err(self.error(&token, format!("unexpected {}", other.describe()))),
        }
    }

    fn parse_arguments(&mut self) -> CalcResult<Vec<Expr>> {
        let mut args = Vec::new();
        if self.peek().kind == TokenKind::RParen {
            self.advance();
            return Ok(args);
        }
        loop {
            args.push(self.parse_expression()?);
            let token = self.advance();
            match token.kind {
                TokenKind::Comma => continue,
                TokenKind::RParen => return Ok(args),
                ref other => {
                    return Err(self.error(&token, format!("expected ',' or ')', found {}", other.describe())))
                }
            }
        }
    }
}

/// Parse an expression string into an AST.
pub fn parse(source: &str) -> CalcResult<Expr> {
    let tokens = tokenize(source)?;
    let mut parser = Parser {
        source,
        tokens,
        cursor: 0,
        depth: 0,
    };
    if parser.peek().kind == TokenKind::End {
        return Err(CalcError::syntax(source, 0, "empty expression"));
    }
    let expr = parser.parse_expression()?;
    let trailing = parser.peek().clone();
    if trailing.kind != TokenKind::End {
        return Err(parser.error(&trailing, format!("unexpected {}", trailing.kind.describe())));
    }
    Ok(expr)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval_str(source: &str, vars: &[(&str, i64)]) -> Decimal {
        let scope = vars
            .iter()
            .map(|(k, v)| (k.to_string(), Decimal::from(*v)))
            .collect();
        parse(source).unwrap().eval(&scope).unwrap()
    }

    #[test]
    fn test_operator_precedence() {
        assert_eq!(eval_str("2 + 3 * 4", &[]), Decimal::from(14));
        assert_eq!(eval_str("(2 + 3) * 4", &[]), Decimal::from(20));
        assert_eq!(eval_str("10 - 4 - 3", &[]), Decimal::from(3));
        assert_eq!(eval_str("7 % 4", &[]), Decimal::from(3));
    }

    #[test]
    fn test_power_is_right_associative_and_binds_tighter_than_negation() {
        assert_eq!(eval_str("2^3^2", &[]), Decimal::from(512));
        assert_eq!(eval_str("-2^2", &[]), Decimal::from(-4));
        assert_eq!(eval_str("2^-1", &[]), Decimal::new(5, 1));
    }

    #[test]
    fn test_variables_and_constants() {
        assert_eq!(eval_str("L * W * t", &[("L", 1000), ("W", 1000), ("t", 10)]), Decimal::from(10_000_000));
        assert_eq!(eval_str("pi", &[]), Decimal::PI);
        assert_eq!(eval_str("π", &[]), Decimal::PI);
        assert_eq!(eval_str("E", &[]), Decimal::E);
    }

    #[test]
    fn test_scientific_notation() {
        assert_eq!(eval_str("7850 / 1e9 * 1e9", &[]), Decimal::from(7850));
        assert_eq!(eval_str("2.5E3", &[]), Decimal::from(2500));
        assert_eq!(eval_str(".5 * 4", &[]), Decimal::from(2));
    }

    #[test]
    fn test_functions() {
        assert_eq!(eval_str("sqrt(144)", &[]), Decimal::from(12));
        assert_eq!(eval_str("max(3, 9, 4)", &[]), Decimal::from(9));
        assert_eq!(eval_str("min(3, 9, 4)", &[]), Decimal::from(3));
        assert_eq!(eval_str("abs(-7)", &[]), Decimal::from(7));
        assert_eq!(eval_str("round(2.5)", &[]), Decimal::from(3));
        assert_eq!(eval_str("floor(-2.5)", &[]), Decimal::from(-3));
        assert_eq!(eval_str("pow(2, 10)", &[]), Decimal::from(1024));

        let cbrt = eval_str("cbrt(27)", &[]);
        assert!((cbrt - Decimal::from(3)).abs() < Decimal::new(1, 20));

        let sin = eval_str("sin(pi / 2)", &[]);
        assert!((sin - Decimal::ONE).abs() < Decimal::new(1, 9));

        let atan = eval_str("atan(1) * 4", &[]).to_f64().unwrap();
        assert!((atan - std::f64::consts::PI).abs() < 1e-12);

        let log = eval_str("log(8, 2)", &[]).to_f64().unwrap();
        assert!((log - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_fractional_power() {
        let value = eval_str("16 ^ 0.5", &[]).to_f64().unwrap();
        assert!((value - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_variables_in_first_occurrence_order() {
        let expr = parse("t * (L + W) + L * pi + sqrt(t)").unwrap();
        assert_eq!(expr.variables(), vec!["t", "L", "W"]);
    }

    #[test]
    fn test_syntax_errors_report_position() {
        match parse("L * (W + t").unwrap_err() {
            CalcError::Syntax { position, message, .. } => {
                assert_eq!(position, 10);
                assert!(message.contains("expected ')'"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(parse("").is_err());
        assert!(parse("L * * W").is_err());
        assert!(parse("L W").is_err());
        assert!(parse("L $ W").is_err());
        assert!(parse("foo(1)").is_err());
        assert!(parse("sqrt(1, 2)").is_err());
    }

    #[test]
    fn test_nesting_limit() {
        let within = format!("{}x{}", "(".repeat(MAX_NESTING - 1), ")".repeat(MAX_NESTING - 1));
        assert_eq!(eval_str(&within, &[("x", 3)]), Decimal::from(3));

        let deep = format!("{}x{}", "(".repeat(5000), ")".repeat(5000));
        match parse(&deep).unwrap_err() {
            CalcError::Syntax { message, position, .. } => {
                assert_eq!(message, "expression nested too deeply");
                assert_eq!(position, MAX_NESTING);
            }
            other => panic!("unexpected error: {:?}", other),
        }

        for source in [
            "-".repeat(5000) + "1",
            "2^".repeat(5000) + "1",
            "sqrt(".repeat(5000) + "1" + &")".repeat(5000),
            vec!["1"; 5000].join(" + "),
            vec!["x"; 5000].join(" * "),
        ] {
            assert!(matches!(parse(&source), Err(CalcError::Syntax { .. })), "{}", &source[..20]);
        }
    }

    #[test]
    fn test_siblings_do_not_add_up_to_the_nesting_limit() {
        let terms = vec!["(x + 1)"; MAX_NESTING / 2].join(" + ");
        let value = eval_str(&terms, &[("x", 1)]);
        assert_eq!(value, Decimal::from(MAX_NESTING as i64));
    }

    #[test]
    fn test_results_below_decimal_precision_round_to_zero() {
        assert_eq!(eval_str("2^-100", &[]), Decimal::ZERO);
        assert_eq!(eval_str("10^-30", &[]), Decimal::ZERO);
        assert_eq!(eval_str("exp(-100)", &[]), Decimal::ZERO);
        assert_eq!(eval_str("1e-40 + 1", &[]), Decimal::ONE);

        let scope = HashMap::new();
        assert_eq!(parse("10^40").unwrap().eval(&scope), Err(EvalFailure::Overflow('^')));
        assert_eq!(parse("exp(100)").unwrap().eval(&scope), Err(EvalFailure::Overflow('^')));
        assert!(parse("1e40").is_err());
    }

    #[test]
    fn test_evaluation_failures() {
        let scope = HashMap::new();
        assert_eq!(parse("1 / 0").unwrap().eval(&scope), Err(EvalFailure::DivisionByZero));
        assert!(matches!(
            parse("sqrt(-1)").unwrap().eval(&scope),
            Err(EvalFailure::Domain { function: "sqrt", .. })
        ));
        assert!(matches!(
            parse("ln(0)").unwrap().eval(&scope),
            Err(EvalFailure::Domain { .. })
        ));
        assert_eq!(
            parse("x + 1").unwrap().eval(&scope),
            Err(EvalFailure::UnknownVariable("x".to_string()))
        );
    }
}
