//! Exact univariate polynomial algebra over rationals.
//!
//! This is the symbolic capability behind calculus problems: build
//! `c*x**n` monomials, differentiate/integrate them exactly, parse a
//! user-typed expression, and decide equivalence by subtracting and
//! checking for the zero polynomial. Polynomials are kept in normal form
//! (sparse power -> coefficient map, no zero coefficients), so two
//! algebraically equal expressions always compare equal.
//!
//! All arithmetic is checked: user input flows through here, so overflow
//! must surface as an error, never a panic or a wrapped value.

use std::collections::BTreeMap;
use std::fmt;

/// Parse failure for user-typed expressions. Callers treat any variant as
/// "not a valid answer"; the variants exist for logging.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("unexpected character '{0}'")]
    UnexpectedChar(char),
    #[error("unexpected token '{0}'")]
    UnexpectedToken(String),
    #[error("unexpected end of expression")]
    UnexpectedEnd,
    #[error("division by zero")]
    DivisionByZero,
    #[error("can only divide by a nonzero constant")]
    NonConstantDivisor,
    #[error("exponent must be a small nonnegative integer")]
    BadExponent,
    #[error("arithmetic overflow while evaluating expression")]
    Overflow,
}

/// Exact fraction with invariant: den > 0, gcd(num, den) == 1.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rational {
    num: i64,
    den: i64,
}

fn gcd(a: i64, b: i64) -> i64 {
    let (mut a, mut b) = (a.abs(), b.abs());
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a
}

impl Rational {
    /// Build a reduced fraction from known-small parts. `den` must be
    /// nonzero; arithmetic on untrusted values goes through the
    /// `checked_*` methods instead.
    pub fn new(num: i64, den: i64) -> Self {
        debug_assert!(den != 0);
        let sign = if den < 0 { -1 } else { 1 };
        let g = gcd(num, den).max(1);
        Rational {
            num: sign * num / g,
            den: sign * den / g,
        }
    }

    pub fn integer(n: i64) -> Self {
        Rational { num: n, den: 1 }
    }

    fn checked_new(num: i64, den: i64) -> Option<Self> {
        if den == 0 {
            return None;
        }
        let g = gcd(num, den).max(1);
        let (mut num, mut den) = (num / g, den / g);
        if den < 0 {
            num = num.checked_neg()?;
            den = den.checked_neg()?;
        }
        Some(Rational { num, den })
    }

    pub fn is_zero(self) -> bool {
        self.num == 0
    }

    pub fn is_integer(self) -> bool {
        self.den == 1
    }

    pub fn numerator(self) -> i64 {
        self.num
    }

    pub fn denominator(self) -> i64 {
        self.den
    }

    pub fn checked_add(self, rhs: Rational) -> Option<Rational> {
        let lhs_num = self.num.checked_mul(rhs.den)?;
        let rhs_num = rhs.num.checked_mul(self.den)?;
        Rational::checked_new(lhs_num.checked_add(rhs_num)?, self.den.checked_mul(rhs.den)?)
    }

    pub fn checked_sub(self, rhs: Rational) -> Option<Rational> {
        self.checked_add(rhs.checked_neg()?)
    }

    pub fn checked_mul(self, rhs: Rational) -> Option<Rational> {
        Rational::checked_new(self.num.checked_mul(rhs.num)?, self.den.checked_mul(rhs.den)?)
    }

    pub fn checked_neg(self) -> Option<Rational> {
        Some(Rational {
            num: self.num.checked_neg()?,
            den: self.den,
        })
    }

    /// Division; `None` when dividing by zero or on overflow.
    pub fn checked_div(self, rhs: Rational) -> Option<Rational> {
        if rhs.num == 0 {
            return None;
        }
        Rational::checked_new(self.num.checked_mul(rhs.den)?, self.den.checked_mul(rhs.num)?)
    }
}

impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.den == 1 {
            write!(f, "{}", self.num)
        } else {
            write!(f, "{}/{}", self.num, self.den)
        }
    }
}

/// Sparse polynomial in one variable `x`, power -> coefficient.
/// Normal form by construction: zero coefficients are never stored.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct Polynomial {
    terms: BTreeMap<u32, Rational>,
}

impl Polynomial {
    pub fn zero() -> Self {
        Polynomial::default()
    }

    pub fn constant(c: Rational) -> Self {
        let mut p = Polynomial::zero();
        if !c.is_zero() {
            p.terms.insert(0, c);
        }
        p
    }

    /// The monomial `coeff * x**power`.
    pub fn monomial(coeff: i64, power: u32) -> Self {
        let mut p = Polynomial::zero();
        if coeff != 0 {
            p.terms.insert(power, Rational::integer(coeff));
        }
        p
    }

    /// The variable `x` itself.
    pub fn var() -> Self {
        Polynomial::monomial(1, 1)
    }

    fn checked_add_term(&mut self, power: u32, coeff: Rational) -> Option<()> {
        if coeff.is_zero() {
            return Some(());
        }
        let current = self
            .terms
            .get(&power)
            .copied()
            .unwrap_or_else(|| Rational::integer(0));
        let sum = current.checked_add(coeff)?;
        if sum.is_zero() {
            self.terms.remove(&power);
        } else {
            self.terms.insert(power, sum);
        }
        Some(())
    }

    pub fn is_zero(&self) -> bool {
        self.terms.is_empty()
    }

    /// `Some(c)` when the polynomial is the constant `c` (degree 0 or zero).
    pub fn as_constant(&self) -> Option<Rational> {
        match self.terms.len() {
            0 => Some(Rational::integer(0)),
            1 => self.terms.get(&0).copied(),
            _ => None,
        }
    }

    pub fn checked_add(self, rhs: Polynomial) -> Option<Polynomial> {
        let mut out = self;
        for (pow, c) in rhs.terms {
            out.checked_add_term(pow, c)?;
        }
        Some(out)
    }

    pub fn checked_sub(self, rhs: Polynomial) -> Option<Polynomial> {
        let mut out = self;
        for (pow, c) in rhs.terms {
            out.checked_add_term(pow, c.checked_neg()?)?;
        }
        Some(out)
    }

    pub fn checked_neg(self) -> Option<Polynomial> {
        Polynomial::zero().checked_sub(self)
    }

    pub fn checked_mul(&self, rhs: &Polynomial) -> Option<Polynomial> {
        let mut out = Polynomial::zero();
        for (&pa, &ca) in &self.terms {
            for (&pb, &cb) in &rhs.terms {
                out.checked_add_term(pa.checked_add(pb)?, ca.checked_mul(cb)?)?;
            }
        }
        Some(out)
    }

    /// Division by a constant; `None` for zero divisors or overflow.
    pub fn checked_div_const(&self, divisor: Rational) -> Option<Polynomial> {
        if divisor.is_zero() {
            return None;
        }
        let mut out = Polynomial::zero();
        for (&pow, &c) in &self.terms {
            out.checked_add_term(pow, c.checked_div(divisor)?)?;
        }
        Some(out)
    }

    /// Integer power by repeated multiplication; `None` on overflow.
    pub fn checked_pow(&self, exp: u32) -> Option<Polynomial> {
        let mut out = Polynomial::constant(Rational::integer(1));
        for _ in 0..exp {
            out = out.checked_mul(self)?;
        }
        Some(out)
    }

    /// Exact derivative: d/dx(c*x**n) = c*n*x**(n-1).
    /// Callers feed this generated monomials with single-digit
    /// coefficients and powers, far from overflow.
    pub fn differentiate(&self) -> Polynomial {
        let mut out = Polynomial::zero();
        for (&pow, &c) in &self.terms {
            if pow > 0 {
                if let Some(coeff) = c.checked_mul(Rational::integer(pow as i64)) {
                    let _ = out.checked_add_term(pow - 1, coeff);
                }
            }
        }
        out
    }

    /// Exact antiderivative with the integration constant omitted:
    /// ∫ c*x**n dx = c/(n+1) * x**(n+1). Same bounded inputs as
    /// [`Polynomial::differentiate`].
    pub fn integrate(&self) -> Polynomial {
        let mut out = Polynomial::zero();
        for (&pow, &c) in &self.terms {
            // n+1 is always positive, the division cannot fail
            if let Some(coeff) = c.checked_div(Rational::integer(pow as i64 + 1)) {
                let _ = out.checked_add_term(pow + 1, coeff);
            }
        }
        out
    }
}

impl fmt::Display for Polynomial {
    /// sympy-like rendering: `3*x**2`, `x`, `x**2/2`, `6*x + 1`.
    /// Output must round-trip through [`parse`].
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.terms.is_empty() {
            return f.write_str("0");
        }
        let mut first = true;
        for (&pow, &c) in self.terms.iter().rev() {
            let negative = c.numerator() < 0;
            if first {
                if negative {
                    f.write_str("-")?;
                }
                first = false;
            } else if negative {
                f.write_str(" - ")?;
            } else {
                f.write_str(" + ")?;
            }
            let num = c.numerator().abs();
            let den = c.denominator();
            if pow == 0 {
                if den == 1 {
                    write!(f, "{}", num)?;
                } else {
                    write!(f, "{}/{}", num, den)?;
                }
                continue;
            }
            let x_part = if pow == 1 {
                "x".to_string()
            } else {
                format!("x**{}", pow)
            };
            match (num, den) {
                (1, 1) => write!(f, "{}", x_part)?,
                (1, d) => write!(f, "{}/{}", x_part, d)?,
                (n, 1) => write!(f, "{}*{}", n, x_part)?,
                (n, d) => write!(f, "{}*{}/{}", n, x_part, d)?,
            }
        }
        Ok(())
    }
}

// ---------- Parsing ----------

#[derive(Clone, Debug, PartialEq)]
enum Token {
    Num(i64),
    X,
    Plus,
    Minus,
    Star,
    Slash,
    Caret,
    LParen,
    RParen,
}

fn tokenize(input: &str) -> Result<Vec<Token>, ParseError> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();
    while let Some(&ch) = chars.peek() {
        match ch {
            c if c.is_whitespace() => {
                chars.next();
            }
            '0'..='9' => {
                let mut value: i64 = 0;
                while let Some(&d) = chars.peek() {
                    if let Some(digit) = d.to_digit(10) {
                        value = value
                            .checked_mul(10)
                            .and_then(|v| v.checked_add(digit as i64))
                            .ok_or(ParseError::Overflow)?;
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token::Num(value));
            }
            'x' | 'X' => {
                chars.next();
                tokens.push(Token::X);
            }
            '+' => {
                chars.next();
                tokens.push(Token::Plus);
            }
            '-' => {
                chars.next();
                tokens.push(Token::Minus);
            }
            '*' => {
                chars.next();
                // "**" is the power operator, same as "^"
                if chars.peek() == Some(&'*') {
                    chars.next();
                    tokens.push(Token::Caret);
                } else {
                    tokens.push(Token::Star);
                }
            }
            '/' => {
                chars.next();
                tokens.push(Token::Slash);
            }
            '^' => {
                chars.next();
                tokens.push(Token::Caret);
            }
            '(' => {
                chars.next();
                tokens.push(Token::LParen);
            }
            ')' => {
                chars.next();
                tokens.push(Token::RParen);
            }
            other => return Err(ParseError::UnexpectedChar(other)),
        }
    }
    Ok(tokens)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

// Exponents users can type are capped well above anything the quiz
// generates; protects checked_pow() from absurd inputs.
const MAX_EXPONENT: i64 = 64;

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let t = self.tokens.get(self.pos).cloned();
        if t.is_some() {
            self.pos += 1;
        }
        t
    }

    // expr := term (('+'|'-') term)*
    fn expr(&mut self) -> Result<Polynomial, ParseError> {
        let mut acc = self.term()?;
        while let Some(tok) = self.peek() {
            match tok {
                Token::Plus => {
                    self.next();
                    let rhs = self.term()?;
                    acc = acc.checked_add(rhs).ok_or(ParseError::Overflow)?;
                }
                Token::Minus => {
                    self.next();
                    let rhs = self.term()?;
                    acc = acc.checked_sub(rhs).ok_or(ParseError::Overflow)?;
                }
                _ => break,
            }
        }
        Ok(acc)
    }

    // term := unary (('*'|'/') unary)*
    fn term(&mut self) -> Result<Polynomial, ParseError> {
        let mut acc = self.unary()?;
        while let Some(tok) = self.peek() {
            match tok {
                Token::Star => {
                    self.next();
                    let rhs = self.unary()?;
                    acc = acc.checked_mul(&rhs).ok_or(ParseError::Overflow)?;
                }
                Token::Slash => {
                    self.next();
                    let rhs = self.unary()?;
                    let divisor = rhs.as_constant().ok_or(ParseError::NonConstantDivisor)?;
                    if divisor.is_zero() {
                        return Err(ParseError::DivisionByZero);
                    }
                    acc = acc
                        .checked_div_const(divisor)
                        .ok_or(ParseError::Overflow)?;
                }
                _ => break,
            }
        }
        Ok(acc)
    }

    // unary := ('+'|'-')* power
    fn unary(&mut self) -> Result<Polynomial, ParseError> {
        match self.peek() {
            Some(Token::Minus) => {
                self.next();
                self.unary()?.checked_neg().ok_or(ParseError::Overflow)
            }
            Some(Token::Plus) => {
                self.next();
                self.unary()
            }
            _ => self.power(),
        }
    }

    // power := atom (('**'|'^') unary)?  — exponent must reduce to a
    // small nonnegative integer constant
    fn power(&mut self) -> Result<Polynomial, ParseError> {
        let base = self.atom()?;
        if self.peek() == Some(&Token::Caret) {
            self.next();
            let exp_poly = self.unary()?;
            let exp = exp_poly.as_constant().ok_or(ParseError::BadExponent)?;
            if !exp.is_integer() || exp.numerator() < 0 || exp.numerator() > MAX_EXPONENT {
                return Err(ParseError::BadExponent);
            }
            return base
                .checked_pow(exp.numerator() as u32)
                .ok_or(ParseError::Overflow);
        }
        Ok(base)
    }

    // atom := number | 'x' | '(' expr ')'
    fn atom(&mut self) -> Result<Polynomial, ParseError> {
        match self.next() {
            Some(Token::Num(n)) => Ok(Polynomial::constant(Rational::integer(n))),
            Some(Token::X) => Ok(Polynomial::var()),
            Some(Token::LParen) => {
                let inner = self.expr()?;
                match self.next() {
                    Some(Token::RParen) => Ok(inner),
                    Some(t) => Err(ParseError::UnexpectedToken(format!("{:?}", t))),
                    None => Err(ParseError::UnexpectedEnd),
                }
            }
            Some(t) => Err(ParseError::UnexpectedToken(format!("{:?}", t))),
            None => Err(ParseError::UnexpectedEnd),
        }
    }
}

/// Parse a polynomial expression in `x` (e.g. `"15*x**2"`, `"x^2 + x^2"`).
pub fn parse(input: &str) -> Result<Polynomial, ParseError> {
    if input.trim().is_empty() {
        return Err(ParseError::UnexpectedEnd);
    }
    let tokens = tokenize(input)?;
    let mut parser = Parser { tokens, pos: 0 };
    let poly = parser.expr()?;
    if let Some(t) = parser.peek() {
        return Err(ParseError::UnexpectedToken(format!("{:?}", t)));
    }
    Ok(poly)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(s: &str) -> Polynomial {
        parse(s).unwrap()
    }

    fn diff(a: &str, b: &str) -> Polynomial {
        p(a).checked_sub(p(b)).unwrap()
    }

    #[test]
    fn rational_reduces() {
        assert_eq!(Rational::new(4, 8), Rational::new(1, 2));
        assert_eq!(Rational::new(3, -6), Rational::new(-1, 2));
        assert!(Rational::new(0, 5).is_zero());
    }

    #[test]
    fn rational_checked_ops_reject_overflow() {
        let max = Rational::integer(i64::MAX);
        assert!(max.checked_add(Rational::integer(1)).is_none());
        assert!(max.checked_mul(Rational::integer(2)).is_none());
        assert_eq!(
            Rational::integer(1).checked_add(Rational::integer(2)),
            Some(Rational::integer(3))
        );
    }

    #[test]
    fn parses_monomials_and_sums() {
        assert_eq!(p("3*x**2"), Polynomial::monomial(3, 2));
        assert_eq!(p("x"), Polynomial::var());
        assert_eq!(p("x^2 + x^2"), Polynomial::monomial(2, 2));
        assert_eq!(p("  6 * x "), Polynomial::monomial(6, 1));
    }

    #[test]
    fn equivalent_spellings_normalize_equal() {
        assert!(diff("2*x**2", "x**2 + x**2").is_zero());
        assert!(diff("(x+1)*(x-1)", "x**2 - 1").is_zero());
        assert!(diff("5*x**2 + 10*x**2", "15*x**2").is_zero());
    }

    #[test]
    fn differentiates_monomials() {
        assert_eq!(Polynomial::monomial(3, 2).differentiate(), p("6*x"));
        assert_eq!(Polynomial::monomial(5, 3).differentiate(), p("15*x**2"));
        assert!(Polynomial::monomial(7, 0).differentiate().is_zero());
    }

    #[test]
    fn integrates_monomials() {
        assert_eq!(Polynomial::monomial(4, 1).integrate(), p("2*x**2"));
        // fractional coefficient: ∫ x dx = x**2/2
        assert_eq!(Polynomial::monomial(1, 1).integrate(), p("x**2/2"));
        assert_eq!(Polynomial::monomial(3, 2).integrate(), p("x**3"));
    }

    #[test]
    fn display_round_trips_through_parse() {
        for poly in [
            Polynomial::monomial(3, 2),
            Polynomial::monomial(1, 5),
            Polynomial::monomial(-4, 1),
            Polynomial::monomial(1, 1).integrate(),
            Polynomial::monomial(7, 4).integrate(),
            p("x**2 - 3*x + 1"),
            Polynomial::zero(),
        ] {
            let rendered = poly.to_string();
            assert_eq!(parse(&rendered).unwrap(), poly, "rendered: {rendered}");
        }
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse("").is_err());
        assert!(parse("not a number").is_err());
        assert!(parse("x +* ").is_err());
        assert!(parse("x/(x)").is_err()); // non-constant divisor
        assert!(parse("1/0").is_err());
        assert!(parse("x**x").is_err());
        assert!(parse("x**-1").is_err());
        assert!(parse("(x+1").is_err());
    }

    #[test]
    fn oversized_arithmetic_is_an_error_not_a_panic() {
        // i64::MAX itself is a valid literal...
        assert!(parse("9223372036854775807").is_ok());
        // ...but anything that pushes past it must fail cleanly
        assert_eq!(parse("9223372036854775807 + 1"), Err(ParseError::Overflow));
        assert_eq!(parse("9223372036854775807 * 2"), Err(ParseError::Overflow));
        assert_eq!(parse("99999999999999999999"), Err(ParseError::Overflow));
        assert_eq!(parse("(10*x)**20"), Err(ParseError::Overflow));
        assert_eq!(
            parse("9223372036854775807*x + 9223372036854775807*x"),
            Err(ParseError::Overflow)
        );
        assert_eq!(parse("-(-9223372036854775807 - 1)"), Err(ParseError::Overflow));
    }

    #[test]
    fn exponent_may_be_constant_expression() {
        assert_eq!(p("x**(1+1)"), Polynomial::monomial(1, 2));
    }
}
