//! Predicate expressions
//!
//! A deliberately small boolean language evaluated against a document and
//! an optional array element index. Nothing in it can execute code or reach
//! outside the document.
//!
//! # Grammar
//!
//! ```text
//! program  := 'return'? or ';'?
//! or       := and ('||' and)*
//! and      := eq ('&&' eq)*
//! eq       := cmp (('==' | '===' | '!=' | '!==') cmp)*
//! cmp      := unary (('<' | '<=' | '>' | '>=') unary)*
//! unary    := '!' unary | '-' unary | postfix
//! postfix  := primary ('.' ident | '[' or ']')*
//! primary  := number | string | 'true' | 'false' | 'null' | 'undefined'
//!           | 'model' | 'index' | builtin '(' args ')' | '(' or ')'
//! builtin  := 'exists' | 'empty' | 'len' | 'contains'
//! ```
//!
//! `model` is the whole document and `index` the element index of a
//! wildcard rule. Lookups of missing fields yield `null`; `.length` works on
//! arrays and strings.
//!
//! # Examples
//!
//! ```
//! use editor_rules::Predicate;
//! use serde_json::json;
//!
//! let doc = json!({"source_type": "netflow", "matchers": [{"negated": true}]});
//!
//! let p = Predicate::parse("model.source_type !== 'netflow'").unwrap();
//! assert!(!p.evaluate(&doc, None).unwrap());
//!
//! let p = Predicate::parse("return model.matchers[index].negated;").unwrap();
//! assert!(p.evaluate(&doc, Some(0)).unwrap());
//! ```

use std::borrow::Cow;

use serde_json::Value;

use crate::error::{Error, Result};
use crate::lexer::{SpannedToken, Token, lex, unescape};

static NULL: Value = Value::Null;

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Or,
    And,
    Equals,
    NotEquals,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
}

/// Built-in functions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    /// `exists(x)`: x is not null
    Exists,
    /// `empty(x)`: x is null, `""`, `[]` or `{}`
    Empty,
    /// `len(x)`: length of an array, string, or object
    Len,
    /// `contains(haystack, needle)`: substring, array element, or object key
    Contains,
}

impl Builtin {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "exists" => Some(Self::Exists),
            "empty" => Some(Self::Empty),
            "len" => Some(Self::Len),
            "contains" => Some(Self::Contains),
            _ => None,
        }
    }

    fn arity(self) -> usize {
        match self {
            Self::Exists | Self::Empty | Self::Len => 1,
            Self::Contains => 2,
        }
    }
}

/// Expression tree
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(Value),
    Model,
    Index,
    Member {
        object: Box<Expr>,
        property: String,
    },
    Subscript {
        object: Box<Expr>,
        key: Box<Expr>,
    },
    Not(Box<Expr>),
    Negate(Box<Expr>),
    Binary {
        left: Box<Expr>,
        operator: BinaryOp,
        right: Box<Expr>,
    },
    Call {
        function: Builtin,
        args: Vec<Expr>,
    },
}

/// A compiled predicate
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    source: String,
    expr: Expr,
}

impl Predicate {
    /// Compile a predicate source string
    pub fn parse(source: &str) -> Result<Self> {
        let tokens = lex(source)?;
        if let Some((_, span)) = tokens.get(MAX_TOKENS) {
            return Err(Error::parse(
                span.start,
                format!("predicate longer than {} tokens", MAX_TOKENS),
            ));
        }
        let mut parser = Parser {
            tokens,
            pos: 0,
            depth: 0,
            end: source.len(),
        };
        let expr = parser.parse_program()?;
        Ok(Self {
            source: source.to_string(),
            expr,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn expr(&self) -> &Expr {
        &self.expr
    }

    /// Evaluate against a document; the result is the truthiness of the expression
    pub fn evaluate(&self, document: &Value, index: Option<usize>) -> Result<bool> {
        let scope = Scope { document, index };
        Ok(truthy(scope.eval(&self.expr)?.as_ref()))
    }
}

/// Deepest nesting of unary operators, parentheses, subscripts and call
/// arguments a predicate may use
pub const MAX_NESTING: usize = 64;

/// Longest predicate, in tokens
pub const MAX_TOKENS: usize = 1024;

struct Parser<'src> {
    tokens: Vec<SpannedToken<'src>>,
    pos: usize,
    depth: usize,
    end: usize,
}

impl<'src> Parser<'src> {
    fn parse_program(&mut self) -> Result<Expr> {
        self.match_token(Token::Return);
        let expr = self.parse_or_expression()?;
        self.match_token(Token::Semi);

        if !self.is_at_end() {
            return Err(Error::parse(self.current_pos(), "unexpected trailing input"));
        }
        Ok(expr)
    }

    /// Parse OR expression (lowest precedence)
    fn parse_or_expression(&mut self) -> Result<Expr> {
        let mut left = self.parse_and_expression()?;
        while self.match_token(Token::Or) {
            let right = self.parse_and_expression()?;
            left = binary(left, BinaryOp::Or, right);
        }
        Ok(left)
    }

    fn parse_and_expression(&mut self) -> Result<Expr> {
        let mut left = self.parse_equality_expression()?;
        while self.match_token(Token::And) {
            let right = self.parse_equality_expression()?;
            left = binary(left, BinaryOp::And, right);
        }
        Ok(left)
    }

    /// Parse equality expression (== != === !==)
    fn parse_equality_expression(&mut self) -> Result<Expr> {
        let mut left = self.parse_comparison_expression()?;
        while let Some(op) = self.match_equality_op() {
            let right = self.parse_comparison_expression()?;
            left = binary(left, op, right);
        }
        Ok(left)
    }

    /// Parse comparison expression (< > <= >=)
    fn parse_comparison_expression(&mut self) -> Result<Expr> {
        let mut left = self.parse_unary_expression()?;
        while let Some(op) = self.match_comparison_op() {
            let right = self.parse_unary_expression()?;
            left = binary(left, op, right);
        }
        Ok(left)
    }

    fn parse_unary_expression(&mut self) -> Result<Expr> {
        if self.depth >= MAX_NESTING {
            return Err(Error::parse(self.current_pos(), "expression nested too deeply"));
        }
        self.depth += 1;
        let expr = self.parse_unary_operand();
        self.depth -= 1;
        expr
    }

    fn parse_unary_operand(&mut self) -> Result<Expr> {
        if self.match_token(Token::Bang) {
            let operand = self.parse_unary_expression()?;
            return Ok(Expr::Not(Box::new(operand)));
        }
        if self.match_token(Token::Minus) {
            let operand = self.parse_unary_expression()?;
            return Ok(Expr::Negate(Box::new(operand)));
        }
        let primary = self.parse_primary_expression()?;
        self.parse_postfix_operations(primary)
    }

    fn parse_postfix_operations(&mut self, mut expr: Expr) -> Result<Expr> {
        loop {
            if self.match_token(Token::Dot) {
                let property = self.expect_property_name()?;
                expr = Expr::Member {
                    object: Box::new(expr),
                    property,
                };
            } else if self.match_token(Token::LBracket) {
                let key = self.parse_or_expression()?;
                self.expect(Token::RBracket, "']'")?;
                expr = Expr::Subscript {
                    object: Box::new(expr),
                    key: Box::new(key),
                };
            } else {
                return Ok(expr);
            }
        }
    }

    /// Parse primary expression (literals, roots, calls, parentheses)
    fn parse_primary_expression(&mut self) -> Result<Expr> {
        let position = self.current_pos();
        let Some((token, _)) = self.advance() else {
            return Err(Error::parse(position, "expected an expression"));
        };

        match token {
            Token::True => Ok(Expr::Literal(Value::Bool(true))),
            Token::False => Ok(Expr::Literal(Value::Bool(false))),
            Token::Null | Token::Undefined => Ok(Expr::Literal(Value::Null)),
            Token::Number(text) => {
                let number: f64 = text
                    .parse()
                    .map_err(|_| Error::parse(position, format!("invalid number '{}'", text)))?;
                Ok(Expr::Literal(number_value(number)))
            }
            Token::String(raw) | Token::SingleQuoteString(raw) => {
                Ok(Expr::Literal(Value::String(unescape(raw))))
            }
            Token::Ident("model") => Ok(Expr::Model),
            Token::Ident("index") => Ok(Expr::Index),
            Token::Ident(name) => {
                let Some(function) = Builtin::from_name(name) else {
                    return Err(Error::parse(position, format!("unknown identifier '{}'", name)));
                };
                self.parse_function_call(function, position)
            }
            Token::LParen => {
                let expr = self.parse_or_expression()?;
                self.expect(Token::RParen, "')'")?;
                Ok(expr)
            }
            other => Err(Error::parse(
                position,
                format!("unexpected token {:?}", other),
            )),
        }
    }

    /// Parse function call arguments: name(arg1, arg2, ...)
    fn parse_function_call(&mut self, function: Builtin, position: usize) -> Result<Expr> {
        self.expect(Token::LParen, "'('")?;
        let mut args = Vec::new();
        if !self.check(&Token::RParen) {
            loop {
                args.push(self.parse_or_expression()?);
                if !self.match_token(Token::Comma) {
                    break;
                }
            }
        }
        self.expect(Token::RParen, "')'")?;

        if args.len() != function.arity() {
            return Err(Error::parse(
                position,
                format!(
                    "{:?} takes {} argument(s), got {}",
                    function,
                    function.arity(),
                    args.len()
                ),
            ));
        }
        Ok(Expr::Call { function, args })
    }

    fn match_equality_op(&mut self) -> Option<BinaryOp> {
        if self.match_token(Token::EqEq) || self.match_token(Token::StrictEq) {
            Some(BinaryOp::Equals)
        } else if self.match_token(Token::NotEq) || self.match_token(Token::StrictNotEq) {
            Some(BinaryOp::NotEquals)
        } else {
            None
        }
    }

    fn match_comparison_op(&mut self) -> Option<BinaryOp> {
        if self.match_token(Token::Lte) {
            Some(BinaryOp::LessThanOrEqual)
        } else if self.match_token(Token::Gte) {
            Some(BinaryOp::GreaterThanOrEqual)
        } else if self.match_token(Token::Lt) {
            Some(BinaryOp::LessThan)
        } else if self.match_token(Token::Gt) {
            Some(BinaryOp::GreaterThan)
        } else {
            None
        }
    }

    // Helper methods

    fn expect_property_name(&mut self) -> Result<String> {
        let position = self.current_pos();
        match self.advance() {
            Some((Token::Ident(name), _)) => Ok(name.to_string()),
            // Keywords are fine as property names: model.return, model.null
            Some((Token::Return, _)) => Ok("return".to_string()),
            Some((Token::True, _)) => Ok("true".to_string()),
            Some((Token::False, _)) => Ok("false".to_string()),
            Some((Token::Null, _)) => Ok("null".to_string()),
            Some((Token::Undefined, _)) => Ok("undefined".to_string()),
            _ => Err(Error::parse(position, "expected a property name after '.'")),
        }
    }

    fn peek(&self) -> Option<&SpannedToken<'src>> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<SpannedToken<'src>> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn check(&self, token: &Token) -> bool {
        self.peek()
            .is_some_and(|(t, _)| std::mem::discriminant(t) == std::mem::discriminant(token))
    }

    fn match_token(&mut self, token: Token) -> bool {
        if self.check(&token) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: Token, expected: &str) -> Result<()> {
        if self.match_token(token) {
            Ok(())
        } else {
            Err(Error::parse(self.current_pos(), format!("expected {}", expected)))
        }
    }

    fn current_pos(&self) -> usize {
        self.peek().map_or(self.end, |(_, span)| span.start)
    }
}

fn binary(left: Expr, operator: BinaryOp, right: Expr) -> Expr {
    Expr::Binary {
        left: Box::new(left),
        operator,
        right: Box::new(right),
    }
}

/// Integral values stay integers so they compare equal to document integers
fn number_value(number: f64) -> Value {
    if number.fract() == 0.0 && number.abs() < i64::MAX as f64 {
        Value::from(number as i64)
    } else {
        Value::from(number)
    }
}

/// JSON-ish truthiness: null, false, 0, and "" are falsy
pub fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Structural equality with numeric comparison of numbers
fn loose_eq(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => a.as_f64() == b.as_f64(),
        (Value::Array(a), Value::Array(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| loose_eq(x, y))
        }
        (Value::Object(a), Value::Object(b)) => {
            a.len() == b.len()
                && a.iter()
                    .all(|(key, x)| b.get(key).is_some_and(|y| loose_eq(x, y)))
        }
        _ => left == right,
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

struct Scope<'a> {
    document: &'a Value,
    index: Option<usize>,
}

impl<'a> Scope<'a> {
    fn eval(&self, expr: &Expr) -> Result<Cow<'a, Value>> {
        match expr {
            Expr::Literal(value) => Ok(Cow::Owned(value.clone())),
            Expr::Model => Ok(Cow::Borrowed(self.document)),
            Expr::Index => self
                .index
                .map(|i| Cow::Owned(Value::from(i)))
                .ok_or_else(|| Error::eval("'index' used outside of an array rule")),
            Expr::Member { object, property } => {
                let object = self.eval(object)?;
                Ok(member(object, property))
            }
            Expr::Subscript { object, key } => {
                let object = self.eval(object)?;
                let key = self.eval(key)?;
                subscript(object, &key)
            }
            Expr::Not(operand) => {
                let value = self.eval(operand)?;
                Ok(Cow::Owned(Value::Bool(!truthy(value.as_ref()))))
            }
            Expr::Negate(operand) => {
                let value = self.eval(operand)?;
                let number = value.as_f64().ok_or_else(|| {
                    Error::eval(format!("cannot negate a {}", type_name(&value)))
                })?;
                Ok(Cow::Owned(number_value(-number)))
            }
            Expr::Binary {
                left,
                operator,
                right,
            } => self.eval_binary(left, *operator, right),
            Expr::Call { function, args } => self.eval_call(*function, args),
        }
    }

    fn eval_binary(&self, left: &Expr, operator: BinaryOp, right: &Expr) -> Result<Cow<'a, Value>> {
        let result = match operator {
            BinaryOp::Or => {
                truthy(self.eval(left)?.as_ref()) || truthy(self.eval(right)?.as_ref())
            }
            BinaryOp::And => {
                truthy(self.eval(left)?.as_ref()) && truthy(self.eval(right)?.as_ref())
            }
            BinaryOp::Equals => loose_eq(self.eval(left)?.as_ref(), self.eval(right)?.as_ref()),
            BinaryOp::NotEquals => {
                !loose_eq(self.eval(left)?.as_ref(), self.eval(right)?.as_ref())
            }
            ordering => {
                let left = self.eval(left)?;
                let right = self.eval(right)?;
                let cmp = match (left.as_ref(), right.as_ref()) {
                    (Value::Number(a), Value::Number(b)) => a
                        .as_f64()
                        .zip(b.as_f64())
                        .and_then(|(a, b)| a.partial_cmp(&b)),
                    (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
                    (a, b) => {
                        return Err(Error::eval(format!(
                            "cannot compare {} with {}",
                            type_name(a),
                            type_name(b)
                        )));
                    }
                };
                let Some(cmp) = cmp else {
                    return Err(Error::eval("numbers are not comparable"));
                };
                match ordering {
                    BinaryOp::LessThan => cmp.is_lt(),
                    BinaryOp::LessThanOrEqual => cmp.is_le(),
                    BinaryOp::GreaterThan => cmp.is_gt(),
                    _ => cmp.is_ge(),
                }
            }
        };
        Ok(Cow::Owned(Value::Bool(result)))
    }

    fn eval_call(&self, function: Builtin, args: &[Expr]) -> Result<Cow<'a, Value>> {
        let first = match args.first() {
            Some(arg) => self.eval(arg)?,
            None => return Err(Error::eval(format!("{:?} called without arguments", function))),
        };

        let value = match function {
            Builtin::Exists => Value::Bool(!first.is_null()),
            Builtin::Empty => Value::Bool(match first.as_ref() {
                Value::Null => true,
                Value::String(s) => s.is_empty(),
                Value::Array(a) => a.is_empty(),
                Value::Object(o) => o.is_empty(),
                _ => false,
            }),
            Builtin::Len => match first.as_ref() {
                Value::String(s) => Value::from(s.chars().count()),
                Value::Array(a) => Value::from(a.len()),
                Value::Object(o) => Value::from(o.len()),
                other => {
                    return Err(Error::eval(format!("len() of a {}", type_name(other))));
                }
            },
            Builtin::Contains => {
                let needle = match args.get(1) {
                    Some(arg) => self.eval(arg)?,
                    None => return Err(Error::eval("contains() needs two arguments")),
                };
                Value::Bool(match (first.as_ref(), needle.as_ref()) {
                    (Value::String(h), Value::String(n)) => h.contains(n.as_str()),
                    (Value::Array(items), n) => items.iter().any(|item| loose_eq(item, n)),
                    (Value::Object(map), Value::String(key)) => map.contains_key(key),
                    (Value::Null, _) => false,
                    (h, n) => {
                        return Err(Error::eval(format!(
                            "contains() on a {} with a {}",
                            type_name(h),
                            type_name(n)
                        )));
                    }
                })
            }
        };
        Ok(Cow::Owned(value))
    }
}

fn member<'a>(object: Cow<'a, Value>, property: &str) -> Cow<'a, Value> {
    if property == "length" {
        match object.as_ref() {
            Value::Array(items) => return Cow::Owned(Value::from(items.len())),
            Value::String(s) => return Cow::Owned(Value::from(s.chars().count())),
            _ => {}
        }
    }

    match object {
        Cow::Borrowed(value) => Cow::Borrowed(value.get(property).unwrap_or(&NULL)),
        Cow::Owned(value) => Cow::Owned(value.get(property).cloned().unwrap_or(Value::Null)),
    }
}

fn subscript<'a>(object: Cow<'a, Value>, key: &Value) -> Result<Cow<'a, Value>> {
    match key {
        Value::String(name) => Ok(member(object, name)),
        Value::Number(n) => {
            let index = n
                .as_u64()
                .ok_or_else(|| Error::eval(format!("invalid array index {}", n)))?
                as usize;
            if !object.is_array() {
                return Ok(member(object, &index.to_string()));
            }
            Ok(match object {
                Cow::Borrowed(value) => Cow::Borrowed(value.get(index).unwrap_or(&NULL)),
                Cow::Owned(value) => Cow::Owned(value.get(index).cloned().unwrap_or(Value::Null)),
            })
        }
        Value::Null => Ok(Cow::Owned(Value::Null)),
        other => Err(Error::eval(format!("cannot index with a {}", type_name(other)))),
    }
}
