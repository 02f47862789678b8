// SPDX-FileCopyrightText: 2026 Gleanplumb Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trigger expression evaluation.
//!
//! Supports the subset of JEXL used by messaging triggers: literals
//! (`true`, `false`, `null`, numbers, quoted strings, `[a, b]` arrays),
//! dotted identifiers resolved against a JSON attribute context, `!`, unary
//! `-`, comparisons, `==`/`!=`, `&&`/`||`, `in`, parentheses, and the
//! `versionCompare` and `date` transforms (`app_version|versionCompare('120')`).
//! Identifiers missing from the context evaluate to `null`.
//!
//! Expressions nested deeper than [`MAX_DEPTH`] are rejected.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::iter::Peekable;
use std::str::Chars;

use serde_json::{Map, Value};

use gleanplumb_core::{HelperFactory, MessageHelper, PlumbError};

/// Deepest expression tree accepted, counting operators, groups and transforms.
pub const MAX_DEPTH: usize = 64;

/// Creates [`JexlHelper`]s over a fixed set of custom attributes.
pub struct JexlHelperFactory {
    attributes: Map<String, Value>,
}

impl JexlHelperFactory {
    /// `app_version` and `date_string` are always available; entries in
    /// `attributes` take precedence over them.
    pub fn new(app_version: &str, attributes: &BTreeMap<String, Value>) -> Self {
        let mut context = Map::new();
        context.insert("app_version".into(), Value::String(app_version.to_string()));
        context.insert(
            "date_string".into(),
            Value::String(chrono::Local::now().format("%Y-%m-%d").to_string()),
        );
        for (key, value) in attributes {
            context.insert(key.clone(), value.clone());
        }
        Self {
            attributes: context,
        }
    }
}

impl HelperFactory for JexlHelperFactory {
    fn create_message_helper(&self) -> Result<Box<dyn MessageHelper>, PlumbError> {
        Ok(Box::new(JexlHelper::new(Value::Object(
            self.attributes.clone(),
        ))))
    }
}

/// Evaluates trigger expressions and formats action templates against one context.
pub struct JexlHelper {
    context: Value,
}

impl JexlHelper {
    pub fn new(context: Value) -> Self {
        Self { context }
    }

    /// Evaluates `expression` to any JSON value.
    pub fn evaluate(&self, expression: &str) -> Result<Value, PlumbError> {
        let tokens = tokenize(expression).map_err(|m| PlumbError::evaluation(expression, m))?;
        let mut parser = Parser {
            tokens,
            pos: 0,
            nesting: 0,
        };
        let ast = parser
            .parse()
            .map_err(|m| PlumbError::evaluation(expression, m))?;
        eval(&ast, &self.context).map_err(|m| PlumbError::evaluation(expression, m))
    }

    fn lookup(&self, path: &str) -> Option<&Value> {
        path.split('.')
            .try_fold(&self.context, |value, key| value.get(key))
    }
}

impl MessageHelper for JexlHelper {
    fn eval_jexl(&self, expression: &str) -> Result<bool, PlumbError> {
        match self.evaluate(expression)? {
            Value::Bool(b) => Ok(b),
            other => Err(PlumbError::evaluation(
                expression,
                format!("expected a boolean, got {other}"),
            )),
        }
    }

    fn get_uuid(&self, template: &str) -> Option<String> {
        template
            .contains("{uuid}")
            .then(|| uuid::Uuid::new_v4().to_string())
    }

    fn string_format(&self, template: &str, uuid: Option<&str>) -> String {
        let mut out = String::with_capacity(template.len());
        let mut rest = template;
        while let Some(open) = rest.find('{') {
            out.push_str(&rest[..open]);
            let after = &rest[open + 1..];
            let Some(close) = after.find('}') else {
                out.push_str(&rest[open..]);
                return out;
            };
            let name = &after[..close];
            let replacement = match name {
                "uuid" => uuid.map(str::to_string),
                _ => self.lookup(name).and_then(|v| match v {
                    Value::String(s) => Some(s.clone()),
                    Value::Number(n) => Some(n.to_string()),
                    Value::Bool(b) => Some(b.to_string()),
                    _ => None,
                }),
            };
            match replacement {
                Some(value) => out.push_str(&value),
                None => out.push_str(&rest[open..open + close + 2]),
            }
            rest = &after[close + 1..];
        }
        out.push_str(rest);
        out
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Str(String),
    Ident(String),
    True,
    False,
    Null,
    In,
    Not,
    Minus,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Comma,
    Pipe,
}

fn tokenize(input: &str) -> Result<Vec<Token>, String> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();

    while let Some(&c) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '(' | ')' | '[' | ']' | ',' | '-' => {
                chars.next();
                tokens.push(match c {
                    '(' => Token::LParen,
                    ')' => Token::RParen,
                    '[' => Token::LBracket,
                    ']' => Token::RBracket,
                    ',' => Token::Comma,
                    _ => Token::Minus,
                });
            }
            '!' => {
                chars.next();
                tokens.push(if next_is(&mut chars, '=') { Token::Ne } else { Token::Not });
            }
            '=' => {
                chars.next();
                if !next_is(&mut chars, '=') {
                    return Err("assignment is not supported, use `==`".into());
                }
                tokens.push(Token::Eq);
            }
            '<' => {
                chars.next();
                tokens.push(if next_is(&mut chars, '=') { Token::Le } else { Token::Lt });
            }
            '>' => {
                chars.next();
                tokens.push(if next_is(&mut chars, '=') { Token::Ge } else { Token::Gt });
            }
            '&' => {
                chars.next();
                if !next_is(&mut chars, '&') {
                    return Err("unexpected `&`".into());
                }
                tokens.push(Token::And);
            }
            '|' => {
                chars.next();
                tokens.push(if next_is(&mut chars, '|') { Token::Or } else { Token::Pipe });
            }
            '\'' | '"' => {
                chars.next();
                tokens.push(Token::Str(read_string(&mut chars, c)?));
            }
            c if c.is_ascii_digit() => {
                let mut literal = String::new();
                while let Some(&d) = chars.peek() {
                    if d.is_ascii_digit() || d == '.' {
                        literal.push(d);
                        chars.next();
                    } else {
                        break;
                    }
                }
                let n = literal
                    .parse::<f64>()
                    .map_err(|_| format!("invalid number `{literal}`"))?;
                tokens.push(Token::Number(n));
            }
            c if c.is_alphabetic() || c == '_' || c == '$' => {
                let mut word = String::new();
                while let Some(&d) = chars.peek() {
                    if d.is_alphanumeric() || matches!(d, '_' | '$' | '.') {
                        word.push(d);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(match word.as_str() {
                    "true" => Token::True,
                    "false" => Token::False,
                    "null" => Token::Null,
                    "in" => Token::In,
                    _ if word.ends_with('.') || word.contains("..") => {
                        return Err(format!("invalid identifier `{word}`"));
                    }
                    _ => Token::Ident(word),
                });
            }
            other => return Err(format!("unexpected character `{other}`")),
        }
    }

    Ok(tokens)
}

fn next_is(chars: &mut Peekable<Chars<'_>>, expected: char) -> bool {
    chars.next_if_eq(&expected).is_some()
}

fn read_string(chars: &mut Peekable<Chars<'_>>, quote: char) -> Result<String, String> {
    let mut s = String::new();
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some(escaped) => s.push(escaped),
                None => break,
            },
            c if c == quote => return Ok(s),
            c => s.push(c),
        }
    }
    Err("unterminated string".into())
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum BinaryOp {
    And,
    Or,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    In,
}

#[derive(Debug)]
enum Expr {
    Literal(Value),
    Ident(String),
    Array(Vec<Expr>),
    Not(Box<Expr>),
    Negate(Box<Expr>),
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
    Transform(String, Box<Expr>, Vec<Expr>),
}

/// A parsed subexpression and the height of its tree.
type Parsed = (Expr, usize);

fn node(expr: Expr, height: usize) -> Result<Parsed, String> {
    if height > MAX_DEPTH {
        return Err(format!("expression nested too deeply (limit {MAX_DEPTH})"));
    }
    Ok((expr, height))
}

/// Recursive-descent parser. Precedence, loosest first:
/// `||`, `&&`, `==`/`!=`, comparisons, `in`, unary, `|transform`.
///
/// `nesting` counts the recursive descents in progress so that runaway
/// input fails before the stack does; tree height is checked per node.
struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    nesting: usize,
}

impl Parser {
    fn parse(&mut self) -> Result<Expr, String> {
        if self.tokens.is_empty() {
            return Err("empty expression".into());
        }
        let (expr, _) = self.or()?;
        match self.peek() {
            None => Ok(expr),
            Some(token) => Err(format!("unexpected token {token:?}")),
        }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn eat(&mut self, token: &Token) -> bool {
        if self.peek() == Some(token) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn descend(&mut self) -> Result<(), String> {
        self.nesting += 1;
        if self.nesting > MAX_DEPTH {
            return Err(format!("expression nested too deeply (limit {MAX_DEPTH})"));
        }
        Ok(())
    }

    fn ascend<T>(&mut self, parsed: T) -> T {
        self.nesting -= 1;
        parsed
    }

    fn binary(
        &mut self,
        ops: &[(Token, BinaryOp)],
        operand: fn(&mut Self) -> Result<Parsed, String>,
    ) -> Result<Parsed, String> {
        let (mut left, mut height) = operand(self)?;
        'outer: loop {
            for (token, op) in ops {
                if self.eat(token) {
                    let (right, right_height) = operand(self)?;
                    (left, height) = node(
                        Expr::Binary(*op, Box::new(left), Box::new(right)),
                        height.max(right_height) + 1,
                    )?;
                    continue 'outer;
                }
            }
            return Ok((left, height));
        }
    }

    fn or(&mut self) -> Result<Parsed, String> {
        self.binary(&[(Token::Or, BinaryOp::Or)], Self::and)
    }

    fn and(&mut self) -> Result<Parsed, String> {
        self.binary(&[(Token::And, BinaryOp::And)], Self::equality)
    }

    fn equality(&mut self) -> Result<Parsed, String> {
        self.binary(
            &[(Token::Eq, BinaryOp::Eq), (Token::Ne, BinaryOp::Ne)],
            Self::comparison,
        )
    }

    fn comparison(&mut self) -> Result<Parsed, String> {
        self.binary(
            &[
                (Token::Le, BinaryOp::Le),
                (Token::Lt, BinaryOp::Lt),
                (Token::Ge, BinaryOp::Ge),
                (Token::Gt, BinaryOp::Gt),
            ],
            Self::membership,
        )
    }

    fn membership(&mut self) -> Result<Parsed, String> {
        self.binary(&[(Token::In, BinaryOp::In)], Self::unary)
    }

    fn unary(&mut self) -> Result<Parsed, String> {
        if self.eat(&Token::Not) {
            self.descend()?;
            let (inner, height) = self.unary()?;
            return self.ascend(node(Expr::Not(Box::new(inner)), height + 1));
        }
        if self.eat(&Token::Minus) {
            self.descend()?;
            let (inner, height) = self.unary()?;
            return self.ascend(node(Expr::Negate(Box::new(inner)), height + 1));
        }
        self.transformed()
    }

    /// A primary followed by any number of `|name` or `|name(args)` transforms.
    fn transformed(&mut self) -> Result<Parsed, String> {
        let (mut expr, mut height) = self.primary()?;
        while self.eat(&Token::Pipe) {
            let name = match self.next() {
                Some(Token::Ident(name)) => name,
                _ => return Err("expected a transform name after `|`".into()),
            };
            let mut args = Vec::new();
            if self.eat(&Token::LParen) {
                self.descend()?;
                let (parsed, args_height) = self.list(Token::RParen)?;
                self.ascend(());
                args = parsed;
                height = height.max(args_height);
            }
            (expr, height) = node(Expr::Transform(name, Box::new(expr), args), height + 1)?;
        }
        Ok((expr, height))
    }

    fn primary(&mut self) -> Result<Parsed, String> {
        match self.next() {
            Some(Token::Number(n)) => serde_json::Number::from_f64(n)
                .map(|n| (Expr::Literal(Value::Number(n)), 1))
                .ok_or_else(|| format!("invalid number {n}")),
            Some(Token::Str(s)) => Ok((Expr::Literal(Value::String(s)), 1)),
            Some(Token::True) => Ok((Expr::Literal(Value::Bool(true)), 1)),
            Some(Token::False) => Ok((Expr::Literal(Value::Bool(false)), 1)),
            Some(Token::Null) => Ok((Expr::Literal(Value::Null), 1)),
            Some(Token::Ident(name)) => Ok((Expr::Ident(name), 1)),
            Some(Token::LParen) => {
                self.descend()?;
                let inner = self.or()?;
                if !self.eat(&Token::RParen) {
                    return Err("expected `)`".into());
                }
                Ok(self.ascend(inner))
            }
            Some(Token::LBracket) => {
                self.descend()?;
                let (items, height) = self.list(Token::RBracket)?;
                self.ascend(node(Expr::Array(items), height + 1))
            }
            Some(token) => Err(format!("unexpected token {token:?}")),
            None => Err("unexpected end of expression".into()),
        }
    }

    /// Comma-separated expressions up to `close`, which is consumed.
    /// Returns the items and the tallest item's height.
    fn list(&mut self, close: Token) -> Result<(Vec<Expr>, usize), String> {
        let mut items = Vec::new();
        let mut height = 0;
        if self.eat(&close) {
            return Ok((items, height));
        }
        loop {
            let (item, item_height) = self.or()?;
            items.push(item);
            height = height.max(item_height);
            if self.eat(&close) {
                return Ok((items, height));
            }
            if !self.eat(&Token::Comma) {
                return Err(format!("expected `,` or {close:?}"));
            }
        }
    }
}

fn eval(expr: &Expr, context: &Value) -> Result<Value, String> {
    match expr {
        Expr::Literal(value) => Ok(value.clone()),
        Expr::Ident(path) => Ok(path
            .split('.')
            .try_fold(context, |value, key| value.get(key))
            .cloned()
            .unwrap_or(Value::Null)),
        Expr::Array(items) => items
            .iter()
            .map(|item| eval(item, context))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        Expr::Not(inner) => Ok(Value::Bool(!truthy(&eval(inner, context)?))),
        Expr::Negate(inner) => match eval(inner, context)? {
            Value::Number(n) => n
                .as_f64()
                .and_then(|n| serde_json::Number::from_f64(-n))
                .map(Value::Number)
                .ok_or_else(|| "cannot negate number".to_string()),
            other => Err(format!("cannot negate {other}")),
        },
        Expr::Binary(op, left, right) => {
            let left = eval(left, context)?;
            match op {
                BinaryOp::And => {
                    if !truthy(&left) {
                        return Ok(Value::Bool(false));
                    }
                    Ok(Value::Bool(truthy(&eval(right, context)?)))
                }
                BinaryOp::Or => {
                    if truthy(&left) {
                        return Ok(Value::Bool(true));
                    }
                    Ok(Value::Bool(truthy(&eval(right, context)?)))
                }
                _ => {
                    let right = eval(right, context)?;
                    binary(*op, &left, &right).map(Value::Bool)
                }
            }
        }
        Expr::Transform(name, subject, args) => {
            let subject = eval(subject, context)?;
            let args = args
                .iter()
                .map(|arg| eval(arg, context))
                .collect::<Result<Vec<_>, _>>()?;
            transform(name, &subject, &args)
        }
    }
}

fn transform(name: &str, subject: &Value, args: &[Value]) -> Result<Value, String> {
    match (name, subject, args) {
        ("versionCompare", Value::String(version), [Value::String(other)]) => {
            let ordering = compare_versions(version, other);
            Ok(Value::from(ordering as i8))
        }
        ("versionCompare", _, _) => {
            Err("versionCompare takes a version string and one version argument".into())
        }
        ("date", Value::String(date), []) => parse_date(date)
            .map(Value::from)
            .ok_or_else(|| format!("cannot parse date `{date}`")),
        ("date", _, _) => Err("date takes a date string and no arguments".into()),
        (other, _, _) => Err(format!("unknown transform `{other}`")),
    }
}

/// Dotted version comparison. Each part is a number with an optional
/// pre-release suffix (`110.0a1`); a suffix sorts before the bare number
/// and missing parts count as `0`.
fn compare_versions(left: &str, right: &str) -> Ordering {
    let left: Vec<&str> = left.split('.').collect();
    let right: Vec<&str> = right.split('.').collect();
    (0..left.len().max(right.len()))
        .map(|i| {
            compare_version_part(
                left.get(i).copied().unwrap_or("0"),
                right.get(i).copied().unwrap_or("0"),
            )
        })
        .find(|ordering| ordering.is_ne())
        .unwrap_or(Ordering::Equal)
}

fn compare_version_part(left: &str, right: &str) -> Ordering {
    let split = |part: &str| {
        let digits = part.len() - part.trim_start_matches(|c: char| c.is_ascii_digit()).len();
        let number = part[..digits].parse::<u64>().unwrap_or(0);
        (number, part[digits..].to_string())
    };
    let (left_number, left_suffix) = split(left);
    let (right_number, right_suffix) = split(right);
    left_number.cmp(&right_number).then_with(|| {
        match (left_suffix.is_empty(), right_suffix.is_empty()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) => left_suffix.cmp(&right_suffix),
        }
    })
}

/// Epoch milliseconds of an RFC 3339 timestamp or a `YYYY-MM-DD` date (UTC midnight).
fn parse_date(date: &str) -> Option<i64> {
    if let Ok(at) = chrono::DateTime::parse_from_rfc3339(date) {
        return Some(at.timestamp_millis());
    }
    chrono::NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .ok()?
        .and_hms_opt(0, 0, 0)
        .map(|at| at.and_utc().timestamp_millis())
}

fn binary(op: BinaryOp, left: &Value, right: &Value) -> Result<bool, String> {
    match op {
        BinaryOp::Eq => Ok(loose_eq(left, right)),
        BinaryOp::Ne => Ok(!loose_eq(left, right)),
        BinaryOp::In => match right {
            Value::String(haystack) => match left {
                Value::String(needle) => Ok(haystack.contains(needle.as_str())),
                other => Err(format!("cannot search for {other} in a string")),
            },
            Value::Array(items) => Ok(items.iter().any(|item| loose_eq(left, item))),
            Value::Object(map) => match left {
                Value::String(key) => Ok(map.contains_key(key)),
                other => Err(format!("cannot search for {other} in an object")),
            },
            Value::Null => Ok(false),
            other => Err(format!("cannot search in {other}")),
        },
        BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => {
            let ordering = match (left, right) {
                (Value::Number(a), Value::Number(b)) => a
                    .as_f64()
                    .zip(b.as_f64())
                    .and_then(|(a, b)| a.partial_cmp(&b)),
                (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
                _ => None,
            }
            .ok_or_else(|| format!("cannot compare {left} with {right}"))?;
            Ok(match op {
                BinaryOp::Lt => ordering.is_lt(),
                BinaryOp::Le => ordering.is_le(),
                BinaryOp::Gt => ordering.is_gt(),
                _ => ordering.is_ge(),
            })
        }
        BinaryOp::And | BinaryOp::Or => Err("logical operator reached comparison".into()),
    }
}

fn loose_eq(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => a.as_f64() == b.as_f64(),
        _ => left == right,
    }
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
