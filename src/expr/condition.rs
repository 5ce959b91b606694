//! Gating expressions (`when:`).
//!
//! # Grammar
//!
//! ```text
//! expr    := or
//! or      := and ("or" and)*
//! and     := unary ("and" unary)*
//! unary   := "not" unary | compare
//! compare := operand (("==" | "!=") operand)?
//! operand := "(" expr ")" | literal | path | "^^" reference
//! literal := 'text' | "text" | number | true | false | True | False | null | None
//! ```
//!
//! A bare operand is tested for truthiness: `null`, `false`, `0`, `""` and
//! empty collections are false. Attribute paths follow the rules of
//! [`AttributePath`]; a path that does not exist is an error rather than
//! false.

use serde::{Serialize, Serializer};
use serde_yaml::Value;

use crate::context::{ExecutionContext, StepPath};
use crate::error::{OrgflowError, Result};

use super::path::AttributePath;
use super::reference::Backreference;

/// A parsed gating expression.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    source: String,
    root: Node,
}

#[derive(Debug, Clone, PartialEq)]
enum Node {
    Literal(Value),
    Attribute(AttributePath),
    Backref(Backreference),
    Not(Box<Node>),
    And(Box<Node>, Box<Node>),
    Or(Box<Node>, Box<Node>),
    Eq(Box<Node>, Box<Node>),
    Ne(Box<Node>, Box<Node>),
}

impl Condition {
    /// Parse an expression.
    ///
    /// # Errors
    ///
    /// Returns `ConditionSyntax` with the offending expression.
    pub fn parse(source: &str) -> Result<Self> {
        let syntax = |message: String| OrgflowError::ConditionSyntax {
            expression: source.to_string(),
            message,
        };

        let tokens = tokenize(source).map_err(syntax)?;
        if tokens.is_empty() {
            return Err(syntax("expression is empty".to_string()));
        }

        let mut parser = Parser { tokens, pos: 0 };
        let root = parser.expr().map_err(syntax)?;
        if let Some(token) = parser.peek() {
            return Err(syntax(format!("unexpected {}", token.describe())));
        }

        Ok(Self {
            source: source.to_string(),
            root,
        })
    }

    /// The expression as written.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Evaluate against the context as it stands before the step runs.
    pub fn evaluate(&self, ctx: &ExecutionContext, step: &StepPath) -> Result<bool> {
        Ok(truthy(&eval(&self.root, ctx, step)?))
    }

    /// Visit every backreference in the expression.
    pub fn for_each_backreference_mut(
        &mut self,
        f: &mut dyn FnMut(&mut Backreference) -> Result<()>,
    ) -> Result<()> {
        visit_mut(&mut self.root, f)
    }
}

impl Serialize for Condition {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.source)
    }
}

fn visit_mut(node: &mut Node, f: &mut dyn FnMut(&mut Backreference) -> Result<()>) -> Result<()> {
    match node {
        Node::Backref(reference) => f(reference),
        Node::Not(inner) => visit_mut(inner, f),
        Node::And(a, b) | Node::Or(a, b) | Node::Eq(a, b) | Node::Ne(a, b) => {
            visit_mut(a, f)?;
            visit_mut(b, f)
        }
        Node::Literal(_) | Node::Attribute(_) => Ok(()),
    }
}

fn eval(node: &Node, ctx: &ExecutionContext, step: &StepPath) -> Result<Value> {
    Ok(match node {
        Node::Literal(value) => value.clone(),
        Node::Attribute(path) => path.lookup(ctx.config())?.clone(),
        Node::Backref(reference) => reference.resolve(ctx.results(), step)?,
        Node::Not(inner) => Value::Bool(!truthy(&eval(inner, ctx, step)?)),
        Node::And(a, b) => {
            Value::Bool(truthy(&eval(a, ctx, step)?) && truthy(&eval(b, ctx, step)?))
        }
        Node::Or(a, b) => {
            Value::Bool(truthy(&eval(a, ctx, step)?) || truthy(&eval(b, ctx, step)?))
        }
        Node::Eq(a, b) => Value::Bool(values_equal(&eval(a, ctx, step)?, &eval(b, ctx, step)?)),
        Node::Ne(a, b) => Value::Bool(!values_equal(&eval(a, ctx, step)?, &eval(b, ctx, step)?)),
    })
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|v| v != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Sequence(items) => !items.is_empty(),
        Value::Mapping(map) => !map.is_empty(),
        Value::Tagged(tagged) => truthy(&tagged.value),
    }
}

fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        _ => a == b,
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    LParen,
    RParen,
    Eq,
    Ne,
    And,
    Or,
    Not,
    Literal(Value),
    Path(String),
    Backref(String),
}

impl Token {
    fn describe(&self) -> String {
        match self {
            Token::LParen => "'('".to_string(),
            Token::RParen => "')'".to_string(),
            Token::Eq => "'=='".to_string(),
            Token::Ne => "'!='".to_string(),
            Token::And => "'and'".to_string(),
            Token::Or => "'or'".to_string(),
            Token::Not => "'not'".to_string(),
            Token::Literal(value) => format!("literal {:?}", value),
            Token::Path(path) => format!("'{}'", path),
            Token::Backref(body) => format!("'^^{}'", body),
        }
    }
}

fn is_path_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '.' || c == '-'
}

fn tokenize(source: &str) -> std::result::Result<Vec<Token>, String> {
    let chars: Vec<char> = source.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            _ if c.is_whitespace() => i += 1,
            '(' => {
                tokens.push(Token::LParen);
                i += 1;
            }
            ')' => {
                tokens.push(Token::RParen);
                i += 1;
            }
            '=' | '!' => {
                if chars.get(i + 1) != Some(&'=') {
                    return Err(format!("expected '{}=' at offset {}", c, i));
                }
                tokens.push(if c == '=' { Token::Eq } else { Token::Ne });
                i += 2;
            }
            '\'' | '"' => {
                let quote = c;
                let mut text = String::new();
                i += 1;
                loop {
                    match chars.get(i) {
                        None => return Err("unterminated string literal".to_string()),
                        Some('\\') => {
                            let escaped = chars
                                .get(i + 1)
                                .ok_or_else(|| "unterminated string literal".to_string())?;
                            text.push(*escaped);
                            i += 2;
                        }
                        Some(&ch) if ch == quote => {
                            i += 1;
                            break;
                        }
                        Some(&ch) => {
                            text.push(ch);
                            i += 1;
                        }
                    }
                }
                tokens.push(Token::Literal(Value::String(text)));
            }
            '^' => {
                if chars.get(i + 1) != Some(&'^') {
                    return Err(format!("expected '^^' at offset {}", i));
                }
                let start = i + 2;
                let mut end = start;
                while end < chars.len() && is_path_char(chars[end]) {
                    end += 1;
                }
                tokens.push(Token::Backref(chars[start..end].iter().collect()));
                i = end;
            }
            _ if c.is_ascii_digit()
                || (c == '-' && chars.get(i + 1).is_some_and(|d| d.is_ascii_digit())) =>
            {
                let start = i;
                i += 1;
                while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                    i += 1;
                }
                let text: String = chars[start..i].iter().collect();
                let value = if let Ok(int) = text.parse::<i64>() {
                    Value::from(int)
                } else if let Ok(float) = text.parse::<f64>() {
                    Value::from(float)
                } else {
                    return Err(format!("invalid number '{}'", text));
                };
                tokens.push(Token::Literal(value));
            }
            _ if c.is_ascii_alphabetic() || c == '_' => {
                let start = i;
                while i < chars.len() && is_path_char(chars[i]) {
                    i += 1;
                }
                let word: String = chars[start..i].iter().collect();
                tokens.push(match word.as_str() {
                    "and" => Token::And,
                    "or" => Token::Or,
                    "not" => Token::Not,
                    "true" | "True" => Token::Literal(Value::Bool(true)),
                    "false" | "False" => Token::Literal(Value::Bool(false)),
                    "null" | "None" => Token::Literal(Value::Null),
                    _ => Token::Path(word),
                });
            }
            _ => return Err(format!("unexpected character '{}' at offset {}", c, i)),
        }
    }

    Ok(tokens)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

type ParseResult = std::result::Result<Node, String>;

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn eat(&mut self, expected: &Token) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expr(&mut self) -> ParseResult {
        let mut left = self.and()?;
        while self.eat(&Token::Or) {
            let right = self.and()?;
            left = Node::Or(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn and(&mut self) -> ParseResult {
        let mut left = self.unary()?;
        while self.eat(&Token::And) {
            let right = self.unary()?;
            left = Node::And(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn unary(&mut self) -> ParseResult {
        if self.eat(&Token::Not) {
            return Ok(Node::Not(Box::new(self.unary()?)));
        }
        self.compare()
    }

    fn compare(&mut self) -> ParseResult {
        let left = self.operand()?;
        if self.eat(&Token::Eq) {
            return Ok(Node::Eq(Box::new(left), Box::new(self.operand()?)));
        }
        if self.eat(&Token::Ne) {
            return Ok(Node::Ne(Box::new(left), Box::new(self.operand()?)));
        }
        Ok(left)
    }

    fn operand(&mut self) -> ParseResult {
        match self.next() {
            Some(Token::LParen) => {
                let inner = self.expr()?;
                if !self.eat(&Token::RParen) {
                    return Err("expected ')'".to_string());
                }
                Ok(inner)
            }
            Some(Token::Literal(value)) => Ok(Node::Literal(value)),
            Some(Token::Path(raw)) => AttributePath::parse(&raw)
                .map(Node::Attribute)
                .ok_or_else(|| format!("malformed attribute path '{}'", raw)),
            Some(Token::Backref(body)) => Backreference::parse(&body)
                .map(Node::Backref)
                .ok_or_else(|| format!("malformed backreference '^^{}'", body)),
            Some(token) => Err(format!("unexpected {}", token.describe())),
            None => Err("unexpected end of expression".to_string()),
        }
    }
}
