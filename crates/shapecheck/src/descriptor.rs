//! Type descriptor grammar: parsing and matching.
//!
//! Descriptors are the string mini-language schemas use at their leaves:
//! primitive tokens (`Number`, `String`, ...), the wildcard `*`, unions
//! joined by `|`, bracketed array-of forms, and the `Maybe` prefix. They are
//! parsed once at schema compile time into a [`Descriptor`] tree; matching a
//! value is then a plain recursive walk with no string inspection.

use std::fmt;

use crate::error::{SchemaError, SchemaResult};
use crate::value::Value;

/// A primitive type token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primitive {
    Number,
    String,
    Boolean,
    Array,
    Function,
    Object,
    Date,
}

impl Primitive {
    /// The descriptor spelling of this primitive.
    pub fn token(self) -> &'static str {
        match self {
            Primitive::Number => "Number",
            Primitive::String => "String",
            Primitive::Boolean => "Boolean",
            Primitive::Array => "Array",
            Primitive::Function => "Function",
            Primitive::Object => "Object",
            Primitive::Date => "Date",
        }
    }

    fn from_token(token: &str) -> Option<Primitive> {
        match token {
            "Number" => Some(Primitive::Number),
            "String" => Some(Primitive::String),
            "Boolean" => Some(Primitive::Boolean),
            "Array" => Some(Primitive::Array),
            "Function" => Some(Primitive::Function),
            "Object" => Some(Primitive::Object),
            "Date" => Some(Primitive::Date),
            _ => None,
        }
    }

    fn matches(self, value: &Value) -> bool {
        matches!(
            (self, value),
            (Primitive::Number, Value::Number(_))
                | (Primitive::String, Value::String(_))
                | (Primitive::Boolean, Value::Bool(_))
                | (Primitive::Array, Value::Array(_))
                | (Primitive::Function, Value::Function)
                | (Primitive::Object, Value::Object(_))
                | (Primitive::Date, Value::Date(_))
        )
    }
}

/// A parsed type descriptor.
///
/// The grammar, whitespace-tolerant and case-sensitive:
///
/// ```text
/// descriptor := term ( "|" term )*
/// term       := "Maybe" term | "[" descriptor "]" | "*" | primitive
/// ```
///
/// `Maybe` binds to the single following term, so `Maybe Number | String`
/// reads as `(Maybe Number) | String`.
#[derive(Debug, Clone, PartialEq)]
pub enum Descriptor {
    /// `*`: matches every value.
    Any,
    Primitive(Primitive),
    /// `Maybe t`: matches `Null` or whatever `t` matches.
    Maybe(Box<Descriptor>),
    /// `[a | b]`: an array whose every item matches some member.
    ArrayOf(Vec<Descriptor>),
    /// `a | b`: matches when any member matches.
    Union(Vec<Descriptor>),
}

impl Descriptor {
    /// Parse a descriptor string.
    ///
    /// Unknown tokens and malformed syntax are compile-time schema errors;
    /// a successfully parsed descriptor never fails at validation time.
    pub fn parse(input: &str) -> SchemaResult<Descriptor> {
        let tokens = lex(input)?;
        let mut parser = Parser {
            source: input,
            tokens,
            pos: 0,
        };
        if parser.peek().is_none() {
            return Err(parser.malformed("empty descriptor"));
        }
        let descriptor = parser.descriptor()?;
        if let Some(token) = parser.peek() {
            let found = token.describe();
            return Err(parser.malformed(format!("unexpected trailing {}", found)));
        }
        Ok(descriptor)
    }

    /// Does `value` satisfy this descriptor?
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            Descriptor::Any => true,
            Descriptor::Primitive(primitive) => primitive.matches(value),
            Descriptor::Maybe(inner) => value.is_null() || inner.matches(value),
            Descriptor::Union(terms) => terms.iter().any(|term| term.matches(value)),
            Descriptor::ArrayOf(terms) => match value {
                Value::Array(items) => items
                    .iter()
                    .all(|item| terms.iter().any(|term| term.matches(item))),
                _ => false,
            },
        }
    }

    fn into_union_terms(self) -> Vec<Descriptor> {
        match self {
            Descriptor::Union(terms) => terms,
            other => vec![other],
        }
    }
}

/// Canonical string form; round-trips through [`Descriptor::parse`].
impl fmt::Display for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Descriptor::Any => f.write_str("*"),
            Descriptor::Primitive(primitive) => f.write_str(primitive.token()),
            Descriptor::Maybe(inner) => write!(f, "Maybe {}", inner),
            Descriptor::ArrayOf(terms) => {
                f.write_str("[")?;
                write_terms(f, terms)?;
                f.write_str("]")
            }
            Descriptor::Union(terms) => write_terms(f, terms),
        }
    }
}

fn write_terms(f: &mut fmt::Formatter<'_>, terms: &[Descriptor]) -> fmt::Result {
    for (i, term) in terms.iter().enumerate() {
        if i > 0 {
            f.write_str(" | ")?;
        }
        write!(f, "{}", term)?;
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Pipe,
    Open,
    Close,
    Star,
    Word(String),
}

impl Token {
    fn describe(&self) -> String {
        match self {
            Token::Pipe => "'|'".to_string(),
            Token::Open => "'['".to_string(),
            Token::Close => "']'".to_string(),
            Token::Star => "'*'".to_string(),
            Token::Word(word) => format!("'{}'", word),
        }
    }
}

fn lex(input: &str) -> SchemaResult<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();
    while let Some(&(start, c)) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '|' => {
                tokens.push(Token::Pipe);
                chars.next();
            }
            '[' => {
                tokens.push(Token::Open);
                chars.next();
            }
            ']' => {
                tokens.push(Token::Close);
                chars.next();
            }
            '*' => {
                tokens.push(Token::Star);
                chars.next();
            }
            c if c.is_alphabetic() => {
                let mut end = start + c.len_utf8();
                chars.next();
                while let Some(&(offset, d)) = chars.peek() {
                    if d.is_alphanumeric() {
                        end = offset + d.len_utf8();
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token::Word(input[start..end].to_string()));
            }
            other => {
                return Err(SchemaError::MalformedDescriptor {
                    descriptor: input.to_string(),
                    reason: format!("unexpected character '{}'", other),
                });
            }
        }
    }
    Ok(tokens)
}

struct Parser<'a> {
    source: &'a str,
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn malformed(&self, reason: impl Into<String>) -> SchemaError {
        SchemaError::MalformedDescriptor {
            descriptor: self.source.to_string(),
            reason: reason.into(),
        }
    }

    fn descriptor(&mut self) -> SchemaResult<Descriptor> {
        let mut terms = vec![self.term()?];
        while self.peek() == Some(&Token::Pipe) {
            self.pos += 1;
            terms.push(self.term()?);
        }
        if terms.len() == 1 {
            Ok(terms.remove(0))
        } else {
            Ok(Descriptor::Union(terms))
        }
    }

    fn term(&mut self) -> SchemaResult<Descriptor> {
        match self.advance() {
            Some(Token::Star) => Ok(Descriptor::Any),
            Some(Token::Open) => {
                let inner = self.descriptor()?;
                match self.advance() {
                    Some(Token::Close) => Ok(Descriptor::ArrayOf(inner.into_union_terms())),
                    Some(token) => {
                        Err(self.malformed(format!("expected ']', found {}", token.describe())))
                    }
                    None => Err(self.malformed("expected ']'")),
                }
            }
            Some(Token::Word(word)) if word == "Maybe" => {
                Ok(Descriptor::Maybe(Box::new(self.term()?)))
            }
            Some(Token::Word(word)) => match Primitive::from_token(&word) {
                Some(primitive) => Ok(Descriptor::Primitive(primitive)),
                None => Err(SchemaError::UnknownToken(word)),
            },
            Some(token) => Err(self.malformed(format!("unexpected {}", token.describe()))),
            None => Err(self.malformed("unexpected end of input")),
        }
    }
}
