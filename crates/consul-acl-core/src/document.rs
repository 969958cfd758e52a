//! Parser for rule documents.
//!
//! Rule documents are written in a small subset of HCL. This module turns
//! the text into a generic [`Document`] tree without giving any meaning to
//! keys; [`decode`](crate::decode::decode) interprets the tree as rules.
//!
//! ## Syntax
//!
//! ```text
//! document ::= item*
//! item     ::= key label* ( "=" value | object )
//! key      ::= identifier | string
//! label    ::= identifier | string
//! value    ::= string | number | "true" | "false" | object | list
//! object   ::= "{" item* "}"
//! list     ::= "[" ( value ","? )* "]"
//! ```
//!
//! Items may be separated by newlines or commas. `#`, `//` and `/* */`
//! comments are ignored. Strings are double-quoted and support the
//! escapes `\"`, `\\`, `\n`, `\r` and `\t`.
//!
//! ## Limits
//!
//! Objects and lists may nest at most [`MAX_DEPTH`] levels deep.

use crate::error::CoreError;

/// Maximum nesting of objects and lists.
pub const MAX_DEPTH: usize = 32;

/// A parsed document: its top-level items in source order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Document {
    pub items: Vec<Item>,
}

/// One assignment or block.
///
/// `key = "x"` has no labels and a scalar value; `key "a" { ... }` has
/// one label and an object value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub key: String,
    pub labels: Vec<String>,
    pub value: Value,
    /// Line the item starts on (1-based).
    pub line: usize,
}

/// A parsed value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// A string, number or boolean, as text.
    Scalar(String),
    List(Vec<Value>),
    Object(Vec<Item>),
}

/// Parse a document.
pub fn parse_document(input: &str) -> Result<Document, CoreError> {
    let tokens = tokenize(input)?;
    let mut parser = Parser::new(&tokens);
    let items = parser.parse_items(None, 0)?;
    Ok(Document { items })
}

// ===== TOKENIZER =====

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Identifier(String),
    StringLiteral(String),
    Number(String),
    Equal,
    LeftBrace,
    RightBrace,
    LeftBracket,
    RightBracket,
    Comma,
    Newline,
}

#[derive(Debug, Clone)]
struct Spanned {
    token: Token,
    line: usize,
}

fn tokenize(input: &str) -> Result<Vec<Spanned>, CoreError> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();
    let mut line = 1;

    while let Some(&ch) = chars.peek() {
        match ch {
            ' ' | '\t' | '\r' => {
                chars.next();
            }
            '\n' => {
                chars.next();
                tokens.push(Spanned {
                    token: Token::Newline,
                    line,
                });
                line += 1;
            }
            '#' => skip_line(&mut chars),
            '/' => {
                chars.next();
                match chars.next() {
                    Some('/') => skip_line(&mut chars),
                    Some('*') => {
                        let start = line;
                        let mut prev = '\0';
                        loop {
                            match chars.next() {
                                Some('/') if prev == '*' => break,
                                Some(c) => {
                                    if c == '\n' {
                                        line += 1;
                                    }
                                    prev = c;
                                }
                                None => {
                                    return Err(CoreError::malformed(start, "unterminated comment"))
                                }
                            }
                        }
                    }
                    _ => return Err(CoreError::malformed(line, "unexpected character '/'")),
                }
            }
            '=' => {
                chars.next();
                tokens.push(Spanned {
                    token: Token::Equal,
                    line,
                });
            }
            '{' | '}' | '[' | ']' | ',' => {
                chars.next();
                let token = match ch {
                    '{' => Token::LeftBrace,
                    '}' => Token::RightBrace,
                    '[' => Token::LeftBracket,
                    ']' => Token::RightBracket,
                    _ => Token::Comma,
                };
                tokens.push(Spanned { token, line });
            }
            '"' => {
                chars.next();
                let mut value = String::new();
                loop {
                    match chars.next() {
                        Some('"') => break,
                        Some('\\') => match chars.next() {
                            Some('"') => value.push('"'),
                            Some('\\') => value.push('\\'),
                            Some('n') => value.push('\n'),
                            Some('r') => value.push('\r'),
                            Some('t') => value.push('\t'),
                            Some(c) => {
                                return Err(CoreError::malformed(
                                    line,
                                    format!("invalid escape sequence '\\{}'", c),
                                ))
                            }
                            None => {
                                return Err(CoreError::malformed(line, "unterminated string literal"))
                            }
                        },
                        Some('\n') | None => {
                            return Err(CoreError::malformed(line, "unterminated string literal"))
                        }
                        Some(c) => value.push(c),
                    }
                }
                tokens.push(Spanned {
                    token: Token::StringLiteral(value),
                    line,
                });
            }
            c if c.is_ascii_digit() || c == '-' => {
                let mut number = String::new();
                while let Some(&c) = chars.peek() {
                    if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '+') {
                        number.push(c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                if !number.chars().any(|c| c.is_ascii_digit()) {
                    return Err(CoreError::malformed(
                        line,
                        format!("invalid number '{}'", number),
                    ));
                }
                tokens.push(Spanned {
                    token: Token::Number(number),
                    line,
                });
            }
            c if c.is_alphabetic() || c == '_' => {
                let mut ident = String::new();
                while let Some(&c) = chars.peek() {
                    if c.is_alphanumeric() || matches!(c, '_' | '-' | '.') {
                        ident.push(c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Spanned {
                    token: Token::Identifier(ident),
                    line,
                });
            }
            other => {
                return Err(CoreError::malformed(
                    line,
                    format!("unexpected character '{}'", other),
                ))
            }
        }
    }

    Ok(tokens)
}

fn skip_line(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) {
    while let Some(&c) = chars.peek() {
        if c == '\n' {
            break;
        }
        chars.next();
    }
}

// ===== PARSER =====

struct Parser<'a> {
    tokens: &'a [Spanned],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(tokens: &'a [Spanned]) -> Self {
        Self { tokens, pos: 0 }
    }

    fn current(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos).map(|s| &s.token)
    }

    fn advance(&mut self) -> Option<&'a Token> {
        let token = self.tokens.get(self.pos).map(|s| &s.token);
        self.pos += 1;
        token
    }

    /// Line of the current token, or of the last one at end of input.
    fn line(&self) -> usize {
        self.tokens
            .get(self.pos)
            .or_else(|| self.tokens.last())
            .map_or(1, |s| s.line)
    }

    fn error(&self, message: impl Into<String>) -> CoreError {
        CoreError::malformed(self.line(), message)
    }

    fn skip_separators(&mut self) {
        while matches!(self.current(), Some(Token::Newline | Token::Comma)) {
            self.advance();
        }
    }

    fn skip_newlines(&mut self) {
        while matches!(self.current(), Some(Token::Newline)) {
            self.advance();
        }
    }

    // items ::= item* (terminated by `close` or end of input)
    fn parse_items(&mut self, close: Option<Token>, depth: usize) -> Result<Vec<Item>, CoreError> {
        let mut items = Vec::new();
        loop {
            self.skip_separators();
            match (self.current(), &close) {
                (None, None) => return Ok(items),
                (None, Some(_)) => return Err(self.error("unexpected end of document, expected '}'")),
                (Some(token), Some(close)) if token == close => {
                    self.advance();
                    return Ok(items);
                }
                _ => items.push(self.parse_item(depth)?),
            }
        }
    }

    // item ::= key label* ( "=" value | object )
    fn parse_item(&mut self, depth: usize) -> Result<Item, CoreError> {
        let line = self.line();
        let key = match self.advance() {
            Some(Token::Identifier(s)) | Some(Token::StringLiteral(s)) => s.clone(),
            Some(token) => return Err(self.error(format!("expected key, got {}", describe(token)))),
            None => return Err(self.error("expected key, got end of document")),
        };

        let mut labels = Vec::new();
        loop {
            match self.current() {
                Some(Token::Identifier(s)) | Some(Token::StringLiteral(s)) => {
                    labels.push(s.clone());
                    self.advance();
                }
                Some(Token::Equal) if labels.is_empty() => {
                    self.advance();
                    self.skip_newlines();
                    let value = self.parse_value(depth)?;
                    return Ok(Item {
                        key,
                        labels,
                        value,
                        line,
                    });
                }
                Some(Token::LeftBrace) => {
                    let value = self.parse_object(depth)?;
                    return Ok(Item {
                        key,
                        labels,
                        value,
                        line,
                    });
                }
                Some(token) => {
                    return Err(self.error(format!(
                        "expected '=' or '{{' after '{}', got {}",
                        key,
                        describe(token)
                    )))
                }
                None => {
                    return Err(self.error(format!(
                        "expected '=' or '{{' after '{}', got end of document",
                        key
                    )))
                }
            }
        }
    }

    // value ::= string | number | bool | object | list
    fn parse_value(&mut self, depth: usize) -> Result<Value, CoreError> {
        match self.current() {
            Some(Token::StringLiteral(s)) | Some(Token::Number(s)) => {
                self.advance();
                Ok(Value::Scalar(s.clone()))
            }
            Some(Token::Identifier(s)) if s == "true" || s == "false" => {
                self.advance();
                Ok(Value::Scalar(s.clone()))
            }
            Some(Token::LeftBrace) => self.parse_object(depth),
            Some(Token::LeftBracket) => self.parse_list(depth),
            Some(token) => Err(self.error(format!("expected value, got {}", describe(token)))),
            None => Err(self.error("expected value, got end of document")),
        }
    }

    // object ::= "{" item* "}"
    fn parse_object(&mut self, depth: usize) -> Result<Value, CoreError> {
        if depth >= MAX_DEPTH {
            return Err(self.error(format!("nesting exceeds maximum depth of {}", MAX_DEPTH)));
        }
        self.advance();
        let items = self.parse_items(Some(Token::RightBrace), depth + 1)?;
        Ok(Value::Object(items))
    }

    // list ::= "[" ( value ","? )* "]"
    fn parse_list(&mut self, depth: usize) -> Result<Value, CoreError> {
        if depth >= MAX_DEPTH {
            return Err(self.error(format!("nesting exceeds maximum depth of {}", MAX_DEPTH)));
        }
        self.advance();
        let mut values = Vec::new();
        loop {
            self.skip_separators();
            match self.current() {
                Some(Token::RightBracket) => {
                    self.advance();
                    return Ok(Value::List(values));
                }
                None => return Err(self.error("unexpected end of document, expected ']'")),
                _ => values.push(self.parse_value(depth + 1)?),
            }
        }
    }
}

fn describe(token: &Token) -> String {
    match token {
        Token::Identifier(s) => format!("identifier '{}'", s),
        Token::StringLiteral(s) => format!("string \"{}\"", s),
        Token::Number(s) => format!("number {}", s),
        Token::Equal => "'='".into(),
        Token::LeftBrace => "'{'".into(),
        Token::RightBrace => "'}'".into(),
        Token::LeftBracket => "'['".into(),
        Token::RightBracket => "']'".into(),
        Token::Comma => "','".into(),
        Token::Newline => "newline".into(),
    }
}
