use std::fmt;

use vfq_common::{Result, VfqError};

/// Lexical token, tagged with nothing; positions travel next to tokens in
/// the output of [`tokenize`].
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Keywords (matched case-insensitively)
    Select,
    From,
    Where,
    And,
    Or,
    Not,
    In,
    Order,
    By,
    Asc,
    Desc,
    Limit,
    Offset,
    Match,
    Within,
    As,
    Id,
    Similarity,
    Vector,
    Null,

    // Operators
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,

    // Punctuation
    Star,
    Comma,
    LParen,
    RParen,
    LBracket,
    RBracket,

    // Literals
    Identifier(String),
    Text(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    /// Named parameter, e.g. `:q`.
    Param(String),

    Eof,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Select => write!(f, "SELECT"),
            Token::From => write!(f, "FROM"),
            Token::Where => write!(f, "WHERE"),
            Token::And => write!(f, "AND"),
            Token::Or => write!(f, "OR"),
            Token::Not => write!(f, "NOT"),
            Token::In => write!(f, "IN"),
            Token::Order => write!(f, "ORDER"),
            Token::By => write!(f, "BY"),
            Token::Asc => write!(f, "ASC"),
            Token::Desc => write!(f, "DESC"),
            Token::Limit => write!(f, "LIMIT"),
            Token::Offset => write!(f, "OFFSET"),
            Token::Match => write!(f, "MATCH"),
            Token::Within => write!(f, "WITHIN"),
            Token::As => write!(f, "AS"),
            Token::Id => write!(f, "ID"),
            Token::Similarity => write!(f, "SIMILARITY"),
            Token::Vector => write!(f, "VECTOR"),
            Token::Null => write!(f, "NULL"),
            Token::Eq => write!(f, "="),
            Token::NotEq => write!(f, "!="),
            Token::Lt => write!(f, "<"),
            Token::LtEq => write!(f, "<="),
            Token::Gt => write!(f, ">"),
            Token::GtEq => write!(f, ">="),
            Token::Star => write!(f, "*"),
            Token::Comma => write!(f, ","),
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
            Token::LBracket => write!(f, "["),
            Token::RBracket => write!(f, "]"),
            Token::Identifier(s) => write!(f, "{s}"),
            Token::Text(s) => write!(f, "'{s}'"),
            Token::Integer(v) => write!(f, "{v}"),
            Token::Float(v) => write!(f, "{v}"),
            Token::Boolean(v) => write!(f, "{v}"),
            Token::Param(s) => write!(f, ":{s}"),
            Token::Eof => write!(f, "<end of query>"),
        }
    }
}

/// Tokenize query text into `(token, position)` pairs ending with `Eof`.
///
/// Positions are character offsets into the input, reported back in
/// [`VfqError::Parse`] for every downstream parser failure.
pub fn tokenize(input: &str) -> Result<Vec<(Token, usize)>> {
    let mut lexer = Lexer::new(input);
    let mut out = Vec::new();
    loop {
        let (token, position) = lexer.next_token()?;
        let done = token == Token::Eof;
        out.push((token, position));
        if done {
            return Ok(out);
        }
    }
}

struct Lexer {
    input: Vec<char>,
    position: usize,
}

impl Lexer {
    fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            position: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn peek_next(&self) -> Option<char> {
        self.input.get(self.position + 1).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.peek();
        self.position += 1;
        ch
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.peek() {
            if ch.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn read_identifier(&mut self) -> String {
        let mut result = String::new();
        while let Some(ch) = self.peek() {
            if ch.is_alphanumeric() || ch == '_' {
                result.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        result
    }

    fn read_string(&mut self, quote: char, start: usize) -> Result<String> {
        self.advance(); // opening quote
        let mut result = String::new();
        loop {
            match self.advance() {
                Some(ch) if ch == quote => return Ok(result),
                Some('\\') => match self.advance() {
                    Some('n') => result.push('\n'),
                    Some('t') => result.push('\t'),
                    Some('r') => result.push('\r'),
                    Some('\\') => result.push('\\'),
                    Some(c) => result.push(c),
                    None => return Err(unterminated(start)),
                },
                Some(ch) => result.push(ch),
                None => return Err(unterminated(start)),
            }
        }
    }

    fn read_number(&mut self, start: usize) -> Result<Token> {
        let mut text = String::new();
        let mut has_dot = false;

        if self.peek() == Some('-') {
            text.push('-');
            self.advance();
        }
        while let Some(ch) = self.peek() {
            if ch.is_ascii_digit() {
                text.push(ch);
                self.advance();
            } else if ch == '.' && !has_dot {
                has_dot = true;
                text.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        if has_dot {
            let value: f64 = text.parse().map_err(|_| bad_number(&text, start))?;
            Ok(Token::Float(value))
        } else {
            let value: i64 = text.parse().map_err(|_| bad_number(&text, start))?;
            Ok(Token::Integer(value))
        }
    }

    fn next_token(&mut self) -> Result<(Token, usize)> {
        self.skip_whitespace();
        let start = self.position;

        let token = match self.peek() {
            None => Token::Eof,
            Some('*') => {
                self.advance();
                Token::Star
            }
            Some(',') => {
                self.advance();
                Token::Comma
            }
            Some('(') => {
                self.advance();
                Token::LParen
            }
            Some(')') => {
                self.advance();
                Token::RParen
            }
            Some('[') => {
                self.advance();
                Token::LBracket
            }
            Some(']') => {
                self.advance();
                Token::RBracket
            }
            Some('=') => {
                self.advance();
                Token::Eq
            }
            Some('!') => {
                self.advance();
                if self.peek() == Some('=') {
                    self.advance();
                    Token::NotEq
                } else {
                    return Err(invalid_token("!", start));
                }
            }
            Some('<') => {
                self.advance();
                match self.peek() {
                    Some('=') => {
                        self.advance();
                        Token::LtEq
                    }
                    Some('>') => {
                        self.advance();
                        Token::NotEq
                    }
                    _ => Token::Lt,
                }
            }
            Some('>') => {
                self.advance();
                if self.peek() == Some('=') {
                    self.advance();
                    Token::GtEq
                } else {
                    Token::Gt
                }
            }
            Some(':') => {
                self.advance();
                let name = self.read_identifier();
                if name.is_empty() {
                    return Err(invalid_token(":", start));
                }
                Token::Param(name)
            }
            Some('-') => {
                if self.peek_next().is_some_and(|c| c.is_ascii_digit()) {
                    self.read_number(start)?
                } else {
                    return Err(invalid_token("-", start));
                }
            }
            Some(quote @ ('\'' | '"')) => Token::Text(self.read_string(quote, start)?),
            Some(ch) if ch.is_ascii_digit() => self.read_number(start)?,
            Some(ch) if ch.is_alphabetic() || ch == '_' => {
                let word = self.read_identifier();
                keyword(&word).unwrap_or(Token::Identifier(word))
            }
            Some(ch) => return Err(invalid_token(&ch.to_string(), start)),
        };

        Ok((token, start))
    }
}

fn keyword(word: &str) -> Option<Token> {
    match word.to_ascii_uppercase().as_str() {
        "SELECT" => Some(Token::Select),
        "FROM" => Some(Token::From),
        "WHERE" => Some(Token::Where),
        "AND" => Some(Token::And),
        "OR" => Some(Token::Or),
        "NOT" => Some(Token::Not),
        "IN" => Some(Token::In),
        "ORDER" => Some(Token::Order),
        "BY" => Some(Token::By),
        "ASC" => Some(Token::Asc),
        "DESC" => Some(Token::Desc),
        "LIMIT" => Some(Token::Limit),
        "OFFSET" => Some(Token::Offset),
        "MATCH" => Some(Token::Match),
        "WITHIN" => Some(Token::Within),
        "AS" => Some(Token::As),
        "ID" => Some(Token::Id),
        "SIMILARITY" => Some(Token::Similarity),
        "VECTOR" => Some(Token::Vector),
        "NULL" => Some(Token::Null),
        "TRUE" => Some(Token::Boolean(true)),
        "FALSE" => Some(Token::Boolean(false)),
        _ => None,
    }
}

fn invalid_token(found: &str, position: usize) -> VfqError {
    VfqError::Parse {
        message: "invalid token".to_string(),
        token: found.to_string(),
        position,
    }
}

fn unterminated(position: usize) -> VfqError {
    VfqError::Parse {
        message: "unterminated string literal".to_string(),
        token: "'".to_string(),
        position,
    }
}

fn bad_number(text: &str, position: usize) -> VfqError {
    VfqError::Parse {
        message: "malformed numeric literal".to_string(),
        token: text.to_string(),
        position,
    }
}
