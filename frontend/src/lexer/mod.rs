use ast::{
    token::{Keyword, Operator, Punctuation, SourcePosition, TokenValue},
    Token,
};

use crate::input::{Input, InputPosition};

pub struct Lexer<S: Input<char>> {
    input: S,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LexerError {
    Input(String),
    UnexpectedCharacter(char, SourcePosition),
    UnterminatedLiteral(SourcePosition),
    UnterminatedComment(SourcePosition),
    BadEscape(SourcePosition),
    IntegerOutOfRange(SourcePosition),
}

impl LexerError {
    pub fn position(&self) -> Option<SourcePosition> {
        match self {
            Self::Input(_) => None,
            Self::UnexpectedCharacter(_, pos)
            | Self::UnterminatedLiteral(pos)
            | Self::UnterminatedComment(pos)
            | Self::BadEscape(pos)
            | Self::IntegerOutOfRange(pos) => Some(*pos),
        }
    }
}

impl std::fmt::Display for LexerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Input(detail) => write!(f, "input error: {detail}"),
            Self::UnexpectedCharacter(c, _) => write!(f, "unexpected character `{c}`"),
            Self::UnterminatedLiteral(_) => write!(f, "unterminated character or string literal"),
            Self::UnterminatedComment(_) => write!(f, "unterminated block comment"),
            Self::BadEscape(_) => write!(f, "invalid escape sequence"),
            Self::IntegerOutOfRange(_) => write!(f, "integer literal out of range"),
        }
    }
}

impl<S: Input<char> + InputPosition> Lexer<S>
where
    LexerError: From<S::Error>,
{
    const OPERATOR: &'static [char] = &['+', '-', '*', '/', '%', '=', '!', '<', '>'];

    pub fn new(input: S) -> Self {
        Self { input }
    }

    fn lex_number(&mut self, pos: SourcePosition) -> Result<TokenValue, LexerError> {
        let mut value: i64 = 0;

        loop {
            let Some(c) = self.input.peek()? else {
                break;
            };

            if let Some(digit) = c.to_digit(10) {
                self.input.next()?;
                value = value * 10 + digit as i64;
                if value > i32::MAX as i64 {
                    return Err(LexerError::IntegerOutOfRange(pos));
                }
            } else {
                break;
            }
        }

        Ok(TokenValue::IntLiteral(value as i32))
    }

    fn lex_keyword_or_ident(&mut self) -> Result<TokenValue, LexerError> {
        let mut buf = String::new();

        loop {
            let Some(c) = self.input.peek()? else {
                break;
            };

            if c.is_ascii_alphanumeric() || c == '_' {
                self.input.next()?;
                buf.push(c);
            } else {
                break;
            }
        }

        if let Ok(kw) = Keyword::try_from(buf.as_str()) {
            Ok(TokenValue::Keyword(kw))
        } else {
            Ok(TokenValue::Ident(buf))
        }
    }

    fn lex_operator(&mut self, pos: SourcePosition) -> Result<TokenValue, LexerError> {
        let Some(c) = self.input.next()? else {
            return Err(LexerError::Input("operator expected".to_owned()));
        };
        let mut buf = String::from(c);

        // Maximal munch over the two-character operators
        if let Some(next) = self.input.peek()? {
            if Self::OPERATOR.contains(&next) {
                buf.push(next);
                if Operator::try_from(buf.as_str()).is_ok() {
                    self.input.next()?;
                } else {
                    buf.pop();
                }
            }
        }

        match Operator::try_from(buf.as_str()) {
            Ok(op) => Ok(TokenValue::Operator(op)),
            Err(_) => Err(LexerError::UnexpectedCharacter(c, pos)),
        }
    }

    fn hex_digit(&mut self, pos: SourcePosition) -> Result<u8, LexerError> {
        let Some(c) = self.input.next()? else {
            return Err(LexerError::UnterminatedLiteral(pos));
        };

        c.to_digit(16)
            .map(|d| d as u8)
            .ok_or(LexerError::BadEscape(pos))
    }

    fn lex_escape(&mut self, pos: SourcePosition) -> Result<u8, LexerError> {
        let Some(c) = self.input.next()? else {
            return Err(LexerError::UnterminatedLiteral(pos));
        };

        match c {
            'n' => Ok(b'\n'),
            't' => Ok(b'\t'),
            'r' => Ok(b'\r'),
            '0' => Ok(0),
            '\\' => Ok(b'\\'),
            '\'' => Ok(b'\''),
            '"' => Ok(b'"'),
            'x' => {
                let hi = self.hex_digit(pos)?;
                let lo = self.hex_digit(pos)?;
                Ok(hi * 16 + lo)
            }
            _ => Err(LexerError::BadEscape(pos)),
        }
    }

    fn lex_char_literal(&mut self, pos: SourcePosition) -> Result<TokenValue, LexerError> {
        let Some(c) = self.input.next()? else {
            return Err(LexerError::UnterminatedLiteral(pos));
        };

        let value = match c {
            '\\' => self.lex_escape(pos)?,
            '\'' => return Err(LexerError::UnexpectedCharacter(c, pos)),
            c if c.is_ascii() => c as u8,
            _ => return Err(LexerError::UnexpectedCharacter(c, pos)),
        };

        match self.input.next()? {
            Some('\'') => Ok(TokenValue::CharLiteral(value)),
            _ => Err(LexerError::UnterminatedLiteral(pos)),
        }
    }

    fn lex_string_literal(&mut self, pos: SourcePosition) -> Result<TokenValue, LexerError> {
        let mut bytes = vec![];

        loop {
            let Some(c) = self.input.next()? else {
                return Err(LexerError::UnterminatedLiteral(pos));
            };

            match c {
                '"' => break,
                '\n' => return Err(LexerError::UnterminatedLiteral(pos)),
                '\\' => bytes.push(self.lex_escape(pos)?),
                c if c.is_ascii() => bytes.push(c as u8),
                _ => return Err(LexerError::UnexpectedCharacter(c, pos)),
            }
        }

        Ok(TokenValue::StringLiteral(bytes))
    }

    fn skip_whitespace(&mut self) -> Result<(), LexerError> {
        loop {
            let Some(c) = self.input.peek()? else {
                return Ok(());
            };

            if !c.is_whitespace() {
                return Ok(());
            }

            self.input.next()?;
        }
    }

    // Called with the leading `$` consumed
    fn skip_comment(&mut self, pos: SourcePosition) -> Result<(), LexerError> {
        if self.input.peek()? == Some('$') {
            self.input.next()?;

            // Block comment, closed by `$$`
            loop {
                let Some(c) = self.input.next()? else {
                    return Err(LexerError::UnterminatedComment(pos));
                };

                if c == '$' && self.input.peek()? == Some('$') {
                    self.input.next()?;
                    return Ok(());
                }
            }
        }

        loop {
            let Some(c) = self.input.next()? else {
                return Ok(());
            };

            if c == '\n' {
                return Ok(());
            }
        }
    }

    pub fn lex_token(&mut self) -> Result<Option<Token>, LexerError> {
        loop {
            self.skip_whitespace()?;
            let pos = self.input.pos();

            let Some(c) = self.input.peek()? else {
                return Ok(None);
            };

            if c == '$' {
                self.input.next()?;
                self.skip_comment(pos)?;
                continue;
            }

            let value = if c.is_ascii_digit() {
                self.lex_number(pos)?
            } else if c.is_ascii_alphabetic() {
                self.lex_keyword_or_ident()?
            } else if c == '\'' {
                self.input.next()?;
                self.lex_char_literal(pos)?
            } else if c == '"' {
                self.input.next()?;
                self.lex_string_literal(pos)?
            } else if Self::OPERATOR.contains(&c) {
                self.lex_operator(pos)?
            } else if let Ok(p) = Punctuation::try_from(c) {
                self.input.next()?;
                TokenValue::Punctuation(p)
            } else {
                return Err(LexerError::UnexpectedCharacter(c, pos));
            };

            return Ok(Some(Token::new(value, pos)));
        }
    }

    pub fn lex_all(&mut self) -> Result<Vec<Token>, LexerError> {
        let mut res = vec![];

        while let Some(token) = self.lex_token()? {
            res.push(token);
        }

        Ok(res)
    }
}

impl From<()> for LexerError {
    fn from(_: ()) -> Self {
        Self::Input("".to_string())
    }
}
