use std::{fmt::Debug, iter::Peekable, str::Chars};

use ast::{token::SourcePosition, Token};

pub trait Input<T> {
    type Error: Debug;

    fn next(&mut self) -> Result<Option<T>, Self::Error>;
    fn peek(&mut self) -> Result<Option<T>, Self::Error>;
}

pub trait InputPosition {
    fn pos(&mut self) -> SourcePosition;
}

/// Checkpoint/restore over an input, for the parser's one speculative point.
pub trait Rewind {
    fn mark(&self) -> usize;
    fn rewind(&mut self, mark: usize);
}

pub struct StrInput<'a> {
    iter: Peekable<Chars<'a>>,
    pos: SourcePosition,
}

impl<'a> StrInput<'a> {
    pub fn new(data: &'a str) -> Self {
        Self {
            iter: data.chars().peekable(),
            pos: SourcePosition { line: 1, column: 1 },
        }
    }
}

impl<'a> Input<char> for StrInput<'a> {
    type Error = ();

    fn next(&mut self) -> Result<Option<char>, Self::Error> {
        let c = self.iter.next();
        if c == Some('\n') {
            self.pos.line += 1;
            self.pos.column = 1;
        } else if c.is_some() {
            self.pos.column += 1;
        }
        Ok(c)
    }

    fn peek(&mut self) -> Result<Option<char>, Self::Error> {
        Ok(self.iter.peek().cloned())
    }
}

impl<'a> InputPosition for StrInput<'a> {
    fn pos(&mut self) -> SourcePosition {
        self.pos
    }
}

/// A fully lexed program, consumed by the parser.
pub struct TokenStream {
    tokens: Vec<Token>,
    index: usize,
}

impl TokenStream {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, index: 0 }
    }
}

impl Input<Token> for TokenStream {
    type Error = ();

    fn next(&mut self) -> Result<Option<Token>, Self::Error> {
        let token = self.tokens.get(self.index).cloned();
        if token.is_some() {
            self.index += 1;
        }
        Ok(token)
    }

    fn peek(&mut self) -> Result<Option<Token>, Self::Error> {
        Ok(self.tokens.get(self.index).cloned())
    }
}

impl Rewind for TokenStream {
    fn mark(&self) -> usize {
        self.index
    }

    fn rewind(&mut self, mark: usize) {
        self.index = mark;
    }
}
