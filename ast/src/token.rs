use std::fmt;

use macros::ToFromEnum;

/// 1-based line/column pair attached to every token and AST node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourcePosition {
    pub line: u32,
    pub column: u32,
}

impl Default for SourcePosition {
    fn default() -> Self {
        Self { line: 1, column: 1 }
    }
}

impl fmt::Display for SourcePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

#[derive(ToFromEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Punctuation {
    #[to_from(';')]
    Semicolon,
    #[to_from(',')]
    Comma,
    #[to_from(':')]
    Colon,
    #[to_from('(')]
    LParen,
    #[to_from(')')]
    RParen,
    #[to_from('[')]
    LBracket,
    #[to_from(']')]
    RBracket,
    #[to_from('{')]
    LBrace,
    #[to_from('}')]
    RBrace,
}

#[derive(ToFromEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    #[to_from("fun")]
    Fun,
    #[to_from("var")]
    Var,
    #[to_from("if")]
    If,
    #[to_from("then")]
    Then,
    #[to_from("else")]
    Else,
    #[to_from("while")]
    While,
    #[to_from("do")]
    Do,
    #[to_from("return")]
    Return,
    #[to_from("and")]
    And,
    #[to_from("or")]
    Or,
    #[to_from("not")]
    Not,
    #[to_from("true")]
    True,
    #[to_from("false")]
    False,
    #[to_from("int")]
    Int,
    #[to_from("char")]
    Char,
    #[to_from("nothing")]
    Nothing,
    #[to_from("ref")]
    Ref,
}

#[derive(ToFromEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    #[to_from("+")]
    Plus,
    #[to_from("-")]
    Minus,
    #[to_from("*")]
    Star,
    #[to_from("/")]
    Slash,
    #[to_from("%")]
    Percent,
    #[to_from("==")]
    Eq,
    #[to_from("!=")]
    Ne,
    #[to_from("<")]
    Lt,
    #[to_from("<=")]
    Le,
    #[to_from(">")]
    Gt,
    #[to_from(">=")]
    Ge,
    #[to_from("<-")]
    Assign,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TokenValue {
    Punctuation(Punctuation),
    Keyword(Keyword),
    Operator(Operator),
    Ident(String),
    IntLiteral(i32),
    CharLiteral(u8),
    StringLiteral(Vec<u8>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub value: TokenValue,
    pub pos: SourcePosition,
}

impl Token {
    pub fn new(value: TokenValue, pos: SourcePosition) -> Self {
        Self { value, pos }
    }
}

impl fmt::Display for TokenValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Punctuation(p) => write!(f, "{}", p.as_char()),
            Self::Keyword(k) => write!(f, "{}", k.as_str()),
            Self::Operator(op) => write!(f, "{}", op.as_str()),
            Self::Ident(name) => write!(f, "{name}"),
            Self::IntLiteral(value) => write!(f, "{value}"),
            Self::CharLiteral(c) => write!(f, "'{}'", (*c as char).escape_default()),
            Self::StringLiteral(s) => write!(f, "\"{}\"", String::from_utf8_lossy(s)),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}
