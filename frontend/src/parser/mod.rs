use ast::{token::SourcePosition, Token};

#[derive(Debug, Clone)]
pub enum ParserError {
    UnexpectedEof,
    UnexpectedToken(Token, String),
}

impl ParserError {
    pub fn position(&self) -> Option<SourcePosition> {
        match self {
            Self::UnexpectedEof => None,
            Self::UnexpectedToken(token, _) => Some(token.pos),
        }
    }
}

impl std::fmt::Display for ParserError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnexpectedEof => write!(f, "unexpected end of input"),
            Self::UnexpectedToken(token, expected) => {
                write!(f, "unexpected token `{token}`, expected {expected}")
            }
        }
    }
}

macro_rules! expect {
    ($input:expr, $pattern:pat, $msg:expr) => {
        let Some(_token) = $crate::input::Input::next($input)? else {
            return Err($crate::parser::ParserError::UnexpectedEof);
        };

        let $pattern = _token.value.clone() else {
            return Err($crate::parser::ParserError::UnexpectedToken(
                _token,
                $msg.to_owned(),
            ));
        };
    };
}

#[macro_export]
macro_rules! def_parser {
    ($vis:vis $func_name:ident<$input_ty:ident $(, $extra_generic:ident $(: $constraint:path)?)*>
        ($($arg:ident: $arg_ty:ty),+) -> $res_ty:ty $body:block) =>
    (
        $vis fn $func_name<$input_ty: $crate::input::Input<$crate::token::Token> + $crate::input::Rewind $(, $extra_generic $(: $constraint)?)*>
            ($($arg: $arg_ty),+) -> Result<$res_ty, $crate::parser::ParserError>
            where $crate::parser::ParserError: From<<$input_ty as $crate::input::Input<$crate::token::Token>>::Error>
            $body
    )
}

impl From<()> for ParserError {
    fn from(_: ()) -> Self {
        Self::UnexpectedEof
    }
}

pub mod combinator;
pub mod expr;
pub mod program;
