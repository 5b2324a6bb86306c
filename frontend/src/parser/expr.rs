use std::rc::Rc;

use ast::{
    node::{ArithOp, CompareOp, Cond, CondValue, Expr, ExprValue, FuncCall, LogicOp, UnaryOp},
    token::{Keyword, Operator, Punctuation, TokenValue},
};

use super::{combinator::parse_delimited, ParserError};

fn compare_op(op: Operator) -> Option<CompareOp> {
    match op {
        Operator::Eq => Some(CompareOp::Eq),
        Operator::Ne => Some(CompareOp::Ne),
        Operator::Lt => Some(CompareOp::Lt),
        Operator::Le => Some(CompareOp::Le),
        Operator::Gt => Some(CompareOp::Gt),
        Operator::Ge => Some(CompareOp::Ge),
        _ => None,
    }
}

def_parser!(pub parse_factor<S>(input: &mut S) -> Rc<Expr> {
    let Some(token) = input.next()? else {
        return Err(ParserError::UnexpectedEof);
    };
    let pos = token.pos;

    let value = match token.value {
        TokenValue::IntLiteral(value) => ExprValue::IntConst(value),
        TokenValue::CharLiteral(value) => ExprValue::CharConst(value),
        TokenValue::StringLiteral(value) => ExprValue::StringConst(value),
        TokenValue::Operator(Operator::Plus) => {
            ExprValue::Unary(UnaryOp::Plus, parse_factor(input)?)
        }
        TokenValue::Operator(Operator::Minus) => {
            ExprValue::Unary(UnaryOp::Minus, parse_factor(input)?)
        }
        TokenValue::Punctuation(Punctuation::LParen) => {
            let inner = parse_expr(input)?;
            expect!(input, TokenValue::Punctuation(Punctuation::RParen), ")");
            return Ok(inner);
        }
        TokenValue::Ident(name) => match input.peek()?.map(|t| t.value) {
            Some(TokenValue::Punctuation(Punctuation::LParen)) => {
                input.next()?;
                let args = parse_delimited(
                    input,
                    parse_expr,
                    TokenValue::Punctuation(Punctuation::RParen),
                    TokenValue::Punctuation(Punctuation::Comma))?;
                ExprValue::Call(FuncCall { name, args })
            }
            Some(TokenValue::Punctuation(Punctuation::LBracket)) => {
                input.next()?;
                let index = parse_expr(input)?;
                expect!(input, TokenValue::Punctuation(Punctuation::RBracket), "]");
                ExprValue::ArrayAccess(name, index)
            }
            _ => ExprValue::Id(name),
        },
        _ => return Err(ParserError::UnexpectedToken(token, "expression".to_owned())),
    };

    Ok(Rc::new(Expr { value, pos }))
});

def_parser!(pub parse_term<S>(input: &mut S) -> Rc<Expr> {
    let mut left = parse_factor(input)?;

    loop {
        let op = match input.peek()?.map(|t| t.value) {
            Some(TokenValue::Operator(Operator::Star)) => ArithOp::Mul,
            Some(TokenValue::Operator(Operator::Slash)) => ArithOp::Div,
            Some(TokenValue::Operator(Operator::Percent)) => ArithOp::Mod,
            _ => break,
        };
        input.next()?;

        let right = parse_factor(input)?;
        let pos = left.pos;
        left = Rc::new(Expr { value: ExprValue::Binary(op, left, right), pos });
    }

    Ok(left)
});

def_parser!(pub parse_expr<S>(input: &mut S) -> Rc<Expr> {
    let mut left = parse_term(input)?;

    loop {
        let op = match input.peek()?.map(|t| t.value) {
            Some(TokenValue::Operator(Operator::Plus)) => ArithOp::Add,
            Some(TokenValue::Operator(Operator::Minus)) => ArithOp::Sub,
            _ => break,
        };
        input.next()?;

        let right = parse_term(input)?;
        let pos = left.pos;
        left = Rc::new(Expr { value: ExprValue::Binary(op, left, right), pos });
    }

    Ok(left)
});

def_parser!(pub parse_comparison<S>(input: &mut S) -> Rc<Cond> {
    let left = parse_expr(input)?;

    let Some(token) = input.next()? else {
        return Err(ParserError::UnexpectedEof);
    };
    let op = match token.value {
        TokenValue::Operator(op) => compare_op(op),
        _ => None,
    };
    let Some(op) = op else {
        return Err(ParserError::UnexpectedToken(
            token,
            "comparison operator".to_owned(),
        ));
    };

    let right = parse_expr(input)?;
    let pos = left.pos;
    Ok(Rc::new(Cond { value: CondValue::Compare(op, left, right), pos }))
});

def_parser!(pub parse_cond_atom<S>(input: &mut S) -> Rc<Cond> {
    let Some(token) = input.peek()? else {
        return Err(ParserError::UnexpectedEof);
    };
    let pos = token.pos;

    match token.value {
        TokenValue::Keyword(Keyword::True) => {
            input.next()?;
            Ok(Rc::new(Cond { value: CondValue::BoolConst(true), pos }))
        }
        TokenValue::Keyword(Keyword::False) => {
            input.next()?;
            Ok(Rc::new(Cond { value: CondValue::BoolConst(false), pos }))
        }
        TokenValue::Punctuation(Punctuation::LParen) => {
            // A `(` here is ambiguous: it may group a condition or start the
            // left operand of a comparison. Try the condition reading first
            // and rewind on failure.
            let mark = input.mark();
            input.next()?;

            if let Ok(cond) = parse_cond(input) {
                if input.peek()?.map(|t| t.value)
                    == Some(TokenValue::Punctuation(Punctuation::RParen))
                {
                    input.next()?;
                    return Ok(cond);
                }
            }

            input.rewind(mark);
            parse_comparison(input)
        }
        _ => parse_comparison(input),
    }
});

def_parser!(pub parse_cond_not<S>(input: &mut S) -> Rc<Cond> {
    let Some(token) = input.peek()? else {
        return Err(ParserError::UnexpectedEof);
    };

    if token.value == TokenValue::Keyword(Keyword::Not) {
        input.next()?;
        let inner = parse_cond_not(input)?;
        return Ok(Rc::new(Cond { value: CondValue::Not(inner), pos: token.pos }));
    }

    parse_cond_atom(input)
});

def_parser!(pub parse_cond_and<S>(input: &mut S) -> Rc<Cond> {
    let mut left = parse_cond_not(input)?;

    while input.peek()?.map(|t| t.value) == Some(TokenValue::Keyword(Keyword::And)) {
        input.next()?;
        let right = parse_cond_not(input)?;
        let pos = left.pos;
        left = Rc::new(Cond { value: CondValue::Logic(LogicOp::And, left, right), pos });
    }

    Ok(left)
});

def_parser!(pub parse_cond<S>(input: &mut S) -> Rc<Cond> {
    let mut left = parse_cond_and(input)?;

    while input.peek()?.map(|t| t.value) == Some(TokenValue::Keyword(Keyword::Or)) {
        input.next()?;
        let right = parse_cond_and(input)?;
        let pos = left.pos;
        left = Rc::new(Cond { value: CondValue::Logic(LogicOp::Or, left, right), pos });
    }

    Ok(left)
});
