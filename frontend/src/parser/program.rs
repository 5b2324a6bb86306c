use std::rc::Rc;

use ast::{
    node::{
        DataType, Expr, ExprValue, Fpar, FuncCall, FuncDef, LocalDef, PassMode, Stmt, StmtValue,
        VarDef,
    },
    token::{Keyword, Operator, Punctuation, TokenValue},
};

use super::{
    combinator::{parse_delimited, parse_many0},
    expr::{parse_cond, parse_expr},
    ParserError,
};

def_parser!(pub parse_data_type<S>(input: &mut S) -> DataType {
    let Some(token) = input.next()? else {
        return Err(ParserError::UnexpectedEof);
    };

    match token.value {
        TokenValue::Keyword(Keyword::Int) => Ok(DataType::Int),
        TokenValue::Keyword(Keyword::Char) => Ok(DataType::Char),
        _ => Err(ParserError::UnexpectedToken(token, "int or char".to_owned())),
    }
});

def_parser!(pub parse_ret_type<S>(input: &mut S) -> Option<DataType> {
    let Some(token) = input.next()? else {
        return Err(ParserError::UnexpectedEof);
    };

    match token.value {
        TokenValue::Keyword(Keyword::Int) => Ok(Some(DataType::Int)),
        TokenValue::Keyword(Keyword::Char) => Ok(Some(DataType::Char)),
        TokenValue::Keyword(Keyword::Nothing) => Ok(None),
        _ => Err(ParserError::UnexpectedToken(
            token,
            "int, char or nothing".to_owned(),
        )),
    }
});

def_parser!(pub parse_fpar<S>(input: &mut S) -> Fpar {
    let Some(token) = input.peek()? else {
        return Err(ParserError::UnexpectedEof);
    };
    let pos = token.pos;

    let mode = if token.value == TokenValue::Keyword(Keyword::Ref) {
        input.next()?;
        PassMode::ByReference
    } else {
        PassMode::ByValue
    };

    expect!(input, TokenValue::Ident(name), "identifier");
    expect!(input, TokenValue::Punctuation(Punctuation::Colon), ":");
    let ty = parse_data_type(input)?;

    let is_array = if input.peek()?.map(|t| t.value)
        == Some(TokenValue::Punctuation(Punctuation::LBracket))
    {
        input.next()?;
        expect!(input, TokenValue::Punctuation(Punctuation::RBracket), "]");
        true
    } else {
        false
    };

    Ok(Fpar { name, ty, is_array, mode, pos })
});

// Called with the leading `var` consumed
def_parser!(pub parse_var_def<S>(input: &mut S) -> VarDef {
    let pos = input.peek()?.map(|t| t.pos).unwrap_or_default();
    expect!(input, TokenValue::Ident(name), "identifier");
    expect!(input, TokenValue::Punctuation(Punctuation::Colon), ":");
    let ty = parse_data_type(input)?;

    let (is_array, size) = if input.peek()?.map(|t| t.value)
        == Some(TokenValue::Punctuation(Punctuation::LBracket))
    {
        input.next()?;
        expect!(input, TokenValue::IntLiteral(size), "array size");
        expect!(input, TokenValue::Punctuation(Punctuation::RBracket), "]");
        (true, size as usize)
    } else {
        (false, 0)
    };

    expect!(input, TokenValue::Punctuation(Punctuation::Semicolon), ";");

    Ok(VarDef { name, ty, is_array, size, pos })
});

// Assignment or procedure call
def_parser!(pub parse_simple_stmt<S>(input: &mut S) -> Rc<Stmt> {
    let pos = input.peek()?.map(|t| t.pos).unwrap_or_default();
    expect!(input, TokenValue::Ident(name), "identifier");

    let Some(token) = input.next()? else {
        return Err(ParserError::UnexpectedEof);
    };

    let value = match token.value {
        TokenValue::Punctuation(Punctuation::LParen) => {
            let args = parse_delimited(
                input,
                parse_expr,
                TokenValue::Punctuation(Punctuation::RParen),
                TokenValue::Punctuation(Punctuation::Comma))?;
            expect!(input, TokenValue::Punctuation(Punctuation::Semicolon), ";");
            StmtValue::ProcCall(FuncCall { name, args })
        }
        TokenValue::Punctuation(Punctuation::LBracket) => {
            let index = parse_expr(input)?;
            expect!(input, TokenValue::Punctuation(Punctuation::RBracket), "]");
            expect!(input, TokenValue::Operator(Operator::Assign), "<-");
            let rhs = parse_expr(input)?;
            expect!(input, TokenValue::Punctuation(Punctuation::Semicolon), ";");
            let lhs = Rc::new(Expr { value: ExprValue::ArrayAccess(name, index), pos });
            StmtValue::Assign(lhs, rhs)
        }
        TokenValue::Operator(Operator::Assign) => {
            let rhs = parse_expr(input)?;
            expect!(input, TokenValue::Punctuation(Punctuation::Semicolon), ";");
            let lhs = Rc::new(Expr { value: ExprValue::Id(name), pos });
            StmtValue::Assign(lhs, rhs)
        }
        _ => {
            return Err(ParserError::UnexpectedToken(
                token,
                "`<-`, `[` or `(`".to_owned(),
            ))
        }
    };

    Ok(Rc::new(Stmt { value, pos }))
});

def_parser!(pub parse_stmt<S>(input: &mut S) -> Rc<Stmt> {
    let Some(token) = input.peek()? else {
        return Err(ParserError::UnexpectedEof);
    };
    let pos = token.pos;

    match token.value {
        TokenValue::Punctuation(Punctuation::Semicolon) => {
            input.next()?;
            Ok(Rc::new(Stmt { value: StmtValue::Empty, pos }))
        }
        TokenValue::Punctuation(Punctuation::LBrace) => {
            input.next()?;
            let items = parse_many0(
                input,
                parse_stmt,
                TokenValue::Punctuation(Punctuation::RBrace))?;
            Ok(Rc::new(Stmt { value: StmtValue::Block(items), pos }))
        }
        TokenValue::Keyword(Keyword::If) => {
            input.next()?;
            let cond = parse_cond(input)?;
            expect!(input, TokenValue::Keyword(Keyword::Then), "then");
            let then_stmt = parse_stmt(input)?;

            let else_stmt = if input.peek()?.map(|t| t.value)
                == Some(TokenValue::Keyword(Keyword::Else))
            {
                input.next()?;
                Some(parse_stmt(input)?)
            } else {
                None
            };

            Ok(Rc::new(Stmt { value: StmtValue::If { cond, then_stmt, else_stmt }, pos }))
        }
        TokenValue::Keyword(Keyword::While) => {
            input.next()?;
            let cond = parse_cond(input)?;
            expect!(input, TokenValue::Keyword(Keyword::Do), "do");
            let body = parse_stmt(input)?;
            Ok(Rc::new(Stmt { value: StmtValue::While { cond, body }, pos }))
        }
        TokenValue::Keyword(Keyword::Return) => {
            input.next()?;
            let expr = if input.peek()?.map(|t| t.value)
                == Some(TokenValue::Punctuation(Punctuation::Semicolon))
            {
                None
            } else {
                Some(parse_expr(input)?)
            };
            expect!(input, TokenValue::Punctuation(Punctuation::Semicolon), ";");
            Ok(Rc::new(Stmt { value: StmtValue::Return(expr), pos }))
        }
        TokenValue::Ident(_) => parse_simple_stmt(input),
        _ => Err(ParserError::UnexpectedToken(token, "statement".to_owned())),
    }
});

// The function body block: local definitions interleaved with statements
def_parser!(pub parse_func_body<S>(input: &mut S) -> (Vec<LocalDef>, Rc<Stmt>) {
    let pos = input.peek()?.map(|t| t.pos).unwrap_or_default();
    expect!(input, TokenValue::Punctuation(Punctuation::LBrace), "{");

    let mut locals = vec![];
    let mut stmts = vec![];

    loop {
        let Some(token) = input.peek()? else {
            return Err(ParserError::UnexpectedEof);
        };

        match token.value {
            TokenValue::Punctuation(Punctuation::RBrace) => {
                input.next()?;
                break;
            }
            TokenValue::Keyword(Keyword::Var) => {
                input.next()?;
                locals.push(LocalDef::Var(parse_var_def(input)?));
            }
            TokenValue::Keyword(Keyword::Fun) => {
                input.next()?;
                locals.push(LocalDef::Func(parse_func_def(input)?));
            }
            _ => stmts.push(parse_stmt(input)?),
        }
    }

    Ok((locals, Rc::new(Stmt { value: StmtValue::Block(stmts), pos })))
});

// Called with the leading `fun` consumed
def_parser!(pub parse_func_def<S>(input: &mut S) -> Rc<FuncDef> {
    let pos = input.peek()?.map(|t| t.pos).unwrap_or_default();
    expect!(input, TokenValue::Ident(name), "identifier");
    expect!(input, TokenValue::Punctuation(Punctuation::LParen), "(");
    let params = parse_delimited(
        input,
        parse_fpar,
        TokenValue::Punctuation(Punctuation::RParen),
        TokenValue::Punctuation(Punctuation::Comma))?;
    expect!(input, TokenValue::Punctuation(Punctuation::Colon), ":");
    let ret_type = parse_ret_type(input)?;
    let (locals, body) = parse_func_body(input)?;

    Ok(Rc::new(FuncDef { name, ret_type, params, locals, body, pos }))
});

def_parser!(pub parse_program<S>(input: &mut S) -> Rc<FuncDef> {
    expect!(input, TokenValue::Keyword(Keyword::Fun), "fun");
    let func = parse_func_def(input)?;

    if let Some(token) = input.peek()? {
        return Err(ParserError::UnexpectedToken(token, "end of input".to_owned()));
    }

    Ok(func)
});

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use ast::node::{
        ArithOp, CompareOp, CondValue, ExprValue, FuncDef, LocalDef, LogicOp, PassMode, StmtValue,
    };

    use crate::{
        input::{StrInput, TokenStream},
        lexer::Lexer,
    };

    use super::parse_program;

    fn parse(src: &str) -> Rc<FuncDef> {
        let tokens = Lexer::new(StrInput::new(src)).lex_all().expect("lexes");
        parse_program(&mut TokenStream::new(tokens)).expect("parses")
    }

    fn body_stmts(func: &FuncDef) -> Vec<Rc<ast::node::Stmt>> {
        match &func.body.value {
            StmtValue::Block(items) => items.clone(),
            other => panic!("function body is not a block: {other:?}"),
        }
    }

    #[test]
    fn parse_hello() {
        let func = parse(r#"fun main():nothing { writeString("hello\n"); }"#);

        assert_eq!(func.name, "main");
        assert_eq!(func.ret_type, None);
        assert!(func.params.is_empty());

        let stmts = body_stmts(&func);
        assert_eq!(stmts.len(), 1);
        let StmtValue::ProcCall(call) = &stmts[0].value else {
            panic!("expected a call statement: {:?}", stmts[0]);
        };
        assert_eq!(call.name, "writeString");
        assert_eq!(call.args.len(), 1);
    }

    #[test]
    fn parse_params() {
        let func = parse("fun f(a: int, ref b: char, ref s: char[]): int { return a; }");

        assert_eq!(func.params.len(), 3);
        assert_eq!(func.params[0].mode, PassMode::ByValue);
        assert_eq!(func.params[1].mode, PassMode::ByReference);
        assert!(func.params[2].is_array);
    }

    #[test]
    fn parse_locals_interleaved() {
        let func = parse(
            r#"
fun outer():nothing {
    var x:int;
    x <- 0;
    fun inc():nothing { x <- x + 1; }
    inc();
}
"#,
        );

        assert_eq!(func.locals.len(), 2);
        assert!(matches!(func.locals[0], LocalDef::Var(_)));
        assert!(matches!(func.locals[1], LocalDef::Func(_)));
        // Statements keep their order with the defs pulled out
        assert_eq!(body_stmts(&func).len(), 2);
    }

    #[test]
    fn parse_else_binds_inner_if() {
        let func = parse("fun f():nothing { if 1 == 1 then if 2 == 2 then ; else ; }");

        let stmts = body_stmts(&func);
        let StmtValue::If { else_stmt, then_stmt, .. } = &stmts[0].value else {
            panic!("expected if");
        };
        assert!(else_stmt.is_none());
        assert!(matches!(
            then_stmt.value,
            StmtValue::If { else_stmt: Some(_), .. }
        ));
    }

    #[test]
    fn parse_precedence() {
        let func = parse("fun f():nothing { x <- 1 + 2 * 3; }");

        let stmts = body_stmts(&func);
        let StmtValue::Assign(_, rhs) = &stmts[0].value else {
            panic!("expected assignment");
        };
        let ExprValue::Binary(ArithOp::Add, _, right) = &rhs.value else {
            panic!("expected addition at the top: {:?}", rhs.value);
        };
        assert!(matches!(right.value, ExprValue::Binary(ArithOp::Mul, _, _)));
    }

    #[test]
    fn parse_parenthesized_condition() {
        // `(` opening a grouped condition
        let func = parse("fun f():nothing { while (1 < 2 or 3 < 4) and true do ; }");
        let stmts = body_stmts(&func);
        let StmtValue::While { cond, .. } = &stmts[0].value else {
            panic!("expected while");
        };
        let CondValue::Logic(LogicOp::And, left, _) = &cond.value else {
            panic!("expected and: {:?}", cond.value);
        };
        assert!(matches!(left.value, CondValue::Logic(LogicOp::Or, _, _)));

        // `(` opening the left operand of a comparison
        let func = parse("fun f():nothing { while (1 + 2) < 4 do ; }");
        let stmts = body_stmts(&func);
        let StmtValue::While { cond, .. } = &stmts[0].value else {
            panic!("expected while");
        };
        assert!(matches!(cond.value, CondValue::Compare(CompareOp::Lt, _, _)));
    }

    #[test]
    fn reject_trailing_input() {
        let tokens = Lexer::new(StrInput::new("fun f():nothing { } fun g():nothing { }"))
            .lex_all()
            .expect("lexes");
        assert!(parse_program(&mut TokenStream::new(tokens)).is_err());
    }
}
