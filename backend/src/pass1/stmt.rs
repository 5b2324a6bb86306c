use std::rc::Rc;

use ast::node::{Cond, CondValue, Stmt, StmtValue};

use crate::{
    tagged::{TaggedCond, TaggedCondValue, TaggedStmt, TaggedStmtValue},
    CompilerError,
};

use super::{
    expr::{pass1_call, pass1_expr, pass1_lvalue},
    Pass1Context,
};

pub(crate) fn pass1_cond(ctx: &mut Pass1Context, cond: &Cond) -> Result<Rc<TaggedCond>, CompilerError> {
    let value = match &cond.value {
        CondValue::BoolConst(value) => TaggedCondValue::BoolConst(*value),
        CondValue::Compare(op, lhs, rhs) => {
            let lhs = pass1_expr(ctx, lhs)?;
            let rhs = pass1_expr(ctx, rhs)?;

            if !lhs.ty.is_scalar() {
                return Err(CompilerError::TypeMismatch {
                    expected: "int or char".to_owned(),
                    found: lhs.ty.to_string(),
                    pos: lhs.pos,
                });
            }
            if rhs.ty != lhs.ty {
                return Err(CompilerError::TypeMismatch {
                    expected: lhs.ty.to_string(),
                    found: rhs.ty.to_string(),
                    pos: rhs.pos,
                });
            }

            TaggedCondValue::Compare(*op, lhs, rhs)
        }
        CondValue::Logic(op, lhs, rhs) => {
            let lhs = pass1_cond(ctx, lhs)?;
            let rhs = pass1_cond(ctx, rhs)?;
            TaggedCondValue::Logic(*op, lhs, rhs)
        }
        CondValue::Not(inner) => TaggedCondValue::Not(pass1_cond(ctx, inner)?),
    };

    Ok(Rc::new(TaggedCond {
        ty: ctx.pass0.bool_type(),
        pos: cond.pos,
        value,
    }))
}

pub(crate) fn pass1_stmt(ctx: &mut Pass1Context, stmt: &Stmt) -> Result<Rc<TaggedStmt>, CompilerError> {
    let value = match &stmt.value {
        StmtValue::Empty => TaggedStmtValue::Empty,
        StmtValue::Assign(lhs, rhs) => {
            let lvalue = pass1_lvalue(ctx, lhs)?;

            // Arrays may not be assigned wholesale
            if !lvalue.ty.is_scalar() {
                return Err(CompilerError::TypeMismatch {
                    expected: "int or char".to_owned(),
                    found: lvalue.ty.to_string(),
                    pos: lvalue.pos,
                });
            }

            let value = pass1_expr(ctx, rhs)?;
            if value.ty != lvalue.ty {
                return Err(CompilerError::TypeMismatch {
                    expected: lvalue.ty.to_string(),
                    found: value.ty.to_string(),
                    pos: value.pos,
                });
            }

            TaggedStmtValue::Assign(lvalue, value)
        }
        StmtValue::ProcCall(call) => {
            let (call, return_type) = pass1_call(ctx, call, stmt.pos)?;

            // A call statement may only invoke a procedure
            if return_type != ctx.pass0.void_type() {
                return Err(CompilerError::TypeMismatch {
                    expected: "nothing".to_owned(),
                    found: return_type.to_string(),
                    pos: stmt.pos,
                });
            }

            TaggedStmtValue::Call(call)
        }
        StmtValue::If {
            cond,
            then_stmt,
            else_stmt,
        } => {
            let cond = pass1_cond(ctx, cond)?;
            let then_stmt = pass1_stmt(ctx, then_stmt)?;
            let else_stmt = match else_stmt {
                Some(else_stmt) => Some(pass1_stmt(ctx, else_stmt)?),
                None => None,
            };

            TaggedStmtValue::If {
                cond,
                then_stmt,
                else_stmt,
            }
        }
        StmtValue::While { cond, body } => {
            let cond = pass1_cond(ctx, cond)?;
            let body = pass1_stmt(ctx, body)?;
            TaggedStmtValue::While { cond, body }
        }
        StmtValue::Return(expr) => {
            let current = ctx.current_function()?;
            let return_type = ctx.functions[current].signature.return_type.clone();

            let value = match expr {
                Some(expr) => {
                    let value = pass1_expr(ctx, expr)?;
                    if return_type == ctx.pass0.void_type() {
                        return Err(CompilerError::BadReturn(
                            "cannot return a value from a `nothing` function".to_owned(),
                            stmt.pos,
                        ));
                    }
                    if value.ty != return_type {
                        return Err(CompilerError::BadReturn(
                            format!("expected {return_type}, found {}", value.ty),
                            stmt.pos,
                        ));
                    }
                    Some(value)
                }
                None => {
                    if return_type != ctx.pass0.void_type() {
                        return Err(CompilerError::BadReturn(
                            format!("missing value in a function returning {return_type}"),
                            stmt.pos,
                        ));
                    }
                    None
                }
            };

            ctx.functions[current].has_return = true;
            TaggedStmtValue::Return(value)
        }
        StmtValue::Block(items) => {
            let items = items
                .iter()
                .map(|item| pass1_stmt(ctx, item))
                .collect::<Result<Vec<_>, _>>()?;
            TaggedStmtValue::Block(items)
        }
    };

    Ok(Rc::new(TaggedStmt {
        pos: stmt.pos,
        value,
    }))
}

/// Structural all-paths-return check: the last statement is a return, or a
/// terminal `if` whose branches both return.
pub(crate) fn stmt_always_returns(stmt: &TaggedStmt) -> bool {
    match &stmt.value {
        TaggedStmtValue::Return(_) => true,
        TaggedStmtValue::Block(items) => items.last().is_some_and(|s| stmt_always_returns(s)),
        TaggedStmtValue::If {
            then_stmt,
            else_stmt: Some(else_stmt),
            ..
        } => stmt_always_returns(then_stmt) && stmt_always_returns(else_stmt),
        _ => false,
    }
}
