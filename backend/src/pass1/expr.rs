use std::rc::Rc;

use ast::{
    node::{Expr, ExprValue, FuncCall, PassMode},
    token::SourcePosition,
};

use crate::{
    tagged::{TaggedArg, TaggedCall, TaggedExpr, TaggedExprValue, TaggedLvalue, TaggedLvalueValue},
    CapturedVar, CompilerError, LangType,
};

use super::{Pass1Context, SymbolEntry};

/// Resolve a variable or parameter reference, recording captures for every
/// function scope the resolution crosses.
pub(crate) fn resolve_variable(
    ctx: &mut Pass1Context,
    name: &str,
    pos: SourcePosition,
) -> Result<(Rc<LangType>, usize), CompilerError> {
    let Some(lookup) = ctx.table.lookup(name) else {
        return Err(CompilerError::UndeclaredName(name.to_owned(), pos));
    };

    let ty = match lookup.entry {
        SymbolEntry::Variable { ty } => ty,
        SymbolEntry::Parameter { ty, .. } => ty,
        SymbolEntry::Function(_) => {
            return Err(CompilerError::TypeMismatch {
                expected: "a variable".to_owned(),
                found: format!("function `{name}`"),
                pos,
            })
        }
    };
    let owner = lookup
        .owner
        .ok_or_else(|| CompilerError::Internal(format!("variable `{name}` outside a function")))?;

    if lookup.crossed > 0 {
        // The name belongs to an enclosing frame: every function between the
        // use and the declaration must pass its address through.
        let len = ctx.function_stack.len();
        let intervening = ctx.function_stack[len - lookup.crossed..].to_vec();
        for f in intervening {
            let info = &mut ctx.functions[f];
            if !info
                .captured
                .iter()
                .any(|c| c.owner == owner && c.name == name)
            {
                info.captured.push(CapturedVar {
                    name: name.to_owned(),
                    owner,
                    ty: ty.clone(),
                });
            }
        }
    }

    Ok((ty, owner))
}

pub(crate) fn pass1_lvalue(ctx: &mut Pass1Context, expr: &Expr) -> Result<Rc<TaggedLvalue>, CompilerError> {
    match &expr.value {
        ExprValue::Id(name) => {
            let (ty, owner) = resolve_variable(ctx, name, expr.pos)?;

            Ok(Rc::new(TaggedLvalue {
                ty,
                pos: expr.pos,
                value: TaggedLvalueValue::Id {
                    name: name.clone(),
                    owner,
                },
            }))
        }
        ExprValue::ArrayAccess(name, index) => {
            let (ty, owner) = resolve_variable(ctx, name, expr.pos)?;

            let LangType::Array(elem, _) = ty.as_ref() else {
                return Err(CompilerError::TypeMismatch {
                    expected: "an array".to_owned(),
                    found: ty.to_string(),
                    pos: expr.pos,
                });
            };

            let index = pass1_expr(ctx, index)?;
            if index.ty != ctx.pass0.int_type() {
                return Err(CompilerError::TypeMismatch {
                    expected: "int".to_owned(),
                    found: index.ty.to_string(),
                    pos: index.pos,
                });
            }

            Ok(Rc::new(TaggedLvalue {
                ty: elem.clone(),
                pos: expr.pos,
                value: TaggedLvalueValue::ArrayElement {
                    name: name.clone(),
                    owner,
                    index,
                },
            }))
        }
        _ => Err(CompilerError::NotAnLvalue(expr.pos)),
    }
}

fn pass1_int_operand(ctx: &mut Pass1Context, expr: &Expr) -> Result<Rc<TaggedExpr>, CompilerError> {
    let value = pass1_expr(ctx, expr)?;
    if value.ty != ctx.pass0.int_type() {
        return Err(CompilerError::TypeMismatch {
            expected: "int".to_owned(),
            found: value.ty.to_string(),
            pos: value.pos,
        });
    }
    Ok(value)
}

pub(crate) fn pass1_expr(ctx: &mut Pass1Context, expr: &Expr) -> Result<Rc<TaggedExpr>, CompilerError> {
    match &expr.value {
        ExprValue::IntConst(value) => Ok(Rc::new(TaggedExpr {
            ty: ctx.pass0.int_type(),
            pos: expr.pos,
            value: TaggedExprValue::IntConst(*value),
        })),
        ExprValue::CharConst(value) => Ok(Rc::new(TaggedExpr {
            ty: ctx.pass0.char_type(),
            pos: expr.pos,
            value: TaggedExprValue::CharConst(*value),
        })),
        ExprValue::StringConst(bytes) => Ok(Rc::new(TaggedExpr {
            // The literal's type includes the NUL terminator
            ty: Rc::new(LangType::Array(
                ctx.pass0.char_type(),
                Some(bytes.len() + 1),
            )),
            pos: expr.pos,
            value: TaggedExprValue::StringConst(bytes.clone()),
        })),
        ExprValue::Id(_) | ExprValue::ArrayAccess(..) => {
            let lvalue = pass1_lvalue(ctx, expr)?;

            Ok(Rc::new(TaggedExpr {
                ty: lvalue.ty.clone(),
                pos: expr.pos,
                value: TaggedExprValue::Load(lvalue),
            }))
        }
        ExprValue::Unary(op, inner) => {
            let inner = pass1_int_operand(ctx, inner)?;

            Ok(Rc::new(TaggedExpr {
                ty: ctx.pass0.int_type(),
                pos: expr.pos,
                value: TaggedExprValue::Unary(*op, inner),
            }))
        }
        ExprValue::Binary(op, lhs, rhs) => {
            let lhs = pass1_int_operand(ctx, lhs)?;
            let rhs = pass1_int_operand(ctx, rhs)?;

            Ok(Rc::new(TaggedExpr {
                ty: ctx.pass0.int_type(),
                pos: expr.pos,
                value: TaggedExprValue::Binary(*op, lhs, rhs),
            }))
        }
        ExprValue::Call(call) => {
            let (call, return_type) = pass1_call(ctx, call, expr.pos)?;

            if return_type == ctx.pass0.void_type() {
                return Err(CompilerError::TypeMismatch {
                    expected: "a value".to_owned(),
                    found: "nothing".to_owned(),
                    pos: expr.pos,
                });
            }

            Ok(Rc::new(TaggedExpr {
                ty: return_type,
                pos: expr.pos,
                value: TaggedExprValue::Call(call),
            }))
        }
    }
}

fn reference_compatible(param: &Rc<LangType>, arg: &Rc<LangType>) -> bool {
    match (param.as_ref(), arg.as_ref()) {
        // An unknown-extent parameter accepts any array of the element type
        (LangType::Array(pe, None), LangType::Array(ae, _)) => pe == ae,
        (LangType::Array(pe, Some(n)), LangType::Array(ae, Some(m))) => pe == ae && n == m,
        _ => param == arg,
    }
}

pub(crate) fn pass1_call(
    ctx: &mut Pass1Context,
    call: &FuncCall,
    pos: SourcePosition,
) -> Result<(TaggedCall, Rc<LangType>), CompilerError> {
    let Some(lookup) = ctx.table.lookup(&call.name) else {
        return Err(CompilerError::UndeclaredName(call.name.clone(), pos));
    };
    let SymbolEntry::Function(callee) = lookup.entry else {
        return Err(CompilerError::TypeMismatch {
            expected: "a function".to_owned(),
            found: format!("variable `{}`", call.name),
            pos,
        });
    };

    let caller = ctx.current_function()?;
    if !ctx.functions[caller].calls.contains(&callee) {
        ctx.functions[caller].calls.push(callee);
    }

    let signature = ctx.functions[callee].signature.clone();
    if call.args.len() != signature.params.len() {
        return Err(CompilerError::ArityMismatch {
            name: call.name.clone(),
            expected: signature.params.len(),
            found: call.args.len(),
            pos,
        });
    }

    let mut args = vec![];
    for (arg, param) in call.args.iter().zip(signature.params.iter()) {
        match param.mode {
            PassMode::ByValue => {
                let value = pass1_expr(ctx, arg)?;
                if value.ty != param.ty {
                    return Err(CompilerError::TypeMismatch {
                        expected: param.ty.to_string(),
                        found: value.ty.to_string(),
                        pos: arg.pos,
                    });
                }
                args.push(TaggedArg::Value(value));
            }
            PassMode::ByReference => match &arg.value {
                ExprValue::Id(_) | ExprValue::ArrayAccess(..) => {
                    let lvalue = pass1_lvalue(ctx, arg)?;
                    if !reference_compatible(&param.ty, &lvalue.ty) {
                        return Err(CompilerError::TypeMismatch {
                            expected: LangType::Reference(param.ty.clone()).to_string(),
                            found: lvalue.ty.to_string(),
                            pos: arg.pos,
                        });
                    }
                    args.push(TaggedArg::Reference(lvalue));
                }
                ExprValue::StringConst(bytes) => {
                    let ty = Rc::new(LangType::Array(
                        ctx.pass0.char_type(),
                        Some(bytes.len() + 1),
                    ));
                    if !reference_compatible(&param.ty, &ty) {
                        return Err(CompilerError::TypeMismatch {
                            expected: LangType::Reference(param.ty.clone()).to_string(),
                            found: ty.to_string(),
                            pos: arg.pos,
                        });
                    }
                    args.push(TaggedArg::StringRef(bytes.clone()));
                }
                _ => {
                    return Err(CompilerError::ParameterMode(
                        format!(
                            "argument for `ref` parameter `{}` must be an l-value",
                            param.name
                        ),
                        arg.pos,
                    ))
                }
            },
        }
    }

    Ok((TaggedCall { callee, args, pos }, signature.return_type))
}
