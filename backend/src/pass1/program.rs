use std::rc::Rc;

use ast::node::{FuncDef, LocalDef, PassMode};

use crate::{
    CompilerError, FunctionInfo, FunctionParam, FunctionSignature, LangType, LocalVar,
    Pass0Program,
};

use super::{
    stmt::{pass1_stmt, stmt_always_returns},
    Pass1Context, Pass1Program, SymbolEntry,
};

/// Build a function's signature and register it in the current scope. The
/// body is analyzed separately so that sibling definitions are all visible
/// before any body is entered.
fn pass1_register_function(
    ctx: &mut Pass1Context,
    def: &FuncDef,
    parent: Option<usize>,
) -> Result<usize, CompilerError> {
    let return_type = match def.ret_type {
        Some(ty) => ctx.pass0.data_type(ty),
        None => ctx.pass0.void_type(),
    };

    let mut params = vec![];
    for param in &def.params {
        let base = ctx.pass0.data_type(param.ty);
        let ty = if param.is_array {
            Rc::new(LangType::Array(base, None))
        } else {
            base
        };

        if ty.is_array() && param.mode == PassMode::ByValue {
            return Err(CompilerError::ParameterMode(
                format!("array parameter `{}` must be passed by reference", param.name),
                param.pos,
            ));
        }

        params.push(FunctionParam {
            name: param.name.clone(),
            ty,
            mode: param.mode,
        });
    }

    let index = ctx.functions.len();
    let symbol = ctx.mangle(&def.name);
    ctx.functions.push(FunctionInfo {
        name: def.name.clone(),
        symbol,
        index,
        parent,
        signature: FunctionSignature {
            return_type,
            params,
        },
        locals: vec![],
        captured: vec![],
        calls: vec![],
        has_return: false,
        is_builtin: false,
        body: None,
        pos: def.pos,
    });
    ctx.insert(&def.name, SymbolEntry::Function(index), def.pos)?;

    Ok(index)
}

fn pass1_function_body(
    ctx: &mut Pass1Context,
    index: usize,
    def: &FuncDef,
) -> Result<(), CompilerError> {
    ctx.table.open_scope(Some(index));
    ctx.function_stack.push(index);

    for param in ctx.functions[index].signature.params.clone() {
        ctx.insert(
            &param.name,
            SymbolEntry::Parameter {
                ty: param.ty.clone(),
                mode: param.mode,
            },
            def.pos,
        )?;
    }

    // All locals are inserted before any nested body is analyzed, so
    // recursion and forward references between siblings resolve.
    let mut nested = vec![];
    for local in &def.locals {
        match local {
            LocalDef::Var(var) => {
                let base = ctx.pass0.data_type(var.ty);
                let ty = if var.is_array {
                    Rc::new(LangType::Array(base, Some(var.size)))
                } else {
                    base
                };

                ctx.insert(&var.name, SymbolEntry::Variable { ty: ty.clone() }, var.pos)?;
                ctx.functions[index].locals.push(LocalVar {
                    name: var.name.clone(),
                    ty,
                    pos: var.pos,
                });
            }
            LocalDef::Func(func) => {
                let nested_index = pass1_register_function(ctx, func, Some(index))?;
                nested.push((nested_index, func.clone()));
            }
        }
    }

    for (nested_index, func) in &nested {
        pass1_function_body(ctx, *nested_index, func)?;
    }

    let body = pass1_stmt(ctx, &def.body)?;

    let return_type = ctx.functions[index].signature.return_type.clone();
    if return_type != ctx.pass0.void_type() && !stmt_always_returns(&body) {
        return Err(CompilerError::BadReturn(
            format!("function `{}` does not return on every path", def.name),
            def.pos,
        ));
    }

    ctx.functions[index].body = Some(body);

    ctx.function_stack.pop();
    ctx.table.close_scope();
    Ok(())
}

/// Captures needed by a callee must be forwarded by every caller that does
/// not own the variable itself. A single traversal cannot see through forward
/// references between siblings or mutual recursion, so iterate to a fixpoint
/// over the recorded call edges.
fn propagate_captures(functions: &mut [FunctionInfo]) {
    loop {
        let mut changed = false;

        for caller in 0..functions.len() {
            for ci in 0..functions[caller].calls.len() {
                let callee = functions[caller].calls[ci];
                let needed = functions[callee]
                    .captured
                    .iter()
                    .filter(|c| c.owner != caller)
                    .filter(|c| {
                        !functions[caller]
                            .captured
                            .iter()
                            .any(|e| e.owner == c.owner && e.name == c.name)
                    })
                    .cloned()
                    .collect::<Vec<_>>();

                if !needed.is_empty() {
                    functions[caller].captured.extend(needed);
                    changed = true;
                }
            }
        }

        if !changed {
            break;
        }
    }
}

pub fn pass1_program(
    pass0: Pass0Program,
    root: &Rc<FuncDef>,
) -> Result<Pass1Program, CompilerError> {
    let mut ctx = Pass1Context::new(pass0);
    ctx.table.open_scope(None);

    // The builtin runtime occupies the outermost scope
    let builtins = ctx
        .pass0
        .builtins()
        .iter()
        .map(|b| (b.name, b.signature.clone()))
        .collect::<Vec<_>>();
    for (name, signature) in builtins {
        let index = ctx.functions.len();
        let symbol = ctx.mangle(name);
        ctx.functions.push(FunctionInfo {
            name: name.to_owned(),
            symbol,
            index,
            parent: None,
            signature,
            locals: vec![],
            captured: vec![],
            calls: vec![],
            has_return: false,
            is_builtin: true,
            body: None,
            pos: Default::default(),
        });
        ctx.insert(name, SymbolEntry::Function(index), Default::default())?;
    }

    let root_index = pass1_register_function(&mut ctx, root, None)?;
    pass1_function_body(&mut ctx, root_index, root)?;

    if !ctx.functions[root_index].signature.params.is_empty() {
        return Err(CompilerError::ArityMismatch {
            name: root.name.clone(),
            expected: 0,
            found: ctx.functions[root_index].signature.params.len(),
            pos: root.pos,
        });
    }
    if ctx.functions[root_index].signature.return_type != ctx.pass0.void_type() {
        return Err(CompilerError::TypeMismatch {
            expected: "nothing".to_owned(),
            found: ctx.functions[root_index].signature.return_type.to_string(),
            pos: root.pos,
        });
    }

    propagate_captures(&mut ctx.functions);

    ctx.table.close_scope();

    Ok(Pass1Program {
        functions: ctx.functions,
        root: root_index,
        pass0: ctx.pass0,
    })
}
