use std::{collections::HashMap, rc::Rc};

pub mod cond;
pub mod expr;

use ast::node::PassMode;
use inkwell::{
    builder::Builder,
    context::Context,
    module::{Linkage, Module},
    passes::PassManager,
    types::{BasicMetadataTypeEnum, BasicType},
    values::{FunctionValue, PointerValue},
    AddressSpace,
};

use crate::{
    tagged::{TaggedStmt, TaggedStmtValue},
    types::LangType,
    CompilerError, FunctionInfo, Pass1Program,
};

pub struct Codegen<'a> {
    module: Module<'a>,
    builder: Builder<'a>,
    pass1: &'a Pass1Program,
}

/// Storage bound to a name inside one generated function. `ty` is the type of
/// the pointed-to storage and decides the access shape: scalars load/store,
/// sized arrays index with `gep [0, i]`, unknown-extent arrays with `gep [i]`.
#[derive(Clone)]
pub struct Slot<'a> {
    pub ptr: PointerValue<'a>,
    pub ty: Rc<LangType>,
}

/// SSA slots of the function currently being generated, keyed by the owning
/// function so a forwarded capture never collides with a shadowing local.
pub struct GenScope<'a> {
    pub func: FunctionValue<'a>,
    slots: HashMap<(usize, String), Slot<'a>>,
}

impl<'a> GenScope<'a> {
    pub fn slot(&self, owner: usize, name: &str) -> Result<Slot<'a>, CompilerError> {
        self.slots
            .get(&(owner, name.to_owned()))
            .cloned()
            .ok_or_else(|| CompilerError::Internal(format!("no slot for `{name}`")))
    }
}

impl<'a> Codegen<'a> {
    pub fn new(pass1: &'a Pass1Program, name: &str, context: &'a Context) -> Self {
        let module = context.create_module(name);
        let builder = context.create_builder();

        Self {
            module,
            builder,
            pass1,
        }
    }

    fn function_value(&self, index: usize) -> Result<FunctionValue<'a>, CompilerError> {
        let info = &self.pass1.functions[index];
        self.module.get_function(&info.symbol).ok_or_else(|| {
            CompilerError::Internal(format!("function `{}` is not declared", info.symbol))
        })
    }

    fn declare_function(&self, info: &FunctionInfo) -> FunctionValue<'a> {
        let mut param_types = info
            .signature
            .params
            .iter()
            .map(|p| p.ty.as_llvm_param_type(self.module.get_context(), p.mode))
            .collect::<Vec<_>>();
        // Hidden trailing parameters, one pointer per captured variable
        for captured in &info.captured {
            param_types.push(BasicMetadataTypeEnum::PointerType(
                captured
                    .ty
                    .storage_llvm(self.module.get_context())
                    .ptr_type(AddressSpace::default()),
            ));
        }

        let fn_type = info
            .signature
            .return_type
            .as_llvm_function_type(self.module.get_context(), &param_types);
        let linkage = if info.is_builtin {
            Linkage::External
        } else {
            Linkage::Internal
        };

        self.module
            .add_function(&info.symbol, fn_type, Some(linkage))
    }

    fn compile_function(
        &self,
        info: &FunctionInfo,
        body: &TaggedStmt,
    ) -> Result<(), CompilerError> {
        let func = self.function_value(info.index)?;

        let entry = self.module.get_context().append_basic_block(func, "entry");
        self.builder.position_at_end(entry);

        let mut scope = GenScope {
            func,
            slots: HashMap::new(),
        };

        // Declared parameters: by-value scalars get a named alloca holding
        // the incoming value, reference parameters use the incoming pointer.
        let param_count = info.signature.params.len();
        for (i, param) in info.signature.params.iter().enumerate() {
            let incoming = func.get_nth_param(i as u32).ok_or_else(|| {
                CompilerError::Internal(format!("missing parameter {i} of `{}`", info.symbol))
            })?;

            let slot = match param.mode {
                PassMode::ByValue => {
                    let ptr = self
                        .builder
                        .build_alloca(param.ty.scalar_llvm(self.module.get_context()), &param.name);
                    self.builder.build_store(ptr, incoming);
                    Slot {
                        ptr,
                        ty: param.ty.clone(),
                    }
                }
                PassMode::ByReference => Slot {
                    ptr: incoming.into_pointer_value(),
                    ty: param.ty.clone(),
                },
            };
            scope.slots.insert((info.index, param.name.clone()), slot);
        }

        // Hidden capture pointers bind under their owner's key
        for (i, captured) in info.captured.iter().enumerate() {
            let incoming = func
                .get_nth_param((param_count + i) as u32)
                .ok_or_else(|| {
                    CompilerError::Internal(format!(
                        "missing capture `{}` of `{}`",
                        captured.name, info.symbol
                    ))
                })?
                .into_pointer_value();
            scope.slots.insert(
                (captured.owner, captured.name.clone()),
                Slot {
                    ptr: incoming,
                    ty: captured.ty.clone(),
                },
            );
        }

        for local in &info.locals {
            let ptr = self
                .builder
                .build_alloca(local.ty.storage_llvm(self.module.get_context()), &local.name);
            scope.slots.insert(
                (info.index, local.name.clone()),
                Slot {
                    ptr,
                    ty: local.ty.clone(),
                },
            );
        }

        let terminated = self.compile_stmt(&scope, body)?;
        if !terminated {
            if info.signature.return_type == self.pass1.pass0.void_type() {
                self.builder.build_return(None);
            } else {
                // Non-void fall-through is rejected by the all-paths-return
                // check; this only closes dead merge chains.
                self.builder.build_unreachable();
            }
        }

        Ok(())
    }

    /// Returns whether the statement terminated the current block; statements
    /// after a terminator in the same block are discarded.
    pub fn compile_stmt(
        &self,
        scope: &GenScope<'a>,
        stmt: &TaggedStmt,
    ) -> Result<bool, CompilerError> {
        match &stmt.value {
            TaggedStmtValue::Empty => Ok(false),
            TaggedStmtValue::Block(items) => {
                for item in items {
                    if self.compile_stmt(scope, item)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            TaggedStmtValue::Assign(lvalue, value) => {
                let ptr = self.lvalue_addr(scope, lvalue)?;
                let value = self.compile_expr(scope, value)?;
                self.builder.build_store(ptr, value);
                Ok(false)
            }
            TaggedStmtValue::Call(call) => {
                self.compile_call(scope, call)?;
                Ok(false)
            }
            TaggedStmtValue::Return(value) => {
                match value {
                    Some(value) => {
                        let value = self.compile_expr(scope, value)?;
                        self.builder.build_return(Some(&value));
                    }
                    None => {
                        self.builder.build_return(None);
                    }
                }
                Ok(true)
            }
            TaggedStmtValue::If {
                cond,
                then_stmt,
                else_stmt,
            } => {
                let bb_true = self
                    .module
                    .get_context()
                    .append_basic_block(scope.func, "if_true");
                let bb_false = else_stmt.as_ref().map(|_| {
                    self.module
                        .get_context()
                        .append_basic_block(scope.func, "if_false")
                });
                let bb_end = self
                    .module
                    .get_context()
                    .append_basic_block(scope.func, "if_end");

                self.compile_cond(scope, cond, bb_true, bb_false.unwrap_or(bb_end))?;

                self.builder.position_at_end(bb_true);
                let then_terminated = self.compile_stmt(scope, then_stmt)?;
                if !then_terminated {
                    self.builder.build_unconditional_branch(bb_end);
                }

                let else_terminated = match (bb_false, else_stmt) {
                    (Some(bb_false), Some(else_stmt)) => {
                        self.builder.position_at_end(bb_false);
                        let terminated = self.compile_stmt(scope, else_stmt)?;
                        if !terminated {
                            self.builder.build_unconditional_branch(bb_end);
                        }
                        terminated
                    }
                    _ => false,
                };

                self.builder.position_at_end(bb_end);
                if then_terminated && else_terminated {
                    self.builder.build_unreachable();
                    Ok(true)
                } else {
                    Ok(false)
                }
            }
            TaggedStmtValue::While { cond, body } => {
                let bb_entry = self
                    .module
                    .get_context()
                    .append_basic_block(scope.func, "loop_entry");
                let bb_body = self
                    .module
                    .get_context()
                    .append_basic_block(scope.func, "loop_body");
                let bb_exit = self
                    .module
                    .get_context()
                    .append_basic_block(scope.func, "loop_exit");

                self.builder.build_unconditional_branch(bb_entry);
                self.builder.position_at_end(bb_entry);
                self.compile_cond(scope, cond, bb_body, bb_exit)?;

                self.builder.position_at_end(bb_body);
                let terminated = self.compile_stmt(scope, body)?;
                if !terminated {
                    self.builder.build_unconditional_branch(bb_entry);
                }

                self.builder.position_at_end(bb_exit);
                Ok(false)
            }
        }
    }

    /// Private NUL-terminated byte array, decayed to its first element.
    pub(super) fn string_constant(&self, bytes: &[u8]) -> PointerValue<'a> {
        let value = self.module.get_context().const_string(bytes, true);

        let gstr = self.module.add_global(value.get_type(), None, "");
        gstr.set_unnamed_addr(true);
        gstr.set_linkage(Linkage::Private);
        gstr.set_alignment(1);
        gstr.set_constant(true);
        gstr.set_initializer(&value);

        let zero = self.module.get_context().i32_type().const_zero();
        unsafe {
            self.builder
                .build_in_bounds_gep(gstr.as_pointer_value(), &[zero, zero], "")
        }
    }

    // The sole externally-visible symbol: calls the top-level function
    fn compile_entry(&self) -> Result<(), CompilerError> {
        let main_type = self.module.get_context().i32_type().fn_type(&[], false);
        let main = self
            .module
            .add_function("main", main_type, Some(Linkage::External));

        let entry = self.module.get_context().append_basic_block(main, "entry");
        self.builder.position_at_end(entry);
        let top = self.function_value(self.pass1.root)?;
        self.builder.build_call(top, &[], "");
        self.builder
            .build_return(Some(&self.module.get_context().i32_type().const_zero()));

        Ok(())
    }

    fn verify_functions(&self) -> Result<(), CompilerError> {
        for func in self.module.get_functions() {
            if func.count_basic_blocks() > 0 && !func.verify(true) {
                return Err(CompilerError::Internal(format!(
                    "LLVM verification failed for `{}`",
                    func.get_name().to_string_lossy()
                )));
            }
        }
        Ok(())
    }

    fn run_function_passes(&self) {
        let fpm: PassManager<FunctionValue> = PassManager::create(&self.module);
        fpm.add_promote_memory_to_register_pass();
        fpm.add_instruction_combining_pass();
        fpm.add_reassociate_pass();
        fpm.add_gvn_pass();
        fpm.add_cfg_simplification_pass();
        fpm.initialize();

        for func in self.module.get_functions() {
            if func.count_basic_blocks() > 0 {
                fpm.run_on(&func);
            }
        }
    }

    pub fn compile_module(&self, optimize: bool) -> Result<(), CompilerError> {
        for info in self.pass1.functions.iter() {
            self.declare_function(info);
        }

        for info in self.pass1.functions.iter() {
            if let Some(body) = info.body.as_ref() {
                self.compile_function(info, body)?;
            }
        }

        self.compile_entry()?;
        self.verify_functions()?;

        if optimize {
            self.run_function_passes();
        }

        Ok(())
    }
}

pub fn compile_module(
    pass1: &Pass1Program,
    name: &str,
    optimize: bool,
) -> Result<String, CompilerError> {
    let context = Context::create();
    let cg = Codegen::new(pass1, name, &context);
    cg.compile_module(optimize)?;

    Ok(cg.module.print_to_string().to_string())
}
