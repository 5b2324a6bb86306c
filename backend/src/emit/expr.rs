use ast::node::{ArithOp, UnaryOp};
use inkwell::values::{BasicMetadataValueEnum, BasicValueEnum, PointerValue};

use crate::{
    tagged::{TaggedArg, TaggedCall, TaggedExpr, TaggedExprValue, TaggedLvalue, TaggedLvalueValue},
    types::LangType,
    CompilerError,
};

use super::{Codegen, GenScope};

impl<'a> Codegen<'a> {
    pub fn compile_expr(
        &self,
        scope: &GenScope<'a>,
        expr: &TaggedExpr,
    ) -> Result<BasicValueEnum<'a>, CompilerError> {
        let context = self.module.get_context();

        match &expr.value {
            TaggedExprValue::IntConst(value) => {
                Ok(context.i32_type().const_int(*value as u64, true).into())
            }
            TaggedExprValue::CharConst(value) => {
                Ok(context.i8_type().const_int(*value as u64, false).into())
            }
            TaggedExprValue::StringConst(bytes) => Ok(self.string_constant(bytes).into()),
            TaggedExprValue::Load(lvalue) => {
                let ptr = self.lvalue_addr(scope, lvalue)?;
                match lvalue.ty.as_ref() {
                    // Arrays only reach expression position as reference
                    // arguments; their value is the address
                    LangType::Array(..) => Ok(ptr.into()),
                    _ => Ok(self.builder.build_load(ptr, "")),
                }
            }
            TaggedExprValue::Unary(op, inner) => {
                let value = self.compile_expr(scope, inner)?.into_int_value();
                match op {
                    UnaryOp::Plus => Ok(value.into()),
                    UnaryOp::Minus => Ok(self
                        .builder
                        .build_int_sub(context.i32_type().const_zero(), value, "neg")
                        .into()),
                }
            }
            TaggedExprValue::Binary(op, lhs, rhs) => {
                let lhs = self.compile_expr(scope, lhs)?.into_int_value();
                let rhs = self.compile_expr(scope, rhs)?.into_int_value();

                let value = match op {
                    ArithOp::Add => self.builder.build_int_add(lhs, rhs, "add"),
                    ArithOp::Sub => self.builder.build_int_sub(lhs, rhs, "sub"),
                    ArithOp::Mul => self.builder.build_int_mul(lhs, rhs, "mul"),
                    ArithOp::Div => self.builder.build_int_signed_div(lhs, rhs, "div"),
                    ArithOp::Mod => self.builder.build_int_signed_rem(lhs, rhs, "rem"),
                };

                Ok(value.into())
            }
            TaggedExprValue::Call(call) => self.compile_call(scope, call)?.ok_or_else(|| {
                CompilerError::Internal("value call lowered to nothing".to_owned())
            }),
        }
    }

    pub fn lvalue_addr(
        &self,
        scope: &GenScope<'a>,
        lvalue: &TaggedLvalue,
    ) -> Result<PointerValue<'a>, CompilerError> {
        match &lvalue.value {
            TaggedLvalueValue::Id { name, owner } => Ok(scope.slot(*owner, name)?.ptr),
            TaggedLvalueValue::ArrayElement { name, owner, index } => {
                let slot = scope.slot(*owner, name)?;
                let index = self.compile_expr(scope, index)?.into_int_value();

                match slot.ty.as_ref() {
                    LangType::Array(_, Some(_)) => {
                        let zero = self.module.get_context().i32_type().const_zero();
                        Ok(unsafe {
                            self.builder
                                .build_in_bounds_gep(slot.ptr, &[zero, index], "")
                        })
                    }
                    LangType::Array(_elem, None) => Ok(unsafe {
                        self.builder.build_in_bounds_gep(slot.ptr, &[index], "")
                    }),
                    _ => Err(CompilerError::Internal(format!(
                        "indexing non-array slot `{name}`"
                    ))),
                }
            }
        }
    }

    /// Pointer for a `ref` argument; a sized array decays to a pointer to its
    /// first element, no hidden length is passed.
    fn reference_arg(
        &self,
        scope: &GenScope<'a>,
        lvalue: &TaggedLvalue,
    ) -> Result<PointerValue<'a>, CompilerError> {
        match &lvalue.value {
            TaggedLvalueValue::Id { name, owner } => {
                let slot = scope.slot(*owner, name)?;
                match slot.ty.as_ref() {
                    LangType::Array(_, Some(_)) => {
                        let zero = self.module.get_context().i32_type().const_zero();
                        Ok(unsafe {
                            self.builder
                                .build_in_bounds_gep(slot.ptr, &[zero, zero], "")
                        })
                    }
                    _ => Ok(slot.ptr),
                }
            }
            TaggedLvalueValue::ArrayElement { .. } => self.lvalue_addr(scope, lvalue),
        }
    }

    /// Arguments evaluate left to right; capture pointers of the callee are
    /// appended after the declared arguments.
    pub fn compile_call(
        &self,
        scope: &GenScope<'a>,
        call: &TaggedCall,
    ) -> Result<Option<BasicValueEnum<'a>>, CompilerError> {
        let info = &self.pass1.functions[call.callee];
        let func = self.function_value(call.callee)?;

        let mut args: Vec<BasicMetadataValueEnum> = vec![];
        for arg in &call.args {
            match arg {
                TaggedArg::Value(value) => args.push(self.compile_expr(scope, value)?.into()),
                TaggedArg::Reference(lvalue) => {
                    args.push(self.reference_arg(scope, lvalue)?.into())
                }
                TaggedArg::StringRef(bytes) => args.push(self.string_constant(bytes).into()),
            }
        }

        for captured in &info.captured {
            // The caller either owns the variable (its own slot) or forwards
            // its own hidden parameter; both live under (owner, name).
            let slot = scope.slot(captured.owner, &captured.name)?;
            args.push(slot.ptr.into());
        }

        let result = self.builder.build_call(func, &args, "");
        Ok(result.try_as_basic_value().left())
    }
}
