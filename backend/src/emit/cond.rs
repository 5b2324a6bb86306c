use ast::node::{CompareOp, LogicOp};
use inkwell::{basic_block::BasicBlock, IntPredicate};

use crate::{
    tagged::{TaggedCond, TaggedCondValue},
    types::LangType,
    CompilerError,
};

use super::{Codegen, GenScope};

trait AsIntComparisonPredicate {
    fn as_int_comparison_predicate(&self, signed: bool) -> IntPredicate;
}

impl AsIntComparisonPredicate for CompareOp {
    fn as_int_comparison_predicate(&self, signed: bool) -> IntPredicate {
        match self {
            Self::Eq => IntPredicate::EQ,
            Self::Ne => IntPredicate::NE,
            Self::Lt if signed => IntPredicate::SLT,
            Self::Lt => IntPredicate::ULT,
            Self::Le if signed => IntPredicate::SLE,
            Self::Le => IntPredicate::ULE,
            Self::Gt if signed => IntPredicate::SGT,
            Self::Gt => IntPredicate::UGT,
            Self::Ge if signed => IntPredicate::SGE,
            Self::Ge => IntPredicate::UGE,
        }
    }
}

impl<'a> Codegen<'a> {
    /// Short-circuit lowering: every condition branches to one of the two
    /// target blocks, the right operand of `and`/`or` is only evaluated when
    /// it can still change the outcome.
    pub fn compile_cond(
        &self,
        scope: &GenScope<'a>,
        cond: &TaggedCond,
        bb_true: BasicBlock<'a>,
        bb_false: BasicBlock<'a>,
    ) -> Result<(), CompilerError> {
        let context = self.module.get_context();

        match &cond.value {
            TaggedCondValue::BoolConst(value) => {
                self.builder
                    .build_unconditional_branch(if *value { bb_true } else { bb_false });
            }
            TaggedCondValue::Compare(op, lhs, rhs) => {
                // `char` compares unsigned, `int` signed
                let signed = matches!(lhs.ty.as_ref(), LangType::Int);
                let lhs = self.compile_expr(scope, lhs)?.into_int_value();
                let rhs = self.compile_expr(scope, rhs)?.into_int_value();

                let flag = self.builder.build_int_compare(
                    op.as_int_comparison_predicate(signed),
                    lhs,
                    rhs,
                    "cmp",
                );
                self.builder.build_conditional_branch(flag, bb_true, bb_false);
            }
            TaggedCondValue::Logic(LogicOp::And, lhs, rhs) => {
                let bb_rhs = context.append_basic_block(scope.func, "and_rhs");
                self.compile_cond(scope, lhs, bb_rhs, bb_false)?;
                self.builder.position_at_end(bb_rhs);
                self.compile_cond(scope, rhs, bb_true, bb_false)?;
            }
            TaggedCondValue::Logic(LogicOp::Or, lhs, rhs) => {
                let bb_rhs = context.append_basic_block(scope.func, "or_rhs");
                self.compile_cond(scope, lhs, bb_true, bb_rhs)?;
                self.builder.position_at_end(bb_rhs);
                self.compile_cond(scope, rhs, bb_true, bb_false)?;
            }
            TaggedCondValue::Not(inner) => {
                self.compile_cond(scope, inner, bb_false, bb_true)?;
            }
        }

        Ok(())
    }
}
