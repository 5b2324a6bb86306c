use std::fmt;
use std::rc::Rc;

use ast::node::PassMode;
use inkwell::{
    context::ContextRef,
    types::{BasicMetadataTypeEnum, BasicType, BasicTypeEnum, FunctionType, IntType},
    AddressSpace,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LangType {
    Void,
    Bool,
    Int,
    Char,
    /// One-dimensional array; `None` size is the unknown trailing dimension of
    /// a parameter array.
    Array(Rc<LangType>, Option<usize>),
    Reference(Rc<LangType>),
}

impl LangType {
    pub const fn is_scalar(&self) -> bool {
        matches!(self, Self::Int | Self::Char)
    }

    pub const fn is_array(&self) -> bool {
        matches!(self, Self::Array(..))
    }

    pub fn scalar_llvm<'a>(&self, context: ContextRef<'a>) -> IntType<'a> {
        match self {
            Self::Bool => context.bool_type(),
            Self::Char => context.i8_type(),
            Self::Int => context.i32_type(),
            _ => panic!("not a scalar type: {self}"),
        }
    }

    /// LLVM type of the storage a slot pointer refers to. For unknown-extent
    /// arrays this is the element type, since such pointers are walked with an
    /// element stride.
    pub fn storage_llvm<'a>(&self, context: ContextRef<'a>) -> BasicTypeEnum<'a> {
        match self {
            Self::Array(elem, Some(size)) => elem
                .scalar_llvm(context)
                .array_type(*size as u32)
                .as_basic_type_enum(),
            Self::Array(elem, None) => elem.scalar_llvm(context).as_basic_type_enum(),
            _ => self.scalar_llvm(context).as_basic_type_enum(),
        }
    }

    /// Declared parameter type: by-value scalars are passed directly,
    /// everything by reference is a pointer to its storage.
    pub fn as_llvm_param_type<'a>(
        &self,
        context: ContextRef<'a>,
        mode: PassMode,
    ) -> BasicMetadataTypeEnum<'a> {
        match mode {
            PassMode::ByValue => self.scalar_llvm(context).into(),
            PassMode::ByReference => self
                .storage_llvm(context)
                .ptr_type(AddressSpace::default())
                .into(),
        }
    }

    pub fn as_llvm_function_type<'a>(
        &self,
        context: ContextRef<'a>,
        arg_types: &[BasicMetadataTypeEnum<'a>],
    ) -> FunctionType<'a> {
        match self {
            Self::Void => context.void_type().fn_type(arg_types, false),
            _ => self.scalar_llvm(context).fn_type(arg_types, false),
        }
    }
}

impl fmt::Display for LangType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Void => write!(f, "nothing"),
            Self::Bool => write!(f, "bool"),
            Self::Int => write!(f, "int"),
            Self::Char => write!(f, "char"),
            Self::Array(elem, Some(size)) => write!(f, "{elem}[{size}]"),
            Self::Array(elem, None) => write!(f, "{elem}[]"),
            Self::Reference(inner) => write!(f, "ref {inner}"),
        }
    }
}
