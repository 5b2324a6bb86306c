use std::rc::Rc;

pub mod emit;
pub mod pass0;
pub mod pass1;
pub mod tagged;
pub mod types;

pub use emit::compile_module;
pub use pass0::{pass0_program, Pass0Program};
pub use pass1::{pass1_program, Pass1Program};
pub use types::LangType;

use ast::{
    node::PassMode,
    token::SourcePosition,
};

#[derive(Debug, Clone)]
pub enum CompilerError {
    UndeclaredName(String, SourcePosition),
    Redeclaration(String, SourcePosition),
    TypeMismatch {
        expected: String,
        found: String,
        pos: SourcePosition,
    },
    ArityMismatch {
        name: String,
        expected: usize,
        found: usize,
        pos: SourcePosition,
    },
    ParameterMode(String, SourcePosition),
    BadReturn(String, SourcePosition),
    NotAnLvalue(SourcePosition),
    Internal(String),
}

impl CompilerError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::UndeclaredName(..) => "undeclared name",
            Self::Redeclaration(..) => "redeclaration",
            Self::TypeMismatch { .. } => "type mismatch",
            Self::ArityMismatch { .. } => "arity mismatch",
            Self::ParameterMode(..) => "parameter mode",
            Self::BadReturn(..) => "return",
            Self::NotAnLvalue(..) => "l-value",
            Self::Internal(..) => "internal",
        }
    }

    pub fn position(&self) -> Option<SourcePosition> {
        match self {
            Self::UndeclaredName(_, pos)
            | Self::Redeclaration(_, pos)
            | Self::TypeMismatch { pos, .. }
            | Self::ArityMismatch { pos, .. }
            | Self::ParameterMode(_, pos)
            | Self::BadReturn(_, pos)
            | Self::NotAnLvalue(pos) => Some(*pos),
            Self::Internal(_) => None,
        }
    }
}

impl std::fmt::Display for CompilerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UndeclaredName(name, _) => {
                write!(f, "undeclared name: `{name}` is not in scope")
            }
            Self::Redeclaration(name, _) => {
                write!(f, "redeclaration: `{name}` is already defined in this scope")
            }
            Self::TypeMismatch { expected, found, .. } => {
                write!(f, "type mismatch: expected {expected}, found {found}")
            }
            Self::ArityMismatch { name, expected, found, .. } => {
                write!(
                    f,
                    "arity mismatch: `{name}` takes {expected} argument(s), {found} given"
                )
            }
            Self::ParameterMode(detail, _) => write!(f, "parameter mode: {detail}"),
            Self::BadReturn(detail, _) => write!(f, "return: {detail}"),
            Self::NotAnLvalue(_) => write!(f, "l-value: expression is not assignable"),
            Self::Internal(detail) => write!(f, "internal error: {detail}"),
        }
    }
}

impl std::error::Error for CompilerError {}

#[derive(Debug, Clone)]
pub struct FunctionParam {
    pub name: String,
    /// Declared base type; `mode` carries the reference-ness.
    pub ty: Rc<LangType>,
    pub mode: PassMode,
}

#[derive(Debug, Clone)]
pub struct FunctionSignature {
    pub return_type: Rc<LangType>,
    pub params: Vec<FunctionParam>,
}

/// A variable of an enclosing function referenced from a nested one. The
/// generated function receives a hidden trailing pointer parameter per entry.
#[derive(Debug, Clone)]
pub struct CapturedVar {
    pub name: String,
    /// Index of the function whose scope declares the variable.
    pub owner: usize,
    pub ty: Rc<LangType>,
}

#[derive(Debug, Clone)]
pub struct LocalVar {
    pub name: String,
    pub ty: Rc<LangType>,
    pub pos: SourcePosition,
}

#[derive(Debug)]
pub struct FunctionInfo {
    pub name: String,
    /// Name of the emitted LLVM function, unique within the module.
    pub symbol: String,
    pub index: usize,
    pub parent: Option<usize>,
    pub signature: FunctionSignature,
    pub locals: Vec<LocalVar>,
    pub captured: Vec<CapturedVar>,
    /// Functions referenced by call from this function's body.
    pub calls: Vec<usize>,
    pub has_return: bool,
    pub is_builtin: bool,
    pub body: Option<Rc<tagged::TaggedStmt>>,
    pub pos: SourcePosition,
}
