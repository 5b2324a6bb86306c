use std::rc::Rc;

use ast::{
    node::{ArithOp, CompareOp, LogicOp, UnaryOp},
    token::SourcePosition,
};

use crate::LangType;

#[derive(Debug, Clone)]
pub enum TaggedExprValue {
    IntConst(i32),
    CharConst(u8),
    StringConst(Vec<u8>),
    /// R-value use of an l-value
    Load(Rc<TaggedLvalue>),
    Unary(UnaryOp, Rc<TaggedExpr>),
    Binary(ArithOp, Rc<TaggedExpr>, Rc<TaggedExpr>),
    Call(TaggedCall),
}

#[derive(Debug, Clone)]
pub struct TaggedExpr {
    pub ty: Rc<LangType>,
    pub pos: SourcePosition,
    pub value: TaggedExprValue,
}

#[derive(Debug, Clone)]
pub enum TaggedLvalueValue {
    Id {
        name: String,
        owner: usize,
    },
    ArrayElement {
        name: String,
        owner: usize,
        index: Rc<TaggedExpr>,
    },
}

/// An l-value resolved to the function that owns its storage. `(owner, name)`
/// is the slot key during code generation.
#[derive(Debug, Clone)]
pub struct TaggedLvalue {
    pub ty: Rc<LangType>,
    pub pos: SourcePosition,
    pub value: TaggedLvalueValue,
}

#[derive(Debug, Clone)]
pub enum TaggedArg {
    Value(Rc<TaggedExpr>),
    Reference(Rc<TaggedLvalue>),
    /// String literal bound to a `ref char[]` parameter
    StringRef(Vec<u8>),
}

#[derive(Debug, Clone)]
pub struct TaggedCall {
    pub callee: usize,
    pub args: Vec<TaggedArg>,
    pub pos: SourcePosition,
}

#[derive(Debug, Clone)]
pub enum TaggedCondValue {
    BoolConst(bool),
    Compare(CompareOp, Rc<TaggedExpr>, Rc<TaggedExpr>),
    Logic(LogicOp, Rc<TaggedCond>, Rc<TaggedCond>),
    Not(Rc<TaggedCond>),
}

/// Conditions always annotate as [`LangType::Bool`].
#[derive(Debug, Clone)]
pub struct TaggedCond {
    pub ty: Rc<LangType>,
    pub pos: SourcePosition,
    pub value: TaggedCondValue,
}

#[derive(Debug, Clone)]
pub enum TaggedStmtValue {
    Empty,
    Assign(Rc<TaggedLvalue>, Rc<TaggedExpr>),
    Call(TaggedCall),
    If {
        cond: Rc<TaggedCond>,
        then_stmt: Rc<TaggedStmt>,
        else_stmt: Option<Rc<TaggedStmt>>,
    },
    While {
        cond: Rc<TaggedCond>,
        body: Rc<TaggedStmt>,
    },
    Return(Option<Rc<TaggedExpr>>),
    Block(Vec<Rc<TaggedStmt>>),
}

#[derive(Debug, Clone)]
pub struct TaggedStmt {
    pub pos: SourcePosition,
    pub value: TaggedStmtValue,
}
