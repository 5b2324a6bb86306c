//! Pass 1: name resolution + type checking + capture analysis
use std::collections::HashSet;

use ast::token::SourcePosition;

pub mod expr;
pub mod program;
pub mod scope;
pub mod stmt;

pub use program::pass1_program;
pub use scope::{Lookup, Scope, SymbolEntry, SymbolTable};

use crate::{CompilerError, FunctionInfo, Pass0Program};

#[derive(Debug)]
pub struct Pass1Program {
    pub functions: Vec<FunctionInfo>,
    /// Index of the top-level user function.
    pub root: usize,
    // Pass 0 info
    pub pass0: Pass0Program,
}

impl Pass1Program {
    pub fn function(&self, name: &str) -> Option<&FunctionInfo> {
        self.functions.iter().find(|f| f.name == name)
    }
}

pub(crate) struct Pass1Context {
    pub functions: Vec<FunctionInfo>,
    pub table: SymbolTable,
    pub pass0: Pass0Program,
    /// Enclosing chain of functions currently being analyzed, innermost last.
    pub function_stack: Vec<usize>,
    symbols: HashSet<String>,
}

impl Pass1Context {
    pub fn new(pass0: Pass0Program) -> Self {
        Self {
            functions: vec![],
            table: SymbolTable::new(),
            pass0,
            function_stack: vec![],
            symbols: HashSet::new(),
        }
    }

    pub fn insert(
        &mut self,
        name: &str,
        entry: SymbolEntry,
        pos: SourcePosition,
    ) -> Result<(), CompilerError> {
        self.table
            .insert(name, entry)
            .map_err(|_| CompilerError::Redeclaration(name.to_owned(), pos))
    }

    pub fn current_function(&self) -> Result<usize, CompilerError> {
        self.function_stack
            .last()
            .copied()
            .ok_or_else(|| CompilerError::Internal("no enclosing function".to_owned()))
    }

    /// Pick the module-level symbol name: the source name when free, a `.N`
    /// suffix otherwise. `main` is reserved for the entry wrapper.
    pub fn mangle(&mut self, name: &str) -> String {
        if name != "main" && self.symbols.insert(name.to_owned()) {
            return name.to_owned();
        }

        let mut i = 0usize;
        loop {
            let candidate = format!("{name}.{i}");
            if self.symbols.insert(candidate.clone()) {
                return candidate;
            }
            i += 1;
        }
    }
}
