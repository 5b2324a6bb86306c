use std::collections::HashMap;
use std::rc::Rc;

use ast::node::PassMode;

use crate::LangType;

#[derive(Debug, Clone)]
pub enum SymbolEntry {
    Variable { ty: Rc<LangType> },
    Parameter { ty: Rc<LangType>, mode: PassMode },
    Function(usize),
}

#[derive(Debug)]
pub struct Scope {
    symbols: HashMap<String, SymbolEntry>,
    /// `Some` marks a function scope and names its owner; the outermost
    /// (builtin) scope is not a function scope.
    function: Option<usize>,
}

#[derive(Debug)]
pub struct Lookup {
    pub entry: SymbolEntry,
    /// Function owning the scope the name was found in.
    pub owner: Option<usize>,
    /// Function-scope boundaries crossed on the way out. Non-zero for a
    /// variable or parameter means the reference is a capture.
    pub crossed: usize,
}

#[derive(Debug, Default)]
pub struct SymbolTable {
    scopes: Vec<Scope>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self { scopes: vec![] }
    }

    pub fn open_scope(&mut self, function: Option<usize>) {
        self.scopes.push(Scope {
            symbols: HashMap::new(),
            function,
        });
    }

    pub fn close_scope(&mut self) {
        self.scopes.pop();
    }

    /// Names within a single scope are unique.
    pub fn insert(&mut self, name: &str, entry: SymbolEntry) -> Result<(), ()> {
        let scope = self.scopes.last_mut().ok_or(())?;
        if scope.symbols.contains_key(name) {
            return Err(());
        }
        scope.symbols.insert(name.to_owned(), entry);
        Ok(())
    }

    pub fn lookup(&self, name: &str) -> Option<Lookup> {
        let mut crossed = 0;

        for scope in self.scopes.iter().rev() {
            if let Some(entry) = scope.symbols.get(name) {
                return Some(Lookup {
                    entry: entry.clone(),
                    owner: scope.function,
                    crossed,
                });
            }
            if scope.function.is_some() {
                crossed += 1;
            }
        }

        None
    }
}
