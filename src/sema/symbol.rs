// src/sema/symbol.rs
//! Symbols and the scoped symbol table.
//!
//! Symbols live in an arena owned by the table; scopes and the analysis
//! side tables refer to them by [`SymbolId`]. The arena outlives the scope
//! stack, so resolved ids stay valid after analysis finishes.

use crate::errors::CompileError;
use crate::faults::{Fault, FaultConfig};
use crate::frontend::ast::NodeId;
use crate::frontend::pos::SourcePosition;
use crate::sema::types::Type;
use rustc_hash::FxHashMap;

/// Index into the symbol arena, unique within one analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SymbolId(pub u32);

#[derive(Debug)]
pub struct Symbol {
    pub name: String,
    pub ty: Type,
    pub is_global: bool,
    /// Id of the declaring name, `None` for built-ins.
    pub decl: Option<NodeId>,
}

pub struct SymbolTable {
    scopes: Vec<FxHashMap<String, SymbolId>>,
    arena: Vec<Symbol>,
    faults: FaultConfig,
}

impl SymbolTable {
    pub fn new(faults: FaultConfig) -> Self {
        Self {
            scopes: Vec::new(),
            arena: Vec::new(),
            faults,
        }
    }

    pub fn enter_scope(&mut self) {
        self.scopes.push(FxHashMap::default());
    }

    pub fn leave_scope(&mut self) {
        debug_assert!(!self.scopes.is_empty());
        self.scopes.pop();
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    pub fn symbol(&self, id: SymbolId) -> &Symbol {
        &self.arena[id.0 as usize]
    }

    pub fn symbol_mut(&mut self, id: SymbolId) -> &mut Symbol {
        &mut self.arena[id.0 as usize]
    }

    /// Declare `symbol` in the innermost scope.
    pub fn declare(
        &mut self,
        symbol: Symbol,
        position: SourcePosition,
    ) -> Result<SymbolId, CompileError> {
        let Some(scope) = self.scopes.last_mut() else {
            unreachable!("declaration outside any scope");
        };
        if scope.contains_key(&symbol.name) {
            return Err(CompileError::semantically_invalid(
                position,
                format!("name '{}' already declared", symbol.name),
            ));
        }

        let id = SymbolId(self.arena.len() as u32);
        scope.insert(symbol.name.clone(), id);
        self.arena.push(symbol);
        Ok(id)
    }

    /// Resolve `name`, innermost scope first.
    pub fn lookup(
        &self,
        name: &str,
        position: SourcePosition,
    ) -> Result<SymbolId, CompileError> {
        let found = if self.faults.is_enabled(Fault::WrongOrderSymbolTable) {
            self.scopes.iter().find_map(|scope| scope.get(name))
        } else {
            self.scopes.iter().rev().find_map(|scope| scope.get(name))
        };

        found.copied().ok_or_else(|| {
            CompileError::semantically_invalid(position, format!("name '{name}' not declared"))
        })
    }

    /// Tear the table down into its arena.
    pub fn into_arena(self) -> Vec<Symbol> {
        self.arena
    }
}
