//! The scoped symbol table.
//!
//! A [`SymbolTable`] is a tree of scopes, each holding a name → symbol
//! map and a link to its parent. Lookup walks parent links outward and
//! the first match wins, which is what makes shadowing across (but not
//! within) a scope legal. Scopes are owned by the table itself (an
//! arena indexed by [`ScopeId`]) rather than by their parent directly.
//! The parent link is a back-edge for lookup only, never for traversal,
//! so the scope tree has no cyclic structure to worry about.

use slc_util::{FxHashMap, SourceRange, Symbol, Type};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ScopeId(u32);

/// What a declared name denotes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    Variable,
    Function,
    Parameter,
    Struct,
    Field,
}

/// A resolved name: its type, what kind of thing it is, and where it
/// was declared.
#[derive(Clone, Debug)]
pub struct SymbolEntry {
    pub name: Symbol,
    pub ty: Type,
    pub kind: SymbolKind,
    pub range: SourceRange,
}

struct Scope {
    parent: Option<ScopeId>,
    depth: u32,
    symbols: FxHashMap<Symbol, SymbolEntry>,
}

/// The tree of lexical scopes built up as the analyzer walks the AST.
///
/// The root scope (depth 0, [`SymbolTable::root`]) holds globals: the
/// program's top-level function and struct declarations. It is never
/// popped; every other scope is a function body or a nested block.
pub struct SymbolTable {
    scopes: Vec<Scope>,
    current: ScopeId,
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolTable {
    pub fn new() -> Self {
        let root = Scope { parent: None, depth: 0, symbols: FxHashMap::default() };
        Self { scopes: vec![root], current: ScopeId(0) }
    }

    pub fn root(&self) -> ScopeId {
        ScopeId(0)
    }

    pub fn current_scope(&self) -> ScopeId {
        self.current
    }

    /// Pushes a new child scope of the current one and makes it
    /// current.
    pub fn enter_scope(&mut self) -> ScopeId {
        let depth = self.scopes[self.current.0 as usize].depth + 1;
        let id = ScopeId(self.scopes.len() as u32);
        self.scopes.push(Scope { parent: Some(self.current), depth, symbols: FxHashMap::default() });
        self.current = id;
        id
    }

    /// Pops back to the parent of the current scope. A no-op at the
    /// root scope.
    pub fn exit_scope(&mut self) {
        if let Some(parent) = self.scopes[self.current.0 as usize].parent {
            self.current = parent;
        }
    }

    /// Declares `name` in the current scope. Fails (returning the
    /// existing entry) if a symbol of the same name already exists in
    /// this scope. Names are unique per kind within a scope, which in
    /// practice means any redeclaration of the same name in
    /// one scope is rejected regardless of kind, since a shadowing
    /// variable-over-function (etc.) is exactly the ambiguity the rule
    /// exists to prevent.
    pub fn declare(
        &mut self,
        name: Symbol,
        ty: Type,
        kind: SymbolKind,
        range: SourceRange,
    ) -> Result<(), SymbolEntry> {
        let scope = &mut self.scopes[self.current.0 as usize];
        if let Some(existing) = scope.symbols.get(&name) {
            return Err(existing.clone());
        }
        scope.symbols.insert(name.clone(), SymbolEntry { name, ty, kind, range });
        Ok(())
    }

    /// Looks up `name` starting at the current scope and walking
    /// parent links outward; the first match wins, which is what lets
    /// an inner scope shadow an outer one.
    pub fn lookup(&self, name: &Symbol) -> Option<&SymbolEntry> {
        let mut scope = &self.scopes[self.current.0 as usize];
        loop {
            if let Some(entry) = scope.symbols.get(name) {
                return Some(entry);
            }
            match scope.parent {
                Some(parent) => scope = &self.scopes[parent.0 as usize],
                None => return None,
            }
        }
    }

    pub fn depth(&self, scope: ScopeId) -> u32 {
        self.scopes[scope.0 as usize].depth
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slc_util::symbol::Interner;
    use slc_util::{SourcePosition, Type};

    fn range(interner: &Interner) -> SourceRange {
        let file = interner.intern("t.sl");
        let pos = SourcePosition { file, line: 1, column: 1, offset: 0 };
        SourceRange::point(pos)
    }

    #[test]
    fn shadowing_across_scopes_is_allowed() {
        let interner = Interner::new();
        let mut table = SymbolTable::new();
        let x = interner.intern("x");
        table.declare(x.clone(), Type::Int, SymbolKind::Variable, range(&interner)).unwrap();
        table.enter_scope();
        table.declare(x.clone(), Type::Float, SymbolKind::Variable, range(&interner)).unwrap();
        assert_eq!(table.lookup(&x).unwrap().ty, Type::Float);
        table.exit_scope();
        assert_eq!(table.lookup(&x).unwrap().ty, Type::Int);
    }

    #[test]
    fn redeclaration_within_one_scope_fails() {
        let interner = Interner::new();
        let mut table = SymbolTable::new();
        let x = interner.intern("x");
        table.declare(x.clone(), Type::Int, SymbolKind::Variable, range(&interner)).unwrap();
        assert!(table.declare(x, Type::Int, SymbolKind::Variable, range(&interner)).is_err());
    }

    #[test]
    fn lookup_walks_parent_chain() {
        let interner = Interner::new();
        let mut table = SymbolTable::new();
        let g = interner.intern("g");
        table.declare(g.clone(), Type::Bool, SymbolKind::Variable, range(&interner)).unwrap();
        table.enter_scope();
        table.enter_scope();
        assert_eq!(table.lookup(&g).unwrap().ty, Type::Bool);
    }

    #[test]
    fn unknown_name_is_not_found() {
        let interner = Interner::new();
        let table = SymbolTable::new();
        assert!(table.lookup(&interner.intern("nope")).is_none());
    }

    #[test]
    fn exit_scope_at_root_is_a_no_op() {
        let mut table = SymbolTable::new();
        table.exit_scope();
        assert_eq!(table.current_scope(), table.root());
    }
}
