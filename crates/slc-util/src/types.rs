//! The type universe: a closed sum of the language's built-in and
//! user-declared types, plus the registry that owns canonical instances
//! of each.
//!
//! This lives in the foundation crate (ahead of the AST, the symbol
//! table, the lexer and the parser) because `slc-par`'s `Expr` nodes
//! carry a `Type` directly: there is no separate typed-AST/HIR split,
//! so the AST crate needs the type vocabulary to exist before it does.

use crate::Symbol;
use std::fmt;

/// A type in the language's closed type universe.
///
/// `Error` is the sentinel assigned to an expression once something has
/// already gone wrong with it, so that later checks don't cascade a
/// second diagnostic out of the same mistake (see `is_assignable`).
#[derive(Clone, Debug, PartialEq)]
pub enum Type {
    Int,
    Float,
    Bool,
    String,
    Void,
    /// `size == -1` means a dynamic (unsized) array.
    Array { element: Box<Type>, size: i64 },
    /// Nominal: two structs are equal iff their names match, regardless
    /// of field contents (a struct is only ever looked up by name, never
    /// structurally, so `fields` is not compared).
    Struct { name: Symbol, fields: Vec<(Symbol, Type)> },
    Function { params: Vec<Type>, ret: Box<Type> },
    Error,
}

impl Type {
    pub fn dynamic_array(element: Type) -> Type {
        Type::Array { element: Box::new(element), size: -1 }
    }

    pub fn fixed_array(element: Type, size: i64) -> Type {
        Type::Array { element: Box::new(element), size }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Type::Int | Type::Float)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Type::Error)
    }

    /// Structural equality: basic types compare by variant,
    /// arrays require equal element type and equal size, structs compare
    /// by name, functions compare parameter-wise then by return type.
    /// `Error` is equal to nothing, not even another `Error`. Every
    /// comparison site that wants to suppress cascades goes through
    /// `is_assignable`, never raw equality, for that reason.
    fn structurally_equal(&self, other: &Type) -> bool {
        match (self, other) {
            (Type::Error, _) | (_, Type::Error) => false,
            (Type::Int, Type::Int)
            | (Type::Float, Type::Float)
            | (Type::Bool, Type::Bool)
            | (Type::String, Type::String)
            | (Type::Void, Type::Void) => true,
            (
                Type::Array { element: e1, size: s1 },
                Type::Array { element: e2, size: s2 },
            ) => s1 == s2 && e1.structurally_equal(e2),
            (Type::Struct { name: n1, .. }, Type::Struct { name: n2, .. }) => n1 == n2,
            (
                Type::Function { params: p1, ret: r1 },
                Type::Function { params: p2, ret: r2 },
            ) => {
                p1.len() == p2.len()
                    && p1.iter().zip(p2).all(|(a, b)| a.structurally_equal(b))
                    && r1.structurally_equal(r2)
            }
            _ => false,
        }
    }

    /// Is a value of type `source` permitted where `target` is required?
    ///
    /// `Error` is assignable to and from anything, which is what lets a
    /// single bad expression avoid triggering a second diagnostic at
    /// every site that later consumes it. Otherwise: equal types are
    /// assignable, a dynamic array accepts a fixed array of the same
    /// element type, and nothing else is (no implicit numeric widening).
    pub fn is_assignable_from(&self, source: &Type) -> bool {
        if self.is_error() || source.is_error() {
            return true;
        }
        if self.structurally_equal(source) {
            return true;
        }
        if let (
            Type::Array { element: target_elem, size: -1 },
            Type::Array { element: source_elem, size: source_size },
        ) = (self, source)
        {
            return *source_size >= 0 && target_elem.structurally_equal(source_elem);
        }
        false
    }

    /// Size in bytes. A nominal slot size for the source language, not a
    /// claim about LLVM's lowering (the emitter lowers `Int` to `i32`).
    pub fn size_bytes(&self) -> i64 {
        match self {
            Type::Int | Type::Float => 8,
            Type::Bool => 1,
            Type::String => 8,
            Type::Void | Type::Error => 0,
            Type::Array { element, size } => {
                if *size < 0 {
                    8
                } else {
                    size * element.size_bytes()
                }
            }
            Type::Struct { fields, .. } => fields.iter().map(|(_, t)| t.size_bytes()).sum(),
            Type::Function { .. } => 8,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Int => write!(f, "int"),
            Type::Float => write!(f, "float"),
            Type::Bool => write!(f, "bool"),
            Type::String => write!(f, "string"),
            Type::Void => write!(f, "void"),
            Type::Array { element, size } if *size < 0 => write!(f, "{element}[]"),
            Type::Array { element, size } => write!(f, "{element}[{size}]"),
            Type::Struct { name, .. } => write!(f, "{name}"),
            Type::Function { params, ret } => {
                write!(f, "func(")?;
                for (i, p) in params.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{p}")?;
                }
                write!(f, ") -> {ret}")
            }
            Type::Error => write!(f, "<error>"),
        }
    }
}

/// Owns canonical instances of the five built-in types and a name → type
/// map for user-declared structs. `register_struct` fails (returning
/// `false`) if the name is already registered, since registering a name
/// that already exists is a semantic error. The caller is expected to
/// turn that into a `Diagnostic` itself, since this type has no access
/// to a `Reporter`.
#[derive(Default)]
pub struct TypeRegistry {
    structs: std::collections::HashMap<Symbol, Type>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn int(&self) -> Type {
        Type::Int
    }
    pub fn float(&self) -> Type {
        Type::Float
    }
    pub fn bool(&self) -> Type {
        Type::Bool
    }
    pub fn string(&self) -> Type {
        Type::String
    }
    pub fn void(&self) -> Type {
        Type::Void
    }

    /// Registers a struct type under `name`. Returns `false` without
    /// mutating the registry if the name is already taken.
    pub fn register_struct(&mut self, name: Symbol, fields: Vec<(Symbol, Type)>) -> bool {
        if self.structs.contains_key(&name) {
            return false;
        }
        self.structs.insert(name.clone(), Type::Struct { name, fields });
        true
    }

    /// Reserves `name` with no fields yet, so that forward references
    /// between struct declarations resolve before any field type is
    /// known. Returns `false` without mutating the registry if the
    /// name is already taken. Pair with [`TypeRegistry::finish_struct`]
    /// once the declaration's field types have been resolved.
    pub fn declare_struct_name(&mut self, name: Symbol) -> bool {
        self.register_struct(name, Vec::new())
    }

    /// Fills in the field list of a struct previously reserved with
    /// [`TypeRegistry::declare_struct_name`]. No-op if `name` was never
    /// reserved.
    pub fn finish_struct(&mut self, name: &Symbol, fields: Vec<(Symbol, Type)>) {
        if let Some(Type::Struct { fields: slot, .. }) = self.structs.get_mut(name) {
            *slot = fields;
        }
    }

    pub fn lookup_struct(&self, name: &Symbol) -> Option<&Type> {
        self.structs.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbol::Interner;

    #[test]
    fn basic_types_equal_by_variant() {
        assert!(Type::Int.is_assignable_from(&Type::Int));
        assert!(!Type::Int.is_assignable_from(&Type::Float));
    }

    #[test]
    fn dynamic_array_accepts_fixed_array_of_same_element() {
        let dynamic = Type::dynamic_array(Type::Int);
        let fixed = Type::fixed_array(Type::Int, 4);
        assert!(dynamic.is_assignable_from(&fixed));
        assert!(!fixed.is_assignable_from(&dynamic));
    }

    #[test]
    fn fixed_arrays_require_matching_size() {
        let a = Type::fixed_array(Type::Int, 4);
        let b = Type::fixed_array(Type::Int, 5);
        assert!(!a.is_assignable_from(&b));
    }

    #[test]
    fn structs_compare_nominally() {
        let interner = Interner::new();
        let a = Type::Struct { name: interner.intern("Point"), fields: vec![] };
        let b = Type::Struct {
            name: interner.intern("Point"),
            fields: vec![(interner.intern("x"), Type::Int)],
        };
        assert!(a.is_assignable_from(&b));
    }

    #[test]
    fn error_is_assignable_both_ways() {
        assert!(Type::Error.is_assignable_from(&Type::Int));
        assert!(Type::Int.is_assignable_from(&Type::Error));
    }

    #[test]
    fn functions_compare_pairwise_and_by_return() {
        let f1 = Type::Function { params: vec![Type::Int], ret: Box::new(Type::Bool) };
        let f2 = Type::Function { params: vec![Type::Int], ret: Box::new(Type::Bool) };
        let f3 = Type::Function { params: vec![Type::Float], ret: Box::new(Type::Bool) };
        assert!(f1.is_assignable_from(&f2));
        assert!(!f1.is_assignable_from(&f3));
    }

    #[test]
    fn registering_duplicate_struct_name_fails() {
        let interner = Interner::new();
        let mut reg = TypeRegistry::new();
        assert!(reg.register_struct(interner.intern("S"), vec![]));
        assert!(!reg.register_struct(interner.intern("S"), vec![]));
    }
}
