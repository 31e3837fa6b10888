//! Lowers the language's [`Type`] universe to LLVM IR types:
//!
//! | source   | LLVM         |
//! |----------|--------------|
//! | `int`    | `i32`        |
//! | `float`  | `double`     |
//! | `bool`   | `i1`         |
//! | `string` | `i8*`        |
//! | `void`   | `void`       |
//! | `T[N]`   | `[N x τ]`    |
//! | `struct` | nominal `%Name = type { ... }` |
//!
//! `void` has no [`BasicTypeEnum`] representation: it only ever appears
//! as a function's return type, so it's handled separately by
//! [`TypeMapper::fn_type`] rather than by [`TypeMapper::basic`].
//!
//! Array *values* (parameters, return values, anything passed across a
//! function boundary) are uniformly `ptr`. There is no array-literal
//! expression in the source grammar, so the only way an array value
//! ever arises is by decaying a variable's address, the same
//! pointer-to-first-element convention C uses. The literal `[N x τ]`
//! aggregate in the table above is real only as the *storage type*
//! behind a fixed-size local's own `alloca` ([`TypeMapper::array_aggregate`]);
//! nothing downstream of that ever operates on the aggregate by value.

use std::cell::RefCell;

use inkwell::context::Context;
use inkwell::types::{BasicMetadataTypeEnum, BasicType, BasicTypeEnum, FunctionType, StructType};
use inkwell::AddressSpace;
use slc_util::{FxHashMap, Symbol, Type};

use crate::error::{CodeGenError, Result};

pub struct TypeMapper<'ctx> {
    context: &'ctx Context,
    /// Nominal struct types are declared once (as an opaque type, then
    /// given a body) and reused for every later reference to the same
    /// struct name. LLVM identifies named struct types by identity, not
    /// by structural shape, so redeclaring one under the same name a
    /// second time would produce a distinct (`%Name.0`) type.
    structs: RefCell<FxHashMap<Symbol, StructType<'ctx>>>,
}

impl<'ctx> TypeMapper<'ctx> {
    pub fn new(context: &'ctx Context) -> Self {
        Self { context, structs: RefCell::new(FxHashMap::default()) }
    }

    /// Lowers a type that can appear as a value (everything but `void`).
    pub fn basic(&self, ty: &Type) -> Result<BasicTypeEnum<'ctx>> {
        match ty {
            Type::Int => Ok(self.context.i32_type().into()),
            Type::Float => Ok(self.context.f64_type().into()),
            Type::Bool => Ok(self.context.bool_type().into()),
            Type::String => Ok(self.context.ptr_type(AddressSpace::default()).into()),
            // Decayed: see the module-level note on array representation.
            Type::Array { .. } => Ok(self.context.ptr_type(AddressSpace::default()).into()),
            Type::Struct { name, fields } => Ok(self.struct_type(name, fields)?.into()),
            Type::Void => Err(CodeGenError::TypeMappingError("void has no value representation".into())),
            Type::Function { .. } => Err(CodeGenError::TypeMappingError("function values are not supported".into())),
            Type::Error => Err(CodeGenError::Internal("attempted to lower Type::Error".into())),
        }
    }

    /// The real `[N x τ]` aggregate behind a fixed-size local's storage
    /// (see the module-level note: this is never used as a value type).
    pub fn array_aggregate(&self, element: &Type, size: i64) -> Result<inkwell::types::ArrayType<'ctx>> {
        Ok(self.basic(element)?.array_type(size as u32))
    }

    /// Lowers a declared struct type, memoizing it under its name so
    /// every later reference reuses the same nominal type.
    pub fn struct_type(&self, name: &Symbol, fields: &[(Symbol, Type)]) -> Result<StructType<'ctx>> {
        if let Some(existing) = self.structs.borrow().get(name) {
            return Ok(*existing);
        }
        let opaque = self.context.opaque_struct_type(name.as_str());
        self.structs.borrow_mut().insert(name.clone(), opaque);
        let field_types: Vec<BasicTypeEnum<'ctx>> =
            fields.iter().map(|(_, ty)| self.basic(ty)).collect::<Result<_>>()?;
        opaque.set_body(&field_types, false);
        Ok(opaque)
    }

    /// Builds the LLVM function type for a declaration with the given
    /// parameter and return types. A `void` return uses
    /// [`inkwell::types::VoidType::fn_type`] directly since `void` has
    /// no `BasicTypeEnum`.
    pub fn fn_type(&self, params: &[Type], ret: &Type) -> Result<FunctionType<'ctx>> {
        let param_types: Vec<BasicMetadataTypeEnum<'ctx>> =
            params.iter().map(|ty| self.basic(ty).map(Into::into)).collect::<Result<_>>()?;
        if *ret == Type::Void {
            Ok(self.context.void_type().fn_type(&param_types, false))
        } else {
            Ok(self.basic(ret)?.fn_type(&param_types, false))
        }
    }
}
