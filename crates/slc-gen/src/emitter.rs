//! Walks an analyzed [`Program`] and emits LLVM IR text.
//!
//! There is no intermediate representation between the typed AST and
//! LLVM IR: [`Emitter::generate`] does a single post-order pass over
//! each function body, handing every expression to `inkwell`'s
//! `Builder` as it's visited. Each builder call returns a brand-new
//! SSA value, never a name reused across expressions, so every
//! lowering threads its own fresh register back to its caller by
//! construction.
//!
//! Locals live on the stack: every declaration (including parameters)
//! gets its own `alloca` in the function's `entry` block, built through
//! a builder repositioned to entry's start on every call
//! ([`Emitter::build_entry_alloca`]) so a local declared inside a loop
//! or branch doesn't re-`alloca` on every pass through it. Reads go
//! through a `load`. A fixed-size array local is the one exception:
//! its `alloca`'s storage type is the real `[N x T]` aggregate, decayed
//! to an element-0 pointer on every read, matching the pointer
//! representation every other array value uses (see [`crate::types`]).

use std::fmt;

use inkwell::basic_block::BasicBlock;
use inkwell::builder::Builder;
use inkwell::context::Context;
use inkwell::module::{Linkage, Module};
use inkwell::types::ArrayType;
use inkwell::values::{BasicValueEnum, FunctionValue, PointerValue};
use inkwell::{AddressSpace, FloatPredicate, IntPredicate};

use slc_par::ast::*;
use slc_sem::Analysis;
use slc_util::{FxHashMap, Pool, Symbol, Type};

use crate::error::{CodeGenError, Result};
use crate::types::TypeMapper;

/// What a local's `alloca` actually stores: either a value of `ty`
/// directly (the common case: scalars, structs, and every decayed
/// array/string pointer) or the real fixed-size array aggregate behind
/// a local declared `T[N]`.
#[derive(Clone)]
enum Storage<'ctx> {
    Scalar(Type),
    FixedArray(ArrayType<'ctx>, Type),
}

/// Lexical scopes of `alloca`s for the function currently being
/// emitted, mirroring [`slc_sem::SymbolTable`] but mapping names to
/// storage locations instead of types.
#[derive(Default)]
struct Locals<'ctx> {
    scopes: Vec<FxHashMap<Symbol, (PointerValue<'ctx>, Storage<'ctx>)>>,
}

impl<'ctx> Locals<'ctx> {
    fn push(&mut self) {
        self.scopes.push(FxHashMap::default());
    }

    fn pop(&mut self) {
        self.scopes.pop();
    }

    fn declare(&mut self, name: Symbol, ptr: PointerValue<'ctx>, storage: Storage<'ctx>) {
        self.scopes.last_mut().expect("no active scope").insert(name, (ptr, storage));
    }

    fn lookup(&self, name: &Symbol) -> Option<(PointerValue<'ctx>, Storage<'ctx>)> {
        self.scopes.iter().rev().find_map(|scope| scope.get(name).cloned())
    }
}

/// Per-function emission state: which LLVM function we're filling in,
/// its entry block (where every local's `alloca` lands), its locals,
/// and the label counter behind `if.then.0`, `while.cond.3` and so on
/// (reset to zero at the start of every function).
struct FunctionCtx<'ctx> {
    function: FunctionValue<'ctx>,
    entry: BasicBlock<'ctx>,
    locals: Locals<'ctx>,
    label_seq: u32,
}

pub struct Emitter<'ctx> {
    context: &'ctx Context,
    module: Module<'ctx>,
    builder: Builder<'ctx>,
    types: TypeMapper<'ctx>,
    functions: FxHashMap<Symbol, FunctionValue<'ctx>>,
    print_symbol: Symbol,
    /// Global string-literal constants need module-unique names, unlike
    /// basic-block labels (function-local), so `strN` counts across the
    /// whole module rather than resetting per function.
    string_seq: u32,
}

impl<'ctx> Emitter<'ctx> {
    pub fn new(context: &'ctx Context, pool: &Pool, module_name: &str, target_triple: &str) -> Self {
        let _ = inkwell::targets::Target::initialize_all(&inkwell::targets::InitializationConfig::default());
        let module = context.create_module(module_name);
        let triple = inkwell::targets::TargetTriple::create(target_triple);
        module.set_triple(&triple);
        if let Ok(target) = inkwell::targets::Target::from_triple(&triple) {
            if let Some(machine) = target.create_target_machine(
                &triple,
                "generic",
                "",
                inkwell::OptimizationLevel::Default,
                inkwell::targets::RelocMode::Default,
                inkwell::targets::CodeModel::Default,
            ) {
                module.set_data_layout(&machine.get_target_data().get_data_layout());
            }
        }
        Self {
            context,
            module,
            builder: context.create_builder(),
            types: TypeMapper::new(context),
            functions: FxHashMap::default(),
            print_symbol: pool.intern("print"),
            string_seq: 0,
        }
    }

    /// Emits the whole program and returns the module's textual IR.
    pub fn generate(&mut self, program: &Program, analysis: &Analysis) -> Result<String> {
        self.declare_runtime();
        for decl in &program.declarations {
            if let Declaration::Function(f) = decl {
                self.declare_function(f, analysis)?;
            }
        }
        for decl in &program.declarations {
            if let Declaration::Function(f) = decl {
                self.lower_function(f, analysis)?;
            }
        }
        Ok(self.module.print_to_string().to_string())
    }

    // -- module header -----------------------------------------------

    fn declare_runtime(&mut self) {
        let i32_t = self.context.i32_type();
        let i64_t = self.context.i64_type();
        let f64_t = self.context.f64_type();
        let ptr_t = self.context.ptr_type(AddressSpace::default());
        let void_t = self.context.void_type();

        self.module.add_function(
            "sl_print_int",
            void_t.fn_type(&[i32_t.into()], false),
            Some(Linkage::External),
        );
        self.module.add_function(
            "sl_print_double",
            void_t.fn_type(&[f64_t.into()], false),
            Some(Linkage::External),
        );
        self.module.add_function(
            "sl_print_string",
            void_t.fn_type(&[ptr_t.into()], false),
            Some(Linkage::External),
        );
        self.module.add_function(
            "sl_malloc",
            ptr_t.fn_type(&[i64_t.into()], false),
            Some(Linkage::External),
        );
        self.module.add_function(
            "sl_free",
            void_t.fn_type(&[ptr_t.into()], false),
            Some(Linkage::External),
        );
        self.module.add_function(
            "printf",
            i32_t.fn_type(&[ptr_t.into()], true),
            Some(Linkage::External),
        );
    }

    /// Adds a function's signature to the module ahead of emitting any
    /// body, so a later function can call an earlier one and a function
    /// can call itself. The analyzer's declaration pre-pass already
    /// guarantees every callee resolves, so the type here always comes
    /// from a fully-resolved `Type::Function`.
    fn declare_function(&mut self, f: &FunctionDecl, analysis: &Analysis) -> Result<()> {
        let (params, ret) = self.signature_of(f, analysis)?;
        let fn_ty = self.types.fn_type(&params, &ret)?;
        let fv = self.module.add_function(f.name.as_str(), fn_ty, None);
        self.functions.insert(f.name.clone(), fv);
        Ok(())
    }

    fn signature_of(&self, f: &FunctionDecl, analysis: &Analysis) -> Result<(Vec<Type>, Type)> {
        match analysis.symbols.lookup(&f.name) {
            Some(entry) => match &entry.ty {
                Type::Function { params, ret } => Ok((params.clone(), (**ret).clone())),
                other => Err(CodeGenError::Internal(format!(
                    "'{}' resolved to non-function type '{other}'",
                    f.name
                ))),
            },
            None => Err(CodeGenError::Internal(format!("function '{}' not found in symbol table", f.name))),
        }
    }

    // -- functions ------------------------------------------------------

    fn lower_function(&mut self, f: &FunctionDecl, analysis: &Analysis) -> Result<()> {
        let (params, ret) = self.signature_of(f, analysis)?;
        let function = *self
            .functions
            .get(&f.name)
            .ok_or_else(|| CodeGenError::FunctionNotFound(f.name.to_string()))?;

        let entry = self.context.append_basic_block(function, "entry");
        self.builder.position_at_end(entry);

        let mut fctx = FunctionCtx { function, entry, locals: Locals::default(), label_seq: 0 };
        fctx.locals.push();

        for (i, (param, param_ty)) in f.params.iter().zip(params.iter()).enumerate() {
            let llvm_ty = self.types.basic(param_ty)?;
            let ptr = self.build_entry_alloca(&fctx, llvm_ty, &format!("{}.addr", param.name))?;
            let argv = function
                .get_nth_param(i as u32)
                .ok_or_else(|| CodeGenError::Internal(format!("missing parameter {i} for '{}'", f.name)))?;
            self.builder.build_store(ptr, argv).map_err(Self::llvm_err)?;
            fctx.locals.declare(param.name.clone(), ptr, Storage::Scalar(param_ty.clone()));
        }

        self.lower_block(&mut fctx, &f.body, analysis)?;

        let current = self.builder.get_insert_block().expect("builder always has a block while emitting");
        if current.get_terminator().is_none() {
            if ret == Type::Void {
                self.builder.build_return(None).map_err(Self::llvm_err)?;
            } else if f.name.as_str() == "main" {
                let zero = self.context.i32_type().const_int(0, false);
                self.builder.build_return(Some(&zero)).map_err(Self::llvm_err)?;
            } else {
                return Err(CodeGenError::MissingTerminator(f.name.to_string()));
            }
        }

        fctx.locals.pop();
        Ok(())
    }

    // -- statements ----------------------------------------------------

    fn lower_block(&mut self, fctx: &mut FunctionCtx<'ctx>, block: &Block, analysis: &Analysis) -> Result<()> {
        fctx.locals.push();
        for stmt in &block.statements {
            if self.block_terminated() {
                break;
            }
            self.lower_stmt(fctx, stmt, analysis)?;
        }
        fctx.locals.pop();
        Ok(())
    }

    fn block_terminated(&self) -> bool {
        self.builder.get_insert_block().map(|b| b.get_terminator().is_some()).unwrap_or(true)
    }

    fn lower_stmt(&mut self, fctx: &mut FunctionCtx<'ctx>, stmt: &Stmt, analysis: &Analysis) -> Result<()> {
        match stmt {
            Stmt::ExprStmt(e) => {
                self.lower_expr(fctx, e, analysis)?;
                Ok(())
            }
            Stmt::VarDecl(v) => self.lower_var_decl(fctx, v, analysis),
            Stmt::Assign(a) => self.lower_assign(fctx, a, analysis),
            Stmt::If(s) => self.lower_if(fctx, s, analysis),
            Stmt::While(s) => self.lower_while(fctx, s, analysis),
            Stmt::For(s) => self.lower_for(fctx, s, analysis),
            Stmt::Return(r) => self.lower_return(fctx, r, analysis),
            Stmt::Block(b) => self.lower_block(fctx, b, analysis),
        }
    }

    fn lower_var_decl(&mut self, fctx: &mut FunctionCtx<'ctx>, v: &VarDeclStmt, analysis: &Analysis) -> Result<()> {
        let declared = slc_sem::resolve_type_expr(&analysis.types, &v.ty)
            .ok_or_else(|| CodeGenError::Internal(format!("unresolved type for '{}'", v.name)))?;

        match &declared {
            Type::Array { size, element } if *size >= 0 => {
                // A fixed-size local owns the real `[N x T]` aggregate
                // directly; see the module-level note and `types.rs`.
                // No defined semantics for copying array contents
                // through an initializer, so one is rejected.
                if v.init.is_some() {
                    return Err(CodeGenError::Internal(format!(
                        "fixed-size array local '{}' may not have an initializer",
                        v.name
                    )));
                }
                let array_ty = self.types.array_aggregate(element, *size)?;
                let ptr = self.build_entry_alloca(fctx, array_ty, v.name.as_str())?;
                fctx.locals.declare(v.name.clone(), ptr, Storage::FixedArray(array_ty, (**element).clone()));
            }
            other => {
                let llvm_ty = self.types.basic(other)?;
                let ptr = self.build_entry_alloca(fctx, llvm_ty, v.name.as_str())?;
                if let Some(init) = &v.init {
                    let val = self
                        .lower_expr(fctx, init, analysis)?
                        .ok_or_else(|| CodeGenError::Internal("initializer produced no value".into()))?;
                    self.builder.build_store(ptr, val).map_err(Self::llvm_err)?;
                }
                fctx.locals.declare(v.name.clone(), ptr, Storage::Scalar(other.clone()));
            }
        }
        Ok(())
    }

    fn lower_assign(&mut self, fctx: &mut FunctionCtx<'ctx>, a: &AssignStmt, analysis: &Analysis) -> Result<()> {
        if matches!(&a.target.ty, Type::Array { size, .. } if *size >= 0) {
            // The analyzer rejects whole-array assignment into a
            // fixed-size target; reaching here means it didn't.
            return Err(CodeGenError::Internal(
                "fixed-size array assignment should have been rejected during analysis".into(),
            ));
        }
        let ptr = self.lvalue_ptr(fctx, &a.target, analysis)?;
        let val = self
            .lower_expr(fctx, &a.value, analysis)?
            .ok_or_else(|| CodeGenError::Internal("assignment value produced no value".into()))?;
        self.builder.build_store(ptr, val).map_err(Self::llvm_err)?;
        Ok(())
    }

    fn lower_return(&mut self, fctx: &mut FunctionCtx<'ctx>, r: &ReturnStmt, analysis: &Analysis) -> Result<()> {
        match &r.value {
            Some(e) => {
                let val = self
                    .lower_expr(fctx, e, analysis)?
                    .ok_or_else(|| CodeGenError::Internal("return value produced no value".into()))?;
                self.builder.build_return(Some(&val)).map_err(Self::llvm_err)?;
            }
            None => {
                self.builder.build_return(None).map_err(Self::llvm_err)?;
            }
        }
        Ok(())
    }

    // -- control flow ----------------------------------------------------

    fn next_label(&self, fctx: &mut FunctionCtx<'ctx>, base: &str) -> BasicBlock<'ctx> {
        let n = fctx.label_seq;
        fctx.label_seq += 1;
        self.context.append_basic_block(fctx.function, &format!("{base}.{n}"))
    }

    fn lower_if(&mut self, fctx: &mut FunctionCtx<'ctx>, s: &IfStmt, analysis: &Analysis) -> Result<()> {
        let cond = self
            .lower_expr(fctx, &s.cond, analysis)?
            .ok_or_else(|| CodeGenError::Internal("if condition produced no value".into()))?
            .into_int_value();

        let then_bb = self.next_label(fctx, "if.then");
        let else_bb = s.else_branch.as_ref().map(|_| self.next_label(fctx, "if.else"));
        let end_bb = self.next_label(fctx, "if.end");

        self.builder
            .build_conditional_branch(cond, then_bb, else_bb.unwrap_or(end_bb))
            .map_err(Self::llvm_err)?;

        self.builder.position_at_end(then_bb);
        self.lower_stmt(fctx, &s.then_branch, analysis)?;
        if !self.block_terminated() {
            self.builder.build_unconditional_branch(end_bb).map_err(Self::llvm_err)?;
        }

        if let (Some(else_branch), Some(else_bb)) = (&s.else_branch, else_bb) {
            self.builder.position_at_end(else_bb);
            self.lower_stmt(fctx, else_branch, analysis)?;
            if !self.block_terminated() {
                self.builder.build_unconditional_branch(end_bb).map_err(Self::llvm_err)?;
            }
        }

        self.builder.position_at_end(end_bb);
        Ok(())
    }

    fn lower_while(&mut self, fctx: &mut FunctionCtx<'ctx>, s: &WhileStmt, analysis: &Analysis) -> Result<()> {
        let cond_bb = self.next_label(fctx, "while.cond");
        let body_bb = self.next_label(fctx, "while.body");
        let end_bb = self.next_label(fctx, "while.end");

        self.builder.build_unconditional_branch(cond_bb).map_err(Self::llvm_err)?;

        self.builder.position_at_end(cond_bb);
        let cond = self
            .lower_expr(fctx, &s.cond, analysis)?
            .ok_or_else(|| CodeGenError::Internal("while condition produced no value".into()))?
            .into_int_value();
        self.builder.build_conditional_branch(cond, body_bb, end_bb).map_err(Self::llvm_err)?;

        self.builder.position_at_end(body_bb);
        self.lower_stmt(fctx, &s.body, analysis)?;
        if !self.block_terminated() {
            self.builder.build_unconditional_branch(cond_bb).map_err(Self::llvm_err)?;
        }

        self.builder.position_at_end(end_bb);
        Ok(())
    }

    fn lower_for(&mut self, fctx: &mut FunctionCtx<'ctx>, s: &ForStmt, analysis: &Analysis) -> Result<()> {
        fctx.locals.push();
        if let Some(init) = &s.init {
            self.lower_stmt(fctx, init, analysis)?;
        }

        let cond_bb = s.cond.as_ref().map(|_| self.next_label(fctx, "for.cond"));
        let body_bb = self.next_label(fctx, "for.body");
        let inc_bb = self.next_label(fctx, "for.inc");
        let end_bb = self.next_label(fctx, "for.end");

        match cond_bb {
            Some(cond_bb) => {
                self.builder.build_unconditional_branch(cond_bb).map_err(Self::llvm_err)?;
                self.builder.position_at_end(cond_bb);
                let cond = self
                    .lower_expr(fctx, s.cond.as_ref().unwrap(), analysis)?
                    .ok_or_else(|| CodeGenError::Internal("for condition produced no value".into()))?
                    .into_int_value();
                self.builder.build_conditional_branch(cond, body_bb, end_bb).map_err(Self::llvm_err)?;
            }
            None => {
                // No-condition form: branch straight to the body.
                self.builder.build_unconditional_branch(body_bb).map_err(Self::llvm_err)?;
            }
        }

        self.builder.position_at_end(body_bb);
        self.lower_stmt(fctx, &s.body, analysis)?;
        if !self.block_terminated() {
            self.builder.build_unconditional_branch(inc_bb).map_err(Self::llvm_err)?;
        }

        self.builder.position_at_end(inc_bb);
        if let Some(update) = &s.update {
            self.lower_stmt(fctx, update, analysis)?;
        }
        if !self.block_terminated() {
            self.builder.build_unconditional_branch(cond_bb.unwrap_or(body_bb)).map_err(Self::llvm_err)?;
        }

        self.builder.position_at_end(end_bb);
        fctx.locals.pop();
        Ok(())
    }

    // -- expressions -----------------------------------------------------

    fn lower_expr(
        &mut self,
        fctx: &mut FunctionCtx<'ctx>,
        expr: &Expr,
        analysis: &Analysis,
    ) -> Result<Option<BasicValueEnum<'ctx>>> {
        match &expr.kind {
            ExprKind::Literal(lit) => Ok(Some(self.lower_literal(lit)?)),
            ExprKind::Identifier(name) => self.lower_identifier(fctx, name),
            ExprKind::Binary { left, op, right } => self.lower_binary(fctx, left, *op, right, analysis),
            ExprKind::Unary { op, operand } => self.lower_unary(fctx, *op, operand, analysis),
            ExprKind::Call { callee, args } => self.lower_call(fctx, callee, args, analysis),
            ExprKind::Index { .. } | ExprKind::Member { .. } => {
                let ptr = self.lvalue_ptr(fctx, expr, analysis)?;
                let llvm_ty = self.types.basic(&expr.ty)?;
                let loaded = self.builder.build_load(llvm_ty, ptr, "load").map_err(Self::llvm_err)?;
                Ok(Some(loaded))
            }
        }
    }

    fn lower_literal(&mut self, lit: &Literal) -> Result<BasicValueEnum<'ctx>> {
        Ok(match lit {
            Literal::Int(v) => self.context.i32_type().const_int(*v as u64, true).into(),
            Literal::Float(v) => self.context.f64_type().const_float(*v).into(),
            Literal::Bool(b) => self.context.bool_type().const_int(*b as u64, false).into(),
            Literal::Str(s) => self.lower_string_literal(s.as_str())?.into(),
        })
    }

    fn lower_string_literal(&mut self, text: &str) -> Result<PointerValue<'ctx>> {
        let name = format!("str{}", self.string_seq);
        self.string_seq += 1;

        let constant = self.context.const_string(text.as_bytes(), true);
        let global = self.module.add_global(constant.get_type(), Some(AddressSpace::default()), &name);
        global.set_initializer(&constant);
        global.set_linkage(Linkage::Private);
        global.set_unnamed_addr(true);
        global.set_constant(true);

        let zero = self.context.i32_type().const_int(0, false);
        let ptr = unsafe {
            self.builder
                .build_in_bounds_gep(constant.get_type(), global.as_pointer_value(), &[zero, zero], "str.ptr")
                .map_err(Self::llvm_err)?
        };
        Ok(ptr)
    }

    fn lower_identifier(
        &mut self,
        fctx: &mut FunctionCtx<'ctx>,
        name: &Symbol,
    ) -> Result<Option<BasicValueEnum<'ctx>>> {
        let (ptr, storage) = fctx
            .locals
            .lookup(name)
            .ok_or_else(|| CodeGenError::Internal(format!("unbound local '{name}'")))?;
        match storage {
            Storage::FixedArray(array_ty, _) => {
                let zero = self.context.i32_type().const_int(0, false);
                let decayed = unsafe {
                    self.builder.build_in_bounds_gep(array_ty, ptr, &[zero, zero], "decay").map_err(Self::llvm_err)?
                };
                Ok(Some(decayed.into()))
            }
            Storage::Scalar(ty) => {
                let llvm_ty = self.types.basic(&ty)?;
                let loaded = self.builder.build_load(llvm_ty, ptr, name.as_str()).map_err(Self::llvm_err)?;
                Ok(Some(loaded))
            }
        }
    }

    fn lower_binary(
        &mut self,
        fctx: &mut FunctionCtx<'ctx>,
        left: &Expr,
        op: BinOp,
        right: &Expr,
        analysis: &Analysis,
    ) -> Result<Option<BasicValueEnum<'ctx>>> {
        let lv = self
            .lower_expr(fctx, left, analysis)?
            .ok_or_else(|| CodeGenError::Internal("binary operand produced no value".into()))?;
        let rv = self
            .lower_expr(fctx, right, analysis)?
            .ok_or_else(|| CodeGenError::Internal("binary operand produced no value".into()))?;

        if op.is_logical() {
            let l = lv.into_int_value();
            let r = rv.into_int_value();
            let result = match op {
                BinOp::And => self.builder.build_and(l, r, "and.tmp"),
                BinOp::Or => self.builder.build_or(l, r, "or.tmp"),
                _ => unreachable!("is_logical() only matches And/Or"),
            }
            .map_err(Self::llvm_err)?;
            return Ok(Some(result.into()));
        }

        if op.is_arithmetic() {
            let result = if left.ty == Type::Float {
                let l = lv.into_float_value();
                let r = rv.into_float_value();
                match op {
                    BinOp::Add => self.builder.build_float_add(l, r, "fadd.tmp"),
                    BinOp::Sub => self.builder.build_float_sub(l, r, "fsub.tmp"),
                    BinOp::Mul => self.builder.build_float_mul(l, r, "fmul.tmp"),
                    BinOp::Div => self.builder.build_float_div(l, r, "fdiv.tmp"),
                    // Mod is a real arithmetic operator in the grammar,
                    // typed through the same arithmetic rule as the rest.
                    // frem is the natural extension.
                    BinOp::Mod => self.builder.build_float_rem(l, r, "frem.tmp"),
                    _ => unreachable!("is_arithmetic() only matches Add/Sub/Mul/Div/Mod"),
                }
                .map_err(Self::llvm_err)?
                .into()
            } else {
                let l = lv.into_int_value();
                let r = rv.into_int_value();
                match op {
                    BinOp::Add => self.builder.build_int_add(l, r, "add.tmp"),
                    BinOp::Sub => self.builder.build_int_sub(l, r, "sub.tmp"),
                    BinOp::Mul => self.builder.build_int_mul(l, r, "mul.tmp"),
                    BinOp::Div => self.builder.build_int_signed_div(l, r, "sdiv.tmp"),
                    BinOp::Mod => self.builder.build_int_signed_rem(l, r, "srem.tmp"),
                    _ => unreachable!("is_arithmetic() only matches Add/Sub/Mul/Div/Mod"),
                }
                .map_err(Self::llvm_err)?
                .into()
            };
            return Ok(Some(result));
        }

        // Equality and relational. Float compares with `fcmp`; String
        // compares its pointer value (by address, not content: the type
        // rules permit ordering strings but the language has no
        // lexicographic comparison to lower to) via `ptrtoint` then
        // `icmp`; everything else (Int, Bool) compares directly with
        // `icmp`.
        let result = if left.ty == Type::Float {
            let l = lv.into_float_value();
            let r = rv.into_float_value();
            let pred = float_predicate(op);
            self.builder.build_float_compare(pred, l, r, "fcmp.tmp").map_err(Self::llvm_err)?.into()
        } else if left.ty == Type::String {
            let i64_t = self.context.i64_type();
            let l = self.builder.build_ptr_to_int(lv.into_pointer_value(), i64_t, "str.addr").map_err(Self::llvm_err)?;
            let r = self.builder.build_ptr_to_int(rv.into_pointer_value(), i64_t, "str.addr").map_err(Self::llvm_err)?;
            let pred = int_predicate(op);
            self.builder.build_int_compare(pred, l, r, "icmp.tmp").map_err(Self::llvm_err)?.into()
        } else {
            let l = lv.into_int_value();
            let r = rv.into_int_value();
            let pred = int_predicate(op);
            self.builder.build_int_compare(pred, l, r, "icmp.tmp").map_err(Self::llvm_err)?.into()
        };
        Ok(Some(result))
    }

    fn lower_unary(
        &mut self,
        fctx: &mut FunctionCtx<'ctx>,
        op: UnOp,
        operand: &Expr,
        analysis: &Analysis,
    ) -> Result<Option<BasicValueEnum<'ctx>>> {
        let v = self
            .lower_expr(fctx, operand, analysis)?
            .ok_or_else(|| CodeGenError::Internal("unary operand produced no value".into()))?;
        let result = match op {
            UnOp::Neg if operand.ty == Type::Float => {
                let f = v.into_float_value();
                let zero = self.context.f64_type().const_float(0.0);
                self.builder.build_float_sub(zero, f, "fneg.tmp").map_err(Self::llvm_err)?.into()
            }
            UnOp::Neg => {
                let i = v.into_int_value();
                let zero = self.context.i32_type().const_int(0, false);
                self.builder.build_int_sub(zero, i, "neg.tmp").map_err(Self::llvm_err)?.into()
            }
            UnOp::Not => {
                let b = v.into_int_value();
                let false_v = self.context.bool_type().const_int(0, false);
                self.builder.build_int_compare(IntPredicate::EQ, b, false_v, "not.tmp").map_err(Self::llvm_err)?.into()
            }
        };
        Ok(Some(result))
    }

    fn lower_call(
        &mut self,
        fctx: &mut FunctionCtx<'ctx>,
        callee: &Expr,
        args: &[Expr],
        analysis: &Analysis,
    ) -> Result<Option<BasicValueEnum<'ctx>>> {
        if let ExprKind::Identifier(name) = &callee.kind {
            if *name == self.print_symbol && !self.functions.contains_key(name) {
                return self.lower_print(fctx, &args[0], analysis).map(|()| None);
            }
        }

        let name = match &callee.kind {
            ExprKind::Identifier(name) => name.clone(),
            _ => return Err(CodeGenError::Internal("call target is not a simple identifier".into())),
        };
        let function = *self
            .functions
            .get(&name)
            .ok_or_else(|| CodeGenError::FunctionNotFound(name.to_string()))?;

        let mut argv = Vec::with_capacity(args.len());
        for arg in args {
            let v = self
                .lower_expr(fctx, arg, analysis)?
                .ok_or_else(|| CodeGenError::Internal("call argument produced no value".into()))?;
            argv.push(v.into());
        }

        let call = self.builder.build_call(function, &argv, "call.tmp").map_err(Self::llvm_err)?;
        Ok(call.try_as_basic_value().left())
    }

    fn lower_print(&mut self, fctx: &mut FunctionCtx<'ctx>, arg: &Expr, analysis: &Analysis) -> Result<()> {
        let val = self
            .lower_expr(fctx, arg, analysis)?
            .ok_or_else(|| CodeGenError::Internal("print argument produced no value".into()))?;
        let target = match arg.ty {
            Type::Int => "sl_print_int",
            Type::Float => "sl_print_double",
            Type::String => "sl_print_string",
            // The analyzer rejects every other argument type, so
            // reaching this arm means the two phases have drifted.
            ref other => {
                return Err(CodeGenError::Internal(format!(
                    "print does not support '{other}': the analyzer should have rejected this"
                )))
            }
        };
        let function = self
            .module
            .get_function(target)
            .ok_or_else(|| CodeGenError::FunctionNotFound(target.to_string()))?;
        self.builder.build_call(function, &[val.into()], "").map_err(Self::llvm_err)?;
        Ok(())
    }

    // -- addresses --------------------------------------------------------

    /// Computes the storage address of an lvalue expression. Covers
    /// the three lvalue shapes: identifiers always
    /// have a backing `alloca`; indexing and member access recurse into
    /// their object, materializing a temporary `alloca` if the object
    /// isn't itself addressable (e.g. a struct-returning call used as
    /// `f().field`).
    fn lvalue_ptr(&mut self, fctx: &mut FunctionCtx<'ctx>, expr: &Expr, analysis: &Analysis) -> Result<PointerValue<'ctx>> {
        match &expr.kind {
            ExprKind::Identifier(name) => {
                let (ptr, _) =
                    fctx.locals.lookup(name).ok_or_else(|| CodeGenError::Internal(format!("unbound local '{name}'")))?;
                Ok(ptr)
            }
            ExprKind::Index { object, index } => {
                let elem_llvm = self.types.basic(&expr.ty)?;
                let idx = self
                    .lower_expr(fctx, index, analysis)?
                    .ok_or_else(|| CodeGenError::Internal("array index produced no value".into()))?
                    .into_int_value();
                let base = self.array_element0_ptr(fctx, object, analysis)?;
                let gep = unsafe {
                    self.builder.build_in_bounds_gep(elem_llvm, base, &[idx], "elem.addr").map_err(Self::llvm_err)?
                };
                Ok(gep)
            }
            ExprKind::Member { object, field } => {
                let (struct_name, fields) = match &object.ty {
                    Type::Struct { name, fields } => (name.clone(), fields.clone()),
                    other => return Err(CodeGenError::Internal(format!("member access on non-struct type '{other}'"))),
                };
                let field_index = fields
                    .iter()
                    .position(|(n, _)| n == field)
                    .ok_or_else(|| CodeGenError::StructNotFound(format!("{struct_name}.{field}")))?;
                let struct_ty = self.types.struct_type(&struct_name, &fields)?;
                let obj_ptr = self.addressable_value_ptr(fctx, object, analysis)?;
                let gep = self
                    .builder
                    .build_struct_gep(struct_ty, obj_ptr, field_index as u32, "field.addr")
                    .map_err(Self::llvm_err)?;
                Ok(gep)
            }
            _ => Err(CodeGenError::Internal("expression is not an lvalue".into())),
        }
    }

    /// The element-0 address of an array expression: either the decay
    /// of a fixed-size local's own aggregate, or (for anything else: a
    /// parameter, a nested index/member, a call result) the pointer
    /// value the expression already evaluates to, since every other
    /// array representation in this emitter is already a pointer.
    fn array_element0_ptr(&mut self, fctx: &mut FunctionCtx<'ctx>, object: &Expr, analysis: &Analysis) -> Result<PointerValue<'ctx>> {
        if let ExprKind::Identifier(name) = &object.kind {
            if let Some((ptr, Storage::FixedArray(array_ty, _))) = fctx.locals.lookup(name) {
                let zero = self.context.i32_type().const_int(0, false);
                let gep = unsafe {
                    self.builder.build_in_bounds_gep(array_ty, ptr, &[zero, zero], "base").map_err(Self::llvm_err)?
                };
                return Ok(gep);
            }
        }
        let val = self
            .lower_expr(fctx, object, analysis)?
            .ok_or_else(|| CodeGenError::Internal("array expression produced no value".into()))?;
        Ok(val.into_pointer_value())
    }

    /// The address of an arbitrary expression, materializing a
    /// temporary `alloca` for it when it isn't already addressable
    /// (e.g. the object of `f().field`: `f()` has no storage of its
    /// own until we give it one).
    fn addressable_value_ptr(&mut self, fctx: &mut FunctionCtx<'ctx>, expr: &Expr, analysis: &Analysis) -> Result<PointerValue<'ctx>> {
        if is_addressable(expr) {
            return self.lvalue_ptr(fctx, expr, analysis);
        }
        let llvm_ty = self.types.basic(&expr.ty)?;
        let val = self
            .lower_expr(fctx, expr, analysis)?
            .ok_or_else(|| CodeGenError::Internal("expression produced no value".into()))?;
        let tmp = self.builder.build_alloca(llvm_ty, "tmp.addr").map_err(Self::llvm_err)?;
        self.builder.build_store(tmp, val).map_err(Self::llvm_err)?;
        Ok(tmp)
    }

    /// Builds an `alloca` at the start of `fctx`'s entry block rather
    /// than at the main builder's current position, so a local declared
    /// inside a loop or branch body gets one allocation for the whole
    /// function instead of a fresh one on every pass through it.
    fn build_entry_alloca<T: inkwell::types::BasicType<'ctx>>(
        &self,
        fctx: &FunctionCtx<'ctx>,
        ty: T,
        name: &str,
    ) -> Result<PointerValue<'ctx>> {
        let entry_builder = self.context.create_builder();
        match fctx.entry.get_first_instruction() {
            Some(first) => entry_builder.position_before(&first),
            None => entry_builder.position_at_end(fctx.entry),
        }
        entry_builder.build_alloca(ty, name).map_err(Self::llvm_err)
    }

    fn llvm_err(e: impl fmt::Display) -> CodeGenError {
        CodeGenError::LlvmOperationFailed(e.to_string())
    }
}

fn is_addressable(expr: &Expr) -> bool {
    matches!(&expr.kind, ExprKind::Identifier(_) | ExprKind::Index { .. } | ExprKind::Member { .. })
}

fn int_predicate(op: BinOp) -> IntPredicate {
    match op {
        BinOp::Eq => IntPredicate::EQ,
        BinOp::Ne => IntPredicate::NE,
        BinOp::Lt => IntPredicate::SLT,
        BinOp::Le => IntPredicate::SLE,
        BinOp::Gt => IntPredicate::SGT,
        BinOp::Ge => IntPredicate::SGE,
        _ => unreachable!("only called for equality/relational ops"),
    }
}

fn float_predicate(op: BinOp) -> FloatPredicate {
    match op {
        BinOp::Eq => FloatPredicate::OEQ,
        BinOp::Ne => FloatPredicate::ONE,
        BinOp::Lt => FloatPredicate::OLT,
        BinOp::Le => FloatPredicate::OLE,
        BinOp::Gt => FloatPredicate::OGT,
        BinOp::Ge => FloatPredicate::OGE,
        _ => unreachable!("only called for equality/relational ops"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use inkwell::context::Context;
    use slc_lex::Lexer;
    use slc_par::Parser;
    use slc_util::Reporter;

    fn generate(source: &str) -> String {
        let pool = Pool::new();
        let mut reporter = Reporter::new();
        let lexer = Lexer::new(&pool, "t.sl", source);
        let parser = Parser::new(lexer, &mut reporter);
        let mut program = parser.parse(&mut reporter);
        assert!(!reporter.has_errors(), "parse errors: {:?}", reporter.errors());
        let analysis = slc_sem::analyze(&mut program, &pool, &mut reporter);
        assert!(!reporter.has_errors(), "semantic errors: {:?}", reporter.errors());

        let context = Context::create();
        let mut emitter = Emitter::new(&context, &pool, "t", "x86_64-unknown-linux-gnu");
        emitter.generate(&program, &analysis).expect("codegen should succeed")
    }

    #[test]
    fn minimal_main_returns_constant() {
        let ir = generate("func main() -> int { return 42; }");
        assert!(ir.contains("define i32 @main("));
        assert_eq!(ir.matches("ret i32 42").count(), 1);
        assert!(!ir.contains("call void @sl_print"));
    }

    #[test]
    fn print_string_emits_one_constant_and_one_call() {
        let ir = generate(r#"func main() -> int { print("hi"); return 0; }"#);
        assert!(ir.contains("[3 x i8]"));
        assert!(ir.contains(r#"c"hi\00""#));
        assert_eq!(ir.matches("call void @sl_print_string(").count(), 1);
        assert!(ir.contains("ret i32 0"));
    }

    #[test]
    fn print_int_dispatches_to_sl_print_int() {
        let ir = generate("func main() -> int { print(7); return 0; }");
        assert_eq!(ir.matches("call void @sl_print_int(").count(), 1);
    }

    #[test]
    fn recursive_fibonacci_calls_itself_twice() {
        let ir = generate(
            "func fibonacci(n int) -> int { \
               if (n <= 1) { return n; } else { return fibonacci(n - 1) + fibonacci(n - 2); } \
             } \
             func main() -> int { return fibonacci(10); }",
        );
        assert_eq!(ir.matches("call i32 @fibonacci(").count(), 2);
        assert!(ir.contains("icmp sle i32"));
        assert!(ir.contains("add i32"));
    }

    #[test]
    fn while_loop_has_cond_body_end_blocks() {
        let ir = generate(
            "func main() -> int { var i int = 0; while (i < 3) { i = i + 1; } return i; }",
        );
        assert!(ir.contains("while.cond.0:"));
        assert!(ir.contains("while.body.1:"));
        assert!(ir.contains("while.end.2:"));
    }

    #[test]
    fn for_loop_with_no_condition_branches_straight_to_body() {
        let ir = generate("func main() -> int { for (;;) { return 0; } }");
        assert!(ir.contains("for.body"));
        assert!(!ir.contains("for.cond"));
    }

    #[test]
    fn void_function_gets_implicit_ret_void() {
        let ir = generate("func noop() { var x int = 1; }");
        assert!(ir.contains("define void @noop("));
        assert!(ir.contains("ret void"));
    }

    #[test]
    fn missing_terminator_on_non_main_non_void_function_is_a_codegen_error() {
        let pool = Pool::new();
        let mut reporter = Reporter::new();
        let lexer = Lexer::new(&pool, "t.sl", "func f() -> int { var x int = 1; }");
        let parser = Parser::new(lexer, &mut reporter);
        let mut program = parser.parse(&mut reporter);
        let analysis = slc_sem::analyze(&mut program, &pool, &mut reporter);
        assert!(!reporter.has_errors());

        let context = Context::create();
        let mut emitter = Emitter::new(&context, &pool, "t", "x86_64-unknown-linux-gnu");
        let err = emitter.generate(&program, &analysis);
        assert!(matches!(err, Err(CodeGenError::MissingTerminator(_))));
    }

    #[test]
    fn struct_field_read_and_write_round_trips() {
        let ir = generate(
            "struct Point { x int; y int; } \
             func sum(p Point) -> int { return p.x + p.y; } \
             func main() -> int { return 0; }",
        );
        assert!(ir.contains("%Point = type { i32, i32 }"));
        assert!(ir.contains("getelementptr"));
    }

    #[test]
    fn fixed_array_index_decays_through_gep() {
        let ir = generate(
            "func main() -> int { var a int[3]; a[0] = 1; return a[0]; }",
        );
        assert!(ir.contains("[3 x i32]"));
    }

    #[test]
    fn logical_and_or_use_eager_int_instructions() {
        let ir = generate("func main() -> int { var ok bool = true && false; if (ok) { return 1; } return 0; }");
        assert!(ir.contains(" and "));
    }

    #[test]
    fn emitter_is_deterministic_for_identical_input() {
        let source = "func main() -> int { var x int = 1 + 2; return x; }";
        assert_eq!(generate(source), generate(source));
    }

    #[test]
    fn locals_declared_inside_a_loop_are_hoisted_to_entry() {
        let ir = generate(
            "func main() -> int { \
               var i int = 0; \
               while (i < 3) { var t int = i; i = t + 1; } \
               return i; \
             }",
        );
        let entry_start = ir.find("entry:").expect("entry block");
        let body_start = ir.find("while.body").expect("while.body block");
        let entry_text = &ir[entry_start..body_start];
        assert!(entry_text.contains("alloca i32"), "expected 't's alloca hoisted into entry:\n{ir}");

        let body_end = ir.find("while.end").expect("while.end block");
        let body_text = &ir[body_start..body_end];
        assert!(!body_text.contains("alloca"), "loop body re-allocates a local on every iteration:\n{ir}");
    }
}
