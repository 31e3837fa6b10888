//! The type system and semantic analyzer.
//!
//! `analyze` walks the parser's `Program` in place: it annotates every
//! `Expr::ty` with its resolved type and validates every declaration's
//! signature, reporting semantic and type-check errors through a
//! shared `Reporter` rather than ever raising. There is no separate
//! typed-AST type: the same tree the parser built becomes "typed" once
//! this pass has run over it.

use crate::scope::{SymbolKind, SymbolTable};
use slc_par::ast::*;
use slc_util::diagnostic::{Diagnostic, ErrorKind};
use slc_util::{Pool, Reporter, SourceRange, Symbol, Type, TypeRegistry};

/// Output of a successful (or partially successful) analysis pass: the
/// registry of struct types and the symbol table the emitter needs to
/// look function signatures and field layouts back up.
pub struct Analysis {
    pub types: TypeRegistry,
    pub symbols: SymbolTable,
}

pub fn analyze(program: &mut Program, pool: &Pool, reporter: &mut Reporter) -> Analysis {
    let mut analyzer = Analyzer {
        pool,
        types: TypeRegistry::new(),
        symbols: SymbolTable::new(),
        print_symbol: pool.intern("print"),
    };
    analyzer.run(program, reporter);
    Analysis { types: analyzer.types, symbols: analyzer.symbols }
}

struct Analyzer<'p> {
    pool: &'p Pool,
    types: TypeRegistry,
    symbols: SymbolTable,
    print_symbol: Symbol,
}

impl<'p> Analyzer<'p> {
    fn run(&mut self, program: &mut Program, reporter: &mut Reporter) {
        self.declare_struct_names(program, reporter);
        self.resolve_struct_fields(program, reporter);
        self.declare_functions(program, reporter);
        self.analyze_function_bodies(program, reporter);
    }

    // -- declaration pre-pass --------------------------------------------

    fn declare_struct_names(&mut self, program: &Program, reporter: &mut Reporter) {
        for decl in &program.declarations {
            if let Declaration::Struct(s) = decl {
                if !self.types.declare_struct_name(s.name.clone()) {
                    self.semantic(reporter, s.range, format!("redeclaration of struct '{}'", s.name));
                }
            }
        }
    }

    fn resolve_struct_fields(&mut self, program: &Program, reporter: &mut Reporter) {
        for decl in &program.declarations {
            if let Declaration::Struct(s) = decl {
                let mut fields = Vec::with_capacity(s.fields.len());
                let mut seen: Vec<Symbol> = Vec::new();
                for field in &s.fields {
                    if seen.contains(&field.name) {
                        self.semantic(
                            reporter,
                            field.range,
                            format!("duplicate field '{}' in struct '{}'", field.name, s.name),
                        );
                        continue;
                    }
                    seen.push(field.name.clone());
                    let ty = self.resolve_type(&field.ty, reporter);
                    fields.push((field.name.clone(), ty));
                }
                self.types.finish_struct(&s.name, fields);
            }
        }
    }

    fn declare_functions(&mut self, program: &mut Program, reporter: &mut Reporter) {
        for decl in &mut program.declarations {
            if let Declaration::Function(f) = decl {
                let params: Vec<Type> = f.params.iter().map(|p| self.resolve_type(&p.ty, reporter)).collect();
                let ret = match &f.return_type {
                    Some(t) => self.resolve_type(t, reporter),
                    None => Type::Void,
                };
                let func_ty = Type::Function { params, ret: Box::new(ret) };
                if self
                    .symbols
                    .declare(f.name.clone(), func_ty, SymbolKind::Function, f.range)
                    .is_err()
                {
                    self.semantic(reporter, f.range, format!("redeclaration of function '{}'", f.name));
                }
            }
        }
    }

    fn analyze_function_bodies(&mut self, program: &mut Program, reporter: &mut Reporter) {
        for decl in &mut program.declarations {
            if let Declaration::Function(f) = decl {
                let return_ty = match self.symbols.lookup(&f.name) {
                    Some(entry) => match &entry.ty {
                        Type::Function { ret, .. } => (**ret).clone(),
                        _ => Type::Void,
                    },
                    None => Type::Void,
                };

                self.symbols.enter_scope();
                for param in &f.params {
                    let ty = self.resolve_type(&param.ty, reporter);
                    if self
                        .symbols
                        .declare(param.name.clone(), ty, SymbolKind::Parameter, param.range)
                        .is_err()
                    {
                        self.semantic(
                            reporter,
                            param.range,
                            format!("redeclaration of parameter '{}'", param.name),
                        );
                    }
                }
                self.analyze_block(&mut f.body, &return_ty, reporter);
                self.symbols.exit_scope();
            }
        }
    }

    // -- type resolution ---------------------------------------------------

    fn resolve_type(&mut self, texpr: &TypeExpr, reporter: &mut Reporter) -> Type {
        match resolve_type_expr(&self.types, texpr) {
            Some(ty) => ty,
            None => {
                self.semantic(reporter, texpr.range, format!("unknown type '{}'", texpr.name));
                Type::Error
            }
        }
    }

    // -- statements ----------------------------------------------------------

    fn analyze_block(&mut self, block: &mut Block, return_ty: &Type, reporter: &mut Reporter) {
        self.symbols.enter_scope();
        for stmt in &mut block.statements {
            self.analyze_stmt(stmt, return_ty, reporter);
        }
        self.symbols.exit_scope();
    }

    fn analyze_stmt(&mut self, stmt: &mut Stmt, return_ty: &Type, reporter: &mut Reporter) {
        match stmt {
            Stmt::ExprStmt(e) => {
                self.analyze_expr(e, reporter);
            }
            Stmt::VarDecl(v) => self.analyze_var_decl(v, reporter),
            Stmt::Assign(a) => self.analyze_assign(a, reporter),
            Stmt::If(s) => {
                self.analyze_expr(&mut s.cond, reporter);
                if !s.cond.ty.is_error() && s.cond.ty != Type::Bool {
                    self.type_check(reporter, s.cond.range, "if condition must be bool".to_string());
                }
                self.analyze_stmt(&mut s.then_branch, return_ty, reporter);
                if let Some(else_branch) = &mut s.else_branch {
                    self.analyze_stmt(else_branch, return_ty, reporter);
                }
            }
            Stmt::While(s) => {
                self.analyze_expr(&mut s.cond, reporter);
                if !s.cond.ty.is_error() && s.cond.ty != Type::Bool {
                    self.type_check(reporter, s.cond.range, "while condition must be bool".to_string());
                }
                self.analyze_stmt(&mut s.body, return_ty, reporter);
            }
            Stmt::For(s) => {
                self.symbols.enter_scope();
                if let Some(init) = &mut s.init {
                    self.analyze_stmt(init, return_ty, reporter);
                }
                if let Some(cond) = &mut s.cond {
                    self.analyze_expr(cond, reporter);
                    if !cond.ty.is_error() && cond.ty != Type::Bool {
                        self.type_check(reporter, cond.range, "for condition must be bool".to_string());
                    }
                }
                if let Some(update) = &mut s.update {
                    self.analyze_stmt(update, return_ty, reporter);
                }
                self.analyze_stmt(&mut s.body, return_ty, reporter);
                self.symbols.exit_scope();
            }
            Stmt::Return(r) => {
                match &mut r.value {
                    Some(value) => {
                        self.analyze_expr(value, reporter);
                        if !return_ty.is_assignable_from(&value.ty) {
                            self.type_check(
                                reporter,
                                value.range,
                                format!("expected return type '{return_ty}', found '{}'", value.ty),
                            );
                        }
                    }
                    None => {
                        if *return_ty != Type::Void {
                            self.type_check(
                                reporter,
                                r.range,
                                format!("expected a return value of type '{return_ty}'"),
                            );
                        }
                    }
                }
            }
            Stmt::Block(b) => self.analyze_block(b, return_ty, reporter),
        }
    }

    fn analyze_var_decl(&mut self, v: &mut VarDeclStmt, reporter: &mut Reporter) {
        let declared = self.resolve_type(&v.ty, reporter);
        if let Some(init) = &mut v.init {
            self.analyze_expr(init, reporter);
            if !declared.is_assignable_from(&init.ty) {
                self.type_check(
                    reporter,
                    init.range,
                    format!("cannot assign '{}' to variable of type '{declared}'", init.ty),
                );
            }
        }
        if self
            .symbols
            .declare(v.name.clone(), declared, SymbolKind::Variable, v.range)
            .is_err()
        {
            self.semantic(reporter, v.range, format!("redeclaration of '{}'", v.name));
        }
    }

    fn analyze_assign(&mut self, a: &mut AssignStmt, reporter: &mut Reporter) {
        if !is_lvalue(&a.target) {
            self.semantic(reporter, a.target.range, "assignment target is not an lvalue".to_string());
        }
        self.analyze_expr(&mut a.target, reporter);
        self.analyze_expr(&mut a.value, reporter);

        // A fixed-size array has no defined whole-value assignment (same
        // rule as a var-decl initializer): assign into its elements
        // instead.
        if matches!(&a.target.ty, Type::Array { size, .. } if *size >= 0) {
            self.type_check(
                reporter,
                a.value.range,
                format!("cannot assign to fixed-size array '{}'; assign into its elements instead", a.target.ty),
            );
            return;
        }

        if !a.target.ty.is_assignable_from(&a.value.ty) {
            self.type_check(
                reporter,
                a.value.range,
                format!("cannot assign '{}' to '{}'", a.value.ty, a.target.ty),
            );
        }
    }

    // -- expressions -----------------------------------------------------

    fn analyze_expr(&mut self, expr: &mut Expr, reporter: &mut Reporter) {
        expr.ty = match &mut expr.kind {
            ExprKind::Literal(Literal::Int(_)) => Type::Int,
            ExprKind::Literal(Literal::Float(_)) => Type::Float,
            ExprKind::Literal(Literal::Bool(_)) => Type::Bool,
            ExprKind::Literal(Literal::Str(_)) => Type::String,
            ExprKind::Identifier(name) => match self.symbols.lookup(name) {
                Some(entry) => entry.ty.clone(),
                None => {
                    self.semantic(reporter, expr.range, format!("undeclared identifier '{name}'"));
                    Type::Error
                }
            },
            ExprKind::Binary { left, op, right } => {
                self.analyze_expr(left, reporter);
                self.analyze_expr(right, reporter);
                self.type_binary(*op, &left.ty, &right.ty, expr.range, reporter)
            }
            ExprKind::Unary { op, operand } => {
                self.analyze_expr(operand, reporter);
                self.type_unary(*op, &operand.ty, expr.range, reporter)
            }
            ExprKind::Call { callee, args } => self.analyze_call(callee, args, expr.range, reporter),
            ExprKind::Index { object, index } => {
                self.analyze_expr(object, reporter);
                self.analyze_expr(index, reporter);
                if !index.ty.is_error() && index.ty != Type::Int {
                    self.type_check(reporter, index.range, "array index must be int".to_string());
                }
                match &object.ty {
                    Type::Array { element, .. } => (**element).clone(),
                    Type::Error => Type::Error,
                    other => {
                        self.type_check(reporter, object.range, format!("cannot index into '{other}'"));
                        Type::Error
                    }
                }
            }
            ExprKind::Member { object, field } => {
                self.analyze_expr(object, reporter);
                match &object.ty {
                    Type::Struct { fields, name } => match fields.iter().find(|(n, _)| n == &*field) {
                        Some((_, ty)) => ty.clone(),
                        None => {
                            self.semantic(
                                reporter,
                                expr.range,
                                format!("struct '{name}' has no field '{field}'"),
                            );
                            Type::Error
                        }
                    },
                    Type::Error => Type::Error,
                    other => {
                        self.semantic(
                            reporter,
                            object.range,
                            format!("member access on non-struct type '{other}'"),
                        );
                        Type::Error
                    }
                }
            }
        };
    }

    fn analyze_call(
        &mut self,
        callee: &mut Expr,
        args: &mut [Expr],
        range: SourceRange,
        reporter: &mut Reporter,
    ) -> Type {
        if let ExprKind::Identifier(name) = &callee.kind {
            if *name == self.print_symbol && self.symbols.lookup(name).is_none() {
                callee.ty = Type::Void;
                for arg in args.iter_mut() {
                    self.analyze_expr(arg, reporter);
                }
                if args.len() != 1 {
                    self.type_check(reporter, range, format!("print expects 1 argument, got {}", args.len()));
                    return Type::Void;
                }
                let arg_ty = &args[0].ty;
                if !arg_ty.is_error()
                    && !matches!(arg_ty, Type::Int | Type::Float | Type::String)
                {
                    self.type_check(
                        reporter,
                        args[0].range,
                        format!("print does not support values of type '{arg_ty}'"),
                    );
                }
                return Type::Void;
            }
        }

        self.analyze_expr(callee, reporter);
        for arg in args.iter_mut() {
            self.analyze_expr(arg, reporter);
        }

        match callee.ty.clone() {
            Type::Function { params, ret } => {
                if params.len() != args.len() {
                    self.type_check(
                        reporter,
                        range,
                        format!("expected {} argument(s), found {}", params.len(), args.len()),
                    );
                } else {
                    for (param_ty, arg) in params.iter().zip(args.iter()) {
                        if !param_ty.is_assignable_from(&arg.ty) {
                            self.type_check(
                                reporter,
                                arg.range,
                                format!("expected argument of type '{param_ty}', found '{}'", arg.ty),
                            );
                        }
                    }
                }
                *ret
            }
            Type::Error => Type::Error,
            other => {
                self.semantic(reporter, callee.range, format!("'{other}' is not callable"));
                Type::Error
            }
        }
    }

    fn type_binary(
        &mut self,
        op: BinOp,
        left: &Type,
        right: &Type,
        range: SourceRange,
        reporter: &mut Reporter,
    ) -> Type {
        if left.is_error() || right.is_error() {
            return Type::Error;
        }
        if op.is_arithmetic() {
            if left.is_numeric() && left == right {
                return left.clone();
            }
            self.type_check(reporter, range, format!("cannot apply '{op:?}' to '{left}' and '{right}'"));
            Type::Error
        } else if op.is_equality() {
            if left == right && is_comparable(left) {
                return Type::Bool;
            }
            self.type_check(reporter, range, format!("cannot compare '{left}' and '{right}' for equality"));
            Type::Error
        } else if op.is_relational() {
            if left == right && (left.is_numeric() || *left == Type::String) {
                return Type::Bool;
            }
            self.type_check(reporter, range, format!("cannot order '{left}' and '{right}'"));
            Type::Error
        } else {
            debug_assert!(op.is_logical());
            if *left == Type::Bool && *right == Type::Bool {
                return Type::Bool;
            }
            self.type_check(reporter, range, format!("'{op:?}' requires bool operands, found '{left}' and '{right}'"));
            Type::Error
        }
    }

    fn type_unary(&mut self, op: UnOp, operand: &Type, range: SourceRange, reporter: &mut Reporter) -> Type {
        if operand.is_error() {
            return Type::Error;
        }
        match op {
            UnOp::Neg if operand.is_numeric() => operand.clone(),
            UnOp::Not if *operand == Type::Bool => Type::Bool,
            UnOp::Neg => {
                self.type_check(reporter, range, format!("cannot negate '{operand}'"));
                Type::Error
            }
            UnOp::Not => {
                self.type_check(reporter, range, format!("cannot apply '!' to '{operand}'"));
                Type::Error
            }
        }
    }

    fn semantic(&self, reporter: &mut Reporter, range: SourceRange, message: String) {
        reporter.report(Diagnostic::error(ErrorKind::Semantic, message, range));
    }

    fn type_check(&self, reporter: &mut Reporter, range: SourceRange, message: String) {
        reporter.report(Diagnostic::error(ErrorKind::TypeCheck, message, range));
    }
}

/// Resolves a syntactic [`TypeExpr`] against a [`TypeRegistry`], with no
/// reporting side effect. `None` means the name isn't a built-in or a
/// registered struct. The analyzer turns that into a diagnostic via
/// [`Analyzer::resolve_type`]; the emitter, which only ever sees
/// already-analyzed programs, treats it as an internal error instead.
pub fn resolve_type_expr(types: &TypeRegistry, texpr: &TypeExpr) -> Option<Type> {
    let base = match texpr.name.as_str() {
        "int" => Type::Int,
        "float" => Type::Float,
        "bool" => Type::Bool,
        "string" => Type::String,
        "void" => Type::Void,
        _ => types.lookup_struct(&texpr.name)?.clone(),
    };
    Some(match texpr.array {
        None => base,
        Some(ArraySize::Dynamic) => Type::dynamic_array(base),
        Some(ArraySize::Fixed(n)) => Type::fixed_array(base, n),
    })
}

fn is_lvalue(expr: &Expr) -> bool {
    matches!(&expr.kind, ExprKind::Identifier(_) | ExprKind::Index { .. } | ExprKind::Member { .. })
}

fn is_comparable(ty: &Type) -> bool {
    matches!(ty, Type::Int | Type::Float | Type::Bool | Type::String)
}

#[cfg(test)]
mod tests {
    use super::*;
    use slc_lex::Lexer;
    use slc_par::Parser;

    fn run(source: &str) -> (Program, Reporter) {
        let pool = Pool::new();
        let lexer = Lexer::new(&pool, "t.sl", source);
        let mut reporter = Reporter::new();
        let parser = Parser::new(lexer, &mut reporter);
        let mut program = parser.parse(&mut reporter);
        analyze(&mut program, &pool, &mut reporter);
        (program, reporter)
    }

    #[test]
    fn minimal_main_analyzes_clean() {
        let (_, reporter) = run("func main() -> int { return 42; }");
        assert!(!reporter.has_errors());
    }

    #[test]
    fn every_expression_gets_a_non_error_type_on_success() {
        let (program, reporter) = run("func main() -> int { var x int = 1 + 2; return x; }");
        assert!(!reporter.has_errors());
        let Declaration::Function(f) = &program.declarations[0] else { panic!() };
        let Stmt::VarDecl(v) = &f.body.statements[0] else { panic!() };
        assert_eq!(v.init.as_ref().unwrap().ty, Type::Int);
    }

    #[test]
    fn assigning_string_to_int_is_a_type_error() {
        let (_, reporter) = run(r#"func main() -> int { var x int = "s"; return x; }"#);
        assert!(reporter.has_errors());
        assert_eq!(reporter.errors()[0].kind, ErrorKind::TypeCheck);
    }

    #[test]
    fn unknown_identifier_is_a_semantic_error() {
        let (_, reporter) = run("func main() -> int { return y; }");
        assert!(reporter.has_errors());
        assert_eq!(reporter.errors()[0].kind, ErrorKind::Semantic);
        assert!(reporter.errors()[0].message.contains('y'));
    }

    #[test]
    fn recursive_call_resolves_via_declaration_pre_pass() {
        let (_, reporter) = run(
            "func fib(n int) -> int { if (n <= 1) { return n; } return fib(n - 1) + fib(n - 2); }",
        );
        assert!(!reporter.has_errors());
    }

    #[test]
    fn struct_field_access_resolves_type() {
        let (_, reporter) = run(
            "struct Point { x int; y int; } func sum(p Point) -> int { return p.x + p.y; }",
        );
        assert!(!reporter.has_errors());
    }

    #[test]
    fn unknown_field_is_a_semantic_error() {
        let (_, reporter) =
            run("struct Point { x int; } func f(p Point) -> int { return p.z; }");
        assert!(reporter.has_errors());
        assert_eq!(reporter.errors()[0].kind, ErrorKind::Semantic);
    }

    #[test]
    fn print_accepts_int_float_and_string() {
        let (_, reporter) = run(
            r#"func main() -> int { print(1); print(1.0); print("s"); return 0; }"#,
        );
        assert!(!reporter.has_errors());
    }

    #[test]
    fn print_rejects_bool_argument() {
        let (_, reporter) = run("func main() -> int { print(true); return 0; }");
        assert!(reporter.has_errors());
    }

    #[test]
    fn duplicate_function_declaration_is_semantic_error() {
        let (_, reporter) = run(
            "func f() -> int { return 0; } func f() -> int { return 1; }",
        );
        assert!(reporter.has_errors());
        assert_eq!(reporter.errors()[0].kind, ErrorKind::Semantic);
    }

    #[test]
    fn dynamic_array_param_accepts_fixed_array_argument() {
        let (_, reporter) = run(
            "func sum(xs int[]) -> int { return xs[0]; } func main() -> int { var a int[3]; return sum(a); }",
        );
        assert!(!reporter.has_errors());
    }

    #[test]
    fn if_condition_must_be_bool() {
        let (_, reporter) = run("func main() -> int { if (1) { return 1; } return 0; }");
        assert!(reporter.has_errors());
        assert_eq!(reporter.errors()[0].kind, ErrorKind::TypeCheck);
    }

    #[test]
    fn assigning_to_a_fixed_size_array_as_a_whole_is_a_type_error() {
        let (_, reporter) = run(
            "func main() -> int { var a int[3]; var b int[3]; a = b; return 0; }",
        );
        assert!(reporter.has_errors());
        assert_eq!(reporter.errors()[0].kind, ErrorKind::TypeCheck);
    }

    #[test]
    fn shadowed_variable_in_nested_block_does_not_conflict() {
        let (_, reporter) = run(
            "func main() -> int { var x int = 1; { var x float = 2.0; } return x; }",
        );
        assert!(!reporter.has_errors());
    }
}
