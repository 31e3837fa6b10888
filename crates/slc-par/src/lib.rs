//! The recursive-descent parser.
//!
//! `Parser` consumes tokens from a [`slc_lex::Lexer`] one at a time
//! (one-token lookahead) and builds a
//! [`Program`]. On a syntax error it reports a diagnostic, synchronizes
//! to the next statement/declaration boundary, and keeps going. `parse`
//! always returns a best-effort `Program`, never a `Result`, mirroring
//! the lexer's "never panics, only reports" contract.

pub mod ast;

use ast::*;
use slc_lex::{Lexer, Token, TokenKind};
use slc_util::diagnostic::{Diagnostic, ErrorKind};
use slc_util::{Reporter, SourceRange, Symbol};

/// Binding powers for the precedence-climbing expression parser,
/// lowest to highest. All levels are left-associative, so
/// the right-hand recursive call always uses `level + 1`.
mod bp {
    pub const OR: u8 = 1;
    pub const AND: u8 = 2;
    pub const EQUALITY: u8 = 3;
    pub const RELATIONAL: u8 = 4;
    pub const ADDITIVE: u8 = 5;
    pub const MULTIPLICATIVE: u8 = 6;
}

pub struct Parser<'p> {
    lexer: Lexer<'p>,
    current: Token,
}

impl<'p> Parser<'p> {
    pub fn new(mut lexer: Lexer<'p>, reporter: &mut Reporter) -> Self {
        let current = lexer.next_token(reporter);
        Self { lexer, current }
    }

    /// Parses a complete source file into a best-effort [`Program`].
    pub fn parse(mut self, reporter: &mut Reporter) -> Program {
        let mut declarations = Vec::new();
        while !self.at_eof() {
            match self.parse_declaration(reporter) {
                Some(decl) => declarations.push(decl),
                None => self.synchronize(reporter),
            }
        }
        Program { declarations }
    }

    // -- token plumbing -----------------------------------------------

    fn at_eof(&self) -> bool {
        matches!(self.current.kind, TokenKind::Eof)
    }

    fn advance(&mut self, reporter: &mut Reporter) -> Token {
        let next = self.lexer.next_token(reporter);
        std::mem::replace(&mut self.current, next)
    }

    fn check(&self, kind: &TokenKind) -> bool {
        std::mem::discriminant(&self.current.kind) == std::mem::discriminant(kind)
    }

    fn matches(&mut self, kind: &TokenKind, reporter: &mut Reporter) -> bool {
        if self.check(kind) {
            self.advance(reporter);
            true
        } else {
            false
        }
    }

    /// Consumes `kind` or reports a syntax error naming what was
    /// expected and returns `None` without advancing.
    fn expect(&mut self, kind: TokenKind, what: &str, reporter: &mut Reporter) -> Option<Token> {
        if self.check(&kind) {
            Some(self.advance(reporter))
        } else {
            self.error(reporter, format!("expected {what}, found '{}'", self.current.lexeme));
            None
        }
    }

    fn error(&mut self, reporter: &mut Reporter, message: impl Into<String>) {
        let range = SourceRange::point(self.current.position);
        reporter.report(Diagnostic::error(ErrorKind::Syntax, message, range));
    }

    /// Skips tokens until a statement/declaration boundary: a
    /// semicolon (consumed), an unmatched `}` (left for the caller), or
    /// a keyword that opens a new declaration or statement. Never
    /// revisits consumed tokens.
    fn synchronize(&mut self, reporter: &mut Reporter) {
        loop {
            match &self.current.kind {
                TokenKind::Eof | TokenKind::RBrace => return,
                TokenKind::Semicolon => {
                    self.advance(reporter);
                    return;
                }
                TokenKind::Func
                | TokenKind::Struct
                | TokenKind::Var
                | TokenKind::If
                | TokenKind::While
                | TokenKind::For
                | TokenKind::Return => return,
                _ => {
                    self.advance(reporter);
                }
            }
        }
    }

    /// Interns `text` through the same pool the lexer used for its
    /// lexemes, so identifier/field `Symbol`s dedupe with the ones the
    /// lexer already produced rather than opening a second table.
    fn intern(&self, text: &str) -> Symbol {
        self.lexer.pool().intern(text)
    }

    // -- declarations ---------------------------------------------------

    fn parse_declaration(&mut self, reporter: &mut Reporter) -> Option<Declaration> {
        match &self.current.kind {
            TokenKind::Func => self.parse_function(reporter).map(Declaration::Function),
            TokenKind::Struct => self.parse_struct(reporter).map(Declaration::Struct),
            _ => {
                self.error(reporter, format!("expected declaration, found '{}'", self.current.lexeme));
                None
            }
        }
    }

    fn parse_function(&mut self, reporter: &mut Reporter) -> Option<FunctionDecl> {
        let start = self.current.position;
        self.advance(reporter); // 'func'/'function'

        let name_tok = self.expect(TokenKind::Identifier, "a function name", reporter)?;
        let name = self.intern(&name_tok.lexeme);

        self.expect(TokenKind::LParen, "'('", reporter)?;
        let mut params = Vec::new();
        if !self.check(&TokenKind::RParen) {
            loop {
                let p_start = self.current.position;
                let p_name_tok = self.expect(TokenKind::Identifier, "a parameter name", reporter)?;
                let p_name = self.intern(&p_name_tok.lexeme);
                let ty = self.parse_type(reporter)?;
                let end = ty.range.end;
                params.push(Param {
                    name: p_name,
                    ty,
                    range: SourceRange::new(p_start, end),
                });
                if !self.matches(&TokenKind::Comma, reporter) {
                    break;
                }
            }
        }
        self.expect(TokenKind::RParen, "')'", reporter)?;

        let return_type = if self.matches(&TokenKind::Arrow, reporter) {
            Some(self.parse_type(reporter)?)
        } else {
            None
        };

        let body = self.parse_block(reporter)?;
        let range = SourceRange::new(start, body.range.end);
        Some(FunctionDecl { name, params, return_type, body, range })
    }

    fn parse_struct(&mut self, reporter: &mut Reporter) -> Option<StructDecl> {
        let start = self.current.position;
        self.advance(reporter); // 'struct'
        let name_tok = self.expect(TokenKind::Identifier, "a struct name", reporter)?;
        let name = self.intern(&name_tok.lexeme);
        self.expect(TokenKind::LBrace, "'{'", reporter)?;

        let mut fields = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.at_eof() {
            let f_start = self.current.position;
            let f_name_tok = self.expect(TokenKind::Identifier, "a field name", reporter)?;
            let f_name = self.intern(&f_name_tok.lexeme);
            let ty = self.parse_type(reporter)?;
            let end = ty.range.end;
            self.matches(&TokenKind::Semicolon, reporter);
            fields.push(FieldDecl { name: f_name, ty, range: SourceRange::new(f_start, end) });
        }
        let close = self.expect(TokenKind::RBrace, "'}'", reporter)?;
        Some(StructDecl { name, fields, range: SourceRange::new(start, close.position) })
    }

    fn parse_type(&mut self, reporter: &mut Reporter) -> Option<TypeExpr> {
        let start = self.current.position;
        let name_tok = self.expect(TokenKind::Identifier, "a type name", reporter)?;
        let name = self.intern(&name_tok.lexeme);
        let mut end = name_tok.position;

        let array = if self.check(&TokenKind::LBracket) {
            self.advance(reporter);
            let size = if let TokenKind::Int(n) = &self.current.kind {
                let n = *n;
                self.advance(reporter);
                Some(ArraySize::Fixed(n))
            } else {
                None
            };
            let close = self.expect(TokenKind::RBracket, "']'", reporter)?;
            end = close.position;
            Some(size.unwrap_or(ArraySize::Dynamic))
        } else {
            None
        };

        Some(TypeExpr { name, array, range: SourceRange::new(start, end) })
    }

    // -- statements -----------------------------------------------------

    fn parse_block(&mut self, reporter: &mut Reporter) -> Option<Block> {
        let open = self.expect(TokenKind::LBrace, "'{'", reporter)?;
        let mut statements = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.at_eof() {
            match self.parse_statement(reporter) {
                Some(stmt) => statements.push(stmt),
                None => self.synchronize(reporter),
            }
        }
        let close = self.expect(TokenKind::RBrace, "'}'", reporter)?;
        Some(Block { statements, range: SourceRange::new(open.position, close.position) })
    }

    fn parse_statement(&mut self, reporter: &mut Reporter) -> Option<Stmt> {
        match &self.current.kind {
            TokenKind::Var => self.parse_var_decl(reporter).map(Stmt::VarDecl),
            TokenKind::If => self.parse_if(reporter).map(Stmt::If),
            TokenKind::While => self.parse_while(reporter).map(Stmt::While),
            TokenKind::For => self.parse_for(reporter).map(Stmt::For),
            TokenKind::Return => self.parse_return(reporter).map(Stmt::Return),
            TokenKind::LBrace => self.parse_block(reporter).map(Stmt::Block),
            _ => self.parse_expr_or_assign(reporter),
        }
    }

    fn parse_var_decl(&mut self, reporter: &mut Reporter) -> Option<VarDeclStmt> {
        let start = self.current.position;
        self.advance(reporter); // 'var'
        let name_tok = self.expect(TokenKind::Identifier, "a variable name", reporter)?;
        let name = self.intern(&name_tok.lexeme);
        let ty = self.parse_type(reporter)?;
        let init = if self.matches(&TokenKind::Eq, reporter) {
            Some(self.parse_expression(bp::OR, reporter)?)
        } else {
            None
        };
        let semi = self.expect(TokenKind::Semicolon, "';'", reporter)?;
        Some(VarDeclStmt { name, ty, init, range: SourceRange::new(start, semi.position) })
    }

    fn parse_if(&mut self, reporter: &mut Reporter) -> Option<IfStmt> {
        let start = self.current.position;
        self.advance(reporter); // 'if'
        self.expect(TokenKind::LParen, "'('", reporter)?;
        let cond = self.parse_expression(bp::OR, reporter)?;
        self.expect(TokenKind::RParen, "')'", reporter)?;
        let then_branch = Box::new(self.parse_statement(reporter)?);
        let mut end = then_branch.range().end;
        let else_branch = if self.matches(&TokenKind::Else, reporter) {
            let branch = Box::new(self.parse_statement(reporter)?);
            end = branch.range().end;
            Some(branch)
        } else {
            None
        };
        Some(IfStmt { cond, then_branch, else_branch, range: SourceRange::new(start, end) })
    }

    fn parse_while(&mut self, reporter: &mut Reporter) -> Option<WhileStmt> {
        let start = self.current.position;
        self.advance(reporter); // 'while'
        self.expect(TokenKind::LParen, "'('", reporter)?;
        let cond = self.parse_expression(bp::OR, reporter)?;
        self.expect(TokenKind::RParen, "')'", reporter)?;
        let body = Box::new(self.parse_statement(reporter)?);
        let end = body.range().end;
        Some(WhileStmt { cond, body, range: SourceRange::new(start, end) })
    }

    fn parse_for(&mut self, reporter: &mut Reporter) -> Option<ForStmt> {
        let start = self.current.position;
        self.advance(reporter); // 'for'
        self.expect(TokenKind::LParen, "'('", reporter)?;

        let init = if self.check(&TokenKind::Semicolon) {
            None
        } else {
            Some(Box::new(self.parse_for_clause(reporter)?))
        };
        self.matches(&TokenKind::Semicolon, reporter);

        let cond = if self.check(&TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expression(bp::OR, reporter)?)
        };
        self.expect(TokenKind::Semicolon, "';'", reporter)?;

        let update = if self.check(&TokenKind::RParen) {
            None
        } else {
            Some(Box::new(self.parse_for_clause(reporter)?))
        };
        self.expect(TokenKind::RParen, "')'", reporter)?;

        let body = Box::new(self.parse_statement(reporter)?);
        let end = body.range().end;
        Some(ForStmt { init, cond, update, body, range: SourceRange::new(start, end) })
    }

    /// Parses the init/update clause of a `for` header: a var-decl
    /// without its own trailing semicolon, or an assignment/expression.
    fn parse_for_clause(&mut self, reporter: &mut Reporter) -> Option<Stmt> {
        if self.check(&TokenKind::Var) {
            let start = self.current.position;
            self.advance(reporter);
            let name_tok = self.expect(TokenKind::Identifier, "a variable name", reporter)?;
            let name = self.intern(&name_tok.lexeme);
            let ty = self.parse_type(reporter)?;
            let init = if self.matches(&TokenKind::Eq, reporter) {
                Some(self.parse_expression(bp::OR, reporter)?)
            } else {
                None
            };
            let end = init.as_ref().map(|e| e.range.end).unwrap_or(ty.range.end);
            return Some(Stmt::VarDecl(VarDeclStmt { name, ty, init, range: SourceRange::new(start, end) }));
        }
        self.parse_expr_or_assign_unterminated(reporter)
    }

    fn parse_return(&mut self, reporter: &mut Reporter) -> Option<ReturnStmt> {
        let start = self.current.position;
        self.advance(reporter); // 'return'
        let value = if self.check(&TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expression(bp::OR, reporter)?)
        };
        let semi = self.expect(TokenKind::Semicolon, "';'", reporter)?;
        Some(ReturnStmt { value, range: SourceRange::new(start, semi.position) })
    }

    /// An expression statement or an assignment, both terminated by
    /// `;`. `a = b;` is parsed as `Assign`; anything else is `ExprStmt`
    /// (a bare call for its side effect, most commonly).
    fn parse_expr_or_assign(&mut self, reporter: &mut Reporter) -> Option<Stmt> {
        let stmt = self.parse_expr_or_assign_unterminated(reporter)?;
        self.expect(TokenKind::Semicolon, "';'", reporter)?;
        Some(stmt)
    }

    fn parse_expr_or_assign_unterminated(&mut self, reporter: &mut Reporter) -> Option<Stmt> {
        let start = self.current.position;
        let expr = self.parse_expression(bp::OR, reporter)?;
        if self.matches(&TokenKind::Eq, reporter) {
            let value = self.parse_expression(bp::OR, reporter)?;
            let end = value.range.end;
            Some(Stmt::Assign(AssignStmt { target: expr, value, range: SourceRange::new(start, end) }))
        } else {
            Some(Stmt::ExprStmt(expr))
        }
    }

    // -- expressions ------------------------------------------------------

    fn parse_expression(&mut self, min_bp: u8, reporter: &mut Reporter) -> Option<Expr> {
        let mut left = self.parse_unary(reporter)?;
        loop {
            let Some((op, level)) = self.peek_binary_op() else { break };
            if level < min_bp {
                break;
            }
            self.advance(reporter); // operator token
            let right = self.parse_expression(level + 1, reporter)?;
            let range = SourceRange::new(left.range.start, right.range.end);
            left = Expr::new(ExprKind::Binary { left: Box::new(left), op, right: Box::new(right) }, range);
        }
        Some(left)
    }

    fn peek_binary_op(&self) -> Option<(BinOp, u8)> {
        Some(match &self.current.kind {
            TokenKind::OrOr => (BinOp::Or, bp::OR),
            TokenKind::AndAnd => (BinOp::And, bp::AND),
            TokenKind::EqEq => (BinOp::Eq, bp::EQUALITY),
            TokenKind::BangEq => (BinOp::Ne, bp::EQUALITY),
            TokenKind::Lt => (BinOp::Lt, bp::RELATIONAL),
            TokenKind::LtEq => (BinOp::Le, bp::RELATIONAL),
            TokenKind::Gt => (BinOp::Gt, bp::RELATIONAL),
            TokenKind::GtEq => (BinOp::Ge, bp::RELATIONAL),
            TokenKind::Plus => (BinOp::Add, bp::ADDITIVE),
            TokenKind::Minus => (BinOp::Sub, bp::ADDITIVE),
            TokenKind::Star => (BinOp::Mul, bp::MULTIPLICATIVE),
            TokenKind::Slash => (BinOp::Div, bp::MULTIPLICATIVE),
            TokenKind::Percent => (BinOp::Mod, bp::MULTIPLICATIVE),
            _ => return None,
        })
    }

    fn parse_unary(&mut self, reporter: &mut Reporter) -> Option<Expr> {
        let start = self.current.position;
        let op = match &self.current.kind {
            TokenKind::Minus => Some(UnOp::Neg),
            TokenKind::Bang => Some(UnOp::Not),
            _ => None,
        };
        if let Some(op) = op {
            self.advance(reporter);
            let operand = self.parse_unary(reporter)?;
            let range = SourceRange::new(start, operand.range.end);
            return Some(Expr::new(ExprKind::Unary { op, operand: Box::new(operand) }, range));
        }
        self.parse_postfix(reporter)
    }

    fn parse_postfix(&mut self, reporter: &mut Reporter) -> Option<Expr> {
        let mut expr = self.parse_primary(reporter)?;
        loop {
            match &self.current.kind {
                TokenKind::LParen => {
                    self.advance(reporter);
                    let mut args = Vec::new();
                    if !self.check(&TokenKind::RParen) {
                        loop {
                            args.push(self.parse_expression(bp::OR, reporter)?);
                            if !self.matches(&TokenKind::Comma, reporter) {
                                break;
                            }
                        }
                    }
                    let close = self.expect(TokenKind::RParen, "')'", reporter)?;
                    let range = SourceRange::new(expr.range.start, close.position);
                    expr = Expr::new(ExprKind::Call { callee: Box::new(expr), args }, range);
                }
                TokenKind::LBracket => {
                    self.advance(reporter);
                    let index = self.parse_expression(bp::OR, reporter)?;
                    let close = self.expect(TokenKind::RBracket, "']'", reporter)?;
                    let range = SourceRange::new(expr.range.start, close.position);
                    expr = Expr::new(ExprKind::Index { object: Box::new(expr), index: Box::new(index) }, range);
                }
                TokenKind::Dot => {
                    self.advance(reporter);
                    let field_tok = self.expect(TokenKind::Identifier, "a field name", reporter)?;
                    let field = self.intern(&field_tok.lexeme);
                    let range = SourceRange::new(expr.range.start, field_tok.position);
                    expr = Expr::new(ExprKind::Member { object: Box::new(expr), field }, range);
                }
                _ => break,
            }
        }
        Some(expr)
    }

    fn parse_primary(&mut self, reporter: &mut Reporter) -> Option<Expr> {
        let start = self.current.position;
        match self.current.kind.clone() {
            TokenKind::Int(v) => {
                self.advance(reporter);
                Some(Expr::new(ExprKind::Literal(Literal::Int(v)), SourceRange::point(start)))
            }
            TokenKind::Float(v) => {
                self.advance(reporter);
                Some(Expr::new(ExprKind::Literal(Literal::Float(v)), SourceRange::point(start)))
            }
            TokenKind::Str(s) => {
                self.advance(reporter);
                Some(Expr::new(ExprKind::Literal(Literal::Str(s)), SourceRange::point(start)))
            }
            TokenKind::True => {
                self.advance(reporter);
                Some(Expr::new(ExprKind::Literal(Literal::Bool(true)), SourceRange::point(start)))
            }
            TokenKind::False => {
                self.advance(reporter);
                Some(Expr::new(ExprKind::Literal(Literal::Bool(false)), SourceRange::point(start)))
            }
            TokenKind::Identifier => {
                let name = self.intern(&self.current.lexeme.clone());
                self.advance(reporter);
                Some(Expr::new(ExprKind::Identifier(name), SourceRange::point(start)))
            }
            TokenKind::LParen => {
                self.advance(reporter);
                let inner = self.parse_expression(bp::OR, reporter)?;
                self.expect(TokenKind::RParen, "')'", reporter)?;
                Some(inner)
            }
            _ => {
                self.error(reporter, format!("expected expression, found '{}'", self.current.lexeme));
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slc_util::Pool;

    pub(super) fn parse(source: &str) -> (Program, Reporter) {
        let pool = Pool::new();
        let lexer = Lexer::new(&pool, "t.sl", source);
        let mut reporter = Reporter::new();
        let parser = Parser::new(lexer, &mut reporter);
        let program = parser.parse(&mut reporter);
        (program, reporter)
    }

    #[test]
    fn parses_minimal_main() {
        let (program, reporter) = parse("func main() -> int { return 42; }");
        assert!(!reporter.has_errors());
        assert_eq!(program.declarations.len(), 1);
        let Declaration::Function(f) = &program.declarations[0] else { panic!("expected function") };
        assert_eq!(f.name.as_str(), "main");
        assert_eq!(f.body.statements.len(), 1);
    }

    #[test]
    fn parses_struct_with_fields() {
        let (program, reporter) = parse("struct Point { x int; y int; }");
        assert!(!reporter.has_errors());
        let Declaration::Struct(s) = &program.declarations[0] else { panic!("expected struct") };
        assert_eq!(s.fields.len(), 2);
    }

    #[test]
    fn binary_operators_are_left_associative() {
        let (program, _) = parse("func f() -> int { return 1 - 2 - 3; }");
        let Declaration::Function(f) = &program.declarations[0] else { panic!() };
        let Stmt::Return(r) = &f.body.statements[0] else { panic!() };
        let ExprKind::Binary { left, op: BinOp::Sub, .. } = &r.value.as_ref().unwrap().kind else { panic!() };
        assert!(matches!(left.kind, ExprKind::Binary { op: BinOp::Sub, .. }));
    }

    #[test]
    fn multiplicative_binds_tighter_than_additive() {
        let (program, _) = parse("func f() -> int { return 1 + 2 * 3; }");
        let Declaration::Function(f) = &program.declarations[0] else { panic!() };
        let Stmt::Return(r) = &f.body.statements[0] else { panic!() };
        let ExprKind::Binary { op: BinOp::Add, right, .. } = &r.value.as_ref().unwrap().kind else { panic!() };
        assert!(matches!(right.kind, ExprKind::Binary { op: BinOp::Mul, .. }));
    }

    #[test]
    fn call_index_member_chain_postfix() {
        let (program, reporter) = parse("func f() -> int { return a.b[0](1); }");
        assert!(!reporter.has_errors());
        let Declaration::Function(f) = &program.declarations[0] else { panic!() };
        let Stmt::Return(r) = &f.body.statements[0] else { panic!() };
        assert!(matches!(r.value.as_ref().unwrap().kind, ExprKind::Call { .. }));
    }

    #[test]
    fn missing_semicolon_is_syntax_error_with_recovery() {
        let (program, reporter) = parse(
            "func main() -> int { var x int = 42 return x; }\nfunc second() -> int { return 1; }",
        );
        assert!(reporter.has_errors());
        assert_eq!(reporter.errors()[0].kind, slc_util::diagnostic::ErrorKind::Syntax);
        // Recovery allows the next function to parse.
        assert_eq!(program.declarations.len(), 2);
    }

    #[test]
    fn if_without_else_has_no_else_branch() {
        let (program, reporter) = parse("func f() -> int { if (true) { return 1; } return 0; }");
        assert!(!reporter.has_errors());
        let Declaration::Function(f) = &program.declarations[0] else { panic!() };
        let Stmt::If(s) = &f.body.statements[0] else { panic!() };
        assert!(s.else_branch.is_none());
    }

    #[test]
    fn for_loop_with_all_clauses() {
        let (program, reporter) =
            parse("func f() -> int { for (var i int = 0; i < 10; i = i + 1) { } return 0; }");
        assert!(!reporter.has_errors());
        let Declaration::Function(f) = &program.declarations[0] else { panic!() };
        let Stmt::For(s) = &f.body.statements[0] else { panic!() };
        assert!(s.init.is_some());
        assert!(s.cond.is_some());
        assert!(s.update.is_some());
    }

    #[test]
    fn empty_input_yields_empty_program() {
        let (program, reporter) = parse("");
        assert!(!reporter.has_errors());
        assert!(program.declarations.is_empty());
    }

    #[test]
    fn comment_only_input_yields_empty_program() {
        let (program, reporter) = parse("// nothing\n/* also nothing */");
        assert!(!reporter.has_errors());
        assert!(program.declarations.is_empty());
    }
}

#[cfg(test)]
mod proptests {
    use super::tests::*;
    use proptest::prelude::*;

    proptest! {
        /// Parsing never panics on arbitrary token soup, however malformed.
        /// It either yields a program or reports syntax errors.
        #[test]
        fn parsing_is_total(source in "[ -~\\n\\t]{0,200}") {
            let (_program, _reporter) = parse(&source);
        }

        /// Well-formed single-function programs with an integer return
        /// literal always parse with no errors and exactly one declaration.
        #[test]
        fn minimal_function_always_parses_cleanly(n in 0i64..1_000_000) {
            let source = format!("func main() -> int {{ return {n}; }}");
            let (program, reporter) = parse(&source);
            prop_assert!(!reporter.has_errors());
            prop_assert_eq!(program.declarations.len(), 1);
        }
    }
}
