//! Static resolution pass.
//!
//! One AST walk between parsing and evaluation that does three things:
//! 1. Builds the lexical scope stack (`HashMap<&str, bool>` per scope, the
//!    bool tracking declared‑but‑not‑yet‑defined).
//! 2. Reports every static error it can find (redeclaration, self‑read in an
//!    initializer, misplaced `return`/`this`/`super`/`break`/`continue`),
//!    accumulating rather than stopping at the first.
//! 3. Feeds scope distances for local references into the interpreter via
//!    [`Interpreter::resolve_local`], keyed by expression id.
//!
//! Globals are deliberately never resolved; the interpreter falls back to a
//! dynamic search of the global scope for ids missing from the map.

use std::collections::HashMap;

use log::debug;

use crate::error::LoxError;
use crate::expr::{Expr, ExprId};
use crate::interpreter::Interpreter;
use crate::stmt::Stmt;
use crate::token::Token;

/// What kind of function body the walk is currently inside.
#[derive(Debug, Clone, Copy, PartialEq)]
enum FunctionType {
    None,
    Function,
    Method,
    Initializer,
}

/// What kind of class body the walk is currently inside.
#[derive(Debug, Clone, Copy, PartialEq)]
enum ClassType {
    None,
    Class,
    Subclass,
}

pub struct Resolver<'i, 'a> {
    interpreter: &'i mut Interpreter<'a>,

    /// Innermost scope last.  The global scope is intentionally absent.
    scopes: Vec<HashMap<&'a str, bool>>,

    current_function: FunctionType,
    current_class: ClassType,

    /// Number of enclosing loops in the current function body.  Reset to
    /// zero across function boundaries so a `break` inside a function
    /// declared in a loop body is still rejected.
    loop_depth: usize,

    errors: Vec<LoxError>,
}

impl<'i, 'a> Resolver<'i, 'a> {
    pub fn new(interpreter: &'i mut Interpreter<'a>) -> Self {
        Self {
            interpreter,
            scopes: Vec::new(),
            current_function: FunctionType::None,
            current_class: ClassType::None,
            loop_depth: 0,
            errors: Vec::new(),
        }
    }

    /// Resolve a whole program, returning every static error found.  An
    /// empty vector means the program is safe to interpret.
    pub fn resolve(mut self, statements: &'a [Stmt<'a>]) -> Vec<LoxError> {
        self.resolve_stmts(statements);

        debug!("resolution finished with {} error(s)", self.errors.len());

        self.errors
    }

    fn resolve_stmts(&mut self, statements: &'a [Stmt<'a>]) {
        for statement in statements {
            self.resolve_stmt(statement);
        }
    }

    fn resolve_stmt(&mut self, statement: &'a Stmt<'a>) {
        match statement {
            Stmt::Block(statements) => {
                self.begin_scope();
                self.resolve_stmts(statements);
                self.end_scope();
            }

            Stmt::Var { name, initializer } => {
                self.declare(name);

                if let Some(initializer) = initializer {
                    self.resolve_expr(initializer);
                }

                self.define(name);
            }

            Stmt::Function { name, params, body } => {
                // Defined eagerly so the body may refer to itself.
                self.declare(name);
                self.define(name);

                self.resolve_function(params, body, FunctionType::Function);
            }

            Stmt::Expression(expression) => self.resolve_expr(expression),

            Stmt::Print(expression) => self.resolve_expr(expression),

            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                self.resolve_expr(condition);
                self.resolve_stmt(then_branch);

                if let Some(else_branch) = else_branch {
                    self.resolve_stmt(else_branch);
                }
            }

            Stmt::While {
                condition,
                body,
                increment,
            } => {
                self.resolve_expr(condition);

                self.loop_depth += 1;

                self.resolve_stmt(body);

                if let Some(increment) = increment {
                    self.resolve_expr(increment);
                }

                self.loop_depth -= 1;
            }

            Stmt::Break { keyword } => {
                if self.loop_depth == 0 {
                    self.error(keyword, "Can't use 'break' outside of a loop.");
                }
            }

            Stmt::Continue { keyword } => {
                if self.loop_depth == 0 {
                    self.error(keyword, "Can't use 'continue' outside of a loop.");
                }
            }

            Stmt::Return { keyword, value } => {
                if self.current_function == FunctionType::None {
                    self.error(keyword, "Can't return from top-level code.");
                }

                if let Some(value) = value {
                    if self.current_function == FunctionType::Initializer {
                        self.error(keyword, "Can't return a value from an initializer.");
                    }

                    self.resolve_expr(value);
                }
            }

            Stmt::Class {
                name,
                superclass,
                methods,
            } => self.resolve_class(name, superclass.as_ref(), methods),
        }
    }

    fn resolve_class(
        &mut self,
        name: &'a Token<'a>,
        superclass: Option<&'a Expr<'a>>,
        methods: &'a [Stmt<'a>],
    ) {
        let enclosing_class = self.current_class;
        self.current_class = ClassType::Class;

        self.declare(name);
        self.define(name);

        if let Some(superclass) = superclass {
            if let Expr::Variable {
                name: superclass_name,
                ..
            } = superclass
            {
                if superclass_name.lexeme == name.lexeme {
                    self.error(superclass_name, "A class can't inherit from itself.");
                }
            }

            self.current_class = ClassType::Subclass;
            self.resolve_expr(superclass);

            // Methods of a subclass resolve `super` one scope outside the
            // `this` scope; mirror the interpreter's closure layout.
            self.begin_scope();
            self.scope_define("super");
        }

        self.begin_scope();
        self.scope_define("this");

        for method in methods {
            if let Stmt::Function { name, params, body } = method {
                let declaration = if name.lexeme == "init" {
                    FunctionType::Initializer
                } else {
                    FunctionType::Method
                };

                self.resolve_function(params, body, declaration);
            }
        }

        self.end_scope();

        if superclass.is_some() {
            self.end_scope();
        }

        self.current_class = enclosing_class;
    }

    fn resolve_function(
        &mut self,
        params: &'a [&'a Token<'a>],
        body: &'a [Stmt<'a>],
        function_type: FunctionType,
    ) {
        let enclosing_function = self.current_function;
        self.current_function = function_type;

        // A loop outside the function does not license `break` inside it.
        let enclosing_loop_depth = self.loop_depth;
        self.loop_depth = 0;

        self.begin_scope();

        for param in params {
            self.declare(param);
            self.define(param);
        }

        self.resolve_stmts(body);

        self.end_scope();

        self.loop_depth = enclosing_loop_depth;
        self.current_function = enclosing_function;
    }

    fn resolve_expr(&mut self, expression: &'a Expr<'a>) {
        match expression {
            Expr::Literal(_) => {}

            Expr::Grouping(inner) => self.resolve_expr(inner),

            Expr::Unary { right, .. } => self.resolve_expr(right),

            Expr::Binary { left, right, .. } | Expr::Logical { left, right, .. } => {
                self.resolve_expr(left);
                self.resolve_expr(right);
            }

            Expr::Variable { id, name } => {
                if let Some(scope) = self.scopes.last() {
                    if scope.get(name.lexeme) == Some(&false) {
                        self.error(name, "Can't read local variable in its own initializer.");
                    }
                }

                self.resolve_local(*id, name);
            }

            Expr::Assign { id, name, value } => {
                self.resolve_expr(value);
                self.resolve_local(*id, name);
            }

            Expr::Call {
                callee, arguments, ..
            } => {
                self.resolve_expr(callee);

                for argument in arguments {
                    self.resolve_expr(argument);
                }
            }

            Expr::Get { object, .. } => self.resolve_expr(object),

            Expr::Set { object, value, .. } => {
                self.resolve_expr(value);
                self.resolve_expr(object);
            }

            Expr::This { id, keyword } => {
                if self.current_class == ClassType::None {
                    self.error(keyword, "Can't use 'this' outside of a class.");
                    return;
                }

                self.resolve_local(*id, keyword);
            }

            Expr::Super { id, keyword, .. } => {
                match self.current_class {
                    ClassType::None => {
                        self.error(keyword, "Can't use 'super' outside of a class.");
                        return;
                    }

                    ClassType::Class => {
                        self.error(keyword, "Can't use 'super' in a class with no superclass.");
                        return;
                    }

                    ClassType::Subclass => {}
                }

                self.resolve_local(*id, keyword);
            }
        }
    }

    fn begin_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    fn end_scope(&mut self) {
        self.scopes.pop();
    }

    /// Mark `name` as existing but not yet usable in the innermost scope.
    /// Redeclaration in the same local scope is an error; globals may be
    /// redeclared freely.
    fn declare(&mut self, name: &'a Token<'a>) {
        let Some(scope) = self.scopes.last_mut() else {
            return;
        };

        if scope.contains_key(name.lexeme) {
            self.error(
                name,
                "Variable with this name already declared in this scope.",
            );
            return;
        }

        scope.insert(name.lexeme, false);
    }

    fn define(&mut self, name: &'a Token<'a>) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.lexeme, true);
        }
    }

    /// Insert an implicit binding (`this` / `super`) that has no declaring
    /// token.
    fn scope_define(&mut self, name: &'a str) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name, true);
        }
    }

    /// Find the nearest scope declaring `name` and hand its distance to the
    /// interpreter.  No hit means the reference is (or will be) global.
    fn resolve_local(&mut self, id: ExprId, name: &Token<'a>) {
        for (distance, scope) in self.scopes.iter().rev().enumerate() {
            if scope.contains_key(name.lexeme) {
                self.interpreter.resolve_local(id, distance);
                return;
            }
        }
    }

    fn error(&mut self, token: &Token<'a>, message: &str) {
        self.errors.push(LoxError::resolve(token, message));
    }
}
