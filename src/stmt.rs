//! Statement nodes of the AST.  A program is a sequence of these returned by
//! the parser's program mode.

use crate::expr::Expr;
use crate::token::Token;

/// **Abstract‑Syntax‑Tree node** for *statements* (complete executable
/// constructs).
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt<'a> {
    /// Braced scope containing zero or more declarations/statements.
    Block(Vec<Stmt<'a>>),

    /// Class declaration.  `superclass` is always an `Expr::Variable` when
    /// present; `methods` holds `Stmt::Function` entries in declaration order.
    Class {
        name: &'a Token<'a>,
        superclass: Option<Expr<'a>>,
        methods: Vec<Stmt<'a>>,
    },

    /// Stand‑alone expression terminated by a semicolon.
    Expression(Expr<'a>),

    /// Function declaration ‑ becomes a first‑class callable value.
    Function {
        name: &'a Token<'a>,

        /// Parameter name tokens (arity ≤ 255).
        params: Vec<&'a Token<'a>>,

        /// Body executed when the function is called.
        body: Vec<Stmt<'a>>,
    },

    /// `if` / `else` conditional.
    If {
        condition: Expr<'a>,
        then_branch: Box<Stmt<'a>>,
        else_branch: Option<Box<Stmt<'a>>>,
    },

    /// `print` statement used for output.
    Print(Expr<'a>),

    /// `return` statement inside a function body.
    Return {
        /// The `return` keyword token (for diagnostics).
        keyword: &'a Token<'a>,

        /// Optional expression to return.
        /// Absent ⇒ `nil` is returned.
        value: Option<Expr<'a>>,
    },

    /// `break` inside a loop body.
    Break { keyword: &'a Token<'a> },

    /// `continue` inside a loop body.
    Continue { keyword: &'a Token<'a> },

    /// Variable declaration: `"var" IDENT ("=" initializer)? ";"`.
    Var {
        name: &'a Token<'a>,
        initializer: Option<Expr<'a>>,
    },

    /// `while` loop.  `increment` is `None` for source‑level `while`; the
    /// parser's `for` desugaring stores the increment clause here so it runs
    /// after every completed iteration body, `continue` included.
    While {
        condition: Expr<'a>,
        body: Box<Stmt<'a>>,
        increment: Option<Expr<'a>>,
    },
}
