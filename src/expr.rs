//! Expression nodes of the AST.
//!
//! The tree is built once by the parser and never mutated afterwards; every
//! node that names a lexical binding (`Variable`, `Assign`, `This`, `Super`)
//! carries a parser‑issued [`ExprId`] so the resolver can attach a scope
//! distance out‑of‑band without touching the node itself.

use serde::Serialize;

use crate::token::Token;

/// Identity of a resolvable expression node, issued by the parser from a
/// monotonic counter.  The interpreter's resolution map is keyed by this; an
/// id absent from the map denotes a global reference.
pub type ExprId = usize;

/// A **literal constant** that appears directly in the source code.
///
/// These variants are the *terminal leaves* of the expression tree and
/// therefore do **not** retain a reference to the originating [`Token`].
/// The parser copies (or converts) the value at parse‑time so literal
/// evaluation never re‑inspects tokens.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum LiteralValue {
    /// Numeric literal ‑ stored as IEEE‑754 `f64`.
    /// Integral lexemes such as `"3"` are still parsed as `3.0`.
    Number(f64),

    /// String literal without surrounding quotes.
    Str(String),

    /// The boolean constant `true`.
    True,

    /// The boolean constant `false`.
    False,

    /// The `nil` literal (Lox's `null`).
    Nil,
}

/// **Abstract‑Syntax‑Tree node** representing every kind of *expression*
/// in Lox.  Lifetimes ‑`'a` tie nodes that contain token references back
/// to the borrowed token slice held by the parser.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr<'a> {
    /// Assignment expression: `identifier "=" expression`
    Assign {
        id: ExprId,
        name: &'a Token<'a>,
        value: Box<Expr<'a>>,
    },

    /// Infix binary operator expression
    /// *Example:* `a + b`, `x <= y`
    Binary {
        left: Box<Expr<'a>>,
        /// Operator token such as `+`, `*`, `==`, …
        operator: &'a Token<'a>,
        right: Box<Expr<'a>>,
    },

    /// Function‑ or method‑call expression
    /// *Example:* `clock()` or `add(1, 2)`
    Call {
        /// Expression that evaluates to a callable (variable, property, etc.).
        callee: Box<Expr<'a>>,
        /// The closing `)` token ‑ retained for error reporting.
        paren: &'a Token<'a>,
        /// Argument list (may be empty).
        arguments: Vec<Expr<'a>>,
    },

    /// Property access: `object.property`
    Get {
        object: Box<Expr<'a>>,
        name: &'a Token<'a>,
    },

    /// Parenthesised sub‑expression: `"(" expression ")"`.
    Grouping(Box<Expr<'a>>),

    /// A literal constant: number, string, `true`, `false`, or `nil`.
    Literal(LiteralValue),

    /// Short‑circuiting logical operators `and` / `or`.
    Logical {
        left: Box<Expr<'a>>,
        operator: &'a Token<'a>, // `AND` or `OR`
        right: Box<Expr<'a>>,
    },

    /// Property assignment: `object.property = value`
    Set {
        object: Box<Expr<'a>>,
        name: &'a Token<'a>,
        value: Box<Expr<'a>>,
    },

    /// The `super.method` expression inside a subclass method.
    Super {
        id: ExprId,
        keyword: &'a Token<'a>,
        method: &'a Token<'a>,
    },

    /// The `this` keyword inside a method.
    This {
        id: ExprId,
        keyword: &'a Token<'a>,
    },

    /// Prefix unary operator expression
    /// *Example:* `!isReady` or `-42`
    Unary {
        /// The operator token (`!` or `-`).
        operator: &'a Token<'a>,
        /// Operand to which the operator is applied.
        right: Box<Expr<'a>>,
    },

    /// Variable access ‑ resolves to the identifier's current value at runtime.
    Variable {
        id: ExprId,
        name: &'a Token<'a>,
    },
}
