//! Centralised error hierarchy for the **Lox interpreter**.
//!
//! All subsystems (scanner, parser, resolver, runtime, CLI) must convert their
//! internal failure modes into one of the variants defined here.  This enables a
//! uniform `Result<T>` alias throughout the crate and ergonomic inter‑operation
//! with `anyhow`, while still preserving rich diagnostic detail.
//!
//! The module **does not** print diagnostics itself; drivers decide where each
//! category goes (stderr) and which exit status it maps to (65 for lex/parse/
//! resolve, 70 for runtime).

use std::io;
use thiserror::Error;

use log::info;

use crate::token::{Token, TokenType};

/// Canonical error type used throughout the interpreter.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LoxError {
    /// Lexical (scanner) error with source line information.
    #[error("[line {line}] Error: {message}")]
    Lex {
        /// Human‑readable description.
        message: String,

        /// 1‑based line where the error occurred.
        line: usize,
    },

    /// Syntactic (parser) error.  `at` is either empty (error at EOF) or
    /// ` at '<lexeme>'` for the offending token.
    #[error("[line {line}] Error{at}: {message}")]
    Parse {
        message: String,
        line: usize,
        at: String,
    },

    /// Static‑analysis failure reported by the resolver.
    #[error("[line {line} column {column}] Error: {message}")]
    Resolve {
        message: String,
        line: usize,
        column: usize,
    },

    /// Runtime evaluation error, caught only at the top‑level `interpret`
    /// boundary.
    #[error("[line {line} column {column}] Error: {message}")]
    Runtime {
        message: String,
        line: usize,
        column: usize,
    },

    /// Wrapper around `std::io::Error` (transparent).  Enables `?` on I/O ops.
    #[error(transparent)]
    Io(#[from] io::Error),

    /// UTF‑8 decoding failure when ingesting external text.
    #[error(transparent)]
    Utf8(#[from] std::string::FromUtf8Error),
}

impl LoxError {
    /// Helper constructor for the **scanner**.
    pub fn lex<S: Into<String>>(line: usize, msg: S) -> Self {
        let message: String = msg.into();

        info!("Creating Lex error: line={}, msg={}", line, message);

        LoxError::Lex { message, line }
    }

    /// Helper constructor for the **parser**.  Records the offending token's
    /// lexeme so the driver can print `Error at 'x':`; parse errors at EOF
    /// carry no location suffix.
    pub fn parse<S: Into<String>>(token: &Token<'_>, msg: S) -> Self {
        let message: String = msg.into();

        info!("Creating Parse error: line={}, msg={}", token.line, message);

        let at: String = if matches!(token.token_type, TokenType::EOF) {
            String::new()
        } else {
            format!(" at '{}'", token.lexeme)
        };

        LoxError::Parse {
            message,
            line: token.line,
            at,
        }
    }

    /// Helper constructor for the **resolver**.
    pub fn resolve<S: Into<String>>(token: &Token<'_>, msg: S) -> Self {
        let message: String = msg.into();

        info!(
            "Creating Resolve error: line={}, column={}, msg={}",
            token.line, token.column, message
        );

        LoxError::Resolve {
            message,
            line: token.line,
            column: token.column,
        }
    }

    /// Helper constructor for the **interpreter**.
    pub fn runtime<S: Into<String>>(token: &Token<'_>, msg: S) -> Self {
        let message: String = msg.into();

        info!(
            "Creating Runtime error: line={}, column={}, msg={}",
            token.line, token.column, message
        );

        LoxError::Runtime {
            message,
            line: token.line,
            column: token.column,
        }
    }
}

/// Crate‑wide `Result` alias.
pub type Result<T> = std::result::Result<T, LoxError>;
