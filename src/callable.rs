//! Invocable runtime values.
//!
//! `Callable` is the seam shared by user functions and classes‑as‑constructors
//! (natives are dispatched inline by the interpreter since they carry a plain
//! fn pointer).  `LoxFunction` pairs a function declaration with the
//! environment captured at its definition; binding a method produces a new
//! function value whose closure chain starts with a fresh one‑entry `this`
//! scope, leaving the original untouched.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::environment::Environment;
use crate::error::Result;
use crate::interpreter::{Interpreter, Signal};
use crate::stmt::Stmt;
use crate::token::Token;
use crate::value::Value;

/// Polymorphic invocation contract: a fixed arity plus a call operation run
/// against the interpreter.
pub trait Callable<'a> {
    fn arity(&self) -> usize;

    fn call(
        &self,
        interpreter: &mut Interpreter<'a>,
        arguments: Vec<Value<'a>>,
    ) -> Result<Value<'a>>;
}

/// A user‑defined function or method: declaration parts borrowed from the
/// AST, plus the closure environment captured at definition time.
#[derive(Clone)]
pub struct LoxFunction<'a> {
    name: &'a Token<'a>,
    params: &'a [&'a Token<'a>],
    body: &'a [Stmt<'a>],
    closure: Rc<RefCell<Environment<'a>>>,
    is_initializer: bool,
}

impl<'a> fmt::Debug for LoxFunction<'a> {
    // Closures can point back at environments holding this very function, so
    // the derived impl would recurse; print the identity only.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoxFunction")
            .field("name", &self.name.lexeme)
            .field("arity", &self.params.len())
            .field("is_initializer", &self.is_initializer)
            .finish()
    }
}

impl<'a> LoxFunction<'a> {
    pub fn new(
        name: &'a Token<'a>,
        params: &'a [&'a Token<'a>],
        body: &'a [Stmt<'a>],
        closure: Rc<RefCell<Environment<'a>>>,
        is_initializer: bool,
    ) -> Self {
        Self {
            name,
            params,
            body,
            closure,
            is_initializer,
        }
    }

    pub fn name(&self) -> &'a Token<'a> {
        self.name
    }

    /// Produce a copy of this function whose closure chain starts with a
    /// fresh scope binding `this` to `instance`.  The receiver is not
    /// mutated; every bind yields an independent bound method.
    pub fn bind(&self, instance: Value<'a>) -> LoxFunction<'a> {
        let mut environment = Environment::with_enclosing(self.closure.clone());
        environment.define("this", instance);

        LoxFunction {
            closure: Rc::new(RefCell::new(environment)),
            ..self.clone()
        }
    }

    /// The instance an initializer is bound to (`this` lives in the scope
    /// directly in front of the method body's closure).
    fn bound_this(&self) -> Value<'a> {
        Environment::get_at(&self.closure, 0, "this")
    }
}

impl<'a> Callable<'a> for LoxFunction<'a> {
    fn arity(&self) -> usize {
        self.params.len()
    }

    fn call(
        &self,
        interpreter: &mut Interpreter<'a>,
        arguments: Vec<Value<'a>>,
    ) -> Result<Value<'a>> {
        let mut environment = Environment::with_enclosing(self.closure.clone());

        for (param, argument) in self.params.iter().zip(arguments) {
            environment.define(param.lexeme, argument);
        }

        let signal = interpreter.execute_block(self.body, Rc::new(RefCell::new(environment)))?;

        match signal {
            Signal::Return(value) => {
                // `return;` inside init still yields the instance; the
                // resolver already rejected `return <value>` there.
                if self.is_initializer {
                    Ok(self.bound_this())
                } else {
                    Ok(value)
                }
            }

            Signal::Normal => {
                if self.is_initializer {
                    Ok(self.bound_this())
                } else {
                    Ok(Value::Nil)
                }
            }

            Signal::Break | Signal::Continue => {
                unreachable!("loop control signal escaped a function body")
            }
        }
    }
}
