//! Runtime values.
//!
//! `Display` is the canonical stringification used by `print` and the
//! `evaluate` subcommand: `nil`, lowercase booleans, numbers with a
//! fractionless value printed as integers (`{:.0}`) and everything else with
//! Rust's shortest‑roundtrip `f64` formatting.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::callable::LoxFunction;
use crate::class::{LoxClass, LoxInstance};

#[derive(Debug, Clone)]
pub enum Value<'a> {
    Nil,

    Bool(bool),

    Number(f64),

    String(String),

    NativeFunction {
        name: &'static str,
        arity: usize,
        func: fn(&[Value<'a>]) -> Result<Value<'a>, String>,
    },

    Function(Rc<LoxFunction<'a>>),

    Class(Rc<LoxClass<'a>>),

    Instance(Rc<RefCell<LoxInstance<'a>>>),
}

impl<'a> PartialEq for Value<'a> {
    /// Value equality for primitives, identity for functions, classes and
    /// instances.  `nil` is equal only to `nil`; there is no cross‑type
    /// coercion.
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
            (Value::Class(a), Value::Class(b)) => Rc::ptr_eq(a, b),
            (Value::Instance(a), Value::Instance(b)) => Rc::ptr_eq(a, b),
            (
                Value::NativeFunction { name: a, .. },
                Value::NativeFunction { name: b, .. },
            ) => a == b,
            _ => false,
        }
    }
}

impl<'a> fmt::Display for Value<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "nil"),

            Value::Bool(b) => write!(f, "{}", b),

            Value::Number(n) => {
                if n.fract() == 0.0 {
                    write!(f, "{:.0}", n)
                } else {
                    write!(f, "{}", n)
                }
            }

            Value::String(s) => write!(f, "{}", s),

            Value::NativeFunction { name, .. } => write!(f, "<native fn {}>", name),

            Value::Function(function) => write!(f, "<fn {}>", function.name().lexeme),

            Value::Class(class) => write!(f, "{}", class.name().lexeme),

            Value::Instance(instance) => {
                write!(f, "{} instance", instance.borrow().class().name().lexeme)
            }
        }
    }
}
