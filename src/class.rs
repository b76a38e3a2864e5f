//! Class and instance runtime model.
//!
//! A class owns its method table and an optional superclass; method lookup
//! walks the own table first, then the superclass chain (single inheritance,
//! first match wins).  Instances hold a class reference and a mutable field
//! map that starts empty.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::callable::{Callable, LoxFunction};
use crate::error::{LoxError, Result};
use crate::interpreter::Interpreter;
use crate::token::Token;
use crate::value::Value;

pub struct LoxClass<'a> {
    name: &'a Token<'a>,
    superclass: Option<Rc<LoxClass<'a>>>,
    methods: HashMap<&'a str, Rc<LoxFunction<'a>>>,
}

impl<'a> fmt::Debug for LoxClass<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoxClass")
            .field("name", &self.name.lexeme)
            .field(
                "superclass",
                &self.superclass.as_ref().map(|sc| sc.name.lexeme),
            )
            .field("methods", &self.methods.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl<'a> LoxClass<'a> {
    pub fn new(
        name: &'a Token<'a>,
        superclass: Option<Rc<LoxClass<'a>>>,
        methods: HashMap<&'a str, Rc<LoxFunction<'a>>>,
    ) -> Self {
        Self {
            name,
            superclass,
            methods,
        }
    }

    pub fn name(&self) -> &'a Token<'a> {
        self.name
    }

    /// Own table first, then the superclass chain.
    pub fn find_method(&self, name: &str) -> Option<Rc<LoxFunction<'a>>> {
        self.methods.get(name).cloned().or_else(|| {
            self.superclass
                .as_ref()
                .and_then(|superclass| superclass.find_method(name))
        })
    }
}

/// Calling a class constructs an instance; `init`, when declared, runs bound
/// to the new instance and the call always yields the instance itself.
impl<'a> Callable<'a> for Rc<LoxClass<'a>> {
    fn arity(&self) -> usize {
        self.find_method("init").map_or(0, |init| init.arity())
    }

    fn call(
        &self,
        interpreter: &mut Interpreter<'a>,
        arguments: Vec<Value<'a>>,
    ) -> Result<Value<'a>> {
        let instance = Rc::new(RefCell::new(LoxInstance::new(self.clone())));

        if let Some(init) = self.find_method("init") {
            init.bind(Value::Instance(instance.clone()))
                .call(interpreter, arguments)?;
        }

        Ok(Value::Instance(instance))
    }
}

pub struct LoxInstance<'a> {
    class: Rc<LoxClass<'a>>,
    fields: HashMap<&'a str, Value<'a>>,
}

impl<'a> fmt::Debug for LoxInstance<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoxInstance")
            .field("class", &self.class.name.lexeme)
            .field("fields", &self.fields.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl<'a> LoxInstance<'a> {
    pub fn new(class: Rc<LoxClass<'a>>) -> Self {
        Self {
            class,
            fields: HashMap::new(),
        }
    }

    pub fn class(&self) -> &Rc<LoxClass<'a>> {
        &self.class
    }

    /// Property lookup: fields shadow methods; method hits are bound to the
    /// receiving instance before being returned.
    pub fn get(this: &Rc<RefCell<LoxInstance<'a>>>, name: &Token<'a>) -> Result<Value<'a>> {
        if let Some(value) = this.borrow().fields.get(name.lexeme) {
            return Ok(value.clone());
        }

        if let Some(method) = this.borrow().class.find_method(name.lexeme) {
            return Ok(Value::Function(Rc::new(
                method.bind(Value::Instance(this.clone())),
            )));
        }

        Err(LoxError::runtime(
            name,
            format!("Undefined property '{}'", name.lexeme),
        ))
    }

    /// Fields are created on first write; no declaration step exists.
    pub fn set(&mut self, name: &Token<'a>, value: Value<'a>) {
        self.fields.insert(name.lexeme, value);
    }
}
