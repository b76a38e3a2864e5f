//! Runtime scope chain.
//!
//! Each `Environment` is one level of name→value bindings plus a link to its
//! enclosing scope (`None` for globals).  Scopes are shared via
//! `Rc<RefCell<_>>` because closures and bound methods retain references to
//! environments that outlive their creating call frame.

use crate::error::{LoxError, Result};
use crate::token::Token;
use crate::value::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

#[derive(Debug, Clone, Default)]
pub struct Environment<'a> {
    values: HashMap<&'a str, Value<'a>>,
    enclosing: Option<Rc<RefCell<Environment<'a>>>>,
}

impl<'a> Environment<'a> {
    pub fn new() -> Self {
        Environment {
            values: HashMap::new(),
            enclosing: None,
        }
    }

    pub fn with_enclosing(enclosing: Rc<RefCell<Environment<'a>>>) -> Self {
        Environment {
            values: HashMap::new(),
            enclosing: Some(enclosing),
        }
    }

    /// Bind `name` in this scope, shadowing or replacing any prior binding.
    /// Always succeeds.
    pub fn define(&mut self, name: &'a str, value: Value<'a>) {
        self.values.insert(name, value);
    }

    /// Name search: this scope first, then outward through the chain.
    pub fn get(&self, name: &Token<'a>) -> Result<Value<'a>> {
        if let Some(value) = self.values.get(name.lexeme) {
            Ok(value.clone())
        } else if let Some(enclosing) = &self.enclosing {
            enclosing.borrow().get(name)
        } else {
            Err(LoxError::runtime(
                name,
                format!("Undefined variable '{}'.", name.lexeme),
            ))
        }
    }

    /// Assign to an existing binding, searching outward like [`get`].
    pub fn assign(&mut self, name: &Token<'a>, value: Value<'a>) -> Result<()> {
        if self.values.contains_key(name.lexeme) {
            self.values.insert(name.lexeme, value);
            Ok(())
        } else if let Some(enclosing) = &self.enclosing {
            enclosing.borrow_mut().assign(name, value)
        } else {
            Err(LoxError::runtime(
                name,
                format!("Undefined variable '{}'.", name.lexeme),
            ))
        }
    }

    /// Walk exactly `distance` enclosing links.  A shorter chain means the
    /// resolver and interpreter disagree about scope structure, which is a
    /// bug in this crate rather than in the user's program.
    fn ancestor(
        this: &Rc<RefCell<Environment<'a>>>,
        distance: usize,
    ) -> Rc<RefCell<Environment<'a>>> {
        let mut env: Rc<RefCell<Environment<'a>>> = this.clone();

        for _ in 0..distance {
            let next = env
                .borrow()
                .enclosing
                .as_ref()
                .expect("scope chain shorter than resolved distance")
                .clone();

            env = next;
        }

        env
    }

    /// Read `name` from the scope exactly `distance` links out, with no
    /// further outward search.  The resolver guarantees presence.
    pub fn get_at(this: &Rc<RefCell<Environment<'a>>>, distance: usize, name: &str) -> Value<'a> {
        Self::ancestor(this, distance)
            .borrow()
            .values
            .get(name)
            .expect("resolved variable missing from its scope")
            .clone()
    }

    /// Write `name` in the scope exactly `distance` links out.
    pub fn assign_at(
        this: &Rc<RefCell<Environment<'a>>>,
        distance: usize,
        name: &'a str,
        value: Value<'a>,
    ) {
        Self::ancestor(this, distance)
            .borrow_mut()
            .values
            .insert(name, value);
    }
}
