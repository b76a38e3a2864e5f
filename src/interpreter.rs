//! Tree‑walking evaluator.
//!
//! Statements execute for effect and yield a [`Signal`] describing how
//! control left them; expressions evaluate to a [`Value`].  Non‑local control
//! flow (`return`, `break`, `continue`) travels as ordinary `Ok` payloads, so
//! `?` stays reserved for genuine runtime errors.
//!
//! Variable references resolved by the resolver are read through
//! `Environment::get_at` with a fixed scope distance; anything absent from
//! the resolution map is a global and goes through the dynamic chain search.

use std::cell::RefCell;
use std::collections::HashMap;
use std::io::{self, Write};
use std::mem;
use std::rc::Rc;
use std::time::{SystemTime, UNIX_EPOCH};

use log::debug;

use crate::callable::{Callable, LoxFunction};
use crate::class::{LoxClass, LoxInstance};
use crate::environment::Environment;
use crate::error::{LoxError, Result};
use crate::expr::{Expr, ExprId, LiteralValue};
use crate::stmt::Stmt;
use crate::token::{Token, TokenType};
use crate::value::Value;

/// How control left a statement.
#[derive(Debug)]
pub enum Signal<'a> {
    /// Ran to completion; the next statement in sequence executes.
    Normal,

    /// A `return` is unwinding towards the nearest enclosing function call.
    Return(Value<'a>),

    /// A `break` is unwinding towards the nearest enclosing loop.
    Break,

    /// A `continue` is unwinding towards the nearest enclosing loop, which
    /// runs its increment clause (if any) and re‑tests its condition.
    Continue,
}

fn clock_native<'a>(_args: &[Value<'a>]) -> std::result::Result<Value<'a>, String> {
    let elapsed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|err| err.to_string())?;

    Ok(Value::Number(elapsed.as_secs_f64()))
}

pub struct Interpreter<'a> {
    /// Outermost scope; holds native functions and top‑level definitions.
    globals: Rc<RefCell<Environment<'a>>>,

    /// Scope the next statement executes in.
    environment: Rc<RefCell<Environment<'a>>>,

    /// Resolver output: expression id → scope distance.  Ids absent here are
    /// global references.
    locals: HashMap<ExprId, usize>,

    /// Sink for `print`; stdout in the CLI, a capture buffer in tests.
    out: Box<dyn Write>,
}

impl<'a> Default for Interpreter<'a> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> Interpreter<'a> {
    pub fn new() -> Self {
        Self::with_output(Box::new(io::stdout()))
    }

    pub fn with_output(out: Box<dyn Write>) -> Self {
        let globals = Rc::new(RefCell::new(Environment::new()));

        globals.borrow_mut().define(
            "clock",
            Value::NativeFunction {
                name: "clock",
                arity: 0,
                func: clock_native,
            },
        );

        Self {
            environment: globals.clone(),
            globals,
            locals: HashMap::new(),
            out,
        }
    }

    /// Record the resolver's verdict for one expression occurrence:
    /// `distance` enclosing scopes separate the use from its declaration.
    pub fn resolve_local(&mut self, id: ExprId, distance: usize) {
        self.locals.insert(id, distance);
    }

    /// Run a whole program.  The first runtime error aborts execution and is
    /// returned to the driver.
    pub fn interpret(&mut self, statements: &'a [Stmt<'a>]) -> Result<()> {
        debug!("interpreting {} top-level statements", statements.len());

        for statement in statements {
            self.execute(statement)?;
        }

        Ok(())
    }

    /// Evaluate a single expression for the `evaluate` subcommand.
    pub fn evaluate_expression(&mut self, expression: &'a Expr<'a>) -> Result<Value<'a>> {
        self.evaluate(expression)
    }

    fn execute(&mut self, statement: &'a Stmt<'a>) -> Result<Signal<'a>> {
        match statement {
            Stmt::Expression(expression) => {
                self.evaluate(expression)?;

                Ok(Signal::Normal)
            }

            Stmt::Print(expression) => {
                let value = self.evaluate(expression)?;

                writeln!(self.out, "{value}")?;

                Ok(Signal::Normal)
            }

            Stmt::Var { name, initializer } => {
                let value = match initializer {
                    Some(expression) => self.evaluate(expression)?,
                    None => Value::Nil,
                };

                self.environment.borrow_mut().define(name.lexeme, value);

                Ok(Signal::Normal)
            }

            Stmt::Block(statements) => {
                let scope = Environment::with_enclosing(self.environment.clone());

                self.execute_block(statements, Rc::new(RefCell::new(scope)))
            }

            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                if Self::is_truthy(&self.evaluate(condition)?) {
                    self.execute(then_branch)
                } else if let Some(else_branch) = else_branch {
                    self.execute(else_branch)
                } else {
                    Ok(Signal::Normal)
                }
            }

            Stmt::While {
                condition,
                body,
                increment,
            } => {
                while Self::is_truthy(&self.evaluate(condition)?) {
                    match self.execute(body)? {
                        // `continue` still runs the for-loop increment; only
                        // `break` skips it.
                        Signal::Normal | Signal::Continue => {
                            if let Some(increment) = increment {
                                self.evaluate(increment)?;
                            }
                        }

                        Signal::Break => break,

                        signal @ Signal::Return(_) => return Ok(signal),
                    }
                }

                Ok(Signal::Normal)
            }

            Stmt::Break { .. } => Ok(Signal::Break),

            Stmt::Continue { .. } => Ok(Signal::Continue),

            Stmt::Return { value, .. } => {
                let value = match value {
                    Some(expression) => self.evaluate(expression)?,
                    None => Value::Nil,
                };

                Ok(Signal::Return(value))
            }

            Stmt::Function { name, params, body } => {
                let function = LoxFunction::new(
                    name,
                    params.as_slice(),
                    body.as_slice(),
                    self.environment.clone(),
                    false,
                );

                self.environment
                    .borrow_mut()
                    .define(name.lexeme, Value::Function(Rc::new(function)));

                Ok(Signal::Normal)
            }

            Stmt::Class {
                name,
                superclass,
                methods,
            } => self.execute_class(name, superclass.as_ref(), methods),
        }
    }

    fn execute_class(
        &mut self,
        name: &'a Token<'a>,
        superclass: Option<&'a Expr<'a>>,
        methods: &'a [Stmt<'a>],
    ) -> Result<Signal<'a>> {
        let superclass_value = match superclass {
            Some(expression) => match self.evaluate(expression)? {
                Value::Class(class) => Some(class),

                _ => {
                    let token = match expression {
                        Expr::Variable { name, .. } => *name,
                        _ => name,
                    };

                    return Err(LoxError::runtime(token, "Superclass must be a class."));
                }
            },

            None => None,
        };

        // Pre-declare so methods can close over the class name before the
        // class value exists.
        self.environment.borrow_mut().define(name.lexeme, Value::Nil);

        // Methods of a subclass close over an extra scope binding `super`.
        let method_closure = match &superclass_value {
            Some(superclass) => {
                let mut scope = Environment::with_enclosing(self.environment.clone());

                scope.define("super", Value::Class(superclass.clone()));

                Rc::new(RefCell::new(scope))
            }

            None => self.environment.clone(),
        };

        let mut method_table = HashMap::new();

        for method in methods {
            if let Stmt::Function { name, params, body } = method {
                let function = LoxFunction::new(
                    name,
                    params.as_slice(),
                    body.as_slice(),
                    method_closure.clone(),
                    name.lexeme == "init",
                );

                method_table.insert(name.lexeme, Rc::new(function));
            }
        }

        let class = Rc::new(LoxClass::new(name, superclass_value, method_table));

        self.environment
            .borrow_mut()
            .assign(name, Value::Class(class))?;

        Ok(Signal::Normal)
    }

    /// Run `statements` in `environment`, restoring the previous scope no
    /// matter how the block exits.
    pub fn execute_block(
        &mut self,
        statements: &'a [Stmt<'a>],
        environment: Rc<RefCell<Environment<'a>>>,
    ) -> Result<Signal<'a>> {
        let previous = mem::replace(&mut self.environment, environment);

        let mut outcome = Ok(Signal::Normal);

        for statement in statements {
            match self.execute(statement) {
                Ok(Signal::Normal) => {}

                other => {
                    outcome = other;
                    break;
                }
            }
        }

        self.environment = previous;

        outcome
    }

    fn evaluate(&mut self, expression: &'a Expr<'a>) -> Result<Value<'a>> {
        match expression {
            Expr::Literal(literal) => Ok(match literal {
                LiteralValue::Number(n) => Value::Number(*n),
                LiteralValue::Str(s) => Value::String(s.clone()),
                LiteralValue::True => Value::Bool(true),
                LiteralValue::False => Value::Bool(false),
                LiteralValue::Nil => Value::Nil,
            }),

            Expr::Grouping(inner) => self.evaluate(inner),

            Expr::Unary { operator, right } => {
                let right = self.evaluate(right)?;

                match operator.token_type {
                    TokenType::MINUS => match right {
                        Value::Number(n) => Ok(Value::Number(-n)),
                        _ => Err(LoxError::runtime(operator, "Operand must be a number.")),
                    },

                    TokenType::BANG => Ok(Value::Bool(!Self::is_truthy(&right))),

                    _ => unreachable!("parser emitted a non-unary operator"),
                }
            }

            Expr::Binary {
                left,
                operator,
                right,
            } => {
                let left = self.evaluate(left)?;
                let right = self.evaluate(right)?;

                self.binary_op(left, operator, right)
            }

            Expr::Logical {
                left,
                operator,
                right,
            } => {
                let left = self.evaluate(left)?;

                let short_circuits = match operator.token_type {
                    TokenType::OR => Self::is_truthy(&left),
                    TokenType::AND => !Self::is_truthy(&left),
                    _ => unreachable!("parser emitted a non-logical operator"),
                };

                if short_circuits {
                    Ok(left)
                } else {
                    self.evaluate(right)
                }
            }

            Expr::Variable { id, name } => self.look_up_variable(name, *id),

            Expr::This { id, keyword } => self.look_up_variable(keyword, *id),

            Expr::Assign { id, name, value } => {
                let value = self.evaluate(value)?;

                match self.locals.get(id) {
                    Some(distance) => {
                        Environment::assign_at(
                            &self.environment,
                            *distance,
                            name.lexeme,
                            value.clone(),
                        );
                    }

                    None => self.globals.borrow_mut().assign(name, value.clone())?,
                }

                Ok(value)
            }

            Expr::Call {
                callee,
                paren,
                arguments,
            } => {
                let callee = self.evaluate(callee)?;

                let mut args = Vec::with_capacity(arguments.len());

                for argument in arguments {
                    args.push(self.evaluate(argument)?);
                }

                self.call_value(callee, args, paren)
            }

            Expr::Get { object, name } => match self.evaluate(object)? {
                Value::Instance(instance) => LoxInstance::get(&instance, name),

                _ => Err(LoxError::runtime(name, "Only instances have properties.")),
            },

            Expr::Set {
                object,
                name,
                value,
            } => match self.evaluate(object)? {
                Value::Instance(instance) => {
                    let value = self.evaluate(value)?;

                    instance.borrow_mut().set(name, value.clone());

                    Ok(value)
                }

                _ => Err(LoxError::runtime(name, "Only instances have properties.")),
            },

            Expr::Super {
                id,
                keyword,
                method,
            } => {
                // Expression mode runs without the resolver, so `super` can
                // legitimately be missing from the resolution map here.
                let Some(&distance) = self.locals.get(id) else {
                    return Err(LoxError::runtime(
                        keyword,
                        "Can't use 'super' outside of a class.",
                    ));
                };

                let superclass = match Environment::get_at(&self.environment, distance, "super") {
                    Value::Class(class) => class,
                    _ => unreachable!("'super' bound to a non-class value"),
                };

                // `this` lives one scope inside the one holding `super`.
                let instance = Environment::get_at(&self.environment, distance - 1, "this");

                let function = superclass.find_method(method.lexeme).ok_or_else(|| {
                    LoxError::runtime(keyword, format!("Undefined property '{}'", method.lexeme))
                })?;

                Ok(Value::Function(Rc::new(function.bind(instance))))
            }
        }
    }

    fn call_value(
        &mut self,
        callee: Value<'a>,
        arguments: Vec<Value<'a>>,
        paren: &'a Token<'a>,
    ) -> Result<Value<'a>> {
        let arity = match &callee {
            Value::Function(function) => function.arity(),
            Value::Class(class) => class.arity(),
            Value::NativeFunction { arity, .. } => *arity,

            _ => {
                return Err(LoxError::runtime(
                    paren,
                    "Can only call functions and classes.",
                ))
            }
        };

        if arguments.len() != arity {
            return Err(LoxError::runtime(
                paren,
                format!("Expected {} arguments but got {}.", arity, arguments.len()),
            ));
        }

        match callee {
            Value::Function(function) => function.call(self, arguments),

            Value::Class(class) => class.call(self, arguments),

            Value::NativeFunction { func, .. } => {
                (func)(&arguments).map_err(|message| LoxError::runtime(paren, message))
            }

            _ => unreachable!("arity dispatch already rejected non-callables"),
        }
    }

    fn binary_op(
        &self,
        left: Value<'a>,
        operator: &'a Token<'a>,
        right: Value<'a>,
    ) -> Result<Value<'a>> {
        match operator.token_type {
            TokenType::PLUS => match (left, right) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),

                (Value::String(a), Value::String(b)) => Ok(Value::String(a + &b)),

                _ => Err(LoxError::runtime(
                    operator,
                    "Operands must be either two numbers or two strings.",
                )),
            },

            TokenType::MINUS => match (left, right) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a - b)),
                _ => Err(LoxError::runtime(operator, "Operands must be numbers.")),
            },

            TokenType::STAR => match (left, right) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a * b)),
                _ => Err(LoxError::runtime(operator, "Operands must be numbers.")),
            },

            TokenType::SLASH => match (left, right) {
                (Value::Number(_), Value::Number(b)) if b == 0.0 => {
                    Err(LoxError::runtime(operator, "Divide by 0 detected."))
                }

                (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a / b)),

                _ => Err(LoxError::runtime(operator, "Operands must be numbers.")),
            },

            TokenType::GREATER => match (left, right) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Bool(a > b)),
                _ => Err(LoxError::runtime(operator, "Operands must be numbers.")),
            },

            TokenType::GREATER_EQUAL => match (left, right) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Bool(a >= b)),
                _ => Err(LoxError::runtime(operator, "Operands must be numbers.")),
            },

            TokenType::LESS => match (left, right) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Bool(a < b)),
                _ => Err(LoxError::runtime(operator, "Operands must be numbers.")),
            },

            TokenType::LESS_EQUAL => match (left, right) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Bool(a <= b)),
                _ => Err(LoxError::runtime(operator, "Operands must be numbers.")),
            },

            TokenType::EQUAL_EQUAL => Ok(Value::Bool(left == right)),

            TokenType::BANG_EQUAL => Ok(Value::Bool(left != right)),

            _ => unreachable!("parser emitted a non-binary operator"),
        }
    }

    fn look_up_variable(&self, name: &'a Token<'a>, id: ExprId) -> Result<Value<'a>> {
        match self.locals.get(&id) {
            Some(distance) => Ok(Environment::get_at(
                &self.environment,
                *distance,
                name.lexeme,
            )),

            None => self.globals.borrow().get(name),
        }
    }

    /// `false` and `nil` are falsey; every other value is truthy.
    fn is_truthy(value: &Value<'a>) -> bool {
        !matches!(value, Value::Nil | Value::Bool(false))
    }
}
