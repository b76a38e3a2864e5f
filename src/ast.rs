//! Parenthesised AST printer backing the `parse` subcommand.

use crate::expr::{Expr, LiteralValue};

pub struct Ast;

impl Ast {
    /// Render an expression in prefix parenthesised form, e.g.
    /// `(* (- 1.0) (group 2.5))`.
    pub fn print(&self, expr: &Expr<'_>) -> String {
        match expr {
            Expr::Binary {
                left,
                operator,
                right,
            }
            | Expr::Logical {
                left,
                operator,
                right,
            } => format!(
                "({} {} {})",
                operator.lexeme,
                self.print(left),
                self.print(right)
            ),

            Expr::Unary { operator, right } => {
                format!("({} {})", operator.lexeme, self.print(right))
            }

            Expr::Literal(literal) => match literal {
                // Integral numbers keep one decimal place so `1` prints
                // as `1.0`, distinguishing the literal from its lexeme.
                LiteralValue::Number(n) => {
                    if n.fract() == 0.0 {
                        format!("{:.1}", n)
                    } else {
                        n.to_string()
                    }
                }

                LiteralValue::Str(s) => s.clone(),

                LiteralValue::True => "true".to_string(),

                LiteralValue::False => "false".to_string(),

                LiteralValue::Nil => "nil".to_string(),
            },

            Expr::Grouping(inner) => format!("(group {})", self.print(inner)),

            Expr::Variable { name, .. } => name.lexeme.to_string(),

            Expr::Assign { name, value, .. } => {
                format!("(= {} {})", name.lexeme, self.print(value))
            }

            Expr::Call {
                callee, arguments, ..
            } => {
                let mut rendered = format!("(call {}", self.print(callee));

                for argument in arguments {
                    rendered.push(' ');
                    rendered.push_str(&self.print(argument));
                }

                rendered.push(')');
                rendered
            }

            Expr::Get { object, name } => {
                format!("(. {} {})", self.print(object), name.lexeme)
            }

            Expr::Set {
                object,
                name,
                value,
            } => format!(
                "(= {} {} {})",
                self.print(object),
                name.lexeme,
                self.print(value)
            ),

            Expr::This { .. } => "this".to_string(),

            Expr::Super { method, .. } => format!("(super {})", method.lexeme),
        }
    }
}
