pub mod environment;
pub mod value;

use crate::interpreter::environment::Environment;
use crate::interpreter::value::{Function, Value};
use crate::parser::ast::{BinOp, CmpOp, Expr, ExprKind, LogicOp, Program, Stmt, StmtKind, UnaryOp};
use crate::span::Span;
use std::cmp::Ordering;
use std::io::{self, Write};
use std::rc::Rc;

// Early return travels as a control-flow result, not a host exception. It is
// NOT public because the outside world only ever sees collapsed values.
#[derive(Debug, Clone)]
enum ControlFlow {
    Value(Value),
    Return(Value),
}

// prevent having to wrap all those values with ControlFlow::Value! Annoying.
// With this, it's just an extra .into()
impl From<Value> for ControlFlow {
    fn from(v: Value) -> Self {
        ControlFlow::Value(v)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeErrorKind {
    Name,
    Type,
    Arity,
    Arithmetic,
    Internal,
}

impl RuntimeErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuntimeErrorKind::Name => "NameError",
            RuntimeErrorKind::Type => "TypeError",
            RuntimeErrorKind::Arity => "ArityError",
            RuntimeErrorKind::Arithmetic => "ArithmeticError",
            RuntimeErrorKind::Internal => "InternalError",
        }
    }
}

#[derive(Debug, Clone)]
pub struct RuntimeError {
    pub kind: RuntimeErrorKind,
    pub span: Span,
    pub message: String,
}

impl RuntimeError {
    fn new(kind: RuntimeErrorKind, span: Span, message: impl Into<String>) -> Self {
        Self {
            kind,
            span,
            message: message.into(),
        }
    }
}

pub struct Interpreter {
    env: Rc<Environment>,
    globals: Rc<Environment>,
    out: Box<dyn Write>,
}

// Propagate control flow, discard value
macro_rules! prop {
    ($expr:expr) => {
        match $expr? {
            ControlFlow::Value(_) => {}
            other => return Ok(other),
        }
    };
}

// Propagate control flow, extract value
macro_rules! prop_val {
    ($expr:expr) => {
        match $expr? {
            ControlFlow::Value(v) => v,
            other => return Ok(other),
        }
    };
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    pub fn new() -> Self {
        Self::with_output(Box::new(io::stdout()))
    }

    /// Print statements write to `out`; tests pass a shared buffer here.
    pub fn with_output(out: Box<dyn Write>) -> Self {
        let globals = Rc::new(Environment::new());
        Self {
            env: Rc::clone(&globals),
            globals,
            out,
        }
    }

    pub fn interpret(&mut self, program: &Program) -> Result<Value, RuntimeError> {
        let mut last = Value::Null;
        for stmt in &program.statements {
            match self.execute_statement(stmt)? {
                ControlFlow::Value(v) => last = v,
                // a return signal escaping the last call boundary is a bug,
                // not a program result
                ControlFlow::Return(_) => {
                    return Err(RuntimeError::new(
                        RuntimeErrorKind::Internal,
                        stmt.span,
                        "return outside of a function",
                    ));
                }
            }
        }
        Ok(last)
    }

    fn execute_statement(&mut self, statement: &Stmt) -> Result<ControlFlow, RuntimeError> {
        match &statement.kind {
            StmtKind::Assign { name, value } => {
                let value = self.evaluate_expression(value)?;
                self.env.assign(name, value.clone());
                Ok(value.into())
            }

            StmtKind::Print(expr) => {
                let value = self.evaluate_expression(expr)?;
                writeln!(self.out, "{}", value).map_err(|e| {
                    RuntimeError::new(
                        RuntimeErrorKind::Internal,
                        statement.span,
                        format!("failed to write output: {}", e),
                    )
                })?;
                Ok(value.into())
            }

            StmtKind::Block(statements) => {
                let previous = Rc::clone(&self.env);
                self.env = Rc::new(Environment::new_with_enclosing(Rc::clone(&previous)));

                let result = (|| {
                    let mut last = Value::Null;
                    for stmt in statements {
                        last = prop_val!(self.execute_statement(stmt));
                    }
                    Ok(last.into())
                })();

                self.env = previous;
                result
            }

            StmtKind::If {
                condition,
                then_branch,
                else_branch,
            } => {
                let condition = self.evaluate_expression(condition)?;
                if condition.is_truthy() {
                    self.execute_statement(then_branch)
                } else {
                    match else_branch {
                        Some(stmt) => self.execute_statement(stmt),
                        None => Ok(Value::Null.into()),
                    }
                }
            }

            StmtKind::While { condition, body } => {
                while self.evaluate_expression(condition)?.is_truthy() {
                    prop!(self.execute_statement(body));
                }
                Ok(Value::Null.into())
            }

            StmtKind::FunDef { name, params, body } => {
                let function = Value::Fn(Rc::new(Function {
                    name: name.clone(),
                    params: params.clone(),
                    body: Rc::clone(body),
                }));
                // current scope, not the root: functions can be registered at
                // any depth
                self.env.define(name.clone(), function);
                Ok(Value::Null.into())
            }

            StmtKind::Return(value) => {
                let value = match value {
                    Some(expr) => self.evaluate_expression(expr)?,
                    None => Value::Null,
                };
                Ok(ControlFlow::Return(value))
            }

            StmtKind::ExprStmt(expr) => Ok(self.evaluate_expression(expr)?.into()),
        }
    }

    // Expressions cannot unwind: a return inside a called function is
    // collapsed at that call's boundary, so plain values suffice here.
    fn evaluate_expression(&mut self, expression: &Expr) -> Result<Value, RuntimeError> {
        match &expression.kind {
            ExprKind::Int(n) => Ok(Value::Int(*n)),
            ExprKind::Float(x) => Ok(Value::Float(*x)),
            ExprKind::Str(s) => Ok(Value::Str(s.clone())),
            ExprKind::Bool(b) => Ok(Value::Bool(*b)),

            ExprKind::Var(name) => self.env.get(name).ok_or_else(|| {
                RuntimeError::new(
                    RuntimeErrorKind::Name,
                    expression.span,
                    format!("undefined variable '{}'", name),
                )
            }),

            ExprKind::Unary { operator, operand } => {
                let operand = self.evaluate_expression(operand)?;
                match (operator, operand) {
                    (UnaryOp::Not, v) => Ok(Value::Bool(!v.is_truthy())),
                    (UnaryOp::Neg, Value::Int(n)) => int_result(n.checked_neg(), expression.span),
                    (UnaryOp::Neg, Value::Float(x)) => Ok(Value::Float(-x)),
                    (UnaryOp::Neg, v) => Err(RuntimeError::new(
                        RuntimeErrorKind::Type,
                        expression.span,
                        format!("cannot negate a {}", v.type_name()),
                    )),
                }
            }

            ExprKind::Binary {
                left,
                operator,
                right,
            } => {
                let left = self.evaluate_expression(left)?;
                let right = self.evaluate_expression(right)?;
                apply_binary(*operator, left, right, expression.span)
            }

            ExprKind::Compare {
                left,
                operator,
                right,
            } => {
                let left = self.evaluate_expression(left)?;
                let right = self.evaluate_expression(right)?;
                apply_compare(*operator, left, right, expression.span)
            }

            // No short-circuit: both sides always evaluate, then the operator
            // selects an operand by truthiness.
            ExprKind::Logical {
                left,
                operator,
                right,
            } => {
                let left = self.evaluate_expression(left)?;
                let right = self.evaluate_expression(right)?;
                Ok(match operator {
                    LogicOp::And => {
                        if left.is_truthy() {
                            right
                        } else {
                            left
                        }
                    }
                    LogicOp::Or => {
                        if left.is_truthy() {
                            left
                        } else {
                            right
                        }
                    }
                })
            }

            ExprKind::Call { name, arguments } => {
                let callee = self.env.get(name).ok_or_else(|| {
                    RuntimeError::new(
                        RuntimeErrorKind::Name,
                        expression.span,
                        format!("undefined variable '{}'", name),
                    )
                })?;

                let mut argument_values = Vec::with_capacity(arguments.len());
                for arg in arguments {
                    argument_values.push(self.evaluate_expression(arg)?);
                }

                self.call_function(&callee, argument_values, expression.span)
            }
        }
    }

    fn call_function(
        &mut self,
        callee: &Value,
        args: Vec<Value>,
        span: Span,
    ) -> Result<Value, RuntimeError> {
        let Value::Fn(fun) = callee else {
            return Err(RuntimeError::new(
                RuntimeErrorKind::Type,
                span,
                format!("'{}' is not a function", callee),
            ));
        };

        if fun.params.len() != args.len() {
            return Err(RuntimeError::new(
                RuntimeErrorKind::Arity,
                span,
                format!(
                    "function '{}' expects {} arguments, but got {}",
                    fun.name,
                    fun.params.len(),
                    args.len()
                ),
            ));
        }

        // Call frames chain to the globals: functions are captured by name,
        // so a body's free names resolve against the global scope no matter
        // where the call happens.
        let call_env = Rc::new(Environment::new_with_enclosing(Rc::clone(&self.globals)));
        for (param, arg) in fun.params.iter().zip(args) {
            call_env.define(param.clone(), arg);
        }

        let previous = std::mem::replace(&mut self.env, call_env);
        let result = self.execute_statement(fun.body.as_ref());
        self.env = previous;

        match result? {
            ControlFlow::Return(v) => Ok(v),
            ControlFlow::Value(v) => Ok(v),
        }
    }
}

fn int_result(n: Option<i64>, span: Span) -> Result<Value, RuntimeError> {
    n.map(Value::Int).ok_or_else(|| {
        RuntimeError::new(RuntimeErrorKind::Arithmetic, span, "integer overflow")
    })
}

fn apply_binary(op: BinOp, left: Value, right: Value, span: Span) -> Result<Value, RuntimeError> {
    match (op, left, right) {
        // a string on either side of '+' turns the other side into text
        (BinOp::Add, a @ Value::Str(_), b) | (BinOp::Add, a, b @ Value::Str(_)) => {
            Ok(Value::Str(format!("{}{}", a, b)))
        }

        // int arithmetic stays int; overflow fails instead of wrapping
        (BinOp::Add, Value::Int(a), Value::Int(b)) => int_result(a.checked_add(b), span),
        (BinOp::Sub, Value::Int(a), Value::Int(b)) => int_result(a.checked_sub(b), span),
        (BinOp::Mul, Value::Int(a), Value::Int(b)) => int_result(a.checked_mul(b), span),

        // true division: always a float, and never infinity or NaN
        (BinOp::Div, a, b) => match (a.as_number(), b.as_number()) {
            (Some(_), Some(y)) if y == 0.0 => Err(RuntimeError::new(
                RuntimeErrorKind::Arithmetic,
                span,
                "Cannot divide by zero",
            )),
            (Some(x), Some(y)) => Ok(Value::Float(x / y)),
            _ => Err(type_error(op, &a, &b, span)),
        },

        // any float involvement makes the result a float
        (op, a, b) => match (a.as_number(), b.as_number()) {
            (Some(x), Some(y)) => Ok(Value::Float(match op {
                BinOp::Add => x + y,
                BinOp::Sub => x - y,
                BinOp::Mul => x * y,
                BinOp::Div => unreachable!("division handled above"),
            })),
            _ => Err(type_error(op, &a, &b, span)),
        },
    }
}

fn type_error(op: BinOp, left: &Value, right: &Value, span: Span) -> RuntimeError {
    RuntimeError::new(
        RuntimeErrorKind::Type,
        span,
        format!(
            "cannot apply '{}' to {} and {}",
            op,
            left.type_name(),
            right.type_name()
        ),
    )
}

fn apply_compare(op: CmpOp, left: Value, right: Value, span: Span) -> Result<Value, RuntimeError> {
    let result = match op {
        // equality never fails: distinct kinds are simply unequal
        CmpOp::Eq => left == right,
        CmpOp::Ne => left != right,

        // orderings need comparable representations
        _ => {
            let ordering: Option<Ordering> =
                if let (Some(x), Some(y)) = (left.as_number(), right.as_number()) {
                    x.partial_cmp(&y)
                } else if let (Value::Str(a), Value::Str(b)) = (&left, &right) {
                    Some(a.cmp(b))
                } else {
                    return Err(RuntimeError::new(
                        RuntimeErrorKind::Type,
                        span,
                        format!(
                            "cannot order {} and {}",
                            left.type_name(),
                            right.type_name()
                        ),
                    ));
                };

            match ordering {
                Some(ordering) => match op {
                    CmpOp::Lt => ordering == Ordering::Less,
                    CmpOp::Gt => ordering == Ordering::Greater,
                    CmpOp::Le => ordering != Ordering::Greater,
                    CmpOp::Ge => ordering != Ordering::Less,
                    CmpOp::Eq | CmpOp::Ne => unreachable!("handled above"),
                },
                None => false,
            }
        }
    };

    Ok(Value::Bool(result))
}
