use std::cell::RefCell;
use std::error::Error;
use std::fmt;
use std::fmt::Formatter;
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::ast::{BlockStatement, Expression, Identifier, Program, Statement};
use crate::object::Object;
use crate::scope::Scope;
use crate::token::{Token, TokenType};

/// An unrecoverable evaluation failure: unbound identifier, type mismatch,
/// non-boolean condition, arity mismatch and the like. Evaluation aborts; a
/// caller that wants to continue must not reuse the evaluator state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeError {
    message: String,
}

impl RuntimeError {
    pub fn new(message: impl Into<String>) -> Self {
        RuntimeError {
            message: message.into(),
        }
    }
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for RuntimeError {}

/// Cooperative cancellation token. The interpreter samples it when entering
/// a node; after `cancel`, evaluation returns absent without further side
/// effects.
#[derive(Debug, Clone, Default)]
pub struct Context {
    cancelled: Arc<AtomicBool>,
}

impl Context {
    pub fn new() -> Self {
        Context::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

/// Configures the interpreter.
#[derive(Debug, Clone, Copy, Default)]
pub struct Config {}

pub type EvalResult = Result<Option<Object>, RuntimeError>;

/// Evaluates Gosling AST nodes.
pub struct Interpreter;

fn type_label(value: Option<&Object>) -> String {
    match value {
        Some(obj) => obj.object_type().to_string(),
        None => "nothing".to_string(),
    }
}

fn describe(value: Option<&Object>) -> String {
    match value {
        Some(obj) => format!("{} {}", obj.object_type(), obj),
        None => "nothing".to_string(),
    }
}

fn expect_boolean(value: Option<Object>) -> Result<bool, RuntimeError> {
    match value {
        Some(Object::Boolean(b)) => Ok(b),
        other => Err(RuntimeError::new(format!(
            "expected boolean, got {}",
            describe(other.as_ref())
        ))),
    }
}

impl Interpreter {
    /// Creates a new interpreter.
    pub fn new(config: Config) -> Self {
        let _ = config;
        Interpreter
    }

    /// Evaluates the program in the given scope. The result is the value of
    /// the last statement, absent when there is none, or the first fatal
    /// error.
    pub fn eval(&self, ctx: &Context, program: &Program, scope: &Rc<RefCell<Scope>>) -> EvalResult {
        if ctx.is_cancelled() {
            return Ok(None);
        }

        let mut res = None;
        for stmt in &program.statements {
            res = self.eval_statement(ctx, stmt, scope)?;
        }
        Ok(res)
    }

    fn eval_statement(
        &self,
        ctx: &Context,
        stmt: &Statement,
        scope: &Rc<RefCell<Scope>>,
    ) -> EvalResult {
        if ctx.is_cancelled() {
            return Ok(None);
        }

        match stmt {
            Statement::Expression { expression, .. } => self.eval_expression(ctx, expression, scope),

            Statement::Return { value, .. } => match value {
                Some(value) => self.eval_expression(ctx, value, scope),
                None => Ok(None),
            },

            Statement::Var { name, value, .. } => {
                let value = match self.eval_expression(ctx, value, scope)? {
                    Some(value) => value,
                    None => return Ok(None),
                };
                scope.borrow_mut().set(&name.value, value);
                Ok(None)
            }

            Statement::Assign { token, name, value } => {
                self.eval_assign_statement(ctx, token, name, value, scope)
            }

            Statement::For {
                init,
                cond,
                post,
                body,
                ..
            } => self.eval_for_statement(ctx, init.as_deref(), cond, post.as_deref(), body, scope),

            Statement::If { cond, body, .. } => self.eval_if_statement(ctx, cond, body, scope),

            Statement::IncrementDecrement { token, name } => {
                self.eval_increment_decrement_statement(token, name, scope)
            }

            Statement::Continue { .. } => Ok(Some(Object::Continue)),
        }
    }

    fn eval_block(
        &self,
        ctx: &Context,
        block: &BlockStatement,
        scope: &Rc<RefCell<Scope>>,
    ) -> EvalResult {
        let mut res = None;
        for stmt in &block.statements {
            res = self.eval_statement(ctx, stmt, scope)?;
            // the Continue sentinel short-circuits the block
            if matches!(res, Some(Object::Continue)) {
                return Ok(res);
            }
        }
        Ok(res)
    }

    fn eval_expression(
        &self,
        ctx: &Context,
        expression: &Expression,
        scope: &Rc<RefCell<Scope>>,
    ) -> EvalResult {
        if ctx.is_cancelled() {
            return Ok(None);
        }

        match expression {
            Expression::Identifier(ident) => {
                let value = scope.borrow().lookup(&ident.value);
                match value {
                    Some(value) => Ok(Some(value)),
                    None => Err(RuntimeError::new(format!(
                        "identifier not found: {}",
                        ident.value
                    ))),
                }
            }

            Expression::IntegerLiteral { value, .. } => Ok(Some(Object::Integer(*value))),
            Expression::FloatLiteral { value, .. } => Ok(Some(Object::Float(*value))),
            Expression::BooleanLiteral { value, .. } => Ok(Some(Object::Boolean(*value))),
            Expression::StringLiteral { value, .. } => Ok(Some(Object::String(value.clone()))),

            Expression::Prefix { token, right } => {
                let right = self.eval_expression(ctx, right, scope)?;
                eval_prefix_expression(&token.literal, right)
            }

            Expression::Infix { token, left, right } => {
                let left = self.eval_expression(ctx, left, scope)?;
                let right = self.eval_expression(ctx, right, scope)?;
                eval_infix_expression(&token.literal, left, right)
            }

            Expression::FunctionLiteral {
                parameters, body, ..
            } => Ok(Some(Object::Function {
                parameters: parameters.clone(),
                body: body.clone(),
                scope: Rc::clone(scope),
            })),

            Expression::Call {
                function,
                arguments,
                ..
            } => self.eval_call_expression(ctx, function, arguments, scope),
        }
    }

    fn eval_assign_statement(
        &self,
        ctx: &Context,
        token: &Token,
        name: &Identifier,
        value: &Expression,
        scope: &Rc<RefCell<Scope>>,
    ) -> EvalResult {
        let value = match self.eval_expression(ctx, value, scope)? {
            Some(value) => value,
            None => return Ok(None),
        };
        match token.token_type {
            TokenType::Assignment => {}
            // compound assignment operators reach the evaluator unexpanded
            _ => return Err(RuntimeError::new(format!("unhandled token {}", token))),
        }
        scope.borrow_mut().set(&name.value, value);
        Ok(None)
    }

    fn eval_for_statement(
        &self,
        ctx: &Context,
        init: Option<&Statement>,
        cond: &Expression,
        post: Option<&Statement>,
        body: &BlockStatement,
        scope: &Rc<RefCell<Scope>>,
    ) -> EvalResult {
        if let Some(init) = init {
            self.eval_statement(ctx, init, scope)?;
        }
        loop {
            if ctx.is_cancelled() {
                return Ok(None);
            }

            let cond = self.eval_expression(ctx, cond, scope)?;
            if !expect_boolean(cond)? {
                return Ok(None);
            }

            // the post statement runs after the body even when the body
            // produced the Continue sentinel
            self.eval_block(ctx, body, scope)?;
            if let Some(post) = post {
                self.eval_statement(ctx, post, scope)?;
            }
        }
    }

    fn eval_if_statement(
        &self,
        ctx: &Context,
        cond: &Expression,
        body: &BlockStatement,
        scope: &Rc<RefCell<Scope>>,
    ) -> EvalResult {
        let cond = self.eval_expression(ctx, cond, scope)?;
        if !expect_boolean(cond)? {
            return Ok(None);
        }

        let body = self.eval_block(ctx, body, scope)?;
        if matches!(body, Some(Object::Continue)) {
            return Ok(body);
        }
        Ok(None)
    }

    fn eval_increment_decrement_statement(
        &self,
        token: &Token,
        name: &Identifier,
        scope: &Rc<RefCell<Scope>>,
    ) -> EvalResult {
        let value = scope.borrow().lookup(&name.value);
        let value = value.ok_or_else(|| {
            RuntimeError::new(format!("failed to lookup {}", name.value))
        })?;
        let value = match value {
            Object::Integer(value) => value,
            other => {
                return Err(RuntimeError::new(format!(
                    "expected integer, got {} {}",
                    other.object_type(),
                    other
                )))
            }
        };

        let value = match token.token_type {
            TokenType::Increment => value.wrapping_add(1),
            TokenType::Decrement => value.wrapping_sub(1),
            _ => return Err(RuntimeError::new(format!("unexpected token {}", token))),
        };

        scope.borrow_mut().set(&name.value, Object::Integer(value));
        Ok(None)
    }

    fn eval_call_expression(
        &self,
        ctx: &Context,
        function: &Expression,
        arguments: &[Expression],
        scope: &Rc<RefCell<Scope>>,
    ) -> EvalResult {
        let callee = self.eval_expression(ctx, function, scope)?;
        let args = self.eval_expressions(ctx, arguments, scope)?;

        match callee {
            Some(Object::Function {
                parameters,
                body,
                scope: captured,
            }) => {
                if parameters.len() != args.len() {
                    return Err(RuntimeError::new(format!(
                        "wrong number of arguments: expected {}, got {}",
                        parameters.len(),
                        args.len()
                    )));
                }
                // the call scope nests in the captured scope, not the call
                // site's
                let call_scope = Scope::new(Some(captured)).shared();
                for (param, arg) in parameters.iter().zip(args) {
                    call_scope.borrow_mut().set(&param.value, arg);
                }
                self.eval_block(ctx, &body, &call_scope)
            }
            Some(Object::Builtin(builtin)) => builtin.call(&args),
            other => Err(RuntimeError::new(format!(
                "not a function: {}",
                type_label(other.as_ref())
            ))),
        }
    }

    fn eval_expressions(
        &self,
        ctx: &Context,
        expressions: &[Expression],
        scope: &Rc<RefCell<Scope>>,
    ) -> Result<Vec<Object>, RuntimeError> {
        let mut res = Vec::with_capacity(expressions.len());
        for expression in expressions {
            match self.eval_expression(ctx, expression, scope)? {
                Some(value) => res.push(value),
                None => {
                    return Err(RuntimeError::new("call argument evaluated to no value"));
                }
            }
        }
        Ok(res)
    }
}

fn eval_prefix_expression(operator: &str, right: Option<Object>) -> EvalResult {
    match operator {
        "!" => match right {
            Some(Object::Boolean(value)) => Ok(Some(Object::Boolean(!value))),
            other => Err(RuntimeError::new(format!(
                "prefix expression operator ! on {}",
                describe(other.as_ref())
            ))),
        },
        "-" => match right {
            Some(Object::Integer(value)) => Ok(Some(Object::Integer(value.wrapping_neg()))),
            other => Err(RuntimeError::new(format!(
                "prefix expression operator - on {}",
                describe(other.as_ref())
            ))),
        },
        _ => Err(RuntimeError::new(format!(
            "unhandled prefix expression operator {}",
            operator
        ))),
    }
}

fn eval_infix_expression(operator: &str, left: Option<Object>, right: Option<Object>) -> EvalResult {
    match (&left, &right) {
        (Some(Object::Integer(l)), Some(Object::Integer(r))) => {
            eval_integer_infix_expression(operator, *l, *r)
        }
        (Some(Object::Float(l)), Some(Object::Float(r))) => {
            eval_float_infix_expression(operator, *l, *r)
        }
        (Some(Object::Boolean(l)), Some(Object::Boolean(r))) => {
            eval_boolean_infix_expression(operator, *l, *r)
        }
        _ => Err(RuntimeError::new(format!(
            "unhandled combination: {} {} {}",
            type_label(left.as_ref()),
            operator,
            type_label(right.as_ref())
        ))),
    }
}

fn eval_integer_infix_expression(operator: &str, left: i64, right: i64) -> EvalResult {
    let res = match operator {
        "+" => Object::Integer(left.wrapping_add(right)),
        "-" => Object::Integer(left.wrapping_sub(right)),
        "*" => Object::Integer(left.wrapping_mul(right)),
        "/" => {
            if right == 0 {
                return Err(RuntimeError::new("integer divide by zero"));
            }
            Object::Integer(left.wrapping_div(right))
        }
        "%" => {
            if right == 0 {
                return Err(RuntimeError::new("integer divide by zero"));
            }
            Object::Integer(left.wrapping_rem(right))
        }

        "<" => Object::Boolean(left < right),
        "<=" => Object::Boolean(left <= right),
        ">" => Object::Boolean(left > right),
        ">=" => Object::Boolean(left >= right),
        "==" => Object::Boolean(left == right),
        "!=" => Object::Boolean(left != right),

        _ => {
            return Err(RuntimeError::new(format!(
                "unhandled infix expression operator {} for two Integers",
                operator
            )))
        }
    };
    Ok(Some(res))
}

fn eval_float_infix_expression(operator: &str, left: f64, right: f64) -> EvalResult {
    let res = match operator {
        "+" => Object::Float(left + right),
        "-" => Object::Float(left - right),
        "*" => Object::Float(left * right),
        "/" => Object::Float(left / right),

        "<" => Object::Boolean(left < right),
        "<=" => Object::Boolean(left <= right),
        ">" => Object::Boolean(left > right),
        ">=" => Object::Boolean(left >= right),
        "==" => Object::Boolean(left == right),
        "!=" => Object::Boolean(left != right),

        _ => {
            return Err(RuntimeError::new(format!(
                "unhandled infix expression operator {} for two Floats",
                operator
            )))
        }
    };
    Ok(Some(res))
}

fn eval_boolean_infix_expression(operator: &str, left: bool, right: bool) -> EvalResult {
    let res = match operator {
        "==" => Object::Boolean(left == right),
        "!=" => Object::Boolean(left != right),
        // both operands are already evaluated; && and || are eager
        "&&" => Object::Boolean(left && right),
        "||" => Object::Boolean(left || right),
        _ => {
            return Err(RuntimeError::new(format!(
                "unhandled infix expression operator {} for two Booleans",
                operator
            )))
        }
    };
    Ok(Some(res))
}
