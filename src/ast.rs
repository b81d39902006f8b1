use std::fmt;
use std::fmt::Formatter;

use crate::token::Token;

/// An identifier expression. Also used on its own for function parameters
/// and for `var`/assignment targets.
#[derive(Debug, Clone, PartialEq)]
pub struct Identifier {
    pub token: Token,
    pub value: String,
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

/// A brace-delimited statement list: function bodies and `if`/`for` bodies.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockStatement {
    pub token: Token,
    pub statements: Vec<Statement>,
}

impl fmt::Display for BlockStatement {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "{{")?;
        for stmt in &self.statements {
            writeln!(f, "{};", stmt)?;
        }
        write!(f, "}}")
    }
}

/// AST expression nodes. Every variant holds its originating token; operator
/// nodes dispatch on the token's literal during evaluation.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Identifier(Identifier),
    IntegerLiteral {
        token: Token,
        value: i64,
    },
    FloatLiteral {
        token: Token,
        value: f64,
    },
    StringLiteral {
        token: Token,
        value: String,
    },
    BooleanLiteral {
        token: Token,
        value: bool,
    },
    Prefix {
        token: Token,
        right: Box<Expression>,
    },
    Infix {
        token: Token,
        left: Box<Expression>,
        right: Box<Expression>,
    },
    FunctionLiteral {
        token: Token,
        parameters: Vec<Identifier>,
        body: BlockStatement,
    },
    Call {
        token: Token,
        function: Box<Expression>,
        arguments: Vec<Expression>,
    },
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Identifier(ident) => write!(f, "{}", ident),
            Expression::IntegerLiteral { token, .. } => write!(f, "{}", token.literal),
            Expression::FloatLiteral { token, .. } => write!(f, "{}", token.literal),
            // the literal keeps its quotes
            Expression::StringLiteral { token, .. } => write!(f, "{}", token.literal),
            Expression::BooleanLiteral { token, .. } => write!(f, "{}", token.literal),
            Expression::Prefix { token, right } => write!(f, "({}{})", token.literal, right),
            Expression::Infix { token, left, right } => {
                write!(f, "{} {} {}", left, token.literal, right)
            }
            Expression::FunctionLiteral {
                parameters, body, ..
            } => {
                let params: Vec<String> = parameters.iter().map(ToString::to_string).collect();
                write!(f, "func({}) {}", params.join(", "), body)
            }
            Expression::Call {
                function,
                arguments,
                ..
            } => {
                let args: Vec<String> = arguments.iter().map(ToString::to_string).collect();
                write!(f, "{}({})", function, args.join(", "))
            }
        }
    }
}

/// AST statement nodes.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Var {
        token: Token,
        name: Identifier,
        value: Expression,
    },
    Assign {
        token: Token, // the assignment operator token
        name: Identifier,
        value: Expression,
    },
    IncrementDecrement {
        token: Token, // Increment or Decrement
        name: Identifier,
    },
    Return {
        token: Token,
        value: Option<Expression>,
    },
    Continue {
        token: Token,
    },
    If {
        token: Token,
        cond: Expression,
        body: BlockStatement,
    },
    For {
        token: Token,
        init: Option<Box<Statement>>,
        cond: Expression,
        post: Option<Box<Statement>>,
        body: BlockStatement,
    },
    Expression {
        token: Token, // first token of the expression
        expression: Expression,
    },
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Statement::Var { name, value, .. } => write!(f, "var {} = {}", name, value),
            Statement::Assign { token, name, value } => {
                write!(f, "{} {} {}", name, token.literal, value)
            }
            Statement::IncrementDecrement { token, name } => {
                write!(f, "{}{}", name, token.literal)
            }
            Statement::Return { value, .. } => {
                write!(f, "return")?;
                if let Some(value) = value {
                    write!(f, " {}", value)?;
                }
                Ok(())
            }
            Statement::Continue { .. } => write!(f, "continue"),
            Statement::If { cond, body, .. } => write!(f, "if ({}) {}", cond, body),
            Statement::For {
                init,
                cond,
                post,
                body,
                ..
            } => {
                write!(f, "for ")?;
                if let Some(init) = init {
                    write!(f, "{}", init)?;
                }
                write!(f, "; {}; ", cond)?;
                if let Some(post) = post {
                    write!(f, "{}", post)?;
                }
                write!(f, " {}", body)
            }
            Statement::Expression { expression, .. } => write!(f, "{}", expression),
        }
    }
}

/// The root of the AST: an ordered sequence of top-level statements.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub statements: Vec<Statement>,
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for stmt in &self.statements {
            writeln!(f, "{};", stmt)?;
        }
        Ok(())
    }
}
