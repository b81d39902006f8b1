use std::error::Error;
use std::fmt;
use std::fmt::Formatter;
use std::mem;

use crate::ast::{BlockStatement, Expression, Identifier, Program, Statement};
use crate::scanner::Scanner;
use crate::token::{Token, TokenType};

/// Binding powers, weakest first. Binary operators at the same level group
/// to the left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Precedence {
    Lowest,
    LogicalOr,  // ||
    LogicalAnd, // &&
    Comparison, // == != < <= > >=
    Sum,        // + - | ^
    Product,    // * / % &
    Unary,      // -x !x
    Call,       // foo(x)
}

fn precedence_of(token_type: TokenType) -> Precedence {
    match token_type {
        TokenType::LogicalOr => Precedence::LogicalOr,
        TokenType::LogicalAnd => Precedence::LogicalAnd,
        TokenType::Equal
        | TokenType::NotEqual
        | TokenType::Less
        | TokenType::LessOrEqual
        | TokenType::Greater
        | TokenType::GreaterOrEqual => Precedence::Comparison,
        TokenType::Sum | TokenType::Difference | TokenType::BitwiseOr | TokenType::BitwiseXor => {
            Precedence::Sum
        }
        TokenType::Product
        | TokenType::Quotient
        | TokenType::Remainder
        | TokenType::BitwiseAnd => Precedence::Product,
        TokenType::Not => Precedence::Unary,
        TokenType::LParen => Precedence::Call,
        _ => Precedence::Lowest,
    }
}

/// A parsing error with a human-readable message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    message: String,
}

impl ParseError {
    fn new(message: String) -> Self {
        ParseError { message }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for ParseError {}

/// Configures the parser.
#[derive(Debug, Clone, Copy, Default)]
pub struct Config {}

type PrefixParseFn = fn(&mut Parser) -> Option<Expression>;
type InfixParseFn = fn(&mut Parser, Expression) -> Option<Expression>;

fn prefix_parse_fn(token_type: TokenType) -> Option<PrefixParseFn> {
    let f: PrefixParseFn = match token_type {
        TokenType::Comment => Parser::parse_comment,

        TokenType::Integer => Parser::parse_integer_literal,
        TokenType::String => Parser::parse_string_literal,
        TokenType::Identifier => Parser::parse_identifier,

        TokenType::Difference | TokenType::Not => Parser::parse_prefix_expression,

        TokenType::LParen => Parser::parse_grouped_expression,

        TokenType::Func => Parser::parse_function_literal,

        TokenType::True | TokenType::False => Parser::parse_boolean_literal,

        _ => return None,
    };
    Some(f)
}

fn infix_parse_fn(token_type: TokenType) -> Option<InfixParseFn> {
    let f: InfixParseFn = match token_type {
        TokenType::Sum
        | TokenType::Difference
        | TokenType::Product
        | TokenType::Quotient
        | TokenType::Remainder
        | TokenType::LogicalAnd
        | TokenType::LogicalOr
        | TokenType::Equal
        | TokenType::NotEqual
        | TokenType::Less
        | TokenType::LessOrEqual
        | TokenType::Greater
        | TokenType::GreaterOrEqual => Parser::parse_infix_expression,

        TokenType::LParen => Parser::parse_call_expression,

        _ => return None,
    };
    Some(f)
}

const ASSIGN_TOKENS: [TokenType; 6] = [
    TokenType::Assignment,
    TokenType::SumAssignment,
    TokenType::DifferenceAssignment,
    TokenType::ProductAssignment,
    TokenType::QuotientAssignment,
    TokenType::RemainderAssignment,
];

/// Parses Gosling source files.
///
/// The parser pulls tokens from the scanner through a two-token window and
/// accumulates errors instead of aborting; `parse_program` returns `None`
/// when any error was recorded.
pub struct Parser {
    scanner: Scanner,
    errors: Vec<ParseError>,

    cur_token: Token,
    peek_token: Token,
}

impl Parser {
    /// Creates a new parser reading from the scanner.
    pub fn new(mut scanner: Scanner, config: Config) -> Self {
        let _ = config;
        // fill both cur_token and peek_token
        let cur_token = scanner.next_token();
        let peek_token = scanner.next_token();
        Parser {
            scanner,
            errors: Vec::new(),
            cur_token,
            peek_token,
        }
    }

    /// Returns the parsing errors recorded so far.
    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    /// Parses the whole program and returns the root AST node, or `None` if
    /// errors were encountered. Always consumes the scanner to EOF.
    pub fn parse_program(&mut self) -> Option<Program> {
        let mut statements = Vec::new();

        while !self.cur_token_is(TokenType::Eof) {
            if let Some(stmt) = self.parse_statement() {
                statements.push(stmt);
            }
            self.next_token();
        }

        if self.errors.is_empty() {
            Some(Program { statements })
        } else {
            None
        }
    }

    fn next_token(&mut self) {
        self.cur_token = mem::replace(&mut self.peek_token, self.scanner.next_token());
    }

    fn cur_token_is(&self, token_type: TokenType) -> bool {
        self.cur_token.token_type == token_type
    }

    fn peek_token_is(&self, token_type: TokenType) -> bool {
        self.peek_token.token_type == token_type
    }

    fn cur_precedence(&self) -> Precedence {
        precedence_of(self.cur_token.token_type)
    }

    fn peek_precedence(&self) -> Precedence {
        precedence_of(self.peek_token.token_type)
    }

    fn add_error(&mut self, message: String) {
        self.errors.push(ParseError::new(message));
    }

    /// Advances when the peek token is one of the expected types, otherwise
    /// records an error and stays put.
    fn expect_peek(&mut self, expected: &[TokenType]) -> bool {
        for t in expected {
            if self.peek_token_is(*t) {
                self.next_token();
                return true;
            }
        }

        let message = match expected {
            [t] => format!(
                "expected next token to be {}, got {} instead",
                t, self.peek_token
            ),
            _ => {
                let list: Vec<String> = expected.iter().map(ToString::to_string).collect();
                format!(
                    "expected next token to be one of {}, got {} instead",
                    list.join(", "),
                    self.peek_token
                )
            }
        };
        self.add_error(message);
        false
    }

    /// Like `expect_peek` for the current token; never advances.
    fn expect_current(&mut self, expected: &[TokenType]) -> bool {
        for t in expected {
            if self.cur_token_is(*t) {
                return true;
            }
        }

        let message = match expected {
            [t] => format!(
                "expected current token to be {}, got {} instead",
                t, self.cur_token.token_type
            ),
            _ => {
                let list: Vec<String> = expected.iter().map(ToString::to_string).collect();
                format!(
                    "expected current token to be one of {}, got {} instead",
                    list.join(", "),
                    self.cur_token.token_type
                )
            }
        };
        self.add_error(message);
        false
    }

    fn cur_identifier(&self) -> Identifier {
        Identifier {
            token: self.cur_token.clone(),
            value: self.cur_token.literal.clone(),
        }
    }

    /// Absorbs any run of explicit and ASI-inserted semicolons after a
    /// statement.
    fn skip_semicolons(&mut self) {
        while self.peek_token_is(TokenType::Semicolon) {
            self.next_token();
        }
    }

    fn parse_statement(&mut self) -> Option<Statement> {
        match self.cur_token.token_type {
            TokenType::Var => self.parse_var_statement(),
            TokenType::If => self.parse_if_statement(),
            TokenType::Return => self.parse_return_statement(),
            TokenType::Continue => self.parse_continue_statement(),
            TokenType::For => self.parse_for_statement(),
            _ => self.parse_expression_or_assignment_statement(),
        }
    }

    fn parse_var_statement(&mut self) -> Option<Statement> {
        let token = self.cur_token.clone();
        if !self.expect_peek(&[TokenType::Identifier]) {
            return None;
        }
        let name = self.cur_identifier();

        if !self.expect_peek(&[TokenType::Assignment]) {
            return None;
        }
        self.next_token();
        let value = self.parse_expression(Precedence::Lowest);

        self.skip_semicolons();
        Some(Statement::Var {
            token,
            name,
            value: value?,
        })
    }

    fn parse_if_statement(&mut self) -> Option<Statement> {
        if !self.expect_current(&[TokenType::If]) {
            return None;
        }
        let token = self.cur_token.clone();

        if !self.expect_peek(&[TokenType::LParen]) {
            return None;
        }
        self.next_token();
        let cond = self.parse_expression(Precedence::Lowest);

        if !self.expect_peek(&[TokenType::RParen]) {
            return None;
        }
        if !self.expect_peek(&[TokenType::LBrace]) {
            return None;
        }
        let body = self.parse_block_statement()?;

        self.skip_semicolons();
        Some(Statement::If {
            token,
            cond: cond?,
            body,
        })
    }

    fn parse_return_statement(&mut self) -> Option<Statement> {
        let token = self.cur_token.clone();
        self.next_token();
        let value = self.parse_expression(Precedence::Lowest);

        self.skip_semicolons();
        Some(Statement::Return { token, value })
    }

    fn parse_continue_statement(&mut self) -> Option<Statement> {
        if !self.expect_current(&[TokenType::Continue]) {
            return None;
        }
        let token = self.cur_token.clone();

        self.skip_semicolons();
        Some(Statement::Continue { token })
    }

    fn parse_for_statement(&mut self) -> Option<Statement> {
        if !self.expect_current(&[TokenType::For]) {
            return None;
        }
        let token = self.cur_token.clone();

        self.next_token();
        let init = self.parse_assign_statement();

        if !self.expect_current(&[TokenType::Semicolon]) {
            return None;
        }
        self.next_token();
        let cond = self.parse_expression(Precedence::Lowest);

        if !self.expect_peek(&[TokenType::Semicolon]) {
            return None;
        }
        self.next_token();
        let post = self.parse_statement();

        self.next_token();
        let body = self.parse_block_statement()?;

        self.skip_semicolons();
        Some(Statement::For {
            token,
            init: init.map(Box::new),
            cond: cond?,
            post: post.map(Box::new),
            body,
        })
    }

    fn parse_assign_statement(&mut self) -> Option<Statement> {
        if !self.expect_current(&[TokenType::Identifier]) {
            return None;
        }
        let name = self.cur_identifier();

        if !self.expect_peek(&ASSIGN_TOKENS) {
            return None;
        }
        let token = self.cur_token.clone();

        self.next_token();
        let value = self.parse_expression(Precedence::Lowest);

        self.skip_semicolons();
        Some(Statement::Assign {
            token,
            name,
            value: value?,
        })
    }

    fn parse_increment_decrement_statement(&mut self) -> Option<Statement> {
        if !self.expect_current(&[TokenType::Identifier]) {
            return None;
        }
        let name = self.cur_identifier();

        if !self.expect_peek(&[TokenType::Increment, TokenType::Decrement]) {
            return None;
        }
        let token = self.cur_token.clone();

        self.skip_semicolons();
        Some(Statement::IncrementDecrement { token, name })
    }

    /// Parses an expression, then re-parses it as an increment/decrement or
    /// assignment statement when the peek token says so.
    fn parse_expression_or_assignment_statement(&mut self) -> Option<Statement> {
        let token = self.cur_token.clone();
        let expression = self.parse_expression(Precedence::Lowest);

        let stmt = match self.peek_token.token_type {
            TokenType::Increment | TokenType::Decrement => {
                self.parse_increment_decrement_statement()
            }
            t if ASSIGN_TOKENS.contains(&t) => self.parse_assign_statement(),
            _ => expression.map(|expression| Statement::Expression { token, expression }),
        };

        self.skip_semicolons();
        stmt
    }

    fn parse_block_statement(&mut self) -> Option<BlockStatement> {
        if !self.expect_current(&[TokenType::LBrace]) {
            return None;
        }
        let token = self.cur_token.clone();
        let mut statements = Vec::new();

        self.next_token();
        while !self.cur_token_is(TokenType::RBrace) && !self.cur_token_is(TokenType::Eof) {
            if let Some(stmt) = self.parse_statement() {
                statements.push(stmt);
            }
            self.next_token();
        }

        Some(BlockStatement { token, statements })
    }

    fn parse_expression(&mut self, precedence: Precedence) -> Option<Expression> {
        let prefix = match prefix_parse_fn(self.cur_token.token_type) {
            Some(prefix) => prefix,
            None => {
                let message = format!(
                    "no prefix parse function for {} found (token {})",
                    self.cur_token.token_type, self.cur_token
                );
                self.add_error(message);
                return None;
            }
        };
        let mut left = prefix(self)?;

        while !self.peek_token_is(TokenType::Semicolon) && precedence < self.peek_precedence() {
            let infix = match infix_parse_fn(self.peek_token.token_type) {
                Some(infix) => infix,
                None => return Some(left),
            };
            self.next_token();
            left = infix(self, left)?;
        }

        Some(left)
    }

    fn parse_comment(&mut self) -> Option<Expression> {
        // comments are discarded
        None
    }

    fn parse_integer_literal(&mut self) -> Option<Expression> {
        let token = self.cur_token.clone();
        // a leading zero makes the literal octal
        let parsed = if token.literal.len() > 1 && token.literal.starts_with('0') {
            i64::from_str_radix(&token.literal[1..], 8)
        } else {
            token.literal.parse()
        };
        match parsed {
            Ok(value) => Some(Expression::IntegerLiteral { token, value }),
            Err(_) => {
                let message = format!("could not parse {:?} as integer", token.literal);
                self.add_error(message);
                None
            }
        }
    }

    fn parse_string_literal(&mut self) -> Option<Expression> {
        let token = self.cur_token.clone();
        let literal = &token.literal;
        if literal.len() < 2 || !literal.starts_with('"') || !literal.ends_with('"') {
            let message = format!("could not parse {:?} as string", literal);
            self.add_error(message);
            return None;
        }
        let value = literal[1..literal.len() - 1].to_string();
        Some(Expression::StringLiteral { token, value })
    }

    fn parse_identifier(&mut self) -> Option<Expression> {
        Some(Expression::Identifier(self.cur_identifier()))
    }

    fn parse_boolean_literal(&mut self) -> Option<Expression> {
        let token = self.cur_token.clone();
        let value = token.token_type == TokenType::True;
        Some(Expression::BooleanLiteral { token, value })
    }

    fn parse_prefix_expression(&mut self) -> Option<Expression> {
        let token = self.cur_token.clone();

        self.next_token();
        let right = self.parse_expression(Precedence::Unary)?;

        Some(Expression::Prefix {
            token,
            right: Box::new(right),
        })
    }

    fn parse_grouped_expression(&mut self) -> Option<Expression> {
        self.next_token();
        let exp = self.parse_expression(Precedence::Lowest);
        if !self.expect_peek(&[TokenType::RParen]) {
            return None;
        }
        exp
    }

    fn parse_function_literal(&mut self) -> Option<Expression> {
        let token = self.cur_token.clone();

        if !self.expect_peek(&[TokenType::LParen]) {
            return None;
        }
        let parameters = self.parse_function_parameters()?;

        if !self.expect_peek(&[TokenType::LBrace]) {
            return None;
        }
        let body = self.parse_block_statement()?;

        Some(Expression::FunctionLiteral {
            token,
            parameters,
            body,
        })
    }

    fn parse_function_parameters(&mut self) -> Option<Vec<Identifier>> {
        if self.peek_token_is(TokenType::RParen) {
            self.next_token();
            return Some(Vec::new());
        }

        self.next_token();
        let mut identifiers = vec![self.cur_identifier()];

        while self.peek_token_is(TokenType::Comma) {
            self.next_token();
            self.next_token();
            identifiers.push(self.cur_identifier());
        }

        if !self.expect_peek(&[TokenType::RParen]) {
            return None;
        }

        Some(identifiers)
    }

    fn parse_infix_expression(&mut self, left: Expression) -> Option<Expression> {
        let token = self.cur_token.clone();

        let precedence = self.cur_precedence();
        self.next_token();
        let right = self.parse_expression(precedence)?;

        Some(Expression::Infix {
            token,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    fn parse_call_expression(&mut self, function: Expression) -> Option<Expression> {
        let token = self.cur_token.clone();
        let arguments = self.parse_call_arguments()?;
        Some(Expression::Call {
            token,
            function: Box::new(function),
            arguments,
        })
    }

    fn parse_call_arguments(&mut self) -> Option<Vec<Expression>> {
        let mut args = Vec::new();

        if self.peek_token_is(TokenType::RParen) {
            self.next_token();
            return Some(args);
        }

        self.next_token();
        args.push(self.parse_expression(Precedence::Lowest)?);

        while self.peek_token_is(TokenType::Comma) {
            self.next_token();
            self.next_token();
            args.push(self.parse_expression(Precedence::Lowest)?);
        }

        if !self.expect_peek(&[TokenType::RParen]) {
            return None;
        }

        Some(args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::Config as ScannerConfig;

    fn tok(offset: usize, token_type: TokenType, literal: &str) -> Token {
        Token {
            offset,
            token_type,
            literal: literal.to_string(),
        }
    }

    fn ident(offset: usize, name: &str) -> Identifier {
        Identifier {
            token: tok(offset, TokenType::Identifier, name),
            value: name.to_string(),
        }
    }

    fn int(offset: usize, literal: &str, value: i64) -> Expression {
        Expression::IntegerLiteral {
            token: tok(offset, TokenType::Integer, literal),
            value,
        }
    }

    fn new_parser(input: &str) -> Parser {
        let scanner = Scanner::new(
            input,
            ScannerConfig {
                skip_shebang: true,
            },
        )
        .expect("scanner");
        Parser::new(scanner, Config::default())
    }

    #[test]
    fn test_parser() {
        let testdata: Vec<(&str, Statement)> = vec![
            (
                "var answer = 42",
                Statement::Var {
                    token: tok(0, TokenType::Var, "var"),
                    name: ident(4, "answer"),
                    value: int(13, "42", 42),
                },
            ),
            (
                "answer = 42",
                Statement::Assign {
                    token: tok(7, TokenType::Assignment, "="),
                    name: ident(0, "answer"),
                    value: int(9, "42", 42),
                },
            ),
            (
                "answer == 42",
                Statement::Expression {
                    token: tok(0, TokenType::Identifier, "answer"),
                    expression: Expression::Infix {
                        token: tok(7, TokenType::Equal, "=="),
                        left: Box::new(Expression::Identifier(ident(0, "answer"))),
                        right: Box::new(int(10, "42", 42)),
                    },
                },
            ),
            (
                "answer += 42",
                Statement::Assign {
                    token: tok(7, TokenType::SumAssignment, "+="),
                    name: ident(0, "answer"),
                    value: int(10, "42", 42),
                },
            ),
            (
                "answer++",
                Statement::IncrementDecrement {
                    token: tok(6, TokenType::Increment, "++"),
                    name: ident(0, "answer"),
                },
            ),
            (
                "return 42",
                Statement::Return {
                    token: tok(0, TokenType::Return, "return"),
                    value: Some(int(7, "42", 42)),
                },
            ),
            (
                "continue",
                Statement::Continue {
                    token: tok(0, TokenType::Continue, "continue"),
                },
            ),
            (
                "if (6 * 9 == 42) {\ntrue;\nfalse;\n}",
                Statement::If {
                    token: tok(0, TokenType::If, "if"),
                    cond: Expression::Infix {
                        token: tok(10, TokenType::Equal, "=="),
                        left: Box::new(Expression::Infix {
                            token: tok(6, TokenType::Product, "*"),
                            left: Box::new(int(4, "6", 6)),
                            right: Box::new(int(8, "9", 9)),
                        }),
                        right: Box::new(int(13, "42", 42)),
                    },
                    body: BlockStatement {
                        token: tok(17, TokenType::LBrace, "{"),
                        statements: vec![
                            Statement::Expression {
                                token: tok(19, TokenType::True, "true"),
                                expression: Expression::BooleanLiteral {
                                    token: tok(19, TokenType::True, "true"),
                                    value: true,
                                },
                            },
                            Statement::Expression {
                                token: tok(25, TokenType::False, "false"),
                                expression: Expression::BooleanLiteral {
                                    token: tok(25, TokenType::False, "false"),
                                    value: false,
                                },
                            },
                        ],
                    },
                },
            ),
            (
                "for i = 1; i <= 100; i++ {\n}",
                Statement::For {
                    token: tok(0, TokenType::For, "for"),
                    init: Some(Box::new(Statement::Assign {
                        token: tok(6, TokenType::Assignment, "="),
                        name: ident(4, "i"),
                        value: int(8, "1", 1),
                    })),
                    cond: Expression::Infix {
                        token: tok(13, TokenType::LessOrEqual, "<="),
                        left: Box::new(Expression::Identifier(ident(11, "i"))),
                        right: Box::new(int(16, "100", 100)),
                    },
                    post: Some(Box::new(Statement::IncrementDecrement {
                        token: tok(22, TokenType::Increment, "++"),
                        name: ident(21, "i"),
                    })),
                    body: BlockStatement {
                        token: tok(25, TokenType::LBrace, "{"),
                        statements: vec![],
                    },
                },
            ),
            (
                "println(\"answer\")",
                Statement::Expression {
                    token: tok(0, TokenType::Identifier, "println"),
                    expression: Expression::Call {
                        token: tok(7, TokenType::LParen, "("),
                        function: Box::new(Expression::Identifier(ident(0, "println"))),
                        arguments: vec![Expression::StringLiteral {
                            token: tok(8, TokenType::String, "\"answer\""),
                            value: "answer".to_string(),
                        }],
                    },
                },
            ),
        ];

        for (source, expected) in testdata {
            let formal = format!("{};\n", source);
            let variants = vec![
                source.to_string(),
                format!("{};", source),
                format!("{}\n", source),
                formal.clone(),
                format!("{};\n\n;;", source),
            ];
            for input in variants {
                let mut p = new_parser(&input);
                let program = p.parse_program();
                assert!(
                    p.errors().is_empty(),
                    "input {:?}: unexpected errors {:?}",
                    input,
                    p.errors()
                );
                let program = program.expect("program");
                assert_eq!(
                    program.statements,
                    vec![expected.clone()],
                    "input: {:?}",
                    input
                );
                assert_eq!(formal, format!("{}", program), "input: {:?}", input);
                assert_eq!(
                    p.cur_token,
                    tok(input.chars().count(), TokenType::Eof, ""),
                    "input: {:?}",
                    input
                );
            }
        }
    }

    #[test]
    fn test_errors() {
        let mut p = new_parser("(");
        let program = p.parse_program();
        assert!(program.is_none());
        assert_eq!(
            p.errors(),
            &[
                ParseError::new(
                    "no prefix parse function for EOF found (token [ 1: EOF ])".to_string()
                ),
                ParseError::new(
                    "expected next token to be RPAREN, got [ 1: EOF ] instead".to_string()
                ),
            ]
        );
    }

    #[test]
    fn test_float_literal_is_unparsed() {
        let mut p = new_parser("1.5");
        let program = p.parse_program();
        assert!(program.is_none());
        assert_eq!(
            p.errors(),
            &[ParseError::new(
                "no prefix parse function for FLOAT found (token [ 0: FLOAT 1.5 ])".to_string()
            )]
        );
    }

    #[test]
    fn test_octal_integer_literal() {
        let mut p = new_parser("042");
        let program = p.parse_program().expect("program");
        assert_eq!(
            program.statements,
            vec![Statement::Expression {
                token: tok(0, TokenType::Integer, "042"),
                expression: int(0, "042", 34),
            }]
        );

        let mut p = new_parser("098");
        assert!(p.parse_program().is_none());
        assert_eq!(
            p.errors(),
            &[ParseError::new(
                "could not parse \"098\" as integer".to_string()
            )]
        );
    }

    #[test]
    fn test_comments_are_discarded() {
        let mut p = new_parser("// a lonely comment");
        let program = p.parse_program().expect("program");
        assert!(p.errors().is_empty());
        assert!(program.statements.is_empty());

        let mut p = new_parser("// leading\nvar x = 1 // trailing");
        let program = p.parse_program().expect("program");
        assert!(p.errors().is_empty());
        assert_eq!(program.statements.len(), 1);
    }

    // extracts the expression of the single expression statement
    fn parse_single_expression(input: &str) -> Expression {
        let mut p = new_parser(input);
        let program = p.parse_program();
        assert!(p.errors().is_empty(), "errors: {:?}", p.errors());
        let mut statements = program.expect("program").statements;
        assert_eq!(statements.len(), 1, "input: {:?}", input);
        match statements.remove(0) {
            Statement::Expression { expression, .. } => expression,
            other => panic!("not an expression statement: {}", other),
        }
    }

    fn infix_parts(expr: Expression) -> (Expression, String, Expression) {
        match expr {
            Expression::Infix { token, left, right } => (*left, token.literal, *right),
            other => panic!("not an infix expression: {}", other),
        }
    }

    #[test]
    fn test_operator_precedence() {
        // product binds tighter than sum
        let (left, op, right) = infix_parts(parse_single_expression("1 + 2 * 3"));
        assert_eq!(op, "+");
        assert_eq!(left, int(0, "1", 1));
        let (left, op, right) = infix_parts(right);
        assert_eq!(op, "*");
        assert_eq!(left, int(4, "2", 2));
        assert_eq!(right, int(8, "3", 3));

        let (left, op, right) = infix_parts(parse_single_expression("1 * 2 + 3"));
        assert_eq!(op, "+");
        assert_eq!(right, int(8, "3", 3));
        let (_, op, _) = infix_parts(left);
        assert_eq!(op, "*");

        // equal precedence groups to the left
        let (left, op, right) = infix_parts(parse_single_expression("10 - 2 - 3"));
        assert_eq!(op, "-");
        assert_eq!(right, int(9, "3", 3));
        let (left, op, right) = infix_parts(left);
        assert_eq!(op, "-");
        assert_eq!(left, int(0, "10", 10));
        assert_eq!(right, int(5, "2", 2));

        // && binds tighter than ||
        let (_, op, right) = infix_parts(parse_single_expression("a || b && c"));
        assert_eq!(op, "||");
        let (_, op, _) = infix_parts(right);
        assert_eq!(op, "&&");

        // comparisons bind tighter than logical operators
        let (left, op, right) = infix_parts(parse_single_expression("1 < 2 && 3 < 4"));
        assert_eq!(op, "&&");
        let (_, op, _) = infix_parts(left);
        assert_eq!(op, "<");
        let (_, op, _) = infix_parts(right);
        assert_eq!(op, "<");

        // unary minus binds tighter than product
        let (left, op, _) = infix_parts(parse_single_expression("-a * b"));
        assert_eq!(op, "*");
        assert!(matches!(left, Expression::Prefix { .. }));

        // calls bind tightest
        let (left, op, right) = infix_parts(parse_single_expression("add(1) + 2"));
        assert_eq!(op, "+");
        assert!(matches!(left, Expression::Call { .. }));
        assert_eq!(right, int(9, "2", 2));

        // grouping overrides precedence
        let (left, op, _) = infix_parts(parse_single_expression("(1 + 2) * 3"));
        assert_eq!(op, "*");
        let (_, op, _) = infix_parts(left);
        assert_eq!(op, "+");
    }

    #[test]
    fn test_function_literal() {
        let expr = parse_single_expression("func(x, y) {\nx + y\n}");
        match expr {
            Expression::FunctionLiteral {
                parameters, body, ..
            } => {
                assert_eq!(parameters, vec![ident(5, "x"), ident(8, "y")]);
                assert_eq!(body.statements.len(), 1);
            }
            other => panic!("not a function literal: {}", other),
        }

        let expr = parse_single_expression("func() {}");
        match expr {
            Expression::FunctionLiteral {
                parameters, body, ..
            } => {
                assert!(parameters.is_empty());
                assert!(body.statements.is_empty());
            }
            other => panic!("not a function literal: {}", other),
        }
    }

    #[test]
    fn test_call_expression() {
        let expr = parse_single_expression("add(1, 2 * 3, foo)");
        match expr {
            Expression::Call {
                function,
                arguments,
                ..
            } => {
                assert_eq!(*function, Expression::Identifier(ident(0, "add")));
                assert_eq!(arguments.len(), 3);
                assert_eq!(arguments[0], int(4, "1", 1));
                assert!(matches!(arguments[1], Expression::Infix { .. }));
            }
            other => panic!("not a call expression: {}", other),
        }
    }

    #[test]
    fn test_bitwise_operators_are_rejected() {
        // bitwise operators have precedence entries but no infix parselet
        let mut p = new_parser("1 | 2");
        assert!(p.parse_program().is_none());
        assert!(!p.errors().is_empty());
    }

    #[test]
    fn test_program_absent_iff_errors() {
        for (input, want_ok) in [
            ("var answer = 42", true),
            ("println(answer)", true),
            ("var = 42", false),
            ("(", false),
            ("1.5", false),
        ] {
            let mut p = new_parser(input);
            let program = p.parse_program();
            assert_eq!(program.is_some(), want_ok, "input: {:?}", input);
            assert_eq!(p.errors().is_empty(), want_ok, "input: {:?}", input);
        }
    }

    #[test]
    fn test_render_reparse_round_trip() {
        let source = "var i = 1\n\
                      for i = 1; i <= 100; i++ {\n\
                      var m3 = (i % 3 == 0)\n\
                      var m5 = (i % 5 == 0)\n\
                      if (m3 && m5) {\n\
                      println(\"FizzBuzz\")\n\
                      continue\n\
                      }\n\
                      if (m3) {\n\
                      println(\"Fizz\")\n\
                      continue\n\
                      }\n\
                      if (m5) {\n\
                      println(\"Buzz\")\n\
                      continue\n\
                      }\n\
                      println(i)\n\
                      }\n";
        let mut p = new_parser(source);
        let program = p.parse_program().expect("program");
        assert!(p.errors().is_empty(), "errors: {:?}", p.errors());

        let rendered = format!("{}", program);
        let mut p = new_parser(&rendered);
        let reparsed = p.parse_program().expect("re-parsed program");
        assert!(p.errors().is_empty(), "errors: {:?}", p.errors());
        assert_eq!(rendered, format!("{}", reparsed));
    }
}
