use std::error::Error;
use std::fmt;
use std::fmt::Formatter;

use crate::token::{lookup_identifier, Token, TokenType};

/// Extracts tokens from Gosling source code.
///
/// The scanner is a single-pass character machine. It never fails after
/// construction; malformed lexemes are delivered in-stream as `Illegal`
/// tokens. Construction fails only when the input contains a NUL character.
pub struct Scanner {
    config: Config,
    input: Vec<char>,

    pos: usize, // current rune position in input, capped at input.len()
    ch: char,   // current rune; '\0' at end of input
    insert_semicolon: bool, // return next '\n' as a semicolon
}

/// Configures the scanner.
#[derive(Debug, Clone, Copy, Default)]
pub struct Config {
    /// If true, the scanner skips the first line of the input when it starts
    /// with `#!`.
    pub skip_shebang: bool,
}

/// Error returned by [`Scanner::new`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScannerError {
    NulCharacter,
}

impl fmt::Display for ScannerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ScannerError::NulCharacter => write!(f, "input contains NUL character (U+0000)"),
        }
    }
}

impl Error for ScannerError {}

fn is_letter(ch: char) -> bool {
    ch.is_ascii_lowercase() || ch.is_ascii_uppercase() || ch == '_'
}

fn is_digit(ch: char) -> bool {
    ch.is_ascii_digit()
}

fn new_token(offset: usize, token_type: TokenType, literal: &str) -> Token {
    Token {
        offset,
        token_type,
        literal: literal.to_string(),
    }
}

impl Scanner {
    /// Creates a new scanner for the given Gosling source code.
    pub fn new(input: &str, config: Config) -> Result<Self, ScannerError> {
        if input.contains('\0') {
            return Err(ScannerError::NulCharacter);
        }
        let input: Vec<char> = input.chars().collect();
        let ch = input.first().copied().unwrap_or('\0');
        Ok(Scanner {
            config,
            input,
            pos: 0,
            ch,
            insert_semicolon: false,
        })
    }

    /// Returns the next scanned token. Once it returns an `EOF` token, it
    /// will continue to return the same `EOF` token.
    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace();
        let (tok, insert_semicolon) = self.scan();
        // The flag is computed during the scan but must only take effect on
        // the next whitespace skip.
        self.insert_semicolon = insert_semicolon;
        tok
    }

    fn scan(&mut self) -> (Token, bool) {
        let offset = self.pos;
        let mut insert_semicolon = false;

        let token_type: TokenType;
        let literal: String;

        match self.ch {
            '\0' => return (new_token(offset, TokenType::Eof, ""), false),

            '\n' => {
                // skip_whitespace() stopped on '\n', insert a semicolon
                token_type = TokenType::Semicolon;
                literal = "\n".to_string();
            }

            '#' => {
                if offset == 0 && self.peek_char() == '!' && self.config.skip_shebang {
                    self.read_line();
                    self.skip_whitespace();
                    return self.scan();
                }
                token_type = TokenType::Illegal;
                literal = "#".to_string();
            }

            '=' => match self.peek_char() {
                '=' => {
                    self.read_char();
                    token_type = TokenType::Equal;
                    literal = "==".to_string();
                }
                _ => {
                    token_type = TokenType::Assignment;
                    literal = "=".to_string();
                }
            },
            ':' => match self.peek_char() {
                '=' => {
                    self.read_char();
                    token_type = TokenType::Define;
                    literal = ":=".to_string();
                }
                _ => {
                    token_type = TokenType::Colon;
                    literal = ":".to_string();
                }
            },

            '+' => match self.peek_char() {
                '+' => {
                    self.read_char();
                    token_type = TokenType::Increment;
                    literal = "++".to_string();
                    insert_semicolon = true;
                }
                '=' => {
                    self.read_char();
                    token_type = TokenType::SumAssignment;
                    literal = "+=".to_string();
                }
                _ => {
                    token_type = TokenType::Sum;
                    literal = "+".to_string();
                }
            },
            '-' => match self.peek_char() {
                '-' => {
                    self.read_char();
                    token_type = TokenType::Decrement;
                    literal = "--".to_string();
                    insert_semicolon = true;
                }
                '=' => {
                    self.read_char();
                    token_type = TokenType::DifferenceAssignment;
                    literal = "-=".to_string();
                }
                _ => {
                    token_type = TokenType::Difference;
                    literal = "-".to_string();
                }
            },
            '*' => match self.peek_char() {
                '=' => {
                    self.read_char();
                    token_type = TokenType::ProductAssignment;
                    literal = "*=".to_string();
                }
                _ => {
                    token_type = TokenType::Product;
                    literal = "*".to_string();
                }
            },
            '/' => match self.peek_char() {
                '/' => {
                    // line comment, consumed up to but excluding '\n'
                    let literal = self.read_line();
                    return (new_token(offset, TokenType::Comment, &literal), false);
                }
                '=' => {
                    self.read_char();
                    token_type = TokenType::QuotientAssignment;
                    literal = "/=".to_string();
                }
                _ => {
                    token_type = TokenType::Quotient;
                    literal = "/".to_string();
                }
            },
            '%' => match self.peek_char() {
                '=' => {
                    self.read_char();
                    token_type = TokenType::RemainderAssignment;
                    literal = "%=".to_string();
                }
                _ => {
                    token_type = TokenType::Remainder;
                    literal = "%".to_string();
                }
            },

            '&' => match self.peek_char() {
                '&' => {
                    self.read_char();
                    token_type = TokenType::LogicalAnd;
                    literal = "&&".to_string();
                }
                _ => {
                    token_type = TokenType::BitwiseAnd;
                    literal = "&".to_string();
                }
            },
            '|' => match self.peek_char() {
                '|' => {
                    self.read_char();
                    token_type = TokenType::LogicalOr;
                    literal = "||".to_string();
                }
                _ => {
                    token_type = TokenType::BitwiseOr;
                    literal = "|".to_string();
                }
            },
            '^' => {
                token_type = TokenType::BitwiseXor;
                literal = "^".to_string();
            }

            '!' => match self.peek_char() {
                '=' => {
                    self.read_char();
                    token_type = TokenType::NotEqual;
                    literal = "!=".to_string();
                }
                _ => {
                    token_type = TokenType::Not;
                    literal = "!".to_string();
                }
            },

            '<' => match self.peek_char() {
                '=' => {
                    self.read_char();
                    token_type = TokenType::LessOrEqual;
                    literal = "<=".to_string();
                }
                _ => {
                    token_type = TokenType::Less;
                    literal = "<".to_string();
                }
            },
            '>' => match self.peek_char() {
                '=' => {
                    self.read_char();
                    token_type = TokenType::GreaterOrEqual;
                    literal = ">=".to_string();
                }
                _ => {
                    token_type = TokenType::Greater;
                    literal = ">".to_string();
                }
            },

            ';' => {
                token_type = TokenType::Semicolon;
                literal = ";".to_string();
            }
            ',' => {
                token_type = TokenType::Comma;
                literal = ",".to_string();
            }
            '.' => {
                token_type = TokenType::Period;
                literal = ".".to_string();
            }

            '(' => {
                token_type = TokenType::LParen;
                literal = "(".to_string();
            }
            ')' => {
                token_type = TokenType::RParen;
                literal = ")".to_string();
                insert_semicolon = true;
            }
            '{' => {
                token_type = TokenType::LBrace;
                literal = "{".to_string();
            }
            '}' => {
                token_type = TokenType::RBrace;
                literal = "}".to_string();
                insert_semicolon = true;
            }

            '"' => {
                let (literal, ok) = self.read_string();
                let token_type = if ok {
                    TokenType::String
                } else {
                    TokenType::Illegal
                };
                return (new_token(offset, token_type, &literal), true);
            }

            c if is_letter(c) => {
                let literal = self.read_identifier();
                let token_type = lookup_identifier(&literal);
                let insert_semicolon = matches!(
                    token_type,
                    TokenType::Identifier
                        | TokenType::Break
                        | TokenType::Continue
                        | TokenType::Fallthrough
                        | TokenType::Return
                        | TokenType::True
                        | TokenType::False
                );
                return (new_token(offset, token_type, &literal), insert_semicolon);
            }

            c if is_digit(c) => return self.scan_number(offset),

            other => {
                token_type = TokenType::Illegal;
                literal = other.to_string();
            }
        }

        self.read_char();
        (Token { offset, token_type, literal }, insert_semicolon)
    }

    fn scan_number(&mut self, offset: usize) -> (Token, bool) {
        let (mut literal, ok) = self.read_int();
        let mut token_type = if ok {
            TokenType::Integer
        } else {
            TokenType::Illegal
        };

        if self.ch == '.' {
            // consume the '.' and see if a float can be formed
            self.read_char();
            let (fraction, fraction_ok) = self.read_int();
            token_type = if ok && fraction_ok && !fraction.is_empty() {
                TokenType::Float
            } else {
                TokenType::Illegal
            };
            literal = format!("{}.{}", literal, fraction);
        }

        (new_token(offset, token_type, &literal), true)
    }

    fn skip_whitespace(&mut self) {
        loop {
            match self.ch {
                ' ' | '\t' | '\r' => self.read_char(),
                '\n' => {
                    if self.insert_semicolon {
                        return;
                    }
                    self.read_char();
                }
                _ => return,
            }
        }
    }

    fn peek_char(&self) -> char {
        self.input.get(self.pos + 1).copied().unwrap_or('\0')
    }

    fn read_char(&mut self) {
        if self.pos < self.input.len() {
            self.pos += 1;
        }
        self.ch = self.input.get(self.pos).copied().unwrap_or('\0');
    }

    /// Reads and returns the line up to but excluding '\n' or end of input,
    /// starting at the current rune.
    fn read_line(&mut self) -> String {
        let start = self.pos;
        loop {
            self.read_char();
            if self.ch == '\n' || self.ch == '\0' {
                break;
            }
        }
        self.input[start..self.pos].iter().collect()
    }

    /// Reads a digit run. The returned flag is false when the run is
    /// immediately followed by identifier characters, which are then consumed
    /// into the returned lexeme (`42foo`).
    fn read_int(&mut self) -> (String, bool) {
        let start = self.pos;
        while is_digit(self.ch) {
            self.read_char();
        }
        let mut ok = true;
        if is_letter(self.ch) {
            ok = false;
            while is_letter(self.ch) || is_digit(self.ch) {
                self.read_char();
            }
        }
        (self.input[start..self.pos].iter().collect(), ok)
    }

    /// Reads a string literal including both quotes. The returned flag is
    /// false when the input ended before the closing quote.
    fn read_string(&mut self) -> (String, bool) {
        let start = self.pos;
        loop {
            self.read_char();
            if self.ch == '"' || self.ch == '\0' {
                break;
            }
        }
        let ok = self.ch == '"';
        if ok {
            self.read_char();
        }
        (self.input[start..self.pos].iter().collect(), ok)
    }

    fn read_identifier(&mut self) -> String {
        let start = self.pos;
        while is_letter(self.ch) || is_digit(self.ch) {
            self.read_char();
        }
        self.input[start..self.pos].iter().collect()
    }
}

#[cfg(test)]
impl Scanner {
    /// Returns all tokens until `EOF` or `Illegal`, inclusive.
    fn all_tokens(&mut self) -> Vec<Token> {
        let mut res = Vec::new();
        loop {
            let tok = self.next_token();
            let token_type = tok.token_type;
            res.push(tok);
            match token_type {
                TokenType::Eof | TokenType::Illegal => return res,
                _ => {}
            }
        }
    }
}
