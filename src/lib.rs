//! The Gosling programming language: a scanner with automatic semicolon
//! insertion, a Pratt parser, and a tree-walking interpreter over a shared
//! AST and runtime value model.

pub mod ast;
pub mod builtin;
pub mod interpreter;
pub mod object;
pub mod parser;
pub mod scanner;
pub mod scope;
pub mod token;
