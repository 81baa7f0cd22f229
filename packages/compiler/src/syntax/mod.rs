//! Razor Syntax
//!
//! Syntax tree, directive table and the markup parser that feeds lowering.

pub mod ast;
pub mod directives;
pub mod html_tags;
pub mod parser;

pub use ast::*;
pub use parser::parse;
