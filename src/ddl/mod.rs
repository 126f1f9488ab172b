//! DDL extraction
//!
//! Tokenizer, recursive-descent parser and the typed statement model. Pure
//! text-to-struct transforms; no I/O.

pub mod lexer;
pub mod parser;
pub mod statement;

pub use self::parser::{parse_script, ParsedScript, ParsedStatement};
pub use self::statement::{AlterOp, DdlKind, DdlStatement, TypeDef};
