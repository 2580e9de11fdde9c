pub mod arena;
pub mod ast;
pub mod codegen;
pub mod error;
pub mod grammar;

use codegen::Target;
use error::CompileError;
use grammar::lexer::Lexer;
use grammar::Parser;

/// Runs the whole pipeline — lex, parse, generate — and returns the
/// assembly text for `target`.
pub fn compile_to_assembly(source: &str, target: Target) -> Result<String, CompileError> {
    let tokens = Lexer::new(source).tokenize()?;
    let (program, ast) = Parser::new(tokens).parse_program()?;
    let asm = codegen::compile(&program, &ast, &*target.backend())?;
    Ok(asm)
}
