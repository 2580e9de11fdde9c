use std::fmt;
use thiserror::Error;

use crate::codegen::CodegenError;
use crate::grammar::lexer::LexError;
use crate::grammar::ParseError;

/// Any of the fatal errors the pipeline can stop on. The first one aborts
/// compilation; there is no recovery or batching.
#[derive(Debug, Error)]
pub enum CompileError {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Codegen(#[from] CodegenError),
}

/// What a failed expectation was looking for: a concrete token kind or a
/// free-form description such as `'expression'`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WantedSpec<T> {
    Specific(T),
    Description(&'static str),
}

impl<T: fmt::Display> fmt::Display for WantedSpec<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Specific(tok) => write!(f, "{}", tok),
            Self::Description(desc) => f.write_str(desc),
        }
    }
}
