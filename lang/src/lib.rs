use crate::{
    runtime::RuntimeError,
    syntax::{
        parse::{CompileError, CrispParser},
        tree::Program,
    },
};

extern crate pest;
#[macro_use]
extern crate pest_derive;

pub mod codegen;
pub mod runtime;
pub mod syntax;

/// Anything that can go wrong between source text and a value.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Compile(#[from] CompileError),
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}

pub struct Compiler;

impl Compiler {
    pub fn compile(input: &str) -> Result<Program, CompileError> {
        CrispParser::ast(input)
    }
}
