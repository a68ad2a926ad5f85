use std::io;

use tracing::debug;

use crate::{
    runtime::{env::Environment, Context},
    Compiler, Error,
};

pub struct Builtins {}

impl Builtins {
    /// Layers the prelude beneath whatever `ctx` has already bound, so
    /// user definitions shadow it.
    pub fn init(ctx: &mut Context) -> Result<(), Error> {
        let prelude = Builtins::prelude()?;
        ctx.env = ctx.env.concat(&prelude);
        Ok(())
    }

    /// An environment holding only the prelude helpers.
    pub fn prelude() -> Result<Environment, Error> {
        let prelude_decl = include_str!("prelude.crisp");
        let ast = Compiler::compile(prelude_decl)?;
        let mut ctx = Context::new().with_output(io::sink());
        ctx.source(ast)?;
        debug!(names = ctx.env.names().len(), "prelude loaded");
        Ok(ctx.env)
    }
}
