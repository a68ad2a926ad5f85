use crate::syntax::tree::{Expr, Lit, Program};

pub trait CodeGenerator {
    type Output;

    fn codegen(&self, input: &Program) -> Self::Output;
}

pub trait PartialCodeGenerator {
    type Output;

    fn partial_codegen_expr(&self, expr: &Expr) -> Self::Output;

    fn partial_codegen_lit(&self, lit: &Lit) -> Self::Output;
}

impl<T> CodeGenerator for T
where
    T: PartialCodeGenerator<Output = String>,
{
    type Output = String;

    fn codegen(&self, input: &Program) -> String {
        input
            .iter()
            .map(|expr| self.partial_codegen_expr(expr))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

pub mod crisp;
