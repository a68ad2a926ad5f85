use crate::{
    runtime::pattern::Bindings,
    syntax::tree::{
        CondBranch,
        Expr::{self, *},
        MatchCase,
    },
};

/// Replaces every variable named in the bindings with the captured term.
/// Substitution is purely by name: it goes under `quote` and lambdas alike
/// and never renames anything.
pub trait Subst {
    type Output;

    fn subst(self, records: &Bindings) -> Self::Output;
}

impl<T: Subst<Output = T>> Subst for Box<T> {
    type Output = Box<T>;

    fn subst(self, records: &Bindings) -> Self::Output {
        let t = *self;
        Box::new(t.subst(records))
    }
}

impl<T: Subst<Output = T>> Subst for Vec<T> {
    type Output = Vec<T>;

    fn subst(self, records: &Bindings) -> Self::Output {
        self.into_iter().map(|t| t.subst(records)).collect()
    }
}

impl<T: Subst<Output = T>> Subst for Option<T> {
    type Output = Option<T>;

    fn subst(self, records: &Bindings) -> Self::Output {
        self.map(|t| t.subst(records))
    }
}

impl Subst for MatchCase {
    type Output = MatchCase;

    fn subst(self, records: &Bindings) -> Self::Output {
        MatchCase(self.0.subst(records), self.1.subst(records))
    }
}

impl Subst for CondBranch {
    type Output = CondBranch;

    fn subst(self, records: &Bindings) -> Self::Output {
        CondBranch(self.0.subst(records), self.1.subst(records))
    }
}

impl Subst for Expr {
    type Output = Expr;

    fn subst(self, records: &Bindings) -> Self::Output {
        match self {
            VarExpr(name) => match records.get(&name) {
                Some(replacement) => replacement.clone(),
                None => VarExpr(name),
            },

            LitExpr(_) | ValueExpr(_) | Wildcard | WildcardSeq => self,

            LambdaExpr(params, body) => LambdaExpr(params, body.subst(records)),
            DefineExpr(name, value) => DefineExpr(name, value.subst(records)),
            CallExpr(f, args) => CallExpr(f.subst(records), args.subst(records)),
            BlockExpr(exprs) => BlockExpr(exprs.subst(records)),

            IfExpr(cond, then, otherwise) => IfExpr(
                cond.subst(records),
                then.subst(records),
                otherwise.subst(records),
            ),

            CondExpr(branches, otherwise) => {
                CondExpr(branches.subst(records), otherwise.subst(records))
            }

            BinaryExpr(op, operands) => BinaryExpr(op, operands.subst(records)),
            QuoteExpr(expr) => QuoteExpr(expr.subst(records)),
            EvalExpr(expr) => EvalExpr(expr.subst(records)),

            MatchExpr(matchee, cases, default) => MatchExpr(
                matchee.subst(records),
                cases.subst(records),
                default.subst(records),
            ),

            CaptureExpr(pattern, name) => CaptureExpr(pattern.subst(records), name),
            ListExpr(elements) => ListExpr(elements.subst(records)),
            ListOpExpr(op, list, arg) => ListOpExpr(op, list.subst(records), arg.subst(records)),
            PrintlnExpr(expr) => PrintlnExpr(expr.subst(records)),
        }
    }
}
