use crate::{
    codegen::PartialCodeGenerator,
    syntax::tree::{
        CondBranch,
        Expr::{self, *},
        Lit::{self, *},
        MatchCase,
    },
};

/// Renders syntax trees back into source text the reader accepts.
pub struct CrispCodeGenerator;

impl CrispCodeGenerator {
    pub fn new() -> CrispCodeGenerator {
        CrispCodeGenerator {}
    }
}

impl Default for CrispCodeGenerator {
    fn default() -> Self {
        CrispCodeGenerator::new()
    }
}

impl PartialCodeGenerator for CrispCodeGenerator {
    type Output = String;

    fn partial_codegen_expr(&self, expr: &Expr) -> String {
        expr.codegen_to_crisp()
    }

    fn partial_codegen_lit(&self, lit: &Lit) -> String {
        lit.codegen_to_crisp()
    }
}

trait TargetCrisp {
    fn codegen_to_crisp(&self) -> String;
}

impl<T: TargetCrisp> TargetCrisp for Box<T> {
    fn codegen_to_crisp(&self) -> String {
        (**self).codegen_to_crisp()
    }
}

impl<T: TargetCrisp> TargetCrisp for Vec<T> {
    fn codegen_to_crisp(&self) -> String {
        self.iter()
            .map(|t| t.codegen_to_crisp())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl TargetCrisp for CondBranch {
    fn codegen_to_crisp(&self) -> String {
        format!("({} {})", self.0.codegen_to_crisp(), self.1.codegen_to_crisp())
    }
}

impl TargetCrisp for MatchCase {
    fn codegen_to_crisp(&self) -> String {
        format!(
            "(case {} {})",
            self.0.codegen_to_crisp(),
            self.1.codegen_to_crisp()
        )
    }
}

impl TargetCrisp for Lit {
    fn codegen_to_crisp(&self) -> String {
        match self {
            LitBool(v) => v.to_string(),
            LitChar(v) => format!("'{}'", escaped(*v, '\'')),
            LitInt(v) => v.to_string(),
            LitString(v) => format!(
                "\"{}\"",
                v.chars().map(|ch| escaped(ch, '"')).collect::<String>()
            ),
            LitNil => "nil".to_string(),
            LitUndefined => "undefined".to_string(),
        }
    }
}

impl TargetCrisp for Expr {
    fn codegen_to_crisp(&self) -> String {
        match self {
            LitExpr(lit) => lit.codegen_to_crisp(),
            VarExpr(id) => id.clone(),
            LambdaExpr(params, body) => {
                format!("(lambda ({}) {})", params.join(" "), body.codegen_to_crisp())
            }
            DefineExpr(name, value) => format!("(define {} {})", name, value.codegen_to_crisp()),
            CallExpr(f, args) => form(&f.codegen_to_crisp(), args),
            BlockExpr(exprs) => form("block", exprs),
            IfExpr(cond, then, otherwise) => format!(
                "(if {} {} {})",
                cond.codegen_to_crisp(),
                then.codegen_to_crisp(),
                otherwise.codegen_to_crisp()
            ),
            CondExpr(branches, otherwise) => {
                let mut arms = branches
                    .iter()
                    .map(|b| b.codegen_to_crisp())
                    .collect::<Vec<_>>();
                arms.push(format!("(else {})", otherwise.codegen_to_crisp()));
                format!("(cond {})", arms.join(" "))
            }
            BinaryExpr(op, operands) => form(op.symbol(), operands),
            QuoteExpr(expr) => format!("`{}", expr.codegen_to_crisp()),
            EvalExpr(expr) => format!("(eval {})", expr.codegen_to_crisp()),
            MatchExpr(matchee, cases, default) => {
                let mut arms = vec![matchee.codegen_to_crisp()];
                arms.extend(cases.iter().map(|c| c.codegen_to_crisp()));
                if let Some(default) = default {
                    arms.push(format!("(default {})", default.codegen_to_crisp()));
                }
                format!("(match {})", arms.join(" "))
            }
            CaptureExpr(pattern, name) => {
                format!("(capture {} {})", pattern.codegen_to_crisp(), name)
            }
            Wildcard => "_".to_string(),
            WildcardSeq => "___".to_string(),
            ListExpr(elements) => form("list", elements),
            ListOpExpr(op, list, arg) => match arg {
                Some(arg) => format!(
                    "({} {} {})",
                    op.name(),
                    list.codegen_to_crisp(),
                    arg.codegen_to_crisp()
                ),
                None => format!("({} {})", op.name(), list.codegen_to_crisp()),
            },
            PrintlnExpr(expr) => format!("(println {})", expr.codegen_to_crisp()),
            ValueExpr(value) => value.to_string(),
        }
    }
}

fn form(head: &str, args: &Vec<Expr>) -> String {
    match args.len() {
        0 => format!("({})", head),
        _ => format!("({} {})", head, args.codegen_to_crisp()),
    }
}

fn escaped(ch: char, quote: char) -> String {
    match ch {
        '\n' => "\\n".to_string(),
        '\t' => "\\t".to_string(),
        '\r' => "\\r".to_string(),
        '\0' => "\\0".to_string(),
        '\\' => "\\\\".to_string(),
        c if c == quote => format!("\\{}", c),
        c => c.to_string(),
    }
}
