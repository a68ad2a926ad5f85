use pest::{
    error::Error as PestError,
    iterators::{Pair, Pairs},
    Parser, Span,
};
use thiserror::Error;

use crate::syntax::tree::{
    BinOp, CondBranch,
    Expr::{self, *},
    Ident, Lit,
    Lit::*,
    ListOp, MatchCase, Program,
};

#[derive(Parser)]
#[grammar = "syntax/grammar.pest"]
pub struct CrispParser;

pub type ParseError = PestError<Rule>;

#[derive(Debug, Error)]
pub enum CompileError {
    #[error("{0}")]
    Syntax(Box<ParseError>),
    #[error("SyntaxError at {line}:{col}: ({form} ...) {reason}")]
    Malformed {
        form: String,
        reason: String,
        line: usize,
        col: usize,
    },
    #[error("SyntaxError at {line}:{col}: integer literal {text} is out of range")]
    IntOutOfRange { text: String, line: usize, col: usize },
}

impl CompileError {
    /// Attaches the source file name to syntax errors.
    pub fn with_path(self, path: &str) -> CompileError {
        match self {
            CompileError::Syntax(e) => CompileError::Syntax(Box::new(e.with_path(path))),
            other => other,
        }
    }
}

impl CrispParser {
    pub fn ast(input: &str) -> Result<Program, CompileError> {
        let crisp = CrispParser::parse(Rule::unit, input);
        let pairs = crisp.map_err(|e| CompileError::Syntax(Box::new(e)))?;
        parse_unit(pairs)
    }
}

fn parse_unit(pairs: Pairs<Rule>) -> Result<Program, CompileError> {
    pairs
        .into_iter()
        .flat_map(|item| item.into_inner())
        .filter(|node| node.as_rule() != Rule::EOI)
        .map(parse_expr)
        .collect()
}

fn parse_expr(node: Pair<Rule>) -> Result<Expr, CompileError> {
    match node.as_rule() {
        Rule::literal => parse_lit(node).map(LitExpr),
        Rule::symbol => Ok(parse_symbol(node.as_str())),
        Rule::quoted => {
            let inner = node.into_inner().next().unwrap();
            Ok(QuoteExpr(Box::new(parse_expr(inner)?)))
        }
        Rule::list => parse_form(node),
        _ => unreachable!("expr should be a literal, symbol, quoted expr or list"),
    }
}

fn parse_symbol(id: &str) -> Expr {
    match id {
        "_" => Wildcard,
        "___" => WildcardSeq,
        _ => VarExpr(id.to_owned()),
    }
}

/// A parenthesized form: its head symbol (if any) and the nodes after it.
struct Form<'i> {
    name: String,
    span: Span<'i>,
    args: Vec<Pair<'i, Rule>>,
}

impl<'i> Form<'i> {
    fn malformed(&self, reason: impl Into<String>) -> CompileError {
        let (line, col) = self.span.start_pos().line_col();
        CompileError::Malformed {
            form: self.name.clone(),
            reason: reason.into(),
            line,
            col,
        }
    }

    fn expect_args(&self, n: usize) -> Result<(), CompileError> {
        match self.args.len() {
            len if len == n => Ok(()),
            len => Err(self.malformed(format!("expects {} operand(s), but got {}", n, len))),
        }
    }

    fn expect_at_least(&self, n: usize) -> Result<(), CompileError> {
        match self.args.len() {
            len if len >= n => Ok(()),
            len => Err(self.malformed(format!(
                "expects at least {} operand(s), but got {}",
                n, len
            ))),
        }
    }

    fn exprs(self) -> Result<Vec<Expr>, CompileError> {
        self.args.into_iter().map(parse_expr).collect()
    }

    fn ident(&self, node: &Pair<'i, Rule>) -> Result<Ident, CompileError> {
        match node.as_rule() {
            Rule::symbol => Ok(node.as_str().to_owned()),
            _ => Err(self.malformed(format!("expects a name, but got '{}'", node.as_str()))),
        }
    }
}

fn parse_form(node: Pair<Rule>) -> Result<Expr, CompileError> {
    let span = node.as_span();
    let mut nodes = node.into_inner().collect::<Vec<_>>();
    if nodes.is_empty() {
        let (line, col) = span.start_pos().line_col();
        return Err(CompileError::Malformed {
            form: String::new(),
            reason: "is an empty form".to_owned(),
            line,
            col,
        });
    }

    let head = nodes.remove(0);
    let keyword = match head.as_rule() {
        Rule::symbol => Some(head.as_str().to_owned()),
        _ => None,
    };

    let binop = keyword.as_deref().and_then(BinOp::from_symbol);
    let listop = keyword.as_deref().and_then(ListOp::from_name);
    let form = Form {
        name: keyword.clone().unwrap_or_else(|| head.as_str().to_owned()),
        span,
        args: nodes,
    };

    if let Some(op) = binop {
        match op.is_chain() {
            true => form.expect_at_least(2)?,
            false => form.expect_args(2)?,
        }
        return form.exprs().map(|operands| BinaryExpr(op, operands));
    }

    if let Some(op) = listop {
        form.expect_args(op.arity())?;
        let mut exprs = form.exprs()?.into_iter();
        return match (exprs.next(), exprs.next()) {
            (Some(list), arg) => Ok(ListOpExpr(op, Box::new(list), arg.map(Box::new))),
            _ => unreachable!("operand count checked above"),
        };
    }

    match keyword.as_deref() {
        Some("lambda") => parse_lambda(form),
        Some("define") => parse_define(form),
        Some("block") => {
            form.expect_at_least(1)?;
            form.exprs().map(BlockExpr)
        }
        Some("if") => {
            form.expect_args(3)?;
            let mut exprs = form.exprs()?.into_iter();
            match (exprs.next(), exprs.next(), exprs.next()) {
                (Some(cond), Some(then), Some(otherwise)) => Ok(IfExpr(
                    Box::new(cond),
                    Box::new(then),
                    Box::new(otherwise),
                )),
                _ => unreachable!("operand count checked above"),
            }
        }
        Some("cond") => parse_cond(form),
        Some("quote") => parse_unary(form, QuoteExpr),
        Some("eval") => parse_unary(form, EvalExpr),
        Some("println") => parse_unary(form, PrintlnExpr),
        Some("match") => parse_match(form),
        Some("capture") => parse_capture(form),
        Some("list") => form.exprs().map(ListExpr),
        _ => {
            let f = parse_expr(head)?;
            form.exprs().map(|args| CallExpr(Box::new(f), args))
        }
    }
}

fn parse_unary(form: Form, build: fn(Box<Expr>) -> Expr) -> Result<Expr, CompileError> {
    form.expect_args(1)?;
    let mut exprs = form.exprs()?;
    Ok(build(Box::new(exprs.remove(0))))
}

fn parse_lambda(form: Form) -> Result<Expr, CompileError> {
    form.expect_args(2)?;
    let params = match form.args[0].as_rule() {
        Rule::list => form.args[0]
            .clone()
            .into_inner()
            .map(|param| form.ident(&param))
            .collect::<Result<Vec<_>, _>>()?,
        _ => return Err(form.malformed("expects a parameter list")),
    };
    let body = parse_expr(form.args[1].clone())?;
    Ok(LambdaExpr(params, Box::new(body)))
}

fn parse_define(form: Form) -> Result<Expr, CompileError> {
    form.expect_args(2)?;
    let name = form.ident(&form.args[0])?;
    let value = parse_expr(form.args[1].clone())?;
    Ok(DefineExpr(name, Box::new(value)))
}

fn parse_capture(form: Form) -> Result<Expr, CompileError> {
    form.expect_args(2)?;
    let name = form.ident(&form.args[1])?;
    let pattern = parse_expr(form.args[0].clone())?;
    Ok(CaptureExpr(Box::new(pattern), name))
}

/// Splits `(keyword a b ..)` into the keyword and its operands, if `node` is
/// a list headed by a symbol.
fn clause<'i>(node: &Pair<'i, Rule>) -> Option<(String, Vec<Pair<'i, Rule>>)> {
    if node.as_rule() != Rule::list {
        return None;
    }
    let mut inner = node.clone().into_inner();
    let head = inner.next()?;
    Some((head.as_str().to_owned(), inner.collect()))
}

fn parse_cond(form: Form) -> Result<Expr, CompileError> {
    let (last, arms) = match form.args.split_last() {
        Some(split) => split,
        None => return Err(form.malformed("requires a trailing (else ...) branch")),
    };

    let otherwise = match clause(last) {
        Some((head, mut rest)) if head == "else" && rest.len() == 1 => parse_expr(rest.remove(0))?,
        _ => return Err(form.malformed("requires a trailing (else ...) branch")),
    };

    let branches = arms
        .iter()
        .map(|arm| {
            let mut parts = match arm.as_rule() {
                Rule::list => arm.clone().into_inner().collect::<Vec<_>>(),
                _ => Vec::new(),
            };
            if parts.len() != 2 {
                return Err(form.malformed(format!("branch '{}' should be (cond result)", arm.as_str())));
            }
            let result = parse_expr(parts.remove(1))?;
            let cond = parse_expr(parts.remove(0))?;
            Ok(CondBranch(cond, result))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(CondExpr(branches, Box::new(otherwise)))
}

fn parse_match(form: Form) -> Result<Expr, CompileError> {
    form.expect_at_least(1)?;
    let matchee = parse_expr(form.args[0].clone())?;

    let mut cases = Vec::new();
    let mut default = None;
    let arms = &form.args[1..];
    for (idx, arm) in arms.iter().enumerate() {
        match clause(arm) {
            Some((head, mut rest)) if head == "case" && rest.len() == 2 => {
                let result = parse_expr(rest.remove(1))?;
                let pattern = parse_expr(rest.remove(0))?;
                cases.push(MatchCase(pattern, result));
            }
            Some((head, mut rest)) if head == "default" && rest.len() == 1 && idx + 1 == arms.len() => {
                default = Some(Box::new(parse_expr(rest.remove(0))?));
            }
            _ => {
                return Err(form.malformed(format!(
                    "arm '{}' should be (case pattern result) or a final (default result)",
                    arm.as_str()
                )))
            }
        }
    }

    Ok(MatchExpr(Box::new(matchee), cases, default))
}

fn parse_lit(lit: Pair<Rule>) -> Result<Lit, CompileError> {
    let lit = lit.into_inner().next().unwrap();
    match lit.as_rule() {
        Rule::bool_lit => Ok(LitBool(lit.as_str() == "true")),
        Rule::nil_lit => Ok(LitNil),
        Rule::undefined_lit => Ok(LitUndefined),
        Rule::int_lit => lit.as_str().parse::<i64>().map(LitInt).map_err(|_| {
            let (line, col) = lit.as_span().start_pos().line_col();
            CompileError::IntOutOfRange {
                text: lit.as_str().to_owned(),
                line,
                col,
            }
        }),
        Rule::char_lit => {
            let inner = lit.into_inner().next().unwrap().as_str();
            Ok(LitChar(unescaped(inner).chars().next().unwrap_or('\0')))
        }
        Rule::string_lit => {
            let inner = lit.into_inner().next().unwrap().as_str();
            Ok(LitString(unescaped(inner)))
        }
        _ => unreachable!("unsupported literal type: {:?}", lit.as_rule()),
    }
}

fn unescaped(input: &str) -> String {
    let mut str = String::with_capacity(input.len());
    let mut escape = false;
    for ch in input.chars() {
        if escape {
            escape = false;
            str.push(unescaped_char(ch));
        } else {
            match ch {
                '\\' => escape = true,
                _ => str.push(ch),
            }
        }
    }
    str
}

fn unescaped_char(ch: char) -> char {
    match ch {
        't' => '\t',
        'n' => '\n',
        'r' => '\r',
        '0' => '\0',
        '\'' => '\'',
        '\"' => '\"',
        '\\' => '\\',
        _ => ch,
    }
}
