//! Constructors for every node of the syntax tree.
//!
//! These are what the reader lowers into, and what embedders use to build
//! programs without going through text:
//!
//! ```
//! use lang::syntax::builder::*;
//!
//! let expr = add(vec![int(1), int(2)]);
//! ```

use crate::syntax::tree::{
    BinOp, CondBranch,
    Expr::{self, *},
    Ident,
    Lit::*,
    ListOp, MatchCase,
};

pub fn bool(v: bool) -> Expr {
    LitExpr(LitBool(v))
}

pub fn char(v: char) -> Expr {
    LitExpr(LitChar(v))
}

pub fn int(v: i64) -> Expr {
    LitExpr(LitInt(v))
}

pub fn string(v: impl Into<String>) -> Expr {
    LitExpr(LitString(v.into()))
}

pub fn nil() -> Expr {
    LitExpr(LitNil)
}

pub fn undefined() -> Expr {
    LitExpr(LitUndefined)
}

pub fn var(name: impl Into<Ident>) -> Expr {
    VarExpr(name.into())
}

pub fn lambda<I, S>(params: I, body: Expr) -> Expr
where
    I: IntoIterator<Item = S>,
    S: Into<Ident>,
{
    LambdaExpr(params.into_iter().map(Into::into).collect(), Box::new(body))
}

pub fn define(name: impl Into<Ident>, value: Expr) -> Expr {
    DefineExpr(name.into(), Box::new(value))
}

pub fn call(f: Expr, args: Vec<Expr>) -> Expr {
    CallExpr(Box::new(f), args)
}

pub fn block(exprs: Vec<Expr>) -> Expr {
    BlockExpr(exprs)
}

pub fn if_(cond: Expr, then: Expr, otherwise: Expr) -> Expr {
    IfExpr(Box::new(cond), Box::new(then), Box::new(otherwise))
}

pub fn when(cond: Expr, result: Expr) -> CondBranch {
    CondBranch(cond, result)
}

pub fn cond(branches: Vec<CondBranch>, otherwise: Expr) -> Expr {
    CondExpr(branches, Box::new(otherwise))
}

pub fn binary(op: BinOp, operands: Vec<Expr>) -> Expr {
    BinaryExpr(op, operands)
}

pub fn add(operands: Vec<Expr>) -> Expr {
    binary(BinOp::Add, operands)
}

pub fn sub(operands: Vec<Expr>) -> Expr {
    binary(BinOp::Sub, operands)
}

pub fn mul(operands: Vec<Expr>) -> Expr {
    binary(BinOp::Mul, operands)
}

pub fn modulo(operands: Vec<Expr>) -> Expr {
    binary(BinOp::Mod, operands)
}

pub fn and(operands: Vec<Expr>) -> Expr {
    binary(BinOp::And, operands)
}

pub fn or(operands: Vec<Expr>) -> Expr {
    binary(BinOp::Or, operands)
}

pub fn eq(lhs: Expr, rhs: Expr) -> Expr {
    binary(BinOp::Eq, vec![lhs, rhs])
}

pub fn gt(lhs: Expr, rhs: Expr) -> Expr {
    binary(BinOp::Gt, vec![lhs, rhs])
}

pub fn lt(lhs: Expr, rhs: Expr) -> Expr {
    binary(BinOp::Lt, vec![lhs, rhs])
}

pub fn ge(lhs: Expr, rhs: Expr) -> Expr {
    binary(BinOp::Ge, vec![lhs, rhs])
}

pub fn le(lhs: Expr, rhs: Expr) -> Expr {
    binary(BinOp::Le, vec![lhs, rhs])
}

pub fn quote(expr: Expr) -> Expr {
    QuoteExpr(Box::new(expr))
}

pub fn eval(expr: Expr) -> Expr {
    EvalExpr(Box::new(expr))
}

pub fn case(pattern: Expr, result: Expr) -> MatchCase {
    MatchCase(pattern, result)
}

/// `match` with a fallback arm.
pub fn match_(matchee: Expr, cases: Vec<MatchCase>, default: Expr) -> Expr {
    MatchExpr(Box::new(matchee), cases, Some(Box::new(default)))
}

/// `match` without a fallback arm; falling off the end is a runtime error.
pub fn match_exhaustive(matchee: Expr, cases: Vec<MatchCase>) -> Expr {
    MatchExpr(Box::new(matchee), cases, None)
}

pub fn capture(pattern: Expr, name: impl Into<Ident>) -> Expr {
    CaptureExpr(Box::new(pattern), name.into())
}

pub fn wildcard() -> Expr {
    Wildcard
}

pub fn wildcard_seq() -> Expr {
    WildcardSeq
}

pub fn list(elements: Vec<Expr>) -> Expr {
    ListExpr(elements)
}

pub fn list_op(op: ListOp, list: Expr, arg: Option<Expr>) -> Expr {
    ListOpExpr(op, Box::new(list), arg.map(Box::new))
}

pub fn head(list: Expr) -> Expr {
    list_op(ListOp::Head, list, None)
}

pub fn tail(list: Expr) -> Expr {
    list_op(ListOp::Tail, list, None)
}

pub fn push_head(list: Expr, value: Expr) -> Expr {
    list_op(ListOp::PushHead, list, Some(value))
}

pub fn push_last(list: Expr, value: Expr) -> Expr {
    list_op(ListOp::PushLast, list, Some(value))
}

pub fn pop_head(list: Expr) -> Expr {
    list_op(ListOp::PopHead, list, None)
}

pub fn pop_last(list: Expr) -> Expr {
    list_op(ListOp::PopLast, list, None)
}

pub fn drop_head(list: Expr) -> Expr {
    list_op(ListOp::DropHead, list, None)
}

pub fn drop_last(list: Expr) -> Expr {
    list_op(ListOp::DropLast, list, None)
}

pub fn concat(lhs: Expr, rhs: Expr) -> Expr {
    list_op(ListOp::Concat, lhs, Some(rhs))
}

pub fn println(expr: Expr) -> Expr {
    PrintlnExpr(Box::new(expr))
}
