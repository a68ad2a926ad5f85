use std::{cmp::Ordering, io::Write};

use tracing::{debug, trace};

use crate::{
    runtime::{
        env::{Environment, Scope},
        list::List,
        pattern::Matcher,
        subst::Subst,
        Closure, RuntimeError,
        RuntimeError::{
            ArityMismatch, DanglingPattern, DivisionByZero, EmptyBlock, NonExhaustive,
            NotApplicable, NotQuoted, OperandCount, Overflow, TypeMismatch,
        },
        Value,
        Value::{
            BoolValue, CharValue, ClosureValue, IntValue, ListValue, NilValue, QuotedValue,
            StringValue, UndefinedValue,
        },
    },
    syntax::tree::{
        BinOp, CondBranch,
        Expr::{self, *},
        Ident, Lit,
        Lit::{LitBool, LitChar, LitInt, LitNil, LitString, LitUndefined},
        ListOp, MatchCase,
    },
};

/// The value of an expression together with the environment the next
/// expression in the same sequence sees.
pub(crate) type Evaluated = (Value, Environment);

pub(crate) trait Eval {
    fn eval_into(&self, env: &Environment, out: &mut dyn Write) -> Result<Evaluated, RuntimeError>;
}

impl<T: Eval> Eval for Box<T> {
    fn eval_into(&self, env: &Environment, out: &mut dyn Write) -> Result<Evaluated, RuntimeError> {
        (**self).eval_into(env, out)
    }
}

/// Sequential evaluation: each item sees the definitions of the ones before.
impl<T: Eval> Eval for Vec<T> {
    fn eval_into(&self, env: &Environment, out: &mut dyn Write) -> Result<Evaluated, RuntimeError> {
        let mut value = UndefinedValue;
        let mut env = env.clone();
        for expr in self {
            let (v, next) = expr.eval_into(&env, out)?;
            value = v;
            env = next;
        }

        Ok((value, env))
    }
}

impl Eval for Lit {
    fn eval_into(&self, env: &Environment, _: &mut dyn Write) -> Result<Evaluated, RuntimeError> {
        let value = match self {
            LitBool(v) => BoolValue(*v),
            LitChar(v) => CharValue(*v),
            LitInt(v) => IntValue(*v),
            LitString(v) => StringValue(v.clone()),
            LitNil => NilValue,
            LitUndefined => UndefinedValue,
        };
        Ok((value, env.clone()))
    }
}

impl Eval for Expr {
    fn eval_into(&self, env: &Environment, out: &mut dyn Write) -> Result<Evaluated, RuntimeError> {
        match self {
            LitExpr(lit) => lit.eval_into(env, out),
            VarExpr(name) => Ok((env.lookup(name), env.clone())),
            LambdaExpr(params, body) => {
                let closure = Closure::new(env.clone(), params.clone(), (**body).clone());
                Ok((ClosureValue(closure), env.clone()))
            }
            DefineExpr(name, value) => eval_define(env, out, name, value),
            CallExpr(f, args) => eval_call(env, out, f, args),
            BlockExpr(exprs) if exprs.is_empty() => Err(EmptyBlock),
            BlockExpr(exprs) => exprs.eval_into(env, out),
            IfExpr(cond, then, otherwise) => match value_of(cond, env, out)? {
                BoolValue(false) => otherwise.eval_into(env, out),
                _ => then.eval_into(env, out),
            },
            CondExpr(branches, otherwise) => eval_cond(env, out, branches, otherwise),
            BinaryExpr(op, operands) => {
                let value = eval_binary(env, out, *op, operands)?;
                Ok((value, env.clone()))
            }
            QuoteExpr(expr) => Ok((QuotedValue((**expr).clone()), env.clone())),
            EvalExpr(expr) => match value_of(expr, env, out)? {
                QuotedValue(quoted) => quoted.eval_into(env, out),
                other => Err(NotQuoted(other.type_name())),
            },
            MatchExpr(matchee, cases, default) => eval_match(env, out, matchee, cases, default),
            CaptureExpr(_, _) => Err(DanglingPattern("capture")),
            Wildcard => Err(DanglingPattern("_")),
            WildcardSeq => Err(DanglingPattern("___")),
            ListExpr(elements) => {
                let list = elements
                    .iter()
                    .map(|e| value_of(e, env, out))
                    .collect::<Result<List, _>>()?;
                Ok((ListValue(list), env.clone()))
            }
            ListOpExpr(op, list, arg) => {
                let value = eval_list_op(env, out, *op, list, arg.as_deref())?;
                Ok((value, env.clone()))
            }
            ValueExpr(value) => Ok(((**value).clone(), env.clone())),
            PrintlnExpr(expr) => {
                match value_of(expr, env, out)? {
                    StringValue(s) => writeln!(out, "{}", s)?,
                    v => writeln!(out, "{}", v)?,
                }
                Ok((UndefinedValue, env.clone()))
            }
        }
    }
}

/// Evaluates a sub-expression whose definitions must not escape.
fn value_of(expr: &Expr, env: &Environment, out: &mut dyn Write) -> Result<Value, RuntimeError> {
    expr.eval_into(env, out).map(|(value, _)| value)
}

fn eval_define(
    env: &Environment,
    out: &mut dyn Write,
    name: &Ident,
    value: &Expr,
) -> Result<Evaluated, RuntimeError> {
    let value = value_of(value, env, out)?;
    debug!(name = name.as_str(), ty = value.type_name(), "define");
    Ok((UndefinedValue, env.define(name.clone(), value)))
}

fn eval_call(
    env: &Environment,
    out: &mut dyn Write,
    f: &Expr,
    args: &[Expr],
) -> Result<Evaluated, RuntimeError> {
    let closure = match value_of(f, env, out)? {
        ClosureValue(closure) => closure,
        other => return Err(NotApplicable(other.type_name())),
    };

    if closure.argc() != args.len() {
        return Err(ArityMismatch {
            expected: closure.argc(),
            got: args.len(),
        });
    }

    let scope = closure
        .params
        .iter()
        .zip(args)
        .map(|(param, arg)| value_of(arg, env, out).map(|v| (param.clone(), v)))
        .collect::<Result<Scope, _>>()?;

    // The call site goes last so a function defined by name can still
    // reach itself (and its siblings) when it recurses.
    let exec = closure.env.push_scope(scope).concat(env);
    trace!(argc = args.len(), depth = exec.depth(), "call");

    let value = value_of(&closure.body, &exec, out)?;
    Ok((value, env.clone()))
}

fn eval_cond(
    env: &Environment,
    out: &mut dyn Write,
    branches: &[CondBranch],
    otherwise: &Expr,
) -> Result<Evaluated, RuntimeError> {
    for CondBranch(cond, result) in branches {
        match value_of(cond, env, out)? {
            BoolValue(true) => return result.eval_into(env, out),
            BoolValue(false) => continue,
            other => {
                return Err(TypeMismatch {
                    op: "cond",
                    expected: "Bool",
                    got: other.type_name().to_string(),
                })
            }
        }
    }

    otherwise.eval_into(env, out)
}

fn eval_match(
    env: &Environment,
    out: &mut dyn Write,
    matchee: &Expr,
    cases: &Vec<MatchCase>,
    default: &Option<Box<Expr>>,
) -> Result<Evaluated, RuntimeError> {
    // Quoted code is matched as the code it holds.
    let source = match value_of(matchee, env, out)? {
        QuotedValue(expr) => expr,
        value => value.into_expr(),
    };

    match cases.try_match(&source) {
        Some((records, result)) => {
            debug!(captures = records.len(), "match case selected");
            if records.is_empty() {
                result.eval_into(env, out)
            } else {
                result.clone().subst(&records).eval_into(env, out)
            }
        }
        None => match default {
            Some(default) => default.eval_into(env, out),
            None => Err(NonExhaustive),
        },
    }
}

fn eval_binary(
    env: &Environment,
    out: &mut dyn Write,
    op: BinOp,
    operands: &[Expr],
) -> Result<Value, RuntimeError> {
    let values = operands
        .iter()
        .map(|e| value_of(e, env, out))
        .collect::<Result<Vec<_>, _>>()?;

    if op.is_chain() {
        match values.split_first() {
            Some((first, rest)) if !rest.is_empty() => rest
                .iter()
                .try_fold(first.clone(), |lhs, rhs| apply_chain(op, lhs, rhs)),
            _ => Err(OperandCount {
                op: op.symbol(),
                expected: "at least 2",
                got: values.len(),
            }),
        }
    } else {
        match values.as_slice() {
            [lhs, rhs] => compare(op, lhs, rhs),
            _ => Err(OperandCount {
                op: op.symbol(),
                expected: "exactly 2",
                got: values.len(),
            }),
        }
    }
}

fn apply_chain(op: BinOp, lhs: Value, rhs: &Value) -> Result<Value, RuntimeError> {
    let symbol = op.symbol();
    match (op, &lhs, rhs) {
        (BinOp::Add, IntValue(l), IntValue(r)) => l.checked_add(*r).map(IntValue).ok_or(Overflow(symbol)),
        (BinOp::Sub, IntValue(l), IntValue(r)) => l.checked_sub(*r).map(IntValue).ok_or(Overflow(symbol)),
        (BinOp::Mul, IntValue(l), IntValue(r)) => l.checked_mul(*r).map(IntValue).ok_or(Overflow(symbol)),
        (BinOp::Mod, IntValue(_), IntValue(0)) => Err(DivisionByZero),
        (BinOp::Mod, IntValue(l), IntValue(r)) => l.checked_rem(*r).map(IntValue).ok_or(Overflow(symbol)),
        (BinOp::And, BoolValue(l), BoolValue(r)) => Ok(BoolValue(*l && *r)),
        (BinOp::Or, BoolValue(l), BoolValue(r)) => Ok(BoolValue(*l || *r)),
        (BinOp::And, _, _) | (BinOp::Or, _, _) => Err(mismatch(symbol, "Bool", &lhs, rhs)),
        _ => Err(mismatch(symbol, "Int", &lhs, rhs)),
    }
}

fn compare(op: BinOp, lhs: &Value, rhs: &Value) -> Result<Value, RuntimeError> {
    if op == BinOp::Eq {
        return Ok(BoolValue(lhs == rhs));
    }

    let ordering = lhs
        .compare(rhs)
        .ok_or_else(|| mismatch(op.symbol(), "two Ints, Chars or Strings", lhs, rhs))?;

    let holds = match op {
        BinOp::Gt => ordering == Ordering::Greater,
        BinOp::Lt => ordering == Ordering::Less,
        BinOp::Ge => ordering != Ordering::Less,
        _ => ordering != Ordering::Greater,
    };
    Ok(BoolValue(holds))
}

fn mismatch(op: &'static str, expected: &'static str, lhs: &Value, rhs: &Value) -> RuntimeError {
    TypeMismatch {
        op,
        expected,
        got: format!("{} and {}", lhs.type_name(), rhs.type_name()),
    }
}

fn eval_list_op(
    env: &Environment,
    out: &mut dyn Write,
    op: ListOp,
    list: &Expr,
    arg: Option<&Expr>,
) -> Result<Value, RuntimeError> {
    let given = 1 + arg.map_or(0, |_| 1);
    if given != op.arity() {
        return Err(ArityMismatch {
            expected: op.arity(),
            got: given,
        });
    }

    let list = match value_of(list, env, out)? {
        ListValue(list) => list,
        other => {
            return Err(TypeMismatch {
                op: op.name(),
                expected: "List",
                got: other.type_name().to_string(),
            })
        }
    };
    let arg = match arg {
        Some(arg) => Some(value_of(arg, env, out)?),
        None => None,
    };

    match (op, arg) {
        (ListOp::Head, _) => list.head(),
        (ListOp::Tail, _) => list.tail().map(ListValue),
        (ListOp::PopHead, _) => list.pop_head(),
        (ListOp::PopLast, _) => list.pop_last(),
        (ListOp::DropHead, _) => list.drop_head().map(ListValue),
        (ListOp::DropLast, _) => list.drop_last().map(ListValue),
        (ListOp::PushHead, Some(value)) => Ok(ListValue(list.push_head(value))),
        (ListOp::PushLast, Some(value)) => Ok(ListValue(list.push_last(value))),
        (ListOp::Concat, Some(ListValue(other))) => Ok(ListValue(list.concat(&other))),
        (ListOp::Concat, Some(other)) => Err(TypeMismatch {
            op: op.name(),
            expected: "List",
            got: other.type_name().to_string(),
        }),
        (_, None) => Err(ArityMismatch {
            expected: op.arity(),
            got: 1,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        runtime::{evaluate, Context},
        syntax::builder::*,
    };
    use pretty_assertions::assert_eq;
    use std::{cell::RefCell, io, rc::Rc};

    fn run(expr: Expr) -> Result<Value, RuntimeError> {
        evaluate(&expr, &Environment::new())
    }

    fn ints(items: &[i64]) -> Value {
        ListValue(items.iter().copied().map(IntValue).collect())
    }

    #[derive(Clone, Default)]
    struct Captured(Rc<RefCell<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.borrow_mut().write(buf)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Captured {
        fn text(&self) -> String {
            String::from_utf8_lossy(&self.0.borrow()).into_owned()
        }
    }

    #[test]
    fn literals_evaluate_to_themselves() {
        assert_eq!(run(int(7)).unwrap(), IntValue(7));
        assert_eq!(run(char('c')).unwrap(), CharValue('c'));
        assert_eq!(run(string("s")).unwrap(), StringValue("s".into()));
        assert_eq!(run(nil()).unwrap(), NilValue);
        assert_eq!(run(undefined()).unwrap(), UndefinedValue);
    }

    #[test]
    fn arithmetic_folds_left() {
        assert_eq!(run(add(vec![int(1), int(2), int(3), int(4)])).unwrap(), IntValue(10));
        assert_eq!(run(sub(vec![int(10), int(3), int(2)])).unwrap(), IntValue(5));
        assert_eq!(run(mul(vec![int(2), int(3), int(4)])).unwrap(), IntValue(24));
        assert_eq!(run(modulo(vec![int(100), int(7), int(4)])).unwrap(), IntValue(2));
        assert_eq!(run(modulo(vec![int(-7), int(3)])).unwrap(), IntValue(-1));
    }

    #[test]
    fn logic_folds_over_bools() {
        assert_eq!(run(and(vec![bool(true), bool(true), bool(false)])).unwrap(), BoolValue(false));
        assert_eq!(run(or(vec![bool(false), bool(false), bool(true)])).unwrap(), BoolValue(true));
    }

    #[test]
    fn operator_type_and_count_errors() {
        assert!(matches!(run(add(vec![int(1), char('a')])), Err(TypeMismatch { op: "+", .. })));
        assert!(matches!(run(and(vec![bool(true), int(1)])), Err(TypeMismatch { op: "and", .. })));
        assert!(matches!(run(add(vec![int(1)])), Err(OperandCount { got: 1, .. })));
        assert!(matches!(run(binary(BinOp::Eq, vec![int(1)])), Err(OperandCount { .. })));
        assert!(matches!(run(modulo(vec![int(1), int(0)])), Err(DivisionByZero)));
        assert!(matches!(run(add(vec![int(i64::MAX), int(1)])), Err(Overflow("+"))));
        assert!(matches!(run(lt(int(1), char('a'))), Err(TypeMismatch { op: "<", .. })));
    }

    #[test]
    fn comparisons() {
        assert_eq!(run(gt(int(2), int(1))).unwrap(), BoolValue(true));
        assert_eq!(run(lt(int(2), int(1))).unwrap(), BoolValue(false));
        assert_eq!(run(ge(int(2), int(2))).unwrap(), BoolValue(true));
        assert_eq!(run(le(char('a'), char('b'))).unwrap(), BoolValue(true));
        assert_eq!(run(eq(int(97), char('a'))).unwrap(), BoolValue(false));
        assert_eq!(run(eq(list(vec![int(1)]), list(vec![int(1)]))).unwrap(), BoolValue(true));
        assert_eq!(
            run(eq(quote(add(vec![int(1), int(2)])), quote(add(vec![int(1), int(2)])))).unwrap(),
            BoolValue(true)
        );
    }

    #[test]
    fn closures_are_never_equal() {
        let expr = block(vec![
            define("f", lambda(vec!["x"], var("x"))),
            eq(var("f"), var("f")),
        ]);
        assert_eq!(run(expr).unwrap(), BoolValue(false));
    }

    #[test]
    fn redefinition_shadows() {
        let expr = block(vec![define("x", int(1)), define("x", int(2)), var("x")]);
        assert_eq!(run(expr).unwrap(), IntValue(2));
    }

    #[test]
    fn unbound_variable_is_undefined() {
        assert_eq!(run(var("ghost")).unwrap(), UndefinedValue);
    }

    #[test]
    fn define_yields_undefined_and_extends_env() {
        let (value, env) = define("x", int(1))
            .eval_into(&Environment::new(), &mut io::sink())
            .unwrap();
        assert_eq!(value, UndefinedValue);
        assert_eq!(env.lookup("x"), IntValue(1));
    }

    #[test]
    fn empty_block_is_rejected() {
        assert!(matches!(run(block(vec![])), Err(EmptyBlock)));
    }

    #[test]
    fn closures_keep_their_own_captures() {
        let mut ctx = Context::new();
        ctx.eval(&define(
            "make-add",
            lambda(vec!["y"], lambda(vec!["x"], add(vec![var("x"), var("y")]))),
        ))
        .unwrap();
        ctx.eval(&define("add1", call(var("make-add"), vec![int(1)]))).unwrap();
        ctx.eval(&define("add2", call(var("make-add"), vec![int(2)]))).unwrap();

        assert_eq!(ctx.eval(&call(var("add1"), vec![int(10)])).unwrap(), IntValue(11));
        assert_eq!(ctx.eval(&call(var("add2"), vec![int(10)])).unwrap(), IntValue(12));
    }

    fn factorial(n: i64) -> Expr {
        block(vec![
            define(
                "factorial",
                lambda(
                    vec!["n"],
                    if_(
                        le(var("n"), int(1)),
                        int(1),
                        mul(vec![
                            var("n"),
                            call(var("factorial"), vec![sub(vec![var("n"), int(1)])]),
                        ]),
                    ),
                ),
            ),
            call(var("factorial"), vec![int(n)]),
        ])
    }

    #[test]
    fn named_recursion() {
        assert_eq!(run(factorial(10)).unwrap(), IntValue(3628800));
        assert_eq!(run(factorial(1)).unwrap(), IntValue(1));
    }

    #[test]
    fn call_effects_do_not_leak() {
        let expr = block(vec![
            define("f", lambda(vec!["a"], block(vec![define("leak", var("a")), var("a")]))),
            call(var("f"), vec![int(5)]),
            var("leak"),
        ]);
        assert_eq!(run(expr).unwrap(), UndefinedValue);
    }

    #[test]
    fn parameters_shadow_call_site() {
        let expr = block(vec![
            define("x", int(1)),
            define("f", lambda(vec!["x"], var("x"))),
            call(var("f"), vec![int(2)]),
        ]);
        assert_eq!(run(expr).unwrap(), IntValue(2));
    }

    #[test]
    fn call_errors() {
        let arity = block(vec![
            define("f", lambda(vec!["a", "b"], var("a"))),
            call(var("f"), vec![int(1)]),
        ]);
        assert!(matches!(run(arity), Err(ArityMismatch { expected: 2, got: 1 })));
        assert!(matches!(run(call(int(1), vec![])), Err(NotApplicable("Int"))));
        assert!(matches!(run(call(var("nothing"), vec![])), Err(NotApplicable("Undefined"))));
    }

    #[test]
    fn if_treats_only_false_as_falsy() {
        assert_eq!(run(if_(bool(false), int(1), int(2))).unwrap(), IntValue(2));
        assert_eq!(run(if_(bool(true), int(1), int(2))).unwrap(), IntValue(1));
        assert_eq!(run(if_(int(0), int(1), int(2))).unwrap(), IntValue(1));
        assert_eq!(run(if_(nil(), int(1), int(2))).unwrap(), IntValue(1));
    }

    #[test]
    fn cond_takes_first_true_branch() {
        let expr = cond(
            vec![
                when(gt(int(1), int(2)), char('a')),
                when(eq(int(1), int(1)), char('b')),
                when(bool(true), char('c')),
            ],
            char('z'),
        );
        assert_eq!(run(expr).unwrap(), CharValue('b'));
        assert_eq!(run(cond(vec![when(bool(false), int(1))], int(0))).unwrap(), IntValue(0));
        assert!(matches!(
            run(cond(vec![when(int(1), int(1))], int(0))),
            Err(TypeMismatch { op: "cond", .. })
        ));
    }

    #[test]
    fn quote_defers_and_eval_forces() {
        let expr = add(vec![int(1), int(2)]);
        assert_eq!(run(quote(expr.clone())).unwrap(), QuotedValue(expr.clone()));
        assert_eq!(run(eval(quote(expr.clone()))).unwrap(), run(expr).unwrap());
        assert!(matches!(run(eval(int(3))), Err(NotQuoted("Int"))));
    }

    #[test]
    fn eval_runs_in_the_current_environment() {
        let expr = block(vec![
            define("code", quote(define("x", int(42)))),
            eval(var("code")),
            var("x"),
        ]);
        assert_eq!(run(expr).unwrap(), IntValue(42));
    }

    #[test]
    fn match_captures_and_substitutes() {
        let expr = match_(
            quote(add(vec![int(1), int(2)])),
            vec![case(add(vec![capture(wildcard(), "x"), wildcard()]), var("x"))],
            char('?'),
        );
        assert_eq!(run(expr).unwrap(), IntValue(1));
    }

    #[test]
    fn match_falls_through_in_order() {
        let expr = match_(
            quote(add(vec![int(1), int(2)])),
            vec![
                case(sub(vec![wildcard(), wildcard()]), char('-')),
                case(add(vec![wildcard(), wildcard()]), char('+')),
            ],
            char('?'),
        );
        assert_eq!(run(expr).unwrap(), CharValue('+'));
    }

    #[test]
    fn match_default_and_non_exhaustive() {
        let quoted = quote(mul(vec![int(1), int(2)]));
        let with_default = match_(quoted.clone(), vec![case(add(vec![wildcard(), wildcard()]), int(1))], int(0));
        assert_eq!(run(with_default).unwrap(), IntValue(0));

        let without = match_exhaustive(quoted, vec![case(add(vec![wildcard(), wildcard()]), int(1))]);
        assert!(matches!(run(without), Err(NonExhaustive)));
    }

    #[test]
    fn self_matching_concrete_capture_fails() {
        let node = capture(int(1), "v");
        let expr = match_(quote(node.clone()), vec![case(node, bool(true))], bool(false));
        assert_eq!(run(expr).unwrap(), BoolValue(false));
    }

    #[test]
    fn match_substitutes_captured_code_and_quotes_it_back() {
        let expr = match_(
            quote(call(var("f"), vec![add(vec![int(2), int(3)])])),
            vec![case(call(wildcard(), vec![capture(wildcard(), "arg")]), list(vec![var("arg"), quote(var("arg"))]))],
            nil(),
        );
        assert_eq!(
            run(expr).unwrap(),
            ListValue(vec![IntValue(5), QuotedValue(add(vec![int(2), int(3)]))].into())
        );
    }

    #[test]
    fn runtime_lists_are_matched_structurally() {
        let expr = match_(
            list(vec![int(1), int(2), int(3)]),
            vec![case(list(vec![capture(wildcard(), "h"), capture(wildcard_seq(), "t")]), list(vec![var("t"), var("h")]))],
            nil(),
        );
        assert_eq!(run(expr).unwrap(), ListValue(vec![ints(&[2, 3]), IntValue(1)].into()));
    }

    #[test]
    fn captured_closures_keep_their_environment() {
        let mut ctx = Context::new();
        ctx.eval(&define(
            "make-add",
            lambda(vec!["y"], lambda(vec!["x"], add(vec![var("x"), var("y")]))),
        ))
        .unwrap();
        ctx.eval(&define("add1", call(var("make-add"), vec![int(1)]))).unwrap();

        let expr = match_(
            list(vec![var("add1")]),
            vec![case(list(vec![capture(wildcard(), "f")]), call(var("f"), vec![int(10)]))],
            int(0),
        );
        assert_eq!(ctx.eval(&expr).unwrap(), IntValue(11));
    }

    #[test]
    fn closures_match_lambda_patterns_by_code() {
        let expr = block(vec![
            define("inc", lambda(vec!["x"], add(vec![var("x"), int(1)]))),
            match_(
                var("inc"),
                vec![case(
                    lambda(vec!["x"], add(vec![wildcard(), capture(wildcard(), "n")])),
                    var("n"),
                )],
                int(0),
            ),
        ]);
        assert_eq!(run(expr).unwrap(), IntValue(1));
    }

    #[test]
    fn quoted_elements_stay_quoted_when_captured() {
        let code = || quote(add(vec![int(1), int(2)]));
        let expr = match_(
            list(vec![code()]),
            vec![case(list(vec![capture(wildcard(), "a")]), var("a"))],
            int(0),
        );
        let quoted = QuotedValue(add(vec![int(1), int(2)]));
        assert_eq!(run(expr).unwrap(), quoted.clone());
        assert_eq!(run(head(list(vec![code()]))).unwrap(), quoted);

        let expr = match_(
            list(vec![code()]),
            vec![case(list(vec![quote(add(vec![capture(wildcard(), "l"), wildcard()]))]), var("l"))],
            int(0),
        );
        assert_eq!(run(expr).unwrap(), IntValue(1));
    }

    #[test]
    fn closures_see_bindings_from_their_definition() {
        let mut ctx = Context::new();
        let program = vec![
            define("y", int(1)),
            define("f", lambda(Vec::<&str>::new(), var("y"))),
            define("y", int(2)),
            call(var("f"), vec![]),
        ];
        assert_eq!(ctx.source(program).unwrap(), IntValue(1));
        assert_eq!(ctx.eval(&var("y")).unwrap(), IntValue(2));
    }

    #[test]
    fn patterns_outside_match_are_errors() {
        assert!(matches!(run(wildcard()), Err(DanglingPattern("_"))));
        assert!(matches!(run(capture(wildcard(), "x")), Err(DanglingPattern("capture"))));
    }

    #[test]
    fn list_operations() {
        let l = || list(vec![int(1), int(2), int(3)]);
        assert_eq!(run(drop_head(l())).unwrap(), ints(&[2, 3]));
        assert_eq!(run(drop_head(list(vec![int(1)]))).unwrap(), ints(&[]));
        assert!(matches!(run(drop_head(list(vec![]))), Err(RuntimeError::EmptyList("drop-head"))));
        assert_eq!(run(push_last(list(vec![]), char('x'))).unwrap(), ListValue(List::unit(CharValue('x'))));
        assert_eq!(run(push_head(l(), int(0))).unwrap(), ints(&[0, 1, 2, 3]));
        assert_eq!(run(head(l())).unwrap(), IntValue(1));
        assert_eq!(run(tail(l())).unwrap(), ints(&[2, 3]));
        assert_eq!(run(pop_head(l())).unwrap(), IntValue(1));
        assert_eq!(run(pop_last(l())).unwrap(), IntValue(3));
        assert_eq!(run(drop_last(l())).unwrap(), ints(&[1, 2]));
        assert_eq!(run(concat(l(), list(vec![int(4)]))).unwrap(), ints(&[1, 2, 3, 4]));
        assert!(matches!(run(head(int(1))), Err(TypeMismatch { op: "head", .. })));
        assert!(matches!(run(concat(l(), int(4))), Err(TypeMismatch { op: "concat", .. })));
        assert!(matches!(run(list_op(ListOp::Head, l(), Some(int(1)))), Err(ArityMismatch { .. })));
    }

    #[test]
    fn println_writes_and_yields_undefined() {
        let sink = Captured::default();
        let mut ctx = Context::new().with_output(sink.clone());
        let program = vec![
            println(string("hello")),
            println(add(vec![int(1), int(2)])),
            println(quote(add(vec![int(1), int(2)]))),
        ];
        assert_eq!(ctx.source(program).unwrap(), UndefinedValue);
        assert_eq!(sink.text(), "hello\n3\n`(+ 1 2)\n");
    }
}
