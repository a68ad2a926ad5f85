use crate::{
    codegen::{crisp::CrispCodeGenerator, PartialCodeGenerator},
    runtime::{
        builtins::Builtins,
        env::Environment,
        eval::Eval,
        list::List,
        Value::{
            BoolValue, CharValue, ClosureValue, IntValue, ListValue, NilValue, QuotedValue,
            StringValue, UndefinedValue,
        },
    },
    syntax::tree::{
        Expr::{self, LambdaExpr, ListExpr, LitExpr, QuoteExpr, ValueExpr},
        Ident,
        Lit::{LitBool, LitChar, LitInt, LitNil, LitString, LitUndefined},
        Program,
    },
};
use std::{
    cmp::Ordering,
    fmt::Formatter,
    io::{self, Write},
    rc::Rc,
};
use thiserror::Error;
use tracing::debug;

pub mod builtins;
pub mod env;
pub mod eval;
pub mod list;
pub mod pattern;
pub mod subst;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("TypeError: expected a callable, but got '{0}'")]
    NotApplicable(&'static str),
    #[error("TypeError: expected {expected} argument(s), but got {got}")]
    ArityMismatch { expected: usize, got: usize },
    #[error("TypeError: '{op}' expects {expected} operands, but got {got}")]
    OperandCount {
        op: &'static str,
        expected: &'static str,
        got: usize,
    },
    #[error("TypeError: '{op}' expects {expected}, but got {got}")]
    TypeMismatch {
        op: &'static str,
        expected: &'static str,
        got: String,
    },
    #[error("RuntimeError: '{0}' on an empty list")]
    EmptyList(&'static str),
    #[error("TypeError: eval expects quoted data, but got '{0}'")]
    NotQuoted(&'static str),
    #[error("RuntimeError: non-exhaustive match rule")]
    NonExhaustive,
    #[error("RuntimeError: integer overflow in '{0}'")]
    Overflow(&'static str),
    #[error("RuntimeError: modulo by zero")]
    DivisionByZero,
    #[error("RuntimeError: a block needs at least one expression")]
    EmptyBlock,
    #[error("SyntaxError: '{0}' is only valid inside a match pattern")]
    DanglingPattern(&'static str),
    #[error("IOError: {0}")]
    Output(#[from] io::Error),
}

#[derive(Clone, Debug)]
pub enum Value {
    BoolValue(bool),
    CharValue(char),
    IntValue(i64),
    StringValue(String),
    NilValue,
    UndefinedValue,
    ClosureValue(Closure),
    ListValue(List),
    QuotedValue(Expr),
}

/// A lambda together with the environment it was created in.
#[derive(Clone, Debug)]
pub struct Closure {
    pub env: Environment,
    pub params: Vec<Ident>,
    pub body: Rc<Expr>,
}

impl Closure {
    pub fn new(env: Environment, params: Vec<Ident>, body: Expr) -> Closure {
        Closure {
            env,
            params,
            body: Rc::new(body),
        }
    }

    pub fn argc(&self) -> usize {
        self.params.len()
    }
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            BoolValue(_) => "Bool",
            CharValue(_) => "Char",
            IntValue(_) => "Int",
            StringValue(_) => "String",
            NilValue => "Nil",
            UndefinedValue => "Undefined",
            ClosureValue(_) => "Closure",
            ListValue(_) => "List",
            QuotedValue(_) => "Quoted",
        }
    }

    /// Turns a value back into syntax so it can be matched structurally.
    /// Quoted data stays quoted and closures are kept whole, so evaluating
    /// the result gives back an equal value.
    pub fn into_expr(self) -> Expr {
        match self {
            BoolValue(v) => LitExpr(LitBool(v)),
            CharValue(v) => LitExpr(LitChar(v)),
            IntValue(v) => LitExpr(LitInt(v)),
            StringValue(v) => LitExpr(LitString(v)),
            NilValue => LitExpr(LitNil),
            UndefinedValue => LitExpr(LitUndefined),
            ClosureValue(closure) => ValueExpr(Box::new(ClosureValue(closure))),
            ListValue(list) => ListExpr(list.into_iter().map(Value::into_expr).collect()),
            QuotedValue(expr) => QuoteExpr(Box::new(expr)),
        }
    }

    /// Ordering for the comparison operators; `None` when the two values
    /// are not of the same ordered type.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (IntValue(lhs), IntValue(rhs)) => Some(lhs.cmp(rhs)),
            (CharValue(lhs), CharValue(rhs)) => Some(lhs.cmp(rhs)),
            (StringValue(lhs), StringValue(rhs)) => Some(lhs.cmp(rhs)),
            _ => None,
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let gen = CrispCodeGenerator::new();
        match self {
            ListValue(list) => {
                write!(f, "(list")?;
                for item in list.iter() {
                    write!(f, " {}", item)?;
                }
                write!(f, ")")
            }
            QuotedValue(expr) => write!(f, "`{}", gen.partial_codegen_expr(expr)),
            ClosureValue(closure) => {
                let lambda = LambdaExpr(closure.params.clone(), Box::new((*closure.body).clone()));
                write!(f, "<closure {}>", gen.partial_codegen_expr(&lambda))
            }
            v => write!(f, "{}", gen.partial_codegen_expr(&v.clone().into_expr())),
        }
    }
}

// Structural equality; closures are never equal, not even to themselves.
impl std::cmp::PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (BoolValue(lhs), BoolValue(rhs)) => lhs == rhs,
            (CharValue(lhs), CharValue(rhs)) => lhs == rhs,
            (IntValue(lhs), IntValue(rhs)) => lhs == rhs,
            (StringValue(lhs), StringValue(rhs)) => lhs == rhs,
            (NilValue, NilValue) => true,
            (UndefinedValue, UndefinedValue) => true,
            (ListValue(lhs), ListValue(rhs)) => lhs == rhs,
            (QuotedValue(lhs), QuotedValue(rhs)) => lhs == rhs,
            _ => false,
        }
    }
}

/// Evaluation state that survives between top-level expressions: the
/// current environment and the sink `println` writes to.
pub struct Context {
    pub env: Environment,
    output: Box<dyn Write>,
}

impl Context {
    pub fn new() -> Context {
        Context::with_env(Environment::new())
    }

    pub fn with_env(env: Environment) -> Context {
        Context {
            env,
            output: Box::new(io::stdout()),
        }
    }

    pub fn with_output(mut self, output: impl Write + 'static) -> Context {
        self.output = Box::new(output);
        self
    }

    pub fn load_builtins(&mut self) -> Result<(), crate::Error> {
        Builtins::init(self)
    }

    /// Evaluates every item of the program in order, threading the
    /// environment between them. The value is the last item's value.
    pub fn source(&mut self, input: Program) -> Result<Value, RuntimeError> {
        debug!(items = input.len(), "sourcing program");
        let (value, env) = input.eval_into(&self.env, self.output.as_mut())?;
        self.env = env;
        Ok(value)
    }

    pub fn eval(&mut self, expr: &Expr) -> Result<Value, RuntimeError> {
        let (value, env) = expr.eval_into(&self.env, self.output.as_mut())?;
        self.env = env;
        Ok(value)
    }
}

impl Default for Context {
    fn default() -> Self {
        Context::new()
    }
}

/// Evaluates a single expression against an initial environment, printing
/// to stdout. Definitions made by the expression are dropped.
pub fn evaluate(expr: &Expr, env: &Environment) -> Result<Value, RuntimeError> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    expr.eval_into(env, &mut out).map(|(value, _)| value)
}
