use crate::runtime::Value;

pub type Ident = String;

pub type Program = Vec<Expr>;

#[derive(Debug, PartialEq, Clone)]
pub enum Lit {
    LitBool(bool),
    LitChar(char),
    LitInt(i64),
    LitString(String),
    LitNil,
    LitUndefined,
}

/// Operators of `BinaryExpr`. The first six fold over two or more
/// operands, the comparisons take exactly two.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Mod,
    And,
    Or,
    Eq,
    Gt,
    Lt,
    Ge,
    Le,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ListOp {
    Head,
    Tail,
    PushHead,
    PushLast,
    PopHead,
    PopLast,
    DropHead,
    DropLast,
    Concat,
}

#[derive(Debug, PartialEq, Clone)]
pub enum Expr {
    LitExpr(Lit),
    VarExpr(Ident),
    LambdaExpr(Vec<Ident>, Box<Expr>),
    DefineExpr(Ident, Box<Expr>),
    CallExpr(Box<Expr>, Vec<Expr>),
    BlockExpr(Vec<Expr>),
    IfExpr(Box<Expr>, Box<Expr>, Box<Expr>),
    CondExpr(Vec<CondBranch>, Box<Expr>),
    BinaryExpr(BinOp, Vec<Expr>),
    QuoteExpr(Box<Expr>),
    EvalExpr(Box<Expr>),
    MatchExpr(Box<Expr>, Vec<MatchCase>, Option<Box<Expr>>),
    CaptureExpr(Box<Expr>, Ident),
    Wildcard,
    WildcardSeq,
    ListExpr(Vec<Expr>),
    ListOpExpr(ListOp, Box<Expr>, Option<Box<Expr>>),
    PrintlnExpr(Box<Expr>),
    /// An already evaluated value spliced into syntax; evaluates to itself.
    ValueExpr(Box<Value>),
}

/// `(cond-expr result)` arm of a `CondExpr`.
#[derive(Debug, PartialEq, Clone)]
pub struct CondBranch(pub Expr, pub Expr);

/// `(pattern result)` arm of a `MatchExpr`.
#[derive(Debug, PartialEq, Clone)]
pub struct MatchCase(pub Expr, pub Expr);

impl BinOp {
    pub const ALL: [BinOp; 11] = [
        BinOp::Add,
        BinOp::Sub,
        BinOp::Mul,
        BinOp::Mod,
        BinOp::And,
        BinOp::Or,
        BinOp::Eq,
        BinOp::Gt,
        BinOp::Lt,
        BinOp::Ge,
        BinOp::Le,
    ];

    pub fn symbol(self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Mod => "%",
            BinOp::And => "and",
            BinOp::Or => "or",
            BinOp::Eq => "=",
            BinOp::Gt => ">",
            BinOp::Lt => "<",
            BinOp::Ge => ">=",
            BinOp::Le => "<=",
        }
    }

    pub fn from_symbol(symbol: &str) -> Option<BinOp> {
        BinOp::ALL.iter().copied().find(|op| op.symbol() == symbol)
    }

    /// Chain operators are left folds; everything else is a binary comparison.
    pub fn is_chain(self) -> bool {
        match self {
            BinOp::Add | BinOp::Sub | BinOp::Mul | BinOp::Mod | BinOp::And | BinOp::Or => true,
            _ => false,
        }
    }
}

impl ListOp {
    pub const ALL: [ListOp; 9] = [
        ListOp::Head,
        ListOp::Tail,
        ListOp::PushHead,
        ListOp::PushLast,
        ListOp::PopHead,
        ListOp::PopLast,
        ListOp::DropHead,
        ListOp::DropLast,
        ListOp::Concat,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ListOp::Head => "head",
            ListOp::Tail => "tail",
            ListOp::PushHead => "push-head",
            ListOp::PushLast => "push-last",
            ListOp::PopHead => "pop-head",
            ListOp::PopLast => "pop-last",
            ListOp::DropHead => "drop-head",
            ListOp::DropLast => "drop-last",
            ListOp::Concat => "concat",
        }
    }

    pub fn from_name(name: &str) -> Option<ListOp> {
        ListOp::ALL.iter().copied().find(|op| op.name() == name)
    }

    /// Number of operands including the list itself.
    pub fn arity(self) -> usize {
        match self {
            ListOp::PushHead | ListOp::PushLast | ListOp::Concat => 2,
            _ => 1,
        }
    }
}

impl Expr {
    pub fn is_wildcard(&self) -> bool {
        match self {
            Expr::Wildcard | Expr::WildcardSeq => true,
            _ => false,
        }
    }
}
