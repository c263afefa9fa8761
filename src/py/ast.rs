//! The target-side (Python) abstract syntax tree.
//!
//! A deliberately small closed union: just enough surface for the
//! transformer to express lowered JavaScript, nothing the emitter would
//! have to re-interpret. Statements carry optional leading comments used
//! for diagnostics and TODO annotations.

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum BinOp {
    Add,
    Sub,
    Mult,
    Div,
    Mod,
    BitAnd,
    BitOr,
    BitXor,
    LShift,
    RShift,
}

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum CmpOp {
    Eq,
    NotEq,
    Lt,
    LtE,
    Gt,
    GtE,
    Is,
    IsNot,
    In,
    NotIn,
}

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum UnaryOp {
    Not,
    USub,
    UAdd,
    Invert,
}

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum BoolOp {
    And,
    Or,
}

#[derive(Debug, PartialEq, Clone)]
pub struct Param {
    pub name: String,
    pub default: Option<Expr>,
}

impl Param {
    pub fn plain(name: impl Into<String>) -> Param {
        Param {
            name: name.into(),
            default: None,
        }
    }
}

#[derive(Debug, PartialEq, Clone)]
pub enum Expr {
    Name(String),
    Num(f64),
    Str(String),
    Bool(bool),
    None_,
    List(Vec<Expr>),
    Tuple(Vec<Expr>),
    Dict(Vec<(Expr, Expr)>),
    Attribute(Box<Expr>, String),
    Subscript(Box<Expr>, Box<Expr>),
    Slice {
        lower: Option<Box<Expr>>,
        upper: Option<Box<Expr>>,
    },
    Call {
        func: Box<Expr>,
        args: Vec<Expr>,
    },
    Starred(Box<Expr>),
    Unary(UnaryOp, Box<Expr>),
    Bin(Box<Expr>, BinOp, Box<Expr>),
    Compare(Box<Expr>, CmpOp, Box<Expr>),
    Bool_(BoolOp, Vec<Expr>),
    IfExp {
        test: Box<Expr>,
        body: Box<Expr>,
        orelse: Box<Expr>,
    },
    Lambda {
        params: Vec<Param>,
        body: Box<Expr>,
    },
}

impl Expr {
    pub fn name(text: impl Into<String>) -> Expr {
        Expr::Name(text.into())
    }

    pub fn string(text: impl Into<String>) -> Expr {
        Expr::Str(text.into())
    }

    pub fn call(func: Expr, args: Vec<Expr>) -> Expr {
        Expr::Call {
            func: Box::new(func),
            args,
        }
    }

    /// Call of a bare name, the shape every runtime-helper call takes.
    pub fn call_name(func: impl Into<String>, args: Vec<Expr>) -> Expr {
        Expr::call(Expr::name(func), args)
    }

    pub fn attribute(object: Expr, name: impl Into<String>) -> Expr {
        Expr::Attribute(Box::new(object), name.into())
    }

    pub fn subscript(object: Expr, index: Expr) -> Expr {
        Expr::Subscript(Box::new(object), Box::new(index))
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct ExceptHandler {
    pub class: String,
    pub name: Option<String>,
    pub body: Vec<Stmt>,
}

#[derive(Debug, PartialEq, Clone)]
pub enum StmtKind {
    Expr(Expr),
    Assign {
        target: Expr,
        value: Expr,
    },
    AugAssign {
        target: Expr,
        op: BinOp,
        value: Expr,
    },
    Return(Option<Expr>),
    Pass,
    Break,
    Continue,
    If {
        test: Expr,
        body: Vec<Stmt>,
        orelse: Vec<Stmt>,
    },
    While {
        test: Expr,
        body: Vec<Stmt>,
    },
    For {
        target: Expr,
        iter: Expr,
        body: Vec<Stmt>,
    },
    FuncDef {
        name: String,
        params: Vec<Param>,
        vararg: Option<String>,
        decorators: Vec<String>,
        body: Vec<Stmt>,
    },
    ClassDef {
        name: String,
        bases: Vec<Expr>,
        body: Vec<Stmt>,
    },
    Try {
        body: Vec<Stmt>,
        handler: Option<ExceptHandler>,
        finalbody: Vec<Stmt>,
    },
    Raise(Option<Expr>),
    Import {
        module: String,
        alias: Option<String>,
    },
    ImportFrom {
        module: String,
        names: Vec<(String, Option<String>)>,
    },
}

#[derive(Debug, PartialEq, Clone)]
pub struct Stmt {
    pub comments: Vec<String>,
    pub kind: StmtKind,
}

impl Stmt {
    pub fn new(kind: StmtKind) -> Stmt {
        Stmt {
            comments: Vec::new(),
            kind,
        }
    }

    pub fn commented(comment: impl Into<String>, kind: StmtKind) -> Stmt {
        Stmt {
            comments: vec![comment.into()],
            kind,
        }
    }

    pub fn assign(target: Expr, value: Expr) -> Stmt {
        Stmt::new(StmtKind::Assign { target, value })
    }

    pub fn expr(expr: Expr) -> Stmt {
        Stmt::new(StmtKind::Expr(expr))
    }
}

#[derive(Debug, PartialEq, Clone, Default)]
pub struct Module {
    pub body: Vec<Stmt>,
}
