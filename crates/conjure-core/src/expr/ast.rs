//! Abstract syntax tree for the expression language

use super::value::Value;

/// A compiled unit of source: one or more function definitions
///
/// The admission engine keeps every definition found in the source, so
/// an admitted entry function can call its own helpers.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    /// Function definitions in source order
    pub functions: Vec<FnDef>,
}

impl Program {
    /// Look up a definition by name
    pub fn get(&self, name: &str) -> Option<&FnDef> {
        self.functions.iter().find(|f| f.name == name)
    }
}

/// A single `fn` definition
#[derive(Debug, Clone, PartialEq)]
pub struct FnDef {
    pub name: String,
    pub params: Vec<ParamDef>,
    pub body: Block,
}

impl FnDef {
    /// Number of parameters without a default
    pub fn required_params(&self) -> usize {
        self.params.iter().filter(|p| p.default.is_none()).count()
    }
}

/// A declared parameter. Type annotations are accepted by the parser but
/// carry no runtime meaning, so only the name and default survive.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamDef {
    pub name: String,
    pub default: Option<Value>,
}

/// A braced block: zero or more `let` bindings and a final value expression
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub lets: Vec<(String, Expr)>,
    pub value: Box<Expr>,
}

/// An expression
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(Value),
    Var(String),
    Unary {
        op: UnaryOp,
        expr: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    If {
        cond: Box<Expr>,
        then: Block,
        otherwise: Block,
    },
    Call {
        name: String,
        args: Vec<Expr>,
    },
    List(Vec<Expr>),
    Index {
        list: Box<Expr>,
        index: Box<Expr>,
    },
    RecordLit {
        name: String,
        fields: Vec<(String, Expr)>,
    },
    Field {
        expr: Box<Expr>,
        field: String,
    },
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Not,
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    And,
    Or,
}

impl BinaryOp {
    /// Operator symbol, for error messages
    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Rem => "%",
            BinaryOp::Eq => "==",
            BinaryOp::NotEq => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::LtEq => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::GtEq => ">=",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
        }
    }
}
