use super::{BinaryOp, Literal, Node, NodeKind};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Normalized, value-comparable shape of an expression
///
/// Two independently built but syntactically identical expressions produce
/// equal keys. Syntactically distinct expressions never do, even when they
/// would evaluate to the same value (`1` and `1.0` differ).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExprKey {
    Placeholder(String),
    Identifier(String),
    Literal(LiteralKey),
    BinOp {
        op: BinaryOp,
        left: Box<ExprKey>,
        right: Box<ExprKey>,
    },
    Filter {
        filter: Option<String>,
        expr: Box<ExprKey>,
    },
    Call {
        callee: Box<ExprKey>,
        args: Vec<ExprKey>,
    },
    List(Vec<ExprKey>),
}

/// Literal with floats compared by bit pattern so keys can be hashed
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LiteralKey {
    None,
    Bool(bool),
    Int(i64),
    Float(u64),
    Str(String),
}

impl From<&Literal> for LiteralKey {
    fn from(literal: &Literal) -> Self {
        match literal {
            Literal::None => LiteralKey::None,
            Literal::Bool(b) => LiteralKey::Bool(*b),
            Literal::Int(i) => LiteralKey::Int(*i),
            Literal::Float(f) => LiteralKey::Float(f.to_bits()),
            Literal::Str(s) => LiteralKey::Str(s.clone()),
        }
    }
}

impl ExprKey {
    /// Key of an expression node; `None` for statements
    pub fn of(node: &Node) -> Option<ExprKey> {
        let key = match &node.kind {
            NodeKind::Placeholder(p) => ExprKey::Placeholder(p.name.clone()),
            NodeKind::Identifier(name) => ExprKey::Identifier(name.clone()),
            NodeKind::Literal(literal) => ExprKey::Literal(literal.into()),
            NodeKind::BinOp(binop) => ExprKey::BinOp {
                op: binop.op,
                left: Box::new(ExprKey::of(&binop.left)?),
                right: Box::new(ExprKey::of(&binop.right)?),
            },
            NodeKind::Filter(filter) => ExprKey::Filter {
                filter: filter.filter.clone(),
                expr: Box::new(ExprKey::of(&filter.expr)?),
            },
            NodeKind::Call(call) => ExprKey::Call {
                callee: Box::new(ExprKey::of(&call.callee)?),
                args: call.args.iter().map(ExprKey::of).collect::<Option<_>>()?,
            },
            NodeKind::ListLiteral(items) => {
                ExprKey::List(items.iter().map(ExprKey::of).collect::<Option<_>>()?)
            }
            NodeKind::Template(_)
            | NodeKind::Function(_)
            | NodeKind::If(_)
            | NodeKind::Assign(_)
            | NodeKind::BufferWrite(_) => return None,
        };
        Some(key)
    }

    pub fn filtered(filter: Option<String>, expr: ExprKey) -> Self {
        ExprKey::Filter {
            filter,
            expr: Box::new(expr),
        }
    }
}

fn write_list(f: &mut fmt::Formatter<'_>, items: &[ExprKey]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

impl fmt::Display for ExprKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExprKey::Placeholder(name) => write!(f, "${}", name),
            ExprKey::Identifier(name) => write!(f, "{}", name),
            ExprKey::Literal(LiteralKey::None) => write!(f, "None"),
            ExprKey::Literal(LiteralKey::Bool(b)) => write!(f, "{}", b),
            ExprKey::Literal(LiteralKey::Int(i)) => write!(f, "{}", i),
            ExprKey::Literal(LiteralKey::Float(bits)) => write!(f, "{:?}", f64::from_bits(*bits)),
            ExprKey::Literal(LiteralKey::Str(s)) => write!(f, "{:?}", s),
            ExprKey::BinOp { op, left, right } => write!(f, "({} {} {})", left, op.symbol(), right),
            ExprKey::Filter { filter, expr } => match filter {
                Some(name) => write!(f, "{}|{}", expr, name),
                None => write!(f, "{}|filter", expr),
            },
            ExprKey::Call { callee, args } => {
                write!(f, "{}(", callee)?;
                write_list(f, args)?;
                write!(f, ")")
            }
            ExprKey::List(items) => {
                write!(f, "[")?;
                write_list(f, items)?;
                write!(f, "]")
            }
        }
    }
}
