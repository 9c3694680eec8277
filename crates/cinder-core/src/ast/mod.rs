//! Template syntax tree consumed and annotated by the optimizer passes
//!
//! The parser builds this tree; the passes annotate it in place and the
//! code generator reads the annotations back.

mod key;
mod scope;

pub use key::{ExprKey, LiteralKey};
pub use scope::Scope;

use crate::span::Span;
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

/// A syntax tree node with its source location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    #[serde(flatten)]
    pub kind: NodeKind,
    #[serde(default)]
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum NodeKind {
    Template(Template),
    Function(Function),
    If(IfNode),
    Assign(Assign),
    Identifier(String),
    Placeholder(Placeholder),
    Literal(Literal),
    BinOp(BinOp),
    Filter(Filter),
    Call(Call),
    ListLiteral(Vec<Node>),
    BufferWrite(Box<Node>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    pub name: String,
    /// Names declared external; always considered assigned
    #[serde(default)]
    pub global_placeholders: IndexSet<String>,
    #[serde(default)]
    pub body: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Function {
    pub name: String,
    pub body: Block,
}

/// Statement sequence owning its scope: a function body or one branch of an `if`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Block {
    #[serde(default)]
    pub body: Vec<Node>,
    #[serde(default)]
    pub scope: Scope,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IfNode {
    pub condition: Box<Node>,
    pub then_branch: Block,
    #[serde(default)]
    pub else_branch: Option<Block>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assign {
    pub target: String,
    pub value: Box<Node>,
}

/// Dynamic variable read, resolved at runtime unless the analyzer proves otherwise
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Placeholder {
    pub name: String,
    /// Filled in by the optimization analyzer
    #[serde(default)]
    pub resolution: Option<Resolution>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    /// Whether the read is evaluated whenever its statement is
    pub cache_eligible: bool,
    pub access: Access,
}

/// How the code generator should lower a placeholder read
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "name", rename_all = "snake_case")]
pub enum Access {
    /// Runtime name lookup
    Dynamic,
    /// Direct read of a definitely assigned local variable
    Local(String),
    /// Read of a synthesized alias caching the resolved value
    Alias(String),
}

impl Access {
    /// Identifier the generator substitutes for the read, if any
    pub fn identifier(&self) -> Option<&str> {
        match self {
            Access::Dynamic => None,
            Access::Local(name) | Access::Alias(name) => Some(name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Literal {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinOp {
    pub op: BinaryOp,
    pub left: Box<Node>,
    pub right: Box<Node>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    Equal,
    NotEqual,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
    And,
    Or,
}

impl BinaryOp {
    /// `and`/`or` only evaluate their right operand for some left values
    pub fn is_short_circuit(self) -> bool {
        matches!(self, BinaryOp::And | BinaryOp::Or)
    }

    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Subtract => "-",
            BinaryOp::Multiply => "*",
            BinaryOp::Divide => "/",
            BinaryOp::Modulo => "%",
            BinaryOp::Equal => "==",
            BinaryOp::NotEqual => "!=",
            BinaryOp::LessThan => "<",
            BinaryOp::LessThanOrEqual => "<=",
            BinaryOp::GreaterThan => ">",
            BinaryOp::GreaterThanOrEqual => ">=",
            BinaryOp::And => "and",
            BinaryOp::Or => "or",
        }
    }
}

/// Output filter (escaping) applied to an expression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    pub expr: Box<Node>,
    /// Explicit filter function; `None` selects the template default
    #[serde(default)]
    pub filter: Option<String>,
    /// Alias holding the cached filtered value, set by the optimization analyzer
    #[serde(default)]
    pub cached_as: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Call {
    pub callee: Box<Node>,
    #[serde(default)]
    pub args: Vec<Node>,
}

impl Node {
    pub fn new(kind: NodeKind, span: Span) -> Self {
        Node { kind, span }
    }

    fn synthesized(kind: NodeKind) -> Self {
        Node::new(kind, Span::dummy())
    }

    pub fn template(name: impl Into<String>, body: Vec<Node>) -> Self {
        Node::synthesized(NodeKind::Template(Template {
            name: name.into(),
            global_placeholders: IndexSet::new(),
            body,
        }))
    }

    pub fn function(name: impl Into<String>, body: Vec<Node>) -> Self {
        Node::synthesized(NodeKind::Function(Function {
            name: name.into(),
            body: Block::new(body),
        }))
    }

    pub fn if_else(condition: Node, then_body: Vec<Node>, else_body: Option<Vec<Node>>) -> Self {
        Node::synthesized(NodeKind::If(IfNode {
            condition: Box::new(condition),
            then_branch: Block::new(then_body),
            else_branch: else_body.map(Block::new),
        }))
    }

    pub fn assign(target: impl Into<String>, value: Node) -> Self {
        Node::synthesized(NodeKind::Assign(Assign {
            target: target.into(),
            value: Box::new(value),
        }))
    }

    pub fn identifier(name: impl Into<String>) -> Self {
        Node::synthesized(NodeKind::Identifier(name.into()))
    }

    pub fn placeholder(name: impl Into<String>) -> Self {
        Node::synthesized(NodeKind::Placeholder(Placeholder {
            name: name.into(),
            resolution: None,
        }))
    }

    pub fn literal(literal: Literal) -> Self {
        Node::synthesized(NodeKind::Literal(literal))
    }

    pub fn binop(op: BinaryOp, left: Node, right: Node) -> Self {
        Node::synthesized(NodeKind::BinOp(BinOp {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }))
    }

    /// Default output filter over `expr`
    pub fn filter(expr: Node) -> Self {
        Node::synthesized(NodeKind::Filter(Filter {
            expr: Box::new(expr),
            filter: None,
            cached_as: None,
        }))
    }

    pub fn call(callee: Node, args: Vec<Node>) -> Self {
        Node::synthesized(NodeKind::Call(Call {
            callee: Box::new(callee),
            args,
        }))
    }

    pub fn list(items: Vec<Node>) -> Self {
        Node::synthesized(NodeKind::ListLiteral(items))
    }

    pub fn buffer_write(expr: Node) -> Self {
        Node::synthesized(NodeKind::BufferWrite(Box::new(expr)))
    }

    /// Short, stable name of the node kind for diagnostics
    pub fn kind_name(&self) -> &'static str {
        match &self.kind {
            NodeKind::Template(_) => "template",
            NodeKind::Function(_) => "function",
            NodeKind::If(_) => "if",
            NodeKind::Assign(_) => "assign",
            NodeKind::Identifier(_) => "identifier",
            NodeKind::Placeholder(_) => "placeholder",
            NodeKind::Literal(_) => "literal",
            NodeKind::BinOp(_) => "binop",
            NodeKind::Filter(_) => "filter",
            NodeKind::Call(_) => "call",
            NodeKind::ListLiteral(_) => "list",
            NodeKind::BufferWrite(_) => "buffer_write",
        }
    }

    /// Target of an assignment node
    pub fn assigned_name(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Assign(assign) => Some(&assign.target),
            _ => None,
        }
    }
}

impl Block {
    pub fn new(body: Vec<Node>) -> Self {
        Block {
            body,
            scope: Scope::default(),
        }
    }
}

impl Template {
    pub fn declare_global(&mut self, name: impl Into<String>) {
        self.global_placeholders.insert(name.into());
    }
}
