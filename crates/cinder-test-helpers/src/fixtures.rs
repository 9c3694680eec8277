//! Test fixtures - template trees for testing
//!
//! Every template built here wraps its statements in a single function
//! named `test_function`, which is where the optimizer does its work.

use cinder_core::ast::{IfNode, Literal};
use cinder_core::{Block, ExprKey, Node, NodeKind};

pub const TEMPLATE_NAME: &str = "TestTemplate";
pub const FUNCTION_NAME: &str = "test_function";

/// Template whose only function has `body`
pub fn template(body: Vec<Node>) -> Node {
    template_with_globals(&[], body)
}

/// Template declaring `globals` as global placeholders
pub fn template_with_globals(globals: &[&str], body: Vec<Node>) -> Node {
    let mut root = Node::template(TEMPLATE_NAME, vec![Node::function(FUNCTION_NAME, body)]);
    if let NodeKind::Template(template) = &mut root.kind {
        for global in globals {
            template.declare_global(*global);
        }
    }
    root
}

/// `#if True` ... `#end if`
pub fn if_true(then_body: Vec<Node>) -> Node {
    Node::if_else(Node::literal(Literal::Bool(true)), then_body, None)
}

/// `#if True` ... `#else` ... `#end if`
pub fn if_else(then_body: Vec<Node>, else_body: Vec<Node>) -> Node {
    Node::if_else(Node::literal(Literal::Bool(true)), then_body, Some(else_body))
}

pub fn assign_int(target: &str, value: i64) -> Node {
    Node::assign(target, Node::literal(Literal::Int(value)))
}

pub fn write_placeholder(name: &str) -> Node {
    Node::buffer_write(Node::placeholder(name))
}

/// Branch that already holds `$foo` cached as `_rph_foo` and its filtered
/// value cached as `filtered_alias`, the way the analyzer leaves a branch
/// reading `$foo|filter`
pub fn aliased_branch(filtered_alias: &str) -> Block {
    let resolved = ExprKey::Placeholder("foo".into());
    let filtered = ExprKey::filtered(None, ExprKey::Identifier("_rph_foo".into()));

    let mut block = Block::new(vec![
        Node::assign("_rph_foo", Node::placeholder("foo")),
        Node::assign(filtered_alias, Node::filter(Node::identifier("_rph_foo"))),
        Node::buffer_write(Node::identifier(filtered_alias)),
    ]);
    block.scope.register_alias(resolved, "_rph_foo");
    block.scope.register_alias(filtered, filtered_alias);
    block
}

pub fn function_block(root: &Node) -> &Block {
    let NodeKind::Template(template) = &root.kind else {
        panic!("expected template, got {}", root.kind_name());
    };
    match &template.body[0].kind {
        NodeKind::Function(function) => &function.body,
        other => panic!("expected function, got {:?}", other),
    }
}

pub fn function_block_mut(root: &mut Node) -> &mut Block {
    let NodeKind::Template(template) = &mut root.kind else {
        panic!("expected template");
    };
    match &mut template.body[0].kind {
        NodeKind::Function(function) => &mut function.body,
        other => panic!("expected function, got {:?}", other),
    }
}

/// The `if` statement at `index` of `block`
pub fn if_node(block: &Block, index: usize) -> &IfNode {
    match &block.body[index].kind {
        NodeKind::If(if_node) => if_node,
        other => panic!("expected if at {}, got {:?}", index, other),
    }
}

pub fn if_node_mut(block: &mut Block, index: usize) -> &mut IfNode {
    match &mut block.body[index].kind {
        NodeKind::If(if_node) => if_node,
        other => panic!("expected if at {}, got {:?}", index, other),
    }
}
