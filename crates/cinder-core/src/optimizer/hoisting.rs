//! Final pass: move alias definitions shared by both branches of a
//! conditional in front of it.
//!
//! Runs bottom-up so an alias hoisted out of a nested conditional can be
//! hoisted again by the conditional enclosing it.

use crate::ast::{Block, ExprKey, IfNode, Node, NodeKind, Scope};
use crate::config::AnalyzerOptions;
use crate::span::Span;
use crate::visitor::{walk_block, Visitor};
use serde::Serialize;
use std::convert::Infallible;
use std::mem;
use tracing::debug;

/// Branch an alias definition was removed from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Branch {
    Then,
    Else,
}

/// One relocation of an alias definition out of a branch
///
/// Every hoist out of a conditional records two events, one per branch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HoistEvent {
    pub alias: String,
    pub key: ExprKey,
    pub branch: Branch,
    /// Location of the conditional the definition moved out of
    pub span: Span,
}

pub struct FinalPassAnalyzer<'a> {
    options: &'a AnalyzerOptions,
    hoists: Vec<HoistEvent>,
}

impl<'a> FinalPassAnalyzer<'a> {
    pub fn new(options: &'a AnalyzerOptions) -> Self {
        Self {
            options,
            hoists: Vec::new(),
        }
    }

    /// Hoist shared aliases throughout `root`, returning the relocations made
    pub fn run(mut self, root: &mut Node) -> Vec<HoistEvent> {
        if !self.options.hoist_conditional_aliases {
            return Vec::new();
        }
        match self.visit_node(root) {
            Ok(()) => {}
            Err(never) => match never {},
        }
        self.hoists
    }

    fn hoist_conditionals(&mut self, block: &mut Block) {
        let Block { body, scope } = block;
        if !body.iter().any(|node| matches!(node.kind, NodeKind::If(_))) {
            return;
        }

        let mut rewritten = Vec::with_capacity(body.len());
        for mut node in mem::take(body) {
            let span = node.span;
            if let NodeKind::If(if_node) = &mut node.kind {
                rewritten.extend(self.hoist_shared_aliases(if_node, scope, span));
            }
            rewritten.push(node);
        }
        *body = rewritten;
    }

    fn hoist_shared_aliases(
        &mut self,
        if_node: &mut IfNode,
        enclosing: &mut Scope,
        span: Span,
    ) -> Vec<Node> {
        let IfNode {
            then_branch,
            else_branch,
            ..
        } = if_node;
        let Some(else_branch) = else_branch.as_mut() else {
            return Vec::new();
        };

        // Same computation under the same alias in both branches
        let shared: Vec<(ExprKey, String)> = then_branch
            .scope
            .aliased_expression_map
            .iter()
            .filter(|(key, alias)| else_branch.scope.alias_for(key) == Some(alias.as_str()))
            .map(|(key, alias)| (key.clone(), alias.clone()))
            .collect();

        let mut hoisted = Vec::new();
        for (key, alias) in shared {
            let (Some(then_index), Some(else_index)) = (
                hoistable_definition(&then_branch.body, &alias),
                hoistable_definition(&else_branch.body, &alias),
            ) else {
                debug!(alias = %alias, "alias not defined at the top of both branches, not hoisting");
                continue;
            };

            let definition = self.hoist(then_branch, then_index, Branch::Then, &key, &alias, span);
            self.hoist(else_branch, else_index, Branch::Else, &key, &alias, span);
            enclosing.register_alias(key, alias);
            hoisted.push(definition);
        }
        hoisted
    }

    fn hoist(
        &mut self,
        block: &mut Block,
        index: usize,
        branch: Branch,
        key: &ExprKey,
        alias: &str,
        span: Span,
    ) -> Node {
        let definition = block.body.remove(index);
        block.scope.forget_alias(key);
        debug!(alias = %alias, ?branch, span = %span, "hoisted alias definition");
        self.hoists.push(HoistEvent {
            alias: alias.to_string(),
            key: key.clone(),
            branch,
            span,
        });
        definition
    }
}

impl Visitor for FinalPassAnalyzer<'_> {
    type Error = Infallible;

    fn visit_block(&mut self, block: &mut Block) -> Result<(), Infallible> {
        walk_block(self, block)?;
        self.hoist_conditionals(block);
        Ok(())
    }
}

/// Index of the top-level definition of `alias`, provided it reads nothing
/// else defined in the same branch
fn hoistable_definition(body: &[Node], alias: &str) -> Option<usize> {
    let index = body
        .iter()
        .position(|node| node.assigned_name() == Some(alias))?;
    let NodeKind::Assign(assign) = &body[index].kind else {
        return None;
    };
    let key = ExprKey::of(&assign.value)?;

    let mut reads = Vec::new();
    identifiers(&key, &mut reads);
    let depends_on_branch = reads.iter().any(|name| {
        body.iter()
            .any(|node| node.assigned_name() == Some(*name))
    });
    (!depends_on_branch).then_some(index)
}

fn identifiers<'k>(key: &'k ExprKey, out: &mut Vec<&'k str>) {
    match key {
        ExprKey::Identifier(name) => out.push(name),
        ExprKey::Placeholder(_) | ExprKey::Literal(_) => {}
        ExprKey::BinOp { left, right, .. } => {
            identifiers(left, out);
            identifiers(right, out);
        }
        ExprKey::Filter { expr, .. } => identifiers(expr, out),
        ExprKey::Call { callee, args } => {
            identifiers(callee, out);
            args.iter().for_each(|arg| identifiers(arg, out));
        }
        ExprKey::List(items) => items.iter().for_each(|item| identifiers(item, out)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rph_key() -> ExprKey {
        ExprKey::Placeholder("foo".into())
    }

    fn branch_with_alias() -> Block {
        let mut block = Block::new(vec![
            Node::assign("_rph_foo", Node::placeholder("foo")),
            Node::buffer_write(Node::identifier("_rph_foo")),
        ]);
        block.scope.register_alias(rph_key(), "_rph_foo");
        block
    }

    fn conditional(then_branch: Block, else_branch: Option<Block>) -> Node {
        Node::new(
            NodeKind::If(IfNode {
                condition: Box::new(Node::identifier("cond")),
                then_branch,
                else_branch,
            }),
            Span::new(10, 40, 3, 1),
        )
    }

    fn hoisting_options() -> AnalyzerOptions {
        AnalyzerOptions {
            hoist_conditional_aliases: true,
            ..AnalyzerOptions::default()
        }
    }

    fn function(body: Vec<Node>) -> Node {
        Node::function("test_function", body)
    }

    fn body_of(node: &Node) -> &Block {
        match &node.kind {
            NodeKind::Function(function) => &function.body,
            other => panic!("expected function, got {:?}", other),
        }
    }

    #[test]
    fn test_hoists_alias_shared_by_both_branches() {
        let options = hoisting_options();
        let mut root = function(vec![conditional(branch_with_alias(), Some(branch_with_alias()))]);

        let events = FinalPassAnalyzer::new(&options).run(&mut root);

        assert_eq!(events.len(), 2);
        assert_eq!(events[0].branch, Branch::Then);
        assert_eq!(events[1].branch, Branch::Else);

        let body = body_of(&root);
        assert_eq!(body.body.len(), 2);
        assert_eq!(body.body[0].assigned_name(), Some("_rph_foo"));
        assert_eq!(body.scope.alias_for(&rph_key()), Some("_rph_foo"));

        match &body.body[1].kind {
            NodeKind::If(if_node) => {
                assert_eq!(if_node.then_branch.body.len(), 1);
                assert!(if_node.then_branch.scope.alias_for(&rph_key()).is_none());
                let else_branch = if_node.else_branch.as_ref().unwrap();
                assert_eq!(else_branch.body.len(), 1);
                assert!(!else_branch.scope.declares("_rph_foo"));
            }
            other => panic!("expected if, got {:?}", other),
        }
    }

    #[test]
    fn test_no_hoist_without_else() {
        let options = hoisting_options();
        let mut root = function(vec![conditional(branch_with_alias(), None)]);

        let events = FinalPassAnalyzer::new(&options).run(&mut root);
        assert!(events.is_empty());
        assert_eq!(body_of(&root).body.len(), 1);
    }

    #[test]
    fn test_no_hoist_when_aliases_differ() {
        let options = hoisting_options();
        let mut other = Block::new(vec![Node::assign("_rph_foo_1", Node::placeholder("foo"))]);
        other.scope.register_alias(rph_key(), "_rph_foo_1");
        let mut root = function(vec![conditional(branch_with_alias(), Some(other))]);

        assert!(FinalPassAnalyzer::new(&options).run(&mut root).is_empty());
    }

    #[test]
    fn test_disabled_pass_changes_nothing() {
        let options = AnalyzerOptions::default();
        let mut root = function(vec![conditional(branch_with_alias(), Some(branch_with_alias()))]);
        let before = root.clone();

        assert!(FinalPassAnalyzer::new(&options).run(&mut root).is_empty());
        assert_eq!(root, before);
    }

    #[test]
    fn test_nested_hoist_moves_up_twice() {
        let options = hoisting_options();
        let inner = || {
            let mut block = Block::new(vec![conditional(branch_with_alias(), Some(branch_with_alias()))]);
            block.scope.local_identifiers.insert("unrelated".into());
            block
        };
        let mut root = function(vec![conditional(inner(), Some(inner()))]);

        let events = FinalPassAnalyzer::new(&options).run(&mut root);

        // Two inner conditionals, then the outer one
        assert_eq!(events.len(), 6);
        let body = body_of(&root);
        assert_eq!(body.body[0].assigned_name(), Some("_rph_foo"));
    }

    #[test]
    fn test_definition_reading_branch_local_stays() {
        let key = ExprKey::filtered(None, ExprKey::Identifier("local".into()));
        let branch = || {
            let mut block = Block::new(vec![
                Node::assign("local", Node::placeholder("foo")),
                Node::assign("_fphAAAAAAAA", Node::filter(Node::identifier("local"))),
            ]);
            block.scope.register_alias(key.clone(), "_fphAAAAAAAA");
            block
        };
        let options = hoisting_options();
        let mut root = function(vec![conditional(branch(), Some(branch()))]);

        assert!(FinalPassAnalyzer::new(&options).run(&mut root).is_empty());
    }
}
