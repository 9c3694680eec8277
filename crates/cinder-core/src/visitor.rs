//! Mutable tree walk shared by every pass
//!
//! Each `visit_*` method defaults to the matching `walk_*` function, so a
//! pass overrides only the node kinds it cares about and calls back into
//! `walk_*` to keep descending. Children are visited in document order,
//! left to right, depth first.

use crate::ast::{
    Assign, BinOp, Block, Call, ExprKey, Filter, Function, IfNode, Literal, Node, NodeKind,
    Placeholder, Template,
};
use crate::span::Span;

pub trait Visitor {
    type Error;

    fn visit_node(&mut self, node: &mut Node) -> Result<(), Self::Error> {
        walk_node(self, node)
    }

    fn visit_template(&mut self, template: &mut Template) -> Result<(), Self::Error> {
        walk_template(self, template)
    }

    fn visit_function(&mut self, function: &mut Function, _span: Span) -> Result<(), Self::Error> {
        walk_function(self, function)
    }

    fn visit_block(&mut self, block: &mut Block) -> Result<(), Self::Error> {
        walk_block(self, block)
    }

    fn visit_if(&mut self, if_node: &mut IfNode, _span: Span) -> Result<(), Self::Error> {
        walk_if(self, if_node)
    }

    fn visit_assign(&mut self, assign: &mut Assign, _span: Span) -> Result<(), Self::Error> {
        walk_assign(self, assign)
    }

    fn visit_identifier(&mut self, _name: &mut String, _span: Span) -> Result<(), Self::Error> {
        Ok(())
    }

    fn visit_placeholder(
        &mut self,
        _placeholder: &mut Placeholder,
        _span: Span,
    ) -> Result<(), Self::Error> {
        Ok(())
    }

    fn visit_literal(&mut self, _literal: &mut Literal, _span: Span) -> Result<(), Self::Error> {
        Ok(())
    }

    fn visit_binop(&mut self, binop: &mut BinOp, _span: Span) -> Result<(), Self::Error> {
        walk_binop(self, binop)
    }

    fn visit_filter(&mut self, filter: &mut Filter, _span: Span) -> Result<(), Self::Error> {
        walk_filter(self, filter)
    }

    fn visit_call(&mut self, call: &mut Call, _span: Span) -> Result<(), Self::Error> {
        walk_call(self, call)
    }

    fn visit_list(&mut self, items: &mut Vec<Node>, _span: Span) -> Result<(), Self::Error> {
        walk_nodes(self, items)
    }

    fn visit_buffer_write(&mut self, expr: &mut Node, _span: Span) -> Result<(), Self::Error> {
        self.visit_node(expr)
    }
}

pub fn walk_node<V: Visitor + ?Sized>(visitor: &mut V, node: &mut Node) -> Result<(), V::Error> {
    let span = node.span;
    match &mut node.kind {
        NodeKind::Template(template) => visitor.visit_template(template),
        NodeKind::Function(function) => visitor.visit_function(function, span),
        NodeKind::If(if_node) => visitor.visit_if(if_node, span),
        NodeKind::Assign(assign) => visitor.visit_assign(assign, span),
        NodeKind::Identifier(name) => visitor.visit_identifier(name, span),
        NodeKind::Placeholder(placeholder) => visitor.visit_placeholder(placeholder, span),
        NodeKind::Literal(literal) => visitor.visit_literal(literal, span),
        NodeKind::BinOp(binop) => visitor.visit_binop(binop, span),
        NodeKind::Filter(filter) => visitor.visit_filter(filter, span),
        NodeKind::Call(call) => visitor.visit_call(call, span),
        NodeKind::ListLiteral(items) => visitor.visit_list(items, span),
        NodeKind::BufferWrite(expr) => visitor.visit_buffer_write(expr, span),
    }
}

pub fn walk_nodes<V: Visitor + ?Sized>(
    visitor: &mut V,
    nodes: &mut [Node],
) -> Result<(), V::Error> {
    for node in nodes {
        visitor.visit_node(node)?;
    }
    Ok(())
}

pub fn walk_template<V: Visitor + ?Sized>(
    visitor: &mut V,
    template: &mut Template,
) -> Result<(), V::Error> {
    walk_nodes(visitor, &mut template.body)
}

pub fn walk_function<V: Visitor + ?Sized>(
    visitor: &mut V,
    function: &mut Function,
) -> Result<(), V::Error> {
    visitor.visit_block(&mut function.body)
}

pub fn walk_block<V: Visitor + ?Sized>(visitor: &mut V, block: &mut Block) -> Result<(), V::Error> {
    walk_nodes(visitor, &mut block.body)
}

pub fn walk_if<V: Visitor + ?Sized>(visitor: &mut V, if_node: &mut IfNode) -> Result<(), V::Error> {
    visitor.visit_node(&mut if_node.condition)?;
    visitor.visit_block(&mut if_node.then_branch)?;
    if let Some(else_branch) = &mut if_node.else_branch {
        visitor.visit_block(else_branch)?;
    }
    Ok(())
}

pub fn walk_assign<V: Visitor + ?Sized>(
    visitor: &mut V,
    assign: &mut Assign,
) -> Result<(), V::Error> {
    visitor.visit_node(&mut assign.value)
}

pub fn walk_binop<V: Visitor + ?Sized>(visitor: &mut V, binop: &mut BinOp) -> Result<(), V::Error> {
    visitor.visit_node(&mut binop.left)?;
    visitor.visit_node(&mut binop.right)
}

pub fn walk_filter<V: Visitor + ?Sized>(
    visitor: &mut V,
    filter: &mut Filter,
) -> Result<(), V::Error> {
    visitor.visit_node(&mut filter.expr)
}

pub fn walk_call<V: Visitor + ?Sized>(visitor: &mut V, call: &mut Call) -> Result<(), V::Error> {
    visitor.visit_node(&mut call.callee)?;
    walk_nodes(visitor, &mut call.args)
}

/// Names assigned anywhere in a function body, nested branches included
///
/// Nested function definitions are skipped; they own their own scope.
#[derive(Debug, Default)]
pub struct AssignedNames {
    pub names: Vec<String>,
}

impl AssignedNames {
    pub fn collect(block: &mut Block) -> Vec<String> {
        let mut collector = AssignedNames::default();
        match collector.visit_block(block) {
            Ok(()) => {}
            Err(never) => match never {},
        }
        collector.names
    }
}

impl Visitor for AssignedNames {
    type Error = std::convert::Infallible;

    fn visit_function(&mut self, _function: &mut Function, _span: Span) -> Result<(), Self::Error> {
        Ok(())
    }

    fn visit_assign(&mut self, assign: &mut Assign, _span: Span) -> Result<(), Self::Error> {
        self.names.push(assign.target.clone());
        walk_assign(self, assign)
    }
}

/// Names the scopes of a function body already declare, nested branches included
///
/// `aliases` holds every alias a scope maps to its cached computation;
/// `locals` holds the remaining declared names (parameters and the like).
#[derive(Debug, Default)]
pub struct DeclaredNames {
    pub locals: Vec<String>,
    pub aliases: Vec<(String, ExprKey)>,
}

impl DeclaredNames {
    pub fn collect(block: &mut Block) -> Self {
        let mut collector = DeclaredNames::default();
        match collector.visit_block(block) {
            Ok(()) => {}
            Err(never) => match never {},
        }
        collector
    }
}

impl Visitor for DeclaredNames {
    type Error = std::convert::Infallible;

    fn visit_function(&mut self, _function: &mut Function, _span: Span) -> Result<(), Self::Error> {
        Ok(())
    }

    fn visit_block(&mut self, block: &mut Block) -> Result<(), Self::Error> {
        let scope = &block.scope;
        for (key, alias) in &scope.aliased_expression_map {
            self.aliases.push((alias.clone(), key.clone()));
        }
        self.locals.extend(
            scope
                .local_identifiers
                .iter()
                .chain(&scope.alias_name_set)
                .filter(|name| !scope.aliased_expression_map.values().any(|alias| alias == *name))
                .cloned(),
        );
        walk_block(self, block)
    }
}
