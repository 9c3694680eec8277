//! Mock implementations for testing

use cinder_core::ast::{Literal, Placeholder};
use cinder_core::diagnostics::{Diagnostic, DiagnosticHandler, DiagnosticLevel};
use cinder_core::{Node, Span, Visitor};
use std::convert::Infallible;
use std::sync::{Arc, Mutex};

/// A mock diagnostic handler that collects diagnostics
#[derive(Debug, Default)]
pub struct MockDiagnosticHandler {
    diagnostics: Mutex<Vec<Diagnostic>>,
}

impl MockDiagnosticHandler {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }
}

impl DiagnosticHandler for MockDiagnosticHandler {
    fn report(&self, diagnostic: Diagnostic) {
        self.diagnostics.lock().unwrap().push(diagnostic);
    }

    fn has_errors(&self) -> bool {
        self.diagnostics
            .lock()
            .unwrap()
            .iter()
            .any(|d| d.level == DiagnosticLevel::Error)
    }

    fn get_diagnostics(&self) -> Vec<Diagnostic> {
        self.diagnostics.lock().unwrap().clone()
    }
}

/// Counts every node visit and records placeholder reads in document order
#[derive(Debug, Default)]
pub struct CountingVisitor {
    pub visits: usize,
    pub literals: usize,
    pub placeholders: Vec<String>,
}

impl CountingVisitor {
    pub fn count(root: &mut Node) -> Self {
        let mut visitor = Self::default();
        match visitor.visit_node(root) {
            Ok(()) => {}
            Err(never) => match never {},
        }
        visitor
    }
}

impl Visitor for CountingVisitor {
    type Error = Infallible;

    fn visit_node(&mut self, node: &mut Node) -> Result<(), Infallible> {
        self.visits += 1;
        cinder_core::visitor::walk_node(self, node)
    }

    fn visit_literal(&mut self, _literal: &mut Literal, _span: Span) -> Result<(), Infallible> {
        self.literals += 1;
        Ok(())
    }

    fn visit_placeholder(&mut self, placeholder: &mut Placeholder, _span: Span) -> Result<(), Infallible> {
        self.placeholders.push(placeholder.name.clone());
        Ok(())
    }
}
