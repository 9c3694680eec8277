//! Test analysis helpers for Cinder
//!
//! Run the optimizer over a fixture tree with a given option set.

use cinder_core::ast::{Placeholder, Resolution};
use cinder_core::visitor::Visitor;
use cinder_core::{
    AnalysisReport, AnalyzerError, AnalyzerOptions, Node, OptimizationLevel, Optimizer, Span,
};
use std::convert::Infallible;

/// Options with only `static_analysis` on
pub fn static_options() -> AnalyzerOptions {
    AnalyzerOptions {
        static_analysis: true,
        ..AnalyzerOptions::default()
    }
}

/// Options used by the placeholder hoisting scenarios: caching and direct
/// access on, static checking off
pub fn hoisting_options() -> AnalyzerOptions {
    AnalyzerOptions {
        static_analysis: false,
        directly_access_defined_variables: true,
        cache_resolved_placeholders: true,
        ..AnalyzerOptions::default()
    }
}

/// Run every enabled pass over `root`
pub fn analyze(root: &mut Node, options: AnalyzerOptions) -> Result<AnalysisReport, AnalyzerError> {
    Optimizer::new(options).optimize(root)
}

pub fn analyze_with_level(
    root: &mut Node,
    level: OptimizationLevel,
) -> Result<AnalysisReport, AnalyzerError> {
    analyze(root, AnalyzerOptions::for_level(level))
}

/// Annotated placeholder reads of `root`, in document order
pub fn collect_placeholders(root: &mut Node) -> Vec<(String, Option<Resolution>)> {
    let mut collector = PlaceholderCollector::default();
    match collector.visit_node(root) {
        Ok(()) => {}
        Err(never) => match never {},
    }
    collector.found
}

#[derive(Default)]
struct PlaceholderCollector {
    found: Vec<(String, Option<Resolution>)>,
}

impl Visitor for PlaceholderCollector {
    type Error = Infallible;

    fn visit_placeholder(&mut self, placeholder: &mut Placeholder, _span: Span) -> Result<(), Infallible> {
        self.found
            .push((placeholder.name.clone(), placeholder.resolution.clone()));
        Ok(())
    }
}
