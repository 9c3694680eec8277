//! Template optimizer
//!
//! Two passes run in order over a parsed template:
//!
//! 1. [`OptimizationAnalyzer`] checks definite assignment, annotates every
//!    placeholder read with how it should be lowered and introduces alias
//!    definitions for cached lookups and filters.
//! 2. [`FinalPassAnalyzer`] hoists alias definitions duplicated in both
//!    branches of a conditional to before the conditional.

mod analyzer;
mod assignment;
mod filter_cache;
mod hoisting;
mod resolution;

pub use analyzer::OptimizationAnalyzer;
pub use assignment::AssignedSet;
pub use filter_cache::{FilterEpochs, FilterUse};
pub use hoisting::{Branch, FinalPassAnalyzer, HoistEvent};
pub use resolution::{alias_name, Evaluation};

use crate::ast::{Node, Resolution};
use crate::config::AnalyzerOptions;
use crate::diagnostics::{Diagnostic, DiagnosticHandler};
use crate::errors::{AnalyzerError, AnalyzerWarning};
use crate::span::Span;
use std::sync::Arc;
use tracing::info;

/// Annotation given to one placeholder read, in document order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionRecord {
    pub name: String,
    pub span: Span,
    pub resolution: Resolution,
}

impl ResolutionRecord {
    pub fn cache_eligible(&self) -> bool {
        self.resolution.cache_eligible
    }
}

/// Everything the passes observed while optimizing one template
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalysisReport {
    pub warnings: Vec<AnalyzerWarning>,
    pub resolutions: Vec<ResolutionRecord>,
    pub hoists: Vec<HoistEvent>,
}

impl AnalysisReport {
    pub fn hoist_count(&self) -> usize {
        self.hoists.len()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// `cache_eligible` of every placeholder read, in document order
    pub fn cache_eligibility(&self) -> Vec<bool> {
        self.resolutions.iter().map(ResolutionRecord::cache_eligible).collect()
    }
}

pub struct Optimizer {
    options: AnalyzerOptions,
    handler: Option<Arc<dyn DiagnosticHandler>>,
}

impl Optimizer {
    pub fn new(options: AnalyzerOptions) -> Self {
        Self {
            options,
            handler: None,
        }
    }

    /// Forward warnings and errors to `handler` as they are produced
    pub fn with_handler(mut self, handler: Arc<dyn DiagnosticHandler>) -> Self {
        self.handler = Some(handler);
        self
    }

    pub fn options(&self) -> &AnalyzerOptions {
        &self.options
    }

    /// Returns the names of the passes `optimize` will run
    pub fn pass_names(&self) -> Vec<&'static str> {
        let mut names = vec!["optimization-analysis"];
        if self.options.hoist_conditional_aliases {
            names.push("final-pass-hoisting");
        }
        names
    }

    /// Run all enabled passes over `root`, rewriting it in place
    ///
    /// On error the tree is left partially annotated and should be discarded.
    pub fn optimize(&self, root: &mut Node) -> Result<AnalysisReport, AnalyzerError> {
        let mut report = match OptimizationAnalyzer::new(&self.options).analyze(root) {
            Ok(report) => report,
            Err(err) => {
                if let Some(handler) = &self.handler {
                    handler.report(Diagnostic::from(&err));
                }
                return Err(err);
            }
        };
        report.hoists = FinalPassAnalyzer::new(&self.options).run(root);

        if let Some(handler) = &self.handler {
            for warning in &report.warnings {
                handler.report(Diagnostic::from(warning));
            }
        }

        info!(
            resolutions = report.resolutions.len(),
            warnings = report.warnings.len(),
            hoists = report.hoist_count(),
            "optimized template"
        );
        Ok(report)
    }
}
