pub mod ast;
pub mod config;
pub mod diagnostics;
pub mod errors;
pub mod names;
pub mod optimizer;
pub mod span;
pub mod visitor;

pub use ast::{Access, Block, ExprKey, Node, NodeKind, Resolution, Scope};
pub use config::{AnalyzerOptions, OptimizationLevel, OptionOverrides};
pub use diagnostics::{
    CollectingDiagnosticHandler, ConsoleDiagnosticHandler, Diagnostic, DiagnosticHandler,
    DiagnosticLevel,
};
pub use errors::{AnalyzerError, AnalyzerWarning, ConfigError, WarningKind};
pub use optimizer::{
    AnalysisReport, FinalPassAnalyzer, HoistEvent, OptimizationAnalyzer, Optimizer,
    ResolutionRecord,
};
pub use span::Span;
pub use visitor::Visitor;
