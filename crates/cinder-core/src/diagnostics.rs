use crate::errors::{AnalyzerError, AnalyzerWarning};
use crate::span::Span;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Diagnostic severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticLevel {
    Error,
    Warning,
}

/// A diagnostic message with location and severity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub level: DiagnosticLevel,
    pub span: Span,
    pub message: String,
}

impl Diagnostic {
    pub fn error(span: Span, message: impl Into<String>) -> Self {
        Self {
            level: DiagnosticLevel::Error,
            span,
            message: message.into(),
        }
    }

    pub fn warning(span: Span, message: impl Into<String>) -> Self {
        Self {
            level: DiagnosticLevel::Warning,
            span,
            message: message.into(),
        }
    }
}

impl From<&AnalyzerWarning> for Diagnostic {
    fn from(warning: &AnalyzerWarning) -> Self {
        Diagnostic::warning(warning.span, warning.message.clone())
    }
}

impl From<&AnalyzerError> for Diagnostic {
    fn from(err: &AnalyzerError) -> Self {
        match err {
            AnalyzerError::SemanticAnalyzer { name, span } => Diagnostic::error(
                *span,
                format!("${} is not assigned on every path reaching this read", name),
            ),
            AnalyzerError::Warning(warning) => Diagnostic::error(warning.span, &warning.message),
        }
    }
}

/// Sink for diagnostics produced while optimizing templates
///
/// Handlers are shared across worker threads when many templates are
/// optimized in parallel.
pub trait DiagnosticHandler: Send + Sync {
    fn report(&self, diagnostic: Diagnostic);

    fn get_diagnostics(&self) -> Vec<Diagnostic>;

    fn error(&self, span: Span, message: &str) {
        self.report(Diagnostic::error(span, message));
    }

    fn warning(&self, span: Span, message: &str) {
        self.report(Diagnostic::warning(span, message));
    }

    fn has_errors(&self) -> bool {
        self.error_count() > 0
    }

    fn error_count(&self) -> usize {
        count_level(&self.get_diagnostics(), DiagnosticLevel::Error)
    }

    fn warning_count(&self) -> usize {
        count_level(&self.get_diagnostics(), DiagnosticLevel::Warning)
    }
}

fn count_level(diagnostics: &[Diagnostic], level: DiagnosticLevel) -> usize {
    diagnostics.iter().filter(|d| d.level == level).count()
}

fn lock(diagnostics: &Mutex<Vec<Diagnostic>>) -> MutexGuard<'_, Vec<Diagnostic>> {
    diagnostics.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Prints diagnostics to stderr as they arrive
pub struct ConsoleDiagnosticHandler {
    diagnostics: Mutex<Vec<Diagnostic>>,
    pretty: bool,
    /// Prefix naming the template the diagnostics belong to
    origin: Option<String>,
}

impl ConsoleDiagnosticHandler {
    pub fn new(pretty: bool) -> Self {
        Self {
            diagnostics: Mutex::new(Vec::new()),
            pretty,
            origin: None,
        }
    }

    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self
    }
}

impl DiagnosticHandler for ConsoleDiagnosticHandler {
    fn report(&self, diagnostic: Diagnostic) {
        let level_str = match diagnostic.level {
            DiagnosticLevel::Error => "error",
            DiagnosticLevel::Warning => "warning",
        };
        let origin = self.origin.as_deref().unwrap_or("<template>");

        if self.pretty {
            eprintln!(
                "\x1b[1m{}\x1b[0m {}:{}: {}",
                level_str, origin, diagnostic.span, diagnostic.message
            );
        } else {
            eprintln!(
                "{} {}:{}: {}",
                level_str, origin, diagnostic.span, diagnostic.message
            );
        }

        lock(&self.diagnostics).push(diagnostic);
    }

    fn get_diagnostics(&self) -> Vec<Diagnostic> {
        lock(&self.diagnostics).clone()
    }
}

/// Collects diagnostics without printing; used by tests and batch drivers
#[derive(Default)]
pub struct CollectingDiagnosticHandler {
    diagnostics: Mutex<Vec<Diagnostic>>,
}

impl CollectingDiagnosticHandler {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DiagnosticHandler for CollectingDiagnosticHandler {
    fn report(&self, diagnostic: Diagnostic) {
        lock(&self.diagnostics).push(diagnostic);
    }

    fn get_diagnostics(&self) -> Vec<Diagnostic> {
        lock(&self.diagnostics).clone()
    }
}
