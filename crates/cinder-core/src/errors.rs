use crate::span::Span;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningKind {
    /// A filtered value cached under a variable would outlive a reassignment
    StaleFilterCache,
}

/// Soft finding of the optimization analyzer
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{span}: {message}")]
pub struct AnalyzerWarning {
    pub kind: WarningKind,
    pub name: String,
    pub span: Span,
    pub message: String,
}

impl AnalyzerWarning {
    pub fn stale_filter_cache(name: &str, span: Span, previous_epoch: u32, epoch: u32) -> Self {
        Self {
            kind: WarningKind::StaleFilterCache,
            name: name.to_string(),
            span,
            message: format!(
                "'{}' is filtered again after reassignment (assignment #{} was already filtered \
                 at assignment #{}); a filter cache keyed by this name would return a stale value",
                name, epoch, previous_epoch
            ),
        }
    }
}

/// Fatal outcome of analyzing one template; the tree must not reach codegen
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalyzerError {
    #[error("{span}: ${name} is not assigned on every path reaching this read")]
    SemanticAnalyzer { name: String, span: Span },

    #[error("warning treated as error: {0}")]
    Warning(AnalyzerWarning),
}

impl AnalyzerError {
    pub fn name(&self) -> &str {
        match self {
            AnalyzerError::SemanticAnalyzer { name, .. } => name,
            AnalyzerError::Warning(warning) => &warning.name,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            AnalyzerError::SemanticAnalyzer { span, .. } => *span,
            AnalyzerError::Warning(warning) => warning.span,
        }
    }

    pub fn is_promoted_warning(&self) -> bool {
        matches!(self, AnalyzerError::Warning(_))
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON configuration: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid YAML configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Unsupported configuration format: {path}")]
    UnsupportedFormat { path: PathBuf },
}
