use std::fmt;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, StackError>;

/// Failures raised while configuring, fitting or serving layers and stacks.
#[derive(Debug, Error)]
pub enum StackError {
    /// Invalid construction or fold configuration. Never recovered from.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A component was used for inference before it was fitted.
    #[error("{name} is not fitted yet, call `fit` before `{op}`")]
    NotFitted { name: String, op: &'static str },

    /// A component was asked for a capability it does not provide.
    #[error("{name} does not support `{op}`")]
    Unsupported { name: String, op: &'static str },

    #[error("Shape mismatch: {0}")]
    Shape(String),

    #[error(transparent)]
    Ndarray(#[from] ndarray::ShapeError),

    /// Opaque failure reported by an underlying learner.
    #[error(transparent)]
    Estimator(#[from] anyhow::Error),
}

impl StackError {
    pub fn config(msg: impl Into<String>) -> Self {
        StackError::Config(msg.into())
    }

    pub fn not_fitted(name: &str, op: &'static str) -> Self {
        StackError::NotFitted {
            name: name.to_string(),
            op,
        }
    }

    pub fn is_not_fitted(&self) -> bool {
        matches!(self, StackError::NotFitted { .. })
    }

    pub fn is_config(&self) -> bool {
        matches!(self, StackError::Config(_))
    }
}

/// Recoverable conditions. Each one is logged with `log::warn!` when raised and
/// kept so callers can inspect it afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StackWarning {
    /// A slot asked for probability output but its predictor only predicts points.
    ProbaFallback { slot: usize, predictor: String },
    /// A splitter's split count was rebuilt to match the stack depth.
    SplitsAdjusted { requested: usize, depth: usize },
}

impl StackWarning {
    /// Log the warning and append it to `sink`.
    pub(crate) fn raise(self, sink: &mut Vec<StackWarning>) {
        log::warn!("{}", self);
        sink.push(self);
    }
}

impl fmt::Display for StackWarning {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            StackWarning::ProbaFallback { slot, predictor } => write!(
                f,
                "Slot {} ({}) has no `predict_proba`, falling back to `predict`",
                slot, predictor
            ),
            StackWarning::SplitsAdjusted { requested, depth } => write!(
                f,
                "Splitter was configured for {} splits but the stack has {} layers, using {} splits",
                requested, depth, depth
            ),
        }
    }
}
