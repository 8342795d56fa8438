//! Declarative description of a stack, loadable from JSON.
//!
//! ```json
//! {
//!   "layers": [
//!     { "models": [
//!         { "model": { "type": "linear_regression", "fit_intercept": true } },
//!         { "model": { "type": "linear_regression", "fit_intercept": true }, "preprocessor": "min_max" }
//!     ] },
//!     { "models": [ { "model": { "type": "linear_regression", "fit_intercept": true } } ] }
//!   ],
//!   "folds": { "k_fold": { "n_splits": 2, "shuffle": true, "seed": 42 } }
//! }
//! ```
use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Supported model types and their hyper-parameters.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ModelType {
    LinearRegression {
        fit_intercept: bool,
    },
    LogisticRegression {
        alpha: f64,
        max_iterations: u64,
        fit_intercept: bool,
    },
}

impl Default for ModelType {
    fn default() -> Self {
        ModelType::LinearRegression {
            fit_intercept: true,
        }
    }
}

impl FromStr for ModelType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "linear" | "linear_regression" => Ok(ModelType::LinearRegression {
                fit_intercept: true,
            }),
            "logistic" | "logistic_regression" => Ok(ModelType::LogisticRegression {
                alpha: 1.0,
                max_iterations: 100,
                fit_intercept: true,
            }),
            _ => Err(format!(
                "Unknown model type: {}. Valid options are: linear, logistic",
                s
            )),
        }
    }
}

/// Supported slot preprocessors.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PreprocessorType {
    MinMax,
    Standard,
}

impl FromStr for PreprocessorType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "min_max" | "minmax" => Ok(PreprocessorType::MinMax),
            "standard" => Ok(PreprocessorType::Standard),
            _ => Err(format!(
                "Unknown preprocessor: {}. Valid options are: min_max, standard",
                s
            )),
        }
    }
}

/// One slot of a layer.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct SlotConfig {
    #[serde(default)]
    pub model: ModelType,
    #[serde(default)]
    pub preprocessor: Option<PreprocessorType>,
    /// Emit class probabilities instead of point predictions.
    #[serde(default)]
    pub proba: bool,
}

impl SlotConfig {
    pub fn new(model: ModelType) -> Self {
        Self {
            model,
            preprocessor: None,
            proba: false,
        }
    }

    pub fn with_preprocessor(mut self, preprocessor: PreprocessorType) -> Self {
        self.preprocessor = Some(preprocessor);
        self
    }

    pub fn with_proba(mut self, proba: bool) -> Self {
        self.proba = proba;
        self
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct LayerConfig {
    pub models: Vec<SlotConfig>,
}

/// Fold policy; omit it for direct mode.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum FoldConfig {
    KFold {
        n_splits: usize,
        #[serde(default)]
        shuffle: bool,
        #[serde(default)]
        seed: Option<u64>,
    },
    Explicit(Vec<Vec<usize>>),
}

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct StackConfig {
    pub layers: Vec<LayerConfig>,
    #[serde(default)]
    pub folds: Option<FoldConfig>,
}

/// Load a stack configuration from a JSON file.
pub fn load_stack_config<P: AsRef<Path>>(path: P) -> Result<StackConfig> {
    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config: {}", path.as_ref().display()))?;
    let config: StackConfig = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse config: {}", path.as_ref().display()))?;
    Ok(config)
}
