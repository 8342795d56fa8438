use crate::config::{FoldConfig, LayerConfig, ModelType, PreprocessorType, StackConfig};
use crate::error::Result;
use crate::folds::{Folds, KFold};
use crate::layer::Layer;
use crate::models::estimator_trait::{Predictor, Transformer};
use crate::models::linear::LinearRegression;
use crate::models::logistic::LogisticRegression;
use crate::preprocessing::{MinMaxScaler, StandardScaler};
use crate::stack::Stack;

/// Build a boxed, unfitted predictor from a `ModelType`.
pub fn build_predictor(model_type: &ModelType) -> Box<dyn Predictor> {
    match *model_type {
        ModelType::LinearRegression { fit_intercept } => {
            Box::new(LinearRegression::new().with_intercept(fit_intercept))
        }
        ModelType::LogisticRegression {
            alpha,
            max_iterations,
            fit_intercept,
        } => Box::new(
            LogisticRegression::new()
                .alpha(alpha)
                .max_iterations(max_iterations)
                .with_intercept(fit_intercept),
        ),
    }
}

pub fn build_preprocessor(preprocessor: PreprocessorType) -> Box<dyn Transformer> {
    match preprocessor {
        PreprocessorType::MinMax => Box::new(MinMaxScaler::new()),
        PreprocessorType::Standard => Box::new(StandardScaler::new()),
    }
}

pub fn build_layer(config: &LayerConfig) -> Result<Layer> {
    let predictors = config
        .models
        .iter()
        .map(|slot| build_predictor(&slot.model))
        .collect();
    let preprocessors = config
        .models
        .iter()
        .map(|slot| slot.preprocessor.map(build_preprocessor))
        .collect();
    let proba = config.models.iter().map(|slot| slot.proba).collect();
    Layer::new(predictors, Some(preprocessors), Some(proba))
}

pub fn build_folds(config: &FoldConfig) -> Folds {
    match config {
        FoldConfig::KFold {
            n_splits,
            shuffle,
            seed,
        } => Folds::Splitter(Box::new(KFold {
            n_splits: *n_splits,
            shuffle: *shuffle,
            seed: *seed,
        })),
        FoldConfig::Explicit(folds) => Folds::Explicit(folds.clone()),
    }
}

/// Build an unfitted stack, validated exactly like [`Stack::new`].
pub fn build_stack(config: &StackConfig) -> Result<Stack> {
    let layers = config
        .layers
        .iter()
        .map(build_layer)
        .collect::<Result<Vec<_>>>()?;
    let folds = config.folds.as_ref().map(build_folds);
    log::debug!(
        "Building stack with {} layers from config, folds: {:?}",
        layers.len(),
        folds
    );
    Stack::new(layers, folds)
}
