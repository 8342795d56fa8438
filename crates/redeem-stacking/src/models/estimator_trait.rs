use ndarray::{Array1, Array2};

use crate::error::{Result, StackError};

/// A trainable model that fills one slot of a [`Layer`](crate::layer::Layer).
///
/// Layers and stacks only orchestrate when and on which rows these methods are
/// called. Implementations own their learned state and must report
/// [`StackError::NotFitted`] when used for inference before `fit`.
pub trait Predictor {
    /// Fit the model on `x` (rows are samples) and targets `y`.
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()>;

    /// Point predictions, one value per row of `x`.
    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>>;

    /// Whether [`Predictor::predict_proba`] is implemented.
    fn has_predict_proba(&self) -> bool {
        false
    }

    /// Per-class probabilities, one row per sample and one column per class.
    fn predict_proba(&self, _x: &Array2<f64>) -> Result<Array2<f64>> {
        Err(StackError::Unsupported {
            name: self.name().to_string(),
            op: "predict_proba",
        })
    }

    /// A new instance with the same hyperparameters and no learned state.
    fn clone_unfitted(&self) -> Box<dyn Predictor>;

    fn name(&self) -> &str {
        "predictor"
    }
}

/// A feature preprocessor applied in front of a slot's predictor.
pub trait Transformer {
    /// Learn the transformation from `x` and return the transformed matrix.
    fn fit_transform(&mut self, x: &Array2<f64>) -> Result<Array2<f64>>;

    /// Apply the learned transformation.
    fn transform(&self, x: &Array2<f64>) -> Result<Array2<f64>>;

    /// A new instance with the same hyperparameters and no learned state.
    fn clone_unfitted(&self) -> Box<dyn Transformer>;

    fn name(&self) -> &str {
        "transformer"
    }
}
