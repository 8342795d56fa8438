use linfa::traits::{Fit, Predict};
use linfa::Dataset;
use linfa_logistic::{FittedLogisticRegression, LogisticRegression as LinfaLogisticRegression};
use ndarray::{stack, Array1, Array2, Axis};

use crate::error::{Result, StackError};
use crate::models::estimator_trait::Predictor;
use crate::models::utils::{check_n_features, check_n_samples};

/// Binary logistic regression backed by `linfa-logistic`.
///
/// Targets must hold integral class labels (e.g. `0.0`/`1.0`). `predict`
/// returns the predicted label, `predict_proba` two columns ordered by
/// ascending class label.
pub struct LogisticRegression {
    alpha: f64,
    max_iterations: u64,
    fit_intercept: bool,
    model: Option<FittedLogisticRegression<f64, i64>>,
}

impl LogisticRegression {
    pub fn new() -> Self {
        LogisticRegression {
            alpha: 1.0,
            max_iterations: 100,
            fit_intercept: true,
            model: None,
        }
    }

    /// L2 regularization strength.
    pub fn alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    pub fn max_iterations(mut self, max_iterations: u64) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_intercept(mut self, fit_intercept: bool) -> Self {
        self.fit_intercept = fit_intercept;
        self
    }

    fn fitted(&self, op: &'static str) -> Result<&FittedLogisticRegression<f64, i64>> {
        self.model
            .as_ref()
            .ok_or_else(|| StackError::not_fitted(self.name(), op))
    }
}

impl Default for LogisticRegression {
    fn default() -> Self {
        Self::new()
    }
}

/// Convert float targets into integer class labels, rejecting fractional values.
fn to_class_labels(y: &Array1<f64>) -> Result<Array1<i64>> {
    if let Some(bad) = y.iter().find(|v| !v.is_finite() || v.fract() != 0.0) {
        return Err(StackError::config(format!(
            "LogisticRegression expects integral class labels, got {}",
            bad
        )));
    }
    Ok(y.mapv(|v| v as i64))
}

impl Predictor for LogisticRegression {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        check_n_samples(self.name(), x.nrows(), y.len())?;
        let labels = to_class_labels(y)?;

        let dataset = Dataset::new(x.to_owned(), labels);
        let model = LinfaLogisticRegression::default()
            .alpha(self.alpha)
            .max_iterations(self.max_iterations)
            .with_intercept(self.fit_intercept)
            .fit(&dataset)
            .map_err(|e| anyhow::anyhow!("LogisticRegression failed to fit: {}", e))?;

        self.model = Some(model);
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let model = self.fitted("predict")?;
        check_n_features(self.name(), model.params().len(), x.ncols())?;

        let labels: Array1<i64> = model.predict(x);
        Ok(labels.mapv(|l| l as f64))
    }

    fn has_predict_proba(&self) -> bool {
        true
    }

    fn predict_proba(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        let model = self.fitted("predict_proba")?;
        check_n_features(self.name(), model.params().len(), x.ncols())?;

        let pos = model.predict_probabilities(x);
        let neg = pos.mapv(|p| 1.0 - p);
        let classes = model.labels();
        let columns = if classes.pos.class < classes.neg.class {
            [pos.view(), neg.view()]
        } else {
            [neg.view(), pos.view()]
        };
        Ok(stack(Axis(1), &columns)?)
    }

    fn clone_unfitted(&self) -> Box<dyn Predictor> {
        Box::new(
            LogisticRegression::new()
                .alpha(self.alpha)
                .max_iterations(self.max_iterations)
                .with_intercept(self.fit_intercept),
        )
    }

    fn name(&self) -> &str {
        "LogisticRegression"
    }
}
