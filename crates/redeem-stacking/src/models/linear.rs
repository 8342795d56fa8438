use linfa::traits::{Fit, Predict};
use linfa::Dataset;
use linfa_linear::{FittedLinearRegression, LinearRegression as LinfaLinearRegression};
use ndarray::{Array1, Array2};

use crate::error::{Result, StackError};
use crate::models::estimator_trait::Predictor;
use crate::models::utils::{check_n_features, check_n_samples};

/// Ordinary least squares regression backed by `linfa-linear`.
pub struct LinearRegression {
    fit_intercept: bool,
    model: Option<FittedLinearRegression<f64>>,
}

impl LinearRegression {
    pub fn new() -> Self {
        LinearRegression {
            fit_intercept: true,
            model: None,
        }
    }

    pub fn with_intercept(mut self, fit_intercept: bool) -> Self {
        self.fit_intercept = fit_intercept;
        self
    }

    pub fn fit_intercept(&self) -> bool {
        self.fit_intercept
    }

    /// Learned coefficients, `None` before `fit`.
    pub fn coefficients(&self) -> Option<&Array1<f64>> {
        self.model.as_ref().map(|m| m.params())
    }

    pub fn intercept(&self) -> Option<f64> {
        self.model.as_ref().map(|m| m.intercept())
    }
}

impl Default for LinearRegression {
    fn default() -> Self {
        Self::new()
    }
}

impl Predictor for LinearRegression {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        check_n_samples(self.name(), x.nrows(), y.len())?;

        let dataset = Dataset::new(x.to_owned(), y.to_owned());
        let model = LinfaLinearRegression::new()
            .with_intercept(self.fit_intercept)
            .fit(&dataset)
            .map_err(|e| anyhow::anyhow!("LinearRegression failed to fit: {}", e))?;

        log::trace!(
            "LinearRegression fitted on {} samples, intercept {:.4}",
            x.nrows(),
            model.intercept()
        );
        self.model = Some(model);
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let model = self
            .model
            .as_ref()
            .ok_or_else(|| StackError::not_fitted(self.name(), "predict"))?;
        check_n_features(self.name(), model.params().len(), x.ncols())?;

        let predictions: Array1<f64> = model.predict(x);
        Ok(predictions)
    }

    fn clone_unfitted(&self) -> Box<dyn Predictor> {
        Box::new(LinearRegression::new().with_intercept(self.fit_intercept))
    }

    fn name(&self) -> &str {
        "LinearRegression"
    }
}
