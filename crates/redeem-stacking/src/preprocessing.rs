//! Feature scalers usable as slot preprocessors.
//!
//! Both scalers wrap `linfa-preprocessing`'s linear scaling: the scaling
//! parameters are learned by `fit_transform` and reused by `transform`.

use linfa::traits::{Fit, Transformer as LinfaTransformer};
use linfa::DatasetBase;
use linfa_preprocessing::linear_scaling::{LinearScaler, LinearScalerParams};
use ndarray::Array2;

use crate::error::{Result, StackError};
use crate::models::estimator_trait::Transformer;
use crate::models::utils::check_n_features;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ScalingMethod {
    MinMax,
    Standard,
}

impl ScalingMethod {
    fn params(self) -> LinearScalerParams<f64> {
        match self {
            ScalingMethod::MinMax => LinearScaler::min_max(),
            ScalingMethod::Standard => LinearScaler::standard(),
        }
    }
}

/// Shared fit/transform logic for the linear scalers.
struct FittedScaling {
    scaler: LinearScaler<f64>,
    n_features: usize,
}

fn fit_scaling(method: ScalingMethod, name: &str, x: &Array2<f64>) -> Result<FittedScaling> {
    if x.nrows() == 0 {
        return Err(StackError::Shape(format!("{} requires at least one sample", name)));
    }
    let dataset = DatasetBase::from(x.to_owned());
    let scaler = method
        .params()
        .fit(&dataset)
        .map_err(|e| anyhow::anyhow!("{} failed to fit: {}", name, e))?;
    Ok(FittedScaling {
        scaler,
        n_features: x.ncols(),
    })
}

fn apply_scaling(fitted: Option<&FittedScaling>, name: &str, x: &Array2<f64>) -> Result<Array2<f64>> {
    let fitted = fitted.ok_or_else(|| StackError::not_fitted(name, "transform"))?;
    check_n_features(name, fitted.n_features, x.ncols())?;
    let scaled: Array2<f64> = fitted.scaler.transform(x.to_owned());
    Ok(scaled)
}

/// Rescale every feature to `[0, 1]` using the range seen during fitting.
#[derive(Default)]
pub struct MinMaxScaler {
    fitted: Option<FittedScaling>,
}

impl MinMaxScaler {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Transformer for MinMaxScaler {
    fn fit_transform(&mut self, x: &Array2<f64>) -> Result<Array2<f64>> {
        self.fitted = Some(fit_scaling(ScalingMethod::MinMax, self.name(), x)?);
        apply_scaling(self.fitted.as_ref(), self.name(), x)
    }

    fn transform(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        apply_scaling(self.fitted.as_ref(), self.name(), x)
    }

    fn clone_unfitted(&self) -> Box<dyn Transformer> {
        Box::new(MinMaxScaler::new())
    }

    fn name(&self) -> &str {
        "MinMaxScaler"
    }
}

/// Center every feature on its mean and scale it to unit variance.
#[derive(Default)]
pub struct StandardScaler {
    fitted: Option<FittedScaling>,
}

impl StandardScaler {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Transformer for StandardScaler {
    fn fit_transform(&mut self, x: &Array2<f64>) -> Result<Array2<f64>> {
        self.fitted = Some(fit_scaling(ScalingMethod::Standard, self.name(), x)?);
        apply_scaling(self.fitted.as_ref(), self.name(), x)
    }

    fn transform(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        apply_scaling(self.fitted.as_ref(), self.name(), x)
    }

    fn clone_unfitted(&self) -> Box<dyn Transformer> {
        Box::new(StandardScaler::new())
    }

    fn name(&self) -> &str {
        "StandardScaler"
    }
}
