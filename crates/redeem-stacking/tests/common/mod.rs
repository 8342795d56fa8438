//! Test doubles shared by the integration tests.
#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use ndarray::{Array1, Array2};
use redeem_stacking::{Predictor, Result, StackError};

/// Label returned by [`Memorizer`] for rows it was not trained on.
pub const UNSEEN: f64 = -1.0;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Remembers the target of every training row, keyed by the row's first column.
///
/// Predicting a row it was trained on returns that row's target, anything else
/// returns [`UNSEEN`]. This makes leakage directly visible in meta-features.
#[derive(Default)]
pub struct Memorizer {
    seen: Option<HashMap<i64, f64>>,
}

impl Memorizer {
    pub fn boxed() -> Box<dyn Predictor> {
        Box::new(Memorizer::default())
    }
}

impl Predictor for Memorizer {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        let seen: HashMap<i64, f64> = x
            .column(0)
            .iter()
            .zip(y.iter())
            .map(|(&id, &target)| (id as i64, target))
            .collect();
        self.seen = Some(seen);
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let seen = self
            .seen
            .as_ref()
            .ok_or_else(|| StackError::not_fitted(self.name(), "predict"))?;
        Ok(x.column(0)
            .mapv(|id| seen.get(&(id as i64)).copied().unwrap_or(UNSEEN)))
    }

    fn clone_unfitted(&self) -> Box<dyn Predictor> {
        Memorizer::boxed()
    }

    fn name(&self) -> &str {
        "Memorizer"
    }
}

/// Records every feature matrix it is fitted on into a shared log.
pub struct Recorder {
    log: Rc<RefCell<Vec<Array2<f64>>>>,
    fitted: bool,
}

impl Recorder {
    pub fn boxed(log: &Rc<RefCell<Vec<Array2<f64>>>>) -> Box<dyn Predictor> {
        Box::new(Recorder {
            log: Rc::clone(log),
            fitted: false,
        })
    }
}

impl Predictor for Recorder {
    fn fit(&mut self, x: &Array2<f64>, _y: &Array1<f64>) -> Result<()> {
        self.log.borrow_mut().push(x.to_owned());
        self.fitted = true;
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        if !self.fitted {
            return Err(StackError::not_fitted(self.name(), "predict"));
        }
        Ok(Array1::zeros(x.nrows()))
    }

    fn clone_unfitted(&self) -> Box<dyn Predictor> {
        Recorder::boxed(&self.log)
    }

    fn name(&self) -> &str {
        "Recorder"
    }
}

/// Predicts the training mean and has no probability capability.
#[derive(Default)]
pub struct MeanRegressor {
    mean: Option<f64>,
}

impl MeanRegressor {
    pub fn boxed() -> Box<dyn Predictor> {
        Box::new(MeanRegressor::default())
    }
}

impl Predictor for MeanRegressor {
    fn fit(&mut self, _x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        self.mean = y.mean();
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let mean = self
            .mean
            .ok_or_else(|| StackError::not_fitted(self.name(), "predict"))?;
        Ok(Array1::from_elem(x.nrows(), mean))
    }

    fn clone_unfitted(&self) -> Box<dyn Predictor> {
        MeanRegressor::boxed()
    }

    fn name(&self) -> &str {
        "MeanRegressor"
    }
}

/// Emits `n_classes` uniform probability columns.
pub struct UniformProba {
    n_classes: usize,
    fitted: bool,
}

impl UniformProba {
    pub fn boxed(n_classes: usize) -> Box<dyn Predictor> {
        Box::new(UniformProba {
            n_classes,
            fitted: false,
        })
    }
}

impl Predictor for UniformProba {
    fn fit(&mut self, _x: &Array2<f64>, _y: &Array1<f64>) -> Result<()> {
        self.fitted = true;
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        if !self.fitted {
            return Err(StackError::not_fitted(self.name(), "predict"));
        }
        Ok(Array1::zeros(x.nrows()))
    }

    fn has_predict_proba(&self) -> bool {
        true
    }

    fn predict_proba(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        if !self.fitted {
            return Err(StackError::not_fitted(self.name(), "predict_proba"));
        }
        Ok(Array2::from_elem(
            (x.nrows(), self.n_classes),
            1.0 / self.n_classes as f64,
        ))
    }

    fn clone_unfitted(&self) -> Box<dyn Predictor> {
        UniformProba::boxed(self.n_classes)
    }

    fn name(&self) -> &str {
        "UniformProba"
    }
}

/// Regression toy data: `y = x . [1, 2] + 3`.
pub fn plane() -> (Array2<f64>, Array1<f64>) {
    let x = ndarray::array![[1.0, 1.0], [1.0, 2.0], [2.0, 2.0], [2.0, 3.0]];
    let y = x.dot(&ndarray::array![1.0, 2.0]) + 3.0;
    (x, y)
}

/// Linearly separable two-class data.
pub fn separable() -> (Array2<f64>, Array1<f64>) {
    (
        ndarray::array![[1.0, 1.0], [1.0, 1.0], [0.0, 0.0], [0.0, 0.0]],
        ndarray::array![1.0, 1.0, 0.0, 0.0],
    )
}

/// `n` rows whose first column is a unique row id and whose target is `10 * id`.
pub fn identified(n: usize) -> (Array2<f64>, Array1<f64>) {
    let x = Array2::from_shape_fn((n, 2), |(r, c)| if c == 0 { r as f64 } else { 1.0 });
    let y = Array1::from_shape_fn(n, |r| 10.0 * r as f64);
    (x, y)
}

/// Returns one column of its input unchanged; fitting only marks it fitted.
pub struct Echo {
    column: usize,
    fitted: bool,
}

impl Echo {
    pub fn boxed(column: usize) -> Box<dyn Predictor> {
        Box::new(Echo {
            column,
            fitted: false,
        })
    }
}

impl Predictor for Echo {
    fn fit(&mut self, _x: &Array2<f64>, _y: &Array1<f64>) -> Result<()> {
        self.fitted = true;
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        if !self.fitted {
            return Err(StackError::not_fitted(self.name(), "predict"));
        }
        Ok(x.column(self.column).to_owned())
    }

    fn clone_unfitted(&self) -> Box<dyn Predictor> {
        Echo::boxed(self.column)
    }

    fn name(&self) -> &str {
        "Echo"
    }
}
