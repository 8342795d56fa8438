//! A layer runs several independent (preprocessor, predictor) slots on the same
//! input and concatenates their outputs, in slot order, into one meta-feature
//! matrix.

use std::fmt;

use ndarray::{concatenate, Array1, Array2, ArrayView2, Axis};

use crate::error::{Result, StackError, StackWarning};
use crate::models::estimator_trait::{Predictor, Transformer};

/// One parallel unit of a layer.
struct Slot {
    preprocessor: Option<Box<dyn Transformer>>,
    predictor: Box<dyn Predictor>,
    /// Emit per-class probabilities instead of one point-prediction column.
    proba: bool,
}

impl Slot {
    fn copy(&self) -> Slot {
        Slot {
            preprocessor: self.preprocessor.as_ref().map(|p| p.clone_unfitted()),
            predictor: self.predictor.clone_unfitted(),
            proba: self.proba,
        }
    }

    /// Output columns for already transformed `features`.
    fn output(
        &self,
        index: usize,
        features: &Array2<f64>,
        warnings: &mut Vec<StackWarning>,
    ) -> Result<Array2<f64>> {
        if self.proba {
            if self.predictor.has_predict_proba() {
                return self.predictor.predict_proba(features);
            }
            StackWarning::ProbaFallback {
                slot: index,
                predictor: self.predictor.name().to_string(),
            }
            .raise(warnings);
        }
        let points = self.predictor.predict(features)?;
        Ok(points.insert_axis(Axis(1)))
    }
}

/// A fixed-width bundle of slots sharing one feature matrix and one target.
pub struct Layer {
    slots: Vec<Slot>,
    warnings: Vec<StackWarning>,
}

impl Layer {
    /// Create a new Layer
    ///
    /// # Arguments
    ///
    /// * `predictors` - One predictor per slot
    /// * `preprocessors` - Optional preprocessor per slot, must match `predictors` in length
    /// * `proba` - Probability-output flag per slot, must match `predictors` in length
    ///
    /// # Returns
    ///
    /// A new unfitted Layer, or a configuration error on a length mismatch
    pub fn new(
        predictors: Vec<Box<dyn Predictor>>,
        preprocessors: Option<Vec<Option<Box<dyn Transformer>>>>,
        proba: Option<Vec<bool>>,
    ) -> Result<Self> {
        let width = predictors.len();

        let preprocessors = match preprocessors {
            Some(p) if p.len() != width => {
                return Err(StackError::config(format!(
                    "Number of preprocessors and models does not match, got {} preprocessors but {} models",
                    p.len(),
                    width
                )))
            }
            Some(p) => p,
            None => (0..width).map(|_| None).collect(),
        };

        let proba = match proba {
            Some(flags) if flags.len() != width => {
                return Err(StackError::config(format!(
                    "Number of proba flags and models does not match, got {} flags but {} models",
                    flags.len(),
                    width
                )))
            }
            Some(flags) => flags,
            None => vec![false; width],
        };

        let slots = predictors
            .into_iter()
            .zip(preprocessors)
            .zip(proba)
            .map(|((predictor, preprocessor), proba)| Slot {
                preprocessor,
                predictor,
                proba,
            })
            .collect();

        Ok(Layer {
            slots,
            warnings: Vec::new(),
        })
    }

    /// Number of slots.
    pub fn width(&self) -> usize {
        self.slots.len()
    }

    /// Requested output mode per slot (`true` = probabilities).
    pub fn output_modes(&self) -> Vec<bool> {
        self.slots.iter().map(|s| s.proba).collect()
    }

    /// Whether each slot has a preprocessor.
    pub fn has_preprocessors(&self) -> Vec<bool> {
        self.slots.iter().map(|s| s.preprocessor.is_some()).collect()
    }

    pub fn predictor_names(&self) -> Vec<String> {
        self.slots
            .iter()
            .map(|s| s.predictor.name().to_string())
            .collect()
    }

    /// Warnings raised by the most recent `fit` or `predict` call.
    pub fn warnings(&self) -> &[StackWarning] {
        &self.warnings
    }

    /// Fit every slot on `x`/`y` and return the concatenated slot outputs.
    ///
    /// The result has one row per sample and, per slot, either one column
    /// (point prediction) or one column per class (probability mode).
    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<Array2<f64>> {
        self.ensure_slots()?;
        if x.nrows() != y.len() {
            return Err(StackError::Shape(format!(
                "Layer received {} feature rows but {} targets",
                x.nrows(),
                y.len()
            )));
        }

        let mut warnings = Vec::new();
        let mut outputs = Vec::with_capacity(self.slots.len());
        for (index, slot) in self.slots.iter_mut().enumerate() {
            let transformed;
            let features = match slot.preprocessor.as_mut() {
                Some(preprocessor) => {
                    transformed = preprocessor.fit_transform(x)?;
                    &transformed
                }
                None => x,
            };
            slot.predictor.fit(features, y)?;
            outputs.push(slot.output(index, features, &mut warnings)?);
        }
        self.warnings = warnings;

        log::debug!(
            "Fitted layer of width {} on {} samples",
            self.slots.len(),
            x.nrows()
        );
        join_columns(x.nrows(), &outputs)
    }

    /// Run every fitted slot on `x` and return the concatenated slot outputs.
    ///
    /// Preprocessors only `transform`; nothing is refitted. Unfitted
    /// components report their own not-fitted error.
    pub fn predict(&mut self, x: &Array2<f64>) -> Result<Array2<f64>> {
        self.ensure_slots()?;

        let mut warnings = Vec::new();
        let mut outputs = Vec::with_capacity(self.slots.len());
        for (index, slot) in self.slots.iter().enumerate() {
            let transformed;
            let features = match slot.preprocessor.as_ref() {
                Some(preprocessor) => {
                    transformed = preprocessor.transform(x)?;
                    &transformed
                }
                None => x,
            };
            outputs.push(slot.output(index, features, &mut warnings)?);
        }
        self.warnings = warnings;

        join_columns(x.nrows(), &outputs)
    }

    /// Same shape and configuration, fresh components with no learned state.
    pub fn copy(&self) -> Layer {
        Layer {
            slots: self.slots.iter().map(Slot::copy).collect(),
            warnings: Vec::new(),
        }
    }

    fn ensure_slots(&self) -> Result<()> {
        if self.slots.is_empty() {
            return Err(StackError::config("Layer has no models"));
        }
        Ok(())
    }
}

/// Concatenate slot outputs column-wise, in slot order.
fn join_columns(n_samples: usize, outputs: &[Array2<f64>]) -> Result<Array2<f64>> {
    for (slot, out) in outputs.iter().enumerate() {
        if out.nrows() != n_samples {
            return Err(StackError::Shape(format!(
                "Slot {} returned {} rows for {} samples",
                slot,
                out.nrows(),
                n_samples
            )));
        }
    }
    let views: Vec<ArrayView2<f64>> = outputs.iter().map(|o| o.view()).collect();
    Ok(concatenate(Axis(1), &views)?)
}

impl fmt::Debug for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slots: Vec<String> = self
            .slots
            .iter()
            .map(|s| {
                let pre = s
                    .preprocessor
                    .as_ref()
                    .map(|p| format!("{} -> ", p.name()))
                    .unwrap_or_default();
                let mode = if s.proba { " (proba)" } else { "" };
                format!("{}{}{}", pre, s.predictor.name(), mode)
            })
            .collect();
        f.debug_struct("Layer").field("slots", &slots).finish()
    }
}
