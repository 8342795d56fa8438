//! Sequential stacking of layers.
//!
//! In direct mode every layer is fit on all rows and its fitted output feeds
//! the next layer. In partitioned mode the rows handed to the next layer for
//! training are scored out-of-fold, so no meta-feature is produced by a model
//! that saw that sample's target.

use std::fmt;

use ndarray::{Array1, Array2, Axis};

use crate::error::{Result, StackError, StackWarning};
use crate::folds::{covered_rows, Folds};
use crate::layer::Layer;

/// Output of [`Stack::predict`].
#[derive(Clone, Debug, PartialEq)]
pub enum Prediction {
    /// The final layer produced a single column.
    Vector(Array1<f64>),
    /// The final layer produced several columns (probabilities or several models).
    Matrix(Array2<f64>),
}

impl Prediction {
    pub fn shape(&self) -> &[usize] {
        match self {
            Prediction::Vector(v) => v.shape(),
            Prediction::Matrix(m) => m.shape(),
        }
    }

    pub fn into_vector(self) -> Option<Array1<f64>> {
        match self {
            Prediction::Vector(v) => Some(v),
            Prediction::Matrix(_) => None,
        }
    }

    /// The prediction as a matrix; a vector becomes a single column.
    pub fn into_matrix(self) -> Array2<f64> {
        match self {
            Prediction::Vector(v) => v.insert_axis(Axis(1)),
            Prediction::Matrix(m) => m,
        }
    }
}

/// An ordered chain of layers plus the fold policy used to train it.
pub struct Stack {
    layers: Vec<Layer>,
    folds: Option<Folds>,
    warnings: Vec<StackWarning>,
}

impl Stack {
    /// Create a new Stack
    ///
    /// # Arguments
    ///
    /// * `layers` - The layers, first to last. The stack takes ownership of them.
    /// * `folds` - `None` for direct mode, otherwise one partition per layer
    ///
    /// A splitter whose split count differs from the depth is rebuilt with
    /// `depth` splits (with a warning); explicit fold lists of the wrong
    /// length are rejected.
    pub fn new(layers: Vec<Layer>, folds: Option<Folds>) -> Result<Self> {
        if layers.is_empty() {
            return Err(StackError::config("A stack needs at least one layer"));
        }
        let depth = layers.len();
        let mut warnings = Vec::new();

        let folds = match folds {
            Some(Folds::Splitter(splitter)) if splitter.n_splits() != depth => {
                StackWarning::SplitsAdjusted {
                    requested: splitter.n_splits(),
                    depth,
                }
                .raise(&mut warnings);
                Some(Folds::Splitter(splitter.with_n_splits(depth)))
            }
            Some(Folds::Explicit(folds)) if folds.len() != depth => {
                return Err(StackError::config(format!(
                    "Number of folds and layers does not match, got {} folds but {} layers",
                    folds.len(),
                    depth
                )))
            }
            other => other,
        };

        Ok(Stack {
            layers,
            folds,
            warnings,
        })
    }

    pub fn depth(&self) -> usize {
        self.layers.len()
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn folds(&self) -> Option<&Folds> {
        self.folds.as_ref()
    }

    /// Warnings raised at construction followed by each layer's latest warnings.
    pub fn warnings(&self) -> Vec<StackWarning> {
        self.warnings
            .iter()
            .chain(self.layers.iter().flat_map(|l| l.warnings().iter()))
            .cloned()
            .collect()
    }

    /// Fit every layer, first to last, on `x` and `y`.
    ///
    /// # Arguments
    ///
    /// * `x` - The features to use, shape (n_samples, n_features)
    /// * `y` - The targets to use, shape (n_samples,), reused at every depth
    ///
    /// # Returns
    ///
    /// The fitted stack, for chaining into `predict`
    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<&mut Self> {
        if x.nrows() != y.len() {
            return Err(StackError::Shape(format!(
                "Stack received {} feature rows but {} targets",
                x.nrows(),
                y.len()
            )));
        }

        let partitions = match &self.folds {
            None => None,
            Some(folds) => Some(folds.partitions(x.nrows())?),
        };
        match partitions {
            None => self.fit_direct(x, y)?,
            Some(partitions) => self.fit_partitioned(x, y, &partitions)?,
        }
        Ok(self)
    }

    fn fit_direct(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        let depth = self.layers.len();
        log::info!("Fitting {} layers on {} samples", depth, x.nrows());

        let (first, rest) = self
            .layers
            .split_first_mut()
            .ok_or_else(|| StackError::config("A stack needs at least one layer"))?;
        let mut features = first.fit(x, y)?;
        for (i, layer) in rest.iter_mut().enumerate() {
            log::debug!(
                "Layer {} of {} trains on {} meta-features",
                i + 2,
                depth,
                features.ncols()
            );
            features = layer.fit(&features, y)?;
        }
        Ok(())
    }

    fn fit_partitioned(
        &mut self,
        x: &Array2<f64>,
        y: &Array1<f64>,
        partitions: &[Vec<usize>],
    ) -> Result<()> {
        let rows = covered_rows(partitions, x.nrows())?;
        if rows.len() < x.nrows() {
            log::info!(
                "{} of {} samples are not in any fold and are left out of training",
                x.nrows() - rows.len(),
                x.nrows()
            );
        }

        // Re-index the partitions against the covered rows.
        let mut position = vec![usize::MAX; x.nrows()];
        for (pos, &row) in rows.iter().enumerate() {
            position[row] = pos;
        }
        let local: Vec<Vec<usize>> = partitions
            .iter()
            .map(|p| p.iter().map(|&row| position[row]).collect())
            .collect();

        let mut features = x.select(Axis(0), &rows);
        let targets = y.select(Axis(0), &rows);

        let depth = self.layers.len();
        log::info!(
            "Fitting {} layers on {} samples across {} folds",
            depth,
            rows.len(),
            local.len()
        );

        for (i, layer) in self.layers.iter_mut().enumerate() {
            if i + 1 == depth {
                layer.fit(&features, &targets)?;
                break;
            }
            let meta = out_of_fold(layer, &features, &targets, &local)?;
            // Refit on every covered row so the layer can serve unseen data.
            layer.fit(&features, &targets)?;
            log::debug!(
                "Layer {} of {} produced {} out-of-fold meta-features",
                i + 1,
                depth,
                meta.ncols()
            );
            features = meta;
        }
        Ok(())
    }

    /// Run every layer's `predict`, first to last.
    ///
    /// A single output column is flattened into [`Prediction::Vector`].
    pub fn predict(&mut self, x: &Array2<f64>) -> Result<Prediction> {
        let (first, rest) = self
            .layers
            .split_first_mut()
            .ok_or_else(|| StackError::config("A stack needs at least one layer"))?;
        let mut features = first.predict(x)?;
        for layer in rest.iter_mut() {
            features = layer.predict(&features)?;
        }

        if features.ncols() == 1 {
            Ok(Prediction::Vector(features.index_axis_move(Axis(1), 0)))
        } else {
            Ok(Prediction::Matrix(features))
        }
    }

    /// Same depth, layer shapes and fold policy, with every component reset to
    /// its unfitted state. The copy shares nothing with `self`.
    pub fn copy(&self) -> Stack {
        Stack {
            layers: self.layers.iter().map(Layer::copy).collect(),
            folds: self.folds.clone(),
            warnings: self.warnings.clone(),
        }
    }
}

/// Score every partition with a copy of `layer` fitted on the other partitions.
fn out_of_fold(
    layer: &Layer,
    features: &Array2<f64>,
    targets: &Array1<f64>,
    partitions: &[Vec<usize>],
) -> Result<Array2<f64>> {
    let n_samples = features.nrows();
    let mut meta: Option<Array2<f64>> = None;

    for (fold, held_out) in partitions.iter().enumerate() {
        if held_out.is_empty() {
            continue;
        }
        let mut in_fold = vec![false; n_samples];
        for &row in held_out {
            in_fold[row] = true;
        }
        let train: Vec<usize> = (0..n_samples).filter(|&row| !in_fold[row]).collect();
        if train.is_empty() {
            return Err(StackError::config(format!(
                "Fold {} holds out every sample, nothing is left to train on",
                fold
            )));
        }

        log::trace!(
            "Fold {}: training on {} samples, scoring {} held-out samples",
            fold,
            train.len(),
            held_out.len()
        );

        let mut fold_layer = layer.copy();
        fold_layer.fit(
            &features.select(Axis(0), &train),
            &targets.select(Axis(0), &train),
        )?;
        let scored = fold_layer.predict(&features.select(Axis(0), held_out))?;

        let out = meta.get_or_insert_with(|| Array2::zeros((n_samples, scored.ncols())));
        if scored.ncols() != out.ncols() {
            return Err(StackError::Shape(format!(
                "Fold {} produced {} meta-features but earlier folds produced {}",
                fold,
                scored.ncols(),
                out.ncols()
            )));
        }
        for (src, &row) in held_out.iter().enumerate() {
            out.row_mut(row).assign(&scored.row(src));
        }
    }

    meta.ok_or_else(|| StackError::config("Every fold is empty"))
}

impl fmt::Debug for Stack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stack")
            .field("layers", &self.layers)
            .field("folds", &self.folds)
            .finish()
    }
}
