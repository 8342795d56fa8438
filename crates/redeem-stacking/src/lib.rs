//! redeem-stacking: stacked generalization over pluggable estimators.
//!
//! A [`Layer`](layer::Layer) runs several (preprocessor, predictor) slots side by
//! side on the same input and concatenates their outputs into one meta-feature
//! matrix. A [`Stack`](stack::Stack) chains layers so that each layer's output
//! becomes the next layer's input; the final layer's output is the prediction.
//!
//! The crate does not learn anything by itself. Components implement the
//! [`Predictor`](models::Predictor) and [`Transformer`](models::Transformer)
//! traits; the optional `linfa` feature (on by default) ships adapters over the
//! linfa ecosystem so stacks can be assembled from a [`config::StackConfig`].
pub mod config;
pub mod error;
pub mod folds;
pub mod layer;
pub mod models;
#[cfg(feature = "linfa")]
pub mod preprocessing;
pub mod stack;

pub use error::{Result, StackError, StackWarning};
pub use folds::{Folds, KFold, Splitter};
pub use layer::Layer;
pub use models::{Predictor, Transformer};
pub use stack::{Prediction, Stack};
