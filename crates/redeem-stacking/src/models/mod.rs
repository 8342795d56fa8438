#[cfg(feature = "linfa")]
pub mod factory;
#[cfg(feature = "linfa")]
pub mod linear;
#[cfg(feature = "linfa")]
pub mod logistic;
pub mod utils;

pub mod estimator_trait;

pub use estimator_trait::{Predictor, Transformer};
#[cfg(feature = "linfa")]
pub use linear::LinearRegression;
#[cfg(feature = "linfa")]
pub use logistic::LogisticRegression;
