//! Integration tests for `Layer`: output shapes, slot ordering, preprocessing
//! and the probability fallback.

mod common;

use ndarray::array;
use redeem_stacking::{Layer, StackWarning};

use common::{init_logging, plane, MeanRegressor, UniformProba};

// ---------------------------------------------------------------------------
// Construction
// ---------------------------------------------------------------------------

#[test]
fn two_models_one_preprocessor_is_config_error() {
    let err = Layer::new(
        vec![MeanRegressor::boxed(), MeanRegressor::boxed()],
        Some(vec![None]),
        None,
    )
    .unwrap_err();
    assert!(err.is_config(), "unexpected error: {}", err);
}

#[test]
fn proba_flags_must_match_models() {
    let err = Layer::new(vec![MeanRegressor::boxed()], None, Some(vec![])).unwrap_err();
    assert!(err.is_config());
}

#[test]
fn width_counts_slots() {
    let layer = Layer::new(
        vec![MeanRegressor::boxed(), UniformProba::boxed(3)],
        Some(vec![None, None]),
        Some(vec![false, true]),
    )
    .unwrap();
    assert_eq!(layer.width(), 2);
    assert_eq!(layer.output_modes(), vec![false, true]);
    assert_eq!(layer.has_preprocessors(), vec![false, false]);
}

// ---------------------------------------------------------------------------
// Shapes
// ---------------------------------------------------------------------------

#[test]
fn output_columns_sum_slot_widths() {
    let (x, y) = plane();
    let mut layer = Layer::new(
        vec![
            UniformProba::boxed(3),
            MeanRegressor::boxed(),
            UniformProba::boxed(2),
            UniformProba::boxed(4),
        ],
        None,
        Some(vec![true, false, true, false]),
    )
    .unwrap();

    // 3 (proba) + 1 (point) + 2 (proba) + 1 (point, proba not requested)
    let fitted = layer.fit(&x, &y).unwrap();
    assert_eq!(fitted.dim(), (4, 7));

    let predicted = layer.predict(&array![[0.0, 0.0], [1.0, 1.0]]).unwrap();
    assert_eq!(predicted.dim(), (2, 7));
}

#[test]
fn fit_output_matches_predict_on_same_input() {
    let (x, y) = plane();
    let mut layer = Layer::new(vec![MeanRegressor::boxed()], None, None).unwrap();
    let fitted = layer.fit(&x, &y).unwrap();
    let predicted = layer.predict(&x).unwrap();
    assert_eq!(fitted, predicted);
}

#[test]
fn predict_before_fit_is_not_fitted() {
    let (x, _) = plane();
    let mut layer = Layer::new(vec![MeanRegressor::boxed()], None, None).unwrap();
    let err = layer.predict(&x).unwrap_err();
    assert!(err.is_not_fitted(), "unexpected error: {}", err);
}

// ---------------------------------------------------------------------------
// Probability fallback
// ---------------------------------------------------------------------------

#[test]
fn proba_without_capability_warns_and_falls_back() {
    init_logging();
    let (x, y) = plane();
    let mut layer = Layer::new(vec![MeanRegressor::boxed()], None, Some(vec![true])).unwrap();

    let fitted = layer.fit(&x, &y).unwrap();
    assert_eq!(fitted.dim(), (4, 1));
    assert_eq!(
        layer.warnings(),
        &[StackWarning::ProbaFallback {
            slot: 0,
            predictor: "MeanRegressor".to_string()
        }]
    );

    let predicted = layer.predict(&x).unwrap();
    assert_eq!(predicted.dim(), (4, 1));
    assert_eq!(layer.warnings().len(), 1);
}

#[test]
fn warnings_are_reset_per_call() {
    let (x, y) = plane();
    let mut layer = Layer::new(
        vec![MeanRegressor::boxed(), UniformProba::boxed(2)],
        None,
        Some(vec![false, true]),
    )
    .unwrap();
    layer.fit(&x, &y).unwrap();
    assert!(layer.warnings().is_empty());
}

// ---------------------------------------------------------------------------
// Copy
// ---------------------------------------------------------------------------

#[test]
fn copy_keeps_configuration_and_drops_state() {
    let (x, y) = plane();
    let mut layer = Layer::new(
        vec![UniformProba::boxed(2), MeanRegressor::boxed()],
        None,
        Some(vec![true, false]),
    )
    .unwrap();
    layer.fit(&x, &y).unwrap();

    let mut copy = layer.copy();
    assert_eq!(copy.width(), layer.width());
    assert_eq!(copy.output_modes(), layer.output_modes());
    assert_eq!(copy.predictor_names(), layer.predictor_names());
    assert!(copy.predict(&x).unwrap_err().is_not_fitted());

    copy.fit(&x, &y).unwrap();
    assert_eq!(copy.predict(&x).unwrap(), layer.predict(&x).unwrap());
}

// ---------------------------------------------------------------------------
// linfa-backed slots
// ---------------------------------------------------------------------------

#[cfg(feature = "linfa")]
mod linfa_slots {
    use super::*;
    use approx::assert_abs_diff_eq;
    use redeem_stacking::models::LinearRegression;
    use redeem_stacking::{Predictor, Transformer};
    use redeem_stacking::preprocessing::MinMaxScaler;

    fn linear() -> Box<dyn Predictor> {
        Box::new(LinearRegression::new())
    }

    fn min_max() -> Option<Box<dyn Transformer>> {
        Some(Box::new(MinMaxScaler::new()))
    }

    #[test]
    fn single_model_fit_without_preprocess() {
        let (x, y) = plane();
        let mut layer = Layer::new(vec![linear()], Some(vec![None]), None).unwrap();
        let result = layer.fit(&x, &y).unwrap();
        assert_eq!(result.dim(), (4, 1));
        for (got, want) in result.column(0).iter().zip(y.iter()) {
            assert_abs_diff_eq!(*got, *want, epsilon = 1e-6);
        }
    }

    #[test]
    fn single_model_fit_with_preprocess() {
        let (x, y) = plane();
        let mut layer = Layer::new(vec![linear()], Some(vec![min_max()]), None).unwrap();
        let result = layer.fit(&x, &y).unwrap();
        assert_eq!(result.dim(), (4, 1));
        for (got, want) in result.column(0).iter().zip(y.iter()) {
            assert_abs_diff_eq!(*got, *want, epsilon = 1e-6);
        }
    }

    #[test]
    fn multiple_model_fit() {
        let (x, y) = plane();
        let mut layer = Layer::new(vec![linear(), linear()], Some(vec![None, min_max()]), None).unwrap();
        let result = layer.fit(&x, &y).unwrap();
        assert_eq!(result.dim(), (4, 2));
        for col in 0..2 {
            for (got, want) in result.column(col).iter().zip(y.iter()) {
                assert_abs_diff_eq!(*got, *want, epsilon = 1e-6);
            }
        }
    }

    #[test]
    fn single_model_predict() {
        let (x, y) = plane();
        let mut layer = Layer::new(vec![linear()], None, None).unwrap();
        layer.fit(&x, &y).unwrap();
        let result = layer.predict(&array![[3.0, 5.0], [3.0, 5.0]]).unwrap();
        assert_eq!(result.dim(), (2, 1));
        assert_abs_diff_eq!(result[(0, 0)], 16.0, epsilon = 1e-6);
        assert_abs_diff_eq!(result[(1, 0)], 16.0, epsilon = 1e-6);
    }

    #[test]
    fn multiple_model_predict_with_preprocess() {
        let (x, y) = plane();
        let mut layer = Layer::new(vec![linear(), linear()], Some(vec![None, min_max()]), None).unwrap();
        layer.fit(&x, &y).unwrap();
        let result = layer.predict(&array![[3.0, 5.0]]).unwrap();
        assert_eq!(result.dim(), (1, 2));
        assert_abs_diff_eq!(result[(0, 0)], 16.0, epsilon = 1e-6);
        assert_abs_diff_eq!(result[(0, 1)], 16.0, epsilon = 1e-6);
    }
}
