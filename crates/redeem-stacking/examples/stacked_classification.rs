use anyhow::Result;
use ndarray::{Array1, Array2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use redeem_stacking::models::{LinearRegression, LogisticRegression};
use redeem_stacking::preprocessing::MinMaxScaler;
use redeem_stacking::{Folds, KFold, Layer, Predictor, Stack, Transformer};

/// Two Gaussian-ish blobs labelled 0 and 1.
fn blobs(n_per_class: usize, seed: u64) -> (Array2<f64>, Array1<f64>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let n = 2 * n_per_class;
    let y = Array1::from_shape_fn(n, |i| if i < n_per_class { 0.0 } else { 1.0 });
    let x = Array2::from_shape_fn((n, 2), |(i, _)| {
        let centre = if y[i] > 0.5 { 2.0 } else { -2.0 };
        centre + rng.gen_range(-1.5..1.5)
    });
    (x, y)
}

fn main() -> Result<()> {
    env_logger::init();

    let (x, y) = blobs(40, 11);
    let (x_test, y_test) = blobs(10, 12);

    // The regression slot asks for probabilities it cannot give, so it falls
    // back to point predictions and a warning is recorded.
    let first = Layer::new(
        vec![
            Box::new(LogisticRegression::new()) as Box<dyn Predictor>,
            Box::new(LogisticRegression::new().alpha(0.1)),
            Box::new(LinearRegression::new()),
        ],
        Some(vec![
            None,
            Some(Box::new(MinMaxScaler::new()) as Box<dyn Transformer>),
            None,
        ]),
        Some(vec![true, false, true]),
    )?;
    let second = Layer::new(
        vec![Box::new(LogisticRegression::new()) as Box<dyn Predictor>],
        None,
        None,
    )?;

    let folds = Folds::Splitter(Box::new(KFold::new(2).shuffled(Some(3))));
    let mut stack = Stack::new(vec![first, second], Some(folds))?;
    let predicted = stack
        .fit(&x, &y)?
        .predict(&x_test)?
        .into_matrix()
        .column(0)
        .to_owned();

    for warning in stack.warnings() {
        println!("warning: {}", warning);
    }

    let correct = predicted
        .iter()
        .zip(y_test.iter())
        .filter(|(p, t)| (*p - *t).abs() < 0.5)
        .count();
    println!("Accuracy: {}/{}", correct, y_test.len());
    Ok(())
}
